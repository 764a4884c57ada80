use derive_more::{Display, From, Into};
use serde::Serialize;
use spiderfy::{LegId, Point, ProxySurface, ProxyVisual, VisualState};
use std::convert::Infallible;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, From, Into)]
#[serde(transparent)]
pub struct ProxyId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Display)]
#[display("({lng:.5}, {lat:.5})")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug)]
pub struct TraceProxy {
    id: ProxyId,
    offset: Point,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TraceOp {
    Create {
        proxy: ProxyId,
        offset: Point,
        classes: Vec<&'static str>,
        state: String,
    },
    ClickHandler {
        proxy: ProxyId,
        leg: String,
    },
    Attach {
        proxy: ProxyId,
        anchor: LngLat,
        offset: Point,
    },
    Visual {
        proxy: ProxyId,
        state: String,
        delay_ms: u64,
    },
    Remove {
        proxy: ProxyId,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceLine {
    pub at_ms: u64,
    #[serde(flatten)]
    pub op: TraceOp,
}

/// Surface that renders nothing and records every call with its wall time.
pub struct TraceSurface {
    started: Instant,
    next_proxy: usize,
    pub lines: Vec<TraceLine>,
}

impl Default for TraceSurface {
    fn default() -> Self {
        Self {
            started: Instant::now(),
            next_proxy: 0,
            lines: Vec::new(),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl TraceSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, op: TraceOp) {
        let at_ms = millis(self.started.elapsed());
        log::info!("{:>6}ms {:?}", at_ms, op);
        self.lines.push(TraceLine { at_ms, op });
    }
}

impl ProxySurface for TraceSurface {
    type Handle = TraceProxy;
    type Anchor = LngLat;
    type Event = String;
    type Error = Infallible;

    fn create_proxy(
        &mut self,
        offset: Point,
        visual: &ProxyVisual,
        state: VisualState,
    ) -> Result<TraceProxy, Infallible> {
        let id = ProxyId(self.next_proxy);
        self.next_proxy += 1;
        self.record(TraceOp::Create {
            proxy: id,
            offset,
            classes: visual.class_names(),
            state: state.to_string(),
        });
        Ok(TraceProxy { id, offset })
    }

    fn attach_to_anchor(
        &mut self,
        handle: &mut TraceProxy,
        anchor: &LngLat,
    ) -> Result<(), Infallible> {
        self.record(TraceOp::Attach {
            proxy: handle.id,
            anchor: *anchor,
            offset: handle.offset,
        });
        Ok(())
    }

    fn remove_proxy(&mut self, handle: TraceProxy) -> Result<(), Infallible> {
        self.record(TraceOp::Remove { proxy: handle.id });
        Ok(())
    }

    fn set_click_handler(&mut self, handle: &mut TraceProxy, leg: LegId) -> Result<(), Infallible> {
        self.record(TraceOp::ClickHandler {
            proxy: handle.id,
            leg: leg.to_string(),
        });
        Ok(())
    }

    fn set_visual_state(
        &mut self,
        handle: &mut TraceProxy,
        state: VisualState,
        delay: Duration,
    ) -> Result<(), Infallible> {
        self.record(TraceOp::Visual {
            proxy: handle.id,
            state: state.to_string(),
            delay_ms: millis(delay),
        });
        Ok(())
    }
}
