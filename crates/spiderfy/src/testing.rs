//! Recording surface used by the crate's tests.

use crate::leg::LegId;
use crate::surface::{Point, ProxySurface, ProxyVisual, VisualState};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Create {
        proxy: usize,
        offset: Point,
        custom: bool,
        state: VisualState,
    },
    ClickHandler {
        proxy: usize,
        leg: LegId,
    },
    Attach {
        proxy: usize,
        anchor: &'static str,
    },
    Visual {
        proxy: usize,
        state: VisualState,
        delay: Duration,
    },
    Remove {
        proxy: usize,
    },
}

/// Surface call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Create,
    ClickHandler,
    Attach,
    Visual,
    Remove,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("surface refused {op:?} on proxy #{proxy}")]
pub struct SurfaceFailure {
    pub op: Fault,
    pub proxy: usize,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    /// Each entry fails the matching call once. Failed calls are not recorded.
    pub faults: Vec<(Fault, usize)>,
    next_proxy: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, op: Fault, proxy: usize) {
        self.faults.push((op, proxy));
    }

    fn check(&mut self, op: Fault, proxy: usize) -> Result<(), SurfaceFailure> {
        match self.faults.iter().position(|f| *f == (op, proxy)) {
            Some(i) => {
                self.faults.remove(i);
                Err(SurfaceFailure { op, proxy })
            }
            None => Ok(()),
        }
    }

    pub fn created(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Create { proxy, .. } => Some(*proxy),
                _ => None,
            })
            .collect()
    }

    /// Created proxies that have not been removed yet.
    pub fn live(&self) -> Vec<usize> {
        let removed = self.removed();
        self.created()
            .into_iter()
            .filter(|p| !removed.contains(p))
            .collect()
    }

    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    pub fn attached(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Attach { proxy, .. } => Some(*proxy),
                _ => None,
            })
            .collect()
    }

    pub fn removed(&self) -> Vec<usize> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Remove { proxy } => Some(*proxy),
                _ => None,
            })
            .collect()
    }

    pub fn visuals(&self) -> Vec<(usize, VisualState, Duration)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Visual {
                    proxy,
                    state,
                    delay,
                } => Some((*proxy, *state, *delay)),
                _ => None,
            })
            .collect()
    }
}

impl ProxySurface for RecordingSurface {
    type Handle = usize;
    type Anchor = &'static str;
    type Event = &'static str;
    type Error = SurfaceFailure;

    fn create_proxy(
        &mut self,
        offset: Point,
        visual: &ProxyVisual,
        state: VisualState,
    ) -> Result<usize, SurfaceFailure> {
        let proxy = self.next_proxy;
        self.check(Fault::Create, proxy)?;
        self.next_proxy += 1;
        self.ops.push(Op::Create {
            proxy,
            offset,
            custom: matches!(visual, ProxyVisual::Custom),
            state,
        });
        Ok(proxy)
    }

    fn attach_to_anchor(
        &mut self,
        handle: &mut usize,
        anchor: &&'static str,
    ) -> Result<(), SurfaceFailure> {
        self.check(Fault::Attach, *handle)?;
        self.ops.push(Op::Attach {
            proxy: *handle,
            anchor: *anchor,
        });
        Ok(())
    }

    fn remove_proxy(&mut self, handle: usize) -> Result<(), SurfaceFailure> {
        self.check(Fault::Remove, handle)?;
        self.ops.push(Op::Remove { proxy: handle });
        Ok(())
    }

    fn set_click_handler(&mut self, handle: &mut usize, leg: LegId) -> Result<(), SurfaceFailure> {
        self.check(Fault::ClickHandler, *handle)?;
        self.ops.push(Op::ClickHandler {
            proxy: *handle,
            leg,
        });
        Ok(())
    }

    fn set_visual_state(
        &mut self,
        handle: &mut usize,
        state: VisualState,
        delay: Duration,
    ) -> Result<(), SurfaceFailure> {
        self.check(Fault::Visual, *handle)?;
        self.ops.push(Op::Visual {
            proxy: *handle,
            state,
            delay,
        });
        Ok(())
    }
}
