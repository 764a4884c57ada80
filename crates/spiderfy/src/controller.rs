use crate::config::{ConfigError, Settings};
use crate::layout::{LayoutMode, LegGeometry, compute_layout};
use crate::leg::{FanOutSet, Generation, Leg, LegId, LegPhase};
use crate::registry::{Registry, RetiringSet};
use crate::surface::{ProxySurface, ProxyVisual, VisualState};
use crate::timeline::Timeline;
use std::time::Duration;
use thiserror::Error;

/// Extra time after the exit animation before a proxy is removed, so the
/// host's transition has finished.
pub const EXIT_GRACE: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum SpiderError<E: std::error::Error + 'static> {
    #[error("Proxy surface error: {0}")]
    Surface(#[source] E),
}

type InitializeLeg<T, H> = Box<dyn FnMut(&mut Leg<T, H>)>;
type OnClick<T, H, E> = Box<dyn FnMut(&E, &Leg<T, H>)>;

/// Caller extension points. Both default to doing nothing.
pub struct Hooks<T, S: ProxySurface> {
    initialize_leg: InitializeLeg<T, S::Handle>,
    on_click: OnClick<T, S::Handle, S::Event>,
}

impl<T: 'static, S: ProxySurface + 'static> Default for Hooks<T, S> {
    fn default() -> Self {
        Self {
            initialize_leg: Box::new(|_: &mut Leg<T, S::Handle>| {}),
            on_click: Box::new(|_: &S::Event, _: &Leg<T, S::Handle>| {}),
        }
    }
}

impl<T: 'static, S: ProxySurface + 'static> Hooks<T, S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once per leg after its proxy exists and before it is mounted.
    pub fn initialize_leg(mut self, f: impl FnMut(&mut Leg<T, S::Handle>) + 'static) -> Self {
        self.initialize_leg = Box::new(f);
        self
    }

    pub fn on_click(mut self, f: impl FnMut(&S::Event, &Leg<T, S::Handle>) + 'static) -> Self {
        self.on_click = Box::new(f);
        self
    }
}

#[derive(Debug)]
enum Task<T, H> {
    /// First paint after mounting an animated fan-out.
    Settle(Generation),
    /// Delayed removal of an exiting leg. The task owns the leg until then.
    Unmount(Leg<T, H>),
}

/// `total / count * index`, computed in nanoseconds to stay exact.
pub fn stagger_delay(total: Duration, count: usize, index: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() * index as u128 / count as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Fans items out around an anchor on a host surface and walks previous
/// fan-outs through their exit.
pub struct Spiderfier<T, S: ProxySurface> {
    surface: S,
    settings: Settings,
    hooks: Hooks<T, S>,
    registry: Registry<T, S::Handle, S::Anchor>,
    timeline: Timeline<Task<T, S::Handle>>,
    generation: Generation,
}

impl<T, S: ProxySurface> Spiderfier<T, S> {
    pub fn new(surface: S, settings: Settings, hooks: Hooks<T, S>) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            surface,
            settings,
            hooks,
            registry: Registry::new(),
            timeline: Timeline::new(),
            generation: Generation::default(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn active(&self) -> Option<&FanOutSet<T, S::Handle, S::Anchor>> {
        self.registry.active()
    }

    pub fn active_len(&self) -> usize {
        self.registry.active().map_or(0, FanOutSet::len)
    }

    pub fn retiring(&self) -> Option<&RetiringSet> {
        self.registry.retiring()
    }

    pub fn now(&self) -> Duration {
        self.timeline.now()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.timeline.next_due()
    }

    pub fn pending_tasks(&self) -> usize {
        self.timeline.len()
    }

    pub fn spiderfy(
        &mut self,
        anchor: S::Anchor,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), SpiderError<S::Error>> {
        let items: Vec<T> = items.into_iter().collect();
        let geometries = compute_layout(items.len(), &self.settings);
        self.generation = self.generation.next();
        let generation = self.generation;
        log::debug!(
            "Spiderfy generation {}: {} legs in {} mode",
            generation,
            items.len(),
            LayoutMode::for_count(items.len(), &self.settings)
        );

        let visual = ProxyVisual::from_settings(self.settings.use_custom_proxy_visual);
        let initial_state = if self.settings.animate {
            VisualState::Entering
        } else {
            VisualState::Settled
        };

        let mut legs = Vec::with_capacity(items.len());
        for (item, geometry) in items.into_iter().zip(geometries) {
            match self.build_leg(generation, item, geometry, &visual, initial_state) {
                Ok(leg) => legs.push(leg),
                Err(e) => {
                    self.release(legs);
                    return Err(e);
                }
            }
        }

        let set = FanOutSet {
            generation,
            anchor,
            legs,
        };
        let retired = match self.registry.adopt(set) {
            Some(previous) => self.retire(previous),
            None => Ok(()),
        };
        self.mount_active()?;

        if self.settings.animate && self.active_len() > 0 {
            self.timeline
                .schedule(Duration::ZERO, Task::Settle(generation));
        }
        retired
    }

    /// Retires the active fan-out, if any, with no replacement.
    pub fn unspiderfy(&mut self) -> Result<(), SpiderError<S::Error>> {
        match self.registry.clear_active() {
            Some(previous) => self.retire(previous),
            None => Ok(()),
        }
    }

    /// Visits active legs in input order.
    pub fn each<F>(&self, callback: F)
    where
        F: FnMut(&Leg<T, S::Handle>, usize),
    {
        self.registry.for_each_active(callback);
    }

    /// Forwards a host interaction on `leg` to the `on_click` hook. Legs that
    /// are no longer active are not interactive.
    pub fn dispatch_click(&mut self, leg: LegId, event: &S::Event) -> bool {
        match self.registry.active_leg(leg) {
            Some(found) => {
                (self.hooks.on_click)(event, found);
                true
            }
            None => {
                log::warn!("Ignoring click on inactive leg {}", leg);
                false
            }
        }
    }

    pub fn advance(&mut self, elapsed: Duration) -> Result<(), SpiderError<S::Error>> {
        self.advance_to(self.timeline.now() + elapsed)
    }

    /// Runs every deferred task due at or before `until`, in due order.
    pub fn advance_to(&mut self, until: Duration) -> Result<(), SpiderError<S::Error>> {
        while let Some(task) = self.timeline.pop_due(until) {
            self.run(task)?;
        }
        Ok(())
    }

    fn build_leg(
        &mut self,
        generation: Generation,
        item: T,
        geometry: LegGeometry,
        visual: &ProxyVisual,
        initial_state: VisualState,
    ) -> Result<Leg<T, S::Handle>, SpiderError<S::Error>> {
        let id = LegId {
            generation,
            index: geometry.index(),
        };
        let proxy = self
            .surface
            .create_proxy(geometry.offset(), visual, initial_state)
            .map_err(SpiderError::Surface)?;
        let mut leg = Leg {
            id,
            item,
            geometry,
            proxy,
            phase: LegPhase::Created,
        };
        (self.hooks.initialize_leg)(&mut leg);
        if let Err(e) = self.surface.set_click_handler(&mut leg.proxy, id) {
            self.release(vec![leg]);
            return Err(SpiderError::Surface(e));
        }
        Ok(leg)
    }

    /// Hands never-mounted proxies back to the host after a failed build.
    fn release(&mut self, legs: Vec<Leg<T, S::Handle>>) {
        for leg in legs.into_iter().rev() {
            let id = leg.id;
            if let Err(e) = self.surface.remove_proxy(leg.proxy) {
                log::warn!("Failed to release proxy of leg {}: {}", id, e);
            }
        }
    }

    fn mount_active(&mut self) -> Result<(), SpiderError<S::Error>> {
        let animate = self.settings.animate;
        let Some(set) = self.registry.active_mut() else {
            return Ok(());
        };
        let FanOutSet { anchor, legs, .. } = set;

        // last leg first so leg 0 ends up on top
        for leg in legs.iter_mut().rev() {
            self.surface
                .attach_to_anchor(&mut leg.proxy, anchor)
                .map_err(SpiderError::Surface)?;
            leg.phase = if animate {
                LegPhase::Entering
            } else {
                LegPhase::Idle
            };
        }
        Ok(())
    }

    fn retire(
        &mut self,
        set: FanOutSet<T, S::Handle, S::Anchor>,
    ) -> Result<(), SpiderError<S::Error>> {
        let count = set.len();
        if count == 0 {
            return Ok(());
        }
        log::debug!("Retiring generation {} ({} legs)", set.generation, count);

        // every leg is driven out even if the surface fails on one of them;
        // the first failure is reported
        let mut first_error = None;
        for (position, mut leg) in set.legs.into_iter().rev().enumerate() {
            if self.settings.animate && leg.phase.is_mounted() {
                let delay = stagger_delay(self.settings.animation_duration, count, position);
                if let Err(e) =
                    self.surface
                        .set_visual_state(&mut leg.proxy, VisualState::Exiting, delay)
                {
                    first_error.get_or_insert(SpiderError::Surface(e));
                }
                leg.phase = LegPhase::Exiting;
                let due = self.timeline.schedule(
                    self.settings.animation_duration + EXIT_GRACE,
                    Task::Unmount(leg),
                );
                log::trace!("Scheduled removal at {:?}", due);
            } else if let Err(e) = self.unmount(leg) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn unmount(&mut self, leg: Leg<T, S::Handle>) -> Result<(), SpiderError<S::Error>> {
        let id = leg.id;
        // the handle goes back to the host either way
        let removed = self.surface.remove_proxy(leg.proxy);
        self.registry.mark_unmounted(id);
        log::trace!("Unmounted leg {}", id);
        removed.map_err(SpiderError::Surface)
    }

    fn run(&mut self, task: Task<T, S::Handle>) -> Result<(), SpiderError<S::Error>> {
        match task {
            Task::Unmount(leg) => self.unmount(leg),
            Task::Settle(generation) => self.settle(generation),
        }
    }

    fn settle(&mut self, generation: Generation) -> Result<(), SpiderError<S::Error>> {
        let total = self.settings.animation_duration;
        let Some(set) = self
            .registry
            .active_mut()
            .filter(|set| set.generation == generation)
        else {
            log::trace!("Generation {} retired before its first paint", generation);
            return Ok(());
        };

        let count = set.legs.len();
        for (position, leg) in set.legs.iter_mut().rev().enumerate() {
            let delay = stagger_delay(total, count, position);
            self.surface
                .set_visual_state(&mut leg.proxy, VisualState::Settled, delay)
                .map_err(SpiderError::Surface)?;
            leg.phase = LegPhase::Idle;
        }
        Ok(())
    }
}
