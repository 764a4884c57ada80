use crate::leg::{FanOutSet, Generation, Leg, LegId};

/// Bookkeeping for a set that is animating out. The legs themselves are owned
/// by their pending removals; only which slots are still attached is tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetiringSet {
    generation: Generation,
    pending: Vec<bool>,
}

impl RetiringSet {
    fn new(generation: Generation, len: usize) -> Self {
        Self {
            generation,
            pending: vec![true; len],
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_pending(&self, index: usize) -> bool {
        self.pending.get(index).copied().unwrap_or(false)
    }

    pub fn remaining(&self) -> usize {
        self.pending.iter().filter(|p| **p).count()
    }
}

/// Holds the single active fan-out and the single retiring one.
#[derive(Debug)]
pub struct Registry<T, H, A> {
    active: Option<FanOutSet<T, H, A>>,
    retiring: Option<RetiringSet>,
}

impl<T, H, A> Default for Registry<T, H, A> {
    fn default() -> Self {
        Self {
            active: None,
            retiring: None,
        }
    }
}

impl<T, H, A> Registry<T, H, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `set` active. The previous active set, if any, is returned for
    /// the caller to drive out and becomes the tracked retiring set; tracking
    /// of an older retiring set is dropped without touching its legs. An
    /// empty set leaves nothing active.
    pub fn adopt(&mut self, set: FanOutSet<T, H, A>) -> Option<FanOutSet<T, H, A>> {
        let previous = self.clear_active();
        self.active = (!set.is_empty()).then_some(set);
        previous
    }

    pub fn clear_active(&mut self) -> Option<FanOutSet<T, H, A>> {
        let previous = self.active.take()?;
        if let Some(abandoned) = &self.retiring {
            log::debug!(
                "Dropping tracking of retiring generation {} ({} legs still exiting)",
                abandoned.generation,
                abandoned.remaining()
            );
        }
        self.retiring = (!previous.is_empty())
            .then(|| RetiringSet::new(previous.generation, previous.len()));
        Some(previous)
    }

    /// Called once a leg's proxy has been removed from the surface.
    pub fn mark_unmounted(&mut self, id: LegId) {
        let Some(retiring) = self.retiring.as_mut() else {
            return;
        };
        if retiring.generation != id.generation {
            return;
        }
        if let Some(slot) = retiring.pending.get_mut(id.index) {
            *slot = false;
        }
        if retiring.remaining() == 0 {
            self.retiring = None;
        }
    }

    pub fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(&Leg<T, H>, usize),
    {
        if let Some(set) = &self.active {
            set.legs.iter().enumerate().for_each(|(i, leg)| f(leg, i));
        }
    }

    pub fn active(&self) -> Option<&FanOutSet<T, H, A>> {
        self.active.as_ref()
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut FanOutSet<T, H, A>> {
        self.active.as_mut()
    }

    pub fn retiring(&self) -> Option<&RetiringSet> {
        self.retiring.as_ref()
    }

    pub fn active_leg(&self, id: LegId) -> Option<&Leg<T, H>> {
        self.active.as_ref().and_then(|set| set.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::layout::compute_layout;
    use crate::leg::LegPhase;

    fn fan_out(generation: u64, items: &[&'static str]) -> FanOutSet<&'static str, (), ()> {
        let generation = Generation::from(generation);
        let legs = compute_layout(items.len(), &Settings::default())
            .into_iter()
            .zip(items)
            .map(|(geometry, item)| Leg {
                id: LegId {
                    generation,
                    index: geometry.index(),
                },
                item: *item,
                geometry,
                proxy: (),
                phase: LegPhase::Idle,
            })
            .collect();
        FanOutSet {
            generation,
            anchor: (),
            legs,
        }
    }

    #[test]
    fn test_adopt_retires_previous() {
        let mut registry = Registry::new();
        assert!(registry.adopt(fan_out(1, &["a", "b"])).is_none());
        assert!(registry.retiring().is_none());

        let previous = registry.adopt(fan_out(2, &["c"])).unwrap();
        assert_eq!(previous.generation(), Generation::from(1));
        assert_eq!(registry.active().unwrap().generation(), Generation::from(2));
        assert_eq!(registry.retiring().unwrap().remaining(), 2);
    }

    #[test]
    fn test_adopt_drops_older_retiring_tracking() {
        let mut registry = Registry::new();
        registry.adopt(fan_out(1, &["a", "b"]));
        registry.adopt(fan_out(2, &["c"]));
        registry.adopt(fan_out(3, &["d"]));

        let retiring = registry.retiring().unwrap();
        assert_eq!(retiring.generation(), Generation::from(2));

        // removals from the abandoned generation no longer touch tracking
        registry.mark_unmounted(LegId {
            generation: Generation::from(1),
            index: 0,
        });
        assert_eq!(registry.retiring().unwrap().remaining(), 1);
    }

    #[test]
    fn test_mark_unmounted_keeps_slots_in_place() {
        let mut registry = Registry::new();
        registry.adopt(fan_out(1, &["a", "b", "c"]));
        registry.clear_active();
        assert!(registry.active().is_none());

        let generation = Generation::from(1);
        registry.mark_unmounted(LegId { generation, index: 1 });
        let retiring = registry.retiring().unwrap();
        assert!(retiring.is_pending(0));
        assert!(!retiring.is_pending(1));
        assert!(retiring.is_pending(2));

        registry.mark_unmounted(LegId { generation, index: 0 });
        registry.mark_unmounted(LegId { generation, index: 2 });
        assert!(registry.retiring().is_none());
    }

    #[test]
    fn test_empty_adopt_keeps_retiring_tracking() {
        let mut registry = Registry::new();
        registry.adopt(fan_out(1, &["a", "b"]));
        registry.adopt(fan_out(2, &[]));

        assert!(registry.active().is_none());
        assert!(registry.clear_active().is_none());
        let retiring = registry.retiring().unwrap();
        assert_eq!(retiring.generation(), Generation::from(1));
        assert_eq!(retiring.remaining(), 2);
    }

    #[test]
    fn test_clear_active_when_empty_is_noop() {
        let mut registry: Registry<&str, (), ()> = Registry::new();
        assert!(registry.clear_active().is_none());
        assert!(registry.retiring().is_none());
    }

    #[test]
    fn test_for_each_active_in_stored_order() {
        let mut registry = Registry::new();
        registry.adopt(fan_out(1, &["a", "b", "c"]));

        let mut seen = Vec::new();
        registry.for_each_active(|leg, i| seen.push((*leg.item(), i)));
        assert_eq!(seen, vec![("a", 0), ("b", 1), ("c", 2)]);
    }
}
