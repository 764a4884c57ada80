use crate::layout::LegGeometry;
use derive_more::{Display, From, Into};
use strum::{Display as StrumDisplay, EnumIter};

/// Monotonic counter distinguishing successive fan-outs of one controller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From, Into,
)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Click-forwarding token handed to the host for one leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{generation}:{index}")]
pub struct LegId {
    pub generation: Generation,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum LegPhase {
    Created,
    Entering,
    Idle,
    Exiting,
}

impl LegPhase {
    /// Whether the proxy is attached to the host surface. Unmounted legs are
    /// dropped, so there is no phase for them.
    pub fn is_mounted(&self) -> bool {
        !matches!(self, Self::Created)
    }
}

/// One fanned-out item. The proxy handle is only touched by the controller.
#[derive(Debug)]
pub struct Leg<T, H> {
    pub(crate) id: LegId,
    pub(crate) item: T,
    pub(crate) geometry: LegGeometry,
    pub(crate) proxy: H,
    pub(crate) phase: LegPhase,
}

impl<T, H> Leg<T, H> {
    pub fn id(&self) -> LegId {
        self.id
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn geometry(&self) -> &LegGeometry {
        &self.geometry
    }

    pub fn proxy(&self) -> &H {
        &self.proxy
    }

    /// Mutable access for `initialize_leg` decorations (extra content on the
    /// proxy). Membership and placement stay with the controller.
    pub fn proxy_mut(&mut self) -> &mut H {
        &mut self.proxy
    }

    pub fn phase(&self) -> LegPhase {
        self.phase
    }

    pub fn into_item(self) -> T {
        self.item
    }
}

/// Legs sharing one anchor and one generation, in layout order.
#[derive(Debug)]
pub struct FanOutSet<T, H, A> {
    pub(crate) generation: Generation,
    pub(crate) anchor: A,
    pub(crate) legs: Vec<Leg<T, H>>,
}

impl<T, H, A> FanOutSet<T, H, A> {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn anchor(&self) -> &A {
        &self.anchor
    }

    pub fn legs(&self) -> &[Leg<T, H>] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn get(&self, id: LegId) -> Option<&Leg<T, H>> {
        (id.generation == self.generation)
            .then(|| self.legs.get(id.index))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_attached_phases_are_mounted() {
        let mounted: Vec<_> = LegPhase::iter().filter(LegPhase::is_mounted).collect();
        assert_eq!(
            mounted,
            vec![LegPhase::Entering, LegPhase::Idle, LegPhase::Exiting]
        );
    }

    #[test]
    fn test_leg_id_display() {
        let id = LegId {
            generation: Generation::from(3).next(),
            index: 2,
        };
        assert_eq!(id.to_string(), "4:2");
    }
}
