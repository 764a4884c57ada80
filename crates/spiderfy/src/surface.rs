use crate::leg::LegId;
use palette::Srgba;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Pixel offset relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_polar(length: f64, angle: f64) -> Self {
        Self::new(length * angle.cos(), length * angle.sin())
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Animation state of a proxy. The string forms are the marker classes hosts
/// attach to the proxy element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum VisualState {
    #[strum(serialize = "initial")]
    Entering,
    #[strum(serialize = "settled")]
    Settled,
    #[strum(serialize = "exit")]
    Exiting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinStyle {
    pub fill: Srgba<f64>,
    pub stroke: Srgba<f64>,
    pub diameter: f64,
}

impl PinStyle {
    pub const CLASS_NAME: &'static str = "default-spider-pin";
}

impl Default for PinStyle {
    fn default() -> Self {
        Self {
            fill: Srgba::new(0.2, 0.47, 0.85, 1.0),
            stroke: Srgba::new(1.0, 1.0, 1.0, 0.9),
            diameter: 14.0,
        }
    }
}

/// What the host should draw for a leg's pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProxyVisual {
    /// The core's built-in marker.
    Default(PinStyle),
    /// The host (usually through `initialize_leg`) decorates the proxy itself.
    Custom,
}

impl ProxyVisual {
    pub fn from_settings(use_custom: bool) -> Self {
        if use_custom {
            Self::Custom
        } else {
            Self::Default(PinStyle::default())
        }
    }

    pub fn class_names(&self) -> Vec<&'static str> {
        match self {
            Self::Default(_) => vec!["spider-leg-pin", PinStyle::CLASS_NAME],
            Self::Custom => vec!["spider-leg-pin"],
        }
    }
}

/// The host rendering surface. The core creates, positions and removes proxies
/// only through this trait and never touches a handle's internals.
pub trait ProxySurface {
    type Handle;
    type Anchor;
    type Event;
    type Error: std::error::Error + 'static;

    fn create_proxy(
        &mut self,
        offset: Point,
        visual: &ProxyVisual,
        state: VisualState,
    ) -> Result<Self::Handle, Self::Error>;

    /// Mounts the proxy so it renders at `anchor` plus its creation offset.
    fn attach_to_anchor(
        &mut self,
        handle: &mut Self::Handle,
        anchor: &Self::Anchor,
    ) -> Result<(), Self::Error>;

    fn remove_proxy(&mut self, handle: Self::Handle) -> Result<(), Self::Error>;

    /// Interactions on the proxy must be routed back through
    /// [`crate::Spiderfier::dispatch_click`] with this id.
    fn set_click_handler(
        &mut self,
        handle: &mut Self::Handle,
        leg: LegId,
    ) -> Result<(), Self::Error>;

    fn set_visual_state(
        &mut self,
        handle: &mut Self::Handle,
        state: VisualState,
        delay: Duration,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_visual_state_class_names() {
        assert_eq!(VisualState::Entering.to_string(), "initial");
        assert_eq!(VisualState::Exiting.to_string(), "exit");
        assert_eq!(VisualState::from_str("SETTLED").unwrap(), VisualState::Settled);
    }

    #[test]
    fn test_default_visual_carries_pin_class() {
        assert!(
            ProxyVisual::from_settings(false)
                .class_names()
                .contains(&PinStyle::CLASS_NAME)
        );
        assert_eq!(ProxyVisual::from_settings(true), ProxyVisual::Custom);
    }
}
