//! Radial "spider" fan-out of overlapping markers.
//!
//! [`compute_layout`] places N legs on a ring or, past a threshold, on an
//! outward spiral. [`Spiderfier`] mounts one proxy per leg on a host
//! [`ProxySurface`], animates fan-outs in and out, and keeps at most one
//! fan-out active at a time.

pub mod config;
pub mod controller;
pub mod layout;
pub mod leg;
pub mod registry;
pub mod runtime;
pub mod surface;
pub mod timeline;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, Settings, SpiderOptions};
pub use controller::{EXIT_GRACE, Hooks, SpiderError, Spiderfier, stagger_delay};
pub use layout::{LayoutError, LayoutMode, LegCount, LegGeometry, compute_layout};
pub use leg::{FanOutSet, Generation, Leg, LegId, LegPhase};
pub use surface::{PinStyle, Point, ProxySurface, ProxyVisual, VisualState};
