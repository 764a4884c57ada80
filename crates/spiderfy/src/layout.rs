use crate::config::Settings;
use crate::surface::Point;
use derive_more::{Display, From, Into};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Per-index angular nudge that keeps successive spiral loops from lining up.
const SPIRAL_INDEX_DRIFT: f64 = 0.0005;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Leg count must not be negative, got {0}")]
    NegativeCount(i64),
    #[error("Leg count must be a finite whole number, got {0}")]
    NonFiniteCount(f64),
}

/// Number of legs to lay out, validated from dynamic input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, From, Into)]
pub struct LegCount(usize);

impl TryFrom<i64> for LegCount {
    type Error = LayoutError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .map(LegCount)
            .map_err(|_| LayoutError::NegativeCount(value))
    }
}

impl TryFrom<f64> for LegCount {
    type Error = LayoutError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(LayoutError::NonFiniteCount(value));
        }
        if value < 0.0 {
            return Err(LayoutError::NegativeCount(value as i64));
        }
        Ok(LegCount(value as usize))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Circle,
    Spiral,
}

impl LayoutMode {
    /// Hard switch at the threshold; the shape changes discontinuously there.
    pub fn for_count(count: usize, settings: &Settings) -> Self {
        if count >= settings.circle_to_spiral_threshold {
            Self::Spiral
        } else {
            Self::Circle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegGeometry {
    offset: Point,
    angle: f64,
    leg_length: f64,
    index: usize,
}

impl LegGeometry {
    fn new(index: usize, angle: f64, leg_length: f64) -> Self {
        Self {
            offset: Point::from_polar(leg_length, angle),
            angle,
            leg_length,
            index,
        }
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Radians from the +x axis.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn leg_length(&self) -> f64 {
        self.leg_length
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Rotation for a leg line drawn downwards from the anchor.
    pub fn line_rotation(&self) -> f64 {
        self.angle - FRAC_PI_2
    }

    pub fn line_length(&self) -> f64 {
        self.leg_length
    }
}

pub fn compute_layout(count: usize, settings: &Settings) -> Vec<LegGeometry> {
    match LayoutMode::for_count(count, settings) {
        LayoutMode::Spiral => spiral(count, settings),
        LayoutMode::Circle => circle(count, settings),
    }
}

fn circle(count: usize, settings: &Settings) -> Vec<LegGeometry> {
    if count == 0 {
        return Vec::new();
    }
    // two extra feet of circumference keep neighbouring pins apart
    let circumference = settings.circle_foot_separation * (count + 2) as f64;
    let leg_length = circumference / TAU;
    let angle_step = TAU / count as f64;

    (0..count)
        .map(|index| LegGeometry::new(index, index as f64 * angle_step, leg_length))
        .collect()
}

fn spiral(count: usize, settings: &Settings) -> Vec<LegGeometry> {
    let mut leg_length = settings.spiral_length_start;
    let mut angle = 0.0;

    (0..count)
        .map(|index| {
            angle += settings.spiral_foot_separation / leg_length
                + index as f64 * SPIRAL_INDEX_DRIFT;
            let geometry = LegGeometry::new(index, angle, leg_length);
            leg_length += (TAU * settings.spiral_length_growth) / angle;
            geometry
        })
        .collect()
}
