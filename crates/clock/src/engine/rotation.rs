use super::ANCHOR_ANGLE;
use super::layout::angle_step;
use super::model::RingCounts;
use super::time::TimeFractions;
use std::f64::consts::TAU;

/// Rotation, in radians, that brings the wedge under `fraction` to the anchor.
///
/// The half-wedge term centers the active wedge on the anchor rather than its
/// leading edge. An empty ring sits at the bare anchor.
pub fn fraction_to_rotation(fraction: f64, count: usize) -> f64 {
    match angle_step(count) {
        Some(step) => -(fraction * TAU) + ANCHOR_ANGLE + step / 2.0,
        None => ANCHOR_ANGLE,
    }
}

/// Whole-ring rotations for the three turning rings, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RingRotations {
    pub spirit: f64,
    pub planetary: f64,
    pub celestial: f64,
}

impl RingRotations {
    pub fn new(fractions: &TimeFractions, counts: &RingCounts) -> Self {
        Self {
            spirit: fraction_to_rotation(fractions.spirit, counts.spirit),
            planetary: fraction_to_rotation(fractions.planetary, counts.planetary_groups),
            celestial: fraction_to_rotation(fractions.celestial, counts.celestial),
        }
    }

    pub fn to_degrees(self) -> Self {
        Self {
            spirit: self.spirit.to_degrees(),
            planetary: self.planetary.to_degrees(),
            celestial: self.celestial.to_degrees(),
        }
    }
}
