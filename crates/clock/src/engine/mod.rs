use std::f64::consts::PI;

pub mod layout;
pub mod model;
pub mod resolve;
pub mod rotation;
pub mod time;

pub use layout::{LayoutItem, compute_ring_layout};
pub use model::{ClockModel, RingCounts, WedgeRow};
pub use resolve::{ActiveEntities, ActiveIndices, FlatPentacle, TimeState, resolve_index};
pub use rotation::{RingRotations, fraction_to_rotation};
pub use time::{PlanetaryDay, TimeFractions};

pub const MS_PER_DAY: f64 = 86_400_000.0;
pub const EPOCH_YEAR: i32 = 2000;
pub const CELESTIAL_CYCLE_YEARS: f64 = 9.0;
pub const DAYS_PER_WEEK: f64 = 7.0;
pub const DEFAULT_CLOCK_FORMAT: &str = "%H:%M";
pub const ANCHOR_ANGLE: f64 = -PI / 2.0; // 12 o'clock, angles grow clockwise
