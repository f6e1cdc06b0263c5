use super::layout::{LayoutItem, compute_ring_layout};
use super::resolve::{
    ActiveEntities, ActiveIndices, FlatPentacle, TimeState, flatten_pentacles, resolve_index,
};
use super::rotation::RingRotations;
use super::time::{PlanetaryDay, clock_text, compute_fractions};
use crate::data::{
    CelestialSeal, ClockData, CoreInfo, PlanetaryGroup, Ring, SpiritSector, VisualParameters,
};
use chrono::{Datelike, NaiveDateTime};
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RingCounts {
    pub spirit: usize,
    pub planetary_groups: usize,
    pub celestial: usize,
    pub pentacles: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WedgeRow {
    pub index: usize,
    pub start_angle: f64,
    pub end_angle: f64,
    pub center_angle: f64,
    pub label: String,
}

/// The loaded clock laid out once, plus the derived cross-ring views the
/// per-frame path reads from.
#[derive(Debug, Clone)]
pub struct ClockModel {
    pub title: String,
    pub core: CoreInfo,
    pub visual: VisualParameters,
    pub spirit: Vec<LayoutItem<SpiritSector>>,
    pub planetary: Vec<LayoutItem<PlanetaryGroup>>,
    pub celestial: Vec<LayoutItem<CelestialSeal>>,
    pub pentacles: Vec<FlatPentacle>,
}

impl ClockModel {
    pub fn new(data: ClockData) -> Self {
        let layers = data.layers;
        let model = Self {
            title: data.title,
            core: layers.core,
            visual: data.visual_parameters,
            spirit: compute_ring_layout(&layers.spirit.sectors),
            planetary: compute_ring_layout(&layers.planetary.groups),
            celestial: compute_ring_layout(&layers.celestial.seals),
            pentacles: flatten_pentacles(&layers.planetary.groups),
        };

        log::info!(
            "Clock '{}' laid out: {} spirit sectors, {} planetary groups ({} pentacles), {} seals",
            model.title,
            model.spirit.len(),
            model.planetary.len(),
            model.pentacles.len(),
            model.celestial.len()
        );
        model
    }

    pub fn counts(&self) -> RingCounts {
        RingCounts {
            spirit: self.spirit.len(),
            planetary_groups: self.planetary.len(),
            celestial: self.celestial.len(),
            pentacles: self.pentacles.len(),
        }
    }

    /// Item descriptions and wedge angles for one ring.
    pub fn describe_ring(&self, ring: Ring) -> Vec<WedgeRow> {
        fn rows<T>(items: &[LayoutItem<T>], describe: fn(&T) -> String) -> Vec<WedgeRow> {
            items
                .iter()
                .map(|w| WedgeRow {
                    index: w.index,
                    start_angle: w.start_angle,
                    end_angle: w.end_angle,
                    center_angle: w.center_angle(),
                    label: describe(&w.item),
                })
                .collect()
        }

        match ring {
            Ring::Core => vec![WedgeRow {
                index: 0,
                start_angle: 0.0,
                end_angle: TAU,
                center_angle: 0.0,
                label: self.core.name.clone(),
            }],
            Ring::Celestial => rows(&self.celestial, CelestialSeal::describe),
            Ring::Planetary => rows(&self.planetary, PlanetaryGroup::describe),
            Ring::Spirit => rows(&self.spirit, SpiritSector::describe),
        }
    }

    /// Resolves the state of every ring at `now`.
    ///
    /// The pentacle selection follows the planetary week cycle across the
    /// flattened pentacle list, so it always moves in step with the planetary
    /// group selection rather than on a cycle of its own.
    pub fn time_state(&self, now: &NaiveDateTime, clock_format: &str) -> TimeState<'_> {
        let counts = self.counts();
        let fractions = compute_fractions(now, &counts);

        let indices = ActiveIndices {
            spirit: resolve_index(fractions.spirit, counts.spirit),
            planetary: resolve_index(fractions.planetary, counts.planetary_groups),
            celestial: resolve_index(fractions.celestial, counts.celestial),
            pentacle: resolve_index(fractions.planetary, counts.pentacles),
        };

        let active = ActiveEntities {
            spirit: indices.spirit.map(|i| &self.spirit[i].item),
            planetary: indices.planetary.map(|i| &self.planetary[i].item),
            celestial: indices.celestial.map(|i| &self.celestial[i].item),
            pentacle: indices.pentacle.map(|i| &self.pentacles[i]),
        };

        TimeState {
            fractions,
            indices,
            active,
            clock_text: clock_text(now, clock_format),
            day: PlanetaryDay::from_weekday(now.weekday()),
        }
    }

    pub fn rotations(&self, state: &TimeState<'_>) -> RingRotations {
        RingRotations::new(&state.fractions, &self.counts())
    }
}
