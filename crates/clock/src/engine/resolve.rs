use super::time::{PlanetaryDay, TimeFractions};
use crate::data::{CelestialSeal, Pentacle, PentacleKey, PlanetaryGroup, SpiritSector};

/// Maps a cycle position onto one of `count` wedges.
///
/// A fraction landing exactly on a wedge boundary selects the wedge that
/// starts there. An empty ring has no selection.
pub fn resolve_index(fraction: f64, count: usize) -> Option<usize> {
    (count > 0).then(|| (fraction * count as f64).floor() as usize % count)
}

/// A pentacle seen through the flattened cross-ring list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatPentacle {
    pub group_index: usize,
    pub pentacle_index: usize,
    pub planet: String,
    pub pentacle: Pentacle,
}

impl FlatPentacle {
    pub fn key(&self) -> PentacleKey {
        PentacleKey::new(&self.planet, self.pentacle.index)
    }

    pub fn title(&self) -> String {
        format!("Pentacle of {} #{}", self.planet, self.pentacle.index)
    }

    pub fn summary(&self) -> String {
        format!("{}: {}", self.title(), self.pentacle.focus)
    }
}

pub fn flatten_pentacles(groups: &[PlanetaryGroup]) -> Vec<FlatPentacle> {
    groups
        .iter()
        .enumerate()
        .flat_map(|(group_index, group)| {
            group
                .pentacles
                .iter()
                .enumerate()
                .map(move |(pentacle_index, pentacle)| FlatPentacle {
                    group_index,
                    pentacle_index,
                    planet: group.name.clone(),
                    pentacle: pentacle.clone(),
                })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveIndices {
    pub spirit: Option<usize>,
    pub planetary: Option<usize>,
    pub celestial: Option<usize>,
    pub pentacle: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActiveEntities<'a> {
    pub spirit: Option<&'a SpiritSector>,
    pub planetary: Option<&'a PlanetaryGroup>,
    pub celestial: Option<&'a CelestialSeal>,
    pub pentacle: Option<&'a FlatPentacle>,
}

/// Everything derived from one instant. Built per frame and dropped after use.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeState<'a> {
    pub fractions: TimeFractions,
    pub indices: ActiveIndices,
    pub active: ActiveEntities<'a>,
    pub clock_text: String,
    pub day: PlanetaryDay,
}

impl TimeState<'_> {
    /// `Wednesday – Mercury • 07:05`
    pub fn day_label(&self) -> String {
        format!("{} – {} • {}", self.day, self.day.ruler(), self.clock_text)
    }

    pub fn spirit_label(&self) -> String {
        self.active
            .spirit
            .map(SpiritSector::summary)
            .unwrap_or_default()
    }

    pub fn pentacle_label(&self) -> String {
        self.active
            .pentacle
            .map(FlatPentacle::summary)
            .unwrap_or_default()
    }
}
