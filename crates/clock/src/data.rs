use derive_more::Display;
use fs_err as fs;
use palette::Srgb;
use psalter::Citation;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DeserializeFromStr, serde_as};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Ring {
    Core,
    Celestial,
    Planetary,
    Spirit,
}

/// Per-ring values of the visual parameters block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RingValues<T> {
    pub core: T,
    pub celestial: T,
    pub planetary: T,
    pub spirit: T,
}

impl<T> RingValues<T> {
    pub fn get(&self, ring: Ring) -> &T {
        match ring {
            Ring::Core => &self.core,
            Ring::Celestial => &self.celestial,
            Ring::Planetary => &self.planetary,
            Ring::Spirit => &self.spirit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeFromStr)]
pub struct HexColor(pub Srgb<u8>);

impl FromStr for HexColor {
    type Err = palette::rgb::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::<u8>::from_str(s.trim()).map(Self)
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0.red, self.0.green, self.0.blue)
    }
}

/// Consumed only by whatever paints the dial.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisualParameters {
    pub radius: RingValues<f64>,
    pub color_scheme: RingValues<HexColor>,
    #[serde(default)]
    pub rotation_speed: Option<RingValues<f64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoreInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CelestialSeal {
    #[serde(default)]
    pub order: u32,
    pub name: String,
    #[serde(default)]
    pub virtue: String,
    #[serde(default)]
    pub element: String,
}

impl CelestialSeal {
    pub fn describe(&self) -> String {
        format!("{} – {}", self.name, self.virtue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pentacle {
    pub index: u32,
    #[serde(default)]
    pub focus: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlanetaryGroup {
    pub name: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub pentacles: Vec<Pentacle>,
}

impl PlanetaryGroup {
    pub fn describe(&self) -> String {
        format!(
            "{} – {} ({} seals)",
            self.name,
            self.day,
            self.pentacles.len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpiritSector {
    #[serde(default)]
    pub sector: u32,
    pub zodiac: String,
    pub degrees: String,
    pub spirit: String,
    #[serde(default)]
    pub rank: String,
}

impl SpiritSector {
    pub fn describe(&self) -> String {
        format!(
            "{} {} – {} ({})",
            self.zodiac, self.degrees, self.spirit, self.rank
        )
    }

    pub fn summary(&self) -> String {
        format!("{} {} • {}", self.zodiac, self.degrees, self.spirit)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CelestialLayer {
    #[serde(default)]
    pub seals: Vec<CelestialSeal>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlanetaryLayer {
    #[serde(default)]
    pub groups: Vec<PlanetaryGroup>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpiritLayer {
    #[serde(default)]
    pub sectors: Vec<SpiritSector>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Layers {
    pub core: CoreInfo,
    pub celestial: CelestialLayer,
    pub planetary: PlanetaryLayer,
    pub spirit: SpiritLayer,
}

/// The static clock document: ring contents plus drawing parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClockData {
    #[serde(default)]
    pub title: String,
    pub visual_parameters: VisualParameters,
    pub layers: Layers,
}

/// Identity of a pentacle across both documents, rendered `saturn-3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
#[display("{planet}-{index}")]
pub struct PentacleKey {
    planet: String,
    index: u32,
}

impl PentacleKey {
    pub fn new(planet: &str, index: u32) -> Self {
        Self {
            planet: planet.to_lowercase(),
            index,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PsalmMetadata {
    #[serde(default)]
    pub psalm_numbering: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct PentaclePsalms {
    #[serde(default)]
    pub planet: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub pentacle: Option<u32>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub psalms: Vec<Citation>,
}

/// The verse-annotation document.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PsalmDocument {
    #[serde(default)]
    pub metadata: PsalmMetadata,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub pentacles: Vec<PentaclePsalms>,
}

#[derive(Debug, Clone, Default)]
pub struct PsalmMap {
    citations: HashMap<PentacleKey, Vec<Citation>>,
    pub numbering: Option<String>,
}

impl PsalmMap {
    /// Records without a planet or a numeric pentacle are skipped.
    pub fn from_document(document: PsalmDocument) -> Self {
        let citations = document
            .pentacles
            .into_iter()
            .filter_map(|record| {
                let planet = record.planet.filter(|p| !p.is_empty())?;
                let index = record.pentacle?;
                Some((PentacleKey::new(&planet, index), record.psalms))
            })
            .collect();

        Self {
            citations,
            numbering: document.metadata.psalm_numbering,
        }
    }

    pub fn get(&self, key: &PentacleKey) -> &[Citation] {
        self.citations.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| DataError::Json {
        path: path.display().to_string(),
        source,
    })
}

pub fn load_clock_data(path: &Path) -> Result<ClockData, DataError> {
    read_json(path)
}

pub fn load_psalm_map(path: &Path) -> Result<PsalmMap, DataError> {
    read_json(path).map(PsalmMap::from_document)
}
