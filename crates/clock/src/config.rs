use crate::engine::DEFAULT_CLOCK_FORMAT;
use directories::ProjectDirs;
use psalter::service::{DEFAULT_BOOK, DEFAULT_ENDPOINT, DEFAULT_TRANSLATION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataPaths {
    pub clock: PathBuf,
    pub psalms: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            clock: PathBuf::from("data/solomonic_clock_full.json"),
            psalms: PathBuf::from("data/pentacle_psalms.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub endpoint: String,
    pub book: String,
    pub translation: String,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            book: DEFAULT_BOOK.to_string(),
            translation: DEFAULT_TRANSLATION.to_string(),
            timeout_secs: 10,
        }
    }
}

impl ServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub frame_interval_ms: u64,
    pub clock_format: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            clock_format: DEFAULT_CLOCK_FORMAT.to_string(),
        }
    }
}

impl DisplaySettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    pub data: DataPaths,
    pub service: ServiceSettings,
    pub display: DisplaySettings,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "solomonic", "solomonic-clock")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => get_config_path(),
    }
}

/// Reads the TOML file (optional) and overlays `SOLOMONIC__SECTION__KEY`
/// environment variables.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let config_path = resolve_path(path)?;

    let s = config::Config::builder()
        .add_source(
            config::File::from(config_path)
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("SOLOMONIC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_default(path: Option<&Path>) -> Settings {
    match load_settings(path) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        }
    }
}

pub fn write_default_config(path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = resolve_path(path).map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
