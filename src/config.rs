//! Settings loading.
//! Reads airq-compare.toml from the current directory or the path in the
//! AIRQ_COMPARE_CONFIG env var. A missing file means defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::grade::Thresholds;
use crate::data::loader::ColumnSelector;

pub const CONFIG_ENV: &str = "AIRQ_COMPARE_CONFIG";
const DEFAULT_PATH: &str = "airq-compare.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub grading: Thresholds,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_value_column")]
    pub value_column: usize,
    /// Takes precedence over `value_column` when set.
    #[serde(default)]
    pub value_column_name: Option<String>,
    #[serde(default = "default_pollutant")]
    pub pollutant: String,
}

fn default_value_column() -> usize { 1 }
fn default_pollutant() -> String { "PM2.5".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            value_column: default_value_column(),
            value_column_name: None,
            pollutant: default_pollutant(),
        }
    }
}

impl InputConfig {
    pub fn selector(&self) -> ColumnSelector {
        match &self.value_column_name {
            Some(name) if !name.trim().is_empty() => ColumnSelector::Named(name.clone()),
            _ => ColumnSelector::Position(self.value_column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize { 16 }

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { capacity: default_capacity() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 { 1200.0 }
fn default_height() -> f32 { 800.0 }

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Settings {
    /// Load from `$AIRQ_COMPARE_CONFIG`, falling back to `./airq-compare.toml`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
