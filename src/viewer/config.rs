use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use terrain::{TerrainConfig, TerrainError};
use thiserror::Error;

pub const CONFIG_PATH: &str = "assets/terrain.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse viewer config ron: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error(transparent)]
    Bands(#[from] TerrainError),
}

#[derive(Resource, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub terrain: TerrainConfig,
    pub clear_color_srgb: (f32, f32, f32),
    pub sun_illuminance: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            clear_color_srgb: (0.60, 0.80, 0.95),
            sun_illuminance: 20_000.0,
        }
    }
}

impl ViewerConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = ron::from_str(text)?;
        if let Some(bands) = &config.terrain.color_bands {
            bands.validate()?;
        }
        Ok(config)
    }

    pub fn load_from_ron_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Loads `path`, logging and falling back to defaults on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load_from_ron_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("{e}; using default terrain settings");
                Self::default()
            }
        }
    }
}
