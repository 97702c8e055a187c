use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pico_engine::{Background, LoopConfig};
use serde::Deserialize;
use thiserror::Error;

pub(crate) const CONFIG_FILE_NAME: &str = "pico_planet.json";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk overrides. Every field is optional; absent fields keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameConfigFile {
    pub(crate) window_title: Option<String>,
    pub(crate) surface_width: Option<u32>,
    pub(crate) surface_height: Option<u32>,
    pub(crate) window_scale: Option<u32>,
    pub(crate) background: Option<Background>,
    /// `0` turns the cap off.
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) metrics_log_interval_ms: Option<u64>,
    pub(crate) ship_speed: Option<f32>,
    pub(crate) meteor_count: Option<u32>,
    pub(crate) meteor_speed: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Tuning {
    pub(crate) ship_speed: f32,
    pub(crate) meteor_count: u32,
    pub(crate) meteor_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ship_speed: 4.0,
            meteor_count: 6,
            meteor_speed: 2.0,
        }
    }
}

impl GameConfigFile {
    pub(crate) fn apply_to(&self, mut config: LoopConfig) -> LoopConfig {
        if let Some(title) = &self.window_title {
            config.window_title = title.clone();
        }
        if let Some(width) = self.surface_width {
            config.surface_width = width;
        }
        if let Some(height) = self.surface_height {
            config.surface_height = height;
        }
        if let Some(scale) = self.window_scale {
            config.window_scale = scale;
        }
        if let Some(background) = &self.background {
            config.background = background.clone();
        }
        if let Some(cap) = self.max_render_fps {
            config.max_render_fps = Some(cap);
        }
        if let Some(interval_ms) = self.metrics_log_interval_ms {
            config.metrics_log_interval = Duration::from_millis(interval_ms);
        }
        config
    }

    pub(crate) fn tuning(&self) -> Tuning {
        let defaults = Tuning::default();
        Tuning {
            ship_speed: self.ship_speed.unwrap_or(defaults.ship_speed),
            meteor_count: self.meteor_count.unwrap_or(defaults.meteor_count),
            meteor_speed: self.meteor_speed.unwrap_or(defaults.meteor_speed),
        }
    }
}

/// Reads the config file at `path`. A missing file is not an error.
pub(crate) fn load_config_file(path: &Path) -> Result<Option<GameConfigFile>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_config(&raw)
        .map(Some)
        .map_err(|(field, source)| ConfigError::Parse {
            path: path.to_path_buf(),
            field,
            source,
        })
}

fn parse_config(raw: &str) -> Result<GameConfigFile, (String, serde_json::Error)> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        (path, error.into_inner())
    })
}
