//! JSON map loading
//!
//! Maps are authored as camelCase JSON (one array per obstacle kind) and
//! validated through `WorldBuilder`, so a loaded map is always a
//! well-formed `WorldSnapshot`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{WorldBuildError, WorldBuilder, WorldSnapshot};

/// Map loading errors
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid map JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid map geometry: {0}")]
    Build(#[from] WorldBuildError),
}

/// Plain rectangle entry (platforms, solid blocks, spikes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Free-form author note, ignored by the simulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub respawn_offset_x: f64,
    pub respawn_offset_y: f64,
    #[serde(default)]
    pub default_activated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyBeanData {
    pub x: f64,
    pub y: f64,
    /// Side length; defaults to `DEFAULT_PICKUP_SIZE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

/// On-disk map description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_width: Option<f64>,
    #[serde(default)]
    pub platforms: Vec<ElementData>,
    #[serde(default)]
    pub solid_blocks: Vec<ElementData>,
    #[serde(default)]
    pub spikes: Vec<ElementData>,
    #[serde(default)]
    pub checkpoints: Vec<CheckpointData>,
    #[serde(default)]
    pub energy_beans: Vec<EnergyBeanData>,
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, MapLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build and validate the world described by this map
    pub fn to_world(&self) -> Result<WorldSnapshot, WorldBuildError> {
        let mut builder = WorldBuilder::new();
        if let Some(ground_y) = self.ground_y {
            builder = builder.ground_y(ground_y);
        }
        if let Some(width) = self.world_width {
            builder = builder.world_width(width);
        }
        for p in &self.platforms {
            builder = builder.platform(p.x, p.y, p.width, p.height);
        }
        for b in &self.solid_blocks {
            builder = builder.solid_block(b.x, b.y, b.width, b.height);
        }
        for s in &self.spikes {
            builder = builder.spike(s.x, s.y, s.width, s.height);
        }
        for c in &self.checkpoints {
            builder = builder.checkpoint(
                c.x,
                c.y,
                c.width,
                c.height,
                c.respawn_offset_x,
                c.respawn_offset_y,
                c.default_activated,
            );
        }
        for bean in &self.energy_beans {
            let size = bean.size.unwrap_or(crate::consts::DEFAULT_PICKUP_SIZE);
            builder = builder.energy_pickup(bean.x, bean.y, size);
        }
        builder.build()
    }

    /// "name - description" line for logs and menus
    pub fn info(&self) -> String {
        format!("Map: {} - {}", self.name, self.description)
    }
}

/// Parse and validate a map from JSON text
pub fn parse_map(json: &str) -> Result<WorldSnapshot, MapLoadError> {
    Ok(MapConfig::from_json(json)?.to_world()?)
}

pub fn read_map_config(path: impl AsRef<Path>) -> Result<MapConfig, MapLoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| MapLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    MapConfig::from_json(&json)
}

/// Load a map file
pub fn load_map(path: impl AsRef<Path>) -> Result<WorldSnapshot, MapLoadError> {
    let path = path.as_ref();
    let config = read_map_config(path)?;
    let world = config.to_world()?;
    log::info!("Loaded {} from {}: {}", config.info(), path.display(), world.summary());
    Ok(world)
}

/// Load a map file, falling back to an empty world on any error
pub fn load_map_or_empty(path: impl AsRef<Path>) -> WorldSnapshot {
    match load_map(path) {
        Ok(world) => world,
        Err(e) => {
            log::warn!("Failed to load map: {}", e);
            log::warn!("Using empty map");
            WorldSnapshot::empty()
        }
    }
}
