//! World snapshot and builder
//!
//! A `WorldSnapshot` is created once per map load and mutated in place for
//! checkpoint activation and pickup consumption. Construction goes through
//! `WorldBuilder`, which rejects malformed geometry instead of clamping it.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::obstacle::{
    Checkpoint, EnergyPickup, Obstacle, ObstacleKind, Platform, SolidBlock, Spike,
};
use super::rect::Rect;
use crate::consts::*;

/// Errors raised while building a world
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldBuildError {
    #[error("{kind} #{index} has negative size {width}x{height}")]
    InvalidDimensions {
        kind: ObstacleKind,
        index: usize,
        width: f64,
        height: f64,
    },
    #[error("{kind} #{index} has a non-finite {field}")]
    NonFinite {
        kind: ObstacleKind,
        index: usize,
        field: &'static str,
    },
    #[error("invalid world bounds: ground_y={ground_y}, width={width} (width must be at least {min_width})")]
    InvalidBounds {
        ground_y: f64,
        width: f64,
        min_width: f64,
    },
    #[error("spawn point ({x}, {y}) is not finite")]
    InvalidSpawn { x: f64, y: f64 },
}

/// Ground plane and horizontal extent of the world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Y of the ground surface (avatar bottom rests here)
    pub ground_y: f64,
    /// Avatar x is clamped to [0, width - AVATAR_WIDTH]
    pub width: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            ground_y: DEFAULT_GROUND_Y,
            width: DEFAULT_WORLD_WIDTH,
        }
    }
}

impl WorldBounds {
    fn default_spawn(&self) -> DVec2 {
        DVec2::new(DEFAULT_SPAWN_X, self.ground_y - AVATAR_HEIGHT)
    }
}

/// Static geometry of a loaded map, one ordered sequence per kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub bounds: WorldBounds,
    /// Initial spawn when no checkpoint is active
    pub spawn: DVec2,
    pub platforms: Vec<Platform>,
    pub solid_blocks: Vec<SolidBlock>,
    pub spikes: Vec<Spike>,
    pub checkpoints: Vec<Checkpoint>,
    pub pickups: Vec<EnergyPickup>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl WorldSnapshot {
    /// World with default bounds and no obstacles
    pub fn empty() -> Self {
        let bounds = WorldBounds::default();
        Self {
            bounds,
            spawn: bounds.default_spawn(),
            platforms: Vec::new(),
            solid_blocks: Vec::new(),
            spikes: Vec::new(),
            checkpoints: Vec::new(),
            pickups: Vec::new(),
        }
    }

    pub fn builder() -> WorldBuilder {
        WorldBuilder::new()
    }

    /// Number of obstacles of one kind
    pub fn count(&self, kind: ObstacleKind) -> usize {
        match kind {
            ObstacleKind::Platform => self.platforms.len(),
            ObstacleKind::SolidBlock => self.solid_blocks.len(),
            ObstacleKind::Spike => self.spikes.len(),
            ObstacleKind::Checkpoint => self.checkpoints.len(),
            ObstacleKind::EnergyPickup => self.pickups.len(),
        }
    }

    /// Total number of obstacles
    pub fn element_count(&self) -> usize {
        ObstacleKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    /// The most recently activated checkpoint
    ///
    /// Ordered by activation timestamp; checkpoints that are active only by
    /// default (no timestamp) rank oldest, and ties go to the later entry.
    pub fn latest_activated_checkpoint(&self) -> Option<(usize, &Checkpoint)> {
        self.checkpoints
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_activated())
            .max_by_key(|(i, c)| (c.activation_timestamp(), *i))
    }

    /// One-line statistics for logs
    pub fn summary(&self) -> String {
        format!(
            "{} platforms, {} solid blocks, {} spikes, {} checkpoints, {} pickups ({} total)",
            self.platforms.len(),
            self.solid_blocks.len(),
            self.spikes.len(),
            self.checkpoints.len(),
            self.pickups.len(),
            self.element_count()
        )
    }
}

/// Builder for `WorldSnapshot`
#[derive(Debug, Clone, Default)]
pub struct WorldBuilder {
    bounds: WorldBounds,
    spawn: Option<DVec2>,
    obstacles: Vec<Obstacle>,
}

impl WorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(mut self, bounds: WorldBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn ground_y(mut self, ground_y: f64) -> Self {
        self.bounds.ground_y = ground_y;
        self
    }

    pub fn world_width(mut self, width: f64) -> Self {
        self.bounds.width = width;
        self
    }

    /// Initial spawn (defaults to standing on the ground at x = 100)
    pub fn spawn(mut self, x: f64, y: f64) -> Self {
        self.spawn = Some(DVec2::new(x, y));
        self
    }

    pub fn platform(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.push(Obstacle::Platform(Platform {
            rect: Rect::new(x, y, width, height),
        }));
        self
    }

    pub fn solid_block(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.push(Obstacle::SolidBlock(SolidBlock {
            rect: Rect::new(x, y, width, height),
        }));
        self
    }

    pub fn spike(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.push(Obstacle::Spike(Spike {
            rect: Rect::new(x, y, width, height),
        }));
        self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn checkpoint(
        mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        respawn_offset_x: f64,
        respawn_offset_y: f64,
        default_activated: bool,
    ) -> Self {
        self.push(Obstacle::Checkpoint(Checkpoint::new(
            Rect::new(x, y, width, height),
            DVec2::new(respawn_offset_x, respawn_offset_y),
            default_activated,
        )));
        self
    }

    pub fn energy_pickup(mut self, x: f64, y: f64, size: f64) -> Self {
        self.push(Obstacle::EnergyPickup(EnergyPickup::new(x, y, size)));
        self
    }

    /// Append any obstacle (insertion order is kept per kind)
    pub fn push(&mut self, obstacle: Obstacle) -> &mut Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Validate everything and produce the snapshot
    pub fn build(self) -> Result<WorldSnapshot, WorldBuildError> {
        let bounds = self.bounds;
        if !bounds.ground_y.is_finite() || !bounds.width.is_finite() || bounds.width < AVATAR_WIDTH {
            return Err(WorldBuildError::InvalidBounds {
                ground_y: bounds.ground_y,
                width: bounds.width,
                min_width: AVATAR_WIDTH,
            });
        }

        let spawn = self.spawn.unwrap_or_else(|| bounds.default_spawn());
        if !spawn.is_finite() {
            return Err(WorldBuildError::InvalidSpawn {
                x: spawn.x,
                y: spawn.y,
            });
        }

        let mut world = WorldSnapshot {
            bounds,
            spawn,
            ..WorldSnapshot::empty()
        };

        for obstacle in self.obstacles {
            let kind = obstacle.kind();
            let index = world.count(kind);
            validate(&obstacle, kind, index)?;
            match obstacle {
                Obstacle::Platform(p) => world.platforms.push(p),
                Obstacle::SolidBlock(b) => world.solid_blocks.push(b),
                Obstacle::Spike(s) => world.spikes.push(s),
                Obstacle::Checkpoint(c) => world.checkpoints.push(c),
                Obstacle::EnergyPickup(e) => world.pickups.push(e),
            }
        }

        Ok(world)
    }
}

fn validate(obstacle: &Obstacle, kind: ObstacleKind, index: usize) -> Result<(), WorldBuildError> {
    let rect = obstacle.rect();
    if !rect.is_finite() {
        return Err(WorldBuildError::NonFinite {
            kind,
            index,
            field: "rectangle",
        });
    }
    if rect.width < 0.0 || rect.height < 0.0 {
        return Err(WorldBuildError::InvalidDimensions {
            kind,
            index,
            width: rect.width,
            height: rect.height,
        });
    }
    if let Obstacle::Checkpoint(c) = obstacle
        && !c.respawn_offset().is_finite()
    {
        return Err(WorldBuildError::NonFinite {
            kind,
            index,
            field: "respawn offset",
        });
    }
    Ok(())
}
