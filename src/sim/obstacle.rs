//! Static obstacle variants
//!
//! Each obstacle is a rectangle plus kind-specific state. Platforms, solid
//! blocks and spikes are plain geometry; checkpoints latch activation and
//! energy pickups deplete and regenerate on a timer.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::*;

/// Obstacle kind tag (for errors, views and statistics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// One-way: only blocks from above
    Platform,
    /// Impassable from every side
    SolidBlock,
    /// Lethal on contact
    Spike,
    /// Trigger that commits a respawn point
    Checkpoint,
    /// Trigger that is consumed and regenerates
    EnergyPickup,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Platform,
        ObstacleKind::SolidBlock,
        ObstacleKind::Spike,
        ObstacleKind::Checkpoint,
        ObstacleKind::EnergyPickup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Platform => "platform",
            ObstacleKind::SolidBlock => "solid block",
            ObstacleKind::Spike => "spike",
            ObstacleKind::Checkpoint => "checkpoint",
            ObstacleKind::EnergyPickup => "energy pickup",
        }
    }
}

impl std::fmt::Display for ObstacleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-way platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
}

/// Fully impassable block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidBlock {
    pub rect: Rect,
}

/// Lethal zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub rect: Rect,
}

/// Respawn checkpoint
///
/// The rectangle is the activation box; the respawn point sits at
/// `rect.pos() + respawn_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub rect: Rect,
    respawn_offset: DVec2,
    activated: bool,
    default_activated: bool,
    /// Tick at which the checkpoint was activated during play
    activation_timestamp: Option<u64>,
}

impl Checkpoint {
    pub fn new(rect: Rect, respawn_offset: DVec2, default_activated: bool) -> Self {
        Self {
            rect,
            respawn_offset,
            activated: default_activated,
            default_activated,
            activation_timestamp: None,
        }
    }

    /// Where the avatar's top-left corner is placed on respawn
    pub fn respawn_point(&self) -> DVec2 {
        self.rect.pos() + self.respawn_offset
    }

    pub fn respawn_offset(&self) -> DVec2 {
        self.respawn_offset
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn is_default_activated(&self) -> bool {
        self.default_activated
    }

    pub fn activation_timestamp(&self) -> Option<u64> {
        self.activation_timestamp
    }

    /// Latch activation at `tick`
    ///
    /// Returns false (no state change) if the checkpoint is already active.
    pub fn activate(&mut self, tick: u64) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;
        self.activation_timestamp = Some(tick);
        true
    }
}

/// Consumable energy pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyPickup {
    pub rect: Rect,
    consumed: bool,
    /// Ticks elapsed since consumption (0 while available)
    recovery_timer: u32,
}

impl EnergyPickup {
    /// Square pickup with its top-left corner at (`x`, `y`)
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self {
            rect: Rect::new(x, y, size, size),
            consumed: false,
            recovery_timer: 0,
        }
    }

    pub fn with_default_size(x: f64, y: f64) -> Self {
        Self::new(x, y, DEFAULT_PICKUP_SIZE)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    pub fn recovery_timer(&self) -> u32 {
        self.recovery_timer
    }

    /// Consume the pickup
    ///
    /// Returns false (no state change) if it is already consumed.
    pub fn consume(&mut self) -> bool {
        if self.consumed {
            return false;
        }
        self.consumed = true;
        self.recovery_timer = 0;
        true
    }

    /// Advance the recovery timer by one tick
    ///
    /// Returns true on the tick the pickup becomes available again.
    pub fn tick_recovery(&mut self) -> bool {
        if !self.consumed {
            return false;
        }
        self.recovery_timer += 1;
        if self.recovery_timer >= RECOVERY_TICKS {
            self.consumed = false;
            self.recovery_timer = 0;
            return true;
        }
        false
    }

    /// Recovery progress in [0, 1] (1.0 when available)
    pub fn recovery_progress(&self) -> f64 {
        if !self.consumed {
            return 1.0;
        }
        f64::from(self.recovery_timer) / f64::from(RECOVERY_TICKS)
    }
}

/// A single obstacle of any kind (builder input)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    Platform(Platform),
    SolidBlock(SolidBlock),
    Spike(Spike),
    Checkpoint(Checkpoint),
    EnergyPickup(EnergyPickup),
}

impl Obstacle {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            Obstacle::Platform(_) => ObstacleKind::Platform,
            Obstacle::SolidBlock(_) => ObstacleKind::SolidBlock,
            Obstacle::Spike(_) => ObstacleKind::Spike,
            Obstacle::Checkpoint(_) => ObstacleKind::Checkpoint,
            Obstacle::EnergyPickup(_) => ObstacleKind::EnergyPickup,
        }
    }

    pub fn rect(&self) -> &Rect {
        match self {
            Obstacle::Platform(p) => &p.rect,
            Obstacle::SolidBlock(b) => &b.rect,
            Obstacle::Spike(s) => &s.rect,
            Obstacle::Checkpoint(c) => &c.rect,
            Obstacle::EnergyPickup(e) => &e.rect,
        }
    }
}
