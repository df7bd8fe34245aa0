//! Session state and core simulation types
//!
//! Everything a render thread needs to copy between steps lives here.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::avatar::{AvatarState, DashTier, JumpKind};
use super::world::WorldSnapshot;

/// Something that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Jumped { kind: JumpKind },
    DashStarted { tier: DashTier },
    DashEnded,
    ClimbStarted,
    ClimbEnded,
    Died,
    Respawned,
    /// First touch of a checkpoint
    CheckpointActivated { index: usize },
    /// The avatar's respawn point moved to this checkpoint
    RespawnPointSet { index: usize },
    PickupConsumed { index: usize },
    PickupRecovered { index: usize },
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Obstacles; checkpoints and pickups mutate in place
    pub world: WorldSnapshot,
    pub avatar: AvatarState,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a session on `world`
    pub fn new(world: WorldSnapshot) -> Self {
        let spawn = initial_spawn(&world);
        log::info!("Session start: spawn at ({:.1}, {:.1})", spawn.x, spawn.y);
        Self {
            avatar: AvatarState::new(spawn),
            world,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Replace the world wholesale and restart the session
    pub fn reload(&mut self, world: WorldSnapshot) {
        log::info!("Reloading world: {}", world.summary());
        *self = Self::new(world);
    }

    /// Elapsed session time in seconds
    pub fn elapsed_seconds(&self) -> f64 {
        crate::ticks_to_seconds(self.time_ticks)
    }
}

/// Respawn point of the most recently activated checkpoint, else the world spawn
pub fn initial_spawn(world: &WorldSnapshot) -> DVec2 {
    world
        .latest_activated_checkpoint()
        .map(|(_, checkpoint)| checkpoint.respawn_point())
        .unwrap_or(world.spawn)
}
