//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (insertion order per obstacle kind)
//! - No rendering, input-device or file dependencies

pub mod avatar;
pub mod collision;
pub mod obstacle;
pub mod rect;
pub mod state;
pub mod tick;
pub mod world;

pub use avatar::{AvatarState, DashTier, Direction, JumpKind, Mode, StepReport};
pub use collision::{ContactFlags, Resolution, resolve, wall_contact};
pub use obstacle::{Checkpoint, EnergyPickup, Obstacle, ObstacleKind, Platform, SolidBlock, Spike};
pub use rect::{Rect, overlaps};
pub use state::{GameEvent, GameState};
pub use tick::{TickInput, tick};
pub use world::{WorldBounds, WorldBuildError, WorldBuilder, WorldSnapshot};
