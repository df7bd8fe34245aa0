//! Summit Dash - A 2D platformer movement engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (avatar state machine, collisions, world)
//! - `view`: Read-only render query surface
//! - `map`: JSON map loading
//! - `settings`: Key bindings and preferences

pub mod map;
pub mod settings;
pub mod sim;
pub mod view;

pub use settings::{Action, KeyBindings, Settings};

/// Game configuration constants
///
/// All movement values are per tick: the simulation uses fixed per-frame
/// increments, and `deltaTime` is measured in nominal frames.
pub mod consts {
    /// Nominal simulation rate
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Nominal deltaTime for one tick (one frame)
    pub const TICK_DT: f64 = 1.0;

    /// Avatar collision box
    pub const AVATAR_WIDTH: f64 = 30.0;
    pub const AVATAR_HEIGHT: f64 = 40.0;

    /// Downward acceleration per tick
    pub const GRAVITY: f64 = 0.5;
    /// Fast-fall acceleration (double gravity)
    pub const FAST_FALL_GRAVITY: f64 = 1.0;
    /// Initial vertical velocity of a jump (negative is up)
    pub const JUMP_STRENGTH: f64 = -12.0;
    /// Horizontal walking speed
    pub const MOVE_SPEED: f64 = 3.0;
    /// Ticks before another jump is allowed
    pub const JUMP_COOLDOWN_TICKS: u32 = 10;

    /// Dash
    pub const DASH_SPEED: f64 = 12.0;
    pub const DASH_DURATION_TICKS: u32 = 15;
    pub const MAX_DASH_CHARGES: u8 = 2;
    /// Fraction of dash velocity kept when the dash expires
    pub const DASH_EXIT_FACTOR: f64 = 0.5;
    /// Length of the rendered dash trail (pixels)
    pub const DASH_TRAIL_LENGTH: f64 = 20.0;

    /// Wall interaction
    pub const MAX_STAMINA: f64 = 100.0;
    pub const STAMINA_DRAIN_RATE: f64 = 0.4;
    pub const WALL_SLIDE_SPEED: f64 = 1.0;
    pub const CLIMB_SPEED: f64 = 2.0;
    /// Distance from a block face that still counts as touching it
    pub const WALL_CONTACT_TOLERANCE: f64 = 5.0;
    /// Feet this close to a block top count as resting on it
    pub const REST_TOLERANCE: f64 = 1e-6;
    /// Wall-kick: horizontal speed away from the wall
    pub const WALL_JUMP_HORIZONTAL: f64 = 2.0 * MOVE_SPEED;
    /// Wall-kick: vertical speed relative to a normal jump
    pub const WALL_JUMP_VERTICAL_FACTOR: f64 = 0.8;

    /// Death animation length before respawn (0.5s)
    pub const DEATH_ANIMATION_TICKS: u32 = 30;
    /// Blink period of the dead avatar
    pub const DEATH_BLINK_PERIOD: u32 = 4;

    /// Energy pickups
    pub const RECOVERY_TICKS: u32 = 120;
    pub const DEFAULT_PICKUP_SIZE: f64 = 20.0;

    /// World defaults
    pub const DEFAULT_GROUND_Y: f64 = 550.0;
    pub const DEFAULT_WORLD_WIDTH: f64 = 800.0;
    pub const DEFAULT_SPAWN_X: f64 = 100.0;
}

/// Convert a tick count to nominal seconds
#[inline]
pub fn ticks_to_seconds(ticks: u64) -> f64 {
    ticks as f64 / f64::from(consts::TICKS_PER_SECOND)
}
