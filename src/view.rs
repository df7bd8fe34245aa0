//! Read-only render query surface
//!
//! Flattens a `GameState` into plain values a renderer can draw without
//! touching simulation internals. Building a `FrameView` copies everything,
//! so a render thread can hold it across ticks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{AvatarState, DashTier, GameState, Mode, ObstacleKind, Rect, WorldSnapshot};

/// How to draw the avatar body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawStyle {
    /// Head colored by the charges currently held
    Normal { head: DashTier },
    /// Colored by the charges held before the dash, with a trail behind
    Dashing { tier: DashTier, trail_offset: DVec2 },
    /// Blinking death animation
    Dead { visible: bool },
}

/// Stamina bar color class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaminaLevel {
    High,
    Medium,
    Low,
}

impl StaminaLevel {
    pub fn from_stamina(stamina: f64) -> Self {
        if stamina > 50.0 {
            StaminaLevel::High
        } else if stamina > 25.0 {
            StaminaLevel::Medium
        } else {
            StaminaLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaminaBar {
    /// Fill in [0, 1]
    pub fraction: f64,
    pub level: StaminaLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvatarView {
    /// Collision box
    pub rect: Rect,
    pub style: DrawStyle,
    pub fast_falling: bool,
    /// Shown while touching a wall or climbing
    pub stamina_bar: Option<StaminaBar>,
}

impl AvatarView {
    pub fn from_avatar(avatar: &AvatarState) -> Self {
        let style = match avatar.mode() {
            Mode::Dead { ticks_left } => {
                let elapsed = DEATH_ANIMATION_TICKS.saturating_sub(ticks_left);
                DrawStyle::Dead {
                    visible: elapsed % DEATH_BLINK_PERIOD < DEATH_BLINK_PERIOD / 2,
                }
            }
            Mode::Dashing { dash_vel, tier, .. } => DrawStyle::Dashing {
                tier,
                trail_offset: -dash_vel * DASH_TRAIL_LENGTH / DASH_SPEED,
            },
            Mode::Normal { .. } | Mode::Climbing => DrawStyle::Normal {
                head: DashTier::from_charges(avatar.dash_charges()),
            },
        };

        let stamina_bar = (avatar.wall_contact().is_some() || avatar.is_climbing()).then(|| StaminaBar {
            fraction: avatar.stamina() / MAX_STAMINA,
            level: StaminaLevel::from_stamina(avatar.stamina()),
        });

        Self {
            rect: avatar.rect(),
            style,
            fast_falling: avatar.is_fast_falling(),
            stamina_bar,
        }
    }

    /// Body rectangle to fill: half width and centered while fast-falling
    pub fn body_rect(&self) -> Rect {
        if !self.fast_falling {
            return self.rect;
        }
        let width = self.rect.width / 2.0;
        Rect::new(self.rect.x + width / 2.0, self.rect.y, width, self.rect.height)
    }
}

/// Kind-specific visible state of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleState {
    Plain,
    Checkpoint { activated: bool, respawn_point: DVec2 },
    /// `recovery_progress` is in [0, 1], 1.0 while available
    Pickup { consumed: bool, recovery_progress: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub kind: ObstacleKind,
    pub rect: Rect,
    pub state: ObstacleState,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub tick: u64,
    pub ground_y: f64,
    pub world_width: f64,
    pub avatar: AvatarView,
    /// Draw order: platforms, solid blocks, spikes, checkpoints, pickups
    pub obstacles: Vec<ObstacleView>,
}

impl FrameView {
    pub fn capture(state: &GameState) -> Self {
        Self {
            tick: state.time_ticks,
            ground_y: state.world.bounds.ground_y,
            world_width: state.world.bounds.width,
            avatar: AvatarView::from_avatar(&state.avatar),
            obstacles: obstacle_views(&state.world),
        }
    }

    pub fn count(&self, kind: ObstacleKind) -> usize {
        self.obstacles.iter().filter(|o| o.kind == kind).count()
    }
}

pub fn obstacle_views(world: &WorldSnapshot) -> Vec<ObstacleView> {
    let plain = |kind, rect| ObstacleView {
        kind,
        rect,
        state: ObstacleState::Plain,
    };

    let mut views = Vec::with_capacity(world.element_count());
    views.extend(world.platforms.iter().map(|p| plain(ObstacleKind::Platform, p.rect)));
    views.extend(world.solid_blocks.iter().map(|b| plain(ObstacleKind::SolidBlock, b.rect)));
    views.extend(world.spikes.iter().map(|s| plain(ObstacleKind::Spike, s.rect)));
    views.extend(world.checkpoints.iter().map(|c| ObstacleView {
        kind: ObstacleKind::Checkpoint,
        rect: c.rect,
        state: ObstacleState::Checkpoint {
            activated: c.is_activated(),
            respawn_point: c.respawn_point(),
        },
    }));
    views.extend(world.pickups.iter().map(|p| ObstacleView {
        kind: ObstacleKind::EnergyPickup,
        rect: p.rect,
        state: ObstacleState::Pickup {
            consumed: p.is_consumed(),
            recovery_progress: p.recovery_progress(),
        },
    }));
    views
}
