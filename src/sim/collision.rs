//! Collision detection and response against static geometry
//!
//! Four policies: one-way platforms, impassable solid blocks, lethal spikes,
//! and trigger zones (checkpoints, pickups) that never block movement.
//! Resolution order per frame is ground plane, platforms, solid blocks, then
//! the spike check on the corrected rectangle.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::avatar::Direction;
use super::obstacle::{Checkpoint, EnergyPickup, Platform, SolidBlock, Spike};
use super::rect::Rect;
use super::world::{WorldBounds, WorldSnapshot};
use crate::consts::*;

/// Contacts registered while resolving one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFlags {
    /// Resting on the ground plane, a platform top or a block top
    pub grounded: bool,
    /// Pushed down out of a block's underside
    pub hit_ceiling: bool,
    /// Pushed sideways out of a block
    pub hit_wall: bool,
    /// Overlapping a spike
    pub lethal: bool,
}

/// Corrected rectangle, velocity and contacts for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub rect: Rect,
    pub vel: DVec2,
    pub contacts: ContactFlags,
}

impl Resolution {
    pub fn new(rect: Rect, vel: DVec2) -> Self {
        Self {
            rect,
            vel,
            contacts: ContactFlags::default(),
        }
    }

    fn land_at(&mut self, top: f64) {
        self.rect.y = top - self.rect.height;
        self.vel.y = 0.0;
        self.contacts.grounded = true;
    }
}

/// Side of a block the avatar is pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOut {
    Left,
    Right,
    Top,
    Bottom,
}

/// Resolve the avatar's intended rectangle against the whole world
pub fn resolve(rect: Rect, vel: DVec2, world: &WorldSnapshot) -> Resolution {
    let mut res = Resolution::new(rect, vel);
    resolve_ground(&mut res, &world.bounds);
    resolve_platforms(&mut res, &world.platforms);
    resolve_solid_blocks(&mut res, &world.solid_blocks);
    res.contacts.lethal = touches_spike(&res.rect, &world.spikes);
    res
}

/// Ground plane: nothing falls below `ground_y`
pub fn resolve_ground(res: &mut Resolution, bounds: &WorldBounds) {
    if res.rect.bottom() >= bounds.ground_y {
        res.land_at(bounds.ground_y);
    }
}

/// True if the avatar's feet are inside the platform's vertical band
/// and the horizontal spans intersect
pub fn is_on_platform(rect: &Rect, platform: &Platform) -> bool {
    let p = &platform.rect;
    if p.width <= 0.0 {
        return false;
    }
    let feet = rect.bottom();
    rect.spans_x(p) && feet >= p.top() && feet <= p.bottom()
}

/// One-way platforms
///
/// Landing (feet in band, not moving up) snaps onto the top. Feet in band
/// while moving up still count as grounded but leave the avatar in place.
pub fn resolve_platforms(res: &mut Resolution, platforms: &[Platform]) {
    for platform in platforms {
        if !is_on_platform(&res.rect, platform) {
            continue;
        }
        if res.vel.y >= 0.0 {
            res.land_at(platform.rect.top());
        } else {
            res.contacts.grounded = true;
        }
    }
}

/// Axis of minimum penetration for an overlapping block
///
/// Ties resolve in the order left, right, top, bottom.
pub fn push_out_direction(avatar: &Rect, block: &Rect) -> Option<PushOut> {
    if !avatar.overlaps(block) {
        return None;
    }
    let from_left = avatar.right() - block.left();
    let from_right = block.right() - avatar.left();
    let from_top = avatar.bottom() - block.top();
    let from_bottom = block.bottom() - avatar.top();

    let min = from_left.min(from_right).min(from_top).min(from_bottom);
    let dir = if min == from_left {
        PushOut::Left
    } else if min == from_right {
        PushOut::Right
    } else if min == from_top {
        PushOut::Top
    } else {
        PushOut::Bottom
    };
    Some(dir)
}

/// True if the avatar stands exactly on the block's top face
///
/// The half-open overlap test misses this case, so a resting avatar would
/// otherwise lose ground contact every other tick.
pub fn is_resting_on_block(rect: &Rect, vel: DVec2, block: &SolidBlock) -> bool {
    let b = &block.rect;
    !b.is_empty()
        && vel.y >= 0.0
        && rect.spans_x(b)
        && (rect.bottom() - b.top()).abs() <= REST_TOLERANCE
}

/// Solid blocks, one at a time in snapshot order
///
/// Each block sees the rectangle as corrected by the blocks before it, so
/// an avatar straddling adjacent blocks can resolve order-dependently.
pub fn resolve_solid_blocks(res: &mut Resolution, blocks: &[SolidBlock]) {
    for block in blocks {
        let b = &block.rect;
        let Some(dir) = push_out_direction(&res.rect, b) else {
            if is_resting_on_block(&res.rect, res.vel, block) {
                res.land_at(b.top());
            }
            continue;
        };
        match dir {
            PushOut::Left => {
                res.rect.x = b.left() - res.rect.width;
                res.vel.x = 0.0;
                res.contacts.hit_wall = true;
            }
            PushOut::Right => {
                res.rect.x = b.right();
                res.vel.x = 0.0;
                res.contacts.hit_wall = true;
            }
            PushOut::Top => res.land_at(b.top()),
            PushOut::Bottom => {
                res.rect.y = b.bottom();
                res.vel.y = 0.0;
                res.contacts.hit_ceiling = true;
            }
        }
    }
}

/// Any overlap with a spike is lethal
pub fn touches_spike(rect: &Rect, spikes: &[Spike]) -> bool {
    spikes.iter().any(|s| rect.overlaps(&s.rect))
}

/// Which side (if any) the avatar is touching a block wall on
///
/// The avatar's right edge within `WALL_CONTACT_TOLERANCE` past a block's
/// left face is a wall on the right; its left edge within tolerance of a
/// block's right face is a wall on the left. First matching block wins.
pub fn wall_contact(rect: &Rect, blocks: &[SolidBlock]) -> Option<Direction> {
    blocks.iter().find_map(|block| {
        let b = &block.rect;
        if b.is_empty() || !rect.spans_y(b) {
            return None;
        }
        let right = rect.right();
        let left = rect.left();
        if right >= b.left() && right <= b.left() + WALL_CONTACT_TOLERANCE {
            Some(Direction::Right)
        } else if left <= b.right() && left >= b.right() - WALL_CONTACT_TOLERANCE {
            Some(Direction::Left)
        } else {
            None
        }
    })
}

/// Indices of checkpoints whose activation box overlaps `rect`
pub fn touched_checkpoints<'a>(
    rect: &'a Rect,
    checkpoints: &'a [Checkpoint],
) -> impl Iterator<Item = usize> + 'a {
    checkpoints
        .iter()
        .enumerate()
        .filter(move |(_, c)| rect.overlaps(&c.rect))
        .map(|(i, _)| i)
}

/// Indices of available (unconsumed) pickups overlapping `rect`
pub fn touched_pickups<'a>(
    rect: &'a Rect,
    pickups: &'a [EnergyPickup],
) -> impl Iterator<Item = usize> + 'a {
    pickups
        .iter()
        .enumerate()
        .filter(move |(_, p)| !p.is_consumed() && rect.overlaps(&p.rect))
        .map(|(i, _)| i)
}
