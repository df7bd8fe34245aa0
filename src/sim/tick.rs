//! Fixed timestep simulation tick
//!
//! Advances a session deterministically: avatar step first, then pickup
//! recovery, then checkpoint and pickup triggers against the resolved
//! avatar rectangle.

use serde::{Deserialize, Serialize};

use super::avatar::{Direction, StepReport};
use super::collision;
use super::state::{GameEvent, GameState};

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
    pub dash: bool,
    pub climb: bool,
}

impl TickInput {
    /// Nothing held
    pub const NONE: TickInput = TickInput {
        left: false,
        right: false,
        up: false,
        down: false,
        jump: false,
        dash: false,
        climb: false,
    };

    /// -1, 0 or +1 from the horizontal intents (both held cancel out)
    pub fn horizontal(&self) -> f64 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }

    /// Pressing into a wall on side `wall`
    pub fn toward(&self, wall: Direction) -> bool {
        match wall {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Pressing away from a wall on side `wall`
    pub fn away_from(&self, wall: Direction) -> bool {
        self.toward(wall.opposite())
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::NONE
    }
}

/// Advance the session by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f64) {
    state.events.clear();
    state.time_ticks += 1;

    let report = state.avatar.step(&state.world, input, dt);
    push_step_events(&mut state.events, &report);

    for (index, pickup) in state.world.pickups.iter_mut().enumerate() {
        if pickup.tick_recovery() {
            log::debug!("Pickup #{} recovered", index);
            state.events.push(GameEvent::PickupRecovered { index });
        }
    }

    if state.avatar.is_dead() {
        return;
    }

    let rect = state.avatar.rect();
    let touched: Vec<usize> = collision::touched_checkpoints(&rect, &state.world.checkpoints).collect();
    for index in touched {
        let checkpoint = &mut state.world.checkpoints[index];
        if checkpoint.activate(state.time_ticks) {
            log::info!("Checkpoint #{} activated at tick {}", index, state.time_ticks);
            state.events.push(GameEvent::CheckpointActivated { index });
        }
        // Last touched wins, even for checkpoints activated earlier
        let point = checkpoint.respawn_point();
        if state.avatar.respawn_point() != point {
            state.avatar.set_respawn_point(point);
            state.events.push(GameEvent::RespawnPointSet { index });
        }
    }

    let touched: Vec<usize> = collision::touched_pickups(&rect, &state.world.pickups).collect();
    for index in touched {
        let pickup = &mut state.world.pickups[index];
        if pickup.consume() {
            state.avatar.on_pickup_consumed(pickup);
            state.events.push(GameEvent::PickupConsumed { index });
        }
    }
}

fn push_step_events(events: &mut Vec<GameEvent>, report: &StepReport) {
    if report.climb_started {
        events.push(GameEvent::ClimbStarted);
    }
    if report.climb_ended {
        events.push(GameEvent::ClimbEnded);
    }
    if let Some(kind) = report.jumped {
        events.push(GameEvent::Jumped { kind });
    }
    if let Some(tier) = report.dash_started {
        events.push(GameEvent::DashStarted { tier });
    }
    if report.dash_ended {
        events.push(GameEvent::DashEnded);
    }
    if report.died {
        events.push(GameEvent::Died);
    }
    if report.respawned {
        events.push(GameEvent::Respawned);
    }
}
