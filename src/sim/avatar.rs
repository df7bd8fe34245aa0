//! Avatar state machine and integrator
//!
//! The avatar is always in exactly one `Mode`. `step` advances it one tick in
//! a fixed order:
//!
//! 1. Dead: advance the death timer only
//! 2. Recompute wall contact
//! 3. Climb entry/continuation and wall-slide
//! 4. Dash start, continue or expire
//! 5. Walking, jumping and gravity (skipped while a dash runs)
//! 6. Integrate position
//! 7. Jump cooldown
//! 8. Ground, platform and solid block resolution
//! 9. Spike check
//! 10. Horizontal world clamp
//! 11. Grounded: refill stamina, stop climbing

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, ContactFlags};
use super::obstacle::EnergyPickup;
use super::rect::Rect;
use super::tick::TickInput;
use super::world::WorldSnapshot;
use crate::consts::*;

/// Horizontal side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// -1 for left, +1 for right
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Cosmetic class of the dash-charge count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashTier {
    /// No charges left
    Empty,
    /// One charge left
    Single,
    /// Both charges available
    #[default]
    Double,
}

impl DashTier {
    pub fn from_charges(charges: u8) -> Self {
        match charges {
            0 => DashTier::Empty,
            1 => DashTier::Single,
            _ => DashTier::Double,
        }
    }
}

/// Mutually exclusive behavioral state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Mode {
    /// Walking, jumping or falling
    Normal { on_ground: bool },
    /// One-shot dash at a fixed velocity
    Dashing {
        ticks_left: u32,
        dash_vel: DVec2,
        /// Charge tier before the dash consumed its charge
        tier: DashTier,
    },
    /// Holding onto a wall; gravity suppressed
    Climbing,
    /// Death animation; respawns when the timer runs out
    Dead { ticks_left: u32 },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Normal { on_ground: false }
    }
}

/// How a jump was launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    Ground,
    /// Straight up off a wall
    Climb,
    /// Diagonal kick away from a wall
    WallKick,
}

/// What happened during one `step`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub jumped: Option<JumpKind>,
    pub dash_started: Option<DashTier>,
    pub dash_ended: bool,
    pub climb_started: bool,
    pub climb_ended: bool,
    pub died: bool,
    pub respawned: bool,
    pub contacts: ContactFlags,
}

/// The player-controlled avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarState {
    /// Top-left corner of the collision box
    pub pos: DVec2,
    pub vel: DVec2,
    mode: Mode,
    dash_charges: u8,
    stamina: f64,
    jump_cooldown: u32,
    wall_contact: Option<Direction>,
    respawn_point: DVec2,
    /// Intents applied on the last live step (drives render hints)
    intents: TickInput,
}

impl AvatarState {
    /// Avatar at `spawn`, which is also its initial respawn point
    pub fn new(spawn: DVec2) -> Self {
        Self {
            pos: spawn,
            vel: DVec2::ZERO,
            mode: Mode::default(),
            dash_charges: MAX_DASH_CHARGES,
            stamina: MAX_STAMINA,
            jump_cooldown: 0,
            wall_contact: None,
            respawn_point: spawn,
            intents: TickInput::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, AVATAR_WIDTH, AVATAR_HEIGHT)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn dash_charges(&self) -> u8 {
        self.dash_charges
    }

    pub fn stamina(&self) -> f64 {
        self.stamina
    }

    pub fn jump_cooldown(&self) -> u32 {
        self.jump_cooldown
    }

    pub fn wall_contact(&self) -> Option<Direction> {
        self.wall_contact
    }

    pub fn respawn_point(&self) -> DVec2 {
        self.respawn_point
    }

    /// Commit a new respawn point (last touched checkpoint wins)
    pub fn set_respawn_point(&mut self, point: DVec2) {
        self.respawn_point = point;
    }

    pub fn intents(&self) -> &TickInput {
        &self.intents
    }

    pub fn on_ground(&self) -> bool {
        matches!(self.mode, Mode::Normal { on_ground: true })
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.mode, Mode::Dashing { .. })
    }

    pub fn is_climbing(&self) -> bool {
        matches!(self.mode, Mode::Climbing)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.mode, Mode::Dead { .. })
    }

    /// Airborne, falling, holding down, off the wall and not dashing/climbing
    pub fn is_fast_falling(&self) -> bool {
        matches!(self.mode, Mode::Normal { on_ground: false })
            && self.wall_contact.is_none()
            && self.intents.down
            && self.vel.y > 0.0
    }

    /// Hook invoked when the avatar consumes an energy pickup
    ///
    /// Consumption currently has no effect on stamina or dash charges.
    pub fn on_pickup_consumed(&mut self, pickup: &EnergyPickup) {
        log::debug!(
            "Pickup consumed at ({}, {}) (charges={}, stamina={:.1})",
            pickup.rect.x,
            pickup.rect.y,
            self.dash_charges,
            self.stamina
        );
    }

    /// Advance the avatar by one tick
    pub fn step(&mut self, world: &WorldSnapshot, input: &TickInput, dt: f64) -> StepReport {
        let mut report = StepReport::default();

        if let Mode::Dead { ticks_left } = &mut self.mode {
            *ticks_left = ticks_left.saturating_sub(1);
            if *ticks_left == 0 {
                self.respawn();
                report.respawned = true;
            }
            return report;
        }

        self.intents = *input;
        self.wall_contact = collision::wall_contact(&self.rect(), &world.solid_blocks);

        let wall_sliding = self.update_wall(input, dt, &mut report);

        if !self.update_dash(input, &mut report) {
            self.apply_movement(input, wall_sliding, &mut report);
        }

        self.pos += self.vel;

        self.jump_cooldown = self.jump_cooldown.saturating_sub(1);

        // Ground flag is rebuilt from scratch by the collision pass
        let res = collision::resolve(self.rect(), self.vel, world);
        self.pos = res.rect.pos();
        self.vel = res.vel;
        report.contacts = res.contacts;
        let grounded = res.contacts.grounded;
        if grounded {
            self.dash_charges = MAX_DASH_CHARGES;
        }

        if res.contacts.lethal {
            self.die();
            report.died = true;
        }

        let max_x = world.bounds.width - AVATAR_WIDTH;
        self.pos.x = self.pos.x.max(0.0).min(max_x);

        if grounded {
            self.stamina = MAX_STAMINA;
            if self.is_climbing() {
                self.mode = Mode::Normal { on_ground: true };
                report.climb_ended = true;
            }
        }
        if let Mode::Normal { on_ground } = &mut self.mode {
            *on_ground = grounded;
        }

        report
    }

    /// Climbing and wall-slide. Returns true if wall-sliding this tick.
    fn update_wall(&mut self, input: &TickInput, dt: f64, report: &mut StepReport) -> bool {
        if self.is_dashing() {
            return false;
        }

        let Some(wall) = self.wall_contact else {
            if self.is_climbing() {
                log::debug!("Left the wall, climb ended");
                self.stop_climbing(report);
            }
            return false;
        };

        if self.is_climbing() && !input.climb {
            self.stop_climbing(report);
        }

        let mut wall_sliding = false;
        if let Mode::Normal { .. } = self.mode {
            if input.toward(wall) {
                self.vel.x = 0.0;
                self.vel.y = WALL_SLIDE_SPEED;
                wall_sliding = true;
            }
            if input.climb && self.stamina > 0.0 {
                self.mode = Mode::Climbing;
                report.climb_started = true;
                wall_sliding = false;
            }
        }

        if self.is_climbing() {
            self.vel.x = 0.0;
            self.vel.y = match (input.up, input.down) {
                (true, false) => -CLIMB_SPEED,
                (false, true) => CLIMB_SPEED,
                _ => 0.0,
            };
            self.stamina = (self.stamina - STAMINA_DRAIN_RATE * dt).max(0.0).min(MAX_STAMINA);
            if self.stamina <= 0.0 {
                log::debug!("Stamina exhausted, climb ended");
                self.stop_climbing(report);
            }
        }

        wall_sliding
    }

    fn stop_climbing(&mut self, report: &mut StepReport) {
        self.mode = Mode::Normal { on_ground: false };
        report.climb_ended = true;
    }

    /// Dash start/continue/expire. Returns true if the dash owned this tick.
    fn update_dash(&mut self, input: &TickInput, report: &mut StepReport) -> bool {
        if input.dash && self.dash_charges > 0 && !self.is_dashing() {
            if self.is_climbing() {
                report.climb_ended = true;
            }
            report.dash_started = Some(self.start_dash(input));
        }

        let Mode::Dashing {
            ticks_left,
            dash_vel,
            ..
        } = &mut self.mode
        else {
            return false;
        };

        *ticks_left = ticks_left.saturating_sub(1);
        if *ticks_left == 0 {
            // Keep half the dash momentum, then gravity takes over
            self.vel = *dash_vel * DASH_EXIT_FACTOR;
            self.mode = Mode::Normal { on_ground: false };
            report.dash_ended = true;
        } else {
            self.vel = *dash_vel;
        }
        true
    }

    fn start_dash(&mut self, input: &TickInput) -> DashTier {
        let tier = DashTier::from_charges(self.dash_charges);
        self.dash_charges -= 1;
        let dash_vel = dash_direction(input) * DASH_SPEED;
        self.mode = Mode::Dashing {
            ticks_left: DASH_DURATION_TICKS,
            dash_vel,
            tier,
        };
        log::debug!(
            "Dash: vel=({:.2}, {:.2}) charges left={}",
            dash_vel.x,
            dash_vel.y,
            self.dash_charges
        );
        tier
    }

    /// Walking, jumping and gravity
    fn apply_movement(&mut self, input: &TickInput, wall_sliding: bool, report: &mut StepReport) {
        let climbing = self.is_climbing();
        if !climbing {
            self.vel.x = input.horizontal() * MOVE_SPEED;
        }

        if input.jump && (self.on_ground() || climbing) && self.jump_cooldown == 0 {
            report.jumped = Some(self.jump(input, climbing));
        }

        let wall_sliding = wall_sliding && report.jumped.is_none();
        if !self.on_ground() && !self.is_climbing() && !wall_sliding {
            let fast_fall = input.down && self.vel.y > 0.0 && self.wall_contact.is_none();
            self.vel.y += if fast_fall { FAST_FALL_GRAVITY } else { GRAVITY };
        }
    }

    fn jump(&mut self, input: &TickInput, climbing: bool) -> JumpKind {
        let kind = match self.wall_contact {
            Some(wall) if climbing && input.away_from(wall) => {
                self.vel.x = -wall.sign() * WALL_JUMP_HORIZONTAL;
                self.vel.y = JUMP_STRENGTH * WALL_JUMP_VERTICAL_FACTOR;
                JumpKind::WallKick
            }
            _ if climbing => {
                self.vel.x = 0.0;
                self.vel.y = JUMP_STRENGTH;
                JumpKind::Climb
            }
            _ => {
                self.vel.y = JUMP_STRENGTH;
                JumpKind::Ground
            }
        };
        if kind != JumpKind::Ground {
            log::debug!("Wall jump {:?}: vel=({}, {})", kind, self.vel.x, self.vel.y);
        }
        self.mode = Mode::Normal { on_ground: false };
        self.jump_cooldown = JUMP_COOLDOWN_TICKS;
        kind
    }

    fn die(&mut self) {
        log::info!("Avatar died at ({:.1}, {:.1})", self.pos.x, self.pos.y);
        self.mode = Mode::Dead {
            ticks_left: DEATH_ANIMATION_TICKS,
        };
        self.vel = DVec2::ZERO;
    }

    fn respawn(&mut self) {
        self.pos = self.respawn_point;
        self.vel = DVec2::ZERO;
        self.mode = Mode::Normal { on_ground: false };
        self.dash_charges = MAX_DASH_CHARGES;
        self.stamina = MAX_STAMINA;
        self.wall_contact = None;
        log::info!(
            "Avatar respawned at ({:.1}, {:.1})",
            self.respawn_point.x,
            self.respawn_point.y
        );
    }
}

/// Unit dash direction from the held directions (rightward by default)
pub fn dash_direction(input: &TickInput) -> DVec2 {
    let mut dir = DVec2::ZERO;
    if input.left {
        dir.x = -1.0;
    }
    if input.right {
        dir.x = 1.0;
    }
    if input.up {
        dir.y = -1.0;
    }
    if input.down {
        dir.y = 1.0;
    }
    if dir == DVec2::ZERO {
        dir.x = 1.0;
    }
    dir.normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::WorldBuilder;
    use proptest::prelude::*;

    const RIGHT: TickInput = TickInput {
        right: true,
        ..TickInput::NONE
    };

    fn run(avatar: &mut AvatarState, world: &WorldSnapshot, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            avatar.step(world, input, TICK_DT);
        }
    }

    /// Avatar standing on the default ground
    fn grounded_avatar(world: &WorldSnapshot, x: f64) -> AvatarState {
        let mut avatar = AvatarState::new(DVec2::new(x, world.bounds.ground_y - AVATAR_HEIGHT));
        avatar.step(world, &TickInput::NONE, TICK_DT);
        assert!(avatar.on_ground());
        avatar
    }

    #[test]
    fn test_initial_state() {
        let avatar = AvatarState::new(DVec2::new(10.0, 20.0));
        assert_eq!(avatar.mode(), Mode::Normal { on_ground: false });
        assert_eq!(avatar.dash_charges(), MAX_DASH_CHARGES);
        assert_eq!(avatar.stamina(), MAX_STAMINA);
        assert_eq!(avatar.respawn_point(), DVec2::new(10.0, 20.0));
    }

    #[test]
    fn test_gravity_monotonicity() {
        let world = WorldSnapshot::empty();
        let mut avatar = AvatarState::new(DVec2::new(100.0, 100.0));
        let mut last_vy = avatar.vel.y;
        for _ in 0..20 {
            avatar.step(&world, &TickInput::NONE, TICK_DT);
            assert!(!avatar.on_ground());
            assert!((avatar.vel.y - (last_vy + GRAVITY)).abs() < 1e-12);
            last_vy = avatar.vel.y;
        }
    }

    #[test]
    fn test_fast_fall_doubles_gravity() {
        let world = WorldSnapshot::empty();
        let mut avatar = AvatarState::new(DVec2::new(100.0, 100.0));
        let down = TickInput {
            down: true,
            ..TickInput::NONE
        };
        // Not yet falling: normal gravity
        avatar.step(&world, &down, TICK_DT);
        assert_eq!(avatar.vel.y, GRAVITY);
        assert!(avatar.is_fast_falling());

        avatar.step(&world, &down, TICK_DT);
        assert_eq!(avatar.vel.y, GRAVITY + FAST_FALL_GRAVITY);
    }

    #[test]
    fn test_walk_into_block_stops_at_face() {
        let world = WorldBuilder::new()
            .ground_y(600.0)
            .solid_block(150.0, 500.0, 50.0, 100.0)
            .build()
            .unwrap();
        let mut avatar = AvatarState::new(DVec2::new(100.0, 560.0));
        run(&mut avatar, &world, &RIGHT, 20);

        assert_eq!(avatar.pos.x + AVATAR_WIDTH, 150.0);
        assert_eq!(avatar.pos.y, 560.0);
        assert!(avatar.on_ground());
        assert_eq!(avatar.wall_contact(), Some(Direction::Right));
    }

    #[test]
    fn test_standing_on_block_stays_grounded() {
        let world = WorldBuilder::new()
            .solid_block(100.0, 400.0, 200.0, 50.0)
            .build()
            .unwrap();
        let mut avatar = AvatarState::new(DVec2::new(150.0, 360.0));
        for _ in 0..30 {
            avatar.step(&world, &TickInput::NONE, TICK_DT);
            assert!(avatar.on_ground());
            assert_eq!(avatar.pos.y, 360.0);
        }
    }

    #[test]
    fn test_jump_tap_on_block_always_fires() {
        let world = WorldBuilder::new()
            .solid_block(100.0, 400.0, 200.0, 50.0)
            .build()
            .unwrap();
        let jump = TickInput {
            jump: true,
            ..TickInput::NONE
        };
        for settle in 1..=4 {
            let mut avatar = AvatarState::new(DVec2::new(150.0, 360.0));
            run(&mut avatar, &world, &TickInput::NONE, settle);
            let report = avatar.step(&world, &jump, TICK_DT);
            assert_eq!(report.jumped, Some(JumpKind::Ground), "after {} ticks", settle);
        }
    }

    #[test]
    fn test_jump_up_through_platform_then_land() {
        let world = WorldBuilder::new()
            .platform(80.0, 450.0, 120.0, 15.0)
            .build()
            .unwrap();
        let mut avatar = grounded_avatar(&world, 100.0);
        let jump = TickInput {
            jump: true,
            ..TickInput::NONE
        };
        assert_eq!(avatar.step(&world, &jump, TICK_DT).jumped, Some(JumpKind::Ground));

        let mut highest_feet = avatar.pos.y + AVATAR_HEIGHT;
        let mut landed = false;
        for _ in 0..120 {
            let (prev_y, prev_vy) = (avatar.pos.y, avatar.vel.y);
            avatar.step(&world, &TickInput::NONE, TICK_DT);
            if prev_vy < 0.0 {
                // Rising: the platform never pushes back down
                assert!(avatar.pos.y <= prev_y);
            }
            highest_feet = highest_feet.min(avatar.pos.y + AVATAR_HEIGHT);
            if avatar.on_ground() && avatar.vel.y == 0.0 {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(highest_feet < 450.0);
        assert_eq!(avatar.pos.y + AVATAR_HEIGHT, 450.0);
    }

    #[test]
    fn test_ground_jump() {
        let world = WorldSnapshot::empty();
        let mut avatar = grounded_avatar(&world, 100.0);
        let y0 = avatar.pos.y;

        let jump = TickInput {
            jump: true,
            ..TickInput::NONE
        };
        let report = avatar.step(&world, &jump, TICK_DT);
        assert_eq!(report.jumped, Some(JumpKind::Ground));
        // Gravity applies on the jump tick too
        assert_eq!(avatar.vel.y, JUMP_STRENGTH + GRAVITY);
        assert_eq!(avatar.pos.y, y0 + JUMP_STRENGTH + GRAVITY);
        assert_eq!(avatar.jump_cooldown(), JUMP_COOLDOWN_TICKS - 1);
        assert!(!avatar.on_ground());

        // No jumping in mid-air
        let report = avatar.step(&world, &jump, TICK_DT);
        assert_eq!(report.jumped, None);
    }

    #[test]
    fn test_jump_cooldown_blocks_rejump() {
        let world = WorldSnapshot::empty();
        let mut avatar = grounded_avatar(&world, 100.0);
        avatar.jump_cooldown = 3;
        let jump = TickInput {
            jump: true,
            ..TickInput::NONE
        };
        for _ in 0..3 {
            let report = avatar.step(&world, &jump, TICK_DT);
            assert_eq!(report.jumped, None);
            assert!(avatar.on_ground());
        }
        let report = avatar.step(&world, &jump, TICK_DT);
        assert_eq!(report.jumped, Some(JumpKind::Ground));
    }

    #[test]
    fn test_dash_default_right_and_expiry() {
        let world = WorldSnapshot::empty();
        let mut avatar = AvatarState::new(DVec2::new(100.0, 100.0));
        let dash = TickInput {
            dash: true,
            ..TickInput::NONE
        };

        let report = avatar.step(&world, &dash, TICK_DT);
        assert_eq!(report.dash_started, Some(DashTier::Double));
        assert_eq!(avatar.dash_charges(), 1);
        assert_eq!(avatar.vel, DVec2::new(DASH_SPEED, 0.0));
        assert!(avatar.is_dashing());

        run(&mut avatar, &world, &TickInput::NONE, DASH_DURATION_TICKS - 2);
        assert!(avatar.is_dashing());
        // No gravity while dashing
        assert_eq!(avatar.pos.y, 100.0);

        let report = avatar.step(&world, &TickInput::NONE, TICK_DT);
        assert!(report.dash_ended);
        assert_eq!(avatar.mode(), Mode::Normal { on_ground: false });
        assert_eq!(avatar.vel, DVec2::new(DASH_SPEED * DASH_EXIT_FACTOR, 0.0));
        let expected_x = 100.0 + DASH_SPEED * f64::from(DASH_DURATION_TICKS - 1) + DASH_SPEED * DASH_EXIT_FACTOR;
        assert!((avatar.pos.x - expected_x).abs() < 1e-9);

        // Back to normal control
        avatar.step(&world, &TickInput::NONE, TICK_DT);
        assert_eq!(avatar.vel, DVec2::new(0.0, GRAVITY));
    }

    #[test]
    fn test_dash_diagonal_is_normalized() {
        let input = TickInput {
            up: true,
            right: true,
            ..TickInput::NONE
        };
        let dir = dash_direction(&input);
        assert!((dir.length() - 1.0).abs() < 1e-12);
        assert!(dir.x > 0.0 && dir.y < 0.0);

        let left_down = TickInput {
            left: true,
            down: true,
            ..TickInput::NONE
        };
        let dir = dash_direction(&left_down);
        assert!(dir.x < 0.0 && dir.y > 0.0);
    }

    #[test]
    fn test_dash_charges_deplete_and_refill() {
        let world = WorldSnapshot::empty();
        let mut avatar = AvatarState::new(DVec2::new(100.0, 100.0));
        let dash = TickInput {
            dash: true,
            ..TickInput::NONE
        };

        let report = avatar.step(&world, &dash, TICK_DT);
        assert_eq!(report.dash_started, Some(DashTier::Double));
        run(&mut avatar, &world, &TickInput::NONE, DASH_DURATION_TICKS - 1);
        assert!(!avatar.is_dashing());

        let report = avatar.step(&world, &dash, TICK_DT);
        assert_eq!(report.dash_started, Some(DashTier::Single));
        assert!(matches!(avatar.mode(), Mode::Dashing { tier: DashTier::Single, .. }));
        run(&mut avatar, &world, &TickInput::NONE, DASH_DURATION_TICKS - 1);
        assert_eq!(avatar.dash_charges(), 0);

        // Out of charges
        let report = avatar.step(&world, &dash, TICK_DT);
        assert_eq!(report.dash_started, None);
        assert!(!avatar.is_dashing());

        // Landing refills
        for _ in 0..200 {
            avatar.step(&world, &TickInput::NONE, TICK_DT);
            if avatar.on_ground() {
                break;
            }
        }
        assert!(avatar.on_ground());
        assert_eq!(avatar.dash_charges(), MAX_DASH_CHARGES);
    }

    /// World with a tall wall whose left face is at x = 300
    fn wall_world() -> WorldSnapshot {
        WorldBuilder::new()
            .solid_block(300.0, 100.0, 50.0, 450.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_wall_slide_constant_speed() {
        let world = wall_world();
        let mut avatar = AvatarState::new(DVec2::new(270.0, 200.0));
        for _ in 0..10 {
            avatar.step(&world, &RIGHT, TICK_DT);
            assert_eq!(avatar.wall_contact(), Some(Direction::Right));
            assert_eq!(avatar.vel.y, WALL_SLIDE_SPEED);
            assert_eq!(avatar.pos.x, 270.0);
        }
        assert_eq!(avatar.pos.y, 210.0);
        assert!(!avatar.is_fast_falling());
    }

    #[test]
    fn test_climb_enter_move_and_release() {
        let world = wall_world();
        let mut avatar = AvatarState::new(DVec2::new(270.0, 200.0));
        let climb_up = TickInput {
            climb: true,
            up: true,
            ..TickInput::NONE
        };

        let report = avatar.step(&world, &climb_up, TICK_DT);
        assert!(report.climb_started);
        assert!(avatar.is_climbing());
        assert_eq!(avatar.vel, DVec2::new(0.0, -CLIMB_SPEED));
        assert_eq!(avatar.pos.y, 200.0 - CLIMB_SPEED);
        assert!((avatar.stamina() - (MAX_STAMINA - STAMINA_DRAIN_RATE)).abs() < 1e-9);

        // Hanging still
        let hang = TickInput {
            climb: true,
            ..TickInput::NONE
        };
        let y = avatar.pos.y;
        avatar.step(&world, &hang, TICK_DT);
        assert!(avatar.is_climbing());
        assert_eq!(avatar.pos.y, y);

        // Releasing climb drops back to normal
        let report = avatar.step(&world, &TickInput::NONE, TICK_DT);
        assert!(report.climb_ended);
        assert_eq!(avatar.mode(), Mode::Normal { on_ground: false });
        assert_eq!(avatar.vel.y, GRAVITY);
    }

    #[test]
    fn test_climb_requires_wall() {
        let world = WorldSnapshot::empty();
        let mut avatar = AvatarState::new(DVec2::new(100.0, 100.0));
        let climb = TickInput {
            climb: true,
            ..TickInput::NONE
        };
        avatar.step(&world, &climb, TICK_DT);
        assert!(!avatar.is_climbing());
    }

    #[test]
    fn test_stamina_exhaustion_ends_climb() {
        let world = wall_world();
        let mut avatar = AvatarState::new(DVec2::new(270.0, 200.0));
        let hang = TickInput {
            climb: true,
            ..TickInput::NONE
        };
        let mut ticks = 0;
        loop {
            avatar.step(&world, &hang, TICK_DT);
            ticks += 1;
            if !avatar.is_climbing() || ticks > 300 {
                break;
            }
        }
        assert!((249..=251).contains(&ticks), "climbed for {ticks} ticks");
        assert_eq!(avatar.stamina(), 0.0);

        // Cannot re-enter without stamina
        avatar.step(&world, &hang, TICK_DT);
        assert!(!avatar.is_climbing());
        assert!(avatar.vel.y > 0.0);
    }

    #[test]
    fn test_climb_to_ground_refills_stamina() {
        let world = WorldBuilder::new()
            .solid_block(300.0, 100.0, 50.0, 450.0)
            .build()
            .unwrap();
        let mut avatar = AvatarState::new(DVec2::new(270.0, 505.0));
        let climb_down = TickInput {
            climb: true,
            down: true,
            ..TickInput::NONE
        };
        avatar.step(&world, &climb_down, TICK_DT);
        avatar.step(&world, &climb_down, TICK_DT);
        assert!(avatar.is_climbing());
        assert!(avatar.stamina() < MAX_STAMINA);

        let report = avatar.step(&world, &climb_down, TICK_DT);
        assert!(report.climb_ended);
        assert_eq!(avatar.mode(), Mode::Normal { on_ground: true });
        assert_eq!(avatar.stamina(), MAX_STAMINA);
    }

    #[test]
    fn test_wall_kick_and_climb_jump() {
        let world = wall_world();
        let climb = TickInput {
            climb: true,
            ..TickInput::NONE
        };

        // Jump while pressing away from the wall: diagonal kick
        let mut avatar = AvatarState::new(DVec2::new(270.0, 200.0));
        avatar.step(&world, &climb, TICK_DT);
        assert!(avatar.is_climbing());
        let kick = TickInput {
            climb: true,
            jump: true,
            left: true,
            ..TickInput::NONE
        };
        let report = avatar.step(&world, &kick, TICK_DT);
        assert_eq!(report.jumped, Some(JumpKind::WallKick));
        assert_eq!(avatar.vel.x, -WALL_JUMP_HORIZONTAL);
        assert!((avatar.vel.y - (JUMP_STRENGTH * WALL_JUMP_VERTICAL_FACTOR + GRAVITY)).abs() < 1e-9);
        assert_eq!(avatar.mode(), Mode::Normal { on_ground: false });
        assert_eq!(avatar.jump_cooldown(), JUMP_COOLDOWN_TICKS - 1);

        // Jump without pressing away: straight up
        let mut avatar = AvatarState::new(DVec2::new(270.0, 200.0));
        avatar.step(&world, &climb, TICK_DT);
        let up_jump = TickInput {
            climb: true,
            jump: true,
            ..TickInput::NONE
        };
        let report = avatar.step(&world, &up_jump, TICK_DT);
        assert_eq!(report.jumped, Some(JumpKind::Climb));
        assert_eq!(avatar.vel.x, 0.0);
        assert_eq!(avatar.vel.y, JUMP_STRENGTH + GRAVITY);
    }

    #[test]
    fn test_dash_cancels_climb() {
        let world = wall_world();
        let mut avatar = AvatarState::new(DVec2::new(270.0, 200.0));
        let climb = TickInput {
            climb: true,
            ..TickInput::NONE
        };
        avatar.step(&world, &climb, TICK_DT);
        assert!(avatar.is_climbing());

        let dash_away = TickInput {
            climb: true,
            dash: true,
            left: true,
            ..TickInput::NONE
        };
        let report = avatar.step(&world, &dash_away, TICK_DT);
        assert!(report.climb_ended);
        assert!(avatar.is_dashing());
        assert_eq!(avatar.vel, DVec2::new(-DASH_SPEED, 0.0));
    }

    #[test]
    fn test_death_and_respawn_round_trip() {
        let world = WorldBuilder::new()
            .spike(200.0, 530.0, 40.0, 20.0)
            .build()
            .unwrap();
        let mut avatar = grounded_avatar(&world, 100.0);
        let spawn = avatar.respawn_point();

        let mut died = false;
        for _ in 0..60 {
            if avatar.step(&world, &RIGHT, TICK_DT).died {
                died = true;
                break;
            }
        }
        assert!(died);
        assert!(avatar.is_dead());
        assert_eq!(avatar.vel, DVec2::ZERO);
        let death_pos = avatar.pos;

        // Input is ignored while dead
        run(&mut avatar, &world, &RIGHT, DEATH_ANIMATION_TICKS - 1);
        assert!(avatar.is_dead());
        assert_eq!(avatar.pos, death_pos);

        let report = avatar.step(&world, &TickInput::NONE, TICK_DT);
        assert!(report.respawned);
        assert_eq!(avatar.pos, spawn);
        assert_eq!(avatar.mode(), Mode::Normal { on_ground: false });
        assert_eq!(avatar.dash_charges(), MAX_DASH_CHARGES);
        assert_eq!(avatar.stamina(), MAX_STAMINA);
    }

    #[test]
    fn test_world_clamp() {
        let world = WorldSnapshot::empty();
        let mut avatar = grounded_avatar(&world, 5.0);
        let left = TickInput {
            left: true,
            ..TickInput::NONE
        };
        run(&mut avatar, &world, &left, 5);
        assert_eq!(avatar.pos.x, 0.0);

        let mut avatar = grounded_avatar(&world, world.bounds.width - AVATAR_WIDTH - 2.0);
        run(&mut avatar, &world, &RIGHT, 5);
        assert_eq!(avatar.pos.x, world.bounds.width - AVATAR_WIDTH);
    }

    fn input_from(flags: [bool; 7]) -> TickInput {
        TickInput {
            left: flags[0],
            right: flags[1],
            up: flags[2],
            down: flags[3],
            jump: flags[4],
            dash: flags[5],
            climb: flags[6],
        }
    }

    fn playground() -> WorldSnapshot {
        WorldBuilder::new()
            .platform(100.0, 420.0, 120.0, 15.0)
            .solid_block(300.0, 400.0, 100.0, 150.0)
            .solid_block(500.0, 200.0, 60.0, 60.0)
            .spike(650.0, 530.0, 40.0, 20.0)
            .build()
            .unwrap()
    }

    /// Deepest penetration along the cheapest axis
    fn penetration(a: &Rect, b: &Rect) -> f64 {
        if !a.overlaps(b) {
            return 0.0;
        }
        (a.right() - b.left())
            .min(b.right() - a.left())
            .min(a.bottom() - b.top())
            .min(b.bottom() - a.top())
    }

    proptest! {
        #[test]
        fn prop_resource_invariants(inputs in prop::collection::vec(any::<[bool; 7]>(), 1..400)) {
            let world = playground();
            let mut avatar = AvatarState::new(DVec2::new(100.0, 510.0));
            for flags in inputs {
                avatar.step(&world, &input_from(flags), TICK_DT);
                prop_assert!(avatar.dash_charges() <= MAX_DASH_CHARGES);
                prop_assert!((0.0..=MAX_STAMINA).contains(&avatar.stamina()));
                prop_assert!(!avatar.is_climbing() || avatar.wall_contact().is_some());
            }
        }

        #[test]
        fn prop_solid_blocks_impenetrable(inputs in prop::collection::vec(any::<[bool; 7]>(), 1..400)) {
            let world = playground();
            let mut avatar = AvatarState::new(DVec2::new(100.0, 510.0));
            for flags in inputs {
                avatar.step(&world, &input_from(flags), TICK_DT);
                let rect = avatar.rect();
                for block in &world.solid_blocks {
                    prop_assert!(penetration(&rect, &block.rect) < 1e-6);
                }
            }
        }
    }
}
