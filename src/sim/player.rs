//! Player controller
//!
//! The player is a bitstate rather than a single enum: it can be airborne,
//! headbutting, hurt and invincible at the same time. Each state is a timer or
//! flag, and `update` advances them in a fixed order every tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Rect};
use super::input::TickInput;
use super::physics::Body;
use super::platform::{PlatformRef, TerrainBody, Tile};
use super::state::{GameEvent, StepEvent};
use super::stats::Stats;
use crate::consts::BASE_GRAVITY;
use crate::wrap_x;

pub const WALK_SPEED: f32 = 1.5;
pub const FRICTION: Vec2 = Vec2::new(0.25, 0.15);
/// Ticks of forced upward speed after a ground jump
pub const JUMP_TIME: f32 = 16.0;
pub const JUMP_SPEED: f32 = -2.25;
pub const DOUBLE_JUMP_TIME: f32 = 12.0;
/// Grace window after leaving the ground in which a jump still counts
pub const LEDGE_TIME: f32 = 8.0;
pub const HEADBUTT_TIME: f32 = 20.0;
/// Headbutt commit time before the attack button may end it early
pub const HEADBUTT_MIN_TIME: f32 = 8.0;
pub const HEADBUTT_SPEED: f32 = 3.0;
/// Invulnerability and flicker after taking damage
pub const HURT_TIME: f32 = 60.0;
pub const SHAKE_TIME: f32 = 30.0;
/// Enemy contact immunity after being bumped
pub const BUMP_GRACE_TIME: f32 = 20.0;
pub const INVINCIBILITY_TIME: f32 = 600.0;
pub const INVINCIBILITY_SPEED_BONUS: f32 = 1.25;
pub const DEATH_TIME: f32 = 60.0;
pub const DEATH_JUMP_SPEED: f32 = -3.0;
/// Ticks during which bridges are ignored after a drop-through
pub const DROP_TIME: f32 = 10.0;
const ANIMATION_SPEED: f32 = 1.0 / 6.0;

const COLLISION_BOX: Rect = Rect::new(0.0, 2.0, 12.0, 12.0);
const HITBOX: Rect = Rect::new(0.0, 2.0, 10.0, 10.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub stats: Stats,
    /// -1 left, 1 right
    pub face: f32,
    arena_width: f32,

    pub ledge_timer: f32,
    pub jump_timer: f32,
    pub can_double_jump: bool,
    pub double_jumping: bool,

    pub can_headbutt: bool,
    pub headbutt_active: bool,
    pub headbutt_timer: f32,
    /// Airborne headbutt: no gravity for its duration
    pub headbutt_float: bool,

    pub hurt_timer: f32,
    pub shake_timer: f32,
    pub bump_timer: f32,
    pub invincibility_timer: f32,
    pub death_timer: f32,
    pub drop_timer: f32,

    /// Tile landed on during the previous collision pass
    pub standing_on: Option<Tile>,
    pub frame: f32,
}

impl Player {
    pub fn new(pos: Vec2, stats: Stats, arena_width: f32) -> Self {
        let mut body = Body::new(pos, COLLISION_BOX, HITBOX);
        body.respawn(pos, Vec2::ZERO);
        body.friction = FRICTION;
        body.target.y = BASE_GRAVITY;

        Self {
            body,
            stats,
            face: 1.0,
            arena_width,
            ledge_timer: 0.0,
            jump_timer: 0.0,
            can_double_jump: false,
            double_jumping: false,
            can_headbutt: true,
            headbutt_active: false,
            headbutt_timer: 0.0,
            headbutt_float: false,
            hurt_timer: 0.0,
            shake_timer: 0.0,
            bump_timer: 0.0,
            invincibility_timer: 0.0,
            death_timer: 0.0,
            drop_timer: 0.0,
            standing_on: None,
            frame: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.body.is_active()
    }

    pub fn is_dying(&self) -> bool {
        self.body.exists && self.body.dying
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    pub fn is_headbutting(&self) -> bool {
        self.headbutt_active
    }

    pub fn is_hurt(&self) -> bool {
        self.hurt_timer > 0.0
    }

    /// Zone under the feet that flattens enemies
    pub fn stomp_zone(&self) -> Aabb {
        Aabb::from_center(self.body.pos + Vec2::new(0.0, 10.0), Vec2::new(12.0, 6.0))
    }

    /// Zone in front of the player while headbutting
    pub fn headbutt_zone(&self) -> Aabb {
        Aabb::from_center(
            self.body.pos + Vec2::new(self.face * 10.0, 2.0),
            Vec2::new(12.0, 12.0),
        )
    }

    pub fn update(&mut self, input: &TickInput, step: &StepEvent, events: &mut Vec<GameEvent>) {
        if !self.body.exists {
            return;
        }
        let dt = step.tick;

        if self.body.dying {
            self.death_timer -= dt;
            self.body.integrate(dt);
            if self.death_timer <= 0.0 {
                self.body.finish_death();
                log::info!("player removed, final score {}", self.stats.score);
            }
            return;
        }

        self.hurt_timer = (self.hurt_timer - dt).max(0.0);
        self.shake_timer = (self.shake_timer - dt).max(0.0);
        self.bump_timer = (self.bump_timer - dt).max(0.0);
        self.invincibility_timer = (self.invincibility_timer - dt).max(0.0);
        self.drop_timer = (self.drop_timer - dt).max(0.0);

        let grounded = self.body.touch_floor;
        self.body.touch_floor = false;
        if !grounded {
            self.standing_on = None;
        }

        // Horizontal control
        let bonus = if self.is_invincible() {
            INVINCIBILITY_SPEED_BONUS
        } else {
            1.0
        };
        self.body.friction = FRICTION;
        self.body.target = Vec2::new(input.stick.x * WALK_SPEED * bonus, BASE_GRAVITY);
        if input.stick.x != 0.0 && !self.headbutt_active {
            self.face = input.stick.x.signum();
        }

        // Jump in progress: constant rise until the timer runs out or the button is let go
        if self.jump_timer > 0.0 {
            if input.jump.is_released() {
                self.jump_timer = 0.0;
            } else {
                self.body.speed.y = JUMP_SPEED;
                self.body.target.y = JUMP_SPEED;
                self.jump_timer = (self.jump_timer - dt).max(0.0);
            }
        }

        if input.jump.is_pressed() {
            if self.standing_on == Some(Tile::Bridge) && input.down_held() {
                self.drop_timer = DROP_TIME;
                self.ledge_timer = 0.0;
                self.standing_on = None;
            } else if self.ledge_timer > 0.0 {
                self.ledge_timer = 0.0;
                self.start_jump(JUMP_TIME);
                events.push(GameEvent::Jump);
            } else if self.can_double_jump {
                self.can_double_jump = false;
                self.double_jumping = true;
                self.start_jump(DOUBLE_JUMP_TIME);
                events.push(GameEvent::DoubleJump);
            }
        }

        self.ledge_timer = (self.ledge_timer - dt).max(0.0);

        if self.headbutt_active {
            self.headbutt_timer -= dt;
            let elapsed = HEADBUTT_TIME - self.headbutt_timer;
            if self.headbutt_timer <= 0.0
                || (!input.attack.is_down() && elapsed >= HEADBUTT_MIN_TIME)
            {
                self.stop_headbutt();
            } else {
                self.drive_headbutt();
            }
        } else if input.attack.is_pressed() && self.can_headbutt {
            self.start_headbutt(!grounded);
            events.push(GameEvent::Headbutt);
        }

        self.body.integrate(dt);
        self.body.pos.x = wrap_x(self.body.pos.x, self.arena_width);

        if self.body.speed.x != 0.0 {
            self.frame = (self.frame + ANIMATION_SPEED * dt) % 4.0;
        } else {
            self.frame = 0.0;
        }
    }

    fn start_jump(&mut self, time: f32) {
        self.jump_timer = time;
        self.body.speed.y = JUMP_SPEED;
        self.body.target.y = JUMP_SPEED;
    }

    /// Begin a headbutt; airborne headbutts ignore gravity while they last
    pub fn start_headbutt(&mut self, airborne: bool) {
        self.headbutt_active = true;
        self.can_headbutt = false;
        self.headbutt_timer = HEADBUTT_TIME;
        self.headbutt_float = airborne;
        if airborne {
            self.jump_timer = 0.0;
        }
        self.drive_headbutt();
    }

    fn drive_headbutt(&mut self) {
        self.body.speed.x = self.face * HEADBUTT_SPEED;
        self.body.target.x = self.body.speed.x;
        if self.headbutt_float {
            self.body.speed.y = 0.0;
            self.body.target.y = 0.0;
        }
    }

    pub fn stop_headbutt(&mut self) {
        self.headbutt_active = false;
        self.headbutt_float = false;
        self.headbutt_timer = 0.0;
    }

    /// Upward bounce after stomping an enemy
    pub fn stomp_bounce(&mut self, speed: f32) {
        self.body.speed.y = speed;
        self.jump_timer = 0.0;
        self.can_double_jump = true;
        self.double_jumping = false;
    }

    /// Push the player along `dir` (unit length) at `speed`
    pub fn directional_bump(&mut self, dir: Vec2, speed: f32) {
        self.stop_headbutt();
        self.jump_timer = 0.0;
        self.body.speed = dir * speed;
        self.bump_timer = BUMP_GRACE_TIME;
    }

    pub fn start_invincibility(&mut self) {
        self.invincibility_timer = INVINCIBILITY_TIME;
        log::debug!("invincibility started");
    }

    /// Take one hit if not immune. Callers have already established contact.
    pub fn hurt(&mut self, enemy_sourced: bool, events: &mut Vec<GameEvent>) -> bool {
        if !self.is_active()
            || self.hurt_timer > 0.0
            || self.is_invincible()
            || (enemy_sourced && self.bump_timer > 0.0)
        {
            return false;
        }

        self.stats.change_lives(-1);
        self.stats.reset_combo();
        self.hurt_timer = HURT_TIME;
        self.shake_timer = SHAKE_TIME;
        events.push(GameEvent::Hurt);
        log::debug!("player hurt, {} lives left", self.stats.lives);

        if self.stats.lives == 0 {
            self.kill(events);
        }
        true
    }

    /// Take a hit if the hitbox touches `hazard` (or its wrapped copies)
    pub fn hurt_collision(
        &mut self,
        hazard: &Aabb,
        enemy_sourced: bool,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if !self
            .body
            .hitbox_aabb()
            .overlaps_wrapped(hazard, self.arena_width)
        {
            return false;
        }
        self.hurt(enemy_sourced, events)
    }

    /// Start the death animation
    pub fn kill(&mut self, events: &mut Vec<GameEvent>) {
        if !self.is_active() {
            return;
        }
        self.stop_headbutt();
        self.jump_timer = 0.0;
        self.invincibility_timer = 0.0;
        self.body.start_dying();
        self.death_timer = DEATH_TIME;
        self.body.speed = Vec2::new(0.0, DEATH_JUMP_SPEED);
        self.body.target = Vec2::new(0.0, BASE_GRAVITY);
        events.push(GameEvent::Death);
        log::info!("player died, score {}", self.stats.score);
    }

    /// Fell out of the arena: every remaining life is lost at once
    pub fn fall_out(&mut self, events: &mut Vec<GameEvent>) {
        if !self.is_active() {
            return;
        }
        self.stats.change_lives(-i32::from(self.stats.lives));
        self.kill(events);
    }
}

impl TerrainBody for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn ignores_floor(&self, tile: Tile) -> bool {
        tile == Tile::Bridge && self.drop_timer > 0.0
    }

    fn floor_event(&mut self, tile: Tile, _platform: PlatformRef, _events: &mut Vec<GameEvent>) {
        self.ledge_timer = LEDGE_TIME;
        self.jump_timer = 0.0;
        self.can_double_jump = true;
        self.double_jumping = false;
        if !self.headbutt_active {
            self.can_headbutt = true;
        }
        self.standing_on = Some(tile);
        if !self.is_invincible() {
            self.stats.reset_combo();
        }
    }

    fn hazard_event(&mut self, hazard: &Aabb, events: &mut Vec<GameEvent>) {
        self.hurt_collision(hazard, false, events);
    }
}
