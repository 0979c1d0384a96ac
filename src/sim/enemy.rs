//! Shared enemy skeleton
//!
//! Every species shares platform tracking, the death procedures and the
//! player/enemy contact rules. Species-specific motion lives in `species`.
//!
//! Contact precedence against the player, first match wins:
//! species override, invincible player, headbutt, stomp, ambient hurt.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collectible::Particle;
use super::collision::{Aabb, Rect};
use super::physics::Body;
use super::platform::{Platform, PlatformRef, TerrainBody, Tile};
use super::player::Player;
use super::pool::{Pool, Poolable};
use super::random;
use super::species::{self, Species, StompMode};
use super::state::{GameEvent, StepEvent};
use crate::consts::BASE_GRAVITY;
use crate::wrap_x;

/// Sprite size; standing enemies are centered half of it above the surface
pub const ENEMY_SIZE: f32 = 24.0;
/// Squash animation, then a short wait before removal
pub const FLATTEN_ANIM_TIME: f32 = 12.0;
pub const FLATTEN_WAIT_TIME: f32 = 30.0;
pub const FLATTEN_TIME: f32 = FLATTEN_ANIM_TIME + FLATTEN_WAIT_TIME;
/// Non-interactive window after bouncing the player
pub const BOUNCE_RECOVER_TIME: f32 = 20.0;
pub const KNOCKBACK_SPEED_X: f32 = 3.0;
pub const KNOCKBACK_SPEED_Y: f32 = -3.0;
pub const KNOCKBACK_TIME: f32 = 120.0;
/// Player vertical speed must exceed this for a stomp
pub const STOMP_MIN_SPEED: f32 = 0.0;
/// Player bounce after flattening an enemy
pub const STOMP_JUMP_SPEED: f32 = -3.0;
/// Player bounce off a bouncy enemy
pub const BOUNCE_JUMP_SPEED: f32 = -3.5;
/// Push applied to a headbutt that hits an enemy it cannot move
pub const DEFLECT_SPEED: f32 = 2.0;
const ANIMATION_SPEED: f32 = 1.0 / 9.0;

const COLLISION_BOX: Rect = Rect::new(0.0, 4.0, 12.0, 16.0);
const HITBOX: Rect = Rect::new(0.0, 3.0, 16.0, 14.0);

/// Which death procedure a dying enemy runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathKind {
    /// Squashed in place, then removed
    Flattened,
    /// Launched off the screen
    Knockback,
}

/// Outcome of an enemy touching the player, for scoring and effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Stomped,
    Bounced,
    KnockedBack,
    /// Headbutt against an enemy that cannot be headbutted
    Deflected,
    HurtPlayer,
    /// Bumper pushed the player away
    Bumped,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Enemy {
    pub body: Body,
    pub species: Species,
    /// Platform the enemy stands on or hovers around (weak)
    pub platform: Option<PlatformRef>,
    /// Anchor height derived from the platform each tick
    pub base_y: f32,
    pub death: Option<DeathKind>,
    pub flatten_timer: f32,
    pub knockback_timer: f32,
    /// Bounce recovery (bumpers: expand animation)
    pub bounce_timer: f32,
    /// Facing / patrol direction, -1 or 1
    pub dir: f32,
    /// Wave, hover or orbit angle
    pub phase: f32,
    /// Orbit center x (rabbits)
    pub anchor_x: f32,
    pub entrance_timer: f32,
    /// Touching it can hurt the player (missiles only after their entrance)
    pub harmful: bool,
    pub dust_timer: f32,
    /// Animation frame, fractional
    pub frame: f32,
}

impl Poolable for Enemy {
    fn exists(&self) -> bool {
        self.body.exists
    }

    fn force_kill(&mut self) {
        self.body.force_kill();
    }
}

impl Enemy {
    /// Place a fresh enemy of `species` centered at `pos`
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        species: Species,
        pos: Vec2,
        platform: Option<PlatformRef>,
        arena_width: f32,
    ) {
        let info = species.info();

        *self = Self {
            body: Body::new(pos, COLLISION_BOX, HITBOX),
            species,
            platform,
            base_y: pos.y + info.platform_offset,
            dir: random::direction(rng),
            anchor_x: pos.x,
            harmful: info.harmful,
            frame: random::index(rng, 3) as f32,
            ..Default::default()
        };
        self.body.respawn(Vec2::new(pos.x, self.base_y), Vec2::ZERO);
        species::spawn_event(self, rng, arena_width);
    }

    /// Follow the reference platform. False once it no longer exists.
    fn track_platform(&mut self, platforms: &Pool<Platform>) -> bool {
        let Some(reference) = self.platform else {
            return true;
        };
        match platforms.get(reference.slot) {
            Some(p) if p.matches(reference) => {
                let info = self.species.info();
                self.base_y = p.y - ENEMY_SIZE / 2.0 + info.platform_offset;
                if info.fixed_y {
                    self.body.pos.y = self.base_y;
                }
                true
            }
            _ => false,
        }
    }

    pub fn update(
        &mut self,
        platforms: &Pool<Platform>,
        global_speed: f32,
        step: &StepEvent,
        particles: &mut Pool<Particle>,
    ) {
        if !self.body.exists {
            return;
        }

        if self.body.dying {
            if self.die(platforms, step) {
                self.body.finish_death();
            }
            return;
        }

        if !self.track_platform(platforms) {
            self.body.force_kill();
            return;
        }

        let dt = step.tick;
        self.bounce_timer = (self.bounce_timer - dt).max(0.0);
        self.frame = (self.frame + ANIMATION_SPEED * dt) % 4.0;

        species::update_ai(self, global_speed, step, particles);
        if !self.body.exists {
            return;
        }

        self.body.integrate(dt);
        if self.species.wraps() {
            self.body.pos.x = wrap_x(self.body.pos.x, step.screen_width);
        }

        // Rows own their riders; only loose enemies leave through the borders
        if self.platform.is_none() && self.out_of_bounds(step) {
            self.body.force_kill();
        }
    }

    fn out_of_bounds(&self, step: &StepEvent) -> bool {
        let y = self.body.pos.y;
        y < -ENEMY_SIZE || (self.body.speed.y > 0.0 && y > step.screen_height + ENEMY_SIZE)
    }

    /// Run the death procedure; true when it has finished
    fn die(&mut self, platforms: &Pool<Platform>, step: &StepEvent) -> bool {
        let dt = step.tick;
        match self.death {
            Some(DeathKind::Flattened) => {
                self.flatten_timer -= dt;
                !self.track_platform(platforms) || self.flatten_timer <= 0.0
            }
            Some(DeathKind::Knockback) => {
                self.knockback_timer -= dt;
                self.body.integrate(dt);
                self.body.pos.x = wrap_x(self.body.pos.x, step.screen_width);
                self.knockback_timer <= 0.0 || self.body.pos.y > step.screen_height + ENEMY_SIZE
            }
            None => true,
        }
    }

    /// Squash in place
    pub fn flatten(&mut self) {
        if !self.body.is_active() {
            return;
        }
        self.body.start_dying();
        self.death = Some(DeathKind::Flattened);
        self.flatten_timer = FLATTEN_TIME;
        self.body.speed = Vec2::ZERO;
        self.body.target = Vec2::ZERO;
        log::debug!("{:?} flattened", self.species);
    }

    /// Launch off screen in direction `dir`, detached from its platform
    pub fn knockback(&mut self, dir: f32) {
        if !self.body.is_active() {
            return;
        }
        self.body.start_dying();
        self.death = Some(DeathKind::Knockback);
        self.knockback_timer = KNOCKBACK_TIME;
        self.platform = None;
        self.dir = dir;

        self.body.speed = Vec2::new(dir * KNOCKBACK_SPEED_X, KNOCKBACK_SPEED_Y);
        self.body.target = Vec2::new(self.body.speed.x, BASE_GRAVITY);
        self.body.friction = Vec2::new(0.0, 0.15);
        log::debug!("{:?} knocked back", self.species);
    }

    pub fn is_knocked_back(&self) -> bool {
        self.body.exists && self.death == Some(DeathKind::Knockback)
    }

    /// Resolve contact with the player. Precedence: species override,
    /// invincible player, headbutt, stomp, ambient hurt.
    pub fn player_collision(
        &mut self,
        player: &mut Player,
        arena_width: f32,
        events: &mut Vec<GameEvent>,
    ) -> Option<Contact> {
        if !self.body.is_active() || !player.body.is_active() {
            return None;
        }
        if self.species.overrides_player_contact() {
            return species::bumper_contact(self, player, arena_width, events);
        }
        if !self.harmful || self.bounce_timer > 0.0 {
            return None;
        }

        let info = self.species.info();
        let hitbox = self.body.hitbox_aabb();

        // Invincible players plough through everything that can be knocked away
        if player.is_invincible() {
            if info.can_be_headbutted
                && player.body.hitbox_aabb().overlaps_wrapped(&hitbox, arena_width)
            {
                self.knockback(player.face);
                events.push(GameEvent::Knockback);
                return Some(Contact::KnockedBack);
            }
            return None;
        }

        if player.is_headbutting() && player.headbutt_zone().overlaps_wrapped(&hitbox, arena_width) {
            return match info.stomp {
                StompMode::Hurt => player.hurt(true, events).then_some(Contact::HurtPlayer),
                _ if info.can_be_headbutted => {
                    self.knockback(player.face);
                    events.push(GameEvent::Knockback);
                    Some(Contact::KnockedBack)
                }
                _ => {
                    player.stop_headbutt();
                    player.directional_bump(Vec2::new(-player.face, -0.5).normalize(), DEFLECT_SPEED);
                    Some(Contact::Deflected)
                }
            };
        }

        if player.body.speed.y > STOMP_MIN_SPEED
            && player.stomp_zone().overlaps_wrapped(&hitbox, arena_width)
        {
            return match info.stomp {
                StompMode::Stomp => {
                    self.flatten();
                    player.stomp_bounce(STOMP_JUMP_SPEED);
                    events.push(GameEvent::Stomp);
                    Some(Contact::Stomped)
                }
                StompMode::Bounce => {
                    self.bounce_timer = BOUNCE_RECOVER_TIME;
                    player.stomp_bounce(BOUNCE_JUMP_SPEED);
                    events.push(GameEvent::Bounce);
                    Some(Contact::Bounced)
                }
                StompMode::Hurt => player.hurt(true, events).then_some(Contact::HurtPlayer),
            };
        }

        player
            .hurt_collision(&hitbox, true, events)
            .then_some(Contact::HurtPlayer)
    }

    /// One-directional enemy/enemy contact: a knocked-back enemy knocks others
    /// away, and pushers turn movable patrollers around.
    ///
    /// Returns true when `other` was knocked back by `self`.
    pub fn enemy_collision(&self, other: &mut Enemy, arena_width: f32) -> bool {
        if !self.body.exists || !other.body.is_active() {
            return false;
        }
        if !self
            .body
            .hitbox_aabb()
            .overlaps_wrapped(&other.body.hitbox_aabb(), arena_width)
        {
            return false;
        }

        let mut dx = other.body.pos.x - self.body.pos.x;
        if dx > arena_width / 2.0 {
            dx -= arena_width;
        } else if dx < -arena_width / 2.0 {
            dx += arena_width;
        }
        let away = if dx < 0.0 { -1.0 } else { 1.0 };

        let other_info = other.species.info();
        if self.is_knocked_back() {
            if other_info.can_be_headbutted && other_info.stomp != StompMode::Hurt {
                other.knockback(away);
                return true;
            }
            return false;
        }

        if self.body.is_active()
            && self.species.info().can_move_others
            && other_info.can_be_moved
            && other_info.check_edges
            && other.dir != away
        {
            species::edge_event(other);
        }
        false
    }
}

impl TerrainBody for Enemy {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn collides_with_terrain(&self) -> bool {
        let info = self.species.info();
        self.body.is_active() && (info.fixed_y || info.check_edges)
    }

    fn ignores_floor(&self, _tile: Tile) -> bool {
        !self.species.info().fixed_y
    }

    fn floor_event(&mut self, _tile: Tile, platform: PlatformRef, _events: &mut Vec<GameEvent>) {
        self.platform = Some(platform);
    }

    fn reacts_to_edges(&self) -> bool {
        self.body.is_active() && self.species.info().check_edges
    }

    fn edge_event(&mut self) {
        species::edge_event(self);
    }

    // Spikes never hurt enemies
    fn hazard_event(&mut self, _hazard: &Aabb, _events: &mut Vec<GameEvent>) {}
}
