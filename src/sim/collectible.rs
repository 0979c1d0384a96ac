//! Pickups and purely visual particles

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Rect};
use super::physics::Body;
use super::platform::TerrainBody;
use super::player::Player;
use super::pool::Poolable;
use super::random;
use super::state::{GameEvent, StepEvent};
use crate::consts::{BASE_GRAVITY, TILE_HEIGHT};
use crate::wrap_x;

/// Vanish animation speed once collected (normalized timer per tick)
pub const VANISH_SPEED: f32 = 1.0 / 20.0;
/// Highest chance of seeding a heart, reached when several lives are missing
pub const MAX_HEART_CHANCE: f32 = 0.3;
pub const HEART_CHANCE_PER_LIFE: f32 = 0.08;
const GEM_CHANCE: [f32; 2] = [0.08, 0.15];
const STAR_CHANCE: [f32; 2] = [0.02, 0.06];
const DROP_FRICTION: Vec2 = Vec2::new(0.05, 0.15);
const VANISH_RISE: f32 = 0.5;

const COLLISION_BOX: Rect = Rect::new(0.0, 0.0, 10.0, 10.0);
const HITBOX: Rect = Rect::new(0.0, 0.0, 12.0, 12.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectibleKind {
    #[default]
    Coin,
    Gem,
    Heart,
    Star,
}

impl CollectibleKind {
    /// Anything but a coin; at most one per platform row
    pub fn is_special(self) -> bool {
        self != CollectibleKind::Coin
    }

    pub fn points(self) -> u32 {
        match self {
            CollectibleKind::Coin => 10,
            CollectibleKind::Gem => 50,
            CollectibleKind::Heart | CollectibleKind::Star => 0,
        }
    }

    /// Pick a kind for a new row. Hearts grow likelier as lives go missing.
    pub fn sample<R: Rng + ?Sized>(
        rng: &mut R,
        weight: f32,
        missing_lives: u8,
        special_allowed: bool,
    ) -> Self {
        if !special_allowed {
            return CollectibleKind::Coin;
        }
        let t = weight.clamp(0.0, 1.0);
        let gem = GEM_CHANCE[0] + (GEM_CHANCE[1] - GEM_CHANCE[0]) * t;
        let star = STAR_CHANCE[0] + (STAR_CHANCE[1] - STAR_CHANCE[0]) * t;
        let heart = (f32::from(missing_lives) * HEART_CHANCE_PER_LIFE).min(MAX_HEART_CHANCE);
        let coin = (1.0 - gem - star - heart).max(0.0);

        match random::sample_weighted(rng, &[coin, gem, heart, star]) {
            0 => CollectibleKind::Coin,
            1 => CollectibleKind::Gem,
            2 => CollectibleKind::Heart,
            _ => CollectibleKind::Star,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collectible {
    pub body: Body,
    pub kind: CollectibleKind,
    /// Dropped pickups fall and land; seeded ones ride their row
    pub dynamic: bool,
    /// 0 -> 1 after being collected
    pub vanish_timer: f32,
    pub frame: f32,
}

impl Poolable for Collectible {
    fn exists(&self) -> bool {
        self.body.exists
    }

    fn force_kill(&mut self) {
        self.body.force_kill();
    }
}

impl Collectible {
    pub fn spawn(&mut self, kind: CollectibleKind, pos: Vec2, speed: Vec2, dynamic: bool) {
        *self = Self {
            body: Body::new(pos, COLLISION_BOX, HITBOX),
            kind,
            dynamic,
            ..Default::default()
        };
        self.body.respawn(pos, speed);
        if dynamic {
            self.body.friction = DROP_FRICTION;
            self.body.target = Vec2::new(0.0, BASE_GRAVITY);
        }
    }

    pub fn update(&mut self, global_speed: f32, step: &StepEvent) {
        if !self.body.exists {
            return;
        }
        let dt = step.tick;

        if self.body.dying {
            self.vanish_timer += VANISH_SPEED * dt;
            self.body.pos.y -= VANISH_RISE * dt;
            if self.vanish_timer >= 1.0 {
                self.body.finish_death();
            }
            return;
        }

        self.frame = (self.frame + dt / 8.0) % 4.0;
        if self.dynamic {
            self.body.target = Vec2::new(0.0, BASE_GRAVITY);
        } else {
            self.body.speed = Vec2::new(0.0, -global_speed);
            self.body.target = self.body.speed;
        }
        self.body.integrate(dt);
        self.body.pos.x = wrap_x(self.body.pos.x, step.screen_width);

        if self.body.pos.y < -TILE_HEIGHT || self.body.pos.y > step.screen_height + TILE_HEIGHT {
            self.body.force_kill();
        }
    }

    /// Apply the pickup if the player touches it. Returns the points awarded.
    pub fn player_collision(
        &mut self,
        player: &mut Player,
        arena_width: f32,
        events: &mut Vec<GameEvent>,
    ) -> Option<u32> {
        if !self.body.is_active() || !player.is_active() {
            return None;
        }
        if !player
            .body
            .hitbox_aabb()
            .overlaps_wrapped(&self.body.hitbox_aabb(), arena_width)
        {
            return None;
        }

        match self.kind {
            CollectibleKind::Coin => player.stats.add_coins(1),
            CollectibleKind::Gem => player.stats.add_coins(5),
            CollectibleKind::Heart => player.stats.change_lives(1),
            CollectibleKind::Star => player.start_invincibility(),
        }
        let points = match self.kind.points() {
            0 => 0,
            p => player.stats.add_points(p),
        };

        self.body.start_dying();
        self.vanish_timer = 0.0;
        events.push(GameEvent::Collect(self.kind));
        log::debug!("collected {:?}", self.kind);
        Some(points)
    }
}

impl TerrainBody for Collectible {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn collides_with_terrain(&self) -> bool {
        self.dynamic && self.body.is_active()
    }

    fn hazard_event(&mut self, _hazard: &Aabb, _events: &mut Vec<GameEvent>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleKind {
    #[default]
    Dust,
    Star,
    /// Score pop-up showing the awarded points
    Text(u32),
}

/// Short-lived visual effect
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub speed: Vec2,
    pub kind: ParticleKind,
    /// Normalized lifetime, removed at 1
    pub timer: f32,
    pub timer_speed: f32,
    pub exists: bool,
}

impl Poolable for Particle {
    fn exists(&self) -> bool {
        self.exists
    }

    fn force_kill(&mut self) {
        self.exists = false;
    }
}

impl Particle {
    pub fn spawn(&mut self, kind: ParticleKind, pos: Vec2, speed: Vec2, timer_speed: f32) {
        *self = Self {
            pos,
            speed,
            kind,
            timer: 0.0,
            timer_speed,
            exists: true,
        };
    }

    pub fn update(&mut self, dt: f32) {
        if !self.exists {
            return;
        }
        self.pos += self.speed * dt;
        self.timer += self.timer_speed * dt;
        if self.timer >= 1.0 {
            self.exists = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::seeded;
    use crate::sim::stats::Stats;

    fn step() -> StepEvent {
        StepEvent::new(1.0, 256.0, 240.0)
    }

    fn player_at(pos: Vec2) -> Player {
        Player::new(pos, Stats::new(3), 256.0)
    }

    #[test]
    fn test_no_hearts_at_full_health() {
        let mut rng = seeded(21);
        for _ in 0..2000 {
            assert_ne!(CollectibleKind::sample(&mut rng, 1.0, 0, true), CollectibleKind::Heart);
        }
        for _ in 0..100 {
            assert_eq!(CollectibleKind::sample(&mut rng, 1.0, 3, false), CollectibleKind::Coin);
        }
    }

    #[test]
    fn test_coin_pickup_vanishes() {
        let mut c = Collectible::default();
        c.spawn(CollectibleKind::Coin, Vec2::new(100.0, 100.0), Vec2::ZERO, false);
        let mut player = player_at(Vec2::new(104.0, 98.0));
        let mut events = Vec::new();

        assert_eq!(c.player_collision(&mut player, 256.0, &mut events), Some(10));
        assert_eq!(player.stats.coins, 1);
        assert_eq!(events, vec![GameEvent::Collect(CollectibleKind::Coin)]);
        assert!(c.body.dying);

        // Already collected: no second pickup while vanishing
        assert_eq!(c.player_collision(&mut player, 256.0, &mut events), None);

        for _ in 0..25 {
            c.update(1.0, &step());
        }
        assert!(!c.body.exists);
    }

    #[test]
    fn test_star_grants_invincibility() {
        let mut c = Collectible::default();
        c.spawn(CollectibleKind::Star, Vec2::new(100.0, 100.0), Vec2::ZERO, false);
        let mut player = player_at(Vec2::new(100.0, 100.0));
        c.player_collision(&mut player, 256.0, &mut Vec::new());
        assert!(player.is_invincible());
    }

    #[test]
    fn test_static_pickup_rides_the_scroll() {
        let mut c = Collectible::default();
        c.spawn(CollectibleKind::Gem, Vec2::new(100.0, 100.0), Vec2::ZERO, false);
        c.update(1.5, &step());
        assert_eq!(c.body.pos.y, 98.5);
        assert!(!c.collides_with_terrain());
    }

    #[test]
    fn test_particle_expires() {
        let mut p = Particle::default();
        p.spawn(ParticleKind::Text(50), Vec2::ZERO, Vec2::new(0.0, -0.5), 0.25);
        for _ in 0..3 {
            p.update(1.0);
        }
        assert!(p.exists);
        p.update(1.0);
        assert!(!p.exists);
        assert_eq!(p.pos.y, -2.0);
    }
}
