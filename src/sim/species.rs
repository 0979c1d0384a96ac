//! Enemy species: capability table and per-species behavior hooks
//!
//! Species form a closed set, so behavior is a `match` on the tag instead of
//! one type per species. Hooks a species does not need fall through to no-ops.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collectible::{Particle, ParticleKind};
use super::enemy::{Contact, ENEMY_SIZE, Enemy};
use super::player::Player;
use super::pool::Pool;
use super::random::{self, WeightTable};
use super::state::{GameEvent, StepEvent};
use crate::consts::{PLATFORM_OFFSET, TILE_HEIGHT, TILE_WIDTH};
use crate::wrap_x;

/// How an enemy responds to being stomped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StompMode {
    /// Flattened and removed
    Stomp,
    /// Damages the player instead
    Hurt,
    /// Bounces the player and survives
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Species {
    #[default]
    Slime,
    SpikeSlime,
    Dog,
    Mushroom,
    Apple,
    Bird,
    Bat,
    SpikeBat,
    Rabbit,
    Bumper,
    Missile,
}

/// Static capabilities of a species
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesInfo {
    pub stomp: StompMode,
    /// Turned around by enemies that push others
    pub can_be_moved: bool,
    pub can_be_headbutted: bool,
    pub can_move_others: bool,
    /// Touching it hurts the player
    pub harmful: bool,
    /// Turns at platform edges and spikes
    pub check_edges: bool,
    /// Locked to standing height on its platform
    pub fixed_y: bool,
    /// Offset of the anchor point from standing height (positive is down)
    pub platform_offset: f32,
    /// Multiplier on the species' own motion speed
    pub speed_factor: f32,
}

const BASE_INFO: SpeciesInfo = SpeciesInfo {
    stomp: StompMode::Stomp,
    can_be_moved: true,
    can_be_headbutted: true,
    can_move_others: true,
    harmful: true,
    check_edges: false,
    fixed_y: true,
    platform_offset: 0.0,
    speed_factor: 1.0,
};

/// Spawn weights over `Species::SEEDED`
pub const SPECIES_WEIGHTS: WeightTable = WeightTable::new(
    &[0.35, 0.05, 0.25, 0.05, 0.15, 0.10, 0.05, 0.00, 0.00, 0.00],
    &[0.05, 0.10, 0.10, 0.10, 0.10, 0.10, 0.10, 0.10, 0.15, 0.10],
);

/// Radius of the rabbit's circle around its anchor
pub const RABBIT_RADIUS: f32 = std::f32::consts::SQRT_2 * TILE_WIDTH * 1.5;

const DOG_SPEED: f32 = 0.33;
const MUSHROOM_SPEED: f32 = 0.5;
const APPLE_SPEED: f32 = 0.5;
const APPLE_WAVE_SPEED: f32 = TAU / 60.0;
const APPLE_AMPLITUDE: f32 = 4.0;
const BIRD_SPEED: f32 = 0.33;
const BIRD_WAVE_SPEED: f32 = TAU / 120.0;
const BIRD_AMPLITUDE: f32 = 2.0;
const BAT_WAVE_SPEED: f32 = TAU / 120.0;
const RABBIT_ROTATION_SPEED: f32 = TAU / 120.0;
/// Share of the scroll speed above 1 that speeds up wanderers
const GLOBAL_SPEED_WEIGHT: f32 = 0.5;

/// Bumper expand animation, also its contact cooldown
pub const BUMPER_EXPAND_TIME: f32 = 12.0;
const BUMPER_DISTANCE: f32 = 16.0;
const BUMPER_SPEED: f32 = 3.5;

pub const MISSILE_ENTRANCE_TIME: f32 = 72.0;
const MISSILE_ENTRANCE_WAIT: f32 = 16.0;
const MISSILE_ENTRANCE_SPEED: f32 = ENEMY_SIZE / MISSILE_ENTRANCE_TIME;
const MISSILE_SPEED: f32 = 6.0;
const MISSILE_SPEED_GAIN: f32 = 0.5;
const MISSILE_DUST_INTERVAL: f32 = 5.0;
const MISSILE_DUST_VANISH: f32 = 1.0 / 30.0;

impl Species {
    /// Species placed on platforms by the generator, in weight order
    pub const SEEDED: [Species; 10] = [
        Species::Slime,
        Species::SpikeSlime,
        Species::Dog,
        Species::Mushroom,
        Species::Apple,
        Species::Bird,
        Species::Bat,
        Species::SpikeBat,
        Species::Rabbit,
        Species::Bumper,
    ];

    /// Pick a platform species for the current progression weight
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, weight: f32) -> Species {
        Self::SEEDED[SPECIES_WEIGHTS.sample(rng, weight).min(Self::SEEDED.len() - 1)]
    }

    pub fn info(self) -> SpeciesInfo {
        match self {
            Species::Slime => BASE_INFO,
            Species::SpikeSlime => SpeciesInfo {
                stomp: StompMode::Hurt,
                can_be_moved: false,
                ..BASE_INFO
            },
            Species::Dog => SpeciesInfo {
                check_edges: true,
                ..BASE_INFO
            },
            Species::Mushroom => SpeciesInfo {
                stomp: StompMode::Bounce,
                check_edges: true,
                ..BASE_INFO
            },
            Species::Apple => SpeciesInfo {
                fixed_y: false,
                platform_offset: -TILE_HEIGHT,
                ..BASE_INFO
            },
            Species::Bird => SpeciesInfo {
                can_be_headbutted: false,
                check_edges: true,
                fixed_y: false,
                platform_offset: -TILE_HEIGHT * 0.75,
                ..BASE_INFO
            },
            Species::Bat => SpeciesInfo {
                can_be_moved: false,
                fixed_y: false,
                platform_offset: -TILE_HEIGHT,
                ..BASE_INFO
            },
            Species::SpikeBat => SpeciesInfo {
                stomp: StompMode::Hurt,
                speed_factor: 1.25,
                ..Species::Bat.info()
            },
            Species::Rabbit => SpeciesInfo {
                can_be_moved: false,
                can_move_others: false,
                fixed_y: false,
                platform_offset: ENEMY_SIZE / 2.0 + TILE_HEIGHT / 2.0,
                ..BASE_INFO
            },
            Species::Bumper => SpeciesInfo {
                stomp: StompMode::Bounce,
                can_be_moved: false,
                can_be_headbutted: false,
                can_move_others: false,
                harmful: false,
                platform_offset: TILE_HEIGHT + TILE_HEIGHT / 4.0,
                ..BASE_INFO
            },
            Species::Missile => SpeciesInfo {
                can_be_moved: false,
                can_move_others: false,
                harmful: false,
                fixed_y: false,
                ..BASE_INFO
            },
        }
    }

    /// Species that replace the default player collision entirely
    pub fn overrides_player_contact(self) -> bool {
        self == Species::Bumper
    }

    /// Wraps around the arena instead of leaving it
    pub fn wraps(self) -> bool {
        self != Species::Missile
    }
}

/// Wander speed multiplier derived from the scroll speed
fn speed_weight(global_speed: f32) -> f32 {
    1.0 + (global_speed - 1.0).max(0.0) * GLOBAL_SPEED_WEIGHT
}

fn patrol(e: &mut Enemy, speed: f32) {
    e.body.target.x = e.dir * speed;
    e.body.speed.x = e.body.target.x;
}

/// Per-species setup after the shared spawn
pub(super) fn spawn_event<R: Rng + ?Sized>(e: &mut Enemy, rng: &mut R, arena_width: f32) {
    match e.species {
        // Full turn can start a bat too high above its platform
        Species::Bat | Species::SpikeBat => e.phase = random::range(rng, 0.0, PI),
        Species::Apple | Species::Bird | Species::Rabbit => {
            e.phase = random::range(rng, 0.0, TAU);
        }
        Species::Missile => {
            e.dir = if e.body.pos.x < arena_width / 2.0 { 1.0 } else { -1.0 };
            e.body.pos.x -= ENEMY_SIZE * e.dir;
            e.body.friction.x = 0.05;
        }
        _ => {}
    }
}

/// Species motion for one active tick, written into the body's target velocity
/// (or directly into position for species that follow a closed path)
pub(super) fn update_ai(
    e: &mut Enemy,
    global_speed: f32,
    step: &StepEvent,
    particles: &mut Pool<Particle>,
) {
    let dt = step.tick;
    let info = e.species.info();

    match e.species {
        Species::Slime | Species::SpikeSlime | Species::Bumper => {}
        Species::Dog => patrol(e, global_speed * DOG_SPEED),
        Species::Mushroom => patrol(e, global_speed * MUSHROOM_SPEED),
        Species::Apple => {
            let w = speed_weight(global_speed);
            patrol(e, w * APPLE_SPEED);
            e.phase = (e.phase + APPLE_WAVE_SPEED * w * dt) % TAU;
            e.body.pos.y = e.base_y + e.phase.sin() * APPLE_AMPLITUDE;
        }
        Species::Bird => {
            let w = speed_weight(global_speed);
            patrol(e, w * BIRD_SPEED);
            e.phase = (e.phase + BIRD_WAVE_SPEED * w * dt) % TAU;
            e.body.pos.y = e.base_y + e.phase.sin() * BIRD_AMPLITUDE;
        }
        Species::Bat | Species::SpikeBat => {
            let amplitude = (PLATFORM_OFFSET - 2.0) * TILE_WIDTH / 2.0;
            e.phase = (e.phase + BAT_WAVE_SPEED * global_speed * info.speed_factor * dt) % TAU;
            e.body.pos.y = e.base_y + e.phase.sin() * amplitude;
        }
        Species::Rabbit => {
            let w = speed_weight(global_speed);
            e.phase = (e.phase + RABBIT_ROTATION_SPEED * w * dt) % TAU;
            e.body.pos.x = wrap_x(
                e.anchor_x + e.dir * e.phase.cos() * RABBIT_RADIUS,
                step.screen_width,
            );
            e.body.pos.y = e.base_y + e.phase.sin() * RABBIT_RADIUS;
        }
        Species::Missile => missile_ai(e, global_speed, step, particles),
    }
}

/// Warning entrance at the screen side, then a straight dash across
fn missile_ai(e: &mut Enemy, global_speed: f32, step: &StepEvent, particles: &mut Pool<Particle>) {
    let dt = step.tick;

    if !e.harmful {
        if e.entrance_timer < MISSILE_ENTRANCE_TIME {
            e.body.pos.x += e.dir * MISSILE_ENTRANCE_SPEED * dt;
        }
        e.entrance_timer += dt;

        if e.entrance_timer < MISSILE_ENTRANCE_TIME + MISSILE_ENTRANCE_WAIT {
            return;
        }
        e.body.speed = Vec2::ZERO;
        e.body.target.x = (1.0 + MISSILE_SPEED_GAIN * global_speed) * MISSILE_SPEED * e.dir;
        e.harmful = true;
        log::debug!("missile launched, dir {}", e.dir);
    }

    e.body.speed.y = -global_speed;
    e.body.target.y = e.body.speed.y;

    let half = ENEMY_SIZE / 2.0;
    if (e.dir > 0.0 && e.body.pos.x >= step.screen_width + half) || (e.dir < 0.0 && e.body.pos.x < -half) {
        e.body.force_kill();
        return;
    }

    e.dust_timer += dt;
    if e.dust_timer >= MISSILE_DUST_INTERVAL {
        e.dust_timer %= MISSILE_DUST_INTERVAL;
        let pos = e.body.pos - Vec2::new(half * e.dir, 0.0);
        let slot = particles.acquire();
        particles[slot].spawn(ParticleKind::Dust, pos, Vec2::ZERO, MISSILE_DUST_VANISH);
    }
}

/// Reverse a patrolling enemy
pub(super) fn edge_event(e: &mut Enemy) {
    e.dir = -e.dir;
    e.body.target.x = -e.body.target.x;
    e.body.speed.x = e.body.target.x;
}

/// Bumper contact: push the player radially away and play the expand animation
pub(super) fn bumper_contact(
    e: &mut Enemy,
    player: &mut Player,
    arena_width: f32,
    events: &mut Vec<GameEvent>,
) -> Option<Contact> {
    if e.bounce_timer > 0.0 {
        return None;
    }

    let mut delta = player.body.pos - e.body.pos;
    if delta.x > arena_width / 2.0 {
        delta.x -= arena_width;
    } else if delta.x < -arena_width / 2.0 {
        delta.x += arena_width;
    }
    if delta.length() >= BUMPER_DISTANCE {
        return None;
    }

    let dir = delta.try_normalize().unwrap_or(Vec2::NEG_Y);
    player.directional_bump(dir, BUMPER_SPEED);
    e.bounce_timer = BUMPER_EXPAND_TIME;
    events.push(GameEvent::Bounce);
    Some(Contact::Bumped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::Platform;
    use crate::sim::random::seeded;

    #[test]
    fn test_capability_table() {
        assert_eq!(Species::SpikeSlime.info().stomp, StompMode::Hurt);
        assert!(!Species::SpikeSlime.info().can_be_moved);
        assert_eq!(Species::Mushroom.info().stomp, StompMode::Bounce);
        assert!(!Species::Bird.info().can_be_headbutted);
        assert_eq!(Species::SpikeBat.info().speed_factor, 1.25);
        assert!(!Species::SpikeBat.info().fixed_y);
        assert!(!Species::Bumper.info().harmful);
        assert!(Species::Bumper.overrides_player_contact());
        assert!(!Species::Missile.wraps());
    }

    #[test]
    fn test_weights_cover_seeded_species() {
        assert_eq!(SPECIES_WEIGHTS.initial.len(), Species::SEEDED.len());
        assert_eq!(SPECIES_WEIGHTS.last.len(), Species::SEEDED.len());
        let sum: f32 = SPECIES_WEIGHTS.last.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    fn step() -> StepEvent {
        StepEvent::new(1.0, 256.0, 240.0)
    }

    fn loose_enemy(species: Species, pos: Vec2) -> Enemy {
        let mut rng = seeded(3);
        let mut e = Enemy::default();
        e.spawn(&mut rng, species, pos, None, 256.0);
        e
    }

    #[test]
    fn test_bumper_pushes_player_away() {
        let mut bumper = loose_enemy(Species::Bumper, Vec2::new(100.0, 100.0));
        let mut player = Player::new(bumper.body.pos - Vec2::new(0.0, 10.0), Default::default(), 256.0);
        player.body.speed.y = 2.0;
        let mut events = Vec::new();

        let contact = bumper.player_collision(&mut player, 256.0, &mut events);

        assert_eq!(contact, Some(Contact::Bumped));
        assert_eq!(player.body.speed, Vec2::new(0.0, -BUMPER_SPEED));
        assert_eq!(bumper.bounce_timer, BUMPER_EXPAND_TIME);
        assert_eq!(events, vec![GameEvent::Bounce]);
        // Never the default hurt path
        assert_eq!(player.stats.lives, player.stats.max_lives);
        assert!(bumper.body.is_active());
    }

    #[test]
    fn test_bumper_push_follows_the_wrap() {
        let mut bumper = loose_enemy(Species::Bumper, Vec2::new(2.0, 100.0));
        let mut player = Player::new(Vec2::new(250.0, 100.0), Default::default(), 256.0);
        let mut events = Vec::new();

        assert_eq!(
            species_contact(&mut bumper, &mut player, &mut events),
            Some(Contact::Bumped)
        );
        assert!(player.body.speed.x < 0.0, "pushed away across the border");
    }

    fn species_contact(e: &mut Enemy, player: &mut Player, events: &mut Vec<GameEvent>) -> Option<Contact> {
        bumper_contact(e, player, 256.0, events)
    }

    #[test]
    fn test_bumper_cooldown() {
        let platforms: Pool<Platform> = Pool::new();
        let mut particles = Pool::new();
        let mut bumper = loose_enemy(Species::Bumper, Vec2::new(100.0, 100.0));
        let mut events = Vec::new();

        let above = bumper.body.pos - Vec2::new(0.0, 10.0);
        let mut player = Player::new(above, Default::default(), 256.0);
        assert!(species_contact(&mut bumper, &mut player, &mut events).is_some());

        let mut again = Player::new(above, Default::default(), 256.0);
        assert_eq!(species_contact(&mut bumper, &mut again, &mut events), None);

        for _ in 0..BUMPER_EXPAND_TIME as usize {
            bumper.update(&platforms, 1.0, &step(), &mut particles);
        }
        assert_eq!(bumper.bounce_timer, 0.0);
        let mut later = Player::new(bumper.body.pos - Vec2::new(0.0, 10.0), Default::default(), 256.0);
        assert!(species_contact(&mut bumper, &mut later, &mut events).is_some());

        let mut far = Player::new(bumper.body.pos - Vec2::new(0.0, 20.0), Default::default(), 256.0);
        bumper.bounce_timer = 0.0;
        assert_eq!(species_contact(&mut bumper, &mut far, &mut events), None);
    }

    #[test]
    fn test_missile_lifecycle() {
        let platforms: Pool<Platform> = Pool::new();
        let mut particles = Pool::new();
        let mut missile = loose_enemy(Species::Missile, Vec2::new(0.0, 200.0));
        assert_eq!(missile.dir, 1.0);
        assert_eq!(missile.body.pos.x, -ENEMY_SIZE);

        let entrance = (MISSILE_ENTRANCE_TIME + MISSILE_ENTRANCE_WAIT) as usize;
        for _ in 0..entrance - 1 {
            missile.update(&platforms, 1.0, &step(), &mut particles);
            assert!(!missile.harmful, "harmless during the entrance");
            assert!(missile.body.exists);
        }
        assert!((missile.body.pos.x - 0.0).abs() < 1e-3);

        missile.update(&platforms, 1.0, &step(), &mut particles);
        assert!(missile.harmful);

        let mut ticks = 0;
        while missile.body.exists {
            let x = missile.body.pos.x;
            missile.update(&platforms, 1.0, &step(), &mut particles);
            assert!(missile.body.pos.x >= x, "never turns back");
            ticks += 1;
            assert!(ticks < 600, "missile never left the screen");
        }
        assert!(missile.body.pos.x >= 256.0 + ENEMY_SIZE / 2.0);
        assert!(particles.live_count() > 0, "dust trail");
    }

    #[test]
    fn test_early_runs_never_seed_late_species() {
        let mut rng = seeded(17);
        for _ in 0..2000 {
            let s = Species::sample(&mut rng, 0.0);
            assert!(!matches!(s, Species::SpikeBat | Species::Rabbit | Species::Bumper));
        }
    }
}
