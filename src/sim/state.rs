//! Game state and per-tick orchestration
//!
//! All state that determines a run lives here, including the RNG, so a seed
//! plus an input sequence reproduces the run exactly.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collectible::{Collectible, CollectibleKind, Particle, ParticleKind};
use super::collision::Aabb;
use super::enemy::{Contact, ENEMY_SIZE, Enemy};
use super::generator::{self, COLLECTIBLE_COUNT_WEIGHTS, ENEMY_COUNT_WEIGHTS};
use super::input::TickInput;
use super::platform::{Platform, PlatformRef};
use super::player::Player;
use super::pool::Pool;
use super::random::{self, seeded};
use super::species::Species;
use super::stats::Stats;
use super::tick::Progression;
use crate::consts::*;
use crate::settings::Difficulty;

/// Depth of the hazard band at the top of the screen
pub const CEILING_DEPTH: f32 = 4.0;
/// Delay before the first missile wave, in ticks
pub const MISSILE_INITIAL_DELAY: [f32; 2] = [2700.0, 4800.0];
/// Delay between waves: (min, max) at progression 0, then at progression 1
pub const MISSILE_DELAY_MIN: [f32; 2] = [300.0, 120.0];
pub const MISSILE_DELAY_MAX: [f32; 2] = [600.0, 180.0];
/// Extra missiles per wave (0 or 1), blended by progression
pub const MISSILE_EXTRA_WEIGHTS: random::WeightTable =
    random::WeightTable::new(&[1.0, 0.0], &[0.6, 0.4]);
pub const MISSILE_MIN_Y: f32 = 32.0;

const STOMP_POINTS: u32 = 50;
const HEADBUTT_POINTS: u32 = 100;
const BOUNCE_POINTS: u32 = 10;
const TEXT_SPEED: Vec2 = Vec2::new(0.0, -0.5);
const TEXT_VANISH: f32 = 1.0 / 40.0;
const STAR_VANISH: f32 = 1.0 / 20.0;
/// Upward kick of the coin dropped by a knocked-back enemy
const DROP_SPEED: Vec2 = Vec2::new(0.0, -3.0);

/// Something that happened during a tick, for audio and other observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    Jump,
    DoubleJump,
    Headbutt,
    Stomp,
    Bounce,
    Hurt,
    Death,
    Collect(CollectibleKind),
    MissileWarning,
    Knockback,
}

/// Timing and arena extent of the step being simulated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Simulation time units covered by this step
    pub tick: f32,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl StepEvent {
    pub const fn new(tick: f32, screen_width: f32, screen_height: f32) -> Self {
        Self {
            tick,
            screen_width,
            screen_height,
        }
    }
}

impl Default for StepEvent {
    fn default() -> Self {
        Self::new(TICK, SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub difficulty: Difficulty,
    pub platforms: Pool<Platform>,
    pub enemies: Pool<Enemy>,
    pub collectibles: Pool<Collectible>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Pool<Particle>,
    pub player: Player,
    pub progression: Progression,
    /// Ticks until the next missile wave
    pub missile_timer: f32,
    /// Entry side of the next missile, -1 left or 1 right
    missile_side: f32,
    next_generation: u32,
    /// Events recorded during the last tick
    pub events: Vec<GameEvent>,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Create a state with the given seed and start a run
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        let mut state = Self {
            seed,
            rng: seeded(seed),
            difficulty,
            platforms: Pool::new(),
            enemies: Pool::new(),
            collectibles: Pool::new(),
            particles: Pool::new(),
            player: Player::new(Vec2::ZERO, Stats::default(), SCREEN_WIDTH),
            progression: Progression::default(),
            missile_timer: 0.0,
            missile_side: -1.0,
            next_generation: 0,
            events: Vec::new(),
            time_ticks: 0,
        };
        state.reset(difficulty, Stats::new(difficulty.lives()));
        state
    }

    /// Start a new run. The RNG stream continues, so consecutive runs differ.
    pub fn reset(&mut self, difficulty: Difficulty, stats: Stats) {
        self.difficulty = difficulty;
        self.platforms.flush();
        self.enemies.flush();
        self.collectibles.flush();
        self.particles.flush();
        self.events.clear();
        self.progression = Progression::default();
        self.time_ticks = 0;
        self.missile_side = -1.0;

        let spacing = PLATFORM_OFFSET * TILE_HEIGHT;
        let mut y = INITIAL_PLATFORM_Y;
        let mut initial = true;
        while y < SCREEN_HEIGHT + TILE_HEIGHT {
            self.spawn_platform(y, initial, 0.0, 0);
            initial = false;
            y += spacing;
        }

        // Feet on the first row
        let start = Vec2::new(SCREEN_WIDTH / 2.0, INITIAL_PLATFORM_Y - 8.0);
        self.player = Player::new(start, stats, SCREEN_WIDTH);

        self.missile_timer = random::range(
            &mut self.rng,
            MISSILE_INITIAL_DELAY[0],
            MISSILE_INITIAL_DELAY[1],
        );
        log::info!(
            "run reset: difficulty {}, seed {}, {} rows",
            difficulty.as_str(),
            self.seed,
            self.platforms.live_count()
        );
    }

    /// Generate a row at `y` and seed it with enemies and collectibles
    pub fn spawn_platform(&mut self, y: f32, initial: bool, weight: f32, missing_lives: u8) {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);

        let slot = self.platforms.acquire();
        self.platforms[slot].spawn(&mut self.rng, y, PLATFORM_WIDTH, initial, generation);
        if initial {
            return;
        }

        let reference = PlatformRef { slot, generation };
        let platform = &self.platforms[slot];

        let count = ENEMY_COUNT_WEIGHTS.sample(&mut self.rng, weight);
        let enemy_tiles =
            generator::spawn_tiles(&mut self.rng, &platform.tiles, &platform.spikes, count, &[]);
        for &x in &enemy_tiles {
            let species = Species::sample(&mut self.rng, weight);
            let pos = Vec2::new(
                (x as f32 + 0.5) * TILE_WIDTH,
                platform.y - ENEMY_SIZE / 2.0,
            );
            let e = self.enemies.acquire();
            self.enemies[e].spawn(&mut self.rng, species, pos, Some(reference), SCREEN_WIDTH);
        }

        let count = COLLECTIBLE_COUNT_WEIGHTS.sample(&mut self.rng, weight);
        let item_tiles = generator::spawn_tiles(
            &mut self.rng,
            &platform.tiles,
            &platform.spikes,
            count,
            &enemy_tiles,
        );
        let mut special_allowed = true;
        for &x in &item_tiles {
            let kind = CollectibleKind::sample(&mut self.rng, weight, missing_lives, special_allowed);
            if kind.is_special() {
                special_allowed = false;
            }
            let pos = Vec2::new((x as f32 + 0.5) * TILE_WIDTH, platform.y - TILE_HEIGHT);
            let c = self.collectibles.acquire();
            self.collectibles[c].spawn(kind, pos, Vec2::ZERO, false);
        }
    }

    /// Advance every system one step, in a fixed order
    pub fn update(&mut self, weight: f32, global_speed: f32, input: &TickInput, step: &StepEvent) {
        self.events.clear();
        self.time_ticks += 1;
        let dt = step.tick;
        let width = step.screen_width;

        // Player
        self.player.update(input, step, &mut self.events);

        // Platforms vs player, then the screen borders
        for (slot, p) in self.platforms.slots().iter().enumerate() {
            let reference = PlatformRef {
                slot,
                generation: p.generation,
            };
            p.object_collision(reference, &mut self.player, step, &mut self.events);
        }
        if self.player.is_active() {
            let ceiling = Aabb::new(0.0, -step.screen_height, width, step.screen_height + CEILING_DEPTH);
            self.player.hurt_collision(&ceiling, false, &mut self.events);
            if self.player.body.pos.y > step.screen_height + TILE_HEIGHT {
                self.player.fall_out(&mut self.events);
            }
        }

        // Timed hazards
        if self.player.is_active() {
            self.update_missiles(weight, step);
        }

        // Entity updates
        for e in self.enemies.iter_mut() {
            e.update(&self.platforms, global_speed, step, &mut self.particles);
        }
        for c in self.collectibles.iter_mut() {
            c.update(global_speed, step);
        }
        for p in self.particles.iter_mut() {
            p.update(dt);
        }

        // Entities vs platforms
        for (slot, p) in self.platforms.slots().iter().enumerate() {
            let reference = PlatformRef {
                slot,
                generation: p.generation,
            };
            for e in self.enemies.iter_mut() {
                p.object_collision(reference, e, step, &mut self.events);
            }
            for c in self.collectibles.iter_mut() {
                p.object_collision(reference, c, step, &mut self.events);
            }
        }

        // Entities vs player
        for i in 0..self.enemies.len() {
            let contact =
                self.enemies[i].player_collision(&mut self.player, width, &mut self.events);
            if let Some(contact) = contact {
                let pos = self.enemies[i].body.pos;
                self.score_contact(contact, pos);
            }
        }
        for i in 0..self.collectibles.len() {
            let points =
                self.collectibles[i].player_collision(&mut self.player, width, &mut self.events);
            if let Some(points) = points.filter(|&p| p > 0) {
                let pos = self.collectibles[i].body.pos;
                self.spawn_particle(ParticleKind::Text(points), pos, TEXT_SPEED, TEXT_VANISH);
            }
        }

        // Entities vs entities
        let chained = enemy_pairs(self.enemies.slots_mut(), width);
        for pos in chained {
            self.score_contact(Contact::KnockedBack, pos);
        }

        // Scroll, recycle and refill the rows
        for p in self.platforms.iter_mut() {
            p.update(global_speed, dt);
        }
        let spacing = PLATFORM_OFFSET * TILE_HEIGHT;
        let missing = self.player.stats.missing_lives();
        while let Some(lowest) = self.lowest_platform_y() {
            let y = lowest + spacing;
            if y >= step.screen_height + TILE_HEIGHT {
                break;
            }
            self.spawn_platform(y, false, weight, missing);
        }

        if self.player.is_active() {
            self.player.stats.update(global_speed, dt);
        }
    }

    fn lowest_platform_y(&self) -> Option<f32> {
        self.platforms.iter().map(|p| p.y).reduce(f32::max)
    }

    fn update_missiles(&mut self, weight: f32, step: &StepEvent) {
        self.missile_timer -= step.tick;
        if self.missile_timer > 0.0 {
            return;
        }

        let count = 1 + MISSILE_EXTRA_WEIGHTS.sample(&mut self.rng, weight);
        for _ in 0..count {
            let x = if self.missile_side < 0.0 {
                0.0
            } else {
                step.screen_width
            };
            self.missile_side = -self.missile_side;
            let y = random::range(
                &mut self.rng,
                MISSILE_MIN_Y,
                step.screen_height - TILE_HEIGHT / 2.0,
            );
            let e = self.enemies.acquire();
            self.enemies[e].spawn(
                &mut self.rng,
                Species::Missile,
                Vec2::new(x, y),
                None,
                step.screen_width,
            );
        }
        self.events.push(GameEvent::MissileWarning);
        log::info!("missile wave of {count}");

        let t = weight.clamp(0.0, 1.0);
        let min = MISSILE_DELAY_MIN[0] + (MISSILE_DELAY_MIN[1] - MISSILE_DELAY_MIN[0]) * t;
        let max = MISSILE_DELAY_MAX[0] + (MISSILE_DELAY_MAX[1] - MISSILE_DELAY_MAX[0]) * t;
        self.missile_timer = random::range(&mut self.rng, min, max);
    }

    /// Award points and effects for an enemy contact at `pos`
    fn score_contact(&mut self, contact: Contact, pos: Vec2) {
        let points = match contact {
            Contact::Stomped => {
                self.player.stats.increase_combo(1);
                for dir in [-1.0, 1.0] {
                    self.spawn_particle(ParticleKind::Star, pos, Vec2::new(dir, -1.0), STAR_VANISH);
                }
                self.player.stats.add_points(STOMP_POINTS)
            }
            Contact::KnockedBack => {
                let c = self.collectibles.acquire();
                self.collectibles[c].spawn(CollectibleKind::Coin, pos, DROP_SPEED, true);
                self.player.stats.add_points(HEADBUTT_POINTS)
            }
            Contact::Bounced | Contact::Bumped => self.player.stats.add_points(BOUNCE_POINTS),
            Contact::Deflected | Contact::HurtPlayer => 0,
        };
        if points > 0 {
            self.spawn_particle(ParticleKind::Text(points), pos, TEXT_SPEED, TEXT_VANISH);
        }
    }

    fn spawn_particle(&mut self, kind: ParticleKind, pos: Vec2, speed: Vec2, timer_speed: f32) {
        let slot = self.particles.acquire();
        self.particles[slot].spawn(kind, pos, speed, timer_speed);
    }

    pub fn is_player_dying(&self) -> bool {
        self.player.is_dying()
    }

    pub fn does_player_exist(&self) -> bool {
        self.player.body.exists
    }

    pub fn can_control_player(&self) -> bool {
        self.player.is_active()
    }

    pub fn player_position(&self) -> Vec2 {
        self.player.body.pos
    }

    pub fn is_player_invincible(&self) -> bool {
        self.player.is_invincible()
    }
}

/// Run one-directional contact for every ordered pair of enemies.
/// Returns the positions of enemies knocked back by a chain.
fn enemy_pairs(slots: &mut [Enemy], width: f32) -> Vec<Vec2> {
    let mut chained = Vec::new();
    for i in 0..slots.len() {
        for j in 0..slots.len() {
            if i == j {
                continue;
            }
            let (a, b) = if i < j {
                let (left, right) = slots.split_at_mut(j);
                (&left[i], &mut right[0])
            } else {
                let (left, right) = slots.split_at_mut(i);
                (&right[0], &mut left[j])
            };
            if a.enemy_collision(b, width) {
                chained.push(b.body.pos);
            }
        }
    }
    chained
}
