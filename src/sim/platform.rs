//! Scrolling terrain rows
//!
//! A platform is one row of tiles spanning the whole arena. Rows rise with the
//! global scroll speed and are recycled once they leave the top of the screen.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{edge_collision, floor_collision, Aabb};
use super::generator;
use super::physics::Body;
use super::pool::Poolable;
use super::state::{GameEvent, StepEvent};
use crate::consts::{TILE_HEIGHT, TILE_WIDTH};
use crate::{wrap_offsets, wrap_x};

/// Spike hazard box, centered on its tile and resting on the surface
pub const SPIKE_WIDTH: f32 = 10.0;
pub const SPIKE_HEIGHT: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Gap,
    Ground,
    /// Solid from above, can be dropped through
    Bridge,
}

impl Tile {
    pub fn is_solid(self) -> bool {
        self != Tile::Gap
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Decoration {
    #[default]
    None,
    BigBush,
    SmallBush,
    Rock,
    Mushroom,
    TallMushroom,
    Tree,
    FenceLeft,
    Fence,
    FenceRight,
}

impl Decoration {
    /// Scenery that may be scattered on ground tiles
    pub const SCENERY: [Decoration; 6] = [
        Decoration::BigBush,
        Decoration::SmallBush,
        Decoration::Rock,
        Decoration::Mushroom,
        Decoration::TallMushroom,
        Decoration::Tree,
    ];

    pub fn random_scenery<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::SCENERY[super::random::index(rng, Self::SCENERY.len())]
    }

    /// Width in tiles
    pub fn width(self) -> usize {
        match self {
            Decoration::BigBush => 2,
            _ => 1,
        }
    }

    pub fn is_fence(self) -> bool {
        matches!(
            self,
            Decoration::FenceLeft | Decoration::Fence | Decoration::FenceRight
        )
    }
}

/// Weak reference to a platform slot.
///
/// The generation distinguishes the original row from a later row spawned
/// into the same recycled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformRef {
    pub slot: usize,
    pub generation: u32,
}

/// Anything that collides with platform terrain.
///
/// Hooks default to no-ops; each entity overrides the reactions it has.
pub trait TerrainBody {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    /// Whether terrain collision runs for this entity this tick
    fn collides_with_terrain(&self) -> bool {
        self.body().is_active()
    }

    /// Skip landing on tiles of this kind (bridge drop-through)
    fn ignores_floor(&self, _tile: Tile) -> bool {
        false
    }

    /// Landed on a tile of `platform`
    fn floor_event(&mut self, _tile: Tile, _platform: PlatformRef, _events: &mut Vec<GameEvent>) {}

    /// Whether platform edges and spikes turn this entity around
    fn reacts_to_edges(&self) -> bool {
        false
    }

    fn edge_event(&mut self) {}

    /// Touched a hazard rectangle (spikes)
    fn hazard_event(&mut self, _hazard: &Aabb, _events: &mut Vec<GameEvent>) {}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Platform {
    /// Top surface
    pub y: f32,
    pub tiles: Vec<Tile>,
    pub spikes: Vec<bool>,
    pub decorations: Vec<Decoration>,
    pub exists: bool,
    pub generation: u32,
    /// First row of a run: plain centered ground, never seeded
    pub initial: bool,
}

impl Poolable for Platform {
    fn exists(&self) -> bool {
        self.exists
    }

    fn force_kill(&mut self) {
        self.exists = false;
    }
}

impl Platform {
    /// Generate a fresh row at height `y`
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        y: f32,
        width: usize,
        initial: bool,
        generation: u32,
    ) {
        self.tiles = generator::build_tiles(rng, width, initial);
        let n = self.tiles.len();

        if initial {
            self.spikes = vec![false; n];
            self.decorations = vec![Decoration::None; n];
        } else {
            self.spikes = generator::place_spikes(rng, &self.tiles);
            self.decorations = generator::place_decorations(rng, &self.tiles, &self.spikes);
        }

        self.y = y;
        self.generation = generation;
        self.initial = initial;
        self.exists = true;
    }

    /// Width in tiles
    pub fn width(&self) -> usize {
        self.tiles.len()
    }

    /// Width in world units
    pub fn span(&self) -> f32 {
        self.tiles.len() as f32 * TILE_WIDTH
    }

    pub fn spike_count(&self) -> usize {
        self.spikes.iter().filter(|&&s| s).count()
    }

    /// Tile under world coordinate `x` (wrapping)
    pub fn tile_at(&self, x: f32) -> Tile {
        if self.tiles.is_empty() {
            return Tile::Gap;
        }
        let i = (wrap_x(x, self.span()) / TILE_WIDTH) as usize;
        self.tiles[i.min(self.tiles.len() - 1)]
    }

    /// Spike on the tile under world coordinate `x` (wrapping)
    pub fn spike_at(&self, x: f32) -> bool {
        if self.spikes.is_empty() {
            return false;
        }
        let i = (wrap_x(x, self.span()) / TILE_WIDTH) as usize;
        self.spikes[i.min(self.spikes.len() - 1)]
    }

    /// Whether `reference` still points at this row
    pub fn matches(&self, reference: PlatformRef) -> bool {
        self.exists && self.generation == reference.generation
    }

    /// Scroll upward; the row dies once fully above the screen
    pub fn update(&mut self, global_speed: f32, dt: f32) {
        if !self.exists {
            return;
        }
        self.y -= global_speed * dt;
        if self.y < -TILE_HEIGHT {
            self.exists = false;
        }
    }

    /// Collide an entity with every solid tile, edge and spike of this row
    pub fn object_collision<T: TerrainBody>(
        &self,
        this: PlatformRef,
        o: &mut T,
        step: &StepEvent,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.exists || !o.collides_with_terrain() {
            return;
        }

        let n = self.tiles.len();
        let span = self.span();
        let dt = step.tick;
        let edge_top = self.y - TILE_HEIGHT;

        for x in 0..n {
            let tile = self.tiles[x];
            if tile == Tile::Gap {
                continue;
            }
            let left = x as f32 * TILE_WIDTH;

            if !o.ignores_floor(tile) {
                let mut landed = floor_collision(o.body_mut(), left, self.y, TILE_WIDTH, dt);
                // Border tiles also stand on the far side when the other border is open
                if x == 0 && self.tiles[n - 1] == Tile::Gap {
                    landed |= floor_collision(o.body_mut(), span, self.y, TILE_WIDTH, dt);
                } else if x == n - 1 && self.tiles[0] == Tile::Gap {
                    landed |= floor_collision(o.body_mut(), -TILE_WIDTH, self.y, TILE_WIDTH, dt);
                }
                if landed {
                    o.floor_event(tile, this, events);
                }
            }

            if o.reacts_to_edges() {
                if self.tiles[(x + n - 1) % n] == Tile::Gap
                    && edge_collision(o.body_mut(), left, edge_top, TILE_HEIGHT, -1.0, dt)
                {
                    o.edge_event();
                }
                if self.tiles[(x + 1) % n] == Tile::Gap
                    && edge_collision(o.body_mut(), left + TILE_WIDTH, edge_top, TILE_HEIGHT, 1.0, dt)
                {
                    o.edge_event();
                }
            }

            if self.spikes[x] {
                let hazard = Aabb::new(
                    left + (TILE_WIDTH - SPIKE_WIDTH) / 2.0,
                    self.y - SPIKE_HEIGHT,
                    SPIKE_WIDTH,
                    SPIKE_HEIGHT,
                );
                for dx in wrap_offsets(span) {
                    o.hazard_event(&hazard.translated(dx, 0.0), events);
                }

                if o.reacts_to_edges() {
                    if edge_collision(o.body_mut(), left, edge_top, TILE_HEIGHT, 1.0, dt) {
                        o.edge_event();
                    }
                    if edge_collision(o.body_mut(), left + TILE_WIDTH, edge_top, TILE_HEIGHT, -1.0, dt) {
                        o.edge_event();
                    }
                }
            }
        }
    }
}
