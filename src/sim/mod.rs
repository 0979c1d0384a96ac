//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering, audio or platform dependencies

pub mod collectible;
pub mod collision;
pub mod enemy;
pub mod generator;
pub mod input;
pub mod physics;
pub mod platform;
pub mod player;
pub mod pool;
pub mod random;
pub mod species;
pub mod state;
pub mod stats;
pub mod tick;

pub use collectible::{Collectible, CollectibleKind, Particle, ParticleKind};
pub use collision::{Aabb, Rect, edge_collision, floor_collision};
pub use enemy::{Contact, DeathKind, Enemy};
pub use input::{ActionState, TickInput};
pub use physics::{Body, approach};
pub use platform::{Decoration, Platform, PlatformRef, TerrainBody, Tile};
pub use player::Player;
pub use pool::{Pool, Poolable};
pub use random::WeightTable;
pub use species::{Species, StompMode};
pub use state::{GameEvent, GameState, StepEvent};
pub use stats::Stats;
pub use tick::{FixedStep, Progression, TickContext, autopilot, tick};
