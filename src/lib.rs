//! Pig Plunge - A vertically scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, behavior, level generation)
//! - `render`: Drawing through a host-provided canvas
//! - `audio`: Sound effect routing for simulation events
//! - `highscores`: Best-score persistence
//! - `settings`: Difficulty and preferences

pub mod audio;
pub mod highscores;
pub mod render;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Real time covered by one simulation step (60 Hz)
    pub const FRAME_TIME: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Simulation time units advanced per step (all speeds are per tick)
    pub const TICK: f32 = 1.0;

    /// Visible arena
    pub const SCREEN_WIDTH: f32 = 256.0;
    pub const SCREEN_HEIGHT: f32 = 240.0;

    /// Terrain tiles
    pub const TILE_WIDTH: f32 = 16.0;
    pub const TILE_HEIGHT: f32 = 16.0;
    /// Tiles per platform row (one full screen width)
    pub const PLATFORM_WIDTH: usize = 16;
    /// Vertical distance between consecutive platforms, in tiles
    pub const PLATFORM_OFFSET: f32 = 3.0;
    /// Y of the first (centered) platform at the start of a run
    pub const INITIAL_PLATFORM_Y: f32 = 96.0;

    /// Downward target speed applied to everything that falls
    pub const BASE_GRAVITY: f32 = 4.0;
}

/// Wrap a horizontal coordinate into `[0, width)`.
///
/// The arena is a horizontal cylinder: leaving one side re-enters from the other.
#[inline]
pub fn wrap_x(x: f32, width: f32) -> f32 {
    if width <= 0.0 {
        return x;
    }
    let wrapped = x.rem_euclid(width);
    // rem_euclid can round up to exactly `width` for tiny negative inputs
    if wrapped >= width { 0.0 } else { wrapped }
}

/// Horizontal offsets at which a wrapped copy of an entity may overlap something.
#[inline]
pub fn wrap_offsets(width: f32) -> [f32; 3] {
    [0.0, -width, width]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_x() {
        assert_eq!(wrap_x(10.0, 256.0), 10.0);
        assert_eq!(wrap_x(-6.0, 256.0), 250.0);
        assert_eq!(wrap_x(260.0, 256.0), 4.0);
        assert!(wrap_x(-1e-9, 256.0) < 256.0);
    }
}
