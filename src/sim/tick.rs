//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::{ActionState, TickInput};
use super::platform::Tile;
use super::species::Species;
use super::state::{GameState, StepEvent};
use crate::consts::*;
use crate::settings::Difficulty;

/// Difficulty curve for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progression {
    /// Ticks simulated since the run started
    pub elapsed: f32,
    /// Progression weight in [0, 1]
    pub weight: f32,
}

impl Progression {
    /// Advance by `dt` ticks. The weight never decreases within a run.
    pub fn advance(&mut self, dt: f32, difficulty: Difficulty) {
        self.elapsed += dt;
        let weight = (self.elapsed / difficulty.progression_ticks()).min(1.0);
        self.weight = self.weight.max(weight);
    }

    /// Scroll speed multiplier for the current weight
    pub fn global_speed(&self, difficulty: Difficulty) -> f32 {
        difficulty.speed_base() + difficulty.speed_gain() * self.weight
    }
}

/// Flags owned by the scene layer that suspend gameplay
#[derive(Debug, Clone, Copy, Default)]
pub struct TickContext {
    pub paused: bool,
    /// A scene transition is running
    pub transition_active: bool,
}

/// Advance the game state by one fixed timestep.
///
/// Returns false when the gameplay update was skipped.
pub fn tick(state: &mut GameState, input: &TickInput, ctx: &TickContext) -> bool {
    if ctx.paused || ctx.transition_active {
        return false;
    }

    let step = StepEvent::default();
    let difficulty = state.difficulty;
    let weight = state.progression.weight;
    let global_speed = state.progression.global_speed(difficulty);

    state.update(weight, global_speed, input, &step);

    if state.can_control_player() {
        state.progression.advance(step.tick, difficulty);
    }
    true
}

/// Real-time accumulator draining into fixed steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `real_dt` seconds and run `step` once per whole `FRAME_TIME`.
    ///
    /// Backlog beyond `MAX_SUBSTEPS` steps is dropped. Returns the step count.
    pub fn advance<F: FnMut()>(&mut self, real_dt: f32, mut step: F) -> u32 {
        let cap = FRAME_TIME * MAX_SUBSTEPS as f32;
        self.accumulator = (self.accumulator + real_dt.max(0.0)).min(cap);

        let mut steps = 0;
        while self.accumulator >= FRAME_TIME && steps < MAX_SUBSTEPS {
            self.accumulator -= FRAME_TIME;
            step();
            steps += 1;
        }
        steps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / FRAME_TIME
    }
}

/// Headbutt reach used by the autopilot
const AUTOPILOT_REACH: f32 = 28.0;
/// How far ahead the autopilot looks for spikes
const AUTOPILOT_LOOKAHEAD: f32 = TILE_WIDTH;

/// Idle/demo mode: derive input from the current state.
///
/// Heads for the nearest gap in the row under the player, hops spikes and
/// headbutts enemies in reach. `previous` carries button edge state between steps.
pub fn autopilot(state: &GameState, previous: &TickInput) -> TickInput {
    let player = &state.player;
    if !player.is_active() {
        return TickInput::default();
    }
    let pos = player.body.pos;
    let feet = player.body.collision_aabb().bottom;
    let width = SCREEN_WIDTH;

    // Row currently under the player
    let row = state
        .platforms
        .iter()
        .filter(|p| p.y >= feet - 1.0)
        .min_by(|a, b| a.y.total_cmp(&b.y));

    let mut stick = Vec2::ZERO;
    let mut want_jump = false;

    if let Some(row) = row {
        // Nearest gap tile center, measured across the wrap
        let target = (0..row.width())
            .filter(|&i| row.tiles[i] == Tile::Gap)
            .map(|i| (i as f32 + 0.5) * TILE_WIDTH)
            .min_by(|&a, &b| {
                let da = wrapped_delta(pos.x, a, width).abs();
                da.total_cmp(&wrapped_delta(pos.x, b, width).abs())
            });

        if let Some(x) = target {
            let dx = wrapped_delta(pos.x, x, width);
            if dx.abs() > 2.0 {
                stick.x = dx.signum();
            }
        }

        let ahead = pos.x + stick.x * AUTOPILOT_LOOKAHEAD;
        if (feet - row.y).abs() < 1.0 && row.spike_at(ahead) {
            want_jump = true;
        }
    }

    let enemy_ahead = state.enemies.iter().any(|e| {
        e.body.is_active()
            && e.species != Species::Missile
            && e.species.info().can_be_headbutted
            && (e.body.pos.y - pos.y).abs() < TILE_HEIGHT
            && {
                let dx = wrapped_delta(pos.x, e.body.pos.x, width);
                dx.abs() < AUTOPILOT_REACH && dx.signum() == player.face
            }
    });

    TickInput {
        stick,
        jump: previous.jump.next(want_jump),
        attack: previous.attack.next(enemy_ahead && player.can_headbutt),
    }
}

/// Signed horizontal distance from `from` to `to` on a cylinder of `width`
fn wrapped_delta(from: f32, to: f32, width: f32) -> f32 {
    let mut d = to - from;
    if d > width / 2.0 {
        d -= width;
    } else if d < -width / 2.0 {
        d += width;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_caps_backlog() {
        let mut fixed = FixedStep::new();
        let mut count = 0;
        let steps = fixed.advance(1.0, || count += 1);
        assert_eq!(steps, MAX_SUBSTEPS);
        assert_eq!(count, MAX_SUBSTEPS);
        assert!(fixed.alpha() < 1.0);
    }

    #[test]
    fn test_fixed_step_accumulates() {
        let mut fixed = FixedStep::new();
        let mut count = 0;
        assert_eq!(fixed.advance(FRAME_TIME * 0.6, || count += 1), 0);
        assert_eq!(fixed.advance(FRAME_TIME * 0.6, || count += 1), 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_progression_is_monotonic_and_capped() {
        let mut p = Progression::default();
        let difficulty = Difficulty::Normal;
        let mut last = 0.0;
        for _ in 0..(difficulty.progression_ticks() as usize + 100) {
            p.advance(1.0, difficulty);
            assert!(p.weight >= last);
            last = p.weight;
        }
        assert_eq!(p.weight, 1.0);
        assert_eq!(
            p.global_speed(difficulty),
            difficulty.speed_base() + difficulty.speed_gain()
        );
    }

    #[test]
    fn test_paused_tick_is_skipped() {
        let mut state = GameState::new(9, Difficulty::Normal);
        let ctx = TickContext {
            paused: true,
            ..Default::default()
        };
        assert!(!tick(&mut state, &TickInput::default(), &ctx));
        assert_eq!(state.time_ticks, 0);

        let ctx = TickContext {
            transition_active: true,
            ..Default::default()
        };
        assert!(!tick(&mut state, &TickInput::default(), &ctx));

        assert!(tick(&mut state, &TickInput::default(), &TickContext::default()));
        assert_eq!(state.time_ticks, 1);
        assert!(state.progression.weight > 0.0);
    }

    #[test]
    fn test_autopilot_walks_toward_gap() {
        let state = GameState::new(10, Difficulty::Normal);
        let input = autopilot(&state, &TickInput::default());
        // The first row is a centered block, so some gap lies to either side
        assert_ne!(input.stick.x, 0.0);
        assert_eq!(input.jump, ActionState::Up);
    }

    #[test]
    fn test_wrapped_delta() {
        assert_eq!(wrapped_delta(250.0, 4.0, 256.0), 10.0);
        assert_eq!(wrapped_delta(4.0, 250.0, 256.0), -10.0);
        assert_eq!(wrapped_delta(10.0, 20.0, 256.0), 10.0);
    }
}
