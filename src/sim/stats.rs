//! Per-run player statistics

use serde::{Deserialize, Serialize};

/// Scroll distance that earns one distance bonus
pub const DISTANCE_SCORE_STEP: f32 = 10.0;
/// Points per distance bonus
pub const DISTANCE_SCORE: u32 = 10;
/// HUD highlight fade per tick
const FLASH_DECAY: f32 = 1.0 / 20.0;

/// Lives, score and combo for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub lives: u8,
    pub max_lives: u8,
    pub score: u64,
    /// Combo bonus; each point multiplies awards by an extra 10%
    pub combo: u32,
    pub coins: u32,
    /// Scroll distance not yet converted to points
    distance: f32,
    /// HUD highlight after losing a life (1 -> 0)
    #[serde(skip)]
    pub lives_flash: f32,
    /// HUD highlight after a combo change (1 -> 0)
    #[serde(skip)]
    pub combo_flash: f32,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(3)
    }
}

impl Stats {
    pub fn new(max_lives: u8) -> Self {
        Self {
            lives: max_lives,
            max_lives,
            score: 0,
            combo: 0,
            coins: 0,
            distance: 0.0,
            lives_flash: 0.0,
            combo_flash: 0.0,
        }
    }

    /// Add `delta` lives, clamped to `[0, max_lives]`
    pub fn change_lives(&mut self, delta: i32) {
        let lives = (self.lives as i32 + delta).clamp(0, self.max_lives as i32);
        self.lives = lives as u8;
        if delta < 0 {
            self.lives_flash = 1.0;
        }
    }

    pub fn missing_lives(&self) -> u8 {
        self.max_lives.saturating_sub(self.lives)
    }

    /// Award points scaled by the combo bonus. Returns the points actually added.
    pub fn add_points(&mut self, amount: u32) -> u32 {
        let awarded = (amount as f32 * (1.0 + self.combo as f32 / 10.0)).floor() as u32;
        self.score += awarded as u64;
        awarded
    }

    pub fn increase_combo(&mut self, count: u32) {
        self.combo += count;
        self.combo_flash = 1.0;
    }

    pub fn reset_combo(&mut self) {
        if self.combo > 0 {
            self.combo = 0;
            self.combo_flash = 1.0;
        }
    }

    pub fn add_coins(&mut self, count: u32) {
        self.coins += count;
    }

    /// Convert scroll distance into points and fade HUD highlights
    pub fn update(&mut self, global_speed: f32, dt: f32) {
        self.distance += global_speed * dt;
        while self.distance >= DISTANCE_SCORE_STEP {
            self.distance -= DISTANCE_SCORE_STEP;
            self.add_points(DISTANCE_SCORE);
        }

        self.lives_flash = (self.lives_flash - FLASH_DECAY * dt).max(0.0);
        self.combo_flash = (self.combo_flash - FLASH_DECAY * dt).max(0.0);
    }

    /// Combo multiplier as shown on the HUD, e.g. "1.3"
    pub fn multiplier_label(&self) -> String {
        format!("{}.{}", 1 + self.combo / 10, self.combo % 10)
    }

    /// Score zero-padded to `width` digits
    pub fn score_label(&self, width: usize) -> String {
        format!("{:0width$}", self.score, width = width)
    }

    /// Back to a fresh run with the same maximum lives
    pub fn reset(&mut self) {
        *self = Self::new(self.max_lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_lives_clamps() {
        let mut stats = Stats::new(3);
        stats.change_lives(2);
        assert_eq!(stats.lives, 3);
        stats.change_lives(-5);
        assert_eq!(stats.lives, 0);
        assert_eq!(stats.missing_lives(), 3);
    }

    #[test]
    fn test_points_scale_with_combo() {
        let mut stats = Stats::new(3);
        assert_eq!(stats.add_points(50), 50);
        stats.increase_combo(3);
        assert_eq!(stats.add_points(50), 65);
        assert_eq!(stats.score, 115);
        assert_eq!(stats.multiplier_label(), "1.3");
    }

    #[test]
    fn test_distance_score() {
        let mut stats = Stats::new(3);
        for _ in 0..25 {
            stats.update(1.0, 1.0);
        }
        assert_eq!(stats.score, 20);
    }

    #[test]
    fn test_score_label_pads() {
        let mut stats = Stats::new(3);
        stats.add_points(42);
        assert_eq!(stats.score_label(6), "000042");
    }
}
