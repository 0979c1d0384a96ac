//! Seeded randomness and weighted categorical sampling
//!
//! Every random decision in the simulation draws from the `Pcg32` owned by
//! `GameState`, so a seed plus an input sequence fully determines a run.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Create the simulation RNG from a run seed
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Uniform float in `[0, 1)`
#[inline]
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>()
}

/// Uniform float in `[min, max)`; returns `min` for an empty range
#[inline]
pub fn range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max <= min {
        return min;
    }
    min + unit(rng) * (max - min)
}

/// Uniform index in `[0, n)`; returns 0 when `n == 0` instead of panicking
#[inline]
pub fn index<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    if n == 0 { 0 } else { rng.random_range(0..n) }
}

/// True with probability `p`
#[inline]
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    unit(rng) < p
}

/// Random horizontal direction, -1 or 1
#[inline]
pub fn direction<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random::<bool>() { 1.0 } else { -1.0 }
}

/// Pick the first category whose cumulative weight reaches `u`.
///
/// Falls back to the last index when rounding leaves the total just short of `u`.
pub fn pick_cumulative(weights: &[f32], u: f32) -> usize {
    let mut sum = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        sum += w;
        if u <= sum {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

/// Draw in `(0, 1]` so a zero-weight category can never be selected
#[inline]
fn draw<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    1.0 - unit(rng)
}

/// Sample a category from a weight vector that sums to (about) one
pub fn sample_weighted<R: Rng + ?Sized>(rng: &mut R, weights: &[f32]) -> usize {
    pick_cumulative(weights, draw(rng))
}

/// Sample from the blend `w1 * (1 - t) + w2 * t`
pub fn sample_interpolated<R: Rng + ?Sized>(rng: &mut R, w1: &[f32], w2: &[f32], t: f32) -> usize {
    let u = draw(rng);
    let t = t.clamp(0.0, 1.0);
    let mut sum = 0.0;
    let n = w1.len().min(w2.len());
    for i in 0..n {
        sum += w1[i] * (1.0 - t) + w2[i] * t;
        if u <= sum {
            return i;
        }
    }
    n.saturating_sub(1)
}

/// A pair of weight vectors blended by the progression weight
#[derive(Debug, Clone, Copy)]
pub struct WeightTable {
    pub initial: &'static [f32],
    pub last: &'static [f32],
}

impl WeightTable {
    pub const fn new(initial: &'static [f32], last: &'static [f32]) -> Self {
        Self { initial, last }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, t: f32) -> usize {
        sample_interpolated(rng, self.initial, self.last, t)
    }

    /// Blended weight of one category
    pub fn weight(&self, i: usize, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let a = self.initial.get(i).copied().unwrap_or(0.0);
        let b = self.last.get(i).copied().unwrap_or(0.0);
        a * (1.0 - t) + b * t
    }
}
