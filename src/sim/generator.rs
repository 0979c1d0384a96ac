//! Procedural platform rows
//!
//! A row is synthesized as alternating ground/gap runs with at most one bridge,
//! then decorated with spikes and scenery. Gap and spike rules are evaluated
//! cyclically because the arena wraps horizontally.

use rand::Rng;

use super::platform::{Decoration, Tile};
use super::random::{self, WeightTable};

/// Rows narrower than this are widened before synthesis
pub const MIN_PLATFORM_WIDTH: usize = 6;
/// Shortest gap run the player can reliably fall through
pub const MIN_GAP: usize = 2;
/// Tiles from the right end within which a missing gap is forced open
pub const SAFE_MARGIN_OFFSET: usize = 3;
/// Chance that a gap run becomes the row's bridge
pub const BRIDGE_PROB: f32 = 0.2;
/// Weights of the first run's type: gap, ground, bridge
pub const INITIAL_TYPE_WEIGHTS: [f32; 3] = [0.4, 0.4, 0.2];
/// Weights of the spike cap: 0, 1 or 2
pub const SPIKE_COUNT_WEIGHTS: [f32; 3] = [0.3, 0.5, 0.2];
/// Empty tiles required between spikes
pub const SPIKE_MIN_DISTANCE: usize = 1;

/// Enemies per row (0..=3), blended by progression
pub const ENEMY_COUNT_WEIGHTS: WeightTable =
    WeightTable::new(&[0.30, 0.50, 0.20, 0.00], &[0.05, 0.35, 0.40, 0.20]);
/// Collectibles per row (0..=2), blended by progression
pub const COLLECTIBLE_COUNT_WEIGHTS: WeightTable =
    WeightTable::new(&[0.55, 0.35, 0.10], &[0.45, 0.40, 0.15]);

/// Build the tile row for a new platform
pub fn build_tiles<R: Rng + ?Sized>(rng: &mut R, width: usize, initial: bool) -> Vec<Tile> {
    let width = width.max(MIN_PLATFORM_WIDTH);
    let mut tiles = vec![Tile::Gap; width];

    if initial {
        fill_initial(&mut tiles);
        return tiles;
    }

    let max_run = (width / 2).saturating_sub(1).max(1);
    let max_bridge = (width / 3).max(1);

    let mut fill = match random::sample_weighted(rng, &INITIAL_TYPE_WEIGHTS) {
        0 => Tile::Gap,
        1 => Tile::Ground,
        _ => Tile::Bridge,
    };
    let mut wait = 1 + random::index(rng, max_run);
    match fill {
        Tile::Bridge => wait = wait.min(max_bridge),
        Tile::Gap => wait = wait.max(MIN_GAP),
        Tile::Ground => {}
    }

    let mut bridge_created = fill == Tile::Bridge;
    let mut counter = 0;
    let mut gap_tiles = 0;

    for x in 0..width {
        tiles[x] = fill;
        if fill == Tile::Gap {
            gap_tiles += 1;
        }

        // No usable gap yet and the row is about to end: open one now
        if gap_tiles < MIN_GAP && fill == Tile::Ground && x + SAFE_MARGIN_OFFSET >= width {
            counter = wait;
        }

        counter += 1;
        if counter >= wait {
            fill = if fill == Tile::Ground {
                Tile::Gap
            } else {
                Tile::Ground
            };
            wait = 1 + random::index(rng, max_run);

            if fill == Tile::Gap && !bridge_created && random::unit(rng) <= BRIDGE_PROB {
                bridge_created = true;
                fill = Tile::Bridge;
                wait = wait.min(max_bridge);
            }
            if fill == Tile::Gap {
                wait = wait.max(MIN_GAP);
            }
            counter = 0;
        }
    }

    close_short_gaps(&mut tiles);
    tiles
}

/// Centered ground block covering the middle third of the row
fn fill_initial(tiles: &mut [Tile]) {
    let middle = tiles.len() / 2;
    let half = tiles.len() / 6;
    for tile in &mut tiles[middle - half..middle + half] {
        *tile = Tile::Ground;
    }
}

/// Turn every cyclic gap run shorter than `MIN_GAP` into ground
fn close_short_gaps(tiles: &mut [Tile]) {
    let n = tiles.len();
    let Some(start) = tiles.iter().position(|&t| t != Tile::Gap) else {
        return;
    };

    let mut run = Vec::new();
    for k in 1..=n {
        let i = (start + k) % n;
        if tiles[i] == Tile::Gap {
            run.push(i);
            continue;
        }
        if !run.is_empty() && run.len() < MIN_GAP {
            for &j in &run {
                tiles[j] = Tile::Ground;
            }
        }
        run.clear();
    }
}

/// Ground tile without a bridge on either (cyclic) side
pub fn spike_eligible(tiles: &[Tile], i: usize) -> bool {
    let n = tiles.len();
    tiles[i] == Tile::Ground
        && tiles[(i + n - 1) % n] != Tile::Bridge
        && tiles[(i + 1) % n] != Tile::Bridge
}

/// No other spike within `SPIKE_MIN_DISTANCE` of `i`, across the wrap too
fn spike_spaced(spikes: &[bool], i: usize) -> bool {
    let n = spikes.len();
    (1..=SPIKE_MIN_DISTANCE.min(n / 2)).all(|d| !spikes[(i + d) % n] && !spikes[(i + n - d) % n])
}

pub fn place_spikes<R: Rng + ?Sized>(rng: &mut R, tiles: &[Tile]) -> Vec<bool> {
    let n = tiles.len();
    let mut spikes = vec![false; n];

    let eligible: Vec<bool> = (0..n).map(|i| spike_eligible(tiles, i)).collect();
    let eligible_count = eligible.iter().filter(|&&e| e).count();

    let max_count = random::sample_weighted(rng, &SPIKE_COUNT_WEIGHTS)
        .min(random::index(rng, eligible_count.saturating_sub(1)));
    if max_count == 0 {
        return spikes;
    }

    let mut x = random::index(rng, n);
    let mut placed = 0;
    while placed < max_count && x < n {
        if !eligible[x] || !spike_spaced(&spikes, x) {
            x += 1;
            continue;
        }
        spikes[x] = true;
        placed += 1;
        x += SPIKE_MIN_DISTANCE + 1 + random::index(rng, n);
    }
    spikes
}

pub fn place_decorations<R: Rng + ?Sized>(
    rng: &mut R,
    tiles: &[Tile],
    spikes: &[bool],
) -> Vec<Decoration> {
    let n = tiles.len();
    let mut decorations = vec![Decoration::None; n];

    // Fences go on every bridge and the ground tiles holding its ends
    for x in 0..n {
        let left = tiles[(x + n - 1) % n];
        let right = tiles[(x + 1) % n];
        decorations[x] = match tiles[x] {
            Tile::Bridge => Decoration::Fence,
            Tile::Ground if left == Tile::Bridge => Decoration::FenceRight,
            Tile::Ground if right == Tile::Bridge => Decoration::FenceLeft,
            _ => Decoration::None,
        };
    }

    let mut x = random::index(rng, n);
    let mut kind = Decoration::random_scenery(rng);

    while x < n {
        if tiles[x] != Tile::Ground || spikes[x] || decorations[x] != Decoration::None {
            x += 1;
            continue;
        }

        // Wide scenery needs a second free ground tile
        if kind.width() == 2 && (x + 1 >= n || tiles[x + 1] != Tile::Ground || spikes[x + 1]) {
            kind = Decoration::SmallBush;
        }
        let width = kind.width();

        let crowded = (x..(x + width).min(n)).any(|x2| {
            (x2 > 0 && decorations[x2 - 1] != Decoration::None)
                || (x2 + 1 < n && decorations[x2 + 1] != Decoration::None)
                || spikes[x2]
        });
        if crowded {
            x += 1;
            continue;
        }

        decorations[x] = kind;
        x += 1 + width + random::index(rng, n);
        kind = Decoration::random_scenery(rng);
    }
    decorations
}

/// Pick up to `count` spawn tiles, one per equal segment of the row.
///
/// Each segment is scanned from a random start to its end for a solid,
/// spike-free tile that is not in `taken`.
pub fn spawn_tiles<R: Rng + ?Sized>(
    rng: &mut R,
    tiles: &[Tile],
    spikes: &[bool],
    count: usize,
    taken: &[usize],
) -> Vec<usize> {
    let mut out = Vec::with_capacity(count);
    if count == 0 {
        return out;
    }
    let segment = tiles.len() / count;
    if segment == 0 {
        return out;
    }

    for i in 0..count {
        let start = segment * i;
        let end = start + segment;
        let mut x = start + random::index(rng, segment);
        while x < end {
            if tiles[x] != Tile::Gap && !spikes[x] && !taken.contains(&x) {
                out.push(x);
                break;
            }
            x += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::seeded;
    use proptest::prelude::*;

    /// Lengths of cyclic runs of `kind`
    fn cyclic_runs(tiles: &[Tile], kind: Tile) -> Vec<usize> {
        let n = tiles.len();
        let Some(start) = tiles.iter().position(|&t| t != kind) else {
            return vec![n];
        };
        let mut runs = Vec::new();
        let mut len = 0;
        for k in 1..=n {
            if tiles[(start + k) % n] == kind {
                len += 1;
            } else if len > 0 {
                runs.push(len);
                len = 0;
            }
        }
        runs
    }

    #[test]
    fn test_initial_row_is_centered_third() {
        let mut rng = seeded(1);
        let tiles = build_tiles(&mut rng, 24, true);
        let ground: Vec<usize> = (0..24).filter(|&i| tiles[i] == Tile::Ground).collect();
        assert_eq!(ground, (8..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_narrow_rows_are_widened() {
        let mut rng = seeded(3);
        assert_eq!(build_tiles(&mut rng, 2, false).len(), MIN_PLATFORM_WIDTH);
    }

    #[test]
    fn test_close_short_gaps_wraps() {
        use Tile::*;
        let mut tiles = vec![Gap, Ground, Ground, Gap, Ground, Gap];
        close_short_gaps(&mut tiles);
        // Gaps at 5 and 0 form one cyclic run of two and survive
        assert_eq!(tiles, vec![Gap, Ground, Ground, Ground, Ground, Gap]);
    }

    #[test]
    fn test_spawn_tiles_skip_gaps_and_spikes() {
        use Tile::*;
        let mut rng = seeded(11);
        let tiles = vec![Gap, Gap, Ground, Ground, Gap, Gap, Ground, Ground];
        let spikes = vec![false, false, true, false, false, false, false, false];
        for _ in 0..50 {
            for x in spawn_tiles(&mut rng, &tiles, &spikes, 2, &[]) {
                assert!(tiles[x] != Gap && !spikes[x]);
            }
        }
        assert!(spawn_tiles(&mut rng, &tiles, &spikes, 0, &[]).is_empty());
    }

    #[test]
    fn test_spikes_keep_apart_across_the_wrap() {
        let mut spikes = vec![false; 9];
        spikes[0] = true;
        assert!(!spike_spaced(&spikes, 8));
        assert!(spike_spaced(&spikes, 7));

        for seed in 0..20_000 {
            let mut rng = seeded(seed);
            let tiles = build_tiles(&mut rng, 16, false);
            let spikes = place_spikes(&mut rng, &tiles);
            assert!(!(spikes[0] && spikes[15]), "seed {seed}: spikes touch across the border");
        }
    }

    proptest! {
        #[test]
        fn generated_rows_are_fair(seed in 0u64..2000, width in 6usize..40) {
            let mut rng = seeded(seed);
            let tiles = build_tiles(&mut rng, width, false);
            let spikes = place_spikes(&mut rng, &tiles);
            let decorations = place_decorations(&mut rng, &tiles, &spikes);

            for len in cyclic_runs(&tiles, Tile::Gap) {
                prop_assert!(len >= MIN_GAP, "gap run of {len} in {tiles:?}");
            }
            let bridges = cyclic_runs(&tiles, Tile::Bridge);
            prop_assert!(bridges.len() <= 1);
            if let Some(&len) = bridges.first() {
                prop_assert!(len <= width / 3);
            }

            let n = tiles.len();
            for i in 0..n {
                if spikes[i] {
                    prop_assert_eq!(tiles[i], Tile::Ground);
                    prop_assert!(tiles[(i + 1) % n] != Tile::Bridge);
                    prop_assert!(tiles[(i + n - 1) % n] != Tile::Bridge);
                    prop_assert_eq!(decorations[i], Decoration::None);
                    prop_assert!(!spikes[(i + 1) % n], "adjacent spikes at {i} in {spikes:?}");
                }
                if decorations[i] != Decoration::None && !decorations[i].is_fence() {
                    prop_assert_eq!(tiles[i], Tile::Ground);
                }
            }
        }
    }
}
