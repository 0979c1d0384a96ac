//! End-to-end scenarios through the public API

use glam::Vec2;
use pig_plunge::sim::enemy::{ENEMY_SIZE, FLATTEN_TIME, STOMP_JUMP_SPEED};
use pig_plunge::sim::player::{JUMP_SPEED, JUMP_TIME, LEDGE_TIME};
use pig_plunge::sim::random::{sample_interpolated, seeded};
use pig_plunge::sim::{
    ActionState, Contact, Decoration, Enemy, Platform, PlatformRef, Player, Pool, Species, StepEvent, Stats,
    TickInput, Tile,
};

#[test]
fn test_initial_platform_is_centered_third() {
    let mut rng = seeded(11);
    let mut platform = Platform::default();
    platform.spawn(&mut rng, 96.0, 24, true, 1);

    for (i, tile) in platform.tiles.iter().enumerate() {
        let expected = if (8..16).contains(&i) {
            Tile::Ground
        } else {
            Tile::Gap
        };
        assert_eq!(*tile, expected, "tile {i}");
    }
    assert_eq!(platform.spike_count(), 0);
    assert!(platform.decorations.iter().all(|&d| d == Decoration::None));
}

#[test]
fn test_half_way_interpolation_is_even() {
    let mut rng = seeded(5);
    let n = 10_000;
    let ones = (0..n)
        .filter(|_| sample_interpolated(&mut rng, &[1.0, 0.0], &[0.0, 1.0], 0.5) == 1)
        .count();
    let freq = ones as f32 / n as f32;
    assert!((freq - 0.5).abs() < 0.03, "frequency {freq}");
}

#[test]
fn test_falling_player_flattens_enemy() {
    let mut platforms: Pool<Platform> = Pool::new();
    let slot = platforms.acquire();
    platforms[slot] = Platform {
        y: 120.0,
        tiles: vec![Tile::Ground; 16],
        spikes: vec![false; 16],
        decorations: vec![Default::default(); 16],
        exists: true,
        generation: 1,
        initial: false,
    };
    let reference = PlatformRef {
        slot,
        generation: 1,
    };

    let mut rng = seeded(2);
    let mut enemy = Enemy::default();
    enemy.spawn(
        &mut rng,
        Species::Slime,
        Vec2::new(64.0, 120.0 - ENEMY_SIZE / 2.0),
        Some(reference),
        256.0,
    );

    let mut player = Player::new(
        Vec2::new(enemy.body.pos.x, enemy.body.pos.y - 14.0),
        Stats::new(3),
        256.0,
    );
    player.body.speed.y = 2.0;

    let mut events = Vec::new();
    let contact = enemy.player_collision(&mut player, 256.0, &mut events);

    assert_eq!(contact, Some(Contact::Stomped));
    assert!(enemy.body.dying);
    assert_eq!(enemy.flatten_timer, FLATTEN_TIME);
    assert_eq!(player.body.speed.y, STOMP_JUMP_SPEED);
}

#[test]
fn test_ledge_jump_overrides_gravity() {
    let mut player = Player::new(Vec2::new(128.0, 60.0), Stats::new(3), 256.0);
    player.ledge_timer = LEDGE_TIME;
    let step = StepEvent::new(1.0, 256.0, 240.0);
    let mut events = Vec::new();

    let press = TickInput {
        jump: ActionState::Pressed,
        ..Default::default()
    };
    player.update(&press, &step, &mut events);
    assert_eq!(player.jump_timer, JUMP_TIME);
    assert_eq!(player.ledge_timer, 0.0);

    let hold = TickInput {
        jump: ActionState::Down,
        ..Default::default()
    };
    for _ in 0..JUMP_TIME as usize {
        player.update(&hold, &step, &mut events);
        assert_eq!(player.body.speed.y, JUMP_SPEED);
    }
}

#[test]
fn test_pool_reuses_dead_slot() {
    let mut rng = seeded(3);
    let mut pool: Pool<Platform> = Pool::new();
    assert!(pool.is_empty());

    for i in 0..3 {
        let slot = pool.acquire();
        assert_eq!(slot, i);
        pool[slot].spawn(&mut rng, 0.0, 16, false, i as u32);
    }
    assert_eq!(pool.len(), 3);

    pool[1].exists = false;
    let slot = pool.acquire();
    assert_eq!(slot, 1);
    pool[slot].spawn(&mut rng, 0.0, 16, false, 9);

    assert_eq!(pool.len(), 3);
    assert_eq!(pool.live_count(), 3);
    assert_eq!(pool[1].generation, 9);
}
