//! Pig Plunge entry point
//!
//! Natively this runs a headless demo: the autopilot plays one run at a fixed
//! frame rate, sound events go to a silent audio manager and the final score
//! is offered to the leaderboard. The web build embeds the library instead.
//!
//! Usage: `pig-plunge [--seed N] [--difficulty easy|normal|hard] [--frames N]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pig_plunge::audio::AudioManager;
    use pig_plunge::consts::FRAME_TIME;
    use pig_plunge::sim::{FixedStep, GameState, TickContext, TickInput, autopilot, tick};
    use pig_plunge::{Difficulty, HighScores, Settings};

    env_logger::init();
    log::info!("Pig Plunge (native) starting...");

    let mut settings = Settings::load();
    let mut max_frames: u64 = 60 * 60 * 5;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let value = args.next();
        match (arg.as_str(), value) {
            ("--seed", Some(v)) => match v.parse() {
                Ok(seed) => settings.seed = Some(seed),
                Err(_) => log::warn!("Ignoring invalid seed: {v}"),
            },
            ("--difficulty", Some(v)) => match Difficulty::from_str(&v) {
                Some(d) => settings.difficulty = d,
                None => log::warn!("Unknown difficulty: {v}"),
            },
            ("--frames", Some(v)) => match v.parse() {
                Ok(n) => max_frames = n,
                Err(_) => log::warn!("Ignoring invalid frame count: {v}"),
            },
            (other, _) => log::warn!("Unknown argument: {other}"),
        }
    }

    let seed = settings.run_seed();
    let mut state = GameState::new(seed, settings.difficulty);
    log::info!(
        "Game initialized with seed {} ({})",
        seed,
        settings.difficulty.as_str()
    );

    let mut audio = AudioManager::default();
    audio.apply_settings(&settings);

    let mut high_scores = HighScores::load();
    let mut clock = FixedStep::new();
    let mut input = TickInput::default();
    let ctx = TickContext::default();
    let mut frames = 0;

    while frames < max_frames && state.does_player_exist() {
        clock.advance(FRAME_TIME, || {
            input = autopilot(&state, &input);
            if tick(&mut state, &input, &ctx) {
                audio.play_events(&state.events);
            }
        });
        frames += 1;
    }

    let stats = &state.player.stats;
    let seconds = (state.time_ticks as f32 * FRAME_TIME) as u32;
    log::info!(
        "Run over after {}s: score {}, coins {}, lives {}",
        seconds,
        stats.score,
        stats.coins,
        stats.lives
    );

    match high_scores.potential_rank(stats.score) {
        Some(rank) => {
            log::info!("New high score, rank {rank}");
            if high_scores.add_score(stats.score, stats.coins, seconds).is_some() {
                high_scores.save();
            }
        }
        None => log::info!(
            "Score did not reach the leaderboard (best {})",
            high_scores.top_score().unwrap_or(0)
        ),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The host page drives the library directly
}
