//! Drawing through a host-provided canvas
//!
//! The host owns pixels and assets; this module only decides what to blit
//! where. Sprites near a horizontal border are drawn twice so they appear on
//! both sides of the wrapped arena. Missing bitmaps are skipped silently.

use glam::Vec2;

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH, TILE_HEIGHT, TILE_WIDTH};
use crate::settings::Settings;
use crate::sim::enemy::{DeathKind, ENEMY_SIZE, FLATTEN_ANIM_TIME, FLATTEN_TIME};
use crate::sim::{CollectibleKind, Decoration, GameState, ParticleKind, Species, Tile};
use crate::wrap_offsets;

/// Screen-space rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl DrawRect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of `size` centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x - size.x / 2.0, center.y - size.y / 2.0, size.x, size.y)
    }

    fn translated(self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Handle to a loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap {
    pub handle: u32,
    pub width: u32,
    pub height: u32,
}

/// Drawing surface provided by the host
pub trait Canvas {
    fn bitmap(&self, name: &str) -> Option<Bitmap>;
    fn draw_bitmap(&mut self, bitmap: Bitmap, flip: bool, dst: DrawRect, src: DrawRect);
    fn fill_rect(&mut self, rect: DrawRect, color: [u8; 4]);
    fn draw_text(&mut self, text: &str, x: f32, y: f32);
}

const SKY: [u8; 4] = [96, 160, 232, 255];
const SHAKE_AMPLITUDE: f32 = 2.0;
const PLAYER_SIZE: f32 = 16.0;
const ITEM_SIZE: f32 = 16.0;
const PARTICLE_SIZE: f32 = 8.0;
/// Flicker period while hurt, in ticks
const FLICKER_PERIOD: u64 = 4;

/// Draw the whole frame
pub fn draw(state: &GameState, canvas: &mut dyn Canvas, settings: &Settings) {
    let offset = shake_offset(state, settings);

    canvas.fill_rect(DrawRect::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT), SKY);
    draw_platforms(state, canvas, offset);
    draw_collectibles(state, canvas, offset);
    draw_enemies(state, canvas, offset);
    draw_player(state, canvas, offset);
    draw_particles(state, canvas, offset);
    draw_hud(state, canvas);
}

fn shake_offset(state: &GameState, settings: &Settings) -> Vec2 {
    if state.player.shake_timer <= 0.0 || !settings.effective_screen_shake() {
        return Vec2::ZERO;
    }
    let phase = (state.time_ticks % 4) as f32;
    let strength = (state.player.shake_timer / crate::sim::player::SHAKE_TIME).min(1.0);
    Vec2::new(
        (phase - 1.5).signum() * SHAKE_AMPLITUDE * strength,
        ((phase % 2.0) - 0.5).signum() * SHAKE_AMPLITUDE * strength,
    )
}

/// Blit at every wrapped copy that touches the screen
fn blit_wrapped(canvas: &mut dyn Canvas, bitmap: Bitmap, flip: bool, dst: DrawRect, src: DrawRect) {
    for dx in wrap_offsets(SCREEN_WIDTH) {
        let copy = dst.translated(Vec2::new(dx, 0.0));
        if copy.x + copy.w > 0.0 && copy.x < SCREEN_WIDTH {
            canvas.draw_bitmap(bitmap, flip, copy, src);
        }
    }
}

fn draw_platforms(state: &GameState, canvas: &mut dyn Canvas, offset: Vec2) {
    let tiles = canvas.bitmap("tiles");
    let spike = canvas.bitmap("spike");
    let decorations = canvas.bitmap("decorations");

    for p in state.platforms.iter() {
        for (x, &tile) in p.tiles.iter().enumerate() {
            let left = x as f32 * TILE_WIDTH + offset.x;
            let top = p.y + offset.y;

            if let (Some(bmp), true) = (tiles, tile.is_solid()) {
                let column = if tile == Tile::Bridge { 1.0 } else { 0.0 };
                canvas.draw_bitmap(
                    bmp,
                    false,
                    DrawRect::new(left, top, TILE_WIDTH, TILE_HEIGHT),
                    DrawRect::new(column * TILE_WIDTH, 0.0, TILE_WIDTH, TILE_HEIGHT),
                );
            }

            if let (Some(bmp), true) = (spike, p.spikes[x]) {
                canvas.draw_bitmap(
                    bmp,
                    false,
                    DrawRect::new(left, top - TILE_HEIGHT, TILE_WIDTH, TILE_HEIGHT),
                    DrawRect::new(0.0, 0.0, TILE_WIDTH, TILE_HEIGHT),
                );
            }

            let decoration = p.decorations[x];
            if let (Some(bmp), Some(column)) = (decorations, decoration_column(decoration)) {
                let w = decoration.width() as f32 * TILE_WIDTH;
                canvas.draw_bitmap(
                    bmp,
                    false,
                    DrawRect::new(left, top - TILE_HEIGHT, w, TILE_HEIGHT),
                    DrawRect::new(column * TILE_WIDTH, 0.0, w, TILE_HEIGHT),
                );
            }
        }
    }
}

fn decoration_column(decoration: Decoration) -> Option<f32> {
    let column = match decoration {
        Decoration::None => return None,
        Decoration::BigBush => 0,
        Decoration::SmallBush => 2,
        Decoration::Rock => 3,
        Decoration::Mushroom => 4,
        Decoration::TallMushroom => 5,
        Decoration::Tree => 6,
        Decoration::FenceLeft => 7,
        Decoration::Fence => 8,
        Decoration::FenceRight => 9,
    };
    Some(column as f32)
}

fn species_row(species: Species) -> f32 {
    match species {
        Species::Slime => 0.0,
        Species::SpikeSlime => 1.0,
        Species::Dog => 2.0,
        Species::Mushroom => 3.0,
        Species::Apple => 4.0,
        Species::Bird => 5.0,
        Species::Bat => 6.0,
        Species::SpikeBat => 7.0,
        Species::Rabbit => 8.0,
        Species::Bumper => 9.0,
        Species::Missile => 10.0,
    }
}

fn draw_enemies(state: &GameState, canvas: &mut dyn Canvas, offset: Vec2) {
    let Some(sheet) = canvas.bitmap("enemies") else {
        return;
    };

    for e in state.enemies.iter() {
        let mut size = Vec2::splat(ENEMY_SIZE);
        let mut center = e.body.pos + offset;
        let mut frame = e.frame.floor();

        if e.death == Some(DeathKind::Flattened) {
            // Squash toward the feet, then hold
            let t = ((FLATTEN_TIME - e.flatten_timer) / FLATTEN_ANIM_TIME).min(1.0);
            let h = ENEMY_SIZE * (1.0 - 0.75 * t);
            center.y += (ENEMY_SIZE - h) / 2.0;
            size.y = h;
            frame = 4.0;
        }

        let src = DrawRect::new(
            frame * ENEMY_SIZE,
            species_row(e.species) * ENEMY_SIZE,
            ENEMY_SIZE,
            ENEMY_SIZE,
        );
        blit_wrapped(canvas, sheet, e.dir < 0.0, DrawRect::centered(center, size), src);
    }
}

fn draw_collectibles(state: &GameState, canvas: &mut dyn Canvas, offset: Vec2) {
    let Some(sheet) = canvas.bitmap("items") else {
        return;
    };

    for c in state.collectibles.iter() {
        let row = match c.kind {
            CollectibleKind::Coin => 0.0,
            CollectibleKind::Gem => 1.0,
            CollectibleKind::Heart => 2.0,
            CollectibleKind::Star => 3.0,
        };
        // Shrinks away while vanishing
        let scale = 1.0 - c.vanish_timer.clamp(0.0, 1.0);
        let src = DrawRect::new(c.frame.floor() * ITEM_SIZE, row * ITEM_SIZE, ITEM_SIZE, ITEM_SIZE);
        let dst = DrawRect::centered(c.body.pos + offset, Vec2::splat(ITEM_SIZE * scale));
        blit_wrapped(canvas, sheet, false, dst, src);
    }
}

fn draw_player(state: &GameState, canvas: &mut dyn Canvas, offset: Vec2) {
    let player = &state.player;
    if !player.body.exists {
        return;
    }
    if player.is_hurt() && (state.time_ticks / FLICKER_PERIOD) % 2 == 0 {
        return;
    }
    let Some(sheet) = canvas.bitmap("player") else {
        return;
    };

    let row = if player.is_dying() {
        3.0
    } else if player.is_headbutting() {
        2.0
    } else if player.body.speed.y != 0.0 && player.standing_on.is_none() {
        1.0
    } else {
        0.0
    };
    // Invincible frames live in the second half of the sheet
    let column = player.frame.floor() + if player.is_invincible() { 4.0 } else { 0.0 };
    let src = DrawRect::new(column * PLAYER_SIZE, row * PLAYER_SIZE, PLAYER_SIZE, PLAYER_SIZE);
    let dst = DrawRect::centered(player.body.pos + offset, Vec2::splat(PLAYER_SIZE));
    blit_wrapped(canvas, sheet, player.face < 0.0, dst, src);
}

fn draw_particles(state: &GameState, canvas: &mut dyn Canvas, offset: Vec2) {
    let sheet = canvas.bitmap("particles");

    for p in state.particles.iter() {
        let pos = p.pos + offset;
        match p.kind {
            ParticleKind::Text(points) => canvas.draw_text(&points.to_string(), pos.x, pos.y),
            ParticleKind::Dust | ParticleKind::Star => {
                let Some(bmp) = sheet else {
                    continue;
                };
                let row = if p.kind == ParticleKind::Star { 1.0 } else { 0.0 };
                let frame = (p.timer * 4.0).floor().min(3.0);
                let src = DrawRect::new(
                    frame * PARTICLE_SIZE,
                    row * PARTICLE_SIZE,
                    PARTICLE_SIZE,
                    PARTICLE_SIZE,
                );
                canvas.draw_bitmap(
                    bmp,
                    false,
                    DrawRect::centered(pos, Vec2::splat(PARTICLE_SIZE)),
                    src,
                );
            }
        }
    }
}

fn draw_hud(state: &GameState, canvas: &mut dyn Canvas) {
    let stats = &state.player.stats;
    canvas.draw_text(&stats.score_label(7), 8.0, 8.0);
    canvas.draw_text(&format!("x{}", stats.multiplier_label()), 8.0, 18.0);
    canvas.draw_text(&format!("{} / {}", stats.lives, stats.max_lives), SCREEN_WIDTH - 48.0, 8.0);
    canvas.draw_text(&format!("${}", stats.coins), SCREEN_WIDTH - 48.0, 18.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    /// Canvas that only knows some bitmaps and counts calls
    #[derive(Default)]
    struct CountingCanvas {
        known: Vec<&'static str>,
        blits: Vec<(u32, DrawRect)>,
        texts: Vec<String>,
        fills: usize,
    }

    impl Canvas for CountingCanvas {
        fn bitmap(&self, name: &str) -> Option<Bitmap> {
            self.known.iter().position(|&k| k == name).map(|i| Bitmap {
                handle: i as u32,
                width: 256,
                height: 256,
            })
        }
        fn draw_bitmap(&mut self, bitmap: Bitmap, _flip: bool, dst: DrawRect, _src: DrawRect) {
            self.blits.push((bitmap.handle, dst));
        }
        fn fill_rect(&mut self, _rect: DrawRect, _color: [u8; 4]) {
            self.fills += 1;
        }
        fn draw_text(&mut self, text: &str, _x: f32, _y: f32) {
            self.texts.push(text.to_string());
        }
    }

    #[test]
    fn test_missing_bitmaps_draw_only_hud() {
        let state = GameState::new(1, Difficulty::Normal);
        let mut canvas = CountingCanvas::default();
        draw(&state, &mut canvas, &Settings::default());
        assert!(canvas.blits.is_empty());
        assert_eq!(canvas.fills, 1);
        assert!(canvas.texts.iter().any(|t| t == "0000000"));
    }

    #[test]
    fn test_tiles_and_player_are_blitted() {
        let state = GameState::new(1, Difficulty::Normal);
        let mut canvas = CountingCanvas {
            known: vec!["tiles", "player"],
            ..Default::default()
        };
        draw(&state, &mut canvas, &Settings::default());

        let solid: usize = state
            .platforms
            .iter()
            .map(|p| p.tiles.iter().filter(|t| t.is_solid()).count())
            .sum();
        let tiles = canvas.blits.iter().filter(|(h, _)| *h == 0).count();
        let player = canvas.blits.iter().filter(|(h, _)| *h == 1).count();
        assert_eq!(tiles, solid);
        assert_eq!(player, 1);
    }

    #[test]
    fn test_sprites_on_the_border_are_drawn_twice() {
        let mut state = GameState::new(1, Difficulty::Normal);
        state.player.body.pos.x = 2.0;
        let mut canvas = CountingCanvas {
            known: vec!["player"],
            ..Default::default()
        };
        draw(&state, &mut canvas, &Settings::default());
        assert_eq!(canvas.blits.len(), 2);
        assert!(canvas.blits.iter().any(|(_, r)| r.x > SCREEN_WIDTH / 2.0));
    }
}
