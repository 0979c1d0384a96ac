//! Sound routing
//!
//! The simulation only records `GameEvent`s. `AudioManager` maps them to
//! sound effects and forwards those to whatever backend the host attached.
//! Without a backend every call is a silent no-op.

use crate::settings::Settings;
use crate::sim::{CollectibleKind, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    DoubleJump,
    Headbutt,
    /// Enemy flattened
    Stomp,
    /// Bounced off a mushroom or bumper
    Bounce,
    Hurt,
    Death,
    Coin,
    Gem,
    Heart,
    Star,
    /// Missile wave incoming
    Warning,
    /// Enemy knocked off the screen
    Knockback,
    HighScore,
}

impl SoundEffect {
    /// Asset name the backend resolves
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Jump => "jump",
            SoundEffect::DoubleJump => "double_jump",
            SoundEffect::Headbutt => "headbutt",
            SoundEffect::Stomp => "stomp",
            SoundEffect::Bounce => "bounce",
            SoundEffect::Hurt => "hurt",
            SoundEffect::Death => "death",
            SoundEffect::Coin => "coin",
            SoundEffect::Gem => "gem",
            SoundEffect::Heart => "heart",
            SoundEffect::Star => "star",
            SoundEffect::Warning => "warning",
            SoundEffect::Knockback => "knockback",
            SoundEffect::HighScore => "high_score",
        }
    }

    /// Relative loudness of the effect
    fn gain(&self) -> f32 {
        match self {
            SoundEffect::Warning | SoundEffect::Death => 1.0,
            SoundEffect::Coin => 0.6,
            _ => 0.8,
        }
    }
}

impl From<GameEvent> for SoundEffect {
    fn from(event: GameEvent) -> Self {
        match event {
            GameEvent::Jump => SoundEffect::Jump,
            GameEvent::DoubleJump => SoundEffect::DoubleJump,
            GameEvent::Headbutt => SoundEffect::Headbutt,
            GameEvent::Stomp => SoundEffect::Stomp,
            GameEvent::Bounce => SoundEffect::Bounce,
            GameEvent::Hurt => SoundEffect::Hurt,
            GameEvent::Death => SoundEffect::Death,
            GameEvent::Collect(CollectibleKind::Coin) => SoundEffect::Coin,
            GameEvent::Collect(CollectibleKind::Gem) => SoundEffect::Gem,
            GameEvent::Collect(CollectibleKind::Heart) => SoundEffect::Heart,
            GameEvent::Collect(CollectibleKind::Star) => SoundEffect::Star,
            GameEvent::MissileWarning => SoundEffect::Warning,
            GameEvent::Knockback => SoundEffect::Knockback,
        }
    }
}

/// Playback device provided by the host. All calls are fire-and-forget.
pub trait AudioBackend {
    fn play_sample(&mut self, name: &str, volume: f32);
    fn play_music(&mut self, name: &str, volume: f32);
    fn fade_in_music(&mut self, name: &str, volume: f32, seconds: f32);
    fn pause_music(&mut self);
    fn stop_music(&mut self);
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AudioManager {
    pub fn new(backend: Option<Box<dyn AudioBackend>>) -> Self {
        if backend.is_none() {
            log::info!("No audio backend attached - audio disabled");
        }
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }

    /// Copy volume preferences from settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.pause_music();
        }
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume(self.sfx_volume) * effect.gain();
        if vol <= 0.0 {
            return;
        }
        if let Some(backend) = self.backend.as_mut() {
            backend.play_sample(effect.name(), vol);
        }
    }

    /// Play the sound of every event recorded during a step
    pub fn play_events(&mut self, events: &[GameEvent]) {
        for &event in events {
            self.play(event.into());
        }
    }

    pub fn play_music(&mut self, name: &str) {
        let vol = self.effective_volume(self.music_volume);
        if let Some(backend) = self.backend.as_mut() {
            backend.play_music(name, vol);
        }
    }

    pub fn fade_in_music(&mut self, name: &str, seconds: f32) {
        let vol = self.effective_volume(self.music_volume);
        if let Some(backend) = self.backend.as_mut() {
            backend.fade_in_music(name, vol, seconds);
        }
    }

    pub fn pause_music(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.pause_music();
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.stop_music();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        played: Rc<RefCell<Vec<(String, f32)>>>,
    }

    impl AudioBackend for Recorder {
        fn play_sample(&mut self, name: &str, volume: f32) {
            self.played.borrow_mut().push((name.to_string(), volume));
        }
        fn play_music(&mut self, _name: &str, _volume: f32) {}
        fn fade_in_music(&mut self, _name: &str, _volume: f32, _seconds: f32) {}
        fn pause_music(&mut self) {}
        fn stop_music(&mut self) {}
    }

    #[test]
    fn test_events_map_to_samples() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Some(Box::new(Recorder {
            played: played.clone(),
        })));
        audio.play_events(&[GameEvent::Stomp, GameEvent::Collect(CollectibleKind::Gem)]);

        let names: Vec<String> = played.borrow().iter().map(|(n, _)| n.clone()).collect();
        assert_eq!(names, vec!["stomp", "gem"]);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let played = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Some(Box::new(Recorder {
            played: played.clone(),
        })));
        audio.set_muted(true);
        audio.play(SoundEffect::Jump);
        assert!(played.borrow().is_empty());
    }

    #[test]
    fn test_missing_backend_is_silent() {
        let mut audio = AudioManager::default();
        audio.play_events(&[GameEvent::Death]);
        audio.play_music("theme");
        audio.stop_music();
    }
}
