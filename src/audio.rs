//! Audio state driven by simulation events
//!
//! No backend here: the host reads the queued one-shots and the music
//! pitch/volume each frame and forwards them to whatever it plays sound with.

use serde::{Deserialize, Serialize};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Safe platform announced
    SafePlatform,
    /// A character fell into the lava
    Elimination,
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    muted: bool,
    music_pitch: f32,
    music_playing: bool,
    /// One-shots requested since the host last drained them
    pending: Vec<SoundEffect>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            master_volume: 1.0,
            muted: false,
            music_pitch: 1.0,
            music_playing: true,
            pending: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    pub fn music_pitch(&self) -> f32 {
        self.music_pitch
    }

    pub fn music_playing(&self) -> bool {
        self.music_playing
    }

    /// Queue a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if self.effective_volume() <= 0.0 {
            return;
        }
        self.pending.push(effect);
    }

    /// Take the queued one-shots
    pub fn drain(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.pending)
    }

    /// Back to base pitch with the music stopped (used on restart)
    pub fn reset(&mut self) {
        self.music_pitch = 1.0;
        self.music_playing = false;
        self.pending.clear();
    }

    /// React to a simulation event
    pub fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlaySound(effect) => self.play(*effect),
            GameEvent::MusicPitch(pitch) => {
                self.music_pitch = *pitch;
                self.music_playing = true;
            }
            GameEvent::AudioReset => self.reset(),
            _ => {}
        }
    }
}
