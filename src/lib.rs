//! Lava Drop - A round-based elimination platformer core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (platforms, rounds, AI agents, timer)
//! - `settings`: Data-driven match tuning
//! - `audio`: Host-side audio state driven by simulation events

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, SoundEffect};
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Distance below which an animated platform counts as arrived
    pub const ARRIVE_TOLERANCE: f32 = 0.01;
    /// Per-frame displacement that counts as "the player moved"
    pub const MOVE_EPSILON: f32 = 0.01;

    /// Winner name reported when nobody was ever eliminated
    pub const NO_WINNER: &str = "Nobody";

    /// Music pitch while paused
    pub const PAUSED_MUSIC_PITCH: f32 = 0.75;
    /// Music pitch added per round after the first
    pub const PITCH_PER_ROUND: f32 = 0.1;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_delta || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Project a vector onto the ground plane (drop the Y component)
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal (XZ) distance between two points
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(a - b).length()
}

/// Music pitch for a given round number (1-based)
#[inline]
pub fn round_music_pitch(round: u32) -> f32 {
    1.0 + round.saturating_sub(1) as f32 * consts::PITCH_PER_ROUND
}
