//! Match settings and tuning
//!
//! Loaded from a JSON file next to the runner; any missing field takes its
//! default, and a missing or malformed file falls back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Match tuning. Defaults are the values the game shipped with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Rounds ===
    /// Pause before the safe platform is announced (seconds)
    pub announce_delay: f32,
    /// Initial time between announcement and drop (seconds)
    pub round_delay: f32,
    /// Factor applied to `round_delay` at the start of every new round
    pub delay_multiplier: f32,
    /// Floor for `round_delay` once it has decayed
    pub min_round_delay: f32,

    // === Platforms ===
    /// How far unsafe platforms fall
    pub drop_distance: f32,
    /// Fall speed in round 0; actual speed is `drop_base_speed + round * drop_speed_per_round`
    pub drop_base_speed: f32,
    pub drop_speed_per_round: f32,
    /// Time platforms stay down before rising (seconds)
    pub reset_delay: f32,
    /// Speed platforms rise back to their origin
    pub rise_speed: f32,

    // === Players ===
    /// Human walk speed (units/s)
    pub player_speed: f32,
    /// Downward acceleration for unsupported players
    pub gravity: f32,
    /// Height of the lava surface; touching it eliminates
    pub lava_height: f32,
    /// Fraction of impulse velocity kept per second
    pub impulse_damping: f32,

    // === AI ===
    pub ai_move_speed: f32,
    pub ai_boosted_speed: f32,
    /// Another AI closer than this makes an agent hurry
    pub ai_boost_distance: f32,
    /// Distance at which a target counts as reached
    pub ai_move_threshold: f32,
    /// Patrol radius around the safe platform center
    pub ai_platform_radius: f32,
    pub ai_separation_force: f32,
    /// Crowding push radius as a fraction of the platform radius
    pub ai_push_radius_factor: f32,
    pub ai_bounce_force: f32,
    /// Two agents closer than this are touching
    pub ai_contact_distance: f32,

    // === Pause ===
    /// Countdown between unpausing and play resuming (seconds)
    pub resume_countdown: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            announce_delay: 3.0,
            round_delay: 6.0,
            delay_multiplier: 0.75,
            min_round_delay: 0.5,

            drop_distance: 20.0,
            drop_base_speed: 5.0,
            drop_speed_per_round: 0.5,
            reset_delay: 2.0,
            rise_speed: 2.0,

            player_speed: 6.0,
            gravity: 20.0,
            lava_height: -4.0,
            impulse_damping: 0.05,

            ai_move_speed: 5.0,
            ai_boosted_speed: 10.0,
            ai_boost_distance: 3.0,
            ai_move_threshold: 0.1,
            ai_platform_radius: 2.0,
            ai_separation_force: 5.0,
            ai_push_radius_factor: 0.7,
            ai_bounce_force: 0.8,
            ai_contact_distance: 0.8,

            resume_countdown: 3.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON, falling back to defaults on error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.validated(),
            Err(e) => {
                log::warn!("Invalid settings JSON ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from a file; missing or malformed files yield defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json(&json)
            }
            Err(e) => {
                log::warn!("Could not read {} ({e}), using default settings", path.display());
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: &Path) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Failed to save settings to {}: {e}", path.display()),
            },
            Err(e) => log::warn!("Failed to serialize settings: {e}"),
        }
    }

    /// Drop speed used for a given round
    pub fn drop_speed(&self, round: u32) -> f32 {
        self.drop_base_speed + round as f32 * self.drop_speed_per_round
    }

    /// Next round delay after applying the decay factor and floor
    pub fn decayed_delay(&self, current: f32) -> f32 {
        (current * self.delay_multiplier).max(self.min_round_delay)
    }

    /// Clamp values that would stall or break the round loop
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if !(self.delay_multiplier > 0.0 && self.delay_multiplier < 1.0) {
            log::warn!(
                "delay_multiplier {} must be in (0, 1), using {}",
                self.delay_multiplier,
                defaults.delay_multiplier
            );
            self.delay_multiplier = defaults.delay_multiplier;
        }
        if self.min_round_delay < 0.0 {
            log::warn!("min_round_delay {} is negative, clamping to 0", self.min_round_delay);
            self.min_round_delay = 0.0;
        }
        if self.round_delay < self.min_round_delay {
            self.round_delay = self.min_round_delay;
        }

        let speeds = [
            ("drop_base_speed", &mut self.drop_base_speed, defaults.drop_base_speed),
            ("rise_speed", &mut self.rise_speed, defaults.rise_speed),
            ("ai_move_speed", &mut self.ai_move_speed, defaults.ai_move_speed),
            ("ai_boosted_speed", &mut self.ai_boosted_speed, defaults.ai_boosted_speed),
        ];
        for (name, value, default) in speeds {
            if *value <= 0.0 {
                log::warn!("{name} {} must be positive, using {default}", *value);
                *value = default;
            }
        }

        if !(self.drop_speed_per_round >= 0.0) {
            log::warn!(
                "drop_speed_per_round {} is negative, clamping to 0",
                self.drop_speed_per_round
            );
            self.drop_speed_per_round = 0.0;
        }

        self.impulse_damping = self.impulse_damping.clamp(0.0, 1.0);
        self.ai_push_radius_factor = self.ai_push_radius_factor.clamp(0.0, 1.0);
        self.ai_platform_radius = self.ai_platform_radius.max(0.0);
        self.drop_distance = self.drop_distance.max(0.0);
        self.reset_delay = self.reset_delay.max(0.0);
        self.announce_delay = self.announce_delay.max(0.0);
        self.resume_countdown = self.resume_countdown.max(0.0);
        self
    }
}
