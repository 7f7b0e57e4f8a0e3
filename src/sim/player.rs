//! Players: humans and AI-controlled characters
//!
//! Both kinds share the same body model. The kind is fixed at spawn and
//! decides who drives the character (input vs. `AiAgent`).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::flatten;
use crate::settings::Settings;

use super::platform::PlatformManager;

/// Highest ledge a player steps onto, and how far a platform may drop away
/// under a player in one step while still carrying it
pub const STEP_HEIGHT: f32 = 0.5;

/// Who controls a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Human,
    Ai,
}

/// A character in the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub kind: EntityKind,
    pub pos: Vec3,
    /// Velocity from pushes and gravity (walking is applied directly)
    pub vel: Vec3,
    /// Spawn point, restored on reset
    pub spawn: Vec3,
    alive: bool,
}

impl Player {
    pub fn new(id: u32, name: impl Into<String>, kind: EntityKind, spawn: Vec3) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            pos: spawn,
            vel: Vec3::ZERO,
            spawn,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark eliminated. Returns false if the player was already out.
    pub fn eliminate(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.vel = Vec3::ZERO;
        true
    }

    /// Bring the player back at its spawn point
    pub fn reset(&mut self) {
        self.alive = true;
        self.pos = self.spawn;
        self.vel = Vec3::ZERO;
    }

    /// Add an instantaneous horizontal velocity change
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.alive {
            self.vel += flatten(impulse);
        }
    }

    /// Walk in a horizontal direction for one step
    pub fn walk(&mut self, dir: Vec3, speed: f32, dt: f32) {
        if self.alive {
            self.pos += flatten(dir).normalize_or_zero() * speed * dt;
        }
    }

    /// Integrate pushes and gravity, riding or landing on platforms.
    /// Returns true if the player touched the lava this step.
    pub fn integrate(&mut self, platforms: &PlatformManager, settings: &Settings, dt: f32) -> bool {
        if !self.alive {
            return false;
        }

        // Horizontal impulse motion with exponential damping
        let horizontal = flatten(self.vel);
        self.pos += horizontal * dt;
        let keep = settings.impulse_damping.powf(dt);
        self.vel.x *= keep;
        self.vel.z *= keep;

        let support = platforms
            .support_under(self.pos, STEP_HEIGHT)
            .map(|i| platforms.platforms[i].pos.y);

        match support {
            Some(top) if self.pos.y - top <= STEP_HEIGHT => {
                self.pos.y = top;
                self.vel.y = 0.0;
            }
            _ => {
                self.vel.y -= settings.gravity * dt;
                self.pos.y += self.vel.y * dt;
                if let Some(top) = support {
                    if self.pos.y < top {
                        self.pos.y = top;
                        self.vel.y = 0.0;
                    }
                }
            }
        }

        self.pos.y <= settings.lava_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::Platform;

    fn single_platform() -> PlatformManager {
        PlatformManager::new(vec![Platform::new(0, Vec3::ZERO, 2.0)], &Settings::default())
    }

    #[test]
    fn eliminate_is_one_shot() {
        let mut p = Player::new(1, "A", EntityKind::Human, Vec3::ZERO);
        assert!(p.eliminate());
        assert!(!p.eliminate());
        assert!(!p.is_alive());
        p.reset();
        assert!(p.is_alive());
    }

    #[test]
    fn eliminated_player_does_not_move() {
        let mut p = Player::new(1, "A", EntityKind::Human, Vec3::ZERO);
        p.eliminate();
        p.walk(Vec3::X, 5.0, 1.0);
        p.apply_impulse(Vec3::Z);
        assert_eq!(p.pos, Vec3::ZERO);
        assert_eq!(p.vel, Vec3::ZERO);
    }

    #[test]
    fn standing_player_rides_platform() {
        let mut platforms = single_platform();
        let settings = Settings::default();
        let mut p = Player::new(1, "A", EntityKind::Human, Vec3::ZERO);

        platforms.platforms[0].pos.y = -0.2;
        assert!(!p.integrate(&platforms, &settings, 1.0 / 60.0));
        assert!((p.pos.y + 0.2).abs() < 1e-6);
    }

    #[test]
    fn unsupported_player_falls_into_lava() {
        let platforms = single_platform();
        let settings = Settings::default();
        let mut p = Player::new(1, "A", EntityKind::Human, Vec3::new(10.0, 0.0, 0.0));

        let mut touched = false;
        for _ in 0..600 {
            if p.integrate(&platforms, &settings, 1.0 / 60.0) {
                touched = true;
                break;
            }
        }
        assert!(touched);
        assert!(p.pos.y <= settings.lava_height);
    }

    #[test]
    fn impulse_decays() {
        let platforms = single_platform();
        let settings = Settings::default();
        let mut p = Player::new(1, "A", EntityKind::Ai, Vec3::ZERO);
        p.apply_impulse(Vec3::new(1.0, 5.0, 0.0));
        assert_eq!(p.vel.y, 0.0);

        p.integrate(&platforms, &settings, 0.5);
        assert!(p.vel.x < 1.0 && p.vel.x > 0.0);
    }
}
