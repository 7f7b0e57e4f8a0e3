//! AI agents
//!
//! Simple steering, no pathfinding: run straight at the safe platform
//! (faster when another AI is close behind), then wander around on it.
//! While seeking, an agent shoves anyone crowding the platform.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::{flatten, horizontal_distance};

use super::platform::PlatformManager;
use super::player::{EntityKind, Player};

/// Sub-state of an agent with a target
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AgentMode {
    /// Heading for the target platform
    #[default]
    Seeking,
    /// On the platform, wandering toward `point`
    Patrolling { point: Vec3 },
}

/// Drives one AI-controlled player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAgent {
    pub player_id: u32,
    /// Index of the platform to reach
    pub target: Option<usize>,
    pub mode: AgentMode,
}

impl AiAgent {
    pub fn new(player_id: u32) -> Self {
        Self {
            player_id,
            target: None,
            mode: AgentMode::Seeking,
        }
    }

    /// Point the agent at a new platform
    pub fn set_target(&mut self, platform: usize) {
        self.target = Some(platform);
        self.mode = AgentMode::Seeking;
        log::debug!("Agent {} targeting platform index {platform}", self.player_id);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
        self.mode = AgentMode::Seeking;
    }

    /// Advance the agent by one step
    pub fn update<R: Rng>(
        &mut self,
        players: &mut [Player],
        platforms: &PlatformManager,
        settings: &Settings,
        rng: &mut R,
        dt: f32,
    ) {
        let Some(me) = players.iter().position(|p| p.id == self.player_id) else {
            log::warn!("Agent {} has no player body", self.player_id);
            return;
        };
        if !players[me].is_alive() {
            return;
        }
        let Some(platform) = self.target.and_then(|i| platforms.platforms.get(i)) else {
            return;
        };
        let center = platform.pos;
        let platform_radius = platform.radius;
        let patrol_radius = settings.ai_platform_radius.min(platform_radius);

        match self.mode {
            AgentMode::Seeking => {
                let speed = if ally_nearby(players, me, settings.ai_boost_distance) {
                    settings.ai_boosted_speed
                } else {
                    settings.ai_move_speed
                };

                if horizontal_distance(center, players[me].pos) > settings.ai_move_threshold {
                    step_towards(&mut players[me], center, speed * dt);
                } else {
                    let point = patrol_point(center, patrol_radius, rng);
                    self.mode = AgentMode::Patrolling { point };
                    log::debug!("Agent {} reached its platform", self.player_id);
                }

                resolve_crowding(players, me, center, platform_radius, settings, rng, dt);
            }
            AgentMode::Patrolling { point } => {
                if horizontal_distance(point, players[me].pos) > settings.ai_move_threshold {
                    step_towards(&mut players[me], point, settings.ai_move_speed * dt);
                } else {
                    self.mode = AgentMode::Patrolling {
                        point: patrol_point(center, patrol_radius, rng),
                    };
                }
            }
        }

        bounce_contacts(players, me, settings, dt);
    }
}

/// Another living AI within `radius` of player `me`
fn ally_nearby(players: &[Player], me: usize, radius: f32) -> bool {
    let pos = players[me].pos;
    players.iter().enumerate().any(|(i, p)| {
        i != me
            && p.kind == EntityKind::Ai
            && p.is_alive()
            && horizontal_distance(p.pos, pos) < radius
    })
}

/// Walk horizontally toward `point` without overshooting
fn step_towards(player: &mut Player, point: Vec3, max_step: f32) {
    let delta = flatten(point - player.pos);
    let dist = delta.length();
    if dist <= max_step {
        player.pos += delta;
    } else {
        player.pos += delta / dist * max_step;
    }
}

/// Uniform random point on a disc of `radius` around `center`
fn patrol_point<R: Rng>(center: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let r = radius * rng.random_range(0.0f32..=1.0).sqrt();
    center + Vec3::new(r * angle.cos(), 0.0, r * angle.sin())
}

/// Push everyone near agent `me` off the target platform; jostle `me` if the
/// platform is occupied.
fn resolve_crowding<R: Rng>(
    players: &mut [Player],
    me: usize,
    center: Vec3,
    platform_radius: f32,
    settings: &Settings,
    rng: &mut R,
    dt: f32,
) {
    let push_radius = platform_radius * settings.ai_push_radius_factor;
    let my_pos = players[me].pos;
    let mut occupied = false;

    for (i, other) in players.iter_mut().enumerate() {
        if i == me || !other.is_alive() {
            continue;
        }
        if horizontal_distance(other.pos, center) > platform_radius {
            continue;
        }
        occupied = true;

        let away = flatten(other.pos - my_pos);
        let dist = away.length();
        if dist < push_radius {
            let force = settings.ai_separation_force * (1.0 - dist / push_radius);
            other.apply_impulse(away.normalize_or_zero() * force * dt);
        }
    }

    if occupied {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let jolt = Vec3::new(angle.cos(), 0.0, angle.sin()) * settings.ai_separation_force * 0.3;
        players[me].apply_impulse(jolt);
    }
}

/// Touching agents get shoved away from `me`, with no recoil on `me`
fn bounce_contacts(players: &mut [Player], me: usize, settings: &Settings, dt: f32) {
    let my_pos = players[me].pos;
    for (i, other) in players.iter_mut().enumerate() {
        if i == me || other.kind != EntityKind::Ai || !other.is_alive() {
            continue;
        }
        let away = flatten(other.pos - my_pos);
        if away.length() < settings.ai_contact_distance {
            other.apply_impulse(away.normalize_or_zero() * settings.ai_bounce_force * dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::Platform;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    fn arena() -> PlatformManager {
        PlatformManager::new(
            vec![
                Platform::new(0, Vec3::ZERO, 2.5),
                Platform::new(1, Vec3::new(20.0, 0.0, 0.0), 2.5),
            ],
            &Settings::default(),
        )
    }

    #[test]
    fn idle_without_target() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut players = vec![Player::new(1, "bot", EntityKind::Ai, Vec3::new(5.0, 0.0, 0.0))];
        let mut agent = AiAgent::new(1);
        agent.update(&mut players, &platforms, &settings, &mut rng, DT);
        assert_eq!(players[0].pos, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn seeks_at_base_speed_when_alone() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut players = vec![Player::new(1, "bot", EntityKind::Ai, Vec3::new(10.0, 0.0, 0.0))];
        let mut agent = AiAgent::new(1);
        agent.set_target(0);

        agent.update(&mut players, &platforms, &settings, &mut rng, 0.1);
        assert!((players[0].pos.x - (10.0 - settings.ai_move_speed * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn boosts_when_another_ai_is_close() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut players = vec![
            Player::new(1, "bot", EntityKind::Ai, Vec3::new(10.0, 0.0, 0.0)),
            Player::new(2, "other", EntityKind::Ai, Vec3::new(10.0, 0.0, 1.0)),
        ];
        let mut agent = AiAgent::new(1);
        agent.set_target(0);

        agent.update(&mut players, &platforms, &settings, &mut rng, 0.1);
        assert!((players[0].pos.x - (10.0 - settings.ai_boosted_speed * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn human_nearby_does_not_boost() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut players = vec![
            Player::new(1, "bot", EntityKind::Ai, Vec3::new(10.0, 0.0, 0.0)),
            Player::new(2, "you", EntityKind::Human, Vec3::new(10.0, 0.0, 1.0)),
        ];
        let mut agent = AiAgent::new(1);
        agent.set_target(0);

        agent.update(&mut players, &platforms, &settings, &mut rng, 0.1);
        assert!((players[0].pos.x - (10.0 - settings.ai_move_speed * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn arrival_switches_to_patrol_within_radius() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut players = vec![Player::new(1, "bot", EntityKind::Ai, Vec3::new(3.0, 0.0, 0.0))];
        let mut agent = AiAgent::new(1);
        agent.set_target(0);

        for _ in 0..120 {
            agent.update(&mut players, &platforms, &settings, &mut rng, DT);
        }
        match agent.mode {
            AgentMode::Patrolling { point } => {
                assert!(horizontal_distance(point, Vec3::ZERO) <= settings.ai_platform_radius + 1e-4);
            }
            AgentMode::Seeking => panic!("agent never arrived"),
        }
        assert!(horizontal_distance(players[0].pos, Vec3::ZERO) <= 2.5);
    }

    #[test]
    fn new_target_restarts_seeking() {
        let mut agent = AiAgent::new(1);
        agent.mode = AgentMode::Patrolling { point: Vec3::ONE };
        agent.set_target(1);
        assert_eq!(agent.mode, AgentMode::Seeking);
        assert_eq!(agent.target, Some(1));
    }

    #[test]
    fn crowding_pushes_closer_players_harder() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut players = vec![
            Player::new(1, "bot", EntityKind::Ai, Vec3::new(0.0, 0.0, 0.0)),
            Player::new(2, "near", EntityKind::Human, Vec3::new(0.2, 0.0, 0.0)),
            Player::new(3, "far", EntityKind::Human, Vec3::new(0.0, 0.0, -1.2)),
        ];

        resolve_crowding(&mut players, 0, Vec3::ZERO, 2.5, &settings, &mut rng, 1.0);

        let near = players[1].vel;
        let far = players[2].vel;
        assert!(near.x > 0.0, "pushed away along +x");
        assert!(far.z < 0.0, "pushed away along -z");
        assert!(near.length() > far.length());
        // occupied platform jolts the pusher
        assert!(players[0].vel.length() > 0.0);
    }

    #[test]
    fn occupied_platform_jolt_is_an_impulse() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut players = vec![
            Player::new(1, "bot", EntityKind::Ai, Vec3::new(0.0, 0.0, 0.0)),
            Player::new(2, "squatter", EntityKind::Human, Vec3::new(0.0, 0.0, 2.0)),
        ];

        resolve_crowding(&mut players, 0, Vec3::ZERO, 2.5, &settings, &mut rng, DT);

        let expected = settings.ai_separation_force * 0.3;
        let jolt = players[0].vel.length();
        assert!((jolt - expected).abs() < 1e-4, "jolt {jolt}, expected {expected}");
        assert_eq!(players[0].vel.y, 0.0);
    }

    #[test]
    fn empty_platform_means_no_jolt() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut players = vec![
            Player::new(1, "bot", EntityKind::Ai, Vec3::new(10.0, 0.0, 0.0)),
            Player::new(2, "elsewhere", EntityKind::Human, Vec3::new(30.0, 0.0, 0.0)),
        ];
        resolve_crowding(&mut players, 0, Vec3::ZERO, 2.5, &settings, &mut rng, 1.0);
        assert_eq!(players[0].vel, Vec3::ZERO);
        assert_eq!(players[1].vel, Vec3::ZERO);
    }

    #[test]
    fn dead_agent_stays_put() {
        let platforms = arena();
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut players = vec![Player::new(1, "bot", EntityKind::Ai, Vec3::new(10.0, 0.0, 0.0))];
        players[0].eliminate();
        let mut agent = AiAgent::new(1);
        agent.set_target(0);
        agent.update(&mut players, &platforms, &settings, &mut rng, DT);
        assert_eq!(players[0].pos, Vec3::new(10.0, 0.0, 0.0));
    }
}
