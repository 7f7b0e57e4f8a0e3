//! Platforms and the drop/rise cycle
//!
//! A platform's `pos` is the center of its top surface. Each round one
//! platform is marked safe; the rest fall `drop_distance` units, stay down for
//! `reset_delay` seconds, then every platform rises back to its origin.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::ARRIVE_TOLERANCE;
use crate::settings::Settings;
use crate::{horizontal_distance, move_towards};

/// Motion status of a single platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformStatus {
    #[default]
    Idle,
    Falling,
    Rising,
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    /// Rest position, restored at the end of every round
    pub origin: Vec3,
    pub pos: Vec3,
    /// Walkable radius around `pos`
    pub radius: f32,
    pub status: PlatformStatus,
    pub is_safe: bool,
    /// Where the current animation is heading
    target: Vec3,
}

impl Platform {
    pub fn new(id: u32, origin: Vec3, radius: f32) -> Self {
        Self {
            id,
            origin,
            pos: origin,
            radius,
            status: PlatformStatus::Idle,
            is_safe: false,
            target: origin,
        }
    }

    /// Whether a point is horizontally over this platform
    pub fn covers(&self, point: Vec3) -> bool {
        horizontal_distance(self.pos, point) <= self.radius
    }

    /// Step toward the animation target; returns true once arrived
    fn advance(&mut self, max_delta: f32) -> bool {
        self.pos = move_towards(self.pos, self.target, max_delta);
        self.pos.distance(self.target) < ARRIVE_TOLERANCE
    }

    fn snap_to_origin(&mut self) {
        self.pos = self.origin;
        self.target = self.origin;
        self.status = PlatformStatus::Idle;
        self.is_safe = false;
    }
}

/// Where the manager is in its drop/hold/rise cycle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DropCycle {
    #[default]
    Idle,
    /// Unsafe platforms falling at `speed`
    Dropping { speed: f32 },
    /// Platforms resting at the bottom
    Holding { remaining: f32 },
    /// All platforms rising back to origin
    Rising,
}

/// Owns the platforms and runs the safe-platform cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformManager {
    pub platforms: Vec<Platform>,
    safe_index: Option<usize>,
    cycle: DropCycle,
    drop_distance: f32,
    reset_delay: f32,
    rise_speed: f32,
}

impl PlatformManager {
    pub fn new(platforms: Vec<Platform>, settings: &Settings) -> Self {
        if platforms.is_empty() {
            log::warn!("PlatformManager created without platforms; drops will be no-ops");
        }
        Self {
            platforms,
            safe_index: None,
            cycle: DropCycle::Idle,
            drop_distance: settings.drop_distance,
            reset_delay: settings.reset_delay,
            rise_speed: settings.rise_speed,
        }
    }

    /// Lay out `count` platforms evenly on a ring around the origin
    pub fn ring(count: u32, ring_radius: f32, platform_radius: f32, settings: &Settings) -> Self {
        let platforms = (0..count)
            .map(|i| {
                let theta = i as f32 / count as f32 * std::f32::consts::TAU;
                let origin = Vec3::new(ring_radius * theta.cos(), 0.0, ring_radius * theta.sin());
                Platform::new(i, origin, platform_radius)
            })
            .collect();
        Self::new(platforms, settings)
    }

    pub fn cycle(&self) -> DropCycle {
        self.cycle
    }

    pub fn safe_index(&self) -> Option<usize> {
        self.safe_index
    }

    pub fn safe_platform(&self) -> Option<&Platform> {
        self.safe_index.and_then(|i| self.platforms.get(i))
    }

    /// Pick the safe platform uniformly at random
    pub fn select_safe<R: Rng>(&mut self, rng: &mut R) -> Option<usize> {
        if self.platforms.is_empty() {
            log::warn!("No platforms to select a safe platform from");
            return None;
        }

        let index = rng.random_range(0..self.platforms.len());
        for (i, platform) in self.platforms.iter_mut().enumerate() {
            platform.is_safe = i == index;
        }
        self.safe_index = Some(index);
        log::debug!("Safe platform: {} (index {index})", self.platforms[index].id);
        Some(index)
    }

    /// Id of the platform the host should mirror onto its reference marker
    pub fn safe_marker(&self) -> Option<u32> {
        match self.safe_platform() {
            Some(platform) => Some(platform.id),
            None => {
                log::warn!("No valid safe platform to sync the reference marker with");
                None
            }
        }
    }

    /// Start dropping every platform except the safe one
    pub fn drop_unsafe(&mut self, speed: f32) {
        if self.platforms.is_empty() {
            log::warn!("drop_unsafe called with no platforms");
            return;
        }
        if self.cycle != DropCycle::Idle {
            log::warn!("drop_unsafe ignored: platforms busy ({:?})", self.cycle);
            return;
        }
        let speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            let fallback = Settings::default().drop_base_speed;
            log::warn!("Drop speed {speed} is not positive, using {fallback}");
            fallback
        };

        let down = Vec3::NEG_Y * self.drop_distance;
        let safe = self.safe_index;
        for (i, platform) in self.platforms.iter_mut().enumerate() {
            if Some(i) == safe {
                continue;
            }
            platform.target = platform.pos + down;
            platform.status = PlatformStatus::Falling;
        }
        self.cycle = DropCycle::Dropping { speed };
        log::info!("Dropping unsafe platforms at speed {speed:.2}");
    }

    /// Advance the drop/hold/rise animation by one step
    pub fn update(&mut self, dt: f32) {
        match self.cycle {
            DropCycle::Idle => {}
            DropCycle::Dropping { speed } => {
                let step = speed * dt;
                let mut any_moving = false;
                for platform in &mut self.platforms {
                    if platform.status != PlatformStatus::Falling {
                        continue;
                    }
                    if platform.advance(step) {
                        platform.status = PlatformStatus::Idle;
                    } else {
                        any_moving = true;
                    }
                }
                if !any_moving {
                    self.cycle = DropCycle::Holding {
                        remaining: self.reset_delay,
                    };
                }
            }
            DropCycle::Holding { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    self.cycle = DropCycle::Holding { remaining };
                } else {
                    for platform in &mut self.platforms {
                        platform.target = platform.origin;
                        platform.status = PlatformStatus::Rising;
                    }
                    self.cycle = DropCycle::Rising;
                }
            }
            DropCycle::Rising => {
                let step = self.rise_speed * dt;
                let mut any_moving = false;
                for platform in &mut self.platforms {
                    if platform.status != PlatformStatus::Rising {
                        continue;
                    }
                    if platform.advance(step) {
                        platform.status = PlatformStatus::Idle;
                    } else {
                        any_moving = true;
                    }
                }
                if !any_moving {
                    self.reset();
                }
            }
        }
    }

    /// Snap every platform to its origin and clear the safe flag
    pub fn reset(&mut self) {
        for platform in &mut self.platforms {
            platform.snap_to_origin();
        }
        self.safe_index = None;
        self.cycle = DropCycle::Idle;
    }

    /// True once the falling part of the cycle has finished
    pub fn drop_finished(&self) -> bool {
        !matches!(self.cycle, DropCycle::Dropping { .. })
    }

    /// True when no drop cycle is in progress
    pub fn is_idle(&self) -> bool {
        self.cycle == DropCycle::Idle
    }

    pub fn all_at_origin(&self) -> bool {
        self.platforms
            .iter()
            .all(|p| p.pos.distance(p.origin) < ARRIVE_TOLERANCE)
    }

    /// Index of the platform supporting a point, if any.
    ///
    /// A platform supports the point when it covers it horizontally and its
    /// top is at most `step_height` above the point. The highest such
    /// platform wins.
    pub fn support_under(&self, point: Vec3, step_height: f32) -> Option<usize> {
        self.platforms
            .iter()
            .enumerate()
            .filter(|(_, p)| p.covers(point) && p.pos.y <= point.y + step_height)
            .max_by(|(_, a), (_, b)| a.pos.y.total_cmp(&b.pos.y))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn run_cycle(manager: &mut PlatformManager, dt: f32, max_steps: usize) -> usize {
        let mut steps = 0;
        while !manager.is_idle() && steps < max_steps {
            manager.update(dt);
            steps += 1;
        }
        steps
    }

    #[test]
    fn drop_leaves_safe_platform_in_place() {
        let settings = Settings::default();
        let mut manager = PlatformManager::ring(7, 6.0, 2.0, &settings);
        let mut rng = Pcg32::seed_from_u64(7);
        let safe = manager.select_safe(&mut rng).unwrap();

        manager.drop_unsafe(5.0);
        while !manager.drop_finished() {
            manager.update(1.0 / 60.0);
        }

        for (i, p) in manager.platforms.iter().enumerate() {
            if i == safe {
                assert_eq!(p.pos, p.origin);
                assert!(p.is_safe);
            } else {
                assert!((p.origin.y - p.pos.y - settings.drop_distance).abs() < ARRIVE_TOLERANCE);
            }
        }
        assert!(matches!(manager.cycle(), DropCycle::Holding { .. }));
    }

    #[test]
    fn full_cycle_returns_to_origin_and_clears_safe() {
        let settings = Settings::default();
        let mut manager = PlatformManager::ring(5, 6.0, 2.0, &settings);
        let mut rng = Pcg32::seed_from_u64(1);
        manager.select_safe(&mut rng);
        manager.drop_unsafe(settings.drop_speed(1));

        let steps = run_cycle(&mut manager, 1.0 / 60.0, 100_000);
        assert!(steps < 100_000);
        assert!(manager.all_at_origin());
        assert_eq!(manager.safe_index(), None);
        assert!(manager.platforms.iter().all(|p| !p.is_safe));
        assert!(manager.platforms.iter().all(|p| p.status == PlatformStatus::Idle));
    }

    #[test]
    fn hold_lasts_reset_delay() {
        let settings = Settings {
            reset_delay: 1.0,
            ..Default::default()
        };
        let mut manager = PlatformManager::ring(2, 4.0, 1.0, &settings);
        manager.drop_unsafe(1000.0);
        manager.update(0.1);
        assert!(manager.drop_finished());

        for _ in 0..9 {
            manager.update(0.1);
            assert!(matches!(manager.cycle(), DropCycle::Holding { .. }));
        }
        manager.update(0.11);
        assert_eq!(manager.cycle(), DropCycle::Rising);
    }

    #[test]
    fn rise_uses_rise_speed() {
        let settings = Settings {
            reset_delay: 0.0,
            rise_speed: 10.0,
            drop_distance: 10.0,
            ..Default::default()
        };
        let mut manager = PlatformManager::ring(1, 0.0, 1.0, &settings);
        manager.drop_unsafe(1000.0);
        manager.update(0.1); // falls the whole way
        manager.update(0.1); // hold expires
        assert_eq!(manager.cycle(), DropCycle::Rising);
        manager.update(0.5);
        assert!((manager.platforms[0].pos.y + 5.0).abs() < 1e-4);
    }

    #[test]
    fn empty_manager_is_a_no_op() {
        let mut manager = PlatformManager::new(Vec::new(), &Settings::default());
        let mut rng = Pcg32::seed_from_u64(0);
        assert_eq!(manager.select_safe(&mut rng), None);
        assert_eq!(manager.safe_marker(), None);
        manager.drop_unsafe(5.0);
        assert!(manager.is_idle());
    }

    #[test]
    fn drop_while_busy_is_ignored() {
        let settings = Settings::default();
        let mut manager = PlatformManager::ring(3, 5.0, 1.0, &settings);
        manager.drop_unsafe(5.0);
        manager.update(0.5);
        let before: Vec<Vec3> = manager.platforms.iter().map(|p| p.pos).collect();
        manager.drop_unsafe(5.0);
        let after: Vec<Vec3> = manager.platforms.iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn non_positive_drop_speed_still_finishes() {
        let settings = Settings::default();
        for speed in [0.0, -1.0, f32::NAN] {
            let mut manager = PlatformManager::ring(3, 5.0, 1.0, &settings);
            manager.drop_unsafe(speed);
            assert!(matches!(manager.cycle(), DropCycle::Dropping { speed } if speed > 0.0));

            let steps = run_cycle(&mut manager, 1.0 / 60.0, 100_000);
            assert!(steps < 100_000, "drop at speed {speed} never finished");
            assert!(manager.all_at_origin());
        }
    }

    #[test]
    fn support_prefers_highest_platform() {
        let settings = Settings::default();
        let mut manager = PlatformManager::new(
            vec![
                Platform::new(0, Vec3::ZERO, 2.0),
                Platform::new(1, Vec3::new(0.0, -3.0, 0.0), 2.0),
            ],
            &settings,
        );
        assert_eq!(manager.support_under(Vec3::new(0.5, 0.0, 0.0), 0.5), Some(0));
        manager.platforms[0].pos.y = -10.0;
        assert_eq!(manager.support_under(Vec3::new(0.5, -3.0, 0.0), 0.5), Some(1));
        assert_eq!(manager.support_under(Vec3::new(5.0, 0.0, 0.0), 0.5), None);
    }

    proptest! {
        #[test]
        fn safe_selection_is_in_range_and_never_drops(seed in any::<u64>(), count in 1u32..12) {
            let settings = Settings::default();
            let mut manager = PlatformManager::ring(count, 8.0, 1.5, &settings);
            let mut rng = Pcg32::seed_from_u64(seed);
            let safe = manager.select_safe(&mut rng).unwrap();
            prop_assert!(safe < count as usize);

            manager.drop_unsafe(settings.drop_speed(1));
            let mut steps = 0;
            while !manager.drop_finished() && steps < 10_000 {
                manager.update(1.0 / 60.0);
                prop_assert_eq!(manager.platforms[safe].pos, manager.platforms[safe].origin);
                steps += 1;
            }
            prop_assert!(manager.drop_finished());
        }
    }
}
