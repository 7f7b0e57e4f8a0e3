//! Match timer
//!
//! Starts the first time a watched player moves, then tracks elapsed
//! simulation time until stopped. Once stopped the value is frozen for good.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::MOVE_EPSILON;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchTimer {
    started: bool,
    stopped: bool,
    start_time: f32,
    current: f32,
    /// Last seen position per watched player id
    last_positions: Vec<(u32, Vec3)>,
}

impl MatchTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the clock and the watched players' positions for this frame
    pub fn update(&mut self, now: f32, positions: &[(u32, Vec3)]) {
        if self.stopped {
            return;
        }

        if self.started {
            self.current = now - self.start_time;
            return;
        }

        for &(id, pos) in positions {
            match self.last_positions.iter_mut().find(|(known, _)| *known == id) {
                Some((_, last)) => {
                    if pos.distance(*last) > MOVE_EPSILON {
                        self.started = true;
                        self.start_time = now;
                        log::info!("Timer started at t={now:.2}s");
                        return;
                    }
                    *last = pos;
                }
                None => self.last_positions.push((id, pos)),
            }
        }
    }

    /// Freeze the timer. Only the first call has any effect.
    pub fn stop(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        log::info!("Timer stopped at {:.2}s", self.current);
        true
    }

    pub fn elapsed(&self) -> f32 {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.started && !self.stopped
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
