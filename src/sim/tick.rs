//! Fixed timestep simulation tick
//!
//! Advances the whole match by one step: input, AI, platform animation,
//! player bodies, the timer and finally the round state machine.

use glam::Vec3;

use super::player::EntityKind;
use super::state::{GameEvent, MatchState, PauseState, RoundPhase};
use crate::audio::SoundEffect;
use crate::consts::PAUSED_MUSIC_PITCH;

/// Walk command for one human character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveCommand {
    pub player_id: u32,
    /// Horizontal direction; Y is ignored and the length is normalized
    pub dir: Vec3,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Human movement this step
    pub moves: Vec<MoveCommand>,
    /// Pause toggle
    pub pause: bool,
    /// Restart the match from round 1
    pub restart: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    if input.restart {
        state.restart();
        return;
    }

    if input.pause {
        toggle_pause(state);
    }

    match state.pause {
        PauseState::Running => {}
        PauseState::Paused => return,
        PauseState::Resuming { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                state.pause = PauseState::Resuming { remaining };
            } else {
                state.pause = PauseState::Running;
                let pitch = state.music_pitch();
                state.push_event(GameEvent::MusicPitch(pitch));
                log::info!("Resumed");
            }
            return;
        }
    }

    state.time_ticks += 1;
    state.clock += dt;

    // Humans walk
    for cmd in &input.moves {
        match state.players.iter_mut().find(|p| p.id == cmd.player_id) {
            Some(player) if player.kind == EntityKind::Human => {
                player.walk(cmd.dir, state.settings.player_speed, dt);
            }
            Some(_) => log::warn!("Move command for AI player {} ignored", cmd.player_id),
            None => log::warn!("Move command for unknown player {}", cmd.player_id),
        }
    }

    // AI steering
    for agent in &mut state.agents {
        agent.update(
            &mut state.players,
            &state.platforms,
            &state.settings,
            &mut state.rng,
            dt,
        );
    }

    state.platforms.update(dt);

    // Bodies: ride platforms, fall, touch lava
    let mut burned = Vec::new();
    for player in &mut state.players {
        if player.integrate(&state.platforms, &state.settings, dt) {
            burned.push(player.id);
        }
    }
    for id in burned {
        state.eliminate(id);
    }

    let watched = state.timer_positions();
    state.timer.update(state.clock, &watched);

    advance_round(state, dt);
}

fn toggle_pause(state: &mut MatchState) {
    match state.pause {
        PauseState::Running => {
            state.pause = PauseState::Paused;
            state.push_event(GameEvent::PauseMenu { visible: true });
            state.push_event(GameEvent::MusicPitch(PAUSED_MUSIC_PITCH));
            log::info!("Paused");
        }
        PauseState::Paused => {
            state.pause = PauseState::Resuming {
                remaining: state.settings.resume_countdown,
            };
            state.push_event(GameEvent::PauseMenu { visible: false });
        }
        // Already on its way back
        PauseState::Resuming { .. } => {}
    }
}

/// Round state machine
fn advance_round(state: &mut MatchState, dt: f32) {
    match state.phase {
        RoundPhase::Announcing { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                state.phase = RoundPhase::Announcing { remaining };
            } else {
                announce_safe_platform(state);
                state.phase = RoundPhase::Waiting {
                    remaining: state.round_delay,
                };
            }
        }
        RoundPhase::Waiting { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                state.phase = RoundPhase::Waiting { remaining };
            } else {
                let speed = state.settings.drop_speed(state.round);
                state.platforms.drop_unsafe(speed);
                state.push_event(GameEvent::PlatformsDropping { speed });
                state.phase = RoundPhase::Dropping;
            }
        }
        RoundPhase::Dropping => {
            if state.platforms.drop_finished() {
                if state.check_game_over() {
                    return;
                }
                state.phase = RoundPhase::Resetting;
            }
        }
        RoundPhase::Resetting => {
            if state.platforms.is_idle() {
                state.push_event(GameEvent::PlatformsReset);
                start_next_round(state);
            }
        }
        RoundPhase::GameOver => {}
    }
}

fn announce_safe_platform(state: &mut MatchState) {
    let Some(index) = state.platforms.select_safe(&mut state.rng) else {
        return;
    };
    let Some(platform_id) = state.platforms.safe_marker() else {
        return;
    };

    log::info!("Round {}: platform {platform_id} is safe", state.round);
    state.push_event(GameEvent::SafePlatformSelected { index, platform_id });
    state.push_event(GameEvent::PlaySound(SoundEffect::SafePlatform));

    for agent in &mut state.agents {
        agent.set_target(index);
    }
}

fn start_next_round(state: &mut MatchState) {
    state.round += 1;
    state.round_delay = state.settings.decayed_delay(state.round_delay);
    log::info!(
        "Round {} begins, drop delay {:.2}s",
        state.round,
        state.round_delay
    );

    let pitch = state.music_pitch();
    state.push_event(GameEvent::RoundStarted { round: state.round });
    state.push_event(GameEvent::MusicPitch(pitch));
    state.phase = RoundPhase::Announcing {
        remaining: state.settings.announce_delay,
    };
}
