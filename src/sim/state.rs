//! Match state and core simulation types
//!
//! Everything a round needs lives in `MatchState`, which is passed explicitly
//! to every operation. It serializes whole (RNG included) so a snapshot
//! resumes deterministically.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::AiAgent;
use super::platform::PlatformManager;
use super::player::{EntityKind, Player};
use super::timer::MatchTimer;
use crate::audio::SoundEffect;
use crate::consts::NO_WINNER;
use crate::round_music_pitch;
use crate::settings::Settings;

/// Current phase of the round loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Counting down to the safe-platform announcement
    Announcing { remaining: f32 },
    /// Safe platform known, counting down to the drop
    Waiting { remaining: f32 },
    /// Unsafe platforms falling
    Dropping,
    /// Platforms holding at the bottom, then rising back
    Resetting,
    /// Everyone is out
    GameOver,
}

/// Pause handling
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PauseState {
    #[default]
    Running,
    Paused,
    /// Unpaused, counting down before play resumes
    Resuming { remaining: f32 },
}

/// Things the host reacts to (UI, audio, effects)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: u32 },
    SafePlatformSelected { index: usize, platform_id: u32 },
    PlaySound(SoundEffect),
    PlatformsDropping { speed: f32 },
    PlatformsReset,
    PlayerEliminated { id: u32, name: String },
    GameOver { winner: String, final_time: f32 },
    MusicPitch(f32),
    PauseMenu { visible: bool },
    AudioReset,
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    /// Match seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub settings: Settings,
    /// Current round (1-based)
    pub round: u32,
    /// Time between announcement and drop for the current round
    pub round_delay: f32,
    pub phase: RoundPhase,
    pub pause: PauseState,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated seconds (excluding pauses)
    pub clock: f32,
    pub platforms: PlatformManager,
    /// Characters, sorted by id
    pub players: Vec<Player>,
    /// One agent per AI character
    pub agents: Vec<AiAgent>,
    pub timer: MatchTimer,
    last_eliminated: Option<String>,
    pub winner: Option<String>,
    /// Events since the host last drained them
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: u32,
}

impl MatchState {
    /// Create a new match with the given seed
    pub fn new(seed: u64, settings: Settings, platforms: PlatformManager) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            round: 1,
            round_delay: settings.round_delay,
            phase: RoundPhase::Announcing {
                remaining: settings.announce_delay,
            },
            pause: PauseState::Running,
            time_ticks: 0,
            clock: 0.0,
            platforms,
            players: Vec::new(),
            agents: Vec::new(),
            timer: MatchTimer::new(),
            last_eliminated: None,
            winner: None,
            events: Vec::new(),
            next_id: 1,
            settings,
        };

        state.push_event(GameEvent::MusicPitch(round_music_pitch(1)));
        state.push_event(GameEvent::RoundStarted { round: 1 });
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a character. AI characters get an agent attached.
    pub fn add_player(&mut self, name: impl Into<String>, kind: EntityKind, spawn: Vec3) -> u32 {
        let id = self.next_entity_id();
        let player = Player::new(id, name, kind, spawn);
        log::info!("Player added: {} ({:?})", player.name, kind);
        self.players.push(player);
        if kind == EntityKind::Ai {
            self.agents.push(AiAgent::new(id));
        }
        id
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Place a character at an externally computed position
    pub fn set_position(&mut self, id: u32, pos: Vec3) {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => player.pos = pos,
            None => log::warn!("set_position: no player with id {id}"),
        }
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RoundPhase::GameOver
    }

    /// Music pitch for the current round
    pub fn music_pitch(&self) -> f32 {
        round_music_pitch(self.round)
    }

    /// Eliminate a character. Returns false if unknown or already out.
    pub fn eliminate(&mut self, id: u32) -> bool {
        let Some(player) = self.players.iter_mut().find(|p| p.id == id) else {
            log::warn!("eliminate: no player with id {id}");
            return false;
        };
        if !player.eliminate() {
            return false;
        }

        let name = player.name.clone();
        log::info!("{name} has been eliminated");
        self.last_eliminated = Some(name.clone());
        self.push_event(GameEvent::PlayerEliminated { id, name });
        self.push_event(GameEvent::PlaySound(SoundEffect::Elimination));

        if !self.is_game_over() {
            self.check_game_over();
        }
        true
    }

    /// End the match once nobody is alive. The winner is whoever went last.
    pub fn check_game_over(&mut self) -> bool {
        if self.is_game_over() {
            return true;
        }

        let alive = self.alive_count();
        log::debug!("Alive players: {alive}");
        if alive > 0 {
            return false;
        }

        let winner = self
            .last_eliminated
            .clone()
            .unwrap_or_else(|| NO_WINNER.to_string());
        self.timer.stop();
        self.phase = RoundPhase::GameOver;
        self.winner = Some(winner.clone());
        log::info!("Game over in round {}, winner: {winner}", self.round);
        self.push_event(GameEvent::GameOver {
            winner,
            final_time: self.timer.elapsed(),
        });
        true
    }

    /// Put everything back to the start of round 1
    pub fn restart(&mut self) {
        for player in &mut self.players {
            player.reset();
        }
        for agent in &mut self.agents {
            agent.clear_target();
        }
        self.platforms.reset();
        self.timer.reset();
        self.round = 1;
        self.round_delay = self.settings.round_delay;
        self.phase = RoundPhase::Announcing {
            remaining: self.settings.announce_delay,
        };
        self.pause = PauseState::Running;
        self.last_eliminated = None;
        self.winner = None;
        log::info!("Match restarted");

        self.push_event(GameEvent::AudioReset);
        self.push_event(GameEvent::MusicPitch(round_music_pitch(1)));
        self.push_event(GameEvent::RoundStarted { round: 1 });
    }

    /// Positions the match timer watches: the human players, or every
    /// player in a match without humans
    pub fn timer_positions(&self) -> Vec<(u32, Vec3)> {
        let has_humans = self.players.iter().any(|p| p.kind == EntityKind::Human);
        self.players
            .iter()
            .filter(|p| (p.kind == EntityKind::Human || !has_humans) && p.is_alive())
            .map(|p| (p.id, p.pos))
            .collect()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
