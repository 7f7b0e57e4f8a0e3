//! Deterministic simulation module
//!
//! All round logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (players by entity ID)
//! - No engine, rendering or audio backend dependencies

pub mod agent;
pub mod platform;
pub mod player;
pub mod state;
pub mod tick;
pub mod timer;

pub use agent::{AgentMode, AiAgent};
pub use platform::{DropCycle, Platform, PlatformManager, PlatformStatus};
pub use player::{EntityKind, Player};
pub use state::{GameEvent, MatchState, PauseState, RoundPhase};
pub use tick::{MoveCommand, TickInput, tick};
pub use timer::MatchTimer;
