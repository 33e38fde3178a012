//! Core engine types: players, phases, state, RNG, configuration.

pub mod config;
pub mod phase;
pub mod player;
pub mod rng;
pub mod state;

pub use config::{AbandonPolicy, EngineConfig, StackFailurePolicy};
pub use phase::{AttackTarget, Battle, Match, MatchStatus, Phase};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{GameState, PlayerState};
