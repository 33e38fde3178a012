//! Match rules: the turn-phase cycle and the player-facing match API.
//!
//! - `TurnController`: the only code that moves a `Match` between phases
//! - `MatchEngine`: validates actions and drives effect resolution
//! - `MatchSession` / `MatchRegistry`: per-match state and locking

pub mod engine;
pub mod session;
pub mod turn;

pub use engine::MatchEngine;
pub use session::{MatchId, MatchRecord, MatchRegistry, MatchSession, SharedSession};
pub use turn::{PhaseTransition, TurnController};
