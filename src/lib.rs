//! # mememe-engine
//!
//! Rules engine for the Mememe card game: triggered card effects, LIFO
//! stack resolution with chain reactions, and the five-phase turn cycle.
//!
//! ## Design Principles
//!
//! 1. **One Mutation Boundary**: effect code changes the board only through
//!    the `GameMutations` trait. Mutations report what happened as events.
//!
//! 2. **Closed Effect Set**: every card ability is a variant of `EffectKind`
//!    with its own parameters. Cards are data in an `EffectCatalog`.
//!
//! 3. **Persistent Recompute**: always-on modifiers are cleared and rebuilt
//!    after the stack settles, never accumulated.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: zones are `im::Vector`s, so a
//!   checkpoint of the whole board is a cheap clone. Failed actions roll
//!   back to it.
//!
//! - **Suspendable Resolution**: a `PendingChoice` is the only point where
//!   resolution stops and waits for a player.
//!
//! ## Modules
//!
//! - `core`: players, phases, match record, state, RNG, configuration
//! - `zones`: battle-area slots and card locations
//! - `cards`: catalog entries, instances, and the catalog lookup
//! - `mutations`: the state mutation facade
//! - `effects`: effect kinds, targeting, resolution, the effect catalog
//! - `triggers`: events, conditions, and the event router
//! - `stack`: the effect stack and player choices
//! - `rules`: turn controller, match engine, sessions

pub mod cards;
pub mod core;
pub mod effects;
pub mod error;
pub mod mutations;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    AbandonPolicy, AttackTarget, EngineConfig, GameRng, GameState, Match, MatchStatus, Phase, PlayerId,
    PlayerMap, PlayerState, StackFailurePolicy,
};

pub use crate::zones::{BattleArea, DeckPosition, Location, Slot};

pub use crate::cards::{CardAttributes, CardCatalog, CardNo, CardRegistry, CardType, Color, FriendInstance};

pub use crate::mutations::{FriendRef, GameMutations, Pile};

pub use crate::effects::{
    Effect, EffectCatalog, EffectContext, EffectKind, SourceCard, Target, TargetKind, TargetRequirement,
    TargetValidator,
};

pub use crate::triggers::{Condition, EventKind, EventRouter, GameEvent, Trigger};

pub use crate::stack::{ChoiceId, EffectStack, PendingChoice, ResolutionStatus, Selection};

pub use crate::rules::{MatchEngine, MatchId, MatchRegistry, MatchSession, TurnController};

pub use crate::error::{EngineError, Result};
