//! Effect stack and player choices.
//!
//! Activated effects go on a LIFO stack. Resolving an item may raise
//! events whose reactions are pushed on top of it, and may suspend
//! resolution until a player answers a `PendingChoice`.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mememe_engine::cards::{CardNo, CardRegistry};
//! use mememe_engine::core::{GameState, Match, PlayerId};
//! use mememe_engine::effects::{Effect, EffectCatalog, EffectKind, SourceCard};
//! use mememe_engine::stack::{EffectStack, ResolutionStatus, ResolveContext};
//! use mememe_engine::triggers::Trigger;
//!
//! let registry = CardRegistry::new();
//! let effects = EffectCatalog::new();
//! let game = Match::new();
//! let deck = vec![CardNo::new("F-011"), CardNo::new("F-011")];
//! let mut state = GameState::new(deck.clone(), deck, 0);
//!
//! let cx = ResolveContext::new(&registry, &effects, &game);
//! let mut stack = EffectStack::new();
//! let draw = Arc::new(Effect::new(Trigger::Main, EffectKind::Draw { count: 1 }));
//! stack
//!     .queue(draw, SourceCard::new("X-001", PlayerId::ONE, None), None, None, &state, &cx)
//!     .unwrap();
//!
//! assert_eq!(stack.resolve_all(&mut state, &cx).unwrap(), ResolutionStatus::Complete);
//! assert_eq!(state.player(PlayerId::ONE).hand().len(), 1);
//! ```

mod choice;
mod effect_stack;

pub use choice::{ChoiceId, ChoiceKind, PendingChoice, Selection};
pub use effect_stack::{EffectStack, EffectStackItem, StackItemId};

use serde::{Deserialize, Serialize};

use crate::cards::CardCatalog;
use crate::core::Match;
use crate::effects::EffectCatalog;

/// Outcome of a resolution run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// The stack is empty.
    Complete,
    /// Resolution is suspended until this choice is answered.
    AwaitingChoice(ChoiceId),
}

/// Read-only inputs every resolution step needs.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a dyn CardCatalog,
    pub effects: &'a EffectCatalog,
    pub game: &'a Match,
}

impl<'a> ResolveContext<'a> {
    #[must_use]
    pub fn new(catalog: &'a dyn CardCatalog, effects: &'a EffectCatalog, game: &'a Match) -> Self {
        Self { catalog, effects, game }
    }
}
