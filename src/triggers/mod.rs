//! Triggers: events, conditions, and routing.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: something that happened, with its acting player and source
//! - [`Trigger`]: the class of moment an effect is bound to
//! - [`Condition`]: a predicate gating activation
//! - [`EventRouter`]: event to stack items, plus the persistent pass
//!
//! ## Example Usage
//!
//! ```
//! use mememe_engine::core::{Match, Phase, PlayerId};
//! use mememe_engine::triggers::{EventKind, GameEvent, Trigger};
//!
//! let played = GameEvent::new(EventKind::SupportPlayed, PlayerId::TWO, Phase::Main);
//! assert_eq!(played.trigger(&Match::new()), Some(Trigger::Counter));
//! ```

mod condition;
mod event;
mod router;

pub use condition::{Condition, ConditionContext, ConditionEvaluator};
pub use event::{EventKind, GameEvent, Trigger};
pub use router::EventRouter;
