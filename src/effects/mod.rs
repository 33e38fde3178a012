//! Card effects.
//!
//! - `Effect` / `EffectKind`: what a card ability does and when it fires
//! - `TargetRequirement` / `TargetValidator`: what it may be aimed at
//! - `EffectResolver`: applies an effect through the mutation facade
//! - `EffectCatalog`: card number to effect, indexed by trigger
//! - `RuleModifiers`: persistent rules queried by the match engine
//!
//! ## Design Philosophy
//!
//! The set of effect kinds is closed. Each kind carries its own
//! parameters and answers the same questions (can it activate, what does it
//! target, how does it apply), so adding a card means adding a catalog
//! entry, not a new code path.

mod builtin;
mod catalog;
mod effect;
mod modifiers;
mod resolver;
mod targeting;

pub use catalog::EffectCatalog;
pub use effect::{
    Effect, EffectContext, EffectKind, Keyword, PowerAmount, PowerDuration, PowerScope, RestTarget, Side,
    SourceCard,
};
pub use modifiers::{in_play, RuleModifiers};
pub use resolver::{option_position, EffectResolver};
pub use targeting::{Target, TargetKind, TargetMax, TargetRequirement, TargetSnapshot, TargetValidator};
