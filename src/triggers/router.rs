//! Event routing.
//!
//! The router turns a `GameEvent` into the stack items it activates, and
//! runs the persistent normalization pass that rebuilds every continuous
//! modifier from scratch.
//!
//! ## Relevance
//!
//! Self-referential triggers (on play, attack, block, destroy, and support
//! timing) fire only for the card that caused the event. Every other
//! trigger fires for each matching card in play, for either controller, in
//! player order then slot order, with field cards after friends.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::event::GameEvent;
use crate::cards::{CardCatalog, CardNo};
use crate::core::{GameState, Match};
use crate::effects::{in_play, EffectCatalog, EffectContext, SourceCard};
use crate::mutations::GameMutations;
use crate::stack::EffectStackItem;

/// Routes events to effects.
pub struct EventRouter;

impl EventRouter {
    /// Stack items activated by `event`, in the order they should resolve.
    ///
    /// Effects whose condition or preconditions fail are skipped here and
    /// never reach the stack.
    #[must_use]
    pub fn route(
        event: &GameEvent,
        state: &GameState,
        game: &Match,
        effects: &EffectCatalog,
        catalog: &dyn CardCatalog,
    ) -> Vec<EffectStackItem> {
        let Some(trigger) = event.trigger(game) else {
            return Vec::new();
        };

        let sources: Vec<SourceCard> = if trigger.is_self_referential() {
            event
                .source
                .iter()
                .map(|card| SourceCard::new(card.clone(), event.player, event.source_slot))
                .collect()
        } else {
            let listening: BTreeSet<&CardNo> = effects.cards_for(trigger).collect();
            in_play(state)
                .into_iter()
                .filter(|s| listening.contains(&s.card_no))
                .collect()
        };

        sources
            .into_iter()
            .filter_map(|source| {
                let effect = effects.get(&source.card_no)?;
                if !effect.responds_to(trigger) {
                    return None;
                }
                let ctx = EffectContext::new(catalog, game, &source).with_event(Some(event));
                if !effect.can_activate(state, &ctx) {
                    debug!(card = %source.card_no, ?trigger, "effect cannot activate");
                    return None;
                }
                debug!(card = %source.card_no, ?trigger, controller = %source.controller, "queued effect");
                Some(EffectStackItem::new(Arc::clone(effect), source, Some(event.clone())))
            })
            .collect()
    }

    /// Recompute every continuous modifier.
    ///
    /// Clears them all, then applies each persistent effect in play whose
    /// condition holds. A failing effect is logged and skipped; the pass
    /// never fails.
    pub fn normalize(state: &mut GameState, game: &Match, effects: &EffectCatalog, catalog: &dyn CardCatalog) {
        state.clear_continuous_modifiers();

        for source in in_play(state) {
            let Some(effect) = effects.get(&source.card_no) else {
                continue;
            };
            if !effect.is_persistent() {
                continue;
            }
            let ctx = EffectContext::new(catalog, game, &source);
            if !effect.can_activate(state, &ctx) {
                continue;
            }
            if let Err(err) = effect.apply(state, &ctx, &[]) {
                warn!(card = %source.card_no, error = %err, "skipping persistent effect");
            }
        }
    }
}
