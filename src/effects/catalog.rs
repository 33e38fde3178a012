//! Effect catalog.
//!
//! Maps card numbers to their effects and keeps an index by trigger, so the
//! router can find every card that reacts to a trigger without scanning the
//! whole catalog. Both maps are ordered: lookups return card numbers in the
//! same order on every run.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::effect::Effect;
use crate::cards::CardNo;
use crate::triggers::Trigger;

#[derive(Clone, Debug, Default)]
pub struct EffectCatalog {
    effects: BTreeMap<CardNo, Arc<Effect>>,
    by_trigger: BTreeMap<Trigger, BTreeSet<CardNo>>,
}

impl EffectCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect for one card number, replacing any previous one.
    pub fn register(&mut self, card_no: impl Into<CardNo>, effect: Effect) {
        self.insert(card_no.into(), Arc::new(effect));
    }

    /// Register an effect for a card and its promotional printing.
    ///
    /// Both numbers share the same `Arc`.
    pub fn register_with_promo(&mut self, card_no: impl Into<CardNo>, effect: Effect) {
        let card_no = card_no.into();
        let effect = Arc::new(effect);
        self.insert(card_no.promo(), Arc::clone(&effect));
        self.insert(card_no, effect);
    }

    fn insert(&mut self, card_no: CardNo, effect: Arc<Effect>) {
        if let Some(old) = self.effects.get(&card_no) {
            for trigger in index_keys(old) {
                if let Some(cards) = self.by_trigger.get_mut(&trigger) {
                    cards.remove(&card_no);
                }
            }
        }
        for trigger in index_keys(&effect) {
            self.by_trigger.entry(trigger).or_default().insert(card_no.clone());
        }
        self.effects.insert(card_no, effect);
    }

    #[must_use]
    pub fn get(&self, card_no: &CardNo) -> Option<&Arc<Effect>> {
        self.effects.get(card_no)
    }

    /// Card numbers with an effect answering `trigger`, in sorted order.
    pub fn cards_for(&self, trigger: Trigger) -> impl Iterator<Item = &CardNo> {
        self.by_trigger.get(&trigger).into_iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CardNo, &Arc<Effect>)> {
        self.effects.iter()
    }
}

fn index_keys(effect: &Effect) -> Vec<Trigger> {
    let mut keys = vec![effect.trigger];
    if effect.responds_to(Trigger::Counter) && effect.trigger != Trigger::Counter {
        keys.push(Trigger::Counter);
    }
    keys
}
