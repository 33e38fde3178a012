//! Rule modifiers: persistent effects the rules query instead of applying.
//!
//! Keywords, cost reductions, and enter-rested rules never touch the state.
//! The match engine asks `RuleModifiers` about them at the moment a rule
//! needs the answer, so they always reflect the current board.

use std::sync::Arc;

use smallvec::SmallVec;

use super::catalog::EffectCatalog;
use super::effect::{Effect, EffectKind, Keyword, SourceCard};
use crate::cards::CardAttributes;
use crate::core::{GameState, Match, PlayerId};
use crate::triggers::{ConditionContext, ConditionEvaluator};
use crate::zones::Slot;

/// Every card in play that may carry an effect: player one first, friends
/// in slot order, then that player's field card.
#[must_use]
pub fn in_play(state: &GameState) -> Vec<SourceCard> {
    let mut sources = Vec::new();
    for player in PlayerId::both() {
        let zones = state.player(player);
        for (slot, friend) in zones.battle().iter() {
            sources.push(SourceCard::new(friend.card_no.clone(), player, Some(slot)));
        }
        if let Some(field) = zones.field() {
            sources.push(SourceCard::new(field.clone(), player, None));
        }
    }
    sources
}

/// Read-only view answering rule questions about the current board.
pub struct RuleModifiers<'a> {
    effects: &'a EffectCatalog,
    state: &'a GameState,
    game: &'a Match,
}

impl<'a> RuleModifiers<'a> {
    #[must_use]
    pub fn new(effects: &'a EffectCatalog, state: &'a GameState, game: &'a Match) -> Self {
        Self { effects, state, game }
    }

    /// Persistent effects in play whose condition currently holds.
    fn active(&self) -> impl Iterator<Item = (SourceCard, &'a Arc<Effect>)> + '_ {
        in_play(self.state).into_iter().filter_map(move |source| {
            let effect = self.effects.get(&source.card_no)?;
            (effect.is_persistent() && self.holds(effect, source.controller)).then_some((source, effect))
        })
    }

    fn holds(&self, effect: &Effect, controller: PlayerId) -> bool {
        let ctx = ConditionContext {
            state: self.state,
            game: self.game,
            controller,
            event: None,
        };
        ConditionEvaluator::evaluate(&effect.condition, &ctx)
    }

    /// Keywords the friend at `slot` currently has.
    #[must_use]
    pub fn keywords(&self, player: PlayerId, slot: Slot) -> SmallVec<[Keyword; 2]> {
        self.active()
            .filter(|(source, _)| source.controller == player && source.slot == Some(slot))
            .filter_map(|(_, effect)| effect.keyword())
            .collect()
    }

    #[must_use]
    pub fn has_haste(&self, player: PlayerId, slot: Slot) -> bool {
        self.keywords(player, slot).contains(&Keyword::Haste)
    }

    #[must_use]
    pub fn blocks_while_rested(&self, player: PlayerId, slot: Slot) -> bool {
        self.keywords(player, slot).contains(&Keyword::BlockWhileRested)
    }

    #[must_use]
    pub fn extra_damage(&self, player: PlayerId, slot: Slot) -> u32 {
        self.keywords(player, slot)
            .iter()
            .map(|k| match k {
                Keyword::ExtraDamage(n) => *n,
                _ => 0,
            })
            .sum()
    }

    /// Cost `player` pays to play `card` after reductions.
    ///
    /// A reduction never takes the cost below its minimum, and never raises
    /// a cost that is already under it.
    #[must_use]
    pub fn effective_cost(&self, player: PlayerId, card: &CardAttributes) -> u32 {
        self.active()
            .filter(|(source, _)| source.controller == player)
            .fold(card.cost, |cost, (_, effect)| match effect.kind {
                EffectKind::CostReduction {
                    card_type,
                    amount,
                    minimum,
                } if card_type == card.card_type => cost.saturating_sub(amount).max(minimum.min(cost)),
                _ => cost,
            })
    }

    /// Whether `player` may play supports out of their negative energy.
    #[must_use]
    pub fn supports_from_negative_energy(&self, player: PlayerId) -> bool {
        self.active()
            .any(|(source, effect)| source.controller == player && effect.allows_negative_energy_supports())
    }

    /// Whether a friend with this printed cost enters play rested.
    #[must_use]
    pub fn enters_rested(&self, cost: u32) -> bool {
        self.active().any(|(_, effect)| match &effect.kind {
            EffectKind::EnterRested { costs } => costs.contains(&cost),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardNo, Color};
    use crate::mutations::GameMutations;

    fn state_with(friends: &[&str], field: Option<&str>) -> GameState {
        let mut deck: Vec<CardNo> = friends.iter().map(|c| CardNo::new(*c)).collect();
        if let Some(f) = field {
            deck.push(CardNo::new(f));
        }
        let count = deck.len();
        let mut state = GameState::new(deck, Vec::new(), 5);
        state.draw(PlayerId::ONE, count).unwrap();
        for (i, card) in friends.iter().enumerate() {
            let slot = Slot::new(u8::try_from(i).unwrap());
            state
                .play_friend(PlayerId::ONE, &CardNo::new(*card), slot, 1000, 1, false)
                .unwrap();
        }
        if let Some(f) = field {
            state.place_field_card(PlayerId::ONE, &CardNo::new(f)).unwrap();
        }
        state
    }

    #[test]
    fn test_in_play_order() {
        let state = state_with(&["F-006", "F-011"], Some("F-095"));
        let order: Vec<_> = in_play(&state).into_iter().map(|s| (s.card_no, s.slot)).collect();
        assert_eq!(
            order,
            vec![
                (CardNo::new("F-006"), Some(Slot::new(0))),
                (CardNo::new("F-011"), Some(Slot::new(1))),
                (CardNo::new("F-095"), None),
            ]
        );
    }

    #[test]
    fn test_negative_energy_supports_need_own_field() {
        let effects = EffectCatalog::builtin();
        let state = state_with(&[], Some("F-094"));
        let game = Match::new();
        let rules = RuleModifiers::new(&effects, &state, &game);

        assert!(rules.supports_from_negative_energy(PlayerId::ONE));
        assert!(!rules.supports_from_negative_energy(PlayerId::TWO));
    }

    #[test]
    fn test_haste_keyword() {
        let effects = EffectCatalog::builtin();
        let state = state_with(&["F-006", "F-015"], None);
        let game = Match::new();
        let rules = RuleModifiers::new(&effects, &state, &game);

        assert!(!rules.has_haste(PlayerId::ONE, Slot::new(0)));
        assert!(rules.has_haste(PlayerId::ONE, Slot::new(1)));
    }

    #[test]
    fn test_extra_damage_needs_revealed_energy() {
        let effects = EffectCatalog::builtin();
        let mut state = state_with(&["F-016"], None);
        let game = Match::new();
        assert_eq!(RuleModifiers::new(&effects, &state, &game).extra_damage(PlayerId::ONE, Slot::new(0)), 0);

        state.players[PlayerId::ONE].negative_energy.extend(
            ["X-1", "X-2", "X-3"]
                .map(|c| crate::cards::NegativeEnergyCard {
                    card_no: CardNo::new(c),
                    face_up: true,
                }),
        );
        assert_eq!(RuleModifiers::new(&effects, &state, &game).extra_damage(PlayerId::ONE, Slot::new(0)), 1);
    }

    #[test]
    fn test_cost_reduction_floor() {
        let effects = EffectCatalog::builtin();
        let state = state_with(&[], Some("F-095"));
        let game = Match::new();
        let rules = RuleModifiers::new(&effects, &state, &game);

        let three = CardAttributes::friend("F-006", "Drawer", Color::Blue, 3, 1000);
        let one = CardAttributes::friend("F-011", "Pochi", Color::Blue, 1, 1000);
        let support = CardAttributes::support("F-067", "Snack", Color::Red, 2);

        assert_eq!(rules.effective_cost(PlayerId::ONE, &three), 2);
        assert_eq!(rules.effective_cost(PlayerId::ONE, &one), 1);
        assert_eq!(rules.effective_cost(PlayerId::ONE, &support), 2);
        assert_eq!(rules.effective_cost(PlayerId::TWO, &three), 3);
    }

    #[test]
    fn test_enters_rested() {
        let effects = EffectCatalog::builtin();
        let state = state_with(&[], Some("F-096"));
        let game = Match::new();
        let rules = RuleModifiers::new(&effects, &state, &game);

        assert!(rules.enters_rested(4));
        assert!(!rules.enters_rested(3));
    }
}
