//! Effect behavior tests against hand-built boards.
//!
//! One-shot effects are applied directly; persistent effects are observed
//! through the router's normalization pass.

use mememe_engine::cards::{CardAttributes, CardCatalog, CardNo, CardRegistry, CardType, Color};
use mememe_engine::core::{GameState, Match, PlayerId};
use mememe_engine::effects::{Effect, EffectCatalog, EffectContext, EffectKind, SourceCard, Target};
use mememe_engine::error::EngineError;
use mememe_engine::mutations::GameMutations;
use mememe_engine::triggers::{EventRouter, Trigger};
use mememe_engine::zones::{Location, Slot};

const ONE: PlayerId = PlayerId::ONE;
const TWO: PlayerId = PlayerId::TWO;

fn registry() -> CardRegistry {
    [
        CardAttributes::friend("F-003", "Wobbly", Color::Green, 2, 2000),
        CardAttributes::friend("F-011", "Pochi", Color::Blue, 1, 1000),
        CardAttributes::friend("F-012", "Big", Color::Green, 5, 4000),
        CardAttributes::friend("F-044", "Digger", Color::Yellow, 2, 2000),
        CardAttributes::support("F-066", "Rummage", Color::Red, 2),
        CardAttributes::support("F-067", "Refund", Color::Blue, 1),
        CardAttributes::support("F-068", "Demolish", Color::Red, 2),
        CardAttributes::field("F-089", "Home Ground", Color::Green, 2),
        CardAttributes::field("F-097", "Crossroads", Color::Yellow, 2),
        CardAttributes::field("F-098", "Mole House", Color::Yellow, 1),
    ]
    .into_iter()
    .collect()
}

/// Put each listed card into play: friends in slot order, fields as the
/// field card. Both decks get ten Pochis underneath.
fn board(registry: &CardRegistry, one: &[&str], two: &[&str]) -> GameState {
    let deck = |cards: &[&str]| {
        cards
            .iter()
            .map(|c| CardNo::new(*c))
            .chain(std::iter::repeat(CardNo::new("F-011")).take(10))
            .collect::<Vec<_>>()
    };
    let mut state = GameState::new(deck(one), deck(two), 5);
    for (player, cards) in [(ONE, one), (TWO, two)] {
        state.draw(player, cards.len()).unwrap();
        let mut slot = 0;
        for card in cards {
            let card_no = CardNo::new(*card);
            let attrs = registry.card(&card_no).unwrap();
            if attrs.card_type == CardType::Field {
                state.place_field_card(player, &card_no).unwrap();
            } else {
                state
                    .play_friend(player, &card_no, Slot::new(slot), attrs.power, 1, false)
                    .unwrap();
                slot += 1;
            }
        }
    }
    state
}

fn power(state: &GameState, player: PlayerId, slot: u8) -> u32 {
    state.player(player).battle().get(Slot::new(slot)).unwrap().power()
}

fn builtin(card: &str) -> Effect {
    let catalog = EffectCatalog::builtin();
    catalog.get(&CardNo::new(card)).unwrap().as_ref().clone()
}

// =============================================================================
// Targeting
// =============================================================================

#[test]
fn test_destroy_ceiling_excludes_stronger_friend() {
    let registry = registry();
    let game = Match::new();
    let mut state = board(&registry, &[], &["F-012"]);
    let effect = Effect::new(
        Trigger::OnAttack,
        EffectKind::DestroyFriend {
            max_power: 3000,
            mandatory: true,
        },
    );
    let source = SourceCard::new("F-008", ONE, None);
    let ctx = EffectContext::new(&registry, &game, &source);

    assert!(effect.candidate_targets(&state, &ctx).is_empty());
    assert!(!effect.can_activate(&state, &ctx));
    assert_eq!(effect.apply(&mut state, &ctx, &[]).unwrap_err(), EngineError::TargetRequired);
    assert_eq!(state.player(TWO).battle().len(), 1);
}

#[test]
fn test_stale_target_rejected_after_board_change() {
    let registry = registry();
    let game = Match::new();
    let mut state = board(&registry, &[], &["F-011", "F-003"]);
    let effect = builtin("F-069");
    let source = SourceCard::new("F-069", ONE, None);
    let ctx = EffectContext::new(&registry, &game, &source);

    let candidates = effect.candidate_targets(&state, &ctx);
    assert_eq!(candidates.len(), 2);
    state.return_to_hand(TWO, Slot::new(0)).unwrap();

    let err = effect.apply(&mut state, &ctx, &candidates[..1]).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTarget(_)));
    assert_eq!(state.player(TWO).battle().len(), 1);
}

// =============================================================================
// Power
// =============================================================================

#[test]
fn test_power_floors_at_zero() {
    let registry = registry();
    let mut state = board(&registry, &["F-003"], &[]);

    assert_eq!(state.modify_power(ONE, Slot::new(0), -9000).unwrap(), 0);
    assert_eq!(power(&state, ONE, 0), 0);
    assert_eq!(state.modify_power(ONE, Slot::new(0), 1500).unwrap(), 1500);
}

#[test]
fn test_hand_size_boost_recomputed_not_stacked() {
    let registry = registry();
    let effects = EffectCatalog::builtin();
    let game = Match::new();
    let mut state = board(&registry, &["F-003"], &[]);
    state.draw(ONE, 4).unwrap();

    EventRouter::normalize(&mut state, &game, &effects, &registry);
    assert_eq!(power(&state, ONE, 0), 4000);

    state.draw(ONE, 2).unwrap();
    EventRouter::normalize(&mut state, &game, &effects, &registry);
    assert_eq!(power(&state, ONE, 0), 5000);

    EventRouter::normalize(&mut state, &game, &effects, &registry);
    assert_eq!(power(&state, ONE, 0), 5000);
}

#[test]
fn test_field_count_boost() {
    let registry = registry();
    let effects = EffectCatalog::builtin();
    let game = Match::new();
    let mut state = board(&registry, &["F-011", "F-097"], &["F-011"]);

    EventRouter::normalize(&mut state, &game, &effects, &registry);
    assert_eq!(power(&state, ONE, 0), 1000);

    let mut with_field = board(&registry, &["F-011", "F-097"], &["F-011", "F-098"]);
    EventRouter::normalize(&mut with_field, &game, &effects, &registry);
    assert_eq!(power(&with_field, ONE, 0), 2000);
    assert_eq!(power(&with_field, TWO, 0), 1000);
}

#[test]
fn test_conditional_boost_follows_hand_sizes() {
    let registry = registry();
    let effects = EffectCatalog::builtin();
    let game = Match::new();
    let mut state = board(&registry, &["F-011", "F-089"], &[]);
    state.draw(ONE, 3).unwrap();

    EventRouter::normalize(&mut state, &game, &effects, &registry);
    assert_eq!(power(&state, ONE, 0), 3000);

    state.draw(TWO, 5).unwrap();
    EventRouter::normalize(&mut state, &game, &effects, &registry);
    assert_eq!(power(&state, ONE, 0), 1000);
}

// =============================================================================
// Zones
// =============================================================================

#[test]
fn test_optional_negative_energy_discard() {
    let registry = registry();
    let game = Match::new();
    let mut state = board(&registry, &["F-044"], &[]);
    state.take_damage(ONE, 2).unwrap();
    let effect = builtin("F-044");
    let source = SourceCard::new("F-044", ONE, Some(Slot::new(0)));
    let ctx = EffectContext::new(&registry, &game, &source);

    effect.apply(&mut state, &ctx, &[]).unwrap();
    assert_eq!(state.player(ONE).negative_energy().len(), 2);

    let first = Target::card(
        Location::NegativeEnergy { player: ONE, index: 0 },
        CardNo::new("F-011"),
    );
    effect.apply(&mut state, &ctx, &[first]).unwrap();
    assert_eq!(state.player(ONE).negative_energy().len(), 1);
    assert_eq!(state.player(ONE).trash().len(), 1);
}

#[test]
fn test_energy_returns_to_hand() {
    let registry = registry();
    let game = Match::new();
    let mut state = board(&registry, &[], &[]);
    state.charge_energy(ONE, &registry).unwrap();
    let effect = builtin("F-067");
    let source = SourceCard::new("F-067", ONE, None);
    let ctx = EffectContext::new(&registry, &game, &source);

    let candidates = effect.candidate_targets(&state, &ctx);
    assert_eq!(candidates.len(), 1);
    effect.apply(&mut state, &ctx, &candidates).unwrap();

    assert!(state.player(ONE).energy().is_empty());
    assert_eq!(state.player(ONE).hand().len(), 1);
}

#[test]
fn test_field_destruction_targets_opponent() {
    let registry = registry();
    let game = Match::new();
    let mut state = board(&registry, &["F-098"], &["F-097"]);
    let effect = builtin("F-068");
    let source = SourceCard::new("F-068", ONE, None);
    let ctx = EffectContext::new(&registry, &game, &source);

    let candidates = effect.candidate_targets(&state, &ctx);
    assert_eq!(candidates, vec![Target::field(TWO, CardNo::new("F-097"))]);
    effect.apply(&mut state, &ctx, &candidates).unwrap();

    assert!(state.player(TWO).field().is_none());
    assert_eq!(state.player(ONE).field(), Some(&CardNo::new("F-098")));
}

#[test]
fn test_composite_draws_without_destroy_condition() {
    let registry = registry();
    let game = Match::new();
    let mut state = board(&registry, &[], &["F-011"]);
    let effect = builtin("F-066");
    let source = SourceCard::new("F-066", ONE, None);
    let ctx = EffectContext::new(&registry, &game, &source);

    assert!(effect.candidate_targets(&state, &ctx).is_empty());
    effect.apply(&mut state, &ctx, &[]).unwrap();

    assert_eq!(state.player(ONE).hand().len(), 2);
    assert_eq!(state.player(TWO).battle().len(), 1);
}
