//! Turn structure tests: the phase cycle and the automatic phase actions.

use std::sync::Arc;

use proptest::prelude::*;

use mememe_engine::cards::{CardAttributes, CardNo, CardRegistry, Color};
use mememe_engine::core::{AttackTarget, EngineConfig, Match, MatchStatus, Phase, PlayerId};
use mememe_engine::effects::EffectCatalog;
use mememe_engine::rules::{MatchEngine, MatchSession, TurnController};
use mememe_engine::stack::{ChoiceKind, ResolutionStatus, Selection};
use mememe_engine::zones::Slot;

const ONE: PlayerId = PlayerId::ONE;
const TWO: PlayerId = PlayerId::TWO;

fn engine(config: EngineConfig) -> MatchEngine {
    let registry: CardRegistry = [
        CardAttributes::friend("F-002", "Stretcher", Color::Green, 1, 2000),
        CardAttributes::friend("F-006", "Hiyakeratopus", Color::Red, 2, 3000),
        CardAttributes::friend("F-011", "Pochi", Color::Blue, 1, 1000),
        CardAttributes::friend("F-015", "Dasher", Color::Blue, 1, 2000),
        CardAttributes::field("F-092", "Lookout", Color::Yellow, 1),
    ]
    .into_iter()
    .collect();
    MatchEngine::new(
        Arc::new(registry),
        Arc::new(EffectCatalog::builtin()),
        config.with_shuffle(false),
    )
    .unwrap()
}

fn cards(list: &[&str]) -> Vec<CardNo> {
    list.iter().map(|c| CardNo::new(*c)).collect()
}

fn start(engine: &MatchEngine, one: Vec<CardNo>, two: Vec<CardNo>) -> MatchSession {
    let mut session = engine.create_match("m-1", [one, two]).unwrap();
    engine.start_match(&mut session, 3).unwrap();
    session
}

fn pochis(n: usize) -> Vec<CardNo> {
    vec![CardNo::new("F-011"); n]
}

fn advance(engine: &MatchEngine, session: &mut MatchSession) {
    let active = session.game().active_player();
    assert_eq!(engine.advance_phase(session, active).unwrap(), ResolutionStatus::Complete);
}

/// Advance until `player`'s next main phase.
fn main_phase(engine: &MatchEngine, session: &mut MatchSession, player: PlayerId) {
    loop {
        advance(engine, session);
        if session.game().phase() == Phase::Main && session.game().active_player() == player {
            break;
        }
    }
}

// =============================================================================
// Phase Cycle
// =============================================================================

proptest! {
    #[test]
    fn prop_phase_cycle(n in 0usize..200) {
        let mut game = Match::new();
        for _ in 0..n {
            TurnController::advance(&mut game);
        }

        prop_assert_eq!(game.phase(), Phase::CYCLE[n % 5]);
        prop_assert_eq!(game.turn() as usize, 1 + n / 5);
        let expected = if (n / 5) % 2 == 0 { ONE } else { TWO };
        prop_assert_eq!(game.active_player(), expected);
    }

    #[test]
    fn prop_wrap_only_after_end(n in 1usize..60) {
        let mut game = Match::new();
        let mut wraps = 0;
        for _ in 0..n {
            let from = game.phase();
            let transition = TurnController::advance(&mut game);
            prop_assert_eq!(transition.wrapped, from == Phase::End);
            if transition.wrapped {
                wraps += 1;
            }
        }
        prop_assert_eq!(wraps, n / 5);
    }
}

#[test]
fn test_only_active_player_advances() {
    let engine = engine(EngineConfig::new());
    let mut session = start(&engine, pochis(15), pochis(15));

    assert!(engine.advance_phase(&mut session, TWO).is_err());
    assert_eq!(session.game().phase(), Phase::Start);
}

// =============================================================================
// Phase Actions
// =============================================================================

#[test]
fn test_first_turn_skips_draw() {
    let engine = engine(EngineConfig::new());
    let mut session = start(&engine, pochis(15), pochis(15));
    main_phase(&engine, &mut session, ONE);

    let me = session.state().player(ONE);
    assert_eq!(me.hand().len(), 5);
    assert_eq!(me.energy().len(), 1);
    assert_eq!(me.deck().len(), 9);
}

#[test]
fn test_second_player_draws_and_charges() {
    let engine = engine(EngineConfig::new());
    let mut session = start(&engine, pochis(15), pochis(15));
    main_phase(&engine, &mut session, TWO);

    assert_eq!(session.game().turn(), 2);
    let them = session.state().player(TWO);
    assert_eq!(them.hand().len(), 6);
    assert_eq!(them.energy().len(), 1);
    assert_eq!(them.deck().len(), 8);
}

#[test]
fn test_start_phase_readies_everything() {
    let engine = engine(EngineConfig::new());
    let mut deck = cards(&["F-015"]);
    deck.extend(pochis(14));
    let mut session = start(&engine, deck, pochis(15));
    main_phase(&engine, &mut session, ONE);

    engine
        .play_card(&mut session, ONE, &CardNo::new("F-015"), None, Vec::new())
        .unwrap();
    engine
        .attack(&mut session, ONE, Slot::new(0), AttackTarget::Player)
        .unwrap();
    engine.decline_block(&mut session, TWO).unwrap();
    assert!(session.state().player(ONE).battle().get(Slot::new(0)).unwrap().rested);
    assert!(session.state().player(ONE).energy()[0].rested);

    main_phase(&engine, &mut session, ONE);
    let me = session.state().player(ONE);
    assert!(!me.battle().get(Slot::new(0)).unwrap().rested);
    assert_eq!(me.energy().len(), 2);
    assert!(me.energy().iter().all(|e| !e.rested));
}

#[test]
fn test_turn_modifiers_expire_at_wrap() {
    let engine = engine(EngineConfig::new().with_costs(false));
    let mut deck = cards(&["F-002"]);
    deck.extend(pochis(14));
    let mut session = start(&engine, deck, pochis(15));
    main_phase(&engine, &mut session, ONE);

    engine
        .play_card(&mut session, ONE, &CardNo::new("F-002"), None, Vec::new())
        .unwrap();
    engine.activate_ability(&mut session, ONE, Slot::new(0), Vec::new()).unwrap();
    let power = |s: &MatchSession| s.state().player(ONE).battle().get(Slot::new(0)).unwrap().power();
    assert_eq!(power(&session), 3000);

    advance(&engine, &mut session);
    assert_eq!(session.game().phase(), Phase::End);
    assert_eq!(power(&session), 3000);

    advance(&engine, &mut session);
    assert_eq!(session.game().active_player(), TWO);
    assert_eq!(power(&session), 2000);
}

#[test]
fn test_deck_out_on_draw_loses() {
    let engine = engine(EngineConfig::new().with_costs(false));
    let mut session = start(&engine, pochis(15), pochis(5));

    for _ in 0..6 {
        advance(&engine, &mut session);
    }

    assert_eq!(session.game().turn(), 2);
    assert_eq!(session.game().status(), MatchStatus::Finished);
    assert_eq!(session.game().winner(), Some(ONE));
}

#[test]
fn test_phase_actions_can_be_disabled() {
    let engine = engine(EngineConfig::new().with_phase_actions(false));
    let mut session = start(&engine, pochis(15), pochis(15));
    main_phase(&engine, &mut session, TWO);

    let them = session.state().player(TWO);
    assert_eq!(them.hand().len(), 5);
    assert!(them.energy().is_empty());
}

// =============================================================================
// Phase Triggers
// =============================================================================

/// A draw-phase reveal suspends the phase; the draw happens once the
/// player has chosen where the revealed card goes.
#[test]
fn test_draw_phase_waits_for_reveal() {
    let engine = engine(EngineConfig::new().with_costs(false));
    let mut deck = cards(&["F-092"]);
    deck.extend(pochis(5));
    deck.extend(cards(&["F-006", "F-015"]));
    deck.extend(pochis(4));
    let mut session = start(&engine, deck, pochis(15));

    main_phase(&engine, &mut session, ONE);
    engine
        .play_card(&mut session, ONE, &CardNo::new("F-092"), None, Vec::new())
        .unwrap();
    main_phase(&engine, &mut session, TWO);
    for _ in 0..2 {
        advance(&engine, &mut session);
    }
    assert_eq!(session.game().phase(), Phase::Start);
    assert_eq!(session.game().active_player(), ONE);

    let status = engine.advance_phase(&mut session, ONE).unwrap();
    let ResolutionStatus::AwaitingChoice(id) = status else {
        panic!("the reveal should ask where the card goes");
    };
    assert!(matches!(session.pending_choice().unwrap().kind, ChoiceKind::Option { .. }));
    assert_eq!(session.state().player(ONE).hand().len(), 4);

    let status = engine
        .submit_choice(&mut session, ONE, id, Selection::Option(1))
        .unwrap();
    assert_eq!(status, ResolutionStatus::Complete);

    let me = session.state().player(ONE);
    assert_eq!(session.game().phase(), Phase::Draw);
    assert_eq!(me.hand().len(), 5);
    assert!(me.hand().contains(&CardNo::new("F-015")));
    assert_eq!(me.deck().back(), Some(&CardNo::new("F-006")));
}
