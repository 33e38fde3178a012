//! Built-in card effects.
//!
//! One entry per implemented card. Cards with a promotional printing are
//! registered under both numbers.

use super::catalog::EffectCatalog;
use super::effect::{Effect, EffectKind, Keyword, PowerAmount, PowerDuration, PowerScope, RestTarget, Side};
use crate::cards::{CardNo, CardType, Color};
use crate::core::Phase;
use crate::triggers::{Condition, Trigger};

impl EffectCatalog {
    /// The catalog of every built-in card effect.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        register_friends(&mut catalog);
        register_supports(&mut catalog);
        register_fields(&mut catalog);
        catalog
    }
}

fn turn_boost(scope: PowerScope, amount: i32) -> EffectKind {
    EffectKind::PowerModifier {
        scope,
        amount: PowerAmount::Fixed(amount),
        duration: PowerDuration::Turn,
    }
}

fn destroy(max_power: u32) -> EffectKind {
    EffectKind::DestroyFriend {
        max_power,
        mandatory: true,
    }
}

fn register_friends(catalog: &mut EffectCatalog) {
    catalog.register(
        "F-002",
        Effect::new(Trigger::Main, turn_boost(PowerScope::SourceFriend, 1000))
            .with_text("[Main] This friend gets +1000 power this turn."),
    );
    catalog.register(
        "F-003",
        Effect::new(
            Trigger::Persistent,
            EffectKind::HandSizePowerBoost {
                cards_per_step: 2,
                amount: 1000,
            },
        )
        .with_text("This friend gets +1000 power for every 2 cards in your hand."),
    );
    catalog.register(
        "F-004",
        Effect::new(Trigger::Persistent, EffectKind::Keyword(Keyword::Haste))
            .with_text("This friend can attack the turn it is played."),
    );
    for card in ["F-006", "F-011"] {
        catalog.register_with_promo(
            card,
            Effect::new(Trigger::OnAttack, EffectKind::Draw { count: 1 })
                .with_text("When this friend attacks, draw 1 card."),
        );
    }
    catalog.register_with_promo(
        "F-008",
        Effect::new(Trigger::OnAttack, destroy(3000))
            .with_text("When this friend attacks, destroy 1 of your opponent's friends with 3000 power or less."),
    );
    catalog.register_with_promo(
        "F-013",
        Effect::new(Trigger::OnBlock, EffectKind::RevealNegativeEnergy { count: 1 })
            .with_text("When this friend blocks, reveal 1 card in your negative energy area."),
    );
    catalog.register_with_promo(
        "F-015",
        Effect::new(Trigger::Persistent, EffectKind::Keyword(Keyword::Haste))
            .with_text("This friend can attack the turn it is played."),
    );
    catalog.register_with_promo(
        "F-016",
        Effect::new(Trigger::Persistent, EffectKind::Keyword(Keyword::ExtraDamage(1)))
            .when(Condition::FaceUpNegativeEnergyAtLeast(3))
            .with_text("While you have 3 or more revealed negative energy, this friend deals +1 damage."),
    );
    catalog.register_with_promo(
        "F-020",
        Effect::new(Trigger::OnAttack, EffectKind::RevealTopPlace)
            .with_text("When this friend attacks, reveal the top card of your deck and put it on the top or bottom."),
    );
    catalog.register_with_promo(
        "F-022",
        Effect::new(Trigger::OnAttack, EffectKind::DiscardDeckTop { count: 1 })
            .with_text("When this friend attacks, discard the top card of your deck."),
    );
    catalog.register_with_promo(
        "F-023",
        Effect::new(
            Trigger::OnPlay,
            EffectKind::ReturnToHand {
                side: Side::Opponent,
                max_cost: None,
                max_power: None,
                mandatory: true,
            },
        )
        .with_text("When this friend enters play, return 1 of your opponent's friends to hand."),
    );
    catalog.register_with_promo(
        "F-025",
        Effect::new(
            Trigger::OnPlay,
            EffectKind::ReturnFromTrash {
                card_type: CardType::Support,
                max_cost: 3,
            },
        )
        .with_text("When played, return a support card with cost 3 or less from your trash to hand."),
    );
    catalog.register_with_promo(
        "F-034",
        Effect::new(
            Trigger::OnBlock,
            EffectKind::SetRested {
                target: RestTarget::SourceFriend,
                rested: false,
                optional: false,
            },
        )
        .with_text("When this friend blocks, activate it."),
    );
    catalog.register_with_promo(
        "F-041",
        Effect::new(Trigger::OnPlay, EffectKind::PlaceFieldFromHand { max_cost: 2 })
            .with_text("When played, you may put a field card with cost 2 or less from your hand into play."),
    );
    catalog.register_with_promo(
        "F-042",
        Effect::new(Trigger::OnPlay, EffectKind::TrashToDeck { count: 3 }).with_text(
            "When this friend is played, you may put up to 3 cards from your trash on the top or bottom of your deck.",
        ),
    );
    catalog.register_with_promo(
        "F-044",
        Effect::new(
            Trigger::OnAttack,
            EffectKind::DiscardNegativeEnergy {
                count: 1,
                optional: true,
            },
        )
        .with_text("When this friend attacks, you may discard 1 card from your negative energy area."),
    );
    catalog.register_with_promo(
        "F-055",
        Effect::new(
            Trigger::OnAttack,
            EffectKind::SetRested {
                target: RestTarget::OpponentFriend,
                rested: true,
                optional: false,
            },
        )
        .with_text("When this friend attacks, rest 1 of your opponent's friends."),
    );
    catalog.register_with_promo(
        "F-056",
        Effect::new(Trigger::Persistent, EffectKind::Keyword(Keyword::BlockWhileRested))
            .with_text("This friend can block while rested."),
    );
    catalog.register(
        "F-102",
        Effect::new(Trigger::OnAttack, EffectKind::ConcealToActivate { count: 2 }).with_text(
            "When this friend attacks, you may turn 2 face-up cards in your negative energy area face-down. If you do, activate this friend.",
        ),
    );
}

fn register_supports(catalog: &mut EffectCatalog) {
    catalog.register(
        "F-065",
        Effect::new(Trigger::Main, turn_boost(PowerScope::ChosenOwnFriend, 2000))
            .with_counter()
            .with_text("[Main/Counter] 1 of your friends gets +2000 power this turn."),
    );
    catalog.register_with_promo(
        "F-066",
        Effect::new(
            Trigger::Main,
            EffectKind::Composite(vec![
                Effect::new(Trigger::Main, EffectKind::Draw { count: 2 }),
                Effect::new(
                    Trigger::Main,
                    EffectKind::ConditionalDestroy {
                        condition: Condition::controls("F-016"),
                        max_power: 3000,
                    },
                ),
            ]),
        )
        .with_text("Draw 2 cards. Then, if you control F-016, destroy 1 opponent's friend with 3000 power or less."),
    );
    catalog.register_with_promo(
        "F-067",
        Effect::new(Trigger::Main, EffectKind::ReturnEnergyToHand)
            .with_counter()
            .with_text("[Main/Counter] Return 1 card from your energy area to hand."),
    );
    catalog.register_with_promo(
        "F-068",
        Effect::new(Trigger::Main, EffectKind::DestroyFieldCard)
            .with_counter()
            .with_text("[Main/Counter] Destroy 1 field card."),
    );
    catalog.register_with_promo(
        "F-069",
        Effect::new(Trigger::Main, destroy(5000))
            .with_counter()
            .with_text("[Main/Counter] Destroy 1 of your opponent's friends with 5000 power or less."),
    );
    catalog.register_with_promo(
        "F-070",
        Effect::new(Trigger::Main, destroy(10000))
            .with_text("[Main] Destroy 1 of your opponent's friends with 10000 power or less."),
    );
    catalog.register(
        "F-071",
        Effect::new(Trigger::Main, EffectKind::ReviveFriend)
            .with_counter()
            .with_text("[Main/Counter] Play 1 friend from your trash rested. Destroy it at the end of the turn."),
    );
    catalog.register(
        "F-072",
        Effect::new(
            Trigger::Main,
            EffectKind::Composite(vec![
                Effect::new(Trigger::Main, EffectKind::LookAtTop { count: 3, keep: 1 }),
                Effect::new(
                    Trigger::Main,
                    EffectKind::MayReturnOwnFriend {
                        card: CardNo::new("F-023"),
                    },
                ),
            ]),
        )
        .with_counter()
        .with_text(
            "[Main/Counter] Look at the top 3 cards of your deck. Add 1 to your hand and discard the rest. \
             Then you may return your F-023 to hand.",
        ),
    );
    catalog.register(
        "F-073",
        Effect::new(
            Trigger::Main,
            EffectKind::ReturnToHand {
                side: Side::Any,
                max_cost: None,
                max_power: None,
                mandatory: true,
            },
        )
        .with_counter()
        .with_text("[Main/Counter] Return 1 friend to its owner's hand."),
    );
    catalog.register_with_promo(
        "F-080",
        Effect::new(Trigger::Main, EffectKind::HandReset { size: 4 })
            .with_text("[Main] Each player discards down to 4 cards, then draws up to 4 cards."),
    );
}

fn register_fields(catalog: &mut EffectCatalog) {
    catalog.register(
        "F-089",
        Effect::new(
            Trigger::Persistent,
            EffectKind::PowerModifier {
                scope: PowerScope::AllOwnFriends,
                amount: PowerAmount::Fixed(2000),
                duration: PowerDuration::Continuous,
            },
        )
        .when(Condition::all([Condition::OwnTurn, Condition::MoreCardsInHandThanOpponent]))
        .with_text("During your turn, while you have more cards in hand than your opponent, your friends get +2000 power."),
    );
    catalog.register(
        "F-090",
        Effect::new(Trigger::PhaseStart, EffectKind::RevealNegativeEnergy { count: 1 })
            .when(Condition::all([Condition::OwnTurn, Condition::InPhase(Phase::Energy)]))
            .with_text("At the start of your energy phase, reveal 1 card in your negative energy area."),
    );
    catalog.register(
        "F-091",
        Effect::new(
            Trigger::PhaseEnd,
            EffectKind::SetRested {
                target: RestTarget::OwnFriend,
                rested: false,
                optional: true,
            },
        )
        .when(Condition::all([Condition::OwnTurn, Condition::InPhase(Phase::End)]))
        .with_text("At the end of your turn, you may activate 1 of your friends."),
    );
    catalog.register(
        "F-092",
        Effect::new(Trigger::PhaseStart, EffectKind::RevealTopPlace)
            .when(Condition::all([Condition::OwnTurn, Condition::InPhase(Phase::Draw)]))
            .with_text("At the start of your draw phase, reveal the top card of your deck and put it on the top or bottom."),
    );
    catalog.register(
        "F-093",
        Effect::new(
            Trigger::PhaseStart,
            EffectKind::SetRested {
                target: RestTarget::OwnEnergy,
                rested: false,
                optional: true,
            },
        )
        .when(Condition::all([Condition::OpponentTurn, Condition::InPhase(Phase::Start)]))
        .with_text("At the start of your opponent's start phase, you may activate 1 card in your energy area."),
    );
    catalog.register(
        "F-094",
        Effect::new(Trigger::Persistent, EffectKind::SupportsFromNegativeEnergy).with_text(
            "You may play supports from your negative energy area. Put each one on the bottom of your deck, then take 1 damage.",
        ),
    );
    catalog.register(
        "F-095",
        Effect::new(
            Trigger::Persistent,
            EffectKind::CostReduction {
                card_type: CardType::Friend,
                amount: 1,
                minimum: 1,
            },
        )
        .with_text("Friends in your hand cost 1 less to play, to a minimum of 1."),
    );
    catalog.register(
        "F-096",
        Effect::new(Trigger::Persistent, EffectKind::EnterRested { costs: vec![2, 4, 6] })
            .with_text("Friends with cost 2, 4, or 6 enter play rested."),
    );
    catalog.register(
        "F-097",
        Effect::new(Trigger::Persistent, EffectKind::FieldCountPowerBoost { amount: 1000 })
            .when(Condition::OwnTurn)
            .with_text("During your turn, your friends get +1000 power for each other field card in play."),
    );
    catalog.register(
        "F-098",
        Effect::new(Trigger::OnDamageDealt, EffectKind::OnDamageDraw { count: 1 })
            .when(Condition::EventByController)
            .with_text("When one of your friends deals damage, draw 1 card."),
    );
    catalog.register(
        "F-099",
        Effect::new(
            Trigger::Persistent,
            EffectKind::PowerModifier {
                scope: PowerScope::OwnFriendsOfColor(Color::Green),
                amount: PowerAmount::PerFaceDownNegativeEnergy(1000),
                duration: PowerDuration::Continuous,
            },
        )
        .when(Condition::OwnTurn)
        .with_text("During your turn, your green friends get +1000 power for each face-down card in your negative energy area."),
    );
}
