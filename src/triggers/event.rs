//! Game events and the trigger taxonomy.
//!
//! Events are raised by match actions, the turn controller, and state
//! mutations (a destroyed friend raises `FriendDestroyed`). Each event kind
//! maps to at most one [`Trigger`]; effects bound to that trigger are the
//! candidates the router considers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::CardNo;
use crate::core::{Match, Phase, PlayerId};
use crate::zones::{Location, Slot};

/// The moment an effect fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trigger {
    OnPlay,
    OnAttack,
    OnBlock,
    OnDestroy,
    OnDamageDealt,
    /// Always on; recomputed after every event instead of fired.
    Persistent,
    PhaseStart,
    PhaseEnd,
    Main,
    Counter,
}

impl Trigger {
    /// Triggers that fire only for the card that caused the event.
    #[must_use]
    pub const fn is_self_referential(self) -> bool {
        matches!(
            self,
            Trigger::OnPlay
                | Trigger::OnAttack
                | Trigger::OnBlock
                | Trigger::OnDestroy
                | Trigger::Main
                | Trigger::Counter
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    FriendPlayed,
    SupportPlayed,
    FieldPlayed,
    /// A friend's activated ability was used.
    AbilityActivated,
    FriendAttacks,
    FriendBlocks,
    FriendDestroyed,
    DamageDealt,
    PhaseStart,
    PhaseEnd,
    TurnStart,
    TurnEnd,
}

impl EventKind {
    /// The trigger class this event fires.
    ///
    /// Supports and activated abilities fire `Main` when used in the acting
    /// player's own main phase and `Counter` at any other time, including a
    /// defender answering an attack during the opponent's main phase.
    #[must_use]
    pub const fn trigger(self, own_main: bool) -> Option<Trigger> {
        match self {
            EventKind::FriendPlayed => Some(Trigger::OnPlay),
            EventKind::FriendAttacks => Some(Trigger::OnAttack),
            EventKind::FriendBlocks => Some(Trigger::OnBlock),
            EventKind::FriendDestroyed => Some(Trigger::OnDestroy),
            EventKind::DamageDealt => Some(Trigger::OnDamageDealt),
            EventKind::PhaseStart => Some(Trigger::PhaseStart),
            EventKind::PhaseEnd => Some(Trigger::PhaseEnd),
            EventKind::SupportPlayed | EventKind::AbilityActivated => {
                if own_main {
                    Some(Trigger::Main)
                } else {
                    Some(Trigger::Counter)
                }
            }
            EventKind::FieldPlayed | EventKind::TurnStart | EventKind::TurnEnd => None,
        }
    }
}

/// Something that happened in a match.
///
/// ```
/// use mememe_engine::core::{Phase, PlayerId};
/// use mememe_engine::triggers::{EventKind, GameEvent};
/// use mememe_engine::zones::Slot;
///
/// let event = GameEvent::new(EventKind::FriendAttacks, PlayerId::ONE, Phase::Main)
///     .with_source("F-006")
///     .with_source_slot(Slot::new(0));
/// assert_eq!(event.source.as_ref().map(|c| c.as_str()), Some("F-006"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,
    /// The acting player.
    pub player: PlayerId,
    /// The card that caused the event.
    pub source: Option<CardNo>,
    /// Battle-area slot of the source, when it is (or was) a friend.
    pub source_slot: Option<Slot>,
    /// What the event was aimed at (attack target, blocked attacker).
    pub target: Option<Location>,
    pub phase: Phase,
    /// Free-form data, such as damage amounts.
    pub payload: BTreeMap<String, String>,
}

impl GameEvent {
    #[must_use]
    pub fn new(kind: EventKind, player: PlayerId, phase: Phase) -> Self {
        Self {
            kind,
            player,
            source: None,
            source_slot: None,
            target: None,
            phase,
            payload: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, card: impl Into<CardNo>) -> Self {
        self.source = Some(card.into());
        self
    }

    #[must_use]
    pub fn with_source_slot(mut self, slot: Slot) -> Self {
        self.source_slot = Some(slot);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Location) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.payload.insert(key.into(), value.to_string());
        self
    }

    #[must_use]
    pub fn data(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// Whether the acting player raised this event in their own main phase,
    /// outside any battle.
    #[must_use]
    pub fn in_own_main(&self, game: &Match) -> bool {
        self.phase == Phase::Main && game.is_active(self.player) && game.battle().is_none()
    }

    #[must_use]
    pub fn trigger(&self, game: &Match) -> Option<Trigger> {
        self.kind.trigger(self.in_own_main(game))
    }
}
