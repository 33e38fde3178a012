//! The state mutation facade.
//!
//! [`GameMutations`] is the fixed set of operations effect code and match
//! actions may use to change a [`GameState`](crate::core::GameState). Each
//! operation validates everything it needs before touching the state, so a
//! failed call leaves the state exactly as it was.
//!
//! ## Draw policy
//!
//! Drawing is all-or-nothing: asking for more cards than the deck holds
//! fails with `DeckEmpty` and moves nothing. Damage and milling follow the
//! same rule.

mod game_state;

use serde::{Deserialize, Serialize};

use crate::cards::{CardCatalog, CardNo, SourceKey};
use crate::core::{Phase, PlayerId};
use crate::error::Result;
use crate::triggers::GameEvent;
use crate::zones::{DeckPosition, Slot};

/// How an operation picks a friend on the battle area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FriendRef {
    /// The lowest occupied slot holding this card number.
    Card(CardNo),
    /// An exact slot.
    Slot(Slot),
}

impl From<Slot> for FriendRef {
    fn from(slot: Slot) -> Self {
        FriendRef::Slot(slot)
    }
}

impl From<CardNo> for FriendRef {
    fn from(card: CardNo) -> Self {
        FriendRef::Card(card)
    }
}

impl From<&CardNo> for FriendRef {
    fn from(card: &CardNo) -> Self {
        FriendRef::Card(card.clone())
    }
}

impl From<&str> for FriendRef {
    fn from(card: &str) -> Self {
        FriendRef::Card(CardNo::new(card))
    }
}

impl std::fmt::Display for FriendRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FriendRef::Card(no) => write!(f, "{no}"),
            FriendRef::Slot(slot) => write!(f, "at {slot}"),
        }
    }
}

/// A pile cards are picked out of by card number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pile {
    Hand,
    Trash,
}

/// Atomic, validated state changes.
pub trait GameMutations {
    // === Deck and hand ===

    /// Move `count` cards from the deck top to the hand.
    fn draw(&mut self, player: PlayerId, count: usize) -> Result<()>;

    /// Move `count` cards from the deck top to the trash.
    fn mill(&mut self, player: PlayerId, count: usize) -> Result<Vec<CardNo>>;

    /// Move a card from hand or trash into the deck.
    fn move_card_to_deck(&mut self, player: PlayerId, card_no: &CardNo, from: Pile, position: DeckPosition) -> Result<()>;

    /// Move the deck's top card to its bottom.
    fn deck_top_to_bottom(&mut self, player: PlayerId) -> Result<CardNo>;

    /// Look at the top `look` cards: those at `keep` depths go to hand,
    /// the rest go to the trash.
    fn keep_from_top(&mut self, player: PlayerId, look: usize, keep: &[usize]) -> Result<()>;

    fn discard_from_hand(&mut self, player: PlayerId, card_no: &CardNo) -> Result<()>;

    fn return_from_trash(&mut self, player: PlayerId, card_no: &CardNo) -> Result<()>;

    // === Battle area ===

    /// Move a friend from hand onto an empty slot.
    fn play_friend(
        &mut self,
        player: PlayerId,
        card_no: &CardNo,
        slot: Slot,
        power: u32,
        turn: u32,
        rested: bool,
    ) -> Result<()>;

    /// Move a friend from the trash onto an empty slot, rested. It is
    /// destroyed when the turn reaches its End phase.
    fn revive_friend(&mut self, player: PlayerId, card_no: &CardNo, slot: Slot, power: u32, turn: u32) -> Result<()>;

    /// Destroy every friend marked to leave at end of turn, on both sides.
    fn destroy_leaving_friends(&mut self) -> Vec<(PlayerId, CardNo)>;

    /// Move a friend to the trash. Raises `FriendDestroyed`.
    fn destroy_friend(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<CardNo>;

    fn return_to_hand(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<CardNo>;

    fn rest(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<()>;

    fn activate(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<()>;

    /// Permanently change a friend's power, floored at zero. Returns the
    /// new current power.
    fn modify_power(&mut self, player: PlayerId, friend: impl Into<FriendRef>, delta: i32) -> Result<u32>;

    /// Add a modifier that expires at end of turn.
    fn boost_power(
        &mut self,
        player: PlayerId,
        friend: impl Into<FriendRef>,
        amount: i32,
        source: SourceKey,
    ) -> Result<()>;

    /// Set the continuous modifier `source` applies to a friend.
    fn set_continuous_power(&mut self, player: PlayerId, slot: Slot, source: &SourceKey, amount: i32) -> Result<()>;

    fn clear_continuous_modifiers(&mut self);

    fn expire_turn_modifiers(&mut self);

    /// Activate every friend and energy card the player has.
    fn ready_all(&mut self, player: PlayerId);

    // === Energy ===

    /// Move the deck's top card into the energy area.
    fn charge_energy(&mut self, player: PlayerId, catalog: &dyn CardCatalog) -> Result<CardNo>;

    fn set_energy_rested(&mut self, player: PlayerId, index: usize, rested: bool) -> Result<()>;

    /// Rest several energy cards at once.
    fn rest_energy(&mut self, player: PlayerId, indices: &[usize]) -> Result<()>;

    fn return_energy_to_hand(&mut self, player: PlayerId, index: usize) -> Result<CardNo>;

    // === Negative energy ===

    /// Move `amount` cards from the deck top into negative energy, face-down.
    fn take_damage(&mut self, player: PlayerId, amount: usize) -> Result<()>;

    /// Flip `count` face-down entries face-up, oldest first.
    fn reveal_negative_energy(&mut self, player: PlayerId, count: usize) -> Result<()>;

    /// Flip a face-up entry face-down.
    fn conceal_negative_energy(&mut self, player: PlayerId, index: usize) -> Result<()>;

    fn trash_negative_energy(&mut self, player: PlayerId, index: usize) -> Result<CardNo>;

    fn negative_energy_to_deck(&mut self, player: PlayerId, index: usize, position: DeckPosition) -> Result<CardNo>;

    // === Field ===

    /// Put a field card from hand into play. The previous field card, if
    /// any, goes to the trash first. Returns the replaced card.
    fn place_field_card(&mut self, player: PlayerId, card_no: &CardNo) -> Result<Option<CardNo>>;

    fn destroy_field_card(&mut self, player: PlayerId) -> Result<CardNo>;

    // === Events ===

    /// Drain the events raised by mutations, stamping them with `phase`.
    fn take_events(&mut self, phase: Phase) -> Vec<GameEvent>;
}
