//! Authoritative game state: both players' zones.
//!
//! ## PlayerState
//!
//! Per-player zones. Ordered zones use `im::Vector` so a snapshot of the
//! whole state is an O(1) clone, which is what match actions rely on to
//! roll back after a failed resolution.
//!
//! ## GameState
//!
//! Exactly two `PlayerState`s. Everything outside this crate reads it
//! through accessors; changes go through
//! [`GameMutations`](crate::mutations::GameMutations).

use std::collections::BTreeMap;

use im::Vector;
use serde::{Deserialize, Serialize};

use super::player::{PlayerId, PlayerMap};
use crate::cards::{CardNo, EnergyCardInstance, NegativeEnergyCard};
use crate::error::Result;
use crate::triggers::GameEvent;
use crate::zones::BattleArea;

/// One player's zones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Index 0 is the top card.
    pub(crate) deck: Vector<CardNo>,
    pub(crate) hand: Vector<CardNo>,
    pub(crate) battle: BattleArea,
    pub(crate) energy: Vector<EnergyCardInstance>,
    pub(crate) negative_energy: Vector<NegativeEnergyCard>,
    pub(crate) trash: Vector<CardNo>,
    pub(crate) field: Option<CardNo>,
}

impl PlayerState {
    /// A player whose whole pool starts in the deck, in the given order.
    pub fn new(deck: impl IntoIterator<Item = CardNo>, battle_slots: u8) -> Self {
        Self {
            deck: deck.into_iter().collect(),
            hand: Vector::new(),
            battle: BattleArea::new(battle_slots),
            energy: Vector::new(),
            negative_energy: Vector::new(),
            trash: Vector::new(),
            field: None,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &Vector<CardNo> {
        &self.deck
    }

    #[must_use]
    pub fn hand(&self) -> &Vector<CardNo> {
        &self.hand
    }

    #[must_use]
    pub fn battle(&self) -> &BattleArea {
        &self.battle
    }

    #[must_use]
    pub fn energy(&self) -> &Vector<EnergyCardInstance> {
        &self.energy
    }

    #[must_use]
    pub fn negative_energy(&self) -> &Vector<NegativeEnergyCard> {
        &self.negative_energy
    }

    #[must_use]
    pub fn trash(&self) -> &Vector<CardNo> {
        &self.trash
    }

    #[must_use]
    pub fn field(&self) -> Option<&CardNo> {
        self.field.as_ref()
    }

    #[must_use]
    pub fn hand_contains(&self, card_no: &CardNo) -> bool {
        self.hand.iter().any(|c| c == card_no)
    }

    #[must_use]
    pub fn face_down_count(&self) -> usize {
        self.negative_energy.iter().filter(|n| !n.face_up).count()
    }

    #[must_use]
    pub fn face_up_count(&self) -> usize {
        self.negative_energy.iter().filter(|n| n.face_up).count()
    }

    /// Count of every card number across all zones.
    ///
    /// The census never changes while a match runs: cards only move between
    /// zones.
    #[must_use]
    pub fn census(&self) -> BTreeMap<CardNo, usize> {
        let mut counts = BTreeMap::new();
        let mut add = |no: &CardNo| *counts.entry(no.clone()).or_insert(0) += 1;

        self.deck.iter().for_each(&mut add);
        self.hand.iter().for_each(&mut add);
        self.trash.iter().for_each(&mut add);
        self.battle.iter().for_each(|(_, f)| add(&f.card_no));
        self.energy.iter().for_each(|e| add(&e.card_no));
        self.negative_energy.iter().for_each(|n| add(&n.card_no));
        if let Some(field) = &self.field {
            add(field);
        }
        counts
    }

    pub(crate) fn take_from_hand(&mut self, card_no: &CardNo) -> Option<CardNo> {
        let index = self.hand.iter().position(|c| c == card_no)?;
        Some(self.hand.remove(index))
    }

    pub(crate) fn take_from_trash(&mut self, card_no: &CardNo) -> Option<CardNo> {
        let index = self.trash.iter().position(|c| c == card_no)?;
        Some(self.trash.remove(index))
    }
}

/// Both players' zones plus the outbox of events raised by mutations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub(crate) players: PlayerMap<PlayerState>,
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Create a state with both pools in their decks, top card first.
    pub fn new(
        deck_one: impl IntoIterator<Item = CardNo>,
        deck_two: impl IntoIterator<Item = CardNo>,
        battle_slots: u8,
    ) -> Self {
        let mut decks = [Some(deck_one.into_iter().collect::<Vec<_>>()), Some(deck_two.into_iter().collect())];
        Self {
            players: PlayerMap::new(|p| {
                PlayerState::new(decks[p.index()].take().unwrap_or_default(), battle_slots)
            }),
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    #[must_use]
    pub fn census(&self, player: PlayerId) -> BTreeMap<CardNo, usize> {
        self.players[player].census()
    }

    /// Events raised by mutations and not yet routed.
    #[must_use]
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a state written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(prefix: &str, n: usize) -> Vec<CardNo> {
        (0..n).map(|i| CardNo::new(format!("{prefix}-{i:03}"))).collect()
    }

    #[test]
    fn test_new_state_puts_everything_in_deck() {
        let state = GameState::new(deck("A", 10), deck("B", 8), 5);
        assert_eq!(state.player(PlayerId::ONE).deck().len(), 10);
        assert_eq!(state.player(PlayerId::TWO).deck().len(), 8);
        assert!(state.player(PlayerId::ONE).hand().is_empty());
        assert_eq!(state.player(PlayerId::ONE).battle().capacity(), 5);
    }

    #[test]
    fn test_census_counts_duplicates() {
        let cards = vec![CardNo::new("F-006"), CardNo::new("F-006"), CardNo::new("F-011")];
        let state = GameState::new(cards, Vec::new(), 5);
        let census = state.census(PlayerId::ONE);
        assert_eq!(census[&CardNo::new("F-006")], 2);
        assert_eq!(census[&CardNo::new("F-011")], 1);
    }

    #[test]
    fn test_bincode_round_trip() {
        let state = GameState::new(deck("A", 5), deck("B", 5), 3);
        let bytes = state.to_bytes().unwrap();
        let back = GameState::from_bytes(&bytes).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let err = GameState::from_bytes(&[0xff, 0x01]).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Serialization(_)));
    }
}
