//! Battle area arena.
//!
//! Friends live in a fixed number of slots. A slot index is stable for as
//! long as its friend stays in play, so effects address friends by slot and
//! mutate them in place.

use serde::{Deserialize, Serialize};

use super::Slot;
use crate::cards::{CardNo, FriendInstance};
use crate::error::{EngineError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleArea {
    slots: Vec<Option<FriendInstance>>,
}

impl BattleArea {
    #[must_use]
    pub fn new(capacity: u8) -> Self {
        Self {
            slots: vec![None; usize::from(capacity)],
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn get(&self, slot: Slot) -> Option<&FriendInstance> {
        self.slots.get(slot.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut FriendInstance> {
        self.slots.get_mut(slot.index()).and_then(Option::as_mut)
    }

    /// Put a friend into an empty slot.
    pub fn place(&mut self, slot: Slot, friend: FriendInstance) -> Result<()> {
        let entry = self
            .slots
            .get_mut(slot.index())
            .ok_or(EngineError::InvalidSlot(slot))?;
        if entry.is_some() {
            return Err(EngineError::SlotOccupied(slot));
        }
        *entry = Some(friend);
        Ok(())
    }

    /// Check that `slot` exists and is empty, without placing anything.
    pub fn check_free(&self, slot: Slot) -> Result<()> {
        match self.slots.get(slot.index()) {
            None => Err(EngineError::InvalidSlot(slot)),
            Some(Some(_)) => Err(EngineError::SlotOccupied(slot)),
            Some(None) => Ok(()),
        }
    }

    pub fn remove(&mut self, slot: Slot) -> Option<FriendInstance> {
        self.slots.get_mut(slot.index()).and_then(Option::take)
    }

    /// Lowest occupied slot holding `card_no`.
    #[must_use]
    pub fn find(&self, card_no: &CardNo) -> Option<Slot> {
        self.iter()
            .find(|(_, friend)| &friend.card_no == card_no)
            .map(|(slot, _)| slot)
    }

    #[must_use]
    pub fn first_free(&self) -> Option<Slot> {
        self.slots.iter().position(Option::is_none).map(Slot::from_index)
    }

    /// Occupied slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &FriendInstance)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|f| (Slot::from_index(i), f)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Slot, &mut FriendInstance)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|f| (Slot::from_index(i), f)))
    }
}
