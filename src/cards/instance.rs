//! Card instances: runtime state of cards in play.
//!
//! A `FriendInstance` exists only while its card occupies a battle-area
//! slot. Its current power is the base power plus every live modifier,
//! never below zero.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{CardNo, Color};
use crate::core::PlayerId;
use crate::zones::Slot;

/// Identifies the in-play card a continuous modifier comes from.
///
/// `slot` is `None` for a field card.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceKey {
    pub player: PlayerId,
    pub slot: Option<Slot>,
    pub card: CardNo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierDuration {
    /// Removed when the turn ends.
    UntilEndOfTurn,
    /// Owned by a persistent effect; rebuilt on every normalization pass.
    Continuous,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerModifier {
    pub source: SourceKey,
    pub amount: i32,
    pub duration: ModifierDuration,
}

/// A friend on the battle area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInstance {
    pub card_no: CardNo,
    pub printed_power: u32,
    /// Printed power after permanent changes, floored at zero.
    base_power: u32,
    modifiers: SmallVec<[PowerModifier; 2]>,
    pub rested: bool,
    pub turn_played: u32,
    /// Destroyed when the current turn reaches its End phase.
    #[serde(default)]
    pub leaves_at_end: bool,
}

impl FriendInstance {
    #[must_use]
    pub fn new(card_no: CardNo, power: u32, turn_played: u32) -> Self {
        Self {
            card_no,
            printed_power: power,
            base_power: power,
            modifiers: SmallVec::new(),
            rested: false,
            turn_played,
            leaves_at_end: false,
        }
    }

    #[must_use]
    pub fn rested(mut self) -> Self {
        self.rested = true;
        self
    }

    /// Current power: base plus all modifiers, floored at zero.
    #[must_use]
    pub fn power(&self) -> u32 {
        let total = i64::from(self.base_power)
            + self.modifiers.iter().map(|m| i64::from(m.amount)).sum::<i64>();
        u32::try_from(total.max(0)).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn base_power(&self) -> u32 {
        self.base_power
    }

    #[must_use]
    pub fn modifiers(&self) -> &[PowerModifier] {
        &self.modifiers
    }

    /// Permanently change base power. The result never goes below zero.
    pub fn adjust_base(&mut self, delta: i32) {
        let adjusted = (i64::from(self.base_power) + i64::from(delta)).max(0);
        self.base_power = u32::try_from(adjusted).unwrap_or(u32::MAX);
    }

    pub fn add_modifier(&mut self, modifier: PowerModifier) {
        self.modifiers.push(modifier);
    }

    /// Set the continuous modifier owned by `source`, replacing any
    /// previous value. An amount of zero removes it.
    pub fn set_continuous(&mut self, source: &SourceKey, amount: i32) {
        self.modifiers
            .retain(|m| !(m.duration == ModifierDuration::Continuous && &m.source == source));
        if amount != 0 {
            self.modifiers.push(PowerModifier {
                source: source.clone(),
                amount,
                duration: ModifierDuration::Continuous,
            });
        }
    }

    pub fn clear_continuous(&mut self) {
        self.modifiers.retain(|m| m.duration != ModifierDuration::Continuous);
    }

    pub fn expire_turn_modifiers(&mut self) {
        self.modifiers.retain(|m| m.duration != ModifierDuration::UntilEndOfTurn);
    }
}

/// A card in the energy area.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCardInstance {
    pub card_no: CardNo,
    pub color: Color,
    pub rested: bool,
}

impl EnergyCardInstance {
    #[must_use]
    pub fn new(card_no: CardNo, color: Color) -> Self {
        Self {
            card_no,
            color,
            rested: false,
        }
    }
}

/// A card in the negative-energy area. Entries arrive face-down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeEnergyCard {
    pub card_no: CardNo,
    pub face_up: bool,
}

impl NegativeEnergyCard {
    #[must_use]
    pub fn face_down(card_no: CardNo) -> Self {
        Self {
            card_no,
            face_up: false,
        }
    }
}
