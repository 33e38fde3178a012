//! Zone addressing.
//!
//! ## Key Types
//!
//! - `Slot`: stable battle-area position
//! - `BattleArea`: slot-indexed arena of friends
//! - `DeckPosition`: where a card re-enters the deck
//! - `Location`: a zone (plus position where it matters) owned by a player

pub mod battle;

pub use battle::BattleArea;

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// A battle-area position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(u8);

impl Slot {
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u8::try_from(index).unwrap_or(u8::MAX))
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

impl std::str::FromStr for Slot {
    type Err = std::num::ParseIntError;

    /// Parse a position key such as `"2"` or `"slot-2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("slot-").unwrap_or(s);
        digits.parse().map(Self)
    }
}

/// Where a card is put back into a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckPosition {
    Top,
    Bottom,
}

/// A place a card can be found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    BattleArea { player: PlayerId, slot: Slot },
    EnergyArea { player: PlayerId, index: usize },
    NegativeEnergy { player: PlayerId, index: usize },
    /// `depth` 0 is the top card.
    Deck { player: PlayerId, depth: usize },
    Hand(PlayerId),
    Trash(PlayerId),
    Field(PlayerId),
}

impl Location {
    /// The player whose zone this is.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match *self {
            Location::BattleArea { player, .. }
            | Location::EnergyArea { player, .. }
            | Location::NegativeEnergy { player, .. }
            | Location::Deck { player, .. }
            | Location::Hand(player)
            | Location::Trash(player)
            | Location::Field(player) => player,
        }
    }

    /// Zone name used to group targets for presentation.
    #[must_use]
    pub fn group(&self) -> &'static str {
        match self {
            Location::BattleArea { .. } => "battle_area",
            Location::EnergyArea { .. } => "energy_area",
            Location::NegativeEnergy { .. } => "negative_energy",
            Location::Deck { .. } => "deck",
            Location::Hand(_) => "hand",
            Location::Trash(_) => "trash",
            Location::Field(_) => "field",
        }
    }
}
