//! Error types for the rules engine.

use thiserror::Error;

use crate::cards::CardNo;
use crate::core::{Phase, PlayerId};
use crate::zones::Slot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // === Targeting (recoverable: re-prompt) ===
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("a target is required")]
    TargetRequired,

    #[error("expected between {min} and {max} targets, got {got}")]
    TargetCount { min: usize, max: usize, got: usize },

    // === Lookup (state desync, not retried) ===
    #[error("no friend {friend} in {player}'s battle area")]
    FriendNotFound { player: PlayerId, friend: String },

    #[error("card not found: {0}")]
    CardNotFound(CardNo),

    #[error("no energy card at index {index} for {player}")]
    EnergyNotFound { player: PlayerId, index: usize },

    #[error("{0} has no field card")]
    NoFieldCard(PlayerId),

    // === Resources ===
    #[error("deck empty: requested {requested}, {available} available")]
    DeckEmpty { requested: usize, available: usize },

    #[error("not enough face-down negative energy: requested {requested}, {available} available")]
    NotEnoughFaceDown { requested: usize, available: usize },

    #[error("not enough face-up negative energy: requested {requested}, {available} available")]
    NotEnoughFaceUp { requested: usize, available: usize },

    #[error("insufficient energy to pay {cost} for {card}")]
    InsufficientEnergy { card: CardNo, cost: u32 },

    // === Turn legality (rejected before mutation) ===
    #[error("it is not {0}'s turn")]
    NotPlayersTurn(PlayerId),

    #[error("action not legal during the {0} phase")]
    WrongPhase(Phase),

    #[error("match is not in progress")]
    MatchNotInProgress,

    #[error("match not found: {0}")]
    MatchNotFound(String),

    #[error("no player {0}; players are numbered 1 and 2")]
    InvalidPlayer(u8),

    // === Board ===
    #[error("{0} is already occupied")]
    SlotOccupied(Slot),

    #[error("{0} is outside the battle area")]
    InvalidSlot(Slot),

    #[error("{0} has no free battle-area slot")]
    NoFreeSlot(PlayerId),

    #[error("friend at {0} is rested")]
    FriendRested(Slot),

    #[error("friend at {0} entered play this turn")]
    SummoningSick(Slot),

    #[error("no attack is awaiting a block decision")]
    NoBattle,

    #[error("{card} cannot be played now")]
    NotPlayable { card: CardNo },

    // === Choices ===
    #[error("choice {0} must be answered first")]
    ChoicePending(u32),

    #[error("choice not found: {0}")]
    ChoiceNotFound(u32),

    #[error("option {index} out of range ({count} options)")]
    InvalidOption { index: usize, count: usize },

    #[error("mandatory choice {0} was abandoned")]
    ChoiceAbandoned(u32),

    // === Infrastructure ===
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    /// Errors a caller can recover from by asking the player again.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidTarget(_)
                | Self::TargetRequired
                | Self::TargetCount { .. }
                | Self::InvalidOption { .. }
                | Self::DeckEmpty { .. }
        )
    }
}

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = EngineError::DeckEmpty { requested: 3, available: 1 };
        assert_eq!(err.to_string(), "deck empty: requested 3, 1 available");

        let err = EngineError::FriendNotFound {
            player: PlayerId::TWO,
            friend: "F-006".into(),
        };
        assert_eq!(err.to_string(), "no friend F-006 in Player 2's battle area");
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(EngineError::TargetRequired.is_recoverable());
        assert!(EngineError::InvalidTarget("x".into()).is_recoverable());
        assert!(!EngineError::CardNotFound(CardNo::new("F-001")).is_recoverable());
        assert!(!EngineError::NotPlayersTurn(PlayerId::ONE).is_recoverable());
    }
}
