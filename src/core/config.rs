//! Engine configuration.
//!
//! `EngineConfig` collects the tunable rules of a match: zone sizes, the
//! defeat threshold, and the policies applied when resolution cannot
//! complete normally. Build one with the `with_*` methods and finish with
//! [`EngineConfig::build`], which validates the combination.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// What happens to a pending choice nobody will answer (timeout, disconnect).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbandonPolicy {
    /// Mandatory choices fail the resolution; optional ones resolve as a no-op.
    #[default]
    FailMandatory,
    /// Every abandoned choice resolves as a no-op.
    SkipAll,
}

/// What a match action does when an effect fails mid-resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackFailurePolicy {
    /// Restore the state captured before the action and clear the stack.
    #[default]
    Rollback,
    /// Keep what already resolved and drop the remaining stack items.
    DiscardRemaining,
}

/// Configuration for a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Cards per deck when `enforce_deck_size` is set.
    pub deck_size: usize,

    /// Copy limit per card number. Deck validation lives outside the
    /// engine; this is carried for callers that want it.
    pub max_copies: usize,

    /// Cards drawn when a match starts.
    pub starting_hand: usize,

    /// Battle-area capacity per player.
    pub battle_slots: u8,

    /// Negative-energy count at which a player loses.
    pub defeat_threshold: usize,

    /// Rest energy to pay card costs.
    pub enforce_costs: bool,

    /// Run the automatic phase actions (ready, draw, charge).
    pub phase_actions: bool,

    /// Reject decks that are not exactly `deck_size` cards.
    pub enforce_deck_size: bool,

    /// Shuffle decks when the match starts. Off for scripted matches.
    pub shuffle_decks: bool,

    pub abandon_policy: AbandonPolicy,

    pub stack_failure: StackFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deck_size: 50,
            max_copies: 4,
            starting_hand: 5,
            battle_slots: 5,
            defeat_threshold: 7,
            enforce_costs: true,
            phase_actions: true,
            enforce_deck_size: false,
            shuffle_decks: true,
            abandon_policy: AbandonPolicy::default(),
            stack_failure: StackFailurePolicy::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_starting_hand(mut self, cards: usize) -> Self {
        self.starting_hand = cards;
        self
    }

    #[must_use]
    pub fn with_battle_slots(mut self, slots: u8) -> Self {
        self.battle_slots = slots;
        self
    }

    #[must_use]
    pub fn with_defeat_threshold(mut self, threshold: usize) -> Self {
        self.defeat_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_costs(mut self, enforce: bool) -> Self {
        self.enforce_costs = enforce;
        self
    }

    #[must_use]
    pub fn with_phase_actions(mut self, enabled: bool) -> Self {
        self.phase_actions = enabled;
        self
    }

    #[must_use]
    pub fn with_deck_size(mut self, size: usize) -> Self {
        self.deck_size = size;
        self.enforce_deck_size = true;
        self
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_decks = shuffle;
        self
    }

    #[must_use]
    pub fn with_abandon_policy(mut self, policy: AbandonPolicy) -> Self {
        self.abandon_policy = policy;
        self
    }

    #[must_use]
    pub fn with_stack_failure(mut self, policy: StackFailurePolicy) -> Self {
        self.stack_failure = policy;
        self
    }

    /// Check that the settings can describe a playable match.
    pub fn validate(&self) -> Result<()> {
        if self.battle_slots == 0 {
            return Err(EngineError::InvalidConfig("battle area needs at least one slot".into()));
        }
        if self.defeat_threshold == 0 {
            return Err(EngineError::InvalidConfig("defeat threshold must be positive".into()));
        }
        if self.enforce_deck_size && self.starting_hand > self.deck_size {
            return Err(EngineError::InvalidConfig(format!(
                "starting hand {} exceeds deck size {}",
                self.starting_hand, self.deck_size
            )));
        }
        Ok(())
    }

    /// Validate and return the finished configuration.
    pub fn build(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.deck_size, 50);
        assert_eq!(config.max_copies, 4);
        assert_eq!(config.battle_slots, 5);
        assert!(config.shuffle_decks);
        assert_eq!(config.abandon_policy, AbandonPolicy::FailMandatory);
        assert_eq!(config.stack_failure, StackFailurePolicy::Rollback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_starting_hand(3)
            .with_costs(false)
            .with_phase_actions(false)
            .with_stack_failure(StackFailurePolicy::DiscardRemaining)
            .build()
            .unwrap();

        assert_eq!(config.starting_hand, 3);
        assert!(!config.enforce_costs);
        assert!(!config.phase_actions);
        assert_eq!(config.stack_failure, StackFailurePolicy::DiscardRemaining);
    }

    #[test]
    fn test_zero_slots_rejected() {
        let err = EngineConfig::new().with_battle_slots(0).build().unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_hand_larger_than_deck_rejected() {
        let result = EngineConfig::new()
            .with_deck_size(4)
            .with_starting_hand(5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = EngineConfig::new().with_defeat_threshold(10);
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
