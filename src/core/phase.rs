//! Turn phases and match-level bookkeeping.

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use crate::zones::Slot;

/// Turn phases in their fixed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Start,
    Draw,
    Energy,
    Main,
    End,
}

impl Phase {
    /// All phases in cycle order.
    pub const CYCLE: [Phase; 5] = [Phase::Start, Phase::Draw, Phase::Energy, Phase::Main, Phase::End];

    /// The phase that follows this one. `End` wraps to `Start`.
    #[must_use]
    pub const fn next(self) -> Phase {
        match self {
            Phase::Start => Phase::Draw,
            Phase::Draw => Phase::Energy,
            Phase::Energy => Phase::Main,
            Phase::Main => Phase::End,
            Phase::End => Phase::Start,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Start => "start",
            Phase::Draw => "draw",
            Phase::Energy => "energy",
            Phase::Main => "main",
            Phase::End => "end",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

/// What an attacking friend is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackTarget {
    /// The defending player directly.
    Player,
    /// A friend in the defending player's battle area.
    Friend(Slot),
}

/// An attack waiting for the defender's block decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub attacker: PlayerId,
    pub attacker_slot: Slot,
    pub target: AttackTarget,
}

/// Turn counter, phase, active player and outcome of a match.
///
/// Phase, turn and active player change only through
/// [`TurnController`](crate::rules::TurnController).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub(crate) turn: u32,
    pub(crate) phase: Phase,
    pub(crate) active_player: PlayerId,
    pub(crate) status: MatchStatus,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) battle: Option<Battle>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// A fresh match: turn 1, start phase, player 1 active, waiting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            turn: 1,
            phase: Phase::Start,
            active_player: PlayerId::ONE,
            status: MatchStatus::Waiting,
            winner: None,
            battle: None,
        }
    }

    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.active_player
    }

    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[must_use]
    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    #[must_use]
    pub fn is_active(&self, player: PlayerId) -> bool {
        self.active_player == player
    }

    pub(crate) fn finish(&mut self, winner: PlayerId) {
        self.status = MatchStatus::Finished;
        self.winner = Some(winner);
        self.battle = None;
    }
}
