//! Turn-phase controller.
//!
//! The only code that moves `Match` through its phase cycle. Turn number
//! and active player change exactly once per End to Start wrap.

use serde::{Deserialize, Serialize};

use crate::core::{Match, Phase, PlayerId};

/// What one call to [`TurnController::advance`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    /// True when the transition ended a turn.
    pub wrapped: bool,
}

pub struct TurnController;

impl TurnController {
    /// Move to the next phase, wrapping into a new turn after End.
    pub fn advance(game: &mut Match) -> PhaseTransition {
        let from = game.phase;
        let to = from.next();
        let wrapped = from == Phase::End;

        game.phase = to;
        if wrapped {
            game.turn += 1;
            game.active_player = game.active_player.opponent();
        }

        PhaseTransition { from, to, wrapped }
    }

    /// Whether `player` may take main-phase actions now.
    #[must_use]
    pub fn in_own_main(game: &Match, player: PlayerId) -> bool {
        game.phase == Phase::Main && game.is_active(player)
    }
}
