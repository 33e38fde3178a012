//! Effect conditions.
//!
//! A condition gates whether an effect may activate. It is evaluated
//! against the current state from the point of view of the effect's
//! controller, and never mutates anything.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, Match, Phase, PlayerId};

use super::event::GameEvent;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Always,

    /// The controller is the active player.
    OwnTurn,

    /// The controller's opponent is the active player.
    OpponentTurn,

    /// The match is in the given phase.
    InPhase(Phase),

    /// The controller has a card with this base number (any printing) on
    /// the battle area or as field card.
    ControlsCard(String),

    /// The controller holds more cards than the opponent.
    MoreCardsInHandThanOpponent,

    /// The controller has at least N face-up negative-energy cards.
    FaceUpNegativeEnergyAtLeast(usize),

    /// The triggering event was performed by the controller.
    EventByController,

    /// All conditions must hold.
    All(Vec<Condition>),
}

impl Condition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn controls(base_number: impl Into<String>) -> Self {
        Self::ControlsCard(base_number.into())
    }
}

/// Data a condition is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct ConditionContext<'a> {
    pub state: &'a GameState,
    pub game: &'a Match,
    pub controller: PlayerId,
    pub event: Option<&'a GameEvent>,
}

/// Evaluates conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    #[must_use]
    pub fn evaluate(condition: &Condition, ctx: &ConditionContext<'_>) -> bool {
        let me = ctx.state.player(ctx.controller);
        match condition {
            Condition::Always => true,
            Condition::OwnTurn => ctx.game.active_player() == ctx.controller,
            Condition::OpponentTurn => ctx.game.active_player() != ctx.controller,
            Condition::InPhase(phase) => ctx.game.phase() == *phase,
            Condition::ControlsCard(base) => {
                me.battle().iter().any(|(_, f)| f.card_no.base() == base.as_str())
                    || me.field().is_some_and(|f| f.base() == base.as_str())
            }
            Condition::MoreCardsInHandThanOpponent => {
                let theirs = ctx.state.player(ctx.controller.opponent());
                me.hand().len() > theirs.hand().len()
            }
            Condition::FaceUpNegativeEnergyAtLeast(n) => me.face_up_count() >= *n,
            Condition::EventByController => ctx.event.is_some_and(|e| e.player == ctx.controller),
            Condition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),
        }
    }
}
