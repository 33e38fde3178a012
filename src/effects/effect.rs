//! Effect definitions.
//!
//! An `Effect` is bound to exactly one trigger and carries one
//! [`EffectKind`] from a closed set. Every kind supplies its own target
//! requirement and candidate computation, so nothing outside this module
//! switches on the kind to decide what an effect may target.
//!
//! ## Contract
//!
//! - `trigger()` / `responds_to()`: when the effect fires
//! - `can_activate()`: pure precondition check, used before queueing
//! - `requirement()` / `candidate_targets()`: what the player picks from
//! - `choice_options()` / `needs_option()`: labels for effects that ask
//!   for an option, and whether the question is worth asking right now
//! - `apply()`: the only mutating call (see `resolver`)

use serde::{Deserialize, Serialize};

use super::targeting::{Target, TargetKind, TargetRequirement};
use crate::cards::{CardCatalog, CardNo, CardType, Color, SourceKey};
use crate::core::{GameState, Match, PlayerId};
use crate::error::{EngineError, Result};
use crate::triggers::{Condition, ConditionContext, ConditionEvaluator, GameEvent, Trigger};
use crate::zones::{Location, Slot};

/// Which friends a power modifier touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerScope {
    SourceFriend,
    ChosenOwnFriend,
    AllOwnFriends,
    AllOpponentFriends,
    OwnFriendsOfColor(Color),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerAmount {
    Fixed(i32),
    /// Multiplied by the controller's face-down negative energy.
    PerFaceDownNegativeEnergy(i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerDuration {
    Turn,
    Permanent,
    Continuous,
}

/// Whose battle area a friend target comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Own,
    Opponent,
    Any,
}

impl Side {
    fn players(self, controller: PlayerId) -> Vec<PlayerId> {
        match self {
            Side::Own => vec![controller],
            Side::Opponent => vec![controller.opponent()],
            Side::Any => PlayerId::both().collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestTarget {
    SourceFriend,
    OwnFriend,
    OpponentFriend,
    OwnEnergy,
}

/// Static abilities checked by the combat rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    /// May attack the turn it is played.
    Haste,
    /// May block while rested.
    BlockWhileRested,
    /// Unblocked attacks deal this much extra damage.
    ExtraDamage(u32),
}

/// What an effect does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    // === Power ===
    PowerModifier {
        scope: PowerScope,
        amount: PowerAmount,
        duration: PowerDuration,
    },
    /// Continuous: `amount` per `cards_per_step` cards in the controller's hand.
    HandSizePowerBoost { cards_per_step: usize, amount: i32 },
    /// Continuous: `amount` to own friends per other field card in play.
    FieldCountPowerBoost { amount: i32 },

    // === Cards ===
    Draw { count: usize },
    OnDamageDraw { count: usize },
    LookAtTop { count: usize, keep: usize },
    DiscardDeckTop { count: usize },
    ReturnFromTrash { card_type: CardType, max_cost: u32 },
    PlaceFieldFromHand { max_cost: u32 },
    /// Reveal the deck top and keep it there or move it to the bottom.
    RevealTopPlace,
    /// Put up to `count` trash cards on the deck top or bottom.
    TrashToDeck { count: usize },
    /// Both players discard down to `size`, then draw up to `size`.
    HandReset { size: usize },

    // === Friends ===
    ReturnToHand {
        side: Side,
        max_cost: Option<u32>,
        max_power: Option<u32>,
        mandatory: bool,
    },
    DestroyFriend { max_power: u32, mandatory: bool },
    /// Put a friend from the trash into play rested. It leaves at the End
    /// phase of the turn.
    ReviveFriend,
    /// Optionally return one of your friends printed as `card` to hand.
    MayReturnOwnFriend { card: CardNo },
    ConditionalDestroy { condition: Condition, max_power: u32 },
    SetRested {
        target: RestTarget,
        rested: bool,
        optional: bool,
    },

    // === Energy and damage ===
    RevealNegativeEnergy { count: usize },
    DiscardNegativeEnergy { count: usize, optional: bool },
    ReturnEnergyToHand,
    DestroyFieldCard,
    /// Flip exactly `count` face-up negative energy face-down to activate
    /// the source friend.
    ConcealToActivate { count: usize },

    // === Rule modifiers (queried, never applied) ===
    CostReduction {
        card_type: CardType,
        amount: u32,
        minimum: u32,
    },
    EnterRested { costs: Vec<u32> },
    Keyword(Keyword),
    /// Supports may be played from negative energy. The card goes to the
    /// deck bottom and its player takes 1 damage.
    SupportsFromNegativeEnergy,

    /// Sub-effects in order. At most one of them takes targets.
    Composite(Vec<Effect>),
}

/// The card an effect instance belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCard {
    pub card_no: CardNo,
    pub controller: PlayerId,
    /// Battle-area slot, when the source is a friend in play.
    pub slot: Option<Slot>,
}

impl SourceCard {
    #[must_use]
    pub fn new(card_no: impl Into<CardNo>, controller: PlayerId, slot: Option<Slot>) -> Self {
        Self {
            card_no: card_no.into(),
            controller,
            slot,
        }
    }

    /// The key continuous modifiers from this source are filed under.
    #[must_use]
    pub fn key(&self) -> SourceKey {
        SourceKey {
            player: self.controller,
            slot: self.slot,
            card: self.card_no.clone(),
        }
    }
}

/// Everything an effect may read besides the game state.
#[derive(Clone, Copy)]
pub struct EffectContext<'a> {
    pub catalog: &'a dyn CardCatalog,
    pub game: &'a Match,
    pub source: &'a SourceCard,
    pub event: Option<&'a GameEvent>,
    /// Index into `choice_options()`, once chosen.
    pub option: Option<usize>,
}

impl<'a> EffectContext<'a> {
    #[must_use]
    pub fn new(catalog: &'a dyn CardCatalog, game: &'a Match, source: &'a SourceCard) -> Self {
        Self {
            catalog,
            game,
            source,
            event: None,
            option: None,
        }
    }

    #[must_use]
    pub fn with_event(mut self, event: Option<&'a GameEvent>) -> Self {
        self.event = event;
        self
    }

    #[must_use]
    pub fn with_option(mut self, option: Option<usize>) -> Self {
        self.option = option;
        self
    }

    pub fn controller(&self) -> PlayerId {
        self.source.controller
    }

    pub(crate) fn condition_context<'s>(&self, state: &'s GameState) -> ConditionContext<'s>
    where
        'a: 's,
    {
        ConditionContext {
            state,
            game: self.game,
            controller: self.source.controller,
            event: self.event,
        }
    }

    /// Slot of the source friend, if it is still in play.
    pub(crate) fn source_slot(&self, state: &GameState) -> Option<Slot> {
        let battle = state.player(self.source.controller).battle();
        match self.source.slot {
            Some(slot) => battle
                .get(slot)
                .filter(|f| f.card_no == self.source.card_no)
                .map(|_| slot),
            None => battle.find(&self.source.card_no),
        }
    }
}

/// A card ability.
///
/// ```
/// use mememe_engine::effects::{Effect, EffectKind};
/// use mememe_engine::triggers::Trigger;
///
/// let draw = Effect::new(Trigger::OnAttack, EffectKind::Draw { count: 1 })
///     .with_text("When this friend attacks, draw 1 card.");
/// assert!(draw.responds_to(Trigger::OnAttack));
/// assert!(!draw.responds_to(Trigger::Counter));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub trigger: Trigger,
    pub kind: EffectKind,
    pub condition: Condition,
    pub text: String,
    /// A `Main` effect that can also be used at counter timing.
    pub counter_timing: bool,
}

impl Effect {
    #[must_use]
    pub fn new(trigger: Trigger, kind: EffectKind) -> Self {
        Self {
            trigger,
            kind,
            condition: Condition::Always,
            text: String::new(),
            counter_timing: false,
        }
    }

    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Also usable at counter timing.
    #[must_use]
    pub fn with_counter(mut self) -> Self {
        self.counter_timing = true;
        self
    }

    #[must_use]
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    #[must_use]
    pub fn responds_to(&self, trigger: Trigger) -> bool {
        self.trigger == trigger || (self.counter_timing && self.trigger == Trigger::Main && trigger == Trigger::Counter)
    }

    /// Effects recomputed on every normalization pass.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.trigger == Trigger::Persistent
    }

    /// Whether the effect may be queued right now. Never mutates.
    #[must_use]
    pub fn can_activate(&self, state: &GameState, ctx: &EffectContext<'_>) -> bool {
        if !ConditionEvaluator::evaluate(&self.condition, &ctx.condition_context(state)) {
            return false;
        }
        if self.check_resources(state, ctx).is_err() {
            return false;
        }
        let requirement = self.requirement(ctx);
        !requirement.mandatory || !self.candidate_targets(state, ctx).is_empty()
    }

    /// Resource preconditions, reported as the error `apply` would hit.
    pub(crate) fn check_resources(&self, state: &GameState, ctx: &EffectContext<'_>) -> Result<()> {
        let me = state.player(ctx.controller());
        let need_deck = |requested: usize| {
            if me.deck().len() < requested {
                Err(EngineError::DeckEmpty {
                    requested,
                    available: me.deck().len(),
                })
            } else {
                Ok(())
            }
        };
        let need_source = || {
            ctx.source_slot(state).map(|_| ()).ok_or_else(|| EngineError::FriendNotFound {
                player: ctx.controller(),
                friend: ctx.source.card_no.to_string(),
            })
        };

        match &self.kind {
            EffectKind::Draw { count } | EffectKind::OnDamageDraw { count } => need_deck(*count),
            EffectKind::RevealTopPlace => need_deck(1),
            EffectKind::RevealNegativeEnergy { count } => {
                let available = me.face_down_count();
                if available < *count {
                    Err(EngineError::NotEnoughFaceDown {
                        requested: *count,
                        available,
                    })
                } else {
                    Ok(())
                }
            }
            EffectKind::ReviveFriend => me
                .battle()
                .first_free()
                .map(|_| ())
                .ok_or(EngineError::NoFreeSlot(ctx.controller())),
            EffectKind::ConcealToActivate { count } => {
                need_source()?;
                let available = me.face_up_count();
                if available < *count {
                    Err(EngineError::NotEnoughFaceUp {
                        requested: *count,
                        available,
                    })
                } else {
                    Ok(())
                }
            }
            EffectKind::PowerModifier {
                scope: PowerScope::SourceFriend,
                ..
            }
            | EffectKind::HandSizePowerBoost { .. }
            | EffectKind::SetRested {
                target: RestTarget::SourceFriend,
                ..
            } => need_source(),
            EffectKind::Composite(effects) => effects.iter().try_for_each(|e| e.check_resources(state, ctx)),
            _ => Ok(()),
        }
    }

    /// The targets this effect asks for.
    #[must_use]
    pub fn requirement(&self, ctx: &EffectContext<'_>) -> TargetRequirement {
        match &self.kind {
            EffectKind::PowerModifier {
                scope: PowerScope::ChosenOwnFriend,
                ..
            } => TargetRequirement::single(TargetKind::Friend, true, "Choose one of your friends"),
            EffectKind::ReturnToHand { mandatory, .. } => {
                TargetRequirement::single(TargetKind::Friend, *mandatory, "Choose a friend to return to hand")
            }
            EffectKind::DestroyFriend { mandatory, .. } => {
                TargetRequirement::single(TargetKind::Friend, *mandatory, "Choose an opponent's friend to destroy")
            }
            EffectKind::ConditionalDestroy { .. } => {
                TargetRequirement::single(TargetKind::Friend, false, "Choose an opponent's friend to destroy")
            }
            EffectKind::SetRested { target, rested, optional } => {
                let (kind, what) = match target {
                    RestTarget::SourceFriend => return TargetRequirement::none(),
                    RestTarget::OwnFriend => (TargetKind::Friend, "one of your friends"),
                    RestTarget::OpponentFriend => (TargetKind::Friend, "an opponent's friend"),
                    RestTarget::OwnEnergy => (TargetKind::Energy, "one of your energy cards"),
                };
                let verb = if *rested { "rest" } else { "activate" };
                TargetRequirement::single(kind, !optional, format!("Choose {what} to {verb}"))
            }
            EffectKind::LookAtTop { keep, .. } => {
                TargetRequirement::range(TargetKind::Deck, *keep, *keep, format!("Choose {keep} to add to your hand"))
            }
            EffectKind::DiscardNegativeEnergy { count, optional } => TargetRequirement {
                mandatory: !optional,
                ..TargetRequirement::range(
                    TargetKind::Card,
                    if *optional { 0 } else { *count },
                    *count,
                    "Choose negative energy to discard",
                )
            },
            EffectKind::ReturnFromTrash { .. } => {
                TargetRequirement::single(TargetKind::Card, false, "Choose a card in your trash")
            }
            EffectKind::PlaceFieldFromHand { .. } => {
                TargetRequirement::single(TargetKind::Card, false, "Choose a field card in your hand")
            }
            EffectKind::DestroyFieldCard => {
                TargetRequirement::single(TargetKind::Field, true, "Choose a field card to destroy")
            }
            EffectKind::ReturnEnergyToHand => {
                TargetRequirement::single(TargetKind::Energy, true, "Choose an energy card to return")
            }
            EffectKind::TrashToDeck { count } => TargetRequirement::range(
                TargetKind::Card,
                0,
                *count,
                format!("Choose up to {count} cards in your trash to put into your deck"),
            ),
            EffectKind::ReviveFriend => {
                TargetRequirement::single(TargetKind::Card, true, "Choose a friend in your trash to play")
            }
            EffectKind::ConcealToActivate { count } => TargetRequirement::range(
                TargetKind::Card,
                0,
                *count,
                format!("Choose {count} face-up negative energy to turn face-down"),
            ),
            EffectKind::Composite(effects) => effects
                .iter()
                .map(|e| e.requirement(ctx))
                .find(|r| !r.is_none())
                .unwrap_or_else(TargetRequirement::none),
            _ => TargetRequirement::none(),
        }
    }

    /// Legal targets in the current state, recomputed on every call.
    #[must_use]
    pub fn candidate_targets(&self, state: &GameState, ctx: &EffectContext<'_>) -> Vec<Target> {
        let me = ctx.controller();
        match &self.kind {
            EffectKind::PowerModifier {
                scope: PowerScope::ChosenOwnFriend,
                ..
            } => friends(state, &[me], |_, _| true),
            EffectKind::ReturnToHand {
                side,
                max_cost,
                max_power,
                ..
            } => friends(state, &side.players(me), |no, power| {
                let cost_ok = max_cost.map_or(true, |max| ctx.catalog.get_card(no).is_some_and(|c| c.cost <= max));
                cost_ok && max_power.map_or(true, |max| power <= max)
            }),
            EffectKind::DestroyFriend { max_power, .. } => {
                friends(state, &[me.opponent()], |_, power| power <= *max_power)
            }
            EffectKind::ConditionalDestroy { condition, max_power } => {
                if ConditionEvaluator::evaluate(condition, &ctx.condition_context(state)) {
                    friends(state, &[me.opponent()], |_, power| power <= *max_power)
                } else {
                    Vec::new()
                }
            }
            EffectKind::SetRested { target, rested, .. } => match target {
                RestTarget::SourceFriend => Vec::new(),
                RestTarget::OwnFriend | RestTarget::OpponentFriend => {
                    let side = if *target == RestTarget::OwnFriend { me } else { me.opponent() };
                    state
                        .player(side)
                        .battle()
                        .iter()
                        .filter(|(_, f)| f.rested != *rested)
                        .map(|(slot, f)| Target::friend(side, slot, f))
                        .collect()
                }
                RestTarget::OwnEnergy => state
                    .player(me)
                    .energy()
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.rested != *rested)
                    .map(|(i, e)| Target::energy(me, i, e.card_no.clone()))
                    .collect(),
            },
            EffectKind::LookAtTop { count, .. } => state
                .player(me)
                .deck()
                .iter()
                .take(*count)
                .enumerate()
                .map(|(depth, no)| Target::deck(me, depth, no.clone()))
                .collect(),
            EffectKind::DiscardNegativeEnergy { .. } => state
                .player(me)
                .negative_energy()
                .iter()
                .enumerate()
                .map(|(index, n)| Target::card(Location::NegativeEnergy { player: me, index }, n.card_no.clone()))
                .collect(),
            EffectKind::ReturnFromTrash { card_type, max_cost } => state
                .player(me)
                .trash()
                .iter()
                .filter(|no| {
                    ctx.catalog
                        .get_card(no)
                        .is_some_and(|c| c.card_type == *card_type && c.cost <= *max_cost)
                })
                .map(|no| Target::card(Location::Trash(me), no.clone()))
                .collect(),
            EffectKind::PlaceFieldFromHand { max_cost } => state
                .player(me)
                .hand()
                .iter()
                .filter(|no| {
                    ctx.catalog
                        .get_card(no)
                        .is_some_and(|c| c.card_type == CardType::Field && c.cost <= *max_cost)
                })
                .map(|no| Target::card(Location::Hand(me), no.clone()))
                .collect(),
            EffectKind::DestroyFieldCard => {
                let opponent = me.opponent();
                state
                    .player(opponent)
                    .field()
                    .map(|no| vec![Target::field(opponent, no.clone())])
                    .unwrap_or_default()
            }
            EffectKind::ReturnEnergyToHand => state
                .player(me)
                .energy()
                .iter()
                .enumerate()
                .map(|(i, e)| Target::energy(me, i, e.card_no.clone()))
                .collect(),
            EffectKind::TrashToDeck { .. } => state
                .player(me)
                .trash()
                .iter()
                .map(|no| Target::card(Location::Trash(me), no.clone()))
                .collect(),
            EffectKind::ReviveFriend => state
                .player(me)
                .trash()
                .iter()
                .filter(|no| ctx.catalog.get_card(no).is_some_and(|c| c.is_friend()))
                .map(|no| Target::card(Location::Trash(me), no.clone()))
                .collect(),
            EffectKind::ConcealToActivate { .. } => state
                .player(me)
                .negative_energy()
                .iter()
                .enumerate()
                .filter(|(_, n)| n.face_up)
                .map(|(index, n)| Target::card(Location::NegativeEnergy { player: me, index }, n.card_no.clone()))
                .collect(),
            EffectKind::Composite(effects) => effects
                .iter()
                .find(|e| !e.requirement(ctx).is_none())
                .map(|e| e.candidate_targets(state, ctx))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Option labels, for effects that ask the player to pick one.
    #[must_use]
    pub fn choice_options(&self) -> Option<Vec<String>> {
        match &self.kind {
            EffectKind::RevealTopPlace | EffectKind::TrashToDeck { .. } => {
                Some(vec!["top".to_string(), "bottom".to_string()])
            }
            EffectKind::MayReturnOwnFriend { .. } => Some(vec!["keep".to_string(), "return".to_string()]),
            EffectKind::Composite(effects) => effects.iter().find_map(Effect::choice_options),
            _ => None,
        }
    }

    /// Whether the option question means anything in the current state.
    /// Unasked options resolve as the first label.
    #[must_use]
    pub fn needs_option(&self, state: &GameState, ctx: &EffectContext<'_>) -> bool {
        let me = state.player(ctx.controller());
        match &self.kind {
            EffectKind::RevealTopPlace => true,
            EffectKind::TrashToDeck { .. } => !me.trash().is_empty(),
            EffectKind::MayReturnOwnFriend { card } => me.battle().iter().any(|(_, f)| f.card_no.base() == card.base()),
            EffectKind::Composite(effects) => effects
                .iter()
                .find(|e| e.choice_options().is_some())
                .is_some_and(|e| e.needs_option(state, ctx)),
            _ => false,
        }
    }

    /// Whether this is the rule modifier letting supports be played from
    /// negative energy.
    #[must_use]
    pub fn allows_negative_energy_supports(&self) -> bool {
        matches!(self.kind, EffectKind::SupportsFromNegativeEnergy)
    }

    /// The keyword this effect grants, if it is one.
    #[must_use]
    pub fn keyword(&self) -> Option<Keyword> {
        match self.kind {
            EffectKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }
}

fn friends(state: &GameState, players: &[PlayerId], keep: impl Fn(&CardNo, u32) -> bool) -> Vec<Target> {
    let keep = &keep;
    players
        .iter()
        .flat_map(move |&player| {
            state
                .player(player)
                .battle()
                .iter()
                .filter(move |(_, f)| keep(&f.card_no, f.power()))
                .map(move |(slot, f)| Target::friend(player, slot, f))
        })
        .collect()
}
