//! Effect resolution: executing effects on game state.
//!
//! `EffectResolver` is the one place effect kinds turn into
//! [`GameMutations`] calls. Every call validates the chosen targets against
//! freshly computed candidates before the first mutation, so a rejected
//! selection leaves the state untouched.

use tracing::trace;

use super::effect::{
    Effect, EffectContext, EffectKind, PowerAmount, PowerDuration, PowerScope, RestTarget,
};
use super::targeting::{Target, TargetValidator};
use crate::cards::{CardCatalog, CardNo, FriendInstance};
use crate::core::{GameState, PlayerId};
use crate::error::{EngineError, Result};
use crate::mutations::{GameMutations, Pile};
use crate::zones::{DeckPosition, Location, Slot};

impl Effect {
    /// Apply the effect with the chosen targets.
    ///
    /// Fails with `InvalidTarget`, `TargetRequired`, or `TargetCount` before
    /// anything changes when `chosen` does not fit the candidates.
    pub fn apply(&self, state: &mut GameState, ctx: &EffectContext<'_>, chosen: &[Target]) -> Result<()> {
        EffectResolver::apply(self, state, ctx, chosen)
    }
}

/// Resolves effects on game state.
pub struct EffectResolver;

impl EffectResolver {
    pub fn apply(effect: &Effect, state: &mut GameState, ctx: &EffectContext<'_>, chosen: &[Target]) -> Result<()> {
        Self::validate(effect, state, ctx, chosen)?;
        if let (Some(index), Some(labels)) = (ctx.option, effect.choice_options()) {
            if index >= labels.len() {
                return Err(EngineError::InvalidOption {
                    index,
                    count: labels.len(),
                });
            }
        }
        if let EffectKind::Composite(effects) = &effect.kind {
            for sub in effects {
                sub.check_resources(state, ctx)?;
            }
        }
        trace!(card = %ctx.source.card_no, kind = ?effect.kind, targets = chosen.len(), "applying effect");
        Self::execute(effect, state, ctx, chosen)
    }

    fn validate(effect: &Effect, state: &GameState, ctx: &EffectContext<'_>, chosen: &[Target]) -> Result<()> {
        let requirement = effect.requirement(ctx);
        if requirement.is_none() {
            return match chosen.first() {
                Some(target) => Err(EngineError::InvalidTarget(format!("{} (effect takes no targets)", target.id))),
                None => Ok(()),
            };
        }
        let candidates = effect.candidate_targets(state, ctx);
        TargetValidator::validate(chosen, &candidates, &requirement)
    }

    fn execute(effect: &Effect, state: &mut GameState, ctx: &EffectContext<'_>, chosen: &[Target]) -> Result<()> {
        let me = ctx.controller();

        match &effect.kind {
            EffectKind::PowerModifier { scope, amount, duration } => {
                let amount = match amount {
                    PowerAmount::Fixed(n) => *n,
                    PowerAmount::PerFaceDownNegativeEnergy(n) => {
                        n.saturating_mul(i32::try_from(state.player(me).face_down_count()).unwrap_or(i32::MAX))
                    }
                };
                let targets = Self::scoped_friends(state, ctx, *scope, chosen);
                for (player, slot) in targets {
                    Self::modify(state, ctx, player, slot, amount, *duration)?;
                }
                Ok(())
            }

            EffectKind::HandSizePowerBoost { cards_per_step, amount } => {
                let Some(slot) = ctx.source_slot(state) else {
                    return Ok(());
                };
                let steps = state.player(me).hand().len() / (*cards_per_step).max(1);
                let total = amount.saturating_mul(i32::try_from(steps).unwrap_or(i32::MAX));
                state.set_continuous_power(me, slot, &ctx.source.key(), total)
            }

            EffectKind::FieldCountPowerBoost { amount } => {
                let others = PlayerId::both()
                    .filter(|&p| {
                        state
                            .player(p)
                            .field()
                            .is_some_and(|f| !(p == me && *f == ctx.source.card_no))
                    })
                    .count();
                let total = amount.saturating_mul(i32::try_from(others).unwrap_or(i32::MAX));
                let slots: Vec<Slot> = state.player(me).battle().iter().map(|(slot, _)| slot).collect();
                for slot in slots {
                    state.set_continuous_power(me, slot, &ctx.source.key(), total)?;
                }
                Ok(())
            }

            EffectKind::Draw { count } | EffectKind::OnDamageDraw { count } => state.draw(me, *count),

            EffectKind::LookAtTop { count, .. } => {
                let look = (*count).min(state.player(me).deck().len());
                let keep: Vec<usize> = chosen
                    .iter()
                    .filter_map(|t| match t.location {
                        Location::Deck { depth, .. } => Some(depth),
                        _ => None,
                    })
                    .collect();
                state.keep_from_top(me, look, &keep)
            }

            EffectKind::DiscardDeckTop { count } => {
                let available = state.player(me).deck().len();
                state.mill(me, (*count).min(available)).map(|_| ())
            }

            EffectKind::ReturnFromTrash { .. } => {
                for target in chosen {
                    state.return_from_trash(me, &target.id)?;
                }
                Ok(())
            }

            EffectKind::PlaceFieldFromHand { .. } => {
                for target in chosen {
                    state.place_field_card(me, &target.id)?;
                }
                Ok(())
            }

            EffectKind::RevealTopPlace => {
                let index = ctx.option.unwrap_or(0);
                match option_position(index) {
                    Some(DeckPosition::Top) => Ok(()),
                    Some(DeckPosition::Bottom) => state.deck_top_to_bottom(me).map(|_| ()),
                    None => Err(EngineError::InvalidOption {
                        index,
                        count: effect.choice_options().map_or(0, |o| o.len()),
                    }),
                }
            }

            EffectKind::TrashToDeck { .. } => {
                let index = ctx.option.unwrap_or(0);
                let position = option_position(index).ok_or(EngineError::InvalidOption { index, count: 2 })?;
                for target in chosen {
                    state.move_card_to_deck(me, &target.id, Pile::Trash, position)?;
                }
                Ok(())
            }

            EffectKind::HandReset { size } => {
                for player in [me, me.opponent()] {
                    let excess: Vec<CardNo> = state.player(player).hand().iter().skip(*size).cloned().collect();
                    for card in &excess {
                        state.discard_from_hand(player, card)?;
                    }
                    let zones = state.player(player);
                    let missing = size.saturating_sub(zones.hand().len()).min(zones.deck().len());
                    state.draw(player, missing)?;
                }
                Ok(())
            }

            EffectKind::ReviveFriend => {
                let Some(target) = chosen.first() else {
                    return Ok(());
                };
                let slot = state.player(me).battle().first_free().ok_or(EngineError::NoFreeSlot(me))?;
                let power = ctx.catalog.card(&target.id)?.power;
                state.revive_friend(me, &target.id, slot, power, ctx.game.turn())
            }

            EffectKind::MayReturnOwnFriend { card } => {
                if ctx.option != Some(1) {
                    return Ok(());
                }
                let found = state
                    .player(me)
                    .battle()
                    .iter()
                    .find(|(_, f)| f.card_no.base() == card.base())
                    .map(|(slot, _)| slot);
                match found {
                    Some(slot) => state.return_to_hand(me, slot).map(|_| ()),
                    None => Ok(()),
                }
            }

            EffectKind::ConcealToActivate { count } => {
                if chosen.is_empty() {
                    return Ok(());
                }
                if chosen.len() != *count {
                    return Err(EngineError::TargetCount {
                        min: *count,
                        max: *count,
                        got: chosen.len(),
                    });
                }
                let slot = ctx.source_slot(state).ok_or_else(|| EngineError::FriendNotFound {
                    player: me,
                    friend: ctx.source.card_no.to_string(),
                })?;
                for target in chosen {
                    if let Location::NegativeEnergy { index, .. } = target.location {
                        state.conceal_negative_energy(me, index)?;
                    }
                }
                state.activate(me, slot)
            }

            EffectKind::ReturnToHand { .. } => {
                for (player, slot) in friend_targets(chosen) {
                    state.return_to_hand(player, slot)?;
                }
                Ok(())
            }

            EffectKind::DestroyFriend { .. } | EffectKind::ConditionalDestroy { .. } => {
                for (player, slot) in friend_targets(chosen) {
                    state.destroy_friend(player, slot)?;
                }
                Ok(())
            }

            EffectKind::SetRested { target, rested, .. } => {
                if *target == RestTarget::SourceFriend {
                    let slot = ctx.source_slot(state).ok_or_else(|| EngineError::FriendNotFound {
                        player: me,
                        friend: ctx.source.card_no.to_string(),
                    })?;
                    return Self::set_rested(state, me, slot, *rested);
                }
                for target in chosen {
                    match target.location {
                        Location::BattleArea { player, slot } => Self::set_rested(state, player, slot, *rested)?,
                        Location::EnergyArea { player, index } => state.set_energy_rested(player, index, *rested)?,
                        _ => return Err(EngineError::InvalidTarget(target.id.to_string())),
                    }
                }
                Ok(())
            }

            EffectKind::RevealNegativeEnergy { count } => state.reveal_negative_energy(me, *count),

            EffectKind::DiscardNegativeEnergy { .. } => {
                let mut indices: Vec<usize> = chosen
                    .iter()
                    .filter_map(|t| match t.location {
                        Location::NegativeEnergy { index, .. } => Some(index),
                        _ => None,
                    })
                    .collect();
                // Highest first so earlier indices stay valid.
                indices.sort_unstable_by(|a, b| b.cmp(a));
                for index in indices {
                    state.trash_negative_energy(me, index)?;
                }
                Ok(())
            }

            EffectKind::ReturnEnergyToHand => {
                for target in chosen {
                    if let Location::EnergyArea { player, index } = target.location {
                        state.return_energy_to_hand(player, index)?;
                    }
                }
                Ok(())
            }

            EffectKind::DestroyFieldCard => {
                for target in chosen {
                    state.destroy_field_card(target.location.player())?;
                }
                Ok(())
            }

            EffectKind::CostReduction { .. }
            | EffectKind::EnterRested { .. }
            | EffectKind::Keyword(_)
            | EffectKind::SupportsFromNegativeEnergy => Ok(()),

            EffectKind::Composite(effects) => {
                let mut remaining = Some(chosen);
                for sub in effects {
                    let picked = if sub.requirement(ctx).is_none() {
                        &[][..]
                    } else {
                        remaining.take().unwrap_or(&[][..])
                    };
                    Self::execute(sub, state, ctx, picked)?;
                }
                Ok(())
            }
        }
    }

    /// Friends a power modifier lands on, in slot order.
    fn scoped_friends(
        state: &GameState,
        ctx: &EffectContext<'_>,
        scope: PowerScope,
        chosen: &[Target],
    ) -> Vec<(PlayerId, Slot)> {
        let me = ctx.controller();
        let all_of = |player: PlayerId, keep: &dyn Fn(&FriendInstance) -> bool| {
            state
                .player(player)
                .battle()
                .iter()
                .filter(|(_, f)| keep(f))
                .map(|(slot, _)| (player, slot))
                .collect::<Vec<_>>()
        };

        match scope {
            PowerScope::SourceFriend => ctx.source_slot(state).map(|slot| vec![(me, slot)]).unwrap_or_default(),
            PowerScope::ChosenOwnFriend => friend_targets(chosen).collect(),
            PowerScope::AllOwnFriends => all_of(me, &|_| true),
            PowerScope::AllOpponentFriends => all_of(me.opponent(), &|_| true),
            PowerScope::OwnFriendsOfColor(color) => all_of(me, &|f| {
                ctx.catalog.get_card(&f.card_no).is_some_and(|c| c.color == color)
            }),
        }
    }

    fn modify(
        state: &mut GameState,
        ctx: &EffectContext<'_>,
        player: PlayerId,
        slot: Slot,
        amount: i32,
        duration: PowerDuration,
    ) -> Result<()> {
        match duration {
            PowerDuration::Turn => state.boost_power(player, slot, amount, ctx.source.key()),
            PowerDuration::Permanent => state.modify_power(player, slot, amount).map(|_| ()),
            PowerDuration::Continuous => state.set_continuous_power(player, slot, &ctx.source.key(), amount),
        }
    }

    fn set_rested(state: &mut GameState, player: PlayerId, slot: Slot, rested: bool) -> Result<()> {
        if rested {
            state.rest(player, slot)
        } else {
            state.activate(player, slot)
        }
    }
}

fn friend_targets(chosen: &[Target]) -> impl Iterator<Item = (PlayerId, Slot)> + '_ {
    chosen.iter().filter_map(|t| match t.location {
        Location::BattleArea { player, slot } => Some((player, slot)),
        _ => None,
    })
}

/// Deck position for each index of a top/bottom option.
#[must_use]
pub fn option_position(option: usize) -> Option<DeckPosition> {
    match option {
        0 => Some(DeckPosition::Top),
        1 => Some(DeckPosition::Bottom),
        _ => None,
    }
}
