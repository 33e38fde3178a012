//! Match API.
//!
//! `MatchEngine` validates player actions, turns them into state changes
//! and events, and drives the effect stack until it settles. It holds only
//! read-only data (card catalog, effect catalog, configuration), so one
//! engine serves any number of sessions.
//!
//! ## Failure handling
//!
//! Every action starts from a checkpoint of `(GameState, Match)`. If the
//! action fails, including failures while resolving effects it caused, the
//! session recovers according to `EngineConfig::stack_failure`. A
//! checkpoint survives a pending choice, so answering the choice can still
//! roll back the whole action.

use std::sync::Arc;

use im::Vector;
use tracing::{debug, info, warn};

use super::session::{MatchId, MatchSession};
use super::turn::TurnController;
use crate::cards::{
    CardAttributes, CardCatalog, CardNo, CardType, Color, ColorCost, EnergyCardInstance, FriendInstance,
};
use crate::core::{
    AttackTarget, Battle, EngineConfig, GameRng, GameState, MatchStatus, Phase, PlayerId, StackFailurePolicy,
};
use crate::effects::{EffectCatalog, RuleModifiers, Target};
use crate::error::{EngineError, Result};
use crate::mutations::GameMutations;
use crate::stack::{ChoiceId, ResolutionStatus, ResolveContext, Selection};
use crate::triggers::{EventKind, EventRouter, GameEvent, Trigger};
use crate::zones::{DeckPosition, Location, Slot};

/// Remaining work of an action suspended on a choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Continuation {
    Advance(AdvanceStep),
    /// Compare powers or deal damage once block effects have resolved.
    SettleBattle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AdvanceStep {
    /// PhaseEnd has resolved; move to the next phase.
    Transition,
    /// TurnEnd has resolved; announce the new turn.
    TurnStart,
    /// Announce the phase that was entered.
    PhaseStart,
    /// PhaseStart has resolved; run the automatic phase actions.
    PhaseActions,
}

pub struct MatchEngine {
    catalog: Arc<dyn CardCatalog>,
    effects: Arc<EffectCatalog>,
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(catalog: Arc<dyn CardCatalog>, effects: Arc<EffectCatalog>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            catalog,
            effects,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn effects(&self) -> &EffectCatalog {
        &self.effects
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn CardCatalog {
        self.catalog.as_ref()
    }

    // === Lifecycle ===

    /// Build a session from two deck lists. Every card must be in the catalog.
    pub fn create_match(&self, id: impl Into<MatchId>, decks: [Vec<CardNo>; 2]) -> Result<MatchSession> {
        let id = id.into();
        for (player, deck) in PlayerId::both().zip(&decks) {
            if self.config.enforce_deck_size && deck.len() != self.config.deck_size {
                return Err(EngineError::InvalidConfig(format!(
                    "deck for {player} has {} cards, expected {}",
                    deck.len(),
                    self.config.deck_size
                )));
            }
            for card in deck {
                self.catalog.card(card)?;
            }
        }

        let [one, two] = decks;
        info!(match_id = %id, "match created");
        Ok(MatchSession::new(id, GameState::new(one, two, self.config.battle_slots)))
    }

    /// Shuffle both decks, deal opening hands, and begin turn 1.
    pub fn start_match(&self, session: &mut MatchSession, seed: u64) -> Result<()> {
        if session.game.status != MatchStatus::Waiting {
            return Err(EngineError::MatchNotInProgress);
        }

        if self.config.shuffle_decks {
            let mut rng = GameRng::new(seed);
            for (_, zones) in session.state.players.iter_mut() {
                let mut cards: Vec<CardNo> = zones.deck.iter().cloned().collect();
                rng.shuffle(&mut cards);
                zones.deck = cards.into_iter().collect();
            }
        }
        for player in PlayerId::both() {
            let hand = self.config.starting_hand.min(session.state.player(player).deck().len());
            session.state.draw(player, hand)?;
        }

        session.seed = Some(seed);
        session.game.status = MatchStatus::Playing;
        info!(match_id = %session.id, seed, first = %session.game.active_player, "match started");

        self.phase_actions(session)?;
        Ok(())
    }

    // === Player actions ===

    /// Play a card from hand.
    ///
    /// Friends go to `slot` (or the first free slot), supports go to the
    /// trash and resolve, fields replace the current field card. `targets`
    /// may be empty; the stack then auto-selects or asks.
    ///
    /// While a rule modifier allows it, a support may instead come from the
    /// player's negative energy. It goes to the deck bottom and the player
    /// takes 1 damage before it resolves.
    pub fn play_card(
        &self,
        session: &mut MatchSession,
        player: PlayerId,
        card_no: &CardNo,
        slot: Option<Slot>,
        targets: Vec<Target>,
    ) -> Result<ResolutionStatus> {
        self.act(session, |engine, session| engine.play(session, player, card_no, slot, targets))
    }

    /// Use the `[Main]` ability of a friend in play. Resting the friend is
    /// the activation cost.
    pub fn activate_ability(
        &self,
        session: &mut MatchSession,
        player: PlayerId,
        slot: Slot,
        targets: Vec<Target>,
    ) -> Result<ResolutionStatus> {
        self.act(session, |engine, session| {
            engine.check_main(session, player)?;
            let friend = find_friend(&session.state, player, slot)?;
            if friend.rested {
                return Err(EngineError::FriendRested(slot));
            }
            let card_no = friend.card_no.clone();
            if !engine.effects.get(&card_no).is_some_and(|e| e.responds_to(Trigger::Main)) {
                return Err(EngineError::NotPlayable { card: card_no });
            }

            session.state.rest(player, slot)?;
            let event = GameEvent::new(EventKind::AbilityActivated, player, session.game.phase)
                .with_source(card_no)
                .with_source_slot(slot);
            engine.fire(session, event, targets)
        })
    }

    /// Declare an attack. The defender answers with `block` or `decline_block`.
    pub fn attack(
        &self,
        session: &mut MatchSession,
        player: PlayerId,
        attacker_slot: Slot,
        target: AttackTarget,
    ) -> Result<ResolutionStatus> {
        self.act(session, |engine, session| {
            engine.check_main(session, player)?;
            let friend = find_friend(&session.state, player, attacker_slot)?;
            if friend.rested {
                return Err(EngineError::FriendRested(attacker_slot));
            }
            let rules = RuleModifiers::new(&engine.effects, &session.state, &session.game);
            if friend.turn_played == session.game.turn && !rules.has_haste(player, attacker_slot) {
                return Err(EngineError::SummoningSick(attacker_slot));
            }
            let card_no = friend.card_no.clone();

            let defender = player.opponent();
            let mut event = GameEvent::new(EventKind::FriendAttacks, player, session.game.phase)
                .with_source(card_no)
                .with_source_slot(attacker_slot);
            if let AttackTarget::Friend(slot) = target {
                find_friend(&session.state, defender, slot)?;
                event = event.with_target(Location::BattleArea { player: defender, slot });
            }

            session.state.rest(player, attacker_slot)?;
            session.game.battle = Some(Battle {
                attacker: player,
                attacker_slot,
                target,
            });
            debug!(match_id = %session.id, attacker = %attacker_slot, ?target, "attack declared");
            engine.fire(session, event, Vec::new())
        })
    }

    /// Block the pending attack with `blocker_slot`.
    pub fn block(
        &self,
        session: &mut MatchSession,
        player: PlayerId,
        blocker_slot: Slot,
        attacker_slot: Slot,
    ) -> Result<ResolutionStatus> {
        self.act(session, |engine, session| {
            let battle = engine.check_defender(session, player)?;
            if battle.attacker_slot != attacker_slot {
                return Err(EngineError::NoBattle);
            }
            let blocker = find_friend(&session.state, player, blocker_slot)?;
            let rested = blocker.rested;
            if rested && !RuleModifiers::new(&engine.effects, &session.state, &session.game)
                .blocks_while_rested(player, blocker_slot)
            {
                return Err(EngineError::FriendRested(blocker_slot));
            }
            let card_no = blocker.card_no.clone();

            if !rested {
                session.state.rest(player, blocker_slot)?;
            }
            session.game.battle = Some(Battle {
                target: AttackTarget::Friend(blocker_slot),
                ..battle
            });
            session.continuation = Some(Continuation::SettleBattle);
            debug!(match_id = %session.id, blocker = %blocker_slot, "block declared");

            let event = GameEvent::new(EventKind::FriendBlocks, player, session.game.phase)
                .with_source(card_no)
                .with_source_slot(blocker_slot)
                .with_target(Location::BattleArea {
                    player: battle.attacker,
                    slot: attacker_slot,
                });
            engine.fire(session, event, Vec::new())
        })
    }

    /// Let the pending attack through unblocked.
    pub fn decline_block(&self, session: &mut MatchSession, player: PlayerId) -> Result<ResolutionStatus> {
        self.act(session, |engine, session| {
            engine.check_defender(session, player)?;
            session.continuation = Some(Continuation::SettleBattle);
            Ok(ResolutionStatus::Complete)
        })
    }

    /// End the current phase and run the next one's start.
    pub fn advance_phase(&self, session: &mut MatchSession, player: PlayerId) -> Result<ResolutionStatus> {
        self.act(session, |engine, session| {
            engine.check_turn(session, player)?;
            let event = GameEvent::new(EventKind::PhaseEnd, player, session.game.phase);
            session.continuation = Some(Continuation::Advance(AdvanceStep::Transition));
            engine.fire(session, event, Vec::new())
        })
    }

    /// Answer the pending choice. A rejected answer leaves it pending.
    pub fn submit_choice(
        &self,
        session: &mut MatchSession,
        player: PlayerId,
        id: ChoiceId,
        selection: Selection,
    ) -> Result<ResolutionStatus> {
        self.check_chooser(session, player, id)?;
        let cx = ResolveContext::new(self.catalog.as_ref(), &self.effects, &session.game);
        let result = session.stack.submit_choice(id, selection, &mut session.state, &cx);
        self.after_choice(session, id, result)
    }

    /// Give up on the pending choice, subject to the abandon policy.
    pub fn abandon_choice(&self, session: &mut MatchSession, player: PlayerId, id: ChoiceId) -> Result<ResolutionStatus> {
        self.check_chooser(session, player, id)?;
        let cx = ResolveContext::new(self.catalog.as_ref(), &self.effects, &session.game);
        let result = session
            .stack
            .abandon_choice(id, self.config.abandon_policy, &mut session.state, &cx);
        self.after_choice(session, id, result)
    }

    // === Action plumbing ===

    fn act(
        &self,
        session: &mut MatchSession,
        action: impl FnOnce(&Self, &mut MatchSession) -> Result<ResolutionStatus>,
    ) -> Result<ResolutionStatus> {
        session.ensure_playing()?;
        if let Some(choice) = session.stack.pending_choice() {
            return Err(EngineError::ChoicePending(choice.id.raw()));
        }

        session.checkpoint = Some(session.snapshot());
        let result = action(self, session).and_then(|status| self.proceed(session, status));
        self.settle(session, result)
    }

    fn after_choice(
        &self,
        session: &mut MatchSession,
        id: ChoiceId,
        result: Result<ResolutionStatus>,
    ) -> Result<ResolutionStatus> {
        if result.is_err() && session.stack.pending_choice().is_some_and(|c| c.id == id) {
            // Answer rejected before anything resolved.
            return result;
        }
        let result = result.and_then(|status| self.proceed(session, status));
        self.settle(session, result)
    }

    /// Run stored continuations until one suspends or none remain.
    fn proceed(&self, session: &mut MatchSession, mut status: ResolutionStatus) -> Result<ResolutionStatus> {
        while status == ResolutionStatus::Complete && session.game.status == MatchStatus::Playing {
            let Some(next) = session.continuation.take() else {
                break;
            };
            status = match next {
                Continuation::Advance(step) => self.run_advance(session, step)?,
                Continuation::SettleBattle => self.settle_battle(session)?,
            };
        }
        Ok(status)
    }

    fn settle(&self, session: &mut MatchSession, result: Result<ResolutionStatus>) -> Result<ResolutionStatus> {
        match result {
            Ok(status) => {
                self.check_defeat(session);
                if session.game.status == MatchStatus::Finished {
                    session.checkpoint = None;
                    return Ok(ResolutionStatus::Complete);
                }
                if status == ResolutionStatus::Complete {
                    session.checkpoint = None;
                }
                Ok(status)
            }
            Err(err) => {
                self.recover(session, &err);
                Err(err)
            }
        }
    }

    fn recover(&self, session: &mut MatchSession, err: &EngineError) {
        session.stack.clear();
        session.continuation = None;
        let checkpoint = session.checkpoint.take();

        match self.config.stack_failure {
            StackFailurePolicy::Rollback => {
                if let Some(snapshot) = checkpoint {
                    warn!(match_id = %session.id, error = %err, "action failed, rolling back");
                    session.rollback(snapshot);
                }
            }
            StackFailurePolicy::DiscardRemaining => {
                warn!(match_id = %session.id, error = %err, "action failed, discarding remaining effects");
                session.state.take_events(session.game.phase);
                EventRouter::normalize(&mut session.state, &session.game, &self.effects, self.catalog.as_ref());
            }
        }
    }

    /// Route an event, attach any caller-chosen targets, queue, and resolve.
    fn fire(&self, session: &mut MatchSession, event: GameEvent, targets: Vec<Target>) -> Result<ResolutionStatus> {
        debug!(match_id = %session.id, kind = ?event.kind, player = %event.player, "event");
        let mut items = EventRouter::route(&event, &session.state, &session.game, &self.effects, self.catalog.as_ref());

        if !targets.is_empty() {
            let item = items
                .iter_mut()
                .find(|item| event.source.as_ref() == Some(&item.source.card_no))
                .ok_or_else(|| EngineError::InvalidTarget("this card has no effect to target".into()))?;
            item.targets = Some(targets);
        }

        let cx = ResolveContext::new(self.catalog.as_ref(), &self.effects, &session.game);
        session.stack.enqueue_batch(items, &session.state, &cx)?;
        self.resolve(session)
    }

    fn resolve(&self, session: &mut MatchSession) -> Result<ResolutionStatus> {
        let cx = ResolveContext::new(self.catalog.as_ref(), &self.effects, &session.game);
        session.stack.resolve_all(&mut session.state, &cx)
    }

    // === Legality ===

    fn check_turn(&self, session: &MatchSession, player: PlayerId) -> Result<()> {
        if !session.game.is_active(player) || session.game.battle.is_some() {
            return Err(EngineError::NotPlayersTurn(player));
        }
        Ok(())
    }

    fn check_main(&self, session: &MatchSession, player: PlayerId) -> Result<()> {
        self.check_turn(session, player)?;
        if session.game.phase != Phase::Main {
            return Err(EngineError::WrongPhase(session.game.phase));
        }
        Ok(())
    }

    fn check_defender(&self, session: &MatchSession, player: PlayerId) -> Result<Battle> {
        let battle = session.game.battle.ok_or(EngineError::NoBattle)?;
        if battle.attacker == player {
            return Err(EngineError::NotPlayersTurn(player));
        }
        Ok(battle)
    }

    fn check_chooser(&self, session: &MatchSession, player: PlayerId, id: ChoiceId) -> Result<()> {
        session.ensure_playing()?;
        let choice = session
            .stack
            .pending_choice()
            .filter(|c| c.id == id)
            .ok_or(EngineError::ChoiceNotFound(id.raw()))?;
        if choice.player != player {
            return Err(EngineError::NotPlayersTurn(player));
        }
        Ok(())
    }

    /// Supports play in the owner's main phase, or at counter timing when
    /// the card allows it. Counter-only cards never play in the main phase.
    fn check_support_timing(&self, session: &MatchSession, player: PlayerId, card: &CardAttributes) -> Result<()> {
        let own_main = TurnController::in_own_main(&session.game, player) && session.game.battle.is_none();
        let counter = card.counter
            || card.main_counter
            || self.effects.get(&card.number).is_some_and(|e| e.responds_to(Trigger::Counter));

        match (own_main, card.counter) {
            (true, false) => Ok(()),
            (false, _) if counter => Ok(()),
            _ => Err(EngineError::NotPlayable {
                card: card.number.clone(),
            }),
        }
    }

    // === Playing cards ===

    fn play(
        &self,
        session: &mut MatchSession,
        player: PlayerId,
        card_no: &CardNo,
        slot: Option<Slot>,
        targets: Vec<Target>,
    ) -> Result<ResolutionStatus> {
        let card = self.catalog.card(card_no)?.clone();
        let from_negative = if session.state.player(player).hand_contains(card_no) {
            None
        } else {
            Some(
                self.negative_energy_support(session, player, &card)
                    .ok_or_else(|| EngineError::CardNotFound(card_no.clone()))?,
            )
        };
        match card.card_type {
            CardType::Friend | CardType::Field => self.check_main(session, player)?,
            CardType::Support => self.check_support_timing(session, player, &card)?,
        }

        let slot = match (card.card_type, slot) {
            (CardType::Friend, Some(slot)) => {
                session.state.player(player).battle().check_free(slot)?;
                Some(slot)
            }
            (CardType::Friend, None) => Some(
                session
                    .state
                    .player(player)
                    .battle()
                    .first_free()
                    .ok_or_else(|| EngineError::NotPlayable { card: card_no.clone() })?,
            ),
            _ => None,
        };

        self.pay(session, player, &card)?;

        let phase = session.game.phase;
        let event = match (card.card_type, slot) {
            (CardType::Friend, Some(slot)) => {
                let rested =
                    RuleModifiers::new(&self.effects, &session.state, &session.game).enters_rested(card.cost);
                session
                    .state
                    .play_friend(player, card_no, slot, card.power, session.game.turn, rested)?;
                debug!(match_id = %session.id, card = %card_no, %slot, rested, "friend played");
                GameEvent::new(EventKind::FriendPlayed, player, phase)
                    .with_source(card_no.clone())
                    .with_source_slot(slot)
            }
            (CardType::Field, _) => {
                if let Some(old) = session.state.place_field_card(player, card_no)? {
                    debug!(match_id = %session.id, replaced = %old, "field card replaced");
                }
                GameEvent::new(EventKind::FieldPlayed, player, phase).with_source(card_no.clone())
            }
            _ => {
                match from_negative {
                    Some(index) => {
                        session.state.negative_energy_to_deck(player, index, DeckPosition::Bottom)?;
                        session.state.take_damage(player, 1)?;
                        debug!(match_id = %session.id, card = %card_no, "support played from negative energy");
                    }
                    None => {
                        session.state.discard_from_hand(player, card_no)?;
                        debug!(match_id = %session.id, card = %card_no, "support played");
                    }
                }
                GameEvent::new(EventKind::SupportPlayed, player, phase).with_source(card_no.clone())
            }
        };

        self.fire(session, event, targets)
    }

    /// Negative-energy index of a support `player` may play from there.
    fn negative_energy_support(&self, session: &MatchSession, player: PlayerId, card: &CardAttributes) -> Option<usize> {
        if card.card_type != CardType::Support {
            return None;
        }
        if !RuleModifiers::new(&self.effects, &session.state, &session.game).supports_from_negative_energy(player) {
            return None;
        }
        session
            .state
            .player(player)
            .negative_energy()
            .iter()
            .position(|n| n.card_no == card.number)
    }

    /// Rest energy covering the card's effective cost.
    fn pay(&self, session: &mut MatchSession, player: PlayerId, card: &CardAttributes) -> Result<()> {
        if !self.config.enforce_costs {
            return Ok(());
        }
        let cost = RuleModifiers::new(&self.effects, &session.state, &session.game).effective_cost(player, card);
        let indices = select_energy(session.state.player(player).energy(), cost, &card.color_cost).ok_or_else(
            || EngineError::InsufficientEnergy {
                card: card.number.clone(),
                cost,
            },
        )?;
        if !indices.is_empty() {
            session.state.rest_energy(player, &indices)?;
        }
        debug!(card = %card.number, cost, paid = indices.len(), "cost paid");
        Ok(())
    }

    // === Combat ===

    fn settle_battle(&self, session: &mut MatchSession) -> Result<ResolutionStatus> {
        let Some(battle) = session.game.battle.take() else {
            return Ok(ResolutionStatus::Complete);
        };
        let Some(attacker) = session.state.player(battle.attacker).battle().get(battle.attacker_slot) else {
            debug!(match_id = %session.id, "attacker left play, attack ends");
            return Ok(ResolutionStatus::Complete);
        };
        let attacker_card = attacker.card_no.clone();
        let attacker_power = attacker.power();
        let defender = battle.attacker.opponent();

        match battle.target {
            AttackTarget::Player => {
                let extra = RuleModifiers::new(&self.effects, &session.state, &session.game)
                    .extra_damage(battle.attacker, battle.attacker_slot);
                let amount = 1 + usize::try_from(extra).unwrap_or(usize::MAX);
                self.deal_damage(session, battle.attacker, amount, attacker_card)
            }
            AttackTarget::Friend(slot) => {
                let Some(defending) = session.state.player(defender).battle().get(slot) else {
                    debug!(match_id = %session.id, %slot, "defending friend left play, attack ends");
                    return Ok(ResolutionStatus::Complete);
                };
                let defending_power = defending.power();
                debug!(match_id = %session.id, attacker_power, defending_power, "battle");

                if attacker_power <= defending_power {
                    session.state.destroy_friend(battle.attacker, battle.attacker_slot)?;
                }
                if defending_power <= attacker_power {
                    session.state.destroy_friend(defender, slot)?;
                }
                self.resolve(session)
            }
        }
    }

    /// Damage `dealer`'s opponent. The event is attributed to the dealer.
    fn deal_damage(
        &self,
        session: &mut MatchSession,
        dealer: PlayerId,
        amount: usize,
        source: CardNo,
    ) -> Result<ResolutionStatus> {
        let victim = dealer.opponent();
        match session.state.take_damage(victim, amount) {
            Ok(()) => {}
            Err(EngineError::DeckEmpty { .. }) => {
                info!(match_id = %session.id, player = %victim, "cannot take damage");
                self.declare_winner(session, dealer);
                return Ok(ResolutionStatus::Complete);
            }
            Err(err) => return Err(err),
        }
        debug!(match_id = %session.id, player = %victim, amount, "damage dealt");

        let event = GameEvent::new(EventKind::DamageDealt, dealer, session.game.phase)
            .with_source(source)
            .with_data("amount", amount)
            .with_data("victim", victim);
        self.fire(session, event, Vec::new())
    }

    // === Turn structure ===

    fn run_advance(&self, session: &mut MatchSession, step: AdvanceStep) -> Result<ResolutionStatus> {
        match step {
            AdvanceStep::Transition => {
                let previous = session.game.active_player;
                let transition = TurnController::advance(&mut session.game);
                debug!(match_id = %session.id, from = %transition.from, to = %transition.to, "phase advanced");

                if !transition.wrapped {
                    return self.run_advance(session, AdvanceStep::PhaseStart);
                }
                session.state.expire_turn_modifiers();
                info!(
                    match_id = %session.id,
                    turn = session.game.turn,
                    active = %session.game.active_player,
                    "turn started"
                );
                session.continuation = Some(Continuation::Advance(AdvanceStep::TurnStart));
                self.fire(session, GameEvent::new(EventKind::TurnEnd, previous, Phase::End), Vec::new())
            }
            AdvanceStep::TurnStart => {
                session.continuation = Some(Continuation::Advance(AdvanceStep::PhaseStart));
                let event = GameEvent::new(EventKind::TurnStart, session.game.active_player, Phase::Start);
                self.fire(session, event, Vec::new())
            }
            AdvanceStep::PhaseStart => {
                session.continuation = Some(Continuation::Advance(AdvanceStep::PhaseActions));
                let event = GameEvent::new(EventKind::PhaseStart, session.game.active_player, session.game.phase);
                self.fire(session, event, Vec::new())
            }
            AdvanceStep::PhaseActions => self.phase_actions(session),
        }
    }

    /// Automatic actions at the start of a phase. Friends marked to leave
    /// at end of turn are destroyed on entering the End phase.
    fn phase_actions(&self, session: &mut MatchSession) -> Result<ResolutionStatus> {
        if session.game.phase == Phase::End {
            for (player, card) in session.state.destroy_leaving_friends() {
                debug!(match_id = %session.id, %player, %card, "friend left at end of turn");
            }
        }
        if !self.config.phase_actions {
            return self.resolve(session);
        }
        let active = session.game.active_player;

        match session.game.phase {
            Phase::Start => session.state.ready_all(active),
            Phase::Draw if session.game.turn > 1 => match session.state.draw(active, 1) {
                Ok(()) => {}
                Err(EngineError::DeckEmpty { .. }) => {
                    info!(match_id = %session.id, player = %active, "deck out");
                    self.declare_winner(session, active.opponent());
                    return Ok(ResolutionStatus::Complete);
                }
                Err(err) => return Err(err),
            },
            Phase::Energy => {
                if !session.state.player(active).deck().is_empty() {
                    let charged = session.state.charge_energy(active, self.catalog.as_ref())?;
                    debug!(match_id = %session.id, player = %active, card = %charged, "energy charged");
                }
            }
            _ => {}
        }
        self.resolve(session)
    }

    fn check_defeat(&self, session: &mut MatchSession) {
        if session.game.status != MatchStatus::Playing {
            return;
        }
        let loser = PlayerId::both()
            .find(|&p| session.state.player(p).negative_energy().len() >= self.config.defeat_threshold);
        if let Some(loser) = loser {
            self.declare_winner(session, loser.opponent());
        }
    }

    fn declare_winner(&self, session: &mut MatchSession, winner: PlayerId) {
        session.game.finish(winner);
        session.stack.clear();
        session.continuation = None;
        info!(match_id = %session.id, %winner, turn = session.game.turn, "match finished");
    }
}

fn find_friend(state: &GameState, player: PlayerId, slot: Slot) -> Result<&FriendInstance> {
    state
        .player(player)
        .battle()
        .get(slot)
        .ok_or_else(|| EngineError::FriendNotFound {
            player,
            friend: slot.to_string(),
        })
}

/// Indices of active energy paying `cost`, colored requirements first.
fn select_energy(energy: &Vector<EnergyCardInstance>, cost: u32, colors: &ColorCost) -> Option<Vec<usize>> {
    let mut used = vec![false; energy.len()];
    let mut picked = Vec::new();
    let take = |used: &mut Vec<bool>, color: Option<Color>| {
        let index = energy
            .iter()
            .enumerate()
            .find(|(i, e)| !used[*i] && !e.rested && color.map_or(true, |c| e.color == c))
            .map(|(i, _)| i)?;
        used[index] = true;
        Some(index)
    };

    for color in [Color::Red, Color::Blue, Color::Yellow, Color::Green] {
        for _ in 0..colors.of(color) {
            picked.push(take(&mut used, Some(color))?);
        }
    }
    let total = usize::try_from(cost.max(colors.colored_total())).ok()?;
    while picked.len() < total {
        picked.push(take(&mut used, None)?);
    }
    Some(picked)
}
