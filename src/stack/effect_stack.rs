//! LIFO effect stack with chain reactions.
//!
//! Items resolve strictly last-in first-out. Events raised while an item
//! applies are routed immediately and their reactions are pushed on top,
//! so a chain reaction finishes before anything older resolves.
//!
//! An item that needs input suspends the whole stack: it stays on top, a
//! `PendingChoice` is recorded, and nothing below it resolves until the
//! choice is answered or abandoned.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, warn};

use super::choice::{ChoiceId, ChoiceKind, PendingChoice, Selection};
use super::{ResolutionStatus, ResolveContext};
use crate::core::{AbandonPolicy, GameState, PlayerId};
use crate::effects::{Effect, EffectContext, SourceCard, Target, TargetValidator};
use crate::error::{EngineError, Result};
use crate::mutations::GameMutations;
use crate::triggers::{EventRouter, GameEvent};

/// Unique identifier for a stack item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackItemId(pub u32);

impl std::fmt::Display for StackItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackItem({})", self.0)
    }
}

/// An activated effect waiting to resolve.
#[derive(Clone, Debug)]
pub struct EffectStackItem {
    /// Assigned when the item is pushed.
    pub id: StackItemId,
    pub effect: Arc<Effect>,
    pub source: SourceCard,
    /// The event that activated the effect, if any.
    pub event: Option<GameEvent>,
    /// `None` until targets are chosen or auto-selected.
    pub targets: Option<Vec<Target>>,
    pub option: Option<usize>,
    /// Within one batch of reactions, higher resolves first.
    pub priority: i32,
    /// Targets were picked at enqueue rather than by a player, so they are
    /// picked again against the board when the item reaches the top.
    auto_targets: bool,
}

impl EffectStackItem {
    #[must_use]
    pub fn new(effect: Arc<Effect>, source: SourceCard, event: Option<GameEvent>) -> Self {
        Self {
            id: StackItemId(0),
            effect,
            source,
            event,
            targets: None,
            option: None,
            priority: 0,
            auto_targets: false,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = Some(targets);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn context<'a>(&'a self, cx: &ResolveContext<'a>) -> EffectContext<'a> {
        EffectContext::new(cx.catalog, cx.game, &self.source)
            .with_event(self.event.as_ref())
            .with_option(self.option)
    }
}

/// Question raised by the top item, before it gets an id.
struct Question {
    player: PlayerId,
    kind: ChoiceKind,
    mandatory: bool,
    prompt: String,
}

#[derive(Clone, Debug, Default)]
pub struct EffectStack {
    /// Index 0 is the bottom.
    items: Vec<EffectStackItem>,
    pending: Option<PendingChoice>,
    next_item: u32,
    next_choice: u32,
}

impl EffectStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an item, assigning its id.
    pub fn push(&mut self, mut item: EffectStackItem) -> StackItemId {
        item.id = StackItemId(self.next_item);
        self.next_item += 1;
        debug!(item = %item.id, card = %item.source.card_no, "pushed effect");
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Push a batch given in resolution order: the first item ends up on top.
    pub fn push_batch(&mut self, items: Vec<EffectStackItem>) {
        for item in by_resolution_order(items) {
            self.push(item);
        }
    }

    /// Validate and push an effect.
    ///
    /// Returns `Ok(None)` when the effect cannot activate. Supplied targets
    /// are validated now. Without them, targets are picked when no real
    /// choice exists; otherwise the item asks when it reaches the top.
    pub fn queue(
        &mut self,
        effect: Arc<Effect>,
        source: SourceCard,
        event: Option<GameEvent>,
        targets: Option<Vec<Target>>,
        state: &GameState,
        cx: &ResolveContext<'_>,
    ) -> Result<Option<StackItemId>> {
        let mut item = EffectStackItem::new(effect, source, event);
        item.targets = targets;
        self.enqueue(item, state, cx)
    }

    /// [`queue`](Self::queue) for an item built elsewhere, such as by the
    /// router.
    pub fn enqueue(
        &mut self,
        mut item: EffectStackItem,
        state: &GameState,
        cx: &ResolveContext<'_>,
    ) -> Result<Option<StackItemId>> {
        let picked = {
            let ctx = item.context(cx);
            if !item.effect.can_activate(state, &ctx) {
                debug!(card = %item.source.card_no, "effect cannot activate, not queued");
                return Ok(None);
            }
            let requirement = item.effect.requirement(&ctx);
            let candidates = item.effect.candidate_targets(state, &ctx);
            match &item.targets {
                Some(chosen) => {
                    TargetValidator::validate(chosen, &candidates, &requirement)?;
                    None
                }
                None => TargetValidator::auto_select(&candidates, &requirement),
            }
        };
        if picked.is_some() {
            item.targets = picked;
            item.auto_targets = true;
        }
        Ok(Some(self.push(item)))
    }

    /// [`enqueue`](Self::enqueue) a batch given in resolution order.
    ///
    /// Stops at the first item whose supplied targets are rejected; items
    /// already pushed stay.
    pub fn enqueue_batch(
        &mut self,
        items: Vec<EffectStackItem>,
        state: &GameState,
        cx: &ResolveContext<'_>,
    ) -> Result<()> {
        for item in by_resolution_order(items) {
            self.enqueue(item, state, cx)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The item that resolves next.
    #[must_use]
    pub fn peek(&self) -> Option<&EffectStackItem> {
        self.items.last()
    }

    /// Items from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &EffectStackItem> {
        self.items.iter().rev()
    }

    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.pending.as_ref()
    }

    /// Drop every item and any pending choice.
    pub fn clear(&mut self) {
        self.items.clear();
        self.pending = None;
    }

    /// Resolve until the stack is empty or a choice is needed.
    ///
    /// On an apply error the failing item is discarded, the items below it
    /// stay, and the error is returned.
    pub fn resolve_all(&mut self, state: &mut GameState, cx: &ResolveContext<'_>) -> Result<ResolutionStatus> {
        // Events raised outside resolution (combat, phase actions) react first.
        if self.pending.is_none() {
            self.react(state, cx)?;
        }
        loop {
            if let Some(choice) = &self.pending {
                return Ok(ResolutionStatus::AwaitingChoice(choice.id));
            }
            let Some(top) = self.items.last_mut() else {
                return Ok(ResolutionStatus::Complete);
            };

            // Earlier resolutions may have removed what this item needed.
            if !top.effect.can_activate(state, &top.context(cx)) {
                debug!(item = %top.id, card = %top.source.card_no, "effect no longer applicable, skipped");
                self.items.pop();
                continue;
            }

            if let Some(question) = Self::prepare(top, state, cx) {
                return Ok(ResolutionStatus::AwaitingChoice(self.raise(question)));
            }

            let Some(item) = self.items.pop() else {
                continue;
            };
            let ctx = item.context(cx);
            let targets = item.targets.as_deref().unwrap_or(&[]);
            debug!(item = %item.id, card = %item.source.card_no, targets = targets.len(), "resolving effect");
            if let Err(err) = item.effect.apply(state, &ctx, targets) {
                warn!(item = %item.id, card = %item.source.card_no, error = %err, "effect failed to resolve");
                return Err(err);
            }
            self.react(state, cx)?;
        }
    }

    /// Recompute persistent effects, then route events raised by the last
    /// apply and queue their reactions.
    fn react(&mut self, state: &mut GameState, cx: &ResolveContext<'_>) -> Result<()> {
        EventRouter::normalize(state, cx.game, cx.effects, cx.catalog);
        let events = state.take_events(cx.game.phase());
        // Reverse so reactions to the earliest event end up on top.
        for event in events.iter().rev() {
            let reactions = EventRouter::route(event, state, cx.game, cx.effects, cx.catalog);
            self.enqueue_batch(reactions, state, cx)?;
        }
        Ok(())
    }

    /// Fill in targets and options the top item can settle without a player.
    fn prepare(item: &mut EffectStackItem, state: &GameState, cx: &ResolveContext<'_>) -> Option<Question> {
        let ctx = EffectContext::new(cx.catalog, cx.game, &item.source).with_event(item.event.as_ref());
        let player = item.source.controller;

        if item.auto_targets {
            item.targets = None;
            item.auto_targets = false;
        }
        if item.targets.is_none() {
            let requirement = item.effect.requirement(&ctx);
            let candidates = item.effect.candidate_targets(state, &ctx);
            match TargetValidator::auto_select(&candidates, &requirement) {
                Some(selection) => item.targets = Some(selection),
                None => {
                    return Some(Question {
                        player,
                        mandatory: requirement.mandatory,
                        prompt: requirement.prompt.clone(),
                        kind: ChoiceKind::Target {
                            candidates,
                            requirement,
                        },
                    })
                }
            }
        }

        if item.option.is_none() && item.effect.needs_option(state, &ctx) {
            if let Some(labels) = item.effect.choice_options() {
                return Some(Question {
                    player,
                    mandatory: true,
                    prompt: format!("Choose an option for {}", item.source.card_no),
                    kind: ChoiceKind::Option { labels },
                });
            }
        }
        None
    }

    fn raise(&mut self, question: Question) -> ChoiceId {
        let id = ChoiceId::new(self.next_choice);
        self.next_choice += 1;
        debug!(choice = %id, player = %question.player, prompt = %question.prompt, "awaiting choice");
        self.pending = Some(PendingChoice {
            id,
            player: question.player,
            kind: question.kind,
            mandatory: question.mandatory,
            prompt: question.prompt,
        });
        id
    }

    /// Answer the pending choice and resume resolution.
    pub fn submit_choice(
        &mut self,
        id: ChoiceId,
        selection: Selection,
        state: &mut GameState,
        cx: &ResolveContext<'_>,
    ) -> Result<ResolutionStatus> {
        let choice = self
            .pending
            .as_ref()
            .filter(|c| c.id == id)
            .ok_or(EngineError::ChoiceNotFound(id.raw()))?;
        let item = self.items.last_mut().ok_or(EngineError::ChoiceNotFound(id.raw()))?;

        match (&choice.kind, selection) {
            (ChoiceKind::Target { requirement, .. }, Selection::Targets(chosen)) => {
                let ctx = EffectContext::new(cx.catalog, cx.game, &item.source).with_event(item.event.as_ref());
                let candidates = item.effect.candidate_targets(state, &ctx);
                TargetValidator::validate(&chosen, &candidates, requirement)?;
                item.targets = Some(chosen);
            }
            (ChoiceKind::Option { labels }, Selection::Option(index)) => {
                if index >= labels.len() {
                    return Err(EngineError::InvalidOption {
                        index,
                        count: labels.len(),
                    });
                }
                item.option = Some(index);
            }
            (ChoiceKind::Target { .. }, Selection::Option(_)) => {
                return Err(EngineError::InvalidTarget(format!("{id} expects targets")));
            }
            (ChoiceKind::Option { labels }, Selection::Targets(_)) => {
                return Err(EngineError::InvalidOption {
                    index: labels.len(),
                    count: labels.len(),
                });
            }
        }

        debug!(choice = %id, "choice answered");
        self.pending = None;
        self.resolve_all(state, cx)
    }

    /// Give up on the pending choice.
    ///
    /// The waiting item is always dropped. Under `FailMandatory`, abandoning
    /// a mandatory choice fails with `ChoiceAbandoned` and leaves the rest
    /// of the stack for the caller to recover. Otherwise the item counts as
    /// a no-op and resolution continues.
    pub fn abandon_choice(
        &mut self,
        id: ChoiceId,
        policy: AbandonPolicy,
        state: &mut GameState,
        cx: &ResolveContext<'_>,
    ) -> Result<ResolutionStatus> {
        let choice = self
            .pending
            .as_ref()
            .filter(|c| c.id == id)
            .ok_or(EngineError::ChoiceNotFound(id.raw()))?;
        let fail = choice.mandatory && policy == AbandonPolicy::FailMandatory;
        warn!(choice = %id, player = %choice.player, mandatory = choice.mandatory, "choice abandoned, skipping effect");
        self.pending = None;
        self.items.pop();
        if fail {
            return Err(EngineError::ChoiceAbandoned(id.raw()));
        }
        self.resolve_all(state, cx)
    }
}

/// Highest priority first; ties keep their given order.
fn by_resolution_order(mut items: Vec<EffectStackItem>) -> impl Iterator<Item = EffectStackItem> {
    items.sort_by_key(|item| Reverse(item.priority));
    items.into_iter().rev()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardAttributes, CardNo, CardRegistry, Color};
    use crate::core::Match;
    use crate::effects::{EffectCatalog, EffectKind, Side};
    use crate::triggers::Trigger;
    use crate::zones::Slot;

    fn draw_item(controller: PlayerId) -> EffectStackItem {
        EffectStackItem::new(
            Arc::new(Effect::new(Trigger::Main, EffectKind::Draw { count: 1 })),
            SourceCard::new("T-001", controller, None),
            None,
        )
    }

    fn state() -> GameState {
        let deck = |p: &str| (0..5).map(move |i| CardNo::new(format!("{p}-{i}"))).collect::<Vec<_>>();
        GameState::new(deck("A"), deck("B"), 3)
    }

    #[test]
    fn test_push_assigns_ids_and_peek_is_top() {
        let mut stack = EffectStack::new();
        let first = stack.push(draw_item(PlayerId::ONE));
        let second = stack.push(draw_item(PlayerId::TWO));

        assert_ne!(first, second);
        assert_eq!(stack.peek().map(|i| i.id), Some(second));
        assert_eq!(stack.iter().map(|i| i.id).collect::<Vec<_>>(), vec![second, first]);
    }

    #[test]
    fn test_push_batch_first_on_top() {
        let mut stack = EffectStack::new();
        stack.push_batch(vec![draw_item(PlayerId::ONE), draw_item(PlayerId::TWO)]);
        assert_eq!(stack.peek().unwrap().source.controller, PlayerId::ONE);
    }

    #[test]
    fn test_push_batch_respects_priority() {
        let mut stack = EffectStack::new();
        stack.push_batch(vec![draw_item(PlayerId::ONE), draw_item(PlayerId::TWO).with_priority(5)]);
        assert_eq!(stack.peek().unwrap().source.controller, PlayerId::TWO);
    }

    #[test]
    fn test_resolve_all_empties_stack() {
        let registry = CardRegistry::new();
        let effects = EffectCatalog::new();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut state = state();
        let mut stack = EffectStack::new();
        stack.push(draw_item(PlayerId::ONE));
        stack.push(draw_item(PlayerId::ONE));

        let status = stack.resolve_all(&mut state, &cx).unwrap();

        assert_eq!(status, ResolutionStatus::Complete);
        assert!(stack.is_empty());
        assert_eq!(state.player(PlayerId::ONE).hand().len(), 2);
    }

    #[test]
    fn test_failed_item_dropped_rest_kept() {
        let registry = CardRegistry::new();
        let effects = EffectCatalog::new();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut state = state();
        let mut stack = EffectStack::new();
        stack.push(draw_item(PlayerId::ONE));
        let bogus = Target::card(crate::zones::Location::Hand(PlayerId::TWO), CardNo::new("B-0"));
        stack.push(draw_item(PlayerId::ONE).with_targets(vec![bogus]));

        let err = stack.resolve_all(&mut state, &cx).unwrap_err();

        assert!(matches!(err, EngineError::InvalidTarget(_)));
        assert_eq!(stack.len(), 1);
        assert!(state.player(PlayerId::ONE).hand().is_empty());
    }

    #[test]
    fn test_inapplicable_item_skipped() {
        let registry = CardRegistry::new();
        let effects = EffectCatalog::new();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut state = state();
        let mut stack = EffectStack::new();
        stack.push(draw_item(PlayerId::ONE));
        stack.push(EffectStackItem::new(
            Arc::new(Effect::new(Trigger::Main, EffectKind::Draw { count: 9 })),
            SourceCard::new("T-002", PlayerId::ONE, None),
            None,
        ));

        let status = stack.resolve_all(&mut state, &cx).unwrap();

        assert_eq!(status, ResolutionStatus::Complete);
        assert_eq!(state.player(PlayerId::ONE).hand().len(), 1);
    }

    /// Player two's `H-001` gains 1000 per card in hand; `Y-001` draws two
    /// when destroyed.
    fn chain_board() -> (CardRegistry, EffectCatalog, GameState) {
        let registry: CardRegistry = [
            CardAttributes::friend("H-001", "Hoarder", Color::Green, 2, 2000),
            CardAttributes::friend("Y-001", "Yielder", Color::Red, 1, 1000),
        ]
        .into_iter()
        .collect();
        let mut effects = EffectCatalog::new();
        effects.register(
            "H-001",
            Effect::new(
                Trigger::Persistent,
                EffectKind::HandSizePowerBoost {
                    cards_per_step: 1,
                    amount: 1000,
                },
            ),
        );
        effects.register("Y-001", Effect::new(Trigger::OnDestroy, EffectKind::Draw { count: 2 }));

        let two = ["H-001", "Y-001", "B-0", "B-1", "B-2"].map(CardNo::new);
        let one = (0..5).map(|i| CardNo::new(format!("A-{i}")));
        let mut state = GameState::new(one, two, 3);
        state.draw(PlayerId::TWO, 2).unwrap();
        state
            .play_friend(PlayerId::TWO, &CardNo::new("H-001"), Slot::new(0), 2000, 1, false)
            .unwrap();
        state
            .play_friend(PlayerId::TWO, &CardNo::new("Y-001"), Slot::new(1), 1000, 1, false)
            .unwrap();
        (registry, effects, state)
    }

    fn destroy_item(max_power: u32) -> EffectStackItem {
        EffectStackItem::new(
            Arc::new(Effect::new(
                Trigger::Main,
                EffectKind::DestroyFriend {
                    max_power,
                    mandatory: true,
                },
            )),
            SourceCard::new("T-003", PlayerId::ONE, None),
            None,
        )
    }

    #[test]
    fn test_persistent_power_recomputed_between_chain_links() {
        let (registry, effects, mut state) = chain_board();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut stack = EffectStack::new();

        let yielder = Target::friend(
            PlayerId::TWO,
            Slot::new(1),
            state.player(PlayerId::TWO).battle().get(Slot::new(1)).unwrap(),
        );
        stack.push(destroy_item(3000));
        stack.push(destroy_item(5000).with_targets(vec![yielder]));

        let status = stack.resolve_all(&mut state, &cx).unwrap();

        assert_eq!(status, ResolutionStatus::Complete);
        let zones = state.player(PlayerId::TWO);
        assert_eq!(zones.hand().len(), 2);
        assert_eq!(zones.battle().get(Slot::new(0)).map(|f| f.power()), Some(4000));
        assert!(zones.battle().get(Slot::new(1)).is_none());
    }

    #[test]
    fn test_abandon_mandatory_drops_item_and_fails() {
        let (registry, effects, mut state) = chain_board();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut stack = EffectStack::new();
        stack.push(draw_item(PlayerId::ONE));
        stack.push(destroy_item(3000));

        let ResolutionStatus::AwaitingChoice(id) = stack.resolve_all(&mut state, &cx).unwrap() else {
            panic!("two candidates should ask");
        };
        assert!(stack.pending_choice().unwrap().mandatory);

        let err = stack
            .abandon_choice(id, AbandonPolicy::FailMandatory, &mut state, &cx)
            .unwrap_err();

        assert_eq!(err, EngineError::ChoiceAbandoned(id.raw()));
        assert!(stack.pending_choice().is_none());
        assert_eq!(stack.len(), 1);
        assert_eq!(state.player(PlayerId::TWO).battle().len(), 2);
    }

    #[test]
    fn test_queue_picks_targets_without_a_real_choice() {
        let (registry, effects, mut state) = chain_board();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut stack = EffectStack::new();
        let destroy = |max_power| {
            Arc::new(Effect::new(
                Trigger::Main,
                EffectKind::DestroyFriend {
                    max_power,
                    mandatory: true,
                },
            ))
        };
        let source = || SourceCard::new("T-003", PlayerId::ONE, None);

        let only = stack
            .queue(destroy(1000), source(), None, None, &state, &cx)
            .unwrap()
            .unwrap();
        let picked = stack.peek().and_then(|item| item.targets.clone()).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, CardNo::new("Y-001"));

        stack.queue(destroy(3000), source(), None, None, &state, &cx).unwrap();
        assert!(stack.peek().unwrap().targets.is_none());
        assert_ne!(stack.peek().unwrap().id, only);

        assert_eq!(stack.queue(destroy(500), source(), None, None, &state, &cx).unwrap(), None);
        let stray = Target::field(PlayerId::TWO, CardNo::new("F-095"));
        assert!(matches!(
            stack.queue(destroy(3000), source(), None, Some(vec![stray]), &state, &cx),
            Err(EngineError::InvalidTarget(_))
        ));
        assert_eq!(stack.len(), 2);

        let status = stack.resolve_all(&mut state, &cx).unwrap();
        assert!(matches!(status, ResolutionStatus::AwaitingChoice(_)));
    }

    #[test]
    fn test_queued_targets_refreshed_at_resolution() {
        let (registry, effects, mut state) = chain_board();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut stack = EffectStack::new();
        let bounce = Arc::new(Effect::new(
            Trigger::Main,
            EffectKind::ReturnToHand {
                side: Side::Opponent,
                max_cost: None,
                max_power: Some(1000),
                mandatory: true,
            },
        ));

        stack
            .queue(bounce, SourceCard::new("T-004", PlayerId::ONE, None), None, None, &state, &cx)
            .unwrap();
        assert_eq!(stack.peek().unwrap().targets.as_ref().map(Vec::len), Some(1));

        // A second friend qualifies before the item resolves.
        state.modify_power(PlayerId::TWO, Slot::new(0), -1000).unwrap();
        let status = stack.resolve_all(&mut state, &cx).unwrap();

        assert!(matches!(status, ResolutionStatus::AwaitingChoice(_)));
        assert_eq!(stack.pending_choice().unwrap().candidates().len(), 2);
    }

    #[test]
    fn test_unknown_choice_rejected() {
        let registry = CardRegistry::new();
        let effects = EffectCatalog::new();
        let game = Match::new();
        let cx = ResolveContext::new(&registry, &effects, &game);
        let mut state = state();
        let mut stack = EffectStack::new();

        let err = stack
            .submit_choice(ChoiceId::new(7), Selection::Option(0), &mut state, &cx)
            .unwrap_err();
        assert_eq!(err, EngineError::ChoiceNotFound(7));
    }
}
