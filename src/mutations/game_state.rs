//! `GameMutations` for the real game state.

use im::Vector;

use super::{FriendRef, GameMutations, Pile};
use crate::cards::{CardCatalog, CardNo, EnergyCardInstance, FriendInstance, ModifierDuration, NegativeEnergyCard, PowerModifier, SourceKey};
use crate::core::{GameState, Phase, PlayerId, PlayerState};
use crate::error::{EngineError, Result};
use crate::triggers::{EventKind, GameEvent};
use crate::zones::{DeckPosition, Slot};

impl GameState {
    /// Resolve a friend reference to an occupied slot.
    pub fn locate_friend(&self, player: PlayerId, friend: &FriendRef) -> Result<Slot> {
        let battle = self.player(player).battle();
        let found = match friend {
            FriendRef::Card(no) => battle.find(no),
            FriendRef::Slot(slot) => battle.get(*slot).map(|_| *slot),
        };
        found.ok_or_else(|| EngineError::FriendNotFound {
            player,
            friend: friend.to_string(),
        })
    }

    fn friend_mut(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<&mut FriendInstance> {
        let slot = self.locate_friend(player, &friend.into())?;
        self.player_mut(player)
            .battle
            .get_mut(slot)
            .ok_or(EngineError::InvalidSlot(slot))
    }
}

fn split_top(deck: &mut Vector<CardNo>, count: usize) -> Result<Vector<CardNo>> {
    if deck.len() < count {
        return Err(EngineError::DeckEmpty {
            requested: count,
            available: deck.len(),
        });
    }
    let rest = deck.split_off(count);
    Ok(std::mem::replace(deck, rest))
}

fn take_from_hand(zones: &mut PlayerState, card_no: &CardNo) -> Result<CardNo> {
    zones
        .take_from_hand(card_no)
        .ok_or_else(|| EngineError::CardNotFound(card_no.clone()))
}

fn take_from_trash(zones: &mut PlayerState, card_no: &CardNo) -> Result<CardNo> {
    zones
        .take_from_trash(card_no)
        .ok_or_else(|| EngineError::CardNotFound(card_no.clone()))
}

fn put_in_deck(zones: &mut PlayerState, card: CardNo, position: DeckPosition) {
    match position {
        DeckPosition::Top => zones.deck.push_front(card),
        DeckPosition::Bottom => zones.deck.push_back(card),
    }
}

impl GameMutations for GameState {
    fn draw(&mut self, player: PlayerId, count: usize) -> Result<()> {
        let zones = self.player_mut(player);
        let drawn = split_top(&mut zones.deck, count)?;
        zones.hand.append(drawn);
        Ok(())
    }

    fn mill(&mut self, player: PlayerId, count: usize) -> Result<Vec<CardNo>> {
        let zones = self.player_mut(player);
        let milled = split_top(&mut zones.deck, count)?;
        zones.trash.append(milled.clone());
        Ok(milled.into_iter().collect())
    }

    fn move_card_to_deck(&mut self, player: PlayerId, card_no: &CardNo, from: Pile, position: DeckPosition) -> Result<()> {
        let zones = self.player_mut(player);
        let card = match from {
            Pile::Hand => take_from_hand(zones, card_no)?,
            Pile::Trash => take_from_trash(zones, card_no)?,
        };
        put_in_deck(zones, card, position);
        Ok(())
    }

    fn deck_top_to_bottom(&mut self, player: PlayerId) -> Result<CardNo> {
        let zones = self.player_mut(player);
        let card = zones
            .deck
            .pop_front()
            .ok_or(EngineError::DeckEmpty { requested: 1, available: 0 })?;
        zones.deck.push_back(card.clone());
        Ok(card)
    }

    fn keep_from_top(&mut self, player: PlayerId, look: usize, keep: &[usize]) -> Result<()> {
        for (i, depth) in keep.iter().enumerate() {
            if *depth >= look || keep[..i].contains(depth) {
                return Err(EngineError::InvalidTarget(format!("deck depth {depth}")));
            }
        }
        let zones = self.player_mut(player);
        let top = split_top(&mut zones.deck, look)?;
        for (depth, card) in top.into_iter().enumerate() {
            if keep.contains(&depth) {
                zones.hand.push_back(card);
            } else {
                zones.trash.push_back(card);
            }
        }
        Ok(())
    }

    fn discard_from_hand(&mut self, player: PlayerId, card_no: &CardNo) -> Result<()> {
        let zones = self.player_mut(player);
        let card = take_from_hand(zones, card_no)?;
        zones.trash.push_back(card);
        Ok(())
    }

    fn return_from_trash(&mut self, player: PlayerId, card_no: &CardNo) -> Result<()> {
        let zones = self.player_mut(player);
        let card = take_from_trash(zones, card_no)?;
        zones.hand.push_back(card);
        Ok(())
    }

    fn play_friend(
        &mut self,
        player: PlayerId,
        card_no: &CardNo,
        slot: Slot,
        power: u32,
        turn: u32,
        rested: bool,
    ) -> Result<()> {
        let zones = self.player_mut(player);
        zones.battle.check_free(slot)?;
        let card = take_from_hand(zones, card_no)?;
        let mut friend = FriendInstance::new(card, power, turn);
        friend.rested = rested;
        zones.battle.place(slot, friend)
    }

    fn revive_friend(&mut self, player: PlayerId, card_no: &CardNo, slot: Slot, power: u32, turn: u32) -> Result<()> {
        let zones = self.player_mut(player);
        zones.battle.check_free(slot)?;
        let card = take_from_trash(zones, card_no)?;
        let mut friend = FriendInstance::new(card, power, turn).rested();
        friend.leaves_at_end = true;
        zones.battle.place(slot, friend)
    }

    fn destroy_leaving_friends(&mut self) -> Vec<(PlayerId, CardNo)> {
        let leaving: Vec<(PlayerId, Slot)> = PlayerId::both()
            .flat_map(|player| {
                self.player(player)
                    .battle()
                    .iter()
                    .filter(|(_, f)| f.leaves_at_end)
                    .map(move |(slot, _)| (player, slot))
                    .collect::<Vec<_>>()
            })
            .collect();
        leaving
            .into_iter()
            .filter_map(|(player, slot)| self.destroy_friend(player, slot).ok().map(|card| (player, card)))
            .collect()
    }

    fn destroy_friend(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<CardNo> {
        let slot = self.locate_friend(player, &friend.into())?;
        let zones = self.player_mut(player);
        let removed = zones.battle.remove(slot).ok_or(EngineError::InvalidSlot(slot))?;
        zones.trash.push_back(removed.card_no.clone());

        self.events.push(
            GameEvent::new(EventKind::FriendDestroyed, player, Phase::Start)
                .with_source(removed.card_no.clone())
                .with_source_slot(slot),
        );
        Ok(removed.card_no)
    }

    fn return_to_hand(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<CardNo> {
        let slot = self.locate_friend(player, &friend.into())?;
        let zones = self.player_mut(player);
        let removed = zones.battle.remove(slot).ok_or(EngineError::InvalidSlot(slot))?;
        zones.hand.push_back(removed.card_no.clone());
        Ok(removed.card_no)
    }

    fn rest(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<()> {
        self.friend_mut(player, friend)?.rested = true;
        Ok(())
    }

    fn activate(&mut self, player: PlayerId, friend: impl Into<FriendRef>) -> Result<()> {
        self.friend_mut(player, friend)?.rested = false;
        Ok(())
    }

    fn modify_power(&mut self, player: PlayerId, friend: impl Into<FriendRef>, delta: i32) -> Result<u32> {
        let friend = self.friend_mut(player, friend)?;
        friend.adjust_base(delta);
        Ok(friend.power())
    }

    fn boost_power(
        &mut self,
        player: PlayerId,
        friend: impl Into<FriendRef>,
        amount: i32,
        source: SourceKey,
    ) -> Result<()> {
        self.friend_mut(player, friend)?.add_modifier(PowerModifier {
            source,
            amount,
            duration: ModifierDuration::UntilEndOfTurn,
        });
        Ok(())
    }

    fn set_continuous_power(&mut self, player: PlayerId, slot: Slot, source: &SourceKey, amount: i32) -> Result<()> {
        self.friend_mut(player, slot)?.set_continuous(source, amount);
        Ok(())
    }

    fn clear_continuous_modifiers(&mut self) {
        for (_, zones) in self.players.iter_mut() {
            for (_, friend) in zones.battle.iter_mut() {
                friend.clear_continuous();
            }
        }
    }

    fn expire_turn_modifiers(&mut self) {
        for (_, zones) in self.players.iter_mut() {
            for (_, friend) in zones.battle.iter_mut() {
                friend.expire_turn_modifiers();
            }
        }
    }

    fn ready_all(&mut self, player: PlayerId) {
        let zones = self.player_mut(player);
        for (_, friend) in zones.battle.iter_mut() {
            friend.rested = false;
        }
        for energy in zones.energy.iter_mut() {
            energy.rested = false;
        }
    }

    fn charge_energy(&mut self, player: PlayerId, catalog: &dyn CardCatalog) -> Result<CardNo> {
        let zones = self.player_mut(player);
        let top = zones
            .deck
            .front()
            .ok_or(EngineError::DeckEmpty { requested: 1, available: 0 })?;
        let color = catalog.card(top)?.color;
        let card = zones
            .deck
            .pop_front()
            .ok_or(EngineError::DeckEmpty { requested: 1, available: 0 })?;
        zones.energy.push_back(EnergyCardInstance::new(card.clone(), color));
        Ok(card)
    }

    fn set_energy_rested(&mut self, player: PlayerId, index: usize, rested: bool) -> Result<()> {
        let energy = self
            .player_mut(player)
            .energy
            .get_mut(index)
            .ok_or(EngineError::EnergyNotFound { player, index })?;
        energy.rested = rested;
        Ok(())
    }

    fn rest_energy(&mut self, player: PlayerId, indices: &[usize]) -> Result<()> {
        let zones = self.player_mut(player);
        if let Some(&index) = indices.iter().find(|&&i| i >= zones.energy.len()) {
            return Err(EngineError::EnergyNotFound { player, index });
        }
        for &index in indices {
            if let Some(energy) = zones.energy.get_mut(index) {
                energy.rested = true;
            }
        }
        Ok(())
    }

    fn return_energy_to_hand(&mut self, player: PlayerId, index: usize) -> Result<CardNo> {
        let zones = self.player_mut(player);
        if index >= zones.energy.len() {
            return Err(EngineError::EnergyNotFound { player, index });
        }
        let energy = zones.energy.remove(index);
        zones.hand.push_back(energy.card_no.clone());
        Ok(energy.card_no)
    }

    fn take_damage(&mut self, player: PlayerId, amount: usize) -> Result<()> {
        let zones = self.player_mut(player);
        let damage = split_top(&mut zones.deck, amount)?;
        zones
            .negative_energy
            .extend(damage.into_iter().map(NegativeEnergyCard::face_down));
        Ok(())
    }

    fn reveal_negative_energy(&mut self, player: PlayerId, count: usize) -> Result<()> {
        let zones = self.player_mut(player);
        let available = zones.face_down_count();
        if available < count {
            return Err(EngineError::NotEnoughFaceDown {
                requested: count,
                available,
            });
        }
        for entry in zones.negative_energy.iter_mut().filter(|n| !n.face_up).take(count) {
            entry.face_up = true;
        }
        Ok(())
    }

    fn conceal_negative_energy(&mut self, player: PlayerId, index: usize) -> Result<()> {
        let entry = self
            .player_mut(player)
            .negative_energy
            .get_mut(index)
            .filter(|n| n.face_up)
            .ok_or_else(|| EngineError::InvalidTarget(format!("face-up negative energy {index}")))?;
        entry.face_up = false;
        Ok(())
    }

    fn trash_negative_energy(&mut self, player: PlayerId, index: usize) -> Result<CardNo> {
        let zones = self.player_mut(player);
        if index >= zones.negative_energy.len() {
            return Err(EngineError::InvalidTarget(format!("negative energy {index}")));
        }
        let entry = zones.negative_energy.remove(index);
        zones.trash.push_back(entry.card_no.clone());
        Ok(entry.card_no)
    }

    fn negative_energy_to_deck(&mut self, player: PlayerId, index: usize, position: DeckPosition) -> Result<CardNo> {
        let zones = self.player_mut(player);
        if index >= zones.negative_energy.len() {
            return Err(EngineError::InvalidTarget(format!("negative energy {index}")));
        }
        let entry = zones.negative_energy.remove(index);
        put_in_deck(zones, entry.card_no.clone(), position);
        Ok(entry.card_no)
    }

    fn place_field_card(&mut self, player: PlayerId, card_no: &CardNo) -> Result<Option<CardNo>> {
        let zones = self.player_mut(player);
        let card = take_from_hand(zones, card_no)?;
        let replaced = zones.field.replace(card);
        if let Some(old) = &replaced {
            zones.trash.push_back(old.clone());
        }
        Ok(replaced)
    }

    fn destroy_field_card(&mut self, player: PlayerId) -> Result<CardNo> {
        let zones = self.player_mut(player);
        let card = zones.field.take().ok_or(EngineError::NoFieldCard(player))?;
        zones.trash.push_back(card.clone());
        Ok(card)
    }

    fn take_events(&mut self, phase: Phase) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.events);
        for event in &mut events {
            event.phase = phase;
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardAttributes, CardRegistry, Color};

    fn cards(prefix: &str, n: usize) -> Vec<CardNo> {
        (0..n).map(|i| CardNo::new(format!("{prefix}-{i:03}"))).collect()
    }

    fn state_with_hand(hand: usize) -> GameState {
        let mut state = GameState::new(cards("A", 10), cards("B", 10), 3);
        state.draw(PlayerId::ONE, hand).unwrap();
        state
    }

    fn with_friend(power: u32) -> GameState {
        let mut state = state_with_hand(2);
        let card = CardNo::new("A-000");
        state.play_friend(PlayerId::ONE, &card, Slot::new(0), power, 1, false).unwrap();
        state
    }

    #[test]
    fn test_draw_moves_top_cards() {
        let state = state_with_hand(3);
        let zones = state.player(PlayerId::ONE);
        assert_eq!(zones.hand().len(), 3);
        assert_eq!(zones.deck().len(), 7);
        assert_eq!(zones.hand()[0], CardNo::new("A-000"));
        assert_eq!(zones.deck()[0], CardNo::new("A-003"));
    }

    #[test]
    fn test_draw_is_all_or_nothing() {
        let mut state = state_with_hand(8);
        let before = state.clone();

        let err = state.draw(PlayerId::ONE, 3).unwrap_err();

        assert_eq!(err, EngineError::DeckEmpty { requested: 3, available: 2 });
        assert_eq!(state, before);
    }

    #[test]
    fn test_modify_power_floors_at_zero() {
        let mut state = with_friend(2000);
        let power = state.modify_power(PlayerId::ONE, "A-000", -9000).unwrap();
        assert_eq!(power, 0);
        let friend = state.player(PlayerId::ONE).battle().get(Slot::new(0)).unwrap();
        assert_eq!(friend.power(), 0);
    }

    #[test]
    fn test_destroy_friend_raises_event() {
        let mut state = with_friend(2000);
        let destroyed = state.destroy_friend(PlayerId::ONE, Slot::new(0)).unwrap();

        assert_eq!(destroyed, CardNo::new("A-000"));
        assert!(state.player(PlayerId::ONE).battle().is_empty());
        assert_eq!(state.player(PlayerId::ONE).trash().len(), 1);

        let events = state.take_events(Phase::Main);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::FriendDestroyed);
        assert_eq!(events[0].phase, Phase::Main);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_missing_friend_fails_clean() {
        let mut state = with_friend(2000);
        let before = state.clone();

        let err = state.rest(PlayerId::ONE, "F-999").unwrap_err();
        assert!(matches!(err, EngineError::FriendNotFound { .. }));
        let err = state.destroy_friend(PlayerId::TWO, Slot::new(0)).unwrap_err();
        assert!(matches!(err, EngineError::FriendNotFound { .. }));

        assert_eq!(state, before);
    }

    #[test]
    fn test_rest_and_activate() {
        let mut state = with_friend(1000);
        state.rest(PlayerId::ONE, Slot::new(0)).unwrap();
        assert!(state.player(PlayerId::ONE).battle().get(Slot::new(0)).unwrap().rested);
        state.activate(PlayerId::ONE, "A-000").unwrap();
        assert!(!state.player(PlayerId::ONE).battle().get(Slot::new(0)).unwrap().rested);
    }

    #[test]
    fn test_play_friend_into_occupied_slot_keeps_hand() {
        let mut state = with_friend(1000);
        let err = state
            .play_friend(PlayerId::ONE, &CardNo::new("A-001"), Slot::new(0), 1000, 1, false)
            .unwrap_err();
        assert_eq!(err, EngineError::SlotOccupied(Slot::new(0)));
        assert!(state.player(PlayerId::ONE).hand_contains(&CardNo::new("A-001")));
    }

    #[test]
    fn test_reveal_negative_energy() {
        let mut state = state_with_hand(0);
        state.take_damage(PlayerId::ONE, 3).unwrap();
        assert_eq!(state.player(PlayerId::ONE).face_down_count(), 3);

        state.reveal_negative_energy(PlayerId::ONE, 2).unwrap();
        assert_eq!(state.player(PlayerId::ONE).face_up_count(), 2);

        let err = state.reveal_negative_energy(PlayerId::ONE, 2).unwrap_err();
        assert_eq!(err, EngineError::NotEnoughFaceDown { requested: 2, available: 1 });
        assert_eq!(state.player(PlayerId::ONE).face_up_count(), 2);
    }

    #[test]
    fn test_place_field_card_replaces_old() {
        let mut state = state_with_hand(2);
        let first = CardNo::new("A-000");
        let second = CardNo::new("A-001");

        assert_eq!(state.place_field_card(PlayerId::ONE, &first).unwrap(), None);
        assert_eq!(state.place_field_card(PlayerId::ONE, &second).unwrap(), Some(first.clone()));

        let zones = state.player(PlayerId::ONE);
        assert_eq!(zones.field(), Some(&second));
        assert_eq!(zones.trash().iter().collect::<Vec<_>>(), vec![&first]);
    }

    #[test]
    fn test_move_card_to_deck_positions() {
        let mut state = state_with_hand(2);
        state
            .move_card_to_deck(PlayerId::ONE, &CardNo::new("A-000"), Pile::Hand, DeckPosition::Top)
            .unwrap();
        state.discard_from_hand(PlayerId::ONE, &CardNo::new("A-001")).unwrap();
        state
            .move_card_to_deck(PlayerId::ONE, &CardNo::new("A-001"), Pile::Trash, DeckPosition::Bottom)
            .unwrap();

        let zones = state.player(PlayerId::ONE);
        assert_eq!(zones.deck().front(), Some(&CardNo::new("A-000")));
        assert_eq!(zones.deck().back(), Some(&CardNo::new("A-001")));
        assert!(zones.trash().is_empty());

        let err = state
            .move_card_to_deck(PlayerId::ONE, &CardNo::new("A-001"), Pile::Trash, DeckPosition::Top)
            .unwrap_err();
        assert_eq!(err, EngineError::CardNotFound(CardNo::new("A-001")));
    }

    #[test]
    fn test_revived_friend_leaves_at_end() {
        let mut state = with_friend(2000);
        state.destroy_friend(PlayerId::ONE, Slot::new(0)).unwrap();
        state.take_events(Phase::Main);

        state
            .revive_friend(PlayerId::ONE, &CardNo::new("A-000"), Slot::new(1), 2000, 3)
            .unwrap();
        let friend = state.player(PlayerId::ONE).battle().get(Slot::new(1)).unwrap();
        assert!(friend.rested);
        assert!(friend.leaves_at_end);
        assert!(state.player(PlayerId::ONE).trash().is_empty());

        let gone = state.destroy_leaving_friends();
        assert_eq!(gone, vec![(PlayerId::ONE, CardNo::new("A-000"))]);
        assert!(state.player(PlayerId::ONE).battle().is_empty());
        assert_eq!(state.take_events(Phase::End)[0].kind, EventKind::FriendDestroyed);
        assert!(state.destroy_leaving_friends().is_empty());
    }

    #[test]
    fn test_conceal_needs_face_up_entry() {
        let mut state = state_with_hand(0);
        state.take_damage(PlayerId::ONE, 2).unwrap();
        state.reveal_negative_energy(PlayerId::ONE, 1).unwrap();

        state.conceal_negative_energy(PlayerId::ONE, 0).unwrap();
        assert_eq!(state.player(PlayerId::ONE).face_up_count(), 0);
        assert!(state.conceal_negative_energy(PlayerId::ONE, 1).is_err());
        assert!(state.conceal_negative_energy(PlayerId::ONE, 5).is_err());
    }

    #[test]
    fn test_negative_energy_to_deck_bottom() {
        let mut state = state_with_hand(0);
        state.take_damage(PlayerId::ONE, 2).unwrap();

        let card = state.negative_energy_to_deck(PlayerId::ONE, 1, DeckPosition::Bottom).unwrap();
        assert_eq!(card, CardNo::new("A-001"));
        let zones = state.player(PlayerId::ONE);
        assert_eq!(zones.negative_energy().len(), 1);
        assert_eq!(zones.deck().back(), Some(&card));
        assert_eq!(zones.deck().len(), 9);
    }

    #[test]
    fn test_keep_from_top() {
        let mut state = state_with_hand(0);
        state.keep_from_top(PlayerId::ONE, 3, &[1]).unwrap();

        let zones = state.player(PlayerId::ONE);
        assert_eq!(zones.hand().iter().collect::<Vec<_>>(), vec![&CardNo::new("A-001")]);
        assert_eq!(zones.trash().len(), 2);
        assert_eq!(zones.deck().len(), 7);
    }

    #[test]
    fn test_keep_from_top_rejects_bad_depth() {
        let mut state = state_with_hand(0);
        let before = state.clone();
        assert!(state.keep_from_top(PlayerId::ONE, 3, &[3]).is_err());
        assert!(state.keep_from_top(PlayerId::ONE, 3, &[0, 0]).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_charge_energy_uses_catalog_color() {
        let mut catalog = CardRegistry::new();
        catalog.register(CardAttributes::friend("A-000", "Test", Color::Green, 1, 1000));

        let mut state = state_with_hand(0);
        state.charge_energy(PlayerId::ONE, &catalog).unwrap();

        let energy = &state.player(PlayerId::ONE).energy()[0];
        assert_eq!(energy.color, Color::Green);
        assert!(!energy.rested);

        let err = state.charge_energy(PlayerId::ONE, &catalog).unwrap_err();
        assert_eq!(err, EngineError::CardNotFound(CardNo::new("A-001")));
        assert_eq!(state.player(PlayerId::ONE).deck().len(), 9);
    }

    #[test]
    fn test_census_stable_across_moves() {
        let mut state = state_with_hand(4);
        let before = state.census(PlayerId::ONE);

        state.play_friend(PlayerId::ONE, &CardNo::new("A-000"), Slot::new(1), 1000, 1, false).unwrap();
        state.discard_from_hand(PlayerId::ONE, &CardNo::new("A-001")).unwrap();
        state.take_damage(PlayerId::ONE, 2).unwrap();
        state.return_to_hand(PlayerId::ONE, Slot::new(1)).unwrap();
        state.return_from_trash(PlayerId::ONE, &CardNo::new("A-001")).unwrap();

        assert_eq!(state.census(PlayerId::ONE), before);
    }
}
