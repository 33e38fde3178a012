//! Effect targeting.
//!
//! - `Target`: an addressable object, with an optional snapshot of what it
//!   looked like when the candidate set was computed
//! - `TargetRequirement`: how many targets of which kinds an effect needs
//! - `TargetValidator`: checks a selection against fresh candidates
//!
//! Candidates are always recomputed from the current state. A selection is
//! matched against them as a multiset: two copies of the same card in the
//! trash are two candidates, and each selection consumes one.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use crate::cards::{CardNo, FriendInstance};
use crate::core::PlayerId;
use crate::error::{EngineError, Result};
use crate::zones::{Location, Slot};

/// What kind of object a target is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Friend,
    Energy,
    /// A card in hand, trash, or negative energy.
    Card,
    Field,
    Deck,
}

/// Display data captured with a candidate. Never used for identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub power: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    pub id: CardNo,
    pub location: Location,
    pub snapshot: Option<TargetSnapshot>,
}

impl Target {
    #[must_use]
    pub fn friend(player: PlayerId, slot: Slot, friend: &FriendInstance) -> Self {
        Self {
            kind: TargetKind::Friend,
            id: friend.card_no.clone(),
            location: Location::BattleArea { player, slot },
            snapshot: Some(TargetSnapshot { power: friend.power() }),
        }
    }

    #[must_use]
    pub fn energy(player: PlayerId, index: usize, card_no: CardNo) -> Self {
        Self {
            kind: TargetKind::Energy,
            id: card_no,
            location: Location::EnergyArea { player, index },
            snapshot: None,
        }
    }

    /// A card sitting in hand, trash, or negative energy.
    #[must_use]
    pub fn card(location: Location, card_no: CardNo) -> Self {
        Self {
            kind: TargetKind::Card,
            id: card_no,
            location,
            snapshot: None,
        }
    }

    #[must_use]
    pub fn field(player: PlayerId, card_no: CardNo) -> Self {
        Self {
            kind: TargetKind::Field,
            id: card_no,
            location: Location::Field(player),
            snapshot: None,
        }
    }

    #[must_use]
    pub fn deck(player: PlayerId, depth: usize, card_no: CardNo) -> Self {
        Self {
            kind: TargetKind::Deck,
            id: card_no,
            location: Location::Deck { player, depth },
            snapshot: None,
        }
    }

    /// Battle-area slot, for friend targets.
    #[must_use]
    pub fn slot(&self) -> Option<Slot> {
        match self.location {
            Location::BattleArea { slot, .. } => Some(slot),
            _ => None,
        }
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id && self.location == other.location
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.id.hash(state);
        self.location.hash(state);
    }
}

/// Upper bound on a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMax {
    Count(usize),
    /// Every candidate.
    All,
}

impl TargetMax {
    /// The bound for a concrete candidate set.
    #[must_use]
    pub fn limit(self, candidates: usize) -> usize {
        match self {
            TargetMax::Count(n) => n,
            TargetMax::All => candidates,
        }
    }
}

/// What an effect asks for when it is queued.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRequirement {
    pub min: usize,
    pub max: TargetMax,
    pub kinds: SmallVec<[TargetKind; 2]>,
    pub mandatory: bool,
    pub prompt: String,
}

impl TargetRequirement {
    /// No targets at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            min: 0,
            max: TargetMax::Count(0),
            kinds: SmallVec::new(),
            mandatory: false,
            prompt: String::new(),
        }
    }

    /// Exactly one target; optional ones may be declined.
    #[must_use]
    pub fn single(kind: TargetKind, mandatory: bool, prompt: impl Into<String>) -> Self {
        Self {
            min: usize::from(mandatory),
            max: TargetMax::Count(1),
            kinds: smallvec![kind],
            mandatory,
            prompt: prompt.into(),
        }
    }

    /// Between `min` and `max` targets.
    #[must_use]
    pub fn range(kind: TargetKind, min: usize, max: usize, prompt: impl Into<String>) -> Self {
        Self {
            min,
            max: TargetMax::Count(max),
            kinds: smallvec![kind],
            mandatory: min > 0,
            prompt: prompt.into(),
        }
    }

    /// Whether this requirement asks for anything.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.max == TargetMax::Count(0)
    }
}

/// Validation and selection over candidate sets.
pub struct TargetValidator;

impl TargetValidator {
    /// Check `selected` against `candidates`.
    ///
    /// Each selected target must consume one distinct matching candidate.
    /// The minimum is clamped to the number of candidates, so "keep one of
    /// the top three" still works when only two cards are left.
    pub fn validate(selected: &[Target], candidates: &[Target], requirement: &TargetRequirement) -> Result<()> {
        if selected.is_empty() && requirement.mandatory {
            return Err(EngineError::TargetRequired);
        }

        let mut unused: Vec<Option<&Target>> = candidates.iter().map(Some).collect();
        for target in selected {
            if !requirement.kinds.contains(&target.kind) {
                return Err(EngineError::InvalidTarget(format!("{} is not a valid kind here", target.id)));
            }
            let slot = unused
                .iter_mut()
                .find(|c| c.is_some_and(|c| c == target))
                .ok_or_else(|| EngineError::InvalidTarget(format!("{} at {:?}", target.id, target.location)))?;
            *slot = None;
        }

        let max = requirement.max.limit(candidates.len());
        let min = requirement.min.min(candidates.len());
        if selected.len() < min || selected.len() > max {
            return Err(EngineError::TargetCount {
                min,
                max,
                got: selected.len(),
            });
        }
        Ok(())
    }

    /// The selection to use when the player has no real decision to make.
    ///
    /// Returns `None` when the player must choose.
    #[must_use]
    pub fn auto_select(candidates: &[Target], requirement: &TargetRequirement) -> Option<Vec<Target>> {
        if requirement.is_none() || candidates.is_empty() {
            return Some(Vec::new());
        }
        match requirement.max {
            TargetMax::All => Some(candidates.to_vec()),
            TargetMax::Count(n) if requirement.mandatory && candidates.len() <= n => Some(candidates.to_vec()),
            TargetMax::Count(_) => None,
        }
    }

    /// Candidates grouped by zone, for presenting a choice.
    #[must_use]
    pub fn group_targets(candidates: &[Target]) -> BTreeMap<&'static str, Vec<Target>> {
        let mut groups: BTreeMap<&'static str, Vec<Target>> = BTreeMap::new();
        for target in candidates {
            groups.entry(target.location.group()).or_default().push(target.clone());
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn friend_target(player: PlayerId, slot: u8, no: &str, power: u32) -> Target {
        let friend = FriendInstance::new(CardNo::new(no), power, 1);
        Target::friend(player, Slot::new(slot), &friend)
    }

    #[test]
    fn test_identity_ignores_snapshot() {
        let a = friend_target(PlayerId::ONE, 0, "F-006", 1000);
        let b = friend_target(PlayerId::ONE, 0, "F-006", 5000);
        assert_eq!(a, b);
        assert_ne!(a, friend_target(PlayerId::ONE, 1, "F-006", 1000));
    }

    #[test]
    fn test_validate_rejects_unknown_target() {
        let candidates = vec![friend_target(PlayerId::TWO, 0, "F-011", 2000)];
        let req = TargetRequirement::single(TargetKind::Friend, true, "destroy");
        let wrong = friend_target(PlayerId::TWO, 1, "F-011", 2000);

        let err = TargetValidator::validate(&[wrong], &candidates, &req).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget(_)));
    }

    #[test]
    fn test_validate_mandatory_empty() {
        let req = TargetRequirement::single(TargetKind::Friend, true, "destroy");
        let err = TargetValidator::validate(&[], &[], &req).unwrap_err();
        assert_eq!(err, EngineError::TargetRequired);
    }

    #[test]
    fn test_validate_multiset_consumption() {
        let copy = Target::card(Location::Trash(PlayerId::ONE), CardNo::new("F-067"));
        let candidates = vec![copy.clone(), copy.clone()];
        let req = TargetRequirement::range(TargetKind::Card, 0, 3, "return");

        assert!(TargetValidator::validate(&[copy.clone(), copy.clone()], &candidates, &req).is_ok());
        let err = TargetValidator::validate(&[copy.clone(), copy.clone(), copy], &candidates, &req).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget(_)));
    }

    #[test]
    fn test_validate_count() {
        let candidates = vec![
            friend_target(PlayerId::ONE, 0, "F-006", 1000),
            friend_target(PlayerId::ONE, 1, "F-011", 1000),
        ];
        let req = TargetRequirement::range(TargetKind::Friend, 2, 2, "pick two");
        let err = TargetValidator::validate(&candidates[..1], &candidates, &req).unwrap_err();
        assert_eq!(err, EngineError::TargetCount { min: 2, max: 2, got: 1 });
    }

    #[test]
    fn test_validate_wrong_kind() {
        let energy = Target::energy(PlayerId::ONE, 0, CardNo::new("F-001"));
        let req = TargetRequirement::single(TargetKind::Friend, false, "pick");
        let err = TargetValidator::validate(&[energy.clone()], &[energy], &req).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTarget(_)));
    }

    #[test]
    fn test_auto_select() {
        let one = vec![friend_target(PlayerId::TWO, 0, "F-011", 2000)];
        let two = vec![one[0].clone(), friend_target(PlayerId::TWO, 1, "F-012", 2000)];
        let mandatory = TargetRequirement::single(TargetKind::Friend, true, "destroy");
        let optional = TargetRequirement::single(TargetKind::Friend, false, "rest");

        assert_eq!(TargetValidator::auto_select(&one, &mandatory), Some(one.clone()));
        assert_eq!(TargetValidator::auto_select(&two, &mandatory), None);
        assert_eq!(TargetValidator::auto_select(&one, &optional), None);
        assert_eq!(TargetValidator::auto_select(&[], &mandatory), Some(Vec::new()));
        assert_eq!(TargetValidator::auto_select(&two, &TargetRequirement::none()), Some(Vec::new()));
    }

    #[test]
    fn test_group_targets() {
        let candidates = vec![
            friend_target(PlayerId::ONE, 0, "F-006", 1000),
            Target::energy(PlayerId::ONE, 0, CardNo::new("F-001")),
            friend_target(PlayerId::TWO, 2, "F-011", 1000),
        ];
        let groups = TargetValidator::group_targets(&candidates);
        assert_eq!(groups["battle_area"].len(), 2);
        assert_eq!(groups["energy_area"].len(), 1);
        assert!(!groups.contains_key("trash"));
    }
}
