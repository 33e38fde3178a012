//! Player choices that suspend resolution.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::effects::{Target, TargetRequirement};

/// Identifies a pending choice within a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChoiceId(pub u32);

impl ChoiceId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Choice({})", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceKind {
    /// Pick targets from `candidates`.
    Target {
        candidates: Vec<Target>,
        requirement: TargetRequirement,
    },
    /// Pick one of `labels` by index.
    Option { labels: Vec<String> },
}

/// A question the resolver is waiting on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingChoice {
    pub id: ChoiceId,
    /// Who has to answer.
    pub player: PlayerId,
    pub kind: ChoiceKind,
    pub mandatory: bool,
    pub prompt: String,
}

impl PendingChoice {
    /// Candidates of a target choice; empty for option choices.
    #[must_use]
    pub fn candidates(&self) -> &[Target] {
        match &self.kind {
            ChoiceKind::Target { candidates, .. } => candidates,
            ChoiceKind::Option { .. } => &[],
        }
    }
}

/// A player's answer to a pending choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Targets(Vec<Target>),
    Option(usize),
}
