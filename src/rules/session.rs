//! Match sessions and the registry that serializes access to them.
//!
//! A session owns everything one match needs between calls: the board, the
//! turn record, the effect stack, and any half-finished action waiting on a
//! player choice. The registry hands out one `Arc<Mutex<_>>` per match, so
//! actions on the same match are exclusive while different matches run in
//! parallel.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::engine::Continuation;
use crate::core::{GameState, Match, MatchStatus};
use crate::error::{EngineError, Result};
use crate::stack::{EffectStack, PendingChoice};

/// Identifies a match.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MatchId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Board and turn record captured before an action.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    state: GameState,
    game: Match,
}

/// The persistent part of a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub game: Match,
    pub state: GameState,
    pub seed: Option<u64>,
}

impl MatchRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}

#[derive(Debug)]
pub struct MatchSession {
    pub(crate) id: MatchId,
    pub(crate) game: Match,
    pub(crate) state: GameState,
    pub(crate) stack: EffectStack,
    pub(crate) seed: Option<u64>,
    /// Rest of an action suspended on a choice.
    pub(crate) continuation: Option<Continuation>,
    /// Taken when an action starts; restored if it fails before settling.
    pub(crate) checkpoint: Option<Snapshot>,
}

impl MatchSession {
    pub(crate) fn new(id: MatchId, state: GameState) -> Self {
        Self {
            id,
            game: Match::new(),
            state,
            stack: EffectStack::new(),
            seed: None,
            continuation: None,
            checkpoint: None,
        }
    }

    /// Rebuild a session from a saved record. The stack starts empty.
    #[must_use]
    pub fn restore(record: MatchRecord) -> Self {
        let mut session = Self::new(record.id, record.state);
        session.game = record.game;
        session.seed = record.seed;
        session
    }

    /// Capture the persistent part of the session.
    ///
    /// Only settled sessions can be saved: while a choice is pending the
    /// stack and the suspended rest of the action have no record form, so
    /// this fails with `ChoicePending`.
    pub fn record(&self) -> Result<MatchRecord> {
        if let Some(choice) = self.stack.pending_choice() {
            return Err(EngineError::ChoicePending(choice.id.raw()));
        }
        Ok(MatchRecord {
            id: self.id.clone(),
            game: self.game.clone(),
            state: self.state.clone(),
            seed: self.seed,
        })
    }

    #[must_use]
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    #[must_use]
    pub fn game(&self) -> &Match {
        &self.game
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn stack(&self) -> &EffectStack {
        &self.stack
    }

    #[must_use]
    pub fn pending_choice(&self) -> Option<&PendingChoice> {
        self.stack.pending_choice()
    }

    pub(crate) fn ensure_playing(&self) -> Result<()> {
        if self.game.status == MatchStatus::Playing {
            Ok(())
        } else {
            Err(EngineError::MatchNotInProgress)
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            game: self.game.clone(),
        }
    }

    pub(crate) fn rollback(&mut self, snapshot: Snapshot) {
        self.state = snapshot.state;
        self.game = snapshot.game;
    }
}

pub type SharedSession = Arc<Mutex<MatchSession>>;

/// Every live match, keyed by id.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    matches: RwLock<FxHashMap<MatchId, SharedSession>>,
}

impl MatchRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session, replacing any match with the same id.
    pub fn insert(&self, session: MatchSession) -> SharedSession {
        let id = session.id.clone();
        let shared = Arc::new(Mutex::new(session));
        self.matches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&shared));
        shared
    }

    pub fn get(&self, id: &MatchId) -> Result<SharedSession> {
        self.matches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::MatchNotFound(id.to_string()))
    }

    pub fn remove(&self, id: &MatchId) -> Option<SharedSession> {
        self.matches.write().unwrap_or_else(PoisonError::into_inner).remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` with exclusive access to one match.
    pub fn with_match<R>(&self, id: &MatchId, f: impl FnOnce(&mut MatchSession) -> Result<R>) -> Result<R> {
        let shared = self.get(id)?;
        let mut session = shared.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }
}
