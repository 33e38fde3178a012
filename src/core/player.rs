//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! Mememe is strictly a two-player game. Players are numbered 1 and 2,
//! matching the numbering used by the persistence layer.
//!
//! ## PlayerMap
//!
//! Fixed two-entry storage indexed by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::error::EngineError;

/// Player identifier: `1` or `2`.
///
/// Deserializing any other number fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8")]
pub struct PlayerId(u8);

impl PlayerId {
    /// The player who takes the first turn.
    pub const ONE: PlayerId = PlayerId(1);

    /// The second player.
    pub const TWO: PlayerId = PlayerId(2);

    /// Create a player ID from its number.
    ///
    /// Panics if `number` is not 1 or 2.
    #[must_use]
    pub const fn new(number: u8) -> Self {
        assert!(number == 1 || number == 2, "player number must be 1 or 2");
        Self(number)
    }

    /// Create a player ID, returning `None` for anything but 1 or 2.
    #[must_use]
    pub const fn try_new(number: u8) -> Option<Self> {
        match number {
            1 | 2 => Some(Self(number)),
            _ => None,
        }
    }

    /// The player number (1 or 2).
    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Storage index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The other player.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self.0 {
            1 => Self(2),
            _ => Self(1),
        }
    }

    /// Both players in turn order.
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::ONE, Self::TWO].into_iter()
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = EngineError;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::try_new(number).ok_or(EngineError::InvalidPlayer(number))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use mememe_engine::core::{PlayerId, PlayerMap};
///
/// let mut hand_sizes: PlayerMap<usize> = PlayerMap::new(|_| 5);
/// hand_sizes[PlayerId::TWO] = 6;
///
/// assert_eq!(hand_sizes[PlayerId::ONE], 5);
/// assert_eq!(hand_sizes[PlayerId::TWO], 6);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; 2],
}

impl<T> PlayerMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(mut factory: impl FnMut(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::ONE), factory(PlayerId::TWO)],
        }
    }

    /// Create a map with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::both().zip(self.data.iter())
    }

    /// Iterate over (PlayerId, &mut T) pairs in turn order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::both().zip(self.data.iter_mut())
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}
