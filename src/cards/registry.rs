//! Card catalog lookup.
//!
//! The engine reads static card data through the [`CardCatalog`] trait so
//! the backing store (database, data files, fixtures) stays outside the
//! core. [`CardRegistry`] is the in-memory implementation.

use rustc_hash::FxHashMap;

use super::definition::{CardAttributes, CardNo, CardType};
use crate::error::{EngineError, Result};

/// Read-only card lookup keyed by card number.
pub trait CardCatalog: Send + Sync {
    fn get_card(&self, card_no: &CardNo) -> Option<&CardAttributes>;

    /// Like [`get_card`](Self::get_card), failing with `CardNotFound`.
    fn card(&self, card_no: &CardNo) -> Result<&CardAttributes> {
        self.get_card(card_no)
            .ok_or_else(|| EngineError::CardNotFound(card_no.clone()))
    }
}

/// In-memory card catalog.
///
/// ## Example
///
/// ```
/// use mememe_engine::cards::{CardAttributes, CardCatalog, CardNo, CardRegistry, Color};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardAttributes::friend("F-006", "Hiyakeratopus", Color::Red, 2, 3000));
///
/// let card = registry.get_card(&CardNo::new("F-006")).unwrap();
/// assert_eq!(card.power, 3000);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardNo, CardAttributes>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card, replacing any entry with the same number.
    pub fn register(&mut self, card: CardAttributes) {
        self.cards.insert(card.number.clone(), card);
    }

    /// Register a card together with its promotional printing.
    pub fn register_with_promo(&mut self, card: CardAttributes) {
        let mut promo = card.clone();
        promo.number = card.number.promo();
        self.register(card);
        self.register(promo);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card numbers of a given type, sorted.
    #[must_use]
    pub fn numbers_of_type(&self, card_type: CardType) -> Vec<&CardNo> {
        let mut numbers: Vec<_> = self
            .cards
            .values()
            .filter(|c| c.card_type == card_type)
            .map(|c| &c.number)
            .collect();
        numbers.sort();
        numbers
    }
}

impl CardCatalog for CardRegistry {
    fn get_card(&self, card_no: &CardNo) -> Option<&CardAttributes> {
        self.cards.get(card_no)
    }
}

impl FromIterator<CardAttributes> for CardRegistry {
    fn from_iter<I: IntoIterator<Item = CardAttributes>>(iter: I) -> Self {
        let mut registry = Self::new();
        for card in iter {
            registry.register(card);
        }
        registry
    }
}
