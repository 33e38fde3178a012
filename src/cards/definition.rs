//! Static card data as supplied by the catalog.
//!
//! `CardAttributes` is immutable reference data: the engine reads it by
//! card number and never writes it.

use serde::{Deserialize, Serialize};

/// Printed card number, e.g. `"F-006"` or the promo printing `"F-006 (P)"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardNo(String);

const PROMO_SUFFIX: &str = " (P)";

impl CardNo {
    #[must_use]
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The number without a promotional suffix.
    ///
    /// ```
    /// use mememe_engine::cards::CardNo;
    ///
    /// assert_eq!(CardNo::new("F-016 (P)").base(), "F-016");
    /// assert_eq!(CardNo::new("F-016").base(), "F-016");
    /// ```
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.strip_suffix(PROMO_SUFFIX).unwrap_or(&self.0)
    }

    #[must_use]
    pub fn is_promo(&self) -> bool {
        self.0.ends_with(PROMO_SUFFIX)
    }

    /// The promotional printing of this card.
    #[must_use]
    pub fn promo(&self) -> Self {
        Self(format!("{}{}", self.base(), PROMO_SUFFIX))
    }
}

impl std::fmt::Display for CardNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardNo {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CardNo {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Friend,
    Support,
    Field,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
    Colorless,
}

/// Colored portion of a card's cost.
///
/// The total cost may exceed the colored sum; the remainder is generic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCost {
    pub red: u32,
    pub blue: u32,
    pub yellow: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ColorCost {
    /// Required amount of one color. `Colorless` here means the explicit
    /// colorless requirement, not the generic remainder.
    #[must_use]
    pub fn of(&self, color: Color) -> u32 {
        match color {
            Color::Red => self.red,
            Color::Blue => self.blue,
            Color::Yellow => self.yellow,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    /// Sum of the colored requirements (red, blue, yellow, green).
    #[must_use]
    pub fn colored_total(&self) -> u32 {
        self.red + self.blue + self.yellow + self.green
    }
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAttributes {
    pub number: CardNo,
    pub name: String,
    pub card_type: CardType,
    pub color: Color,
    pub cost: u32,
    pub color_cost: ColorCost,
    /// Printed power; zero for supports and fields.
    pub power: u32,
    pub ability_text: String,
    /// Playable only at counter timing.
    pub counter: bool,
    /// Playable in the main phase or at counter timing.
    pub main_counter: bool,
}

impl CardAttributes {
    fn blank(number: impl Into<CardNo>, name: impl Into<String>, card_type: CardType, color: Color, cost: u32) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
            card_type,
            color,
            cost,
            color_cost: ColorCost::default(),
            power: 0,
            ability_text: String::new(),
            counter: false,
            main_counter: false,
        }
    }

    #[must_use]
    pub fn friend(number: impl Into<CardNo>, name: impl Into<String>, color: Color, cost: u32, power: u32) -> Self {
        let mut card = Self::blank(number, name, CardType::Friend, color, cost);
        card.power = power;
        card
    }

    #[must_use]
    pub fn support(number: impl Into<CardNo>, name: impl Into<String>, color: Color, cost: u32) -> Self {
        Self::blank(number, name, CardType::Support, color, cost)
    }

    #[must_use]
    pub fn field(number: impl Into<CardNo>, name: impl Into<String>, color: Color, cost: u32) -> Self {
        Self::blank(number, name, CardType::Field, color, cost)
    }

    #[must_use]
    pub fn with_color_cost(mut self, color_cost: ColorCost) -> Self {
        self.color_cost = color_cost;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.ability_text = text.into();
        self
    }

    /// Mark as usable only at counter timing.
    #[must_use]
    pub fn counter(mut self) -> Self {
        self.counter = true;
        self
    }

    /// Mark as usable in the main phase or at counter timing.
    #[must_use]
    pub fn main_counter(mut self) -> Self {
        self.main_counter = true;
        self
    }

    #[must_use]
    pub fn is_friend(&self) -> bool {
        self.card_type == CardType::Friend
    }
}
