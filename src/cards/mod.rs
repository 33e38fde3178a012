//! Card data: catalog entries, in-play instances, and catalog lookup.
//!
//! ## Key Types
//!
//! - `CardNo`: printed card number, the key for every lookup
//! - `CardAttributes`: immutable catalog entry (type, color, cost, power)
//! - `FriendInstance`: a friend on the battle area with its power ledger
//! - `EnergyCardInstance` / `NegativeEnergyCard`: energy-zone entries
//! - `CardCatalog`: read-only lookup trait; `CardRegistry` implements it

pub mod definition;
pub mod instance;
pub mod registry;

pub use definition::{CardAttributes, CardNo, CardType, Color, ColorCost};
pub use instance::{
    EnergyCardInstance, FriendInstance, ModifierDuration, NegativeEnergyCard, PowerModifier, SourceKey,
};
pub use registry::{CardCatalog, CardRegistry};
