//! Seed, harvest, and currency bookkeeping for Saverville.
//!
//! The remote ledger (the contract) is authoritative for seeds and plots;
//! this crate keeps the client-side tally the player sees. It is updated
//! only after a remote operation is confirmed, except for sales, which are
//! local bookkeeping.
//!
//! | Entry type | Inventory effect | Amount |
//! |------------|------------------|--------|
//! | `SeedPurchase` | seeds + Q | wallet cost (`price x Q`) |
//! | `SeedPlanted` | seeds - 1 | 0 |
//! | `Harvest` | plants + 1 | 0 |
//! | `Sale` | plants -> 0 | proceeds credited to balance |
//!
//! The crate never panics; every rejected mutation returns an
//! [`EconomyError`] and leaves the economy untouched.

pub mod economy;

pub use economy::Economy;

use rust_decimal::Decimal;

/// Errors that can occur when mutating the economy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// Quantity must be strictly positive.
    #[error("quantity must be non-zero")]
    ZeroQuantity,

    /// Money amounts must not be negative.
    #[error("amount must not be negative, got {amount}")]
    NegativeAmount {
        /// The invalid amount.
        amount: Decimal,
    },

    /// No seeds left to plant.
    #[error("no seeds in inventory")]
    NoSeeds,

    /// No harvested plants to sell.
    #[error("no harvested plants to sell")]
    NothingToSell,

    /// A checked arithmetic operation overflowed.
    #[error("arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    /// An internal error that should not occur in normal operation.
    #[error("internal economy error: {0}")]
    InternalError(&'static str),
}
