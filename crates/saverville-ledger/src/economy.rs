//! The player's economy: seeds, harvested plants, and currency.
//!
//! The [`Economy`] is mutated only after the action it reflects has been
//! confirmed (or, for sales, is purely local). Every mutation appends an
//! [`EconomyEntry`] to an append-only history.
//!
//! # Design
//!
//! - **Non-negative**: inventories are `u32` and the balance starts
//!   non-negative and only grows, so no mutation can drive a value below zero.
//! - **Checked**: all arithmetic is checked; overflow is an error, never a wrap.
//! - **Precision**: money uses [`Decimal`], no floating point.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use saverville_types::{EconomyEntry, EconomyEntryId, EconomyEntryType, EconomyView};

use crate::EconomyError;

/// Inventories, balance, and mutation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Economy {
    seed_inventory: u32,
    harvested_inventory: u32,
    currency_balance: Decimal,
    history: Vec<EconomyEntry>,
}

impl Economy {
    /// Create an economy with empty inventories and the given balance.
    pub fn new(starting_balance: Decimal) -> Result<Self, EconomyError> {
        if starting_balance.is_sign_negative() && !starting_balance.is_zero() {
            return Err(EconomyError::NegativeAmount {
                amount: starting_balance,
            });
        }
        Ok(Self {
            seed_inventory: 0,
            harvested_inventory: 0,
            currency_balance: starting_balance,
            history: Vec::new(),
        })
    }

    /// Seeds available for planting.
    pub const fn seed_inventory(&self) -> u32 {
        self.seed_inventory
    }

    /// Harvested plants waiting to be sold.
    pub const fn harvested_inventory(&self) -> u32 {
        self.harvested_inventory
    }

    /// Current currency balance.
    pub const fn currency_balance(&self) -> Decimal {
        self.currency_balance
    }

    /// All recorded mutations, oldest first.
    pub fn history(&self) -> &[EconomyEntry] {
        &self.history
    }

    /// Read-only projection for rendering.
    pub const fn view(&self) -> EconomyView {
        EconomyView {
            seed_inventory: self.seed_inventory,
            harvested_inventory: self.harvested_inventory,
            currency_balance: self.currency_balance,
        }
    }

    /// Credit seeds bought through a confirmed remote purchase.
    ///
    /// `cost` is what the wallet paid; it is recorded but not taken from the
    /// local balance.
    pub fn record_purchase(
        &mut self,
        quantity: u32,
        cost: Decimal,
    ) -> Result<&EconomyEntry, EconomyError> {
        if quantity == 0 {
            return Err(EconomyError::ZeroQuantity);
        }
        if cost.is_sign_negative() && !cost.is_zero() {
            return Err(EconomyError::NegativeAmount { amount: cost });
        }
        let seeds = self
            .seed_inventory
            .checked_add(quantity)
            .ok_or(EconomyError::ArithmeticOverflow("seed inventory"))?;
        self.seed_inventory = seeds;
        debug!(quantity, %cost, seeds, "seeds credited");
        self.append(EconomyEntryType::SeedPurchase, quantity, cost)
    }

    /// Take one seed out of the inventory for a confirmed planting.
    pub fn consume_seed(&mut self) -> Result<&EconomyEntry, EconomyError> {
        let seeds = self
            .seed_inventory
            .checked_sub(1)
            .ok_or(EconomyError::NoSeeds)?;
        self.seed_inventory = seeds;
        self.append(EconomyEntryType::SeedPlanted, 1, Decimal::ZERO)
    }

    /// Add one plant from a confirmed harvest.
    pub fn record_harvest(&mut self) -> Result<&EconomyEntry, EconomyError> {
        let plants = self
            .harvested_inventory
            .checked_add(1)
            .ok_or(EconomyError::ArithmeticOverflow("harvested inventory"))?;
        self.harvested_inventory = plants;
        self.append(EconomyEntryType::Harvest, 1, Decimal::ZERO)
    }

    /// Sell every harvested plant at `unit_rate`.
    ///
    /// Zeroes the harvested inventory and credits the proceeds in one step.
    /// Returns the number of plants sold and the proceeds. Nothing changes on
    /// error.
    pub fn sell_all(&mut self, unit_rate: Decimal) -> Result<(u32, Decimal), EconomyError> {
        if self.harvested_inventory == 0 {
            return Err(EconomyError::NothingToSell);
        }
        if unit_rate.is_sign_negative() && !unit_rate.is_zero() {
            return Err(EconomyError::NegativeAmount { amount: unit_rate });
        }
        let sold = self.harvested_inventory;
        let proceeds = unit_rate
            .checked_mul(Decimal::from(sold))
            .ok_or(EconomyError::ArithmeticOverflow("sale proceeds"))?;
        let balance = self
            .currency_balance
            .checked_add(proceeds)
            .ok_or(EconomyError::ArithmeticOverflow("currency balance"))?;

        self.harvested_inventory = 0;
        self.currency_balance = balance;
        debug!(sold, %proceeds, %balance, "harvest sold");
        self.append(EconomyEntryType::Sale, sold, proceeds)?;
        Ok((sold, proceeds))
    }

    fn append(
        &mut self,
        entry_type: EconomyEntryType,
        quantity: u32,
        amount: Decimal,
    ) -> Result<&EconomyEntry, EconomyError> {
        self.history.push(EconomyEntry {
            id: EconomyEntryId::new(),
            entry_type,
            quantity,
            amount,
            recorded_at: Utc::now(),
        });
        self.history
            .last()
            .ok_or(EconomyError::InternalError("failed to retrieve entry after append"))
    }
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            seed_inventory: 0,
            harvested_inventory: 0,
            currency_balance: Decimal::ZERO,
            history: Vec::new(),
        }
    }
}
