//! Boundary to the remote ledger (the farm contract).
//!
//! The controller only knows the five operations below and that each one
//! either fully succeeds or fully fails. Wire encoding, signing, and the
//! contract's own accounting belong to the implementation.
//!
//! Implementations are used through generics rather than trait objects:
//! the methods return `impl Future`, which is not dyn-compatible.

use core::future::Future;

use rust_decimal::Decimal;
use saverville_types::TxReceipt;
use serde::{Deserialize, Serialize};

/// A failed remote call.
///
/// Every variant carries the human-readable reason reported by the wallet or
/// ledger. [`Display`](core::fmt::Display) prints that reason unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The user declined to sign, or the wallet refused the request.
    #[error("{reason}")]
    Rejected {
        /// Reason reported by the wallet.
        reason: String,
    },

    /// The transaction was mined but reverted.
    #[error("{reason}")]
    Reverted {
        /// Revert reason reported by the contract.
        reason: String,
    },

    /// The ledger could not be reached.
    #[error("{reason}")]
    Network {
        /// Transport error description.
        reason: String,
    },
}

impl GatewayError {
    /// The reason string, as reported.
    pub fn reason(&self) -> &str {
        match self {
            Self::Rejected { reason } | Self::Reverted { reason } | Self::Network { reason } => {
                reason
            }
        }
    }
}

/// The remote ledger operations, for logging and failure scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LedgerOp {
    /// `seedUnitPrice()` read-only query.
    SeedUnitPrice,
    /// `purchaseSeeds(quantity)` with payment.
    PurchaseSeeds,
    /// `plantSeed(plot)`.
    PlantSeed,
    /// `waterPlant(plot)`.
    WaterPlant,
    /// `harvestPlant(plot)`.
    HarvestPlant,
}

/// The remote ledger as seen by the farm controller.
///
/// Every call suspends until the ledger confirms or fails the transaction.
/// The controller bounds each wait with its own timeout.
pub trait RemoteLedgerGateway: Send + Sync {
    /// Whether a wallet session is available to sign transactions.
    fn is_connected(&self) -> bool;

    /// Current price of one seed. Queried fresh for every purchase.
    fn seed_unit_price(&self) -> impl Future<Output = Result<Decimal, GatewayError>> + Send;

    /// Buy `quantity` seeds, paying `payment` from the wallet.
    fn purchase_seeds(
        &self,
        quantity: u32,
        payment: Decimal,
    ) -> impl Future<Output = Result<TxReceipt, GatewayError>> + Send;

    /// Plant one seed on `plot`.
    fn plant_seed(&self, plot: u32) -> impl Future<Output = Result<TxReceipt, GatewayError>> + Send;

    /// Water the seed on `plot`.
    fn water_plant(&self, plot: u32)
    -> impl Future<Output = Result<TxReceipt, GatewayError>> + Send;

    /// Harvest the plant on `plot`.
    fn harvest_plant(
        &self,
        plot: u32,
    ) -> impl Future<Output = Result<TxReceipt, GatewayError>> + Send;
}
