//! Error types for farm actions.
//!
//! Every failure is scoped to the single action that produced it. None of
//! them poison the store; the farm keeps running and the action can be
//! issued again.

use saverville_ledger::EconomyError;
use saverville_types::{FarmAction, PlotState};
use saverville_world::RegistryError;

use crate::gateway::GatewayError;
use crate::store::FarmStateError;

/// The local state does not allow the requested action.
///
/// Raised before any remote call is made; nothing changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    /// The plot index is outside the grid.
    #[error("plot {index} is out of range (grid has {len} plots)")]
    PlotOutOfRange {
        /// Requested index.
        index: u32,
        /// Grid size.
        len: u32,
    },

    /// Planting needs an empty plot.
    #[error("plot {index} is {state}, not empty")]
    PlotNotEmpty {
        /// The plot.
        index: u32,
        /// Its current state.
        state: PlotState,
    },

    /// Planting needs a seed in the inventory.
    #[error("no seeds to plant")]
    NoSeeds,

    /// Watering needs a seeded plot.
    #[error("plot {index} is {state}, not seeded")]
    NotSeeded {
        /// The plot.
        index: u32,
        /// Its current state.
        state: PlotState,
    },

    /// Harvesting needs a growing or mature plot.
    #[error("plot {index} is {state}, not ready to harvest")]
    NotHarvestable {
        /// The plot.
        index: u32,
        /// Its current state.
        state: PlotState,
    },

    /// Purchases need a positive quantity.
    #[error("purchase quantity must be positive")]
    InvalidQuantity,

    /// Selling needs harvested plants.
    #[error("no plants to sell")]
    NothingToSell,

    /// No wallet session to sign with.
    #[error("wallet not connected")]
    WalletUnavailable,
}

/// Errors returned by farm controller actions.
#[derive(Debug, thiserror::Error)]
pub enum FarmError {
    /// Rejected locally; no remote call was made.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The remote ledger failed the call. Displays the ledger's reason
    /// unchanged.
    #[error("{source}")]
    Remote {
        /// The action that failed.
        action: FarmAction,
        /// The ledger's error.
        source: GatewayError,
    },

    /// The remote call did not confirm in time.
    #[error("{action} timed out after {after_ms}ms")]
    Timeout {
        /// The action that timed out.
        action: FarmAction,
        /// How long the controller waited.
        after_ms: u64,
    },

    /// The remote call confirmed, but the plot had already been moved on
    /// by a concurrent action, so the local write was refused.
    #[error("{action} on plot {index} confirmed, but the plot had already changed")]
    Conflict {
        /// The action whose local write was refused.
        action: FarmAction,
        /// The plot.
        index: u32,
    },

    /// The plot registry refused a write.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },

    /// The economy refused a mutation.
    #[error("economy error: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },
}

impl From<FarmStateError> for FarmError {
    fn from(err: FarmStateError) -> Self {
        match err {
            FarmStateError::Registry { source } => source.into(),
            FarmStateError::Economy { source } => source.into(),
        }
    }
}

impl FarmError {
    /// Whether the action was rejected before reaching the remote ledger.
    pub const fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// The precondition that failed, if that is what happened.
    pub const fn precondition(&self) -> Option<&PreconditionError> {
        match self {
            Self::Precondition(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the remote ledger failed or timed out.
    pub const fn is_remote_failure(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Timeout { .. })
    }
}
