//! Snapshot, history, and reporting structs.
//!
//! These are read-only projections handed to the presentation layer. The
//! mutable plot and economy models live in `saverville-world` and
//! `saverville-ledger`; nothing here enforces their invariants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EconomyEntryType, FarmAction, Mode, NotificationLevel, PlotState};
use crate::ids::{EconomyEntryId, PlotInstanceId, TransactionId};

// ---------------------------------------------------------------------------
// Plot and economy views
// ---------------------------------------------------------------------------

/// Read-only view of one plot for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlotView {
    /// Position in the grid, `0..N`.
    pub index: u32,
    /// Current lifecycle state.
    pub state: PlotState,
    /// Planting episode, present for every state except `Empty`.
    pub instance_id: Option<PlotInstanceId>,
    /// When the plot reaches `Mature`, set once it has been watered.
    pub harvest_at: Option<DateTime<Utc>>,
}

/// Read-only view of the economy for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EconomyView {
    /// Seeds available for planting.
    pub seed_inventory: u32,
    /// Harvested plants waiting to be sold.
    pub harvested_inventory: u32,
    /// Local currency balance.
    #[ts(as = "String")]
    pub currency_balance: Decimal,
}

/// Full farm state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FarmSnapshot {
    /// Every plot, ordered by index.
    pub plots: Vec<PlotView>,
    /// Inventories and balance.
    pub economy: EconomyView,
    /// Currently selected click mode.
    pub mode: Mode,
}

impl FarmSnapshot {
    /// Look up a plot view by index.
    pub fn plot(&self, index: u32) -> Option<&PlotView> {
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.plots.get(idx))
    }
}

// ---------------------------------------------------------------------------
// Economy history
// ---------------------------------------------------------------------------

/// One append-only record of an economy mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EconomyEntry {
    /// Entry identifier.
    pub id: EconomyEntryId,
    /// What kind of mutation this was.
    pub entry_type: EconomyEntryType,
    /// Units of seeds or plants moved.
    pub quantity: u32,
    /// Money moved (wallet cost for purchases, proceeds for sales, zero otherwise).
    #[ts(as = "String")]
    pub amount: Decimal,
    /// When the mutation was applied.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Action reporting
// ---------------------------------------------------------------------------

/// Receipt returned by the remote ledger for a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TxReceipt {
    /// Transaction identifier.
    pub tx_id: TransactionId,
    /// When the ledger confirmed the transaction.
    pub confirmed_at: DateTime<Utc>,
}

/// Outcome of a successful user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionReport {
    /// Which action succeeded.
    pub action: FarmAction,
    /// Target plot, for plot actions.
    pub plot: Option<u32>,
    /// Plot state after the action, for plot actions.
    pub state: Option<PlotState>,
    /// Seeds bought or plants sold.
    pub quantity: Option<u32>,
    /// Wallet cost for purchases, proceeds for sales.
    #[ts(as = "Option<String>")]
    pub amount: Option<Decimal>,
    /// Remote transaction, absent for local-only actions.
    pub receipt: Option<TxReceipt>,
}

impl ActionReport {
    /// Report for a confirmed plot action.
    pub const fn plot_action(
        action: FarmAction,
        plot: u32,
        state: PlotState,
        receipt: TxReceipt,
    ) -> Self {
        Self {
            action,
            plot: Some(plot),
            state: Some(state),
            quantity: None,
            amount: None,
            receipt: Some(receipt),
        }
    }
}

/// A message suitable for a toast or banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Notification {
    /// Success or error.
    pub level: NotificationLevel,
    /// Short headline.
    pub title: String,
    /// Optional detail line.
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Change feed
// ---------------------------------------------------------------------------

/// A committed change to the farm, published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FarmEvent {
    /// A plot changed state, through a confirmed action or a growth step.
    PlotChanged {
        /// The plot after the change.
        plot: PlotView,
        /// State before the change.
        previous: PlotState,
    },
    /// Inventories or balance changed.
    EconomyChanged {
        /// The economy after the change.
        economy: EconomyView,
    },
    /// The click mode changed.
    ModeChanged {
        /// The new mode.
        mode: Mode,
    },
}
