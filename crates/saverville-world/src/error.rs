//! Error types for the `saverville-world` crate.
//!
//! A rejected identity check is not an error here: it is reported as
//! [`SetOutcome::Stale`](crate::plots::SetOutcome::Stale).

use saverville_types::PlotState;

/// Errors that can occur during plot registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The plot index is outside the grid.
    #[error("plot {index} is out of range (grid has {len} plots)")]
    IndexOutOfBounds {
        /// The requested index.
        index: u32,
        /// Number of plots in the grid.
        len: u32,
    },

    /// The requested state change is not in the lifecycle table.
    #[error("invalid transition on plot {index}: {from} -> {to}")]
    InvalidTransition {
        /// The plot.
        index: u32,
        /// Its current state.
        from: PlotState,
        /// The requested state.
        to: PlotState,
    },

    /// A grid must contain at least one plot.
    #[error("farm grid must contain at least one plot")]
    EmptyGrid,
}
