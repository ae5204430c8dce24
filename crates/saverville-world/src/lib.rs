//! Farm grid and plot lifecycle for Saverville.
//!
//! This crate models the grid of plots and the only legal ways a plot can
//! change state. It knows nothing about the remote ledger or timers: callers
//! decide *when* a transition should happen, the registry decides *whether*
//! it may.
//!
//! # Modules
//!
//! - [`error`] -- Error types for registry operations.
//! - [`plots`] -- [`Plot`], [`PlotRegistry`], and the instance-id guarded
//!   conditional setter.

pub mod error;
pub mod plots;

// Re-export primary types at crate root.
pub use error::RegistryError;
pub use plots::{DEFAULT_PLOT_COUNT, Plot, PlotRegistry, SetOutcome};
