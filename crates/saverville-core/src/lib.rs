//! Farm controller, growth scheduling, and ledger reconciliation for
//! Saverville.
//!
//! This crate owns everything that happens between a player's click and a
//! committed change to the farm: local precondition checks, the remote
//! ledger round trip, the conditional write that applies a confirmed
//! result, and the timed growth that follows watering.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `saverville-config.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`FarmController`], the entry point for every player
//!   action.
//! - [`error`] -- [`FarmError`] and [`PreconditionError`].
//! - [`gateway`] -- [`RemoteLedgerGateway`] trait and [`GatewayError`].
//! - [`notify`] -- Player-facing notifications for action outcomes.
//! - [`scheduler`] -- [`GrowthScheduler`], the identity-guarded growth
//!   timeline.
//! - [`simulated`] -- [`SimulatedLedger`], an in-memory gateway.
//! - [`store`] -- [`FarmStore`], the single lock around grid, economy, and
//!   mode.
//!
//! [`FarmController`]: controller::FarmController
//! [`FarmError`]: error::FarmError
//! [`PreconditionError`]: error::PreconditionError
//! [`RemoteLedgerGateway`]: gateway::RemoteLedgerGateway
//! [`GatewayError`]: gateway::GatewayError
//! [`GrowthScheduler`]: scheduler::GrowthScheduler
//! [`SimulatedLedger`]: simulated::SimulatedLedger
//! [`FarmStore`]: store::FarmStore

pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod scheduler;
pub mod simulated;
pub mod store;

pub use config::FarmConfig;
pub use controller::FarmController;
pub use error::{FarmError, PreconditionError};
pub use gateway::{GatewayError, LedgerOp, RemoteLedgerGateway};
pub use scheduler::GrowthScheduler;
pub use simulated::SimulatedLedger;
pub use store::{FarmState, FarmStore};
