//! In-memory stand-in for the farm contract.
//!
//! [`SimulatedLedger`] implements [`RemoteLedgerGateway`] without a chain.
//! It waits a configurable confirmation latency, can decline a percentage of
//! transactions the way a user declining a signature would, replays
//! scripted one-shot failures, and keeps a minimal on-ledger mirror (seed
//! balance, planted and watered plots) so impossible calls revert like they
//! would on the real contract.
//!
//! Control fields other than the latency use atomics and async mutexes so a
//! test (or the console) can reconfigure the ledger while the controller
//! holds it.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use chrono::Utc;
use rand::Rng as _;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::debug;

use saverville_types::{TransactionId, TxReceipt};

use crate::config::LedgerConfig;
use crate::gateway::{GatewayError, LedgerOp, RemoteLedgerGateway};

/// Reason reported when the simulated wallet declines a transaction.
pub const DECLINED_REASON: &str = "User denied transaction signature.";

/// One call the simulated ledger received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCall {
    /// Which operation.
    pub op: LedgerOp,
    /// Target plot, for plot operations.
    pub plot: Option<u32>,
    /// Seeds requested, for purchases.
    pub quantity: Option<u32>,
    /// Payment attached, for purchases.
    pub payment: Option<Decimal>,
    /// Whether the call confirmed.
    pub confirmed: bool,
}

impl LedgerCall {
    const fn plot(op: LedgerOp, plot: u32) -> Self {
        Self {
            op,
            plot: Some(plot),
            quantity: None,
            payment: None,
            confirmed: false,
        }
    }
}

/// The contract-side view of a plot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct OnChainPlot {
    watered: bool,
}

/// Minimal contract state.
#[derive(Debug, Default)]
struct ContractState {
    seeds: u32,
    plots: BTreeMap<u32, OnChainPlot>,
}

/// An in-memory [`RemoteLedgerGateway`].
#[derive(Debug)]
pub struct SimulatedLedger {
    latency: Duration,
    failure_percent: AtomicU32,
    connected: AtomicBool,
    contract_checks: AtomicBool,
    unit_price: Mutex<Decimal>,
    contract: Mutex<ContractState>,
    scripted: Mutex<BTreeMap<LedgerOp, VecDeque<GatewayError>>>,
    calls: Mutex<Vec<LedgerCall>>,
}

impl SimulatedLedger {
    /// Create a ledger from configuration.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            latency: config.simulated_latency(),
            failure_percent: AtomicU32::new(config.failure_percent.min(100)),
            connected: AtomicBool::new(config.wallet_connected),
            contract_checks: AtomicBool::new(true),
            unit_price: Mutex::new(config.seed_unit_price),
            contract: Mutex::new(ContractState::default()),
            scripted: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A connected ledger with the given price and latency and no random
    /// failures.
    pub fn with_price(unit_price: Decimal, latency: Duration) -> Self {
        let config = LedgerConfig {
            simulated_latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            seed_unit_price: unit_price,
            failure_percent: 0,
            wallet_connected: true,
            ..LedgerConfig::default()
        };
        Self::new(&config)
    }

    // -----------------------------------------------------------------------
    // Controls
    // -----------------------------------------------------------------------

    /// Drop the wallet session.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Restore the wallet session.
    pub fn connect(&self) {
        self.connected.store(true, Ordering::Release);
    }

    /// Change the percentage of randomly declined transactions.
    pub fn set_failure_percent(&self, percent: u32) {
        self.failure_percent.store(percent.min(100), Ordering::Release);
    }

    /// Turn the contract-side validity checks on or off.
    ///
    /// With checks off every transaction confirms, which lets tests exercise
    /// the controller's own conflict handling.
    pub fn set_contract_checks(&self, enabled: bool) {
        self.contract_checks.store(enabled, Ordering::Release);
    }

    /// Change the seed unit price.
    pub async fn set_unit_price(&self, price: Decimal) {
        *self.unit_price.lock().await = price;
    }

    /// Make the next call to `op` fail with `error`.
    ///
    /// Multiple scripted failures for the same operation are used in order.
    pub async fn fail_next(&self, op: LedgerOp, error: GatewayError) {
        self.scripted
            .lock()
            .await
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Every transaction received so far, oldest first.
    pub async fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().await.clone()
    }

    /// Seeds the contract believes the player owns.
    pub async fn on_chain_seeds(&self) -> u32 {
        self.contract.lock().await.seeds
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn roll_decline(&self) -> bool {
        let percent = self.failure_percent.load(Ordering::Acquire).min(100);
        percent > 0 && rand::rng().random_ratio(percent, 100)
    }

    /// Shared failure handling: latency, scripted failures, random declines.
    async fn submit(&self, op: LedgerOp) -> Result<(), GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let scripted = self
            .scripted
            .lock()
            .await
            .get_mut(&op)
            .and_then(VecDeque::pop_front);
        if let Some(error) = scripted {
            return Err(error);
        }

        if self.roll_decline() {
            return Err(GatewayError::Rejected {
                reason: DECLINED_REASON.to_owned(),
            });
        }
        Ok(())
    }

    async fn finish(
        &self,
        mut call: LedgerCall,
        result: Result<(), GatewayError>,
    ) -> Result<TxReceipt, GatewayError> {
        call.confirmed = result.is_ok();
        debug!(op = ?call.op, plot = ?call.plot, confirmed = call.confirmed, "simulated transaction");
        self.calls.lock().await.push(call);
        result.map(|()| TxReceipt {
            tx_id: TransactionId::new(),
            confirmed_at: Utc::now(),
        })
    }

    fn checks_enabled(&self) -> bool {
        self.contract_checks.load(Ordering::Acquire)
    }

    fn revert(reason: &str) -> GatewayError {
        GatewayError::Reverted {
            reason: format!("execution reverted: {reason}"),
        }
    }
}

impl Default for SimulatedLedger {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl RemoteLedgerGateway for SimulatedLedger {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn seed_unit_price(&self) -> Result<Decimal, GatewayError> {
        let scripted = self
            .scripted
            .lock()
            .await
            .get_mut(&LedgerOp::SeedUnitPrice)
            .and_then(VecDeque::pop_front);
        if let Some(error) = scripted {
            return Err(error);
        }
        Ok(*self.unit_price.lock().await)
    }

    async fn purchase_seeds(
        &self,
        quantity: u32,
        payment: Decimal,
    ) -> Result<TxReceipt, GatewayError> {
        let call = LedgerCall {
            op: LedgerOp::PurchaseSeeds,
            plot: None,
            quantity: Some(quantity),
            payment: Some(payment),
            confirmed: false,
        };
        let mut result = self.submit(LedgerOp::PurchaseSeeds).await;
        if result.is_ok() {
            let price = *self.unit_price.lock().await;
            let expected = price.checked_mul(Decimal::from(quantity));
            let mut contract = self.contract.lock().await;
            result = if self.checks_enabled() && expected != Some(payment) {
                Err(Self::revert("incorrect payment"))
            } else {
                contract.seeds = contract.seeds.saturating_add(quantity);
                Ok(())
            };
        }
        self.finish(call, result).await
    }

    async fn plant_seed(&self, plot: u32) -> Result<TxReceipt, GatewayError> {
        let call = LedgerCall::plot(LedgerOp::PlantSeed, plot);
        let mut result = self.submit(LedgerOp::PlantSeed).await;
        if result.is_ok() {
            let mut contract = self.contract.lock().await;
            result = if self.checks_enabled() && contract.seeds == 0 {
                Err(Self::revert("no seeds"))
            } else if self.checks_enabled() && contract.plots.contains_key(&plot) {
                Err(Self::revert("plot already planted"))
            } else {
                contract.seeds = contract.seeds.saturating_sub(1);
                contract.plots.insert(plot, OnChainPlot::default());
                Ok(())
            };
        }
        self.finish(call, result).await
    }

    async fn water_plant(&self, plot: u32) -> Result<TxReceipt, GatewayError> {
        let call = LedgerCall::plot(LedgerOp::WaterPlant, plot);
        let mut result = self.submit(LedgerOp::WaterPlant).await;
        if result.is_ok() {
            let mut contract = self.contract.lock().await;
            let checks = self.checks_enabled();
            result = match contract.plots.get_mut(&plot) {
                Some(state) if checks && state.watered => Err(Self::revert("already watered")),
                Some(state) => {
                    state.watered = true;
                    Ok(())
                }
                None if checks => Err(Self::revert("nothing planted")),
                None => Ok(()),
            };
        }
        self.finish(call, result).await
    }

    async fn harvest_plant(&self, plot: u32) -> Result<TxReceipt, GatewayError> {
        let call = LedgerCall::plot(LedgerOp::HarvestPlant, plot);
        let mut result = self.submit(LedgerOp::HarvestPlant).await;
        if result.is_ok() {
            let mut contract = self.contract.lock().await;
            let watered = contract.plots.get(&plot).is_some_and(|state| state.watered);
            result = if self.checks_enabled() && !watered {
                Err(Self::revert("plant not ready"))
            } else {
                contract.plots.remove(&plot);
                Ok(())
            };
        }
        self.finish(call, result).await
    }
}
