//! The farm controller: user actions reconciled against the remote ledger.
//!
//! Every remote action follows the same shape:
//!
//! 1. Read the store and check the local precondition. On failure return a
//!    [`PreconditionError`] without calling the ledger.
//! 2. Check the wallet session.
//! 3. Call the ledger with the read lock released, bounded by the configured
//!    timeout.
//! 4. On confirmation take the write lock, re-validate with a conditional
//!    write, and apply the one mutation the action owns. If another action
//!    moved the plot in the meantime the result is [`FarmError::Conflict`]
//!    and nothing changes.
//!
//! Failed or timed-out calls leave the store exactly as it was. Nothing is
//! retried.

use core::future::Future;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use saverville_types::{
    ActionReport, FarmAction, FarmEvent, FarmSnapshot, Mode, PlotInstanceId, PlotState, PlotView,
};
use saverville_ledger::EconomyError;
use saverville_world::{RegistryError, SetOutcome};

use crate::config::FarmConfig;
use crate::error::{FarmError, PreconditionError};
use crate::gateway::{GatewayError, RemoteLedgerGateway};
use crate::scheduler::{GrowthScheduler, MATURE_AFTER};
use crate::store::{FarmState, FarmStore};

/// Drives the farm on behalf of the player.
#[derive(Debug)]
pub struct FarmController<G> {
    store: FarmStore,
    scheduler: GrowthScheduler,
    gateway: G,
    sale_rate: Decimal,
    remote_timeout: Duration,
}

impl<G: RemoteLedgerGateway> FarmController<G> {
    /// Build a controller with a fresh farm: every plot empty, inventories
    /// zero, balance at the configured starting value.
    pub fn new(config: &FarmConfig, gateway: G) -> Result<Self, FarmError> {
        let state = FarmState::new(config.grid.plot_count, config.economy.starting_balance)?;
        let store = FarmStore::new(state);
        Ok(Self::with_store(
            store,
            gateway,
            config.economy.sale_rate,
            config.ledger.remote_timeout(),
        ))
    }

    /// Build a controller over an existing store.
    pub fn with_store(
        store: FarmStore,
        gateway: G,
        sale_rate: Decimal,
        remote_timeout: Duration,
    ) -> Self {
        let scheduler = GrowthScheduler::new(store.clone());
        Self {
            store,
            scheduler,
            gateway,
            sale_rate,
            remote_timeout,
        }
    }

    /// The shared store.
    pub const fn store(&self) -> &FarmStore {
        &self.store
    }

    /// The growth scheduler.
    pub const fn scheduler(&self) -> &GrowthScheduler {
        &self.scheduler
    }

    /// The remote ledger.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Snapshot the farm for rendering.
    pub async fn snapshot(&self) -> FarmSnapshot {
        self.store.snapshot().await
    }

    /// Subscribe to committed changes.
    pub fn subscribe(&self) -> broadcast::Receiver<FarmEvent> {
        self.store.subscribe()
    }

    /// Current click mode.
    pub async fn mode(&self) -> Mode {
        self.store.read().await.mode
    }

    /// Select the click mode.
    pub async fn set_mode(&self, mode: Mode) {
        let changed = {
            let mut state = self.store.write().await;
            let changed = state.mode != mode;
            state.mode = mode;
            changed
        };
        if changed {
            debug!(?mode, "mode changed");
            self.store.publish(FarmEvent::ModeChanged { mode });
        }
    }

    /// Perform the current mode's action on `index`.
    pub async fn request_click(&self, index: u32) -> Result<ActionReport, FarmError> {
        match self.mode().await {
            Mode::Planting => self.request_plant(index).await,
            Mode::Watering => self.request_water(index).await,
            Mode::Harvesting => self.request_harvest(index).await,
        }
    }

    // -----------------------------------------------------------------------
    // Plot actions
    // -----------------------------------------------------------------------

    /// Plant a seed on an empty plot.
    pub async fn request_plant(&self, index: u32) -> Result<ActionReport, FarmError> {
        {
            let state = self.store.read().await;
            let (current, _) = plot_status(&state, index)?;
            if state.economy.seed_inventory() == 0 {
                return Err(PreconditionError::NoSeeds.into());
            }
            if current != PlotState::Empty {
                return Err(PreconditionError::PlotNotEmpty {
                    index,
                    state: current,
                }
                .into());
            }
        }
        self.require_wallet()?;

        let receipt = self
            .confirm(FarmAction::Plant, self.gateway.plant_seed(index))
            .await?;

        let (plot, previous, economy) = {
            let mut state = self.store.write().await;
            if state.economy.seed_inventory() == 0 {
                return Err(conflict(FarmAction::Plant, index));
            }
            let outcome = state.registry.try_set_state(index, None, PlotState::Seeded);
            let (previous, plot) = applied(FarmAction::Plant, index, outcome)?;
            state.economy.consume_seed()?;
            (plot, previous, state.economy.view())
        };

        info!(index, instance_id = ?plot.instance_id, seeds = economy.seed_inventory, "seed planted");
        self.store.publish(FarmEvent::PlotChanged { plot, previous });
        self.store.publish(FarmEvent::EconomyChanged { economy });
        Ok(ActionReport::plot_action(
            FarmAction::Plant,
            index,
            PlotState::Seeded,
            receipt,
        ))
    }

    /// Water a seeded plot and start its growth timeline.
    pub async fn request_water(&self, index: u32) -> Result<ActionReport, FarmError> {
        let instance_id = {
            let state = self.store.read().await;
            match plot_status(&state, index)? {
                (PlotState::Seeded, Some(id)) => id,
                (current, _) => {
                    return Err(PreconditionError::NotSeeded {
                        index,
                        state: current,
                    }
                    .into());
                }
            }
        };
        self.require_wallet()?;

        let receipt = self
            .confirm(FarmAction::Water, self.gateway.water_plant(index))
            .await?;

        let (plot, previous) = {
            let mut state = self.store.write().await;
            let outcome =
                state
                    .registry
                    .try_set_state(index, Some(instance_id), PlotState::Germinating);
            let (previous, _) = applied(FarmAction::Water, index, outcome)?;
            let harvest_at = TimeDelta::from_std(MATURE_AFTER)
                .ok()
                .and_then(|delta| Utc::now().checked_add_signed(delta));
            if let Some(at) = harvest_at {
                let outcome = state.registry.set_harvest_at(index, instance_id, at);
                applied(FarmAction::Water, index, outcome)?;
            }
            let plot = state.registry.get(index)?.view();
            (plot, previous)
        };
        self.scheduler.arm(index, instance_id).await;

        info!(index, %instance_id, harvest_at = ?plot.harvest_at, "plot watered");
        self.store.publish(FarmEvent::PlotChanged { plot, previous });
        Ok(ActionReport::plot_action(
            FarmAction::Water,
            index,
            PlotState::Germinating,
            receipt,
        ))
    }

    /// Harvest a growing or mature plot.
    pub async fn request_harvest(&self, index: u32) -> Result<ActionReport, FarmError> {
        let instance_id = {
            let state = self.store.read().await;
            match plot_status(&state, index)? {
                (current, Some(id)) if current.is_harvestable() => id,
                (current, _) => {
                    return Err(PreconditionError::NotHarvestable {
                        index,
                        state: current,
                    }
                    .into());
                }
            }
        };
        self.require_wallet()?;

        let receipt = self
            .confirm(FarmAction::Harvest, self.gateway.harvest_plant(index))
            .await?;

        let (plot, previous, economy) = {
            let mut state = self.store.write().await;
            if state.economy.harvested_inventory() == u32::MAX {
                return Err(EconomyError::ArithmeticOverflow("harvested inventory").into());
            }
            let outcome = state
                .registry
                .try_set_state(index, Some(instance_id), PlotState::Empty);
            let (previous, plot) = applied(FarmAction::Harvest, index, outcome)?;
            state.economy.record_harvest()?;
            (plot, previous, state.economy.view())
        };
        self.scheduler.disarm(index, instance_id).await;

        info!(index, %instance_id, from = %previous, plants = economy.harvested_inventory, "plot harvested");
        self.store.publish(FarmEvent::PlotChanged { plot, previous });
        self.store.publish(FarmEvent::EconomyChanged { economy });
        Ok(ActionReport::plot_action(
            FarmAction::Harvest,
            index,
            PlotState::Empty,
            receipt,
        ))
    }

    // -----------------------------------------------------------------------
    // Economy actions
    // -----------------------------------------------------------------------

    /// Buy `quantity` seeds at the ledger's current unit price.
    ///
    /// The price is queried fresh for every purchase. Seeds are credited
    /// only once the ledger confirms.
    pub async fn request_purchase(&self, quantity: u32) -> Result<ActionReport, FarmError> {
        if quantity == 0 {
            return Err(PreconditionError::InvalidQuantity.into());
        }
        self.require_wallet()?;

        let unit_price = self
            .confirm(FarmAction::Purchase, self.gateway.seed_unit_price())
            .await?;
        let cost = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or(EconomyError::ArithmeticOverflow("purchase cost"))?;

        let receipt = self
            .confirm(
                FarmAction::Purchase,
                self.gateway.purchase_seeds(quantity, cost),
            )
            .await?;

        let economy = {
            let mut state = self.store.write().await;
            state.economy.record_purchase(quantity, cost)?;
            state.economy.view()
        };

        info!(quantity, %unit_price, %cost, seeds = economy.seed_inventory, "seeds purchased");
        self.store.publish(FarmEvent::EconomyChanged { economy });
        Ok(ActionReport {
            action: FarmAction::Purchase,
            plot: None,
            state: None,
            quantity: Some(quantity),
            amount: Some(cost),
            receipt: Some(receipt),
        })
    }

    /// Sell every harvested plant at the configured rate.
    ///
    /// Local bookkeeping only; the ledger is not involved.
    pub async fn request_sell(&self) -> Result<ActionReport, FarmError> {
        let (sold, proceeds, economy) = {
            let mut state = self.store.write().await;
            let (sold, proceeds) = state
                .economy
                .sell_all(self.sale_rate)
                .map_err(|e| match e {
                    EconomyError::NothingToSell => PreconditionError::NothingToSell.into(),
                    other => FarmError::from(other),
                })?;
            (sold, proceeds, state.economy.view())
        };

        info!(sold, %proceeds, balance = %economy.currency_balance, "plants sold");
        self.store.publish(FarmEvent::EconomyChanged { economy });
        Ok(ActionReport {
            action: FarmAction::Sell,
            plot: None,
            state: None,
            quantity: Some(sold),
            amount: Some(proceeds),
            receipt: None,
        })
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_wallet(&self) -> Result<(), PreconditionError> {
        if self.gateway.is_connected() {
            Ok(())
        } else {
            Err(PreconditionError::WalletUnavailable)
        }
    }

    /// Await a ledger call, bounded by the remote timeout.
    async fn confirm<T>(
        &self,
        action: FarmAction,
        call: impl Future<Output = Result<T, GatewayError>> + Send,
    ) -> Result<T, FarmError> {
        match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => {
                warn!(%action, reason = source.reason(), "ledger call failed");
                Err(FarmError::Remote { action, source })
            }
            Err(_) => {
                let after_ms = u64::try_from(self.remote_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(%action, after_ms, "ledger call timed out");
                Err(FarmError::Timeout { action, after_ms })
            }
        }
    }
}

/// Unpack a conditional write made after confirmation.
///
/// A stale outcome or a transition that is no longer legal means a
/// concurrent action got there first.
fn applied(
    action: FarmAction,
    index: u32,
    outcome: Result<SetOutcome, RegistryError>,
) -> Result<(PlotState, PlotView), FarmError> {
    match outcome {
        Ok(SetOutcome::Applied { previous, plot }) => Ok((previous, plot)),
        Ok(SetOutcome::Stale { .. }) | Err(RegistryError::InvalidTransition { .. }) => {
            Err(conflict(action, index))
        }
        Err(e) => Err(e.into()),
    }
}

fn conflict(action: FarmAction, index: u32) -> FarmError {
    warn!(%action, index, "confirmed action lost a race; local state unchanged");
    FarmError::Conflict { action, index }
}

/// Current state and instance id of `index`, as a precondition failure when
/// out of range.
fn plot_status(
    state: &FarmState,
    index: u32,
) -> Result<(PlotState, Option<PlotInstanceId>), PreconditionError> {
    state
        .registry
        .get(index)
        .map(|plot| (plot.state(), plot.instance_id()))
        .map_err(|_| PreconditionError::PlotOutOfRange {
            index,
            len: state.registry.len(),
        })
}
