//! The owned farm store: grid, economy, and click mode behind one lock.
//!
//! [`FarmStore`] is the single serialization point for every mutation. The
//! controller and the growth scheduler each hold a clone; both take the
//! write lock only to apply an already-decided change and never across a
//! remote call or a timer wait.
//!
//! Committed changes are published on a broadcast channel so a presentation
//! layer can redraw without polling.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, broadcast};

use saverville_ledger::{Economy, EconomyError};
use saverville_types::{FarmEvent, FarmSnapshot, Mode};
use saverville_world::{PlotRegistry, RegistryError};

/// Capacity of the farm event channel.
///
/// A subscriber that falls behind by more than this many events receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest.
const EVENT_CAPACITY: usize = 256;

/// Everything the farm owns.
#[derive(Debug, Clone)]
pub struct FarmState {
    /// The plot grid.
    pub registry: PlotRegistry,
    /// Inventories and balance.
    pub economy: Economy,
    /// Current click mode.
    pub mode: Mode,
}

impl FarmState {
    /// A grid of `plot_count` empty plots and an economy holding only
    /// `starting_balance`.
    pub fn new(plot_count: u32, starting_balance: Decimal) -> Result<Self, FarmStateError> {
        Ok(Self {
            registry: PlotRegistry::new(plot_count)?,
            economy: Economy::new(starting_balance)?,
            mode: Mode::default(),
        })
    }

    /// Read-only projection for rendering.
    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            plots: self.registry.views(),
            economy: self.economy.view(),
            mode: self.mode,
        }
    }
}

impl Default for FarmState {
    fn default() -> Self {
        Self {
            registry: PlotRegistry::default(),
            economy: Economy::default(),
            mode: Mode::default(),
        }
    }
}

/// Errors building the initial farm state.
#[derive(Debug, thiserror::Error)]
pub enum FarmStateError {
    /// The grid could not be built.
    #[error("grid error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },

    /// The economy could not be built.
    #[error("economy error: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },
}

/// Shared handle to the farm state and its change feed.
#[derive(Debug, Clone)]
pub struct FarmStore {
    state: Arc<RwLock<FarmState>>,
    events: broadcast::Sender<FarmEvent>,
}

impl FarmStore {
    /// Wrap an initial state.
    pub fn new(state: FarmState) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(state)),
            events,
        }
    }

    /// Acquire shared read access.
    pub async fn read(&self) -> RwLockReadGuard<'_, FarmState> {
        self.state.read().await
    }

    /// Acquire exclusive write access.
    pub async fn write(&self) -> RwLockWriteGuard<'_, FarmState> {
        self.state.write().await
    }

    /// Snapshot the whole farm.
    pub async fn snapshot(&self) -> FarmSnapshot {
        self.state.read().await.snapshot()
    }

    /// Subscribe to committed changes.
    pub fn subscribe(&self) -> broadcast::Receiver<FarmEvent> {
        self.events.subscribe()
    }

    /// Publish a committed change.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    pub fn publish(&self, event: FarmEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use saverville_types::PlotState;

    use super::*;

    #[tokio::test]
    async fn initial_state_is_empty_grid_and_zeroed_economy() {
        let state = FarmState::new(4, Decimal::ZERO);
        assert!(state.is_ok());
        let store = FarmStore::new(state.unwrap_or_default());
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.plots.len(), 4);
        assert!(snapshot.plots.iter().all(|p| p.state == PlotState::Empty));
        assert_eq!(snapshot.economy.seed_inventory, 0);
        assert_eq!(snapshot.economy.harvested_inventory, 0);
        assert_eq!(snapshot.economy.currency_balance, Decimal::ZERO);
        assert_eq!(snapshot.mode, Mode::Planting);
    }

    #[test]
    fn zero_plots_is_rejected() {
        assert!(matches!(
            FarmState::new(0, Decimal::ZERO),
            Err(FarmStateError::Registry { .. })
        ));
    }

    #[tokio::test]
    async fn published_events_reach_subscribers() {
        let store = FarmStore::new(FarmState::default());
        assert_eq!(store.publish(FarmEvent::ModeChanged { mode: Mode::Watering }), 0);

        let mut rx = store.subscribe();
        assert_eq!(store.publish(FarmEvent::ModeChanged { mode: Mode::Watering }), 1);
        assert_eq!(
            rx.recv().await.ok(),
            Some(FarmEvent::ModeChanged { mode: Mode::Watering })
        );
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = FarmStore::new(FarmState::default());
        let other = store.clone();
        other.write().await.mode = Mode::Harvesting;
        assert_eq!(store.read().await.mode, Mode::Harvesting);
    }
}
