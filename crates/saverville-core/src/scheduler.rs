//! Local growth timeline for watered plots.
//!
//! Watering is the last remote step of a planting episode; everything after
//! it is simulated here. [`GrowthScheduler::arm`] starts one task per plot
//! that advances it at fixed offsets from the moment it was armed:
//!
//! | Offset | Transition |
//! |--------|------------|
//! | +3s | Germinating -> Seedling |
//! | +6s | Seedling -> Growing |
//! | +9s | Growing -> Mature |
//!
//! A task carries the plot index and the [`PlotInstanceId`] it was armed
//! with, never the plot itself. Each step is a conditional write; once the
//! plot has been harvested or re-planted the write comes back stale and the
//! timeline ends quietly. Aborting a timeline on harvest is only a shortcut.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use saverville_types::{FarmEvent, PlotInstanceId, PlotState};
use saverville_world::SetOutcome;

use crate::store::FarmStore;

/// Delay from watering to `Seedling`.
pub const SEEDLING_AFTER: Duration = Duration::from_secs(3);

/// Delay from watering to `Growing`.
pub const GROWING_AFTER: Duration = Duration::from_secs(6);

/// Delay from watering to `Mature`.
pub const MATURE_AFTER: Duration = Duration::from_secs(9);

/// Offsets from arming of each timed step, in order.
///
/// Step `n` moves the plot to the `n`th [`PlotState::next_growth_stage`]
/// after [`PlotState::Germinating`].
pub const GROWTH_OFFSETS: [Duration; 3] = [SEEDLING_AFTER, GROWING_AFTER, MATURE_AFTER];

/// The timed steps as `(offset, target state)` pairs.
///
/// Stops early if the growth chain is shorter than [`GROWTH_OFFSETS`].
pub fn growth_timeline() -> impl Iterator<Item = (Duration, PlotState)> {
    GROWTH_OFFSETS
        .into_iter()
        .scan(PlotState::Germinating, |state, offset| {
            let next = state.next_growth_stage()?;
            *state = next;
            Some((offset, next))
        })
}

/// A running timeline for one plot.
#[derive(Debug)]
struct ArmedTimeline {
    instance_id: PlotInstanceId,
    handle: JoinHandle<()>,
}

type Pending = Arc<Mutex<BTreeMap<u32, ArmedTimeline>>>;

/// Owns the pending growth timelines, keyed by plot index.
#[derive(Debug, Clone)]
pub struct GrowthScheduler {
    store: FarmStore,
    pending: Pending,
}

impl GrowthScheduler {
    /// Create a scheduler writing into `store`.
    pub fn new(store: FarmStore) -> Self {
        Self {
            store,
            pending: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Start the growth timeline for `index`, planting episode `instance_id`.
    ///
    /// Offsets are measured from this call. A timeline already running for
    /// the same index is aborted.
    pub async fn arm(&self, index: u32, instance_id: PlotInstanceId) {
        let start = Instant::now();
        let mut pending = self.pending.lock().await;
        let handle = tokio::spawn(run_timeline(
            self.store.clone(),
            Arc::clone(&self.pending),
            index,
            instance_id,
            start,
        ));
        if let Some(previous) = pending.insert(index, ArmedTimeline { instance_id, handle }) {
            debug!(index, previous = %previous.instance_id, "replacing growth timeline");
            previous.handle.abort();
        }
        debug!(index, %instance_id, "growth timeline armed");
    }

    /// Abort the timeline for `index` if it belongs to planting episode
    /// `expected`.
    ///
    /// A timeline armed for a later episode is left running. Returns whether
    /// a timeline was aborted.
    pub async fn disarm(&self, index: u32, expected: PlotInstanceId) -> bool {
        let mut pending = self.pending.lock().await;
        if !pending
            .get(&index)
            .is_some_and(|timeline| timeline.instance_id == expected)
        {
            return false;
        }
        pending.remove(&index).is_some_and(|timeline| {
            timeline.handle.abort();
            debug!(index, instance_id = %timeline.instance_id, "growth timeline disarmed");
            true
        })
    }

    /// Abort every running timeline.
    pub async fn disarm_all(&self) -> usize {
        let drained = core::mem::take(&mut *self.pending.lock().await);
        let count = drained.len();
        for timeline in drained.into_values() {
            timeline.handle.abort();
        }
        count
    }

    /// Planting episode of the timeline running for `index`, if any.
    pub async fn armed_instance(&self, index: u32) -> Option<PlotInstanceId> {
        self.pending
            .lock()
            .await
            .get(&index)
            .map(|timeline| timeline.instance_id)
    }

    /// Number of timelines still running.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

/// Body of one timeline task.
async fn run_timeline(
    store: FarmStore,
    pending: Pending,
    index: u32,
    instance_id: PlotInstanceId,
    start: Instant,
) {
    for (offset, next) in growth_timeline() {
        let Some(deadline) = start.checked_add(offset) else {
            warn!(index, "growth deadline overflow");
            break;
        };
        tokio::time::sleep_until(deadline).await;

        let outcome = store
            .write()
            .await
            .registry
            .try_set_state(index, Some(instance_id), next);

        match outcome {
            Ok(SetOutcome::Applied { previous, plot }) => {
                debug!(index, %instance_id, from = %previous, to = %next, "plot grew");
                store.publish(FarmEvent::PlotChanged { plot, previous });
            }
            Ok(SetOutcome::Stale { current }) => {
                debug!(index, %instance_id, ?current, "stale growth step ignored");
                break;
            }
            Err(e) => {
                warn!(index, %instance_id, error = %e, "growth step rejected");
                break;
            }
        }
    }

    let mut pending = pending.lock().await;
    if pending
        .get(&index)
        .is_some_and(|timeline| timeline.instance_id == instance_id)
    {
        pending.remove(&index);
    }
}

#[cfg(test)]
mod tests {
    use saverville_world::Plot;

    use super::*;
    use crate::store::FarmState;

    /// Plant and water `index` directly in the registry.
    async fn watered(store: &FarmStore, index: u32) -> PlotInstanceId {
        let mut state = store.write().await;
        assert!(state.registry.try_set_state(index, None, PlotState::Seeded).is_ok());
        let id = state
            .registry
            .get(index)
            .ok()
            .and_then(Plot::instance_id)
            .unwrap_or_default();
        assert!(
            state
                .registry
                .try_set_state(index, Some(id), PlotState::Germinating)
                .is_ok()
        );
        id
    }

    async fn state_of(store: &FarmStore, index: u32) -> Option<PlotState> {
        store.read().await.registry.get(index).ok().map(Plot::state)
    }

    /// Let spawned timeline tasks observe the advanced clock.
    async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }

    /// Sleep on the paused clock, which auto-advances through every timer
    /// due before `by`.
    async fn advance(by: Duration) {
        tokio::time::sleep(by).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timeline_advances_at_fixed_offsets() {
        let store = FarmStore::new(FarmState::default());
        let scheduler = GrowthScheduler::new(store.clone());
        let id = watered(&store, 0).await;
        scheduler.arm(0, id).await;
        settle().await;

        assert_eq!(state_of(&store, 0).await, Some(PlotState::Germinating));
        advance(Duration::from_millis(2_999)).await;
        assert_eq!(state_of(&store, 0).await, Some(PlotState::Germinating));
        advance(Duration::from_millis(1)).await;
        assert_eq!(state_of(&store, 0).await, Some(PlotState::Seedling));
        advance(Duration::from_secs(3)).await;
        assert_eq!(state_of(&store, 0).await, Some(PlotState::Growing));
        advance(Duration::from_secs(3)).await;
        assert_eq!(state_of(&store, 0).await, Some(PlotState::Mature));

        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeline_publishes_each_step() {
        let store = FarmStore::new(FarmState::default());
        let scheduler = GrowthScheduler::new(store.clone());
        let mut rx = store.subscribe();
        let id = watered(&store, 2).await;
        scheduler.arm(2, id).await;

        advance(MATURE_AFTER).await;

        let mut seen = Vec::new();
        while let Ok(FarmEvent::PlotChanged { plot, .. }) = rx.try_recv() {
            seen.push(plot.state);
        }
        assert_eq!(
            seen,
            vec![PlotState::Seedling, PlotState::Growing, PlotState::Mature]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn replanted_plot_ignores_old_timeline() {
        let store = FarmStore::new(FarmState::default());
        let scheduler = GrowthScheduler::new(store.clone());
        let old = watered(&store, 5).await;
        scheduler.arm(5, old).await;

        // Harvest and re-plant behind the scheduler's back, without
        // disarming, so only the identity guard protects the plot.
        {
            let mut state = store.write().await;
            let reg = &mut state.registry;
            assert!(reg.try_set_state(5, Some(old), PlotState::Seedling).is_ok());
            assert!(reg.try_set_state(5, Some(old), PlotState::Growing).is_ok());
            assert!(reg.try_set_state(5, Some(old), PlotState::Empty).is_ok());
            assert!(reg.try_set_state(5, None, PlotState::Seeded).is_ok());
        }

        advance(MATURE_AFTER).await;
        assert_eq!(state_of(&store, 5).await, Some(PlotState::Seeded));
        assert_eq!(scheduler.pending_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_stops_the_timeline() {
        let store = FarmStore::new(FarmState::default());
        let scheduler = GrowthScheduler::new(store.clone());
        let id = watered(&store, 1).await;
        scheduler.arm(1, id).await;
        assert_eq!(scheduler.armed_instance(1).await, Some(id));

        assert!(scheduler.disarm(1, id).await);
        assert!(!scheduler.disarm(1, id).await);
        advance(MATURE_AFTER).await;
        assert_eq!(state_of(&store, 1).await, Some(PlotState::Germinating));
    }

    #[tokio::test(start_paused = true)]
    async fn disarm_with_old_episode_keeps_new_timeline() {
        let store = FarmStore::new(FarmState::default());
        let scheduler = GrowthScheduler::new(store.clone());
        let old = watered(&store, 3).await;
        {
            let mut state = store.write().await;
            let reg = &mut state.registry;
            assert!(reg.try_set_state(3, Some(old), PlotState::Seedling).is_ok());
            assert!(reg.try_set_state(3, Some(old), PlotState::Growing).is_ok());
            assert!(reg.try_set_state(3, Some(old), PlotState::Empty).is_ok());
        }
        let new = watered(&store, 3).await;
        scheduler.arm(3, new).await;

        assert!(!scheduler.disarm(3, old).await);
        assert_eq!(scheduler.armed_instance(3).await, Some(new));
        advance(MATURE_AFTER).await;
        assert_eq!(state_of(&store, 3).await, Some(PlotState::Mature));
    }

    #[test]
    fn timeline_follows_the_growth_chain() {
        let steps: Vec<(Duration, PlotState)> = growth_timeline().collect();
        assert_eq!(
            steps,
            vec![
                (SEEDLING_AFTER, PlotState::Seedling),
                (GROWING_AFTER, PlotState::Growing),
                (MATURE_AFTER, PlotState::Mature),
            ]
        );
        assert_eq!(
            steps.last().map(|(_, state)| state.next_growth_stage()),
            Some(None)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn plots_run_independent_timelines() {
        let store = FarmStore::new(FarmState::default());
        let scheduler = GrowthScheduler::new(store.clone());
        let first = watered(&store, 0).await;
        scheduler.arm(0, first).await;

        advance(Duration::from_secs(4)).await;
        let second = watered(&store, 1).await;
        scheduler.arm(1, second).await;
        assert_eq!(scheduler.pending_count().await, 2);

        advance(Duration::from_secs(2)).await;
        assert_eq!(state_of(&store, 0).await, Some(PlotState::Growing));
        assert_eq!(state_of(&store, 1).await, Some(PlotState::Germinating));

        advance(Duration::from_secs(1)).await;
        assert_eq!(state_of(&store, 1).await, Some(PlotState::Seedling));

        assert_eq!(scheduler.disarm_all().await, 2);
    }
}
