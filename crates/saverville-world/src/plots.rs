//! Plot state tracking: the farm grid and its conditional setter.
//!
//! Every plot runs the lifecycle in [`PlotState`]. The registry only ever
//! changes a plot through [`PlotRegistry::try_set_state`], a conditional
//! write keyed by the planting's [`PlotInstanceId`]: a caller holding an
//! instance id from an earlier planting episode cannot touch the plot once
//! it has been harvested or re-planted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use saverville_types::{PlotInstanceId, PlotState, PlotView};

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of plots in the default grid (10 x 10).
pub const DEFAULT_PLOT_COUNT: u32 = 100;

// ---------------------------------------------------------------------------
// Plot
// ---------------------------------------------------------------------------

/// Data that exists only while a plot is occupied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Planting {
    instance_id: PlotInstanceId,
    stage: PlotState,
    harvest_at: Option<DateTime<Utc>>,
}

impl Planting {
    fn sown() -> Self {
        Self {
            instance_id: PlotInstanceId::new(),
            stage: PlotState::Seeded,
            harvest_at: None,
        }
    }
}

/// One cell of the farm grid.
///
/// An empty plot has no planting, so it cannot carry an instance id or a
/// harvest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plot {
    index: u32,
    planting: Option<Planting>,
}

impl Plot {
    /// Create an empty plot at `index`.
    pub const fn empty(index: u32) -> Self {
        Self {
            index,
            planting: None,
        }
    }

    /// Position in the grid.
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlotState {
        self.planting
            .as_ref()
            .map_or(PlotState::Empty, |planting| planting.stage)
    }

    /// Current planting episode, `None` when empty.
    pub fn instance_id(&self) -> Option<PlotInstanceId> {
        self.planting.as_ref().map(|planting| planting.instance_id)
    }

    /// When the plot reaches `Mature`, once watered.
    pub fn harvest_at(&self) -> Option<DateTime<Utc>> {
        self.planting
            .as_ref()
            .and_then(|planting| planting.harvest_at)
    }

    /// Read-only projection for rendering.
    pub fn view(&self) -> PlotView {
        PlotView {
            index: self.index,
            state: self.state(),
            instance_id: self.instance_id(),
            harvest_at: self.harvest_at(),
        }
    }
}

// ---------------------------------------------------------------------------
// SetOutcome
// ---------------------------------------------------------------------------

/// Result of a conditional write that passed bounds checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The write matched and the plot changed.
    Applied {
        /// State before the write.
        previous: PlotState,
        /// The plot after the write.
        plot: PlotView,
    },
    /// The plot no longer belongs to the caller's planting episode. Nothing
    /// changed.
    Stale {
        /// The plot's instance id at the time of the attempt.
        current: Option<PlotInstanceId>,
    },
}

impl SetOutcome {
    /// Whether the write changed the plot.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

// ---------------------------------------------------------------------------
// PlotRegistry
// ---------------------------------------------------------------------------

/// Fixed-size grid of plots, indexed `0..len`.
///
/// Indices are assigned once at construction and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlotRegistry {
    plots: Vec<Plot>,
    len: u32,
}

impl PlotRegistry {
    /// Create a grid of `count` empty plots.
    pub fn new(count: u32) -> Result<Self, RegistryError> {
        if count == 0 {
            return Err(RegistryError::EmptyGrid);
        }
        Ok(Self {
            plots: (0..count).map(Plot::empty).collect(),
            len: count,
        })
    }

    /// Number of plots in the grid.
    pub const fn len(&self) -> u32 {
        self.len
    }

    /// Whether the grid has no plots.
    ///
    /// [`PlotRegistry::new`] rejects a zero count, so this is `false` for
    /// every constructed registry.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Look up a plot.
    pub fn get(&self, index: u32) -> Result<&Plot, RegistryError> {
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.plots.get(idx))
            .ok_or(RegistryError::IndexOutOfBounds {
                index,
                len: self.len,
            })
    }

    fn get_mut(&mut self, index: u32) -> Result<&mut Plot, RegistryError> {
        let len = self.len;
        usize::try_from(index)
            .ok()
            .and_then(|idx| self.plots.get_mut(idx))
            .ok_or(RegistryError::IndexOutOfBounds { index, len })
    }

    /// All plots, ordered by index.
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    /// Render-ready views of all plots.
    pub fn views(&self) -> Vec<PlotView> {
        self.plots.iter().map(Plot::view).collect()
    }

    /// Number of plots holding a planting.
    pub fn occupied_count(&self) -> usize {
        self.plots
            .iter()
            .filter(|plot| plot.planting.is_some())
            .count()
    }

    /// Conditionally move a plot to `next`.
    ///
    /// `expected` is the planting episode the caller believes the plot is in.
    /// Pass `None` only to plant (`Empty -> Seeded`), which requires the plot
    /// to be exactly `Empty` and assigns a fresh instance id.
    ///
    /// Returns [`SetOutcome::Stale`] without changing anything when the
    /// plot's instance id differs from `expected`. A matching plot asked to
    /// make a move outside the lifecycle table yields
    /// [`RegistryError::InvalidTransition`].
    pub fn try_set_state(
        &mut self,
        index: u32,
        expected: Option<PlotInstanceId>,
        next: PlotState,
    ) -> Result<SetOutcome, RegistryError> {
        let plot = self.get_mut(index)?;
        let current = plot.instance_id();
        if current != expected {
            trace!(index, ?expected, ?current, "conditional write on stale plot");
            return Ok(SetOutcome::Stale { current });
        }

        let previous = plot.state();
        let invalid = RegistryError::InvalidTransition {
            index,
            from: previous,
            to: next,
        };
        if !previous.can_transition_to(next) {
            return Err(invalid);
        }

        match next {
            PlotState::Seeded => plot.planting = Some(Planting::sown()),
            PlotState::Empty => plot.planting = None,
            stage => match plot.planting.as_mut() {
                Some(planting) => planting.stage = stage,
                None => return Err(invalid),
            },
        }

        trace!(index, from = %previous, to = %next, "plot transition applied");
        Ok(SetOutcome::Applied {
            previous,
            plot: plot.view(),
        })
    }

    /// Record when a watered plot will reach `Mature`.
    ///
    /// Guarded by the same instance id check as [`try_set_state`].
    ///
    /// [`try_set_state`]: PlotRegistry::try_set_state
    pub fn set_harvest_at(
        &mut self,
        index: u32,
        expected: PlotInstanceId,
        at: DateTime<Utc>,
    ) -> Result<SetOutcome, RegistryError> {
        let plot = self.get_mut(index)?;
        let current = plot.instance_id();
        let previous = plot.state();
        match plot.planting.as_mut() {
            Some(planting) if planting.instance_id == expected => {
                planting.harvest_at = Some(at);
                Ok(SetOutcome::Applied {
                    previous,
                    plot: plot.view(),
                })
            }
            _ => Ok(SetOutcome::Stale { current }),
        }
    }
}

impl Default for PlotRegistry {
    fn default() -> Self {
        let count = DEFAULT_PLOT_COUNT;
        Self {
            plots: (0..count).map(Plot::empty).collect(),
            len: count,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PlotRegistry {
        PlotRegistry::new(10).unwrap_or_default()
    }

    /// Plant a plot and return its new instance id.
    fn plant(reg: &mut PlotRegistry, index: u32) -> PlotInstanceId {
        let outcome = reg.try_set_state(index, None, PlotState::Seeded);
        assert!(matches!(outcome, Ok(SetOutcome::Applied { .. })));
        reg.get(index)
            .ok()
            .and_then(Plot::instance_id)
            .unwrap_or_default()
    }

    fn state(reg: &PlotRegistry, index: u32) -> Option<PlotState> {
        reg.get(index).ok().map(Plot::state)
    }

    #[test]
    fn new_grid_is_all_empty() {
        let reg = PlotRegistry::default();
        assert_eq!(reg.len(), DEFAULT_PLOT_COUNT);
        assert!(reg.plots().iter().all(|p| p.state() == PlotState::Empty));
        assert!(reg.plots().iter().all(|p| p.instance_id().is_none()));
        assert_eq!(reg.occupied_count(), 0);
        for (i, plot) in reg.plots().iter().enumerate() {
            assert_eq!(usize::try_from(plot.index()).ok(), Some(i));
        }
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        assert_eq!(PlotRegistry::new(0), Err(RegistryError::EmptyGrid));
        let single = PlotRegistry::new(1);
        assert!(single.is_ok_and(|reg| reg.len() == 1 && !reg.is_empty()));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut reg = registry();
        assert_eq!(
            reg.get(10).err(),
            Some(RegistryError::IndexOutOfBounds { index: 10, len: 10 })
        );
        assert!(reg.try_set_state(42, None, PlotState::Seeded).is_err());
    }

    #[test]
    fn full_lifecycle_walks_the_table() {
        let mut reg = registry();
        let id = plant(&mut reg, 3);
        assert_eq!(state(&reg, 3), Some(PlotState::Seeded));

        for next in [
            PlotState::Germinating,
            PlotState::Seedling,
            PlotState::Growing,
            PlotState::Mature,
        ] {
            let outcome = reg.try_set_state(3, Some(id), next);
            assert!(outcome.as_ref().is_ok_and(SetOutcome::is_applied), "{next}");
            assert_eq!(state(&reg, 3), Some(next));
            assert_eq!(reg.get(3).ok().and_then(Plot::instance_id), Some(id));
        }

        let outcome = reg.try_set_state(3, Some(id), PlotState::Empty);
        assert!(outcome.is_ok_and(|o| o.is_applied()));
        assert_eq!(state(&reg, 3), Some(PlotState::Empty));
        assert!(reg.get(3).ok().and_then(Plot::instance_id).is_none());
    }

    #[test]
    fn growing_plot_can_be_harvested_early() {
        let mut reg = registry();
        let id = plant(&mut reg, 0);
        for next in [PlotState::Germinating, PlotState::Seedling, PlotState::Growing] {
            assert!(reg.try_set_state(0, Some(id), next).is_ok());
        }
        let outcome = reg.try_set_state(0, Some(id), PlotState::Empty);
        assert!(outcome.is_ok_and(|o| o.is_applied()));
    }

    #[test]
    fn illegal_moves_are_rejected_without_change() {
        let mut reg = registry();
        let id = plant(&mut reg, 1);

        for next in [
            PlotState::Seeded,
            PlotState::Seedling,
            PlotState::Growing,
            PlotState::Mature,
            PlotState::Empty,
        ] {
            let before = reg.get(1).cloned().ok();
            let result = reg.try_set_state(1, Some(id), next);
            assert_eq!(
                result,
                Err(RegistryError::InvalidTransition {
                    index: 1,
                    from: PlotState::Seeded,
                    to: next,
                })
            );
            assert_eq!(reg.get(1).cloned().ok(), before);
        }
    }

    #[test]
    fn empty_plot_only_accepts_planting() {
        let mut reg = registry();
        for next in [
            PlotState::Empty,
            PlotState::Germinating,
            PlotState::Seedling,
            PlotState::Growing,
            PlotState::Mature,
        ] {
            assert!(matches!(
                reg.try_set_state(2, None, next),
                Err(RegistryError::InvalidTransition { .. })
            ));
        }
        assert_eq!(state(&reg, 2), Some(PlotState::Empty));
    }

    #[test]
    fn planting_an_occupied_plot_is_stale() {
        let mut reg = registry();
        let id = plant(&mut reg, 4);
        let outcome = reg.try_set_state(4, None, PlotState::Seeded);
        assert_eq!(outcome, Ok(SetOutcome::Stale { current: Some(id) }));
    }

    #[test]
    fn old_instance_cannot_touch_replanted_plot() {
        let mut reg = registry();
        let old = plant(&mut reg, 5);
        for next in [PlotState::Germinating, PlotState::Seedling, PlotState::Growing] {
            assert!(reg.try_set_state(5, Some(old), next).is_ok());
        }
        assert!(reg.try_set_state(5, Some(old), PlotState::Empty).is_ok());
        let new = plant(&mut reg, 5);
        assert_ne!(old, new);

        let outcome = reg.try_set_state(5, Some(old), PlotState::Mature);
        assert_eq!(outcome, Ok(SetOutcome::Stale { current: Some(new) }));
        assert_eq!(state(&reg, 5), Some(PlotState::Seeded));
    }

    #[test]
    fn old_instance_cannot_touch_harvested_plot() {
        let mut reg = registry();
        let id = plant(&mut reg, 6);
        for next in [PlotState::Germinating, PlotState::Seedling, PlotState::Growing] {
            assert!(reg.try_set_state(6, Some(id), next).is_ok());
        }
        assert!(reg.try_set_state(6, Some(id), PlotState::Empty).is_ok());

        let outcome = reg.try_set_state(6, Some(id), PlotState::Mature);
        assert_eq!(outcome, Ok(SetOutcome::Stale { current: None }));
        assert_eq!(state(&reg, 6), Some(PlotState::Empty));
    }

    #[test]
    fn harvest_at_is_guarded_and_cleared_on_harvest() {
        let mut reg = registry();
        let id = plant(&mut reg, 7);
        let at = Utc::now();

        let stale = reg.set_harvest_at(7, PlotInstanceId::new(), at);
        assert!(stale.is_ok_and(|o| !o.is_applied()));
        assert!(reg.get(7).ok().and_then(Plot::harvest_at).is_none());

        assert!(reg.set_harvest_at(7, id, at).is_ok_and(|o| o.is_applied()));
        assert_eq!(reg.get(7).ok().and_then(Plot::harvest_at), Some(at));

        for next in [PlotState::Germinating, PlotState::Seedling, PlotState::Growing] {
            assert!(reg.try_set_state(7, Some(id), next).is_ok());
        }
        assert!(reg.try_set_state(7, Some(id), PlotState::Empty).is_ok());
        assert!(reg.get(7).ok().and_then(Plot::harvest_at).is_none());
    }

    #[test]
    fn views_mirror_plots() {
        let mut reg = registry();
        let id = plant(&mut reg, 9);
        let views = reg.views();
        assert_eq!(views.len(), 10);
        assert_eq!(views.last().map(|v| v.state), Some(PlotState::Seeded));
        assert_eq!(views.last().and_then(|v| v.instance_id), Some(id));
        assert_eq!(reg.occupied_count(), 1);
    }

    #[test]
    fn serializes_plantings_with_identity() {
        let mut reg = registry();
        let id = plant(&mut reg, 3);
        let json = serde_json::to_value(&reg).unwrap_or_default();

        assert_eq!(json.pointer("/len"), Some(&serde_json::json!(10)));
        assert_eq!(json.pointer("/plots/3/index"), Some(&serde_json::json!(3)));
        assert_eq!(
            json.pointer("/plots/3/planting/stage"),
            Some(&serde_json::json!("Seeded"))
        );
        assert_eq!(
            json.pointer("/plots/3/planting/instance_id"),
            Some(&serde_json::json!(id.to_string()))
        );
        assert_eq!(json.pointer("/plots/4/planting"), Some(&serde_json::Value::Null));
    }
}
