//! Enumeration types for the Saverville farm.
//!
//! The plot lifecycle, the player's interaction mode, the user actions the
//! controller accepts, and the categories of economy history entries.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Plot lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of a single plot.
///
/// Happy path:
///
/// ```text
/// Empty -> Seeded -> Germinating -> Seedling -> Growing -> Mature -> Empty
/// ```
///
/// `Seeded -> Germinating` happens when watering is confirmed; the three
/// growth steps after it are driven by the local growth timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PlotState {
    /// Nothing planted. The only state without an instance id.
    Empty,
    /// A seed is in the ground, waiting to be watered.
    Seeded,
    /// Watered; the growth timeline has started.
    Germinating,
    /// First timed growth step.
    Seedling,
    /// Second timed growth step. Already harvestable.
    Growing,
    /// Fully grown.
    Mature,
}

impl PlotState {
    /// Every state, in happy-path order.
    pub const ALL: [Self; 6] = [
        Self::Empty,
        Self::Seeded,
        Self::Germinating,
        Self::Seedling,
        Self::Growing,
        Self::Mature,
    ];

    /// Whether `self -> next` is a legal transition.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Empty, Self::Seeded)
                | (Self::Seeded, Self::Germinating)
                | (Self::Germinating, Self::Seedling)
                | (Self::Seedling, Self::Growing)
                | (Self::Growing, Self::Mature)
                | (Self::Growing | Self::Mature, Self::Empty)
        )
    }

    /// The state a timed growth step advances to, if this state has one.
    pub const fn next_growth_stage(self) -> Option<Self> {
        match self {
            Self::Germinating => Some(Self::Seedling),
            Self::Seedling => Some(Self::Growing),
            Self::Growing => Some(Self::Mature),
            Self::Empty | Self::Seeded | Self::Mature => None,
        }
    }

    /// Whether a plot in this state may be harvested.
    pub const fn is_harvestable(self) -> bool {
        matches!(self, Self::Growing | Self::Mature)
    }

    /// Whether this state carries a planting (and so an instance id).
    pub const fn is_occupied(self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Lowercase name used in logs and the console grid.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Seeded => "seeded",
            Self::Germinating => "germination",
            Self::Seedling => "seedling",
            Self::Growing => "growing",
            Self::Mature => "mature",
        }
    }
}

impl core::fmt::Display for PlotState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Interaction mode
// ---------------------------------------------------------------------------

/// The player's currently selected interaction for grid clicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Mode {
    /// Clicking a plot plants a seed.
    #[default]
    Planting,
    /// Clicking a plot waters it.
    Watering,
    /// Clicking a plot harvests it.
    Harvesting,
}

impl core::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plant" | "planting" => Ok(Self::Planting),
            "water" | "watering" => Ok(Self::Watering),
            "harvest" | "harvesting" => Ok(Self::Harvesting),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

impl core::fmt::Display for Mode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Planting => "planting",
            Self::Watering => "watering",
            Self::Harvesting => "harvesting",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// User actions
// ---------------------------------------------------------------------------

/// A user-initiated action handled by the farm controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FarmAction {
    /// Buy seeds from the remote ledger.
    Purchase,
    /// Plant a seed on an empty plot.
    Plant,
    /// Water a seeded plot.
    Water,
    /// Harvest a growing or mature plot.
    Harvest,
    /// Sell harvested plants locally.
    Sell,
}

impl core::fmt::Display for FarmAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Purchase => "purchase",
            Self::Plant => "plant",
            Self::Water => "water",
            Self::Harvest => "harvest",
            Self::Sell => "sell",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Economy history
// ---------------------------------------------------------------------------

/// Category of an entry in the economy history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EconomyEntryType {
    /// Seeds bought from the remote ledger (paid by the wallet).
    SeedPurchase,
    /// One seed put into a plot.
    SeedPlanted,
    /// One plant harvested from a plot.
    Harvest,
    /// Harvested plants converted to currency.
    Sale,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Severity of a notification shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum NotificationLevel {
    /// The action went through.
    Success,
    /// The action failed; nothing changed.
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_matches_lifecycle() {
        let legal: Vec<(PlotState, PlotState)> = PlotState::ALL
            .iter()
            .flat_map(|from| PlotState::ALL.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| from.can_transition_to(*to))
            .collect();

        assert_eq!(
            legal,
            vec![
                (PlotState::Empty, PlotState::Seeded),
                (PlotState::Seeded, PlotState::Germinating),
                (PlotState::Germinating, PlotState::Seedling),
                (PlotState::Seedling, PlotState::Growing),
                (PlotState::Growing, PlotState::Empty),
                (PlotState::Growing, PlotState::Mature),
                (PlotState::Mature, PlotState::Empty),
            ]
        );
    }

    #[test]
    fn growth_stages_chain_to_mature() {
        let mut state = PlotState::Germinating;
        let mut steps = Vec::new();
        while let Some(next) = state.next_growth_stage() {
            steps.push(next);
            state = next;
        }
        assert_eq!(
            steps,
            vec![PlotState::Seedling, PlotState::Growing, PlotState::Mature]
        );
    }

    #[test]
    fn only_growing_and_mature_are_harvestable() {
        for state in PlotState::ALL {
            let expected = matches!(state, PlotState::Growing | PlotState::Mature);
            assert_eq!(state.is_harvestable(), expected, "{state}");
        }
    }

    #[test]
    fn mode_parses_short_and_long_names() {
        assert_eq!("water".parse::<Mode>().ok(), Some(Mode::Watering));
        assert_eq!("Harvesting".parse::<Mode>().ok(), Some(Mode::Harvesting));
        assert!("dig".parse::<Mode>().is_err());
        assert_eq!(Mode::Watering.to_string().parse::<Mode>().ok(), Some(Mode::Watering));
    }

    #[test]
    fn plot_state_serializes_as_variant_name() {
        let json = serde_json::to_string(&PlotState::Germinating).ok();
        assert_eq!(json.as_deref(), Some("\"Germinating\""));
    }
}
