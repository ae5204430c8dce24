//! Shared type definitions for the Saverville farm.
//!
//! This crate is the single source of truth for the types passed between the
//! plot registry, the economy, the farm controller, and the presentation
//! layer. Types the presentation layer reads are exported to `TypeScript`
//! via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (planting episodes, transactions)
//! - [`enums`] -- Plot lifecycle, click mode, actions, economy entry kinds
//! - [`structs`] -- Snapshots, economy history, reports, and change events

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EconomyEntryType, FarmAction, Mode, NotificationLevel, PlotState};
pub use ids::{EconomyEntryId, PlotInstanceId, TransactionId};
pub use structs::{
    ActionReport, EconomyEntry, EconomyView, FarmEvent, FarmSnapshot, Notification, PlotView,
    TxReceipt,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the presentation layer.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::PlotInstanceId::export_all();
        let _ = crate::ids::TransactionId::export_all();
        let _ = crate::ids::EconomyEntryId::export_all();

        // Enums
        let _ = crate::enums::PlotState::export_all();
        let _ = crate::enums::Mode::export_all();
        let _ = crate::enums::FarmAction::export_all();
        let _ = crate::enums::EconomyEntryType::export_all();
        let _ = crate::enums::NotificationLevel::export_all();

        // Structs
        let _ = crate::structs::PlotView::export_all();
        let _ = crate::structs::EconomyView::export_all();
        let _ = crate::structs::FarmSnapshot::export_all();
        let _ = crate::structs::EconomyEntry::export_all();
        let _ = crate::structs::TxReceipt::export_all();
        let _ = crate::structs::ActionReport::export_all();
        let _ = crate::structs::Notification::export_all();
        let _ = crate::structs::FarmEvent::export_all();
    }
}
