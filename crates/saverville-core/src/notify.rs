//! Player-facing messages for action outcomes.
//!
//! Turns an [`ActionReport`] or a [`FarmError`] into a [`Notification`] with
//! the wording shown to the player.

use saverville_types::{ActionReport, FarmAction, Notification, NotificationLevel};

use crate::error::{FarmError, PreconditionError};

/// Notification for a successful action.
pub fn success(report: &ActionReport) -> Notification {
    let (title, description) = match report.action {
        FarmAction::Purchase => {
            let quantity = report.quantity.unwrap_or_default();
            let noun = if quantity == 1 { "seed" } else { "seeds" };
            (
                "Seeds purchased!",
                format!("You have bought {quantity} {noun}."),
            )
        }
        FarmAction::Plant => (
            "Seeds planted!",
            "Your seeds have been planted. Remember to water them!".to_owned(),
        ),
        FarmAction::Water => (
            "Plant watered!",
            "Your plant has been watered. It's germinating!".to_owned(),
        ),
        FarmAction::Harvest => (
            "Plant harvested!",
            "Your plant has been harvested. The plot is now empty and ready for new seeds!"
                .to_owned(),
        ),
        FarmAction::Sell => (
            "Plants sold!",
            format!(
                "You have sold your plants for ${}.",
                report.amount.unwrap_or_default()
            ),
        ),
    };
    Notification {
        level: NotificationLevel::Success,
        title: title.to_owned(),
        description: Some(description),
    }
}

/// Notification for a failed action.
pub fn failure(err: &FarmError) -> Notification {
    let (title, description) = match err {
        FarmError::Precondition(precondition) => precondition_message(precondition),
        FarmError::Remote { source, .. } => ("Transaction failed", Some(source.to_string())),
        FarmError::Timeout { .. } => ("Transaction timed out", Some(err.to_string())),
        FarmError::Conflict { .. } => ("Plot already changed", Some(err.to_string())),
        FarmError::Registry { .. } | FarmError::Economy { .. } => {
            ("Something went wrong", Some(err.to_string()))
        }
    };
    Notification {
        level: NotificationLevel::Error,
        title: title.to_owned(),
        description,
    }
}

/// Notification for any action result.
pub fn outcome(result: &Result<ActionReport, FarmError>) -> Notification {
    match result {
        Ok(report) => success(report),
        Err(err) => failure(err),
    }
}

fn precondition_message(err: &PreconditionError) -> (&'static str, Option<String>) {
    match err {
        PreconditionError::WalletUnavailable => (
            "Wallet not connected",
            Some("Please connect your wallet to continue.".to_owned()),
        ),
        PreconditionError::NoSeeds | PreconditionError::PlotNotEmpty { .. } => {
            ("No seeds to plant!", None)
        }
        PreconditionError::NothingToSell => ("No plants to sell!", None),
        PreconditionError::InvalidQuantity => ("Invalid quantity", Some(err.to_string())),
        PreconditionError::NotSeeded { .. } => ("Nothing to water", Some(err.to_string())),
        PreconditionError::NotHarvestable { .. } => {
            ("Nothing to harvest", Some(err.to_string()))
        }
        PreconditionError::PlotOutOfRange { .. } => ("No such plot", Some(err.to_string())),
    }
}
