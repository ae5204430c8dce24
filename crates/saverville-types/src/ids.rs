//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every planting episode, confirmed transaction, and economy entry carries a
//! strongly-typed ID so identifiers cannot be mixed at compile time. All IDs
//! use UUID v7 (time-ordered), which keeps them unique across re-plantings of
//! the same plot index.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifies one planting episode on a plot.
    ///
    /// Assigned fresh on every `Empty -> Seeded` transition and cleared on
    /// harvest, so a later planting on the same index never shares it.
    PlotInstanceId
}

define_id! {
    /// Identifier for a confirmed remote ledger transaction.
    TransactionId
}

define_id! {
    /// Identifier for an entry in the local economy history.
    EconomyEntryId
}
