//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity registered in a world has a strongly-typed ID so a
//! generator handle can never be passed where a currency handle is
//! expected. IDs use UUID v7 (time-ordered) so snapshots list entities
//! in a stable, creation-ordered way when sorted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
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
    /// Unique identifier for a currency (a named resource balance).
    CurrencyId
}

define_id! {
    /// Unique identifier for a generator (a leveled production unit).
    GeneratorId
}

define_id! {
    /// Unique identifier for an automator (a fixed-interval generator trigger).
    AutomatorId
}

define_id! {
    /// Unique identifier for a modifier (a reversible world or generator effect).
    ModifierId
}
