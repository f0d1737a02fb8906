//! Shared type definitions for the Clicker economy simulation.
//!
//! This crate holds the identifiers and small enumerations that every
//! other crate in the workspace agrees on.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Purchase outcomes and modifier targets

pub mod enums;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{ModifierTarget, PurchaseResult};
pub use ids::{AutomatorId, CurrencyId, GeneratorId, ModifierId};
