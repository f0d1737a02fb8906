//! Enumeration types shared across the Clicker workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

/// Outcome of trying to buy the next level of an item with a currency.
///
/// Economic insufficiency is an expected gameplay outcome, not an error,
/// so purchases report it through this value instead of a `Result::Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PurchaseResult {
    /// The price was paid and the item gained one level.
    Ok,
    /// The currency balance is below the current price. Nothing changed.
    InsufficientFunds,
    /// The item is already at its maximum level. Nothing changed.
    MaxLevelReached,
}

impl PurchaseResult {
    /// Whether the purchase went through.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl core::fmt::Display for PurchaseResult {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Ok => "ok",
            Self::InsufficientFunds => "insufficient funds",
            Self::MaxLevelReached => "max level reached",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// What a modifier acts upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierTarget {
    /// The whole world: global speed and the automation master switch.
    World,
    /// The output of a single generator.
    Generator,
}
