//! Named, arbitrary-precision resource balances.
//!
//! A [`Currency`] is a plain accumulator. Its arithmetic is unconditional:
//! subtracting below zero is allowed, and callers that need a sufficiency
//! check (such as [`Item::buy_with`](crate::item::Item::buy_with)) do it
//! before subtracting.

use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use clicker_types::CurrencyId;

use crate::error::{EconomyError, EconomyResult};
use crate::item::validate_name;
use crate::numeric;

/// Name given to currencies that were not named.
pub const DEFAULT_CURRENCY_NAME: &str = "Gold";

/// Construction parameters for a [`Currency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Display name; must not be empty.
    pub name: String,
    /// Starting balance.
    pub initial: BigInt,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CURRENCY_NAME.to_owned(),
            initial: BigInt::zero(),
        }
    }
}

impl CurrencyConfig {
    /// A zero-balance currency with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A named resource balance owned by a world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    id: CurrencyId,
    name: String,
    value: BigInt,
}

impl Currency {
    /// Build a currency from its config.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if the name is empty.
    pub fn new(config: CurrencyConfig) -> EconomyResult<Self> {
        Self::with_id(CurrencyId::new(), config)
    }

    pub(crate) fn with_id(id: CurrencyId, config: CurrencyConfig) -> EconomyResult<Self> {
        validate_name(&config.name)?;
        Ok(Self {
            id,
            name: config.name,
            value: config.initial,
        })
    }

    /// This currency's id.
    pub const fn id(&self) -> CurrencyId {
        self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The exact balance.
    pub const fn value(&self) -> &BigInt {
        &self.value
    }

    /// The exact balance in base 10, with no grouping or abbreviation.
    pub fn amount_string(&self) -> String {
        self.value.to_string()
    }

    /// Increase the balance by `amount`.
    pub fn add(&mut self, amount: &BigInt) {
        self.value += amount;
    }

    /// Decrease the balance by `amount`. The result may be negative.
    pub fn sub(&mut self, amount: &BigInt) {
        self.value -= amount;
    }

    /// Scale the balance by `factor`, rounding down.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if `factor` is NaN or
    /// infinite. The balance is left unchanged.
    pub fn multiply(&mut self, factor: f64) -> EconomyResult<()> {
        if !factor.is_finite() {
            return Err(EconomyError::invalid_argument(
                "factor",
                format!("must be finite, got {factor}"),
            ));
        }
        self.value = numeric::scale_floor(&self.value, factor);
        Ok(())
    }

    /// Overwrite the balance. Reserved for snapshot restore and scenario
    /// seeding; gameplay goes through `add`/`sub`.
    pub(crate) fn set(&mut self, value: BigInt) {
        self.value = value;
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}
