//! Level and price progression shared by generators and automators.
//!
//! An [`Item`] is anything the player can buy levels of. Its price grows
//! exponentially with level:
//!
//! ```text
//! price(level) = trunc(base_price × price_multiplier ^ level)
//! ```
//!
//! The product is formed exactly (see [`crate::numeric`]), so only the final
//! truncation loses precision.
//!
//! Bounds policy: the item level is a gameplay value and is silently clamped
//! into `[0, max_level]`; base price, price multiplier and the max-level
//! ceiling are structural and are rejected with
//! [`EconomyError::InvalidArgument`] when out of range.

use num_bigint::BigInt;
use num_traits::Signed;

use clicker_types::PurchaseResult;

use crate::currency::Currency;
use crate::error::{EconomyError, EconomyResult};
use crate::numeric;

/// Price multiplier applied per level when none is configured.
pub const DEFAULT_PRICE_MULTIPLIER: f64 = 1.145;

/// Description given to items that were not described.
pub const DEFAULT_DESCRIPTION: &str = "No description.";

/// Purchasable progression state: name, level, ceiling, and price curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Display name; never empty.
    name: String,
    /// Free-form description text.
    description: String,
    /// Price of the first level; always at least 1.
    base_price: BigInt,
    /// Per-level price growth factor; finite and positive.
    price_multiplier: f64,
    /// Current level, `0 ≤ level ≤ max_level`.
    level: u64,
    /// Level ceiling, at least 1.
    max_level: u64,
}

impl Item {
    /// Create a level-0 item.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if the name is empty, the
    /// base price is below 1, the price multiplier is not a finite positive
    /// number, or `max_level` is 0.
    pub fn new(
        name: impl Into<String>,
        base_price: BigInt,
        price_multiplier: f64,
        max_level: u64,
    ) -> EconomyResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_base_price(&base_price)?;
        validate_price_multiplier(price_multiplier)?;
        validate_max_level(max_level)?;
        Ok(Self {
            name,
            description: DEFAULT_DESCRIPTION.to_owned(),
            base_price,
            price_multiplier,
            level: 0,
            max_level,
        })
    }

    // -----------------------------------------------------------------------
    // Naming
    // -----------------------------------------------------------------------

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the item.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if `name` is empty.
    pub fn set_name(&mut self, name: impl Into<String>) -> EconomyResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// The description text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description text.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    // -----------------------------------------------------------------------
    // Price curve
    // -----------------------------------------------------------------------

    /// Price of the first level.
    pub const fn base_price(&self) -> &BigInt {
        &self.base_price
    }

    /// Set the price of the first level.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if `base_price < 1`. The
    /// previous price is kept.
    pub fn set_base_price(&mut self, base_price: BigInt) -> EconomyResult<()> {
        validate_base_price(&base_price)?;
        self.base_price = base_price;
        Ok(())
    }

    /// Per-level price growth factor.
    pub const fn price_multiplier(&self) -> f64 {
        self.price_multiplier
    }

    /// Set the per-level price growth factor.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if the factor is not a
    /// finite positive number.
    pub fn set_price_multiplier(&mut self, multiplier: f64) -> EconomyResult<()> {
        validate_price_multiplier(multiplier)?;
        self.price_multiplier = multiplier;
        Ok(())
    }

    /// Price of the next level at the current level.
    pub fn price(&self) -> BigInt {
        let factor = numeric::growth(self.price_multiplier, self.level);
        numeric::scale_truncate(&self.base_price, factor)
    }

    // -----------------------------------------------------------------------
    // Levels
    // -----------------------------------------------------------------------

    /// Current level.
    pub const fn level(&self) -> u64 {
        self.level
    }

    /// Set the level, clamped to the ceiling.
    pub fn set_level(&mut self, level: u64) {
        self.level = level.min(self.max_level);
    }

    /// Level ceiling.
    pub const fn max_level(&self) -> u64 {
        self.max_level
    }

    /// Set the level ceiling. A current level above the new ceiling is
    /// lowered to it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if `max_level` is 0.
    pub fn set_max_level(&mut self, max_level: u64) -> EconomyResult<()> {
        validate_max_level(max_level)?;
        self.max_level = max_level;
        self.level = self.level.min(max_level);
        Ok(())
    }

    /// Whether the level has reached the ceiling.
    pub const fn is_maxed(&self) -> bool {
        self.level >= self.max_level
    }

    /// Gain one level unless already at the ceiling.
    pub const fn upgrade(&mut self) {
        if self.level < self.max_level {
            self.level = self.level.saturating_add(1);
        }
    }

    /// Lose one level unless already at 0.
    pub const fn downgrade(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Jump straight to the ceiling.
    pub const fn maximize(&mut self) {
        self.level = self.max_level;
    }

    // -----------------------------------------------------------------------
    // Purchasing
    // -----------------------------------------------------------------------

    /// Buy the next level with `currency`.
    ///
    /// On success the current price is subtracted from the balance and the
    /// item gains exactly one level. Otherwise nothing changes.
    pub fn buy_with(&mut self, currency: &mut Currency) -> PurchaseResult {
        if self.is_maxed() {
            return PurchaseResult::MaxLevelReached;
        }
        let price = self.price();
        if currency.value() < &price {
            return PurchaseResult::InsufficientFunds;
        }
        currency.sub(&price);
        self.upgrade();
        tracing::debug!(
            item = self.name.as_str(),
            currency = currency.name(),
            price = %price,
            level = self.level,
            "level purchased"
        );
        PurchaseResult::Ok
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate_name(name: &str) -> EconomyResult<()> {
    if name.is_empty() {
        return Err(EconomyError::invalid_argument("name", "must not be empty"));
    }
    Ok(())
}

fn validate_base_price(base_price: &BigInt) -> EconomyResult<()> {
    if !base_price.is_positive() {
        return Err(EconomyError::invalid_argument(
            "base_price",
            format!("must be at least 1, got {base_price}"),
        ));
    }
    Ok(())
}

fn validate_price_multiplier(multiplier: f64) -> EconomyResult<()> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(EconomyError::invalid_argument(
            "price_multiplier",
            format!("must be finite and positive, got {multiplier}"),
        ));
    }
    Ok(())
}

fn validate_max_level(max_level: u64) -> EconomyResult<()> {
    if max_level == 0 {
        return Err(EconomyError::invalid_argument(
            "max_level",
            "must be at least 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item::new("Test", BigInt::from(1), DEFAULT_PRICE_MULTIPLIER, u64::MAX).unwrap()
    }

    #[test]
    fn new_rejects_empty_name() {
        let result = Item::new("", BigInt::from(1), 1.5, 10);
        assert!(matches!(
            result,
            Err(EconomyError::InvalidArgument { field: "name", .. })
        ));
    }

    #[test]
    fn new_rejects_zero_max_level() {
        assert!(Item::new("x", BigInt::from(1), 1.5, 0).is_err());
    }

    #[test]
    fn name_and_description() {
        let mut item = item();
        assert_eq!(item.description(), DEFAULT_DESCRIPTION);
        item.set_name("Mine").unwrap();
        item.set_description("Digs gold.");
        assert_eq!(item.name(), "Mine");
        assert_eq!(item.description(), "Digs gold.");
        assert!(item.set_name("").is_err());
        assert_eq!(item.name(), "Mine");
    }

    #[test]
    fn base_price_rejects_zero_and_negative() {
        let mut item = item();
        item.set_base_price(BigInt::from(1234)).unwrap();
        assert!(item.set_base_price(BigInt::from(0)).is_err());
        assert!(item.set_base_price(BigInt::from(-5)).is_err());
        assert_eq!(item.base_price(), &BigInt::from(1234));
    }

    #[test]
    fn price_multiplier_rejects_non_positive() {
        let mut item = item();
        item.set_price_multiplier(1.23).unwrap();
        assert!(item.set_price_multiplier(0.0).is_err());
        assert!(item.set_price_multiplier(f64::NAN).is_err());
        assert!((item.price_multiplier() - 1.23).abs() < 0.001);
    }

    #[test]
    fn price_follows_curve() {
        let mut item = item();
        item.set_base_price(BigInt::from(10)).unwrap();
        item.set_price_multiplier(1.5).unwrap();
        assert_eq!(item.price(), BigInt::from(10));
        item.upgrade();
        assert_eq!(item.price(), BigInt::from(15));
        item.upgrade();
        // 10 × 2.25 = 22.5
        assert_eq!(item.price(), BigInt::from(22));
    }

    #[test]
    fn price_at_level_zero_is_base_price() {
        let item = Item::new("x", BigInt::from(987_654_321), 3.7, 5).unwrap();
        assert_eq!(item.price(), BigInt::from(987_654_321));
    }

    #[test]
    fn max_level_clamps_set_level() {
        let mut item = item();
        item.set_max_level(12).unwrap();

        item.set_level(14);
        assert_eq!(item.level(), 12);

        item.set_level(5);
        assert_eq!(item.level(), 5);

        item.set_level(12);
        item.upgrade();
        assert_eq!(item.level(), 12);

        item.set_max_level(13).unwrap();
        assert_eq!(item.level(), 12);
        item.upgrade();
        assert_eq!(item.level(), 13);
    }

    #[test]
    fn lowering_max_level_clamps_immediately() {
        let mut item = item();
        item.set_level(20);
        item.set_max_level(7).unwrap();
        assert_eq!(item.level(), 7);
        assert!(item.is_maxed());
    }

    #[test]
    fn set_max_level_zero_keeps_state() {
        let mut item = item();
        item.set_max_level(4).unwrap();
        assert!(item.set_max_level(0).is_err());
        assert_eq!(item.max_level(), 4);
    }

    #[test]
    fn upgrade_downgrade_maximize() {
        let mut item = item();
        assert_eq!(item.level(), 0);
        item.upgrade();
        assert_eq!(item.level(), 1);
        item.upgrade();
        assert_eq!(item.level(), 2);
        item.downgrade();
        assert_eq!(item.level(), 1);
        item.downgrade();
        assert_eq!(item.level(), 0);
        item.downgrade();
        assert_eq!(item.level(), 0);

        item.set_max_level(10).unwrap();
        item.maximize();
        assert_eq!(item.level(), item.max_level());
    }

    #[test]
    fn upgrade_then_downgrade_round_trips() {
        let mut item = item();
        item.set_max_level(3).unwrap();
        for start in 0..3 {
            item.set_level(start);
            item.upgrade();
            item.downgrade();
            assert_eq!(item.level(), start);
        }
    }
}
