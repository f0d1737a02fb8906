//! Automators: fixed-interval triggers bound to one generator.
//!
//! An automator accumulates elapsed seconds and fires once for every full
//! interval that fits. A single large `delta` (offline progress) fires as
//! many times as fit, not just once.
//!
//! The automator itself only counts firings. The [`World`](crate::World)
//! turns each firing into one [`Generator::process`](crate::Generator::process)
//! call, in order, before moving on to the next automator.
//!
//! Two interval policies exist:
//!
//! - **Fixed** (`tick_rate_multiplier: None`): the interval is `tick_rate`
//!   and the automator's level is irrelevant.
//! - **Level-scaled** (`tick_rate_multiplier: Some(m)`): the interval is
//!   `tick_rate / m^(level - 1)`, so each level ticks faster. At level 0 the
//!   automator does not tick at all.
//!
//! A non-positive `tick_rate` never ticks.

use num_bigint::BigInt;
use num_traits::One;

use clicker_types::{AutomatorId, GeneratorId};

use crate::error::{EconomyError, EconomyResult};
use crate::item::{DEFAULT_PRICE_MULTIPLIER, Item};
use crate::numeric;

/// Name given to automators that were not named.
pub const DEFAULT_AUTOMATOR_NAME: &str = "Nameless automator";

/// Interval in seconds used when none is configured.
pub const DEFAULT_TICK_RATE: f64 = 1.0;

/// Firings counted one subtraction at a time before switching to division.
const STEPWISE_FIRING_LIMIT: u64 = 4096;

/// 2^64: interval counts at or above this do not fit a `u64`.
const FIRING_COUNT_CEILING: f64 = 18_446_744_073_709_551_616.0;

/// Construction parameters for an [`Automator`].
#[derive(Debug, Clone, PartialEq)]
pub struct AutomatorConfig {
    /// Display name; must not be empty.
    pub name: String,
    /// Generator triggered on every firing.
    pub generator: GeneratorId,
    /// Interval in seconds. Negative values are clamped to 0.
    pub tick_rate: f64,
    /// Per-level interval speed-up. `None` keeps the interval fixed.
    pub tick_rate_multiplier: Option<f64>,
    /// Price of the first level; at least 1.
    pub base_price: BigInt,
    /// Per-level price growth; finite and positive.
    pub price_multiplier: f64,
    /// Level ceiling; at least 1.
    pub max_level: u64,
    /// Whether the automator starts enabled.
    pub enabled: bool,
}

impl AutomatorConfig {
    /// Defaults for an automator triggering `generator` once per second.
    pub fn for_generator(generator: GeneratorId) -> Self {
        Self {
            name: DEFAULT_AUTOMATOR_NAME.to_owned(),
            generator,
            tick_rate: DEFAULT_TICK_RATE,
            tick_rate_multiplier: None,
            base_price: BigInt::one(),
            price_multiplier: DEFAULT_PRICE_MULTIPLIER,
            max_level: u64::MAX,
            enabled: true,
        }
    }
}

/// A fixed-interval scheduler for one generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Automator {
    id: AutomatorId,
    item: Item,
    generator: GeneratorId,
    tick_rate: f64,
    tick_rate_multiplier: Option<f64>,
    tick_timer: f64,
    enabled: bool,
}

impl Automator {
    /// Build an automator from its config.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if the item parameters or
    /// the tick rate multiplier are out of range.
    pub fn new(config: AutomatorConfig) -> EconomyResult<Self> {
        Self::with_id(AutomatorId::new(), config)
    }

    pub(crate) fn with_id(id: AutomatorId, config: AutomatorConfig) -> EconomyResult<Self> {
        if let Some(m) = config.tick_rate_multiplier {
            if !m.is_finite() || m <= 0.0 {
                return Err(EconomyError::invalid_argument(
                    "tick_rate_multiplier",
                    format!("must be finite and positive, got {m}"),
                ));
            }
        }
        let item = Item::new(
            config.name,
            config.base_price,
            config.price_multiplier,
            config.max_level,
        )?;
        Ok(Self {
            id,
            item,
            generator: config.generator,
            tick_rate: clamp_tick_rate(config.tick_rate),
            tick_rate_multiplier: config.tick_rate_multiplier,
            tick_timer: 0.0,
            enabled: config.enabled,
        })
    }

    /// This automator's id.
    pub const fn id(&self) -> AutomatorId {
        self.id
    }

    /// Level and price state.
    pub const fn item(&self) -> &Item {
        &self.item
    }

    /// Mutable level and price state.
    pub const fn item_mut(&mut self) -> &mut Item {
        &mut self.item
    }

    /// The generator this automator triggers.
    pub const fn generator(&self) -> GeneratorId {
        self.generator
    }

    /// Whether the automator is taking part in world updates.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Seconds accumulated toward the next firing.
    pub const fn tick_timer(&self) -> f64 {
        self.tick_timer
    }

    /// Base interval in seconds.
    pub const fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Set the base interval. Negative (and NaN) values become 0, which
    /// stops the automator from ticking.
    pub const fn set_tick_rate(&mut self, seconds: f64) {
        self.tick_rate = clamp_tick_rate(seconds);
    }

    /// Per-level interval speed-up, if level-scaled.
    pub const fn tick_rate_multiplier(&self) -> Option<f64> {
        self.tick_rate_multiplier
    }

    /// The interval currently in force, or `None` if the automator cannot
    /// tick (non-positive rate, or level-scaled at level 0).
    pub fn effective_tick_rate(&self) -> Option<f64> {
        if self.tick_rate <= 0.0 {
            return None;
        }
        match self.tick_rate_multiplier {
            None => Some(self.tick_rate),
            Some(_) if self.item.level() == 0 => None,
            Some(m) => {
                let rate = self.tick_rate / numeric::growth(m, self.item.level().saturating_sub(1));
                (rate.is_finite() && rate > 0.0).then_some(rate)
            }
        }
    }

    /// Progress toward the next firing in `[0, 1)`.
    ///
    /// A zero tick rate reports 1.0 ("always complete"); a level-scaled
    /// automator at level 0 reports 0.0.
    pub fn timer_percentage(&self) -> f64 {
        if self.tick_rate <= 0.0 {
            return 1.0;
        }
        self.effective_tick_rate()
            .map_or(0.0, |rate| self.tick_timer / rate)
    }

    /// Mark enabled. Returns `true` if the state changed.
    pub(crate) const fn enable(&mut self) -> bool {
        let changed = !self.enabled;
        self.enabled = true;
        changed
    }

    /// Mark disabled. Returns `true` if the state changed.
    pub(crate) const fn disable(&mut self) -> bool {
        let changed = self.enabled;
        self.enabled = false;
        changed
    }

    /// Advance the timer by `delta` seconds and return how many times the
    /// generator must fire.
    ///
    /// Disabled or non-ticking automators, and non-positive or non-finite
    /// deltas, leave the timer untouched and return 0.
    pub fn update(&mut self, delta: f64) -> u64 {
        if !self.enabled || !delta.is_finite() || delta <= 0.0 {
            return 0;
        }
        let Some(rate) = self.effective_tick_rate() else {
            return 0;
        };

        self.tick_timer += delta;

        let mut fires: u64 = 0;
        while self.tick_timer >= rate {
            if fires >= STEPWISE_FIRING_LIMIT {
                return fires.saturating_add(self.drain_by_division(rate));
            }
            let next = self.tick_timer - rate;
            if next >= self.tick_timer {
                // The interval is below the timer's precision.
                return fires.saturating_add(self.drain_by_division(rate));
            }
            self.tick_timer = next;
            fires = fires.saturating_add(1);
        }
        fires
    }

    /// Count all whole intervals left in the timer at once.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn drain_by_division(&mut self, rate: f64) -> u64 {
        let whole = (self.tick_timer / rate).floor();
        self.tick_timer = self.tick_timer.rem_euclid(rate);
        if whole >= FIRING_COUNT_CEILING {
            tracing::warn!(
                automator = %self.id,
                intervals = whole,
                rate,
                "firing count saturated at u64::MAX"
            );
        }
        // Float-to-int `as` saturates at u64::MAX.
        whole as u64
    }

    pub(crate) const fn restore_timer(&mut self, tick_timer: f64, enabled: bool) {
        self.tick_timer = tick_timer;
        self.enabled = enabled;
    }
}

const fn clamp_tick_rate(seconds: f64) -> f64 {
    if seconds.is_nan() || seconds < 0.0 {
        0.0
    } else {
        seconds
    }
}
