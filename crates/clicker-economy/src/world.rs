//! The world: owner of every economy entity and driver of simulated time.
//!
//! All four collections are insertion-ordered and can only be changed
//! through the `add_*`/`insert_*`/`remove_*` entry points below. Adding an
//! entity whose id is already registered, or removing an absent one, is a
//! no-op.
//!
//! [`World::update`] scales elapsed seconds by the global speed multiplier
//! and, unless automation is suspended, advances every enabled automator in
//! registration order. Each automator's firings are turned into generator
//! cycles immediately, so balances seen by a completion callback reflect
//! every automator that ran before it in the same sweep.
//!
//! Disabling an automator removes it from the sweep without unregistering
//! it; enabling it puts it back in its original position.

use num_bigint::BigInt;

use clicker_types::{AutomatorId, CurrencyId, GeneratorId, ModifierId, PurchaseResult};

use crate::automator::{Automator, AutomatorConfig};
use crate::currency::{Currency, CurrencyConfig};
use crate::error::{EconomyError, EconomyResult};
use crate::generator::{Generator, GeneratorConfig, derive_seed};
use crate::modifier::{EffectConfig, EffectScope, Modifier, ModifierConfig, ModifierEffect};

// ---------------------------------------------------------------------------
// Time scale
// ---------------------------------------------------------------------------

/// Global simulation speed and the automation master switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    speed_multiplier: f64,
    automation_suspensions: u32,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            automation_suspensions: 0,
        }
    }
}

impl TimeScale {
    /// Factor applied to every elapsed-time update.
    pub const fn speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    /// Whether automators run during updates.
    pub const fn is_automation_enabled(&self) -> bool {
        self.automation_suspensions == 0
    }

    /// Number of enabled effects currently suspending automation.
    pub const fn automation_suspensions(&self) -> u32 {
        self.automation_suspensions
    }

    /// Multiply the speed by `factor`; returns the new speed.
    pub(crate) fn scale_speed(&mut self, factor: f64) -> f64 {
        self.speed_multiplier *= factor;
        self.speed_multiplier
    }

    /// Divide the speed by `factor`.
    pub(crate) fn unscale_speed(&mut self, factor: f64) {
        self.speed_multiplier /= factor;
    }

    pub(crate) fn suspend_automation(&mut self) -> EconomyResult<()> {
        self.automation_suspensions = self
            .automation_suspensions
            .checked_add(1)
            .ok_or(EconomyError::ArithmeticOverflow {
                context: "automation suspensions",
            })?;
        Ok(())
    }

    pub(crate) const fn resume_automation(&mut self) {
        self.automation_suspensions = self.automation_suspensions.saturating_sub(1);
    }

    pub(crate) const fn from_parts(speed_multiplier: f64, automation_suspensions: u32) -> Self {
        Self {
            speed_multiplier,
            automation_suspensions,
        }
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Aggregate root of the economy.
#[derive(Debug, Default)]
pub struct World {
    seed: u64,
    generators_created: u64,
    currencies: Vec<Currency>,
    generators: Vec<Generator>,
    automators: Vec<Automator>,
    modifiers: Vec<Modifier>,
    time: TimeScale,
}

impl World {
    /// Create an empty world. `seed` feeds every generator's private
    /// random stream.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// The world seed.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Global speed and automation state.
    pub const fn time_scale(&self) -> &TimeScale {
        &self.time
    }

    /// Factor applied to every elapsed-time update.
    pub const fn speed_multiplier(&self) -> f64 {
        self.time.speed_multiplier()
    }

    /// Whether automators run during updates.
    pub const fn is_automation_enabled(&self) -> bool {
        self.time.is_automation_enabled()
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Advance simulated time by `seconds` (before speed scaling).
    ///
    /// Every firing is one generator cycle, so the cost of a call grows
    /// with the number of intervals that fit in `seconds`. An automator
    /// whose interval count exceeds `u64::MAX` logs a warning and fires
    /// `u64::MAX` times.
    ///
    /// Returns the number of automator firings in this sweep.
    pub fn update(&mut self, seconds: f64) -> u64 {
        if !self.time.is_automation_enabled() {
            return 0;
        }
        let scaled = seconds * self.time.speed_multiplier();

        let mut fired: u64 = 0;
        for automator in &mut self.automators {
            let fires = automator.update(scaled);
            if fires == 0 {
                continue;
            }
            fired = fired.saturating_add(fires);
            fire_generator(
                &mut self.generators,
                &mut self.currencies,
                automator.generator(),
                fires,
            );
        }
        fired
    }

    /// Run one manual cycle of a generator (a "click").
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::GeneratorNotFound`] or
    /// [`EconomyError::CurrencyNotFound`] if the generator or its currency
    /// is not registered.
    pub fn process_generator(&mut self, id: GeneratorId) -> EconomyResult<Option<BigInt>> {
        let generator = self
            .generators
            .iter_mut()
            .find(|g| g.id() == id)
            .ok_or(EconomyError::GeneratorNotFound(id))?;
        let currency_id = generator.currency();
        let currency = self
            .currencies
            .iter_mut()
            .find(|c| c.id() == currency_id)
            .ok_or(EconomyError::CurrencyNotFound(currency_id))?;
        generator.process(currency)
    }

    // -----------------------------------------------------------------------
    // Purchases
    // -----------------------------------------------------------------------

    /// Buy the next level of a generator with a currency.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown ids. Lack of funds is reported
    /// through the [`PurchaseResult`].
    pub fn buy_generator(
        &mut self,
        generator: GeneratorId,
        currency: CurrencyId,
    ) -> EconomyResult<PurchaseResult> {
        let target = self
            .generators
            .iter_mut()
            .find(|g| g.id() == generator)
            .ok_or(EconomyError::GeneratorNotFound(generator))?;
        let wallet = self
            .currencies
            .iter_mut()
            .find(|c| c.id() == currency)
            .ok_or(EconomyError::CurrencyNotFound(currency))?;
        Ok(target.item_mut().buy_with(wallet))
    }

    /// Buy the next level of an automator with a currency.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for unknown ids.
    pub fn buy_automator(
        &mut self,
        automator: AutomatorId,
        currency: CurrencyId,
    ) -> EconomyResult<PurchaseResult> {
        let target = self
            .automators
            .iter_mut()
            .find(|a| a.id() == automator)
            .ok_or(EconomyError::AutomatorNotFound(automator))?;
        let wallet = self
            .currencies
            .iter_mut()
            .find(|c| c.id() == currency)
            .ok_or(EconomyError::CurrencyNotFound(currency))?;
        Ok(target.item_mut().buy_with(wallet))
    }

    // -----------------------------------------------------------------------
    // Currencies
    // -----------------------------------------------------------------------

    /// Create and register a currency.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidArgument`] if the config is invalid.
    pub fn add_currency(&mut self, config: CurrencyConfig) -> EconomyResult<CurrencyId> {
        let currency = Currency::new(config)?;
        Ok(self.insert_currency(currency))
    }

    /// Register an already-built currency. No-op if its id is present.
    pub fn insert_currency(&mut self, currency: Currency) -> CurrencyId {
        let id = currency.id();
        if self.currency(id).is_none() {
            tracing::debug!(currency = %id, name = currency.name(), "currency registered");
            self.currencies.push(currency);
        }
        id
    }

    /// Unregister a currency. Returns it if it was present.
    pub fn remove_currency(&mut self, id: CurrencyId) -> Option<Currency> {
        let index = self.currencies.iter().position(|c| c.id() == id)?;
        Some(self.currencies.remove(index))
    }

    /// Unregister every currency.
    pub fn remove_all_currencies(&mut self) {
        self.currencies.clear();
    }

    /// Look up a currency.
    pub fn currency(&self, id: CurrencyId) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.id() == id)
    }

    /// Look up a currency for direct `add`/`sub`/`multiply`.
    pub fn currency_mut(&mut self, id: CurrencyId) -> Option<&mut Currency> {
        self.currencies.iter_mut().find(|c| c.id() == id)
    }

    /// First currency with the given name.
    pub fn currency_by_name(&self, name: &str) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.name() == name)
    }

    /// All currencies in registration order.
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }

    /// Number of registered currencies.
    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    /// Overwrite a currency balance (scenario seeding and restore).
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::CurrencyNotFound`] for unknown ids.
    pub fn set_currency_value(&mut self, id: CurrencyId, value: BigInt) -> EconomyResult<()> {
        self.currency_mut(id)
            .ok_or(EconomyError::CurrencyNotFound(id))?
            .set(value);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Generators
    // -----------------------------------------------------------------------

    /// Create and register a generator.
    ///
    /// The generator's random stream is seeded from the world seed and the
    /// number of generators this world has created so far.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if the target currency is not
    /// registered, or [`EconomyError::InvalidArgument`] if a parameter is
    /// out of range.
    pub fn add_generator(&mut self, config: GeneratorConfig) -> EconomyResult<GeneratorId> {
        self.require_currency(config.currency)?;
        let ordinal = self.generators_created;
        let next = ordinal
            .checked_add(1)
            .ok_or(EconomyError::ArithmeticOverflow {
                context: "generators created",
            })?;
        let generator = Generator::new(config, derive_seed(self.seed, ordinal))?;
        self.generators_created = next;
        self.insert_generator(generator)
    }

    /// Register an already-built generator. No-op if its id is present.
    ///
    /// Its output modifiers are re-synced from this world's enabled
    /// generator effects, so attachments made before a removal never
    /// outlive the modifier that made them.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if its currency is not
    /// registered.
    pub fn insert_generator(&mut self, mut generator: Generator) -> EconomyResult<GeneratorId> {
        let id = generator.id();
        if self.generator(id).is_some() {
            return Ok(id);
        }
        self.require_currency(generator.currency())?;
        generator.clear_modifiers();
        for modifier in self.modifiers.iter().filter(|m| m.is_enabled()) {
            if let ModifierEffect::Generator(effect) = modifier.effect() {
                if effect.generator() == id {
                    generator.attach_modifier(modifier.id(), effect.multiplier());
                }
            }
        }
        tracing::debug!(
            generator = %id,
            name = generator.item().name(),
            currency = %generator.currency(),
            "generator registered"
        );
        self.generators.push(generator);
        Ok(id)
    }

    /// Unregister a generator. Returns it if it was present.
    pub fn remove_generator(&mut self, id: GeneratorId) -> Option<Generator> {
        let index = self.generators.iter().position(|g| g.id() == id)?;
        Some(self.generators.remove(index))
    }

    /// Unregister every generator.
    pub fn remove_all_generators(&mut self) {
        self.generators.clear();
    }

    /// Look up a generator.
    pub fn generator(&self, id: GeneratorId) -> Option<&Generator> {
        self.generators.iter().find(|g| g.id() == id)
    }

    /// Look up a generator for level changes or callback installation.
    pub fn generator_mut(&mut self, id: GeneratorId) -> Option<&mut Generator> {
        self.generators.iter_mut().find(|g| g.id() == id)
    }

    /// First generator with the given name.
    pub fn generator_by_name(&self, name: &str) -> Option<&Generator> {
        self.generators.iter().find(|g| g.item().name() == name)
    }

    /// All generators in registration order.
    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    /// Number of registered generators.
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    // -----------------------------------------------------------------------
    // Automators
    // -----------------------------------------------------------------------

    /// Create and register an automator.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if the target generator is
    /// not registered, or [`EconomyError::InvalidArgument`] if a parameter
    /// is out of range.
    pub fn add_automator(&mut self, config: AutomatorConfig) -> EconomyResult<AutomatorId> {
        let automator = Automator::new(config)?;
        self.insert_automator(automator)
    }

    /// Register an already-built automator. No-op if its id is present.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if its generator is not
    /// registered.
    pub fn insert_automator(&mut self, automator: Automator) -> EconomyResult<AutomatorId> {
        let id = automator.id();
        if self.automator(id).is_some() {
            return Ok(id);
        }
        if self.generator(automator.generator()).is_none() {
            return Err(EconomyError::invalid_config(format!(
                "automator targets unregistered generator {}",
                automator.generator()
            )));
        }
        tracing::debug!(
            automator = %id,
            name = automator.item().name(),
            generator = %automator.generator(),
            tick_rate = automator.tick_rate(),
            "automator registered"
        );
        self.automators.push(automator);
        Ok(id)
    }

    /// Unregister an automator. Returns it if it was present.
    pub fn remove_automator(&mut self, id: AutomatorId) -> Option<Automator> {
        let index = self.automators.iter().position(|a| a.id() == id)?;
        Some(self.automators.remove(index))
    }

    /// Put an automator back into the update sweep. Returns `true` if it
    /// was disabled.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::AutomatorNotFound`] for unknown ids.
    pub fn enable_automator(&mut self, id: AutomatorId) -> EconomyResult<bool> {
        let automator = self.automator_entry(id)?;
        let changed = automator.enable();
        if changed {
            tracing::debug!(automator = %id, "automator enabled");
        }
        Ok(changed)
    }

    /// Take an automator out of the update sweep. Returns `true` if it
    /// was enabled.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::AutomatorNotFound`] for unknown ids.
    pub fn disable_automator(&mut self, id: AutomatorId) -> EconomyResult<bool> {
        let automator = self.automator_entry(id)?;
        let changed = automator.disable();
        if changed {
            tracing::debug!(automator = %id, "automator disabled");
        }
        Ok(changed)
    }

    /// Look up an automator.
    pub fn automator(&self, id: AutomatorId) -> Option<&Automator> {
        self.automators.iter().find(|a| a.id() == id)
    }

    /// Look up an automator for level or tick-rate changes.
    pub fn automator_mut(&mut self, id: AutomatorId) -> Option<&mut Automator> {
        self.automators.iter_mut().find(|a| a.id() == id)
    }

    /// All automators in registration order, enabled or not.
    pub fn automators(&self) -> &[Automator] {
        &self.automators
    }

    /// Enabled automators in sweep order.
    pub fn active_automators(&self) -> impl Iterator<Item = &Automator> {
        self.automators.iter().filter(|a| a.is_enabled())
    }

    /// Number of registered automators.
    pub fn automator_count(&self) -> usize {
        self.automators.len()
    }

    // -----------------------------------------------------------------------
    // Modifiers
    // -----------------------------------------------------------------------

    /// Create and register an inert modifier.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if a generator effect targets
    /// an unregistered generator, or [`EconomyError::InvalidArgument`] if
    /// the effect is out of range.
    pub fn add_modifier(&mut self, config: ModifierConfig) -> EconomyResult<ModifierId> {
        if let EffectConfig::Generator { generator, .. } = config.effect {
            if self.generator(generator).is_none() {
                return Err(EconomyError::invalid_config(format!(
                    "modifier targets unregistered generator {generator}"
                )));
            }
        }
        let modifier = Modifier::new(config)?;
        Ok(self.insert_modifier(modifier))
    }

    /// Register an already-built, disabled modifier. No-op if its id is
    /// present.
    pub fn insert_modifier(&mut self, modifier: Modifier) -> ModifierId {
        let id = modifier.id();
        if self.modifier(id).is_none() {
            tracing::debug!(modifier = %id, name = modifier.name(), "modifier registered");
            self.modifiers.push(modifier);
        }
        id
    }

    /// Unregister a modifier, reverting its effect first if enabled.
    /// Returns it (disabled) if it was present.
    ///
    /// # Errors
    ///
    /// Propagates a failure to revert the effect; the modifier then stays
    /// registered.
    pub fn remove_modifier(&mut self, id: ModifierId) -> EconomyResult<Option<Modifier>> {
        let Some(index) = self.modifiers.iter().position(|m| m.id() == id) else {
            return Ok(None);
        };
        self.disable_modifier(id)?;
        Ok(Some(self.modifiers.remove(index)))
    }

    /// Apply a modifier's effect. Returns `true` if it was disabled.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ModifierNotFound`] for unknown ids, or the
    /// effect's own error (the modifier then stays disabled).
    pub fn enable_modifier(&mut self, id: ModifierId) -> EconomyResult<bool> {
        let modifier = self
            .modifiers
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(EconomyError::ModifierNotFound(id))?;
        let mut scope = EffectScope {
            modifier: id,
            time: &mut self.time,
            generators: &mut self.generators,
        };
        modifier.enable(&mut scope)
    }

    /// Revert a modifier's effect. Returns `true` if it was enabled.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::ModifierNotFound`] for unknown ids.
    pub fn disable_modifier(&mut self, id: ModifierId) -> EconomyResult<bool> {
        let modifier = self
            .modifiers
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or(EconomyError::ModifierNotFound(id))?;
        let mut scope = EffectScope {
            modifier: id,
            time: &mut self.time,
            generators: &mut self.generators,
        };
        modifier.disable(&mut scope)
    }

    /// Look up a modifier.
    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id() == id)
    }

    /// All modifiers in registration order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Number of registered modifiers.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_currency(&self, id: CurrencyId) -> EconomyResult<()> {
        if self.currency(id).is_none() {
            return Err(EconomyError::invalid_config(format!(
                "generator targets unregistered currency {id}"
            )));
        }
        Ok(())
    }

    fn automator_entry(&mut self, id: AutomatorId) -> EconomyResult<&mut Automator> {
        self.automator_mut(id)
            .ok_or(EconomyError::AutomatorNotFound(id))
    }

    pub(crate) fn from_parts(seed: u64, generators_created: u64, time: TimeScale) -> Self {
        Self {
            seed,
            generators_created,
            time,
            ..Self::default()
        }
    }

    pub(crate) const fn generators_created(&self) -> u64 {
        self.generators_created
    }

    pub(crate) fn push_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }
}

/// Run `times` cycles of one generator into its currency.
fn fire_generator(
    generators: &mut [Generator],
    currencies: &mut [Currency],
    target: GeneratorId,
    times: u64,
) {
    let Some(generator) = generators.iter_mut().find(|g| g.id() == target) else {
        tracing::debug!(generator = %target, "automator target no longer registered");
        return;
    };
    let currency_id = generator.currency();
    let Some(currency) = currencies.iter_mut().find(|c| c.id() == currency_id) else {
        tracing::debug!(
            generator = %target,
            currency = %currency_id,
            "generator currency no longer registered"
        );
        return;
    };
    for _ in 0..times {
        if let Err(e) = generator.process(currency) {
            tracing::warn!(generator = %target, error = %e, "generator cycle failed");
            return;
        }
    }
}
