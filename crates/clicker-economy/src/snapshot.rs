//! Serializable state records for every entity and for the whole world.
//!
//! [`World::snapshot`] captures everything needed to continue a simulation
//! without an observable discontinuity: balances, levels, in-flight
//! `tick_timer` and `remainder` accumulators, process counters, modifier
//! state, the global speed multiplier and the automation suspension count.
//!
//! [`World::restore`] rebuilds an equivalent world. Enabled modifiers are
//! not re-applied (the world-level state they produced is part of the
//! snapshot); generator output modifiers are re-attached to their targets.
//! Completion callbacks are not persisted. Each generator's random stream
//! is replayed from its stored seed up to the recorded number of draws, so
//! probability outcomes continue where they left off.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use clicker_types::{AutomatorId, CurrencyId, GeneratorId, ModifierId};

use crate::automator::{Automator, AutomatorConfig};
use crate::currency::{Currency, CurrencyConfig};
use crate::error::{EconomyError, EconomyResult};
use crate::generator::{Generator, GeneratorConfig};
use crate::item::Item;
use crate::modifier::{AppliedSpeed, EffectConfig, Modifier, ModifierConfig, ModifierEffect};
use crate::world::{TimeScale, World};

/// State of one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySnapshot {
    /// Currency id.
    pub id: CurrencyId,
    /// Display name.
    pub name: String,
    /// Exact balance.
    pub value: BigInt,
}

/// Progression state shared by generators and automators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Display name.
    pub name: String,
    /// Description text.
    pub description: String,
    /// Price of the first level.
    pub base_price: BigInt,
    /// Per-level price growth.
    pub price_multiplier: f64,
    /// Current level.
    pub level: u64,
    /// Level ceiling.
    pub max_level: u64,
}

/// State of one generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSnapshot {
    /// Generator id.
    pub id: GeneratorId,
    /// Level and price state.
    pub item: ItemSnapshot,
    /// Currency receiving the output.
    pub currency: CurrencyId,
    /// Output at level 1.
    pub base_amount: BigInt,
    /// Per-level output growth.
    pub amount_multiplier: f64,
    /// Success chance per cycle, if gated.
    pub probability: Option<f64>,
    /// Seed of the private random stream.
    pub seed: u64,
    /// Values drawn from the random stream so far.
    #[serde(default)]
    pub draws: u64,
    /// Whether fractional output is banked.
    pub use_remainder: bool,
    /// Banked fractional output.
    pub remainder: f64,
    /// Cooldown in seconds between manual activations.
    pub cooldown: f64,
    /// Productive cycles so far.
    pub times_processed: u64,
}

/// State of one automator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomatorSnapshot {
    /// Automator id.
    pub id: AutomatorId,
    /// Level and price state.
    pub item: ItemSnapshot,
    /// Generator triggered on every firing.
    pub generator: GeneratorId,
    /// Base interval in seconds.
    pub tick_rate: f64,
    /// Per-level interval speed-up, if level-scaled.
    pub tick_rate_multiplier: Option<f64>,
    /// Seconds accumulated toward the next firing.
    pub tick_timer: f64,
    /// Whether the automator takes part in the update sweep.
    pub enabled: bool,
}

/// Persisted form of a modifier effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSnapshot {
    /// Global speed / automation effect.
    World {
        /// Factor applied to the world speed.
        speed_multiplier: f64,
        /// Whether automation is suspended while enabled.
        disable_automation: bool,
        /// Speeds recorded when the effect was applied.
        applied: Option<AppliedSpeed>,
    },
    /// Single-generator output effect.
    Generator {
        /// The generator affected.
        generator: GeneratorId,
        /// Output factor.
        multiplier: f64,
    },
}

/// State of one modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierSnapshot {
    /// Modifier id.
    pub id: ModifierId,
    /// Display name.
    pub name: String,
    /// Whether the effect is applied.
    pub enabled: bool,
    /// The effect carried.
    pub effect: EffectSnapshot,
}

/// Complete state of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// World seed.
    pub seed: u64,
    /// Generators created so far; the ordinal of the next one.
    pub generators_created: u64,
    /// Global speed multiplier.
    pub speed_multiplier: f64,
    /// Enabled effects currently suspending automation.
    pub automation_suspensions: u32,
    /// Currencies in registration order.
    pub currencies: Vec<CurrencySnapshot>,
    /// Generators in registration order.
    pub generators: Vec<GeneratorSnapshot>,
    /// Automators in registration order.
    pub automators: Vec<AutomatorSnapshot>,
    /// Modifiers in registration order.
    pub modifiers: Vec<ModifierSnapshot>,
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

impl From<&Currency> for CurrencySnapshot {
    fn from(currency: &Currency) -> Self {
        Self {
            id: currency.id(),
            name: currency.name().to_owned(),
            value: currency.value().clone(),
        }
    }
}

impl From<&Item> for ItemSnapshot {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name().to_owned(),
            description: item.description().to_owned(),
            base_price: item.base_price().clone(),
            price_multiplier: item.price_multiplier(),
            level: item.level(),
            max_level: item.max_level(),
        }
    }
}

impl From<&Generator> for GeneratorSnapshot {
    fn from(generator: &Generator) -> Self {
        Self {
            id: generator.id(),
            item: ItemSnapshot::from(generator.item()),
            currency: generator.currency(),
            base_amount: generator.base_amount().clone(),
            amount_multiplier: generator.amount_multiplier(),
            probability: generator.probability(),
            seed: generator.seed(),
            draws: generator.draws(),
            use_remainder: generator.uses_remainder(),
            remainder: generator.remainder(),
            cooldown: generator.cooldown(),
            times_processed: generator.times_processed(),
        }
    }
}

impl From<&Automator> for AutomatorSnapshot {
    fn from(automator: &Automator) -> Self {
        Self {
            id: automator.id(),
            item: ItemSnapshot::from(automator.item()),
            generator: automator.generator(),
            tick_rate: automator.tick_rate(),
            tick_rate_multiplier: automator.tick_rate_multiplier(),
            tick_timer: automator.tick_timer(),
            enabled: automator.is_enabled(),
        }
    }
}

impl From<&ModifierEffect> for EffectSnapshot {
    fn from(effect: &ModifierEffect) -> Self {
        match effect {
            ModifierEffect::World(world) => Self::World {
                speed_multiplier: world.speed_multiplier(),
                disable_automation: world.disables_automation(),
                applied: world.applied(),
            },
            ModifierEffect::Generator(generator) => Self::Generator {
                generator: generator.generator(),
                multiplier: generator.multiplier(),
            },
        }
    }
}

impl From<&Modifier> for ModifierSnapshot {
    fn from(modifier: &Modifier) -> Self {
        Self {
            id: modifier.id(),
            name: modifier.name().to_owned(),
            enabled: modifier.is_enabled(),
            effect: EffectSnapshot::from(modifier.effect()),
        }
    }
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

impl CurrencySnapshot {
    fn rebuild(&self) -> EconomyResult<Currency> {
        Currency::with_id(
            self.id,
            CurrencyConfig {
                name: self.name.clone(),
                initial: self.value.clone(),
            },
        )
    }
}

impl ItemSnapshot {
    fn restore_into(&self, item: &mut Item) {
        item.set_description(self.description.clone());
        item.set_level(self.level);
    }
}

impl GeneratorSnapshot {
    fn rebuild(&self) -> EconomyResult<Generator> {
        if !self.remainder.is_finite() {
            return Err(EconomyError::invalid_argument(
                "remainder",
                format!("must be finite, got {}", self.remainder),
            ));
        }
        let config = GeneratorConfig {
            name: self.item.name.clone(),
            currency: self.currency,
            base_amount: self.base_amount.clone(),
            amount_multiplier: self.amount_multiplier,
            base_price: self.item.base_price.clone(),
            price_multiplier: self.item.price_multiplier,
            max_level: self.item.max_level,
            probability: self.probability,
            use_remainder: self.use_remainder,
            cooldown: self.cooldown,
        };
        let mut generator = Generator::with_id(self.id, config, self.seed)?;
        self.item.restore_into(generator.item_mut());
        generator.restore_counters(self.remainder, self.times_processed, self.draws);
        Ok(generator)
    }
}

impl AutomatorSnapshot {
    fn rebuild(&self) -> EconomyResult<Automator> {
        if !self.tick_timer.is_finite() || self.tick_timer < 0.0 {
            return Err(EconomyError::invalid_argument(
                "tick_timer",
                format!("must be finite and non-negative, got {}", self.tick_timer),
            ));
        }
        let config = AutomatorConfig {
            name: self.item.name.clone(),
            generator: self.generator,
            tick_rate: self.tick_rate,
            tick_rate_multiplier: self.tick_rate_multiplier,
            base_price: self.item.base_price.clone(),
            price_multiplier: self.item.price_multiplier,
            max_level: self.item.max_level,
            enabled: self.enabled,
        };
        let mut automator = Automator::with_id(self.id, config)?;
        self.item.restore_into(automator.item_mut());
        automator.restore_timer(self.tick_timer, self.enabled);
        Ok(automator)
    }
}

impl ModifierSnapshot {
    fn rebuild(&self) -> EconomyResult<Modifier> {
        let (effect, applied) = match self.effect {
            EffectSnapshot::World {
                speed_multiplier,
                disable_automation,
                applied,
            } => (
                EffectConfig::World {
                    speed_multiplier,
                    disable_automation,
                },
                applied,
            ),
            EffectSnapshot::Generator {
                generator,
                multiplier,
            } => (EffectConfig::output_by(generator, multiplier), None),
        };
        let mut modifier = Modifier::with_id(
            self.id,
            ModifierConfig {
                name: self.name.clone(),
                effect,
            },
        )?;
        modifier.restore_state(self.enabled, applied.filter(|_| self.enabled));
        Ok(modifier)
    }
}

impl World {
    /// Capture the complete state of this world.
    pub fn snapshot(&self) -> WorldSnapshot {
        let time = self.time_scale();
        WorldSnapshot {
            seed: self.seed(),
            generators_created: self.generators_created(),
            speed_multiplier: time.speed_multiplier(),
            automation_suspensions: time.automation_suspensions(),
            currencies: self.currencies().iter().map(CurrencySnapshot::from).collect(),
            generators: self.generators().iter().map(GeneratorSnapshot::from).collect(),
            automators: self.automators().iter().map(AutomatorSnapshot::from).collect(),
            modifiers: self.modifiers().iter().map(ModifierSnapshot::from).collect(),
        }
    }

    /// Rebuild a world from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] for duplicate ids or dangling
    /// references, and [`EconomyError::InvalidArgument`] for out-of-range
    /// values.
    pub fn restore(snapshot: &WorldSnapshot) -> EconomyResult<Self> {
        if !snapshot.speed_multiplier.is_finite() || snapshot.speed_multiplier <= 0.0 {
            return Err(EconomyError::invalid_argument(
                "speed_multiplier",
                format!("must be finite and positive, got {}", snapshot.speed_multiplier),
            ));
        }
        let time = TimeScale::from_parts(snapshot.speed_multiplier, snapshot.automation_suspensions);
        let mut world = Self::from_parts(snapshot.seed, snapshot.generators_created, time);

        for entry in &snapshot.currencies {
            if world.currency(entry.id).is_some() {
                return Err(duplicate("currency", entry.id));
            }
            world.insert_currency(entry.rebuild()?);
        }
        for entry in &snapshot.generators {
            if world.generator(entry.id).is_some() {
                return Err(duplicate("generator", entry.id));
            }
            world.insert_generator(entry.rebuild()?)?;
        }
        for entry in &snapshot.automators {
            if world.automator(entry.id).is_some() {
                return Err(duplicate("automator", entry.id));
            }
            world.insert_automator(entry.rebuild()?)?;
        }
        for entry in &snapshot.modifiers {
            if world.modifier(entry.id).is_some() {
                return Err(duplicate("modifier", entry.id));
            }
            let modifier = entry.rebuild()?;
            if let EffectSnapshot::Generator {
                generator,
                multiplier,
            } = entry.effect
            {
                if entry.enabled {
                    world
                        .generator_mut(generator)
                        .ok_or_else(|| {
                            EconomyError::invalid_config(format!(
                                "enabled modifier {} targets unregistered generator {generator}",
                                entry.id
                            ))
                        })?
                        .attach_modifier(entry.id, multiplier);
                }
            }
            world.push_modifier(modifier);
        }

        tracing::debug!(
            currencies = world.currency_count(),
            generators = world.generator_count(),
            automators = world.automator_count(),
            modifiers = world.modifier_count(),
            "world restored"
        );
        Ok(world)
    }
}

fn duplicate(kind: &str, id: impl core::fmt::Display) -> EconomyError {
    EconomyError::invalid_config(format!("duplicate {kind} id {id}"))
}
