//! Assemble a [`World`] from a [`ScenarioConfig`].
//!
//! Entities are registered in declaration order (currencies, generators,
//! automators, modifiers), so automator firing order follows the file.
//! Names are resolved to ids as they are registered; a reference to a name
//! declared later, or never, is an error.

use std::collections::BTreeMap;

use clicker_economy::{
    AutomatorConfig, CurrencyConfig, EconomyError, EffectConfig, GeneratorConfig, ModifierConfig,
    World,
};
use clicker_types::{AutomatorId, CurrencyId, GeneratorId, ModifierId};

use crate::config::{ModifierTargetConfig, RunConfig, ScenarioConfig};

/// Errors that can occur while assembling a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// A generator names a currency that was not declared before it.
    #[error("generator {generator:?} pays into unknown currency {currency:?}")]
    UnknownCurrency {
        /// The generator making the reference.
        generator: String,
        /// The unresolved currency name.
        currency: String,
    },

    /// An automator or modifier names a generator that was not declared
    /// before it.
    #[error("{owner:?} refers to unknown generator {generator:?}")]
    UnknownGenerator {
        /// The automator or modifier making the reference.
        owner: String,
        /// The unresolved generator name.
        generator: String,
    },

    /// Two entities of the same kind share a name.
    #[error("duplicate {kind} name {name:?}")]
    DuplicateName {
        /// Entity kind ("currency", "generator", "automator").
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// The economy rejected an entity's parameters.
    #[error("invalid entity: {source}")]
    Economy {
        /// The underlying economy error.
        #[from]
        source: EconomyError,
    },
}

/// An assembled world plus the name-to-id tables used to build it.
#[derive(Debug)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// The assembled world.
    pub world: World,
    /// Currency ids by name.
    pub currencies: BTreeMap<String, CurrencyId>,
    /// Generator ids by name.
    pub generators: BTreeMap<String, GeneratorId>,
    /// Automator ids by name.
    pub automators: BTreeMap<String, AutomatorId>,
    /// Modifier ids in declaration order.
    pub modifiers: Vec<ModifierId>,
    /// How long to run.
    pub run: RunConfig,
}

/// Build a world from a scenario configuration.
///
/// Initial balances and levels are applied as entities are registered, and
/// modifiers marked `enabled` are enabled once every entity exists.
///
/// # Errors
///
/// Returns [`ScenarioError`] for unresolved or duplicate names, or when an
/// entity's parameters are rejected.
pub fn build_world(config: &ScenarioConfig) -> Result<Scenario, ScenarioError> {
    let mut world = World::new(config.world.seed);

    let mut currencies = BTreeMap::new();
    for entry in &config.currencies {
        if currencies.contains_key(&entry.name) {
            return Err(duplicate("currency", &entry.name));
        }
        let id = world.add_currency(CurrencyConfig {
            name: entry.name.clone(),
            initial: entry.initial.clone(),
        })?;
        currencies.insert(entry.name.clone(), id);
    }

    let mut generators = BTreeMap::new();
    for entry in &config.generators {
        if generators.contains_key(&entry.name) {
            return Err(duplicate("generator", &entry.name));
        }
        let currency = *currencies
            .get(&entry.currency)
            .ok_or_else(|| ScenarioError::UnknownCurrency {
                generator: entry.name.clone(),
                currency: entry.currency.clone(),
            })?;
        let id = world.add_generator(GeneratorConfig {
            name: entry.name.clone(),
            currency,
            base_amount: entry.base_amount.clone(),
            amount_multiplier: entry.amount_multiplier,
            base_price: entry.base_price.clone(),
            price_multiplier: entry.price_multiplier,
            max_level: entry.max_level,
            probability: entry.probability,
            use_remainder: entry.use_remainder,
            cooldown: entry.cooldown,
        })?;
        if let Some(generator) = world.generator_mut(id) {
            generator.item_mut().set_level(entry.level);
        }
        generators.insert(entry.name.clone(), id);
    }

    let mut automators = BTreeMap::new();
    for entry in &config.automators {
        if automators.contains_key(&entry.name) {
            return Err(duplicate("automator", &entry.name));
        }
        let generator = resolve_generator(&generators, &entry.name, &entry.generator)?;
        let id = world.add_automator(AutomatorConfig {
            name: entry.name.clone(),
            generator,
            tick_rate: entry.every,
            tick_rate_multiplier: entry.tick_rate_multiplier,
            base_price: entry.base_price.clone(),
            price_multiplier: entry.price_multiplier,
            max_level: entry.max_level,
            enabled: entry.enabled,
        })?;
        if let Some(automator) = world.automator_mut(id) {
            automator.item_mut().set_level(entry.level);
        }
        automators.insert(entry.name.clone(), id);
    }

    let mut modifiers = Vec::with_capacity(config.modifiers.len());
    let mut to_enable = Vec::new();
    for entry in &config.modifiers {
        let effect = match &entry.target {
            ModifierTargetConfig::World {
                speed_by,
                disable_automation,
            } => EffectConfig::World {
                speed_multiplier: *speed_by,
                disable_automation: *disable_automation,
            },
            ModifierTargetConfig::Generator {
                generator,
                multiplier,
            } => {
                let owner = entry.name.as_deref().unwrap_or("modifier");
                let id = resolve_generator(&generators, owner, generator)?;
                EffectConfig::output_by(id, *multiplier)
            }
        };
        let mut modifier = ModifierConfig::new(effect);
        if let Some(name) = &entry.name {
            modifier.name.clone_from(name);
        }
        let id = world.add_modifier(modifier)?;
        modifiers.push(id);
        if entry.enabled {
            to_enable.push(id);
        }
    }
    for id in to_enable {
        world.enable_modifier(id)?;
    }

    tracing::debug!(
        scenario = config.world.name.as_str(),
        currencies = currencies.len(),
        generators = generators.len(),
        automators = automators.len(),
        modifiers = modifiers.len(),
        "scenario assembled"
    );

    Ok(Scenario {
        name: config.world.name.clone(),
        world,
        currencies,
        generators,
        automators,
        modifiers,
        run: config.run,
    })
}

fn resolve_generator(
    generators: &BTreeMap<String, GeneratorId>,
    owner: &str,
    name: &str,
) -> Result<GeneratorId, ScenarioError> {
    generators
        .get(name)
        .copied()
        .ok_or_else(|| ScenarioError::UnknownGenerator {
            owner: owner.to_owned(),
            generator: name.to_owned(),
        })
}

fn duplicate(kind: &'static str, name: &str) -> ScenarioError {
    ScenarioError::DuplicateName {
        kind,
        name: name.to_owned(),
    }
}
