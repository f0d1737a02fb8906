//! Scenario configuration loaded from YAML.
//!
//! A scenario describes a complete economy by name: currencies, the
//! generators paying into them, the automators driving those generators,
//! the modifiers available, and how long to run. The canonical file is
//! `clicker-scenario.yaml` at the project root.
//!
//! Every field has a default, so a scenario file only needs to spell out
//! what differs. Entities refer to each other by name; names are resolved
//! to ids in [`crate::scenario`].

use std::path::Path;

use num_bigint::BigInt;
use serde::{Deserialize, Deserializer};

use clicker_economy::automator::{DEFAULT_AUTOMATOR_NAME, DEFAULT_TICK_RATE};
use clicker_economy::currency::DEFAULT_CURRENCY_NAME;
use clicker_economy::generator::{
    DEFAULT_AMOUNT_MULTIPLIER, DEFAULT_GENERATOR_NAME, DEFAULT_GENERATOR_PRICE_MULTIPLIER,
};
use clicker_economy::item::DEFAULT_PRICE_MULTIPLIER;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the scenario file from disk.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse scenario YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scenario configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// World name and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Currencies, in registration order.
    #[serde(default)]
    pub currencies: Vec<CurrencyEntry>,

    /// Generators, in registration order.
    #[serde(default)]
    pub generators: Vec<GeneratorEntry>,

    /// Automators, in registration (and firing) order.
    #[serde(default)]
    pub automators: Vec<AutomatorEntry>,

    /// Modifiers, in registration order.
    #[serde(default)]
    pub modifiers: Vec<ModifierEntry>,

    /// Run length and frame size.
    #[serde(default)]
    pub run: RunConfig,
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not a valid scenario.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not a valid scenario.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable scenario name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed for every generator's random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// One currency.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CurrencyEntry {
    /// Unique name; generators refer to it.
    #[serde(default = "default_currency_name")]
    pub name: String,

    /// Starting balance. Accepts an integer or a decimal string for
    /// values beyond 64 bits.
    #[serde(default, deserialize_with = "amount")]
    pub initial: BigInt,
}

/// One generator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratorEntry {
    /// Unique name; automators and modifiers refer to it.
    #[serde(default = "default_generator_name")]
    pub name: String,

    /// Name of the currency receiving the output.
    #[serde(default = "default_currency_name")]
    pub currency: String,

    /// Output at level 1.
    #[serde(default = "default_one", deserialize_with = "amount")]
    pub base_amount: BigInt,

    /// Per-level output growth.
    #[serde(default = "default_amount_multiplier")]
    pub amount_multiplier: f64,

    /// Price of the first level.
    #[serde(default = "default_one", deserialize_with = "amount")]
    pub base_price: BigInt,

    /// Per-level price growth.
    #[serde(default = "default_generator_price_multiplier")]
    pub price_multiplier: f64,

    /// Level ceiling.
    #[serde(default = "default_max_level")]
    pub max_level: u64,

    /// Starting level (clamped to `max_level`).
    #[serde(default)]
    pub level: u64,

    /// Chance in `[0, 1]` that a cycle produces. Omit for "always".
    #[serde(default)]
    pub probability: Option<f64>,

    /// Whether fractional output is banked across cycles.
    #[serde(default = "default_true")]
    pub use_remainder: bool,

    /// Cooldown in seconds between manual activations.
    #[serde(default)]
    pub cooldown: f64,
}

/// One automator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AutomatorEntry {
    /// Display name.
    #[serde(default = "default_automator_name")]
    pub name: String,

    /// Name of the generator it triggers.
    #[serde(default = "default_generator_name")]
    pub generator: String,

    /// Interval in seconds between firings.
    #[serde(default = "default_tick_rate")]
    pub every: f64,

    /// Per-level interval speed-up. Omit for a fixed interval.
    #[serde(default)]
    pub tick_rate_multiplier: Option<f64>,

    /// Price of the first level.
    #[serde(default = "default_one", deserialize_with = "amount")]
    pub base_price: BigInt,

    /// Per-level price growth.
    #[serde(default = "default_price_multiplier")]
    pub price_multiplier: f64,

    /// Level ceiling.
    #[serde(default = "default_max_level")]
    pub max_level: u64,

    /// Starting level (clamped to `max_level`).
    #[serde(default)]
    pub level: u64,

    /// Whether it starts in the update sweep.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// One modifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModifierEntry {
    /// Display name. Defaults to one derived from the target kind.
    #[serde(default)]
    pub name: Option<String>,

    /// What the modifier affects.
    pub target: ModifierTargetConfig,

    /// Whether it is enabled once the world is assembled.
    #[serde(default)]
    pub enabled: bool,
}

/// Target and effect of a modifier, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModifierTargetConfig {
    /// Global speed and automation.
    World {
        /// Factor applied to the world speed.
        #[serde(default = "default_factor")]
        speed_by: f64,
        /// Whether automators stop while enabled.
        #[serde(default)]
        disable_automation: bool,
    },
    /// One generator's output.
    Generator {
        /// Name of the generator affected.
        generator: String,
        /// Factor applied to its output.
        #[serde(default = "default_factor")]
        multiplier: f64,
    },
}

/// Run length and frame size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Simulated seconds to run.
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: f64,

    /// Simulated seconds per frame; the last frame may be shorter.
    #[serde(default = "default_frame_seconds")]
    pub frame_seconds: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration_seconds: default_duration_seconds(),
            frame_seconds: default_frame_seconds(),
        }
    }
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Unsigned(u64),
    Text(String),
}

/// Deserialize a big integer from a YAML integer or decimal string.
fn amount<'de, D>(deserializer: D) -> Result<BigInt, D::Error>
where
    D: Deserializer<'de>,
{
    match RawAmount::deserialize(deserializer)? {
        RawAmount::Integer(value) => Ok(BigInt::from(value)),
        RawAmount::Unsigned(value) => Ok(BigInt::from(value)),
        RawAmount::Text(text) => text
            .trim()
            .parse::<BigInt>()
            .map_err(|e| serde::de::Error::custom(format!("invalid amount {text:?}: {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Clicker".to_owned()
}

const fn default_seed() -> u64 {
    42
}

fn default_currency_name() -> String {
    DEFAULT_CURRENCY_NAME.to_owned()
}

fn default_generator_name() -> String {
    DEFAULT_GENERATOR_NAME.to_owned()
}

fn default_automator_name() -> String {
    DEFAULT_AUTOMATOR_NAME.to_owned()
}

fn default_one() -> BigInt {
    BigInt::from(1)
}

const fn default_amount_multiplier() -> f64 {
    DEFAULT_AMOUNT_MULTIPLIER
}

const fn default_generator_price_multiplier() -> f64 {
    DEFAULT_GENERATOR_PRICE_MULTIPLIER
}

const fn default_price_multiplier() -> f64 {
    DEFAULT_PRICE_MULTIPLIER
}

const fn default_max_level() -> u64 {
    u64::MAX
}

const fn default_tick_rate() -> f64 {
    DEFAULT_TICK_RATE
}

const fn default_factor() -> f64 {
    1.0
}

const fn default_true() -> bool {
    true
}

const fn default_duration_seconds() -> f64 {
    60.0
}

const fn default_frame_seconds() -> f64 {
    1.0
}
