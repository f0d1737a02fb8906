//! Headless engine for clicker economy scenarios.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load the scenario: first CLI argument, else `CLICKER_SCENARIO`, else
//!    `clicker-scenario.yaml`, else the built-in default
//! 3. Assemble the world
//! 4. Run it in fixed frames
//! 5. Log the summary, and print the final snapshot as JSON when
//!    `CLICKER_PRINT_SNAPSHOT` is set

mod error;

use std::path::PathBuf;

use clicker_core::{ScenarioConfig, build_world, run};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Scenario file looked up in the working directory.
const DEFAULT_SCENARIO_FILE: &str = "clicker-scenario.yaml";

/// Scenario used when no file is found.
const BUILTIN_SCENARIO: &str = r"
world:
  name: Built-in
currencies:
  - name: Gold
generators:
  - name: Mine
    currency: Gold
    base_amount: 1
    amount_multiplier: 1.2
    level: 1
automators:
  - name: Miner
    generator: Mine
run:
  duration_seconds: 60
";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if the scenario cannot be loaded, assembled, or run.
fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("clicker-engine starting");

    // 2. Load the scenario.
    let config = load_scenario()?;
    info!(
        scenario = config.world.name,
        seed = config.world.seed,
        currencies = config.currencies.len(),
        generators = config.generators.len(),
        automators = config.automators.len(),
        modifiers = config.modifiers.len(),
        "Scenario loaded"
    );

    // 3. Assemble the world.
    let mut scenario = build_world(&config)?;
    info!(
        speed_multiplier = scenario.world.speed_multiplier(),
        automation_enabled = scenario.world.is_automation_enabled(),
        "World assembled"
    );

    // 4. Run.
    let summary = run(&mut scenario.world, &scenario.run)?;

    // 5. Report.
    for line in &summary.balances {
        info!(currency = line.name, value = %line.value, "Final balance");
    }
    for line in &summary.generators {
        info!(
            generator = line.name,
            level = line.level,
            times_processed = line.times_processed,
            "Generator total"
        );
    }

    if std::env::var_os("CLICKER_PRINT_SNAPSHOT").is_some() {
        let json = serde_json::to_string_pretty(&scenario.world.snapshot())?;
        #[allow(clippy::print_stdout)]
        {
            println!("{json}");
        }
    }

    info!(scenario = scenario.name, "clicker-engine finished");
    Ok(())
}

/// Resolve and load the scenario to run.
fn load_scenario() -> Result<ScenarioConfig, EngineError> {
    let explicit = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("CLICKER_SCENARIO"))
        .map(PathBuf::from);

    if let Some(path) = explicit {
        info!(path = %path.display(), "Loading scenario");
        return Ok(ScenarioConfig::from_file(&path)?);
    }

    let default_path = PathBuf::from(DEFAULT_SCENARIO_FILE);
    if default_path.exists() {
        info!(path = %default_path.display(), "Loading scenario");
        Ok(ScenarioConfig::from_file(&default_path)?)
    } else {
        info!("Scenario file not found, using built-in default");
        Ok(ScenarioConfig::parse(BUILTIN_SCENARIO)?)
    }
}
