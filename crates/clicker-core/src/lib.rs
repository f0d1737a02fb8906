//! Scenario loading, world assembly, and the simulation runner for the
//! clicker economy.
//!
//! # Modules
//!
//! - [`config`] -- Scenario loading from `clicker-scenario.yaml` into
//!   strongly-typed structs.
//! - [`scenario`] -- Name resolution and world assembly.
//! - [`clock`] -- Frame counter with checked arithmetic.
//! - [`runner`] -- Fixed-frame run loop, offline catch-up, and run
//!   summaries.

pub mod clock;
pub mod config;
pub mod runner;
pub mod scenario;

pub use clock::{ClockError, SimClock};
pub use config::{ConfigError, RunConfig, ScenarioConfig};
pub use runner::{RunSummary, RunnerError, catch_up, run};
pub use scenario::{Scenario, ScenarioError, build_world};
