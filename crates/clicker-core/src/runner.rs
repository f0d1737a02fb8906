//! Fixed-frame simulation runner.
//!
//! [`run`] steps a world through `duration_seconds` of simulated time in
//! frames of `frame_seconds`, shortening the last frame so the total is
//! exact. [`catch_up`] hands a single large delta to the world in one
//! update, the way offline progress is applied on load.

use num_bigint::BigInt;
use serde::Serialize;
use tracing::{debug, info};

use clicker_economy::World;

use crate::clock::{ClockError, SimClock};
use crate::config::RunConfig;

/// Frames between progress log lines.
const PROGRESS_INTERVAL_FRAMES: u64 = 100;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The clock rejected its configuration or overflowed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The run duration is negative or not finite.
    #[error("invalid run duration: {duration_seconds}")]
    InvalidDuration {
        /// The rejected duration.
        duration_seconds: f64,
    },
}

/// Final balance of one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceLine {
    /// Currency name.
    pub name: String,
    /// Exact balance.
    pub value: BigInt,
}

/// Final state of one generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratorLine {
    /// Generator name.
    pub name: String,
    /// Current level.
    pub level: u64,
    /// Productive cycles so far.
    pub times_processed: u64,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Frames executed.
    pub frames: u64,
    /// Simulated seconds handed to the world (before speed scaling).
    pub simulated_seconds: f64,
    /// Automator firings across all frames.
    pub firings: u64,
    /// Final balances in registration order.
    pub balances: Vec<BalanceLine>,
    /// Final generator state in registration order.
    pub generators: Vec<GeneratorLine>,
}

/// Step `world` through `config.duration_seconds` in fixed frames.
///
/// # Errors
///
/// Returns [`RunnerError::InvalidDuration`] for a negative or non-finite
/// duration, or [`RunnerError::Clock`] for an invalid frame length.
pub fn run(world: &mut World, config: &RunConfig) -> Result<RunSummary, RunnerError> {
    let duration = config.duration_seconds;
    if !duration.is_finite() || duration < 0.0 {
        return Err(RunnerError::InvalidDuration {
            duration_seconds: duration,
        });
    }
    let mut clock = SimClock::new(config.frame_seconds)?;

    info!(
        duration_seconds = duration,
        frame_seconds = clock.frame_seconds(),
        "Run starting"
    );

    let mut firings: u64 = 0;
    let mut remaining = duration;
    while remaining > 0.0 {
        let step = remaining.min(clock.frame_seconds());
        firings = firings.saturating_add(world.update(step));
        let frame = clock.advance(step)?;
        remaining = duration - clock.elapsed();
        // Absorb float residue so the loop never runs a sliver frame.
        if remaining < clock.frame_seconds() * 1e-9 {
            remaining = 0.0;
        }
        if frame % PROGRESS_INTERVAL_FRAMES == 0 {
            debug!(frame, elapsed = clock.elapsed(), firings, "Run progress");
        }
    }

    let summary = summarize(world, clock.frame(), clock.elapsed(), firings);
    info!(
        frames = summary.frames,
        simulated_seconds = summary.simulated_seconds,
        firings = summary.firings,
        "Run complete"
    );
    Ok(summary)
}

/// Apply `seconds` of offline progress in a single update. Returns the
/// number of automator firings.
pub fn catch_up(world: &mut World, seconds: f64) -> u64 {
    let firings = world.update(seconds);
    info!(seconds, firings, "Offline progress applied");
    firings
}

/// Collect the final balances and generator state of `world`.
pub fn summarize(world: &World, frames: u64, simulated_seconds: f64, firings: u64) -> RunSummary {
    RunSummary {
        frames,
        simulated_seconds,
        firings,
        balances: world
            .currencies()
            .iter()
            .map(|c| BalanceLine {
                name: c.name().to_owned(),
                value: c.value().clone(),
            })
            .collect(),
        generators: world
            .generators()
            .iter()
            .map(|g| GeneratorLine {
                name: g.item().name().to_owned(),
                level: g.item().level(),
                times_processed: g.times_processed(),
            })
            .collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clicker_economy::{AutomatorConfig, CurrencyConfig, GeneratorConfig};

    use super::*;

    fn ticking_world() -> World {
        let mut world = World::new(1);
        let gold = world.add_currency(CurrencyConfig::default()).unwrap();
        let g = world.add_generator(GeneratorConfig::for_currency(gold)).unwrap();
        world.generator_mut(g).unwrap().item_mut().upgrade();
        world.add_automator(AutomatorConfig::for_generator(g)).unwrap();
        world
    }

    #[test]
    fn run_consumes_the_whole_duration() {
        let mut world = ticking_world();
        let config = RunConfig {
            duration_seconds: 10.5,
            frame_seconds: 2.0,
        };
        let summary = run(&mut world, &config).unwrap();
        assert_eq!(summary.frames, 6);
        assert!((summary.simulated_seconds - 10.5).abs() < 1e-9);
        assert_eq!(summary.firings, 10);
        assert_eq!(
            summary.balances.first().map(|b| b.value.clone()),
            Some(BigInt::from(10))
        );
        assert_eq!(summary.generators.first().map(|g| g.times_processed), Some(10));
    }

    #[test]
    fn summary_serializes_for_reporting() {
        let mut world = ticking_world();
        let summary = run(&mut world, &RunConfig::default()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json.get("frames").and_then(serde_json::Value::as_u64), Some(60));
        assert_eq!(json.get("firings").and_then(serde_json::Value::as_u64), Some(60));
    }

    #[test]
    fn zero_duration_runs_no_frames() {
        let mut world = ticking_world();
        let config = RunConfig {
            duration_seconds: 0.0,
            frame_seconds: 1.0,
        };
        let summary = run(&mut world, &config).unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.firings, 0);
    }

    #[test]
    fn invalid_run_config_is_rejected() {
        let mut world = ticking_world();
        let negative = RunConfig {
            duration_seconds: -1.0,
            frame_seconds: 1.0,
        };
        assert!(matches!(
            run(&mut world, &negative),
            Err(RunnerError::InvalidDuration { .. })
        ));
        let zero_frame = RunConfig {
            duration_seconds: 1.0,
            frame_seconds: 0.0,
        };
        assert!(matches!(
            run(&mut world, &zero_frame),
            Err(RunnerError::Clock { .. })
        ));
    }

    #[test]
    fn catch_up_fires_every_missed_interval() {
        let mut world = ticking_world();
        assert_eq!(catch_up(&mut world, 3600.0), 3600);
        assert_eq!(
            world.currencies().first().map(|c| c.value().clone()),
            Some(BigInt::from(3600))
        );
    }
}
