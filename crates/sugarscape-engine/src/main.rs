//! Runner binary for the Sugarscape Constant Growback simulation.
//!
//! Loads configuration, builds a World from a capacity map, and ticks it
//! until a bound is reached or `Ctrl-C` is pressed, reporting metrics
//! snapshots along the way.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sugarscape-config.yaml` (or the path in
//!    `SUGARSCAPE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load the capacity map, or build a uniform one
//! 4. Build the World and place the initial population
//! 5. Create operator state, wire `Ctrl-C` to a clean stop, and start the
//!    stdin operator console (`pause`, `resume`, `stop`, `speed <ms>`)
//! 6. Run the simulation loop with the metrics reporter
//! 7. Log the result

mod console;
mod error;
mod map_loader;
mod reporter;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sugarscape_core::config::{LoggingConfig, SimulationConfig};
use sugarscape_core::operator::OperatorState;
use sugarscape_core::runner;
use sugarscape_core::world::World;
use sugarscape_world::CapacityMap;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::reporter::MetricsReporter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "sugarscape-config.yaml";

/// Environment variable overriding the configuration path.
const CONFIG_PATH_ENV: &str = "SUGARSCAPE_CONFIG";

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (mut config, from_file) = load_config(&config_path)?;

    // 2. Initialize logging.
    init_tracing(&config.logging)?;
    info!("sugarscape-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Capacity map.
    let map = build_capacity_map(&mut config)?;

    // 4. World.
    let mut world = World::new(&config, &map)?;

    // 5. Operator state and shutdown signal.
    let operator = Arc::new(OperatorState::new(
        config.world.tick_interval_ms,
        &config.simulation,
    ));
    let signal_operator = Arc::clone(&operator);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping after the current tick");
                signal_operator.request_stop();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
    if let Err(e) = console::spawn(Arc::clone(&operator)) {
        warn!(error = %e, "Failed to start operator console");
    }

    // 6. Run.
    let metrics_path = config.logging.metrics_path.as_deref().map(Path::new);
    let mut reporter = MetricsReporter::new(config.logging.report_every, metrics_path)
        .map_err(|source| EngineError::Metrics { source })?;
    reporter.record(world.name(), &world.snapshot());

    let result = runner::run_simulation(&mut world, &operator, &mut reporter).await;
    reporter.finish();
    let result = result?;

    // 7. Report.
    runner::log_simulation_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        started_at = %operator.started_at(),
        elapsed_seconds = operator.elapsed_seconds(),
        "sugarscape-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_tracing(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Load the configured capacity map, or build a uniform one from the
/// world section. A loaded map's dimensions replace the configured ones.
fn build_capacity_map(config: &mut SimulationConfig) -> Result<CapacityMap, EngineError> {
    if let Some(path) = config.world.capacity_map.as_deref() {
        let map = map_loader::load_capacity_map(Path::new(path))?;
        config.world.width = map.width();
        config.world.height = map.height();
        return Ok(map);
    }
    let map = CapacityMap::uniform(
        config.world.width,
        config.world.height,
        config.world.uniform_capacity,
    )?;
    info!(
        width = map.width(),
        height = map.height(),
        capacity = config.world.uniform_capacity,
        "Uniform capacity map built"
    );
    Ok(map)
}
