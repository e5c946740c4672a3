//! Configuration loading and typed config structures for the Sugarscape
//! simulation.
//!
//! The canonical configuration lives in `sugarscape-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, a loader, and [`SimulationConfig::validate`], which
//! rejects parameter combinations a World cannot be built from.

use std::path::Path;

use serde::Deserialize;
use sugarscape_agents::{EndowmentConfig, ForagingRules};
use sugarscape_types::{Connectivity, KnowledgeStrategy, MovementPolicy};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an impossible World.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `sugarscape-config.yaml`. Every field has a
/// default matching the classic Constant Growback setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Grid, seed and pacing.
    #[serde(default)]
    pub world: WorldConfig,

    /// Initial population, endowments and replenishment.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Movement policy and regrowth.
    #[serde(default)]
    pub foraging: ForagingConfig,

    /// Redistribution pool settings.
    #[serde(default)]
    pub solidarity: SolidarityConfig,

    /// Run boundaries.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging and metrics output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Reject parameter combinations a World cannot be built from, taking
    /// the grid extent from the `world` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_for_grid(self.world.width, self.world.height)
    }

    /// Like [`validate`](Self::validate), but checks the population against
    /// a `width` x `height` grid. A World uses this with its capacity map's
    /// dimensions, which win over the configured ones.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate_for_grid(&self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(invalid(format!(
                "grid must be at least 1x1, got {width}x{height}"
            )));
        }
        let cells = u64::from(width).saturating_mul(u64::from(height));
        if u64::from(self.population.initial_population) > cells {
            return Err(invalid(format!(
                "initial_population {} exceeds the {cells} cells of the grid",
                self.population.initial_population
            )));
        }
        if self.population.replenish_period == 0 {
            return Err(invalid("replenish_period must be at least 1".to_owned()));
        }
        self.population
            .endowment()
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        if self.foraging.growth_rate == 0 {
            return Err(invalid("growth_rate must be at least 1".to_owned()));
        }
        if self.solidarity.individualist_percent > 100 {
            return Err(invalid(format!(
                "individualist_percent {} exceeds 100",
                self.solidarity.individualist_percent
            )));
        }
        Ok(())
    }

    /// Per-activation rules handed to every forager step.
    pub const fn rules(&self) -> ForagingRules {
        ForagingRules {
            solidarity: self.solidarity.enabled,
            reserve_multiplier: self.solidarity.reserve_multiplier,
            low_sensing_threshold: self.foraging.low_sensing_threshold,
        }
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid width (`x` extent) used when no capacity map is given.
    #[serde(default = "default_extent")]
    pub width: u32,

    /// Grid height (`y` extent) used when no capacity map is given.
    #[serde(default = "default_extent")]
    pub height: u32,

    /// Path to a capacity-map text file. When set, its dimensions take
    /// precedence over `width` and `height`.
    #[serde(default)]
    pub capacity_map: Option<String>,

    /// Capacity of every cell when no capacity map is given.
    #[serde(default = "default_uniform_capacity")]
    pub uniform_capacity: u32,

    /// Real-time milliseconds between ticks (0 = run flat out).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            width: default_extent(),
            height: default_extent(),
            capacity_map: None,
            uniform_capacity: default_uniform_capacity(),
            tick_interval_ms: 0,
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Foragers placed at World construction.
    #[serde(default = "default_initial_population")]
    pub initial_population: u32,

    /// Foragers injected every `replenish_period` ticks (0 = disabled).
    #[serde(default)]
    pub replenish_count: u32,

    /// Ticks between replenishments.
    #[serde(default = "default_replenish_period")]
    pub replenish_period: u64,

    /// Lowest starting wealth (inclusive).
    #[serde(default = "default_wealth_min")]
    pub wealth_min: i64,

    /// Highest starting wealth (exclusive).
    #[serde(default = "default_wealth_max")]
    pub wealth_max: i64,

    /// Lowest metabolism (inclusive).
    #[serde(default = "default_metabolism_min")]
    pub metabolism_min: u32,

    /// Highest metabolism (exclusive).
    #[serde(default = "default_metabolism_max")]
    pub metabolism_max: u32,

    /// Lowest sensing radius (inclusive).
    #[serde(default = "default_sensing_min")]
    pub sensing_min: u32,

    /// Highest sensing radius (exclusive).
    #[serde(default = "default_sensing_max")]
    pub sensing_max: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_population: default_initial_population(),
            replenish_count: 0,
            replenish_period: default_replenish_period(),
            wealth_min: default_wealth_min(),
            wealth_max: default_wealth_max(),
            metabolism_min: default_metabolism_min(),
            metabolism_max: default_metabolism_max(),
            sensing_min: default_sensing_min(),
            sensing_max: default_sensing_max(),
        }
    }
}

impl PopulationConfig {
    /// Endowment ranges for newborn foragers.
    pub const fn endowment(&self) -> EndowmentConfig {
        EndowmentConfig {
            wealth_min: self.wealth_min,
            wealth_max: self.wealth_max,
            metabolism_min: self.metabolism_min,
            metabolism_max: self.metabolism_max,
            sensing_min: self.sensing_min,
            sensing_max: self.sensing_max,
        }
    }
}

/// Foraging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForagingConfig {
    /// Use the shared knowledge store to guide movement.
    #[serde(default)]
    pub shared_knowledge: bool,

    /// Ranking used by the shared knowledge store.
    #[serde(default)]
    pub knowledge_strategy: KnowledgeStrategy,

    /// Neighbourhood shape.
    #[serde(default)]
    pub connectivity: Connectivity,

    /// Units each patch regrows per tick.
    #[serde(default = "default_growth_rate")]
    pub growth_rate: u32,

    /// Sensing radii below this count as low in death accounting.
    #[serde(default = "default_low_sensing_threshold")]
    pub low_sensing_threshold: u32,
}

impl Default for ForagingConfig {
    fn default() -> Self {
        Self {
            shared_knowledge: false,
            knowledge_strategy: KnowledgeStrategy::default(),
            connectivity: Connectivity::default(),
            growth_rate: default_growth_rate(),
            low_sensing_threshold: default_low_sensing_threshold(),
        }
    }
}

impl ForagingConfig {
    /// Movement policy selected by `shared_knowledge`.
    pub const fn policy(&self) -> MovementPolicy {
        if self.shared_knowledge {
            MovementPolicy::KnowledgeGuided
        } else {
            MovementPolicy::Direct
        }
    }
}

/// Solidarity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolidarityConfig {
    /// Whether cooperative foragers use the redistribution pool.
    #[serde(default)]
    pub enabled: bool,

    /// Chance in percent (0-100) that a newborn opts out of solidarity.
    /// Ignored when solidarity is disabled.
    #[serde(default)]
    pub individualist_percent: u32,

    /// Wealth above `reserve_multiplier * metabolism` triggers contribution.
    #[serde(default = "default_reserve_multiplier")]
    pub reserve_multiplier: u32,
}

impl Default for SolidarityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            individualist_percent: 0,
            reserve_multiplier: default_reserve_multiplier(),
        }
    }
}

/// Simulation boundary configuration.
///
/// A value of 0 for either `max_ticks` or `max_real_time_seconds` means
/// unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// End the run when no forager is left. Off by default: an extinct
    /// World keeps ticking so replenishment can repopulate it.
    #[serde(default)]
    pub stop_on_extinction: bool,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            max_real_time_seconds: 0,
            stop_on_extinction: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// File to append one JSON metrics snapshot per tick to.
    #[serde(default)]
    pub metrics_path: Option<String>,

    /// Log a metrics summary every N ticks (0 = never).
    #[serde(default = "default_report_every")]
    pub report_every: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            metrics_path: None,
            report_every: default_report_every(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Sugarscape Constant Growback")
}

const fn default_seed() -> u64 {
    42
}

const fn default_extent() -> u32 {
    50
}

const fn default_uniform_capacity() -> u32 {
    4
}

const fn default_initial_population() -> u32 {
    100
}

const fn default_replenish_period() -> u64 {
    10
}

const fn default_wealth_min() -> i64 {
    6
}

const fn default_wealth_max() -> i64 {
    25
}

const fn default_metabolism_min() -> u32 {
    2
}

const fn default_metabolism_max() -> u32 {
    4
}

const fn default_sensing_min() -> u32 {
    1
}

const fn default_sensing_max() -> u32 {
    6
}

const fn default_growth_rate() -> u32 {
    sugarscape_world::GROWBACK_PER_TICK
}

const fn default_low_sensing_threshold() -> u32 {
    3
}

const fn default_reserve_multiplier() -> u32 {
    3
}

const fn default_max_ticks() -> u64 {
    200
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_report_every() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.width, 50);
        assert_eq!(config.population.initial_population, 100);
        assert_eq!(config.population.replenish_period, 10);
        assert_eq!(config.foraging.growth_rate, 1);
        assert_eq!(config.foraging.policy(), MovementPolicy::Direct);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Test World"
  seed: 123
  width: 20
  height: 10
  capacity_map: "maps/sugar-map.txt"
  tick_interval_ms: 250

population:
  initial_population: 40
  replenish_count: 5
  replenish_period: 10
  wealth_min: 5
  wealth_max: 10
  metabolism_min: 1
  metabolism_max: 3
  sensing_min: 0
  sensing_max: 4

foraging:
  shared_knowledge: true
  knowledge_strategy: all_time_max
  connectivity: moore
  growth_rate: 2
  low_sensing_threshold: 2

solidarity:
  enabled: true
  individualist_percent: 25
  reserve_multiplier: 4

simulation:
  max_ticks: 500
  max_real_time_seconds: 60
  stop_on_extinction: true

logging:
  level: "debug"
  json: true
  metrics_path: "metrics.jsonl"
  report_every: 5
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.name, "Test World");
        assert_eq!(config.world.capacity_map.as_deref(), Some("maps/sugar-map.txt"));
        assert_eq!(config.population.replenish_count, 5);
        assert_eq!(config.foraging.knowledge_strategy, KnowledgeStrategy::AllTimeMax);
        assert_eq!(config.foraging.connectivity, Connectivity::Moore);
        assert_eq!(config.foraging.policy(), MovementPolicy::KnowledgeGuided);
        assert_eq!(config.solidarity.individualist_percent, 25);
        assert!(config.simulation.stop_on_extinction);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());

        let rules = config.rules();
        assert!(rules.solidarity);
        assert_eq!(rules.reserve_multiplier, 4);
        assert_eq!(rules.low_sensing_threshold, 2);
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "world:\n  seed: 7\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.world.seed, 7);
        assert_eq!(config.population.initial_population, 100);
        assert_eq!(config.solidarity.reserve_multiplier, 3);
    }

    #[test]
    fn validate_rejects_overfull_grid() {
        let mut config = SimulationConfig::default();
        config.world.width = 3;
        config.world.height = 3;
        config.population.initial_population = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn grid_validation_uses_given_extent() {
        let mut config = SimulationConfig::default();
        config.population.initial_population = 3;
        assert!(config.validate().is_ok());
        assert!(config.validate_for_grid(2, 1).is_err());
        assert!(config.validate_for_grid(3, 1).is_ok());
        assert!(config.validate_for_grid(0, 5).is_err());
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let mut config = SimulationConfig::default();
        config.solidarity.individualist_percent = 101;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.population.metabolism_min = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.foraging.growth_rate = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.population.replenish_period = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.world.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("sugarscape-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
