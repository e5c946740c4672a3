//! Error types for the engine binary.
//!
//! [`EngineError`] is what `main` propagates; [`MapLoadError`] covers the
//! capacity-map text format.

use std::path::PathBuf;

/// Failures while reading a capacity-map file.
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    /// The file could not be read.
    #[error("failed to read capacity map {path}: {source}")]
    Io {
        /// The map path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A token is not a non-negative whole number.
    #[error("line {line}, column {column}: `{token}` is not a non-negative whole number")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// 1-based token position within the line.
        column: usize,
        /// The offending token.
        token: String,
    },

    /// The parsed matrix is empty or ragged.
    #[error("invalid capacity map: {source}")]
    Shape {
        /// The underlying world error.
        #[from]
        source: sugarscape_world::WorldError,
    },
}

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: sugarscape_core::config::ConfigError,
    },

    /// The capacity map could not be loaded.
    #[error("map error: {source}")]
    Map {
        /// The underlying map error.
        #[from]
        source: MapLoadError,
    },

    /// A uniform capacity map could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: sugarscape_world::WorldError,
    },

    /// World construction failed.
    #[error("simulation error: {source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: sugarscape_core::error::SimulationError,
    },

    /// The run loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: sugarscape_core::runner::RunnerError,
    },

    /// The metrics file could not be opened.
    #[error("metrics file error: {source}")]
    Metrics {
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
