//! Error types for World construction and the tick cycle.
//!
//! Any of these aborts the run: each one means a broken invariant that
//! would corrupt later statistics if the World kept going.

use sugarscape_agents::AgentError;
use sugarscape_types::AgentId;
use sugarscape_world::WorldError;

use crate::clock::ClockError;
use crate::config::ConfigError;

/// Errors that can occur while building or advancing a World.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// A grid, knowledge or pool operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A forager activation failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The configuration cannot produce a World.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A scheduled forager was missing from the scheduler.
    #[error("agent {agent_id} not found in scheduler")]
    AgentNotFound {
        /// The missing agent.
        agent_id: AgentId,
    },

    /// A forager was added twice.
    #[error("agent {agent_id} is already scheduled")]
    DuplicateAgent {
        /// The duplicated agent.
        agent_id: AgentId,
    },

    /// The identity space is exhausted.
    #[error("agent identifier space exhausted")]
    IdsExhausted,
}
