//! Error types for the sugarscape-agents crate.
//!
//! Starvation is not an error: it is the normal end of a forager's life and
//! is reported through [`DeathRecord`](crate::DeathRecord). The variants
//! here are contract breaches that should abort a run.

use sugarscape_world::WorldError;

/// Errors that can occur during forager operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// A grid, knowledge or pool operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// An endowment range or parameter cannot produce a valid forager.
    #[error("invalid endowment: {reason}")]
    InvalidEndowment {
        /// Description of what is wrong.
        reason: String,
    },

    /// An arithmetic overflow occurred in a wealth computation.
    #[error("arithmetic overflow in forager computation: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
