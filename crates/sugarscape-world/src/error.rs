//! Error types for the `sugarscape-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias. Every variant is a contract breach by the
//! caller; none of them is recoverable inside the core.

use sugarscape_types::{AgentId, Position};

/// Errors that can occur during world operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The position lies outside the grid extent.
    #[error("position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// The offending position.
        position: Position,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// An agent was placed or moved onto a cell that already holds one.
    #[error("cell {position} is already occupied by agent {occupant}")]
    CellOccupied {
        /// The contested cell.
        position: Position,
        /// The agent already there.
        occupant: AgentId,
    },

    /// The agent is not present at the specified cell.
    #[error("agent {agent} is not at {position}")]
    AgentNotAtPosition {
        /// The agent.
        agent: AgentId,
        /// The cell it was expected at.
        position: Position,
    },

    /// A structural invariant was broken (patch above capacity, pool
    /// accounting mismatch, and similar).
    #[error("invariant violation: {reason}")]
    InvariantViolation {
        /// What was broken.
        reason: String,
    },

    /// A capacity map row had the wrong number of columns.
    #[error("capacity map row {row} has {found} columns, expected {expected}")]
    DimensionMismatch {
        /// Zero-based row index.
        row: usize,
        /// Columns expected (the grid height).
        expected: usize,
        /// Columns found.
        found: usize,
    },

    /// A capacity map with no cells was supplied.
    #[error("capacity map is empty")]
    EmptyMap,

    /// Arithmetic overflow during a checked operation.
    #[error("arithmetic overflow in world calculation")]
    ArithmeticOverflow,
}
