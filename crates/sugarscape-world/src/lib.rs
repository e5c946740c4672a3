//! The spatial world of the Sugarscape simulation.
//!
//! This crate models everything an agent can touch: a bounded,
//! non-toroidal grid of regrowing resource patches, the shared knowledge
//! store that aggregates what agents have seen, and the redistribution
//! pool used for mutual aid.
//!
//! # Modules
//!
//! - [`capacity`] -- The width x height resource-capacity map supplied at
//!   World construction.
//! - [`distance`] -- Precomputed relative-offset distance table.
//! - [`error`] -- Error types for world operations.
//! - [`grid`] -- [`ResourceGrid`]: patches, occupancy, neighbourhoods.
//! - [`knowledge`] -- [`SharedKnowledge`]: decayed observations and
//!   best-known-direction queries.
//! - [`patch`] -- Constant-growback regeneration and harvesting.
//! - [`pool`] -- [`RedistributionPool`]: a conserving, non-negative buffer.

pub mod capacity;
pub mod distance;
pub mod error;
pub mod grid;
pub mod knowledge;
pub mod patch;
pub mod pool;

// Re-export primary types at crate root.
pub use capacity::CapacityMap;
pub use distance::DistanceTable;
pub use error::WorldError;
pub use grid::ResourceGrid;
pub use knowledge::SharedKnowledge;
pub use patch::{GROWBACK_PER_TICK, ResourcePatch};
pub use pool::RedistributionPool;
