//! Shared type definitions for the Sugarscape simulation.
//!
//! This crate is the single source of truth for the plain data that flows
//! between the world, agent, and core crates, and out to external
//! reporters and renderers.
//!
//! # Modules
//!
//! - [`ids`] -- Arena-issued agent identifiers and their allocator
//! - [`enums`] -- Breed tags, connectivity, policy and death-bucket enums
//! - [`structs`] -- Grid positions, entity references, agent views, and
//!   the per-tick metrics snapshot

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Breed, Connectivity, Disposition, KnowledgeStrategy, MovementPolicy, SensingBucket};
pub use ids::{AgentId, IdAllocator};
pub use structs::{EntityRef, ForagerView, MetricsSnapshot, Position, WealthStats};
