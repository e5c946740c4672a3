//! Forager agents for the Sugarscape simulation.
//!
//! This crate contains the agent logic layer: everything that operates on a
//! single forager's state and the world it touches during its activation.
//! It sits between `sugarscape-world` (space, knowledge, pool) and
//! `sugarscape-core` (scheduling and orchestration).
//!
//! # Modules
//!
//! - [`config`] -- Endowment distributions and foraging rules
//!   ([`EndowmentConfig`], [`ForagingRules`])
//! - [`consumption`] -- Eating, metabolism and solidarity settlement
//! - [`death`] -- Starvation records and their cause buckets
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`forager`] -- The [`Forager`] state and random endowment
//! - [`movement`] -- Candidate generation and target selection policies
//! - [`step`] -- The per-activation state transition ([`step_forager`])

pub mod config;
pub mod consumption;
pub mod death;
pub mod error;
pub mod forager;
pub mod movement;
pub mod step;

// Re-export primary types at crate root for convenience.
pub use config::{EndowmentConfig, ForagingRules};
pub use consumption::{Settlement, settle};
pub use death::DeathRecord;
pub use error::AgentError;
pub use forager::Forager;
pub use step::{StepContext, StepReport, step_forager};
