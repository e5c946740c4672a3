//! Clock, scheduling, and orchestration for the Sugarscape simulation.
//!
//! This crate owns the tick cycle: patches regrow, foragers forage in a
//! freshly shuffled order, dead foragers are accounted for, and the World
//! optionally injects newcomers before emitting a metrics snapshot.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and period checks.
//! - [`config`] -- Configuration loading from `sugarscape-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`SimulationError`] for World and scheduler failures.
//! - [`metrics`] -- Wealth statistics and death-rate helpers.
//! - [`operator`] -- Pause, resume, stop and bounds shared with the run loop.
//! - [`runner`] -- The async run loop and [`TickCallback`].
//! - [`scheduler`] -- [`BreedScheduler`]: breed-ordered random activation
//!   and death bookkeeping.
//! - [`world`] -- [`World`]: the root of one simulation run.
//!
//! [`SimulationError`]: error::SimulationError
//! [`TickCallback`]: runner::TickCallback
//! [`BreedScheduler`]: scheduler::BreedScheduler
//! [`World`]: world::World

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod operator;
pub mod runner;
pub mod scheduler;
pub mod world;
