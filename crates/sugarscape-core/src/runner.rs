//! The async run loop.
//!
//! [`run_simulation`] ticks a [`World`] until a bound is hit: a tick
//! count, a wall-clock budget, an operator stop, or (when configured)
//! extinction. Between ticks it honours pause requests and the current
//! tick interval, and hands every [`TickSummary`] to a [`TickCallback`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::SimulationError;
use crate::operator::{OperatorState, SimulationEndReason};
use crate::world::{TickSummary, World};

/// Errors that end a run abnormally.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick broke an invariant.
    #[error("tick failed: {source}")]
    Tick {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct SimulationResult {
    /// Why the loop stopped.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
    /// Ticks executed by this call.
    pub total_ticks: u64,
}

/// Observer invoked after every tick.
pub trait TickCallback: Send {
    /// Called once per completed tick.
    fn on_tick(&mut self, summary: &TickSummary, world: &World);
}

/// A callback that ignores every tick.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _world: &World) {}
}

/// Tick `world` until a termination condition is met.
///
/// Stop and time checks run before each tick; extinction and the tick
/// bound are checked after it, against the World's completed tick count.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails. The World is left in the
/// state the failing tick produced and should be discarded.
pub async fn run_simulation(
    world: &mut World,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        world = world.name(),
        max_ticks = operator.max_ticks(),
        tick_interval_ms = operator.tick_interval_ms(),
        stop_on_extinction = operator.stop_on_extinction(),
        "Simulation starting"
    );

    let reason = loop {
        if operator.is_paused() {
            info!(tick = world.tick_count(), "Simulation paused");
            operator.wait_if_paused().await;
            info!(tick = world.tick_count(), "Simulation resumed");
        }

        if operator.is_stop_requested() {
            info!(tick = world.tick_count(), "Operator stop requested");
            break SimulationEndReason::OperatorStop;
        }

        if operator.time_limit_reached() {
            info!(
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            break SimulationEndReason::MaxRealTimeReached;
        }

        let summary = world.tick()?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, world);

        let extinct = summary.snapshot.living_agents == 0;
        let at_limit = operator.tick_limit_reached(summary.tick);
        last_summary = Some(summary);

        if extinct && operator.stop_on_extinction() {
            info!(tick = world.tick_count(), "No foragers left");
            break SimulationEndReason::Extinction;
        }
        if at_limit {
            info!(tick = world.tick_count(), "Tick limit reached");
            break SimulationEndReason::MaxTicksReached;
        }

        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    };

    operator.set_end_reason(reason).await;
    Ok(SimulationResult {
        end_reason: reason,
        final_summary: last_summary,
        total_ticks,
    })
}

/// Log how a run ended and its closing metrics.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "Simulation ended"
    );

    if let Some(summary) = &result.final_summary {
        let snapshot = &summary.snapshot;
        info!(
            tick = snapshot.tick,
            living = snapshot.living_agents,
            deaths = snapshot.deaths,
            death_rate = snapshot.death_rate,
            death_rate_low_sensing = snapshot.death_rate_low_sensing,
            death_rate_high_sensing = snapshot.death_rate_high_sensing,
            mean_wealth = snapshot.wealth.mean,
            stdev_wealth = snapshot.wealth.stdev,
            pool_balance = snapshot.pool_balance,
            "Final metrics"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sugarscape_types::{Disposition, Position};
    use sugarscape_world::CapacityMap;

    use super::*;
    use crate::config::{SimulationBoundsConfig, SimulationConfig};

    fn world(population: u32) -> World {
        let mut config = SimulationConfig::default();
        config.population.initial_population = population;
        let map = CapacityMap::uniform(10, 10, 4).unwrap();
        World::new(&config, &map).unwrap()
    }

    fn operator(max_ticks: u64, stop_on_extinction: bool) -> Arc<OperatorState> {
        let bounds = SimulationBoundsConfig {
            max_ticks,
            max_real_time_seconds: 0,
            stop_on_extinction,
        };
        Arc::new(OperatorState::new(0, &bounds))
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let mut world = world(10);
        let operator = operator(5, false);
        let result = run_simulation(&mut world, &operator, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(world.tick_count(), 5);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn operator_stop_before_first_tick() {
        let mut world = world(10);
        let operator = operator(0, false);
        operator.request_stop();
        let result = run_simulation(&mut world, &operator, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn extinction_ends_run_only_when_configured() {
        let build = || {
            let mut config = SimulationConfig::default();
            config.population.initial_population = 0;
            let map = CapacityMap::uniform(1, 1, 0).unwrap();
            let mut world = World::new(&config, &map).unwrap();
            world
                .insert_forager(Position::new(0, 0), 1, 5, 1, Disposition::Independent)
                .unwrap();
            world
        };

        let mut doomed = build();
        let stopping = operator(50, true);
        let result = run_simulation(&mut doomed, &stopping, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::Extinction);
        assert_eq!(result.total_ticks, 1);

        let mut doomed = build();
        let continuing = operator(4, false);
        let result = run_simulation(&mut doomed, &continuing, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 4);
    }

    #[tokio::test]
    async fn callback_sees_every_tick() {
        struct Count(u64);
        impl TickCallback for Count {
            fn on_tick(&mut self, summary: &TickSummary, world: &World) {
                self.0 = self.0.saturating_add(1);
                assert_eq!(summary.tick, world.tick_count());
            }
        }

        let mut world = world(5);
        let operator = operator(3, false);
        let mut cb = Count(0);
        run_simulation(&mut world, &operator, &mut cb).await.unwrap();
        assert_eq!(cb.0, 3);
    }
}
