//! The per-activation forager transition.
//!
//! One activation runs these phases in order:
//!
//! 1. **Candidates** -- cells within sensing radius not held by another
//!    forager, the current cell included.
//! 2. **Select** -- direct or knowledge-guided, depending on whether a
//!    shared store is supplied.
//! 3. **Move** -- relocate on the grid. Guided foragers then publish the
//!    level they observe on arrival.
//! 4. **Harvest** -- take everything on the patch.
//! 5. **Settle** -- eat, burn metabolism, and use the pool if cooperative.
//! 6. **Death check** -- a forager at zero wealth or below is removed from
//!    the grid and a [`DeathRecord`] is returned.

use rand::Rng;
use sugarscape_types::{MovementPolicy, Position};
use sugarscape_world::{DistanceTable, RedistributionPool, ResourceGrid, SharedKnowledge};
use tracing::debug;

use crate::config::ForagingRules;
use crate::consumption::{Settlement, settle};
use crate::death::{DeathRecord, check_starvation};
use crate::error::AgentError;
use crate::forager::Forager;
use crate::movement;

/// Everything a forager activation touches besides the forager itself.
pub struct StepContext<'a, R: Rng + ?Sized> {
    /// The shared grid.
    pub grid: &'a mut ResourceGrid,
    /// Distance lookups for the direct policy.
    pub distances: &'a DistanceTable,
    /// The shared knowledge store; `Some` selects the guided policy.
    pub knowledge: Option<&'a mut SharedKnowledge>,
    /// The redistribution pool.
    pub pool: &'a mut RedistributionPool,
    /// Tunables.
    pub rules: &'a ForagingRules,
    /// The World's random source.
    pub rng: &'a mut R,
}

impl<R: Rng + ?Sized> StepContext<'_, R> {
    /// Policy this context drives foragers with.
    pub const fn policy(&self) -> MovementPolicy {
        if self.knowledge.is_some() {
            MovementPolicy::KnowledgeGuided
        } else {
            MovementPolicy::Direct
        }
    }
}

/// Outcome of one activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Cell before moving.
    pub from: Position,
    /// Cell after moving.
    pub to: Position,
    /// Harvest and pool flows.
    pub settlement: Settlement,
    /// Present if the forager starved; it is already off the grid.
    pub death: Option<DeathRecord>,
}

/// Run one activation of `forager`.
///
/// # Errors
///
/// Returns [`AgentError`] if the forager is not where the grid says it is,
/// or if a wealth or pool computation overflows. These are contract
/// breaches, not normal outcomes.
pub fn step_forager<R: Rng + ?Sized>(
    forager: &mut Forager,
    ctx: &mut StepContext<'_, R>,
) -> Result<StepReport, AgentError> {
    let from = forager.position();
    let candidates = movement::candidates(ctx.grid, forager)?;

    let to = match ctx.knowledge.as_deref() {
        Some(store) => movement::select_guided(ctx.grid, store, from, &candidates, ctx.rng)?,
        None => movement::select_direct(ctx.grid, ctx.distances, from, &candidates, ctx.rng)?,
    };

    ctx.grid.move_agent(forager.id(), from, to)?;
    forager.set_position(to);

    if let Some(store) = ctx.knowledge.as_deref_mut() {
        store.publish(to, ctx.grid.resource_at(to)?)?;
    }

    let harvested = ctx.grid.patch_mut(to)?.harvest();
    let settlement = settle(forager, harvested, ctx.pool, ctx.rules)?;

    let death = check_starvation(forager, ctx.rules.low_sensing_threshold);
    if let Some(record) = &death {
        ctx.grid.remove(forager.id(), to)?;
        debug!(
            agent_id = %record.agent_id,
            position = %record.position,
            final_wealth = record.final_wealth,
            bucket = %record.sensing_bucket,
            disposition = %record.disposition,
            "Forager starved"
        );
    }

    Ok(StepReport {
        from,
        to,
        settlement,
        death,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sugarscape_types::{AgentId, Connectivity, Disposition, KnowledgeStrategy};
    use sugarscape_world::CapacityMap;

    use super::*;

    struct Fixture {
        grid: ResourceGrid,
        distances: DistanceTable,
        pool: RedistributionPool,
        rules: ForagingRules,
        rng: ChaCha8Rng,
    }

    impl Fixture {
        fn new(rows: &[Vec<u32>]) -> Self {
            let map = CapacityMap::from_rows(rows).unwrap();
            Self {
                distances: DistanceTable::new(map.width(), map.height()),
                grid: ResourceGrid::new(&map, Connectivity::VonNeumann),
                pool: RedistributionPool::new(),
                rules: ForagingRules::default(),
                rng: ChaCha8Rng::seed_from_u64(5),
            }
        }

        fn spawn(&mut self, id: u64, pos: Position, wealth: i64, metabolism: u32) -> Forager {
            self.grid.place(AgentId(id), pos).unwrap();
            Forager::new(AgentId(id), pos, wealth, metabolism, 1, Disposition::Independent)
                .unwrap()
        }

        fn step(
            &mut self,
            forager: &mut Forager,
            knowledge: Option<&mut SharedKnowledge>,
        ) -> StepReport {
            let mut ctx = StepContext {
                grid: &mut self.grid,
                distances: &self.distances,
                knowledge,
                pool: &mut self.pool,
                rules: &self.rules,
                rng: &mut self.rng,
            };
            step_forager(forager, &mut ctx).unwrap()
        }
    }

    #[test]
    fn direct_step_moves_harvests_and_eats() {
        let mut fx = Fixture::new(&[vec![0, 5, 1]]);
        let mut f = fx.spawn(0, Position::new(0, 0), 10, 2);

        let report = fx.step(&mut f, None);
        assert_eq!(report.to, Position::new(0, 1));
        assert_eq!(report.settlement.harvested, 5);
        assert_eq!(f.wealth(), 13);
        assert_eq!(fx.grid.resource_at(Position::new(0, 1)).unwrap(), 0);
        assert_eq!(fx.grid.occupant(Position::new(0, 1)).unwrap(), Some(f.id()));
        assert_eq!(fx.grid.occupant(Position::new(0, 0)).unwrap(), None);
        assert!(report.death.is_none());
    }

    #[test]
    fn boxed_in_forager_harvests_own_cell() {
        // Only neighbour (0, 1) is occupied, so the forager stays.
        let mut fx = Fixture::new(&[vec![10, 10]]);
        let mut f = fx.spawn(0, Position::new(0, 0), 5, 2);
        fx.spawn(1, Position::new(0, 1), 5, 2);

        let report = fx.step(&mut f, None);
        assert_eq!(report.to, Position::new(0, 0));
        assert_eq!(f.wealth(), 13);
    }

    #[test]
    fn starving_forager_leaves_the_grid() {
        let mut fx = Fixture::new(&[vec![0, 0]]);
        let mut f = fx.spawn(0, Position::new(0, 0), 1, 3);

        let report = fx.step(&mut f, None);
        let death = report.death.unwrap();
        assert_eq!(death.final_wealth, -2);
        assert_eq!(fx.grid.occupied_count(), 0);
    }

    #[test]
    fn guided_step_publishes_arrival_level() {
        let mut fx = Fixture::new(&[vec![3, 7, 0]]);
        let mut store = SharedKnowledge::new(1, 3, KnowledgeStrategy::RecentMax);
        store.publish(Position::new(0, 2), 20).unwrap();
        let mut f = fx.spawn(0, Position::new(0, 0), 10, 1);

        let report = fx.step(&mut f, Some(&mut store));
        assert_eq!(report.to, Position::new(0, 1));
        assert_eq!(store.last_observation(Position::new(0, 1)), Some(7));
        assert_eq!(report.settlement.harvested, 7);
        assert_eq!(f.wealth(), 16);
    }

    #[test]
    fn guided_step_takes_richer_visible_cell_over_remote_peak() {
        let mut fx = Fixture::new(&[vec![0, 0, 0, 9, 0]]);
        let mut store = SharedKnowledge::new(1, 5, KnowledgeStrategy::RecentMax);
        store.publish(Position::new(0, 0), 20).unwrap();
        let mut f = fx.spawn(0, Position::new(0, 2), 10, 2);

        let report = fx.step(&mut f, Some(&mut store));
        assert_eq!(report.to, Position::new(0, 3));
        assert_eq!(report.settlement.harvested, 9);
        assert_eq!(f.wealth(), 17);
    }

    #[test]
    fn policy_follows_knowledge_presence() {
        let mut fx = Fixture::new(&[vec![1]]);
        let ctx = StepContext {
            grid: &mut fx.grid,
            distances: &fx.distances,
            knowledge: None,
            pool: &mut fx.pool,
            rules: &fx.rules,
            rng: &mut fx.rng,
        };
        assert_eq!(ctx.policy(), MovementPolicy::Direct);
    }
}
