//! Breed-ordered random activation.
//!
//! Entities are partitioned by [`Breed`]. Each tick the breeds run in
//! [`Breed::ORDER`] (patches, then foragers), and the members of each breed
//! are shuffled afresh from the World's random stream before they run.
//!
//! The scheduler owns every living [`Forager`]. Patches live in the grid;
//! the scheduler only keeps their positions as activation handles.
//!
//! Deaths are counted on two independent axes, each an exhaustive,
//! disjoint partition of the total:
//!
//! - sensing bucket: low / high
//! - disposition: solidary / individualist / independent

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::SliceRandom;
use sugarscape_agents::{DeathRecord, Forager, ForagingRules, StepContext, step_forager};
use sugarscape_types::{AgentId, Breed, Disposition, ForagerView, Position, SensingBucket};
use sugarscape_world::{DistanceTable, RedistributionPool, ResourceGrid, SharedKnowledge};
use tracing::debug;

use crate::error::SimulationError;
use crate::metrics;

/// Cumulative death counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeathCounters {
    /// All deaths.
    pub total: u64,
    /// Deaths with a sensing radius below the threshold.
    pub low_sensing: u64,
    /// Deaths with a sensing radius at or above the threshold.
    pub high_sensing: u64,
    /// Deaths of solidary foragers.
    pub solidary: u64,
    /// Deaths of individualists.
    pub individualist: u64,
    /// Deaths while solidarity was disabled.
    pub independent: u64,
}

impl DeathCounters {
    fn record(&mut self, record: &DeathRecord) {
        self.total = self.total.saturating_add(1);
        let bucket = match record.sensing_bucket {
            SensingBucket::Low => &mut self.low_sensing,
            SensingBucket::High => &mut self.high_sensing,
        };
        *bucket = bucket.saturating_add(1);
        let disposition = match record.disposition {
            Disposition::Solidary => &mut self.solidary,
            Disposition::Individualist => &mut self.individualist,
            Disposition::Independent => &mut self.independent,
        };
        *disposition = disposition.saturating_add(1);
    }

    /// Deaths in one sensing bucket.
    pub const fn by_sensing(&self, bucket: SensingBucket) -> u64 {
        match bucket {
            SensingBucket::Low => self.low_sensing,
            SensingBucket::High => self.high_sensing,
        }
    }

    /// Deaths with one disposition.
    pub const fn by_disposition(&self, disposition: Disposition) -> u64 {
        match disposition {
            Disposition::Solidary => self.solidary,
            Disposition::Individualist => self.individualist,
            Disposition::Independent => self.independent,
        }
    }
}

/// Shared state a forager pass needs, borrowed from the World.
pub struct ForagingEnv<'a> {
    /// The grid.
    pub grid: &'a mut ResourceGrid,
    /// Distance lookups for the direct policy.
    pub distances: &'a DistanceTable,
    /// The knowledge store, when knowledge-guided.
    pub knowledge: Option<&'a mut SharedKnowledge>,
    /// The redistribution pool.
    pub pool: &'a mut RedistributionPool,
    /// Activation rules.
    pub rules: &'a ForagingRules,
}

/// What happened during one scheduler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Units regrown across all patches.
    pub regrown: u64,
    /// Foragers activated.
    pub activated: u64,
    /// Units harvested by all foragers.
    pub harvested: u64,
    /// Foragers that starved this pass, in activation order.
    pub deaths: Vec<DeathRecord>,
}

/// Owns foragers and runs each breed once per tick in random order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedScheduler {
    /// Patch-breed activation handles.
    patches: Vec<Position>,
    /// Forager breed, keyed by identity for deterministic iteration.
    foragers: BTreeMap<AgentId, Forager>,
    deaths: DeathCounters,
}

impl BreedScheduler {
    /// Create a scheduler for the given patch positions and no foragers.
    pub const fn new(patches: Vec<Position>) -> Self {
        Self {
            patches,
            foragers: BTreeMap::new(),
            deaths: DeathCounters {
                total: 0,
                low_sensing: 0,
                high_sensing: 0,
                solidary: 0,
                individualist: 0,
                independent: 0,
            },
        }
    }

    /// Add a forager to the forager breed.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::DuplicateAgent`] if the identity is
    /// already scheduled.
    pub fn add(&mut self, forager: Forager) -> Result<(), SimulationError> {
        let agent_id = forager.id();
        if self.foragers.contains_key(&agent_id) {
            return Err(SimulationError::DuplicateAgent { agent_id });
        }
        self.foragers.insert(agent_id, forager);
        Ok(())
    }

    /// Remove a forager without counting it as a death.
    pub fn remove(&mut self, agent_id: AgentId) -> Option<Forager> {
        self.foragers.remove(&agent_id)
    }

    /// Look up a living forager.
    pub fn forager(&self, agent_id: AgentId) -> Option<&Forager> {
        self.foragers.get(&agent_id)
    }

    /// Living foragers in identity order.
    pub fn foragers(&self) -> impl Iterator<Item = &Forager> {
        self.foragers.values()
    }

    /// Read-only views of every living forager.
    pub fn views(&self) -> Vec<ForagerView> {
        self.foragers.values().map(Forager::view).collect()
    }

    /// Number of members in a breed.
    pub fn breed_count(&self, breed: Breed) -> usize {
        match breed {
            Breed::Patch => self.patches.len(),
            Breed::Forager => self.foragers.len(),
        }
    }

    /// Living forager count as `u64`.
    pub fn living(&self) -> u64 {
        u64::try_from(self.foragers.len()).unwrap_or(u64::MAX)
    }

    /// Cumulative death counters.
    pub const fn deaths(&self) -> &DeathCounters {
        &self.deaths
    }

    /// `deaths / (deaths + living)`, or 0 when both are 0.
    pub fn death_rate(&self) -> f64 {
        let denominator = self.deaths.total.saturating_add(self.living());
        metrics::ratio(self.deaths.total, denominator)
    }

    /// Share of all deaths that fell in `bucket`, or 0 with no deaths.
    pub fn death_rate_by_sensing(&self, bucket: SensingBucket) -> f64 {
        metrics::ratio(self.deaths.by_sensing(bucket), self.deaths.total)
    }

    /// Share of all deaths with `disposition`, or 0 with no deaths.
    pub fn death_rate_by_disposition(&self, disposition: Disposition) -> f64 {
        metrics::ratio(self.deaths.by_disposition(disposition), self.deaths.total)
    }

    /// Wealth statistics over living foragers.
    pub fn wealth_stats(&self) -> sugarscape_types::WealthStats {
        metrics::wealth_stats(self.foragers.values().map(Forager::wealth))
    }

    /// Run every breed once: shuffled patch regrowth, then shuffled
    /// forager activation. Starved foragers are dropped and counted.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] on any broken invariant. The tick is
    /// then incomplete and the run must be abandoned.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        mut env: ForagingEnv<'_>,
        growth: u32,
        rng: &mut R,
    ) -> Result<PassSummary, SimulationError> {
        let mut summary = PassSummary::default();

        for breed in Breed::ORDER {
            match breed {
                Breed::Patch => {
                    self.patches.shuffle(rng);
                    for &pos in &self.patches {
                        let grown = env.grid.patch_mut(pos)?.regrow(growth)?;
                        summary.regrown = summary.regrown.saturating_add(u64::from(grown));
                    }
                }
                Breed::Forager => {
                    let mut order: Vec<AgentId> = self.foragers.keys().copied().collect();
                    order.shuffle(rng);
                    let mut ctx = StepContext {
                        grid: &mut *env.grid,
                        distances: env.distances,
                        knowledge: env.knowledge.as_deref_mut(),
                        pool: &mut *env.pool,
                        rules: env.rules,
                        rng: &mut *rng,
                    };
                    for agent_id in order {
                        let forager = self
                            .foragers
                            .get_mut(&agent_id)
                            .ok_or(SimulationError::AgentNotFound { agent_id })?;
                        let report = step_forager(forager, &mut ctx)?;
                        summary.activated = summary.activated.saturating_add(1);
                        summary.harvested = summary
                            .harvested
                            .saturating_add(u64::from(report.settlement.harvested));
                        if let Some(death) = report.death {
                            self.foragers.remove(&agent_id);
                            self.deaths.record(&death);
                            summary.deaths.push(death);
                        }
                    }
                }
            }
        }

        debug!(
            regrown = summary.regrown,
            activated = summary.activated,
            harvested = summary.harvested,
            starved = summary.deaths.len(),
            "Scheduler pass complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sugarscape_types::Connectivity;
    use sugarscape_world::CapacityMap;

    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    struct Fixture {
        grid: ResourceGrid,
        distances: DistanceTable,
        pool: RedistributionPool,
        rules: ForagingRules,
        scheduler: BreedScheduler,
        rng: ChaCha8Rng,
    }

    impl Fixture {
        fn new(map: &CapacityMap) -> Self {
            let grid = ResourceGrid::new(map, Connectivity::VonNeumann);
            Self {
                scheduler: BreedScheduler::new(grid.patch_positions()),
                distances: DistanceTable::new(map.width(), map.height()),
                grid,
                pool: RedistributionPool::new(),
                rules: ForagingRules::default(),
                rng: ChaCha8Rng::seed_from_u64(9),
            }
        }

        fn add(&mut self, id: u64, pos: Position, wealth: i64, metabolism: u32, radius: u32) {
            self.grid.place(AgentId(id), pos).unwrap();
            let forager = Forager::new(
                AgentId(id),
                pos,
                wealth,
                metabolism,
                radius,
                Disposition::Independent,
            )
            .unwrap();
            self.scheduler.add(forager).unwrap();
        }

        fn step(&mut self) -> PassSummary {
            let env = ForagingEnv {
                grid: &mut self.grid,
                distances: &self.distances,
                knowledge: None,
                pool: &mut self.pool,
                rules: &self.rules,
            };
            self.scheduler.step(env, 1, &mut self.rng).unwrap()
        }
    }

    #[test]
    fn empty_scheduler_reports_zero_rates() {
        let scheduler = BreedScheduler::new(Vec::new());
        assert!(approx(scheduler.death_rate(), 0.0));
        assert!(approx(scheduler.death_rate_by_sensing(SensingBucket::Low), 0.0));
        assert_eq!(scheduler.wealth_stats().count, 0);
    }

    #[test]
    fn duplicate_agent_is_rejected() {
        let mut scheduler = BreedScheduler::new(Vec::new());
        let f = Forager::new(AgentId(1), Position::new(0, 0), 5, 1, 1, Disposition::Solidary)
            .unwrap();
        scheduler.add(f.clone()).unwrap();
        assert!(matches!(
            scheduler.add(f),
            Err(SimulationError::DuplicateAgent { .. })
        ));
        assert_eq!(scheduler.breed_count(Breed::Forager), 1);
    }

    #[test]
    fn patches_regrow_before_foragers_harvest() {
        let map = CapacityMap::from_rows(&[vec![3]]).unwrap();
        let mut fx = Fixture::new(&map);
        fx.grid.patch_mut(Position::new(0, 0)).unwrap().harvest();
        fx.add(0, Position::new(0, 0), 10, 1, 0);

        let summary = fx.step();
        assert_eq!(summary.regrown, 1);
        assert_eq!(summary.harvested, 1);
        assert_eq!(fx.scheduler.forager(AgentId(0)).unwrap().wealth(), 10);
    }

    #[test]
    fn starved_foragers_are_counted_and_dropped() {
        let map = CapacityMap::from_rows(&[vec![0, 0, 0, 0]]).unwrap();
        let mut fx = Fixture::new(&map);
        fx.add(0, Position::new(0, 0), 1, 2, 1);
        fx.add(1, Position::new(0, 3), 1, 2, 4);
        fx.add(2, Position::new(0, 1), 50, 2, 1);

        let summary = fx.step();
        assert_eq!(summary.deaths.len(), 2);
        assert_eq!(fx.scheduler.breed_count(Breed::Forager), 1);
        assert_eq!(fx.grid.occupied_count(), 1);

        let deaths = fx.scheduler.deaths();
        assert_eq!(deaths.total, 2);
        assert_eq!(deaths.low_sensing, 1);
        assert_eq!(deaths.high_sensing, 1);
        assert_eq!(deaths.independent, 2);
        assert!(approx(fx.scheduler.death_rate(), 2.0 / 3.0));
        assert!(approx(fx.scheduler.death_rate_by_sensing(SensingBucket::Low), 0.5));
        assert!(approx(
            fx.scheduler.death_rate_by_disposition(Disposition::Individualist),
            0.0
        ));
    }

    #[test]
    fn wealth_stats_cover_living_foragers() {
        let map = CapacityMap::uniform(2, 2, 0).unwrap();
        let mut fx = Fixture::new(&map);
        fx.add(0, Position::new(0, 0), 10, 1, 0);
        fx.add(1, Position::new(1, 1), 20, 1, 0);

        let stats = fx.scheduler.wealth_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 20);
        assert!(approx(stats.mean, 15.0));
        assert!(approx(stats.stdev, 5.0));
    }
}
