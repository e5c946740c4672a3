//! The World: root of one simulation run.
//!
//! A World owns the grid, the breed scheduler (and through it every
//! forager), the optional shared knowledge store, the redistribution pool,
//! the identity allocator and the single seeded random stream. Nothing is
//! shared between Worlds, so independent runs may execute in parallel.
//!
//! # Tick cycle
//!
//! 1. Scheduler pass: shuffled patch regrowth, then shuffled forager
//!    activation (move, harvest, settle, death check).
//! 2. Clock advance.
//! 3. Replenishment, on ticks that close a replenishment period.
//! 4. Integrity checks, then the metrics snapshot.
//!
//! Random draws happen in exactly that order, so a seed fully determines a
//! run.

use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sugarscape_agents::{EndowmentConfig, Forager, ForagingRules};
use sugarscape_types::{
    AgentId, Breed, Disposition, ForagerView, IdAllocator, MetricsSnapshot, MovementPolicy, Position,
    SensingBucket,
};
use sugarscape_world::{
    CapacityMap, DistanceTable, RedistributionPool, ResourceGrid, SharedKnowledge, WorldError,
};
use tracing::{debug, info, warn};

use crate::clock::WorldClock;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::scheduler::{BreedScheduler, ForagingEnv};

/// Summary of one completed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that just completed.
    pub tick: u64,
    /// Units regrown across all patches.
    pub regrown: u64,
    /// Foragers activated.
    pub activated: u64,
    /// Units harvested.
    pub harvested: u64,
    /// Foragers that starved this tick.
    pub starved: u64,
    /// Foragers injected by replenishment this tick.
    pub spawned: u64,
    /// Aggregate metrics after the tick.
    pub snapshot: MetricsSnapshot,
}

/// One self-contained simulation run.
#[derive(Debug, Clone)]
pub struct World {
    name: String,
    clock: WorldClock,
    grid: ResourceGrid,
    distances: DistanceTable,
    knowledge: Option<SharedKnowledge>,
    pool: RedistributionPool,
    scheduler: BreedScheduler,
    ids: IdAllocator,
    rng: ChaCha8Rng,
    rules: ForagingRules,
    endowment: EndowmentConfig,
    growth_rate: u32,
    replenish_count: u32,
    replenish_period: u64,
    individualist_percent: u32,
}

impl World {
    /// Build a World from configuration and a capacity map, then place the
    /// initial population.
    ///
    /// The map's dimensions define the grid. Every patch starts full.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Config`] if the configuration is invalid,
    /// or any error raised while placing the initial population.
    pub fn new(config: &SimulationConfig, capacity: &CapacityMap) -> Result<Self, SimulationError> {
        let width = capacity.width();
        let height = capacity.height();
        config.validate_for_grid(width, height)?;
        let grid = ResourceGrid::new(capacity, config.foraging.connectivity);
        let knowledge = config
            .foraging
            .shared_knowledge
            .then(|| SharedKnowledge::new(width, height, config.foraging.knowledge_strategy));

        let mut world = Self {
            name: config.world.name.clone(),
            clock: WorldClock::new(),
            scheduler: BreedScheduler::new(grid.patch_positions()),
            distances: DistanceTable::new(width, height),
            grid,
            knowledge,
            pool: RedistributionPool::new(),
            ids: IdAllocator::new(),
            rng: ChaCha8Rng::seed_from_u64(config.world.seed),
            rules: config.rules(),
            endowment: config.population.endowment(),
            growth_rate: config.foraging.growth_rate,
            replenish_count: config.population.replenish_count,
            replenish_period: config.population.replenish_period,
            individualist_percent: config.solidarity.individualist_percent,
        };

        let placed = world.spawn_many(config.population.initial_population)?;

        info!(
            name = %world.name,
            seed = config.world.seed,
            width,
            height,
            policy = ?config.foraging.policy(),
            solidarity = world.rules.solidarity,
            initial_population = placed,
            standing_resource = world.grid.standing_resource(),
            "World created"
        );
        Ok(world)
    }

    // -------------------------------------------------------------------
    // Population
    // -------------------------------------------------------------------

    /// Spawn up to `count` foragers at random free cells. Returns how many
    /// were placed; spawning stops early once the grid is full.
    fn spawn_many(&mut self, count: u32) -> Result<u64, SimulationError> {
        let mut placed = 0u64;
        for _ in 0..count {
            if self.spawn_random()?.is_none() {
                break;
            }
            placed = placed.saturating_add(1);
        }
        Ok(placed)
    }

    /// Spawn one forager at a uniformly random free cell.
    ///
    /// Draw order: cell, disposition, endowment. Returns `None` (and logs a
    /// warning) when every cell is taken.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the identity space is exhausted or
    /// placement fails.
    pub fn spawn_random(&mut self) -> Result<Option<AgentId>, SimulationError> {
        let free = self.grid.unoccupied_cells();
        let Some(&position) = free.choose(&mut self.rng) else {
            warn!(
                living = self.scheduler.living(),
                cells = self.grid.cell_count(),
                "Grid is full, spawn skipped"
            );
            return Ok(None);
        };
        let disposition = self.draw_disposition();
        let agent_id = self.ids.peek().ok_or(SimulationError::IdsExhausted)?;
        let forager = Forager::spawn(agent_id, position, disposition, &self.endowment, &mut self.rng)?;
        self.admit(forager)?;
        Ok(Some(agent_id))
    }

    /// Place a forager with explicit attributes, for scripted scenarios.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] if the attributes are invalid or the
    /// cell is off-grid or taken.
    pub fn insert_forager(
        &mut self,
        position: Position,
        wealth: i64,
        metabolism: u32,
        sensing_radius: u32,
        disposition: Disposition,
    ) -> Result<AgentId, SimulationError> {
        let agent_id = self.ids.peek().ok_or(SimulationError::IdsExhausted)?;
        let forager = Forager::new(
            agent_id,
            position,
            wealth,
            metabolism,
            sensing_radius,
            disposition,
        )?;
        self.admit(forager)?;
        Ok(agent_id)
    }

    /// Put a forager carrying the next unissued id on the grid and the
    /// schedule. The id is consumed only once both succeed.
    fn admit(&mut self, forager: Forager) -> Result<(), SimulationError> {
        let agent_id = forager.id();
        let position = forager.position();
        self.grid.place(agent_id, position)?;
        if let Err(e) = self.scheduler.add(forager) {
            self.grid.remove(agent_id, position)?;
            return Err(e);
        }
        self.ids.issue().ok_or(SimulationError::IdsExhausted)?;
        debug!(
            %agent_id,
            %position,
            "Forager spawned"
        );
        Ok(())
    }

    /// Without solidarity everyone is independent; with it, each newborn
    /// is an individualist with probability `individualist_percent / 100`.
    fn draw_disposition(&mut self) -> Disposition {
        if !self.rules.solidarity {
            return Disposition::Independent;
        }
        if self.rng.random_range(0..100u32) < self.individualist_percent {
            Disposition::Individualist
        } else {
            Disposition::Solidary
        }
    }

    // -------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------

    /// Advance the World by one tick.
    ///
    /// An extinct World still ticks: patches regrow and replenishment may
    /// repopulate it.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError`] on any broken invariant. The World must
    /// not be ticked again after an error.
    pub fn tick(&mut self) -> Result<TickSummary, SimulationError> {
        let env = ForagingEnv {
            grid: &mut self.grid,
            distances: &self.distances,
            knowledge: self.knowledge.as_mut(),
            pool: &mut self.pool,
            rules: &self.rules,
        };
        let pass = self.scheduler.step(env, self.growth_rate, &mut self.rng)?;
        let tick = self.clock.advance()?;

        let mut spawned = 0;
        if self.replenish_count > 0 && self.clock.on_period(self.replenish_period) {
            spawned = self.spawn_many(self.replenish_count)?;
            info!(tick, spawned, "Population replenished");
        }

        self.check_invariants()?;
        let snapshot = self.snapshot();

        debug!(
            tick,
            living = snapshot.living_agents,
            starved = pass.deaths.len(),
            spawned,
            mean_wealth = snapshot.wealth.mean,
            pool_balance = snapshot.pool_balance,
            "Tick complete"
        );

        Ok(TickSummary {
            tick,
            regrown: pass.regrown,
            activated: pass.activated,
            harvested: pass.harvested,
            starved: u64::try_from(pass.deaths.len()).unwrap_or(u64::MAX),
            spawned,
            snapshot,
        })
    }

    /// Verify the structural invariants: patch bounds, pool conservation,
    /// and that grid occupancy and scheduled foragers agree one-to-one.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvariantViolation`] (wrapped) on the first
    /// breach.
    pub fn check_invariants(&self) -> Result<(), SimulationError> {
        self.grid.check_invariants()?;
        self.pool.verify_conservation()?;
        for forager in self.scheduler.foragers() {
            if self.grid.occupant(forager.position())? != Some(forager.id()) {
                return Err(WorldError::AgentNotAtPosition {
                    agent: forager.id(),
                    position: forager.position(),
                }
                .into());
            }
        }
        let living = self.scheduler.breed_count(Breed::Forager);
        if self.grid.occupied_count() != living {
            return Err(WorldError::InvariantViolation {
                reason: format!(
                    "{} occupied cells but {living} living foragers",
                    self.grid.occupied_count()
                ),
            }
            .into());
        }
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Aggregate metrics for external reporters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let deaths = self.scheduler.deaths();
        MetricsSnapshot {
            tick: self.clock.tick(),
            living_agents: self.scheduler.living(),
            deaths: deaths.total,
            deaths_low_sensing: deaths.low_sensing,
            deaths_high_sensing: deaths.high_sensing,
            deaths_solidary: deaths.solidary,
            deaths_individualist: deaths.individualist,
            deaths_independent: deaths.independent,
            death_rate: self.scheduler.death_rate(),
            death_rate_low_sensing: self.scheduler.death_rate_by_sensing(SensingBucket::Low),
            death_rate_high_sensing: self.scheduler.death_rate_by_sensing(SensingBucket::High),
            death_rate_individualist: self
                .scheduler
                .death_rate_by_disposition(Disposition::Individualist),
            wealth: self.scheduler.wealth_stats(),
            pool_balance: self.pool.balance(),
            standing_resource: self.grid.standing_resource(),
        }
    }

    /// Human-readable run name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticks completed so far.
    pub const fn tick_count(&self) -> u64 {
        self.clock.tick()
    }

    /// The resource grid.
    pub const fn grid(&self) -> &ResourceGrid {
        &self.grid
    }

    /// The breed scheduler.
    pub const fn scheduler(&self) -> &BreedScheduler {
        &self.scheduler
    }

    /// The shared knowledge store, when knowledge-guided.
    pub const fn knowledge(&self) -> Option<&SharedKnowledge> {
        self.knowledge.as_ref()
    }

    /// The redistribution pool.
    pub const fn pool(&self) -> &RedistributionPool {
        &self.pool
    }

    /// Movement policy in effect.
    pub const fn policy(&self) -> MovementPolicy {
        if self.knowledge.is_some() {
            MovementPolicy::KnowledgeGuided
        } else {
            MovementPolicy::Direct
        }
    }

    /// Read-only views of every living forager, for renderers.
    pub fn views(&self) -> Vec<ForagerView> {
        self.scheduler.views()
    }
}
