//! Shared knowledge store: aggregated memory of observed resource levels.
//!
//! Foragers publish the resource level they observe on arrival at a cell.
//! The store keeps, per published cell, the last observation, an
//! exponentially decayed "recent" value and the all-time peak, plus a
//! running global maximum of every observation ever published.
//!
//! Queries answer "which way is the best known cell from here": find the
//! cells ranking at the current maximum, take the nearest one, then pick
//! whichever movement candidate is nearest to it. Two ranking strategies
//! are supported (see [`KnowledgeStrategy`]):
//!
//! - `RecentMax` ranks by the decayed value against the current maximum of
//!   decayed values, so stale peaks fade.
//! - `AllTimeMax` ranks by each cell's historical peak against the global
//!   peak, and never forgets.
//!
//! Exactly one store exists per World; it is never shared between runs.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;
use sugarscape_types::{KnowledgeStrategy, Position};
use tracing::trace;

use crate::distance::DistanceTable;
use crate::error::WorldError;

/// What the store remembers about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellKnowledge {
    last: u32,
    recent: u32,
    peak: u32,
}

/// Per-World aggregated knowledge of resource levels.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedKnowledge {
    strategy: KnowledgeStrategy,
    distances: DistanceTable,
    /// Published cells only, ordered for deterministic iteration.
    cells: BTreeMap<Position, CellKnowledge>,
    all_time_max: u32,
}

/// `round(0.5 * old + 0.5 * observed)` with ties rounded to even.
pub fn decay(old: u32, observed: u32) -> u32 {
    let sum = u64::from(old).saturating_add(u64::from(observed));
    let half = sum / 2;
    // An odd sum sits exactly halfway between `half` and `half + 1`.
    let rounded = if sum % 2 == 1 && half % 2 == 1 {
        half.saturating_add(1)
    } else {
        half
    };
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

impl SharedKnowledge {
    /// Create an empty store for a `width x height` grid.
    ///
    /// Nothing is seeded from the grid: a cell's first publish decays
    /// against an old value of 0. The relative-offset distance table is
    /// built here, once.
    pub fn new(width: u32, height: u32, strategy: KnowledgeStrategy) -> Self {
        Self {
            strategy,
            distances: DistanceTable::new(width, height),
            cells: BTreeMap::new(),
            all_time_max: 0,
        }
    }

    /// The active ranking strategy.
    pub const fn strategy(&self) -> KnowledgeStrategy {
        self.strategy
    }

    /// Record an observation of `observed` units at `pos`.
    ///
    /// Returns the cell's new decayed value.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid.
    pub fn publish(&mut self, pos: Position, observed: u32) -> Result<u32, WorldError> {
        if pos.x >= self.distances.width() || pos.y >= self.distances.height() {
            return Err(WorldError::OutOfBounds {
                position: pos,
                width: self.distances.width(),
                height: self.distances.height(),
            });
        }

        let entry = self.cells.entry(pos).or_insert(CellKnowledge {
            last: 0,
            recent: 0,
            peak: 0,
        });
        entry.last = observed;
        entry.recent = decay(entry.recent, observed);
        entry.peak = entry.peak.max(observed);
        let recent = entry.recent;

        self.all_time_max = self.all_time_max.max(observed);
        trace!(%pos, observed, recent, "Observation published");
        Ok(recent)
    }

    /// Decayed value at `pos`, if anything was ever published there.
    pub fn recent(&self, pos: Position) -> Option<u32> {
        self.cells.get(&pos).map(|c| c.recent)
    }

    /// Last observation published at `pos`.
    pub fn last_observation(&self, pos: Position) -> Option<u32> {
        self.cells.get(&pos).map(|c| c.last)
    }

    /// Highest observation ever published at `pos`.
    pub fn peak(&self, pos: Position) -> Option<u32> {
        self.cells.get(&pos).map(|c| c.peak)
    }

    /// Number of cells with at least one observation.
    pub fn published_cells(&self) -> usize {
        self.cells.len()
    }

    /// Current maximum decayed value across published cells (0 if none).
    pub fn recent_max(&self) -> u32 {
        self.cells.values().map(|c| c.recent).max().unwrap_or(0)
    }

    /// Highest observation ever published anywhere (0 if none).
    pub const fn all_time_max(&self) -> u32 {
        self.all_time_max
    }

    /// Cells ranking at or above the strategy's threshold, in cell order.
    fn leading_cells(&self) -> Vec<Position> {
        let (threshold, score): (u32, fn(&CellKnowledge) -> u32) = match self.strategy {
            KnowledgeStrategy::RecentMax => (self.recent_max(), |c| c.recent),
            KnowledgeStrategy::AllTimeMax => (self.all_time_max, |c| c.peak),
        };
        self.cells
            .iter()
            .filter(|(_, c)| score(c) >= threshold)
            .map(|(pos, _)| *pos)
            .collect()
    }

    /// The best-known cell closest to `from`, ties broken at random.
    ///
    /// Falls back to `from` itself while nothing has been published.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `from` is outside the grid.
    pub fn best_known_cell<R: Rng + ?Sized>(
        &self,
        from: Position,
        rng: &mut R,
    ) -> Result<Position, WorldError> {
        let leading = self.leading_cells();
        let nearest = self.distances.nearest(from, &leading)?;
        Ok(nearest.choose(rng).copied().unwrap_or(from))
    }

    /// Pick the movement candidate nearest to the best-known cell.
    ///
    /// This is a stepping-stone move: the agent heads toward the target
    /// through whatever it can reach this tick. Distance ties among
    /// candidates are broken at random. With no candidates the agent stays
    /// at `from`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `from` or any candidate is
    /// outside the grid.
    pub fn query_best_direction<R: Rng + ?Sized>(
        &self,
        from: Position,
        candidates: &[Position],
        rng: &mut R,
    ) -> Result<Position, WorldError> {
        let target = self.best_known_cell(from, rng)?;
        let nearest = self.distances.nearest(target, candidates)?;
        Ok(nearest.choose(rng).copied().unwrap_or(from))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn decay_rounds_half_to_even() {
        assert_eq!(decay(0, 10), 5);
        assert_eq!(decay(0, 5), 2); // 2.5 -> 2
        assert_eq!(decay(0, 7), 4); // 3.5 -> 4
        assert_eq!(decay(4, 4), 4);
        assert_eq!(decay(u32::MAX, u32::MAX), u32::MAX);
    }

    #[test]
    fn publish_decays_toward_observation() {
        let mut store = SharedKnowledge::new(5, 5, KnowledgeStrategy::RecentMax);
        let pos = Position::new(1, 1);
        assert_eq!(store.publish(pos, 8).unwrap(), 4);
        assert_eq!(store.publish(pos, 8).unwrap(), 6);
        assert_eq!(store.publish(pos, 0).unwrap(), 3);
        assert_eq!(store.last_observation(pos), Some(0));
        assert_eq!(store.peak(pos), Some(8));
        assert_eq!(store.all_time_max(), 8);
        assert_eq!(store.published_cells(), 1);
    }

    #[test]
    fn publish_out_of_bounds_fails() {
        let mut store = SharedKnowledge::new(2, 2, KnowledgeStrategy::RecentMax);
        let result = store.publish(Position::new(2, 0), 1);
        assert!(matches!(result, Err(WorldError::OutOfBounds { .. })));
        assert_eq!(store.published_cells(), 0);
    }

    #[test]
    fn empty_store_falls_back_to_origin() {
        let store = SharedKnowledge::new(5, 5, KnowledgeStrategy::RecentMax);
        let from = Position::new(2, 2);
        assert_eq!(store.best_known_cell(from, &mut rng()).unwrap(), from);
        assert_eq!(store.recent_max(), 0);
    }

    #[test]
    fn best_known_cell_is_nearest_leader() {
        let mut store = SharedKnowledge::new(10, 10, KnowledgeStrategy::RecentMax);
        store.publish(Position::new(9, 9), 20).unwrap();
        store.publish(Position::new(1, 0), 20).unwrap();
        store.publish(Position::new(0, 1), 4).unwrap();

        let best = store.best_known_cell(Position::new(0, 0), &mut rng()).unwrap();
        assert_eq!(best, Position::new(1, 0));
    }

    #[test]
    fn recent_strategy_forgets_depleted_peaks() {
        let mut store = SharedKnowledge::new(10, 10, KnowledgeStrategy::RecentMax);
        let rich = Position::new(0, 0);
        let steady = Position::new(9, 0);
        store.publish(rich, 12).unwrap(); // recent 6
        store.publish(steady, 8).unwrap(); // recent 4
        store.publish(steady, 8).unwrap(); // recent 6
        store.publish(rich, 0).unwrap(); // recent 3

        let best = store.best_known_cell(Position::new(1, 0), &mut rng()).unwrap();
        assert_eq!(best, steady);
    }

    #[test]
    fn all_time_strategy_remembers_peaks() {
        let mut store = SharedKnowledge::new(10, 10, KnowledgeStrategy::AllTimeMax);
        let rich = Position::new(0, 0);
        let steady = Position::new(9, 0);
        store.publish(rich, 12).unwrap();
        store.publish(steady, 8).unwrap();
        store.publish(steady, 8).unwrap();
        store.publish(rich, 0).unwrap();

        let best = store.best_known_cell(Position::new(8, 0), &mut rng()).unwrap();
        assert_eq!(best, rich);
    }

    #[test]
    fn direction_steps_toward_target() {
        let mut store = SharedKnowledge::new(10, 10, KnowledgeStrategy::RecentMax);
        store.publish(Position::new(9, 5), 10).unwrap();

        let from = Position::new(5, 5);
        let candidates = [
            Position::new(4, 5),
            Position::new(6, 5),
            Position::new(5, 4),
            Position::new(5, 6),
        ];
        let step = store
            .query_best_direction(from, &candidates, &mut rng())
            .unwrap();
        assert_eq!(step, Position::new(6, 5));
    }

    #[test]
    fn direction_without_candidates_stays() {
        let mut store = SharedKnowledge::new(4, 4, KnowledgeStrategy::RecentMax);
        store.publish(Position::new(3, 3), 10).unwrap();
        let from = Position::new(0, 0);
        assert_eq!(store.query_best_direction(from, &[], &mut rng()).unwrap(), from);
    }

    #[test]
    fn direction_ties_are_broken_among_equals() {
        let mut store = SharedKnowledge::new(5, 5, KnowledgeStrategy::RecentMax);
        store.publish(Position::new(2, 4), 10).unwrap();
        let from = Position::new(2, 2);
        let left = Position::new(1, 3);
        let right = Position::new(3, 3);
        let candidates = [left, right, Position::new(2, 1)];
        let mut r = rng();
        for _ in 0..20 {
            let step = store.query_best_direction(from, &candidates, &mut r).unwrap();
            assert!(step == left || step == right);
        }
    }
}
