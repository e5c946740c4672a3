//! Movement candidates and target selection.
//!
//! Candidates are the cells within the forager's sensing radius that no
//! other forager holds. The forager's own cell always qualifies, so the
//! list is never empty and a forager boxed in on every side stays put.
//!
//! Two policies pick among candidates:
//!
//! - **Direct**: cells holding the most resource, then the nearest of those
//!   by Euclidean distance, then uniformly at random.
//! - **Knowledge-guided**: cells holding the most resource, then the one
//!   nearest the best cell known to the shared store (see
//!   [`SharedKnowledge::query_best_direction`](sugarscape_world::SharedKnowledge::query_best_direction)).
//!   The store never pulls a forager off a richer visible cell; it only
//!   breaks ties among the richest.

use rand::Rng;
use rand::seq::IndexedRandom;
use sugarscape_types::Position;
use sugarscape_world::{DistanceTable, ResourceGrid, SharedKnowledge};

use crate::error::AgentError;
use crate::forager::Forager;

/// Cells `forager` may move to this activation.
///
/// # Errors
///
/// Returns [`AgentError::World`] if the forager's position is off-grid.
pub fn candidates(grid: &ResourceGrid, forager: &Forager) -> Result<Vec<Position>, AgentError> {
    let mut open = Vec::new();
    for cell in grid.neighborhood(forager.position(), forager.sensing_radius(), true)? {
        match grid.occupant(cell)? {
            Some(other) if other != forager.id() => {}
            _ => open.push(cell),
        }
    }
    Ok(open)
}

/// Candidates holding the largest resource amount.
fn richest(grid: &ResourceGrid, candidates: &[Position]) -> Result<Vec<Position>, AgentError> {
    let mut richest = Vec::new();
    let mut best = 0u32;
    for &cell in candidates {
        let amount = grid.resource_at(cell)?;
        if richest.is_empty() || amount > best {
            best = amount;
            richest.clear();
            richest.push(cell);
        } else if amount == best {
            richest.push(cell);
        }
    }
    Ok(richest)
}

/// Direct policy: richest, then nearest, then random.
///
/// # Errors
///
/// Returns [`AgentError::World`] if any candidate is off-grid.
pub fn select_direct<R: Rng + ?Sized>(
    grid: &ResourceGrid,
    distances: &DistanceTable,
    from: Position,
    candidates: &[Position],
    rng: &mut R,
) -> Result<Position, AgentError> {
    let richest = richest(grid, candidates)?;
    let nearest = distances.nearest(from, &richest)?;
    Ok(nearest.choose(rng).copied().unwrap_or(from))
}

/// Knowledge-guided policy: among the richest candidates, step toward the
/// best-known cell.
///
/// # Errors
///
/// Returns [`AgentError::World`] if any candidate is off-grid.
pub fn select_guided<R: Rng + ?Sized>(
    grid: &ResourceGrid,
    knowledge: &SharedKnowledge,
    from: Position,
    candidates: &[Position],
    rng: &mut R,
) -> Result<Position, AgentError> {
    let richest = richest(grid, candidates)?;
    Ok(knowledge.query_best_direction(from, &richest, rng)?)
}
