//! Precomputed distances between relative grid offsets.
//!
//! Every distance the simulation needs is between two cells of the same
//! grid, so it depends only on the absolute offset `(|dx|, |dy|)`. The
//! [`DistanceTable`] computes all `width x height` offsets once.
//!
//! Comparisons use the exact squared distance (an integer), which orders
//! cells identically to Euclidean distance and makes ties exact.

use sugarscape_types::Position;

use crate::error::WorldError;

/// Squared distances for every offset of a grid extent.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    width: u32,
    height: u32,
    /// `squared[dx * height + dy] = dx^2 + dy^2`.
    squared: Vec<u64>,
}

impl DistanceTable {
    /// Build the table for a `width x height` grid.
    pub fn new(width: u32, height: u32) -> Self {
        let mut squared = Vec::new();
        for dx in 0..width {
            for dy in 0..height {
                let dx2 = u64::from(dx).saturating_mul(u64::from(dx));
                let dy2 = u64::from(dy).saturating_mul(u64::from(dy));
                squared.push(dx2.saturating_add(dy2));
            }
        }
        Self {
            width,
            height,
            squared,
        }
    }

    /// Grid width the table was built for.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height the table was built for.
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, a: Position, b: Position) -> Result<usize, WorldError> {
        let (dx, dy) = a.offset_to(b);
        let out_of_bounds = || WorldError::OutOfBounds {
            position: if a.x >= self.width || a.y >= self.height { a } else { b },
            width: self.width,
            height: self.height,
        };
        if dx >= self.width || dy >= self.height {
            return Err(out_of_bounds());
        }
        let idx = u64::from(dx)
            .checked_mul(u64::from(self.height))
            .and_then(|v| v.checked_add(u64::from(dy)))
            .ok_or(WorldError::ArithmeticOverflow)?;
        usize::try_from(idx).map_err(|_err| WorldError::ArithmeticOverflow)
    }

    /// Squared Euclidean distance between two cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] when the offset exceeds the
    /// table extent.
    pub fn squared(&self, a: Position, b: Position) -> Result<u64, WorldError> {
        let idx = self.index(a, b)?;
        self.squared
            .get(idx)
            .copied()
            .ok_or(WorldError::ArithmeticOverflow)
    }

    /// Return the entries of `candidates` at minimal distance from `from`.
    ///
    /// Order among the returned ties follows `candidates`.
    ///
    /// # Errors
    ///
    /// Propagates [`WorldError::OutOfBounds`] from any candidate.
    pub fn nearest(
        &self,
        from: Position,
        candidates: &[Position],
    ) -> Result<Vec<Position>, WorldError> {
        let mut best = u64::MAX;
        let mut ties = Vec::new();
        for &candidate in candidates {
            let d = self.squared(from, candidate)?;
            if d < best {
                best = d;
                ties.clear();
                ties.push(candidate);
            } else if d == best {
                ties.push(candidate);
            }
        }
        Ok(ties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_match_pythagoras() {
        let table = DistanceTable::new(10, 10);
        let a = Position::new(1, 1);
        let b = Position::new(4, 5);
        assert_eq!(table.squared(a, b).ok(), Some(25));
        assert_eq!(table.squared(b, a).ok(), Some(25));
        assert_eq!(table.squared(a, a).ok(), Some(0));
    }

    #[test]
    fn out_of_extent_is_rejected() {
        let table = DistanceTable::new(3, 3);
        let result = table.squared(Position::new(0, 0), Position::new(5, 0));
        assert!(matches!(result, Err(WorldError::OutOfBounds { .. })));
    }

    #[test]
    fn nearest_keeps_all_ties() {
        let table = DistanceTable::new(5, 5);
        let from = Position::new(2, 2);
        let candidates = [
            Position::new(2, 0),
            Position::new(3, 2),
            Position::new(1, 2),
            Position::new(4, 4),
        ];
        let nearest = table.nearest(from, &candidates).unwrap_or_default();
        assert_eq!(nearest, vec![Position::new(3, 2), Position::new(1, 2)]);
    }

    #[test]
    fn nearest_of_nothing_is_empty() {
        let table = DistanceTable::new(2, 2);
        let nearest = table.nearest(Position::new(0, 0), &[]).unwrap_or_default();
        assert!(nearest.is_empty());
    }
}
