//! Resource-capacity map supplied at World construction.
//!
//! The map is a width x height matrix of non-negative integers indexed
//! `(x, y)`: the outer dimension is `x`, the inner dimension is `y`. How
//! the matrix is read from storage is the caller's concern.

use sugarscape_types::Position;

use crate::error::WorldError;

/// Per-cell resource ceilings for a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityMap {
    width: u32,
    height: u32,
    /// Row-major by `x`: `cells[x * height + y]`.
    cells: Vec<u32>,
}

impl CapacityMap {
    /// Build a map from rows indexed by `x`, each row holding `height`
    /// values indexed by `y`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyMap`] for zero rows or zero-length rows,
    /// [`WorldError::DimensionMismatch`] for ragged rows, and
    /// [`WorldError::ArithmeticOverflow`] if a dimension exceeds `u32`.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, WorldError> {
        let Some(first) = rows.first() else {
            return Err(WorldError::EmptyMap);
        };
        let expected = first.len();
        if expected == 0 {
            return Err(WorldError::EmptyMap);
        }

        let mut cells = Vec::with_capacity(rows.len().saturating_mul(expected));
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(WorldError::DimensionMismatch {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }

        let width = u32::try_from(rows.len()).map_err(|_err| WorldError::ArithmeticOverflow)?;
        let height = u32::try_from(expected).map_err(|_err| WorldError::ArithmeticOverflow)?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a map where every cell has the same capacity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyMap`] if either dimension is zero.
    pub fn uniform(width: u32, height: u32, capacity: u32) -> Result<Self, WorldError> {
        Self::from_fn(width, height, |_| capacity)
    }

    /// Build a map by evaluating `f` at every position.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyMap`] if either dimension is zero.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(Position) -> u32,
    ) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyMap);
        }
        let mut cells = Vec::new();
        for x in 0..width {
            for y in 0..height {
                cells.push(f(Position::new(x, y)));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Number of columns (`x` extent).
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows (`y` extent).
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Capacity at `pos`, or `None` outside the map.
    pub fn get(&self, pos: Position) -> Option<u32> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        let idx = u64::from(pos.x)
            .checked_mul(u64::from(self.height))?
            .checked_add(u64::from(pos.y))?;
        self.cells.get(usize::try_from(idx).ok()?).copied()
    }

    /// Sum of all capacities.
    pub fn total(&self) -> u64 {
        self.cells
            .iter()
            .fold(0u64, |acc, &c| acc.saturating_add(u64::from(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_indexed_by_x() {
        let map = CapacityMap::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]);
        assert!(map.is_ok());
        let map = map.unwrap_or_else(|_| CapacityMap {
            width: 0,
            height: 0,
            cells: Vec::new(),
        });
        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 3);
        assert_eq!(map.get(Position::new(0, 2)), Some(3));
        assert_eq!(map.get(Position::new(1, 0)), Some(4));
        assert_eq!(map.get(Position::new(2, 0)), None);
        assert_eq!(map.total(), 21);
    }

    #[test]
    fn ragged_rows_rejected() {
        let result = CapacityMap::from_rows(&[vec![1, 2], vec![3]]);
        assert_eq!(
            result,
            Err(WorldError::DimensionMismatch {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn empty_map_rejected() {
        assert_eq!(CapacityMap::from_rows(&[]), Err(WorldError::EmptyMap));
        assert_eq!(CapacityMap::from_rows(&[vec![]]), Err(WorldError::EmptyMap));
        assert_eq!(CapacityMap::uniform(0, 5, 1), Err(WorldError::EmptyMap));
    }

    #[test]
    fn from_fn_evaluates_every_cell() {
        let map = CapacityMap::from_fn(3, 2, |p| p.x + p.y * 10);
        assert_eq!(map.as_ref().ok().and_then(|m| m.get(Position::new(2, 1))), Some(12));
    }
}
