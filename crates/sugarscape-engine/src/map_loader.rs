//! Capacity-map text loader.
//!
//! One line per `x`, whitespace-separated values per `y`. Values may be
//! written as integers or as floats with a zero fraction (`4` or `4.0`).
//! Blank lines are skipped.

use std::path::Path;

use sugarscape_world::CapacityMap;
use tracing::info;

use crate::error::MapLoadError;

/// Read and parse a capacity map from `path`.
pub fn load_capacity_map(path: &Path) -> Result<CapacityMap, MapLoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| MapLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let map = parse_capacity_map(&text)?;
    info!(
        path = %path.display(),
        width = map.width(),
        height = map.height(),
        total_capacity = map.total(),
        "Capacity map loaded"
    );
    Ok(map)
}

/// Parse capacity-map text.
pub fn parse_capacity_map(text: &str) -> Result<CapacityMap, MapLoadError> {
    let mut rows = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for (col_idx, token) in line.split_whitespace().enumerate() {
            let value = parse_value(token).ok_or_else(|| MapLoadError::InvalidValue {
                line: line_idx.saturating_add(1),
                column: col_idx.saturating_add(1),
                token: token.to_owned(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }
    Ok(CapacityMap::from_rows(&rows)?)
}

/// `"4"`, `"4."` and `"4.00"` all read as 4; anything with a non-zero
/// fraction, a sign, or an exponent is rejected.
fn parse_value(token: &str) -> Option<u32> {
    let (whole, fraction) = token.split_once('.').unwrap_or((token, ""));
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !fraction.bytes().all(|b| b == b'0') {
        return None;
    }
    whole.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sugarscape_types::Position;

    use super::*;

    #[test]
    fn rows_are_x_columns_are_y() {
        let map = parse_capacity_map("0 1 2\n3 4 5\n").unwrap();
        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 3);
        assert_eq!(map.get(Position::new(0, 2)), Some(2));
        assert_eq!(map.get(Position::new(1, 0)), Some(3));
    }

    #[test]
    fn float_notation_and_blank_lines() {
        let map = parse_capacity_map("4.0 0.0\n\n  2 3.00  \n").unwrap();
        assert_eq!(map.get(Position::new(0, 0)), Some(4));
        assert_eq!(map.get(Position::new(1, 1)), Some(3));
        assert_eq!(map.total(), 9);
    }

    #[test]
    fn rejects_fractions_and_negatives() {
        for bad in ["1.5", "-1", "x", ".0", "1e3"] {
            let err = parse_capacity_map(bad).unwrap_err();
            assert!(
                matches!(err, MapLoadError::InvalidValue { line: 1, column: 1, .. }),
                "{bad} accepted"
            );
        }
    }

    #[test]
    fn reports_position_of_bad_token() {
        let err = parse_capacity_map("1 2\n3 oops\n").unwrap_err();
        assert!(matches!(
            err,
            MapLoadError::InvalidValue { line: 2, column: 2, .. }
        ));
    }

    #[test]
    fn ragged_and_empty_maps_fail() {
        assert!(matches!(
            parse_capacity_map("1 2\n3\n"),
            Err(MapLoadError::Shape { .. })
        ));
        assert!(matches!(
            parse_capacity_map("\n\n"),
            Err(MapLoadError::Shape { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_capacity_map(Path::new("/nonexistent/sugar-map.txt")).unwrap_err();
        assert!(matches!(err, MapLoadError::Io { .. }));
    }
}
