//! Named spatial axes
//!
//! Resolves symbolic axis names ('x', 'y', 'z') to payload column indices.
//! Spatial columns are laid out as (x, y) in 2-D, (x, y, z) in 3-D and
//! (..., x, y, z) beyond that, so for more than three spatial dimensions the
//! named axes always address the last three columns.

use serde::{Deserialize, Serialize};

use crate::error::{BlockError, BlockResult};

/// A named spatial axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse a single axis character, case-insensitively.
    pub fn from_char(c: char) -> BlockResult<Self> {
        match c.to_ascii_lowercase() {
            'x' => Ok(Axis::X),
            'y' => Ok(Axis::Y),
            'z' => Ok(Axis::Z),
            other => Err(BlockError::UnknownAxis {
                name: other.to_string(),
            }),
        }
    }

    /// The axis character
    pub fn label(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }

    fn table_index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Resolve this axis to a column index of a payload with `ndim_spatial`
    /// spatial columns.
    ///
    /// For three or fewer spatial dimensions x, y, z map to columns 0, 1, 2,
    /// with an explicit range check (asking for z of a 2-D payload is a
    /// domain error, not a wrapped index). Beyond three dimensions the named
    /// axes address the last three columns: x maps to m-3, y to m-2, z to m-1.
    pub fn column_index(self, ndim_spatial: usize) -> BlockResult<usize> {
        let index = self.table_index();
        if ndim_spatial > 3 {
            Ok(ndim_spatial - 3 + index)
        } else if index < ndim_spatial {
            Ok(index)
        } else {
            Err(BlockError::AxisOutOfRange {
                axis: self.label(),
                ndim: ndim_spatial,
            })
        }
    }
}

/// Parse a multi-axis request such as `"xyz"` or `"zyx"`, preserving the
/// requested order.
pub fn parse_axes(axes: &str) -> BlockResult<Vec<Axis>> {
    let cleaned = axes.trim().to_lowercase();
    if cleaned.is_empty() {
        return Err(BlockError::UnknownAxis {
            name: axes.to_string(),
        });
    }
    cleaned.chars().map(Axis::from_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Axis::X, 2, 0)]
    #[test_case(Axis::Y, 2, 1)]
    #[test_case(Axis::X, 3, 0)]
    #[test_case(Axis::Z, 3, 2)]
    #[test_case(Axis::X, 8, 5 ; "x addresses third-from-last column of an 8-D payload")]
    #[test_case(Axis::Y, 8, 6)]
    #[test_case(Axis::Z, 8, 7)]
    #[test_case(Axis::Z, 4, 3)]
    fn test_column_index(axis: Axis, ndim: usize, expected: usize) {
        assert_eq!(axis.column_index(ndim).unwrap(), expected);
    }

    #[test]
    fn test_out_of_range_axis_is_a_domain_error() {
        assert!(matches!(
            Axis::Z.column_index(2),
            Err(BlockError::AxisOutOfRange { axis: 'z', ndim: 2 })
        ));
        assert!(matches!(
            Axis::Y.column_index(1),
            Err(BlockError::AxisOutOfRange { axis: 'y', ndim: 1 })
        ));
    }

    #[test]
    fn test_parse_axes_preserves_request_order() {
        let forward = parse_axes("xyz").unwrap();
        let reverse = parse_axes("zyx").unwrap();
        assert_eq!(forward, vec![Axis::X, Axis::Y, Axis::Z]);
        assert_eq!(reverse, forward.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_axes_sanitizes_input() {
        assert_eq!(parse_axes(" XY ").unwrap(), vec![Axis::X, Axis::Y]);
    }

    #[test]
    fn test_parse_axes_rejects_unknown_and_empty() {
        assert!(matches!(
            parse_axes("xw"),
            Err(BlockError::UnknownAxis { .. })
        ));
        assert!(matches!(
            parse_axes(""),
            Err(BlockError::UnknownAxis { .. })
        ));
    }
}
