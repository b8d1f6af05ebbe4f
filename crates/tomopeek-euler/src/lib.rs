//! Batch Euler-angle to rotation-matrix conversion
//!
//! Cryo-ET metadata formats (RELION, Dynamo) describe particle orientations
//! as Euler angle triples under format-specific conventions. This crate
//! converts (n, 3) angle batches in degrees into (n, 3, 3) rotation-matrix
//! batches, parameterized by axis order, intrinsic/extrinsic frame, and
//! rotation-sign convention.
//!
//! The produced matrices R satisfy `R v = v'` for column vectors `v`.

use nalgebra::{Rotation3, Unit, Vector3};
use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by Euler-angle conversion
#[derive(Error, Debug)]
pub enum EulerError {
    /// Angle batch is not (n, 3)
    #[error("euler angles must have shape (n, 3), got {shape:?}")]
    AngleShape { shape: Vec<usize> },

    /// Axis-order string is not three characters from 'x', 'y', 'z'
    #[error("axis order must be three characters from 'x', 'y' and 'z', got '{axes}'")]
    AxisOrder { axes: String },
}

/// Result type alias for Euler-angle conversion
pub type EulerResult<T> = Result<T, EulerError>;

/// A rotation axis named in an Euler axis-order string
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EulerAxis {
    X,
    Y,
    Z,
}

impl EulerAxis {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'x' => Some(EulerAxis::X),
            'y' => Some(EulerAxis::Y),
            'z' => Some(EulerAxis::Z),
            _ => None,
        }
    }

    fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            EulerAxis::X => Vector3::x_axis(),
            EulerAxis::Y => Vector3::y_axis(),
            EulerAxis::Z => Vector3::z_axis(),
        }
    }
}

/// Convention under which a set of Euler angles is interpreted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulerConvention {
    /// Rotation axes, in application order
    pub axes: [EulerAxis; 3],

    /// Intrinsic (rotating reference frame) or extrinsic (fixed frame)
    pub intrinsic: bool,

    /// Positive angles rotate vectors counterclockwise when looking from a
    /// positive point along the axis towards the origin
    pub positive_ccw: bool,
}

impl EulerConvention {
    /// Parse a convention from an axis-order string such as `"zxz"`.
    pub fn new(axes: &str, intrinsic: bool, positive_ccw: bool) -> EulerResult<Self> {
        let cleaned = axes.trim().to_lowercase();
        let parsed: Vec<EulerAxis> = cleaned.chars().filter_map(EulerAxis::from_char).collect();
        if cleaned.chars().count() != 3 || parsed.len() != 3 {
            return Err(EulerError::AxisOrder {
                axes: axes.to_string(),
            });
        }
        Ok(Self {
            axes: [parsed[0], parsed[1], parsed[2]],
            intrinsic,
            positive_ccw,
        })
    }
}

/// Convert a batch of Euler-angle triples in degrees into rotation matrices.
///
/// Returns an (n, 3, 3) batch of matrices R with `R v = v'` for column
/// vectors `v`.
pub fn euler_to_matrices(
    angles: &Array2<f64>,
    convention: &EulerConvention,
) -> EulerResult<Array3<f64>> {
    if angles.ncols() != 3 {
        return Err(EulerError::AngleShape {
            shape: angles.shape().to_vec(),
        });
    }

    let n = angles.nrows();
    let mut matrices = Array3::<f64>::zeros((n, 3, 3));
    for (i, row) in angles.outer_iter().enumerate() {
        let rotation = single_matrix([row[0], row[1], row[2]], convention);
        let m = rotation.matrix();
        for j in 0..3 {
            for k in 0..3 {
                matrices[[i, j, k]] = m[(j, k)];
            }
        }
    }
    Ok(matrices)
}

fn single_matrix(degrees: [f64; 3], convention: &EulerConvention) -> Rotation3<f64> {
    let sign = if convention.positive_ccw { 1.0 } else { -1.0 };
    let rotations: Vec<Rotation3<f64>> = degrees
        .iter()
        .zip(convention.axes)
        .map(|(&deg, axis)| Rotation3::from_axis_angle(&axis.unit(), sign * deg.to_radians()))
        .collect();

    // Intrinsic rotations compose right-to-left onto the moving frame;
    // extrinsic rotations apply in order within the fixed frame.
    if convention.intrinsic {
        rotations[0] * rotations[1] * rotations[2]
    } else {
        rotations[2] * rotations[1] * rotations[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use test_case::test_case;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_identity_angles_give_identity_matrices() {
        let convention = EulerConvention::new("zxz", true, true).unwrap();
        let angles = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
        let matrices = euler_to_matrices(&angles, &convention).unwrap();

        assert_eq!(matrices.shape(), &[2, 3, 3]);
        for i in 0..2 {
            for j in 0..3 {
                for k in 0..3 {
                    let expected = if j == k { 1.0 } else { 0.0 };
                    assert_close(matrices[[i, j, k]], expected);
                }
            }
        }
    }

    #[test]
    fn test_ccw_z_rotation_maps_x_to_y() {
        let convention = EulerConvention::new("zyz", true, true).unwrap();
        let angles = array![[90.0, 0.0, 0.0]];
        let matrices = euler_to_matrices(&angles, &convention).unwrap();

        // R x-hat = y-hat for a 90 degree counterclockwise z rotation
        assert_close(matrices[[0, 0, 0]], 0.0);
        assert_close(matrices[[0, 1, 0]], 1.0);
        assert_close(matrices[[0, 2, 0]], 0.0);
    }

    #[test]
    fn test_clockwise_convention_negates_rotation() {
        let ccw = EulerConvention::new("zyz", true, true).unwrap();
        let cw = EulerConvention::new("zyz", true, false).unwrap();
        let angles = array![[90.0, 0.0, 0.0]];

        let forward = euler_to_matrices(&angles, &ccw).unwrap();
        let backward = euler_to_matrices(&angles, &cw).unwrap();

        // Clockwise 90 degrees equals counterclockwise -90 degrees, which is
        // the transpose of the counterclockwise matrix.
        for j in 0..3 {
            for k in 0..3 {
                assert_close(forward[[0, j, k]], backward[[0, k, j]]);
            }
        }
    }

    #[test]
    fn test_single_axis_intrinsic_equals_extrinsic() {
        let intrinsic = EulerConvention::new("zzz", true, true).unwrap();
        let extrinsic = EulerConvention::new("zzz", false, true).unwrap();
        let angles = array![[10.0, 20.0, 30.0]];

        let a = euler_to_matrices(&angles, &intrinsic).unwrap();
        let b = euler_to_matrices(&angles, &extrinsic).unwrap();
        for j in 0..3 {
            for k in 0..3 {
                assert_close(a[[0, j, k]], b[[0, j, k]]);
            }
        }
    }

    #[test]
    fn test_bad_angle_shape() {
        let convention = EulerConvention::new("zxz", true, true).unwrap();
        let angles = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(matches!(
            euler_to_matrices(&angles, &convention),
            Err(EulerError::AngleShape { .. })
        ));
    }

    #[test_case("xy" ; "too short")]
    #[test_case("zxzx" ; "too long")]
    #[test_case("zxw" ; "unknown axis")]
    #[test_case("" ; "empty")]
    fn test_bad_axis_order(axes: &str) {
        assert!(matches!(
            EulerConvention::new(axes, true, true),
            Err(EulerError::AxisOrder { .. })
        ));
    }

    #[test]
    fn test_axis_order_parsing_is_case_insensitive() {
        let convention = EulerConvention::new(" ZxZ ", false, true).unwrap();
        assert_eq!(
            convention.axes,
            [EulerAxis::Z, EulerAxis::X, EulerAxis::Z]
        );
    }
}
