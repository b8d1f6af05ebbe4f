//! Parametric smoothing-spline fitting for filament backbones
//!
//! Fits one natural cubic spline per coordinate axis over a shared
//! chord-length parameter normalized to [0, 1], so a fitted curve can be
//! re-evaluated at any number of uniformly spaced parameter values. A
//! non-zero smoothing parameter pre-smooths the control points with a
//! centered moving average before fitting; the cubic second-derivative
//! system is solved with nalgebra.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use thiserror::Error;

/// Errors raised by spline fitting and evaluation
#[derive(Error, Debug)]
pub enum SplineError {
    /// Fewer than two control points
    #[error("spline fitting requires at least 2 points, got {count}")]
    TooFewPoints { count: usize },

    /// Coordinate axes disagree on point count
    #[error("coordinate arrays must share one length, got {lengths:?}")]
    AxisLength { lengths: Vec<usize> },

    /// Negative or non-finite smoothing parameter
    #[error("smoothing parameter must be a non-negative finite number, got {value}")]
    Smoothing { value: f64 },

    /// No coordinate axes were given
    #[error("spline fitting requires at least one coordinate axis")]
    NoAxes,

    /// The second-derivative system could not be solved
    #[error("spline system is singular")]
    Singular,
}

/// Result type alias for spline operations
pub type SplineResult<T> = Result<T, SplineError>;

/// A fitted parametric spline over a shared parameter in [0, 1]
#[derive(Clone, Debug)]
pub struct SplineFit {
    /// Knot parameters, strictly increasing from 0 to 1
    parameters: Array1<f64>,

    /// One cubic per coordinate axis
    components: Vec<AxisSpline>,

    /// Smoothing parameter the fit was computed with
    smoothing: f64,
}

#[derive(Clone, Debug)]
struct AxisSpline {
    values: Array1<f64>,
    second_derivatives: Array1<f64>,
}

impl SplineFit {
    /// Fit a spline through one coordinate array per axis.
    ///
    /// All arrays must share one length n >= 2. A smoothing parameter of 0
    /// interpolates the points exactly; larger values average each point
    /// with a window of its neighbors before fitting.
    pub fn fit(coordinates: &[Array1<f64>], smoothing: f64) -> SplineResult<Self> {
        if coordinates.is_empty() {
            return Err(SplineError::NoAxes);
        }
        if !smoothing.is_finite() || smoothing < 0.0 {
            return Err(SplineError::Smoothing { value: smoothing });
        }

        let n = coordinates[0].len();
        if coordinates.iter().any(|axis| axis.len() != n) {
            return Err(SplineError::AxisLength {
                lengths: coordinates.iter().map(|axis| axis.len()).collect(),
            });
        }
        if n < 2 {
            return Err(SplineError::TooFewPoints { count: n });
        }

        let smoothed: Vec<Array1<f64>> = coordinates
            .iter()
            .map(|axis| moving_average(axis, smoothing))
            .collect();

        let parameters = chord_length_parameters(&smoothed);
        let components = smoothed
            .into_iter()
            .map(|values| {
                let second_derivatives = natural_cubic_second_derivatives(&parameters, &values)?;
                Ok(AxisSpline {
                    values,
                    second_derivatives,
                })
            })
            .collect::<SplineResult<Vec<_>>>()?;

        Ok(Self {
            parameters,
            components,
            smoothing,
        })
    }

    /// Smoothing parameter used for this fit.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    /// Number of coordinate axes.
    pub fn num_axes(&self) -> usize {
        self.components.len()
    }

    /// Evaluate the curve at a single parameter value, clamped to [0, 1].
    pub fn evaluate(&self, u: f64) -> Vec<f64> {
        let u = u.clamp(0.0, 1.0);
        let knots = &self.parameters;
        // segment index i with u in [knots[i], knots[i + 1]]
        let i = knots
            .iter()
            .position(|&knot| knot > u)
            .unwrap_or(knots.len())
            .saturating_sub(1)
            .min(knots.len() - 2);

        self.components
            .iter()
            .map(|axis| evaluate_segment(knots, axis, i, u))
            .collect()
    }

    /// Sample the curve at `n_points` uniformly spaced parameters in [0, 1].
    ///
    /// Returns an array of shape (num_axes, n_points).
    pub fn sample(&self, n_points: usize) -> Array2<f64> {
        let us = Array1::linspace(0.0, 1.0, n_points);
        let mut out = Array2::<f64>::zeros((self.num_axes(), n_points));
        for (j, &u) in us.iter().enumerate() {
            for (k, value) in self.evaluate(u).into_iter().enumerate() {
                out[[k, j]] = value;
            }
        }
        out
    }
}

/// Centered moving average with edge clamping. The half-window grows with
/// the smoothing parameter; smoothing below 1 leaves the data untouched.
fn moving_average(values: &Array1<f64>, smoothing: f64) -> Array1<f64> {
    let half = smoothing.floor() as usize;
    if half == 0 {
        return values.clone();
    }
    let n = values.len();
    Array1::from_iter((0..n).map(|i| {
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(n - 1);
        let sum: f64 = (lo..=hi).map(|k| values[k]).sum();
        sum / (hi - lo + 1) as f64
    }))
}

/// Cumulative chord-length parameterization normalized to [0, 1]. Falls
/// back to uniform parameters when points coincide (zero-length chords
/// would produce duplicate knots).
fn chord_length_parameters(axes: &[Array1<f64>]) -> Array1<f64> {
    let n = axes[0].len();
    let mut cumulative = vec![0.0; n];
    let mut degenerate = false;
    for i in 1..n {
        let segment: f64 = axes
            .iter()
            .map(|axis| (axis[i] - axis[i - 1]).powi(2))
            .sum::<f64>()
            .sqrt();
        if segment == 0.0 {
            degenerate = true;
            break;
        }
        cumulative[i] = cumulative[i - 1] + segment;
    }

    let total = cumulative[n - 1];
    if degenerate || total == 0.0 {
        return Array1::linspace(0.0, 1.0, n);
    }
    Array1::from_iter(cumulative.into_iter().map(|c| c / total))
}

/// Solve the natural cubic spline second-derivative system M, with
/// M_0 = M_{n-1} = 0, via nalgebra LU.
fn natural_cubic_second_derivatives(
    knots: &Array1<f64>,
    values: &Array1<f64>,
) -> SplineResult<Array1<f64>> {
    let n = knots.len();
    let mut m = Array1::<f64>::zeros(n);
    if n == 2 {
        return Ok(m);
    }

    let h = |i: usize| knots[i + 1] - knots[i];
    let interior = n - 2;
    let mut system = DMatrix::<f64>::zeros(interior, interior);
    let mut rhs = DVector::<f64>::zeros(interior);

    for row in 0..interior {
        let i = row + 1;
        system[(row, row)] = (h(i - 1) + h(i)) / 3.0;
        if row > 0 {
            system[(row, row - 1)] = h(i - 1) / 6.0;
        }
        if row + 1 < interior {
            system[(row, row + 1)] = h(i) / 6.0;
        }
        rhs[row] =
            (values[i + 1] - values[i]) / h(i) - (values[i] - values[i - 1]) / h(i - 1);
    }

    let solution = system.lu().solve(&rhs).ok_or(SplineError::Singular)?;
    for row in 0..interior {
        m[row + 1] = solution[row];
    }
    Ok(m)
}

fn evaluate_segment(knots: &Array1<f64>, axis: &AxisSpline, i: usize, u: f64) -> f64 {
    let h = knots[i + 1] - knots[i];
    let a = knots[i + 1] - u;
    let b = u - knots[i];
    let (y0, y1) = (axis.values[i], axis.values[i + 1]);
    let (m0, m1) = (axis.second_derivatives[i], axis.second_derivatives[i + 1]);

    m0 * a.powi(3) / (6.0 * h)
        + m1 * b.powi(3) / (6.0 * h)
        + (y0 / h - m0 * h / 6.0) * a
        + (y1 / h - m1 * h / 6.0) * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn helix() -> Vec<Array1<f64>> {
        let t = Array1::linspace(0.0, 12.0, 50);
        vec![t.mapv(f64::cos), t.mapv(f64::sin), t.clone()]
    }

    #[test_case(10)]
    #[test_case(100)]
    #[test_case(1000)]
    fn test_sample_shape(n: usize) {
        let fit = SplineFit::fit(&helix(), 0.0).unwrap();
        assert_eq!(fit.sample(n).shape(), &[3, n]);
    }

    #[test]
    fn test_endpoints_interpolated_without_smoothing() {
        let axes = helix();
        let fit = SplineFit::fit(&axes, 0.0).unwrap();

        let start = fit.evaluate(0.0);
        let end = fit.evaluate(1.0);
        for (k, axis) in axes.iter().enumerate() {
            assert!((start[k] - axis[0]).abs() < 1e-9);
            assert!((end[k] - axis[axis.len() - 1]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_collinear_points_stay_on_the_line() {
        let axes = vec![
            Array1::linspace(0.0, 1.0, 5),
            Array1::linspace(0.0, 2.0, 5),
            Array1::linspace(0.0, 3.0, 5),
        ];
        let fit = SplineFit::fit(&axes, 0.0).unwrap();

        let mid = fit.evaluate(0.5);
        assert!((mid[0] - 0.5).abs() < 1e-9);
        assert!((mid[1] - 1.0).abs() < 1e-9);
        assert!((mid[2] - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_evaluation_clamps_parameter() {
        let fit = SplineFit::fit(&helix(), 0.0).unwrap();
        assert_eq!(fit.evaluate(-1.0), fit.evaluate(0.0));
        assert_eq!(fit.evaluate(2.0), fit.evaluate(1.0));
    }

    #[test]
    fn test_smoothing_flattens_a_zigzag() {
        let x = Array1::linspace(0.0, 9.0, 10);
        let y = Array1::from_iter((0..10).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }));
        let rough = SplineFit::fit(&[x.clone(), y.clone()], 0.0).unwrap();
        let smooth = SplineFit::fit(&[x, y], 2.0).unwrap();

        // All chords are equally long, so parameter 4/9 lands exactly on the
        // fifth control point (y = 1) for the unsmoothed fit.
        let u = 4.0 / 9.0;
        let rough_peak = rough.evaluate(u)[1].abs();
        let smooth_peak = smooth.evaluate(u)[1].abs();
        assert!(rough_peak > 0.9);
        assert!(smooth_peak < rough_peak);
        assert_eq!(smooth.smoothing(), 2.0);
    }

    #[test]
    fn test_coincident_points_fall_back_to_uniform_parameters() {
        let axes = vec![
            Array1::from(vec![0.0, 0.0, 1.0]),
            Array1::from(vec![0.0, 0.0, 1.0]),
        ];
        let fit = SplineFit::fit(&axes, 0.0).unwrap();
        assert_eq!(fit.sample(10).shape(), &[2, 10]);
    }

    #[test]
    fn test_too_few_points() {
        let axes = vec![Array1::from(vec![1.0])];
        assert!(matches!(
            SplineFit::fit(&axes, 0.0),
            Err(SplineError::TooFewPoints { count: 1 })
        ));
    }

    #[test]
    fn test_mismatched_axis_lengths() {
        let axes = vec![Array1::from(vec![1.0, 2.0]), Array1::from(vec![1.0])];
        assert!(matches!(
            SplineFit::fit(&axes, 0.0),
            Err(SplineError::AxisLength { .. })
        ));
    }

    #[test]
    fn test_negative_smoothing() {
        let axes = vec![Array1::from(vec![1.0, 2.0])];
        assert!(matches!(
            SplineFit::fit(&axes, -1.0),
            Err(SplineError::Smoothing { .. })
        ));
    }

    #[test]
    fn test_no_axes() {
        assert!(matches!(
            SplineFit::fit(&[], 0.0),
            Err(SplineError::NoAxes)
        ));
    }
}
