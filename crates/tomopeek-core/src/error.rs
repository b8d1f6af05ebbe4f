//! Error types for tomopeek-core
//!
//! Two deliberately distinct failure channels:
//! - [`BlockError`]: raised domain errors for caller mistakes at the call
//!   boundary (malformed shapes, unknown axes, bad parameters).
//! - [`CombineError`]: outcomes of the merge/stack/concat algebra. Its
//!   `Unsupported` variant is a sentinel, not a defect: it tells the caller
//!   a composition route is undefined so an alternative can be attempted.

use thiserror::Error;

/// Raised domain errors for block construction and mutation
#[derive(Error, Debug)]
pub enum BlockError {
    /// Points payload is neither a single point nor an (n, m) array
    #[error("points payload must be a single point or an (n, m) array, got shape {shape:?}")]
    PointShape { shape: Vec<usize> },

    /// Rotation batch is not (n, d, d) with d of 2 or 3
    #[error("rotation matrices must have shape (n, d, d) with d of 2 or 3, got {shape:?}")]
    MatrixShape { shape: Vec<usize> },

    /// Axis name outside {x, y, z}
    #[error("unknown axis name '{name}'")]
    UnknownAxis { name: String },

    /// Named axis does not exist at this dimensionality
    #[error("axis '{axis}' is out of range for {ndim} spatial dimension(s)")]
    AxisOutOfRange { axis: char, ndim: usize },

    /// Shape disagreement between an operand and the block's contract
    #[error("shape {actual:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Operation requires a non-empty payload
    #[error("operation requires at least one entity in the block")]
    EmptyPayload,

    /// Entity index outside the payload
    #[error("index {index} is out of range for {len} entities")]
    IndexOutOfRange { index: usize, len: usize },

    /// Spline evaluation requested before any fit
    #[error("no cached spline fit; call fit_spline first")]
    NoSplineFit,

    /// Pixel size must be strictly positive
    #[error("pixel size must be a positive number, got {value}")]
    PixelSize { value: f64 },

    /// Declared spatial rank exceeds the payload rank
    #[error("declared spatial rank {ndim_spatial} exceeds payload rank {ndim}")]
    SpatialRank { ndim_spatial: usize, ndim: usize },

    /// Deferred image payload used where materialized data is required
    #[error("image payload is not materialized; resolve it first")]
    UnresolvedPayload,

    /// Sphere center input does not reduce to three components
    #[error("a sphere center must reduce to exactly 3 components, got {len}")]
    CenterLength { len: usize },

    /// Sphere radius must be a non-negative finite number
    #[error("sphere radius must be a non-negative number, got {value}")]
    Radius { value: f64 },

    /// Property columns disagree on entity count
    #[error("property columns must share one length, got {lengths:?}")]
    PropertyLength { lengths: Vec<usize> },

    /// Property name not present in the table
    #[error("unknown property '{name}'")]
    UnknownProperty { name: String },

    /// Particle children disagree on entity count
    #[error("particle children disagree on entity count: {counts:?}")]
    ParticleCount { counts: Vec<usize> },

    /// Euler-angle conversion failure
    #[error(transparent)]
    Euler(#[from] tomopeek_euler::EulerError),

    /// Spline fitting failure
    #[error(transparent)]
    Spline(#[from] tomopeek_spline::SplineError),
}

/// Result type alias for block operations
pub type BlockResult<T> = Result<T, BlockError>;

/// Outcomes of merge/stack/concat composition
#[derive(Error, Debug)]
pub enum CombineError {
    /// The composition route is undefined for these operand kinds.
    ///
    /// This is the sentinel outcome of the algebra, surfaced so a caller can
    /// try an alternative combination strategy; it never indicates corrupted
    /// state.
    #[error("cannot {op} {lhs} with {rhs}")]
    Unsupported {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// Composition over an empty operand set
    #[error("cannot {op} zero blocks")]
    Empty { op: &'static str },

    /// Operands are structurally misaligned (multiblock children, property keys)
    #[error("operands are structurally misaligned: {reason}")]
    Misaligned { reason: String },

    /// A domain error surfaced while composing payloads
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Result type alias for composition operations
pub type CombineResult<T> = Result<T, CombineError>;
