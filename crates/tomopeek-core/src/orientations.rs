//! Particle orientations
//!
//! An [`OrientationBlock`] wraps an (n, d, d) batch of rotation matrices,
//! d of 2 or 3, satisfying `R v = v'` for column vectors `v`. Batches are
//! constructed directly or from Euler-angle metadata via
//! [`OrientationBlock::from_euler_angles`].

use ndarray::{Array1, Array2, Array3, ArrayD, Axis as NdAxis, Ix3};
use tomopeek_euler::{euler_to_matrices, EulerConvention};

use crate::axis::Axis;
use crate::block::{Block, BlockCore};
use crate::combine::{concat_entities, ensure_nonempty, Merge};
use crate::error::{BlockError, BlockResult, CombineResult};

/// Validate a raw rotation payload: a single (d, d) matrix promotes to
/// (1, d, d); matrices must be square with d of 2 or 3.
fn validate_matrices(raw: ArrayD<f64>) -> BlockResult<Array3<f64>> {
    let shape = raw.shape().to_vec();
    let raw = if raw.ndim() == 2 {
        raw.insert_axis(NdAxis(0))
    } else {
        raw
    };
    let data = raw
        .into_dimensionality::<Ix3>()
        .map_err(|_| BlockError::MatrixShape {
            shape: shape.clone(),
        })?;

    let d = data.shape()[1];
    if data.shape()[2] != d || !(2..=3).contains(&d) {
        return Err(BlockError::MatrixShape { shape });
    }
    Ok(data)
}

/// A batch of rotation matrices in 2-D or 3-D space
#[derive(Debug)]
pub struct OrientationBlock {
    core: BlockCore,
    data: Array3<f64>,
}

impl OrientationBlock {
    pub fn new(rotation_matrices: ArrayD<f64>) -> BlockResult<Self> {
        Ok(Self {
            core: BlockCore::unnamed(),
            data: validate_matrices(rotation_matrices)?,
        })
    }

    pub fn with_name(rotation_matrices: ArrayD<f64>, name: impl Into<String>) -> BlockResult<Self> {
        let mut block = Self::new(rotation_matrices)?;
        block.core.set_name(name);
        Ok(block)
    }

    /// Build a batch from (n, 3) Euler-angle triples in degrees.
    ///
    /// `invert_matrix` transposes each result, for metadata that describes
    /// the rotation of a target onto a source rather than the other way
    /// around.
    pub fn from_euler_angles(
        euler_angles: &Array2<f64>,
        axes: &str,
        intrinsic: bool,
        positive_ccw: bool,
        invert_matrix: bool,
    ) -> BlockResult<Self> {
        let convention = EulerConvention::new(axes, intrinsic, positive_ccw)?;
        let matrices = euler_to_matrices(euler_angles, &convention)?;
        let matrices = if invert_matrix {
            matrices.permuted_axes([0, 2, 1]).as_standard_layout().to_owned()
        } else {
            matrices
        };
        Self::new(matrices.into_dyn())
    }

    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Replace the payload through the validator and notify the consumer.
    pub fn set_data(&mut self, rotation_matrices: ArrayD<f64>) -> BlockResult<()> {
        self.data = validate_matrices(rotation_matrices)?;
        self.core.notify();
        Ok(())
    }

    /// Copy another orientation block's payload without re-validating.
    pub fn set_data_from(&mut self, other: &OrientationBlock) {
        self.data = other.data.clone();
        self.core.notify();
    }

    pub fn len(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ndim_spatial(&self) -> usize {
        self.data.shape()[1]
    }

    /// The canonical unit vector along a named axis, sized to this block's
    /// spatial dimensionality. Asking for an axis the block does not span is
    /// a domain error.
    fn basis_vector(&self, axis: Axis) -> BlockResult<Array1<f64>> {
        let d = self.ndim_spatial();
        let index = axis.column_index(d)?;
        let mut unit = Array1::zeros(d);
        unit[index] = 1.0;
        Ok(unit)
    }

    /// Premultiply a column vector by every matrix in the batch: rows of the
    /// result are R_i v.
    fn rotate_vector(&self, vector: &Array1<f64>) -> BlockResult<Array2<f64>> {
        let d = self.ndim_spatial();
        if vector.len() != d {
            return Err(BlockError::ShapeMismatch {
                expected: vec![d],
                actual: vec![vector.len()],
            });
        }
        let mut out = Array2::zeros((self.len(), d));
        for (i, matrix) in self.data.outer_iter().enumerate() {
            out.row_mut(i).assign(&matrix.dot(vector));
        }
        Ok(out)
    }

    /// The named basis axis rotated by each matrix, shape (n, d). This is
    /// what a viewer renders as per-particle projection vectors.
    pub fn oriented_vectors(&self, axis: Axis) -> BlockResult<Array2<f64>> {
        let unit = self.basis_vector(axis)?;
        self.rotate_vector(&unit)
    }

    /// A like-typed, fresh-identity block wrapping one matrix.
    pub fn select(&self, index: usize) -> BlockResult<OrientationBlock> {
        if index >= self.len() {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let matrix = self.data.index_axis(NdAxis(0), index).to_owned();
        OrientationBlock::new(matrix.into_dyn())
    }

    /// Overwrite one matrix in place and notify the consumer.
    pub fn set_matrix(&mut self, index: usize, matrix: &Array2<f64>) -> BlockResult<()> {
        if index >= self.len() {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let d = self.ndim_spatial();
        if matrix.shape() != &[d, d] {
            return Err(BlockError::ShapeMismatch {
                expected: vec![d, d],
                actual: matrix.shape().to_vec(),
            });
        }
        self.data.index_axis_mut(NdAxis(0), index).assign(matrix);
        self.core.notify();
        Ok(())
    }
}

impl Block for OrientationBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

impl Merge for OrientationBlock {
    fn merge(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "merge")?;
        let payloads: Vec<_> = blocks.iter().map(|block| &block.data).collect();
        let merged = concat_entities(&payloads)?;
        Ok(OrientationBlock::new(merged.into_dyn())?)
    }

    fn merge_with(&mut self, others: &[&Self]) -> CombineResult<()> {
        ensure_nonempty(others, "merge")?;
        let mut payloads = vec![&self.data];
        payloads.extend(others.iter().map(|block| &block.data));
        let merged = concat_entities(&payloads)?;
        self.set_data(merged.into_dyn())?;
        Ok(())
    }
}
