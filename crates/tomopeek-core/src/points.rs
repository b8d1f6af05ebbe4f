//! Point sets
//!
//! A [`PointBlock`] wraps an (n, m) payload of n points in m spatial
//! dimensions. Spatial columns are ordered (x, y) in 2-D, (x, y, z) in 3-D
//! and (..., x, y, z) beyond that. The payload helpers live here as free
//! functions so the line variant shares them without an inheritance chain.

use ndarray::{Array1, Array2, ArrayD, Axis as NdAxis, Ix2};

use crate::axis::{parse_axes, Axis};
use crate::block::{Block, BlockCore};
use crate::combine::{concat_entities, ensure_nonempty, stack_points, Merge, Stack};
use crate::error::{BlockError, BlockResult, CombineResult};

/// Validate a raw points payload: a 1-D point promotes to (1, m); any rank
/// other than 2 after promotion is rejected.
pub(crate) fn validate_points(raw: ArrayD<f64>) -> BlockResult<Array2<f64>> {
    let shape = raw.shape().to_vec();
    let raw = if raw.ndim() == 1 {
        raw.insert_axis(NdAxis(0))
    } else {
        raw
    };
    raw.into_dimensionality::<Ix2>()
        .map_err(|_| BlockError::PointShape { shape })
}

pub(crate) fn axis_column(data: &Array2<f64>, axis: Axis) -> BlockResult<Array1<f64>> {
    let index = axis.column_index(data.ncols())?;
    Ok(data.column(index).to_owned())
}

pub(crate) fn named_columns(data: &Array2<f64>, axes: &str) -> BlockResult<Vec<Array1<f64>>> {
    parse_axes(axes)?
        .into_iter()
        .map(|axis| axis_column(data, axis))
        .collect()
}

pub(crate) fn named_columns_stacked(data: &Array2<f64>, axes: &str) -> BlockResult<Array2<f64>> {
    let columns = named_columns(data, axes)?;
    let mut out = Array2::zeros((data.nrows(), columns.len()));
    for (j, column) in columns.iter().enumerate() {
        out.column_mut(j).assign(column);
    }
    Ok(out)
}

pub(crate) fn center_of_mass(data: &Array2<f64>) -> BlockResult<Array1<f64>> {
    data.mean_axis(NdAxis(0)).ok_or(BlockError::EmptyPayload)
}

pub(crate) fn distance_to(data: &Array2<f64>, point: &Array1<f64>) -> BlockResult<f64> {
    let com = center_of_mass(data)?;
    if point.len() != com.len() {
        return Err(BlockError::ShapeMismatch {
            expected: vec![com.len()],
            actual: vec![point.len()],
        });
    }
    Ok((point - &com).mapv(|v| v * v).sum().sqrt())
}

pub(crate) fn check_row(data: &Array2<f64>, index: usize, values: &Array1<f64>) -> BlockResult<()> {
    if index >= data.nrows() {
        return Err(BlockError::IndexOutOfRange {
            index,
            len: data.nrows(),
        });
    }
    if values.len() != data.ncols() {
        return Err(BlockError::ShapeMismatch {
            expected: vec![data.ncols()],
            actual: vec![values.len()],
        });
    }
    Ok(())
}

/// An ordered set of n points in m spatial dimensions
#[derive(Debug)]
pub struct PointBlock {
    core: BlockCore,
    data: Array2<f64>,
}

impl PointBlock {
    pub fn new(points: ArrayD<f64>) -> BlockResult<Self> {
        Ok(Self {
            core: BlockCore::unnamed(),
            data: validate_points(points)?,
        })
    }

    pub fn with_name(points: ArrayD<f64>, name: impl Into<String>) -> BlockResult<Self> {
        let mut block = Self::new(points)?;
        block.core.set_name(name);
        Ok(block)
    }

    /// Construct from nested numeric rows; all rows must share one length.
    pub fn from_rows(rows: &[Vec<f64>]) -> BlockResult<Self> {
        let n = rows.len();
        let m = rows.first().map(|row| row.len()).unwrap_or(0);
        if rows.iter().any(|row| row.len() != m) {
            return Err(BlockError::PointShape { shape: vec![n, m] });
        }
        let mut data = Array2::zeros((n, m));
        for (i, row) in rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                data[[i, j]] = value;
            }
        }
        Ok(Self {
            core: BlockCore::unnamed(),
            data,
        })
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Replace the payload through the validator and notify the consumer.
    pub fn set_data(&mut self, points: ArrayD<f64>) -> BlockResult<()> {
        self.data = validate_points(points)?;
        self.core.notify();
        Ok(())
    }

    /// Copy another point block's payload without re-validating.
    pub fn set_data_from(&mut self, other: &PointBlock) {
        self.data = other.data.clone();
        self.core.notify();
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ndim_spatial(&self) -> usize {
        self.data.ncols()
    }

    /// Data along named axes, column-stacked in the requested order.
    pub fn named_dimension(&self, axes: &str) -> BlockResult<Array2<f64>> {
        named_columns_stacked(&self.data, axes)
    }

    /// Data along named axes as one 1-D array per axis, in request order.
    pub fn named_dimension_split(&self, axes: &str) -> BlockResult<Vec<Array1<f64>>> {
        named_columns(&self.data, axes)
    }

    pub fn x(&self) -> BlockResult<Array1<f64>> {
        axis_column(&self.data, Axis::X)
    }

    pub fn y(&self) -> BlockResult<Array1<f64>> {
        axis_column(&self.data, Axis::Y)
    }

    pub fn z(&self) -> BlockResult<Array1<f64>> {
        axis_column(&self.data, Axis::Z)
    }

    pub fn xyz(&self) -> BlockResult<Array2<f64>> {
        self.named_dimension("xyz")
    }

    /// Positions in reversed axis order, as viewers with (z, y, x) layout
    /// consume them.
    pub fn zyx(&self) -> BlockResult<Array2<f64>> {
        self.named_dimension("zyx")
    }

    pub fn center_of_mass(&self) -> BlockResult<Array1<f64>> {
        center_of_mass(&self.data)
    }

    /// Euclidean distance between the center of mass and a point.
    pub fn distance_to(&self, point: &Array1<f64>) -> BlockResult<f64> {
        distance_to(&self.data, point)
    }

    /// A like-typed, fresh-identity block wrapping one entity.
    pub fn select(&self, index: usize) -> BlockResult<PointBlock> {
        if index >= self.len() {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let row = self.data.row(index).to_owned();
        PointBlock::new(row.into_dyn())
    }

    /// Overwrite one point in place and notify the consumer.
    pub fn set_row(&mut self, index: usize, values: &Array1<f64>) -> BlockResult<()> {
        check_row(&self.data, index, values)?;
        self.data.row_mut(index).assign(values);
        self.core.notify();
        Ok(())
    }
}

impl Block for PointBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

impl Merge for PointBlock {
    fn merge(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "merge")?;
        let payloads: Vec<_> = blocks.iter().map(|block| &block.data).collect();
        let merged = concat_entities(&payloads)?;
        Ok(PointBlock::new(merged.into_dyn())?)
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

impl Stack for PointBlock {
    fn stack(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "stack")?;
        let payloads: Vec<_> = blocks.iter().map(|block| &block.data).collect();
        let stacked = stack_points(&payloads);
        Ok(PointBlock::new(stacked.into_dyn())?)
    }

    fn stack_with(&mut self, others: &[&Self]) -> CombineResult<()> {
        ensure_nonempty(others, "stack")?;
        let mut payloads = vec![&self.data];
        payloads.extend(others.iter().map(|block| &block.data));
        let stacked = stack_points(&payloads);
        self.set_data(stacked.into_dyn())?;
        Ok(())
    }
}
