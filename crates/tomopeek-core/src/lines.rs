//! Lines and filaments
//!
//! A [`LineBlock`] carries the same (n, m) payload contract as a point set,
//! with the rows understood as an ordered, directed polyline (filaments run
//! from row 0 to row n-1). It additionally owns a lazily computed spline
//! fit, invalidated whenever the underlying points change.

use ndarray::{Array1, Array2, ArrayD};
use tomopeek_spline::SplineFit;

use crate::axis::Axis;
use crate::block::{Block, BlockCore};
use crate::combine::{concat_entities, ensure_nonempty, stack_points, Merge, Stack};
use crate::error::{BlockError, BlockResult, CombineResult};
use crate::points::{
    axis_column, center_of_mass, check_row, distance_to, named_columns, named_columns_stacked,
    validate_points,
};

/// Number of samples taken for the default smoothed backbone
const BACKBONE_SAMPLES: usize = 1000;

/// An ordered polyline in m spatial dimensions with a cached spline fit
#[derive(Debug)]
pub struct LineBlock {
    core: BlockCore,
    data: Array2<f64>,
    smoothing: f64,
    fit: Option<SplineFit>,
}

impl LineBlock {
    pub fn new(line: ArrayD<f64>) -> BlockResult<Self> {
        Ok(Self {
            core: BlockCore::unnamed(),
            data: validate_points(line)?,
            smoothing: 0.0,
            fit: None,
        })
    }

    pub fn with_name(line: ArrayD<f64>, name: impl Into<String>) -> BlockResult<Self> {
        let mut block = Self::new(line)?;
        block.core.set_name(name);
        Ok(block)
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Replace the payload through the validator; drops any cached fit and
    /// notifies the consumer.
    pub fn set_data(&mut self, line: ArrayD<f64>) -> BlockResult<()> {
        self.data = validate_points(line)?;
        self.fit = None;
        self.core.notify();
        Ok(())
    }

    /// Copy another line block's payload without re-validating.
    pub fn set_data_from(&mut self, other: &LineBlock) {
        self.data = other.data.clone();
        self.fit = None;
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

    pub fn named_dimension(&self, axes: &str) -> BlockResult<Array2<f64>> {
        named_columns_stacked(&self.data, axes)
    }

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

    pub fn center_of_mass(&self) -> BlockResult<Array1<f64>> {
        center_of_mass(&self.data)
    }

    pub fn distance_to(&self, point: &Array1<f64>) -> BlockResult<f64> {
        distance_to(&self.data, point)
    }

    /// A like-typed, fresh-identity block wrapping one vertex.
    pub fn select(&self, index: usize) -> BlockResult<LineBlock> {
        if index >= self.len() {
            return Err(BlockError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        LineBlock::new(self.data.row(index).to_owned().into_dyn())
    }

    /// Move one vertex in place; drops any cached fit and notifies.
    pub fn set_row(&mut self, index: usize, values: &Array1<f64>) -> BlockResult<()> {
        check_row(&self.data, index, values)?;
        self.data.row_mut(index).assign(values);
        self.fit = None;
        self.core.notify();
        Ok(())
    }

    /// Smoothing parameter used by the next fit.
    pub fn smoothing(&self) -> f64 {
        self.smoothing
    }

    pub fn set_smoothing(&mut self, value: f64) {
        self.smoothing = value;
    }

    /// Fit a smoothing spline through the named-axis projection of the
    /// vertices and cache the fitted parameters.
    pub fn fit_spline(&mut self, axes: &str, smoothing: Option<f64>) -> BlockResult<&SplineFit> {
        if let Some(value) = smoothing {
            self.smoothing = value;
        }
        let coordinates = named_columns(&self.data, axes)?;
        let fit = SplineFit::fit(&coordinates, self.smoothing)?;
        Ok(&*self.fit.insert(fit))
    }

    /// Sample the cached fit at `n_points` uniformly spaced parameter values
    /// in [0, 1]. Evaluating before any fit is a domain error.
    pub fn evaluate_spline(&self, n_points: usize) -> BlockResult<Array2<f64>> {
        let fit = self.fit.as_ref().ok_or(BlockError::NoSplineFit)?;
        Ok(fit.sample(n_points))
    }

    /// Smoothed curve through all spatial axes at the current smoothing
    /// parameter, recomputed on every call.
    pub fn smooth_backbone(&mut self) -> BlockResult<Array2<f64>> {
        let axes = match self.ndim_spatial().min(3) {
            0 | 1 => "x",
            2 => "xy",
            _ => "xyz",
        };
        self.fit_spline(axes, None)?;
        self.evaluate_spline(BACKBONE_SAMPLES)
    }
}

impl Block for LineBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

impl Merge for LineBlock {
    fn merge(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "merge")?;
        let payloads: Vec<_> = blocks.iter().map(|block| &block.data).collect();
        let merged = concat_entities(&payloads)?;
        Ok(LineBlock::new(merged.into_dyn())?)
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

impl Stack for LineBlock {
    fn stack(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "stack")?;
        let payloads: Vec<_> = blocks.iter().map(|block| &block.data).collect();
        Ok(LineBlock::new(stack_points(&payloads).into_dyn())?)
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
