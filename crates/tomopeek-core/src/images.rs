//! Volumetric images
//!
//! An [`ImageBlock`] wraps an n-dimensional payload (tomogram, projection,
//! or a stack of either) together with its declared spatial rank and the
//! physical pixel size in the source data. Payloads may be deferred and are
//! validated when they materialize.

use ndarray::ArrayD;

use crate::block::{Block, BlockCore};
use crate::combine::{ensure_nonempty, stack_images, Stack};
use crate::error::{BlockError, BlockResult, CombineResult};
use crate::lazy::LazyArray;

fn validate_pixel_size(value: f64) -> BlockResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(BlockError::PixelSize { value })
    }
}

fn validate_rank(ndim: usize, ndim_spatial: usize) -> BlockResult<()> {
    if ndim_spatial > ndim {
        return Err(BlockError::SpatialRank { ndim_spatial, ndim });
    }
    Ok(())
}

/// An n-dimensional image with declared spatial rank and pixel size
#[derive(Debug)]
pub struct ImageBlock {
    core: BlockCore,
    data: LazyArray,
    ndim_spatial: usize,
    pixel_size: f64,
}

impl ImageBlock {
    pub fn new(data: ArrayD<f64>, ndim_spatial: usize, pixel_size: f64) -> BlockResult<Self> {
        validate_rank(data.ndim(), ndim_spatial)?;
        Ok(Self {
            core: BlockCore::unnamed(),
            data: LazyArray::Eager(data),
            ndim_spatial,
            pixel_size: validate_pixel_size(pixel_size)?,
        })
    }

    pub fn with_name(
        data: ArrayD<f64>,
        ndim_spatial: usize,
        pixel_size: f64,
        name: impl Into<String>,
    ) -> BlockResult<Self> {
        let mut block = Self::new(data, ndim_spatial, pixel_size)?;
        block.core.set_name(name);
        Ok(block)
    }

    /// Wrap a loader invoked on first access; the rank contract is checked
    /// when the payload materializes.
    pub fn deferred(
        loader: impl Fn() -> ArrayD<f64> + 'static,
        ndim_spatial: usize,
        pixel_size: f64,
    ) -> BlockResult<Self> {
        Ok(Self {
            core: BlockCore::unnamed(),
            data: LazyArray::deferred(loader),
            ndim_spatial,
            pixel_size: validate_pixel_size(pixel_size)?,
        })
    }

    /// The payload, materializing a deferred loader on first call.
    pub fn data(&mut self) -> BlockResult<&ArrayD<f64>> {
        let ndim_spatial = self.ndim_spatial;
        let data = self.data.resolve();
        validate_rank(data.ndim(), ndim_spatial)?;
        Ok(data)
    }

    /// The payload, if already materialized.
    pub fn peek(&self) -> Option<&ArrayD<f64>> {
        self.data.peek()
    }

    pub fn is_resolved(&self) -> bool {
        self.data.is_resolved()
    }

    /// Replace the payload and notify the consumer.
    pub fn set_data(&mut self, data: ArrayD<f64>) -> BlockResult<()> {
        validate_rank(data.ndim(), self.ndim_spatial)?;
        self.data = LazyArray::Eager(data);
        self.core.notify();
        Ok(())
    }

    /// Copy another image block's payload and metadata, materializing the
    /// source if needed.
    pub fn set_data_from(&mut self, other: &mut ImageBlock) -> BlockResult<()> {
        let data = other.data()?.clone();
        self.ndim_spatial = other.ndim_spatial;
        self.pixel_size = other.pixel_size;
        self.data = LazyArray::Eager(data);
        self.core.notify();
        Ok(())
    }

    pub fn ndim_spatial(&self) -> usize {
        self.ndim_spatial
    }

    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn set_pixel_size(&mut self, value: f64) -> BlockResult<()> {
        self.pixel_size = validate_pixel_size(value)?;
        Ok(())
    }
}

impl Block for ImageBlock {
    fn core(&self) -> &BlockCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut BlockCore {
        &mut self.core
    }
}

fn materialized(blocks: &[&ImageBlock]) -> CombineResult<Vec<ArrayD<f64>>> {
    blocks
        .iter()
        .map(|block| {
            block
                .peek()
                .cloned()
                .ok_or_else(|| BlockError::UnresolvedPayload.into())
        })
        .collect()
}

impl Stack for ImageBlock {
    /// Stack images under a new leading axis; every operand must already be
    /// materialized.
    fn stack(blocks: &[&Self]) -> CombineResult<Self> {
        ensure_nonempty(blocks, "stack")?;
        let payloads = materialized(blocks)?;
        let views: Vec<_> = payloads.iter().collect();
        let stacked = stack_images(&views)?;

        let ndim_spatial = blocks
            .iter()
            .map(|block| block.ndim_spatial)
            .max()
            .unwrap_or(0);
        Ok(ImageBlock::new(stacked, ndim_spatial, blocks[0].pixel_size)?)
    }

    fn stack_with(&mut self, others: &[&Self]) -> CombineResult<()> {
        ensure_nonempty(others, "stack")?;
        let own = self.data()?.clone();
        let mut payloads = vec![own];
        payloads.extend(materialized(others)?);
        let views: Vec<_> = payloads.iter().collect();
        let stacked = stack_images(&views)?;

        self.ndim_spatial = others
            .iter()
            .map(|block| block.ndim_spatial)
            .fold(self.ndim_spatial, usize::max);
        self.data = LazyArray::Eager(stacked);
        self.core.notify();
        Ok(())
    }
}
