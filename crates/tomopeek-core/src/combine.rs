//! Merge/stack composition algebra
//!
//! Every block variant that supports composition implements [`Merge`]
//! and/or [`Stack`], each in a copying form (fresh identity) and an in-place
//! form (self keeps its name and consumer, and notifies). Variants without a
//! primitive simply do not implement it; the heterogeneous dispatch layer in
//! [`crate::collection`] turns that absence into the sentinel
//! [`CombineError::Unsupported`] outcome.

use ndarray::{concatenate, s, Array, Array2, ArrayD, Axis as NdAxis, Dimension, IxDyn, RemoveAxis, SliceInfoElem};

use crate::error::{BlockError, CombineError, CombineResult};

/// Concatenation along the entity axis
pub trait Merge: Sized {
    /// Merge blocks into one fresh-identity block; payload order follows
    /// input order.
    fn merge(blocks: &[&Self]) -> CombineResult<Self>;

    /// Extend self's payload with the payloads of `others`, keeping self's
    /// identity.
    fn merge_with(&mut self, others: &[&Self]) -> CombineResult<()>;
}

/// Combination under a new leading axis distinguishing the originals
pub trait Stack: Sized {
    fn stack(blocks: &[&Self]) -> CombineResult<Self>;

    /// Restack self together with `others`, in place.
    fn stack_with(&mut self, others: &[&Self]) -> CombineResult<()>;
}

pub(crate) fn ensure_nonempty<T>(blocks: &[&T], op: &'static str) -> CombineResult<()> {
    if blocks.is_empty() {
        Err(CombineError::Empty { op })
    } else {
        Ok(())
    }
}

/// Concatenate payloads along axis 0. All trailing axes must agree.
pub(crate) fn concat_entities<D>(payloads: &[&Array<f64, D>]) -> CombineResult<Array<f64, D>>
where
    D: Dimension + RemoveAxis,
{
    let lead = payloads[0];
    for payload in payloads.iter().skip(1) {
        if payload.shape()[1..] != lead.shape()[1..] {
            return Err(BlockError::ShapeMismatch {
                expected: lead.shape().to_vec(),
                actual: payload.shape().to_vec(),
            }
            .into());
        }
    }
    let views: Vec<_> = payloads.iter().map(|payload| payload.view()).collect();
    concatenate(NdAxis(0), &views).map_err(|_| {
        CombineError::from(BlockError::ShapeMismatch {
            expected: lead.shape().to_vec(),
            actual: Vec::new(),
        })
    })
}

/// Stack point payloads into a common larger space.
///
/// Each input's columns are right-aligned into the trailing coordinate slots
/// of the widest input, the remaining slots are zero-filled, and one leading
/// coordinate column holding the input index distinguishes the originals.
pub(crate) fn stack_points(payloads: &[&Array2<f64>]) -> Array2<f64> {
    let width = 1 + payloads.iter().map(|p| p.ncols()).max().unwrap_or(0);
    let rows: usize = payloads.iter().map(|p| p.nrows()).sum();

    let mut out = Array2::zeros((rows, width));
    let mut row = 0;
    for (index, payload) in payloads.iter().enumerate() {
        let n = payload.nrows();
        let mut slot = out.slice_mut(s![row..row + n, ..]);
        slot.slice_mut(s![.., 0]).fill(index as f64);
        slot.slice_mut(s![.., width - payload.ncols()..]).assign(*payload);
        row += n;
    }
    out
}

/// Stack image payloads along a new leading axis.
///
/// Ranks are right-aligned by prepending unit axes, every axis is zero-padded
/// up to the common shape (data lands in the low corner of each axis), then
/// the padded arrays are stacked.
pub(crate) fn stack_images(payloads: &[&ArrayD<f64>]) -> CombineResult<ArrayD<f64>> {
    let rank = payloads.iter().map(|p| p.ndim()).max().unwrap_or(0);

    let padded: Vec<ArrayD<f64>> = payloads
        .iter()
        .map(|payload| {
            let mut aligned = (*payload).clone();
            while aligned.ndim() < rank {
                aligned = aligned.insert_axis(NdAxis(0));
            }
            aligned
        })
        .collect();

    let mut target = vec![0usize; rank];
    for aligned in &padded {
        for (axis, &len) in aligned.shape().iter().enumerate() {
            target[axis] = target[axis].max(len);
        }
    }

    let expanded: Vec<ArrayD<f64>> = padded
        .into_iter()
        .map(|aligned| {
            if aligned.shape() == target.as_slice() {
                aligned
            } else {
                let mut out = ArrayD::zeros(IxDyn(&target));
                let slices: Vec<SliceInfoElem> = aligned
                    .shape()
                    .iter()
                    .map(|&len| SliceInfoElem::Slice {
                        start: 0,
                        end: Some(len as isize),
                        step: 1,
                    })
                    .collect();
                out.slice_mut(slices.as_slice()).assign(&aligned);
                out
            }
        })
        .collect();

    let views: Vec<_> = expanded.iter().map(|a| a.view()).collect();
    ndarray::stack(NdAxis(0), &views).map_err(|_| {
        CombineError::from(BlockError::ShapeMismatch {
            expected: target,
            actual: Vec::new(),
        })
    })
}
