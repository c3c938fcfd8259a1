//! Bounded-memory streaming transform over one axis of a stored array.
//!
//! Peak memory is one slice plus whatever the caller accumulates; the
//! source array is never materialized in full.

use std::ops::Range;

use ndarray::ArrayD;

use crate::container::ArrayFile;
use crate::error::{AdapterError, Result};

/// An array-like source that exposes its shape and coordinate-range reads.
pub trait SliceSource {
    fn shape(&self) -> &[usize];

    fn read_slice(&self, ranges: &[Range<usize>]) -> Result<ArrayD<f64>>;
}

impl SliceSource for ArrayFile {
    fn shape(&self) -> &[usize] {
        ArrayFile::shape(self)
    }

    fn read_slice(&self, ranges: &[Range<usize>]) -> Result<ArrayD<f64>> {
        ArrayFile::read_slice(self, ranges)
    }
}

/// Apply `transform` to each extent-1 slice along `axis`, in ascending
/// index order, handing every partial result to `write` before the next
/// slice is read.
///
/// Any slice-read or transform failure aborts the whole operation; output
/// written so far must be treated as invalid by the caller. Returns the
/// number of slices processed.
pub fn transform_axis<S, T, F, W>(
    source: &S,
    axis: usize,
    mut transform: F,
    mut write: W,
) -> Result<usize>
where
    S: SliceSource + ?Sized,
    F: FnMut(usize, ArrayD<f64>) -> Result<T>,
    W: FnMut(T) -> Result<()>,
{
    let shape = source.shape().to_vec();
    if axis >= shape.len() {
        return Err(AdapterError::InvalidParameter(format!(
            "iteration axis {} is outside a {}-dimensional array",
            axis,
            shape.len()
        )));
    }

    log::debug!(
        "Streaming over axis {} of shape {:?} ({} slices)",
        axis,
        shape,
        shape[axis]
    );

    let mut ranges: Vec<Range<usize>> = shape.iter().map(|&d| 0..d).collect();
    for index in 0..shape[axis] {
        ranges[axis] = index..index + 1;
        let slice = source.read_slice(&ranges)?;
        let partial = transform(index, slice)?;
        write(partial)?;
    }

    Ok(shape[axis])
}
