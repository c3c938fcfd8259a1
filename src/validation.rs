//! Structural precondition checks shared by the adapters.
//!
//! Fail fast, first violation wins: callers run these in a fixed order and
//! the first failing check aborts the launch before any numeric work.

use ndarray::Array2;

use crate::error::{AdapterError, Result};

/// Require an optional field to be set.
pub fn require_present<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| {
        AdapterError::Validation(format!("No {} selected. Select one and launch again.", field))
    })
}

/// Require a dataset to hold at least one element.
pub fn require_non_empty(len: usize, what: &str) -> Result<()> {
    if len == 0 {
        return Err(AdapterError::Validation(format!("Invalid (empty) {}", what)));
    }
    Ok(())
}

/// Require two independently-sourced dimensions to agree. The message
/// carries both the actual and the expected value.
pub fn require_dim(what: &str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(AdapterError::Validation(format!(
            "Invalid {}: {}. Expected: {}",
            what, actual, expected
        )));
    }
    Ok(())
}

/// Require a non-empty square weights matrix.
pub fn require_square_weights(weights: &Array2<f64>) -> Result<()> {
    require_non_empty(weights.len(), "connectivity weights")?;
    require_dim(
        "connectivity weights column count",
        weights.ncols(),
        weights.nrows(),
    )
}
