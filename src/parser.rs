//! Parsing of uploaded ASCII matrix files.

use ndarray::Array2;

use crate::error::{AdapterError, Result};

/// Upload file formats accepted by the importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Ascii,
    Container,
}

impl UploadFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ascii" | "txt" | "csv" => Some(Self::Ascii),
            "bna" => Some(Self::Container),
            _ => None,
        }
    }
}

/// Parse a whitespace-separated ASCII matrix.
///
/// Lines starting with `#` and blank lines are skipped. Every data row
/// must carry the same number of columns and every token must be a finite
/// number; an uploaded matrix with holes is rejected rather than patched.
pub fn parse_ascii_matrix(content: &str) -> Result<Array2<f64>> {
    let mut values: Vec<f64> = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut row_len = 0usize;
        for token in trimmed.split_whitespace() {
            let value: f64 = token.parse().map_err(|_| {
                AdapterError::Parse(format!(
                    "line {}: '{}' is not a number",
                    line_no + 1,
                    token
                ))
            })?;
            if !value.is_finite() {
                return Err(AdapterError::Parse(format!(
                    "line {}: non-finite value '{}'",
                    line_no + 1,
                    token
                )));
            }
            values.push(value);
            row_len += 1;
        }

        if rows == 0 {
            cols = row_len;
        } else if row_len != cols {
            return Err(AdapterError::Parse(format!(
                "line {}: {} columns, expected {}",
                line_no + 1,
                row_len,
                cols
            )));
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(AdapterError::Parse(
            "no data rows found in ASCII matrix".to_string(),
        ));
    }

    log::debug!("Parsed ASCII matrix: {} rows x {} columns", rows, cols);

    Array2::from_shape_vec((rows, cols), values)
        .map_err(|e| AdapterError::Parse(e.to_string()))
}
