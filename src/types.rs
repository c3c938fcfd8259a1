use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AdapterError, Result};

/// Globally unique identifier of a stored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gid(Uuid);

impl Gid {
    pub fn new() -> Self {
        Gid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for Gid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Request for an ICA decomposition of a 4-D time series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IcaRequest {
    /// The time series to which the ICA is applied.
    pub time_series: Gid,
    /// Number of independent components to unmix. Defaults to the
    /// space-axis length of the input when unspecified.
    pub n_components: Option<usize>,
}

/// Request for a graph metric over a connectivity weights matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphMetricRequest {
    pub connectivity: Gid,
}

/// Request to import a sensors x vertices projection matrix from a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionImportRequest {
    /// Path of the uploaded matrix file (ASCII or array container).
    pub projection_file: String,
    /// Dataset name recorded on the imported matrix.
    #[serde(default)]
    pub dataset_name: Option<String>,
    /// The cortical surface the projection maps from.
    pub surface: Gid,
    /// The sensor set the projection maps onto.
    pub sensors: Gid,
}

/// One value in a numeric-layer result record.
#[derive(Debug, Clone)]
pub enum MetricValue {
    Vector(Array1<f64>),
    Matrix(Array2<f64>),
    Float(f64),
    Int(i64),
}

/// Result record of one numeric routine: short algorithm-defined keys
/// mapped to vectors, matrices or scalars.
#[derive(Debug, Clone, Default)]
pub struct MetricRecord {
    values: BTreeMap<&'static str, MetricValue>,
}

impl MetricRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: MetricValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.values.get(key)
    }

    pub fn vector(&self, key: &str) -> Result<&Array1<f64>> {
        match self.values.get(key) {
            Some(MetricValue::Vector(v)) => Ok(v),
            _ => Err(AdapterError::Numeric(format!(
                "result record has no vector under key '{}'",
                key
            ))),
        }
    }

    pub fn matrix(&self, key: &str) -> Result<&Array2<f64>> {
        match self.values.get(key) {
            Some(MetricValue::Matrix(m)) => Ok(m),
            _ => Err(AdapterError::Numeric(format!(
                "result record has no matrix under key '{}'",
                key
            ))),
        }
    }

    pub fn float(&self, key: &str) -> Result<f64> {
        match self.values.get(key) {
            Some(MetricValue::Float(x)) => Ok(*x),
            _ => Err(AdapterError::Numeric(format!(
                "result record has no float under key '{}'",
                key
            ))),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        match self.values.get(key) {
            Some(MetricValue::Int(x)) => Ok(*x),
            _ => Err(AdapterError::Numeric(format!(
                "result record has no integer under key '{}'",
                key
            ))),
        }
    }
}
