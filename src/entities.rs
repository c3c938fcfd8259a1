//! Data entities consumed and produced by the adapters.
//!
//! Input entities are owned by the host store; result entities follow a
//! create, populate, persist, return lifecycle and are immutable once
//! stored. Array payloads live in container files next to a JSON metadata
//! sidecar.

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayD, Ix1, Ix2};
use serde::{Deserialize, Serialize};

use crate::container::{self, ArrayFile};
use crate::error::{AdapterError, Result};
use crate::types::Gid;

/// Sensor modality of a sensor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorsType {
    Eeg,
    Meg,
    Seeg,
}

/// Projection kind of a gain matrix, derived from the sensor modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionType {
    SurfaceEeg,
    SurfaceMeg,
    SurfaceSeeg,
}

impl ProjectionType {
    pub fn for_sensors(sensors_type: SensorsType) -> Self {
        match sensors_type {
            SensorsType::Eeg => Self::SurfaceEeg,
            SensorsType::Meg => Self::SurfaceMeg,
            SensorsType::Seeg => Self::SurfaceSeeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Cortical,
    SkinAir,
}

/// A 4-D `[time, variable, space, mode]` series whose payload lives in an
/// array container on disk.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub gid: Gid,
    pub title: String,
    pub shape: [usize; 4],
    pub data_path: PathBuf,
}

impl TimeSeries {
    pub fn open_data(&self) -> Result<ArrayFile> {
        ArrayFile::open(&self.data_path)
    }
}

/// A region-level connectivity graph with an N x N weights matrix.
#[derive(Debug, Clone)]
pub struct Connectivity {
    pub gid: Gid,
    pub region_labels: Vec<String>,
    pub weights: Array2<f64>,
}

impl Connectivity {
    pub fn number_of_regions(&self) -> usize {
        self.weights.nrows()
    }
}

/// A sensor set.
#[derive(Debug, Clone)]
pub struct Sensors {
    pub gid: Gid,
    pub sensors_type: SensorsType,
    pub labels: Vec<String>,
    pub number_of_sensors: usize,
}

/// A brain surface.
#[derive(Debug, Clone)]
pub struct Surface {
    pub gid: Gid,
    pub surface_type: SurfaceType,
    pub number_of_vertices: usize,
}

/// Any input entity the host store can hand to an adapter.
#[derive(Debug, Clone)]
pub enum Entity {
    TimeSeries(TimeSeries),
    Connectivity(Connectivity),
    Sensors(Sensors),
    Surface(Surface),
}

impl Entity {
    pub fn gid(&self) -> Gid {
        match self {
            Entity::TimeSeries(e) => e.gid,
            Entity::Connectivity(e) => e.gid,
            Entity::Sensors(e) => e.gid,
            Entity::Surface(e) => e.gid,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entity::TimeSeries(_) => "time series",
            Entity::Connectivity(_) => "connectivity",
            Entity::Sensors(_) => "sensors",
            Entity::Surface(_) => "surface",
        }
    }
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn read_meta<M: for<'de> Deserialize<'de>>(path: &Path) -> Result<M> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| AdapterError::Parse(format!("{}: {}", path.display(), e)))
}

fn write_meta<M: Serialize>(path: &Path, meta: &M) -> Result<()> {
    let raw = serde_json::to_string_pretty(meta)
        .map_err(|e| AdapterError::Parse(format!("{}: {}", path.display(), e)))?;
    std::fs::write(path, raw)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Result entities
// ---------------------------------------------------------------------------

/// Per-node (vector) or node-by-node (matrix) measure over a connectivity.
#[derive(Debug, Clone)]
pub enum MeasureData {
    Vector(Array1<f64>),
    Matrix(Array2<f64>),
}

impl MeasureData {
    fn to_dyn(&self) -> ArrayD<f64> {
        match self {
            MeasureData::Vector(v) => v.clone().into_dyn(),
            MeasureData::Matrix(m) => m.clone().into_dyn(),
        }
    }

    fn from_dyn(array: ArrayD<f64>) -> Result<Self> {
        match array.ndim() {
            1 => Ok(MeasureData::Vector(
                array
                    .into_dimensionality::<Ix1>()
                    .map_err(|e| AdapterError::Parse(e.to_string()))?,
            )),
            2 => Ok(MeasureData::Matrix(
                array
                    .into_dimensionality::<Ix2>()
                    .map_err(|e| AdapterError::Parse(e.to_string()))?,
            )),
            n => Err(AdapterError::Parse(format!(
                "connectivity measure payload has {} dimensions",
                n
            ))),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct MeasureMeta {
    gid: Gid,
    connectivity: Gid,
    title: String,
    created_at: String,
}

/// Labelled per-node result of a graph metric.
#[derive(Debug, Clone)]
pub struct ConnectivityMeasure {
    pub gid: Gid,
    pub connectivity: Gid,
    pub title: String,
    pub data: MeasureData,
    pub created_at: String,
}

impl ConnectivityMeasure {
    pub fn new(connectivity: Gid, title: impl Into<String>, data: MeasureData) -> Self {
        Self {
            gid: Gid::new(),
            connectivity,
            title: title.into(),
            data,
            created_at: timestamp(),
        }
    }

    /// Persist the measure under `dir` as `<gid>.measure.bna` plus a JSON
    /// metadata sidecar.
    pub fn store(&self, dir: &Path) -> Result<()> {
        container::write_array(
            dir.join(format!("{}.measure.bna", self.gid)),
            self.data.to_dyn().view(),
        )?;
        write_meta(
            &dir.join(format!("{}.measure.json", self.gid)),
            &MeasureMeta {
                gid: self.gid,
                connectivity: self.connectivity,
                title: self.title.clone(),
                created_at: self.created_at.clone(),
            },
        )
    }

    pub fn load(dir: &Path, gid: Gid) -> Result<Self> {
        let meta: MeasureMeta = read_meta(&dir.join(format!("{}.measure.json", gid)))?;
        let payload = ArrayFile::open(dir.join(format!("{}.measure.bna", gid)))?.read_all()?;
        Ok(Self {
            gid: meta.gid,
            connectivity: meta.connectivity,
            title: meta.title,
            data: MeasureData::from_dyn(payload)?,
            created_at: meta.created_at,
        })
    }
}

/// A single labelled scalar result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueWrapper {
    pub gid: Gid,
    pub label: String,
    pub value: WrappedValue,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrappedValue {
    Float(f64),
    Int(i64),
}

impl ValueWrapper {
    pub fn float(label: impl Into<String>, value: f64) -> Self {
        Self {
            gid: Gid::new(),
            label: label.into(),
            value: WrappedValue::Float(value),
            created_at: timestamp(),
        }
    }

    pub fn int(label: impl Into<String>, value: i64) -> Self {
        Self {
            gid: Gid::new(),
            label: label.into(),
            value: WrappedValue::Int(value),
            created_at: timestamp(),
        }
    }

    pub fn store(&self, dir: &Path) -> Result<()> {
        write_meta(&dir.join(format!("{}.value.json", self.gid)), self)
    }

    pub fn load(dir: &Path, gid: Gid) -> Result<Self> {
        read_meta(&dir.join(format!("{}.value.json", gid)))
    }
}

#[derive(Serialize, Deserialize)]
struct ProjectionMeta {
    gid: Gid,
    projection_type: ProjectionType,
    sources: Gid,
    sensors: Gid,
    dataset_name: String,
    created_at: String,
}

/// A sensors x vertices gain matrix linking a surface to a sensor set.
#[derive(Debug, Clone)]
pub struct ProjectionMatrix {
    pub gid: Gid,
    pub projection_type: ProjectionType,
    pub sources: Gid,
    pub sensors: Gid,
    pub dataset_name: String,
    pub data: Array2<f64>,
    pub created_at: String,
}

impl ProjectionMatrix {
    pub fn new(
        projection_type: ProjectionType,
        sources: Gid,
        sensors: Gid,
        dataset_name: impl Into<String>,
        data: Array2<f64>,
    ) -> Self {
        Self {
            gid: Gid::new(),
            projection_type,
            sources,
            sensors,
            dataset_name: dataset_name.into(),
            data,
            created_at: timestamp(),
        }
    }

    pub fn store(&self, dir: &Path) -> Result<()> {
        container::write_array(
            dir.join(format!("{}.projection.bna", self.gid)),
            self.data.clone().into_dyn().view(),
        )?;
        write_meta(
            &dir.join(format!("{}.projection.json", self.gid)),
            &ProjectionMeta {
                gid: self.gid,
                projection_type: self.projection_type,
                sources: self.sources,
                sensors: self.sensors,
                dataset_name: self.dataset_name.clone(),
                created_at: self.created_at.clone(),
            },
        )
    }

    pub fn load(dir: &Path, gid: Gid) -> Result<Self> {
        let meta: ProjectionMeta = read_meta(&dir.join(format!("{}.projection.json", gid)))?;
        let payload = ArrayFile::open(dir.join(format!("{}.projection.bna", gid)))?.read_all()?;
        let data = payload
            .into_dimensionality::<Ix2>()
            .map_err(|e| AdapterError::Parse(e.to_string()))?;
        Ok(Self {
            gid: meta.gid,
            projection_type: meta.projection_type,
            sources: meta.sources,
            sensors: meta.sensors,
            dataset_name: meta.dataset_name,
            data,
            created_at: meta.created_at,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct ComponentsMeta {
    gid: Gid,
    source: Gid,
    n_components: usize,
    created_at: String,
}

/// ICA result: per variable and mode, the prewhitening `[n x space]`,
/// unmixing `[n x n]` and mixing `[space x n]` matrices, stacked along the
/// variable axis in three container files under one entity directory.
#[derive(Debug, Clone)]
pub struct IndependentComponents {
    pub gid: Gid,
    pub source: Gid,
    pub n_components: usize,
    pub dir: PathBuf,
    pub created_at: String,
}

impl IndependentComponents {
    pub const PREWHITENING_FILE: &'static str = "prewhitening.bna";
    pub const UNMIXING_FILE: &'static str = "unmixing.bna";
    pub const MIXING_FILE: &'static str = "mixing.bna";

    /// Record a freshly computed decomposition whose containers have
    /// already been written under `dir`.
    pub fn create(gid: Gid, source: Gid, n_components: usize, dir: PathBuf) -> Result<Self> {
        let entity = Self {
            gid,
            source,
            n_components,
            dir,
            created_at: timestamp(),
        };
        write_meta(
            &entity.dir.join("meta.json"),
            &ComponentsMeta {
                gid: entity.gid,
                source: entity.source,
                n_components: entity.n_components,
                created_at: entity.created_at.clone(),
            },
        )?;
        Ok(entity)
    }

    pub fn load(dir: PathBuf) -> Result<Self> {
        let meta: ComponentsMeta = read_meta(&dir.join("meta.json"))?;
        Ok(Self {
            gid: meta.gid,
            source: meta.source,
            n_components: meta.n_components,
            dir,
            created_at: meta.created_at,
        })
    }

    /// `[variable, mode, n, space]`
    pub fn prewhitening(&self) -> Result<ArrayD<f64>> {
        ArrayFile::open(self.dir.join(Self::PREWHITENING_FILE))?.read_all()
    }

    /// `[variable, mode, n, n]`
    pub fn unmixing(&self) -> Result<ArrayD<f64>> {
        ArrayFile::open(self.dir.join(Self::UNMIXING_FILE))?.read_all()
    }

    /// `[variable, mode, space, n]`
    pub fn mixing(&self) -> Result<ArrayD<f64>> {
        ArrayFile::open(self.dir.join(Self::MIXING_FILE))?.read_all()
    }
}
