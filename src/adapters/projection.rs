//! Importer for an uploaded sensors x vertices projection (gain) matrix.

use std::path::Path;

use ndarray::{Array2, Ix2};

use crate::container::ArrayFile;
use crate::entities::{ProjectionMatrix, ProjectionType, SurfaceType};
use crate::error::{AdapterError, Result};
use crate::parser::{parse_ascii_matrix, UploadFormat};
use crate::profiling::LaunchTimer;
use crate::store::EntityStore;
use crate::types::ProjectionImportRequest;
use crate::validation::{require_dim, require_non_empty, require_present};

/// Dataset name recorded when the request leaves it unset.
pub const DEFAULT_DATASET_NAME: &str = "ProjectionMatrix";

pub struct ProjectionImporter;

impl ProjectionImporter {
    /// Build a projection matrix entity from the uploaded file.
    ///
    /// The gate runs in a fixed order — upload path, sensor set, surface,
    /// parsed data, row count against the sensor count, column count
    /// against the vertex count — and the first violation aborts before
    /// any matrix entity is constructed.
    pub fn launch(
        store: &impl EntityStore,
        request: &ProjectionImportRequest,
        storage_dir: &Path,
    ) -> Result<ProjectionMatrix> {
        let _timer = LaunchTimer::start("projection_import");

        let upload = require_present(
            Some(request.projection_file.as_str()).filter(|p| !p.trim().is_empty()),
            "projection file",
        )?;
        let sensors = store.sensors(request.sensors)?;
        let surface = store.surface(request.surface)?;
        if surface.surface_type != SurfaceType::Cortical {
            return Err(AdapterError::Validation(
                "Projection matrices are defined against a cortical surface".to_string(),
            ));
        }

        log::debug!("Reading projection matrix from {}", upload);
        let data = read_upload(upload)?;

        require_non_empty(data.len(), "projection dataset")?;
        require_dim(
            "projection matrix row count",
            data.nrows(),
            sensors.number_of_sensors,
        )?;
        require_dim(
            "projection matrix column count",
            data.ncols(),
            surface.number_of_vertices,
        )?;

        let matrix = ProjectionMatrix::new(
            ProjectionType::for_sensors(sensors.sensors_type),
            surface.gid,
            sensors.gid,
            request
                .dataset_name
                .clone()
                .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string()),
            data,
        );
        matrix.store(storage_dir)?;
        Ok(matrix)
    }
}

fn read_upload(path: &str) -> Result<Array2<f64>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let format = UploadFormat::from_extension(extension).ok_or_else(|| {
        AdapterError::InvalidParameter(format!("unsupported upload format '{}'", extension))
    })?;

    match format {
        UploadFormat::Ascii => parse_ascii_matrix(&std::fs::read_to_string(path)?),
        UploadFormat::Container => {
            let payload = ArrayFile::open(path)?.read_all()?;
            payload.into_dimensionality::<Ix2>().map_err(|_| {
                AdapterError::Parse(format!("{} does not hold a two-dimensional dataset", path))
            })
        }
    }
}
