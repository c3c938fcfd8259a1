//! ICA over a 4-D time series, streamed one state variable at a time.

use std::path::Path;

use nalgebra::DMatrix;
use ndarray::{ArrayD, IxDyn};

use crate::container::ArrayWriter;
use crate::entities::IndependentComponents;
use crate::error::{AdapterError, Result};
use crate::ica::{fastica, IcaDecomposition};
use crate::profiling::LaunchTimer;
use crate::store::EntityStore;
use crate::streaming::transform_axis;
use crate::types::{Gid, IcaRequest};
use crate::validation::require_dim;

/// Position of the state-variable axis in a `[time, variable, space,
/// mode]` series.
const VARIABLE_AXIS: usize = 1;

const F64_BYTES: usize = 8;

/// One-shot ICA launcher. `configure` resolves the input and the
/// component default; `launch` streams the decomposition to disk.
pub struct IcaAdapter {
    input: crate::entities::TimeSeries,
    n_components: usize,
}

impl IcaAdapter {
    /// Load the referenced series and resolve the effective component
    /// count: when unspecified it defaults to the space-axis length of
    /// the input.
    pub fn configure(store: &impl EntityStore, request: &IcaRequest) -> Result<Self> {
        let input = store.time_series(request.time_series)?.clone();
        let n_components = request.n_components.unwrap_or(input.shape[2]);

        log::debug!("Time series shape is {:?}", input.shape);
        log::debug!("Effective component count is {}", n_components);

        Ok(Self {
            input,
            n_components,
        })
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Peak working-set estimate in bytes: one variable slice plus the
    /// accumulated result.
    pub fn required_memory(&self) -> usize {
        let [time, _, space, modes] = self.input.shape;
        time * space * modes * F64_BYTES + self.required_disk()
    }

    /// Size of the persisted decomposition in bytes.
    pub fn required_disk(&self) -> usize {
        let [_, variables, space, modes] = self.input.shape;
        let n = self.n_components;
        variables * modes * (n * space + n * n + space * n) * F64_BYTES
    }

    /// Stream the variable axis: read one `[time, 1, space, mode]` slice
    /// at a time, decompose it per mode, and append the three result
    /// matrices to incrementally written containers under
    /// `storage_dir/<gid>/`.
    ///
    /// On failure the containers are left unfinalized (they read back
    /// empty) and the result directory must be discarded by the caller.
    pub fn launch(&self, storage_dir: &Path) -> Result<IndependentComponents> {
        let _timer = LaunchTimer::start("ica");

        let source = self.input.open_data()?;
        require_dim("time series rank", source.shape().len(), 4)?;
        for (axis, (&stored, &declared)) in source
            .shape()
            .iter()
            .zip(self.input.shape.iter())
            .enumerate()
        {
            require_dim(&format!("time series axis {}", axis), stored, declared)?;
        }

        let [_, _, space, modes] = self.input.shape;
        let n = self.n_components;

        let gid = Gid::new();
        let dir = storage_dir.join(gid.to_string());
        std::fs::create_dir_all(&dir)?;

        let mut prewhitening = ArrayWriter::create(
            dir.join(IndependentComponents::PREWHITENING_FILE),
            &[modes, n, space],
        )?;
        let mut unmixing = ArrayWriter::create(
            dir.join(IndependentComponents::UNMIXING_FILE),
            &[modes, n, n],
        )?;
        let mut mixing = ArrayWriter::create(
            dir.join(IndependentComponents::MIXING_FILE),
            &[modes, space, n],
        )?;

        transform_axis(
            &source,
            VARIABLE_AXIS,
            |variable, slice| {
                log::debug!("Decomposing variable {}", variable);
                decompose_slice(&slice, n)
            },
            |partial| {
                prewhitening.write_slice(partial.prewhitening.view())?;
                unmixing.write_slice(partial.unmixing.view())?;
                mixing.write_slice(partial.mixing.view())?;
                Ok(())
            },
        )?;

        prewhitening.finish()?;
        unmixing.finish()?;
        mixing.finish()?;

        IndependentComponents::create(gid, self.input.gid, n, dir)
    }
}

/// Per-variable decomposition, one matrix stack per mode.
struct PartialDecomposition {
    /// `[mode, n, space]`
    prewhitening: ArrayD<f64>,
    /// `[mode, n, n]`
    unmixing: ArrayD<f64>,
    /// `[mode, space, n]`
    mixing: ArrayD<f64>,
}

/// Run FastICA per mode of one `[time, 1, space, mode]` slice.
fn decompose_slice(slice: &ArrayD<f64>, n: usize) -> Result<PartialDecomposition> {
    let shape = slice.shape();
    if shape.len() != 4 || shape[1] != 1 {
        return Err(AdapterError::Numeric(format!(
            "expected a [time, 1, space, mode] slice, got {:?}",
            shape
        )));
    }
    let (time, space, modes) = (shape[0], shape[2], shape[3]);

    let mut prewhitening = ArrayD::zeros(IxDyn(&[modes, n, space]));
    let mut unmixing = ArrayD::zeros(IxDyn(&[modes, n, n]));
    let mut mixing = ArrayD::zeros(IxDyn(&[modes, space, n]));

    for mode in 0..modes {
        // Channels are the space axis, samples the time axis.
        let mut signals = DMatrix::zeros(space, time);
        for t in 0..time {
            for s in 0..space {
                signals[(s, t)] = slice[[t, 0, s, mode]];
            }
        }

        let IcaDecomposition {
            prewhitening: pre,
            unmixing: unmix,
            mixing: mix,
        } = fastica(&signals, n)?;

        for row in 0..n {
            for col in 0..space {
                prewhitening[[mode, row, col]] = pre[(row, col)];
            }
            for col in 0..n {
                unmixing[[mode, row, col]] = unmix[(row, col)];
            }
        }
        for row in 0..space {
            for col in 0..n {
                mixing[[mode, row, col]] = mix[(row, col)];
            }
        }
    }

    Ok(PartialDecomposition {
        prewhitening,
        unmixing,
        mixing,
    })
}
