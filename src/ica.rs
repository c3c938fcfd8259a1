//! FastICA decomposition of a channels x samples signal matrix.
//!
//! Symmetric fixed-point iteration with the logcosh contrast. The
//! initialisation is the identity rotation, so results are deterministic
//! for a given input.

use nalgebra::DMatrix;

use crate::error::{AdapterError, Result};

/// Iteration cap before the decomposition is declared non-convergent.
pub const MAX_ITERATIONS: usize = 500;

/// Convergence tolerance on the rotation update.
pub const TOLERANCE: f64 = 1e-4;

/// Eigenvalues below this fraction of the largest are treated as rank loss.
const RANK_EPS: f64 = 1e-10;

/// Result of one FastICA run.
#[derive(Debug, Clone)]
pub struct IcaDecomposition {
    /// Whitening projection, `n x channels`.
    pub prewhitening: DMatrix<f64>,
    /// Rotation in whitened space, `n x n`.
    pub unmixing: DMatrix<f64>,
    /// Pseudo-inverse of the composed unmixing, `channels x n`.
    pub mixing: DMatrix<f64>,
}

impl IcaDecomposition {
    /// Composed `n x channels` projection from raw signals to sources.
    pub fn unmixing_full(&self) -> DMatrix<f64> {
        &self.unmixing * &self.prewhitening
    }
}

/// Decompose `x` (channels x samples) into `n_components` independent
/// sources.
///
/// Fails with a `Numeric` error when more components are requested than
/// the data can support (channel count or effective rank) and when the
/// fixed-point iteration does not converge within [`MAX_ITERATIONS`].
pub fn fastica(x: &DMatrix<f64>, n_components: usize) -> Result<IcaDecomposition> {
    let channels = x.nrows();
    let samples = x.ncols();

    if n_components == 0 {
        return Err(AdapterError::InvalidParameter(
            "component count must be at least 1".to_string(),
        ));
    }
    if n_components > channels {
        return Err(AdapterError::Numeric(format!(
            "cannot extract {} components from {} channels",
            n_components, channels
        )));
    }
    if samples < 2 {
        return Err(AdapterError::Numeric(format!(
            "{} samples are too few to estimate a covariance",
            samples
        )));
    }

    // Center each channel.
    let mut centered = x.clone();
    for mut row in centered.row_iter_mut() {
        let mean = row.mean();
        row.add_scalar_mut(-mean);
    }

    let prewhitening = whitening_projection(&centered, n_components)?;
    let whitened = &prewhitening * &centered;

    let unmixing = symmetric_fastica(&whitened)?;

    let composed = &unmixing * &prewhitening;
    let mixing = composed
        .clone()
        .pseudo_inverse(1e-12)
        .map_err(|e| AdapterError::Numeric(format!("mixing matrix inversion failed: {}", e)))?;

    Ok(IcaDecomposition {
        prewhitening,
        unmixing,
        mixing,
    })
}

/// Eigenvalue whitening: project onto the top `n` principal directions and
/// scale them to unit variance.
fn whitening_projection(centered: &DMatrix<f64>, n: usize) -> Result<DMatrix<f64>> {
    let samples = centered.ncols();
    let cov = centered * centered.transpose() / (samples as f64 - 1.0);
    let eigen = cov.symmetric_eigen();

    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let largest = eigen.eigenvalues[order[0]].max(0.0);
    let mut projection = DMatrix::zeros(n, centered.nrows());
    for (component, &source) in order.iter().take(n).enumerate() {
        let value = eigen.eigenvalues[source];
        if value <= RANK_EPS * largest || value <= 0.0 {
            return Err(AdapterError::Numeric(format!(
                "input rank {} is below the requested {} components",
                component, n
            )));
        }
        let scale = 1.0 / value.sqrt();
        for channel in 0..centered.nrows() {
            projection[(component, channel)] = eigen.eigenvectors[(channel, source)] * scale;
        }
    }
    Ok(projection)
}

/// Symmetric decorrelation: `W <- (W W^T)^{-1/2} W`.
fn decorrelate(w: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let gram = w * w.transpose();
    let eigen = gram.symmetric_eigen();
    let n = w.nrows();

    let mut inv_sqrt = DMatrix::zeros(n, n);
    for i in 0..n {
        let value = eigen.eigenvalues[i];
        if value <= 0.0 {
            return Err(AdapterError::Numeric(
                "rotation collapsed during decorrelation".to_string(),
            ));
        }
        inv_sqrt[(i, i)] = 1.0 / value.sqrt();
    }
    let root = &eigen.eigenvectors * inv_sqrt * eigen.eigenvectors.transpose();
    Ok(root * w)
}

/// Fixed-point iteration over whitened data (`n x samples`).
fn symmetric_fastica(whitened: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = whitened.nrows();
    let samples = whitened.ncols() as f64;

    let mut w = DMatrix::<f64>::identity(n, n);

    for iteration in 0..MAX_ITERATIONS {
        let projected = &w * whitened;

        // logcosh contrast: g = tanh, g' = 1 - tanh^2.
        let g = projected.map(|u| u.tanh());
        let g_prime_means: Vec<f64> = (0..n)
            .map(|row| {
                let mut acc = 0.0;
                for col in 0..projected.ncols() {
                    let t = projected[(row, col)].tanh();
                    acc += 1.0 - t * t;
                }
                acc / samples
            })
            .collect();

        let mut updated = &g * whitened.transpose() / samples;
        for row in 0..n {
            for col in 0..n {
                updated[(row, col)] -= g_prime_means[row] * w[(row, col)];
            }
        }

        let updated = decorrelate(&updated)?;

        // Largest deviation of the update from the previous rotation,
        // invariant to per-component sign flips.
        let overlap = &updated * w.transpose();
        let mut lim: f64 = 0.0;
        for i in 0..n {
            lim = lim.max((overlap[(i, i)].abs() - 1.0).abs());
        }

        w = updated;
        if lim < TOLERANCE {
            log::debug!("FastICA converged after {} iterations", iteration + 1);
            return Ok(w);
        }
    }

    Err(AdapterError::Numeric(format!(
        "FastICA did not converge within {} iterations",
        MAX_ITERATIONS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two independent non-Gaussian sources mixed by a well-conditioned
    /// matrix.
    fn mixed_signals(samples: usize) -> (DMatrix<f64>, DMatrix<f64>) {
        let mut sources = DMatrix::zeros(2, samples);
        for t in 0..samples {
            let phase = t as f64 * 0.05;
            // Square wave and sawtooth: strongly sub-Gaussian.
            sources[(0, t)] = if phase.sin() >= 0.0 { 1.0 } else { -1.0 };
            sources[(1, t)] = 2.0 * (phase * 0.31 - (phase * 0.31).floor()) - 1.0;
        }
        let mixing = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.3, 0.8]);
        let mixed = &mixing * &sources;
        (sources, mixed)
    }

    #[test]
    fn test_shapes_and_reconstruction() {
        let (_, mixed) = mixed_signals(2000);
        let ica = fastica(&mixed, 2).unwrap();

        assert_eq!(ica.prewhitening.shape(), (2, 2));
        assert_eq!(ica.unmixing.shape(), (2, 2));
        assert_eq!(ica.mixing.shape(), (2, 2));

        // With full rank the mixing matrix inverts the composed unmixing.
        let round = &ica.mixing * ica.unmixing_full();
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((round[(i, j)] - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_recovers_source_directions() {
        let (_, mixed) = mixed_signals(4000);
        let ica = fastica(&mixed, 2).unwrap();

        // unmixing_full * A should be close to a scaled permutation: each
        // row dominated by a single entry.
        let mixing = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.3, 0.8]);
        let perm = ica.unmixing_full() * mixing;
        for i in 0..2 {
            let a = perm[(i, 0)].abs();
            let b = perm[(i, 1)].abs();
            let (hi, lo) = if a > b { (a, b) } else { (b, a) };
            assert!(
                hi > 4.0 * lo,
                "row {} of the permutation is not dominant: {} vs {}",
                i,
                hi,
                lo
            );
        }
    }

    #[test]
    fn test_single_component() {
        let (_, mixed) = mixed_signals(1000);
        let ica = fastica(&mixed, 1).unwrap();
        assert_eq!(ica.prewhitening.shape(), (1, 2));
        assert_eq!(ica.unmixing.shape(), (1, 1));
        assert_eq!(ica.mixing.shape(), (2, 1));
    }

    #[test]
    fn test_too_many_components_is_numeric_failure() {
        let (_, mixed) = mixed_signals(500);
        let result = fastica(&mixed, 3);
        assert!(matches!(result, Err(AdapterError::Numeric(_))));
    }

    #[test]
    fn test_rank_deficient_input_is_numeric_failure() {
        // Second channel duplicates the first: rank 1.
        let mut data = DMatrix::zeros(2, 500);
        for t in 0..500 {
            let v = ((t as f64) * 0.1).sin();
            data[(0, t)] = v;
            data[(1, t)] = v;
        }
        let result = fastica(&data, 2);
        assert!(matches!(result, Err(AdapterError::Numeric(_))));
    }

    #[test]
    fn test_zero_components_rejected() {
        let (_, mixed) = mixed_signals(100);
        assert!(matches!(
            fastica(&mixed, 0),
            Err(AdapterError::InvalidParameter(_))
        ));
    }
}
