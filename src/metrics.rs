//! Graph-theoretic measures over connectivity weights matrices.
//!
//! Semantics follow the Brain Connectivity Toolbox conventions: binary
//! measures binarize the weights first, undirected density counts each
//! edge once, and the signed strength zeroes the diagonal before summing.

use ndarray::{Array1, Array2};
use rayon::prelude::*;

/// 1.0 where a connection exists, 0.0 elsewhere.
pub fn binarize(weights: &Array2<f64>) -> Array2<f64> {
    weights.mapv(|w| if w != 0.0 { 1.0 } else { 0.0 })
}

/// Node degree of an undirected network.
pub fn degrees_und(weights: &Array2<f64>) -> Array1<f64> {
    let binary = binarize(weights);
    binary.sum_axis(ndarray::Axis(0))
}

/// Indegree, outdegree and total degree of a directed network.
pub fn degrees_dir(weights: &Array2<f64>) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    let binary = binarize(weights);
    let indegree = binary.sum_axis(ndarray::Axis(0));
    let outdegree = binary.sum_axis(ndarray::Axis(1));
    let degree = &indegree + &outdegree;
    (indegree, outdegree, degree)
}

/// Node strength (sum of incident weights) of an undirected network.
pub fn strengths_und(weights: &Array2<f64>) -> Array1<f64> {
    weights.sum_axis(ndarray::Axis(0))
}

/// Instrength, outstrength and total strength of a directed network.
pub fn strengths_dir(weights: &Array2<f64>) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    let instrength = weights.sum_axis(ndarray::Axis(0));
    let outstrength = weights.sum_axis(ndarray::Axis(1));
    let strength = &instrength + &outstrength;
    (instrength, outstrength, strength)
}

/// Nodal strength of the positive and negative weights of a signed
/// undirected network, plus the total positive and negative weight.
/// The diagonal is ignored; negative strengths keep their sign.
pub fn strengths_und_sign(weights: &Array2<f64>) -> (Array1<f64>, Array1<f64>, f64, f64) {
    let n = weights.nrows();
    let mut positive = Array1::zeros(n);
    let mut negative = Array1::zeros(n);

    for ((row, col), &w) in weights.indexed_iter() {
        if row == col {
            continue;
        }
        if w > 0.0 {
            positive[col] += w;
        } else if w < 0.0 {
            negative[col] += w;
        }
    }

    let vpos = positive.sum();
    let vneg = negative.sum();
    (positive, negative, vpos, vneg)
}

/// Density, vertex count and edge count of a directed network. Every
/// off-diagonal connection counts as one edge.
pub fn density_dir(weights: &Array2<f64>) -> (f64, usize, usize) {
    let n = weights.nrows();
    let mut edges = 0usize;
    for ((row, col), &w) in weights.indexed_iter() {
        if row != col && w != 0.0 {
            edges += 1;
        }
    }
    let possible = n * n.saturating_sub(1);
    let density = if possible > 0 {
        edges as f64 / possible as f64
    } else {
        0.0
    };
    (density, n, edges)
}

/// Density, vertex count and edge count of an undirected network. Each
/// edge is counted once via the strict upper triangle.
pub fn density_und(weights: &Array2<f64>) -> (f64, usize, usize) {
    let n = weights.nrows();
    let mut edges = 0usize;
    for row in 0..n {
        for col in row + 1..n {
            if weights[[row, col]] != 0.0 {
                edges += 1;
            }
        }
    }
    let possible = n * n.saturating_sub(1) / 2;
    let density = if possible > 0 {
        edges as f64 / possible as f64
    } else {
        0.0
    };
    (density, n, edges)
}

/// Joint degree distribution of a directed network.
///
/// Returns the `(n+1) x (n+1)` histogram `J` where `J[id, od]` counts the
/// nodes with that indegree/outdegree combination, plus the number of
/// nodes with od > id, with id > od, and with id == od.
pub fn jdegree(weights: &Array2<f64>) -> (Array2<f64>, i64, i64, i64) {
    let binary = binarize(weights);
    let n = binary.nrows();
    let indegree = binary.sum_axis(ndarray::Axis(0));
    let outdegree = binary.sum_axis(ndarray::Axis(1));

    let mut histogram = Array2::zeros((n + 1, n + 1));
    let mut above = 0i64;
    let mut below = 0i64;
    let mut balanced = 0i64;

    for node in 0..n {
        let id = indegree[node] as usize;
        let od = outdegree[node] as usize;
        histogram[[id, od]] += 1.0;
        match od.cmp(&id) {
            std::cmp::Ordering::Greater => above += 1,
            std::cmp::Ordering::Less => below += 1,
            std::cmp::Ordering::Equal => balanced += 1,
        }
    }

    (histogram, above, below, balanced)
}

/// Matching index between every node pair: the fraction of shared
/// neighbors, computed separately for incoming, outgoing and all
/// connections. Only the upper triangle is populated.
pub fn matching_ind(weights: &Array2<f64>) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let binary = binarize(weights);
    let n = binary.nrows();

    // Pairwise comparison of connection profiles, skipping the two nodes
    // themselves. `profile(k, node)` is the k-th entry of a node's profile;
    // profiles longer than n wrap around (incoming entries then outgoing).
    fn pair_index(
        profile: &dyn Fn(usize, usize) -> f64,
        len: usize,
        n: usize,
        i: usize,
        j: usize,
    ) -> f64 {
        let mut shared = 0.0;
        let mut connections = 0.0;
        for k in 0..len {
            if k % n == i || k % n == j {
                continue;
            }
            let a = profile(k, i);
            let b = profile(k, j);
            if a != 0.0 || b != 0.0 {
                connections += a + b;
                shared += a * b;
            }
        }
        if connections == 0.0 {
            0.0
        } else {
            2.0 * shared / connections
        }
    }

    let rows: Vec<(Vec<f64>, Vec<f64>, Vec<f64>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let mut row_in = vec![0.0; n];
            let mut row_out = vec![0.0; n];
            let mut row_all = vec![0.0; n];
            for j in i + 1..n {
                let incoming = |k: usize, node: usize| binary[[k, node]];
                let outgoing = |k: usize, node: usize| binary[[node, k]];
                let all = |k: usize, node: usize| {
                    if k < n {
                        binary[[k, node]]
                    } else {
                        binary[[node, k - n]]
                    }
                };
                row_in[j] = pair_index(&incoming, n, n, i, j);
                row_out[j] = pair_index(&outgoing, n, n, i, j);
                row_all[j] = pair_index(&all, 2 * n, n, i, j);
            }
            (row_in, row_out, row_all)
        })
        .collect();

    let mut m_in = Array2::zeros((n, n));
    let mut m_out = Array2::zeros((n, n));
    let mut m_all = Array2::zeros((n, n));
    for (i, (row_in, row_out, row_all)) in rows.into_iter().enumerate() {
        for j in 0..n {
            m_in[[i, j]] = row_in[j];
            m_out[[i, j]] = row_out[j];
            m_all[[i, j]] = row_all[j];
        }
    }
    (m_in, m_out, m_all)
}
