//! PageRank by power iteration.

use crate::adjacency::Adjacency;
use rayon::prelude::*;
use tracing::debug;

/// Iteration parameters, already validated.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageRankParams {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub normalize: bool,
}

/// PageRank of every node, by node position.
///
/// Rank held by nodes without successors is spread evenly over all nodes.
/// Iteration stops when the L1 change drops below `n * tolerance` or the
/// iteration cap is hit, whichever comes first.
pub(crate) fn compute(adjacency: &Adjacency, params: PageRankParams) -> Vec<f64> {
    let n = adjacency.len();
    if n == 0 {
        return Vec::new();
    }
    let uniform = 1.0 / n as f64;
    let out_degree: Vec<usize> = (0..n).map(|v| adjacency.outgoing(v).len()).collect();

    let mut rank = vec![uniform; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < params.max_iterations {
        iterations += 1;

        let dangling: f64 = (0..n)
            .filter(|&v| out_degree[v] == 0)
            .map(|v| rank[v])
            .sum();
        let base = (1.0 - params.damping) * uniform + params.damping * dangling * uniform;

        let next: Vec<f64> = (0..n)
            .into_par_iter()
            .map(|v| {
                let inflow: f64 = adjacency
                    .incoming(v)
                    .iter()
                    .map(|&u| rank[u] / out_degree[u] as f64)
                    .sum();
                base + params.damping * inflow
            })
            .collect();

        let change: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if change < n as f64 * params.tolerance {
            converged = true;
            break;
        }
    }

    debug!(iterations, converged, "pagerank finished");

    if !params.normalize {
        rank.iter_mut().for_each(|r| *r *= n as f64);
    }
    rank
}
