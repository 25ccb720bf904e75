//! Degree centrality.

use crate::adjacency::Adjacency;

/// Distinct neighbor count of every node, by node position.
///
/// Directed mode adds in-degree and out-degree, so a node linked both ways
/// with the same neighbor counts it twice. Normalized scores divide by
/// `n - 1`.
pub(crate) fn compute(adjacency: &Adjacency, normalize: bool) -> Vec<f64> {
    let n = adjacency.len();
    let scale = if normalize && n > 1 {
        1.0 / (n - 1) as f64
    } else {
        1.0
    };

    (0..n)
        .map(|v| {
            let degree = if adjacency.is_directed() {
                adjacency.outgoing(v).len() + adjacency.incoming(v).len()
            } else {
                adjacency.outgoing(v).len()
            };
            degree as f64 * scale
        })
        .collect()
}
