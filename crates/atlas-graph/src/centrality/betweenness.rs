//! Betweenness centrality (Brandes).
//!
//! Shortest paths never leave a weakly connected component, so each
//! component is solved on its own, in parallel, and the partial score
//! vectors are scattered back into graph order. Scaling uses the size of the
//! whole graph so scores from different components stay comparable.

use super::components::Components;
use crate::adjacency::Adjacency;
use rayon::prelude::*;
use std::collections::VecDeque;

/// Betweenness of every node, by node position.
pub(crate) fn compute(adjacency: &Adjacency, components: &Components, normalize: bool) -> Vec<f64> {
    let n = adjacency.len();

    let partial: Vec<Vec<f64>> = components
        .groups()
        .par_iter()
        .map(|members| {
            let successors: Vec<Vec<usize>> = members
                .iter()
                .map(|&v| {
                    adjacency
                        .outgoing(v)
                        .iter()
                        .map(|&w| components.local_index(w))
                        .collect()
                })
                .collect();
            brandes(&successors)
        })
        .collect();

    let mut scores = vec![0.0; n];
    for (members, local) in components.groups().iter().zip(partial) {
        for (&v, score) in members.iter().zip(local) {
            scores[v] = score;
        }
    }

    let scale = scale_factor(n, adjacency.is_directed(), normalize);
    if scale != 1.0 {
        scores.iter_mut().for_each(|s| *s *= scale);
    }
    scores
}

/// Factor applied to raw Brandes sums.
///
/// Undirected sums see every pair from both ends, hence the halving.
fn scale_factor(n: usize, directed: bool, normalize: bool) -> f64 {
    let halve = if directed { 1.0 } else { 0.5 };
    if !normalize || n <= 2 {
        return halve;
    }
    let pairs = ((n - 1) * (n - 2)) as f64;
    if directed {
        1.0 / pairs
    } else {
        2.0 * halve / pairs
    }
}

/// Raw dependency sums over a local successor list.
fn brandes(successors: &[Vec<usize>]) -> Vec<f64> {
    let n = successors.len();
    let mut centrality = vec![0.0; n];
    if n < 3 {
        return centrality;
    }

    let mut stack = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut distance = vec![-1i64; n];
    let mut delta = vec![0.0f64; n];
    let mut queue = VecDeque::new();

    for source in 0..n {
        stack.clear();
        predecessors.iter_mut().for_each(Vec::clear);
        sigma.iter_mut().for_each(|s| *s = 0.0);
        distance.iter_mut().for_each(|d| *d = -1);
        delta.iter_mut().for_each(|d| *d = 0.0);

        sigma[source] = 1.0;
        distance[source] = 0;
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for &w in &successors[v] {
                if distance[w] < 0 {
                    distance[w] = distance[v] + 1;
                    queue.push_back(w);
                }
                if distance[w] == distance[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                centrality[w] += delta[w];
            }
        }
    }

    centrality
}
