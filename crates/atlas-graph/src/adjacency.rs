//! Compact adjacency lists for the analytics passes.
//!
//! Clustering and centrality run many BFS passes; walking petgraph's linked
//! edge lists and re-reading link records in each pass is wasteful. This
//! snapshot flattens the graph into sorted, deduplicated neighbor lists
//! indexed by node position.

use crate::graph::KnowledgeGraph;
use petgraph::visit::EdgeRef;

/// Neighbor lists keyed by node index.
///
/// In undirected mode `outgoing` and `incoming` hold the same symmetric
/// lists. Parallel links collapse to one entry and self-loops are dropped,
/// since neither changes a shortest path.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency {
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    directed: bool,
}

impl Adjacency {
    pub(crate) fn build(graph: &KnowledgeGraph, directed: bool) -> Self {
        let n = graph.node_count();
        let mut outgoing = vec![Vec::new(); n];
        let mut incoming = vec![Vec::new(); n];

        for edge in graph.graph.edge_references() {
            let (s, t) = (edge.source().index(), edge.target().index());
            if s == t {
                continue;
            }
            outgoing[s].push(t);
            incoming[t].push(s);
            if !directed {
                outgoing[t].push(s);
                incoming[s].push(t);
            }
        }

        for list in outgoing.iter_mut().chain(incoming.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            outgoing,
            incoming,
            directed,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.outgoing.len()
    }

    pub(crate) fn is_directed(&self) -> bool {
        self.directed
    }

    /// Successors of `v` (all neighbors when undirected).
    pub(crate) fn outgoing(&self, v: usize) -> &[usize] {
        &self.outgoing[v]
    }

    /// Predecessors of `v` (all neighbors when undirected).
    pub(crate) fn incoming(&self, v: usize) -> &[usize] {
        &self.incoming[v]
    }

    /// True if there is a link from `u` to `v`.
    pub(crate) fn has_link(&self, u: usize, v: usize) -> bool {
        self.outgoing[u].binary_search(&v).is_ok()
    }
}

/// Size of the intersection of two sorted lists.
pub(crate) fn sorted_intersection_len(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{GraphPayload, LinkKind, Node, NodeKind, RawLink};

    fn graph() -> KnowledgeGraph {
        let payload = GraphPayload::new(
            ["a", "b", "c"]
                .iter()
                .map(|id| Node::new(*id, NodeKind::Method))
                .collect(),
            vec![
                RawLink::new("a", "b", LinkKind::Uses),
                RawLink::new("a", "b", LinkKind::Causes),
                RawLink::new("c", "a", LinkKind::Uses),
                RawLink::new("c", "c", LinkKind::Uses),
            ],
        );
        KnowledgeGraph::from_payload(payload).0
    }

    #[test]
    fn test_directed_lists() {
        let adj = Adjacency::build(&graph(), true);
        assert_eq!(adj.outgoing(0), &[1]);
        assert_eq!(adj.incoming(0), &[2]);
        assert_eq!(adj.outgoing(2), &[0]);
        assert!(adj.has_link(0, 1));
        assert!(!adj.has_link(1, 0));
    }

    #[test]
    fn test_undirected_lists_are_symmetric() {
        let adj = Adjacency::build(&graph(), false);
        assert_eq!(adj.outgoing(0), &[1, 2]);
        assert_eq!(adj.outgoing(1), &[0]);
        assert_eq!(adj.outgoing(2), &[0]);
        assert!(adj.has_link(1, 0));
    }

    #[test]
    fn test_intersection() {
        assert_eq!(sorted_intersection_len(&[1, 3, 5, 7], &[3, 4, 5]), 2);
        assert_eq!(sorted_intersection_len(&[], &[1]), 0);
    }
}
