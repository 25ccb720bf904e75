//! Text-driven filtering.
//!
//! A filter keeps the nodes whose id, label or description contains the query
//! plus their immediate neighbors, so each match is shown with its local
//! context. The links of the result are recomputed as the subgraph induced on
//! the kept nodes, which guarantees the renderer never receives a link to a
//! node it does not have.

use crate::graph::{KnowledgeGraph, NodeId, Subgraph};
use atlas_core::Node;
use std::collections::HashSet;
use tracing::debug;

/// Hops of context kept around each match by [`KnowledgeGraph::filter`].
pub const DEFAULT_CONTEXT_DEPTH: usize = 1;

/// True if the lower-cased query is a substring of the node's id, label or
/// description.
fn matches_text(node: &Node, query_lower: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(query_lower);

    contains(node.id.as_str())
        || node.label.as_deref().is_some_and(contains)
        || node.description.as_deref().is_some_and(contains)
}

impl KnowledgeGraph {
    /// Nodes that match the query directly, in graph order.
    ///
    /// This is raw substring matching, independent of the token index.
    pub fn text_matches(&self, query: &str) -> Vec<NodeId> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let query_lower = query.to_lowercase();

        self.node_indexes()
            .filter(|&idx| {
                self.get(idx)
                    .is_some_and(|node| matches_text(node, &query_lower))
            })
            .collect()
    }

    /// Filters the graph to matches plus one hop of context.
    ///
    /// An empty (or whitespace-only) query returns the whole graph.
    pub fn filter(&self, query: &str) -> Subgraph {
        self.filter_with_context(query, DEFAULT_CONTEXT_DEPTH)
    }

    /// Filters the graph to matches plus `context_depth` hops of context.
    pub fn filter_with_context(&self, query: &str, context_depth: usize) -> Subgraph {
        if query.trim().is_empty() {
            return self.to_subgraph();
        }

        let matches = self.text_matches(query);

        let mut keep: HashSet<NodeId> = HashSet::new();
        for &matched in &matches {
            keep.extend(self.reachable_within(matched, context_depth));
        }

        let result = self.induced_subgraph(&keep);
        debug!(
            query,
            matches = matches.len(),
            nodes = result.nodes.len(),
            links = result.links.len(),
            "filter applied"
        );
        result
    }
}
