//! Link-gap prediction.
//!
//! Two concepts from different categories that feed into the same
//! successors, but are not linked themselves, are candidates for a missing
//! relationship. Candidates are ranked by how many successors they share.

use crate::adjacency::{sorted_intersection_len, Adjacency};
use crate::graph::KnowledgeGraph;
use atlas_core::{Node, NodeKind};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// A predicted link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialLink {
    pub source: String,
    pub target: String,
    /// Number of shared successors.
    pub score: usize,
    pub source_kind: NodeKind,
    pub target_kind: NodeKind,
}

impl KnowledgeGraph {
    /// Ranks unlinked cross-category pairs by shared successors.
    ///
    /// Pairs are ordered: (u, v) is a candidate when there is no u → v link,
    /// whether or not v → u exists. Only pairs sharing at least one successor
    /// are returned, best first, at most `limit` of them.
    pub fn predict_links(&self, limit: usize) -> Vec<PotentialLink> {
        if limit == 0 {
            return Vec::new();
        }

        let adjacency = Adjacency::build(self, true);
        let nodes: Vec<&Node> = self.nodes().collect();
        let n = nodes.len();

        let mut candidates: Vec<(usize, usize, usize)> = (0..n)
            .into_par_iter()
            .flat_map_iter(|u| {
                let adjacency = &adjacency;
                let nodes = &nodes;
                (0..n).filter_map(move |v| {
                    if u == v || nodes[u].kind == nodes[v].kind || adjacency.has_link(u, v) {
                        return None;
                    }
                    let shared =
                        sorted_intersection_len(adjacency.outgoing(u), adjacency.outgoing(v));
                    (shared > 0).then_some((u, v, shared))
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.2.cmp(&a.2)
                .then_with(|| nodes[a.0].id.cmp(&nodes[b.0].id))
                .then_with(|| nodes[a.1].id.cmp(&nodes[b.1].id))
        });

        debug!(candidates = candidates.len(), limit, "link gaps ranked");

        candidates
            .into_iter()
            .take(limit)
            .map(|(u, v, score)| PotentialLink {
                source: nodes[u].id.clone(),
                target: nodes[v].id.clone(),
                score,
                source_kind: nodes[u].kind.clone(),
                target_kind: nodes[v].kind.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{GraphPayload, LinkKind, RawLink};

    //  doping(Method) ──┐
    //                   ├──> efficiency, stability
    //  perovskite(Mat) ─┘
    //  annealing(Method) ──> efficiency
    fn graph() -> KnowledgeGraph {
        let payload = GraphPayload::new(
            vec![
                Node::new("doping", NodeKind::Method),
                Node::new("perovskite", NodeKind::Material),
                Node::new("annealing", NodeKind::Method),
                Node::new("efficiency", NodeKind::Phenomenon),
                Node::new("stability", NodeKind::Phenomenon),
            ],
            vec![
                RawLink::new("doping", "efficiency", LinkKind::Improves),
                RawLink::new("doping", "stability", LinkKind::Improves),
                RawLink::new("perovskite", "efficiency", LinkKind::Enables),
                RawLink::new("perovskite", "stability", LinkKind::Enables),
                RawLink::new("annealing", "efficiency", LinkKind::Improves),
            ],
        );
        KnowledgeGraph::from_payload(payload).0
    }

    fn pairs(links: &[PotentialLink]) -> Vec<(&str, &str, usize)> {
        links
            .iter()
            .map(|l| (l.source.as_str(), l.target.as_str(), l.score))
            .collect()
    }

    #[test]
    fn test_ranked_by_shared_successors() {
        let links = graph().predict_links(10);
        assert_eq!(
            pairs(&links),
            vec![
                ("doping", "perovskite", 2),
                ("perovskite", "doping", 2),
                ("annealing", "perovskite", 1),
                ("perovskite", "annealing", 1),
            ]
        );
        assert_eq!(links[0].source_kind, NodeKind::Method);
    }

    #[test]
    fn test_same_category_pairs_skipped() {
        let links = graph().predict_links(10);
        assert!(!links
            .iter()
            .any(|l| l.source == "doping" && l.target == "annealing"));
    }

    #[test]
    fn test_existing_link_skipped() {
        let payload = GraphPayload::new(
            vec![
                Node::new("a", NodeKind::Method),
                Node::new("b", NodeKind::Material),
                Node::new("c", NodeKind::Phenomenon),
            ],
            vec![
                RawLink::new("a", "c", LinkKind::Causes),
                RawLink::new("b", "c", LinkKind::Causes),
                RawLink::new("a", "b", LinkKind::Uses),
            ],
        );
        let (g, _) = KnowledgeGraph::from_payload(payload);
        assert_eq!(pairs(&g.predict_links(10)), vec![("b", "a", 1)]);
    }

    #[test]
    fn test_limit() {
        assert_eq!(graph().predict_links(1).len(), 1);
        assert!(graph().predict_links(0).is_empty());
    }
}
