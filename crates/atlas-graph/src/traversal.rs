//! Bounded breadth-first neighbor expansion.
//!
//! Traversal ignores link direction: a concept's neighborhood includes what
//! it points at and what points at it. All traversal state (queue, visited
//! set, hop counts) lives in the call, so concurrent traversals over one
//! graph never interfere.

use crate::graph::{KnowledgeGraph, NodeId, Subgraph};
use atlas_core::{Link, Node};
use petgraph::graph::EdgeIndex;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Result of a neighbor expansion.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Neighborhood {
    /// Reached nodes in BFS order, start node first.
    pub nodes: Vec<Node>,
    /// Links crossed during the expansion, in the order they were crossed.
    pub links: Vec<Link>,
    /// Hop distance of each reached node from the start.
    #[serde(skip)]
    hops: HashMap<String, usize>,
}

impl Neighborhood {
    /// Returns the hop distance of a reached node.
    pub fn depth_of(&self, id: &str) -> Option<usize> {
        self.hops.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hops.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn into_subgraph(self) -> Subgraph {
        Subgraph {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

impl KnowledgeGraph {
    /// Expands from `start` up to `depth` hops.
    ///
    /// The start node is always included when it exists, even at depth 0.
    /// An unknown start yields an empty neighborhood. Each node is enqueued
    /// at most once, so cycles terminate.
    pub fn neighbors(&self, start: &str, depth: usize) -> Neighborhood {
        let Some(start_idx) = self.get_index(start) else {
            debug!(start, "traversal start not found");
            return Neighborhood::default();
        };

        let reached = self.bfs(start_idx, depth);

        let mut result = Neighborhood::default();
        for (idx, hops) in reached.order {
            if let Some(node) = self.get(idx) {
                result.hops.insert(node.id.clone(), hops);
                result.nodes.push(node.clone());
            }
        }
        result.links = reached
            .links
            .into_iter()
            .filter_map(|e| self.link(e).cloned())
            .collect();

        debug!(
            start,
            depth,
            nodes = result.nodes.len(),
            links = result.links.len(),
            "neighbors expanded"
        );
        result
    }

    /// Node indexes within `depth` hops of `start`, including `start`.
    pub(crate) fn reachable_within(&self, start: NodeId, depth: usize) -> Vec<NodeId> {
        self.bfs(start, depth)
            .order
            .into_iter()
            .map(|(idx, _)| idx)
            .collect()
    }

    fn bfs(&self, start: NodeId, max_depth: usize) -> Reached {
        let mut reached = Reached::default();
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut crossed: HashSet<EdgeIndex> = HashSet::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        visited.insert(start);
        reached.order.push((start, 0));
        queue.push_back((start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            for (edge, neighbor, _) in self.incident_links(current) {
                // Links are validated at load, but never follow one into nothing.
                if self.get(neighbor).is_none() {
                    continue;
                }

                if crossed.insert(edge) {
                    reached.links.push(edge);
                }

                if visited.insert(neighbor) {
                    reached.order.push((neighbor, depth + 1));
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        reached
    }
}

#[derive(Default)]
struct Reached {
    order: Vec<(NodeId, usize)>,
    links: Vec<EdgeIndex>,
}
