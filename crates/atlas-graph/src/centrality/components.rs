//! Weakly connected components.

use crate::graph::KnowledgeGraph;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Weakly connected components of a graph snapshot.
///
/// Component ids are assigned in order of the first node of each component,
/// and members are listed in node order.
#[derive(Debug, Clone)]
pub(crate) struct Components {
    /// Members of each component, by node position.
    groups: Vec<Vec<usize>>,
    /// Component of each node.
    component_of: Vec<usize>,
    /// Position of each node inside its component's member list.
    local_index: Vec<usize>,
}

impl Components {
    pub(crate) fn weakly_connected(graph: &KnowledgeGraph) -> Self {
        let n = graph.node_count();
        let mut sets = UnionFind::<usize>::new(n);
        for edge in graph.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut ids: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut component_of = vec![0; n];
        let mut local_index = vec![0; n];

        for v in 0..n {
            let root = sets.find(v);
            let id = *ids.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            local_index[v] = groups[id].len();
            groups[id].push(v);
            component_of[v] = id;
        }

        Self {
            groups,
            component_of,
            local_index,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub(crate) fn members(&self, component: usize) -> &[usize] {
        &self.groups[component]
    }

    pub(crate) fn component_of(&self, v: usize) -> usize {
        self.component_of[v]
    }

    pub(crate) fn local_index(&self, v: usize) -> usize {
        self.local_index[v]
    }
}
