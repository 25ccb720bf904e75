//! Core graph data structure.
//!
//! The KnowledgeGraph wraps petgraph and adds an id index for O(1) lookups.
//! It is built once from a payload by the [`GraphBuilder`](crate::GraphBuilder)
//! and is read-only afterwards: every analytics call borrows it immutably, so
//! any number of calls can share one snapshot.

use crate::builder::{GraphBuilder, LoadReport};
use atlas_core::{GraphPayload, Link, Node, NodeKind, RawLink};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Index of a node inside a graph snapshot.
pub type NodeId = NodeIndex;

/// The knowledge graph.
///
/// Node indexes follow payload order, and so do link indexes, because the
/// graph never removes anything once built.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    /// The underlying petgraph graph.
    pub(crate) graph: DiGraph<Node, Link>,

    /// Maps string ids to graph node indexes.
    id_index: HashMap<String, NodeId>,

    /// Links rejected while building this snapshot.
    pub(crate) dropped_links: usize,
}

/// A set of nodes with the links between them.
///
/// This is the `{ nodes, links }` shape handed to renderers for traversal
/// and filter results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Subgraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if a node with this id is part of the subgraph.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Ids of all nodes, in order.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

impl KnowledgeGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a payload, canonicalizing and validating links.
    pub fn from_payload(payload: GraphPayload) -> (Self, LoadReport) {
        let mut builder = GraphBuilder::new();
        builder.add_nodes(payload.nodes);
        builder.add_links(payload.links);
        builder.build()
    }

    /// Adds a node. The caller guarantees the id is not present yet.
    pub(crate) fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.id_index.insert(id, index);
        index
    }

    /// Adds a link between two nodes that already exist.
    pub(crate) fn add_link(&mut self, from: NodeId, to: NodeId, link: Link) -> EdgeIndex {
        self.graph.add_edge(from, to, link)
    }

    /// Gets a node by its string id.
    pub fn get_by_id(&self, id: &str) -> Option<&Node> {
        let index = self.id_index.get(id)?;
        self.graph.node_weight(*index)
    }

    /// Gets a node by its graph index.
    pub fn get(&self, index: NodeId) -> Option<&Node> {
        self.graph.node_weight(index)
    }

    /// Gets the node index for a string id.
    pub fn get_index(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_index.contains_key(id)
    }

    /// Finds all nodes of a category.
    pub fn find_by_kind(&self, kind: &NodeKind) -> Vec<&Node> {
        self.graph
            .node_weights()
            .filter(|node| &node.kind == kind)
            .collect()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of validated links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterates over all nodes in payload order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Iterates over all validated links in payload order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.graph.edge_weights()
    }

    /// Iterates over all node indexes.
    pub fn node_indexes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Links touching `index` in either direction, with the opposite endpoint,
    /// in payload order.
    ///
    /// A self-loop is reported twice, once per direction.
    pub fn incident_links(&self, index: NodeId) -> Vec<(EdgeIndex, NodeId, &Link)> {
        // petgraph walks adjacency newest first; sort to keep payload order.
        let mut incident: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|e| (e.id(), e.target(), e.weight()))
            .chain(
                self.graph
                    .edges_directed(index, Direction::Incoming)
                    .map(|e| (e.id(), e.source(), e.weight())),
            )
            .collect();
        incident.sort_by_key(|(edge, _, _)| *edge);
        incident
    }

    /// Returns the link stored at an edge index.
    pub fn link(&self, index: EdgeIndex) -> Option<&Link> {
        self.graph.edge_weight(index)
    }

    /// The whole graph as a [`Subgraph`].
    pub fn to_subgraph(&self) -> Subgraph {
        Subgraph {
            nodes: self.nodes().cloned().collect(),
            links: self.links().cloned().collect(),
        }
    }

    /// The subgraph induced on `members`: those nodes, in graph order, and
    /// every link whose endpoints are both members.
    pub fn induced_subgraph(&self, members: &HashSet<NodeId>) -> Subgraph {
        let nodes = self
            .graph
            .node_indices()
            .filter(|idx| members.contains(idx))
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect();

        let links = self
            .graph
            .edge_references()
            .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
            .map(|e| e.weight().clone())
            .collect();

        Subgraph { nodes, links }
    }

    /// Exports the graph back into payload form.
    pub fn to_payload(&self) -> GraphPayload {
        GraphPayload::new(
            self.nodes().cloned().collect(),
            self.links().cloned().map(RawLink::from).collect(),
        )
    }
}

/// Graph statistics for the stats command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub link_count: usize,
    /// Payload links that did not resolve at load time.
    pub dropped_links: usize,
    pub isolated_nodes: usize,
    /// Node count per category tag, sorted by tag.
    pub kinds: BTreeMap<String, usize>,
}

impl KnowledgeGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut kinds = BTreeMap::new();
        for node in self.nodes() {
            *kinds.entry(node.kind.as_str().to_string()).or_insert(0) += 1;
        }

        let isolated_nodes = self
            .node_indexes()
            .filter(|&idx| self.incident_links(idx).is_empty())
            .count();

        GraphStats {
            node_count: self.node_count(),
            link_count: self.link_count(),
            dropped_links: self.dropped_links,
            isolated_nodes,
            kinds,
        }
    }
}
