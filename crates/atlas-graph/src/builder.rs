//! Graph builder for constructing the knowledge graph from a payload.
//!
//! The builder takes nodes and raw links and resolves link endpoints into
//! actual graph edges. Problems with individual records never abort the
//! build; they are logged and collected in a [`LoadReport`].

use crate::graph::{KnowledgeGraph, NodeId};
use atlas_core::{Link, Node, RawLink};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Why a link was left out of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DropReason {
    /// An endpoint carried no usable id.
    MalformedEndpoint,
    /// The source id names no node.
    UnknownSource(String),
    /// The target id names no node.
    UnknownTarget(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedEndpoint => write!(f, "malformed endpoint"),
            Self::UnknownSource(id) => write!(f, "unknown source node `{}`", id),
            Self::UnknownTarget(id) => write!(f, "unknown target node `{}`", id),
        }
    }
}

/// A link that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedLink {
    /// Position of the link in the payload.
    pub position: usize,
    pub reason: DropReason,
}

/// Summary of a load. Warnings here are non-fatal by definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub nodes_loaded: usize,
    pub links_loaded: usize,
    /// Ids that appeared more than once. The first occurrence was kept.
    pub duplicate_nodes: Vec<String>,
    pub dropped_links: Vec<DroppedLink>,
}

impl LoadReport {
    pub fn has_warnings(&self) -> bool {
        !self.duplicate_nodes.is_empty() || !self.dropped_links.is_empty()
    }

    /// Returns a one-line summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "{} nodes, {} links ({} links dropped, {} duplicate nodes)",
            self.nodes_loaded,
            self.links_loaded,
            self.dropped_links.len(),
            self.duplicate_nodes.len()
        )
    }
}

/// Builds a KnowledgeGraph from payload records.
///
/// The builder handles the two-pass process:
/// 1. Add all nodes to the graph
/// 2. Resolve link endpoints into edges once every node is known
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: KnowledgeGraph,
    pending: Vec<RawLink>,
    report: LoadReport,
}

impl GraphBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds nodes. Ids already present are skipped with a warning.
    pub fn add_nodes(&mut self, nodes: Vec<Node>) {
        for node in nodes {
            if self.graph.contains(&node.id) {
                warn!(id = %node.id, "duplicate node id, keeping first occurrence");
                self.report.duplicate_nodes.push(node.id);
                continue;
            }
            self.graph.add_node(node);
        }
    }

    /// Queues links for resolution. Nothing is validated until `build`,
    /// so links may arrive before the nodes they reference.
    pub fn add_links(&mut self, links: Vec<RawLink>) {
        self.pending.extend(links);
    }

    /// Resolves every queued link into a graph edge or a dropped-link entry.
    fn resolve_links(&mut self) {
        let pending = std::mem::take(&mut self.pending);

        for (position, raw) in pending.into_iter().enumerate() {
            match self.resolve(&raw) {
                Ok((from, to, link)) => {
                    self.graph.add_link(from, to, link);
                }
                Err(reason) => {
                    warn!(position, %reason, "dropping link");
                    self.report
                        .dropped_links
                        .push(DroppedLink { position, reason });
                }
            }
        }
    }

    fn resolve(&self, raw: &RawLink) -> Result<(NodeId, NodeId, Link), DropReason> {
        let source = raw
            .source
            .canonical_id()
            .ok_or(DropReason::MalformedEndpoint)?;
        let target = raw
            .target
            .canonical_id()
            .ok_or(DropReason::MalformedEndpoint)?;

        let from = self
            .graph
            .get_index(&source)
            .ok_or_else(|| DropReason::UnknownSource(source.clone()))?;
        let to = self
            .graph
            .get_index(&target)
            .ok_or_else(|| DropReason::UnknownTarget(target.clone()))?;

        let link = Link {
            source,
            target,
            kind: raw.kind.clone(),
            weight: raw.weight,
        };
        Ok((from, to, link))
    }

    /// Finishes building and returns the graph with its load report.
    pub fn build(mut self) -> (KnowledgeGraph, LoadReport) {
        self.resolve_links();

        self.report.nodes_loaded = self.graph.node_count();
        self.report.links_loaded = self.graph.link_count();
        self.graph.dropped_links = self.report.dropped_links.len();

        if self.report.has_warnings() {
            info!("graph loaded with warnings: {}", self.report.summary());
        } else {
            debug!("graph loaded: {}", self.report.summary());
        }

        (self.graph, self.report)
    }
}
