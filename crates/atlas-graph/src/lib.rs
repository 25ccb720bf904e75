//! Atlas Graph - Knowledge-graph analytics
//!
//! This crate turns a decoded [`GraphPayload`](atlas_core::GraphPayload) into
//! an immutable graph snapshot and answers the questions a renderer asks of
//! it: what surrounds a concept, what matches a query, how to split the graph
//! for progressive drawing, what to show at a given camera distance, which
//! concepts are central and how they group into communities.
//!
//! # Architecture
//!
//! The graph uses petgraph internally with additional indexes for:
//! - Id lookups (every link is resolved once, at load time)
//! - Token and substring search over node text
//! - Compact adjacency snapshots for the analytics passes
//!
//! Every query borrows the graph immutably and keeps its state local, so
//! many queries can run against one snapshot at once.
//!
//! # Example
//!
//! ```
//! use atlas_core::{GraphPayload, LinkKind, Node, NodeKind, RawLink};
//! use atlas_graph::{Algorithm, CentralityOptions, KnowledgeGraph};
//!
//! let payload = GraphPayload::new(
//!     vec![
//!         Node::new("doping", NodeKind::Method),
//!         Node::new("perovskite", NodeKind::Material),
//!         Node::new("efficiency", NodeKind::Phenomenon),
//!     ],
//!     vec![
//!         RawLink::new("doping", "perovskite", LinkKind::Improves),
//!         RawLink::new("perovskite", "efficiency", LinkKind::Enables),
//!     ],
//! );
//! let (graph, report) = KnowledgeGraph::from_payload(payload);
//! assert!(!report.has_warnings());
//!
//! let around = graph.neighbors("perovskite", 1);
//! assert_eq!(around.nodes.len(), 3);
//!
//! let scores = graph
//!     .centrality(Algorithm::Betweenness, &CentralityOptions::new())
//!     .unwrap();
//! assert_eq!(scores.top_n(1)[0].node_id, "perovskite");
//! ```

mod adjacency;
mod builder;
pub mod centrality;
mod cluster;
mod community;
mod config;
mod error;
mod filter;
mod gaps;
mod graph;
pub mod lod;
mod search_index;
mod traversal;

pub use builder::{DropReason, DroppedLink, GraphBuilder, LoadReport};
pub use centrality::{
    Algorithm, CentralityEngine, CentralityMetadata, CentralityOptions, CentralityRequest,
    CentralityResult, CentralityScore, ComponentStats,
};
pub use cluster::{BoundingBox, Cluster, ClusterSet};
pub use community::{
    Community, CommunityOptions, CommunityResult, DEFAULT_MAX_LEVELS, DEFAULT_MODULARITY_TOLERANCE,
    DEFAULT_RESOLUTION,
};
pub use config::{AnalyticsConfig, LodConfig, CONFIG_DIR, CONFIG_FILE};
pub use error::{GraphError, Result};
pub use filter::DEFAULT_CONTEXT_DEPTH;
pub use gaps::PotentialLink;
pub use graph::{GraphStats, KnowledgeGraph, NodeId, Subgraph};
pub use lod::{DetailLevel, LodScorer};
pub use search_index::{tokenize, SearchIndex};
pub use traversal::Neighborhood;
