//! Centrality scoring.
//!
//! Every algorithm runs behind [`CentralityEngine::execute`] and produces the
//! same [`CentralityResult`] shape: one score per node plus per-component
//! statistics. Scores are computed over an immutable snapshot and nothing is
//! cached between calls.

mod betweenness;
mod components;
mod degree;
mod options;
mod pagerank;

pub use options::{
    CentralityOptions, CentralityRequest, DEFAULT_DAMPING, DEFAULT_MAX_ITERATIONS,
    DEFAULT_TOLERANCE,
};

use crate::adjacency::Adjacency;
use crate::error::{GraphError, Result};
use crate::graph::KnowledgeGraph;
use components::Components;
use pagerank::PageRankParams;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

/// The supported centrality algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Share of shortest paths passing through a node
    Betweenness,
    /// Number of distinct neighbors
    Degree,
    /// Stationary probability of a damped random walk
    #[serde(alias = "page_rank")]
    PageRank,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Self::Betweenness, Self::Degree, Self::PageRank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Betweenness => "betweenness",
            Self::Degree => "degree",
            Self::PageRank => "pagerank",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "betweenness" => Ok(Self::Betweenness),
            "degree" => Ok(Self::Degree),
            "pagerank" => Ok(Self::PageRank),
            other => Err(GraphError::InvalidOptions(format!(
                "unknown algorithm `{}`",
                other
            ))),
        }
    }
}

/// Score of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralityScore {
    pub node_id: String,
    pub score: f64,
    pub component_id: usize,
}

/// Score summary of one weakly connected component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStats {
    pub component_id: usize,
    pub node_count: usize,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
    /// First node, in graph order, holding the maximum.
    pub max_node_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralityMetadata {
    pub algorithm: Algorithm,
    pub normalize: bool,
    pub directed: bool,
    pub component_stats: Vec<ComponentStats>,
    /// Wall time in milliseconds.
    pub execution_time: f64,
}

/// Scores in graph order plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityResult {
    pub data: Vec<CentralityScore>,
    pub metadata: CentralityMetadata,
}

impl CentralityResult {
    fn empty(algorithm: Algorithm, options: &CentralityOptions) -> Self {
        Self {
            data: Vec::new(),
            metadata: CentralityMetadata {
                algorithm,
                normalize: options.normalize,
                directed: options.directed,
                component_stats: Vec::new(),
                execution_time: 0.0,
            },
        }
    }

    /// Score of a node by id.
    pub fn score(&self, node_id: &str) -> Option<f64> {
        self.data
            .iter()
            .find(|s| s.node_id == node_id)
            .map(|s| s.score)
    }

    /// Scores from highest to lowest, ties broken by id.
    pub fn sorted(&self) -> Vec<&CentralityScore> {
        let mut sorted: Vec<&CentralityScore> = self.data.iter().collect();
        sorted.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        sorted
    }

    /// The `n` highest-scoring nodes.
    pub fn top_n(&self, n: usize) -> Vec<&CentralityScore> {
        let mut sorted = self.sorted();
        sorted.truncate(n);
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Runs centrality algorithms.
pub struct CentralityEngine;

impl CentralityEngine {
    /// Validates the options, scores every node and summarizes per component.
    pub fn execute(
        graph: &KnowledgeGraph,
        algorithm: Algorithm,
        options: &CentralityOptions,
    ) -> Result<CentralityResult> {
        options.validate_for(algorithm)?;

        if graph.is_empty() {
            return Ok(CentralityResult::empty(algorithm, options));
        }

        let start = Instant::now();
        let adjacency = Adjacency::build(graph, options.directed);
        let components = Components::weakly_connected(graph);

        let scores = match algorithm {
            Algorithm::Betweenness => {
                betweenness::compute(&adjacency, &components, options.normalize)
            }
            Algorithm::Degree => degree::compute(&adjacency, options.normalize),
            Algorithm::PageRank => pagerank::compute(
                &adjacency,
                PageRankParams {
                    damping: options.damping(),
                    max_iterations: options.max_iterations(),
                    tolerance: options.tolerance(),
                    normalize: options.normalize,
                },
            ),
        };

        let ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        let data = ids
            .iter()
            .zip(&scores)
            .enumerate()
            .map(|(v, (id, &score))| CentralityScore {
                node_id: id.to_string(),
                score,
                component_id: components.component_of(v),
            })
            .collect();
        let component_stats = summarize(&components, &scores, &ids);

        let execution_time = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            %algorithm,
            nodes = graph.node_count(),
            components = components.len(),
            execution_time,
            "centrality computed"
        );

        Ok(CentralityResult {
            data,
            metadata: CentralityMetadata {
                algorithm,
                normalize: options.normalize,
                directed: options.directed,
                component_stats,
                execution_time,
            },
        })
    }

    /// Runs a decoded request.
    pub fn run(graph: &KnowledgeGraph, request: &CentralityRequest) -> Result<CentralityResult> {
        Self::execute(graph, request.algorithm, &request.options)
    }
}

fn summarize(components: &Components, scores: &[f64], ids: &[&str]) -> Vec<ComponentStats> {
    (0..components.len())
        .map(|component_id| {
            let members = components.members(component_id);
            let mut max_member = members[0];
            let mut min = f64::INFINITY;
            let mut sum = 0.0;
            for &v in members {
                let score = scores[v];
                sum += score;
                min = min.min(score);
                if score > scores[max_member] {
                    max_member = v;
                }
            }
            ComponentStats {
                component_id,
                node_count: members.len(),
                mean: sum / members.len() as f64,
                max: scores[max_member],
                min,
                max_node_id: ids[max_member].to_string(),
            }
        })
        .collect()
}

impl KnowledgeGraph {
    /// Shorthand for [`CentralityEngine::execute`].
    pub fn centrality(
        &self,
        algorithm: Algorithm,
        options: &CentralityOptions,
    ) -> Result<CentralityResult> {
        CentralityEngine::execute(self, algorithm, options)
    }
}
