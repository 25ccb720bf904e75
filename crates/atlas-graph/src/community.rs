//! Community detection.
//!
//! Communities are found with the Louvain method on the undirected view of
//! the graph: nodes are moved greedily between neighboring communities while
//! modularity improves, then every community is collapsed into a single node
//! and the pass repeats on the smaller graph. Node order is fixed, so the
//! same snapshot always yields the same partition.
//!
//! Each community is led by its member with the highest PageRank, computed
//! on the directed graph.

use crate::adjacency::Adjacency;
use crate::centrality::{Algorithm, CentralityEngine, CentralityOptions};
use crate::error::{GraphError, Result};
use crate::graph::KnowledgeGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_RESOLUTION: f64 = 1.0;
pub const DEFAULT_MAX_LEVELS: usize = 10;
pub const DEFAULT_MODULARITY_TOLERANCE: f64 = 1e-7;

/// Smallest gain that justifies moving a node.
const MIN_GAIN: f64 = 1e-12;

/// Louvain tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct CommunityOptions {
    /// Higher values favor smaller communities.
    pub resolution: f64,
    /// Upper bound on aggregation rounds.
    pub max_levels: usize,
    /// Stop once a round improves modularity by less than this.
    pub tolerance: f64,
}

impl Default for CommunityOptions {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
            max_levels: DEFAULT_MAX_LEVELS,
            tolerance: DEFAULT_MODULARITY_TOLERANCE,
        }
    }
}

impl CommunityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes options from a JSON value. Unknown keys are rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| GraphError::InvalidOptions(e.to_string()))
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(GraphError::invalid_parameter(
                "resolution",
                "must be a positive number",
            ));
        }
        if self.max_levels == 0 {
            return Err(GraphError::invalid_parameter("maxLevels", "must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(GraphError::invalid_parameter("tolerance", "must not be negative"));
        }
        Ok(())
    }
}

/// One detected community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: usize,
    pub size: usize,
    /// Member ids in graph order.
    pub members: Vec<String>,
    /// Member with the highest PageRank. Ties go to the earliest member.
    pub leader_id: String,
    pub leader_score: f64,
}

/// The partition plus its quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResult {
    /// Ordered by id. Ids follow the first appearance of a member in graph
    /// order.
    pub communities: Vec<Community>,
    pub modularity: f64,
    /// Aggregation rounds that moved at least one node.
    pub levels: usize,
    /// Wall time in milliseconds.
    pub execution_time: f64,
}

impl CommunityResult {
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Returns the community holding a node.
    pub fn community_of(&self, node_id: &str) -> Option<&Community> {
        self.communities
            .iter()
            .find(|c| c.members.iter().any(|m| m == node_id))
    }
}

/// Weighted undirected graph at one aggregation level.
struct Level {
    /// Neighbor and link weight, self-loops excluded.
    links: Vec<Vec<(usize, f64)>>,
    /// Weight of links inside each node, counted once.
    internal: Vec<f64>,
    /// Weighted degree, including internal links twice.
    strength: Vec<f64>,
}

impl Level {
    fn from_adjacency(adjacency: &Adjacency) -> Self {
        let n = adjacency.len();
        let links: Vec<Vec<(usize, f64)>> = (0..n)
            .map(|v| adjacency.outgoing(v).iter().map(|&u| (u, 1.0)).collect())
            .collect();
        let strength = links.iter().map(|l| l.len() as f64).collect();
        Self {
            links,
            internal: vec![0.0; n],
            strength,
        }
    }

    fn len(&self) -> usize {
        self.links.len()
    }

    /// Modularity with every node of this level in its own community.
    fn modularity(&self, total_weight: f64, resolution: f64) -> f64 {
        let m2 = 2.0 * total_weight;
        self.internal
            .iter()
            .zip(&self.strength)
            .map(|(&inside, &strength)| {
                inside / total_weight - resolution * (strength / m2) * (strength / m2)
            })
            .sum()
    }

    /// Collapses each community into one node.
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut internal = vec![0.0; count];
        let mut strength = vec![0.0; count];
        let mut between: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];

        for v in 0..self.len() {
            let c = community[v];
            internal[c] += self.internal[v];
            strength[c] += self.strength[v];
            for &(u, w) in &self.links[v] {
                let d = community[u];
                if c == d {
                    // Seen once from each end.
                    internal[c] += w / 2.0;
                } else {
                    *between[c].entry(d).or_insert(0.0) += w;
                }
            }
        }

        Self {
            links: between.into_iter().map(|m| m.into_iter().collect()).collect(),
            internal,
            strength,
        }
    }

    /// Greedy local moving. Returns contiguous community ids in order of
    /// first appearance and whether any node moved.
    fn local_moving(&self, total_weight: f64, resolution: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let m2 = 2.0 * total_weight;
        let mut community: Vec<usize> = (0..n).collect();
        let mut totals = self.strength.clone();
        let mut moved_any = false;

        loop {
            let mut moved = false;
            for v in 0..n {
                let k = self.strength[v];
                let current = community[v];

                let mut weights: BTreeMap<usize, f64> = BTreeMap::new();
                for &(u, w) in &self.links[v] {
                    *weights.entry(community[u]).or_insert(0.0) += w;
                }

                totals[current] -= k;
                let gain = |c: usize, k_in: f64| k_in - resolution * k * totals[c] / m2;

                let mut best = current;
                let mut best_gain = gain(current, weights.get(&current).copied().unwrap_or(0.0));
                for (&c, &k_in) in &weights {
                    let candidate = gain(c, k_in);
                    if candidate > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = candidate;
                    }
                }

                totals[best] += k;
                if best != current {
                    community[v] = best;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
            moved_any = true;
        }

        (renumber(&community), moved_any)
    }
}

/// Maps labels to 0, 1, 2 ... in order of first appearance.
fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut ids: BTreeMap<usize, usize> = BTreeMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = ids.len();
            *ids.entry(label).or_insert(next)
        })
        .collect()
}

/// Louvain partition of the undirected graph. Returns one label per node in
/// graph order, the modularity and the number of productive levels.
fn louvain(adjacency: &Adjacency, options: &CommunityOptions) -> (Vec<usize>, f64, usize) {
    let n = adjacency.len();
    let mut level = Level::from_adjacency(adjacency);
    let total_weight = level.strength.iter().sum::<f64>() / 2.0;
    if total_weight == 0.0 {
        return ((0..n).collect(), 0.0, 0);
    }

    let mut assignment: Vec<usize> = (0..n).collect();
    let mut modularity = level.modularity(total_weight, options.resolution);
    let mut levels = 0;

    while levels < options.max_levels {
        let (community, moved) = level.local_moving(total_weight, options.resolution);
        if !moved {
            break;
        }
        levels += 1;

        for label in assignment.iter_mut() {
            *label = community[*label];
        }
        let count = community.iter().max().map_or(0, |&c| c + 1);
        level = level.aggregate(&community, count);

        let next = level.modularity(total_weight, options.resolution);
        let gain = next - modularity;
        modularity = next;
        if gain < options.tolerance {
            break;
        }
    }

    (renumber(&assignment), modularity, levels)
}

impl KnowledgeGraph {
    /// Detects communities and picks a leader for each.
    ///
    /// Link direction is ignored for the partition, and parallel links and
    /// self-loops count as a single link or none at all. Isolated nodes end
    /// up as singleton communities.
    pub fn communities(&self, options: &CommunityOptions) -> Result<CommunityResult> {
        options.validate()?;

        let start = Instant::now();
        if self.is_empty() {
            return Ok(CommunityResult {
                communities: Vec::new(),
                modularity: 0.0,
                levels: 0,
                execution_time: 0.0,
            });
        }

        let adjacency = Adjacency::build(self, false);
        let (labels, modularity, levels) = louvain(&adjacency, options);

        let pagerank = CentralityEngine::execute(
            self,
            Algorithm::PageRank,
            &CentralityOptions::new().with_directed(true),
        )?;

        let count = labels.iter().max().map_or(0, |&c| c + 1);
        let mut communities: Vec<Community> = (0..count)
            .map(|id| Community {
                id,
                size: 0,
                members: Vec::new(),
                leader_id: String::new(),
                leader_score: f64::NEG_INFINITY,
            })
            .collect();

        for (score, &label) in pagerank.data.iter().zip(&labels) {
            let community = &mut communities[label];
            community.size += 1;
            community.members.push(score.node_id.clone());
            if score.score > community.leader_score {
                community.leader_id = score.node_id.clone();
                community.leader_score = score.score;
            }
        }

        let execution_time = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            nodes = self.node_count(),
            communities = communities.len(),
            modularity,
            levels,
            execution_time,
            "communities detected"
        );

        Ok(CommunityResult {
            communities,
            modularity,
            levels,
            execution_time,
        })
    }
}
