//! Level of detail (LOD) scoring.
//!
//! Important nodes stay visible from further away. Importance comes from the
//! node's `value` and a fixed bonus per category; the visibility radius is the
//! importance scaled by the configured distance scale. Everything closer than
//! the near field is always drawn.

use crate::graph::KnowledgeGraph;
use atlas_core::{Node, NodeKind};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Importance every node starts with.
pub const BASE_IMPORTANCE: f64 = 0.5;

/// Largest contribution of `value` to importance.
pub const MAX_VALUE_BONUS: f64 = 0.4;

/// Visibility radius of a node with importance 1.
pub const DEFAULT_DISTANCE_SCALE: f64 = 10.0;

/// Distance under which every node is visible.
pub const DEFAULT_NEAR_FIELD: f64 = 1.0;

/// Bonus for categories outside the known set.
pub const OTHER_TYPE_BONUS: f64 = 0.05;

/// Importance bonus of a node category.
pub fn type_bonus(kind: &NodeKind) -> f64 {
    match kind {
        NodeKind::System => 0.3,
        NodeKind::Theoretical | NodeKind::Mechanism => 0.2,
        NodeKind::Phenomenon | NodeKind::Method => 0.15,
        NodeKind::Material | NodeKind::Application => 0.1,
        NodeKind::Documentation => 0.0,
        NodeKind::Other(_) => OTHER_TYPE_BONUS,
    }
}

/// Importance of a node in `[0.5, 1]`.
///
/// Negative and non-finite values add nothing.
pub fn importance(node: &Node) -> f64 {
    let value_bonus = node
        .value
        .filter(|v| v.is_finite())
        .map(|v| (v / 10.0).clamp(0.0, MAX_VALUE_BONUS))
        .unwrap_or(0.0);

    (BASE_IMPORTANCE + value_bonus + type_bonus(&node.kind)).min(1.0)
}

/// Visibility with the default scale and near field.
pub fn visible(node: &Node, distance: f64) -> bool {
    LodScorer::default().visible(node, distance)
}

/// How much of a node to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Outside the visibility radius
    Hidden,
    /// Near the edge of the radius: a colored dot
    Dot,
    /// Shape and label
    Label,
    /// Everything, including the description
    Full,
}

/// Visibility and detail decisions for one camera setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodScorer {
    distance_scale: f64,
    near_field: f64,
}

impl Default for LodScorer {
    fn default() -> Self {
        Self {
            distance_scale: DEFAULT_DISTANCE_SCALE,
            near_field: DEFAULT_NEAR_FIELD,
        }
    }
}

impl LodScorer {
    pub fn new(distance_scale: f64, near_field: f64) -> Self {
        Self {
            distance_scale,
            near_field,
        }
    }

    /// Distance at which the node stops being drawn.
    pub fn threshold(&self, node: &Node) -> f64 {
        importance(node) * self.distance_scale
    }

    /// True if the node should be drawn at `distance`. Both bounds are
    /// exclusive.
    pub fn visible(&self, node: &Node, distance: f64) -> bool {
        distance < self.near_field || distance < self.threshold(node)
    }

    /// Buckets the node by how deep inside its visibility radius it is.
    pub fn detail_level(&self, node: &Node, distance: f64) -> DetailLevel {
        if distance < self.near_field {
            return DetailLevel::Full;
        }
        if !self.visible(node, distance) {
            return DetailLevel::Hidden;
        }

        match distance / self.threshold(node) {
            r if r < 1.0 / 3.0 => DetailLevel::Full,
            r if r < 2.0 / 3.0 => DetailLevel::Label,
            _ => DetailLevel::Dot,
        }
    }

    /// Ids of the nodes visible at `distance`, in graph order.
    pub fn visible_nodes<'g>(&self, graph: &'g KnowledgeGraph, distance: f64) -> Vec<&'g str> {
        let nodes: Vec<&'g Node> = graph.nodes().collect();
        let total = nodes.len();
        let visible: Vec<&'g str> = nodes
            .into_par_iter()
            .filter(|node| self.visible(node, distance))
            .map(|node| node.id.as_str())
            .collect();

        debug!(
            distance,
            total,
            visible = visible.len(),
            "visibility computed"
        );
        visible
    }

    /// Importance of every node, keyed by id.
    pub fn importance_map(&self, graph: &KnowledgeGraph) -> HashMap<String, f64> {
        let nodes: Vec<&Node> = graph.nodes().collect();
        nodes
            .par_iter()
            .map(|node| (node.id.clone(), importance(node)))
            .collect()
    }
}
