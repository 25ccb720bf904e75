//! Size-bounded clustering for progressive rendering.
//!
//! Large graphs are drawn cluster by cluster. Each cluster is grown by BFS
//! from a seed until it runs out of reachable nodes or hits the size cap, so
//! a connected component larger than the cap is split along BFS order. The
//! split does not try to minimize cut links; [`Cluster::external_links`]
//! lets the renderer see how many it cut.

use crate::adjacency::Adjacency;
use crate::error::{GraphError, Result};
use crate::graph::KnowledgeGraph;
use atlas_core::Node;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Axis-aligned bounds of a cluster's positioned members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Bounds of every node that has a position. Zero-sized when none do.
    pub fn around<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;

        for (x, y) in nodes.into_iter().filter_map(Node::position) {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }

        match bounds {
            Some((min_x, min_y, max_x, max_y)) => Self {
                x: min_x,
                y: min_y,
                width: max_x - min_x,
                height: max_y - min_y,
            },
            None => Self::default(),
        }
    }
}

/// A render cluster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    /// Members in BFS order; the first is the seed.
    pub nodes: Vec<Node>,
    /// The BFS seed.
    pub center_node: Node,
    pub bounding_box: BoundingBox,
    /// Links with both endpoints in this cluster.
    pub internal_links: usize,
    /// Links with exactly one endpoint in this cluster.
    pub external_links: usize,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The clusters of one graph. Serializes as a plain list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    #[serde(skip)]
    membership: HashMap<String, usize>,
}

impl ClusterSet {
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Returns the cluster holding a node.
    pub fn cluster_of(&self, node_id: &str) -> Option<&Cluster> {
        self.membership
            .get(node_id)
            .and_then(|&i| self.clusters.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }
}

impl KnowledgeGraph {
    /// Partitions the graph into connected clusters of at most
    /// `max_nodes_per_cluster` nodes.
    ///
    /// Every node ends up in exactly one cluster. Seeds are taken in node
    /// order; a node not reached from its seed within the cap seeds a later
    /// cluster.
    pub fn cluster(&self, max_nodes_per_cluster: usize) -> Result<ClusterSet> {
        if max_nodes_per_cluster == 0 {
            return Err(GraphError::invalid_parameter(
                "max_nodes_per_cluster",
                "must be at least 1",
            ));
        }

        let adjacency = Adjacency::build(self, false);
        let groups = grow_clusters(&adjacency, max_nodes_per_cluster);

        let mut assignment = vec![0usize; self.node_count()];
        for (cluster, members) in groups.iter().enumerate() {
            for &member in members {
                assignment[member] = cluster;
            }
        }

        let mut internal = vec![0usize; groups.len()];
        let mut external = vec![0usize; groups.len()];
        for link in self.graph.edge_indices() {
            if let Some((s, t)) = self.graph.edge_endpoints(link) {
                let (cs, ct) = (assignment[s.index()], assignment[t.index()]);
                if cs == ct {
                    internal[cs] += 1;
                } else {
                    external[cs] += 1;
                    external[ct] += 1;
                }
            }
        }

        let nodes: Vec<&Node> = self.nodes().collect();
        let clusters: Vec<Cluster> = groups
            .par_iter()
            .enumerate()
            .map(|(i, members)| {
                let members: Vec<Node> = members.iter().map(|&m| nodes[m].clone()).collect();
                Cluster {
                    id: format!("cluster-{}", i),
                    center_node: members[0].clone(),
                    bounding_box: BoundingBox::around(&members),
                    nodes: members,
                    internal_links: internal[i],
                    external_links: external[i],
                }
            })
            .collect();

        let membership = clusters
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.nodes.iter().map(move |n| (n.id.clone(), i)))
            .collect();

        debug!(
            nodes = self.node_count(),
            clusters = clusters.len(),
            max_nodes_per_cluster,
            "graph clustered"
        );

        Ok(ClusterSet {
            clusters,
            membership,
        })
    }
}

/// Grows BFS clusters over node positions. Each returned group is non-empty
/// and starts with its seed.
fn grow_clusters(adjacency: &Adjacency, cap: usize) -> Vec<Vec<usize>> {
    let mut visited = vec![false; adjacency.len()];
    let mut groups = Vec::new();

    for seed in 0..adjacency.len() {
        if visited[seed] {
            continue;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::from([seed]);

        while members.len() < cap {
            let Some(current) = queue.pop_front() else {
                break;
            };
            // A node can be queued by several members before it is taken.
            if visited[current] {
                continue;
            }
            visited[current] = true;
            members.push(current);

            for &neighbor in adjacency.outgoing(current) {
                if !visited[neighbor] {
                    queue.push_back(neighbor);
                }
            }
        }

        groups.push(members);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::{GraphPayload, LinkKind, NodeKind, RawLink};
    use std::collections::HashSet;

    fn graph(nodes: Vec<Node>, links: &[(&str, &str)]) -> KnowledgeGraph {
        let links = links
            .iter()
            .map(|(s, t)| RawLink::new(*s, *t, LinkKind::RelatedTo))
            .collect();
        KnowledgeGraph::from_payload(GraphPayload::new(nodes, links)).0
    }

    fn plain(ids: &[&str]) -> Vec<Node> {
        ids.iter().map(|id| Node::new(*id, NodeKind::Method)).collect()
    }

    fn ids(cluster: &Cluster) -> Vec<&str> {
        cluster.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_zero_cap_is_rejected() {
        let g = graph(plain(&["a"]), &[]);
        let err = g.cluster(0).unwrap_err();
        assert!(matches!(err, GraphError::InvalidParameter { .. }));
    }

    #[test]
    fn test_components_become_clusters() {
        let g = graph(plain(&["a", "b", "c", "d"]), &[("a", "b"), ("c", "d")]);
        let set = g.cluster(10).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(ids(&set.clusters()[0]), vec!["a", "b"]);
        assert_eq!(ids(&set.clusters()[1]), vec!["c", "d"]);
        assert_eq!(set.clusters()[0].center_node.id, "a");
    }

    #[test]
    fn test_oversized_component_is_split() {
        // a - b - c - d - e, cap 2
        let g = graph(
            plain(&["a", "b", "c", "d", "e"]),
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        let set = g.cluster(2).unwrap();
        let groups: Vec<Vec<&str>> = set.iter().map(ids).collect();
        assert_eq!(groups, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
        assert_eq!(set.clusters()[0].internal_links, 1);
        assert_eq!(set.clusters()[0].external_links, 1);
        assert_eq!(set.clusters()[1].external_links, 2);
    }

    #[test]
    fn test_partition_and_cap() {
        let names: Vec<String> = (0..40).map(|i| format!("n{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut links = Vec::new();
        for i in 0..40 {
            links.push((refs[i], refs[(i * 7 + 3) % 40]));
            links.push((refs[i], refs[(i + 1) % 40]));
        }
        let g = graph(plain(&refs), &links);

        for cap in [1, 3, 7, 40] {
            let set = g.cluster(cap).unwrap();
            let mut seen = HashSet::new();
            for cluster in set.iter() {
                assert!(!cluster.is_empty());
                assert!(cluster.len() <= cap);
                for node in &cluster.nodes {
                    assert!(seen.insert(node.id.clone()), "{} in two clusters", node.id);
                }
            }
            assert_eq!(seen.len(), 40);
        }
    }

    #[test]
    fn test_bounding_box() {
        let nodes = vec![
            Node::new("a", NodeKind::Material).with_position(-1.0, 2.0),
            Node::new("b", NodeKind::Material).with_position(3.0, 5.0),
            Node::new("c", NodeKind::Material),
        ];
        let g = graph(nodes, &[("a", "b"), ("b", "c")]);
        let set = g.cluster(5).unwrap();
        assert_eq!(
            set.clusters()[0].bounding_box,
            BoundingBox {
                x: -1.0,
                y: 2.0,
                width: 4.0,
                height: 3.0
            }
        );
    }

    #[test]
    fn test_bounding_box_without_positions_is_zero() {
        let g = graph(plain(&["a", "b"]), &[("a", "b")]);
        let set = g.cluster(5).unwrap();
        assert_eq!(set.clusters()[0].bounding_box, BoundingBox::default());
    }

    #[test]
    fn test_cluster_of() {
        let g = graph(plain(&["a", "b", "c"]), &[("a", "b")]);
        let set = g.cluster(5).unwrap();
        assert_eq!(set.cluster_of("b").unwrap().id, "cluster-0");
        assert_eq!(set.cluster_of("c").unwrap().id, "cluster-1");
        assert!(set.cluster_of("zzz").is_none());
    }

    #[test]
    fn test_serializes_as_list() {
        let g = graph(plain(&["a"]), &[]);
        let json = serde_json::to_value(g.cluster(5).unwrap()).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["centerNode"]["id"], "a");
        assert_eq!(json[0]["boundingBox"]["width"], 0.0);
    }

    #[test]
    fn test_empty_graph() {
        let set = KnowledgeGraph::new().cluster(3).unwrap();
        assert!(set.is_empty());
    }
}
