//! End-to-end checks over a realistic payload.

use atlas_core::GraphPayload;
use atlas_graph::{
    Algorithm, AnalyticsConfig, CentralityOptions, CommunityOptions, KnowledgeGraph, LodScorer,
    SearchIndex,
};
use std::collections::HashSet;

const PAYLOAD: &str = r#"{
  "nodes": [
    { "id": "perovskite", "type": "Material", "label": "Perovskite", "value": 3.0, "x": 0.0, "y": 0.0 },
    { "id": "passivation", "type": "Method", "label": "Surface passivation", "x": 2.0, "y": 1.0 },
    { "id": "efficiency", "type": "Phenomenon", "label": "Power conversion efficiency" },
    { "id": "degradation", "type": "Mechanism", "description": "Moisture driven decomposition" },
    { "id": "tandem", "type": "Application", "label": "Tandem solar cell" },
    { "id": "dft", "type": "Theory", "label": "Density functional theory" },
    { "id": 42, "type": "Documentation", "label": "Review article" },
    { "id": "encapsulation", "type": "Method" },
    { "id": "lonely", "type": "Hypothesis" }
  ],
  "links": [
    { "source": "passivation", "target": "perovskite", "type": "improves" },
    { "source": "perovskite", "target": "efficiency", "type": "enables" },
    { "source": { "id": "degradation", "x": 4 }, "target": "efficiency", "type": "contradicts" },
    { "source": "tandem", "target": "perovskite", "type": "uses" },
    { "source": "dft", "target": "degradation", "type": "measures" },
    { "source": 42, "target": "dft", "type": "related_to" },
    { "source": "encapsulation", "target": "degradation", "type": "improves" },
    { "source": "encapsulation", "target": "ghost" },
    { "source": null, "target": "perovskite" },
    { "source": { "label": "no id" }, "target": "tandem" }
  ]
}"#;

fn load() -> KnowledgeGraph {
    let payload = GraphPayload::from_json(PAYLOAD).unwrap();
    let (graph, report) = KnowledgeGraph::from_payload(payload);
    assert_eq!(report.dropped_links.len(), 3);
    assert_eq!(graph.stats().dropped_links, 3);
    graph
}

fn all_ids(graph: &KnowledgeGraph) -> Vec<String> {
    graph.nodes().map(|n| n.id.clone()).collect()
}

#[test]
fn depth_zero_is_just_the_start() {
    let graph = load();
    for id in all_ids(&graph) {
        let result = graph.neighbors(&id, 0);
        assert_eq!(result.node_ids(), vec![id.as_str()]);
        assert!(result.links.is_empty());
    }
    assert!(graph.neighbors("ghost", 0).is_empty());
}

#[test]
fn neighbors_are_monotone_in_depth() {
    let graph = load();
    for id in all_ids(&graph) {
        let mut previous: HashSet<String> = HashSet::new();
        for depth in 0..6 {
            let current: HashSet<String> = graph
                .neighbors(&id, depth)
                .nodes
                .into_iter()
                .map(|n| n.id)
                .collect();
            assert!(previous.is_subset(&current), "{} at depth {}", id, depth);
            previous = current;
        }
    }
}

#[test]
fn clusters_partition_the_graph() {
    let graph = load();
    for cap in 1..=graph.node_count() {
        let clusters = graph.cluster(cap).unwrap();
        let mut seen = HashSet::new();
        for cluster in clusters.iter() {
            assert!(cluster.len() <= cap);
            for node in &cluster.nodes {
                assert!(seen.insert(node.id.clone()));
            }
        }
        assert_eq!(seen.len(), graph.node_count());
    }
}

#[test]
fn empty_filter_is_identity() {
    let graph = load();
    assert_eq!(graph.filter(""), graph.to_subgraph());
}

#[test]
fn filtered_nodes_match_or_neighbor_a_match() {
    let graph = load();
    for query in ["perov", "solar", "moisture", "theory", "42", "zzz"] {
        let result = graph.filter(query);
        let matches: HashSet<String> = graph
            .text_matches(query)
            .into_iter()
            .filter_map(|idx| graph.get(idx).map(|n| n.id.clone()))
            .collect();

        for node in &result.nodes {
            let near = matches.contains(&node.id)
                || graph
                    .neighbors(&node.id, 1)
                    .nodes
                    .iter()
                    .any(|n| matches.contains(&n.id));
            assert!(near, "{}: {} is not near a match", query, node.id);
        }
        for link in &result.links {
            assert!(result.contains(&link.source) && result.contains(&link.target));
        }
    }
}

#[test]
fn normalized_betweenness_stays_in_unit_range() {
    let graph = load();
    for directed in [false, true] {
        let options = CentralityOptions::new().with_directed(directed);
        let result = graph.centrality(Algorithm::Betweenness, &options).unwrap();
        assert_eq!(result.data.len(), graph.node_count());
        for score in &result.data {
            assert!((0.0..=1.0).contains(&score.score));
        }
        assert_eq!(result.score("lonely"), Some(0.0));
    }
}

#[test]
fn degradation_bridges_the_most_pairs() {
    let graph = load();
    let result = graph
        .centrality(Algorithm::Betweenness, &CentralityOptions::new())
        .unwrap();
    let stats = &result.metadata.component_stats;
    assert_eq!(stats.len(), 2);
    // Removing degradation separates 4, 2 and 1 nodes: 14 pairs. n = 9.
    assert_eq!(stats[0].max_node_id, "degradation");
    assert!((stats[0].max - 14.0 * 2.0 / 56.0).abs() < 1e-9);
    assert_eq!(stats[1].node_count, 1);
}

#[test]
fn untyped_importance_and_exclusive_boundary() {
    let graph = load();
    let lonely = graph.get_by_id("lonely").unwrap();
    let importance = atlas_graph::lod::importance(lonely);
    assert!((importance - 0.55).abs() < 1e-9);

    let scorer = LodScorer::default();
    let threshold = scorer.threshold(lonely);
    assert!(scorer.visible(lonely, threshold - 1e-9));
    assert!(!scorer.visible(lonely, threshold));
}

#[test]
fn payload_round_trip_keeps_only_resolved_links() {
    let graph = load();
    let json = graph.to_payload().to_json_pretty().unwrap();
    let (reloaded, report) = KnowledgeGraph::from_payload(GraphPayload::from_json(&json).unwrap());

    assert!(!report.has_warnings());
    assert_eq!(all_ids(&reloaded), all_ids(&graph));
    assert_eq!(reloaded.link_count(), 7);
    assert_eq!(reloaded.to_subgraph(), graph.to_subgraph());
}

#[test]
fn search_and_filter_agree_on_simple_terms() {
    let graph = load();
    let index = SearchIndex::build(&graph);
    let hits: Vec<&str> = index
        .search("solar")
        .into_iter()
        .filter_map(|idx| graph.get(idx).map(|n| n.id.as_str()))
        .collect();
    assert_eq!(hits, vec!["tandem"]);
    assert!(graph.filter("solar").contains("tandem"));
}

#[test]
fn default_config_drives_the_pipeline() {
    let graph = load();
    let config = AnalyticsConfig::default();
    let depth = config.check_depth(2).unwrap();
    let around = graph.neighbors("perovskite", depth);
    assert!(around.contains("degradation"));
    assert!(!around.contains("dft"));
    let clusters = graph.cluster(config.max_nodes_per_cluster).unwrap();
    assert_eq!(clusters.len(), 2);
    assert_eq!(
        clusters.cluster_of("dft").map(|c| c.id.as_str()),
        Some("cluster-0")
    );
    assert!(config.check_depth(config.max_traversal_depth + 1).is_err());
}

#[test]
fn communities_partition_the_graph() {
    let graph = load();
    let result = graph.communities(&CommunityOptions::new()).unwrap();

    let mut seen = HashSet::new();
    for community in &result.communities {
        assert_eq!(community.size, community.members.len());
        assert!(community.members.contains(&community.leader_id));
        for id in &community.members {
            assert!(seen.insert(id.clone()));
        }
    }
    assert_eq!(seen.len(), graph.node_count());
    assert_eq!(result.community_of("lonely").map(|c| c.size), Some(1));
    assert!(result.modularity > 0.0);
}
