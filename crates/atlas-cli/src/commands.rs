//! CLI command implementations.

use atlas_core::GraphPayload;
use atlas_graph::{
    Algorithm, AnalyticsConfig, CentralityEngine, CentralityRequest, CommunityOptions,
    KnowledgeGraph, LoadReport, SearchIndex, Subgraph,
};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Load warnings listed per kind before the rest are summarized.
const WARNINGS_SHOWN: usize = 5;

/// Initialize Atlas in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = AnalyticsConfig::project_path(path);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    AnalyticsConfig::default().save(&config_path)?;

    println!("{} Initialized Atlas in {}", "✓".green(), path.display());
    println!("  Edit {} to tune the analytics", config_path.display().to_string().cyan());

    Ok(())
}

/// Loads a payload file and reports non-fatal problems on stderr.
fn load_graph(payload: &Path) -> Result<KnowledgeGraph> {
    debug!(path = %payload.display(), "loading payload");
    let payload = GraphPayload::from_path(payload)?;
    let (graph, report) = KnowledgeGraph::from_payload(payload);

    if report.has_warnings() {
        eprintln!("{} {}", "⚠".yellow(), report.summary());
    }
    Ok(graph)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_subgraph(title: &str, subgraph: &Subgraph) {
    println!(
        "{} ({} nodes, {} links)\n",
        title.cyan().bold(),
        subgraph.nodes.len(),
        subgraph.links.len()
    );
    for node in &subgraph.nodes {
        println!("  {} {}", node.display_name().green(), node.kind.to_string().dimmed());
    }
    if !subgraph.links.is_empty() {
        println!();
        for link in &subgraph.links {
            println!(
                "  {} {} {}",
                link.source,
                format!("-{}->", link.kind.as_str()).dimmed(),
                link.target
            );
        }
    }
}

/// Warnings left out of the per-kind lists printed by [`stats`].
fn omitted_warnings(report: &LoadReport) -> usize {
    report.duplicate_nodes.len().saturating_sub(WARNINGS_SHOWN)
        + report.dropped_links.len().saturating_sub(WARNINGS_SHOWN)
}

/// Show graph statistics.
pub fn stats(payload: &Path, json_output: bool) -> Result<()> {
    let payload = GraphPayload::from_path(payload)?;
    let (graph, report) = KnowledgeGraph::from_payload(payload);
    let stats = graph.stats();

    if json_output {
        return print_json(&serde_json::json!({
            "stats": stats,
            "load": report,
        }));
    }

    println!("{}", "Atlas Graph".cyan().bold());
    println!();
    println!("  {} {}", "Nodes:".dimmed(), stats.node_count);
    println!("  {} {}", "Links:".dimmed(), stats.link_count);
    println!("  {} {}", "Dropped links:".dimmed(), stats.dropped_links);
    println!("  {} {}", "Isolated:".dimmed(), stats.isolated_nodes);
    for (kind, count) in &stats.kinds {
        println!("    {} {}", format!("{}:", kind).dimmed(), count);
    }

    if report.has_warnings() {
        println!("\n{} {}", "⚠".yellow(), report.summary());
        for id in report.duplicate_nodes.iter().take(WARNINGS_SHOWN) {
            println!("  duplicate node {}", id.red());
        }
        for dropped in report.dropped_links.iter().take(WARNINGS_SHOWN) {
            println!("  link #{} - {}", dropped.position, dropped.reason);
        }
        let hidden = omitted_warnings(&report);
        if hidden > 0 {
            println!("  ... and {} more", hidden);
        }
    }

    Ok(())
}

/// Expand the neighborhood of a node.
pub fn neighbors(
    config: &AnalyticsConfig,
    payload: &Path,
    id: &str,
    depth: usize,
    json_output: bool,
) -> Result<()> {
    let depth = config.check_depth(depth)?;
    let graph = load_graph(payload)?;

    if !graph.contains(id) {
        return Err(format!("Node '{}' not found in graph", id).into());
    }

    let neighborhood = graph.neighbors(id, depth);

    if json_output {
        return print_json(&neighborhood);
    }

    println!(
        "{} {} within {} hops\n",
        "Neighborhood of".cyan().bold(),
        id.cyan(),
        depth
    );
    for node in &neighborhood.nodes {
        let hops = neighborhood.depth_of(&node.id).unwrap_or(0);
        println!(
            "  {} {} {}",
            format!("[{}]", hops).dimmed(),
            node.display_name().green(),
            node.kind.to_string().dimmed()
        );
    }
    println!("\n  {} links crossed", neighborhood.links.len());

    Ok(())
}

/// Keep nodes matching a query plus their context.
pub fn filter(
    config: &AnalyticsConfig,
    payload: &Path,
    query: &str,
    depth: Option<usize>,
    json_output: bool,
) -> Result<()> {
    let depth = config.check_depth(depth.unwrap_or(config.filter_depth))?;
    let graph = load_graph(payload)?;

    let result = graph.filter_with_context(query, depth);

    if json_output {
        return print_json(&result);
    }

    if result.is_empty() {
        println!("No matches found for \"{}\"", query);
        return Ok(());
    }
    print_subgraph(&format!("Filter \"{}\"", query), &result);

    Ok(())
}

/// Token search over node text.
pub fn search(payload: &Path, terms: &str, limit: usize, json_output: bool) -> Result<()> {
    let graph = load_graph(payload)?;
    let index = SearchIndex::build(&graph);

    let matches: Vec<_> = index
        .search(terms)
        .into_iter()
        .filter_map(|idx| graph.get(idx))
        .take(limit)
        .collect();

    if json_output {
        return print_json(&matches);
    }

    if matches.is_empty() {
        println!("No matches found for \"{}\"", terms);
        return Ok(());
    }

    println!("Found {} matches:\n", matches.len());
    for node in matches {
        println!(
            "  {} {} {}",
            node.display_name().green(),
            format!("({})", node.id).dimmed(),
            node.kind.to_string().dimmed()
        );
        if let Some(description) = &node.description {
            println!("    {}", description.dimmed());
        }
    }

    Ok(())
}

/// Split the graph into render clusters.
pub fn cluster(
    config: &AnalyticsConfig,
    payload: &Path,
    max_nodes: Option<usize>,
    json_output: bool,
) -> Result<()> {
    let graph = load_graph(payload)?;

    let clusters = graph.cluster(max_nodes.unwrap_or(config.max_nodes_per_cluster))?;

    if json_output {
        return print_json(&clusters);
    }

    println!("{} {} clusters\n", "✓".green(), clusters.len());
    for cluster in clusters.iter() {
        let bounds = cluster.bounding_box;
        println!(
            "  {} {} nodes, center {}, {} internal / {} external links",
            cluster.id.cyan(),
            cluster.len(),
            cluster.center_node.display_name().green(),
            cluster.internal_links,
            cluster.external_links
        );
        println!(
            "    {}",
            format!(
                "box ({:.1}, {:.1}) {:.1} x {:.1}",
                bounds.x, bounds.y, bounds.width, bounds.height
            )
            .dimmed()
        );
    }

    Ok(())
}

/// List nodes visible at a camera distance.
pub fn visible(
    config: &AnalyticsConfig,
    payload: &Path,
    distance: f64,
    json_output: bool,
) -> Result<()> {
    let graph = load_graph(payload)?;
    let scorer = config.lod.scorer();

    let visible = scorer.visible_nodes(&graph, distance);

    if json_output {
        let rows: Vec<_> = visible
            .iter()
            .filter_map(|id| graph.get_by_id(id))
            .map(|node| {
                serde_json::json!({
                    "id": node.id,
                    "importance": atlas_graph::lod::importance(node),
                    "detail": scorer.detail_level(node, distance),
                })
            })
            .collect();
        return print_json(&rows);
    }

    println!(
        "{} of {} nodes visible at distance {}\n",
        visible.len().to_string().cyan(),
        graph.node_count(),
        distance
    );
    for node in visible.iter().filter_map(|id| graph.get_by_id(id)) {
        println!(
            "  {} {} {}",
            node.display_name().green(),
            format!("{:.2}", atlas_graph::lod::importance(node)).dimmed(),
            format!("{:?}", scorer.detail_level(node, distance)).dimmed()
        );
    }

    Ok(())
}

/// Centrality arguments as given on the command line.
pub struct CentralityArgs {
    pub algorithm: String,
    pub normalize: Option<bool>,
    pub directed: bool,
    pub top: usize,
}

/// Score nodes by centrality.
pub fn centrality(
    config: &AnalyticsConfig,
    payload: &Path,
    args: CentralityArgs,
    json_output: bool,
) -> Result<()> {
    let algorithm: Algorithm = args.algorithm.parse()?;
    let graph = load_graph(payload)?;

    let mut options = config.centrality.clone();
    if let Some(normalize) = args.normalize {
        options.normalize = normalize;
    }
    options.directed |= args.directed;
    if algorithm != Algorithm::PageRank {
        // Configured PageRank tuning must not block the other algorithms.
        options.damping = None;
        options.max_iterations = None;
        options.tolerance = None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Computing {} centrality...", algorithm));

    let request = CentralityRequest::new(algorithm, options);
    let result = CentralityEngine::run(&graph, &request);
    spinner.finish_and_clear();
    let result = result?;

    if json_output {
        return print_json(&result);
    }

    println!(
        "{} {} centrality over {} nodes in {:.2}ms",
        "✓".green(),
        algorithm.to_string().cyan(),
        result.data.len(),
        result.metadata.execution_time
    );
    println!();
    for (rank, score) in result.top_n(args.top).into_iter().enumerate() {
        let name = graph
            .get_by_id(&score.node_id)
            .map(|n| n.display_name().to_string())
            .unwrap_or_else(|| score.node_id.clone());
        println!(
            "  {:>3}. {:<40} {:.4} {}",
            rank + 1,
            name,
            score.score,
            format!("c{}", score.component_id).dimmed()
        );
    }

    println!("\n{}", "Components".cyan().bold());
    for stats in result.metadata.component_stats.iter().take(args.top) {
        println!(
            "  {} {} nodes, max {:.4} at {}, mean {:.4}",
            format!("c{}", stats.component_id).dimmed(),
            stats.node_count,
            stats.max,
            stats.max_node_id.green(),
            stats.mean
        );
    }
    let hidden = result.metadata.component_stats.len().saturating_sub(args.top);
    if hidden > 0 {
        println!("  ... and {} more", hidden);
    }

    Ok(())
}

/// Detect communities and their leading concepts.
pub fn communities(
    payload: &Path,
    resolution: Option<f64>,
    top: usize,
    json_output: bool,
) -> Result<()> {
    let graph = load_graph(payload)?;
    let mut options = CommunityOptions::new();
    if let Some(resolution) = resolution {
        options = options.with_resolution(resolution);
    }

    let result = graph.communities(&options)?;

    if json_output {
        return print_json(&result);
    }

    println!(
        "{} {} communities, modularity {:.4}\n",
        "✓".green(),
        result.len(),
        result.modularity
    );
    let mut ranked: Vec<_> = result.communities.iter().collect();
    ranked.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.id.cmp(&b.id)));
    for community in ranked.iter().take(top) {
        let leader = graph
            .get_by_id(&community.leader_id)
            .map(|n| n.display_name().to_string())
            .unwrap_or_else(|| community.leader_id.clone());
        println!(
            "  {} {} nodes, led by {} {}",
            format!("c{}", community.id).dimmed(),
            community.size,
            leader.green(),
            format!("({:.4})", community.leader_score).dimmed()
        );
    }
    let hidden = result.len().saturating_sub(top);
    if hidden > 0 {
        println!("  ... and {} more", hidden);
    }

    Ok(())
}

/// Suggest missing links between categories.
pub fn gaps(payload: &Path, limit: usize, json_output: bool) -> Result<()> {
    let graph = load_graph(payload)?;
    let suggestions = graph.predict_links(limit);

    if json_output {
        return print_json(&suggestions);
    }

    if suggestions.is_empty() {
        println!("No link gaps found");
        return Ok(());
    }

    println!("{}\n", "Potential links".cyan().bold());
    for gap in &suggestions {
        println!(
            "  {} {} {} {}",
            gap.source.green(),
            "->".dimmed(),
            gap.target.green(),
            format!(
                "({} shared, {} -> {})",
                gap.score, gap.source_kind, gap.target_kind
            )
            .dimmed()
        );
    }

    Ok(())
}
