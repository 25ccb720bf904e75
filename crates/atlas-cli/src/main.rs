//! Atlas CLI - Command-line interface for Atlas
//!
//! This is the main entry point for users interacting with Atlas.
//! It loads a node-link payload and runs one analytics query against it.

use atlas_graph::AnalyticsConfig;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "atlas")]
#[command(author = "Atlas Contributors")]
#[command(version)]
#[command(about = "Analytics for node-link knowledge graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory holding `.atlas/config.json`
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config to `.atlas/config.json`
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show graph statistics and load warnings
    Stats {
        /// Payload JSON file
        payload: PathBuf,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Expand the neighborhood of a node
    Neighbors {
        payload: PathBuf,

        /// Id of the start node
        id: String,

        /// Hops to expand (default: 1)
        #[arg(short, long, default_value = "1")]
        depth: usize,

        #[arg(long)]
        json: bool,
    },

    /// Keep nodes matching a query plus their context
    Filter {
        payload: PathBuf,

        /// Substring matched against id, label and description
        query: String,

        /// Hops of context (defaults to the configured filter depth)
        #[arg(short, long)]
        depth: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Token search over node text
    Search {
        payload: PathBuf,

        /// Search terms; every term must match
        terms: String,

        /// Maximum results to return
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Split the graph into render clusters
    Cluster {
        payload: PathBuf,

        /// Largest cluster size (defaults to the configured value)
        #[arg(short, long)]
        max_nodes: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// List nodes visible at a camera distance
    Visible {
        payload: PathBuf,

        /// Camera distance
        #[arg(short, long)]
        distance: f64,

        #[arg(long)]
        json: bool,
    },

    /// Score nodes by centrality
    Centrality {
        payload: PathBuf,

        /// betweenness, degree or pagerank
        #[arg(short, long, default_value = "betweenness")]
        algorithm: String,

        /// Scale scores into a size-independent range
        #[arg(long)]
        normalize: Option<bool>,

        /// Follow link direction
        #[arg(long)]
        directed: bool,

        /// Rows to print
        #[arg(short, long, default_value = "10")]
        top: usize,

        #[arg(long)]
        json: bool,
    },

    /// Detect communities and their leading concepts
    Communities {
        payload: PathBuf,

        /// Modularity resolution; higher values give smaller communities
        #[arg(short, long)]
        resolution: Option<f64>,

        /// Communities to print
        #[arg(short, long, default_value = "10")]
        top: usize,

        #[arg(long)]
        json: bool,
    },

    /// Suggest missing links between categories
    Gaps {
        payload: PathBuf,

        /// Maximum suggestions
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = run(cli.command, &cli.project);

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Commands, project: &Path) -> Result<(), Box<dyn Error>> {
    let config = || AnalyticsConfig::load(project);

    match command {
        Commands::Init { path } => commands::init(&path),
        Commands::Stats { payload, json } => commands::stats(&payload, json),
        Commands::Neighbors {
            payload,
            id,
            depth,
            json,
        } => commands::neighbors(&config()?, &payload, &id, depth, json),
        Commands::Filter {
            payload,
            query,
            depth,
            json,
        } => commands::filter(&config()?, &payload, &query, depth, json),
        Commands::Search {
            payload,
            terms,
            limit,
            json,
        } => commands::search(&payload, &terms, limit, json),
        Commands::Cluster {
            payload,
            max_nodes,
            json,
        } => commands::cluster(&config()?, &payload, max_nodes, json),
        Commands::Visible {
            payload,
            distance,
            json,
        } => commands::visible(&config()?, &payload, distance, json),
        Commands::Centrality {
            payload,
            algorithm,
            normalize,
            directed,
            top,
            json,
        } => commands::centrality(
            &config()?,
            &payload,
            commands::CentralityArgs {
                algorithm,
                normalize,
                directed,
                top,
            },
            json,
        ),
        Commands::Communities {
            payload,
            resolution,
            top,
            json,
        } => commands::communities(&payload, resolution, top, json),
        Commands::Gaps {
            payload,
            limit,
            json,
        } => commands::gaps(&payload, limit, json),
    }
}
