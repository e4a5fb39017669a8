//! Mycelica graph analysis CLI
//!
//! Usage: mycelica-graph [OPTIONS] <COMMAND>
//!
//! Structural health reports and embedding neighbour search over a Mycelica
//! knowledge graph database. Supports JSON output for scripting.

use clap::{Parser, Subcommand};
use mycelica_graph::{
    db::Database,
    error::LoadError,
    settings::{self, Settings},
};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[path = "cli/analyze.rs"]
mod analyze;

#[path = "cli/similar.rs"]
mod similar;

// ============================================================================
// Main CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "mycelica-graph")]
#[command(version, about = "Mycelica knowledge graph analysis", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Database path (default: from settings, then app data dir)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Settings file (default: <config dir>/com.mycelica.app/graph-analysis.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Detailed logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze graph structure: topology, staleness, bridges, health score
    Analyze {
        /// Scope analysis to descendants of this node ID
        #[arg(long)]
        region: Option<String>,
        /// Number of top items to show per section
        #[arg(long)]
        top_n: Option<usize>,
        /// Days since update to consider a node stale
        #[arg(long)]
        stale_days: Option<i64>,
        /// A node is a hub when its degree exceeds this
        #[arg(long)]
        hub_threshold: Option<usize>,
    },
    /// Find nodes whose embeddings are closest to a node's embedding
    Similar {
        /// Node ID to search from
        node_id: String,
        /// Maximum results
        #[arg(long)]
        top_n: Option<usize>,
        /// Minimum cosine similarity (inclusive)
        #[arg(long)]
        min_similarity: Option<f32>,
    },
    /// Settings file operations
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print effective settings
    Show,
    /// Print the settings file location
    Path,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so `--json` output on stdout stays machine-readable.
/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_cli(cli: Cli) -> Result<(), LoadError> {
    let settings_path = cli.config.clone().unwrap_or_else(settings::default_path);
    let settings = Settings::load(&settings_path)?;

    // Config commands never need the database
    if let Commands::Config { cmd } = &cli.command {
        return handle_config(cmd, &settings, &settings_path, cli.json);
    }

    let db_path = find_database(cli.db.as_deref(), &settings);
    debug!(db = %db_path.display(), settings = %settings_path.display(), "opening database");
    let db = Database::open_read_only(&db_path)?;

    match cli.command {
        Commands::Analyze { region, top_n, stale_days, hub_threshold } => {
            let mut config = settings.analyzer.clone();
            if let Some(top_n) = top_n {
                config.top_n = top_n;
            }
            if let Some(stale_days) = stale_days {
                config.stale_days = stale_days;
            }
            if let Some(hub_threshold) = hub_threshold {
                config.hub_threshold = hub_threshold;
            }
            analyze::handle_analyze(&db, cli.json, region.as_deref(), &config)
        }
        Commands::Similar { node_id, top_n, min_similarity } => {
            let top_n = top_n.unwrap_or(settings.similarity.top_n);
            let min_similarity = min_similarity.unwrap_or(settings.similarity.min_similarity);
            similar::handle_similar(&db, cli.json, &node_id, top_n, min_similarity)
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn handle_config(cmd: &ConfigCommands, settings: &Settings, path: &Path, json: bool) -> Result<(), LoadError> {
    match cmd {
        ConfigCommands::Show => {
            if json {
                println!("{}", serde_json::to_string_pretty(settings)?);
            } else {
                let db = settings.db_path.as_deref().unwrap_or("auto");
                println!("db-path:          {}", db);
                println!("hub-threshold:    {}", settings.analyzer.hub_threshold);
                println!("top-n:            {}", settings.analyzer.top_n);
                println!("stale-days:       {}", settings.analyzer.stale_days);
                println!("similar-top-n:    {}", settings.similarity.top_n);
                println!("min-similarity:   {:.2}", settings.similarity.min_similarity);
            }
        }
        ConfigCommands::Path => {
            if json {
                println!("{}", serde_json::json!({ "path": path.display().to_string(), "exists": path.exists() }));
            } else {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

/// `--db` wins, then the settings file, then the app data directory.
fn find_database(flag: Option<&str>, settings: &Settings) -> PathBuf {
    if let Some(path) = flag {
        return PathBuf::from(path);
    }
    if let Some(custom) = settings.db_path.as_deref() {
        return PathBuf::from(custom);
    }
    settings::default_db_path()
}
