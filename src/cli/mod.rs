//! Command-line surface for refgraph.
//!
//! Commands:
//! - Build: build, reindex
//! - Query: show, deps, locate, stats

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RefgraphConfig;
use crate::graph::EdgeStrategy;

#[derive(Parser, Debug)]
#[command(name = "refgraph")]
#[command(about = "File reference graph for a project directory", long_about = None)]
pub struct Cli {
    /// Config file (default: ./refgraph.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot file, overriding the config
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    // ─── Build ──────────────────────────────────────────────────────
    /// Scan a directory and write a fresh snapshot
    Build {
        /// Project root to scan
        path: PathBuf,

        /// Edge discovery strategy: substring or resolved
        #[arg(long)]
        strategy: Option<EdgeStrategy>,

        /// Stream progress states to stderr as JSON lines
        #[arg(long)]
        progress: bool,

        /// Print the whole graph as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the project recorded in the current snapshot
    Reindex,

    // ─── Query ──────────────────────────────────────────────────────
    /// Print the current snapshot as JSON
    Show,

    /// What a file references and what references it
    Deps {
        /// Node id (root-relative path)
        id: String,
    },

    /// Absolute path of a node
    Locate {
        /// Node id (root-relative path)
        id: String,
    },

    /// Graph statistics
    Stats,
}

impl Cli {
    /// Load config from `--config` (or the default file) and apply flag
    /// overrides.
    pub fn resolve_config(&self) -> RefgraphConfig {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::config::DEFAULT_CONFIG_FILE));
        let mut config = RefgraphConfig::load(&path);

        if let Some(snapshot) = &self.snapshot {
            config.snapshot_path = snapshot.clone();
        }
        if let Commands::Build { strategy: Some(strategy), .. } = &self.command {
            config.strategy = *strategy;
        }
        config
    }
}
