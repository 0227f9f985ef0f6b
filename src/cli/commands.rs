//! CLI commands and argument parsing

use crate::hooks::Action;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drive a paginated list store against a fixture
#[derive(Parser, Debug)]
#[command(name = "pagestore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Fixture file describing the pages (YAML or JSON)
    #[arg(short, long, global = true)]
    pub fixture: Option<PathBuf>,

    /// Store configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run actions in order, printing the settled snapshot after each
    Replay {
        /// Actions to run (comma-separated: load, refresh, more, retry)
        #[arg(short, long, value_delimiter = ',', required = true)]
        actions: Vec<Action>,
    },

    /// Load the first page, then load more until the list is exhausted
    Walk {
        /// Stop after this many pages
        #[arg(long, default_value = "100")]
        max_pages: usize,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
