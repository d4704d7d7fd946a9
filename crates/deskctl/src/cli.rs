//! CLI - command-line argument parsing
//!
//! Argument parsing only; execution lives in `commands`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Desk Report CLI
#[derive(Parser, Debug)]
#[command(name = "deskctl")]
#[command(about = "Helpdesk SLA reporting - normalize exports and build PDF reports", long_about = None)]
#[command(version = env!("DESK_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $DESK_CONFIG and config/details.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize a raw export and save the canonical CSV
    Format {
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Merge exports, dropping duplicate issue keys, then normalize
    Merge {
        #[arg(required = true, num_args = 2..)]
        inputs: Vec<PathBuf>,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Normalize and save selected clients, named after the client when only one remains
    Save {
        input: PathBuf,

        /// Defaults to `<client>.csv` when exactly one client is present
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Comma-separated client prefixes, or ALL
        #[arg(long, value_delimiter = ',')]
        only_clients: Vec<String>,
    },

    /// List client prefixes found in an export
    Clients { input: PathBuf },

    /// Build the PDF report
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    pub input: PathBuf,

    /// First day, DD/MM/YYYY
    #[arg(long)]
    pub start: String,

    /// Last day (inclusive), DD/MM/YYYY
    #[arg(long)]
    pub end: String,

    #[arg(short, long)]
    pub output: PathBuf,

    #[arg(long, default_value = desk_common::report::DEFAULT_TITLE)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub author: String,

    #[arg(long, default_value = "")]
    pub client: String,

    /// Also save the normalized dataset here
    #[arg(long)]
    pub save_normalized: Option<PathBuf>,

    /// Artifact directory (defaults to the config's resource_root)
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Comma-separated client prefixes, or ALL
    #[arg(long, value_delimiter = ',')]
    pub only_clients: Vec<String>,
}
