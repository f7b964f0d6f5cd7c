//! CLI definition using clap

use clap::{Parser, Subcommand};
use fixbrain_types::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fixbrain")]
#[command(version)]
#[command(about = "Repair-or-replace diagnosis for household appliances")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML configuration file (environment variables still take precedence)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Output format (json, table)
    #[arg(long, short = 'f', global = true, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address, e.g. 0.0.0.0:8000
        #[arg(long)]
        bind: Option<String>,
    },

    /// Diagnose a local image
    Analyze {
        /// Path to image file
        image: PathBuf,

        /// Task id; the result is stored as tasks/<id>.json
        #[arg(long)]
        task_id: String,

        /// Appliance type (e.g. "washing machine")
        #[arg(long)]
        appliance: String,

        /// Problem description in plain words
        #[arg(long)]
        problem: String,
    },

    /// Show a stored result
    Show {
        task_id: String,
    },

    /// List stored task ids
    List,

    /// Show effective configuration
    Config,
}
