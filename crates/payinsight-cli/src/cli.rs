//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PayInsight - Ask plain-language questions about merchant settlements
#[derive(Parser)]
#[command(name = "payinsight")]
#[command(about = "Merchant settlement importer and insight API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML config file (also read from PAYINSIGHT_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides config and PAYINSIGHT_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the store's settlement data with a CSV export
    Import {
        /// Settlement CSV (defaults to the configured path)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show the first rows of an imported table
    Preview {
        /// Table to show: consolidated_payments, transactions, refunds
        #[arg(short, long)]
        table: Option<String>,

        /// Number of rows
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Answer a question locally, without the server
    Ask {
        /// Question, e.g. "refunds yesterday"
        question: String,
    },

    /// Start the web server
    Serve {
        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to the configured port)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
