//! PayInsight CLI - Merchant settlement insights
//!
//! Usage:
//!   payinsight import --file settlement.csv   Replace the store with a settlement export
//!   payinsight preview --table refunds        Show the first rows of a table
//!   payinsight ask "refunds yesterday"        Answer a question locally
//!   payinsight serve --port 8000              Start the insight API

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.db.as_deref())?;

    match cli.command {
        Commands::Import { file } => {
            commands::cmd_import(&config.store.path, &config.import, file.as_deref())
        }
        Commands::Preview { table, limit } => {
            let db = commands::open_db(&config.store.path)?;
            let table = table.as_deref().unwrap_or(&config.import.table);
            commands::cmd_preview(&db, table, &config.import.table, limit)
        }
        Commands::Ask { question } => {
            let db = commands::open_db(&config.store.path)?;
            commands::cmd_ask(&db, &question)
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            commands::cmd_serve(&config.store.path, &host, port).await
        }
    }
}
