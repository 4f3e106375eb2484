//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};

use super::open_db;

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting PayInsight web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!();
    println!("   ⚠️  No authentication and open CORS - keep it off public networks");

    let db = open_db(db_path)?;

    payinsight_server::serve(db, host, port)
        .await
        .context("Server error")?;

    Ok(())
}
