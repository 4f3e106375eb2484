//! Import command implementation

use std::path::Path;

use anyhow::Result;
use payinsight_core::config::ImportConfig;
use payinsight_core::db::Database;
use payinsight_core::{read_settlement_path, store_settlements, Error};

/// Import a settlement file into the store at `db_path`. The store is only
/// opened (and created) once the file has parsed.
pub fn cmd_import(db_path: &Path, config: &ImportConfig, file: Option<&Path>) -> Result<()> {
    let path = file.unwrap_or(config.csv_path.as_path());

    println!("📥 Importing settlements from {}...", path.display());
    println!("   Database: {}", db_path.display());

    let outcome = read_settlement_path(path, config).and_then(|batch| {
        let db = Database::open(db_path)?;
        store_settlements(&db, config, &batch)
    });

    match &outcome {
        Ok(summary) => {
            println!("✅ Import complete!");
            println!(
                "   Imported: {} rows into '{}'",
                summary.rows_imported, summary.table
            );
            println!("   Transactions: {}", summary.transactions_derived);
            println!("   Refunds: {}", summary.refunds_derived);
            for (column, count) in summary.coerced_dates.iter().filter(|(_, n)| *n > 0) {
                println!("   ⚠️  {} unparseable dates in '{}' stored as NULL", count, column);
            }
        }
        Err(Error::InputNotFound(p)) => {
            println!("❌ Settlement file not found: '{}'", p);
            println!("   Please double-check the path and ensure the file exists.");
        }
        Err(Error::EmptyInput(p)) => {
            println!("❌ '{}' is empty. No data to import.", p);
        }
        Err(e @ (Error::Csv(_) | Error::Parse(_))) => {
            println!(
                "❌ Error parsing '{}'. Please check the delimiter (set to '{}') and data format. Error: {}",
                path.display(),
                config.delimiter,
                e
            );
        }
        Err(e) => {
            println!("❌ An unexpected error occurred during data import: {}", e);
        }
    }

    println!("Database import complete and connection closed.");

    outcome?;
    Ok(())
}
