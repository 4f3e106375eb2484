//! Ask command implementation

use anyhow::{Context, Result};
use payinsight_core::db::Database;
use payinsight_core::insights::InsightEngine;

pub fn cmd_ask(db: &Database, question: &str) -> Result<()> {
    let engine = InsightEngine::new(db.clone());
    let result = engine
        .answer(question)
        .context("Failed to answer question")?;

    println!("💡 {}", result.insight_text);
    println!();
    println!("Query used:");
    println!("{}", result.query_used.trim());

    if result.chart_spec.as_object().is_some_and(|o| !o.is_empty()) {
        println!();
        println!("Chart:");
        println!("{}", serde_json::to_string_pretty(&result.chart_spec)?);
    }

    Ok(())
}
