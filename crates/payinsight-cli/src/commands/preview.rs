//! Preview command implementation

use anyhow::{Context, Result};
use payinsight_core::db::Database;

/// Widest a preview column may get before values are cut
const MAX_COLUMN_WIDTH: usize = 24;

/// Print the first `limit` rows of `table`. `import_table` is the configured
/// import destination, which may be previewed even if renamed.
pub fn cmd_preview(db: &Database, table: &str, import_table: &str, limit: usize) -> Result<()> {
    let preview = db
        .preview_table_with_extra(table, limit, Some(import_table))
        .with_context(|| format!("Failed to read '{}'. Ensure it has been imported.", table))?;

    println!();
    println!("--- {} (first {} rows) ---", table, limit);

    if preview.rows.is_empty() {
        println!("   (no rows)");
        return Ok(());
    }

    let widths: Vec<usize> = preview
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            preview
                .rows
                .iter()
                .map(|row| row.get(i).map_or(0, |v| v.chars().count()))
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width), width = width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", render(&preview.columns));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    );
    for row in &preview.rows {
        println!("{}", render(row));
    }

    Ok(())
}

/// Cut `s` to at most `max` characters, marking the cut with `…`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max == 0 {
        String::new()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
