//! Read-only peek at imported tables

use rusqlite::types::ValueRef;

use super::Database;
use crate::error::{Error, Result};
use crate::models::TablePreview;

/// Tables that may be previewed besides the configured import table.
/// Identifiers can't be bound, so previews are limited to known names.
pub const PREVIEWABLE_TABLES: &[&str] = &["consolidated_payments", "transactions", "refunds"];

impl Database {
    /// First `limit` rows of `table`, rendered as text (NULL as `NULL`)
    pub fn preview_table(&self, table: &str, limit: usize) -> Result<TablePreview> {
        self.preview_table_with_extra(table, limit, None)
    }

    /// Like [`Database::preview_table`], also allowing a configured import
    /// table name
    pub fn preview_table_with_extra(
        &self,
        table: &str,
        limit: usize,
        extra_table: Option<&str>,
    ) -> Result<TablePreview> {
        let allowed = PREVIEWABLE_TABLES.contains(&table) || extra_table == Some(table);
        if !allowed || !crate::config::is_identifier(table) {
            return Err(Error::InvalidData(format!(
                "Unknown table '{}'. Expected one of: {}",
                table,
                PREVIEWABLE_TABLES.join(", ")
            )));
        }
        if !self.table_exists(table)? {
            return Err(Error::InvalidData(format!(
                "Table '{}' does not exist. Run an import first.",
                table
            )));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\" LIMIT ?1", table))?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map([limit as i64], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(render_value))
                    .collect::<rusqlite::Result<Vec<String>>>()
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(TablePreview { columns, rows })
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}
