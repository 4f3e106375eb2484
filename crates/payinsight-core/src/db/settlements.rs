//! Settlement import: destructive replace of the consolidated table and the
//! derived query tables

use rusqlite::params_from_iter;
use tracing::{debug, info};

use super::{insert_refund_row, insert_transaction_row, Database, QUERY_TABLES_SCHEMA};
use crate::config::is_identifier;
use crate::derive::{derive_refunds, derive_transactions};
use crate::error::{Error, Result};
use crate::models::{ImportSummary, SettlementBatch};

impl Database {
    /// Replace `table` with the contents of `batch` and rebuild the query
    /// tables from it.
    ///
    /// `transactions`, `refunds` and `table` are dropped unconditionally; there
    /// is no append or upsert mode. Everything happens in one SQLite
    /// transaction, so concurrent readers see either the old data or the new.
    pub fn replace_settlements(
        &self,
        table: &str,
        batch: &SettlementBatch,
    ) -> Result<ImportSummary> {
        if !is_identifier(table) {
            return Err(Error::InvalidData(format!("Invalid table name: {}", table)));
        }
        if batch.columns.len() != batch.column_types.len() {
            return Err(Error::InvalidData(format!(
                "{} columns but {} column types",
                batch.columns.len(),
                batch.column_types.len()
            )));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute_batch(&format!(
            "DROP TABLE IF EXISTS transactions;
             DROP TABLE IF EXISTS refunds;
             DROP TABLE IF EXISTS \"{table}\";"
        ))?;
        info!(
            "Dropped existing 'transactions', 'refunds', and '{}' tables (if they existed)",
            table
        );

        let column_defs: Vec<String> = batch
            .columns
            .iter()
            .zip(&batch.column_types)
            .map(|(name, ty)| format!("\"{}\" {}", name, ty.sql_type()))
            .collect();
        tx.execute_batch(&format!(
            "CREATE TABLE \"{}\" ({});",
            table,
            column_defs.join(", ")
        ))?;

        let placeholders = vec!["?"; batch.columns.len()].join(", ");
        let insert_sql = format!("INSERT INTO \"{}\" VALUES ({})", table, placeholders);
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in &batch.rows {
                if row.values.len() != batch.columns.len() {
                    return Err(Error::InvalidData(format!(
                        "Row has {} values, expected {}",
                        row.values.len(),
                        batch.columns.len()
                    )));
                }
                stmt.execute(params_from_iter(row.values.iter()))?;
            }
        }
        debug!("Inserted {} rows into '{}'", batch.rows.len(), table);

        tx.execute_batch(QUERY_TABLES_SCHEMA)?;

        let transactions = derive_transactions(batch);
        for record in &transactions {
            insert_transaction_row(&tx, record)?;
        }

        let refunds = derive_refunds(batch);
        for record in &refunds {
            insert_refund_row(&tx, record)?;
        }

        tx.commit()?;

        info!(
            rows = batch.rows.len(),
            transactions = transactions.len(),
            refunds = refunds.len(),
            "Imported settlement data into '{}'",
            table
        );

        Ok(ImportSummary {
            table: table.to_string(),
            rows_imported: batch.rows.len(),
            coerced_dates: batch.coerced_dates.clone(),
            transactions_derived: transactions.len(),
            refunds_derived: refunds.len(),
        })
    }

    /// Number of rows in an imported table
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        if !is_identifier(table) {
            return Err(Error::InvalidData(format!("Invalid table name: {}", table)));
        }
        let conn = self.conn()?;
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM \"{}\"", table), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }
}
