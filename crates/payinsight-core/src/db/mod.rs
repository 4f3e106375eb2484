//! Database access layer with connection pooling
//!
//! This module is organized by domain:
//! - `settlements` - Destructive import of the settlement export and the
//!   derived query tables
//! - `insights` - Aggregations behind the insight router
//! - `preview` - Read-only peek at imported tables

use std::path::Path;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::debug;

use crate::error::Result;
use crate::models::{RefundRecord, TransactionRecord};

mod insights;
mod preview;
mod settlements;

pub use insights::{
    daily_sales_sql, RefundBucket, SalesBucket, DAILY_SALES_ALL_SQL, DAILY_SALES_BY_METHOD_SQL,
    REFUND_BREAKDOWN_SQL,
};
pub use preview::PREVIEWABLE_TABLES;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Tables the insight router reads from
const QUERY_TABLES_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS transactions (
        timestamp TIMESTAMP NOT NULL,
        amount REAL NOT NULL,
        status TEXT NOT NULL,             -- completed, failed, or the raw status
        payment_method TEXT NOT NULL      -- UPI, CARD, or the upper-cased mode name
    );

    CREATE INDEX IF NOT EXISTS idx_transactions_timestamp ON transactions(timestamp);

    CREATE TABLE IF NOT EXISTS refunds (
        refund_id TEXT,
        timestamp TIMESTAMP NOT NULL,
        reason TEXT,
        amount REAL NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_refunds_timestamp ON refunds(timestamp);
"#;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(&path.to_string_lossy())
    }

    /// Open (or create) the store at `path`
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.prepare_store()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "payinsight_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::open(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Set store pragmas and make sure the query tables exist, so the router
    /// reports "no data" on a fresh store instead of failing.
    fn prepare_store(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers keep seeing the previous tables while an import
            -- is being written
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;
        conn.execute_batch(QUERY_TABLES_SCHEMA)?;

        debug!(path = %self.db_path, "Store ready");
        Ok(())
    }

    /// Check whether a table exists
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert a single transaction into the query table
    pub fn insert_transaction(&self, tx: &TransactionRecord) -> Result<()> {
        let conn = self.conn()?;
        insert_transaction_row(&conn, tx)?;
        Ok(())
    }

    /// Insert a single refund into the query table
    pub fn insert_refund(&self, refund: &RefundRecord) -> Result<()> {
        let conn = self.conn()?;
        insert_refund_row(&conn, refund)?;
        Ok(())
    }
}

fn insert_transaction_row(conn: &rusqlite::Connection, tx: &TransactionRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (timestamp, amount, status, payment_method) VALUES (?1, ?2, ?3, ?4)",
        params![tx.timestamp, tx.amount, tx.status.as_str(), tx.payment_method],
    )?;
    Ok(())
}

fn insert_refund_row(conn: &rusqlite::Connection, refund: &RefundRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO refunds (refund_id, timestamp, reason, amount) VALUES (?1, ?2, ?3, ?4)",
        params![refund.refund_id, refund.timestamp, refund.reason, refund.amount],
    )?;
    Ok(())
}
