//! Aggregations behind the insight router
//!
//! The SQL text is public because the router reports it back to the caller
//! as `query_used`. Window bounds and the payment method are always bound
//! as named parameters.

use rusqlite::named_params;

use super::Database;
use crate::error::Result;
use crate::models::PaymentMethod;

/// Refund count and amount per day and reason within `[:start, :end)`
pub const REFUND_BREAKDOWN_SQL: &str = r#"
        SELECT
            strftime('%Y-%m-%d', r.timestamp) AS refund_date,
            r.reason,
            COUNT(r.refund_id) AS number_of_refunds,
            COALESCE(SUM(r.amount), 0) AS total_refund_amount
        FROM refunds r
        WHERE r.timestamp >= :start AND r.timestamp < :end
        GROUP BY refund_date, r.reason
        ORDER BY refund_date, number_of_refunds DESC
    "#;

/// Daily sales across every payment method since `:start`
pub const DAILY_SALES_ALL_SQL: &str = r#"
        SELECT
            strftime('%Y-%m-%d', timestamp) AS transaction_date,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN amount ELSE 0 END), 0) AS total_sales,
            COUNT(CASE WHEN status = 'completed' THEN 1 ELSE NULL END) AS successful_transactions,
            COUNT(CASE WHEN status = 'failed' THEN 1 ELSE NULL END) AS failed_transactions
        FROM transactions
        WHERE timestamp >= :start
        GROUP BY transaction_date
        ORDER BY transaction_date
    "#;

/// Daily sales for one payment method since `:start`
pub const DAILY_SALES_BY_METHOD_SQL: &str = r#"
        SELECT
            strftime('%Y-%m-%d', timestamp) AS transaction_date,
            COALESCE(SUM(CASE WHEN status = 'completed' THEN amount ELSE 0 END), 0) AS total_sales,
            COUNT(CASE WHEN status = 'completed' THEN 1 ELSE NULL END) AS successful_transactions,
            COUNT(CASE WHEN status = 'failed' THEN 1 ELSE NULL END) AS failed_transactions
        FROM transactions
        WHERE timestamp >= :start
        AND payment_method = :method
        GROUP BY transaction_date
        ORDER BY transaction_date
    "#;

/// SQL used for a sales query with an optional method filter
pub fn daily_sales_sql(method: Option<PaymentMethod>) -> &'static str {
    match method {
        Some(_) => DAILY_SALES_BY_METHOD_SQL,
        None => DAILY_SALES_ALL_SQL,
    }
}

/// One row of the refund breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct RefundBucket {
    pub refund_date: String,
    pub reason: Option<String>,
    pub number_of_refunds: i64,
    pub total_refund_amount: f64,
}

/// One day of sales
#[derive(Debug, Clone, PartialEq)]
pub struct SalesBucket {
    pub transaction_date: String,
    pub total_sales: f64,
    pub successful_transactions: i64,
    pub failed_transactions: i64,
}

fn refund_bucket(row: &rusqlite::Row<'_>) -> rusqlite::Result<RefundBucket> {
    Ok(RefundBucket {
        refund_date: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        reason: row.get(1)?,
        number_of_refunds: row.get(2)?,
        total_refund_amount: row.get(3)?,
    })
}

fn sales_bucket(row: &rusqlite::Row<'_>) -> rusqlite::Result<SalesBucket> {
    Ok(SalesBucket {
        transaction_date: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        total_sales: row.get(1)?,
        successful_transactions: row.get(2)?,
        failed_transactions: row.get(3)?,
    })
}

impl Database {
    /// Refunds grouped by day and reason for `start <= timestamp < end`.
    /// Bounds use the stored `YYYY-MM-DD HH:MM:SS` format.
    pub fn refund_breakdown(&self, start: &str, end: &str) -> Result<Vec<RefundBucket>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(REFUND_BREAKDOWN_SQL)?;

        let buckets = stmt
            .query_map(named_params! { ":start": start, ":end": end }, refund_bucket)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(buckets)
    }

    /// Daily sales since `start`, optionally for a single payment method
    pub fn daily_sales(
        &self,
        start: &str,
        method: Option<PaymentMethod>,
    ) -> Result<Vec<SalesBucket>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(daily_sales_sql(method))?;

        let buckets = match method {
            Some(m) => stmt
                .query_map(
                    named_params! { ":start": start, ":method": m.as_str() },
                    sales_bucket,
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(named_params! { ":start": start }, sales_bucket)?
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        Ok(buckets)
    }
}
