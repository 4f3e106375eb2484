//! Derivation of the router's query tables from the settlement export
//!
//! The importer stores the export verbatim in the consolidated table, but the
//! insight router reads `transactions` and `refunds`. This module maps one
//! shape onto the other so both are rebuilt by the same import run.

use crate::models::{
    Cell, PaymentMethod, RefundRecord, SettlementBatch, TransactionRecord, TransactionStatus,
};

/// Settlement columns the derivation reads
pub mod columns {
    pub const TRANSACTION_ID: &str = "transaction_id_main";
    pub const STATUS: &str = "txn_status_name";
    pub const PAYMENT_MODE: &str = "payment_mode_name";
    pub const AMOUNT: &str = "transaction_amount";
    pub const IS_REVERSAL: &str = "is_reversal";
    pub const TIMESTAMP: &str = "transaction_start_date_time";
    pub const REFUND_AMOUNT: &str = "txn_refund_amt";
    pub const REFUND_AMOUNT_FALLBACK: &str = "refund_amount_col";
}

/// Reason recorded for reversed transactions
pub const REVERSAL_REASON: &str = "Reversal";

/// Reason recorded when the export carries nothing better
pub const UNSPECIFIED_REASON: &str = "Unspecified";

/// Column positions resolved once per batch
struct Layout {
    transaction_id: Option<usize>,
    status: Option<usize>,
    payment_mode: Option<usize>,
    amount: Option<usize>,
    is_reversal: Option<usize>,
    timestamp: Option<usize>,
    refund_amount: Option<usize>,
    refund_amount_fallback: Option<usize>,
}

impl Layout {
    fn of(batch: &SettlementBatch) -> Self {
        let find = |name: &str| batch.columns.iter().position(|c| c == name);
        Self {
            transaction_id: find(columns::TRANSACTION_ID),
            status: find(columns::STATUS),
            payment_mode: find(columns::PAYMENT_MODE),
            amount: find(columns::AMOUNT),
            is_reversal: find(columns::IS_REVERSAL),
            timestamp: find(columns::TIMESTAMP),
            refund_amount: find(columns::REFUND_AMOUNT),
            refund_amount_fallback: find(columns::REFUND_AMOUNT_FALLBACK),
        }
    }
}

fn cell<'a>(row: &'a crate::models::ConsolidatedPaymentRow, idx: Option<usize>) -> Option<&'a Cell> {
    idx.and_then(|i| row.get(i))
}

fn text(cell: Option<&Cell>) -> Option<String> {
    cell.map(|c| c.to_string().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn truthy(cell: Option<&Cell>) -> bool {
    match cell {
        Some(Cell::Integer(i)) => *i != 0,
        Some(Cell::Real(f)) => *f != 0.0,
        Some(Cell::Text(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "t"
        ),
        None => false,
    }
}

/// One transaction per settlement row with a usable timestamp
pub fn derive_transactions(batch: &SettlementBatch) -> Vec<TransactionRecord> {
    let layout = Layout::of(batch);

    batch
        .rows
        .iter()
        .filter_map(|row| {
            let timestamp = text(cell(row, layout.timestamp))?;
            let status_label = text(cell(row, layout.status));
            let mode_label = text(cell(row, layout.payment_mode));

            Some(TransactionRecord {
                timestamp,
                amount: cell(row, layout.amount)
                    .and_then(Cell::as_f64)
                    .unwrap_or(0.0),
                status: TransactionStatus::from_label(status_label.as_deref()),
                payment_method: PaymentMethod::normalize_label(mode_label.as_deref()),
            })
        })
        .collect()
}

/// One refund per settlement row with a usable timestamp and a positive
/// refund amount
pub fn derive_refunds(batch: &SettlementBatch) -> Vec<RefundRecord> {
    let layout = Layout::of(batch);

    batch
        .rows
        .iter()
        .filter_map(|row| {
            let timestamp = text(cell(row, layout.timestamp))?;
            let amount = cell(row, layout.refund_amount)
                .and_then(Cell::as_f64)
                .filter(|a| *a > 0.0)
                .or_else(|| {
                    cell(row, layout.refund_amount_fallback)
                        .and_then(Cell::as_f64)
                        .filter(|a| *a > 0.0)
                })?;

            let reason = if truthy(cell(row, layout.is_reversal)) {
                REVERSAL_REASON.to_string()
            } else {
                text(cell(row, layout.status)).unwrap_or_else(|| UNSPECIFIED_REASON.to_string())
            };

            Some(RefundRecord {
                refund_id: text(cell(row, layout.transaction_id)),
                timestamp,
                reason,
                amount,
            })
        })
        .collect()
}
