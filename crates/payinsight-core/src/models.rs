//! Domain models for payinsight

use serde::{Deserialize, Serialize};

/// SQLite storage class chosen for an imported column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    /// Date columns, stored as `YYYY-MM-DD HH:MM:SS` text
    Timestamp,
}

impl ColumnType {
    /// Declared type used in `CREATE TABLE`
    pub fn sql_type(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

/// A typed, non-null cell from the settlement export
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell; text is parsed leniently
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write!(f, "{}", r),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

impl rusqlite::ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        use rusqlite::types::{ToSqlOutput, ValueRef};
        Ok(match self {
            Self::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Self::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// One record of the settlement export, aligned with the configured columns.
/// `None` is stored as SQL NULL.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConsolidatedPaymentRow {
    pub values: Vec<Option<Cell>>,
}

impl ConsolidatedPaymentRow {
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.values.get(index).and_then(|v| v.as_ref())
    }
}

/// Parsed settlement export ready to be written to the store
#[derive(Debug, Clone, Default)]
pub struct SettlementBatch {
    /// Column names, in file order
    pub columns: Vec<String>,
    /// Inferred storage class for each column
    pub column_types: Vec<ColumnType>,
    pub rows: Vec<ConsolidatedPaymentRow>,
    /// Per date column: how many non-empty cells failed to parse
    pub coerced_dates: Vec<(String, usize)>,
}

/// Outcome of a transaction, normalized from the processor's status text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Failed,
    Other(String),
}

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    /// Map a processor status label onto the router's vocabulary
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(|l| l.trim().to_lowercase()) else {
            return Self::Other("unknown".to_string());
        };
        match label.as_str() {
            "success" | "successful" | "completed" | "captured" | "settled" => Self::Completed,
            "failed" | "failure" | "declined" | "error" => Self::Failed,
            "" => Self::Other("unknown".to_string()),
            _ => Self::Other(label),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment methods the router can filter on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Upi,
    Card,
}

impl PaymentMethod {
    /// Value stored in `transactions.payment_method`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Card => "CARD",
        }
    }

    /// Normalize a processor payment-mode label for storage
    pub fn normalize_label(label: Option<&str>) -> String {
        let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
            return "OTHER".to_string();
        };
        let lower = label.to_lowercase();
        if lower.contains("upi") {
            Self::Upi.as_str().to_string()
        } else if lower.contains("card") {
            Self::Card.as_str().to_string()
        } else {
            label.to_uppercase()
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            _ => Err(format!("Unknown payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A row of the `transactions` query table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub timestamp: String,
    pub amount: f64,
    pub status: TransactionStatus,
    pub payment_method: String,
}

/// A row of the `refunds` query table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRecord {
    pub refund_id: Option<String>,
    pub timestamp: String,
    pub reason: String,
    pub amount: f64,
}

/// Answer to one natural-language question. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightResult {
    pub insight_text: String,
    /// Plotly-style chart document; an empty object when there is nothing to plot
    pub chart_spec: serde_json::Value,
    pub query_used: String,
}

/// Counts reported after an import run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportSummary {
    pub table: String,
    pub rows_imported: usize,
    pub coerced_dates: Vec<(String, usize)>,
    pub transactions_derived: usize,
    pub refunds_derived: usize,
}

/// Rows returned by a table preview
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
