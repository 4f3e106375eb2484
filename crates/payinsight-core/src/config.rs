//! Runtime configuration
//!
//! A single [`Config`] value is handed to the importer, the store and the
//! server, so different datasets or environments only need a different
//! config, not a code change.
//!
//! ## Resolution
//!
//! Values are resolved in layers, each overriding the previous one:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config` flag or `PAYINSIGHT_CONFIG`)
//! 3. Environment variables (`PAYINSIGHT_DB`, `PAYINSIGHT_CSV`)
//! 4. CLI flags (applied by the binary after loading)

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable pointing at a TOML config file
pub const CONFIG_ENV: &str = "PAYINSIGHT_CONFIG";

/// Environment variable overriding the store path
pub const DB_PATH_ENV: &str = "PAYINSIGHT_DB";

/// Environment variable overriding the settlement CSV path
pub const CSV_PATH_ENV: &str = "PAYINSIGHT_CSV";

/// Column layout of the settlement export, in file order.
///
/// The export repeats `transaction_id` and `batch_id`, so the duplicates get
/// distinct names here.
pub const SETTLEMENT_COLUMNS: [&str; 38] = [
    "transaction_id_main",
    "merchant_display_name",
    "txn_status_name",
    "acquirer_name",
    "issuer_name",
    "payment_mode_id",
    "payment_mode_name",
    "card_type_association_name",
    "transaction_amount",
    "is_aggregator",
    "is_reversal",
    "transaction_start_date_time",
    "txn_refund_amt",
    "batch_id_main",
    "transaction_id_duplicate",
    "batch_id_duplicate",
    "nodal_account_bank",
    "actual_txn_amount",
    "refund_amount_col",
    "bank_charge_amount",
    "mdr_charge",
    "mdr_tax",
    "platform_fee",
    "mard_amount",
    "additonal_taxes",
    "bank_commision",
    "bank_service_tax",
    "amount_to_be_deducted_in_addition_to_bank_charges",
    "is_not_on_sell_rate",
    "convenience_fees_amt_in_paise",
    "convenience_fees_additional_amt_in_paise",
    "settlement_amount",
    "sds",
    "sdscycle",
    "program_name",
    "axis_payout_created",
    "payout_status",
    "payout_nodal_acc",
];

/// Columns holding `day/month/2-digit-year` dates
pub const SETTLEMENT_DATE_COLUMNS: [&str; 2] =
    ["transaction_start_date_time", "axis_payout_created"];

/// Store settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("payments.db"),
        }
    }
}

/// Importer settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Settlement CSV to import
    pub csv_path: PathBuf,
    /// Destination table (dropped and recreated on every run)
    pub table: String,
    /// Ordered column names; the file header is ignored
    pub columns: Vec<String>,
    /// Columns parsed with `date_format`
    pub date_columns: Vec<String>,
    /// chrono format string for the date columns
    pub date_format: String,
    /// Field delimiter
    pub delimiter: char,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("settlement_data.csv"),
            table: "consolidated_payments".to_string(),
            columns: SETTLEMENT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            date_columns: SETTLEMENT_DATE_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            date_format: "%d/%m/%y".to_string(),
            delimiter: ',',
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub import: ImportConfig,
    pub server: ServerSettings,
}

impl Config {
    /// Parse a config from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve defaults, the optional config file and environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };

        if let Some(db) = std::env::var(DB_PATH_ENV).ok().filter(|s| !s.is_empty()) {
            config.store.path = PathBuf::from(db);
        }
        if let Some(csv) = std::env::var(CSV_PATH_ENV).ok().filter(|s| !s.is_empty()) {
            config.import.csv_path = PathBuf::from(csv);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the import layout
    pub fn validate(&self) -> Result<()> {
        self.import.validate()
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.table) {
            return Err(Error::Config(format!(
                "Table name must be a plain identifier: {:?}",
                self.table
            )));
        }
        if self.columns.is_empty() {
            return Err(Error::Config("Column list is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !is_identifier(column) {
                return Err(Error::Config(format!(
                    "Column name must be a plain identifier: {:?}",
                    column
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(Error::Config(format!("Duplicate column: {}", column)));
            }
        }

        for date_col in &self.date_columns {
            if !seen.contains(date_col.as_str()) {
                return Err(Error::Config(format!(
                    "Date column {} is not in the column list",
                    date_col
                )));
            }
        }

        if !self.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "Delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }

        Ok(())
    }

    /// Index of a named column in the configured layout
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// SQL identifiers can't be bound as parameters, so anything spliced into
/// DDL must pass this check first.
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.import.columns.len(), 38);
        assert_eq!(config.import.table, "consolidated_payments");
        assert_eq!(config.store.path, PathBuf::from("payments.db"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [store]
            path = "/var/lib/payinsight/prod.db"

            [server]
            port = 9090
            "#,
        )
        .unwrap();

        assert_eq!(config.store.path, PathBuf::from("/var/lib/payinsight/prod.db"));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.import.date_format, "%d/%m/%y");
    }

    #[test]
    fn test_rejects_duplicate_columns() {
        let err = Config::from_toml_str(
            r#"
            [import]
            columns = ["a", "b", "a"]
            date_columns = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("Duplicate")));
    }

    #[test]
    fn test_rejects_unknown_date_column() {
        let err = Config::from_toml_str(
            r#"
            [import]
            columns = ["id", "amount"]
            date_columns = ["created"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let err = Config::from_toml_str(
            r#"
            [import]
            table = "payments; DROP TABLE refunds"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("consolidated_payments"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_column_index() {
        let import = ImportConfig::default();
        assert_eq!(import.column_index("transaction_id_main"), Some(0));
        assert_eq!(import.column_index("payout_nodal_acc"), Some(37));
        assert_eq!(import.column_index("missing"), None);
    }
}
