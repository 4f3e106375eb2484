//! Settlement CSV parsing
//!
//! Turns a settlement export into a [`SettlementBatch`]:
//! - the header line is skipped, column names come from [`ImportConfig`]
//! - missing-value markers become NULL
//! - date columns are parsed with a single fixed format; failures become NULL
//! - every other column gets a storage class inferred from its values
//!
//! Writing the batch is the store's job, see `Database::replace_settlements`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Cell, ColumnType, ConsolidatedPaymentRow, ImportSummary, SettlementBatch};

/// Format dates are written in
pub const STORED_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cell contents treated as missing, on top of blank cells
const NULL_MARKERS: &[&str] = &[
    "nan", "NaN", "NAN", "-nan", "-NaN", "null", "NULL", "Null", "None", "none", "N/A", "n/a",
    "NA", "#N/A", "#NA", "<NA>", "-1.#IND", "1.#QNAN",
];

/// Read and parse a settlement file at an explicit path
pub fn read_settlement_path(path: &Path, config: &ImportConfig) -> Result<SettlementBatch> {
    if !path.exists() {
        return Err(Error::InputNotFound(path.display().to_string()));
    }

    let mut content = Vec::new();
    File::open(path)?.read_to_end(&mut content)?;

    if content.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::EmptyInput(path.display().to_string()));
    }

    let batch = parse_settlements(content.as_slice(), config)?;
    info!(
        "Loaded {} rows from '{}'",
        batch.rows.len(),
        path.display()
    );
    Ok(batch)
}

/// Parse the settlement file at `path` (or the configured one) and replace
/// the store's settlement data with it.
///
/// The file is fully parsed before the store is touched, so a bad file
/// leaves the previous import in place.
pub fn import_settlements(
    db: &Database,
    config: &ImportConfig,
    path: Option<&Path>,
) -> Result<ImportSummary> {
    let path = path.unwrap_or(config.csv_path.as_path());
    let batch = read_settlement_path(path, config)?;
    store_settlements(db, config, &batch)
}

/// Replace the store's settlement data with an already parsed batch
pub fn store_settlements(
    db: &Database,
    config: &ImportConfig,
    batch: &SettlementBatch,
) -> Result<ImportSummary> {
    for (column, count) in batch.coerced_dates.iter().filter(|(_, n)| *n > 0) {
        warn!("{} unparseable values in '{}' stored as NULL", count, column);
    }

    db.replace_settlements(&config.table, batch)
}

/// Parse settlement CSV data from any reader
pub fn parse_settlements<R: Read>(mut reader: R, config: &ImportConfig) -> Result<SettlementBatch> {
    let mut content = Vec::new();
    reader.read_to_end(&mut content)?;
    check_quotes_balanced(&content)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(config.delimiter as u8)
        .from_reader(content.as_slice());

    let width = config.columns.len();
    let date_indexes: Vec<usize> = config
        .date_columns
        .iter()
        .filter_map(|c| config.column_index(c))
        .collect();
    let mut coerced = vec![0usize; date_indexes.len()];

    // Raw cells after null normalization and date coercion
    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(Error::Parse(format!(
                "Expected {} fields in line {}, saw {}",
                width,
                line + 2,
                record.len()
            )));
        }

        let mut cells = normalize_record(&record, width);

        for (slot, &idx) in date_indexes.iter().enumerate() {
            if let Some(value) = cells[idx].take() {
                match parse_settlement_date(&value, &config.date_format) {
                    Some(stored) => cells[idx] = Some(stored),
                    None => {
                        debug!(column = %config.columns[idx], value = %value, "Unparseable date set to NULL");
                        coerced[slot] += 1;
                    }
                }
            }
        }

        raw_rows.push(cells);
    }

    let column_types: Vec<ColumnType> = (0..width)
        .map(|idx| {
            if date_indexes.contains(&idx) {
                ColumnType::Timestamp
            } else {
                infer_column_type(raw_rows.iter().filter_map(|r| r[idx].as_deref()))
            }
        })
        .collect();

    let rows = raw_rows
        .into_iter()
        .map(|cells| ConsolidatedPaymentRow {
            values: cells
                .into_iter()
                .zip(&column_types)
                .map(|(cell, ty)| cell.map(|v| to_cell(v, *ty)))
                .collect(),
        })
        .collect();

    let coerced_dates = date_indexes
        .iter()
        .zip(coerced)
        .map(|(&idx, count)| (config.columns[idx].clone(), count))
        .collect();

    Ok(SettlementBatch {
        columns: config.columns.clone(),
        column_types,
        rows,
        coerced_dates,
    })
}

/// The csv reader takes an unclosed quote as a field running to end of
/// input. Enclosing and escaped quotes both come in pairs, so an odd count
/// means the file is truncated or malformed.
fn check_quotes_balanced(content: &[u8]) -> Result<()> {
    let quotes = content.iter().filter(|&&b| b == b'"').count();
    if quotes % 2 != 0 {
        return Err(Error::Parse("unterminated quoted field".to_string()));
    }
    Ok(())
}

/// Pad or keep a record to `width` cells, mapping missing values to `None`
fn normalize_record(record: &StringRecord, width: usize) -> Vec<Option<String>> {
    (0..width)
        .map(|i| record.get(i).and_then(normalize_cell))
        .collect()
}

/// Blank cells and missing-value markers become `None`
pub fn normalize_cell(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse a settlement date with `format`, returning the stored representation.
///
/// Formats without a time component land on midnight.
pub fn parse_settlement_date(value: &str, format: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(value, format) {
        return Some(dt.format(STORED_DATETIME_FORMAT).to_string());
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(STORED_DATETIME_FORMAT).to_string())
}

/// Pick the narrowest storage class that fits every value
fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut ty = ColumnType::Integer;
    for value in values {
        let v = value.trim();
        match ty {
            ColumnType::Integer if v.parse::<i64>().is_ok() => {}
            ColumnType::Integer | ColumnType::Real if parse_real(v).is_some() => {
                ty = ColumnType::Real;
            }
            _ => return ColumnType::Text,
        }
    }
    ty
}

/// Finite floats only; `inf` and friends stay text
fn parse_real(v: &str) -> Option<f64> {
    v.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn to_cell(value: String, ty: ColumnType) -> Cell {
    match ty {
        ColumnType::Integer => value
            .trim()
            .parse()
            .map(Cell::Integer)
            .unwrap_or(Cell::Text(value)),
        ColumnType::Real => parse_real(value.trim())
            .map(Cell::Real)
            .unwrap_or(Cell::Text(value)),
        ColumnType::Text | ColumnType::Timestamp => Cell::Text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ImportConfig {
        ImportConfig {
            columns: vec![
                "txn_id".to_string(),
                "status".to_string(),
                "amount".to_string(),
                "started".to_string(),
                "qty".to_string(),
            ],
            date_columns: vec!["started".to_string()],
            ..ImportConfig::default()
        }
    }

    #[test]
    fn test_header_is_skipped_and_names_come_from_config() {
        let csv = "A,B,C,D,E\nT1,SUCCESS,100.50,15/01/25,1\nT2,FAILED,20,16/01/25,2\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.columns[0], "txn_id");
        assert_eq!(
            batch.rows[0].get(0),
            Some(&Cell::Text("T1".to_string()))
        );
    }

    #[test]
    fn test_date_parsed_to_stored_format() {
        let csv = "h\nT1,SUCCESS,1,15/01/25,1\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();
        assert_eq!(
            batch.rows[0].get(3),
            Some(&Cell::Text("2025-01-15 00:00:00".to_string()))
        );
        assert_eq!(batch.column_types[3], ColumnType::Timestamp);
    }

    #[test]
    fn test_bad_date_becomes_null_and_is_counted() {
        let csv = "h\nT1,SUCCESS,1,2025-01-15,1\nT2,SUCCESS,1,31/02/25,1\nT3,SUCCESS,1,01/03/25,1\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();

        assert_eq!(batch.rows.len(), 3);
        assert_eq!(batch.rows[0].get(3), None);
        assert_eq!(batch.rows[1].get(3), None);
        assert!(batch.rows[2].get(3).is_some());
        assert_eq!(batch.coerced_dates, vec![("started".to_string(), 2)]);
    }

    #[test]
    fn test_missing_values_become_null() {
        let csv = "h\nT1,,nan,,NaN\nT2, ,N/A,15/01/25,\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();

        for row in &batch.rows {
            for cell in row.values.iter().skip(1).flatten() {
                let text = cell.to_string();
                assert_ne!(text, "nan");
                assert!(!text.trim().is_empty());
            }
            assert_eq!(row.get(1), None);
            assert_eq!(row.get(2), None);
            assert_eq!(row.get(4), None);
        }
    }

    #[test]
    fn test_short_records_are_padded() {
        let csv = "h\nT1,SUCCESS\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();
        assert_eq!(batch.rows[0].values.len(), 5);
        assert_eq!(batch.rows[0].get(4), None);
    }

    #[test]
    fn test_long_records_are_rejected() {
        let csv = "h\nT1,SUCCESS,1,15/01/25,1,extra\n";
        let err = parse_settlements(csv.as_bytes(), &small_config()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_unterminated_quote_is_rejected() {
        let csv = "h\nT1,\"unterminated,1,15/01/25,1\nT2,FAILED,2,15/01/25,2\n";
        let err = parse_settlements(csv.as_bytes(), &small_config()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_quoted_and_escaped_fields_are_accepted() {
        let csv = "h\nT1,\"said \"\"hi\"\", ok\",1,15/01/25,1\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();
        assert_eq!(
            batch.rows[0].get(1),
            Some(&Cell::Text("said \"hi\", ok".to_string()))
        );
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let csv: &[u8] = b"h\nT1,\xff\xfe,1,15/01/25,1\n";
        let err = parse_settlements(csv, &small_config()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_column_type_inference() {
        let csv = "h\nT1,SUCCESS,100,15/01/25,1\nT2,FAILED,20.75,15/01/25,2\nT3,,,15/01/25,\n";
        let batch = parse_settlements(csv.as_bytes(), &small_config()).unwrap();

        assert_eq!(batch.column_types[0], ColumnType::Text);
        assert_eq!(batch.column_types[2], ColumnType::Real);
        assert_eq!(batch.column_types[4], ColumnType::Integer);
        assert_eq!(batch.rows[0].get(2), Some(&Cell::Real(100.0)));
        assert_eq!(batch.rows[1].get(4), Some(&Cell::Integer(2)));
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let batch = parse_settlements("a,b,c,d,e\n".as_bytes(), &small_config()).unwrap();
        assert!(batch.rows.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = read_settlement_path(Path::new("/nonexistent/settlement.csv"), &small_config())
            .unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_settlement_path(file.path(), &small_config()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_tab_delimiter() {
        let config = ImportConfig {
            delimiter: '\t',
            ..small_config()
        };
        let csv = "h\tx\nT1\tSUCCESS\t5\t15/01/25\t1\n";
        let batch = parse_settlements(csv.as_bytes(), &config).unwrap();
        assert_eq!(batch.rows[0].get(2), Some(&Cell::Integer(5)));
    }

    #[test]
    fn test_parse_settlement_date_with_time_format() {
        assert_eq!(
            parse_settlement_date("15/01/25 10:30", "%d/%m/%y %H:%M"),
            Some("2025-01-15 10:30:00".to_string())
        );
        assert_eq!(parse_settlement_date("15/01/25 10:30", "%d/%m/%y"), None);
    }
}
