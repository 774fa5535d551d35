// Kiln Pipeline - Local CSV warehouse
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Table storage with truncate-and-reload writes.
//!
//! Each table is one CSV file under the warehouse directory. A write goes to
//! a hidden temp file first and is renamed over the table, so readers see
//! either the old table or the new one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wide sensor table.
pub const SENSOR_TABLE: &str = "simulated_kiln_data";
/// Alert log.
pub const ALERTS_TABLE: &str = "alerts";
/// Long-form variance table.
pub const VARIANCE_TABLE: &str = "variance_analysis";
/// f-CaO predictions.
pub const PREDICTIONS_TABLE: &str = "model_predictions";
/// Temperature vs f-CaO pairs.
pub const CORRELATION_TABLE: &str = "correlation_data";

/// Warehouse errors.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("Table not found: {0}")]
    MissingTable(String),

    #[error("Invalid table name: {0}")]
    InvalidName(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for named tables of serde rows.
pub trait Warehouse {
    /// Replace the whole table with `rows`.
    fn replace_table<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), WarehouseError>;

    /// Load every row of a table.
    fn load_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, WarehouseError>;

    fn has_table(&self, table: &str) -> bool;
}

/// One CSV file per table in a directory.
#[derive(Debug, Clone)]
pub struct CsvWarehouse {
    root: PathBuf,
}

impl CsvWarehouse {
    /// Open (and create if needed) a warehouse directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, WarehouseError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the CSV file backing `table`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.csv", table))
    }

    fn check_name(table: &str) -> Result<(), WarehouseError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(())
        } else {
            Err(WarehouseError::InvalidName(table.to_string()))
        }
    }
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), WarehouseError> {
    let file = fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl Warehouse for CsvWarehouse {
    fn replace_table<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), WarehouseError> {
        Self::check_name(table)?;
        let path = self.table_path(table);
        let tmp = self.root.join(format!(".{}.csv.tmp", table));

        let written = write_rows(&tmp, rows).and_then(|()| Ok(fs::rename(&tmp, &path)?));
        if let Err(e) = written {
            // The old table is still in place; only the partial file goes.
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        debug!("replaced table {} with {} rows", table, rows.len());
        Ok(())
    }

    fn load_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, WarehouseError> {
        Self::check_name(table)?;
        let path = self.table_path(table);
        if !path.exists() {
            return Err(WarehouseError::MissingTable(table.to_string()));
        }
        let mut reader = csv::Reader::from_path(&path)?;
        let rows = reader.deserialize().collect::<Result<Vec<T>, _>>()?;
        debug!("loaded table {} with {} rows", table, rows.len());
        Ok(rows)
    }

    fn has_table(&self, table: &str) -> bool {
        Self::check_name(table).is_ok() && self.table_path(table).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kiln::{AlertEvent, AlertType, Metric, VarianceRow};
    use tempfile::TempDir;

    fn rows() -> Vec<VarianceRow> {
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        vec![
            VarianceRow::new(ts, Metric::KilnTemperature, 1350.0, Some(1450.0), Some(true)),
            VarianceRow::new(ts, Metric::Pressure, 50.0, None, None),
        ]
    }

    #[test]
    fn test_replace_and_load() {
        let dir = TempDir::new().unwrap();
        let warehouse = CsvWarehouse::open(dir.path()).unwrap();

        warehouse.replace_table(VARIANCE_TABLE, &rows()).unwrap();
        let loaded: Vec<VarianceRow> = warehouse.load_table(VARIANCE_TABLE).unwrap();

        assert_eq!(loaded, rows());
        assert!(loaded[1].target.is_none());
        assert!(loaded[1].is_anomaly.is_none());
    }

    #[test]
    fn test_replace_truncates() {
        let dir = TempDir::new().unwrap();
        let warehouse = CsvWarehouse::open(dir.path()).unwrap();

        warehouse.replace_table(VARIANCE_TABLE, &rows()).unwrap();
        warehouse.replace_table(VARIANCE_TABLE, &rows()[..1]).unwrap();

        let loaded: Vec<VarianceRow> = warehouse.load_table(VARIANCE_TABLE).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!dir.path().join(".variance_analysis.csv.tmp").exists());
    }

    #[test]
    fn test_header_uses_column_names() {
        let dir = TempDir::new().unwrap();
        let warehouse = CsvWarehouse::open(dir.path()).unwrap();
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 5, 0, 0).unwrap();
        let alerts = vec![AlertEvent::new(1, "High vibration detected in the kiln", ts, AlertType::Critical)];

        warehouse.replace_table(ALERTS_TABLE, &alerts).unwrap();
        let text = fs::read_to_string(warehouse.table_path(ALERTS_TABLE)).unwrap();
        assert!(text.starts_with("id,message,timestamp,type"));

        let loaded: Vec<AlertEvent> = warehouse.load_table(ALERTS_TABLE).unwrap();
        assert_eq!(loaded, alerts);
    }

    #[derive(Serialize)]
    struct Nested {
        inner: Vec<u32>,
    }

    #[test]
    fn test_failed_write_keeps_table_and_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let warehouse = CsvWarehouse::open(dir.path()).unwrap();
        warehouse.replace_table(VARIANCE_TABLE, &rows()).unwrap();

        // csv cannot serialize a sequence inside a record
        let err = warehouse
            .replace_table(VARIANCE_TABLE, &[Nested { inner: vec![1, 2] }])
            .unwrap_err();
        assert!(matches!(err, WarehouseError::Csv(_)));
        assert!(!dir.path().join(".variance_analysis.csv.tmp").exists());

        let loaded: Vec<VarianceRow> = warehouse.load_table(VARIANCE_TABLE).unwrap();
        assert_eq!(loaded, rows());
    }

    #[test]
    fn test_missing_table() {
        let dir = TempDir::new().unwrap();
        let warehouse = CsvWarehouse::open(dir.path()).unwrap();

        assert!(!warehouse.has_table(SENSOR_TABLE));
        let err = warehouse.load_table::<VarianceRow>(SENSOR_TABLE).unwrap_err();
        assert!(matches!(err, WarehouseError::MissingTable(_)));
    }

    #[test]
    fn test_invalid_name() {
        let dir = TempDir::new().unwrap();
        let warehouse = CsvWarehouse::open(dir.path()).unwrap();
        let err = warehouse.replace_table("../escape", &rows()).unwrap_err();
        assert!(matches!(err, WarehouseError::InvalidName(_)));
    }
}
