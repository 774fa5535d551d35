// Kiln Testdata - Dataset structures
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Dataset structures and I/O operations.
//!
//! Provides the `KilnDataset` type holding generated records and alerts,
//! with wide-table CSV and JSON export.

use chrono::{DateTime, Utc};
use kiln::{AlertEvent, AlertType, Metric, SensorRecord};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Dataset error types.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dataset metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Dataset name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Generation seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// First record timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    /// Simulated days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_days: Option<u32>,
}

/// Generated kiln telemetry: the wide table plus its alert log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnDataset {
    pub records: Vec<SensorRecord>,
    pub alerts: Vec<AlertEvent>,
    #[serde(default)]
    pub metadata: DatasetMetadata,
}

impl KilnDataset {
    pub fn new(records: Vec<SensorRecord>, alerts: Vec<AlertEvent>) -> Self {
        Self {
            records,
            alerts,
            metadata: DatasetMetadata::default(),
        }
    }

    /// Get all records.
    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    /// Get all alerts, in emission order.
    pub fn alerts(&self) -> &[AlertEvent] {
        &self.alerts
    }

    /// Split into `(records, alerts)`.
    pub fn into_parts(self) -> (Vec<SensorRecord>, Vec<AlertEvent>) {
        (self.records, self.alerts)
    }

    /// Get number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a column as a vector of values.
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    /// Get timestamps as a vector.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.records.iter().map(|r| r.timestamp).collect()
    }

    /// Number of records flagged as injected anomalies.
    pub fn anomaly_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_anomaly).count()
    }

    /// Number of alerts of one type.
    pub fn alert_count(&self, alert_type: AlertType) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.alert_type == alert_type)
            .count()
    }

    /// Set name.
    pub fn with_name(mut self, name: &str) -> Self {
        self.metadata.name = Some(name.to_string());
        self
    }

    /// Write the wide table as CSV to any writer.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export the wide table to a CSV file.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }

    /// Import a wide table from CSV. Alerts are not part of the table.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_path(path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<SensorRecord>, _>>()?;
        Ok(Self::new(records, Vec::new()))
    }

    /// Export alerts to a JSON file.
    pub fn alerts_to_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.alerts)?;
        Ok(())
    }

    /// Load alerts from a JSON file, replacing the current ones.
    pub fn with_alerts_from_json(mut self, path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        self.alerts = serde_json::from_reader(BufReader::new(file))?;
        Ok(self)
    }

    /// Export to JSON file.
    pub fn to_json(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Import from JSON file.
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let dataset = serde_json::from_reader(reader)?;
        Ok(dataset)
    }

    /// Calculate basic statistics for a channel.
    pub fn stats(&self, metric: Metric) -> Option<ChannelStats> {
        let values = self.column(metric);

        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;

        let variance: f64 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        let std_dev = variance.sqrt();

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Some(ChannelStats {
            count,
            mean,
            std_dev,
            min,
            max,
        })
    }
}

/// Basic statistics for a channel column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}
