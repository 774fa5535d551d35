// Kiln Pipeline - Variance report
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Summary of the variance and alert tables.

use crate::cache::CachedTables;
use crate::warehouse::{Warehouse, WarehouseError, CORRELATION_TABLE};
use chrono::{DateTime, Utc};
use kiln::{AlertEvent, Metric};
use kiln_analysis::{pearson, summarize, summarize_alerts, AlertSummary, CorrelationPoint, MetricSummary};
use serde::{Deserialize, Serialize};

/// Number of most recent alerts listed in a report.
pub const RECENT_ALERTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub variance_rows: usize,
    pub metrics: Vec<MetricSummary>,
    pub alerts: AlertSummary,
    /// Newest first.
    pub recent_alerts: Vec<AlertEvent>,
    /// Pearson r of kiln temperature against f-CaO, when the table exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_fcao_correlation: Option<f64>,
}

impl Report {
    pub fn metric(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

pub fn build_report<W: Warehouse>(tables: &CachedTables<W>) -> Result<Report, WarehouseError> {
    let rows = tables.variance_rows()?;
    let alerts = tables.alerts()?;

    let mut recent: Vec<AlertEvent> = alerts.iter().rev().take(RECENT_ALERTS).cloned().collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

    let warehouse = tables.warehouse();
    let temperature_fcao_correlation = if warehouse.has_table(CORRELATION_TABLE) {
        let points: Vec<CorrelationPoint> = warehouse.load_table(CORRELATION_TABLE)?;
        pearson(&points)
    } else {
        None
    };

    Ok(Report {
        generated_at: Utc::now(),
        variance_rows: rows.len(),
        metrics: summarize(&rows),
        alerts: summarize_alerts(&alerts),
        recent_alerts: recent,
        temperature_fcao_correlation,
    })
}
