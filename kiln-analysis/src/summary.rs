// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Aggregates over variance rows and alerts.

use kiln::{AlertEvent, AlertType, Metric, VarianceRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-metric roll-up of a variance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub metric: Metric,
    pub rows: usize,
    pub anomalous: usize,
    pub undetermined: usize,
    pub mean_deviation: f64,
    pub max_abs_deviation: f64,
}

impl MetricSummary {
    fn new(metric: Metric) -> Self {
        Self {
            metric,
            rows: 0,
            anomalous: 0,
            undetermined: 0,
            mean_deviation: 0.0,
            max_abs_deviation: 0.0,
        }
    }

    /// Share of decided rows that were anomalous.
    pub fn anomaly_rate(&self) -> Option<f64> {
        let decided = self.rows - self.undetermined;
        if decided == 0 {
            None
        } else {
            Some(self.anomalous as f64 / decided as f64)
        }
    }
}

/// Summaries in column order, one per metric present in `rows`.
pub fn summarize(rows: &[VarianceRow]) -> Vec<MetricSummary> {
    let mut by_metric: BTreeMap<Metric, (MetricSummary, f64)> = BTreeMap::new();

    for row in rows {
        let (summary, sum) = by_metric
            .entry(row.metric_name)
            .or_insert_with(|| (MetricSummary::new(row.metric_name), 0.0));
        summary.rows += 1;
        match row.is_anomaly {
            Some(true) => summary.anomalous += 1,
            Some(false) => {}
            None => summary.undetermined += 1,
        }
        *sum += row.deviation;
        summary.max_abs_deviation = summary.max_abs_deviation.max(row.deviation.abs());
    }

    by_metric
        .into_values()
        .map(|(mut summary, sum)| {
            summary.mean_deviation = sum / summary.rows as f64;
            summary
        })
        .collect()
}

/// Alert counts by type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total: usize,
    pub warning: usize,
    pub critical: usize,
}

pub fn summarize_alerts(alerts: &[AlertEvent]) -> AlertSummary {
    alerts
        .iter()
        .fold(AlertSummary::default(), |mut acc, alert| {
            acc.total += 1;
            match alert.alert_type {
                AlertType::Warning => acc.warning += 1,
                AlertType::Critical => acc.critical += 1,
            }
            acc
        })
}
