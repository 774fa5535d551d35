// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Rolling-window detection.
//!
//! Each metric is scanned independently with a trailing window that includes
//! the current record. A row is anomalous when it sits more than
//! `threshold_std` sample standard deviations from the window mean. Until the
//! window is full the status is `None`.

use crate::config::RollingWindowConfig;
use crate::window::RollingWindow;
use kiln::{Metric, Result, SensorRecord, VarianceRow};
use log::{debug, warn};
use rayon::prelude::*;

/// Run rolling detection over the default metrics.
pub fn analyze_rolling_window(
    records: &[SensorRecord],
    window_size: usize,
    threshold_std: f64,
) -> Result<Vec<VarianceRow>> {
    let config = RollingWindowConfig::new(window_size, threshold_std)?;
    Ok(scan(records, &config))
}

/// Run rolling detection with a custom metric set.
pub fn analyze_rolling_window_with(
    records: &[SensorRecord],
    config: &RollingWindowConfig,
) -> Result<Vec<VarianceRow>> {
    config.validate()?;
    Ok(scan(records, config))
}

fn scan(records: &[SensorRecord], config: &RollingWindowConfig) -> Vec<VarianceRow> {
    if records.is_empty() {
        return Vec::new();
    }
    if let Some(i) = first_out_of_order(records) {
        warn!(
            "records are not in timestamp order at index {}; rolling windows follow input order",
            i
        );
    }

    // Metrics are independent; collect keeps them in config order.
    let per_metric: Vec<Vec<VarianceRow>> = config
        .metrics
        .par_iter()
        .map(|&metric| scan_metric(records, metric, config))
        .collect();

    let rows: Vec<VarianceRow> = per_metric.into_iter().flatten().collect();
    debug!(
        "rolling window {} / {} std: {} rows, {} flagged, {} undetermined",
        config.window_size,
        config.threshold_std,
        rows.len(),
        rows.iter().filter(|r| r.is_flagged()).count(),
        rows.iter().filter(|r| r.is_undetermined()).count()
    );
    rows
}

fn scan_metric(
    records: &[SensorRecord],
    metric: Metric,
    config: &RollingWindowConfig,
) -> Vec<VarianceRow> {
    let mut window = RollingWindow::new(config.window_size);
    records
        .iter()
        .map(|record| {
            let value = record.value(metric);
            let is_anomaly = window
                .push(value)
                .and_then(|stats| stats.is_outlier(value, config.threshold_std));
            // Without a target the value is its own target.
            let target = record.target(metric).unwrap_or(value);
            VarianceRow::new(record.timestamp, metric, value, Some(target), is_anomaly)
        })
        .collect()
}

fn first_out_of_order(records: &[SensorRecord]) -> Option<usize> {
    records
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        .map(|i| i + 1)
}
