// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Threshold unpivot.
//!
//! Every record becomes one [`VarianceRow`] per metric. Rows start from the
//! record's injected-anomaly flag; metrics with a deviation limit are then
//! upgraded to anomalous when the limit is exceeded, never downgraded.

use crate::config::FixedThresholdConfig;
use kiln::{Metric, Result, SensorRecord, VarianceRow};
use log::debug;

/// Unpivot `records` with the default targets and limits.
pub fn analyze_fixed_threshold(records: &[SensorRecord]) -> Vec<VarianceRow> {
    unpivot(records, &FixedThresholdConfig::default())
}

/// Unpivot `records` with custom targets, limits or metric set.
pub fn analyze_fixed_threshold_with(
    records: &[SensorRecord],
    config: &FixedThresholdConfig,
) -> Result<Vec<VarianceRow>> {
    config.validate()?;
    Ok(unpivot(records, config))
}

fn unpivot(records: &[SensorRecord], config: &FixedThresholdConfig) -> Vec<VarianceRow> {
    let mut rows = Vec::with_capacity(records.len() * config.metrics.len());

    // Metric-major, matching a melt of the wide table.
    for &metric in &config.metrics {
        for record in records {
            rows.push(row_for(record, metric, config));
        }
    }

    debug!(
        "fixed-threshold unpivot: {} records x {} metrics, {} flagged",
        records.len(),
        config.metrics.len(),
        rows.iter().filter(|r| r.is_flagged()).count()
    );
    rows
}

fn target_for(record: &SensorRecord, metric: Metric, config: &FixedThresholdConfig) -> Option<f64> {
    match metric {
        Metric::ActualFcao => Some(config.fcao_target),
        _ => record.target(metric),
    }
}

fn row_for(record: &SensorRecord, metric: Metric, config: &FixedThresholdConfig) -> VarianceRow {
    let value = record.value(metric);
    let target = target_for(record, metric, config);
    let mut row = VarianceRow::new(record.timestamp, metric, value, target, Some(record.is_anomaly));

    if let Some(limit) = config.limit_for(metric) {
        if row.deviation.abs() > limit {
            row.is_anomaly = Some(true);
        }
    }
    row
}
