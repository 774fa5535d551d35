//! Long-form (unpivoted) variance rows.

use crate::metric::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One `(timestamp, metric)` observation with its target and deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    pub timestamp: DateTime<Utc>,
    pub metric_name: Metric,
    pub value: f64,
    /// `None` when the metric has no target in the chosen analysis mode.
    pub target: Option<f64>,
    /// `value - target`, or `0` without a target.
    pub deviation: f64,
    /// `None` when the analysis could not decide (short rolling history).
    pub is_anomaly: Option<bool>,
}

impl VarianceRow {
    /// Build a row, deriving the deviation from the target.
    pub fn new(
        timestamp: DateTime<Utc>,
        metric_name: Metric,
        value: f64,
        target: Option<f64>,
        is_anomaly: Option<bool>,
    ) -> Self {
        Self {
            timestamp,
            metric_name,
            value,
            target,
            deviation: target.map_or(0.0, |t| value - t),
            is_anomaly,
        }
    }

    /// True only when the row was positively flagged.
    pub fn is_flagged(&self) -> bool {
        self.is_anomaly == Some(true)
    }

    /// True when no anomaly determination was made.
    pub fn is_undetermined(&self) -> bool {
        self.is_anomaly.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_deviation_with_target() {
        let row = VarianceRow::new(ts(), Metric::KilnTemperature, 1390.0, Some(1450.0), Some(true));
        assert_eq!(row.deviation, -60.0);
        assert!(row.is_flagged());
    }

    #[test]
    fn test_deviation_without_target() {
        let row = VarianceRow::new(ts(), Metric::Vibration, 0.7, None, Some(false));
        assert_eq!(row.deviation, 0.0);
        assert!(!row.is_flagged());
        assert!(!row.is_undetermined());
    }

    #[test]
    fn test_undetermined() {
        let row = VarianceRow::new(ts(), Metric::Pressure, 50.0, None, None);
        assert!(row.is_undetermined());
        assert!(!row.is_flagged());
    }
}
