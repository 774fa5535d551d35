// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Analysis configuration.

use kiln::{ArgumentError, Metric, Result};
use serde::{Deserialize, Serialize};

/// Fixed f-CaO setpoint used as the `actual_fcao` target.
pub const FCAO_TARGET: f64 = 2.0;

/// Settings for the threshold unpivot (Mode A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedThresholdConfig {
    /// Target for `actual_fcao`.
    pub fcao_target: f64,

    /// Max |deviation| of `kiln_temperature` before a row is anomalous.
    pub kiln_temperature_limit: f64,

    /// Max |deviation| of `fuel_consumption` before a row is anomalous.
    pub fuel_consumption_limit: f64,

    /// Max |deviation| of `actual_fcao` before a row is anomalous.
    pub fcao_limit: f64,

    /// Metrics to unpivot, in output order.
    pub metrics: Vec<Metric>,
}

impl Default for FixedThresholdConfig {
    fn default() -> Self {
        Self {
            fcao_target: FCAO_TARGET,
            kiln_temperature_limit: 50.0,
            fuel_consumption_limit: 10.0,
            fcao_limit: 0.2,
            metrics: Metric::ALL.to_vec(),
        }
    }
}

impl FixedThresholdConfig {
    /// Restrict the unpivot to `metrics`.
    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Limit on |deviation| for metrics with a threshold.
    pub fn limit_for(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::KilnTemperature => Some(self.kiln_temperature_limit),
            Metric::FuelConsumption => Some(self.fuel_consumption_limit),
            Metric::ActualFcao => Some(self.fcao_limit),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(ArgumentError::EmptyMetricList.into());
        }
        for limit in [
            self.kiln_temperature_limit,
            self.fuel_consumption_limit,
            self.fcao_limit,
        ] {
            if !limit.is_finite() || limit < 0.0 {
                return Err(ArgumentError::InvalidThreshold(limit).into());
            }
        }
        Ok(())
    }
}

/// Settings for rolling-window detection (Mode B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingWindowConfig {
    /// Trailing records per window, current one included.
    pub window_size: usize,

    /// Anomalous when `|value - mean| > std * threshold_std`.
    pub threshold_std: f64,

    /// Metrics to analyze, in output order.
    pub metrics: Vec<Metric>,
}

impl Default for RollingWindowConfig {
    fn default() -> Self {
        Self {
            window_size: 60,
            threshold_std: 3.0,
            metrics: Self::DEFAULT_METRICS.to_vec(),
        }
    }
}

impl RollingWindowConfig {
    pub const DEFAULT_METRICS: [Metric; 5] = [
        Metric::KilnTemperature,
        Metric::FuelConsumption,
        Metric::Vibration,
        Metric::Pressure,
        Metric::Oxygen,
    ];

    /// Validated constructor over the default metrics.
    pub fn new(window_size: usize, threshold_std: f64) -> Result<Self> {
        let config = Self {
            window_size,
            threshold_std,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ArgumentError::InvalidWindowSize(self.window_size).into());
        }
        if self.metrics.is_empty() {
            return Err(ArgumentError::EmptyMetricList.into());
        }
        if !self.threshold_std.is_finite() || self.threshold_std < 0.0 {
            return Err(ArgumentError::InvalidThreshold(self.threshold_std).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln::KilnError;

    #[test]
    fn test_fixed_defaults() {
        let config = FixedThresholdConfig::default();
        assert_eq!(config.fcao_target, 2.0);
        assert_eq!(config.limit_for(Metric::KilnTemperature), Some(50.0));
        assert_eq!(config.limit_for(Metric::FuelConsumption), Some(10.0));
        assert_eq!(config.limit_for(Metric::ActualFcao), Some(0.2));
        assert_eq!(config.limit_for(Metric::Pressure), None);
        assert_eq!(config.metrics.len(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_rejects_negative_limit() {
        let config = FixedThresholdConfig {
            fcao_limit: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_metric_list_rejected() {
        let fixed = FixedThresholdConfig::default().with_metrics(Vec::new());
        assert_eq!(
            fixed.validate(),
            Err(KilnError::from(ArgumentError::EmptyMetricList))
        );

        let rolling = RollingWindowConfig::default().with_metrics(Vec::new());
        assert_eq!(
            rolling.validate(),
            Err(KilnError::from(ArgumentError::EmptyMetricList))
        );
    }

    #[test]
    fn test_rolling_defaults() {
        let config = RollingWindowConfig::default();
        assert_eq!(config.window_size, 60);
        assert_eq!(config.threshold_std, 3.0);
        assert_eq!(config.metrics, RollingWindowConfig::DEFAULT_METRICS.to_vec());
    }

    #[test]
    fn test_rolling_new_validates() {
        assert!(RollingWindowConfig::new(60, 3.0).is_ok());
        assert!(RollingWindowConfig::new(0, 3.0).is_err());
        assert!(RollingWindowConfig::new(10, -1.0).is_err());
        assert!(RollingWindowConfig::new(10, f64::NAN).is_err());
    }

    #[test]
    fn test_serde_partial_config() {
        let config: RollingWindowConfig = serde_json::from_str(r#"{"window_size": 30}"#).unwrap();
        assert_eq!(config.window_size, 30);
        assert_eq!(config.threshold_std, 3.0);

        let config: FixedThresholdConfig =
            serde_json::from_str(r#"{"metrics": ["kiln_temperature"]}"#).unwrap();
        assert_eq!(config.metrics, vec![Metric::KilnTemperature]);
    }
}
