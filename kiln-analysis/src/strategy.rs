// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Selectable analysis modes.

use crate::config::{FixedThresholdConfig, RollingWindowConfig};
use crate::fixed_threshold::analyze_fixed_threshold_with;
use crate::rolling::analyze_rolling_window_with;
use kiln::{Result, SensorRecord, VarianceRow};
use serde::{Deserialize, Serialize};

/// Which anomaly policy produces the variance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisStrategy {
    /// Deviation limits against known targets.
    FixedThreshold(FixedThresholdConfig),
    /// Trailing mean and sample std per metric.
    RollingWindow(RollingWindowConfig),
}

impl Default for AnalysisStrategy {
    fn default() -> Self {
        AnalysisStrategy::FixedThreshold(FixedThresholdConfig::default())
    }
}

impl AnalysisStrategy {
    pub fn rolling(window_size: usize, threshold_std: f64) -> Result<Self> {
        RollingWindowConfig::new(window_size, threshold_std).map(AnalysisStrategy::RollingWindow)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisStrategy::FixedThreshold(_) => "fixed_threshold",
            AnalysisStrategy::RollingWindow(_) => "rolling_window",
        }
    }

    /// Recompute the full variance table from `records`.
    pub fn analyze(&self, records: &[SensorRecord]) -> Result<Vec<VarianceRow>> {
        match self {
            AnalysisStrategy::FixedThreshold(config) => analyze_fixed_threshold_with(records, config),
            AnalysisStrategy::RollingWindow(config) => analyze_rolling_window_with(records, config),
        }
    }
}
