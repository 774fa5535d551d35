// Kiln Testdata - Dataset manifest
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Dataset manifest describing a generated run.
//!
//! Records the channel models, the injection schedule with the number of
//! alerts each rule should produce, and the observed value ranges.

use crate::anomalies::{InjectionEffect, InjectionRule};
use crate::dataset::{DatasetError, KilnDataset};
use crate::generator::GeneratorConfig;
use crate::patterns::{ChannelPattern, Seasonality};
use chrono::{DateTime, Utc};
use kiln::{AlertType, Metric};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest for one generated dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub name: String,
    pub start: DateTime<Utc>,
    pub num_days: u32,
    pub sample_count: usize,
    /// Spacing between records.
    #[serde(default = "default_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub channels: Vec<ChannelManifest>,
    #[serde(default)]
    pub injections: Vec<InjectionManifest>,
    /// Alerts actually emitted, when built from a dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_count: Option<usize>,
    pub generated_at: DateTime<Utc>,
}

/// One record per simulated minute.
pub const SAMPLE_INTERVAL_MS: u64 = 60_000;

fn default_interval_ms() -> u64 {
    SAMPLE_INTERVAL_MS
}

/// Channel information in manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelManifest {
    pub metric: Metric,
    /// Human readable model, e.g. `N(1450, 5) + 2*cos(Daily)`.
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Injection rule information in manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InjectionManifest {
    pub metric: Metric,
    pub period_minutes: usize,
    pub offset_minutes: usize,
    pub effect: InjectionEffect,
    pub alert_type: AlertType,
    pub message: String,
    /// Firings within `sample_count` minutes.
    pub expected_firings: usize,
    pub dormant: bool,
}

impl InjectionManifest {
    pub fn from_rule(rule: &InjectionRule, sample_count: usize) -> Self {
        Self {
            metric: rule.metric,
            period_minutes: rule.period_minutes,
            offset_minutes: rule.offset_minutes,
            effect: rule.effect,
            alert_type: rule.alert_type,
            message: rule.message.clone(),
            expected_firings: rule.expected_firings(sample_count),
            dormant: rule.is_dormant(),
        }
    }
}

impl DatasetManifest {
    /// Describe what `config` will produce, without observed ranges.
    pub fn from_config(name: &str, config: &GeneratorConfig) -> Self {
        let sample_count = config.num_samples();
        let channels = Metric::CONTINUOUS
            .iter()
            .filter_map(|&metric| {
                config.profile.pattern(metric).map(|p| ChannelManifest {
                    metric,
                    pattern: describe(p),
                    min: None,
                    max: None,
                })
            })
            .collect();
        let injections = config
            .schedule
            .rules
            .iter()
            .map(|rule| InjectionManifest::from_rule(rule, sample_count))
            .collect();

        Self {
            name: name.to_string(),
            start: config.start,
            num_days: config.num_days,
            sample_count,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
            seed: config.seed,
            channels,
            injections,
            alert_count: None,
            generated_at: Utc::now(),
        }
    }

    /// Fill in observed ranges and the emitted alert count.
    pub fn with_observed(mut self, dataset: &KilnDataset) -> Self {
        for channel in &mut self.channels {
            if let Some(stats) = dataset.stats(channel.metric) {
                channel.min = Some(stats.min);
                channel.max = Some(stats.max);
            }
        }
        self.alert_count = Some(dataset.alerts.len());
        self
    }

    /// Total alerts the schedule should emit.
    pub fn expected_alerts(&self) -> usize {
        self.injections.iter().map(|i| i.expected_firings).sum()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to JSON file.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), DatasetError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load from JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn describe(pattern: &ChannelPattern) -> String {
    let mut text = format!("N({}, {})", pattern.mean, pattern.std_dev);
    match pattern.seasonality {
        Seasonality::None => {}
        Seasonality::Sine { amplitude, cycle } => {
            text.push_str(&format!(" + {}*sin({:?})", amplitude, cycle));
        }
        Seasonality::Cosine { amplitude, cycle } => {
            text.push_str(&format!(" + {}*cos({:?})", amplitude, cycle));
        }
    }
    if let Some((min, max)) = pattern.clamp {
        text.push_str(&format!(" clamped to [{}, {}]", min, max));
    }
    text
}
