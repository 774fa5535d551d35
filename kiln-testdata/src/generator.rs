// Kiln Testdata - Core generator
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Core dataset generation logic.
//!
//! Produces one [`SensorRecord`] per simulated minute and an [`AlertEvent`]
//! for every scheduled injection that fires.

use crate::anomalies::AnomalySchedule;
use crate::dataset::{DatasetMetadata, KilnDataset};
use crate::patterns::KilnProfile;
use chrono::{DateTime, Duration, TimeZone, Utc};
use kiln::{AlertEvent, ArgumentError, Result, SensorRecord, MINUTES_PER_DAY};
use log::{debug, warn};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Generator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Timestamp of the first record.
    pub start: DateTime<Utc>,
    /// Number of simulated days.
    pub num_days: u32,
    /// Random seed for reproducibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Channel models.
    pub profile: KilnProfile,
    /// Injection rules.
    pub schedule: AnomalySchedule,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            num_days: 7,
            seed: None,
            profile: KilnProfile::standard(),
            schedule: AnomalySchedule::standard(),
        }
    }
}

/// 2023-01-01 00:00:00 UTC
pub fn default_start() -> DateTime<Utc> {
    Utc.timestamp_opt(1_672_531_200, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl GeneratorConfig {
    /// Create a new generator config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set start timestamp.
    pub fn with_start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Set number of days.
    pub fn with_num_days(mut self, num_days: u32) -> Self {
        self.num_days = num_days;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the channel models.
    pub fn with_profile(mut self, profile: KilnProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Replace the injection schedule.
    pub fn with_schedule(mut self, schedule: AnomalySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Number of records the config produces.
    pub fn num_samples(&self) -> usize {
        self.num_days as usize * MINUTES_PER_DAY
    }

    /// Timestamp of the last record.
    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(self.num_samples().saturating_sub(1) as i64)
    }
}

/// Hands out alert ids in emission order.
#[derive(Debug, Clone)]
pub struct AlertSequence {
    next_id: u64,
}

impl Default for AlertSequence {
    fn default() -> Self {
        Self { next_id: 1 }
    }
}

impl AlertSequence {
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Generate `num_days` of telemetry from `start` with an entropy-seeded rng.
pub fn generate(num_days: u32, start: DateTime<Utc>) -> Result<KilnDataset> {
    let config = GeneratorConfig::new()
        .with_num_days(num_days)
        .with_start(start);
    generate_dataset(&config)
}

/// Generate a dataset from configuration.
pub fn generate_dataset(config: &GeneratorConfig) -> Result<KilnDataset> {
    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    generate_with_rng(config, &mut rng)
}

/// Generate a dataset drawing from a caller-owned random source.
pub fn generate_with_rng(
    config: &GeneratorConfig,
    rng: &mut (impl Rng + ?Sized),
) -> Result<KilnDataset> {
    if config.num_days == 0 {
        return Err(ArgumentError::NonPositiveDays(config.num_days).into());
    }
    config.schedule.validate()?;
    let sampler = config.profile.sampler()?;

    for rule in config.schedule.dormant_rules() {
        warn!(
            "injection '{}' has offset {} >= period {} and will never fire",
            rule.message, rule.offset_minutes, rule.period_minutes
        );
    }

    let num_samples = config.num_samples();
    let mut records = Vec::with_capacity(num_samples);
    let mut alerts = Vec::new();
    let mut sequence = AlertSequence::default();

    for i in 0..num_samples {
        let timestamp = config.start + Duration::minutes(i as i64);
        let mut readings = sampler.sample(&timestamp, rng);

        let fired = config.schedule.apply(i, &mut readings);
        for rule in &fired {
            alerts.push(AlertEvent::new(
                sequence.next_id(),
                rule.message.as_str(),
                timestamp,
                rule.alert_type,
            ));
        }

        records.push(SensorRecord::new(timestamp, readings).with_anomaly(!fired.is_empty()));
    }

    debug!(
        "generated {} records and {} alerts starting at {}",
        records.len(),
        alerts.len(),
        config.start
    );

    let mut dataset = KilnDataset::new(records, alerts);
    dataset.metadata = DatasetMetadata {
        name: None,
        seed: config.seed,
        start: Some(config.start),
        num_days: Some(config.num_days),
    };
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomalies::{InjectionEffect, InjectionRule};
    use kiln::{AlertType, KilnError, Metric};

    #[test]
    fn test_generator_config_default() {
        let config = GeneratorConfig::default();
        assert_eq!(config.num_days, 7);
        assert_eq!(config.num_samples(), 10_080);
        assert_eq!(config.start.to_rfc3339(), "2023-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_generator_config_partial_json() {
        let config: GeneratorConfig = serde_json::from_str(r#"{"num_days": 3}"#).unwrap();
        assert_eq!(config.num_days, 3);
        assert_eq!(config.start, default_start());
        assert_eq!(config.schedule, AnomalySchedule::standard());
    }

    #[test]
    fn test_generator_config_end() {
        let config = GeneratorConfig::new().with_num_days(1);
        assert_eq!(config.end() - config.start, Duration::minutes(1439));
    }

    #[test]
    fn test_alert_sequence() {
        let mut seq = AlertSequence::default();
        assert_eq!(seq.next_id(), 1);
        assert_eq!(seq.next_id(), 2);
        assert_eq!(seq.next_id(), 3);
    }

    #[test]
    fn test_zero_days_rejected() {
        let err = generate(0, default_start()).unwrap_err();
        assert_eq!(
            err,
            KilnError::InvalidArgument(ArgumentError::NonPositiveDays(0))
        );
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        let config = GeneratorConfig::new()
            .with_num_days(1)
            .with_seed(1)
            .with_schedule(AnomalySchedule::none().with_rule(InjectionRule::new(
                Metric::EnergyConsumptionKwh,
                60,
                0,
                InjectionEffect::Scale { factor: 2.0 },
                AlertType::Warning,
                "derived",
            )));
        assert!(generate_dataset(&config).is_err());
    }

    #[test]
    fn test_generate_one_day() {
        let config = GeneratorConfig::new().with_num_days(1).with_seed(42);
        let dataset = generate_dataset(&config).unwrap();

        assert_eq!(dataset.len(), 1440);
        assert_eq!(dataset.records[0].timestamp, config.start);
        assert_eq!(dataset.metadata.seed, Some(42));
        // 300 and 1020 vibration, 500 pressure, 1000 temperature
        assert_eq!(dataset.alerts.len(), 4);
        assert_eq!(dataset.anomaly_count(), 4);
    }

    #[test]
    fn test_reproducibility() {
        let config = GeneratorConfig::new().with_num_days(1).with_seed(12345);

        let dataset1 = generate_dataset(&config).unwrap();
        let dataset2 = generate_dataset(&config).unwrap();

        assert_eq!(dataset1.records, dataset2.records);
        assert_eq!(dataset1.alerts, dataset2.alerts);
    }

    #[test]
    fn test_multiple_rules_one_flagged_record() {
        let schedule = AnomalySchedule::none()
            .with_rule(InjectionRule::new(
                Metric::Pressure,
                60,
                10,
                InjectionEffect::Offset { delta: 30.0 },
                AlertType::Warning,
                "Kiln pressure is unusually high",
            ))
            .with_rule(InjectionRule::new(
                Metric::Oxygen,
                60,
                10,
                InjectionEffect::Offset { delta: -1.5 },
                AlertType::Critical,
                "Low oxygen level in the kiln",
            ));
        let config = GeneratorConfig::new()
            .with_num_days(1)
            .with_seed(3)
            .with_schedule(schedule);
        let dataset = generate_dataset(&config).unwrap();

        // 24 firing minutes, two alerts each
        assert_eq!(dataset.anomaly_count(), 24);
        assert_eq!(dataset.alerts.len(), 48);
        assert_eq!(dataset.alerts[0].timestamp, dataset.alerts[1].timestamp);
        assert_eq!(dataset.alerts[0].alert_type, AlertType::Warning);
        assert_eq!(dataset.alerts[1].alert_type, AlertType::Critical);
        assert!(dataset.records[10].is_anomaly);
        assert!(!dataset.records[11].is_anomaly);
    }

    #[test]
    fn test_derived_channels_follow_injected_readings() {
        let schedule = AnomalySchedule::none().with_rule(InjectionRule::new(
            Metric::RawMaterialFeedRate,
            120,
            5,
            InjectionEffect::Scale { factor: 0.5 },
            AlertType::Warning,
            "Raw material feed dropped",
        ));
        let config = GeneratorConfig::new()
            .with_num_days(1)
            .with_seed(11)
            .with_schedule(schedule);
        let dataset = generate_dataset(&config).unwrap();

        let injected = &dataset.records[5];
        assert!(injected.is_anomaly);
        assert_eq!(
            injected.clinker_production,
            injected.raw_material_feed_rate * kiln::record::CLINKER_CONVERSION_RATE
        );
        assert_eq!(
            injected.specific_energy_consumption,
            kiln::specific_energy(injected.energy_consumption_kwh, injected.clinker_production)
        );
    }
}
