// Kiln Testdata - Anomaly injection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Scheduled anomaly injection.
//!
//! A schedule is an ordered list of rules keyed on the minute index. Rules
//! are applied after base synthesis, in list order, and several may fire on
//! the same minute.

use kiln::{AlertType, ArgumentError, ChannelReadings, Metric, Result, MINUTES_PER_DAY};
use serde::{Deserialize, Serialize};

/// How an injection alters the channel value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InjectionEffect {
    /// Add `delta` (negative for drops).
    Offset { delta: f64 },
    /// Multiply by `factor`.
    Scale { factor: f64 },
}

impl InjectionEffect {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            InjectionEffect::Offset { delta } => value + delta,
            InjectionEffect::Scale { factor } => value * factor,
        }
    }
}

/// Fires on every minute index `i` with `i % period_minutes == offset_minutes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionRule {
    pub metric: Metric,
    pub period_minutes: usize,
    pub offset_minutes: usize,
    pub effect: InjectionEffect,
    pub alert_type: AlertType,
    pub message: String,
}

impl InjectionRule {
    pub fn new(
        metric: Metric,
        period_minutes: usize,
        offset_minutes: usize,
        effect: InjectionEffect,
        alert_type: AlertType,
        message: &str,
    ) -> Self {
        Self {
            metric,
            period_minutes,
            offset_minutes,
            effect,
            alert_type,
            message: message.to_string(),
        }
    }

    /// Check if the rule fires at the given minute index.
    pub fn matches(&self, index: usize) -> bool {
        self.period_minutes > 0 && index % self.period_minutes == self.offset_minutes
    }

    /// A rule whose offset is not below its period never fires.
    pub fn is_dormant(&self) -> bool {
        self.offset_minutes >= self.period_minutes
    }

    /// Number of indices in `0..num_samples` this rule fires on.
    pub fn expected_firings(&self, num_samples: usize) -> usize {
        if self.is_dormant() || num_samples <= self.offset_minutes {
            return 0;
        }
        (num_samples - self.offset_minutes - 1) / self.period_minutes + 1
    }

    fn validate(&self) -> Result<()> {
        if self.period_minutes == 0 {
            return Err(ArgumentError::InvalidSchedulePeriod(self.message.clone()).into());
        }
        if self.metric.is_derived() {
            return Err(ArgumentError::UnsupportedMetric {
                metric: self.metric.to_string(),
                reason: "derived channels cannot be injected".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Ordered list of injection rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnomalySchedule {
    pub rules: Vec<InjectionRule>,
}

impl AnomalySchedule {
    /// The reference schedule, in priority order.
    ///
    /// The oxygen rule uses offset 1500 against a 1440-minute period and
    /// therefore never fires. It is kept as scheduled.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                InjectionRule::new(
                    Metric::KilnTemperature,
                    MINUTES_PER_DAY,
                    1000,
                    InjectionEffect::Offset { delta: -100.0 },
                    AlertType::Warning,
                    "Kiln temperature dropped significantly",
                ),
                InjectionRule::new(
                    Metric::Vibration,
                    MINUTES_PER_DAY / 2,
                    300,
                    InjectionEffect::Scale { factor: 5.0 },
                    AlertType::Critical,
                    "High vibration detected in the kiln",
                ),
                InjectionRule::new(
                    Metric::Pressure,
                    MINUTES_PER_DAY,
                    500,
                    InjectionEffect::Offset { delta: 30.0 },
                    AlertType::Warning,
                    "Kiln pressure is unusually high",
                ),
                InjectionRule::new(
                    Metric::Oxygen,
                    MINUTES_PER_DAY,
                    1500,
                    InjectionEffect::Offset { delta: -1.5 },
                    AlertType::Critical,
                    "Low oxygen level in the kiln",
                ),
            ],
        }
    }

    /// No injections at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Append a rule with the lowest priority.
    pub fn with_rule(mut self, rule: InjectionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.rules.iter().try_for_each(InjectionRule::validate)
    }

    /// Rules that can never fire.
    pub fn dormant_rules(&self) -> impl Iterator<Item = &InjectionRule> {
        self.rules.iter().filter(|r| r.is_dormant())
    }

    /// Apply every matching rule to `readings`, returning the fired rules in
    /// priority order. Assumes a validated schedule.
    pub fn apply(&self, index: usize, readings: &mut ChannelReadings) -> Vec<&InjectionRule> {
        let mut fired = Vec::new();
        for rule in &self.rules {
            if !rule.matches(index) {
                continue;
            }
            if let Some(value) = readings.get_mut(rule.metric) {
                *value = rule.effect.apply(*value);
                fired.push(rule);
            }
        }
        fired
    }
}
