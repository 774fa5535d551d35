// Kiln Testdata - Channel patterns
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Per-channel signal models for kiln telemetry.
//!
//! Every continuous channel is a normal draw plus an optional periodic
//! component driven by the wall-clock hour or minute of the sample, with an
//! optional clamp applied last.

use chrono::{DateTime, Timelike, Utc};
use kiln::{ChannelReadings, KilnError, Metric, Result};
use rand::prelude::*;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Clock cycle driving a periodic component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cycle {
    /// Minute of the hour over 60.
    Hourly,
    /// Hour of the day over 24.
    Daily,
}

impl Cycle {
    /// Angle in radians for the given instant.
    pub fn phase(&self, timestamp: &DateTime<Utc>) -> f64 {
        match self {
            Cycle::Hourly => 2.0 * PI * timestamp.minute() as f64 / 60.0,
            Cycle::Daily => 2.0 * PI * timestamp.hour() as f64 / 24.0,
        }
    }
}

/// Deterministic periodic component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Seasonality {
    None,
    /// `amplitude * sin(phase)`
    Sine { amplitude: f64, cycle: Cycle },
    /// `amplitude * cos(phase)`
    Cosine { amplitude: f64, cycle: Cycle },
}

impl Seasonality {
    pub fn evaluate(&self, timestamp: &DateTime<Utc>) -> f64 {
        match self {
            Seasonality::None => 0.0,
            Seasonality::Sine { amplitude, cycle } => cycle.phase(timestamp).sin() * amplitude,
            Seasonality::Cosine { amplitude, cycle } => cycle.phase(timestamp).cos() * amplitude,
        }
    }
}

/// Model for one continuous channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelPattern {
    pub mean: f64,
    pub std_dev: f64,
    pub seasonality: Seasonality,
    /// Inclusive `(min, max)` applied after the periodic component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<(f64, f64)>,
}

impl ChannelPattern {
    /// Pure normal noise around `mean`.
    pub fn normal(mean: f64, std_dev: f64) -> Self {
        Self {
            mean,
            std_dev,
            seasonality: Seasonality::None,
            clamp: None,
        }
    }

    pub fn with_sine(mut self, amplitude: f64, cycle: Cycle) -> Self {
        self.seasonality = Seasonality::Sine { amplitude, cycle };
        self
    }

    pub fn with_cosine(mut self, amplitude: f64, cycle: Cycle) -> Self {
        self.seasonality = Seasonality::Cosine { amplitude, cycle };
        self
    }

    pub fn with_clamp(mut self, min: f64, max: f64) -> Self {
        self.clamp = Some((min, max));
        self
    }

    /// Combine a normal draw with the periodic component and clamp.
    pub fn apply(&self, draw: f64, timestamp: &DateTime<Utc>) -> f64 {
        let value = draw + self.seasonality.evaluate(timestamp);
        match self.clamp {
            Some((min, max)) => value.max(min).min(max),
            None => value,
        }
    }

    /// Validate the distribution parameters for `channel`.
    pub fn sampler(&self, channel: Metric) -> Result<ChannelSampler> {
        if let Some((min, max)) = self.clamp {
            if !(min <= max) {
                return Err(KilnError::distribution(
                    channel.as_str(),
                    format!("clamp min {} above max {}", min, max),
                ));
            }
        }
        let normal = Normal::new(self.mean, self.std_dev)
            .map_err(|e| KilnError::distribution(channel.as_str(), e))?;
        Ok(ChannelSampler {
            pattern: *self,
            normal,
        })
    }
}

/// A validated [`ChannelPattern`] ready to draw from.
#[derive(Debug, Clone, Copy)]
pub struct ChannelSampler {
    pattern: ChannelPattern,
    normal: Normal<f64>,
}

impl ChannelSampler {
    pub fn sample(&self, timestamp: &DateTime<Utc>, rng: &mut (impl Rng + ?Sized)) -> f64 {
        let draw = self.normal.sample(rng);
        self.pattern.apply(draw, timestamp)
    }
}

/// Signal models for every continuous kiln channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KilnProfile {
    pub actual_fcao: ChannelPattern,
    pub raw_material_feed_rate: ChannelPattern,
    pub kiln_temperature: ChannelPattern,
    pub fuel_consumption: ChannelPattern,
    pub vibration: ChannelPattern,
    pub motor_current_draw: ChannelPattern,
    pub pressure: ChannelPattern,
    pub oxygen: ChannelPattern,
}

impl Default for KilnProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl KilnProfile {
    /// Nominal operation of the reference kiln.
    pub fn standard() -> Self {
        Self {
            actual_fcao: ChannelPattern::normal(2.0, 0.1)
                .with_sine(0.05, Cycle::Daily)
                .with_clamp(1.8, 2.2),
            raw_material_feed_rate: ChannelPattern::normal(100.0, 2.0)
                .with_sine(1.0, Cycle::Hourly),
            kiln_temperature: ChannelPattern::normal(1450.0, 5.0).with_cosine(2.0, Cycle::Daily),
            fuel_consumption: ChannelPattern::normal(80.0, 2.0).with_sine(0.5, Cycle::Daily),
            vibration: ChannelPattern::normal(0.5, 0.05),
            motor_current_draw: ChannelPattern::normal(50.0, 1.0)
                .with_cosine(0.5, Cycle::Hourly),
            pressure: ChannelPattern::normal(50.0, 2.0),
            oxygen: ChannelPattern::normal(2.5, 0.05),
        }
    }

    /// Pattern for a continuous channel.
    pub fn pattern(&self, metric: Metric) -> Option<&ChannelPattern> {
        match metric {
            Metric::ActualFcao => Some(&self.actual_fcao),
            Metric::RawMaterialFeedRate => Some(&self.raw_material_feed_rate),
            Metric::KilnTemperature => Some(&self.kiln_temperature),
            Metric::FuelConsumption => Some(&self.fuel_consumption),
            Metric::Vibration => Some(&self.vibration),
            Metric::MotorCurrentDraw => Some(&self.motor_current_draw),
            Metric::Pressure => Some(&self.pressure),
            Metric::Oxygen => Some(&self.oxygen),
            _ => None,
        }
    }

    /// Validate every channel and build the per-minute sampler.
    pub fn sampler(&self) -> Result<ProfileSampler> {
        let channels = [
            self.actual_fcao.sampler(Metric::ActualFcao)?,
            self.raw_material_feed_rate.sampler(Metric::RawMaterialFeedRate)?,
            self.kiln_temperature.sampler(Metric::KilnTemperature)?,
            self.fuel_consumption.sampler(Metric::FuelConsumption)?,
            self.vibration.sampler(Metric::Vibration)?,
            self.motor_current_draw.sampler(Metric::MotorCurrentDraw)?,
            self.pressure.sampler(Metric::Pressure)?,
            self.oxygen.sampler(Metric::Oxygen)?,
        ];
        Ok(ProfileSampler { channels })
    }
}

/// Draws one [`ChannelReadings`] per minute.
#[derive(Debug, Clone)]
pub struct ProfileSampler {
    /// In [`Metric::CONTINUOUS`] order.
    channels: [ChannelSampler; 8],
}

impl ProfileSampler {
    /// One independent draw per channel, in column order.
    pub fn sample(&self, timestamp: &DateTime<Utc>, rng: &mut (impl Rng + ?Sized)) -> ChannelReadings {
        let [fcao, feed, temp, fuel, vib, motor, pressure, oxygen] = &self.channels;
        ChannelReadings {
            actual_fcao: fcao.sample(timestamp, rng),
            raw_material_feed_rate: feed.sample(timestamp, rng),
            kiln_temperature: temp.sample(timestamp, rng),
            fuel_consumption: fuel.sample(timestamp, rng),
            vibration: vib.sample(timestamp, rng),
            motor_current_draw: motor.sample(timestamp, rng),
            pressure: pressure.sample(timestamp, rng),
            oxygen: oxygen.sample(timestamp, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rand::rngs::StdRng;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_cycle_phase() {
        assert_relative_eq!(Cycle::Daily.phase(&at(6, 0)), PI / 2.0);
        assert_relative_eq!(Cycle::Hourly.phase(&at(0, 30)), PI);
        assert_eq!(Cycle::Daily.phase(&at(0, 59)), 0.0);
    }

    #[test]
    fn test_seasonality_evaluate() {
        let sine = Seasonality::Sine {
            amplitude: 0.5,
            cycle: Cycle::Daily,
        };
        assert_relative_eq!(sine.evaluate(&at(6, 0)), 0.5);

        let cosine = Seasonality::Cosine {
            amplitude: 2.0,
            cycle: Cycle::Daily,
        };
        assert_relative_eq!(cosine.evaluate(&at(0, 0)), 2.0);
        assert_relative_eq!(cosine.evaluate(&at(12, 0)), -2.0);

        assert_eq!(Seasonality::None.evaluate(&at(3, 3)), 0.0);
    }

    #[test]
    fn test_apply_clamps() {
        let pattern = ChannelPattern::normal(2.0, 0.1).with_clamp(1.8, 2.2);
        assert_eq!(pattern.apply(3.0, &at(0, 0)), 2.2);
        assert_eq!(pattern.apply(1.0, &at(0, 0)), 1.8);
        assert_eq!(pattern.apply(2.1, &at(0, 0)), 2.1);
    }

    #[test]
    fn test_sampler_rejects_bad_std() {
        let pattern = ChannelPattern::normal(1.0, -1.0);
        assert!(pattern.sampler(Metric::Pressure).is_err());

        let pattern = ChannelPattern::normal(1.0, f64::NAN);
        assert!(pattern.sampler(Metric::Pressure).is_err());
    }

    #[test]
    fn test_sampler_rejects_inverted_clamp() {
        let pattern = ChannelPattern::normal(2.0, 0.1).with_clamp(2.2, 1.8);
        assert!(pattern.sampler(Metric::ActualFcao).is_err());
    }

    #[test]
    fn test_zero_std_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(7);
        let sampler = ChannelPattern::normal(50.0, 0.0)
            .with_cosine(0.5, Cycle::Hourly)
            .sampler(Metric::MotorCurrentDraw)
            .unwrap();
        assert_relative_eq!(sampler.sample(&at(0, 0), &mut rng), 50.5);
    }

    #[test]
    fn test_standard_profile_sample() {
        let mut rng = StdRng::seed_from_u64(42);
        let sampler = KilnProfile::standard().sampler().unwrap();
        let readings = sampler.sample(&at(10, 15), &mut rng);
        assert!((1.8..=2.2).contains(&readings.actual_fcao));
        assert!((readings.kiln_temperature - 1450.0).abs() < 50.0);
        assert!((readings.oxygen - 2.5).abs() < 1.0);
    }

    #[test]
    fn test_profile_pattern_lookup() {
        let profile = KilnProfile::standard();
        assert_eq!(profile.pattern(Metric::Pressure).unwrap().mean, 50.0);
        assert!(profile.pattern(Metric::ClinkerProduction).is_none());
    }

    #[test]
    fn test_profile_serde() {
        let profile = KilnProfile::standard();
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"shape\":\"sine\""));
        let back: KilnProfile = serde_json::from_str(&json).unwrap();
        assert!(back.actual_fcao.clamp.is_some());
        assert!(matches!(
            back.kiln_temperature.seasonality,
            Seasonality::Cosine {
                cycle: Cycle::Daily,
                ..
            }
        ));
        assert_eq!(back.pressure.seasonality, Seasonality::None);
    }
}
