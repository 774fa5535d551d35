//! Catalogue of the instrumented kiln channels.
//!
//! A [`Metric`] names one column of the wide table. Continuous channels are
//! synthesized directly; derived channels are computed from them.

use crate::error::{ArgumentError, KilnError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One instrumented channel of a [`SensorRecord`](crate::SensorRecord).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ActualFcao,
    RawMaterialFeedRate,
    KilnTemperature,
    FuelConsumption,
    Vibration,
    MotorCurrentDraw,
    Pressure,
    Oxygen,
    ClinkerProduction,
    EnergyConsumptionKwh,
    SpecificEnergyConsumption,
}

impl Metric {
    /// Every metric, in wide-table column order.
    pub const ALL: [Metric; 11] = [
        Metric::ActualFcao,
        Metric::RawMaterialFeedRate,
        Metric::KilnTemperature,
        Metric::FuelConsumption,
        Metric::Vibration,
        Metric::MotorCurrentDraw,
        Metric::Pressure,
        Metric::Oxygen,
        Metric::ClinkerProduction,
        Metric::EnergyConsumptionKwh,
        Metric::SpecificEnergyConsumption,
    ];

    /// Channels drawn from a distribution each minute.
    pub const CONTINUOUS: [Metric; 8] = [
        Metric::ActualFcao,
        Metric::RawMaterialFeedRate,
        Metric::KilnTemperature,
        Metric::FuelConsumption,
        Metric::Vibration,
        Metric::MotorCurrentDraw,
        Metric::Pressure,
        Metric::Oxygen,
    ];

    /// Column name in the wide table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::ActualFcao => "actual_fcao",
            Metric::RawMaterialFeedRate => "raw_material_feed_rate",
            Metric::KilnTemperature => "kiln_temperature",
            Metric::FuelConsumption => "fuel_consumption",
            Metric::Vibration => "vibration",
            Metric::MotorCurrentDraw => "motor_current_draw",
            Metric::Pressure => "pressure",
            Metric::Oxygen => "oxygen",
            Metric::ClinkerProduction => "clinker_production",
            Metric::EnergyConsumptionKwh => "energy_consumption_kwh",
            Metric::SpecificEnergyConsumption => "specific_energy_consumption",
        }
    }

    /// True for channels computed from other channels.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Metric::ClinkerProduction
                | Metric::EnergyConsumptionKwh
                | Metric::SpecificEnergyConsumption
        )
    }

    /// Parse a comma separated list such as `"kiln_temperature,pressure"`.
    ///
    /// A list without any metric name is rejected.
    pub fn parse_list(list: &str) -> Result<Vec<Metric>, KilnError> {
        let metrics = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Metric>, KilnError>>()?;
        if metrics.is_empty() {
            return Err(ArgumentError::EmptyMetricList.into());
        }
        Ok(metrics)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = KilnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ArgumentError::UnknownMetric(s.to_string()).into())
    }
}
