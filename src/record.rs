//! Wide-table sensor records.

use crate::metric::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference kiln temperature carried on every record (°C).
pub const TARGET_KILN_TEMPERATURE: f64 = 1450.0;

/// Reference fuel consumption carried on every record.
pub const TARGET_FUEL_CONSUMPTION: f64 = 80.0;

/// Clinker produced per unit of raw material feed.
pub const CLINKER_CONVERSION_RATE: f64 = 0.6;

/// kWh per unit of fuel.
pub const FUEL_TO_KWH: f64 = 1000.0;

/// Values of the continuous channels for one minute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelReadings {
    pub actual_fcao: f64,
    pub raw_material_feed_rate: f64,
    pub kiln_temperature: f64,
    pub fuel_consumption: f64,
    pub vibration: f64,
    pub motor_current_draw: f64,
    pub pressure: f64,
    pub oxygen: f64,
}

impl ChannelReadings {
    /// Mutable access to a continuous channel. Derived channels return `None`.
    pub fn get_mut(&mut self, metric: Metric) -> Option<&mut f64> {
        match metric {
            Metric::ActualFcao => Some(&mut self.actual_fcao),
            Metric::RawMaterialFeedRate => Some(&mut self.raw_material_feed_rate),
            Metric::KilnTemperature => Some(&mut self.kiln_temperature),
            Metric::FuelConsumption => Some(&mut self.fuel_consumption),
            Metric::Vibration => Some(&mut self.vibration),
            Metric::MotorCurrentDraw => Some(&mut self.motor_current_draw),
            Metric::Pressure => Some(&mut self.pressure),
            Metric::Oxygen => Some(&mut self.oxygen),
            Metric::ClinkerProduction
            | Metric::EnergyConsumptionKwh
            | Metric::SpecificEnergyConsumption => None,
        }
    }

    /// Read a continuous channel. Derived channels return `None`.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        let mut copy = *self;
        copy.get_mut(metric).map(|v| *v)
    }
}

/// One simulated minute of kiln telemetry.
///
/// Field order is the wide-table column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    pub timestamp: DateTime<Utc>,
    pub actual_fcao: f64,
    pub raw_material_feed_rate: f64,
    pub kiln_temperature: f64,
    pub fuel_consumption: f64,
    pub vibration: f64,
    pub motor_current_draw: f64,
    pub pressure: f64,
    pub oxygen: f64,
    pub clinker_production: f64,
    pub energy_consumption_kwh: f64,
    pub specific_energy_consumption: f64,
    pub target_kiln_temperature: f64,
    pub target_fuel_consumption: f64,
    pub is_anomaly: bool,
}

impl SensorRecord {
    /// Build a record from continuous readings, computing derived channels.
    pub fn new(timestamp: DateTime<Utc>, readings: ChannelReadings) -> Self {
        let clinker_production = readings.raw_material_feed_rate * CLINKER_CONVERSION_RATE;
        let energy_consumption_kwh = readings.fuel_consumption * FUEL_TO_KWH;
        Self {
            timestamp,
            actual_fcao: readings.actual_fcao,
            raw_material_feed_rate: readings.raw_material_feed_rate,
            kiln_temperature: readings.kiln_temperature,
            fuel_consumption: readings.fuel_consumption,
            vibration: readings.vibration,
            motor_current_draw: readings.motor_current_draw,
            pressure: readings.pressure,
            oxygen: readings.oxygen,
            clinker_production,
            energy_consumption_kwh,
            specific_energy_consumption: specific_energy(
                energy_consumption_kwh,
                clinker_production,
            ),
            target_kiln_temperature: TARGET_KILN_TEMPERATURE,
            target_fuel_consumption: TARGET_FUEL_CONSUMPTION,
            is_anomaly: false,
        }
    }

    /// Set the anomaly flag.
    pub fn with_anomaly(mut self, is_anomaly: bool) -> Self {
        self.is_anomaly = is_anomaly;
        self
    }

    /// Value of a channel.
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::ActualFcao => self.actual_fcao,
            Metric::RawMaterialFeedRate => self.raw_material_feed_rate,
            Metric::KilnTemperature => self.kiln_temperature,
            Metric::FuelConsumption => self.fuel_consumption,
            Metric::Vibration => self.vibration,
            Metric::MotorCurrentDraw => self.motor_current_draw,
            Metric::Pressure => self.pressure,
            Metric::Oxygen => self.oxygen,
            Metric::ClinkerProduction => self.clinker_production,
            Metric::EnergyConsumptionKwh => self.energy_consumption_kwh,
            Metric::SpecificEnergyConsumption => self.specific_energy_consumption,
        }
    }

    /// The record's own `target_<metric>` column, if the table has one.
    pub fn target(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::KilnTemperature => Some(self.target_kiln_temperature),
            Metric::FuelConsumption => Some(self.target_fuel_consumption),
            _ => None,
        }
    }

    /// Continuous readings of this record.
    pub fn readings(&self) -> ChannelReadings {
        ChannelReadings {
            actual_fcao: self.actual_fcao,
            raw_material_feed_rate: self.raw_material_feed_rate,
            kiln_temperature: self.kiln_temperature,
            fuel_consumption: self.fuel_consumption,
            vibration: self.vibration,
            motor_current_draw: self.motor_current_draw,
            pressure: self.pressure,
            oxygen: self.oxygen,
        }
    }
}

/// Energy per unit of clinker, `0` when nothing is produced.
pub fn specific_energy(energy_consumption_kwh: f64, clinker_production: f64) -> f64 {
    if clinker_production > 0.0 {
        energy_consumption_kwh / clinker_production
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn nominal() -> ChannelReadings {
        ChannelReadings {
            actual_fcao: 2.0,
            raw_material_feed_rate: 100.0,
            kiln_temperature: 1450.0,
            fuel_consumption: 80.0,
            vibration: 0.5,
            motor_current_draw: 50.0,
            pressure: 50.0,
            oxygen: 2.5,
        }
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_derived_channels() {
        let record = SensorRecord::new(ts(), nominal());
        assert_relative_eq!(record.clinker_production, 60.0);
        assert_relative_eq!(record.energy_consumption_kwh, 80_000.0);
        assert_eq!(
            record.specific_energy_consumption,
            record.energy_consumption_kwh / record.clinker_production
        );
        assert!(!record.is_anomaly);
    }

    #[test]
    fn test_specific_energy_zero_production() {
        assert_eq!(specific_energy(80_000.0, 0.0), 0.0);
        assert_eq!(specific_energy(80_000.0, -3.0), 0.0);

        let mut readings = nominal();
        readings.raw_material_feed_rate = -1.0;
        let record = SensorRecord::new(ts(), readings);
        assert_eq!(record.specific_energy_consumption, 0.0);
    }

    #[test]
    fn test_static_targets() {
        let record = SensorRecord::new(ts(), nominal());
        assert_eq!(record.target(Metric::KilnTemperature), Some(1450.0));
        assert_eq!(record.target(Metric::FuelConsumption), Some(80.0));
        assert_eq!(record.target(Metric::Vibration), None);
    }

    #[test]
    fn test_value_covers_all_metrics() {
        let record = SensorRecord::new(ts(), nominal());
        for metric in Metric::CONTINUOUS {
            assert_eq!(Some(record.value(metric)), record.readings().get(metric));
        }
        assert_eq!(record.value(Metric::ClinkerProduction), 60.0);
    }

    #[test]
    fn test_readings_get_mut_rejects_derived() {
        let mut readings = nominal();
        assert!(readings.get_mut(Metric::ClinkerProduction).is_none());
        *readings.get_mut(Metric::Pressure).unwrap() += 30.0;
        assert_eq!(readings.pressure, 80.0);
    }
}
