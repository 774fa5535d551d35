//! # Kiln - cement kiln telemetry data model
//!
//! Shared types for the kiln simulation and analysis crates.
//!
//! The generator (`kiln-testdata`) produces [`SensorRecord`]s and
//! [`AlertEvent`]s; the analyzer (`kiln-analysis`) turns records into
//! [`VarianceRow`]s. The two only meet through the wide-table column
//! contract defined here.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use kiln::{ChannelReadings, Metric, SensorRecord};
//!
//! let readings = ChannelReadings {
//!     actual_fcao: 2.0,
//!     raw_material_feed_rate: 100.0,
//!     kiln_temperature: 1450.0,
//!     fuel_consumption: 80.0,
//!     vibration: 0.5,
//!     motor_current_draw: 50.0,
//!     pressure: 50.0,
//!     oxygen: 2.5,
//! };
//! let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
//! let record = SensorRecord::new(ts, readings);
//!
//! assert_eq!(record.value(Metric::ClinkerProduction), 60.0);
//! assert_eq!(record.target(Metric::KilnTemperature), Some(1450.0));
//! ```
//!
//! ## Modules
//!
//! - [`record`]: Wide-table sensor records and derived channels
//! - [`alert`]: Alert events
//! - [`variance`]: Long-form variance rows
//! - [`metric`]: Channel catalogue
//! - [`error`]: Error types

pub mod alert;
pub mod error;
pub mod metric;
pub mod record;
pub mod variance;

pub use alert::{AlertEvent, AlertType};
pub use error::{ArgumentError, KilnError, Result};
pub use metric::Metric;
pub use record::{
    specific_energy, ChannelReadings, SensorRecord, TARGET_FUEL_CONSUMPTION,
    TARGET_KILN_TEMPERATURE,
};
pub use variance::VarianceRow;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minutes in a simulated day. Injection moduli assume this value.
pub const MINUTES_PER_DAY: usize = 24 * 60;
