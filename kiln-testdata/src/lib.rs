// Kiln Testdata - Synthetic cement kiln telemetry
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Kiln Testdata
//!
//! Synthetic minute-resolution telemetry for a cement kiln.
//!
//! This crate provides:
//!
//! - **Channel patterns**: normal noise around a setpoint plus hourly or
//!   daily sine/cosine components, with optional clamping
//! - **Anomaly injection**: a modular schedule keyed on the minute index,
//!   emitting one alert per firing rule
//! - **Dataset I/O**: wide-table CSV, alert JSON and a dataset manifest
//!
//! ## Quick Start
//!
//! ```rust
//! use kiln_testdata::{generate_dataset, GeneratorConfig};
//!
//! let config = GeneratorConfig::new().with_num_days(1).with_seed(42);
//! let dataset = generate_dataset(&config).unwrap();
//!
//! assert_eq!(dataset.len(), 1440);
//! assert_eq!(dataset.alerts[0].id, 1);
//! ```
//!
//! ## Custom schedules
//!
//! ```rust
//! use kiln::{AlertType, Metric};
//! use kiln_testdata::{AnomalySchedule, InjectionEffect, InjectionRule};
//!
//! let schedule = AnomalySchedule::none().with_rule(InjectionRule::new(
//!     Metric::Oxygen,
//!     1440,
//!     60,
//!     InjectionEffect::Offset { delta: -1.5 },
//!     AlertType::Critical,
//!     "Low oxygen level in the kiln",
//! ));
//! assert!(schedule.validate().is_ok());
//! ```

pub mod anomalies;
pub mod dataset;
pub mod generator;
pub mod manifest;
pub mod patterns;

// Re-exports for convenience
pub use anomalies::{AnomalySchedule, InjectionEffect, InjectionRule};
pub use dataset::{ChannelStats, DatasetError, DatasetMetadata, KilnDataset};
pub use generator::{
    default_start, generate, generate_dataset, generate_with_rng, AlertSequence, GeneratorConfig,
};
pub use manifest::{ChannelManifest, DatasetManifest, InjectionManifest, SAMPLE_INTERVAL_MS};
pub use patterns::{ChannelPattern, Cycle, KilnProfile, ProfileSampler, Seasonality};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
