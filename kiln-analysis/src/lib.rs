// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Kiln Analysis
//!
//! Turns the wide kiln table into a long-form variance table.
//!
//! Two anomaly policies are available and selectable through
//! [`AnalysisStrategy`]:
//! - **Fixed threshold**: every metric is unpivoted; kiln temperature, fuel
//!   and f-CaO rows are flagged when their deviation from target exceeds a
//!   fixed limit
//! - **Rolling window**: selected metrics are compared against their trailing
//!   mean and sample standard deviation
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use kiln::{ChannelReadings, SensorRecord};
//! use kiln_analysis::{analyze_fixed_threshold, analyze_rolling_window};
//!
//! let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
//! let records: Vec<SensorRecord> = (0..120)
//!     .map(|i| {
//!         let readings = ChannelReadings {
//!             kiln_temperature: 1450.0 + (i % 5) as f64,
//!             ..Default::default()
//!         };
//!         SensorRecord::new(start + Duration::minutes(i), readings)
//!     })
//!     .collect();
//!
//! let rows = analyze_fixed_threshold(&records);
//! assert_eq!(rows.len(), 120 * 11);
//!
//! let rows = analyze_rolling_window(&records, 60, 3.0).unwrap();
//! assert_eq!(rows.len(), 120 * 5);
//! assert!(rows[58].is_anomaly.is_none());
//! assert!(rows[59].is_anomaly.is_some());
//! ```
//!
//! Both modes are pure: the same records always produce the same rows, and
//! a re-run replaces the previous table.

pub mod config;
pub mod correlation;
pub mod fixed_threshold;
pub mod predictions;
pub mod rolling;
pub mod strategy;
pub mod summary;
pub mod window;

// Re-exports for convenience
pub use config::{FixedThresholdConfig, RollingWindowConfig, FCAO_TARGET};
pub use correlation::{correlation_points, pearson, CorrelationPoint};
pub use fixed_threshold::{analyze_fixed_threshold, analyze_fixed_threshold_with};
pub use predictions::{predict, predict_with_rng, ModelPrediction, PredictionPolicy};
pub use rolling::{analyze_rolling_window, analyze_rolling_window_with};
pub use strategy::AnalysisStrategy;
pub use summary::{summarize, summarize_alerts, AlertSummary, MetricSummary};
pub use window::{rolling_statistics, RollingWindow, WindowStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
