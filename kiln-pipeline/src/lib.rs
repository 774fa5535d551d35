// Kiln Pipeline - Simulation and variance pipeline
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Kiln Pipeline
//!
//! Batch steps around a local table warehouse:
//!
//! 1. [`simulate`]: generate telemetry into `simulated_kiln_data` and `alerts`
//! 2. [`analyze`]: recompute `variance_analysis`, `model_predictions` and
//!    `correlation_data` from the sensor table
//! 3. [`report`]: summarize variance rows and alerts through a TTL cache
//!
//! The `kiln-pipeline` binary exposes each step as a subcommand.

pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod warehouse;

pub use cache::{CachedTables, Clock, SystemClock, TtlCache, DEFAULT_TTL};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::{analyze, report, run, simulate, AnalyzeOutcome, SimulateOutcome, MANIFEST_FILE};
pub use report::{build_report, Report, RECENT_ALERTS};
pub use warehouse::{
    CsvWarehouse, Warehouse, WarehouseError, ALERTS_TABLE, CORRELATION_TABLE, PREDICTIONS_TABLE,
    SENSOR_TABLE, VARIANCE_TABLE,
};
