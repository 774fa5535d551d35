//! Error types for the kiln data model
//!
//! The core performs no I/O, so the only failures are caller contract
//! violations. I/O errors belong to the crates that persist data.

use thiserror::Error;

/// Result type alias for kiln operations
pub type Result<T> = std::result::Result<T, KilnError>;

/// Main error type for kiln operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KilnError {
    /// Caller supplied a malformed argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
}

/// Malformed inputs. These fail fast and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentError {
    /// Generation needs at least one day
    #[error("num_days must be positive, got {0}")]
    NonPositiveDays(u32),

    /// Metric name outside the known catalogue
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Metric exists but cannot be used in this position
    #[error("Metric {metric} cannot be used here: {reason}")]
    UnsupportedMetric { metric: String, reason: String },

    /// Analysis needs at least one metric
    #[error("metric list is empty")]
    EmptyMetricList,

    /// Rolling window must hold at least one sample
    #[error("window_size must be positive, got {0}")]
    InvalidWindowSize(usize),

    /// Threshold multiplier must be finite and non-negative
    #[error("threshold_std must be finite and non-negative, got {0}")]
    InvalidThreshold(f64),

    /// Distribution parameters rejected for a channel
    #[error("Invalid distribution for {channel}: {reason}")]
    InvalidDistribution { channel: String, reason: String },

    /// Schedule rule with a zero period
    #[error("Injection period must be positive for {0}")]
    InvalidSchedulePeriod(String),
}

impl KilnError {
    /// Shorthand for a distribution error.
    pub fn distribution(channel: impl Into<String>, reason: impl ToString) -> Self {
        ArgumentError::InvalidDistribution {
            channel: channel.into(),
            reason: reason.to_string(),
        }
        .into()
    }
}
