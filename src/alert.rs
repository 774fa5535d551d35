//! Discrete alert events emitted alongside injected anomalies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    Warning,
    Critical,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Warning => "Warning",
            AlertType::Critical => "Critical",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alert tied to the record that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Sequential id starting at 1, in emission order.
    pub id: u64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
}

impl AlertEvent {
    pub fn new(
        id: u64,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
        alert_type: AlertType,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            timestamp,
            alert_type,
        }
    }

    pub fn is_critical(&self) -> bool {
        self.alert_type == AlertType::Critical
    }
}
