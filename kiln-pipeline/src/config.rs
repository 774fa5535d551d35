// Kiln Pipeline - Configuration
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Pipeline configuration.
//!
//! Loaded from an optional JSON file; any field left out keeps its default.
//! Command-line flags are applied on top.

use crate::cache::DEFAULT_TTL;
use crate::error::PipelineError;
use kiln_analysis::{AnalysisStrategy, PredictionPolicy};
use kiln_testdata::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Warehouse directory.
    pub data_dir: PathBuf,

    pub generator: GeneratorConfig,

    pub analysis: AnalysisStrategy,

    pub predictions: PredictionPolicy,

    /// Seed for noisy predictions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_seed: Option<u64>,

    /// TTL of cached table reads, in seconds.
    pub cache_ttl_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("kiln-data"),
            generator: GeneratorConfig::default(),
            analysis: AnalysisStrategy::default(),
            predictions: PredictionPolicy::default(),
            prediction_seed: None,
            cache_ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|source| PipelineError::Config {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.generator.num_days, 7);
        assert_eq!(config.analysis.name(), "fixed_threshold");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "data_dir": "/tmp/kiln",
                "generator": {{ "start": "2024-01-01T00:00:00Z", "num_days": 2, "seed": 5 }},
                "analysis": {{ "mode": "rolling_window", "window_size": 30 }},
                "predictions": {{ "policy": "noisy", "noise_std": 0.2, "confidence_min": 0.7, "confidence_max": 0.9 }}
            }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/kiln"));
        assert_eq!(config.generator.num_days, 2);
        assert_eq!(config.generator.seed, Some(5));
        assert_eq!(config.generator.schedule.rules.len(), 4);
        assert_eq!(config.analysis.name(), "rolling_window");
        assert!(matches!(config.predictions, PredictionPolicy::Noisy { .. }));
        assert_eq!(config.cache_ttl_secs, 60);
    }

    #[test]
    fn test_load_bad_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not json").unwrap();
        file.flush().unwrap();

        let err = PipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }
}
