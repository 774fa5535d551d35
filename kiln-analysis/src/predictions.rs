// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Mock f-CaO model predictions.
//!
//! Stand-in for a trained regressor: every record gets a predicted f-CaO
//! and a confidence, either by scaling the measured value or by adding
//! gaussian noise to it.

use chrono::{DateTime, Utc};
use kiln::{KilnError, Result, SensorRecord};
use rand::distributions::Uniform;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

/// One row of the predictions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub timestamp: DateTime<Utc>,
    pub predicted_fcao: f64,
    pub prediction_confidence: f64,
}

/// How predictions are derived from `actual_fcao`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PredictionPolicy {
    /// `actual * factor` with a constant confidence.
    Scaled { factor: f64, confidence: f64 },
    /// `actual + N(0, noise_std)` with confidence drawn from `U(min, max)`.
    Noisy {
        noise_std: f64,
        confidence_min: f64,
        confidence_max: f64,
    },
}

impl Default for PredictionPolicy {
    fn default() -> Self {
        PredictionPolicy::Scaled {
            factor: 0.95,
            confidence: 0.9,
        }
    }
}

impl PredictionPolicy {
    pub fn noisy() -> Self {
        PredictionPolicy::Noisy {
            noise_std: 0.1,
            confidence_min: 0.8,
            confidence_max: 0.99,
        }
    }
}

/// Predict with a seeded rng, or entropy when `seed` is `None`.
pub fn predict(
    records: &[SensorRecord],
    policy: &PredictionPolicy,
    seed: Option<u64>,
) -> Result<Vec<ModelPrediction>> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    predict_with_rng(records, policy, &mut rng)
}

pub fn predict_with_rng(
    records: &[SensorRecord],
    policy: &PredictionPolicy,
    rng: &mut (impl Rng + ?Sized),
) -> Result<Vec<ModelPrediction>> {
    match *policy {
        PredictionPolicy::Scaled { factor, confidence } => Ok(records
            .iter()
            .map(|r| ModelPrediction {
                timestamp: r.timestamp,
                predicted_fcao: r.actual_fcao * factor,
                prediction_confidence: confidence,
            })
            .collect()),
        PredictionPolicy::Noisy {
            noise_std,
            confidence_min,
            confidence_max,
        } => {
            let noise = Normal::new(0.0, noise_std)
                .map_err(|e| KilnError::distribution("predicted_fcao", e))?;
            if !(confidence_min.is_finite()
                && confidence_max.is_finite()
                && confidence_min <= confidence_max)
            {
                return Err(KilnError::distribution(
                    "prediction_confidence",
                    format!("bad range [{}, {}]", confidence_min, confidence_max),
                ));
            }
            let confidence = Uniform::new_inclusive(confidence_min, confidence_max);

            Ok(records
                .iter()
                .map(|r| ModelPrediction {
                    timestamp: r.timestamp,
                    predicted_fcao: r.actual_fcao + noise.sample(rng),
                    prediction_confidence: confidence.sample(rng),
                })
                .collect())
        }
    }
}
