// Kiln Analysis - Variance and anomaly analysis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Temperature vs f-CaO correlation table.

use kiln::SensorRecord;
use serde::{Deserialize, Serialize};

/// One `(kiln_temperature, actual_fcao)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub temp: f64,
    pub fcao: f64,
}

pub fn correlation_points(records: &[SensorRecord]) -> Vec<CorrelationPoint> {
    records
        .iter()
        .map(|r| CorrelationPoint {
            temp: r.kiln_temperature,
            fcao: r.actual_fcao,
        })
        .collect()
}

/// Pearson coefficient of the pairs, `None` below two points or with a
/// constant column.
pub fn pearson(points: &[CorrelationPoint]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_t = points.iter().map(|p| p.temp).sum::<f64>() / n;
    let mean_f = points.iter().map(|p| p.fcao).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_t = 0.0;
    let mut var_f = 0.0;
    for p in points {
        let dt = p.temp - mean_t;
        let df = p.fcao - mean_f;
        cov += dt * df;
        var_t += dt * dt;
        var_f += df * df;
    }

    if var_t == 0.0 || var_f == 0.0 {
        return None;
    }
    Some(cov / (var_t * var_f).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn points(pairs: &[(f64, f64)]) -> Vec<CorrelationPoint> {
        pairs
            .iter()
            .map(|&(temp, fcao)| CorrelationPoint { temp, fcao })
            .collect()
    }

    #[test]
    fn test_perfect_correlation() {
        let p = points(&[(1440.0, 1.9), (1450.0, 2.0), (1460.0, 2.1)]);
        assert_relative_eq!(pearson(&p).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_perfect_anticorrelation() {
        let p = points(&[(1440.0, 2.1), (1450.0, 2.0), (1460.0, 1.9)]);
        assert_relative_eq!(pearson(&p).unwrap(), -1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate() {
        assert!(pearson(&[]).is_none());
        assert!(pearson(&points(&[(1450.0, 2.0)])).is_none());
        assert!(pearson(&points(&[(1450.0, 2.0), (1450.0, 2.1)])).is_none());
    }
}
