// Kiln Pipeline - Commands
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Simulate, analyze and report steps.
//!
//! Every step recomputes its tables from scratch and replaces them whole.

use crate::cache::CachedTables;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::report::{build_report, Report};
use crate::warehouse::{
    CsvWarehouse, Warehouse, ALERTS_TABLE, CORRELATION_TABLE, PREDICTIONS_TABLE, SENSOR_TABLE,
    VARIANCE_TABLE,
};
use kiln::SensorRecord;
use kiln_analysis::{correlation_points, predict};
use kiln_testdata::{generate_dataset, DatasetManifest};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// File name of the manifest written next to the tables.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Outcome of [`simulate`].
#[derive(Debug, Clone, Serialize)]
pub struct SimulateOutcome {
    pub records: usize,
    pub alerts: usize,
    pub flagged: usize,
    pub manifest: PathBuf,
}

/// Outcome of [`analyze`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    pub mode: &'static str,
    pub records: usize,
    pub variance_rows: usize,
    pub flagged: usize,
    pub undetermined: usize,
    pub predictions: usize,
}

/// Generate the configured dataset and replace the sensor and alert tables.
pub fn simulate(
    config: &PipelineConfig,
    warehouse: &CsvWarehouse,
) -> Result<SimulateOutcome, PipelineError> {
    let generator = &config.generator;
    info!(
        "Simulating {} day(s) from {} (seed: {:?})",
        generator.num_days, generator.start, generator.seed
    );

    let dataset = generate_dataset(generator)?;
    warehouse.replace_table(SENSOR_TABLE, dataset.records())?;
    warehouse.replace_table(ALERTS_TABLE, dataset.alerts())?;

    let manifest = DatasetManifest::from_config(SENSOR_TABLE, generator).with_observed(&dataset);
    if manifest.alert_count != Some(manifest.expected_alerts()) {
        warn!(
            "Generated {:?} alerts, manifest expected {}",
            manifest.alert_count,
            manifest.expected_alerts()
        );
    }
    let manifest_path = warehouse.root().join(MANIFEST_FILE);
    manifest.to_json_file(&manifest_path)?;

    let outcome = SimulateOutcome {
        records: dataset.len(),
        alerts: dataset.alerts().len(),
        flagged: dataset.anomaly_count(),
        manifest: manifest_path,
    };
    info!(
        "Wrote {} records and {} alerts to {}",
        outcome.records,
        outcome.alerts,
        warehouse.root().display()
    );
    Ok(outcome)
}

/// Read the sensor table and replace the variance, prediction and
/// correlation tables.
pub fn analyze<W: Warehouse>(
    config: &PipelineConfig,
    warehouse: &W,
) -> Result<AnalyzeOutcome, PipelineError> {
    let records: Vec<SensorRecord> = warehouse.load_table(SENSOR_TABLE)?;
    info!(
        "Analyzing {} records with {}",
        records.len(),
        config.analysis.name()
    );

    let rows = config.analysis.analyze(&records)?;
    let predictions = predict(&records, &config.predictions, config.prediction_seed)?;
    let points = correlation_points(&records);

    warehouse.replace_table(VARIANCE_TABLE, &rows)?;
    warehouse.replace_table(PREDICTIONS_TABLE, &predictions)?;
    warehouse.replace_table(CORRELATION_TABLE, &points)?;

    let outcome = AnalyzeOutcome {
        mode: config.analysis.name(),
        records: records.len(),
        variance_rows: rows.len(),
        flagged: rows.iter().filter(|r| r.is_flagged()).count(),
        undetermined: rows.iter().filter(|r| r.is_undetermined()).count(),
        predictions: predictions.len(),
    };
    info!(
        "Wrote {} variance rows ({} flagged, {} undetermined)",
        outcome.variance_rows, outcome.flagged, outcome.undetermined
    );
    Ok(outcome)
}

/// [`simulate`] then [`analyze`].
pub fn run(
    config: &PipelineConfig,
    warehouse: &CsvWarehouse,
) -> Result<(SimulateOutcome, AnalyzeOutcome), PipelineError> {
    let simulated = simulate(config, warehouse)?;
    let analyzed = analyze(config, warehouse)?;
    Ok((simulated, analyzed))
}

/// Summarize the variance and alert tables through a TTL-cached reader.
pub fn report<W: Warehouse>(
    config: &PipelineConfig,
    warehouse: W,
) -> Result<Report, PipelineError> {
    let tables = CachedTables::new(warehouse, Duration::from_secs(config.cache_ttl_secs));
    let report = build_report(&tables)?;
    info!(
        "Report over {} variance rows and {} alerts",
        report.variance_rows, report.alerts.total
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::WarehouseError;
    use kiln::{AlertEvent, Metric, VarianceRow};
    use kiln_analysis::{AnalysisStrategy, CorrelationPoint, ModelPrediction};
    use kiln_testdata::GeneratorConfig;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> PipelineConfig {
        PipelineConfig {
            data_dir: dir.path().to_path_buf(),
            generator: GeneratorConfig::new().with_num_days(1).with_seed(42),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_simulate_writes_tables_and_manifest() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let warehouse = CsvWarehouse::open(&config.data_dir).unwrap();

        let outcome = simulate(&config, &warehouse).unwrap();
        assert_eq!(outcome.records, 1440);
        assert_eq!(outcome.alerts, 4);
        assert_eq!(outcome.flagged, 4);

        let records: Vec<SensorRecord> = warehouse.load_table(SENSOR_TABLE).unwrap();
        let alerts: Vec<AlertEvent> = warehouse.load_table(ALERTS_TABLE).unwrap();
        assert_eq!(records.len(), 1440);
        assert_eq!(alerts.len(), 4);

        let manifest = DatasetManifest::from_json_file(&outcome.manifest).unwrap();
        assert_eq!(manifest.sample_count, 1440);
        assert_eq!(manifest.alert_count, Some(4));
    }

    #[test]
    fn test_analyze_requires_sensor_table() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let warehouse = CsvWarehouse::open(&config.data_dir).unwrap();

        let err = analyze(&config, &warehouse).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Warehouse(WarehouseError::MissingTable(_))
        ));
    }

    #[test]
    fn test_run_fixed_threshold() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let warehouse = CsvWarehouse::open(&config.data_dir).unwrap();

        let (simulated, analyzed) = run(&config, &warehouse).unwrap();
        assert_eq!(analyzed.mode, "fixed_threshold");
        assert_eq!(analyzed.records, simulated.records);
        assert_eq!(analyzed.variance_rows, 1440 * Metric::ALL.len());
        assert_eq!(analyzed.undetermined, 0);
        assert!(analyzed.flagged >= 4);

        let predictions: Vec<ModelPrediction> = warehouse.load_table(PREDICTIONS_TABLE).unwrap();
        let points: Vec<CorrelationPoint> = warehouse.load_table(CORRELATION_TABLE).unwrap();
        assert_eq!(predictions.len(), 1440);
        assert_eq!(points.len(), 1440);
    }

    #[test]
    fn test_analyze_rolling_replaces_variance_table() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        let warehouse = CsvWarehouse::open(&config.data_dir).unwrap();
        run(&config, &warehouse).unwrap();

        config.analysis = AnalysisStrategy::rolling(60, 3.0).unwrap();
        let analyzed = analyze(&config, &warehouse).unwrap();
        assert_eq!(analyzed.mode, "rolling_window");
        assert_eq!(analyzed.variance_rows, 1440 * 5);
        assert_eq!(analyzed.undetermined, 59 * 5);

        let rows: Vec<VarianceRow> = warehouse.load_table(VARIANCE_TABLE).unwrap();
        assert_eq!(rows.len(), 1440 * 5);
    }

    #[test]
    fn test_report_after_run() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let warehouse = CsvWarehouse::open(&config.data_dir).unwrap();
        run(&config, &warehouse).unwrap();

        let report = report(&config, warehouse).unwrap();
        assert_eq!(report.variance_rows, 1440 * Metric::ALL.len());
        assert_eq!(report.alerts.total, 4);
        assert_eq!(report.alerts.critical, 2);
        assert_eq!(report.recent_alerts.len(), 4);
        assert!(report.temperature_fcao_correlation.is_some());
        assert_eq!(
            report.metric(Metric::KilnTemperature).unwrap().rows,
            1440
        );
    }
}
