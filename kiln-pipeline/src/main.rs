// Kiln Pipeline - Command-line entry point
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # kiln-pipeline
//!
//! ## Usage
//!
//! ```bash
//! # Generate a week of telemetry into ./kiln-data
//! kiln-pipeline simulate --days 7 --seed 42
//!
//! # Rolling-window analysis of the stored sensor table
//! kiln-pipeline analyze --mode rolling --window-size 60 --threshold-std 3
//!
//! # Both steps, then a summary
//! kiln-pipeline run --days 1
//! kiln-pipeline report --pretty
//! ```

use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use kiln::Metric;
use kiln_analysis::{AnalysisStrategy, FixedThresholdConfig, PredictionPolicy, RollingWindowConfig};
use kiln_pipeline::{analyze, report, run, simulate, CsvWarehouse, PipelineConfig, PipelineError};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Kiln telemetry simulation and variance pipeline
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Warehouse directory (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate telemetry and replace the sensor and alert tables
    Simulate(SimulateArgs),
    /// Recompute variance, prediction and correlation tables
    Analyze(AnalyzeArgs),
    /// Simulate then analyze
    Run {
        #[command(flatten)]
        simulate: SimulateArgs,
        #[command(flatten)]
        analyze: AnalyzeArgs,
    },
    /// Print a JSON summary of variance rows and alerts
    Report {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(ClapArgs, Debug, Default)]
struct SimulateArgs {
    /// Number of simulated days
    #[arg(long)]
    days: Option<u32>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// First timestamp (RFC 3339)
    #[arg(long)]
    start: Option<DateTime<Utc>>,
}

#[derive(ClapArgs, Debug, Default)]
struct AnalyzeArgs {
    /// Anomaly policy
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Rolling window length in samples
    #[arg(long)]
    window_size: Option<usize>,

    /// Rolling threshold in standard deviations
    #[arg(long)]
    threshold_std: Option<f64>,

    /// Comma separated metrics to analyze
    #[arg(long)]
    metrics: Option<String>,

    /// Prediction policy
    #[arg(long, value_enum)]
    prediction_policy: Option<Policy>,

    /// Seed for noisy predictions
    #[arg(long)]
    prediction_seed: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Fixed,
    Rolling,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Policy {
    Scaled,
    Noisy,
}

impl SimulateArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(days) = self.days {
            config.generator.num_days = days;
        }
        if let Some(seed) = self.seed {
            config.generator.seed = Some(seed);
        }
        if let Some(start) = self.start {
            config.generator.start = start;
        }
    }
}

impl AnalyzeArgs {
    fn apply(&self, config: &mut PipelineConfig) -> Result<(), PipelineError> {
        let metrics = self
            .metrics
            .as_deref()
            .map(Metric::parse_list)
            .transpose()?;

        let rolling = match self.mode {
            Some(mode) => mode == Mode::Rolling,
            None => matches!(config.analysis, AnalysisStrategy::RollingWindow(_)),
        };

        config.analysis = if rolling {
            let mut cfg = match &config.analysis {
                AnalysisStrategy::RollingWindow(cfg) => cfg.clone(),
                AnalysisStrategy::FixedThreshold(_) => RollingWindowConfig::default(),
            };
            if let Some(window_size) = self.window_size {
                cfg.window_size = window_size;
            }
            if let Some(threshold_std) = self.threshold_std {
                cfg.threshold_std = threshold_std;
            }
            if let Some(metrics) = metrics {
                cfg = cfg.with_metrics(metrics);
            }
            cfg.validate()?;
            AnalysisStrategy::RollingWindow(cfg)
        } else {
            let mut cfg = match &config.analysis {
                AnalysisStrategy::FixedThreshold(cfg) => cfg.clone(),
                AnalysisStrategy::RollingWindow(_) => FixedThresholdConfig::default(),
            };
            if let Some(metrics) = metrics {
                cfg = cfg.with_metrics(metrics);
            }
            cfg.validate()?;
            AnalysisStrategy::FixedThreshold(cfg)
        };

        match self.prediction_policy {
            Some(Policy::Scaled) => config.predictions = PredictionPolicy::default(),
            Some(Policy::Noisy) => config.predictions = PredictionPolicy::noisy(),
            None => {}
        }
        if let Some(seed) = self.prediction_seed {
            config.prediction_seed = Some(seed);
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), PipelineError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

fn load_config(args: &Args) -> Result<PipelineConfig, PipelineError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    match &args.command {
        Command::Simulate(simulate) => simulate.apply(&mut config),
        Command::Analyze(analyze) => analyze.apply(&mut config)?,
        Command::Run { simulate, analyze } => {
            simulate.apply(&mut config);
            analyze.apply(&mut config)?;
        }
        Command::Report { .. } => {}
    }
    Ok(config)
}

fn execute(args: &Args) -> Result<(), PipelineError> {
    let config = load_config(args)?;
    let warehouse = CsvWarehouse::open(&config.data_dir)?;

    match &args.command {
        Command::Simulate(_) => print_json(&simulate(&config, &warehouse)?, false),
        Command::Analyze(_) => print_json(&analyze(&config, &warehouse)?, false),
        Command::Run { .. } => print_json(&run(&config, &warehouse)?, false),
        Command::Report { pretty } => print_json(&report(&config, warehouse)?, *pretty),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Kiln Pipeline v{}", env!("CARGO_PKG_VERSION"));

    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
