//! Example: Generate reference kiln datasets.
//!
//! Run with: cargo run -p kiln-testdata --example generate_dataset

use kiln::AlertType;
use kiln_testdata::{generate_dataset, AnomalySchedule, DatasetManifest, GeneratorConfig};
use std::fs;

fn main() {
    println!("Kiln Testdata Generator");
    println!("=======================\n");

    let runs = [
        ("kiln_nominal_1d", 1, AnomalySchedule::none()),
        ("kiln_standard_1d", 1, AnomalySchedule::standard()),
        ("kiln_standard_7d", 7, AnomalySchedule::standard()),
    ];

    if let Err(e) = fs::create_dir_all("datasets/kiln") {
        eprintln!("  Warning: Could not create datasets/kiln: {}", e);
        return;
    }

    for (name, days, schedule) in runs {
        let config = GeneratorConfig::new()
            .with_num_days(days)
            .with_seed(42)
            .with_schedule(schedule);

        let dataset = match generate_dataset(&config) {
            Ok(dataset) => dataset.with_name(name),
            Err(e) => {
                eprintln!("  Warning: Could not generate {}: {}", name, e);
                continue;
            }
        };

        println!(
            "  {}: {} records, {} warnings, {} critical",
            name,
            dataset.len(),
            dataset.alert_count(AlertType::Warning),
            dataset.alert_count(AlertType::Critical)
        );

        let csv_path = format!("datasets/kiln/{}.csv", name);
        if let Err(e) = dataset.to_csv(&csv_path) {
            eprintln!("  Warning: Could not save {}: {}", csv_path, e);
        } else {
            println!("  Created {}", csv_path);
        }

        let alerts_path = format!("datasets/kiln/{}.alerts.json", name);
        if let Err(e) = dataset.alerts_to_json(&alerts_path) {
            eprintln!("  Warning: Could not save alerts: {}", e);
        }

        let manifest = DatasetManifest::from_config(name, &config).with_observed(&dataset);
        let manifest_path = format!("datasets/kiln/{}.manifest.json", name);
        if let Err(e) = manifest.to_json_file(&manifest_path) {
            eprintln!("  Warning: Could not save manifest: {}", e);
        }
    }

    println!("\nAll datasets generated successfully!");
}
