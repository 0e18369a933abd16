//! Result export: CSV for spreadsheets, JSON for everything else.

use std::fs::File;
use std::path::Path;

use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

fn ensure_not_empty<T>(items: &[T]) -> Result<(), Box<dyn std::error::Error>> {
    if items.is_empty() {
        return Err("no results to export".into());
    }
    Ok(())
}

fn create_output_file(path: impl AsRef<Path>) -> Result<File, Box<dyn std::error::Error>> {
    Ok(File::create(path)?)
}

/// Write all results as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if file creation or serialization fails.
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = create_output_file(path)?;
    serde_json::to_writer_pretty(file, results)?;
    Ok(())
}

/// Write one CSV row per run, parameters first, metrics after.
///
/// Results and parameter sets are paired by index, so pass the sets the
/// results were produced from, in the same order.
///
/// # Errors
///
/// Returns an error if the lengths differ, the results are empty, or
/// file writing fails.
pub fn export_to_csv(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if results.len() != parameter_sets.len() {
        return Err(format!(
            "results length ({}) does not match parameter sets length ({})",
            results.len(),
            parameter_sets.len()
        )
        .into());
    }
    ensure_not_empty(results)?;

    let file = create_output_file(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "car_limit",
        "car_batch",
        "car_delay",
        "passenger_limit",
        "passenger_batch",
        "passenger_delay",
        "ticks",
        "cars_spawned",
        "passengers_spawned",
        "passengers_delivered",
        "passengers_waiting",
        "passengers_unmatched",
        "cars_retired",
        "cars_in_transit",
        "movements_total",
        "delivery_rate",
        "moves_per_delivery",
    ])?;

    for (result, set) in results.iter().zip(parameter_sets) {
        writer.write_record([
            set.experiment_id.clone(),
            set.run_id.to_string(),
            set.seed.to_string(),
            set.params.car_limit.to_string(),
            set.params.car_batch.to_string(),
            set.params.car_delay.to_string(),
            set.params.passenger_limit.to_string(),
            set.params.passenger_batch.to_string(),
            set.params.passenger_delay.to_string(),
            result.ticks.to_string(),
            result.cars_spawned.to_string(),
            result.passengers_spawned.to_string(),
            result.passengers_delivered.to_string(),
            result.passengers_waiting.to_string(),
            result.passengers_unmatched.to_string(),
            result.cars_retired.to_string(),
            result.cars_in_transit.to_string(),
            result.movements_total.to_string(),
            result.delivery_rate.to_string(),
            result.moves_per_delivery.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
