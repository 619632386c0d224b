//! Result export utilities.
//!
//! Single runs export their completed visits and ride summaries to CSV and the whole
//! [StatisticsLog] to JSON. Sweeps export one row per run, paired with its parameters.

use std::path::Path;

use park_core::telemetry::StatisticsLog;

use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export completed visits (times in minutes) to CSV.
///
/// # Errors
///
/// Returns an error if file creation or CSV writing fails.
pub fn export_visits_to_csv(
    log: &StatisticsLog,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_visits_to_csv_impl(log, file)
}

/// Export per-ride summaries to CSV.
pub fn export_ride_summaries_to_csv(
    log: &StatisticsLog,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    csv::export_ride_summaries_to_csv_impl(log, file)
}

/// Export the full statistics log as pretty JSON.
pub fn export_log_to_json(
    log: &StatisticsLog,
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_log_to_json_impl(log, file)
}

/// Export sweep results to JSON (an array of result objects).
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    results: &[SimulationResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

/// Export sweep results with their parameters to CSV.
///
/// Parameters and results are paired by index (`results[i]` belongs to `parameter_sets[i]`).
///
/// # Errors
///
/// Returns an error if there are no results, the lengths differ, or writing fails.
pub fn export_to_csv(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, parameter_sets, file)
}

/// Index of the run with the lowest mean wait, preferring runs that completed every visitor.
pub fn find_best_result_index(results: &[SimulationResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.incomplete_visitors
                .cmp(&b.incomplete_visitors)
                .then(a.avg_wait_ms.total_cmp(&b.avg_wait_ms))
        })
        .map(|(index, _)| index)
}
