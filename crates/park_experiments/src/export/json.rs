use std::io::Write;

use park_core::telemetry::StatisticsLog;

use crate::metrics::SimulationResult;

pub(crate) fn export_to_json_impl<W: Write>(
    results: &[SimulationResult],
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(writer, results)?;
    Ok(())
}

pub(crate) fn export_log_to_json_impl<W: Write>(
    log: &StatisticsLog,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(writer, log)?;
    Ok(())
}
