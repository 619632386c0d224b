use std::io::Write;

use park_core::clock::ms_to_minutes;
use park_core::telemetry::StatisticsLog;

use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

pub(crate) fn export_visits_to_csv_impl<W: Write>(
    log: &StatisticsLog,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "visitor_id",
        "ride",
        "arrived_at_min",
        "ride_started_at_min",
        "wait_min",
        "service_min",
        "departed_at_min",
    ])?;

    for visit in &log.completed {
        wtr.write_record([
            visit.visitor_id.to_string(),
            visit.ride.clone(),
            visit.arrived_at_minutes().to_string(),
            ms_to_minutes(visit.ride_started_at_ms).to_string(),
            visit.wait_minutes().to_string(),
            visit.service_minutes().to_string(),
            visit.departed_at_minutes().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_ride_summaries_to_csv_impl<W: Write>(
    log: &StatisticsLog,
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "ride",
        "capacity",
        "times_used",
        "busy_time_min",
        "utilization",
        "capacity_utilization",
        "peak_queue_len",
        "peak_occupancy",
    ])?;

    for ride in &log.rides {
        wtr.write_record([
            ride.name.clone(),
            ride.capacity.to_string(),
            ride.times_used.to_string(),
            ride.busy_time_minutes().to_string(),
            ride.utilization.to_string(),
            ride.capacity_utilization.to_string(),
            ride.peak_queue_len.to_string(),
            ride.peak_occupancy.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub(crate) fn export_to_csv_impl<W: Write>(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    if results.len() != parameter_sets.len() {
        return Err(format!(
            "Results length ({}) doesn't match parameter_sets length ({})",
            results.len(),
            parameter_sets.len()
        )
        .into());
    }

    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "num_rides",
        "ride_capacity",
        "rate_multiplier",
        "horizon_min",
        "total_visitors",
        "completed_visits",
        "incomplete_visitors",
        "avg_wait_ms",
        "median_wait_ms",
        "p90_wait_ms",
        "max_wait_ms",
        "avg_utilization",
        "avg_capacity_utilization",
        "total_rides_used",
        "max_queue_len",
        "events_processed",
        "reached_horizon",
    ])?;

    for (result, param_set) in results.iter().zip(parameter_sets.iter()) {
        wtr.write_record([
            param_set.experiment_id.clone(),
            param_set.run_id.to_string(),
            param_set.seed.to_string(),
            param_set.params.rides.len().to_string(),
            param_set
                .ride_capacity
                .map(|c| c.to_string())
                .unwrap_or_default(),
            param_set.rate_multiplier.to_string(),
            ms_to_minutes(param_set.params.horizon_ms).to_string(),
            result.total_visitors.to_string(),
            result.completed_visits.to_string(),
            result.incomplete_visitors.to_string(),
            result.avg_wait_ms.to_string(),
            result.median_wait_ms.to_string(),
            result.p90_wait_ms.to_string(),
            result.max_wait_ms.to_string(),
            result.avg_utilization.to_string(),
            result.avg_capacity_utilization.to_string(),
            result.total_rides_used.to_string(),
            result.max_queue_len.to_string(),
            result.events_processed.to_string(),
            result.reached_horizon.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
