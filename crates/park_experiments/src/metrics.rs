//! Metrics extraction from simulation results.
//!
//! Reduces a [StatisticsLog] to one flat row per run: visitor counts, wait-time statistics
//! and ride utilization.

use park_core::clock::ONE_MIN_MS;
use park_core::telemetry::{StatisticsLog, Termination};

/// Aggregated metrics from a single simulation run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SimulationResult {
    pub seed: u64,
    /// Every visitor that arrived before the horizon.
    pub total_visitors: usize,
    pub completed_visits: usize,
    /// Still queued or riding at the horizon.
    pub incomplete_visitors: usize,
    pub avg_wait_ms: f64,
    pub median_wait_ms: f64,
    pub p90_wait_ms: f64,
    pub max_wait_ms: u64,
    /// Mean of per-ride `busy_time / horizon`.
    pub avg_utilization: f64,
    /// Mean of per-ride `busy_time / (horizon * capacity)`.
    pub avg_capacity_utilization: f64,
    pub total_rides_used: u64,
    pub max_queue_len: usize,
    pub events_processed: u64,
    pub reached_horizon: bool,
}

impl SimulationResult {
    /// Calculate (mean, median, p90) from a vector of values.
    fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
        } else {
            sorted[sorted.len() / 2] as f64
        };
        // floor(0.9 * (n-1)) index
        let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(sorted.len() - 1)] as f64;

        (avg, median, p90)
    }

    pub fn avg_wait_minutes(&self) -> f64 {
        self.avg_wait_ms / ONE_MIN_MS as f64
    }
}

/// Extract metrics from a finished run.
pub fn extract_metrics(log: &StatisticsLog) -> SimulationResult {
    let waits: Vec<u64> = log.completed.iter().map(|visit| visit.wait_ms).collect();
    let (avg_wait_ms, median_wait_ms, p90_wait_ms) = SimulationResult::calculate_stats(&waits);

    let ride_count = log.rides.len().max(1) as f64;
    let avg_utilization = log.rides.iter().map(|r| r.utilization).sum::<f64>() / ride_count;
    let avg_capacity_utilization =
        log.rides.iter().map(|r| r.capacity_utilization).sum::<f64>() / ride_count;

    SimulationResult {
        seed: log.seed,
        total_visitors: log.total_arrivals(),
        completed_visits: log.completed.len(),
        incomplete_visitors: log.incomplete.total(),
        avg_wait_ms,
        median_wait_ms,
        p90_wait_ms,
        max_wait_ms: waits.iter().copied().max().unwrap_or(0),
        avg_utilization,
        avg_capacity_utilization,
        total_rides_used: log.total_rides_used(),
        max_queue_len: log.rides.iter().map(|r| r.peak_queue_len).max().unwrap_or(0),
        events_processed: log.events_processed,
        reached_horizon: log.termination == Termination::HorizonReached,
    }
}

/// Count timestamps per `bin_ms`-wide bucket over `[0, horizon_ms]`.
/// A timestamp exactly at the horizon lands in the last bucket.
pub fn histogram(timestamps_ms: &[u64], bin_ms: u64, horizon_ms: u64) -> Vec<usize> {
    if bin_ms == 0 {
        return Vec::new();
    }
    let bins = horizon_ms.div_ceil(bin_ms).max(1) as usize;
    let mut counts = vec![0; bins];
    for &ts in timestamps_ms {
        let index = ((ts / bin_ms) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}
