//! Time-of-day arrival patterns for a park day.
//!
//! Patterns are expressed as phases in minutes since opening and are turned into an
//! [ArrivalRateSchedule] clipped or stretched to the scenario horizon.

use crate::arrival_schedule::{ArrivalRateSchedule, RateWindow};
use crate::clock::ONE_MIN_MS;

/// Length of the default park day in minutes (8 hours).
pub const PARK_DAY_MINUTES: u64 = 480;

/// Default phases `(start_min, end_min, visitors_per_hour)`: a quiet morning, a busier
/// midday and a peak that lasts until closing.
pub const PARK_DAY_PHASES: [(u64, u64, f64); 3] = [
    (0, 120, 5.0),    // opening - 2h
    (120, 240, 10.0), // 2h - 4h
    (240, 480, 15.0), // 4h - closing
];

/// Build a schedule from phases, clipped to `horizon_ms` and with the last phase stretched
/// to reach it.
pub fn schedule_from_phases(phases: &[(u64, u64, f64)], horizon_ms: u64) -> ArrivalRateSchedule {
    let mut windows: Vec<RateWindow> = phases
        .iter()
        .map(|&(start, end, rate)| RateWindow {
            start_ms: start * ONE_MIN_MS,
            end_ms: (end * ONE_MIN_MS).min(horizon_ms),
            visitors_per_hour: rate,
        })
        .filter(|window| window.start_ms < horizon_ms)
        .collect();

    if let Some(last) = windows.last_mut() {
        last.end_ms = horizon_ms;
    }
    ArrivalRateSchedule::new(windows)
}

/// The default park day pattern fitted to `horizon_ms`.
pub fn park_day_schedule(horizon_ms: u64) -> ArrivalRateSchedule {
    schedule_from_phases(&PARK_DAY_PHASES, horizon_ms)
}
