//! Piecewise arrival-rate schedule: contiguous time windows, each with its own visitor rate.

use serde::{Deserialize, Serialize};

use crate::clock::{minutes_to_ms, ONE_MIN_MS};
use crate::error::SimError;

/// One window `[start_ms, end_ms)` of the schedule. The final window also covers its end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateWindow {
    pub start_ms: u64,
    pub end_ms: u64,
    /// Mean arrivals per hour of simulated time.
    pub visitors_per_hour: f64,
}

impl RateWindow {
    pub fn from_minutes(start_min: f64, end_min: f64, visitors_per_hour: f64) -> Self {
        Self {
            start_ms: minutes_to_ms(start_min),
            end_ms: minutes_to_ms(end_min),
            visitors_per_hour,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

/// Highest accepted rate: one visitor per millisecond on average.
pub const MAX_VISITORS_PER_HOUR: f64 = (60 * ONE_MIN_MS) as f64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArrivalRateSchedule {
    windows: Vec<RateWindow>,
}

impl ArrivalRateSchedule {
    /// Build a schedule without validating it; see [ArrivalRateSchedule::validate].
    pub fn new(windows: Vec<RateWindow>) -> Self {
        Self { windows }
    }

    /// A schedule with no windows: nobody ever arrives.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single window with a constant rate over `[0, horizon_ms]`.
    pub fn constant(horizon_ms: u64, visitors_per_hour: f64) -> Self {
        Self::new(vec![RateWindow {
            start_ms: 0,
            end_ms: horizon_ms,
            visitors_per_hour,
        }])
    }

    pub fn windows(&self) -> &[RateWindow] {
        &self.windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Check the schedule partitions `[0, horizon_ms]`.
    ///
    /// An empty schedule is accepted and produces no arrivals. A non-empty one must start at
    /// 0, have no gaps or overlaps, have non-empty windows, end exactly at the horizon, and carry
    /// finite non-negative rates no higher than [MAX_VISITORS_PER_HOUR].
    pub fn validate(&self, horizon_ms: u64) -> Result<(), SimError> {
        let Some(first) = self.windows.first() else {
            return Ok(());
        };
        if first.start_ms != 0 {
            return Err(SimError::config(format!(
                "arrival schedule must start at 0, first window starts at {} ms",
                first.start_ms
            )));
        }

        let mut expected_start = 0;
        for (i, window) in self.windows.iter().enumerate() {
            if window.start_ms != expected_start {
                return Err(SimError::config(format!(
                    "arrival window {i} starts at {} ms but previous window ends at {} ms",
                    window.start_ms, expected_start
                )));
            }
            if window.end_ms <= window.start_ms {
                return Err(SimError::config(format!(
                    "arrival window {i} is empty or reversed ({} ms..{} ms)",
                    window.start_ms, window.end_ms
                )));
            }
            if !window.visitors_per_hour.is_finite() || window.visitors_per_hour < 0.0 {
                return Err(SimError::config(format!(
                    "arrival window {i} has invalid rate {}",
                    window.visitors_per_hour
                )));
            }
            if window.visitors_per_hour > MAX_VISITORS_PER_HOUR {
                return Err(SimError::config(format!(
                    "arrival window {i} rate {} exceeds {MAX_VISITORS_PER_HOUR} visitors/hour",
                    window.visitors_per_hour
                )));
            }
            expected_start = window.end_ms;
        }

        if expected_start != horizon_ms {
            return Err(SimError::config(format!(
                "arrival schedule ends at {} ms but the horizon is {} ms",
                expected_start, horizon_ms
            )));
        }
        Ok(())
    }

    /// Index of the window containing `time_ms`. The final window is closed at its end.
    pub fn window_index_at(&self, time_ms: u64) -> Option<usize> {
        let last = self.windows.len().checked_sub(1)?;
        self.windows.iter().enumerate().find_map(|(i, window)| {
            let inside = time_ms >= window.start_ms
                && (time_ms < window.end_ms || (i == last && time_ms == window.end_ms));
            inside.then_some(i)
        })
    }

    /// Visitors per hour at `time_ms`; zero outside the schedule.
    pub fn rate_at(&self, time_ms: u64) -> f64 {
        self.window_index_at(time_ms)
            .map(|i| self.windows[i].visitors_per_hour)
            .unwrap_or(0.0)
    }

    /// Expected number of arrivals over the whole schedule.
    pub fn expected_arrivals(&self) -> f64 {
        self.windows
            .iter()
            .map(|w| w.visitors_per_hour * w.duration_ms() as f64 / (60 * ONE_MIN_MS) as f64)
            .sum()
    }

    /// Same windows with every rate multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.windows
                .iter()
                .map(|w| RateWindow {
                    visitors_per_hour: w.visitors_per_hour * factor,
                    ..w.clone()
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_phase() -> ArrivalRateSchedule {
        ArrivalRateSchedule::new(vec![
            RateWindow::from_minutes(0.0, 120.0, 5.0),
            RateWindow::from_minutes(120.0, 240.0, 10.0),
            RateWindow::from_minutes(240.0, 480.0, 15.0),
        ])
    }

    #[test]
    fn contiguous_exhaustive_schedule_validates() {
        assert!(three_phase().validate(480 * ONE_MIN_MS).is_ok());
        assert!(ArrivalRateSchedule::empty().validate(480 * ONE_MIN_MS).is_ok());
    }

    #[test]
    fn rejects_gap_overlap_and_short_schedules() {
        let gap = ArrivalRateSchedule::new(vec![
            RateWindow::from_minutes(0.0, 60.0, 5.0),
            RateWindow::from_minutes(70.0, 120.0, 5.0),
        ]);
        assert!(matches!(gap.validate(120 * ONE_MIN_MS), Err(SimError::Configuration(_))));

        let overlap = ArrivalRateSchedule::new(vec![
            RateWindow::from_minutes(0.0, 60.0, 5.0),
            RateWindow::from_minutes(50.0, 120.0, 5.0),
        ]);
        assert!(overlap.validate(120 * ONE_MIN_MS).is_err());

        let late_start = ArrivalRateSchedule::new(vec![RateWindow::from_minutes(1.0, 120.0, 5.0)]);
        assert!(late_start.validate(120 * ONE_MIN_MS).is_err());

        assert!(three_phase().validate(481 * ONE_MIN_MS).is_err());
        assert!(matches!(
            three_phase().validate(400 * ONE_MIN_MS),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_negative_and_non_finite_rates() {
        let negative = ArrivalRateSchedule::constant(60 * ONE_MIN_MS, -1.0);
        assert!(negative.validate(60 * ONE_MIN_MS).is_err());
        let nan = ArrivalRateSchedule::constant(60 * ONE_MIN_MS, f64::NAN);
        assert!(nan.validate(60 * ONE_MIN_MS).is_err());
    }

    #[test]
    fn rejects_rates_above_one_visitor_per_ms() {
        let flood = ArrivalRateSchedule::constant(10 * ONE_MIN_MS, 1e9);
        assert!(matches!(flood.validate(10 * ONE_MIN_MS), Err(SimError::Configuration(_))));
        let busy = ArrivalRateSchedule::constant(10 * ONE_MIN_MS, 360_000.0);
        assert!(busy.validate(10 * ONE_MIN_MS).is_ok());
        let ceiling = ArrivalRateSchedule::constant(10 * ONE_MIN_MS, MAX_VISITORS_PER_HOUR);
        assert!(ceiling.validate(10 * ONE_MIN_MS).is_ok());
    }

    #[test]
    fn rate_lookup_by_time() {
        let schedule = three_phase();
        assert_eq!(schedule.rate_at(0), 5.0);
        assert_eq!(schedule.rate_at(120 * ONE_MIN_MS - 1), 5.0);
        assert_eq!(schedule.rate_at(120 * ONE_MIN_MS), 10.0);
        assert_eq!(schedule.rate_at(480 * ONE_MIN_MS), 15.0);
        assert_eq!(schedule.rate_at(480 * ONE_MIN_MS + 1), 0.0);
        assert_eq!(ArrivalRateSchedule::empty().rate_at(0), 0.0);
    }

    #[test]
    fn expected_arrivals_and_scaling() {
        let schedule = three_phase();
        // 2h * 5 + 2h * 10 + 4h * 15
        assert!((schedule.expected_arrivals() - 90.0).abs() < 1e-9);
        assert!((schedule.scaled(2.0).expected_arrivals() - 180.0).abs() < 1e-9);
    }
}
