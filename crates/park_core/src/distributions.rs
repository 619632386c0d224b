//! Probability distributions for visitor inter-arrival gaps and ride service times.
//!
//! Every sampler takes the random source explicitly so a run is reproducible from its seed.

use rand::RngCore;
use rand_distr::{Distribution, Exp, Normal, Triangular};
use serde::{Deserialize, Serialize};

use crate::arrival_schedule::ArrivalRateSchedule;
use crate::clock::{minutes_to_ms, ONE_MIN_MS};
use crate::error::SimError;

const ONE_HOUR_MS: f64 = (60 * ONE_MIN_MS) as f64;

/// Trait for sampling inter-arrival gaps (in milliseconds).
pub trait InterArrivalDistribution: Send + Sync + std::fmt::Debug {
    /// Sample the gap until the next arrival. `current_time_ms` lets time-varying
    /// distributions pick the rate in force now. Returns `f64::INFINITY` when no further
    /// arrival can happen.
    fn sample_ms(&self, rng: &mut dyn RngCore, current_time_ms: u64) -> f64;
}

/// Uniform distribution: constant inter-arrival time.
#[derive(Debug, Clone)]
pub struct UniformInterArrival {
    pub interval_ms: f64,
}

impl UniformInterArrival {
    pub fn new(interval_ms: f64) -> Self {
        Self { interval_ms }
    }

    pub fn from_rate_per_hour(visitors_per_hour: f64) -> Self {
        if visitors_per_hour <= 0.0 {
            return Self {
                interval_ms: f64::INFINITY,
            };
        }
        Self {
            interval_ms: ONE_HOUR_MS / visitors_per_hour,
        }
    }
}

impl InterArrivalDistribution for UniformInterArrival {
    fn sample_ms(&self, _rng: &mut dyn RngCore, _current_time_ms: u64) -> f64 {
        self.interval_ms
    }
}

/// Exponential distribution: Poisson process with a constant rate.
#[derive(Debug, Clone)]
pub struct ExponentialInterArrival {
    pub visitors_per_hour: f64,
}

impl ExponentialInterArrival {
    pub fn new(visitors_per_hour: f64) -> Self {
        Self {
            visitors_per_hour: visitors_per_hour.max(0.0),
        }
    }
}

fn sample_exponential_ms(rng: &mut dyn RngCore, visitors_per_hour: f64) -> f64 {
    if visitors_per_hour <= 0.0 {
        return f64::INFINITY;
    }
    match Exp::new(visitors_per_hour / ONE_HOUR_MS) {
        Ok(exp) => exp.sample(rng),
        Err(_) => f64::INFINITY,
    }
}

impl InterArrivalDistribution for ExponentialInterArrival {
    fn sample_ms(&self, rng: &mut dyn RngCore, _current_time_ms: u64) -> f64 {
        sample_exponential_ms(rng, self.visitors_per_hour)
    }
}

/// Exponential gaps whose rate follows an [ArrivalRateSchedule].
///
/// A gap is drawn with the rate of the window containing the current time. If it would
/// cross into the next window, the clock is moved to the boundary and the rest is drawn
/// with the next window's rate. Zero-rate windows are skipped entirely. Because the
/// exponential is memoryless this yields an exact piecewise-constant Poisson process.
#[derive(Debug, Clone)]
pub struct PiecewiseExponential {
    pub schedule: ArrivalRateSchedule,
}

impl PiecewiseExponential {
    pub fn new(schedule: ArrivalRateSchedule) -> Self {
        Self { schedule }
    }
}

impl InterArrivalDistribution for PiecewiseExponential {
    fn sample_ms(&self, rng: &mut dyn RngCore, current_time_ms: u64) -> f64 {
        let Some(first) = self.schedule.window_index_at(current_time_ms) else {
            return f64::INFINITY;
        };
        let windows = self.schedule.windows();
        let origin = current_time_ms as f64;
        let mut cursor = origin;

        for (i, window) in windows.iter().enumerate().skip(first) {
            let is_last = i + 1 == windows.len();
            let window_end = window.end_ms as f64;
            if window.visitors_per_hour > 0.0 {
                let candidate = cursor + sample_exponential_ms(rng, window.visitors_per_hour);
                if is_last || candidate < window_end {
                    return candidate - origin;
                }
            }
            cursor = cursor.max(window_end);
        }
        f64::INFINITY
    }
}

/// How long a visitor stays on a ride. Parameters are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceTimeDistribution {
    Fixed { minutes: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Exponential { mean: f64 },
    /// Normal distribution truncated at zero.
    Normal { mean: f64, std_dev: f64 },
}

impl Default for ServiceTimeDistribution {
    /// Triangular 4..6 minutes with mode 5.
    fn default() -> Self {
        ServiceTimeDistribution::Triangular {
            min: 4.0,
            mode: 5.0,
            max: 6.0,
        }
    }
}

fn finite_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl ServiceTimeDistribution {
    pub fn fixed_minutes(minutes: f64) -> Self {
        ServiceTimeDistribution::Fixed { minutes }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let ok = match *self {
            ServiceTimeDistribution::Fixed { minutes } => finite_non_negative(minutes),
            ServiceTimeDistribution::Triangular { min, mode, max } => {
                finite_non_negative(min)
                    && max.is_finite()
                    && min < max
                    && (min..=max).contains(&mode)
            }
            ServiceTimeDistribution::Exponential { mean } => mean.is_finite() && mean > 0.0,
            ServiceTimeDistribution::Normal { mean, std_dev } => {
                mean.is_finite() && finite_non_negative(std_dev)
            }
        };
        if ok {
            Ok(())
        } else {
            Err(SimError::config(format!(
                "invalid service time distribution {self:?}"
            )))
        }
    }

    /// Expected service time in minutes (ignores truncation of the normal).
    pub fn mean_minutes(&self) -> f64 {
        match *self {
            ServiceTimeDistribution::Fixed { minutes } => minutes,
            ServiceTimeDistribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            ServiceTimeDistribution::Exponential { mean } => mean,
            ServiceTimeDistribution::Normal { mean, .. } => mean.max(0.0),
        }
    }

    /// Sample a service duration in milliseconds.
    pub fn sample_ms(&self, rng: &mut dyn RngCore) -> u64 {
        let minutes = match *self {
            ServiceTimeDistribution::Fixed { minutes } => minutes,
            ServiceTimeDistribution::Triangular { min, mode, max } => Triangular::new(min, max, mode)
                .map(|dist| dist.sample(rng))
                .unwrap_or(mode),
            ServiceTimeDistribution::Exponential { mean } => Exp::new(1.0 / mean)
                .map(|dist| dist.sample(rng))
                .unwrap_or(mean),
            ServiceTimeDistribution::Normal { mean, std_dev } => Normal::new(mean, std_dev)
                .map(|dist| dist.sample(rng))
                .unwrap_or(mean),
        };
        minutes_to_ms(minutes)
    }
}
