use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::arrival_schedule::ArrivalRateSchedule;
use crate::clock::ONE_MIN_MS;
use crate::distributions::ServiceTimeDistribution;
use crate::error::SimError;
use crate::patterns::{park_day_schedule, PARK_DAY_MINUTES};
use crate::ride::RideId;
use crate::spawner::RideSelectionPolicy;

pub const DEFAULT_RIDE_COUNT: usize = 3;
pub const DEFAULT_RIDE_CAPACITY: usize = 10;

/// Default horizon: one 8 hour park day (simulation ms).
const DEFAULT_HORIZON_MS: u64 = PARK_DAY_MINUTES * ONE_MIN_MS;

/// Simulation end time in milliseconds. Events at exactly this time still run; the runner
/// stops once the next event is strictly later.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimulationEndTimeMs(pub u64);

/// Service time used by rides without their own distribution.
#[derive(Debug, Clone, Default, Resource)]
pub struct DefaultServiceTime(pub ServiceTimeDistribution);

/// One ride of the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideConfig {
    pub name: String,
    pub capacity: usize,
    /// Overrides the scenario-wide service time for this ride.
    #[serde(default)]
    pub service_time: Option<ServiceTimeDistribution>,
}

impl RideConfig {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            service_time: None,
        }
    }

    pub fn with_service_time(mut self, service_time: ServiceTimeDistribution) -> Self {
        self.service_time = Some(service_time);
        self
    }
}

/// A visitor injected at a fixed time, independent of the arrival generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedArrival {
    pub at_ms: u64,
    /// Ride name; must exist in the roster.
    pub ride: String,
    /// Fixed service duration. Sampled from the ride's distribution when absent.
    #[serde(default)]
    pub service_ms: Option<u64>,
}

impl ScriptedArrival {
    pub fn new(at_ms: u64, ride: impl Into<String>) -> Self {
        Self {
            at_ms,
            ride: ride.into(),
            service_ms: None,
        }
    }

    pub fn at_minutes(minutes: u64, ride: impl Into<String>) -> Self {
        Self::new(minutes * ONE_MIN_MS, ride)
    }

    pub fn with_service_minutes(mut self, minutes: u64) -> Self {
        self.service_ms = Some(minutes * ONE_MIN_MS);
        self
    }
}

/// A scripted arrival resolved against the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingVisitor {
    pub at_ms: u64,
    pub ride: RideId,
    pub service_override_ms: Option<u64>,
}

/// Scripted visitors, indexed by `EventSubject::Scripted`.
#[derive(Debug, Clone, Default, Resource)]
pub struct ScriptedArrivals(pub Vec<PendingVisitor>);

/// Parameters for building a simulation scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    pub horizon_ms: u64,
    pub rides: Vec<RideConfig>,
    pub arrival_schedule: ArrivalRateSchedule,
    pub service_time: ServiceTimeDistribution,
    pub ride_selection: RideSelectionPolicy,
    /// RNG seed. A random seed is drawn (and reported in the log) when unset.
    pub seed: Option<u64>,
    /// Optional cap on visitors produced by the arrival generator.
    pub max_visitors: Option<usize>,
    pub scripted_arrivals: Vec<ScriptedArrival>,
}

pub fn default_rides() -> Vec<RideConfig> {
    (0..DEFAULT_RIDE_COUNT)
        .map(|i| RideConfig::new(format!("Ride {i}"), DEFAULT_RIDE_CAPACITY))
        .collect()
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            horizon_ms: DEFAULT_HORIZON_MS,
            rides: default_rides(),
            arrival_schedule: park_day_schedule(DEFAULT_HORIZON_MS),
            service_time: ServiceTimeDistribution::default(),
            ride_selection: RideSelectionPolicy::default(),
            seed: None,
            max_visitors: None,
            scripted_arrivals: Vec::new(),
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the horizon. The arrival schedule is left untouched and must still cover it.
    pub fn with_horizon_minutes(mut self, minutes: u64) -> Self {
        self.horizon_ms = minutes * ONE_MIN_MS;
        self
    }

    /// Set the horizon and refit the default park-day pattern to it.
    pub fn with_park_day_minutes(mut self, minutes: u64) -> Self {
        self.horizon_ms = minutes * ONE_MIN_MS;
        self.arrival_schedule = park_day_schedule(self.horizon_ms);
        self
    }

    pub fn with_rides(mut self, rides: Vec<RideConfig>) -> Self {
        self.rides = rides;
        self
    }

    pub fn with_arrival_schedule(mut self, schedule: ArrivalRateSchedule) -> Self {
        self.arrival_schedule = schedule;
        self
    }

    /// Disable generated arrivals; only scripted visitors (if any) will arrive.
    pub fn without_random_arrivals(mut self) -> Self {
        self.arrival_schedule = ArrivalRateSchedule::empty();
        self
    }

    pub fn with_service_time(mut self, service_time: ServiceTimeDistribution) -> Self {
        self.service_time = service_time;
        self
    }

    pub fn with_ride_selection(mut self, policy: RideSelectionPolicy) -> Self {
        self.ride_selection = policy;
        self
    }

    pub fn with_max_visitors(mut self, max_visitors: usize) -> Self {
        self.max_visitors = Some(max_visitors);
        self
    }

    pub fn with_scripted_arrivals(mut self, arrivals: Vec<ScriptedArrival>) -> Self {
        self.scripted_arrivals = arrivals;
        self
    }

    /// Reject malformed scenarios before any simulated time advances.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.rides.is_empty() {
            return Err(SimError::config("scenario needs at least one ride"));
        }
        for ride in &self.rides {
            if ride.capacity == 0 {
                return Err(SimError::config(format!(
                    "ride '{}' must have capacity >= 1",
                    ride.name
                )));
            }
            if let Some(service_time) = &ride.service_time {
                service_time.validate()?;
            }
        }
        self.service_time.validate()?;
        self.arrival_schedule.validate(self.horizon_ms)?;
        for arrival in &self.scripted_arrivals {
            if !self.rides.iter().any(|ride| ride.name == arrival.ride) {
                return Err(SimError::config(format!(
                    "scripted arrival at {} ms targets unknown ride '{}'",
                    arrival.at_ms, arrival.ride
                )));
            }
        }
        Ok(())
    }
}
