//! Telemetry: records visitor arrivals and completed visits while the run is in progress,
//! and the immutable [StatisticsLog] handed to reporting once it ends.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::ms_to_minutes;
use crate::ride::{Ride, RideId};

/// One completed visit, recorded when the visitor leaves the ride.
/// Timestamps are simulation milliseconds; use the helper methods for minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedVisit {
    pub visitor_id: u64,
    pub ride_id: RideId,
    pub ride: String,
    pub arrived_at_ms: u64,
    pub ride_started_at_ms: u64,
    pub wait_ms: u64,
    pub service_ms: u64,
    pub departed_at_ms: u64,
}

impl CompletedVisit {
    pub fn wait_minutes(&self) -> f64 {
        ms_to_minutes(self.wait_ms)
    }

    pub fn service_minutes(&self) -> f64 {
        ms_to_minutes(self.service_ms)
    }

    pub fn arrived_at_minutes(&self) -> f64 {
        ms_to_minutes(self.arrived_at_ms)
    }

    pub fn departed_at_minutes(&self) -> f64 {
        ms_to_minutes(self.departed_at_ms)
    }
}

/// Collects telemetry during a run.
#[derive(Debug, Default, Resource)]
pub struct SimTelemetry {
    pub completed: Vec<CompletedVisit>,
    /// Arrival time of every visitor, in arrival order, including ones that never finished.
    pub arrivals_ms: Vec<u64>,
    pub events_processed: u64,
}

impl SimTelemetry {
    /// Record an arrival and return the new visitor's id.
    pub fn record_arrival(&mut self, at_ms: u64) -> u64 {
        self.arrivals_ms.push(at_ms);
        (self.arrivals_ms.len() - 1) as u64
    }

    pub fn record_completed(&mut self, visit: CompletedVisit) {
        self.completed.push(visit);
    }
}

/// Per-ride counters at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideSummary {
    pub ride_id: RideId,
    pub name: String,
    pub capacity: usize,
    pub times_used: u64,
    /// Sum over completed rides of (release - grant).
    pub busy_time_ms: u64,
    /// `busy_time / horizon`. Can exceed 1.0 for rides with capacity above one.
    pub utilization: f64,
    /// `busy_time / (horizon * capacity)`, the fraction of seat-time in use.
    pub capacity_utilization: f64,
    pub peak_queue_len: usize,
    pub peak_occupancy: usize,
}

impl RideSummary {
    pub fn from_ride(ride_id: RideId, ride: &Ride, horizon_ms: u64) -> Self {
        let (utilization, capacity_utilization) = if horizon_ms == 0 {
            (0.0, 0.0)
        } else {
            let busy = ride.busy_time_ms() as f64;
            let horizon = horizon_ms as f64;
            (busy / horizon, busy / (horizon * ride.capacity() as f64))
        };
        Self {
            ride_id,
            name: ride.name().to_string(),
            capacity: ride.capacity(),
            times_used: ride.times_used(),
            busy_time_ms: ride.busy_time_ms(),
            utilization,
            capacity_utilization,
            peak_queue_len: ride.peak_queue_len(),
            peak_occupancy: ride.peak_occupancy(),
        }
    }

    pub fn busy_time_minutes(&self) -> f64 {
        ms_to_minutes(self.busy_time_ms)
    }
}

/// Visitors abandoned at the horizon, by the state they were in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteVisitors {
    pub queued: usize,
    pub riding: usize,
}

impl IncompleteVisitors {
    pub fn total(&self) -> usize {
        self.queued + self.riding
    }
}

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The next pending event was after the horizon.
    HorizonReached,
    /// No events were left.
    QueueExhausted,
}

/// The finished record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsLog {
    pub seed: u64,
    pub horizon_ms: u64,
    pub termination: Termination,
    pub events_processed: u64,
    /// Completed visits in departure order.
    pub completed: Vec<CompletedVisit>,
    pub rides: Vec<RideSummary>,
    pub arrivals_ms: Vec<u64>,
    pub incomplete: IncompleteVisitors,
}

impl StatisticsLog {
    pub fn total_arrivals(&self) -> usize {
        self.arrivals_ms.len()
    }

    pub fn ride(&self, name: &str) -> Option<&RideSummary> {
        self.rides.iter().find(|ride| ride.name == name)
    }

    /// Completed visits on one ride, in departure order.
    pub fn visits_on(&self, ride_id: RideId) -> impl Iterator<Item = &CompletedVisit> {
        self.completed
            .iter()
            .filter(move |visit| visit.ride_id == ride_id)
    }

    pub fn mean_wait_ms(&self) -> f64 {
        if self.completed.is_empty() {
            return 0.0;
        }
        self.completed.iter().map(|v| v.wait_ms as f64).sum::<f64>() / self.completed.len() as f64
    }

    /// Total uses across rides, including visitors still riding at the horizon.
    pub fn total_rides_used(&self) -> u64 {
        self.rides.iter().map(|ride| ride.times_used).sum()
    }
}
