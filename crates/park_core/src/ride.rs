//! Rides: capacity-limited, reusable resources with a FIFO wait queue.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use serde::{Deserialize, Serialize};

use crate::distributions::ServiceTimeDistribution;
use crate::error::SimError;

/// Index of a ride in the [RideRoster].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideId(pub usize);

/// Result of [Ride::request].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A slot was free; the visitor is on the ride now.
    Granted,
    /// The visitor joined the wait queue at this zero-based position.
    Queued { position: usize },
}

#[derive(Debug, Clone)]
pub struct Ride {
    name: String,
    capacity: usize,
    occupancy: usize,
    queue: VecDeque<Entity>,
    /// Optional per-ride override of the scenario service time.
    service_time: Option<ServiceTimeDistribution>,
    times_used: u64,
    busy_time_ms: u64,
    peak_queue_len: usize,
    peak_occupancy: usize,
}

impl Ride {
    /// # Errors
    ///
    /// [SimError::Configuration] if `capacity` is zero or the name is blank.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, SimError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SimError::config("ride name must not be empty"));
        }
        if capacity == 0 {
            return Err(SimError::config(format!(
                "ride '{name}' must have capacity >= 1"
            )));
        }
        Ok(Self {
            name,
            capacity,
            occupancy: 0,
            queue: VecDeque::new(),
            service_time: None,
            times_used: 0,
            busy_time_ms: 0,
            peak_queue_len: 0,
            peak_occupancy: 0,
        })
    }

    pub fn with_service_time(mut self, service_time: ServiceTimeDistribution) -> Self {
        self.service_time = Some(service_time);
        self
    }

    /// Ask for a slot. Grants immediately when below capacity, otherwise appends the visitor
    /// to the tail of the wait queue.
    pub fn request(&mut self, visitor: Entity) -> RequestOutcome {
        if self.occupancy < self.capacity {
            self.grant();
            RequestOutcome::Granted
        } else {
            self.queue.push_back(visitor);
            self.peak_queue_len = self.peak_queue_len.max(self.queue.len());
            RequestOutcome::Queued {
                position: self.queue.len() - 1,
            }
        }
    }

    /// Give back a slot held since `held_since_ms`.
    ///
    /// If anyone is waiting, the freed slot passes straight to the head of the queue within
    /// this call and that visitor is returned; occupancy never dips in between, so no other
    /// request can take the slot first.
    ///
    /// # Errors
    ///
    /// [SimError::ResourceUnderflow] if the ride is empty.
    pub fn release(
        &mut self,
        now_ms: u64,
        held_since_ms: u64,
    ) -> Result<Option<Entity>, SimError> {
        if self.occupancy == 0 {
            return Err(SimError::ResourceUnderflow {
                ride: self.name.clone(),
            });
        }
        self.busy_time_ms += now_ms.saturating_sub(held_since_ms);
        self.occupancy -= 1;

        let next = self.queue.pop_front();
        if next.is_some() {
            self.grant();
        }
        Ok(next)
    }

    fn grant(&mut self) {
        self.occupancy += 1;
        self.times_used += 1;
        self.peak_occupancy = self.peak_occupancy.max(self.occupancy);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Visitors currently waiting, head first.
    pub fn waiting(&self) -> impl Iterator<Item = Entity> + '_ {
        self.queue.iter().copied()
    }

    pub fn service_time(&self) -> Option<&ServiceTimeDistribution> {
        self.service_time.as_ref()
    }

    pub fn times_used(&self) -> u64 {
        self.times_used
    }

    pub fn busy_time_ms(&self) -> u64 {
        self.busy_time_ms
    }

    pub fn peak_queue_len(&self) -> usize {
        self.peak_queue_len
    }

    pub fn peak_occupancy(&self) -> usize {
        self.peak_occupancy
    }
}

/// All rides of the park, indexed by [RideId].
#[derive(Debug, Clone, Default, Resource)]
pub struct RideRoster {
    rides: Vec<Ride>,
}

impl RideRoster {
    /// # Errors
    ///
    /// [SimError::Configuration] on duplicate ride names.
    pub fn new(rides: Vec<Ride>) -> Result<Self, SimError> {
        for (i, ride) in rides.iter().enumerate() {
            if rides[..i].iter().any(|other| other.name == ride.name) {
                return Err(SimError::config(format!(
                    "duplicate ride name '{}'",
                    ride.name
                )));
            }
        }
        Ok(Self { rides })
    }

    pub fn get(&self, id: RideId) -> Option<&Ride> {
        self.rides.get(id.0)
    }

    pub fn get_mut(&mut self, id: RideId) -> Option<&mut Ride> {
        self.rides.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<RideId> {
        self.rides.iter().position(|ride| ride.name == name).map(RideId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RideId, &Ride)> {
        self.rides.iter().enumerate().map(|(i, ride)| (RideId(i), ride))
    }

    pub fn len(&self) -> usize {
        self.rides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}
