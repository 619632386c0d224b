#![allow(dead_code)]

use bevy_ecs::prelude::World;
use park_core::clock::{SimulationClock, ONE_MIN_MS};
use park_core::distributions::ServiceTimeDistribution;
use park_core::error::SimulationFault;
use park_core::ride::{Ride, RideId, RideRoster};
use park_core::rng::SimRng;
use park_core::runner::initialize_simulation;
use park_core::scenario::{
    DefaultServiceTime, PendingVisitor, ScriptedArrivals, SimulationEndTimeMs,
};
use park_core::telemetry::SimTelemetry;

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub rides: Vec<(String, usize)>,
    pub service_time: ServiceTimeDistribution,
    pub end_time_ms: Option<u64>,
    pub visitors: Vec<PendingVisitor>,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            rides: vec![("Test Ride".to_string(), 1)],
            service_time: ServiceTimeDistribution::fixed_minutes(5.0),
            end_time_ms: None,
            visitors: Vec::new(),
        }
    }
}

/// Builds worlds without going through `build_scenario`, so tests can exercise the
/// runner and systems directly.
#[derive(Clone, Debug, Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Replace the roster.
    pub fn with_rides(mut self, rides: &[(&str, usize)]) -> Self {
        self.config.rides = rides
            .iter()
            .map(|(name, capacity)| (name.to_string(), *capacity))
            .collect();
        self
    }

    pub fn with_service_time(mut self, service_time: ServiceTimeDistribution) -> Self {
        self.config.service_time = service_time;
        self
    }

    pub fn with_end_time_minutes(mut self, minutes: u64) -> Self {
        self.config.end_time_ms = Some(minutes * ONE_MIN_MS);
        self
    }

    /// Add a scripted visitor for ride `ride` arriving at `at_ms`.
    pub fn with_visitor(mut self, at_ms: u64, ride: usize, service_ms: Option<u64>) -> Self {
        self.config.visitors.push(PendingVisitor {
            at_ms,
            ride: RideId(ride),
            service_override_ms: service_ms,
        });
        self
    }

    /// Build the world and queue `SimulationStarted`.
    pub fn build(self) -> World {
        let TestWorldConfig {
            seed,
            rides,
            service_time,
            end_time_ms,
            visitors,
        } = self.config;

        let rides = rides
            .into_iter()
            .map(|(name, capacity)| Ride::new(name, capacity).expect("ride"))
            .collect();

        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(SimTelemetry::default());
        world.insert_resource(SimulationFault::default());
        world.insert_resource(SimRng::new(seed));
        world.insert_resource(DefaultServiceTime(service_time));
        world.insert_resource(RideRoster::new(rides).expect("roster"));
        world.insert_resource(ScriptedArrivals(visitors));
        if let Some(end_time_ms) = end_time_ms {
            world.insert_resource(SimulationEndTimeMs(end_time_ms));
        }
        initialize_simulation(&mut world).expect("initialize");
        world
    }
}
