//! Test helpers for common test setup and utilities.

use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::error::SimulationFault;
use crate::ride::{Ride, RideRoster};
use crate::rng::SimRng;
use crate::scenario::{DefaultServiceTime, RideConfig, ScenarioParams, ScriptedArrival};
use crate::telemetry::SimTelemetry;

/// Name of the single ride in [single_ride_scenario].
pub const TEST_RIDE: &str = "Test Ride";

/// Create a world with the resources every system expects, one ride per `(name, capacity)`
/// and no arrivals.
///
/// # Panics
///
/// Panics if the rides are invalid.
pub fn create_test_world(rides: &[(&str, usize)]) -> World {
    let rides = rides
        .iter()
        .map(|(name, capacity)| Ride::new(*name, *capacity).expect("valid test ride"))
        .collect();
    let mut world = World::new();
    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(SimulationFault::default());
    world.insert_resource(DefaultServiceTime::default());
    world.insert_resource(SimRng::new(0));
    world.insert_resource(RideRoster::new(rides).expect("valid test roster"));
    world
}

/// A seeded scenario with one ride, no generated arrivals and one scripted visitor per
/// `(arrival_minute, service_minutes)` pair.
pub fn single_ride_scenario(
    horizon_minutes: u64,
    capacity: usize,
    visitors: &[(u64, u64)],
) -> ScenarioParams {
    ScenarioParams::default()
        .with_seed(0)
        .with_horizon_minutes(horizon_minutes)
        .without_random_arrivals()
        .with_rides(vec![RideConfig::new(TEST_RIDE, capacity)])
        .with_scripted_arrivals(
            visitors
                .iter()
                .map(|&(at, service)| {
                    ScriptedArrival::at_minutes(at, TEST_RIDE).with_service_minutes(service)
                })
                .collect(),
        )
}
