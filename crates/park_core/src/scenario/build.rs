use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::distributions::PiecewiseExponential;
use crate::error::{SimError, SimulationFault};
use crate::ride::{Ride, RideRoster};
use crate::rng::SimRng;
use crate::scenario::params::{
    DefaultServiceTime, PendingVisitor, ScenarioParams, ScriptedArrivals, SimulationEndTimeMs,
};
use crate::spawner::{ArrivalGenerator, ArrivalGeneratorConfig, RideSelector};
use crate::telemetry::SimTelemetry;

/// Build the ride roster, validating names and capacities.
pub fn build_roster(params: &ScenarioParams) -> Result<RideRoster, SimError> {
    let rides = params
        .rides
        .iter()
        .map(|config| {
            let ride = Ride::new(config.name.clone(), config.capacity)?;
            Ok(match &config.service_time {
                Some(service_time) => ride.with_service_time(service_time.clone()),
                None => ride,
            })
        })
        .collect::<Result<Vec<_>, SimError>>()?;
    RideRoster::new(rides)
}

/// Resolve scripted arrivals against the roster, keeping list order.
fn resolve_scripted(
    params: &ScenarioParams,
    roster: &RideRoster,
) -> Result<ScriptedArrivals, SimError> {
    params
        .scripted_arrivals
        .iter()
        .map(|arrival| {
            let ride = roster.find(&arrival.ride).ok_or_else(|| {
                SimError::config(format!("unknown ride '{}' in scripted arrival", arrival.ride))
            })?;
            Ok(PendingVisitor {
                at_ms: arrival.at_ms,
                ride,
                service_override_ms: arrival.service_ms,
            })
        })
        .collect::<Result<Vec<_>, SimError>>()
        .map(ScriptedArrivals)
}

/// Validate `params` and insert every resource a run needs into `world`.
///
/// Returns the effective seed: `params.seed`, or a freshly drawn one when unset.
/// Nothing is inserted when validation fails.
pub fn build_scenario(world: &mut World, params: &ScenarioParams) -> Result<u64, SimError> {
    params.validate()?;
    let roster = build_roster(params)?;
    let scripted = resolve_scripted(params, &roster)?;

    let generator = if params.arrival_schedule.is_empty() {
        None
    } else {
        let selector = RideSelector::new(params.ride_selection.clone(), roster.len())?;
        Some(ArrivalGenerator::new(
            ArrivalGeneratorConfig {
                inter_arrival_dist: Box::new(PiecewiseExponential::new(
                    params.arrival_schedule.clone(),
                )),
                end_time_ms: params.horizon_ms,
                max_count: params.max_visitors,
            },
            selector,
        ))
    };

    let seed = params.seed.unwrap_or_else(rand::random);

    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimTelemetry::default());
    world.insert_resource(SimulationFault::default());
    world.insert_resource(SimulationEndTimeMs(params.horizon_ms));
    world.insert_resource(DefaultServiceTime(params.service_time.clone()));
    world.insert_resource(SimRng::new(seed));
    world.insert_resource(roster);
    world.insert_resource(scripted);
    if let Some(generator) = generator {
        world.insert_resource(generator);
    }
    Ok(seed)
}
