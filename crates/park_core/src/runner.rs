//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression happens here, outside systems. Each step pops the next event from
//! [SimulationClock], inserts it as [CurrentEvent], then runs the schedule. Faults recorded
//! by systems during the step end the run.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::error::{SimError, SimulationFault};
use crate::scenario::SimulationEndTimeMs;
use crate::systems::{
    ride_completed::ride_completed_system, simulation_started::simulation_started_system,
    visitor_arrival::visitor_arrival_system,
};
use crate::telemetry::{SimTelemetry, Termination};

fn is_simulation_started(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::SimulationStarted)
        .unwrap_or(false)
}

fn is_visitor_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::VisitorArrival)
        .unwrap_or(false)
}

fn is_ride_completed(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::RideCompleted)
        .unwrap_or(false)
}

/// Result of a single [run_next_event] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Processed(Event),
    Stopped(Termination),
}

/// Builds the simulation schedule: one system per event kind, gated on the current event,
/// followed by [apply_deferred] so visitors spawned in this step exist for the next one.
///
/// Systems are chained so their order within a step never varies between runs.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            simulation_started_system.run_if(is_simulation_started),
            visitor_arrival_system.run_if(is_visitor_arrival),
            ride_completed_system.run_if(is_ride_completed),
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

/// Schedules `SimulationStarted` at time 0. Call after building the scenario.
pub fn initialize_simulation(world: &mut World) -> Result<(), SimError> {
    world
        .get_resource_mut::<SimulationClock>()
        .ok_or_else(|| SimError::config("world has no simulation clock"))?
        .schedule_at(0, EventKind::SimulationStarted, None)
}

/// Runs one simulation step.
///
/// Stops without popping when the queue is empty or the next event is strictly after
/// [SimulationEndTimeMs] (when that resource is present).
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Result<StepOutcome, SimError> {
    run_next_event_with_hook(world, schedule, |_, _| {})
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<StepOutcome, SimError>
where
    F: FnMut(&World, &Event),
{
    let stop_at = world.get_resource::<SimulationEndTimeMs>().map(|e| e.0);
    let mut clock = world
        .get_resource_mut::<SimulationClock>()
        .ok_or_else(|| SimError::config("world has no simulation clock"))?;
    let Some(next_ts) = clock.next_event_time() else {
        return Ok(StepOutcome::Stopped(Termination::QueueExhausted));
    };
    if stop_at.is_some_and(|end_ms| next_ts > end_ms) {
        return Ok(StepOutcome::Stopped(Termination::HorizonReached));
    }
    let event = match clock.advance() {
        Ok(event) => event,
        Err(SimError::QueueExhausted) => {
            return Ok(StepOutcome::Stopped(Termination::QueueExhausted))
        }
        Err(err) => return Err(err),
    };

    world.insert_resource(CurrentEvent(event));
    schedule.run(world);

    if let Some(mut telemetry) = world.get_resource_mut::<SimTelemetry>() {
        telemetry.events_processed += 1;
    }
    if let Some(err) = world
        .get_resource_mut::<SimulationFault>()
        .and_then(|mut fault| fault.take())
    {
        return Err(err);
    }

    hook(world, &event);
    Ok(StepOutcome::Processed(event))
}

/// Runs steps until the queue empties or the horizon is reached.
pub fn run_until_done(world: &mut World, schedule: &mut Schedule) -> Result<Termination, SimError> {
    run_until_done_with_hook(world, schedule, |_, _| {})
}

/// Runs steps until done and invokes `hook` after each processed event.
pub fn run_until_done_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<Termination, SimError>
where
    F: FnMut(&World, &Event),
{
    loop {
        if let StepOutcome::Stopped(termination) =
            run_next_event_with_hook(world, schedule, &mut hook)?
        {
            return Ok(termination);
        }
    }
}
