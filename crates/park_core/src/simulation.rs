//! Simulation driver: owns one world, runs it to the horizon and hands back the
//! [StatisticsLog].

use bevy_ecs::prelude::{Schedule, World};
use tracing::{debug, info, warn};

use crate::clock::{ms_to_minutes, Event};
use crate::ecs::{Visitor, VisitorState};
use crate::error::SimError;
use crate::ride::RideRoster;
use crate::runner::{initialize_simulation, run_until_done_with_hook, simulation_schedule};
use crate::scenario::{build_scenario, ScenarioParams};
use crate::telemetry::{IncompleteVisitors, RideSummary, SimTelemetry, StatisticsLog, Termination};

/// A configured, not yet started run.
pub struct Simulation {
    world: World,
    schedule: Schedule,
    seed: u64,
    horizon_ms: u64,
}

impl Simulation {
    /// Validate `params`, seed the random streams and queue `SimulationStarted`.
    ///
    /// # Errors
    ///
    /// [SimError::Configuration] for any malformed scenario. No simulated time has passed.
    pub fn new(params: ScenarioParams) -> Result<Self, SimError> {
        let mut world = World::new();
        let seed = build_scenario(&mut world, &params)?;
        initialize_simulation(&mut world)?;
        debug!(
            seed,
            rides = params.rides.len(),
            scripted = params.scripted_arrivals.len(),
            "scenario built"
        );
        Ok(Self {
            world,
            schedule: simulation_schedule(),
            seed,
            horizon_ms: params.horizon_ms,
        })
    }

    /// Effective seed; the drawn one when the scenario left it unset.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn run(self) -> Result<StatisticsLog, SimError> {
        self.run_with_hook(|_, _| {})
    }

    /// Run to completion, calling `hook` after every processed event.
    pub fn run_with_hook<F>(mut self, hook: F) -> Result<StatisticsLog, SimError>
    where
        F: FnMut(&World, &Event),
    {
        info!(
            seed = self.seed,
            horizon_min = ms_to_minutes(self.horizon_ms),
            "park simulation started"
        );
        let termination = run_until_done_with_hook(&mut self.world, &mut self.schedule, hook)?;
        let log = finalize(&mut self.world, self.seed, self.horizon_ms, termination);
        info!(
            ?termination,
            events = log.events_processed,
            arrivals = log.total_arrivals(),
            completed = log.completed.len(),
            incomplete = log.incomplete.total(),
            "park simulation finished"
        );
        if log.incomplete.total() > 0 {
            warn!(
                queued = log.incomplete.queued,
                riding = log.incomplete.riding,
                "visitors still in the park at the horizon"
            );
        }
        Ok(log)
    }
}

/// Build and run a scenario in one call.
pub fn run_scenario(params: ScenarioParams) -> Result<StatisticsLog, SimError> {
    Simulation::new(params)?.run()
}

fn finalize(world: &mut World, seed: u64, horizon_ms: u64, termination: Termination) -> StatisticsLog {
    let mut incomplete = IncompleteVisitors::default();
    for visitor in world.query::<&Visitor>().iter(world) {
        match visitor.state {
            VisitorState::Queued => incomplete.queued += 1,
            VisitorState::Riding => incomplete.riding += 1,
            VisitorState::Arrived | VisitorState::Departed => {}
        }
    }

    let rides = world
        .get_resource::<RideRoster>()
        .map(|roster| {
            roster
                .iter()
                .map(|(id, ride)| RideSummary::from_ride(id, ride, horizon_ms))
                .collect()
        })
        .unwrap_or_default();
    let telemetry = world
        .get_resource_mut::<SimTelemetry>()
        .map(|mut telemetry| std::mem::take(&mut *telemetry))
        .unwrap_or_default();

    StatisticsLog {
        seed,
        horizon_ms,
        termination,
        events_processed: telemetry.events_processed,
        completed: telemetry.completed,
        rides,
        arrivals_ms: telemetry.arrivals_ms,
        incomplete,
    }
}
