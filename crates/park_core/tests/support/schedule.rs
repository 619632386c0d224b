#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use park_core::error::SimError;
use park_core::runner::{run_next_event, run_until_done, simulation_schedule, StepOutcome};
use park_core::telemetry::Termination;

/// Helper that owns a reusable `Schedule` so tests can step or drain the event queue.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event.
    pub fn run_one(&mut self, world: &mut World) -> Result<StepOutcome, SimError> {
        run_next_event(world, &mut self.schedule)
    }

    /// Run `steps` events, panicking if the run stops early.
    pub fn run_steps(&mut self, world: &mut World, steps: usize) {
        for step in 0..steps {
            let outcome = self.run_one(world).expect("step");
            assert!(
                matches!(outcome, StepOutcome::Processed(_)),
                "run stopped at step {step}: {outcome:?}"
            );
        }
    }

    /// Drive the simulation until the queue empties or the horizon is reached.
    pub fn run_full(&mut self, world: &mut World) -> Result<Termination, SimError> {
        run_until_done(world, &mut self.schedule)
    }
}
