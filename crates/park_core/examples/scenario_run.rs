//! Run the default park day (480 min, 3 rides of capacity 10) and print ride usage.
//!
//! Run with: cargo run -p park_core --example scenario_run

use bevy_ecs::prelude::World;
use park_core::clock::{ms_to_minutes, SimulationClock};
use park_core::ride::RideRoster;
use park_core::runner::{initialize_simulation, run_until_done, simulation_schedule};
use park_core::scenario::{build_scenario, ScenarioParams};
use park_core::telemetry::SimTelemetry;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    const SEED: u64 = 123;

    let mut world = World::new();
    build_scenario(&mut world, &ScenarioParams::default().with_seed(SEED))?;
    initialize_simulation(&mut world)?;

    let mut schedule = simulation_schedule();
    let termination = run_until_done(&mut world, &mut schedule)?;

    let telemetry = world.resource::<SimTelemetry>();
    let clock = world.resource::<SimulationClock>();

    println!("--- Park day (seed {SEED}) ---");
    println!("Stopped: {termination:?} at {:.1} min", ms_to_minutes(clock.now()));
    println!("Events processed: {}", telemetry.events_processed);
    println!("Arrivals: {}", telemetry.arrivals_ms.len());
    println!("Completed visits: {}", telemetry.completed.len());

    for (_, ride) in world.resource::<RideRoster>().iter() {
        println!(
            "  {:<8} used {:>4} times, busy {:>6.1} min, {} riding, {} queued",
            ride.name(),
            ride.times_used(),
            ms_to_minutes(ride.busy_time_ms()),
            ride.occupancy(),
            ride.queue_len(),
        );
    }

    const SAMPLE: usize = 10;
    println!("\nFirst {SAMPLE} completed visits:");
    for visit in telemetry.completed.iter().take(SAMPLE) {
        println!(
            "  visitor {:>4} on {:<8} arrived {:>6.1}  waited {:>5.1}  left {:>6.1}",
            visit.visitor_id,
            visit.ride,
            visit.arrived_at_minutes(),
            visit.wait_minutes(),
            visit.departed_at_minutes(),
        );
    }
    Ok(())
}
