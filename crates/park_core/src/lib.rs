pub mod arrival_schedule;
pub mod clock;
pub mod distributions;
pub mod ecs;
pub mod error;
pub mod patterns;
pub mod ride;
pub mod rng;
pub mod runner;
pub mod scenario;
pub mod simulation;
pub mod spawner;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::SimError;
pub use scenario::ScenarioParams;
pub use simulation::{run_scenario, Simulation};
pub use telemetry::StatisticsLog;
