//! Scenario setup: ride roster, arrival generator and scripted visitors.
//!
//! [ScenarioParams] is plain data (serde-friendly, builder-style); [build_scenario] validates
//! it and turns it into world resources.

mod build;
mod params;

pub use build::{build_roster, build_scenario};
pub use params::{
    default_rides, DefaultServiceTime, PendingVisitor, RideConfig, ScenarioParams,
    ScriptedArrival, ScriptedArrivals, SimulationEndTimeMs, DEFAULT_RIDE_CAPACITY,
    DEFAULT_RIDE_COUNT,
};
