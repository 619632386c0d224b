//! Scenario loading, parameter sweeps and result export for the park simulation.
//!
//! This crate runs many park simulations in parallel with varying ride counts, ride
//! capacities and arrival intensities, reduces each run to a flat [SimulationResult] row,
//! and writes single runs or whole sweeps to CSV and JSON.
//!
//! # Quick Start
//!
//! ```no_run
//! use park_experiments::{export_to_csv, find_best_result_index, run_parallel_experiments, ParameterSpace};
//!
//! let parameter_sets = ParameterSpace::grid()
//!     .ride_capacity(vec![5, 10, 20])
//!     .rate_multiplier(vec![0.5, 1.0, 2.0])
//!     .replications(4)
//!     .generate();
//!
//! let results = run_parallel_experiments(&parameter_sets, None)?;
//! let best = find_best_result_index(&results);
//! export_to_csv(&results, &parameter_sets, "sweep.csv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Scenario files (TOML or JSON) into validated `ScenarioParams`
//! - [`parameters`]: Grid search over park configurations
//! - [`runner`]: Parallel simulation execution using rayon
//! - [`metrics`]: Metrics extraction from simulation results
//! - [`export`]: Result export to CSV/JSON

pub mod config;
pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use config::{load_scenario, ConfigError, ScenarioFile};
pub use export::{
    export_log_to_json, export_ride_summaries_to_csv, export_to_csv, export_to_json,
    export_visits_to_csv, find_best_result_index,
};
pub use metrics::{extract_metrics, histogram, SimulationResult};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_parallel_experiments, run_parallel_experiments_with_progress, ExperimentError};
