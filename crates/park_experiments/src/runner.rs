//! Parallel simulation execution using rayon.
//!
//! Every run builds its own [Simulation] (world, clock, random streams), so runs share
//! nothing and the results only depend on each parameter set.

use indicatif::{ProgressBar, ProgressStyle};
use park_core::telemetry::StatisticsLog;
use park_core::{SimError, Simulation};
use rayon::prelude::*;
use thiserror::Error;

use crate::metrics::{extract_metrics, SimulationResult};
use crate::parameters::ParameterSet;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("experiment {experiment_id} run {run_id} failed: {source}")]
    Simulation {
        experiment_id: String,
        run_id: usize,
        #[source]
        source: SimError,
    },
}

#[derive(Debug, Clone)]
pub struct SimulationArtifacts {
    pub metrics: SimulationResult,
    pub log: StatisticsLog,
}

/// Run one parameter set to completion and return metrics plus the full log.
pub fn run_single_simulation_with_artifacts(
    param_set: &ParameterSet,
) -> Result<SimulationArtifacts, ExperimentError> {
    let log = Simulation::new(param_set.scenario_params())
        .and_then(Simulation::run)
        .map_err(|source| ExperimentError::Simulation {
            experiment_id: param_set.experiment_id.clone(),
            run_id: param_set.run_id,
            source,
        })?;
    let metrics = extract_metrics(&log);
    Ok(SimulationArtifacts { metrics, log })
}

/// Run a single simulation with the given parameter set.
pub fn run_single_simulation(param_set: &ParameterSet) -> Result<SimulationResult, ExperimentError> {
    run_single_simulation_with_artifacts(param_set).map(|artifacts| artifacts.metrics)
}

/// Run multiple simulations in parallel.
///
/// Results come back in the same order as `parameter_sets`. The first failing run aborts
/// the sweep.
pub fn run_parallel_experiments(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
) -> Result<Vec<SimulationResult>, ExperimentError> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple simulations in parallel with an optional progress bar.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SimulationResult>, ExperimentError> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;

    tracing::info!(runs = total, threads = pool.current_num_threads(), "starting sweep");
    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}
