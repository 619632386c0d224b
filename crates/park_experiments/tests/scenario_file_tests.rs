//! Scenario files shipped in `scenarios/`, loaded, run and exported end to end.

use std::path::PathBuf;

use park_core::clock::ONE_MIN_MS;
use park_core::telemetry::Termination;
use park_core::Simulation;
use park_experiments::{
    export_log_to_json, export_visits_to_csv, extract_metrics, load_scenario, ParameterSpace,
    run_parallel_experiments_with_progress,
};
use tempfile::tempdir;

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn tied_arrivals_file_reproduces_fifo_waits() {
    let params = load_scenario(scenario_path("tied_arrivals.toml")).expect("load");
    let log = Simulation::new(params).expect("build").run().expect("run");

    let waits: Vec<u64> = log.completed.iter().map(|v| v.wait_ms / ONE_MIN_MS).collect();
    assert_eq!(waits, vec![0, 10, 30]);
    assert_eq!(log.termination, Termination::QueueExhausted);

    let metrics = extract_metrics(&log);
    assert_eq!(metrics.completed_visits, 3);
    assert_eq!(metrics.incomplete_visitors, 0);
}

#[test]
fn park_day_file_runs_and_exports() {
    let params = load_scenario(scenario_path("park_day.toml")).expect("load");
    assert_eq!(params.rides.len(), 3);

    let log = Simulation::new(params).expect("build").run().expect("run");
    assert!(log.total_arrivals() > 0);
    assert_eq!(log.ride("Log Flume").map(|r| r.capacity), Some(10));
    assert_eq!(
        log.total_arrivals(),
        log.completed.len() + log.incomplete.total()
    );

    let dir = tempdir().expect("tempdir");
    let visits = dir.path().join("visits.csv");
    let json = dir.path().join("log.json");
    export_visits_to_csv(&log, &visits).expect("csv");
    export_log_to_json(&log, &json).expect("json");

    let rows = std::fs::read_to_string(&visits).expect("read").lines().count();
    assert_eq!(rows, log.completed.len() + 1);
}

#[test]
fn sweep_over_file_base_is_reproducible() {
    let base = load_scenario(scenario_path("park_day.toml")).expect("load");
    let sets = ParameterSpace::grid()
        .with_base(base)
        .ride_capacity(vec![2, 10])
        .replications(2)
        .base_seed(11)
        .generate();

    let first = run_parallel_experiments_with_progress(&sets, Some(2), false).expect("sweep");
    let second = run_parallel_experiments_with_progress(&sets, Some(4), false).expect("sweep");
    assert_eq!(first, second);

    let small = &first[0];
    let large = &first[2];
    assert!(small.avg_wait_ms >= large.avg_wait_ms);
}
