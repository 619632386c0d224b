use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use park_core::clock::ONE_MIN_MS;
use park_core::{ScenarioParams, Simulation, StatisticsLog};
use park_experiments::{
    export_log_to_json, export_ride_summaries_to_csv, export_to_csv, export_to_json,
    export_visits_to_csv, find_best_result_index, histogram, load_scenario,
    run_parallel_experiments_with_progress, ParameterSpace,
};
use tracing_subscriber::EnvFilter;

const ARRIVAL_BIN_MINUTES: u64 = 10;

#[derive(Parser)]
#[command(
    name = "park_sim",
    about = "Discrete-event simulation of visitors queueing for theme park rides"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print its summary
    Run(RunArgs),
    /// Run a capacity x arrival-rate grid in parallel
    Sweep(SweepArgs),
}

#[derive(Args)]
struct ScenarioArgs {
    /// Scenario file (.toml or .json); defaults to the 480 minute park day
    #[arg(long, env = "PARK_SIM_CONFIG")]
    config: Option<PathBuf>,
    /// Override the park day length; default phases are refitted, a config file's phases
    /// must still end at it
    #[arg(long)]
    horizon_minutes: Option<u64>,
}

impl ScenarioArgs {
    fn load(&self) -> Result<ScenarioParams, Box<dyn std::error::Error>> {
        let mut params = match &self.config {
            Some(path) => load_scenario(path)?,
            None => ScenarioParams::default(),
        };
        if let Some(minutes) = self.horizon_minutes {
            params = if self.config.is_some() {
                params.with_horizon_minutes(minutes)
            } else {
                params.with_park_day_minutes(minutes)
            };
        }
        Ok(params)
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    /// Seed for all random streams; drawn at random when omitted
    #[arg(long)]
    seed: Option<u64>,
    /// Write completed visits to CSV
    #[arg(long)]
    visits_csv: Option<PathBuf>,
    /// Write per-ride summaries to CSV
    #[arg(long)]
    rides_csv: Option<PathBuf>,
    /// Write the full statistics log to JSON
    #[arg(long)]
    log_json: Option<PathBuf>,
}

#[derive(Args)]
struct SweepArgs {
    #[command(flatten)]
    scenario: ScenarioArgs,
    /// Ride capacities to try (comma separated)
    #[arg(long, value_delimiter = ',')]
    capacities: Vec<usize>,
    /// Arrival rate multipliers to try (comma separated)
    #[arg(long, value_delimiter = ',')]
    rate_multipliers: Vec<f64>,
    /// Seeded runs per combination
    #[arg(long, default_value_t = 1)]
    replications: usize,
    /// Worker threads; all cores when omitted
    #[arg(long)]
    threads: Option<usize>,
    /// Base seed for the sweep
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value = "sweep_results.csv")]
    csv: PathBuf,
    #[arg(long)]
    json: Option<PathBuf>,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Sweep(args) => sweep(args),
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut params = args.scenario.load()?;
    if let Some(seed) = args.seed {
        params = params.with_seed(seed);
    }

    println!("Theme park simulation starting...");
    let log = Simulation::new(params)?.run()?;
    print_summary(&log);
    print_arrival_histogram(&log);

    if let Some(path) = &args.visits_csv {
        export_visits_to_csv(&log, path)?;
        println!("Exported visits to {}", path.display());
    }
    if let Some(path) = &args.rides_csv {
        export_ride_summaries_to_csv(&log, path)?;
        println!("Exported ride summaries to {}", path.display());
    }
    if let Some(path) = &args.log_json {
        export_log_to_json(&log, path)?;
        println!("Exported log to {}", path.display());
    }
    Ok(())
}

fn print_summary(log: &StatisticsLog) {
    println!("\n{:<16} {:>8} {:>10} {:>12} {:>11}", "Ride", "Capacity", "Times used", "Utilization", "Peak queue");
    for ride in &log.rides {
        println!(
            "{:<16} {:>8} {:>10} {:>11.2}% {:>11}",
            ride.name,
            ride.capacity,
            ride.times_used,
            ride.utilization * 100.0,
            ride.peak_queue_len
        );
    }

    let ride_count = log.rides.len().max(1) as f64;
    let avg_utilization = log.rides.iter().map(|r| r.utilization).sum::<f64>() / ride_count;

    println!("\nSimulation summary (seed {}):", log.seed);
    println!("- Total visitors: {}", log.total_arrivals());
    println!("- Completed visits: {}", log.completed.len());
    println!(
        "- Still in the park at close: {} queued, {} riding",
        log.incomplete.queued, log.incomplete.riding
    );
    println!("- Average queue time: {:.2} minutes", log.mean_wait_ms() / ONE_MIN_MS as f64);
    println!("- Average ride utilization: {:.2}%", avg_utilization * 100.0);
    for ride in &log.rides {
        println!("- {} was used {} times", ride.name, ride.times_used);
    }
}

fn print_arrival_histogram(log: &StatisticsLog) {
    let bin_ms = ARRIVAL_BIN_MINUTES * ONE_MIN_MS;
    let counts = histogram(&log.arrivals_ms, bin_ms, log.horizon_ms);
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);

    println!("\nVisitor arrivals per {ARRIVAL_BIN_MINUTES} min:");
    for (index, count) in counts.iter().enumerate() {
        let start = index as u64 * ARRIVAL_BIN_MINUTES;
        let bar = "#".repeat(count * 40 / peak);
        println!("{start:>4}m {count:>5} {bar}");
    }
}

fn sweep(args: SweepArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = args.scenario.load()?;
    let space = ParameterSpace::grid()
        .with_base(base)
        .ride_capacity(args.capacities)
        .rate_multiplier(args.rate_multipliers)
        .replications(args.replications)
        .base_seed(args.seed);

    let parameter_sets = space.generate();
    println!("Running {} simulations...", parameter_sets.len());
    let results = run_parallel_experiments_with_progress(&parameter_sets, args.threads, !args.no_progress)?;

    if let Some(best_idx) = find_best_result_index(&results) {
        let best = &results[best_idx];
        let set = &parameter_sets[best_idx];
        println!("\n=== Shortest average wait ===");
        println!("Experiment: {} (run {}, seed {})", set.experiment_id, set.run_id, set.seed);
        if let Some(capacity) = set.ride_capacity {
            println!("Ride capacity: {capacity}");
        }
        println!("Rate multiplier: {:.2}", set.rate_multiplier);
        println!("Avg wait: {:.2} min", best.avg_wait_minutes());
        println!("Avg utilization: {:.2}%", best.avg_utilization * 100.0);
        println!("Incomplete visitors: {}", best.incomplete_visitors);
    }

    export_to_csv(&results, &parameter_sets, &args.csv)?;
    println!("Exported to {}", args.csv.display());
    if let Some(path) = &args.json {
        export_to_json(&results, path)?;
        println!("Exported to {}", path.display());
    }
    Ok(())
}
