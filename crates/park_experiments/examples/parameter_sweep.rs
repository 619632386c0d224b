//! Example: sweep ride capacity against crowd size.
//!
//! Runs every capacity / arrival-rate combination with several seeds in parallel, prints
//! the configuration with the shortest average wait and exports all rows to CSV.
//!
//! Run with: cargo run -p park_experiments --example parameter_sweep

use park_experiments::{export_to_csv, find_best_result_index, run_parallel_experiments, ParameterSpace};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting parameter sweep experiment...");

    let space = ParameterSpace::grid()
        .ride_capacity(vec![2, 5, 10, 20])
        .rate_multiplier(vec![0.5, 1.0, 1.5, 2.0])
        .replications(3)
        .base_seed(7);

    let parameter_sets = space.generate();
    println!("Generated {} parameter sets", parameter_sets.len());

    let results = run_parallel_experiments(&parameter_sets, None)?;
    println!("Completed {} simulations", results.len());

    if let Some(best_idx) = find_best_result_index(&results) {
        let best = &results[best_idx];
        let set = &parameter_sets[best_idx];
        println!("\n=== Best Configuration ===");
        println!("Ride capacity: {:?}", set.ride_capacity);
        println!("Rate multiplier: {:.1}", set.rate_multiplier);
        println!("Avg wait: {:.2} min", best.avg_wait_minutes());
        println!("Avg utilization: {:.1}%", best.avg_utilization * 100.0);
    }

    println!("\n{:>8} {:>6} {:>10} {:>12}", "capacity", "rate", "visitors", "avg wait");
    for (set, result) in parameter_sets.iter().zip(&results).filter(|(set, _)| set.run_id == 0) {
        println!(
            "{:>8} {:>6.1} {:>10} {:>10.2} m",
            set.ride_capacity.unwrap_or_default(),
            set.rate_multiplier,
            result.total_visitors,
            result.avg_wait_minutes()
        );
    }

    export_to_csv(&results, &parameter_sets, "experiment_results.csv")?;
    println!("\nExported to experiment_results.csv");
    Ok(())
}
