//! Parameter variation framework for exploring park configurations.
//!
//! A [ParameterSpace] holds a base scenario plus the values to vary; [ParameterSpace::generate]
//! expands the Cartesian product into [ParameterSet]s, each with its own seed.

use park_core::scenario::{RideConfig, ScenarioParams};

/// A single parameter configuration for a simulation run.
///
/// Wraps `ScenarioParams` with experiment metadata for tracking and reproducibility.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    pub params: ScenarioParams,
    /// Identifies the parameter combination; shared by its replications.
    pub experiment_id: String,
    /// Replication index within the experiment.
    pub run_id: usize,
    pub seed: u64,
    /// Capacity applied to every ride, when the sweep varied it.
    pub ride_capacity: Option<usize>,
    pub rate_multiplier: f64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
            ride_capacity: None,
            rate_multiplier: 1.0,
        }
    }

    /// The scenario params with this set's seed applied.
    pub fn scenario_params(&self) -> ScenarioParams {
        let mut params = self.params.clone();
        params.seed = Some(self.seed);
        params
    }
}

/// Defines a parameter space for grid search.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    base: ScenarioParams,
    ride_counts: Vec<usize>,
    ride_capacities: Vec<usize>,
    rate_multipliers: Vec<f64>,
    replications: usize,
    base_seed: u64,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: ScenarioParams::default(),
            ride_counts: vec![],
            ride_capacities: vec![],
            rate_multipliers: vec![],
            replications: 1,
            base_seed: 0,
        }
    }

    pub fn grid() -> Self {
        Self::new()
    }

    /// Number of rides; the roster is rebuilt as `Ride 0..n`.
    pub fn ride_count(mut self, counts: Vec<usize>) -> Self {
        self.ride_counts = counts;
        self
    }

    /// Capacity applied to every ride.
    pub fn ride_capacity(mut self, capacities: Vec<usize>) -> Self {
        self.ride_capacities = capacities;
        self
    }

    /// Factors applied to every arrival rate window.
    pub fn rate_multiplier(mut self, multipliers: Vec<f64>) -> Self {
        self.rate_multipliers = multipliers;
        self
    }

    /// Independent seeded runs per combination (at least one).
    pub fn replications(mut self, replications: usize) -> Self {
        self.replications = replications.max(1);
        self
    }

    pub fn base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Set base parameters (used as defaults).
    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    /// Number of parameter sets [ParameterSpace::generate] will return.
    pub fn len(&self) -> usize {
        self.ride_counts.len().max(1)
            * self.ride_capacities.len().max(1)
            * self.rate_multipliers.len().max(1)
            * self.replications
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generate all parameter sets using grid search (Cartesian product).
    ///
    /// Dimensions left empty keep the base configuration.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let ride_counts: Vec<Option<usize>> = options(&self.ride_counts);
        let capacities: Vec<Option<usize>> = options(&self.ride_capacities);
        let multipliers: Vec<Option<f64>> = options(&self.rate_multipliers);

        let mut sets = Vec::with_capacity(self.len());
        let mut experiment = 0u64;
        for &ride_count in &ride_counts {
            for &capacity in &capacities {
                for &multiplier in &multipliers {
                    let params = self.combination(ride_count, capacity, multiplier);
                    for run_id in 0..self.replications {
                        let seed = self
                            .base_seed
                            .wrapping_add(experiment.wrapping_mul(0x9e37_79b9))
                            .wrapping_add(run_id as u64);
                        let mut set = ParameterSet::new(
                            params.clone(),
                            format!("exp_{experiment}"),
                            run_id,
                            seed,
                        );
                        set.ride_capacity = capacity;
                        set.rate_multiplier = multiplier.unwrap_or(1.0);
                        sets.push(set);
                    }
                    experiment += 1;
                }
            }
        }
        sets
    }

    fn combination(
        &self,
        ride_count: Option<usize>,
        capacity: Option<usize>,
        multiplier: Option<f64>,
    ) -> ScenarioParams {
        let mut params = self.base.clone();
        if let Some(count) = ride_count {
            let template = params.rides.first().cloned();
            params.rides = (0..count)
                .map(|i| {
                    let capacity = template.as_ref().map(|r| r.capacity).unwrap_or(1);
                    RideConfig::new(format!("Ride {i}"), capacity)
                })
                .collect();
        }
        if let Some(capacity) = capacity {
            for ride in &mut params.rides {
                ride.capacity = capacity;
            }
        }
        if let Some(multiplier) = multiplier {
            params.arrival_schedule = params.arrival_schedule.scaled(multiplier);
        }
        params
    }
}

fn options<T: Copy>(values: &[T]) -> Vec<Option<T>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.iter().copied().map(Some).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_search_single_parameter() {
        let space = ParameterSpace::grid().ride_capacity(vec![1, 5, 10]);
        let sets = space.generate();
        assert_eq!(sets.len(), 3);
        assert!(sets[1].params.rides.iter().all(|r| r.capacity == 5));
    }

    #[test]
    fn test_grid_search_multiple_parameters() {
        let space = ParameterSpace::grid()
            .ride_capacity(vec![5, 10])
            .rate_multiplier(vec![1.0, 2.0])
            .replications(3);
        let sets = space.generate();
        assert_eq!(sets.len(), 12);
        assert_eq!(space.len(), 12);
        assert_eq!(sets[3].experiment_id, "exp_1");
        assert_eq!(sets[3].run_id, 0);
        assert!((sets[3].rate_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn seeds_are_distinct_and_applied() {
        let sets = ParameterSpace::grid()
            .rate_multiplier(vec![0.5, 1.0])
            .replications(2)
            .base_seed(42)
            .generate();
        let mut seeds: Vec<_> = sets.iter().map(|s| s.seed).collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 4);
        assert_eq!(sets[0].scenario_params().seed, Some(sets[0].seed));
    }

    #[test]
    fn ride_count_rebuilds_roster_and_scales_rates() {
        let base = ScenarioParams::default();
        let sets = ParameterSpace::grid()
            .ride_count(vec![5])
            .rate_multiplier(vec![2.0])
            .generate();
        let params = &sets[0].params;
        assert_eq!(params.rides.len(), 5);
        assert_eq!(params.rides[4].name, "Ride 4");
        let base_rate = base.arrival_schedule.windows()[0].visitors_per_hour;
        let scaled_rate = params.arrival_schedule.windows()[0].visitors_per_hour;
        assert!((scaled_rate - 2.0 * base_rate).abs() < 1e-9);
    }
}
