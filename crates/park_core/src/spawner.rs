//! Arrival generator: produces a stream of visitors from an inter-arrival distribution and
//! assigns each one a target ride.
//!
//! The generator reacts to `SimulationStarted` and then schedules its own `VisitorArrival`
//! events until the next sampled arrival would fall past the horizon.

use bevy_ecs::prelude::Resource;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::distributions::InterArrivalDistribution;
use crate::error::SimError;
use crate::ride::RideId;

/// How an arriving visitor picks a ride.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "weights", rename_all = "snake_case")]
pub enum RideSelectionPolicy {
    /// Every ride equally likely.
    #[default]
    UniformRandom,
    /// Rides in roster order, wrapping around.
    RoundRobin,
    /// Relative popularity per ride, in roster order.
    Weighted(Vec<f64>),
}

/// Stateful ride chooser built from a [RideSelectionPolicy].
#[derive(Debug, Clone)]
pub struct RideSelector {
    policy: RideSelectionPolicy,
    ride_count: usize,
    next_round_robin: usize,
    weights: Option<WeightedIndex<f64>>,
}

impl RideSelector {
    /// # Errors
    ///
    /// [SimError::Configuration] if weights do not match the roster or are all zero.
    pub fn new(policy: RideSelectionPolicy, ride_count: usize) -> Result<Self, SimError> {
        let weights = match &policy {
            RideSelectionPolicy::Weighted(weights) => {
                if weights.len() != ride_count {
                    return Err(SimError::config(format!(
                        "{} ride weights given for {} rides",
                        weights.len(),
                        ride_count
                    )));
                }
                let index = WeightedIndex::new(weights.iter().copied()).map_err(|err| {
                    SimError::config(format!("invalid ride weights {weights:?}: {err}"))
                })?;
                Some(index)
            }
            _ => None,
        };
        Ok(Self {
            policy,
            ride_count,
            next_round_robin: 0,
            weights,
        })
    }

    pub fn policy(&self) -> &RideSelectionPolicy {
        &self.policy
    }

    /// Pick a ride, or `None` when the roster is empty.
    pub fn select(&mut self, rng: &mut dyn RngCore) -> Option<RideId> {
        if self.ride_count == 0 {
            return None;
        }
        let index = match self.policy {
            RideSelectionPolicy::UniformRandom => rng.gen_range(0..self.ride_count),
            RideSelectionPolicy::RoundRobin => {
                let index = self.next_round_robin;
                self.next_round_robin = (index + 1) % self.ride_count;
                index
            }
            RideSelectionPolicy::Weighted(_) => match &self.weights {
                Some(weights) => weights.sample(rng),
                None => rng.gen_range(0..self.ride_count),
            },
        };
        Some(RideId(index))
    }
}

/// Configuration for the arrival generator.
#[derive(Debug)]
pub struct ArrivalGeneratorConfig {
    pub inter_arrival_dist: Box<dyn InterArrivalDistribution>,
    /// No arrival is scheduled after this time (the horizon).
    pub end_time_ms: u64,
    /// Optional cap on generated visitors.
    pub max_count: Option<usize>,
}

#[derive(Debug, Default)]
struct GeneratorState {
    next_arrival_ms: Option<u64>,
    /// Exact (unrounded) time of the last sampled arrival; gaps are measured from here.
    cursor_ms: Option<f64>,
    generated_count: usize,
    initialized: bool,
}

/// Active generator resource that tracks spawning state.
#[derive(Debug, Resource)]
pub struct ArrivalGenerator {
    pub config: ArrivalGeneratorConfig,
    selector: RideSelector,
    state: GeneratorState,
}

impl ArrivalGenerator {
    pub fn new(config: ArrivalGeneratorConfig, selector: RideSelector) -> Self {
        Self {
            config,
            selector,
            state: GeneratorState::default(),
        }
    }

    /// Whether an arrival at `time_ms` is still allowed.
    pub fn should_spawn(&self, time_ms: u64) -> bool {
        if let Some(max) = self.config.max_count {
            if self.state.generated_count >= max {
                return false;
            }
        }
        time_ms <= self.config.end_time_ms
    }

    /// Sample the next gap and return the next arrival time, or `None` once arrivals stop
    /// (gap infinite, past the horizon, or max count reached).
    ///
    /// Gaps accumulate on an unrounded cursor that starts at `now_ms`; only the returned
    /// event time is rounded to whole milliseconds, so rounding never biases the rate.
    pub fn sample_next(&mut self, rng: &mut dyn RngCore, now_ms: u64) -> Option<u64> {
        let cursor = self
            .state
            .cursor_ms
            .filter(|&c| c.round() as u64 == now_ms)
            .unwrap_or(now_ms as f64);
        let gap_ms = self.config.inter_arrival_dist.sample_ms(rng, now_ms);
        let exact = cursor + gap_ms.max(0.0);

        self.state.next_arrival_ms = None;
        self.state.cursor_ms = None;
        if !exact.is_finite() || exact > self.config.end_time_ms as f64 {
            return None;
        }
        let at = (exact.round() as u64).max(now_ms);
        if self.should_spawn(at) {
            self.state.cursor_ms = Some(exact);
            self.state.next_arrival_ms = Some(at);
        }
        self.state.next_arrival_ms
    }

    pub fn choose_ride(&mut self, rng: &mut dyn RngCore) -> Option<RideId> {
        self.selector.select(rng)
    }

    pub fn record_spawn(&mut self) {
        self.state.generated_count += 1;
    }

    pub fn next_arrival_ms(&self) -> Option<u64> {
        self.state.next_arrival_ms
    }

    pub fn generated_count(&self) -> usize {
        self.state.generated_count
    }

    pub fn initialized(&self) -> bool {
        self.state.initialized
    }

    pub fn set_initialized(&mut self, initialized: bool) {
        self.state.initialized = initialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::UniformInterArrival;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn generator(interval_ms: f64, end_time_ms: u64, max_count: Option<usize>) -> ArrivalGenerator {
        ArrivalGenerator::new(
            ArrivalGeneratorConfig {
                inter_arrival_dist: Box::new(UniformInterArrival::new(interval_ms)),
                end_time_ms,
                max_count,
            },
            RideSelector::new(RideSelectionPolicy::RoundRobin, 3).expect("selector"),
        )
    }

    #[test]
    fn stops_when_next_arrival_passes_end() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gen = generator(40.0, 100, None);
        assert_eq!(gen.sample_next(&mut rng, 0), Some(40));
        assert_eq!(gen.sample_next(&mut rng, 40), Some(80));
        assert_eq!(gen.sample_next(&mut rng, 80), None);
        assert_eq!(gen.next_arrival_ms(), None);
    }

    #[test]
    fn arrival_exactly_at_end_is_allowed() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gen = generator(50.0, 100, None);
        assert_eq!(gen.sample_next(&mut rng, 50), Some(100));
    }

    #[test]
    fn respects_max_count() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gen = generator(1.0, 1000, Some(2));
        gen.record_spawn();
        assert!(gen.sample_next(&mut rng, 0).is_some());
        gen.record_spawn();
        assert_eq!(gen.sample_next(&mut rng, 1), None);
        assert_eq!(gen.generated_count(), 2);
    }

    #[test]
    fn sub_millisecond_gaps_accumulate() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gen = generator(0.5, 10, None);
        let mut now = 0;
        let mut times = Vec::new();
        while let Some(at) = gen.sample_next(&mut rng, now) {
            times.push(at);
            now = at;
        }
        // 0.5, 1.0, ..., 10.0 -> 20 arrivals, never stuck at one timestamp
        assert_eq!(times.len(), 20);
        assert_eq!(times.first(), Some(&1));
        assert_eq!(times.last(), Some(&10));
        assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn high_rate_arrival_count_matches_expectation() {
        use crate::distributions::ExponentialInterArrival;

        // 360,000 visitors/hour over 10 minutes: 60,000 expected per run.
        let horizon_ms = 10 * 60_000;
        let expected = 60_000.0;
        let seeds = 5u64;
        let mut total = 0usize;
        for seed in 0..seeds {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut gen = ArrivalGenerator::new(
                ArrivalGeneratorConfig {
                    inter_arrival_dist: Box::new(ExponentialInterArrival::new(360_000.0)),
                    end_time_ms: horizon_ms,
                    max_count: None,
                },
                RideSelector::new(RideSelectionPolicy::UniformRandom, 1).expect("selector"),
            );
            let mut now = 0;
            while let Some(at) = gen.sample_next(&mut rng, now) {
                total += 1;
                now = at;
            }
        }
        let mean = total as f64 / seeds as f64;
        assert!(
            (mean - expected).abs() / expected < 0.015,
            "mean arrivals {mean} far from {expected}"
        );
    }

    #[test]
    fn round_robin_cycles_rides() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut gen = generator(1.0, 10, None);
        let picks: Vec<_> = (0..4).filter_map(|_| gen.choose_ride(&mut rng)).collect();
        assert_eq!(picks, vec![RideId(0), RideId(1), RideId(2), RideId(0)]);
    }

    #[test]
    fn weighted_selection_honours_zero_weight() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut selector =
            RideSelector::new(RideSelectionPolicy::Weighted(vec![0.0, 1.0, 3.0]), 3)
                .expect("selector");
        let picks: Vec<_> = (0..500).filter_map(|_| selector.select(&mut rng)).collect();
        assert!(picks.iter().all(|&ride| ride != RideId(0)));
        let third = picks.iter().filter(|&&ride| ride == RideId(2)).count();
        assert!(third > 300, "weighted ride picked {third} times");
    }

    #[test]
    fn weighted_selection_rejects_bad_weights() {
        assert!(RideSelector::new(RideSelectionPolicy::Weighted(vec![1.0]), 2).is_err());
        assert!(RideSelector::new(RideSelectionPolicy::Weighted(vec![0.0, 0.0]), 2).is_err());
    }

    #[test]
    fn uniform_selection_is_seeded() {
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut selector =
                RideSelector::new(RideSelectionPolicy::UniformRandom, 5).expect("selector");
            (0..20).filter_map(|_| selector.select(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(pick(1), pick(1));
        let mut empty = RideSelector::new(RideSelectionPolicy::UniformRandom, 0).expect("selector");
        assert_eq!(empty.select(&mut StdRng::seed_from_u64(0)), None);
    }
}
