//! Seeded random streams owned by one simulation world.
//!
//! Each concern draws from its own stream so that, for example, changing how rides are
//! picked does not shift the sampled arrival times.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

const ARRIVAL_STREAM: u64 = 0xa771_7a15;
const SELECTION_STREAM: u64 = 0xdead_beef;
const SERVICE_STREAM: u64 = 0x5eed_cafe;

#[derive(Debug, Clone, Resource)]
pub struct SimRng {
    seed: u64,
    pub arrivals: StdRng,
    pub selection: StdRng,
    pub service: StdRng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            arrivals: StdRng::seed_from_u64(seed.wrapping_add(ARRIVAL_STREAM)),
            selection: StdRng::seed_from_u64(seed.wrapping_add(SELECTION_STREAM)),
            service: StdRng::seed_from_u64(seed ^ SERVICE_STREAM),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}
