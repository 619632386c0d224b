pub mod ride_completed;
pub mod simulation_started;
pub mod visitor_arrival;

use rand::RngCore;

use crate::distributions::ServiceTimeDistribution;

/// Service duration for a boarding visitor: the scripted override when present, otherwise a
/// sample from the ride's own distribution or the scenario default.
pub(crate) fn service_duration_ms(
    ride_service: Option<&ServiceTimeDistribution>,
    default: &ServiceTimeDistribution,
    override_ms: Option<u64>,
    rng: &mut dyn RngCore,
) -> u64 {
    match override_ms {
        Some(ms) => ms,
        None => ride_service.unwrap_or(default).sample_ms(rng),
    }
}
