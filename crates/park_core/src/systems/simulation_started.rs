use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::error::SimulationFault;
use crate::rng::SimRng;
use crate::scenario::ScriptedArrivals;
use crate::spawner::ArrivalGenerator;

/// Reacts to `SimulationStarted`: queues scripted visitors in list order, then the first
/// generated arrival.
pub fn simulation_started_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut rng: ResMut<SimRng>,
    mut fault: ResMut<SimulationFault>,
    generator: Option<ResMut<ArrivalGenerator>>,
    scripted: Option<Res<ScriptedArrivals>>,
) {
    if event.0.kind != EventKind::SimulationStarted {
        return;
    }

    if let Some(scripted) = scripted {
        for (index, visitor) in scripted.0.iter().enumerate() {
            if let Err(err) = clock.schedule_at(
                visitor.at_ms,
                EventKind::VisitorArrival,
                Some(EventSubject::Scripted(index)),
            ) {
                fault.record(err);
                return;
            }
        }
    }

    let Some(mut generator) = generator else {
        return;
    };
    if generator.initialized() {
        return;
    }
    generator.set_initialized(true);

    let now = clock.now();
    if let Some(first) = generator.sample_next(&mut rng.arrivals, now) {
        tracing::debug!(at_ms = first, "first generated arrival scheduled");
        if let Err(err) = clock.schedule_at(first, EventKind::VisitorArrival, None) {
            fault.record(err);
        }
    }
}
