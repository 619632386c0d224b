//! Visitor arrival: spawn the visitor and request its ride straight away.
//!
//! Generated arrivals (no subject) also sample and schedule the next generated arrival.
//! Scripted arrivals carry an index into [ScriptedArrivals].

use bevy_ecs::prelude::{Commands, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::Visitor;
use crate::error::{SimError, SimulationFault};
use crate::ride::{RequestOutcome, RideRoster};
use crate::rng::SimRng;
use crate::scenario::{DefaultServiceTime, ScriptedArrivals};
use crate::spawner::ArrivalGenerator;
use crate::systems::service_duration_ms;
use crate::telemetry::SimTelemetry;

#[allow(clippy::too_many_arguments)]
pub fn visitor_arrival_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut roster: ResMut<RideRoster>,
    mut rng: ResMut<SimRng>,
    mut telemetry: ResMut<SimTelemetry>,
    mut fault: ResMut<SimulationFault>,
    default_service: Res<DefaultServiceTime>,
    generator: Option<ResMut<ArrivalGenerator>>,
    scripted: Option<Res<ScriptedArrivals>>,
) {
    if event.0.kind != EventKind::VisitorArrival {
        return;
    }
    let now = clock.now();

    let (ride_id, service_override_ms) = match event.0.subject {
        Some(EventSubject::Scripted(index)) => {
            match scripted.as_ref().and_then(|s| s.0.get(index)) {
                Some(pending) => (pending.ride, pending.service_override_ms),
                None => {
                    fault.record(SimError::config(format!(
                        "scripted arrival {index} does not exist"
                    )));
                    return;
                }
            }
        }
        Some(EventSubject::Visitor(entity)) => {
            fault.record(SimError::MissingVisitor(entity));
            return;
        }
        None => {
            let Some(mut generator) = generator else {
                fault.record(SimError::config(
                    "generated arrival without an arrival generator",
                ));
                return;
            };
            generator.record_spawn();
            let ride = generator.choose_ride(&mut rng.selection);
            if let Some(next) = generator.sample_next(&mut rng.arrivals, now) {
                if let Err(err) = clock.schedule_at(next, EventKind::VisitorArrival, None) {
                    fault.record(err);
                    return;
                }
            }
            match ride {
                Some(ride) => (ride, None),
                None => {
                    fault.record(SimError::config("no ride to choose from"));
                    return;
                }
            }
        }
    };

    let Some(ride) = roster.get_mut(ride_id) else {
        fault.record(SimError::config(format!("unknown ride {}", ride_id.0)));
        return;
    };

    let id = telemetry.record_arrival(now);
    let entity = commands.spawn_empty().id();
    let mut visitor = Visitor::arrive(id, ride_id, now, service_override_ms);

    match ride.request(entity) {
        RequestOutcome::Granted => {
            let service_ms =
                service_duration_ms(
                ride.service_time(),
                &default_service.0,
                service_override_ms,
                &mut rng.service,
            );
            visitor.board(now, service_ms);
            tracing::debug!(visitor = id, ride = ride.name(), service_ms, "boarded on arrival");
            if let Err(err) = clock.schedule_in(
                service_ms,
                EventKind::RideCompleted,
                Some(EventSubject::Visitor(entity)),
            ) {
                fault.record(err);
            }
        }
        RequestOutcome::Queued { position } => {
            visitor.queue();
            tracing::debug!(visitor = id, ride = ride.name(), position, "queued");
        }
    }

    commands.entity(entity).insert(visitor);
}
