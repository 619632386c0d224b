use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Visitor, VisitorState};
use crate::error::{SimError, SimulationFault};
use crate::ride::RideRoster;
use crate::rng::SimRng;
use crate::scenario::DefaultServiceTime;
use crate::systems::service_duration_ms;
use crate::telemetry::{CompletedVisit, SimTelemetry};

/// Reacts to `RideCompleted`: releases the ride, records the visit and despawns the visitor.
/// When the release hands the seat to the head of the queue, that visitor boards at the
/// same instant and its own completion is scheduled.
#[allow(clippy::too_many_arguments)]
pub fn ride_completed_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut roster: ResMut<RideRoster>,
    mut rng: ResMut<SimRng>,
    mut telemetry: ResMut<SimTelemetry>,
    mut fault: ResMut<SimulationFault>,
    default_service: Res<DefaultServiceTime>,
    mut visitors: Query<&mut Visitor>,
) {
    if event.0.kind != EventKind::RideCompleted {
        return;
    }
    let Some(EventSubject::Visitor(entity)) = event.0.subject else {
        fault.record(SimError::MissingVisitor(Entity::PLACEHOLDER));
        return;
    };
    let now = clock.now();

    let (ride_name, ride_service, next) = {
        let Ok(mut visitor) = visitors.get_mut(entity) else {
            fault.record(SimError::MissingVisitor(entity));
            return;
        };
        if visitor.state != VisitorState::Riding {
            fault.record(SimError::MissingVisitor(entity));
            return;
        }
        let Some(ride) = roster.get_mut(visitor.ride) else {
            fault.record(SimError::config(format!("unknown ride {}", visitor.ride.0)));
            return;
        };
        let started = visitor.ride_started_at.unwrap_or(visitor.arrived_at);
        let next = match ride.release(now, started) {
            Ok(next) => next,
            Err(err) => {
                fault.record(err);
                return;
            }
        };

        // The freed seat already belongs to `next`; keep what boarding it needs.
        let ride_service = next.and_then(|_| ride.service_time().cloned());
        let ride_name = ride.name().to_string();

        visitor.depart();
        let wait_ms = visitor.wait_ms().unwrap_or_default();
        telemetry.record_completed(CompletedVisit {
            visitor_id: visitor.id,
            ride_id: visitor.ride,
            ride: ride_name.clone(),
            arrived_at_ms: visitor.arrived_at,
            ride_started_at_ms: started,
            wait_ms,
            service_ms: now.saturating_sub(started),
            departed_at_ms: now,
        });
        tracing::debug!(visitor = visitor.id, ride = %ride_name, wait_ms, "departed");
        (ride_name, ride_service, next)
    };
    commands.entity(entity).despawn();

    let Some(next_entity) = next else {
        return;
    };
    let Ok(mut next_visitor) = visitors.get_mut(next_entity) else {
        fault.record(SimError::MissingVisitor(next_entity));
        return;
    };
    let service_ms = service_duration_ms(
        ride_service.as_ref(),
        &default_service.0,
        next_visitor.service_override_ms,
        &mut rng.service,
    );
    next_visitor.board(now, service_ms);
    tracing::debug!(
        visitor = next_visitor.id,
        ride = %ride_name,
        wait_ms = next_visitor.wait_ms().unwrap_or_default(),
        "boarded from queue"
    );
    if let Err(err) = clock.schedule_in(
        service_ms,
        EventKind::RideCompleted,
        Some(EventSubject::Visitor(next_entity)),
    ) {
        fault.record(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};
    use bevy_ecs::schedule::{apply_deferred, IntoSystemConfigs};

    use crate::clock::{Event, ONE_MIN_MS};
    use crate::distributions::ServiceTimeDistribution;
    use crate::ride::{RequestOutcome, Ride, RideId};

    fn completion_at(world: &mut World, timestamp: u64, entity: Entity) {
        let event = {
            let mut clock = world.resource_mut::<SimulationClock>();
            clock
                .schedule_at(timestamp, EventKind::RideCompleted, Some(EventSubject::Visitor(entity)))
                .expect("schedule");
            clock.advance().expect("event")
        };
        world.insert_resource(CurrentEvent(event));
        let mut schedule = Schedule::default();
        schedule.add_systems((ride_completed_system, apply_deferred).chain());
        schedule.run(world);
    }

    #[test]
    fn completion_hands_seat_to_queue_head() {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(SimRng::new(11));
        world.insert_resource(SimTelemetry::default());
        world.insert_resource(SimulationFault::default());
        world.insert_resource(DefaultServiceTime(ServiceTimeDistribution::fixed_minutes(3.0)));

        let mut ride = Ride::new("Carousel", 1)
            .expect("ride")
            .with_service_time(ServiceTimeDistribution::fixed_minutes(7.0));
        let mut visitor = Visitor::arrive(0, RideId(0), 0, None);
        let mut waiter = Visitor::arrive(1, RideId(0), ONE_MIN_MS, None);
        visitor.board(0, 2 * ONE_MIN_MS);
        waiter.queue();
        let visitor_entity = world.spawn(visitor).id();
        let waiter_entity = world.spawn(waiter).id();
        assert_eq!(ride.request(visitor_entity), RequestOutcome::Granted);
        assert_eq!(
            ride.request(waiter_entity),
            RequestOutcome::Queued { position: 0 }
        );
        world.insert_resource(RideRoster::new(vec![ride]).expect("roster"));

        completion_at(&mut world, 2 * ONE_MIN_MS, visitor_entity);

        assert!(!world.resource::<SimulationFault>().is_set());
        assert!(world.get_entity(visitor_entity).is_none());
        let waiter = world.get::<Visitor>(waiter_entity).expect("waiter");
        assert_eq!(waiter.state, VisitorState::Riding);
        assert_eq!(waiter.wait_ms(), Some(ONE_MIN_MS));

        let telemetry = world.resource::<SimTelemetry>();
        assert_eq!(telemetry.completed.len(), 1);
        assert_eq!(telemetry.completed[0].wait_ms, 0);
        assert_eq!(telemetry.completed[0].departed_at_ms, 2 * ONE_MIN_MS);

        let ride = world.resource::<RideRoster>().get(RideId(0)).expect("ride");
        assert_eq!(ride.occupancy(), 1);
        assert_eq!(ride.times_used(), 2);
        assert_eq!(ride.busy_time_ms(), 2 * ONE_MIN_MS);
        assert_eq!(
            world.resource::<SimulationClock>().next_event_time(),
            Some(9 * ONE_MIN_MS)
        );
        assert_eq!(waiter.service_ms, Some(7 * ONE_MIN_MS));
    }

    #[test]
    fn completion_for_missing_visitor_is_a_fault() {
        let mut world = World::new();
        world.insert_resource(SimulationClock::default());
        world.insert_resource(SimRng::new(11));
        world.insert_resource(SimTelemetry::default());
        world.insert_resource(SimulationFault::default());
        world.insert_resource(DefaultServiceTime::default());
        world.insert_resource(
            RideRoster::new(vec![Ride::new("Carousel", 1).expect("ride")]).expect("roster"),
        );
        let ghost = world.spawn_empty().id();
        world.despawn(ghost);

        completion_at(&mut world, 0, ghost);

        let fault = world.resource_mut::<SimulationFault>().take();
        assert_eq!(fault, Some(SimError::MissingVisitor(ghost)));
    }
}
