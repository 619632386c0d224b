use bevy_ecs::prelude::Component;

use crate::ride::RideId;

/// Lifecycle of one visitor. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitorState {
    Arrived,
    Queued,
    Riding,
    Departed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Visitor {
    /// Sequential id in arrival order, starting at 0.
    pub id: u64,
    pub state: VisitorState,
    pub ride: RideId,
    pub arrived_at: u64,
    /// Time the ride granted a slot; set on `Queued -> Riding`.
    pub ride_started_at: Option<u64>,
    pub service_ms: Option<u64>,
    /// Fixed service duration for scripted visitors; sampled from the ride otherwise.
    pub service_override_ms: Option<u64>,
}

impl Visitor {
    pub fn arrive(id: u64, ride: RideId, arrived_at: u64, service_override_ms: Option<u64>) -> Self {
        Self {
            id,
            state: VisitorState::Arrived,
            ride,
            arrived_at,
            ride_started_at: None,
            service_ms: None,
            service_override_ms,
        }
    }

    pub fn queue(&mut self) {
        debug_assert_eq!(self.state, VisitorState::Arrived);
        self.state = VisitorState::Queued;
    }

    /// Move onto the ride at `now`.
    pub fn board(&mut self, now: u64, service_ms: u64) {
        debug_assert!(matches!(
            self.state,
            VisitorState::Arrived | VisitorState::Queued
        ));
        self.state = VisitorState::Riding;
        self.ride_started_at = Some(now);
        self.service_ms = Some(service_ms);
    }

    pub fn depart(&mut self) {
        debug_assert_eq!(self.state, VisitorState::Riding);
        self.state = VisitorState::Departed;
    }

    /// Queueing delay, known once the visitor has boarded.
    pub fn wait_ms(&self) -> Option<u64> {
        self.ride_started_at
            .map(|started| started.saturating_sub(self.arrived_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visitor_walks_through_lifecycle() {
        let mut visitor = Visitor::arrive(0, RideId(1), 1_000, None);
        assert_eq!(visitor.state, VisitorState::Arrived);
        assert_eq!(visitor.wait_ms(), None);

        visitor.queue();
        assert_eq!(visitor.state, VisitorState::Queued);

        visitor.board(4_000, 2_000);
        assert_eq!(visitor.state, VisitorState::Riding);
        assert_eq!(visitor.wait_ms(), Some(3_000));
        assert_eq!(visitor.service_ms, Some(2_000));

        visitor.depart();
        assert_eq!(visitor.state, VisitorState::Departed);
    }
}
