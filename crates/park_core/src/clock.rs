//! Simulation clock and event queue.
//!
//! Time is a `u64` count of milliseconds since the start of the run. Events are popped in
//! timestamp order; equal timestamps pop in insertion order via a monotonic sequence number,
//! so a given seed always produces the same interleaving.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

use crate::error::SimError;

pub const ONE_SEC_MS: u64 = 1000;
pub const ONE_MIN_MS: u64 = 60 * ONE_SEC_MS;

/// Convert whole or fractional minutes to simulation milliseconds (rounded).
pub fn minutes_to_ms(minutes: f64) -> u64 {
    if !minutes.is_finite() || minutes <= 0.0 {
        return 0;
    }
    (minutes * ONE_MIN_MS as f64).round() as u64
}

/// Convert simulation milliseconds to minutes.
pub fn ms_to_minutes(ms: u64) -> f64 {
    ms as f64 / ONE_MIN_MS as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SimulationStarted,
    VisitorArrival,
    RideCompleted,
}

/// What an event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Visitor(Entity),
    /// Index into [crate::scenario::ScriptedArrivals].
    Scripted(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub seq: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being handled by the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Enqueue an event at an absolute timestamp.
    ///
    /// # Errors
    ///
    /// [SimError::InvalidTime] if `timestamp` is earlier than the current time.
    pub fn schedule_at(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimError> {
        if timestamp < self.now {
            return Err(SimError::InvalidTime {
                at_ms: timestamp,
                now_ms: self.now,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            seq,
            kind,
            subject,
        });
        Ok(())
    }

    /// Enqueue an event `delay_ms` after the current time.
    pub fn schedule_in(
        &mut self,
        delay_ms: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimError> {
        let timestamp = self.now.checked_add(delay_ms).ok_or(SimError::InvalidTime {
            at_ms: u64::MAX,
            now_ms: self.now,
        })?;
        self.schedule_at(timestamp, kind, subject)
    }

    pub fn schedule_in_mins(
        &mut self,
        minutes: u64,
        kind: EventKind,
        subject: Option<EventSubject>,
    ) -> Result<(), SimError> {
        self.schedule_in(minutes.saturating_mul(ONE_MIN_MS), kind, subject)
    }

    /// Pop the earliest event and move the clock to its timestamp.
    ///
    /// # Errors
    ///
    /// [SimError::QueueExhausted] when no event is pending.
    pub fn advance(&mut self) -> Result<Event, SimError> {
        let event = self.events.pop().ok_or(SimError::QueueExhausted)?;
        debug_assert!(event.timestamp >= self.now, "clock moved backwards");
        self.now = event.timestamp;
        Ok(event)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
