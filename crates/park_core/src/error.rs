//! Error taxonomy for the simulation core.
//!
//! Every variant except [SimError::QueueExhausted] aborts the current run: once event
//! ordering or ride accounting is corrupted, no later statistic can be trusted.

use bevy_ecs::prelude::{Entity, Resource};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// An event was scheduled before the current clock time.
    #[error("cannot schedule event at {at_ms} ms: clock is already at {now_ms} ms")]
    InvalidTime { at_ms: u64, now_ms: u64 },
    /// A ride was released while nobody was on it.
    #[error("ride '{ride}' released with zero occupancy")]
    ResourceUnderflow { ride: String },
    /// The event queue is empty. The driver treats this as a normal end of run.
    #[error("event queue exhausted")]
    QueueExhausted,
    /// Scenario rejected before any simulated time advanced.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// An event referenced a visitor entity that no longer exists.
    #[error("event references missing visitor {0:?}")]
    MissingVisitor(Entity),
}

impl SimError {
    pub fn config(message: impl Into<String>) -> Self {
        SimError::Configuration(message.into())
    }
}

/// First fatal error raised inside a system during the current step.
///
/// Systems cannot return errors through the schedule, so they park the error here and the
/// runner aborts the run after the step completes.
#[derive(Debug, Default, Resource)]
pub struct SimulationFault(Option<SimError>);

impl SimulationFault {
    /// Record an error. Only the first error of a run is kept.
    pub fn record(&mut self, error: SimError) {
        if self.0.is_none() {
            tracing::error!(%error, "simulation fault");
            self.0 = Some(error);
        }
    }

    pub fn take(&mut self) -> Option<SimError> {
        self.0.take()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}
