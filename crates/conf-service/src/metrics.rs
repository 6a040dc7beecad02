//! Lightweight service counters.
//!
//! Shared between the actor system (which updates values) and the event
//! router (which counts delivery outcomes). All fields are atomic for
//! lock-free concurrent access; a snapshot gives a consistent-enough view
//! for logging and tests.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Aggregated metrics for the conference service.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    /// Conferences currently active.
    active_conferences: AtomicUsize,
    /// Participants currently tracked across all conferences.
    active_participants: AtomicUsize,
    /// Total control-plane events delivered to a conference mailbox.
    events_routed: AtomicU64,
    /// Total control-plane events that matched no registered entity.
    events_unmatched: AtomicU64,
    /// Total actor panics (indicates bugs).
    actor_panics: AtomicU64,
}

/// Snapshot of service metrics at a point in time.
#[derive(Debug, Clone, Copy)]
pub struct ServiceMetricsSnapshot {
    /// Conferences currently active.
    pub conferences: usize,
    /// Participants currently tracked.
    pub participants: usize,
    /// Events delivered to a conference mailbox.
    pub events_routed: u64,
    /// Events that matched no registered entity.
    pub events_unmatched: u64,
}

impl ServiceMetrics {
    /// Create a new shared metrics instance.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Increment the active conference count.
    pub fn conference_created(&self) {
        self.active_conferences.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the active conference count.
    pub fn conference_removed(&self) {
        self.active_conferences.fetch_sub(1, Ordering::Relaxed);
    }

    /// Increment the tracked participant count.
    pub fn participant_joined(&self) {
        self.active_participants.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement the tracked participant count.
    pub fn participant_left(&self) {
        self.active_participants.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record an event delivered to a conference mailbox.
    pub fn event_routed(&self) {
        self.events_routed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an event that matched no registered entity.
    pub fn event_unmatched(&self) {
        self.events_unmatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an actor panic.
    pub fn record_panic(&self) {
        self.actor_panics.fetch_add(1, Ordering::Relaxed);
        tracing::error!(
            target: "conf.actor.panic",
            total_panics = self.actor_panics.load(Ordering::Relaxed),
            "Actor panic detected - indicates bug, investigation required"
        );
    }

    /// Get the current panic count.
    #[must_use]
    pub fn panics(&self) -> u64 {
        self.actor_panics.load(Ordering::Relaxed)
    }

    /// Take a snapshot of current metrics.
    #[must_use]
    pub fn snapshot(&self) -> ServiceMetricsSnapshot {
        ServiceMetricsSnapshot {
            conferences: self.active_conferences.load(Ordering::Relaxed),
            participants: self.active_participants.load(Ordering::Relaxed),
            events_routed: self.events_routed.load(Ordering::Relaxed),
            events_unmatched: self.events_unmatched.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_move_both_ways() {
        let metrics = ServiceMetrics::new();

        metrics.conference_created();
        metrics.conference_created();
        metrics.conference_removed();
        metrics.participant_joined();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.conferences, 1);
        assert_eq!(snapshot.participants, 1);
    }

    #[test]
    fn test_event_outcome_counters() {
        let metrics = ServiceMetrics::new();

        metrics.event_routed();
        metrics.event_routed();
        metrics.event_unmatched();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.events_routed, 2);
        assert_eq!(snapshot.events_unmatched, 1);
    }
}
