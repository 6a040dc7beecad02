//! Identity-keyed event routing.
//!
//! The control plane pushes one flat stream of events; the router fans them
//! in to the conference that registered the bridge, channel, or recording
//! the event names. Conferences claim channel and recording identities as
//! they start tracking them and release them when they stop, so a stale
//! event after release simply matches nothing and is dropped.
//!
//! Routing is a delivery optimization, not a correctness boundary: events
//! are at-least-once, so conference handlers still validate every event
//! against their own state before acting on it.

use crate::conference::conference::ConferenceHandle;
use crate::metrics::ServiceMetrics;
use common::types::{BridgeId, ChannelId, RecordingName};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, trace};

use super::events::StasisEvent;

/// A channel or recording claim held by one conference.
#[derive(Clone)]
struct Claim {
    owner: BridgeId,
    handle: ConferenceHandle,
}

/// Routes inbound control-plane events to conference mailboxes.
pub struct EventRouter {
    /// Bridge-scoped routes, one per live conference.
    bridges: DashMap<BridgeId, ConferenceHandle>,
    /// Channel claims for DTMF routing.
    channels: DashMap<ChannelId, Claim>,
    /// Recording claims for completion routing.
    recordings: DashMap<RecordingName, Claim>,
    /// Shared service metrics.
    metrics: Arc<ServiceMetrics>,
}

impl EventRouter {
    /// Create a new router.
    #[must_use]
    pub fn new(metrics: Arc<ServiceMetrics>) -> Arc<Self> {
        Arc::new(Self {
            bridges: DashMap::new(),
            channels: DashMap::new(),
            recordings: DashMap::new(),
            metrics,
        })
    }

    /// Register a conference for its bridge-scoped events.
    pub fn register_bridge(&self, handle: ConferenceHandle) {
        debug!(
            target: "conf.router",
            bridge_id = %handle.bridge_id(),
            conference = %handle.name(),
            "Registered bridge route"
        );
        self.bridges.insert(handle.bridge_id().clone(), handle);
    }

    /// Claim a channel identity for a conference.
    pub fn claim_channel(&self, channel: ChannelId, handle: ConferenceHandle) {
        self.channels.insert(
            channel,
            Claim {
                owner: handle.bridge_id().clone(),
                handle,
            },
        );
    }

    /// Release a channel claim.
    pub fn release_channel(&self, channel: &ChannelId) {
        self.channels.remove(channel);
    }

    /// Claim a recording name for a conference.
    pub fn claim_recording(&self, recording: RecordingName, handle: ConferenceHandle) {
        self.recordings.insert(
            recording,
            Claim {
                owner: handle.bridge_id().clone(),
                handle,
            },
        );
    }

    /// Release a recording claim.
    pub fn release_recording(&self, recording: &RecordingName) {
        self.recordings.remove(recording);
    }

    /// Remove every route belonging to a conference.
    ///
    /// Called when the conference reaches `Destroyed` so late events cannot
    /// be delivered to (or leak references of) a finished actor.
    pub fn unregister_conference(&self, bridge: &BridgeId) {
        self.bridges.remove(bridge);
        self.channels.retain(|_, claim| claim.owner != *bridge);
        self.recordings.retain(|_, claim| claim.owner != *bridge);
        debug!(target: "conf.router", bridge_id = %bridge, "Unregistered conference routes");
    }

    /// Route one inbound event to the owning conference, if any.
    ///
    /// Events that match no registered identity are counted and dropped;
    /// with at-least-once fan-out delivery that is normal traffic, not an
    /// error.
    pub async fn dispatch(&self, event: StasisEvent) {
        let target = self.target_for(&event);

        match target {
            Some(handle) => {
                if handle.deliver_event(event).await {
                    self.metrics.event_routed();
                } else {
                    // Mailbox already closed; the conference finished
                    // between lookup and delivery.
                    self.metrics.event_unmatched();
                }
            }
            None => {
                trace!(
                    target: "conf.router",
                    kind = event.kind(),
                    "Dropped event matching no registered entity"
                );
                self.metrics.event_unmatched();
            }
        }
    }

    /// Look up the conference an event belongs to.
    ///
    /// Handles are cloned out of the maps so no shard guard is held across
    /// the delivery await.
    fn target_for(&self, event: &StasisEvent) -> Option<ConferenceHandle> {
        if let Some(bridge_id) = event.bridge_id() {
            return self.bridges.get(bridge_id).map(|r| r.value().clone());
        }
        if let Some(channel_id) = event.channel_id() {
            return self
                .channels
                .get(channel_id)
                .map(|r| r.value().handle.clone());
        }
        if let Some(recording) = event.recording_name() {
            return self
                .recordings
                .get(recording)
                .map(|r| r.value().handle.clone());
        }
        None
    }

    /// Number of registered bridge routes (for health/debugging).
    #[must_use]
    pub fn bridge_route_count(&self) -> usize {
        self.bridges.len()
    }

    /// Number of live channel claims (for health/debugging).
    #[must_use]
    pub fn channel_claim_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of live recording claims (for health/debugging).
    #[must_use]
    pub fn recording_claim_count(&self) -> usize {
        self.recordings.len()
    }
}
