//! Message types for actor communication.
//!
//! All inter-actor communication uses strongly-typed message passing via
//! `tokio::sync::mpsc`. Request-reply commands carry a `tokio::sync::oneshot`
//! sender; routed control-plane events are fire-and-forget.

use super::conference::ConferenceHandle;
use super::state::{ConferencePhase, MutePolicy, ParticipantState};
use crate::errors::ConfError;
use crate::stasis::StasisEvent;
use common::types::{BridgeId, ChannelId, ConferenceId, RecordingName};
use tokio::sync::oneshot;

/// Messages sent to `RegistryActor`.
#[derive(Debug)]
pub enum RegistryMessage {
    /// Create a new conference actor with the given display name.
    CreateConference {
        name: String,
        /// Response channel for the conference handle or error.
        respond_to: oneshot::Sender<Result<ConferenceHandle, ConfError>>,
    },

    /// Get a handle to an existing conference by id.
    GetConference {
        id: ConferenceId,
        /// Response channel for the conference handle or error.
        respond_to: oneshot::Sender<Result<ConferenceHandle, ConfError>>,
    },

    /// Find a conference by display name (names are unique per registry).
    FindByName {
        name: String,
        /// Response channel; `None` when no conference has that name.
        respond_to: oneshot::Sender<Option<ConferenceHandle>>,
    },

    /// Drop a conference from the registry (after it reached `Destroyed`).
    RemoveConference {
        id: ConferenceId,
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Get current registry status (for health checks).
    GetStatus {
        /// Response channel for registry status.
        respond_to: oneshot::Sender<RegistryStatus>,
    },

    /// Initiate graceful shutdown.
    Shutdown {
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },
}

/// Messages sent to `ConferenceActor`.
#[derive(Debug)]
pub enum ConferenceMessage {
    /// Create the mixing bridge and open the conference.
    Start {
        /// Response channel for the start result.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Admit a call leg into the conference.
    AddUser {
        channel: ChannelId,
        /// Response channel for the admission result.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Remove a call leg. Unknown channels are a no-op.
    RemoveUser {
        channel: ChannelId,
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Mute every current participant inbound.
    MuteAll {
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Unmute every current participant inbound.
    UnmuteAll {
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Tear the conference down.
    Destroy {
        /// Response channel for confirmation.
        respond_to: oneshot::Sender<Result<(), ConfError>>,
    },

    /// Get current conference state (for debugging/health).
    GetSnapshot {
        /// Response channel for the snapshot.
        respond_to: oneshot::Sender<ConferenceSnapshot>,
    },

    /// A control-plane event routed to this conference.
    Event(StasisEvent),
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Status of the `RegistryActor`.
#[derive(Debug, Clone)]
pub struct RegistryStatus {
    /// Total conferences currently registered.
    pub conference_count: usize,
    /// Whether the registry is draining.
    pub is_draining: bool,
}

/// Current state of a conference (for debugging/health).
#[derive(Debug, Clone)]
pub struct ConferenceSnapshot {
    /// Conference id.
    pub id: ConferenceId,
    /// Display name.
    pub name: String,
    /// Lifecycle phase.
    pub phase: ConferencePhase,
    /// Moderation policy.
    pub policy: MutePolicy,
    /// The owned bridge, once created.
    pub bridge: Option<BridgeId>,
    /// Roster in join order.
    pub participants: Vec<ParticipantInfo>,
    /// Conference creation timestamp (unix seconds).
    pub created_at: i64,
}

impl ConferenceSnapshot {
    /// Number of participants the control plane has confirmed in the bridge.
    #[must_use]
    pub fn in_bridge_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.state == ParticipantState::InBridge)
            .count()
    }
}

/// Information about a participant.
#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    /// The leg's channel identity.
    pub channel: ChannelId,
    /// Join progress.
    pub state: ParticipantState,
    /// Name of the leg's announcement recording.
    pub recording: RecordingName,
    /// Whether the participant muted themselves via DTMF.
    pub self_muted: bool,
}
