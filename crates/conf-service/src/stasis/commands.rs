//! Imperative control-plane commands.
//!
//! Every command is fire-and-forget from the orchestration's point of view:
//! an `Ok` means the control plane accepted the command, not that the
//! effect has happened. Where an effect matters to conference state, a
//! later event confirms it (or never arrives, which the state machine must
//! survive).

use async_trait::async_trait;
use common::media::MediaUri;
use common::types::{BridgeId, ChannelId, PlaybackId, RecordingName};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Control-plane command failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControlPlaneError {
    /// The control plane refused the command (bad state, unknown resource).
    #[error("Command rejected by control plane: {0}")]
    Rejected(String),

    /// The command never reached the control plane.
    #[error("Control plane transport error: {0}")]
    Transport(String),
}

/// Kind of bridge to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeKind {
    /// Mixes the audio of every channel in the bridge.
    Mixing,
    /// Parks channels with hold music, no mixing.
    Holding,
}

impl BridgeKind {
    /// Wire representation of the bridge kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BridgeKind::Mixing => "mixing",
            BridgeKind::Holding => "holding",
        }
    }
}

/// A bridge handle returned by bridge creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    /// Bridge id (for conference bridges, equal to the conference id).
    pub id: BridgeId,
    /// Kind the bridge was created as.
    pub kind: BridgeKind,
}

/// A playback handle returned by play commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playback {
    /// Playback id assigned by the control plane.
    pub id: PlaybackId,
}

/// A live recording handle returned by record commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveRecording {
    /// Recording name; also the correlation key for `RecordingFinished`.
    pub name: RecordingName,
}

/// Which audio direction a mute applies to, seen from the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioDirection {
    /// Audio from the party into the bridge.
    In,
    /// Audio from the bridge to the party.
    Out,
    /// Both directions.
    Both,
}

impl AudioDirection {
    /// Wire representation of the direction.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AudioDirection::In => "in",
            AudioDirection::Out => "out",
            AudioDirection::Both => "both",
        }
    }
}

/// Parameters for a channel recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSpec {
    /// Container format, e.g. "wav".
    pub format: String,
    /// Hard cap on recording length in seconds.
    pub max_duration_seconds: u32,
    /// Stop after this much trailing silence, in seconds.
    pub max_silence_seconds: u32,
    /// Play a beep before recording starts.
    pub beep: bool,
    /// DTMF digit that terminates the recording, if any.
    pub terminate_on: Option<char>,
}

/// The imperative half of the control plane.
///
/// Implementations serialize these calls onto whatever transport the
/// deployment uses. The orchestration never blocks on a correlated event
/// inside a command call.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Create a bridge with the given kind and id.
    async fn create_bridge(
        &self,
        kind: BridgeKind,
        id: &BridgeId,
    ) -> Result<Bridge, ControlPlaneError>;

    /// Destroy a bridge. Unknown bridges are a control-plane-side no-op.
    async fn destroy_bridge(&self, id: &BridgeId) -> Result<(), ControlPlaneError>;

    /// Subscribe the named application to events for a resource
    /// (e.g. `bridge:<id>`).
    async fn subscribe(&self, app: &str, resource: &str) -> Result<(), ControlPlaneError>;

    /// Start music-on-hold on a bridge.
    async fn start_moh(&self, bridge: &BridgeId, class: &str) -> Result<(), ControlPlaneError>;

    /// Stop music-on-hold on a bridge. Stopping idle hold music is fine.
    async fn stop_moh(&self, bridge: &BridgeId) -> Result<(), ControlPlaneError>;

    /// Add a channel to a bridge under the given role.
    async fn add_channel(
        &self,
        bridge: &BridgeId,
        channel: &ChannelId,
        role: &str,
    ) -> Result<(), ControlPlaneError>;

    /// Remove a channel from a bridge.
    async fn remove_channel(
        &self,
        bridge: &BridgeId,
        channel: &ChannelId,
    ) -> Result<(), ControlPlaneError>;

    /// Play media to every channel in a bridge.
    async fn play_on_bridge(
        &self,
        bridge: &BridgeId,
        media: &MediaUri,
        lang: &str,
        offset_ms: u32,
        skip_ms: u32,
    ) -> Result<Playback, ControlPlaneError>;

    /// Play media to a single channel.
    async fn play_on_channel(
        &self,
        channel: &ChannelId,
        media: &MediaUri,
        lang: &str,
        offset_ms: u32,
        skip_ms: u32,
    ) -> Result<Playback, ControlPlaneError>;

    /// Answer a ringing channel.
    async fn answer(&self, channel: &ChannelId) -> Result<(), ControlPlaneError>;

    /// Mute a channel in the given direction.
    async fn mute(
        &self,
        channel: &ChannelId,
        direction: AudioDirection,
    ) -> Result<(), ControlPlaneError>;

    /// Unmute a channel in the given direction.
    async fn unmute(
        &self,
        channel: &ChannelId,
        direction: AudioDirection,
    ) -> Result<(), ControlPlaneError>;

    /// Record a channel into a named stored recording.
    async fn record(
        &self,
        channel: &ChannelId,
        name: &RecordingName,
        spec: &RecordingSpec,
    ) -> Result<LiveRecording, ControlPlaneError>;

    /// Delete a stored recording. Unknown names are a control-plane-side
    /// no-op.
    async fn delete_stored_recording(&self, name: &RecordingName) -> Result<(), ControlPlaneError>;
}
