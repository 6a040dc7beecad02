//! Control-plane boundary.
//!
//! The telephony control plane is consumed through two halves:
//!
//! - [`commands`] - the imperative half: an async [`ControlPlane`] trait the
//!   orchestration drives fire-and-forget. A returned `Result` reports only
//!   whether the command was accepted; effects are confirmed (if at all) by
//!   a later event.
//! - [`events`] - the asynchronous half: typed lifecycle events pushed by
//!   the control plane, delivered at-least-once and without cross-kind
//!   ordering guarantees.
//! - [`router`] - identity-keyed fan-in: routes each inbound event to the
//!   conference that registered the bridge, channel, or recording it names.
//!
//! The concrete transport (WebSocket, HTTP, in-process mock) is the
//! embedding application's concern.

pub mod commands;
pub mod events;
pub mod router;

// Re-export primary types
pub use commands::{
    AudioDirection, Bridge, BridgeKind, ControlPlane, ControlPlaneError, LiveRecording, Playback,
    RecordingSpec,
};
pub use events::StasisEvent;
pub use router::EventRouter;
