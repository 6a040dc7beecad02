//! Switchroom Conference Controller Library
//!
//! This library coordinates multi-party audio conferences on top of an
//! external telephony control plane that exposes call legs (channels),
//! mixing points (bridges), media playback, recording, and DTMF as
//! asynchronous events plus imperative commands:
//!
//! - Mixing-bridge lifecycle (create, hold music, teardown)
//! - Participant admission with a two-phase join (name recording first,
//!   bridge entry only after the recording completes)
//! - Join/leave announcements and hold-music transitions
//! - Defensive handling of at-least-once, unordered event delivery
//!
//! # Architecture
//!
//! The orchestration is purely reactive and uses an actor hierarchy:
//!
//! ```text
//! RegistryActor (singleton per process)
//! ├── supervises N ConferenceActors
//! │   └── ConferenceActor (one per conference)
//! │       ├── owns the mixing bridge and the participant roster
//! │       └── consumes routed control-plane events
//! └── EventRouter (identity-keyed event fan-in, shared)
//! ```
//!
//! All state for one conference lives inside its actor task, so event
//! handlers and command calls for that conference are naturally serialized.
//! The control plane is consumed through the [`stasis::ControlPlane`] trait;
//! the embedding application owns the transport and pumps decoded events
//! into the [`stasis::EventRouter`].
//!
//! # Modules
//!
//! - [`conference`] - Registry, conference actor, participant roster
//! - [`stasis`] - Control-plane commands, events, and the event router
//! - [`config`] - Service configuration from environment
//! - [`errors`] - Error types
//! - [`metrics`] - Lightweight service counters

pub mod conference;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod stasis;
