//! Actor model implementation for the conference controller.
//!
//! This module implements the actor hierarchy:
//!
//! ```text
//! RegistryActor (singleton per process)
//! └── supervises N ConferenceActors
//!     └── ConferenceActor (one per conference)
//!         ├── owns the mixing bridge and participant roster
//!         └── consumes routed control-plane events
//! ```
//!
//! # Key Design Decisions
//!
//! - **Single writer per conference**: every command and event for one
//!   conference is processed on its actor task, so the roster needs no
//!   locking
//! - **CancellationToken propagation**: the registry passes child tokens
//!   for graceful shutdown
//! - **Fire-and-forget commands**: nothing in an actor blocks waiting for
//!   a control-plane event; confirmations (when they come) arrive as
//!   ordinary mailbox messages
//!
//! # Modules
//!
//! - [`registry`] - `RegistryActor` singleton that supervises conferences
//! - [`conference`] - `ConferenceActor` per conference, owns the roster
//! - [`participant`] - roster entries and the DTMF key menu
//! - [`messages`] - Message types for actor communication
//! - [`state`] - Lifecycle phase, mute policy, participant state enums

pub mod conference;
pub mod messages;
pub mod participant;
pub mod registry;
pub mod state;

// Re-export primary types
pub use conference::{ConferenceActor, ConferenceHandle};
pub use messages::{ConferenceSnapshot, ParticipantInfo, RegistryStatus};
pub use participant::DigitAction;
pub use registry::{RegistryActor, RegistryHandle};
pub use state::{ConferencePhase, MutePolicy, ParticipantState};
