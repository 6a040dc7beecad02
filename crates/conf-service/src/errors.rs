//! Conference controller error types.
//!
//! Command failures surface synchronously to the immediate caller only.
//! Event handlers never return errors: an event a handler cannot use is
//! ignored, because at-least-once fan-out delivery is assumed.

use crate::conference::state::ConferencePhase;
use crate::stasis::ControlPlaneError;
use thiserror::Error;

/// Conference controller error type.
#[derive(Debug, Error)]
pub enum ConfError {
    /// The conference is not in a phase that accepts new participants.
    #[error("Conference is not accepting participants (phase: {0})")]
    AdmissionClosed(ConferencePhase),

    /// A control-plane command was rejected.
    #[error("Control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    /// Conference not found.
    #[error("Conference not found: {0}")]
    ConferenceNotFound(String),

    /// Conflict error (e.g., channel already admitted).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The registry is draining (graceful shutdown).
    #[error("Registry is draining")]
    Draining,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
