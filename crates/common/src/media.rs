//! Media URI addressing.
//!
//! The control plane plays audio from two address families: `sound:<name>`
//! for static prompt assets installed on the media host, and
//! `recording:<name>` for audio captured at runtime.

use crate::types::RecordingName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A playable media address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaUri {
    /// A static prompt asset, e.g. `sound:conf-hasjoin`.
    Sound(String),
    /// A stored recording captured earlier in the call.
    Recording(RecordingName),
}

impl MediaUri {
    /// A `sound:` URI for a named prompt.
    #[must_use]
    pub fn sound(name: impl Into<String>) -> Self {
        Self::Sound(name.into())
    }

    /// A `recording:` URI for a stored recording.
    #[must_use]
    pub fn recording(name: RecordingName) -> Self {
        Self::Recording(name)
    }
}

impl fmt::Display for MediaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaUri::Sound(name) => write!(f, "sound:{name}"),
            MediaUri::Recording(name) => write!(f, "recording:{name}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_uri_rendering() {
        assert_eq!(MediaUri::sound("conf-hasjoin").to_string(), "sound:conf-hasjoin");
    }

    #[test]
    fn test_recording_uri_rendering() {
        let uri = MediaUri::recording(RecordingName::from("conftemp-sales-chan1"));
        assert_eq!(uri.to_string(), "recording:conftemp-sales-chan1");
    }
}
