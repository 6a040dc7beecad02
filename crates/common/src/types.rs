//! Typed identifiers for Switchroom components.
//!
//! The control plane addresses everything by plain strings; wrapping them
//! keeps a bridge id from ever being handed to a channel operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a conference.
///
/// The mixing bridge owned by a conference uses the same value, rendered as
/// a string, as its bridge id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConferenceId(pub Uuid);

impl ConferenceId {
    /// Create a new random conference ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The bridge id shared with this conference's mixing bridge.
    #[must_use]
    pub fn bridge_id(&self) -> BridgeId {
        BridgeId(self.0.to_string())
    }
}

impl Default for ConferenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a mixing bridge in the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BridgeId(pub String);

/// Identifier of one call leg in the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Identifier of an in-flight media playback.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaybackId(pub String);

/// Name of a stored or in-flight recording.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingName(pub String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            /// View the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $ty {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(BridgeId);
string_id!(ChannelId);
string_id!(PlaybackId);
string_id!(RecordingName);

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conference_and_bridge_share_identity() {
        let id = ConferenceId::new();
        assert_eq!(id.bridge_id().as_str(), id.0.to_string());
        assert_eq!(id.bridge_id(), id.bridge_id());
    }

    #[test]
    fn test_string_ids_do_not_cross() {
        let channel = ChannelId::from("PJSIP/alice-00000001");
        assert_eq!(channel.as_str(), "PJSIP/alice-00000001");
        assert_eq!(channel.to_string(), "PJSIP/alice-00000001");
    }

    #[test]
    fn test_ids_serialize_transparently_enough() {
        let bridge = BridgeId::from("b-1");
        let json = serde_json::to_string(&bridge).unwrap();
        let back: BridgeId = serde_json::from_str(&json).unwrap();
        assert_eq!(bridge, back);
    }
}
