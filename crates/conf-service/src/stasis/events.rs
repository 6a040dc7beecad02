//! Asynchronous control-plane events.
//!
//! Events are push-delivered by the control plane with at-least-once
//! semantics and no ordering guarantee across kinds. Consumers must treat
//! duplicates and events for unknown entities as no-ops.

use common::types::{BridgeId, ChannelId, RecordingName};
use serde::{Deserialize, Serialize};

/// A lifecycle event pushed by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StasisEvent {
    /// A bridge came into existence. Observed to be unreliable on some
    /// control planes; consumers must not depend on it arriving.
    BridgeCreated {
        /// Id of the created bridge.
        bridge_id: BridgeId,
    },

    /// A bridge was torn down.
    BridgeDestroyed {
        /// Id of the destroyed bridge.
        bridge_id: BridgeId,
    },

    /// A channel was mixed into a bridge.
    ChannelEnteredBridge {
        /// Bridge the channel entered.
        bridge_id: BridgeId,
        /// The entering channel.
        channel_id: ChannelId,
    },

    /// A channel left a bridge (removed or hung up).
    ChannelLeftBridge {
        /// Bridge the channel left.
        bridge_id: BridgeId,
        /// The departing channel.
        channel_id: ChannelId,
    },

    /// A DTMF digit was pressed on a channel.
    ChannelDtmfReceived {
        /// Channel the digit arrived on.
        channel_id: ChannelId,
        /// The digit, `0`-`9`, `*`, `#`, or `A`-`D`.
        digit: char,
    },

    /// A channel recording completed and was stored.
    RecordingFinished {
        /// Name the recording was stored under.
        recording_name: RecordingName,
    },
}

impl StasisEvent {
    /// Short kind label for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            StasisEvent::BridgeCreated { .. } => "bridge_created",
            StasisEvent::BridgeDestroyed { .. } => "bridge_destroyed",
            StasisEvent::ChannelEnteredBridge { .. } => "channel_entered_bridge",
            StasisEvent::ChannelLeftBridge { .. } => "channel_left_bridge",
            StasisEvent::ChannelDtmfReceived { .. } => "channel_dtmf_received",
            StasisEvent::RecordingFinished { .. } => "recording_finished",
        }
    }

    /// The bridge this event concerns, if it is bridge-scoped.
    #[must_use]
    pub fn bridge_id(&self) -> Option<&BridgeId> {
        match self {
            StasisEvent::BridgeCreated { bridge_id }
            | StasisEvent::BridgeDestroyed { bridge_id }
            | StasisEvent::ChannelEnteredBridge { bridge_id, .. }
            | StasisEvent::ChannelLeftBridge { bridge_id, .. } => Some(bridge_id),
            StasisEvent::ChannelDtmfReceived { .. } | StasisEvent::RecordingFinished { .. } => None,
        }
    }

    /// The channel this event concerns, if any.
    #[must_use]
    pub fn channel_id(&self) -> Option<&ChannelId> {
        match self {
            StasisEvent::ChannelEnteredBridge { channel_id, .. }
            | StasisEvent::ChannelLeftBridge { channel_id, .. }
            | StasisEvent::ChannelDtmfReceived { channel_id, .. } => Some(channel_id),
            StasisEvent::BridgeCreated { .. }
            | StasisEvent::BridgeDestroyed { .. }
            | StasisEvent::RecordingFinished { .. } => None,
        }
    }

    /// The recording this event concerns, if any.
    #[must_use]
    pub fn recording_name(&self) -> Option<&RecordingName> {
        match self {
            StasisEvent::RecordingFinished { recording_name } => Some(recording_name),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scoping_accessors() {
        let entered = StasisEvent::ChannelEnteredBridge {
            bridge_id: BridgeId::from("b-1"),
            channel_id: ChannelId::from("c-1"),
        };
        assert_eq!(entered.bridge_id(), Some(&BridgeId::from("b-1")));
        assert_eq!(entered.channel_id(), Some(&ChannelId::from("c-1")));
        assert_eq!(entered.recording_name(), None);

        let dtmf = StasisEvent::ChannelDtmfReceived {
            channel_id: ChannelId::from("c-2"),
            digit: '5',
        };
        assert_eq!(dtmf.bridge_id(), None);
        assert_eq!(dtmf.channel_id(), Some(&ChannelId::from("c-2")));
    }

    #[test]
    fn test_wire_shape() {
        let event = StasisEvent::RecordingFinished {
            recording_name: RecordingName::from("conftemp-sales-c1"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "recording_finished");
        assert_eq!(json["recording_name"], "conftemp-sales-c1");

        let back: StasisEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_kind_labels() {
        let destroyed = StasisEvent::BridgeDestroyed {
            bridge_id: BridgeId::from("b-9"),
        };
        assert_eq!(destroyed.kind(), "bridge_destroyed");
    }
}
