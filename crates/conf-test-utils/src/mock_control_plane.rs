//! Mock control plane for conference testing.
//!
//! Records every issued command in order and can be scripted to reject
//! specific command kinds, so tests can drive the orchestration through
//! failure paths without real telephony infrastructure.
//!
//! # Example
//!
//! ```rust,ignore
//! use conf_test_utils::MockControlPlane;
//!
//! let control = MockControlPlane::builder()
//!     .fail_create_bridge()
//!     .build();
//!
//! // ... drive the conference, then flip the failure off and retry:
//! control.set_fail_create_bridge(false);
//! ```

use async_trait::async_trait;
use conf_service::stasis::{
    AudioDirection, Bridge, BridgeKind, ControlPlane, ControlPlaneError, LiveRecording, Playback,
    RecordingSpec,
};
use common::media::MediaUri;
use common::types::{BridgeId, ChannelId, PlaybackId, RecordingName};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// One command the orchestration issued, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedCommand {
    CreateBridge {
        kind: BridgeKind,
        bridge: BridgeId,
    },
    DestroyBridge {
        bridge: BridgeId,
    },
    Subscribe {
        app: String,
        resource: String,
    },
    StartMoh {
        bridge: BridgeId,
        class: String,
    },
    StopMoh {
        bridge: BridgeId,
    },
    AddChannel {
        bridge: BridgeId,
        channel: ChannelId,
        role: String,
    },
    RemoveChannel {
        bridge: BridgeId,
        channel: ChannelId,
    },
    PlayOnBridge {
        bridge: BridgeId,
        media: String,
        lang: String,
    },
    PlayOnChannel {
        channel: ChannelId,
        media: String,
        lang: String,
    },
    Answer {
        channel: ChannelId,
    },
    Mute {
        channel: ChannelId,
        direction: AudioDirection,
    },
    Unmute {
        channel: ChannelId,
        direction: AudioDirection,
    },
    Record {
        channel: ChannelId,
        name: RecordingName,
        format: String,
    },
    DeleteStoredRecording {
        name: RecordingName,
    },
}

/// In-memory control plane recording every command.
#[derive(Debug, Default)]
pub struct MockControlPlane {
    commands: Mutex<Vec<IssuedCommand>>,
    playback_counter: AtomicU64,
    fail_create_bridge: AtomicBool,
    fail_answer: AtomicBool,
    fail_record: AtomicBool,
}

impl MockControlPlane {
    /// Create a new `MockControlPlane` builder.
    #[must_use]
    pub fn builder() -> MockControlPlaneBuilder {
        MockControlPlaneBuilder::default()
    }

    /// Snapshot of every command issued so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<IssuedCommand> {
        self.commands.lock().expect("command log poisoned").clone()
    }

    /// Forget all recorded commands.
    pub fn clear(&self) {
        self.commands.lock().expect("command log poisoned").clear();
    }

    /// Script bridge creation to fail (or recover).
    pub fn set_fail_create_bridge(&self, fail: bool) {
        self.fail_create_bridge.store(fail, Ordering::SeqCst);
    }

    /// Script channel answering to fail (or recover).
    pub fn set_fail_answer(&self, fail: bool) {
        self.fail_answer.store(fail, Ordering::SeqCst);
    }

    /// Script channel recording to fail (or recover).
    pub fn set_fail_record(&self, fail: bool) {
        self.fail_record.store(fail, Ordering::SeqCst);
    }

    /// Whether hold music is currently running on a bridge, judged from
    /// the command log.
    #[must_use]
    pub fn moh_running(&self, bridge: &BridgeId) -> bool {
        let commands = self.commands.lock().expect("command log poisoned");
        let mut running = false;
        for command in commands.iter() {
            match command {
                IssuedCommand::StartMoh { bridge: b, .. } if b == bridge => running = true,
                IssuedCommand::StopMoh { bridge: b } if b == bridge => running = false,
                _ => {}
            }
        }
        running
    }

    /// Media strings played to a bridge, in order.
    #[must_use]
    pub fn bridge_playbacks(&self, bridge: &BridgeId) -> Vec<String> {
        self.commands
            .lock()
            .expect("command log poisoned")
            .iter()
            .filter_map(|command| match command {
                IssuedCommand::PlayOnBridge {
                    bridge: b, media, ..
                } if b == bridge => Some(media.clone()),
                _ => None,
            })
            .collect()
    }

    /// Media strings played to a channel, in order.
    #[must_use]
    pub fn channel_playbacks(&self, channel: &ChannelId) -> Vec<String> {
        self.commands
            .lock()
            .expect("command log poisoned")
            .iter()
            .filter_map(|command| match command {
                IssuedCommand::PlayOnChannel {
                    channel: c, media, ..
                } if c == channel => Some(media.clone()),
                _ => None,
            })
            .collect()
    }

    fn log(&self, command: IssuedCommand) {
        self.commands
            .lock()
            .expect("command log poisoned")
            .push(command);
    }

    fn next_playback(&self) -> Playback {
        let n = self.playback_counter.fetch_add(1, Ordering::SeqCst);
        Playback {
            id: PlaybackId(format!("playback-{n}")),
        }
    }
}

#[async_trait]
impl ControlPlane for MockControlPlane {
    async fn create_bridge(
        &self,
        kind: BridgeKind,
        id: &BridgeId,
    ) -> Result<Bridge, ControlPlaneError> {
        if self.fail_create_bridge.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::Rejected(
                "bridge creation disabled by test".to_string(),
            ));
        }
        self.log(IssuedCommand::CreateBridge {
            kind,
            bridge: id.clone(),
        });
        Ok(Bridge {
            id: id.clone(),
            kind,
        })
    }

    async fn destroy_bridge(&self, id: &BridgeId) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::DestroyBridge { bridge: id.clone() });
        Ok(())
    }

    async fn subscribe(&self, app: &str, resource: &str) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::Subscribe {
            app: app.to_string(),
            resource: resource.to_string(),
        });
        Ok(())
    }

    async fn start_moh(&self, bridge: &BridgeId, class: &str) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::StartMoh {
            bridge: bridge.clone(),
            class: class.to_string(),
        });
        Ok(())
    }

    async fn stop_moh(&self, bridge: &BridgeId) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::StopMoh {
            bridge: bridge.clone(),
        });
        Ok(())
    }

    async fn add_channel(
        &self,
        bridge: &BridgeId,
        channel: &ChannelId,
        role: &str,
    ) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::AddChannel {
            bridge: bridge.clone(),
            channel: channel.clone(),
            role: role.to_string(),
        });
        Ok(())
    }

    async fn remove_channel(
        &self,
        bridge: &BridgeId,
        channel: &ChannelId,
    ) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::RemoveChannel {
            bridge: bridge.clone(),
            channel: channel.clone(),
        });
        Ok(())
    }

    async fn play_on_bridge(
        &self,
        bridge: &BridgeId,
        media: &MediaUri,
        lang: &str,
        _offset_ms: u32,
        _skip_ms: u32,
    ) -> Result<Playback, ControlPlaneError> {
        self.log(IssuedCommand::PlayOnBridge {
            bridge: bridge.clone(),
            media: media.to_string(),
            lang: lang.to_string(),
        });
        Ok(self.next_playback())
    }

    async fn play_on_channel(
        &self,
        channel: &ChannelId,
        media: &MediaUri,
        lang: &str,
        _offset_ms: u32,
        _skip_ms: u32,
    ) -> Result<Playback, ControlPlaneError> {
        self.log(IssuedCommand::PlayOnChannel {
            channel: channel.clone(),
            media: media.to_string(),
            lang: lang.to_string(),
        });
        Ok(self.next_playback())
    }

    async fn answer(&self, channel: &ChannelId) -> Result<(), ControlPlaneError> {
        if self.fail_answer.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::Rejected(
                "answer disabled by test".to_string(),
            ));
        }
        self.log(IssuedCommand::Answer {
            channel: channel.clone(),
        });
        Ok(())
    }

    async fn mute(
        &self,
        channel: &ChannelId,
        direction: AudioDirection,
    ) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::Mute {
            channel: channel.clone(),
            direction,
        });
        Ok(())
    }

    async fn unmute(
        &self,
        channel: &ChannelId,
        direction: AudioDirection,
    ) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::Unmute {
            channel: channel.clone(),
            direction,
        });
        Ok(())
    }

    async fn record(
        &self,
        channel: &ChannelId,
        name: &RecordingName,
        spec: &RecordingSpec,
    ) -> Result<LiveRecording, ControlPlaneError> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::Rejected(
                "recording disabled by test".to_string(),
            ));
        }
        self.log(IssuedCommand::Record {
            channel: channel.clone(),
            name: name.clone(),
            format: spec.format.clone(),
        });
        Ok(LiveRecording { name: name.clone() })
    }

    async fn delete_stored_recording(&self, name: &RecordingName) -> Result<(), ControlPlaneError> {
        self.log(IssuedCommand::DeleteStoredRecording { name: name.clone() });
        Ok(())
    }
}

/// Builder for `MockControlPlane` configuration.
#[derive(Debug, Default)]
pub struct MockControlPlaneBuilder {
    fail_create_bridge: bool,
    fail_answer: bool,
    fail_record: bool,
}

impl MockControlPlaneBuilder {
    /// Configure the mock to reject bridge creation.
    #[must_use]
    pub fn fail_create_bridge(mut self) -> Self {
        self.fail_create_bridge = true;
        self
    }

    /// Configure the mock to reject channel answering.
    #[must_use]
    pub fn fail_answer(mut self) -> Self {
        self.fail_answer = true;
        self
    }

    /// Configure the mock to reject channel recording.
    #[must_use]
    pub fn fail_record(mut self) -> Self {
        self.fail_record = true;
        self
    }

    /// Build the configured mock.
    #[must_use]
    pub fn build(self) -> MockControlPlane {
        MockControlPlane {
            commands: Mutex::new(Vec::new()),
            playback_counter: AtomicU64::new(0),
            fail_create_bridge: AtomicBool::new(self.fail_create_bridge),
            fail_answer: AtomicBool::new(self.fail_answer),
            fail_record: AtomicBool::new(self.fail_record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_log_preserves_order() {
        let control = MockControlPlane::builder().build();
        let bridge = BridgeId::from("b-1");

        control
            .create_bridge(BridgeKind::Mixing, &bridge)
            .await
            .unwrap();
        control.start_moh(&bridge, "default").await.unwrap();
        control.stop_moh(&bridge).await.unwrap();

        let commands = control.commands();
        assert_eq!(commands.len(), 3);
        assert!(matches!(commands[0], IssuedCommand::CreateBridge { .. }));
        assert!(matches!(commands[2], IssuedCommand::StopMoh { .. }));
        assert!(!control.moh_running(&bridge));
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let control = MockControlPlane::builder().fail_create_bridge().build();
        let bridge = BridgeId::from("b-1");

        let result = control.create_bridge(BridgeKind::Mixing, &bridge).await;
        assert!(result.is_err());
        assert!(control.commands().is_empty());

        control.set_fail_create_bridge(false);
        assert!(control
            .create_bridge(BridgeKind::Mixing, &bridge)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_playback_helpers_split_by_target() {
        let control = MockControlPlane::builder().build();
        let bridge = BridgeId::from("b-1");
        let channel = ChannelId::from("c-1");

        control
            .play_on_bridge(&bridge, &MediaUri::sound("conf-hasjoin"), "en", 0, 0)
            .await
            .unwrap();
        control
            .play_on_channel(&channel, &MediaUri::sound("conf-onlyperson"), "en", 0, 0)
            .await
            .unwrap();

        assert_eq!(control.bridge_playbacks(&bridge), vec!["sound:conf-hasjoin"]);
        assert_eq!(
            control.channel_playbacks(&channel),
            vec!["sound:conf-onlyperson"]
        );
    }
}
