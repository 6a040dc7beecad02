//! `ConferenceActor` - per-conference actor that owns conference state.
//!
//! Each `ConferenceActor`:
//! - Owns the mixing bridge handle and the participant roster (join order)
//! - Issues control-plane commands fire-and-forget
//! - Consumes routed control-plane events to advance state
//!
//! # Two-Phase Join
//!
//! Admission answers the leg and records the caller's name; the channel is
//! added to the bridge only after the control plane reports the recording
//! stored. Existing members therefore always hear a name announcement for
//! every leg that appears in the mix.
//!
//! # Event Discipline
//!
//! Events are at-least-once and unordered across kinds. Every handler
//! re-validates that the event concerns an entity this conference still
//! tracks; duplicates and strays are silently ignored.

use crate::config::Config;
use crate::errors::ConfError;
use crate::metrics::ServiceMetrics;
use crate::stasis::{
    AudioDirection, Bridge, BridgeKind, ControlPlane, EventRouter, RecordingSpec, StasisEvent,
};

use super::messages::{ConferenceMessage, ConferenceSnapshot};
use super::participant::{leg_recording_name, DigitAction, Participant};
use super::state::{ConferencePhase, MutePolicy, ParticipantState};

use common::media::MediaUri;
use common::types::{BridgeId, ChannelId, ConferenceId, RecordingName};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

/// Default channel buffer size for the conference mailbox.
const CONFERENCE_CHANNEL_BUFFER: usize = 256;

/// Bridge role assigned to ordinary participants.
const PARTICIPANT_ROLE: &str = "member";

/// Handle to a `ConferenceActor`.
#[derive(Clone)]
pub struct ConferenceHandle {
    sender: mpsc::Sender<ConferenceMessage>,
    cancel_token: CancellationToken,
    id: ConferenceId,
    name: String,
    bridge_id: BridgeId,
}

impl ConferenceHandle {
    /// Get the conference ID.
    #[must_use]
    pub fn id(&self) -> ConferenceId {
        self.id
    }

    /// Get the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the bridge id shared with this conference's mixing bridge.
    #[must_use]
    pub fn bridge_id(&self) -> &BridgeId {
        &self.bridge_id
    }

    /// Create the mixing bridge and open the conference.
    ///
    /// Fails if bridge creation is rejected; the conference then stays in
    /// `Creating` and the call may be retried.
    pub async fn start(&self) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::Start { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Admit a call leg into the conference.
    ///
    /// Succeeds only while the conference phase is `Ready`. The leg is
    /// answered and its name recording started; bridge entry follows once
    /// the recording completes.
    pub async fn add_user(&self, channel: ChannelId) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::AddUser {
                channel,
                respond_to: tx,
            })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Remove a call leg. Unknown channels are a no-op.
    pub async fn remove_user(&self, channel: ChannelId) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::RemoveUser {
                channel,
                respond_to: tx,
            })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Mute every current participant inbound.
    pub async fn mute_all(&self) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::MuteAll { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Unmute every current participant inbound.
    pub async fn unmute_all(&self) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::UnmuteAll { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Tear the conference down.
    ///
    /// Removes every participant and requests bridge destruction. The final
    /// transition to `Destroyed` happens when the control plane confirms
    /// the bridge is gone.
    pub async fn destroy(&self) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::Destroy { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get current conference state.
    pub async fn snapshot(&self) -> Result<ConferenceSnapshot, ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(ConferenceMessage::GetSnapshot { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))
    }

    /// Deliver a routed control-plane event into the mailbox.
    ///
    /// Returns `false` when the mailbox is already closed (conference
    /// finished); the event is then simply lost, which is fine.
    pub async fn deliver_event(&self, event: StasisEvent) -> bool {
        self.sender
            .send(ConferenceMessage::Event(event))
            .await
            .is_ok()
    }

    /// Cancel the conference actor.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

impl std::fmt::Debug for ConferenceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConferenceHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The `ConferenceActor` implementation.
pub struct ConferenceActor {
    /// Conference id.
    id: ConferenceId,
    /// Display name.
    name: String,
    /// Bridge id (same value as the conference id).
    bridge_id: BridgeId,
    /// Message receiver.
    receiver: mpsc::Receiver<ConferenceMessage>,
    /// Cancellation token (child of the registry's token).
    cancel_token: CancellationToken,
    /// Service configuration.
    config: Arc<Config>,
    /// Control-plane command facade.
    control: Arc<dyn ControlPlane>,
    /// Event router for channel/recording claims.
    router: Arc<EventRouter>,
    /// Shared service metrics.
    metrics: Arc<ServiceMetrics>,
    /// Clone of this actor's own handle, used when registering claims.
    self_handle: ConferenceHandle,
    /// Lifecycle phase.
    phase: ConferencePhase,
    /// Moderation policy.
    policy: MutePolicy,
    /// The owned mixing bridge, once created.
    bridge: Option<Bridge>,
    /// Participants in join order.
    roster: Vec<Participant>,
    /// Conference creation timestamp.
    created_at: i64,
}

impl ConferenceActor {
    /// Spawn a new conference actor.
    ///
    /// Returns a handle and the task join handle. The caller (normally the
    /// registry) is responsible for registering the handle's bridge route
    /// with the event router.
    pub fn spawn(
        id: ConferenceId,
        name: String,
        config: Arc<Config>,
        control: Arc<dyn ControlPlane>,
        router: Arc<EventRouter>,
        metrics: Arc<ServiceMetrics>,
        cancel_token: CancellationToken,
    ) -> (ConferenceHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(CONFERENCE_CHANNEL_BUFFER);

        let handle = ConferenceHandle {
            sender,
            cancel_token: cancel_token.clone(),
            id,
            name: name.clone(),
            bridge_id: id.bridge_id(),
        };

        let actor = Self {
            id,
            name,
            bridge_id: id.bridge_id(),
            receiver,
            cancel_token,
            config,
            control,
            router,
            metrics,
            self_handle: handle.clone(),
            phase: ConferencePhase::Creating,
            policy: MutePolicy::Open,
            bridge: None,
            roster: Vec::new(),
            created_at: chrono::Utc::now().timestamp(),
        };

        let task_handle = tokio::spawn(actor.run());

        (handle, task_handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "conf.actor.conference", fields(conference = %self.name))]
    async fn run(mut self) {
        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            id = %self.id,
            "ConferenceActor started"
        );
        self.metrics.conference_created();

        loop {
            tokio::select! {
                // Handle cancellation
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "conf.actor.conference",
                        conference = %self.name,
                        "ConferenceActor received cancellation signal"
                    );
                    break;
                }

                // Handle messages
                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message).await;
                            if self.phase == ConferencePhase::Destroyed {
                                break;
                            }
                        }
                        None => {
                            info!(
                                target: "conf.actor.conference",
                                conference = %self.name,
                                "ConferenceActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        // Route cleanup must happen on every exit path, not just the
        // confirmed-destroyed one.
        self.router.unregister_conference(&self.bridge_id);
        self.metrics.conference_removed();

        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            phase = self.phase.as_str(),
            participants = self.roster.len(),
            "ConferenceActor stopped"
        );
    }

    /// Handle a single message.
    async fn handle_message(&mut self, message: ConferenceMessage) {
        match message {
            ConferenceMessage::Start { respond_to } => {
                let result = self.handle_start().await;
                let _ = respond_to.send(result);
            }

            ConferenceMessage::AddUser {
                channel,
                respond_to,
            } => {
                let result = self.handle_add_user(channel).await;
                let _ = respond_to.send(result);
            }

            ConferenceMessage::RemoveUser {
                channel,
                respond_to,
            } => {
                let result = self.handle_remove_user(&channel).await;
                let _ = respond_to.send(result);
            }

            ConferenceMessage::MuteAll { respond_to } => {
                let result = self.handle_set_mute(true).await;
                let _ = respond_to.send(result);
            }

            ConferenceMessage::UnmuteAll { respond_to } => {
                let result = self.handle_set_mute(false).await;
                let _ = respond_to.send(result);
            }

            ConferenceMessage::Destroy { respond_to } => {
                let result = self.handle_destroy().await;
                let _ = respond_to.send(result);
            }

            ConferenceMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }

            ConferenceMessage::Event(event) => {
                self.handle_event(event).await;
            }
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Create the mixing bridge and open admission.
    async fn handle_start(&mut self) -> Result<(), ConfError> {
        if self.phase != ConferencePhase::Creating {
            return Err(ConfError::Conflict(
                "Conference already started".to_string(),
            ));
        }

        debug!(
            target: "conf.actor.conference",
            conference = %self.name,
            bridge_id = %self.bridge_id,
            "Requesting mixing bridge"
        );

        // The only fatal failure: without a bridge there is no conference.
        // State is untouched so the caller may retry.
        let bridge = self
            .control
            .create_bridge(BridgeKind::Mixing, &self.bridge_id)
            .await?;

        if let Err(error) = self
            .control
            .subscribe(&self.config.app_name, &format!("bridge:{}", bridge.id))
            .await
        {
            warn!(
                target: "conf.actor.conference",
                conference = %self.name,
                %error,
                "Bridge event subscription rejected"
            );
        }

        if let Err(error) = self
            .control
            .start_moh(&bridge.id, &self.config.moh_class)
            .await
        {
            warn!(
                target: "conf.actor.conference",
                conference = %self.name,
                %error,
                "Hold music failed to start"
            );
        }

        self.bridge = Some(bridge);

        // Admission opens here, not on a BridgeCreated event: the control
        // plane does not reliably emit that confirmation.
        self.set_phase(ConferencePhase::Ready);

        Ok(())
    }

    /// Admit a call leg.
    #[instrument(skip_all, fields(conference = %self.name))]
    async fn handle_add_user(&mut self, channel: ChannelId) -> Result<(), ConfError> {
        if !self.phase.is_admitting() {
            return Err(ConfError::AdmissionClosed(self.phase));
        }

        if self.position_of(&channel).is_some() {
            return Err(ConfError::Conflict(
                "Channel already in conference".to_string(),
            ));
        }

        self.control.answer(&channel).await?;

        let recording = leg_recording_name(&self.config.recording_prefix, &self.name, &channel);
        let spec = self.recording_spec();
        self.control.record(&channel, &recording, &spec).await?;

        self.router
            .claim_channel(channel.clone(), self.self_handle.clone());
        self.router
            .claim_recording(recording.clone(), self.self_handle.clone());

        debug!(
            target: "conf.actor.conference",
            channel = %channel,
            recording = %recording,
            "Participant admitted, recording name"
        );

        self.roster.push(Participant::new(channel, recording));
        self.metrics.participant_joined();

        info!(
            target: "conf.actor.conference",
            total_participants = self.roster.len(),
            "Participant joined"
        );

        Ok(())
    }

    /// Remove a call leg. Unknown channels are a no-op.
    async fn handle_remove_user(&mut self, channel: &ChannelId) -> Result<(), ConfError> {
        let Some(index) = self.position_of(channel) else {
            debug!(
                target: "conf.actor.conference",
                conference = %self.name,
                channel = %channel,
                "Removal for unknown channel ignored"
            );
            return Ok(());
        };

        if let Some(bridge) = self.bridge.clone() {
            // The leg may never have reached the bridge; the control plane
            // rejecting the removal is expected then.
            if let Err(error) = self.control.remove_channel(&bridge.id, channel).await {
                debug!(
                    target: "conf.actor.conference",
                    conference = %self.name,
                    channel = %channel,
                    %error,
                    "Bridge removal rejected"
                );
            }
        }

        let participant = self.roster.remove(index);
        self.router.release_channel(&participant.channel);
        self.router.release_recording(&participant.recording);
        self.metrics.participant_left();

        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            channel = %channel,
            remaining_participants = self.roster.len(),
            "Participant removed"
        );

        Ok(())
    }

    /// Mute or unmute every roster member inbound and update the policy.
    async fn handle_set_mute(&mut self, muted: bool) -> Result<(), ConfError> {
        for participant in &self.roster {
            let result = if muted {
                self.control
                    .mute(&participant.channel, AudioDirection::In)
                    .await
            } else {
                self.control
                    .unmute(&participant.channel, AudioDirection::In)
                    .await
            };

            if let Err(error) = result {
                warn!(
                    target: "conf.actor.conference",
                    conference = %self.name,
                    channel = %participant.channel,
                    %error,
                    "Mute command rejected"
                );
            }
        }

        self.set_policy(if muted {
            MutePolicy::Muted
        } else {
            MutePolicy::Open
        });

        Ok(())
    }

    /// Tear the conference down.
    #[instrument(skip_all, fields(conference = %self.name))]
    async fn handle_destroy(&mut self) -> Result<(), ConfError> {
        if matches!(
            self.phase,
            ConferencePhase::Destroying | ConferencePhase::Destroyed
        ) {
            return Ok(());
        }

        info!(
            target: "conf.actor.conference",
            participants = self.roster.len(),
            "Destroying conference"
        );

        self.set_phase(ConferencePhase::Destroying);

        let channels: Vec<ChannelId> = self.roster.iter().map(|p| p.channel.clone()).collect();
        for channel in channels {
            self.handle_remove_user(&channel).await?;
        }

        if let Some(bridge) = self.bridge.clone() {
            if let Err(error) = self.control.destroy_bridge(&bridge.id).await {
                warn!(
                    target: "conf.actor.conference",
                    %error,
                    "Bridge destruction rejected"
                );
            }
        } else {
            // Never got a bridge, so no confirmation will ever arrive.
            self.set_phase(ConferencePhase::Destroyed);
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Handle a routed control-plane event.
    ///
    /// Never fails: an event the conference cannot use is ignored.
    async fn handle_event(&mut self, event: StasisEvent) {
        trace!(
            target: "conf.actor.conference",
            conference = %self.name,
            kind = event.kind(),
            "Handling event"
        );

        match event {
            StasisEvent::BridgeCreated { bridge_id } => {
                if bridge_id != self.bridge_id {
                    return;
                }
                // Admission already opened in start(); this confirmation is
                // informational only and frequently never arrives.
                debug!(
                    target: "conf.actor.conference",
                    conference = %self.name,
                    "Bridge creation confirmed"
                );
            }

            StasisEvent::BridgeDestroyed { bridge_id } => {
                if bridge_id != self.bridge_id {
                    return;
                }
                self.set_phase(ConferencePhase::Destroyed);
                self.router.unregister_conference(&self.bridge_id);
            }

            StasisEvent::ChannelEnteredBridge {
                bridge_id,
                channel_id,
            } => {
                self.on_channel_entered(&bridge_id, &channel_id).await;
            }

            StasisEvent::ChannelLeftBridge {
                bridge_id,
                channel_id,
            } => {
                self.on_channel_left(&bridge_id, &channel_id).await;
            }

            StasisEvent::ChannelDtmfReceived { channel_id, digit } => {
                self.on_dtmf(&channel_id, digit).await;
            }

            StasisEvent::RecordingFinished { recording_name } => {
                self.on_recording_finished(&recording_name).await;
            }
        }
    }

    /// A channel was confirmed in the bridge.
    async fn on_channel_entered(&mut self, bridge_id: &BridgeId, channel_id: &ChannelId) {
        if *bridge_id != self.bridge_id {
            return;
        }
        let Some(index) = self.position_of(channel_id) else {
            return;
        };
        let Some(bridge) = self.bridge.clone() else {
            return;
        };

        let recording = {
            let Some(participant) = self.roster.get_mut(index) else {
                return;
            };
            participant.state = ParticipantState::InBridge;
            participant.recording.clone()
        };

        let in_bridge = self.in_bridge_count();
        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            channel = %channel_id,
            in_bridge,
            "Channel entered bridge"
        );

        let lang = self.config.language.clone();
        if in_bridge > 1 {
            // Stopping hold music that is already off is rejected by some
            // control planes; either way the bridge ends up silent.
            if let Err(error) = self.control.stop_moh(&bridge.id).await {
                debug!(
                    target: "conf.actor.conference",
                    conference = %self.name,
                    %error,
                    "Stop hold music rejected"
                );
            }

            // Announce the newcomer to the room: their recorded name, then
            // the joined prompt.
            self.announce_to_bridge(&bridge.id, MediaUri::recording(recording), &lang)
                .await;
            self.announce_to_bridge(
                &bridge.id,
                MediaUri::sound(self.config.sound_joined.clone()),
                &lang,
            )
            .await;
        } else {
            // Sole participant: tell them they are alone, on their own leg
            // rather than the bridge.
            self.announce_to_channel(
                channel_id,
                MediaUri::sound(self.config.sound_alone.clone()),
                &lang,
            )
            .await;
        }
    }

    /// A channel was confirmed out of the bridge.
    async fn on_channel_left(&mut self, bridge_id: &BridgeId, channel_id: &ChannelId) {
        if *bridge_id != self.bridge_id {
            return;
        }

        // The roster entry is already gone when the leg was removed
        // explicitly; the unified naming scheme lets the stored recording
        // be addressed either way.
        let recording = if let Some(index) = self.position_of(channel_id) {
            let participant = self.roster.remove(index);
            self.router.release_channel(&participant.channel);
            self.router.release_recording(&participant.recording);
            self.metrics.participant_left();
            participant.recording
        } else {
            leg_recording_name(&self.config.recording_prefix, &self.name, channel_id)
        };

        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            channel = %channel_id,
            remaining_participants = self.roster.len(),
            "Channel left bridge"
        );

        let Some(bridge) = self.bridge.clone() else {
            return;
        };
        let lang = self.config.language.clone();

        self.announce_to_bridge(&bridge.id, MediaUri::recording(recording.clone()), &lang)
            .await;
        self.announce_to_bridge(
            &bridge.id,
            MediaUri::sound(self.config.sound_left.clone()),
            &lang,
        )
        .await;

        if self.in_bridge_count() <= 1 {
            if let Err(error) = self
                .control
                .start_moh(&bridge.id, &self.config.moh_class)
                .await
            {
                warn!(
                    target: "conf.actor.conference",
                    conference = %self.name,
                    %error,
                    "Hold music failed to restart"
                );
            }
        }

        if let Err(error) = self.control.delete_stored_recording(&recording).await {
            debug!(
                target: "conf.actor.conference",
                conference = %self.name,
                recording = %recording,
                %error,
                "Stored recording deletion rejected"
            );
        }
    }

    /// A DTMF digit arrived for one of our channels.
    async fn on_dtmf(&mut self, channel_id: &ChannelId, digit: char) {
        let Some(index) = self.position_of(channel_id) else {
            return;
        };
        let (action, currently_muted) = {
            let Some(participant) = self.roster.get(index) else {
                return;
            };
            (participant.keypress(digit), participant.self_muted)
        };

        match action {
            DigitAction::ToggleMute => {
                let result = if currently_muted {
                    self.control.unmute(channel_id, AudioDirection::In).await
                } else {
                    self.control.mute(channel_id, AudioDirection::In).await
                };

                match result {
                    Ok(()) => {
                        if let Some(participant) = self.roster.get_mut(index) {
                            participant.self_muted = !currently_muted;
                        }
                        info!(
                            target: "conf.actor.conference",
                            conference = %self.name,
                            channel = %channel_id,
                            muted = !currently_muted,
                            "Participant toggled self-mute"
                        );
                    }
                    Err(error) => {
                        warn!(
                            target: "conf.actor.conference",
                            conference = %self.name,
                            channel = %channel_id,
                            %error,
                            "Self-mute command rejected"
                        );
                    }
                }
            }

            DigitAction::Leave => {
                let _ = self.handle_remove_user(channel_id).await;
            }

            DigitAction::Ignored => {
                trace!(
                    target: "conf.actor.conference",
                    conference = %self.name,
                    channel = %channel_id,
                    digit = %digit,
                    "Unassigned digit ignored"
                );
            }
        }
    }

    /// A name recording was stored; move the leg into the bridge.
    async fn on_recording_finished(&mut self, recording_name: &RecordingName) {
        let Some(index) = self
            .roster
            .iter()
            .position(|p| p.recording == *recording_name)
        else {
            return;
        };

        let channel = {
            let Some(participant) = self.roster.get_mut(index) else {
                return;
            };
            if participant.state != ParticipantState::RecordingName {
                return;
            }
            participant.state = ParticipantState::Joining;
            participant.channel.clone()
        };

        let Some(bridge) = self.bridge.clone() else {
            return;
        };

        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            channel = %channel,
            "Name recording stored, joining bridge"
        );

        if let Err(error) = self
            .control
            .add_channel(&bridge.id, &channel, PARTICIPANT_ROLE)
            .await
        {
            warn!(
                target: "conf.actor.conference",
                conference = %self.name,
                channel = %channel,
                %error,
                "Bridge admission rejected"
            );
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Roster position of a channel, if tracked.
    fn position_of(&self, channel: &ChannelId) -> Option<usize> {
        self.roster.iter().position(|p| p.channel == *channel)
    }

    /// Number of participants confirmed in the bridge.
    fn in_bridge_count(&self) -> usize {
        self.roster
            .iter()
            .filter(|p| p.state == ParticipantState::InBridge)
            .count()
    }

    /// Recording parameters from configuration.
    fn recording_spec(&self) -> RecordingSpec {
        RecordingSpec {
            format: self.config.recording_format.clone(),
            max_duration_seconds: self.config.recording_max_seconds,
            max_silence_seconds: self.config.recording_max_silence_seconds,
            beep: true,
            terminate_on: Some('#'),
        }
    }

    /// Play media to the whole bridge, logging rejection.
    async fn announce_to_bridge(&self, bridge: &BridgeId, media: MediaUri, lang: &str) {
        if let Err(error) = self.control.play_on_bridge(bridge, &media, lang, 0, 0).await {
            warn!(
                target: "conf.actor.conference",
                conference = %self.name,
                media = %media,
                %error,
                "Bridge playback rejected"
            );
        }
    }

    /// Play media to a single channel, logging rejection.
    async fn announce_to_channel(&self, channel: &ChannelId, media: MediaUri, lang: &str) {
        if let Err(error) = self
            .control
            .play_on_channel(channel, &media, lang, 0, 0)
            .await
        {
            warn!(
                target: "conf.actor.conference",
                conference = %self.name,
                channel = %channel,
                media = %media,
                %error,
                "Channel playback rejected"
            );
        }
    }

    /// Change the lifecycle phase, logging the transition.
    fn set_phase(&mut self, next: ConferencePhase) {
        if next == self.phase {
            return;
        }
        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            from = self.phase.as_str(),
            to = next.as_str(),
            "Conference phase changed"
        );
        self.phase = next;
    }

    /// Change the moderation policy, logging the transition.
    fn set_policy(&mut self, next: MutePolicy) {
        if next == self.policy {
            return;
        }
        info!(
            target: "conf.actor.conference",
            conference = %self.name,
            from = self.policy.as_str(),
            to = next.as_str(),
            "Conference mute policy changed"
        );
        self.policy = next;
    }

    /// Build a state snapshot.
    fn snapshot(&self) -> ConferenceSnapshot {
        ConferenceSnapshot {
            id: self.id,
            name: self.name.clone(),
            phase: self.phase,
            policy: self.policy,
            bridge: self.bridge.as_ref().map(|b| b.id.clone()),
            participants: self.roster.iter().map(Participant::to_info).collect(),
            created_at: self.created_at,
        }
    }
}
