//! Participant roster entries.
//!
//! A participant is passive state owned by its conference actor: it has no
//! task, timer, or mailbox of its own. Every transition is driven by the
//! conference's command and event handling.

use super::messages::ParticipantInfo;
use super::state::ParticipantState;
use common::types::{ChannelId, RecordingName};

/// What a DTMF digit asks the conference to do for this participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitAction {
    /// Toggle the participant's own inbound mute.
    ToggleMute,
    /// Remove this leg from the conference.
    Leave,
    /// Digit has no assigned meaning.
    Ignored,
}

/// One call leg's state within a conference.
#[derive(Debug)]
pub(crate) struct Participant {
    /// The leg's channel identity.
    pub channel: ChannelId,
    /// Name the leg's announcement recording is stored under.
    pub recording: RecordingName,
    /// Join progress.
    pub state: ParticipantState,
    /// Whether the participant muted themselves via DTMF.
    pub self_muted: bool,
}

impl Participant {
    /// Create a roster entry for a freshly admitted leg.
    pub(crate) fn new(channel: ChannelId, recording: RecordingName) -> Self {
        Self {
            channel,
            recording,
            state: ParticipantState::RecordingName,
            self_muted: false,
        }
    }

    /// Map a DTMF digit to the in-conference key menu.
    pub(crate) fn keypress(&self, digit: char) -> DigitAction {
        match digit {
            '*' => DigitAction::ToggleMute,
            '#' => DigitAction::Leave,
            _ => DigitAction::Ignored,
        }
    }

    /// Public snapshot of this entry.
    pub(crate) fn to_info(&self) -> ParticipantInfo {
        ParticipantInfo {
            channel: self.channel.clone(),
            state: self.state,
            recording: self.recording.clone(),
            self_muted: self.self_muted,
        }
    }
}

/// The storage name for a leg's announcement recording.
///
/// One scheme everywhere - record, playback, and delete all derive the same
/// name, so the stored recording can always be found again even after the
/// roster entry is gone.
pub(crate) fn leg_recording_name(
    prefix: &str,
    conference_name: &str,
    channel: &ChannelId,
) -> RecordingName {
    RecordingName(format!("{prefix}-{conference_name}-{channel}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_starts_recording() {
        let p = Participant::new(
            ChannelId::from("c-1"),
            RecordingName::from("conftemp-sales-c-1"),
        );
        assert_eq!(p.state, ParticipantState::RecordingName);
        assert!(!p.self_muted);
    }

    #[test]
    fn test_key_menu() {
        let p = Participant::new(ChannelId::from("c-1"), RecordingName::from("r"));
        assert_eq!(p.keypress('*'), DigitAction::ToggleMute);
        assert_eq!(p.keypress('#'), DigitAction::Leave);
        assert_eq!(p.keypress('5'), DigitAction::Ignored);
        assert_eq!(p.keypress('A'), DigitAction::Ignored);
    }

    #[test]
    fn test_recording_name_scheme_is_stable() {
        let channel = ChannelId::from("PJSIP/bob-0002");
        let first = leg_recording_name("conftemp", "sales", &channel);
        let second = leg_recording_name("conftemp", "sales", &channel);
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "conftemp-sales-PJSIP/bob-0002");
    }
}
