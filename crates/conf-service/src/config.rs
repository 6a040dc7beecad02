//! Conference controller configuration.
//!
//! Configuration is loaded from environment variables. Prompt names and
//! recording limits have defaults matching a stock media host; the
//! control-plane application name has no sensible default and is required.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

/// Default music-on-hold class.
pub const DEFAULT_MOH_CLASS: &str = "default";

/// Default prompt language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default prompt played to the bridge when a participant joins.
pub const DEFAULT_SOUND_JOINED: &str = "conf-hasjoin";

/// Default prompt played to the bridge when a participant leaves.
pub const DEFAULT_SOUND_LEFT: &str = "conf-hasleft";

/// Default prompt played to a participant alone in the conference.
pub const DEFAULT_SOUND_ALONE: &str = "conf-onlyperson";

/// Default container format for name recordings.
pub const DEFAULT_RECORDING_FORMAT: &str = "wav";

/// Default cap on name-recording length in seconds.
pub const DEFAULT_RECORDING_MAX_SECONDS: u32 = 10;

/// Default trailing-silence cutoff for name recordings in seconds.
pub const DEFAULT_RECORDING_MAX_SILENCE_SECONDS: u32 = 2;

/// Default prefix for per-leg temporary recording names.
pub const DEFAULT_RECORDING_PREFIX: &str = "conftemp";

/// Conference controller configuration.
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Control-plane application name used for event subscriptions.
    pub app_name: String,

    /// Music-on-hold class started on waiting bridges (default: "default").
    pub moh_class: String,

    /// Language hint passed with every playback (default: "en").
    pub language: String,

    /// Prompt played to the bridge after a participant's name recording.
    pub sound_joined: String,

    /// Prompt played to the bridge when a participant leaves.
    pub sound_left: String,

    /// Prompt played to a participant who is alone in the conference.
    pub sound_alone: String,

    /// Container format for name recordings (default: "wav").
    pub recording_format: String,

    /// Maximum name-recording length in seconds (default: 10).
    pub recording_max_seconds: u32,

    /// Trailing-silence cutoff for name recordings in seconds (default: 2).
    pub recording_max_silence_seconds: u32,

    /// Prefix for per-leg temporary recording names (default: "conftemp").
    pub recording_prefix: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let app_name = vars
            .get("CONF_APP_NAME")
            .ok_or_else(|| ConfigError::MissingEnvVar("CONF_APP_NAME".to_string()))?
            .clone();

        let moh_class = vars
            .get("CONF_MOH_CLASS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_MOH_CLASS.to_string());

        let language = vars
            .get("CONF_LANGUAGE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let sound_joined = vars
            .get("CONF_SOUND_JOINED")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SOUND_JOINED.to_string());

        let sound_left = vars
            .get("CONF_SOUND_LEFT")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SOUND_LEFT.to_string());

        let sound_alone = vars
            .get("CONF_SOUND_ALONE")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SOUND_ALONE.to_string());

        let recording_format = vars
            .get("CONF_RECORDING_FORMAT")
            .cloned()
            .unwrap_or_else(|| DEFAULT_RECORDING_FORMAT.to_string());

        let recording_max_seconds = vars
            .get("CONF_RECORDING_MAX_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RECORDING_MAX_SECONDS);

        let recording_max_silence_seconds = vars
            .get("CONF_RECORDING_MAX_SILENCE_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RECORDING_MAX_SILENCE_SECONDS);

        let recording_prefix = vars
            .get("CONF_RECORDING_PREFIX")
            .cloned()
            .unwrap_or_else(|| DEFAULT_RECORDING_PREFIX.to_string());

        if recording_max_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "CONF_RECORDING_MAX_SECONDS must be at least 1".to_string(),
            ));
        }

        Ok(Config {
            app_name,
            moh_class,
            language,
            sound_joined,
            sound_left,
            sound_alone,
            recording_format,
            recording_max_seconds,
            recording_max_silence_seconds,
            recording_prefix,
        })
    }
}
