//! Pre-configured test data fixtures for conference testing.

use conf_service::config::Config;
use std::collections::HashMap;
use uuid::Uuid;

/// A ready-to-use service configuration with default prompts.
#[must_use]
pub fn test_config() -> Config {
    let vars = HashMap::from([("CONF_APP_NAME".to_string(), "confapp".to_string())]);
    Config::from_vars(&vars).expect("test config must load")
}

/// A service configuration with every field overridden, for tests that
/// assert on prompt or recording parameters.
#[must_use]
pub fn custom_config(app_name: &str, moh_class: &str, language: &str) -> Config {
    let vars = HashMap::from([
        ("CONF_APP_NAME".to_string(), app_name.to_string()),
        ("CONF_MOH_CLASS".to_string(), moh_class.to_string()),
        ("CONF_LANGUAGE".to_string(), language.to_string()),
    ]);
    Config::from_vars(&vars).expect("test config must load")
}

/// A unique channel id for a named test party.
#[must_use]
pub fn test_channel(party: &str) -> common::types::ChannelId {
    common::types::ChannelId(format!("PJSIP/{party}-{}", &Uuid::new_v4().to_string()[..8]))
}

/// Install a compact tracing subscriber for test debugging.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}
