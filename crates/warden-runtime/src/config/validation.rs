//! Configuration validation utilities.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ModerationConfig, WardenConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &WardenConfig) -> ConfigResult<()> {
    validate_moderation_config(&config.moderation)
}

/// Validates moderation thresholds and durations.
fn validate_moderation_config(config: &ModerationConfig) -> ConfigResult<()> {
    if config.spam_threshold == 0 {
        return Err(ConfigError::validation("spam_threshold must be at least 1"));
    }

    if config.sticker_threshold == 0 {
        return Err(ConfigError::validation(
            "sticker_threshold must be at least 1",
        ));
    }

    if config.sticker_window_secs == 0 {
        return Err(ConfigError::validation(
            "sticker_window_secs must be greater than 0",
        ));
    }

    if config.mute_duration_secs == 0 {
        return Err(ConfigError::validation(
            "mute_duration_secs must be greater than 0",
        ));
    }

    if config.moderator_mute_secs == 0 {
        return Err(ConfigError::validation(
            "moderator_mute_secs must be greater than 0",
        ));
    }

    let mut seen = HashSet::new();
    for id in &config.senior_admins {
        if !seen.insert(id) {
            return Err(ConfigError::validation(format!(
                "duplicate senior admin id: {id}"
            )));
        }
    }

    Ok(())
}
