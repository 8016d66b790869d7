//! Configuration schema definitions.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use warden_core::spam::SpamPolicy;
use warden_core::types::UserId;
use warden_engine::coordinator::EnforcementPolicy;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WardenConfig {
    /// Moderation thresholds and durations.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Moderation settings, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Consecutive emoji-only messages that trigger enforcement.
    #[serde(default = "default_spam_threshold")]
    pub spam_threshold: usize,

    /// Stickers within the window that trigger enforcement.
    #[serde(default = "default_sticker_threshold")]
    pub sticker_threshold: usize,

    /// Sticker counting window in seconds.
    #[serde(default = "default_sticker_window_secs")]
    pub sticker_window_secs: u64,

    /// Duration of the automatic spam mute in seconds.
    #[serde(default = "default_mute_duration_secs")]
    pub mute_duration_secs: u64,

    /// Default duration for moderator-invoked mutes in seconds.
    #[serde(default = "default_moderator_mute_secs")]
    pub moderator_mute_secs: u64,

    /// Unremovable level-6 identities, configured at startup. Runtime
    /// promotions (e.g. the discovered chat creator) go through the
    /// user directory instead.
    #[serde(default)]
    pub senior_admins: Vec<i64>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            spam_threshold: default_spam_threshold(),
            sticker_threshold: default_sticker_threshold(),
            sticker_window_secs: default_sticker_window_secs(),
            mute_duration_secs: default_mute_duration_secs(),
            moderator_mute_secs: default_moderator_mute_secs(),
            senior_admins: Vec::new(),
        }
    }
}

impl ModerationConfig {
    /// Converts to the engine's enforcement policy.
    pub fn enforcement_policy(&self) -> EnforcementPolicy {
        EnforcementPolicy {
            spam: SpamPolicy {
                spam_threshold: self.spam_threshold,
                sticker_threshold: self.sticker_threshold,
                sticker_window: Duration::from_secs(self.sticker_window_secs),
            },
            mute_duration: Duration::from_secs(self.mute_duration_secs),
        }
    }

    /// Default moderator-invoked mute duration.
    pub fn moderator_mute(&self) -> Duration {
        Duration::from_secs(self.moderator_mute_secs)
    }

    /// Configured senior identities as typed ids.
    pub fn senior_ids(&self) -> Vec<UserId> {
        self.senior_admins.iter().copied().map(UserId).collect()
    }
}

fn default_spam_threshold() -> usize {
    2
}

fn default_sticker_threshold() -> usize {
    3
}

fn default_sticker_window_secs() -> u64 {
    10
}

fn default_mute_duration_secs() -> u64 {
    300
}

fn default_moderator_mute_secs() -> u64 {
    3600
}

/// Log verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level output.
    Trace,
    /// Debug-level output.
    Debug,
    /// Informational output (default).
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the level as a lowercase string.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output (default).
    #[default]
    Compact,
    /// Default `tracing_subscriber` full format.
    Full,
    /// Multi-line human-friendly output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include thread ids in output.
    #[serde(default)]
    pub thread_ids: bool,

    /// Per-module level overrides, e.g. `warden_engine = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            thread_ids: false,
            filters: HashMap::new(),
        }
    }
}
