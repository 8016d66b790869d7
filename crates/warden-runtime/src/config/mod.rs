//! Configuration module for the Warden runtime.
//!
//! This module provides TOML/YAML-based configuration loading and
//! validation for moderation thresholds and logging options.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config};
pub use schema::{LogFormat, LogLevel, LoggingConfig, ModerationConfig, WardenConfig};
pub use validation::validate_config;
