//! Warden Runtime - configuration, logging and startup wiring.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `WardenConfig`)
//! - Logging setup (`LoggingBuilder`, `init_from_config`)
//! - Engine assembly (`ModerationEngine`)
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use warden_core::types::UserId;
//! use warden_runtime::bootstrap::ModerationEngine;
//! use warden_runtime::config::load_config;
//! use warden_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//!
//! let platform = Arc::new(MyPlatformClient::connect()?);
//! let engine = ModerationEngine::from_config(&config, platform, UserId(0));
//! ```

pub mod bootstrap;
pub mod config;
pub mod logging;

// Re-exports
pub use bootstrap::ModerationEngine;
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, ModerationConfig, WardenConfig,
    load_config,
};
pub use logging::LoggingBuilder;

// Re-export tracing for use by embedders
pub use tracing;
pub use tracing_subscriber;
