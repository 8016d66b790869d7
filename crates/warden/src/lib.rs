//! # Warden
//!
//! A trust-level moderation decision engine for group chats.
//!
//! ## Overview
//!
//! Warden decides what a group-chat community should do about its
//! members: who outranks whom, which bursts of messages count as spam,
//! and which moderator gets to act on a report. It never talks to a
//! chat network itself; embedders supply a [`core::PlatformClient`]
//! and feed events in.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   events    ┌─────────────────────────────────────┐
//! │   Embedder   │────────────▶│ EnforcementCoordinator (spam mutes) │
//! │  (adapter to │   commands  │ ModerationService      (staff cmds) │──▶ PlatformClient
//! │  a platform) │────────────▶│ ReportWorkflow         (reports)    │
//! └──────────────┘             └──────────────┬──────────────────────┘
//!                                             ▼
//!                                      Stores (directory,
//!                                      history, audit, reports)
//! ```
//!
//! - **warden-core**: trust levels, permission checks, burst detection,
//!   record types, and the platform/store trait seams
//! - **warden-engine**: the stateful decision services and the
//!   in-memory store
//! - **warden-runtime**: configuration, logging, and engine assembly
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::SystemTime;
//!
//! use warden::prelude::*;
//!
//! let config = load_config()?;
//! warden::runtime::logging::init_from_config(&config.logging);
//!
//! let platform = Arc::new(MyPlatform::connect()?);
//! let engine = ModerationEngine::from_config(&config, platform, UserId(0));
//!
//! // feed an incoming message
//! let outcome = engine
//!     .coordinator
//!     .on_message(message_ref, text, SystemTime::now())
//!     .await?;
//! ```

pub use warden_core as core;
pub use warden_engine as engine;
pub use warden_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use warden::prelude::*;
/// ```
pub mod prelude {
    // Engine assembly and configuration
    pub use warden_runtime::{ModerationEngine, WardenConfig, load_config};

    // Decision services
    pub use warden_engine::commands::{CommandOutcome, ModerationService};
    pub use warden_engine::coordinator::{EnforcementCoordinator, EnforcementOutcome};
    pub use warden_engine::report::{
        FileOutcome, ReportAction, ReportWorkflow, ResolutionOutcome,
    };

    // Domain types
    pub use warden_core::{
        ChatId, MessageId, MessageRef, ModerationError, ModerationResult, Report, ReportId,
        ReportStatus, TrustLevel, UserId,
    };

    // Trait seams for embedders
    pub use warden_core::{PlatformClient, SharedPlatform, Stores};
}
