//! Unified error types for the Warden core.
//!
//! Authorization denials are deliberately *not* here: a denial is an
//! expected outcome and travels as a value (see
//! [`permission`](crate::permission) and the engine's outcome enums).
//! These types cover genuine faults — platform failures, store failures
//! and malformed input.

use thiserror::Error;

use crate::level::InvalidLevel;
use crate::record::ReportId;
use crate::types::{ChatId, MessageId, UserId};

// =============================================================================
// Platform Errors
// =============================================================================

/// Errors surfaced by the chat-platform client.
///
/// All of these are non-fatal to the engine: moderation actions are
/// best-effort, never retried automatically, and never crash event
/// processing.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The network request failed.
    #[error("platform request failed: {0}")]
    Request(String),

    /// The platform rejected the action (e.g. the bot lacks rights in
    /// the chat).
    #[error("platform rejected the action: {0}")]
    Rejected(String),

    /// The referenced message no longer exists.
    #[error("message {message} not found in chat {chat}")]
    MessageNotFound {
        /// The chat searched.
        chat: ChatId,
        /// The missing message.
        message: MessageId,
    },

    /// The referenced user is not a member of the chat.
    #[error("user {user} not found in chat {chat}")]
    UserNotFound {
        /// The chat searched.
        chat: ChatId,
        /// The missing user.
        user: UserId,
    },

    /// The request timed out.
    #[error("platform request timed out")]
    Timeout,
}

impl PlatformError {
    /// Whether this failure is a benign not-found that callers may
    /// collapse into a success-equivalent outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PlatformError::MessageNotFound { .. } | PlatformError::UserNotFound { .. }
        )
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors surfaced by the persistence layer.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing store failed.
    #[error("store operation failed: {0}")]
    Backend(String),

    /// No report exists with the given id.
    #[error("report {0} not found")]
    ReportNotFound(ReportId),
}

// =============================================================================
// Engine Errors
// =============================================================================

/// Errors from a single moderation operation.
#[derive(Debug, Clone, Error)]
pub enum ModerationError {
    /// The platform client failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Input was rejected before any state mutation.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<InvalidLevel> for ModerationError {
    fn from(err: InvalidLevel) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for platform-client operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for engine operations.
pub type ModerationResult<T> = Result<T, ModerationError>;
