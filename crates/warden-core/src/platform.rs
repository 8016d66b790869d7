//! The chat-platform client interface.
//!
//! The engine consumes the platform through this trait and never talks
//! to the network itself. Implementations wrap the platform SDK; tests
//! substitute a recording mock. Every method is a blocking network
//! operation from the engine's point of view and may fail with a
//! [`PlatformError`] — the engine treats all such failures as non-fatal.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::PlatformResult;
use crate::types::{ChatId, MessageId, UserId};

/// The permission set applied when restricting a chat member.
///
/// Only the send-message capability matters to the engine; the platform
/// may expose finer-grained toggles, which adapters map as they see fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Whether the member may send any messages.
    pub can_send_messages: bool,
}

impl PermissionSet {
    /// Full restriction: the member can send nothing.
    pub const MUTED: Self = Self {
        can_send_messages: false,
    };

    /// Restrictions lifted.
    pub const UNRESTRICTED: Self = Self {
        can_send_messages: true,
    };
}

/// Display metadata the platform reports for a chat member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Platform identity.
    pub id: UserId,
    /// Username, if set.
    pub username: Option<String>,
    /// First name, if set.
    pub first_name: Option<String>,
}

/// One entry from the platform's administrator list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAdmin {
    /// The administrator.
    pub member: MemberInfo,
    /// Whether this administrator created the chat.
    pub is_creator: bool,
}

/// The platform operations the moderation engine consumes.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Applies `permissions` to `user` in `chat` until `until`.
    async fn restrict_user(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: PermissionSet,
        until: Option<SystemTime>,
    ) -> PlatformResult<()>;

    /// Bans `user` from `chat`.
    async fn ban_user(&self, chat: ChatId, user: UserId) -> PlatformResult<()>;

    /// Lifts a ban on `user` in `chat`.
    async fn unban_user(&self, chat: ChatId, user: UserId) -> PlatformResult<()>;

    /// Deletes a message.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> PlatformResult<()>;

    /// Lists the chat's administrators.
    async fn list_administrators(&self, chat: ChatId) -> PlatformResult<Vec<ChatAdmin>>;

    /// Streams the chat's full membership.
    ///
    /// Memberships can be large; the stream yields members as the
    /// platform pages through them.
    fn list_members(&self, chat: ChatId) -> BoxStream<'_, PlatformResult<MemberInfo>>;
}

/// A shared platform client handle.
pub type SharedPlatform = Arc<dyn PlatformClient>;
