//! Persistent record types.
//!
//! These are the shapes the stores traffic in: the per-user level record,
//! the append-only behavioral history, the mute/ban audit trail and the
//! report lifecycle. All timestamps are [`SystemTime`]; the engine never
//! reads the clock itself, callers pass `now` in so decisions stay
//! deterministic under test.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::level::TrustLevel;
use crate::types::{ChatId, MessageId, UserId};

/// A user's level record plus denormalized display metadata.
///
/// The username and first name are a cache of what the platform last
/// told us, not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Platform identity.
    pub id: UserId,
    /// Current trust level.
    pub level: TrustLevel,
    /// Cached username, if the platform reported one.
    pub username: Option<String>,
    /// Cached first name.
    pub first_name: Option<String>,
    /// When the record was first created.
    pub created_at: SystemTime,
    /// When the record was last written.
    pub updated_at: SystemTime,
}

impl UserRecord {
    /// A fresh record at the default level, as created on first sight.
    pub fn new(id: UserId, now: SystemTime) -> Self {
        Self {
            id,
            level: TrustLevel::Member,
            username: None,
            first_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The name a roster should show: `@username`, first name, or the
    /// raw id as a last resort.
    pub fn display_name(&self) -> String {
        if let Some(username) = &self.username {
            format!("@{username}")
        } else if let Some(first) = &self.first_name {
            first.clone()
        } else {
            format!("id:{}", self.id)
        }
    }
}

/// One message observed from a sub-staff user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    /// When the message arrived.
    pub at: SystemTime,
    /// Whether the emoji-only classifier flagged it.
    pub is_spam: bool,
}

/// One sticker observed from a sub-staff user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerEntry {
    /// When the sticker arrived.
    pub at: SystemTime,
}

/// Audit record of a mute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuteRecord {
    /// The muted user.
    pub user: UserId,
    /// Why the mute was issued.
    pub reason: String,
    /// Who issued it: a moderator, or the engine's own identity for
    /// automatic enforcement.
    pub actor: UserId,
    /// When it was issued.
    pub issued_at: SystemTime,
    /// When the restriction lapses.
    pub until: SystemTime,
}

/// Audit record of a ban. Logically removed (not rewritten) on unban.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    /// The banned user.
    pub user: UserId,
    /// Why the ban was issued.
    pub reason: String,
    /// The acting moderator.
    pub actor: UserId,
    /// When it was issued.
    pub issued_at: SystemTime,
}

/// Identifier of a filed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub u64);

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a report: `Pending` transitions exactly once to one
/// of the four terminal states and never moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Filed, awaiting a moderator.
    Pending,
    /// A moderator looked and took no action.
    Viewed,
    /// The reported message was deleted.
    Deleted,
    /// The reported user was muted.
    Muted,
    /// The reported user was banned.
    Banned,
}

impl ReportStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReportStatus::Pending)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Viewed => "viewed",
            ReportStatus::Deleted => "deleted",
            ReportStatus::Muted => "muted",
            ReportStatus::Banned => "banned",
        };
        f.write_str(s)
    }
}

/// A user-submitted complaint about another user's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Store-assigned id.
    pub id: ReportId,
    /// Who filed the report.
    pub reporter: UserId,
    /// Who the report is about.
    pub reported: UserId,
    /// The offending message.
    pub message: MessageId,
    /// The chat it happened in.
    pub chat: ChatId,
    /// Free-form reason supplied by the reporter, if any.
    pub reason: Option<String>,
    /// Current lifecycle state.
    pub status: ReportStatus,
    /// When the report was filed.
    pub created_at: SystemTime,
}

/// Per-user activity totals, assembled from the history and audit stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    /// Messages recorded in history.
    pub messages: u64,
    /// Of those, how many were flagged spam.
    pub spam_messages: u64,
    /// Stickers recorded in history.
    pub stickers: u64,
    /// Mutes issued against the user.
    pub mutes: u64,
    /// Bans issued against the user.
    pub bans: u64,
    /// Reports the user filed.
    pub reports_made: u64,
    /// Reports filed against the user.
    pub reports_against: u64,
}
