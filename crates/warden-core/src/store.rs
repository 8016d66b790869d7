//! Persistence interfaces consumed by the engine.
//!
//! Four narrow traits, one per concern: the user directory, the bounded
//! behavioral history, the mute/ban audit log, and the report store. The
//! engine owns *when* these are called; implementations own the backing
//! medium. The only atomicity an implementation must provide beyond
//! individual operations is the compare-and-set in
//! [`ReportStore::try_resolve`] — the first-writer-wins guarantee for
//! report resolution lives there, not in the engine.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::level::TrustLevel;
use crate::record::{
    BanRecord, MuteRecord, Report, ReportId, ReportStatus, UserRecord, UserStats,
};
use crate::types::{ChatId, MessageId, UserId};

/// Level and metadata storage for users.
///
/// Every user referenced anywhere has a level record; implementations
/// auto-create at [`TrustLevel::Member`] on first lookup. Lookups of a
/// configured senior identity re-pin the stored level to
/// [`TrustLevel::SeniorAdmin`] before returning — a self-healing read
/// that survives accidental demotion by direct store writes.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the user's level, creating the record at level 1 on first
    /// sight and re-pinning seniors to 6.
    async fn level_of(&self, user: UserId) -> StoreResult<TrustLevel>;

    /// Writes the user's level and refreshes cached display metadata.
    async fn set_level(
        &self,
        user: UserId,
        level: TrustLevel,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> StoreResult<()>;

    /// Refreshes cached display metadata without touching the level.
    async fn touch_metadata(
        &self,
        user: UserId,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> StoreResult<()>;

    /// Whether the user is a senior identity (configured at startup or
    /// promoted as chat creator).
    async fn is_senior(&self, user: UserId) -> StoreResult<bool>;

    /// Marks a user as a senior identity. Used when the chat creator is
    /// discovered at runtime; the promotion is persisted so multiple
    /// service instances agree.
    async fn promote_senior(&self, user: UserId) -> StoreResult<()>;

    /// Returns all known user records.
    async fn all_users(&self) -> StoreResult<Vec<UserRecord>>;
}

/// Append-only per-user event history with bounded-window queries.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends a message observation.
    async fn append_message(&self, user: UserId, at: SystemTime, is_spam: bool)
    -> StoreResult<()>;

    /// Returns the spam flags of the user's most recent messages, newest
    /// first, at most `limit` entries.
    async fn recent_message_flags(&self, user: UserId, limit: usize) -> StoreResult<Vec<bool>>;

    /// Appends a sticker observation.
    async fn append_sticker(&self, user: UserId, at: SystemTime) -> StoreResult<()>;

    /// Returns the timestamps of the user's most recent stickers, newest
    /// first, at most `limit` entries. The caller evaluates window
    /// membership; stores only report what happened when.
    async fn recent_stickers(&self, user: UserId, limit: usize) -> StoreResult<Vec<SystemTime>>;

    /// Deletes the user's entire event window, both messages and
    /// stickers. Sole caller is the enforcement path, after an action
    /// fires, so one burst cannot be punished twice.
    async fn clear_user(&self, user: UserId) -> StoreResult<()>;
}

/// Append-only mute/ban audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends a mute record.
    async fn record_mute(&self, record: MuteRecord) -> StoreResult<()>;

    /// Appends a ban record.
    async fn record_ban(&self, record: BanRecord) -> StoreResult<()>;

    /// Logically removes the user's ban records on unban.
    async fn remove_bans(&self, user: UserId) -> StoreResult<()>;

    /// Assembles per-user activity totals.
    async fn user_stats(&self, user: UserId) -> StoreResult<UserStats>;
}

/// Outcome of a report resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// This caller won the compare-and-set; the status is now the
    /// requested terminal value and the platform action may proceed.
    Resolved,
    /// Another moderator resolved the report first; no action may be
    /// taken. Carries the status they set.
    AlreadyResolved(ReportStatus),
}

/// Report storage with first-writer-wins resolution.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persists a new pending report and returns it with its assigned id.
    async fn file_report(
        &self,
        reporter: UserId,
        reported: UserId,
        message: MessageId,
        chat: ChatId,
        reason: Option<String>,
        now: SystemTime,
    ) -> StoreResult<Report>;

    /// Fetches a report by id.
    async fn get_report(&self, id: ReportId) -> StoreResult<Report>;

    /// Lists reports still pending, newest first.
    async fn pending_reports(&self) -> StoreResult<Vec<Report>>;

    /// Atomically transitions the report from `Pending` to `status`.
    ///
    /// This MUST be a compare-and-set on the stored status: a plain
    /// read-then-write loses the exactly-once guarantee under concurrent
    /// moderator actions.
    async fn try_resolve(&self, id: ReportId, status: ReportStatus)
    -> StoreResult<ResolveOutcome>;
}

/// The full set of stores the engine needs, as shared handles.
#[derive(Clone)]
pub struct Stores {
    /// User directory.
    pub directory: Arc<dyn UserDirectory>,
    /// Behavioral history.
    pub history: Arc<dyn HistoryStore>,
    /// Mute/ban audit trail.
    pub audit: Arc<dyn AuditLog>,
    /// Report storage.
    pub reports: Arc<dyn ReportStore>,
}
