//! In-memory store implementation.
//!
//! Implements all four store traits behind a single `parking_lot` lock.
//! This is the default backing store for single-instance deployments and
//! the store double used throughout the test suite. Nothing is awaited
//! while the lock is held.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::SystemTime;

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_core::error::{StoreError, StoreResult};
use warden_core::level::TrustLevel;
use warden_core::record::{
    BanRecord, MessageEntry, MuteRecord, Report, ReportId, ReportStatus, StickerEntry, UserRecord,
    UserStats,
};
use warden_core::store::{AuditLog, HistoryStore, ReportStore, ResolveOutcome, UserDirectory};
use warden_core::types::{ChatId, MessageId, UserId};

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    seniors: HashSet<UserId>,
    messages: HashMap<UserId, Vec<MessageEntry>>,
    stickers: HashMap<UserId, Vec<StickerEntry>>,
    mutes: Vec<MuteRecord>,
    bans: Vec<BanRecord>,
    reports: BTreeMap<ReportId, Report>,
    next_report: u64,
}

/// In-memory implementation of every store trait.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store with the given configured senior
    /// identities. Their level records are pinned to senior immediately.
    pub fn new(seniors: impl IntoIterator<Item = UserId>) -> Self {
        let now = SystemTime::now();
        let mut inner = Inner::default();
        for id in seniors {
            inner.seniors.insert(id);
            let record = inner.users.entry(id).or_insert_with(|| UserRecord::new(id, now));
            record.level = TrustLevel::SeniorAdmin;
        }
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl Inner {
    fn record_mut(&mut self, user: UserId) -> &mut UserRecord {
        self.users
            .entry(user)
            .or_insert_with(|| UserRecord::new(user, SystemTime::now()))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn level_of(&self, user: UserId) -> StoreResult<TrustLevel> {
        let mut inner = self.inner.lock();
        if inner.seniors.contains(&user) {
            // Self-healing read: re-pin regardless of what was written.
            let record = inner.record_mut(user);
            record.level = TrustLevel::SeniorAdmin;
            return Ok(TrustLevel::SeniorAdmin);
        }
        Ok(inner.record_mut(user).level)
    }

    async fn set_level(
        &self,
        user: UserId,
        level: TrustLevel,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let record = inner.record_mut(user);
        record.level = level;
        if username.is_some() {
            record.username = username.map(str::to_owned);
        }
        if first_name.is_some() {
            record.first_name = first_name.map(str::to_owned);
        }
        record.updated_at = SystemTime::now();
        Ok(())
    }

    async fn touch_metadata(
        &self,
        user: UserId,
        username: Option<&str>,
        first_name: Option<&str>,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let record = inner.record_mut(user);
        if username.is_some() {
            record.username = username.map(str::to_owned);
        }
        if first_name.is_some() {
            record.first_name = first_name.map(str::to_owned);
        }
        record.updated_at = SystemTime::now();
        Ok(())
    }

    async fn is_senior(&self, user: UserId) -> StoreResult<bool> {
        Ok(self.inner.lock().seniors.contains(&user))
    }

    async fn promote_senior(&self, user: UserId) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.seniors.insert(user);
        inner.record_mut(user).level = TrustLevel::SeniorAdmin;
        Ok(())
    }

    async fn all_users(&self) -> StoreResult<Vec<UserRecord>> {
        let inner = self.inner.lock();
        let mut users: Vec<UserRecord> = inner.users.values().cloned().collect();
        users.sort_by(|a, b| b.level.cmp(&a.level).then(a.id.cmp(&b.id)));
        Ok(users)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn append_message(
        &self,
        user: UserId,
        at: SystemTime,
        is_spam: bool,
    ) -> StoreResult<()> {
        self.inner
            .lock()
            .messages
            .entry(user)
            .or_default()
            .push(MessageEntry { at, is_spam });
        Ok(())
    }

    async fn recent_message_flags(&self, user: UserId, limit: usize) -> StoreResult<Vec<bool>> {
        let inner = self.inner.lock();
        let flags = inner
            .messages
            .get(&user)
            .map(|entries| {
                entries
                    .iter()
                    .rev()
                    .take(limit)
                    .map(|e| e.is_spam)
                    .collect()
            })
            .unwrap_or_default();
        Ok(flags)
    }

    async fn append_sticker(&self, user: UserId, at: SystemTime) -> StoreResult<()> {
        self.inner
            .lock()
            .stickers
            .entry(user)
            .or_default()
            .push(StickerEntry { at });
        Ok(())
    }

    async fn recent_stickers(&self, user: UserId, limit: usize) -> StoreResult<Vec<SystemTime>> {
        let inner = self.inner.lock();
        let times = inner
            .stickers
            .get(&user)
            .map(|entries| entries.iter().rev().take(limit).map(|e| e.at).collect())
            .unwrap_or_default();
        Ok(times)
    }

    async fn clear_user(&self, user: UserId) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.messages.remove(&user);
        inner.stickers.remove(&user);
        Ok(())
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record_mute(&self, record: MuteRecord) -> StoreResult<()> {
        self.inner.lock().mutes.push(record);
        Ok(())
    }

    async fn record_ban(&self, record: BanRecord) -> StoreResult<()> {
        self.inner.lock().bans.push(record);
        Ok(())
    }

    async fn remove_bans(&self, user: UserId) -> StoreResult<()> {
        self.inner.lock().bans.retain(|b| b.user != user);
        Ok(())
    }

    async fn user_stats(&self, user: UserId) -> StoreResult<UserStats> {
        let inner = self.inner.lock();
        let messages = inner.messages.get(&user).map(Vec::as_slice).unwrap_or(&[]);
        Ok(UserStats {
            messages: messages.len() as u64,
            spam_messages: messages.iter().filter(|e| e.is_spam).count() as u64,
            stickers: inner.stickers.get(&user).map_or(0, |s| s.len() as u64),
            mutes: inner.mutes.iter().filter(|m| m.user == user).count() as u64,
            bans: inner.bans.iter().filter(|b| b.user == user).count() as u64,
            reports_made: inner
                .reports
                .values()
                .filter(|r| r.reporter == user)
                .count() as u64,
            reports_against: inner
                .reports
                .values()
                .filter(|r| r.reported == user)
                .count() as u64,
        })
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn file_report(
        &self,
        reporter: UserId,
        reported: UserId,
        message: MessageId,
        chat: ChatId,
        reason: Option<String>,
        now: SystemTime,
    ) -> StoreResult<Report> {
        let mut inner = self.inner.lock();
        inner.next_report += 1;
        let report = Report {
            id: ReportId(inner.next_report),
            reporter,
            reported,
            message,
            chat,
            reason,
            status: ReportStatus::Pending,
            created_at: now,
        };
        inner.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn get_report(&self, id: ReportId) -> StoreResult<Report> {
        self.inner
            .lock()
            .reports
            .get(&id)
            .cloned()
            .ok_or(StoreError::ReportNotFound(id))
    }

    async fn pending_reports(&self) -> StoreResult<Vec<Report>> {
        let inner = self.inner.lock();
        let mut pending: Vec<Report> = inner
            .reports
            .values()
            .filter(|r| r.status == ReportStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(pending)
    }

    async fn try_resolve(
        &self,
        id: ReportId,
        status: ReportStatus,
    ) -> StoreResult<ResolveOutcome> {
        // Check and write happen under one lock acquisition, which is the
        // compare-and-set the trait contract requires.
        let mut inner = self.inner.lock();
        let report = inner
            .reports
            .get_mut(&id)
            .ok_or(StoreError::ReportNotFound(id))?;
        if report.status != ReportStatus::Pending {
            return Ok(ResolveOutcome::AlreadyResolved(report.status));
        }
        report.status = status;
        Ok(ResolveOutcome::Resolved)
    }
}
