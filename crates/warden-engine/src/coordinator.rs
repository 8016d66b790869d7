//! Automatic enforcement over the behavioral history.
//!
//! The [`EnforcementCoordinator`] is the write path for spam handling:
//! it snapshots the sender's level once per event, records history for
//! sub-staff users, evaluates the burst detectors, and on a trigger
//! applies the mute, writes the audit record, deletes the triggering
//! message and clears the sender's window.
//!
//! Append and evaluation run under the sender's gate (see
//! [`UserGates`]): without it, two events from the same user could
//! interleave their append/query steps and either miss a trigger or
//! fire twice.

use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use warden_core::error::ModerationResult;
use warden_core::platform::{PermissionSet, SharedPlatform};
use warden_core::record::MuteRecord;
use warden_core::spam::{
    SpamPolicy, emoji_burst_triggered, is_emoji_only, sticker_burst_triggered,
};
use warden_core::store::Stores;
use warden_core::types::{MessageRef, UserId};

use crate::gate::UserGates;

/// Enforcement knobs, read-only after startup.
#[derive(Debug, Clone, Copy)]
pub struct EnforcementPolicy {
    /// Burst detection thresholds.
    pub spam: SpamPolicy,
    /// Duration of the automatic full-restriction mute. Distinct from
    /// the moderator-invoked mute, which takes an operator-chosen
    /// duration.
    pub mute_duration: Duration,
}

impl Default for EnforcementPolicy {
    fn default() -> Self {
        Self {
            spam: SpamPolicy::default(),
            mute_duration: Duration::from_secs(300),
        }
    }
}

/// What an event evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforcementOutcome {
    /// Sender is staff or a senior identity; nothing was recorded.
    Skipped,
    /// The event was recorded; no threshold was crossed.
    Recorded {
        /// Whether the classifier flagged the event.
        flagged: bool,
    },
    /// A burst crossed its threshold and the sender was muted.
    Muted {
        /// When the restriction lapses.
        until: SystemTime,
    },
}

/// Coordinates spam detection and automatic enforcement.
///
/// Sole writer of engine-issued mute records and sole agent permitted to
/// clear a user's event window.
pub struct EnforcementCoordinator {
    stores: Stores,
    platform: SharedPlatform,
    policy: EnforcementPolicy,
    gates: UserGates,
    /// Identity mute records are attributed to for automatic actions.
    engine_actor: UserId,
}

impl EnforcementCoordinator {
    /// Creates a coordinator over the given stores and platform client.
    pub fn new(
        stores: Stores,
        platform: SharedPlatform,
        policy: EnforcementPolicy,
        engine_actor: UserId,
    ) -> Self {
        Self {
            stores,
            platform,
            policy,
            gates: UserGates::new(),
            engine_actor,
        }
    }

    /// Evaluates an incoming text message.
    ///
    /// The sender's level is snapshotted exactly once; a level change
    /// mid-burst cannot alter the decision for this event.
    pub async fn on_message(
        &self,
        msg: MessageRef,
        text: &str,
        now: SystemTime,
    ) -> ModerationResult<EnforcementOutcome> {
        let level = self.stores.directory.level_of(msg.sender).await?;
        let senior = self.stores.directory.is_senior(msg.sender).await?;
        if senior || level.is_staff() {
            return Ok(EnforcementOutcome::Skipped);
        }

        let flagged = is_emoji_only(text);

        let gate = self.gates.acquire(msg.sender);
        let _serialized = gate.lock().await;

        self.stores
            .history
            .append_message(msg.sender, now, flagged)
            .await?;

        if !flagged {
            return Ok(EnforcementOutcome::Recorded { flagged: false });
        }

        let threshold = self.policy.spam.spam_threshold;
        let flags = self
            .stores
            .history
            .recent_message_flags(msg.sender, threshold)
            .await?;
        if !emoji_burst_triggered(&flags, threshold) {
            return Ok(EnforcementOutcome::Recorded { flagged: true });
        }

        debug!(user = %msg.sender, "emoji burst threshold reached");
        self.enforce(msg, now, "emoji-only message burst").await
    }

    /// Evaluates an incoming sticker.
    pub async fn on_sticker(
        &self,
        msg: MessageRef,
        now: SystemTime,
    ) -> ModerationResult<EnforcementOutcome> {
        let level = self.stores.directory.level_of(msg.sender).await?;
        let senior = self.stores.directory.is_senior(msg.sender).await?;
        if senior || level.is_staff() {
            return Ok(EnforcementOutcome::Skipped);
        }

        let gate = self.gates.acquire(msg.sender);
        let _serialized = gate.lock().await;

        self.stores.history.append_sticker(msg.sender, now).await?;

        let threshold = self.policy.spam.sticker_threshold;
        let recent = self
            .stores
            .history
            .recent_stickers(msg.sender, threshold)
            .await?;
        if !sticker_burst_triggered(&recent, self.policy.spam.sticker_window, threshold, now) {
            return Ok(EnforcementOutcome::Recorded { flagged: true });
        }

        debug!(user = %msg.sender, "sticker burst threshold reached");
        self.enforce(msg, now, "sticker flood").await
    }

    /// Applies the enforcement sequence: mute, audit record, message
    /// deletion, window clear. Any platform failure aborts the remaining
    /// steps; the failure is logged and surfaced, never retried.
    async fn enforce(
        &self,
        msg: MessageRef,
        now: SystemTime,
        reason: &str,
    ) -> ModerationResult<EnforcementOutcome> {
        // Defense in depth: the detectors never route seniors here, but
        // future callers might.
        if self.stores.directory.is_senior(msg.sender).await? {
            warn!(user = %msg.sender, "enforcement requested against a senior identity, ignoring");
            return Ok(EnforcementOutcome::Recorded { flagged: true });
        }

        let until = now + self.policy.mute_duration;
        if let Err(err) = self
            .platform
            .restrict_user(msg.chat, msg.sender, PermissionSet::MUTED, Some(until))
            .await
        {
            warn!(user = %msg.sender, error = %err, "failed to apply automatic mute");
            return Err(err.into());
        }

        self.stores
            .audit
            .record_mute(MuteRecord {
                user: msg.sender,
                reason: reason.to_owned(),
                actor: self.engine_actor,
                issued_at: now,
                until,
            })
            .await?;

        match self.platform.delete_message(msg.chat, msg.message).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                debug!(message = %msg.message, "triggering message already gone");
            }
            Err(err) => {
                warn!(message = %msg.message, error = %err, "failed to delete triggering message");
                return Err(err.into());
            }
        }

        // One burst, one punishment: with the window gone the same
        // historical events cannot re-trigger after the mute.
        self.stores.history.clear_user(msg.sender).await?;

        info!(user = %msg.sender, reason, until = ?until, "user muted for spam burst");
        Ok(EnforcementOutcome::Muted { until })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use warden_core::error::{ModerationError, PlatformError};
    use warden_core::level::TrustLevel;
    use warden_core::store::{AuditLog, HistoryStore, UserDirectory};
    use warden_core::types::{ChatId, MessageId, UserId};

    use crate::memory::MemoryStore;
    use crate::testutil::{Call, RecordingPlatform};

    const BOT: UserId = UserId(999);
    const SENIOR: UserId = UserId(100);

    fn setup() -> (Arc<MemoryStore>, Arc<RecordingPlatform>, EnforcementCoordinator) {
        let store = Arc::new(MemoryStore::new([SENIOR]));
        let platform = RecordingPlatform::new();
        let stores = Stores {
            directory: store.clone(),
            history: store.clone(),
            audit: store.clone(),
            reports: store.clone(),
        };
        let coordinator = EnforcementCoordinator::new(
            stores,
            platform.clone(),
            EnforcementPolicy::default(),
            BOT,
        );
        (store, platform, coordinator)
    }

    fn msg(sender: i64, id: i64) -> MessageRef {
        MessageRef {
            chat: ChatId(7),
            message: MessageId(id),
            sender: UserId(sender),
        }
    }

    #[tokio::test]
    async fn test_emoji_burst_end_to_end() {
        let (store, platform, coordinator) = setup();
        let now = SystemTime::now();

        // First emoji-only message from a brand-new user: recorded only.
        let outcome = coordinator.on_message(msg(1, 10), "😀😀", now).await.unwrap();
        assert_eq!(outcome, EnforcementOutcome::Recorded { flagged: true });
        assert!(platform.calls().is_empty());

        // Second consecutive one crosses the threshold.
        let outcome = coordinator.on_message(msg(1, 11), "🎉", now).await.unwrap();
        let until = now + Duration::from_secs(300);
        assert_eq!(outcome, EnforcementOutcome::Muted { until });
        assert_eq!(
            platform.calls(),
            vec![
                Call::Restrict {
                    chat: ChatId(7),
                    user: UserId(1),
                    muted: true,
                    until: Some(until),
                },
                Call::Delete {
                    chat: ChatId(7),
                    message: MessageId(11),
                },
            ]
        );

        // Window cleared: the burst cannot re-trigger.
        let flags = store.recent_message_flags(UserId(1), 10).await.unwrap();
        assert!(flags.is_empty());
        let outcome = coordinator.on_message(msg(1, 12), "🚀", now).await.unwrap();
        assert_eq!(outcome, EnforcementOutcome::Recorded { flagged: true });

        let stats = store.user_stats(UserId(1)).await.unwrap();
        assert_eq!(stats.mutes, 1);
    }

    #[tokio::test]
    async fn test_clean_message_breaks_the_run() {
        let (_, platform, coordinator) = setup();
        let now = SystemTime::now();

        coordinator.on_message(msg(1, 1), "😀", now).await.unwrap();
        coordinator.on_message(msg(1, 2), "hello", now).await.unwrap();
        let outcome = coordinator.on_message(msg(1, 3), "😀", now).await.unwrap();

        // Run was broken; only one recent consecutive spam flag.
        assert_eq!(outcome, EnforcementOutcome::Recorded { flagged: true });
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sticker_burst_within_window() {
        let (_, platform, coordinator) = setup();
        let now = SystemTime::now();

        for id in [1, 2] {
            let outcome = coordinator.on_sticker(msg(2, id), now).await.unwrap();
            assert_eq!(outcome, EnforcementOutcome::Recorded { flagged: true });
        }
        let outcome = coordinator.on_sticker(msg(2, 3), now).await.unwrap();
        assert!(matches!(outcome, EnforcementOutcome::Muted { .. }));
        assert_eq!(platform.calls().len(), 2); // restrict + delete
    }

    #[tokio::test]
    async fn test_future_skewed_stickers_still_count() {
        let (_, platform, coordinator) = setup();
        let now = SystemTime::now();

        // Entries stamped ahead of the evaluating clock stay in the
        // window rather than aging out.
        coordinator
            .on_sticker(msg(2, 1), now + Duration::from_secs(5))
            .await
            .unwrap();
        coordinator
            .on_sticker(msg(2, 2), now + Duration::from_secs(3))
            .await
            .unwrap();
        let outcome = coordinator.on_sticker(msg(2, 3), now).await.unwrap();
        assert!(matches!(outcome, EnforcementOutcome::Muted { .. }));
        assert_eq!(platform.calls().len(), 2); // restrict + delete
    }

    #[tokio::test]
    async fn test_spaced_stickers_never_trigger() {
        let (_, platform, coordinator) = setup();
        let base = SystemTime::now();
        let spacing = Duration::from_secs(30); // window is 10s

        for i in 0u32..5 {
            let at = base + spacing * i;
            let outcome = coordinator.on_sticker(msg(2, i64::from(i)), at).await.unwrap();
            assert_eq!(outcome, EnforcementOutcome::Recorded { flagged: true });
        }
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn test_staff_and_seniors_are_not_recorded() {
        let (store, platform, coordinator) = setup();
        let now = SystemTime::now();

        store
            .set_level(UserId(3), TrustLevel::JuniorModerator, None, None)
            .await
            .unwrap();

        let outcome = coordinator.on_message(msg(3, 1), "😀", now).await.unwrap();
        assert_eq!(outcome, EnforcementOutcome::Skipped);
        let outcome = coordinator.on_sticker(msg(SENIOR.0, 2), now).await.unwrap();
        assert_eq!(outcome, EnforcementOutcome::Skipped);

        assert!(platform.calls().is_empty());
        assert_eq!(store.user_stats(UserId(3)).await.unwrap().messages, 0);
        assert_eq!(store.user_stats(SENIOR).await.unwrap().stickers, 0);
    }

    #[tokio::test]
    async fn test_restrict_failure_aborts_enforcement() {
        let (store, platform, coordinator) = setup();
        let now = SystemTime::now();
        platform.fail_restrict_with(PlatformError::Request("network down".into()));

        coordinator.on_message(msg(1, 1), "😀", now).await.unwrap();
        let err = coordinator.on_message(msg(1, 2), "😀", now).await.unwrap_err();
        assert!(matches!(err, ModerationError::Platform(_)));

        // No audit record, window intact.
        assert_eq!(store.user_stats(UserId(1)).await.unwrap().mutes, 0);
        let flags = store.recent_message_flags(UserId(1), 10).await.unwrap();
        assert_eq!(flags.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_message_does_not_abort() {
        let (store, _, coordinator) = setup();
        let platform = {
            let p = RecordingPlatform::new();
            p.fail_delete_with(PlatformError::MessageNotFound {
                chat: ChatId(7),
                message: MessageId(2),
            });
            p
        };
        let stores = Stores {
            directory: store.clone(),
            history: store.clone(),
            audit: store.clone(),
            reports: store.clone(),
        };
        let coordinator2 = EnforcementCoordinator::new(
            stores,
            platform.clone(),
            EnforcementPolicy::default(),
            BOT,
        );
        drop(coordinator);

        let now = SystemTime::now();
        coordinator2.on_message(msg(1, 1), "😀", now).await.unwrap();
        let outcome = coordinator2.on_message(msg(1, 2), "😀", now).await.unwrap();
        assert!(matches!(outcome, EnforcementOutcome::Muted { .. }));
        assert!(
            store
                .recent_message_flags(UserId(1), 10)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
