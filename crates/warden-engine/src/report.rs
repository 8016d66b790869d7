//! Report triage: filing, fan-out and first-responder-wins resolution.
//!
//! A report is a tiny state machine: `pending` at filing, then exactly
//! one terminal transition taken by whichever eligible moderator acts
//! first. The exactly-once guarantee comes from the store's
//! compare-and-set ([`warden_core::store::ReportStore::try_resolve`]);
//! losers of the race
//! observe [`ResolutionOutcome::AlreadyResolved`] and perform no
//! platform action, which absorbs duplicate callback delivery too.

use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use warden_core::error::ModerationResult;
use warden_core::level::TrustLevel;
use warden_core::platform::{MemberInfo, PermissionSet, SharedPlatform};
use warden_core::record::{BanRecord, MuteRecord, Report, ReportId, ReportStatus};
use warden_core::store::{ResolveOutcome, Stores};
use warden_core::types::{MessageRef, UserId};

/// The action a moderator takes on a fanned-out report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    /// Acknowledge without platform action.
    View,
    /// Delete the reported message.
    Delete,
    /// Mute the reported user for the default duration, then attempt
    /// message deletion.
    Mute,
    /// Ban the reported user, then attempt message deletion.
    Ban,
}

impl ReportAction {
    /// The terminal status this action transitions the report to.
    pub fn terminal_status(self) -> ReportStatus {
        match self {
            ReportAction::View => ReportStatus::Viewed,
            ReportAction::Delete => ReportStatus::Deleted,
            ReportAction::Mute => ReportStatus::Muted,
            ReportAction::Ban => ReportStatus::Banned,
        }
    }
}

/// Outcome of filing a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// The report was persisted; notify these eligible moderators.
    Filed {
        /// The stored report.
        report: Report,
        /// Chat administrators whose cached level qualifies them to act.
        notify: Vec<MemberInfo>,
    },
    /// Reporting one's own message is rejected.
    SelfReport,
}

/// Outcome of a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// This moderator won; the status is now terminal and the platform
    /// action (if any) was attempted.
    Resolved(ReportStatus),
    /// Another moderator already resolved the report; nothing was done.
    AlreadyResolved(ReportStatus),
}

/// Drives the report lifecycle. Sole writer of report status
/// transitions.
pub struct ReportWorkflow {
    stores: Stores,
    platform: SharedPlatform,
    /// Mute duration applied by the `Mute` resolution.
    default_mute: Duration,
}

impl ReportWorkflow {
    /// Creates a workflow over the given stores and platform client.
    pub fn new(stores: Stores, platform: SharedPlatform, default_mute: Duration) -> Self {
        Self {
            stores,
            platform,
            default_mute,
        }
    }

    /// Files a report about `target` and computes the fan-out list.
    ///
    /// The reported message is required by construction; commands
    /// without a reply-to never reach this point. Self-reports are
    /// rejected as a value, not an error.
    pub async fn file(
        &self,
        reporter: UserId,
        target: MessageRef,
        reason: Option<String>,
        now: SystemTime,
    ) -> ModerationResult<FileOutcome> {
        if reporter == target.sender {
            debug!(%reporter, "self-report rejected");
            return Ok(FileOutcome::SelfReport);
        }

        let report = self
            .stores
            .reports
            .file_report(
                reporter,
                target.sender,
                target.message,
                target.chat,
                reason,
                now,
            )
            .await?;

        // Fan out to every chat administrator whose cached level makes
        // them moderation staff.
        let mut notify = Vec::new();
        for admin in self.platform.list_administrators(target.chat).await? {
            let level = self.stores.directory.level_of(admin.member.id).await?;
            if level >= TrustLevel::MODERATOR_FLOOR {
                notify.push(admin.member);
            }
        }

        info!(report = %report.id, reported = %target.sender, eligible = notify.len(), "report filed");
        Ok(FileOutcome::Filed { report, notify })
    }

    /// Attempts to resolve a report with `action`, attributed to
    /// `moderator`.
    ///
    /// The status transition happens first, atomically; only the winner
    /// touches the platform. Message deletion failures degrade to a
    /// status-only transition. A mute or ban failure after the win is
    /// surfaced to the caller but the report stays resolved — actions
    /// are never retried.
    pub async fn resolve(
        &self,
        id: ReportId,
        moderator: UserId,
        action: ReportAction,
        now: SystemTime,
    ) -> ModerationResult<ResolutionOutcome> {
        let report = self.stores.reports.get_report(id).await?;
        let status = action.terminal_status();

        match self.stores.reports.try_resolve(id, status).await? {
            ResolveOutcome::AlreadyResolved(winner) => {
                debug!(report = %id, %winner, "report already resolved");
                return Ok(ResolutionOutcome::AlreadyResolved(winner));
            }
            ResolveOutcome::Resolved => {}
        }

        match action {
            ReportAction::View => {}
            ReportAction::Delete => {
                self.delete_reported_message(&report).await;
            }
            ReportAction::Mute => {
                let until = now + self.default_mute;
                if let Err(err) = self
                    .platform
                    .restrict_user(report.chat, report.reported, PermissionSet::MUTED, Some(until))
                    .await
                {
                    warn!(report = %id, error = %err, "failed to mute reported user");
                    return Err(err.into());
                }
                self.stores
                    .audit
                    .record_mute(MuteRecord {
                        user: report.reported,
                        reason: format!("report {id}"),
                        actor: moderator,
                        issued_at: now,
                        until,
                    })
                    .await?;
                self.delete_reported_message(&report).await;
            }
            ReportAction::Ban => {
                if let Err(err) = self.platform.ban_user(report.chat, report.reported).await {
                    warn!(report = %id, error = %err, "failed to ban reported user");
                    return Err(err.into());
                }
                self.stores
                    .audit
                    .record_ban(BanRecord {
                        user: report.reported,
                        reason: format!("report {id}"),
                        actor: moderator,
                        issued_at: now,
                    })
                    .await?;
                self.delete_reported_message(&report).await;
            }
        }

        info!(report = %id, %moderator, %status, "report resolved");
        Ok(ResolutionOutcome::Resolved(status))
    }

    /// Best-effort deletion of the reported message. Succeeds even if
    /// the message is already gone.
    async fn delete_reported_message(&self, report: &Report) {
        if let Err(err) = self
            .platform
            .delete_message(report.chat, report.message)
            .await
        {
            if err.is_not_found() {
                debug!(report = %report.id, "reported message already gone");
            } else {
                warn!(report = %report.id, error = %err, "failed to delete reported message");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use warden_core::error::PlatformError;
    use warden_core::platform::ChatAdmin;
    use warden_core::store::{AuditLog, ReportStore, UserDirectory};
    use warden_core::types::{ChatId, MessageId};

    use crate::memory::MemoryStore;
    use crate::testutil::{Call, RecordingPlatform};

    const REPORTER: UserId = UserId(1);
    const OFFENDER: UserId = UserId(2);
    const MOD_A: UserId = UserId(10);
    const MOD_B: UserId = UserId(11);

    fn member(id: UserId, name: &str) -> MemberInfo {
        MemberInfo {
            id,
            username: Some(name.to_owned()),
            first_name: None,
        }
    }

    async fn setup() -> (Arc<MemoryStore>, Arc<RecordingPlatform>, ReportWorkflow) {
        let store = Arc::new(MemoryStore::new([]));
        store
            .set_level(MOD_A, TrustLevel::Moderator, Some("mod_a"), None)
            .await
            .unwrap();
        store
            .set_level(MOD_B, TrustLevel::JuniorModerator, Some("mod_b"), None)
            .await
            .unwrap();

        let platform = RecordingPlatform::new();
        platform.set_admins(vec![
            ChatAdmin {
                member: member(MOD_A, "mod_a"),
                is_creator: false,
            },
            ChatAdmin {
                member: member(MOD_B, "mod_b"),
                is_creator: false,
            },
            // An administrator the directory only knows at level 1 is
            // not eligible for fan-out.
            ChatAdmin {
                member: member(UserId(12), "newcomer"),
                is_creator: false,
            },
        ]);

        let stores = Stores {
            directory: store.clone(),
            history: store.clone(),
            audit: store.clone(),
            reports: store.clone(),
        };
        let workflow = ReportWorkflow::new(stores, platform.clone(), Duration::from_secs(3600));
        (store, platform, workflow)
    }

    fn target() -> MessageRef {
        MessageRef {
            chat: ChatId(7),
            message: MessageId(55),
            sender: OFFENDER,
        }
    }

    async fn file(workflow: &ReportWorkflow) -> Report {
        match workflow
            .file(REPORTER, target(), Some("abusive".into()), SystemTime::now())
            .await
            .unwrap()
        {
            FileOutcome::Filed { report, .. } => report,
            other => panic!("expected Filed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fan_out_filters_on_cached_level() {
        let (_, _, workflow) = setup().await;
        let outcome = workflow
            .file(REPORTER, target(), None, SystemTime::now())
            .await
            .unwrap();
        match outcome {
            FileOutcome::Filed { notify, .. } => {
                let ids: Vec<UserId> = notify.iter().map(|m| m.id).collect();
                assert_eq!(ids, vec![MOD_A, MOD_B]);
            }
            other => panic!("expected Filed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_self_report_rejected() {
        let (store, _, workflow) = setup().await;
        let outcome = workflow
            .file(OFFENDER, target(), None, SystemTime::now())
            .await
            .unwrap();
        assert_eq!(outcome, FileOutcome::SelfReport);
        assert!(store.pending_reports().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mute_resolution_attributes_moderator() {
        let (store, platform, workflow) = setup().await;
        let report = file(&workflow).await;
        let now = SystemTime::now();

        let outcome = workflow
            .resolve(report.id, MOD_A, ReportAction::Mute, now)
            .await
            .unwrap();
        assert_eq!(outcome, ResolutionOutcome::Resolved(ReportStatus::Muted));

        let calls = platform.calls();
        assert!(calls.contains(&Call::Restrict {
            chat: ChatId(7),
            user: OFFENDER,
            muted: true,
            until: Some(now + Duration::from_secs(3600)),
        }));
        assert!(calls.contains(&Call::Delete {
            chat: ChatId(7),
            message: MessageId(55),
        }));
        assert_eq!(store.user_stats(OFFENDER).await.unwrap().mutes, 1);
    }

    #[tokio::test]
    async fn test_second_resolution_is_a_no_op() {
        let (store, platform, workflow) = setup().await;
        let report = file(&workflow).await;
        let now = SystemTime::now();

        workflow
            .resolve(report.id, MOD_A, ReportAction::View, now)
            .await
            .unwrap();
        let before = platform.calls().len();

        let outcome = workflow
            .resolve(report.id, MOD_B, ReportAction::Ban, now)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ResolutionOutcome::AlreadyResolved(ReportStatus::Viewed)
        );
        // No platform action, no audit record for the loser.
        assert_eq!(platform.calls().len(), before);
        assert_eq!(store.user_stats(OFFENDER).await.unwrap().bans, 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_resolutions_exactly_once() {
        let (store, platform, workflow) = setup().await;
        let workflow = Arc::new(workflow);
        let report = file(&workflow).await;
        let now = SystemTime::now();

        let (a, b) = tokio::join!(
            workflow.resolve(report.id, MOD_A, ReportAction::Mute, now),
            workflow.resolve(report.id, MOD_B, ReportAction::Ban, now),
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        let winners = outcomes
            .iter()
            .filter(|o| matches!(o, ResolutionOutcome::Resolved(_)))
            .count();
        assert_eq!(winners, 1);

        // Exactly one platform action path ran: either a mute or a ban,
        // never both.
        let stats = store.user_stats(OFFENDER).await.unwrap();
        assert_eq!(stats.mutes + stats.bans, 1);
        let actions = platform
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Restrict { .. } | Call::Ban { .. }))
            .count();
        assert_eq!(actions, 1);
    }

    #[tokio::test]
    async fn test_delete_degrades_when_message_gone() {
        let (_, platform, workflow) = setup().await;
        platform.fail_delete_with(PlatformError::MessageNotFound {
            chat: ChatId(7),
            message: MessageId(55),
        });
        let report = file(&workflow).await;

        let outcome = workflow
            .resolve(report.id, MOD_A, ReportAction::Delete, SystemTime::now())
            .await
            .unwrap();
        assert_eq!(outcome, ResolutionOutcome::Resolved(ReportStatus::Deleted));
    }

    #[tokio::test]
    async fn test_ban_failure_surfaces_but_status_stays_terminal() {
        let (store, platform, workflow) = setup().await;
        platform.fail_ban_with(PlatformError::Rejected("insufficient rights".into()));
        let report = file(&workflow).await;

        let err = workflow
            .resolve(report.id, MOD_A, ReportAction::Ban, SystemTime::now())
            .await
            .unwrap_err();
        assert!(matches!(err, warden_core::ModerationError::Platform(_)));

        // The transition already happened; no retry will occur.
        let stored = store.get_report(report.id).await.unwrap();
        assert_eq!(stored.status, ReportStatus::Banned);
        assert_eq!(store.user_stats(OFFENDER).await.unwrap().bans, 0);
    }
}
