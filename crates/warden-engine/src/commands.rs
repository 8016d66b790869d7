//! Moderator-invoked operations.
//!
//! The operator surface of the engine: level changes, manual mutes and
//! unmutes, bans and unbans, and the read-only roster and stats
//! queries. Transport wiring (command parsing, replies) is external;
//! this layer takes resolved identities and returns outcome values.
//!
//! Denials are values, never errors — see the error taxonomy in
//! [`warden_core::error`].

use std::time::{Duration, SystemTime};

use futures::StreamExt;
use tracing::{info, warn};

use warden_core::error::{ModerationError, ModerationResult};
use warden_core::level::TrustLevel;
use warden_core::permission::{can_ban, can_mute, check_set_level};
use warden_core::platform::{MemberInfo, PermissionSet, SharedPlatform};
use warden_core::record::{BanRecord, MuteRecord, UserRecord, UserStats};
use warden_core::store::Stores;
use warden_core::types::{ChatId, UserId};

/// Result of a moderator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A level change was applied.
    LevelChanged {
        /// The affected user.
        user: UserId,
        /// Level before the change.
        old: TrustLevel,
        /// Level after the change.
        new: TrustLevel,
    },
    /// A mute was applied.
    Muted {
        /// The muted user.
        user: UserId,
        /// When the restriction lapses.
        until: SystemTime,
    },
    /// Restrictions were lifted.
    Unmuted {
        /// The affected user.
        user: UserId,
    },
    /// A ban was applied.
    Banned {
        /// The banned user.
        user: UserId,
    },
    /// A ban was lifted (or none existed; that is the same outcome).
    Unbanned {
        /// The affected user.
        user: UserId,
    },
    /// The actor is not authorized; carries the user-facing reason.
    Denied(String),
}

/// Moderator command execution over the stores and platform client.
pub struct ModerationService {
    stores: Stores,
    platform: SharedPlatform,
    /// Fallback duration when a mute command does not specify one.
    default_mute: Duration,
}

impl ModerationService {
    /// Creates the service.
    pub fn new(stores: Stores, platform: SharedPlatform, default_mute: Duration) -> Self {
        Self {
            stores,
            platform,
            default_mute,
        }
    }

    /// Sets `target`'s trust level to `requested`.
    ///
    /// `requested` is the raw integer from the command line; range
    /// rejection happens here, before any state is touched.
    pub async fn set_level(
        &self,
        actor: UserId,
        target: &MemberInfo,
        requested: i64,
    ) -> ModerationResult<CommandOutcome> {
        let requested = TrustLevel::try_from(requested)?;

        let actor_level = self.stores.directory.level_of(actor).await?;
        if actor_level < TrustLevel::ADMIN_FLOOR {
            return Ok(CommandOutcome::Denied(
                "only admins can change levels".into(),
            ));
        }

        let target_level = self.stores.directory.level_of(target.id).await?;
        let target_senior = self.stores.directory.is_senior(target.id).await?;
        if let Err(denied) = check_set_level(
            actor_level,
            target_level,
            requested,
            target_senior,
            actor == target.id,
        ) {
            return Ok(CommandOutcome::Denied(denied.to_string()));
        }

        self.stores
            .directory
            .set_level(
                target.id,
                requested,
                target.username.as_deref(),
                target.first_name.as_deref(),
            )
            .await?;

        info!(%actor, target = %target.id, old = %target_level, new = %requested, "level changed");
        Ok(CommandOutcome::LevelChanged {
            user: target.id,
            old: target_level,
            new: requested,
        })
    }

    /// Mutes `target` for `duration` (or the configured default).
    pub async fn mute(
        &self,
        chat: ChatId,
        actor: UserId,
        target: UserId,
        duration: Option<Duration>,
        reason: &str,
        now: SystemTime,
    ) -> ModerationResult<CommandOutcome> {
        let duration = duration.unwrap_or(self.default_mute);
        if duration.is_zero() {
            return Err(ModerationError::InvalidInput(
                "mute duration must be positive".into(),
            ));
        }

        let actor_level = self.stores.directory.level_of(actor).await?;
        let target_level = self.stores.directory.level_of(target).await?;
        let target_senior = self.stores.directory.is_senior(target).await?;
        if !can_mute(actor_level, target_level, target_senior, actor == target) {
            return Ok(CommandOutcome::Denied(
                "insufficient authority to mute this user".into(),
            ));
        }

        let until = now + duration;
        self.platform
            .restrict_user(chat, target, PermissionSet::MUTED, Some(until))
            .await?;
        self.stores
            .audit
            .record_mute(MuteRecord {
                user: target,
                reason: reason.to_owned(),
                actor,
                issued_at: now,
                until,
            })
            .await?;

        info!(%actor, %target, ?duration, "user muted");
        Ok(CommandOutcome::Muted { user: target, until })
    }

    /// Lifts restrictions on `target`.
    pub async fn unmute(
        &self,
        chat: ChatId,
        actor: UserId,
        target: UserId,
    ) -> ModerationResult<CommandOutcome> {
        let actor_level = self.stores.directory.level_of(actor).await?;
        if actor_level < TrustLevel::MODERATOR_FLOOR {
            return Ok(CommandOutcome::Denied(
                "only moderators and above can unmute".into(),
            ));
        }
        let target_level = self.stores.directory.level_of(target).await?;
        if actor != target && actor_level <= target_level {
            return Ok(CommandOutcome::Denied(
                "cannot unmute a user at or above your level".into(),
            ));
        }

        self.platform
            .restrict_user(chat, target, PermissionSet::UNRESTRICTED, None)
            .await?;

        info!(%actor, %target, "user unmuted");
        Ok(CommandOutcome::Unmuted { user: target })
    }

    /// Bans `target` from the chat.
    pub async fn ban(
        &self,
        chat: ChatId,
        actor: UserId,
        target: UserId,
        reason: &str,
        now: SystemTime,
    ) -> ModerationResult<CommandOutcome> {
        let actor_level = self.stores.directory.level_of(actor).await?;
        let target_level = self.stores.directory.level_of(target).await?;
        let target_senior = self.stores.directory.is_senior(target).await?;
        if !can_ban(actor_level, target_level, target_senior) {
            return Ok(CommandOutcome::Denied(
                "insufficient authority to ban this user".into(),
            ));
        }

        self.platform.ban_user(chat, target).await?;
        self.stores
            .audit
            .record_ban(BanRecord {
                user: target,
                reason: reason.to_owned(),
                actor,
                issued_at: now,
            })
            .await?;

        info!(%actor, %target, "user banned");
        Ok(CommandOutcome::Banned { user: target })
    }

    /// Lifts a ban on `target`. Unbanning a user who is not banned is a
    /// benign outcome and reports success.
    pub async fn unban(
        &self,
        chat: ChatId,
        actor: UserId,
        target: UserId,
    ) -> ModerationResult<CommandOutcome> {
        let actor_level = self.stores.directory.level_of(actor).await?;
        if actor_level < TrustLevel::BAN_FLOOR {
            return Ok(CommandOutcome::Denied(
                "insufficient authority to unban".into(),
            ));
        }

        match self.platform.unban_user(chat, target).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                // Already unbanned, or never a member: same outcome.
            }
            Err(err) => {
                warn!(%target, error = %err, "failed to unban user");
                return Err(err.into());
            }
        }
        self.stores.audit.remove_bans(target).await?;

        info!(%actor, %target, "user unbanned");
        Ok(CommandOutcome::Unbanned { user: target })
    }

    /// Discovers the chat creator from the platform and promotes them to
    /// a persisted senior identity. Returns the creator if one was seen.
    ///
    /// Platform failures here are non-fatal: the caller keeps whatever
    /// senior set it already has.
    pub async fn sync_chat_owner(&self, chat: ChatId) -> ModerationResult<Option<UserId>> {
        let admins = match self.platform.list_administrators(chat).await {
            Ok(admins) => admins,
            Err(err) => {
                warn!(%chat, error = %err, "failed to query chat administrators");
                return Ok(None);
            }
        };

        for admin in admins {
            if admin.is_creator {
                self.stores.directory.promote_senior(admin.member.id).await?;
                self.stores
                    .directory
                    .set_level(
                        admin.member.id,
                        TrustLevel::SeniorAdmin,
                        admin.member.username.as_deref(),
                        admin.member.first_name.as_deref(),
                    )
                    .await?;
                return Ok(Some(admin.member.id));
            }
        }
        Ok(None)
    }

    /// Refreshes cached display metadata for every current chat member.
    pub async fn refresh_members(&self, chat: ChatId) -> ModerationResult<usize> {
        let mut members = self.platform.list_members(chat);
        let mut refreshed = 0;
        while let Some(member) = members.next().await {
            let member = member?;
            self.stores
                .directory
                .touch_metadata(
                    member.id,
                    member.username.as_deref(),
                    member.first_name.as_deref(),
                )
                .await?;
            refreshed += 1;
        }
        Ok(refreshed)
    }

    /// Per-user activity totals.
    pub async fn user_stats(&self, user: UserId) -> ModerationResult<UserStats> {
        Ok(self.stores.audit.user_stats(user).await?)
    }

    /// All known users grouped by level, highest first.
    pub async fn roster(&self) -> ModerationResult<Vec<(TrustLevel, Vec<UserRecord>)>> {
        let users = self.stores.directory.all_users().await?;
        let mut grouped: Vec<(TrustLevel, Vec<UserRecord>)> = TrustLevel::descending()
            .map(|level| (level, Vec::new()))
            .collect();
        for user in users {
            if let Some((_, bucket)) = grouped.iter_mut().find(|(level, _)| *level == user.level) {
                bucket.push(user);
            }
        }
        grouped.retain(|(_, bucket)| !bucket.is_empty());
        Ok(grouped)
    }
}
