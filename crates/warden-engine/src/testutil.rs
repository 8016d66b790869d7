//! Shared test doubles for the engine test suites.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;

use warden_core::error::{PlatformError, PlatformResult};
use warden_core::platform::{ChatAdmin, MemberInfo, PermissionSet, PlatformClient};
use warden_core::types::{ChatId, MessageId, UserId};

/// One platform call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Restrict {
        chat: ChatId,
        user: UserId,
        muted: bool,
        until: Option<SystemTime>,
    },
    Ban {
        chat: ChatId,
        user: UserId,
    },
    Unban {
        chat: ChatId,
        user: UserId,
    },
    Delete {
        chat: ChatId,
        message: MessageId,
    },
    ListAdmins {
        chat: ChatId,
    },
}

/// A platform client that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<Call>>,
    admins: Mutex<Vec<ChatAdmin>>,
    members: Mutex<Vec<MemberInfo>>,
    fail_restrict: Mutex<Option<PlatformError>>,
    fail_delete: Mutex<Option<PlatformError>>,
    fail_ban: Mutex<Option<PlatformError>>,
    fail_unban: Mutex<Option<PlatformError>>,
}

impl RecordingPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn set_admins(&self, admins: Vec<ChatAdmin>) {
        *self.admins.lock() = admins;
    }

    pub fn set_members(&self, members: Vec<MemberInfo>) {
        *self.members.lock() = members;
    }

    pub fn fail_restrict_with(&self, err: PlatformError) {
        *self.fail_restrict.lock() = Some(err);
    }

    pub fn fail_delete_with(&self, err: PlatformError) {
        *self.fail_delete.lock() = Some(err);
    }

    pub fn fail_ban_with(&self, err: PlatformError) {
        *self.fail_ban.lock() = Some(err);
    }

    pub fn fail_unban_with(&self, err: PlatformError) {
        *self.fail_unban.lock() = Some(err);
    }
}

#[async_trait]
impl PlatformClient for RecordingPlatform {
    async fn restrict_user(
        &self,
        chat: ChatId,
        user: UserId,
        permissions: PermissionSet,
        until: Option<SystemTime>,
    ) -> PlatformResult<()> {
        if let Some(err) = self.fail_restrict.lock().clone() {
            return Err(err);
        }
        self.calls.lock().push(Call::Restrict {
            chat,
            user,
            muted: !permissions.can_send_messages,
            until,
        });
        Ok(())
    }

    async fn ban_user(&self, chat: ChatId, user: UserId) -> PlatformResult<()> {
        if let Some(err) = self.fail_ban.lock().clone() {
            return Err(err);
        }
        self.calls.lock().push(Call::Ban { chat, user });
        Ok(())
    }

    async fn unban_user(&self, chat: ChatId, user: UserId) -> PlatformResult<()> {
        if let Some(err) = self.fail_unban.lock().clone() {
            return Err(err);
        }
        self.calls.lock().push(Call::Unban { chat, user });
        Ok(())
    }

    async fn delete_message(&self, chat: ChatId, message: MessageId) -> PlatformResult<()> {
        if let Some(err) = self.fail_delete.lock().clone() {
            return Err(err);
        }
        self.calls.lock().push(Call::Delete { chat, message });
        Ok(())
    }

    async fn list_administrators(&self, chat: ChatId) -> PlatformResult<Vec<ChatAdmin>> {
        self.calls.lock().push(Call::ListAdmins { chat });
        Ok(self.admins.lock().clone())
    }

    fn list_members(&self, _chat: ChatId) -> BoxStream<'_, PlatformResult<MemberInfo>> {
        let members = self.members.lock().clone();
        stream::iter(members.into_iter().map(Ok)).boxed()
    }
}
