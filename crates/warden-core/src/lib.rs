//! # Warden Core
//!
//! The domain foundation of the Warden moderation engine: trust levels,
//! authorization checks, burst detection, record types, and the trait
//! interfaces to the chat platform and the persistence layer.
//!
//! This crate performs no I/O of its own. The decision functions in
//! [`permission`] and [`spam`] are pure; everything stateful happens in
//! `warden-engine` behind the [`store`] and [`platform`] traits.

pub mod error;
pub mod level;
pub mod permission;
pub mod platform;
pub mod record;
pub mod spam;
pub mod store;
pub mod types;

pub use error::{
    ModerationError, ModerationResult, PlatformError, PlatformResult, StoreError, StoreResult,
};
pub use level::{InvalidLevel, TrustLevel};
pub use permission::{SetLevelDenied, can_ban, can_mute, check_set_level};
pub use platform::{ChatAdmin, MemberInfo, PermissionSet, PlatformClient, SharedPlatform};
pub use record::{
    BanRecord, MessageEntry, MuteRecord, Report, ReportId, ReportStatus, StickerEntry, UserRecord,
    UserStats,
};
pub use spam::{SpamPolicy, emoji_burst_triggered, is_emoji_only, sticker_burst_triggered};
pub use store::{AuditLog, HistoryStore, ReportStore, ResolveOutcome, Stores, UserDirectory};
pub use types::{ChatId, MessageId, MessageRef, UserId};
