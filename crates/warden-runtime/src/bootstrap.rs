//! Startup wiring for the moderation engine.
//!
//! Assembles the stores, the enforcement coordinator, the report
//! workflow and the moderation command service from a loaded
//! configuration and a platform client.

use std::sync::Arc;

use warden_core::SharedPlatform;
use warden_core::store::Stores;
use warden_core::types::UserId;
use warden_engine::commands::ModerationService;
use warden_engine::coordinator::EnforcementCoordinator;
use warden_engine::memory::MemoryStore;
use warden_engine::report::ReportWorkflow;

use crate::config::WardenConfig;

/// A fully wired moderation engine.
///
/// All components share one set of stores; the record a coordinator
/// writes is the record a report resolution reads.
pub struct ModerationEngine {
    /// Message and sticker enforcement.
    pub coordinator: EnforcementCoordinator,
    /// Report filing and resolution.
    pub reports: ReportWorkflow,
    /// Moderator-invoked commands.
    pub commands: ModerationService,
    /// The shared store handles, for direct queries.
    pub stores: Stores,
}

impl ModerationEngine {
    /// Wires an engine backed by in-memory stores.
    ///
    /// `engine_actor` identifies the engine itself in audit records for
    /// automatic mutes.
    pub fn from_config(
        config: &WardenConfig,
        platform: SharedPlatform,
        engine_actor: UserId,
    ) -> Self {
        let store = Arc::new(MemoryStore::new(config.moderation.senior_ids()));
        let stores = Stores {
            directory: store.clone(),
            history: store.clone(),
            audit: store.clone(),
            reports: store,
        };

        let coordinator = EnforcementCoordinator::new(
            stores.clone(),
            platform.clone(),
            config.moderation.enforcement_policy(),
            engine_actor,
        );
        let reports = ReportWorkflow::new(
            stores.clone(),
            platform.clone(),
            config.moderation.moderator_mute(),
        );
        let commands =
            ModerationService::new(stores.clone(), platform, config.moderation.moderator_mute());

        Self {
            coordinator,
            reports,
            commands,
            stores,
        }
    }
}
