//! # Warden Engine
//!
//! The moderation engine proper: automatic enforcement over behavioral
//! history ([`EnforcementCoordinator`]), report triage
//! ([`ReportWorkflow`]), the moderator command surface
//! ([`ModerationService`]), per-user serialization gates and the
//! in-memory store.
//!
//! The engine consumes the chat platform and persistence exclusively
//! through the trait interfaces in `warden-core`; it never performs
//! I/O of its own beyond those handles.

pub mod commands;
pub mod coordinator;
pub mod gate;
pub mod memory;
pub mod report;

#[cfg(test)]
pub(crate) mod testutil;

pub use commands::{CommandOutcome, ModerationService};
pub use coordinator::{EnforcementCoordinator, EnforcementOutcome, EnforcementPolicy};
pub use gate::UserGates;
pub use memory::MemoryStore;
pub use report::{FileOutcome, ReportAction, ReportWorkflow, ResolutionOutcome};
