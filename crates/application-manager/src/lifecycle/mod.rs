//! Moderation lifecycle for submitted applications.
//!
//! Records move `CREATED -> VERIFIED -> ACCEPTED -> PUBLISHED`, may be rejected from
//! `VERIFIED`/`ACCEPTED` or deleted from `CREATED`, and every transition leaves one entry in the
//! history log. The service is generic over the record store and history recorder so the
//! in-memory adapters in [`memory`] can be swapped for a database without touching the guards.

pub mod config;
pub mod domain;
pub(crate) mod guard;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;

#[cfg(test)]
mod tests;

pub use config::{LifecycleConfig, PublishPolicy};
pub use domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationStatus, ApplicationView,
    HistoryEntry, HistoryEntryView, NewApplication, Page, PageRequest,
};
pub use guard::MAX_REASON_LENGTH;
pub use memory::{InMemoryApplicationRepository, InMemoryHistoryRecorder};
pub use repository::{
    ApplicationRepository, ApplicationTransaction, HistoryError, HistoryRecorder, RepositoryError,
};
pub use router::{application_router, APPLICATIONS_PATH};
pub use service::{LifecycleError, LifecycleService};
pub use transitions::{transition, LifecycleOperation, Transition};
