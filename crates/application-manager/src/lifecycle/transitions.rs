//! Fixed transition table for the moderation lifecycle.
//!
//! ```text
//! CREATED ──verify──▶ VERIFIED ──accept──▶ ACCEPTED ──publish──▶ PUBLISHED
//!    │                   │                    │
//!    └─delete─▶ DELETED  └──reject──▶ REJECTED ◀──reject──┘
//! ```
//!
//! Every `(operation, status)` pair resolves to exactly one [`Transition`]. The match is
//! exhaustive so adding a status or an operation fails to compile until the table covers it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::ApplicationStatus;

/// Operations that act on an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleOperation {
    UpdateContent,
    Verify,
    Accept,
    Reject,
    Delete,
    Publish,
}

impl LifecycleOperation {
    pub const ALL: [LifecycleOperation; 6] = [
        LifecycleOperation::UpdateContent,
        LifecycleOperation::Verify,
        LifecycleOperation::Accept,
        LifecycleOperation::Reject,
        LifecycleOperation::Delete,
        LifecycleOperation::Publish,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LifecycleOperation::UpdateContent => "update_content",
            LifecycleOperation::Verify => "verify",
            LifecycleOperation::Accept => "accept",
            LifecycleOperation::Reject => "reject",
            LifecycleOperation::Delete => "delete",
            LifecycleOperation::Publish => "publish",
        }
    }
}

impl fmt::Display for LifecycleOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of looking up an operation against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Move to the given status.
    Advance(ApplicationStatus),
    /// Allowed without a status change (content edits).
    Retain,
    /// The record already sits in the operation's target status.
    AlreadyApplied,
    /// Illegal from the current status.
    Forbidden,
}

pub const fn transition(
    operation: LifecycleOperation,
    status: ApplicationStatus,
) -> Transition {
    use ApplicationStatus as S;
    use LifecycleOperation as Op;

    match (operation, status) {
        (Op::UpdateContent, S::Created | S::Verified) => Transition::Retain,
        (Op::UpdateContent, S::Accepted | S::Rejected | S::Published | S::Deleted) => {
            Transition::Forbidden
        }

        (Op::Verify, S::Created) => Transition::Advance(S::Verified),
        (Op::Verify, S::Verified) => Transition::AlreadyApplied,
        (Op::Verify, S::Accepted | S::Rejected | S::Published | S::Deleted) => {
            Transition::Forbidden
        }

        (Op::Accept, S::Verified) => Transition::Advance(S::Accepted),
        (Op::Accept, S::Accepted) => Transition::AlreadyApplied,
        (Op::Accept, S::Created | S::Rejected | S::Published | S::Deleted) => {
            Transition::Forbidden
        }

        (Op::Reject, S::Verified | S::Accepted) => Transition::Advance(S::Rejected),
        (Op::Reject, S::Rejected) => Transition::AlreadyApplied,
        (Op::Reject, S::Created | S::Published | S::Deleted) => Transition::Forbidden,

        (Op::Delete, S::Created) => Transition::Advance(S::Deleted),
        (Op::Delete, S::Deleted) => Transition::AlreadyApplied,
        (Op::Delete, S::Verified | S::Accepted | S::Rejected | S::Published) => {
            Transition::Forbidden
        }

        (Op::Publish, S::Accepted) => Transition::Advance(S::Published),
        (Op::Publish, S::Published) => Transition::AlreadyApplied,
        (Op::Publish, S::Created | S::Verified | S::Rejected | S::Deleted) => {
            Transition::Forbidden
        }
    }
}

/// Statuses from which `operation` is legal (excluding idempotent re-invocation).
pub fn allowed_sources(operation: LifecycleOperation) -> Vec<ApplicationStatus> {
    ApplicationStatus::ALL
        .into_iter()
        .filter(|status| {
            matches!(
                transition(operation, *status),
                Transition::Advance(_) | Transition::Retain
            )
        })
        .collect()
}
