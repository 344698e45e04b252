use std::fmt;

use serde::{Deserialize, Serialize};

/// How `publish` treats a record that is already `PUBLISHED`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishPolicy {
    /// Return the record unchanged.
    #[default]
    Idempotent,
    /// Fail with `LifecycleError::AlreadyPublished`.
    RejectRepublish,
}

impl PublishPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "idempotent" | "noop" | "no-op" => Some(Self::Idempotent),
            "reject" | "error" | "reject_republish" => Some(Self::RejectRepublish),
            _ => None,
        }
    }
}

impl fmt::Display for PublishPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishPolicy::Idempotent => f.write_str("idempotent"),
            PublishPolicy::RejectRepublish => f.write_str("reject"),
        }
    }
}

/// Behavioral dials for the lifecycle service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub publish_policy: PublishPolicy,
}
