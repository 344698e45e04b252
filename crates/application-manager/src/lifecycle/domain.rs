use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the record store when an application is first inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Moderation status of an application. The set is closed; every record carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Created,
    Verified,
    Accepted,
    Rejected,
    Published,
    Deleted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Created,
        ApplicationStatus::Verified,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Published,
        ApplicationStatus::Deleted,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Created => "CREATED",
            ApplicationStatus::Verified => "VERIFIED",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Published => "PUBLISHED",
            ApplicationStatus::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Input accepted by `create` before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApplication {
    pub name: String,
    pub content: String,
}

impl NewApplication {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Stored application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub name: String,
    pub content: String,
    pub status: ApplicationStatus,
    /// Populated only by reject and delete.
    pub reason: Option<String>,
    /// Assigned once, on first publish.
    pub published_number: Option<u32>,
}

impl Application {
    /// Builds a freshly inserted record in `CREATED` status.
    pub fn created(id: ApplicationId, draft: NewApplication) -> Self {
        Self {
            id,
            name: draft.name,
            content: draft.content,
            status: ApplicationStatus::Created,
            reason: None,
            published_number: None,
        }
    }

    pub fn view(&self) -> ApplicationView {
        ApplicationView {
            id: self.id,
            name: self.name.clone(),
            content: self.content.clone(),
            status: self.status.label(),
            published_number: self.published_number,
            reason: self.reason.clone(),
        }
    }
}

/// Immutable audit entry for one transition or content edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Owning record. Lookup only; the entry does not keep the record alive.
    pub application_id: ApplicationId,
    pub timestamp: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub content_updated: bool,
}

impl HistoryEntry {
    pub fn transition(application_id: ApplicationId, status: ApplicationStatus) -> Self {
        Self {
            application_id,
            timestamp: Utc::now(),
            status,
            content_updated: false,
        }
    }

    pub fn content_edit(application_id: ApplicationId, status: ApplicationStatus) -> Self {
        Self {
            content_updated: true,
            ..Self::transition(application_id, status)
        }
    }

    pub fn view(&self) -> HistoryEntryView {
        HistoryEntryView {
            application_id: self.application_id,
            timestamp: self.timestamp,
            status: self.status.label(),
            content_updated: self.content_updated,
        }
    }
}

/// Public representation of an application returned by the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub name: String,
    pub content: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntryView {
    pub application_id: ApplicationId,
    pub timestamp: DateTime<Utc>,
    pub status: &'static str,
    pub content_updated: bool,
}

/// Optional filters for the listing query. Name matching is a case-sensitive substring match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicationFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationFilter {
    pub fn is_unfiltered(&self) -> bool {
        self.name.is_none() && self.status.is_none()
    }

    pub fn matches(&self, application: &Application) -> bool {
        let name_matches = self
            .name
            .as_deref()
            .map_or(true, |needle| application.name.contains(needle));
        let status_matches = self
            .status
            .map_or(true, |status| application.status == status);
        name_matches && status_matches
    }
}

/// Zero-based page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_SIZE)
    }
}

/// One page of results plus totals over the whole match set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Slices `matches` (already ordered) according to `request`.
    pub fn from_matches(matches: Vec<T>, request: PageRequest) -> Self {
        let total_items = matches.len();
        let items = matches
            .into_iter()
            .skip(request.offset())
            .take(request.size)
            .collect();
        Self {
            items,
            page: request.page,
            size: request.size,
            total_items,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.size.max(1))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
        }
    }
}
