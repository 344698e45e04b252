use std::sync::Arc;

use tracing::{debug, info};

use super::config::{LifecycleConfig, PublishPolicy};
use super::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationStatus, HistoryEntry,
    NewApplication, Page, PageRequest,
};
use super::guard;
use super::repository::{
    ApplicationRepository, ApplicationTransaction, HistoryError, HistoryRecorder, RepositoryError,
};
use super::transitions::{allowed_sources, transition, LifecycleOperation, Transition};

/// Service enforcing the moderation lifecycle over a record store and history recorder.
///
/// Each mutating call runs inside one store transaction: load, guard, save, append history.
/// A failure at any step, including the history append, leaves no write behind.
pub struct LifecycleService<R, H> {
    repository: Arc<R>,
    recorder: Arc<H>,
    config: LifecycleConfig,
}

impl<R, H> LifecycleService<R, H>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    pub fn new(repository: Arc<R>, recorder: Arc<H>, config: LifecycleConfig) -> Self {
        Self {
            repository,
            recorder,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Create a record in `CREATED` status, or return the existing record with the same name
    /// and content.
    pub fn create(&self, draft: NewApplication) -> Result<Application, LifecycleError> {
        guard::validate_new_application(&draft)?;

        self.in_transaction(|tx| {
            if let Some(existing) = tx.find_by_name_and_content(&draft.name, &draft.content)? {
                debug!(application_id = %existing.id, "duplicate submission, returning existing record");
                return Ok(existing);
            }

            let record = tx.insert(draft)?;
            self.recorder
                .append(HistoryEntry::transition(record.id, record.status))?;
            info!(application_id = %record.id, status = %record.status, "application created");
            Ok(record)
        })
    }

    /// Replace the content of a `CREATED` or `VERIFIED` record. Identical content is a no-op.
    pub fn update_content(
        &self,
        id: ApplicationId,
        content: &str,
    ) -> Result<Application, LifecycleError> {
        guard::require_content(content)?;
        let operation = LifecycleOperation::UpdateContent;

        self.in_transaction(|tx| {
            let mut record = load(tx, id)?;
            if transition(operation, record.status) != Transition::Retain {
                return Err(forbidden(operation, record.status));
            }
            if record.content == content {
                debug!(application_id = %id, "content unchanged, skipping write");
                return Ok(record);
            }

            record.content = content.to_string();
            tx.save(&record)?;
            self.recorder
                .append(HistoryEntry::content_edit(record.id, record.status))?;
            info!(application_id = %id, status = %record.status, "application content updated");
            Ok(record)
        })
    }

    pub fn verify(&self, id: ApplicationId) -> Result<Application, LifecycleError> {
        self.advance(id, LifecycleOperation::Verify)
    }

    pub fn accept(&self, id: ApplicationId) -> Result<Application, LifecycleError> {
        self.advance(id, LifecycleOperation::Accept)
    }

    /// Reject a `VERIFIED` or `ACCEPTED` record. Repeating a rejection with the same reason is
    /// a no-op.
    pub fn reject(&self, id: ApplicationId, reason: &str) -> Result<Application, LifecycleError> {
        self.close_with_reason(id, LifecycleOperation::Reject, reason, "rejecting")
    }

    /// Mark a `CREATED` record as `DELETED`. The record itself is kept.
    pub fn delete(&self, id: ApplicationId, reason: &str) -> Result<Application, LifecycleError> {
        self.close_with_reason(id, LifecycleOperation::Delete, reason, "deleting")
    }

    /// Publish an `ACCEPTED` record, assigning the next published number.
    pub fn publish(&self, id: ApplicationId) -> Result<Application, LifecycleError> {
        let operation = LifecycleOperation::Publish;

        self.in_transaction(|tx| {
            let mut record = load(tx, id)?;
            let Some(next) = self.resolve(operation, &record, None)? else {
                return Ok(record);
            };

            let current = tx.max_published_number()?.unwrap_or(0);
            let number = current
                .checked_add(1)
                .ok_or(RepositoryError::SequenceExhausted)?;
            record.published_number = Some(number);
            self.apply(tx, record, operation, next)
        })
    }

    pub fn get(&self, id: ApplicationId) -> Result<Application, LifecycleError> {
        self.repository
            .find(id)?
            .ok_or(LifecycleError::ApplicationNotFound(id))
    }

    /// History entries for a record, oldest first.
    pub fn history(&self, id: ApplicationId) -> Result<Vec<HistoryEntry>, LifecycleError> {
        self.get(id)?;
        Ok(self.recorder.entries(id)?)
    }

    /// Filtered, paginated listing. A filtered query that matches nothing is reported as not
    /// found; an unfiltered query may return an empty page.
    pub fn list(
        &self,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<Application>, LifecycleError> {
        guard::require_search_name(filter.name.as_deref())?;

        let results = self
            .repository
            .search(filter, page)
            .map_err(LifecycleError::DatabaseOperation)?;

        if results.is_empty() && !filter.is_unfiltered() {
            return Err(LifecycleError::NoMatchingApplications(describe_filter(
                filter,
            )));
        }
        Ok(results)
    }

    fn in_transaction<T>(
        &self,
        work: impl FnOnce(&mut dyn ApplicationTransaction) -> Result<T, LifecycleError>,
    ) -> Result<T, LifecycleError> {
        self.repository.transact(work)
    }

    fn advance(
        &self,
        id: ApplicationId,
        operation: LifecycleOperation,
    ) -> Result<Application, LifecycleError> {
        self.in_transaction(|tx| {
            let record = load(tx, id)?;
            match self.resolve(operation, &record, None)? {
                Some(next) => self.apply(tx, record, operation, next),
                None => Ok(record),
            }
        })
    }

    fn close_with_reason(
        &self,
        id: ApplicationId,
        operation: LifecycleOperation,
        reason: &str,
        action: &str,
    ) -> Result<Application, LifecycleError> {
        self.in_transaction(|tx| {
            let mut record = load(tx, id)?;
            let Some(next) = self.resolve(operation, &record, Some(reason))? else {
                return Ok(record);
            };

            guard::require_reason(reason, action)?;
            record.reason = Some(reason.to_string());
            self.apply(tx, record, operation, next)
        })
    }

    /// Looks up the transition table. `Ok(None)` means the call is an idempotent repeat.
    fn resolve(
        &self,
        operation: LifecycleOperation,
        record: &Application,
        reason: Option<&str>,
    ) -> Result<Option<ApplicationStatus>, LifecycleError> {
        match transition(operation, record.status) {
            Transition::Advance(next) => Ok(Some(next)),
            Transition::Retain => Ok(Some(record.status)),
            Transition::Forbidden => Err(forbidden(operation, record.status)),
            Transition::AlreadyApplied => match operation {
                LifecycleOperation::Reject if record.reason.as_deref() != reason => {
                    Err(forbidden(operation, record.status))
                }
                LifecycleOperation::Publish
                    if self.config.publish_policy == PublishPolicy::RejectRepublish =>
                {
                    Err(LifecycleError::AlreadyPublished(record.id))
                }
                _ => {
                    debug!(application_id = %record.id, %operation, status = %record.status, "transition already applied");
                    Ok(None)
                }
            },
        }
    }

    fn apply(
        &self,
        tx: &mut dyn ApplicationTransaction,
        mut record: Application,
        operation: LifecycleOperation,
        next: ApplicationStatus,
    ) -> Result<Application, LifecycleError> {
        let previous = record.status;
        record.status = next;
        tx.save(&record)?;
        // Must stay the last fallible step: the staged save commits only once this succeeds.
        self.recorder
            .append(HistoryEntry::transition(record.id, next))?;
        info!(
            application_id = %record.id,
            %operation,
            from = %previous,
            to = %next,
            published_number = record.published_number,
            "application transitioned"
        );
        Ok(record)
    }
}

fn load(
    tx: &mut dyn ApplicationTransaction,
    id: ApplicationId,
) -> Result<Application, LifecycleError> {
    tx.find_for_update(id)?
        .ok_or(LifecycleError::ApplicationNotFound(id))
}

fn forbidden(operation: LifecycleOperation, status: ApplicationStatus) -> LifecycleError {
    match operation {
        LifecycleOperation::UpdateContent => LifecycleError::ContentEditNotAllowed(status),
        _ => LifecycleError::InvalidStatus { operation, status },
    }
}

fn describe_sources(operation: &LifecycleOperation) -> String {
    allowed_sources(*operation)
        .iter()
        .map(|status| status.label())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn describe_filter(filter: &ApplicationFilter) -> String {
    match (&filter.name, filter.status) {
        (Some(name), Some(status)) => format!("name '{name}' and status {status}"),
        (Some(name), None) => format!("name '{name}'"),
        (None, Some(status)) => format!("status {status}"),
        (None, None) => "the provided filters".to_string(),
    }
}

/// Error raised by the lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("application not found with id {0}")]
    ApplicationNotFound(ApplicationId),
    #[error("no applications found with {0}")]
    NoMatchingApplications(String),
    #[error(
        "cannot {operation} an application in {status} status (allowed from {})",
        describe_sources(.operation)
    )]
    InvalidStatus {
        operation: LifecycleOperation,
        status: ApplicationStatus,
    },
    #[error("content can only be edited in CREATED or VERIFIED status (current status {0})")]
    ContentEditNotAllowed(ApplicationStatus),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("application {0} is already published")]
    AlreadyPublished(ApplicationId),
    #[error("error occurred while accessing the database: {0}")]
    DatabaseOperation(#[source] RepositoryError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    History(#[from] HistoryError),
}
