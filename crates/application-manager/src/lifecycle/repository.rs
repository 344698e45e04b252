use super::domain::{
    Application, ApplicationFilter, ApplicationId, HistoryEntry, NewApplication, Page, PageRequest,
};

/// Storage abstraction so the lifecycle service can be exercised in isolation.
///
/// Mutations go through [`ApplicationRepository::transact`]: everything staged on the
/// transaction becomes visible only if the closure returns `Ok`, and concurrent transactions
/// never observe each other's uncommitted state.
pub trait ApplicationRepository: Send + Sync {
    fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ApplicationTransaction) -> Result<T, E>,
        E: From<RepositoryError>;

    fn find(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;

    /// Records matching `filter`, ordered by id, sliced to `page`.
    fn search(
        &self,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError>;
}

/// Operations available inside one store transaction.
pub trait ApplicationTransaction {
    /// Reads a record and holds it for the remainder of the transaction.
    fn find_for_update(&mut self, id: ApplicationId)
        -> Result<Option<Application>, RepositoryError>;

    fn find_by_name_and_content(
        &mut self,
        name: &str,
        content: &str,
    ) -> Result<Option<Application>, RepositoryError>;

    /// Assigns an identifier and stages the new record in `CREATED` status.
    fn insert(&mut self, draft: NewApplication) -> Result<Application, RepositoryError>;

    fn save(&mut self, record: &Application) -> Result<(), RepositoryError>;

    /// Highest published number among `PUBLISHED` records, as seen by this transaction.
    fn max_published_number(&mut self) -> Result<Option<u32>, RepositoryError>;
}

/// Error enumeration for record store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("published number sequence exhausted")]
    SequenceExhausted,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Append-only audit log of lifecycle transitions.
///
/// The service appends from inside `ApplicationRepository::transact`, after the record write
/// is staged and as the last fallible step of the unit of work. An append error therefore
/// discards the staged write; an append that succeeds is never followed by a rollback.
pub trait HistoryRecorder: Send + Sync {
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Entries for one record in append order.
    fn entries(&self, id: ApplicationId) -> Result<Vec<HistoryEntry>, HistoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}
