//! In-process adapters for the record store and history recorder.
//!
//! Transactions are serialized behind a single mutex, so the read-max-then-write sequence used
//! by publish cannot interleave with another transaction.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::domain::{
    Application, ApplicationFilter, ApplicationId, ApplicationStatus, HistoryEntry,
    NewApplication, Page, PageRequest,
};
use super::repository::{
    ApplicationRepository, ApplicationTransaction, HistoryError, HistoryRecorder, RepositoryError,
};

#[derive(Debug, Default)]
struct StoreState {
    records: BTreeMap<ApplicationId, Application>,
    last_id: u64,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationRepository {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryApplicationRepository {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Committed record count. A poisoned lock still reports the last committed state.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ApplicationTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut state = self.lock()?;
        let mut tx = StagedTransaction {
            committed: &*state,
            staged: BTreeMap::new(),
            last_id: state.last_id,
        };

        let outcome = work(&mut tx)?;

        let StagedTransaction {
            staged, last_id, ..
        } = tx;
        state.last_id = last_id;
        state.records.extend(staged);
        Ok(outcome)
    }

    fn find(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.records.get(&id).cloned())
    }

    fn search(
        &self,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        let state = self.lock()?;
        let matches = state
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        Ok(Page::from_matches(matches, page))
    }
}

/// Writes buffered until the owning `transact` call commits them.
struct StagedTransaction<'a> {
    committed: &'a StoreState,
    staged: BTreeMap<ApplicationId, Application>,
    last_id: u64,
}

impl StagedTransaction<'_> {
    fn visible(&self) -> impl Iterator<Item = &Application> + '_ {
        let staged = &self.staged;
        let committed = &self.committed.records;
        committed
            .values()
            .filter(move |record| !staged.contains_key(&record.id))
            .chain(staged.values())
    }
}

impl ApplicationTransaction for StagedTransaction<'_> {
    fn find_for_update(
        &mut self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .staged
            .get(&id)
            .or_else(|| self.committed.records.get(&id))
            .cloned())
    }

    fn find_by_name_and_content(
        &mut self,
        name: &str,
        content: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .visible()
            .filter(|record| record.name == name && record.content == content)
            .min_by_key(|record| record.id)
            .cloned())
    }

    fn insert(&mut self, draft: NewApplication) -> Result<Application, RepositoryError> {
        self.last_id += 1;
        let record = Application::created(ApplicationId(self.last_id), draft);
        self.staged.insert(record.id, record.clone());
        Ok(record)
    }

    fn save(&mut self, record: &Application) -> Result<(), RepositoryError> {
        let known = self.staged.contains_key(&record.id)
            || self.committed.records.contains_key(&record.id);
        if !known {
            return Err(RepositoryError::NotFound);
        }
        self.staged.insert(record.id, record.clone());
        Ok(())
    }

    fn max_published_number(&mut self) -> Result<Option<u32>, RepositoryError> {
        Ok(self
            .visible()
            .filter(|record| record.status == ApplicationStatus::Published)
            .filter_map(|record| record.published_number)
            .max())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryHistoryRecorder {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl InMemoryHistoryRecorder {
    fn lock(&self) -> Result<MutexGuard<'_, Vec<HistoryEntry>>, HistoryError> {
        self.entries
            .lock()
            .map_err(|_| HistoryError::Unavailable("history mutex poisoned".to_string()))
    }

    /// Every entry across all records, in append order.
    pub fn all(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HistoryRecorder for InMemoryHistoryRecorder {
    fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.lock()?.push(entry);
        Ok(())
    }

    fn entries(&self, id: ApplicationId) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|entry| entry.application_id == id)
            .cloned()
            .collect())
    }
}
