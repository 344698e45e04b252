use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::lifecycle::domain::{
    Application, ApplicationFilter, ApplicationId, HistoryEntry, NewApplication, Page, PageRequest,
};
use crate::lifecycle::memory::{InMemoryApplicationRepository, InMemoryHistoryRecorder};
use crate::lifecycle::repository::{
    ApplicationRepository, ApplicationTransaction, HistoryError, HistoryRecorder, RepositoryError,
};
use crate::lifecycle::{application_router, LifecycleConfig, LifecycleService, PublishPolicy};

pub(super) type MemoryService = LifecycleService<InMemoryApplicationRepository, InMemoryHistoryRecorder>;

pub(super) fn draft(name: &str, content: &str) -> NewApplication {
    NewApplication::new(name, content)
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryApplicationRepository>,
    Arc<InMemoryHistoryRecorder>,
) {
    build_service_with(PublishPolicy::Idempotent)
}

pub(super) fn build_service_with(
    publish_policy: PublishPolicy,
) -> (
    MemoryService,
    Arc<InMemoryApplicationRepository>,
    Arc<InMemoryHistoryRecorder>,
) {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let recorder = Arc::new(InMemoryHistoryRecorder::default());
    let service = LifecycleService::new(
        repository.clone(),
        recorder.clone(),
        LifecycleConfig { publish_policy },
    );
    (service, repository, recorder)
}

/// Drives a fresh record through verify and accept.
pub(super) fn accepted<R, H>(service: &LifecycleService<R, H>, name: &str) -> Application
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let record = service
        .create(draft(name, "body"))
        .expect("create succeeds");
    service.verify(record.id).expect("verify succeeds");
    service.accept(record.id).expect("accept succeeds")
}

/// Wraps the in-memory store and counts writes staged through transactions.
#[derive(Default)]
pub(super) struct CountingRepository {
    inner: InMemoryApplicationRepository,
    writes: AtomicUsize,
}

impl CountingRepository {
    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

struct CountingTransaction<'a> {
    inner: &'a mut dyn ApplicationTransaction,
    writes: &'a AtomicUsize,
}

impl ApplicationTransaction for CountingTransaction<'_> {
    fn find_for_update(
        &mut self,
        id: ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.find_for_update(id)
    }

    fn find_by_name_and_content(
        &mut self,
        name: &str,
        content: &str,
    ) -> Result<Option<Application>, RepositoryError> {
        self.inner.find_by_name_and_content(name, content)
    }

    fn insert(&mut self, draft: NewApplication) -> Result<Application, RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(draft)
    }

    fn save(&mut self, record: &Application) -> Result<(), RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.save(record)
    }

    fn max_published_number(&mut self) -> Result<Option<u32>, RepositoryError> {
        self.inner.max_published_number()
    }
}

impl ApplicationRepository for CountingRepository {
    fn transact<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ApplicationTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let writes = &self.writes;
        self.inner.transact(|tx| {
            let mut counting = CountingTransaction { inner: tx, writes };
            work(&mut counting)
        })
    }

    fn find(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.find(id)
    }

    fn search(
        &self,
        filter: &ApplicationFilter,
        page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        self.inner.search(filter, page)
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn transact<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn ApplicationTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn find(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn search(
        &self,
        _filter: &ApplicationFilter,
        _page: PageRequest,
    ) -> Result<Page<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Recorder that refuses every append.
#[derive(Default)]
pub(super) struct FailingRecorder;

impl HistoryRecorder for FailingRecorder {
    fn append(&self, _entry: HistoryEntry) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("audit log offline".to_string()))
    }

    fn entries(&self, _id: ApplicationId) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(Vec::new())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    application_router(Arc::new(service))
}
