use application_manager::lifecycle::{
    InMemoryApplicationRepository, InMemoryHistoryRecorder, LifecycleConfig, LifecycleService,
    PublishPolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type ApiService =
    LifecycleService<InMemoryApplicationRepository, InMemoryHistoryRecorder>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory record store and audit log wired into the lifecycle service.
pub(crate) fn build_service(
    config: &LifecycleConfig,
) -> (
    Arc<ApiService>,
    Arc<InMemoryApplicationRepository>,
    Arc<InMemoryHistoryRecorder>,
) {
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let recorder = Arc::new(InMemoryHistoryRecorder::default());
    let service = Arc::new(LifecycleService::new(
        repository.clone(),
        recorder.clone(),
        config.clone(),
    ));
    (service, repository, recorder)
}

pub(crate) fn parse_publish_policy(value: &str) -> Result<PublishPolicy, String> {
    PublishPolicy::parse(value)
        .ok_or_else(|| format!("unknown republish policy `{value}` (expected idempotent or reject)"))
}
