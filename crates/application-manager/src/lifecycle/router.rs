use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationFilter, ApplicationId, ApplicationStatus, ApplicationView, HistoryEntryView,
    NewApplication, PageRequest,
};
use super::guard::{is_blank, MAX_REASON_LENGTH};
use super::repository::{ApplicationRepository, HistoryRecorder};
use super::service::LifecycleService;
use crate::error::AppError;

pub const APPLICATIONS_PATH: &str = "/api/v1/applications";

/// Router builder exposing one endpoint per lifecycle operation plus listing and history.
pub fn application_router<R, H>(service: Arc<LifecycleService<R, H>>) -> Router
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    Router::new()
        .route(
            APPLICATIONS_PATH,
            post(create_handler::<R, H>).get(list_handler::<R, H>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<R, H>)
                .put(update_content_handler::<R, H>)
                .delete(delete_handler::<R, H>),
        )
        .route(
            "/api/v1/applications/:application_id/history",
            get(history_handler::<R, H>),
        )
        .route(
            "/api/v1/applications/:application_id/verify",
            put(verify_handler::<R, H>),
        )
        .route(
            "/api/v1/applications/:application_id/accept",
            put(accept_handler::<R, H>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            put(reject_handler::<R, H>),
        )
        .route(
            "/api/v1/applications/:application_id/publish",
            put(publish_handler::<R, H>),
        )
        .with_state(service)
}

type ServiceState<R, H> = State<Arc<LifecycleService<R, H>>>;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Unwraps a JSON body, turning extractor rejections into structured validation errors.
fn parse_body<T>(payload: JsonBody<T>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

/// Creation payload. Missing or null fields fall through to the service's input guard.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateApplicationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(request: CreateApplicationRequest) -> Self {
        NewApplication::new(
            request.name.unwrap_or_default(),
            request.content.unwrap_or_default(),
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateContentRequest {
    pub content: String,
}

impl UpdateContentRequest {
    fn validated(self) -> Result<String, AppError> {
        if is_blank(&self.content) {
            return Err(AppError::Validation("content must not be blank".to_string()));
        }
        Ok(self.content)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReasonRequest {
    pub reason: String,
}

impl ReasonRequest {
    fn validated(self) -> Result<String, AppError> {
        if is_blank(&self.reason) {
            return Err(AppError::Validation("reason must not be blank".to_string()));
        }
        if self.reason.chars().count() > MAX_REASON_LENGTH {
            return Err(AppError::Validation(format!(
                "reason must not exceed {MAX_REASON_LENGTH} characters"
            )));
        }
        Ok(self.reason)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListView {
    pub applications: Vec<ApplicationView>,
    pub current_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

pub(crate) async fn create_handler<R, H>(
    State(service): ServiceState<R, H>,
    payload: JsonBody<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationView>), AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let draft = parse_body(payload)?;
    let record = service.create(draft.into())?;
    Ok((StatusCode::CREATED, Json(record.view())))
}

pub(crate) async fn list_handler<R, H>(
    State(service): ServiceState<R, H>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApplicationListView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let size = params.size.unwrap_or(PageRequest::DEFAULT_SIZE);
    if size == 0 {
        return Err(AppError::Validation(
            "size must be greater than or equal to 1".to_string(),
        ));
    }
    let request = PageRequest::new(params.page.unwrap_or(0), size);
    let filter = ApplicationFilter {
        name: params.name,
        status: params.status,
    };

    let page = service.list(&filter, request)?;
    let total_pages = page.total_pages();
    let page = page.map(|record| record.view());

    Ok(Json(ApplicationListView {
        applications: page.items,
        current_page: page.page,
        total_items: page.total_items,
        total_pages,
    }))
}

pub(crate) async fn get_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
) -> Result<Json<ApplicationView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let record = service.get(ApplicationId(application_id))?;
    Ok(Json(record.view()))
}

pub(crate) async fn history_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
) -> Result<Json<Vec<HistoryEntryView>>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let entries = service.history(ApplicationId(application_id))?;
    Ok(Json(entries.iter().map(|entry| entry.view()).collect()))
}

pub(crate) async fn update_content_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
    payload: JsonBody<UpdateContentRequest>,
) -> Result<Json<ApplicationView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let content = parse_body(payload)?.validated()?;
    let record = service.update_content(ApplicationId(application_id), &content)?;
    Ok(Json(record.view()))
}

pub(crate) async fn delete_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
    payload: JsonBody<ReasonRequest>,
) -> Result<StatusCode, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let reason = parse_body(payload)?.validated()?;
    service.delete(ApplicationId(application_id), &reason)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn verify_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
) -> Result<Json<ApplicationView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let record = service.verify(ApplicationId(application_id))?;
    Ok(Json(record.view()))
}

pub(crate) async fn accept_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
) -> Result<Json<ApplicationView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let record = service.accept(ApplicationId(application_id))?;
    Ok(Json(record.view()))
}

pub(crate) async fn reject_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
    payload: JsonBody<ReasonRequest>,
) -> Result<Json<ApplicationView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let reason = parse_body(payload)?.validated()?;
    let record = service.reject(ApplicationId(application_id), &reason)?;
    Ok(Json(record.view()))
}

pub(crate) async fn publish_handler<R, H>(
    State(service): ServiceState<R, H>,
    Path(application_id): Path<u64>,
) -> Result<Json<ApplicationView>, AppError>
where
    R: ApplicationRepository + 'static,
    H: HistoryRecorder + 'static,
{
    let record = service.publish(ApplicationId(application_id))?;
    Ok(Json(record.view()))
}
