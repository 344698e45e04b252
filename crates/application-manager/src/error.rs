use crate::config::ConfigError;
use crate::lifecycle::LifecycleError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Lifecycle(LifecycleError),
    Validation(String),
}

impl AppError {
    /// HTTP status plus the short label returned as `details` in error bodies.
    pub fn status_and_details(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Lifecycle(err) => lifecycle_status(err),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Lifecycle(err) => err.to_string(),
            AppError::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

fn lifecycle_status(err: &LifecycleError) -> (StatusCode, &'static str) {
    match err {
        LifecycleError::ApplicationNotFound(_) | LifecycleError::NoMatchingApplications(_) => {
            (StatusCode::NOT_FOUND, "Application not found")
        }
        LifecycleError::InvalidStatus { .. } => {
            (StatusCode::BAD_REQUEST, "Invalid Application Status")
        }
        LifecycleError::ContentEditNotAllowed(_) => {
            (StatusCode::BAD_REQUEST, "Content Edit Not Allowed")
        }
        LifecycleError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid Input"),
        LifecycleError::AlreadyPublished(_) => {
            (StatusCode::BAD_REQUEST, "Application Already Published")
        }
        LifecycleError::DatabaseOperation(_) | LifecycleError::Repository(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Database Operation Error")
        }
        LifecycleError::History(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "History Recording Error")
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Lifecycle(err) => write!(f, "lifecycle error: {}", err),
            AppError::Validation(message) => write!(f, "validation error: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Lifecycle(err) => Some(err),
            AppError::Validation(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = self.status_and_details();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "timestamp": Utc::now(),
            "message": self.message(),
            "details": details,
        }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<LifecycleError> for AppError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}
