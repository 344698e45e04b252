//! Input checks applied before any record is touched.

use super::domain::NewApplication;
use super::service::LifecycleError;

/// Longest reason accepted by the HTTP layer.
pub const MAX_REASON_LENGTH: usize = 255;

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn validate_new_application(draft: &NewApplication) -> Result<(), LifecycleError> {
    if is_blank(&draft.name) || is_blank(&draft.content) {
        return Err(LifecycleError::InvalidInput(
            "fields 'name' and 'content' must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn require_content(content: &str) -> Result<(), LifecycleError> {
    if is_blank(content) {
        return Err(LifecycleError::InvalidInput(
            "field 'content' must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn require_reason(reason: &str, action: &str) -> Result<(), LifecycleError> {
    if is_blank(reason) {
        return Err(LifecycleError::InvalidInput(format!(
            "a reason must be provided for {action} an application"
        )));
    }
    Ok(())
}

pub(crate) fn require_search_name(name: Option<&str>) -> Result<(), LifecycleError> {
    match name {
        Some(name) if is_blank(name) => Err(LifecycleError::InvalidInput(
            "name parameter must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}
