/**
 * Routes Module
 * API route handlers
 */

pub mod health;
pub mod page;
pub mod project;

use axum::{
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::content::schema::FieldIssue;
use crate::error::StoreError;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Validation error response; the issue list is forwarded verbatim.
#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub issues: Vec<FieldIssue>,
}

/// Success response (for mutations with no body)
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Resolve the authenticated owner id supplied by the upstream gateway.
/// The core trusts this value; authentication itself lives upstream.
pub fn owner_id(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    headers
        .get("x-owner-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Owner identity required".to_string(),
                message: None,
            }),
        ))
}

/// Map a store error onto a status code and response body. Internal
/// kinds get their detail logged here and a generic body upstream.
pub fn store_error_response(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    if err.is_internal() {
        tracing::error!(error = %err, "store operation failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal error".to_string(),
                message: None,
            }),
        );
    }

    let (status, error, message) = match &err {
        StoreError::PageExists => (
            StatusCode::CONFLICT,
            "Page already exists",
            None,
        ),
        StoreError::PageNotFound => (StatusCode::NOT_FOUND, "Page not found", None),
        StoreError::ProjectNotFound(slugs) => (
            StatusCode::NOT_FOUND,
            "Project not found",
            Some(slugs.join(", ")),
        ),
        StoreError::NoParentPage => (
            StatusCode::CONFLICT,
            "No page exists for this owner; create the page first",
            None,
        ),
        StoreError::UrlInvalidFormat => (
            StatusCode::BAD_REQUEST,
            "Invalid url slug",
            Some(err.to_string()),
        ),
        StoreError::UrlReserved => (StatusCode::BAD_REQUEST, "Url slug is reserved", None),
        StoreError::UrlTaken => (StatusCode::CONFLICT, "Url slug is already taken", None),
        StoreError::InvalidReorderBatch(reason) => (
            StatusCode::BAD_REQUEST,
            "Invalid reorder batch",
            Some(reason.clone()),
        ),
        // is_internal() covered these above
        StoreError::AllocationExhausted(_) | StoreError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal error",
            None,
        ),
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
}

/// 422 carrying the exhaustive field issue list.
pub fn validation_error_response(
    issues: Vec<FieldIssue>,
) -> (StatusCode, Json<ValidationErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ValidationErrorResponse {
            error: "Validation failed".to_string(),
            issues,
        }),
    )
}

/// 503 when the pool was never initialized.
pub fn database_unavailable() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "Database not available".to_string(),
            message: None,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_owner_id_resolves_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-owner-id", HeaderValue::from_static("user-42"));
        assert_eq!(owner_id(&headers).unwrap(), "user-42");
    }

    #[test]
    fn test_owner_id_rejects_missing_or_blank() {
        let headers = HeaderMap::new();
        assert!(owner_id(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("x-owner-id", HeaderValue::from_static("   "));
        assert!(owner_id(&headers).is_err());
    }

    #[test]
    fn test_conflict_kinds_map_distinctly() {
        let (invalid, body) = store_error_response(StoreError::UrlInvalidFormat);
        assert_eq!(invalid, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid url slug");

        let (reserved, body) = store_error_response(StoreError::UrlReserved);
        assert_eq!(reserved, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Url slug is reserved");

        let (taken, body) = store_error_response(StoreError::UrlTaken);
        assert_eq!(taken, StatusCode::CONFLICT);
        assert_eq!(body.error, "Url slug is already taken");
    }

    #[test]
    fn test_not_found_names_offending_projects() {
        let (status, body) =
            store_error_response(StoreError::ProjectNotFound(vec!["a".into(), "b".into()]));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message.as_deref(), Some("a, b"));
    }

    #[test]
    fn test_internal_kinds_hide_detail() {
        let (status, body) = store_error_response(StoreError::AllocationExhausted(100));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal error");
    }
}
