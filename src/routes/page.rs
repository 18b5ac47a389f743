/**
 * Page Routes
 * API endpoints for the owner's page: creation, identity (url/theme),
 * content admission, and deletion.
 */
use axum::{
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::schema::validate_profile;
use crate::db::{self, models::Theme, store};
use crate::routes::{
    database_unavailable, owner_id, store_error_response, validation_error_response,
    ErrorResponse, SuccessResponse,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePageRequest {
    pub url_slug: String,
    pub theme: Option<String>,
    /// Optional initial profile document, validated before persisting.
    pub content: Option<Value>,
}

/// Request body for PATCH /api/page/theme
#[derive(Debug, Deserialize)]
pub struct UpdateThemeRequest {
    pub theme: String,
}

/// Request body for PATCH /api/page/url
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUrlRequest {
    pub url_slug: String,
}

/// Response for content reads; data is null until content is uploaded.
#[derive(Debug, Serialize)]
pub struct ContentResponse {
    pub data: Option<Value>,
}

const VALID_THEMES: &[&str] = &["classic", "minimal", "dark", "modern"];

fn parse_theme(raw: &str) -> Result<Theme, (StatusCode, Json<ErrorResponse>)> {
    Theme::parse(raw).ok_or((
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("Invalid theme. Valid themes: {:?}", VALID_THEMES),
            message: None,
        }),
    ))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/page - Create the owner's page
pub async fn create_page(
    headers: HeaderMap,
    Json(payload): Json<CreatePageRequest>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let theme = match payload.theme.as_deref() {
        Some(raw) => match parse_theme(raw) {
            Ok(theme) => theme,
            Err(err) => return err.into_response(),
        },
        None => Theme::Classic,
    };

    // Admit the initial document before touching storage.
    let content = match &payload.content {
        Some(document) => match validate_profile(&document.to_string()) {
            Ok(record) => Some(record),
            Err(issues) => return validation_error_response(issues).into_response(),
        },
        None => None,
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::create_page(
        pool.as_ref(),
        &owner,
        &payload.url_slug,
        theme,
        content.as_ref(),
    )
    .await
    {
        Ok(page) => {
            tracing::info!(owner_id = %owner, url_slug = %page.url_slug, "page created");
            (StatusCode::CREATED, Json(page)).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// GET /api/page - Page identity and metadata (never the content)
pub async fn get_page(headers: HeaderMap) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::get_page_identity(pool.as_ref(), &owner).await {
        Ok(Some(page)) => (StatusCode::OK, Json(page)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Page not found".to_string(),
                message: None,
            }),
        )
            .into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// GET /api/page/content - The stored profile document
pub async fn get_page_content(headers: HeaderMap) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::get_page_content(pool.as_ref(), &owner).await {
        Ok(data) => (StatusCode::OK, Json(ContentResponse { data })).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// PUT /api/page/content - Replace the profile document
///
/// The body is the raw uploaded document; a syntax error becomes a
/// structured issue list, never an opaque failure.
pub async fn replace_page_content(headers: HeaderMap, body: String) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let record = match validate_profile(&body) {
        Ok(record) => record,
        Err(issues) => return validation_error_response(issues).into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::replace_page_content(pool.as_ref(), &owner, &record).await {
        Ok(()) => {
            tracing::info!(owner_id = %owner, "page content replaced");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// PATCH /api/page/theme - Switch the page theme
pub async fn update_theme(
    headers: HeaderMap,
    Json(payload): Json<UpdateThemeRequest>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let theme = match parse_theme(&payload.theme) {
        Ok(theme) => theme,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::update_page_theme(pool.as_ref(), &owner, theme).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// PATCH /api/page/url - Replace the page url slug
pub async fn update_url(
    headers: HeaderMap,
    Json(payload): Json<UpdateUrlRequest>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::update_page_url(pool.as_ref(), &owner, &payload.url_slug).await {
        Ok(()) => {
            tracing::info!(owner_id = %owner, url_slug = %payload.url_slug, "page url updated");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// DELETE /api/page - Delete the page and, by cascade, all its projects
pub async fn delete_page(headers: HeaderMap) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::delete_page(pool.as_ref(), &owner).await {
        Ok(()) => {
            tracing::info!(owner_id = %owner, "page deleted");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme_accepts_known_themes() {
        assert!(parse_theme("classic").is_ok());
        assert!(parse_theme("dark").is_ok());
    }

    #[test]
    fn test_parse_theme_rejects_unknown() {
        assert!(parse_theme("neon").is_err());
        assert!(parse_theme("").is_err());
    }
}
