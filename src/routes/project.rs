/**
 * Project Routes
 * API endpoints for project sub-pages: creation with slug allocation,
 * listing, renaming, content admission, reordering, and deletion.
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::content::schema::validate_project;
use crate::db::{
    self,
    models::{Project, ReorderEntry},
    store,
};
use crate::routes::{
    database_unavailable, owner_id, store_error_response, validation_error_response,
    ErrorResponse, SuccessResponse,
};
use crate::routes::page::ContentResponse;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/projects
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub display_name: String,
    pub position: Option<i32>,
}

/// Request body for PATCH /api/projects/{slug}/name
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameProjectRequest {
    pub display_name: String,
}

/// Request body for POST /api/projects/reorder
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub entries: Vec<ReorderEntry>,
}

/// Response for GET /api/projects
#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
    pub total: usize,
}

fn bad_request(error: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
            message: None,
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/projects - Create a project; the slug is derived from the
/// display name and suffixed until free within the owner's namespace
pub async fn create_project(
    headers: HeaderMap,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    if payload.display_name.trim().is_empty() {
        return bad_request("Display name is required").into_response();
    }

    let position = payload.position.unwrap_or(0);
    if position < 0 {
        return bad_request("Position must be non-negative").into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::create_project(pool.as_ref(), &owner, &payload.display_name, position).await {
        Ok(project) => {
            tracing::info!(
                owner_id = %owner,
                project_slug = %project.project_slug,
                "project created"
            );
            (StatusCode::CREATED, Json(project)).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// GET /api/projects - The owner's projects in presentation order
pub async fn list_projects(headers: HeaderMap) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::list_projects(pool.as_ref(), &owner).await {
        Ok(items) => {
            let total = items.len();
            (StatusCode::OK, Json(ProjectListResponse { items, total })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// GET /api/projects/{slug} - Single project identity
pub async fn get_project(headers: HeaderMap, Path(slug): Path<String>) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::get_project(pool.as_ref(), &owner, &slug).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Project not found".to_string(),
                message: Some(slug),
            }),
        )
            .into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// PATCH /api/projects/{slug}/name - Rename; the slug never changes
pub async fn rename_project(
    headers: HeaderMap,
    Path(slug): Path<String>,
    Json(payload): Json<RenameProjectRequest>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    if payload.display_name.trim().is_empty() {
        return bad_request("Display name is required").into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::rename_project(pool.as_ref(), &owner, &slug, &payload.display_name).await {
        Ok(()) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// PUT /api/projects/{slug}/content - Replace the project document
pub async fn replace_project_content(
    headers: HeaderMap,
    Path(slug): Path<String>,
    body: String,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let record = match validate_project(&body) {
        Ok(record) => record,
        Err(issues) => return validation_error_response(issues).into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::replace_project_content(pool.as_ref(), &owner, &slug, &record).await {
        Ok(()) => {
            tracing::info!(owner_id = %owner, project_slug = %slug, "project content replaced");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// GET /api/projects/{slug}/content - The stored project document
pub async fn get_project_content(
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::get_project_content(pool.as_ref(), &owner, &slug).await {
        Ok(data) => (StatusCode::OK, Json(ContentResponse { data })).into_response(),
        Err(e) => store_error_response(e).into_response(),
    }
}

/// DELETE /api/projects/{slug}
pub async fn delete_project(headers: HeaderMap, Path(slug): Path<String>) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::delete_project(pool.as_ref(), &owner, &slug).await {
        Ok(()) => {
            tracing::info!(owner_id = %owner, project_slug = %slug, "project deleted");
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}

/// POST /api/projects/reorder - Atomic bulk re-ordering
///
/// All preconditions are checked before any write; the batch applies in
/// one transaction or not at all.
pub async fn reorder_projects(
    headers: HeaderMap,
    Json(payload): Json<ReorderRequest>,
) -> impl IntoResponse {
    let owner = match owner_id(&headers) {
        Ok(owner) => owner,
        Err(err) => return err.into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return database_unavailable().into_response(),
    };

    match store::reorder_projects(pool.as_ref(), &owner, &payload.entries).await {
        Ok(()) => {
            tracing::info!(
                owner_id = %owner,
                batch_size = payload.entries.len(),
                "projects reordered"
            );
            (StatusCode::OK, Json(SuccessResponse { success: true })).into_response()
        }
        Err(e) => store_error_response(e).into_response(),
    }
}
