/**
 * Content Store
 * Persistence operations for pages and projects. Identity uniqueness is
 * arbitrated by database constraints; this module translates constraint
 * violations into typed outcomes and owns the one multi-row transaction
 * in the system (reorder).
 */
use std::collections::HashSet;

use serde_json::Value;
use sqlx::PgPool;

use crate::content::schema::{ProfileRecord, ProjectRecord};
use crate::content::slug::{
    check_url_candidate, derive_project_slug, slug_candidate, MAX_SLUG_ATTEMPTS,
};
use crate::db::models::{Page, Project, ReorderEntry, Theme};
use crate::error::{is_foreign_key_violation, is_unique_violation, StoreError};

const PAGE_IDENTITY_COLUMNS: &str = "owner_id, url_slug, theme, created_at, updated_at";
const PROJECT_COLUMNS: &str = "owner_id, project_slug, display_name, position, created_at, updated_at";

fn encode_content<T: serde::Serialize>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record)
        .map_err(|e| StoreError::Database(sqlx::Error::Encode(Box::new(e))))
}

/// Which unique constraint a violation came from, when the database
/// reports one.
fn unique_violation_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

// ============================================================================
// Pages
// ============================================================================

/// Create the owner's page. Fails if the owner already has one or the
/// url slug is invalid, reserved, or held by another owner.
pub async fn create_page(
    pool: &PgPool,
    owner_id: &str,
    url_slug: &str,
    theme: Theme,
    content: Option<&ProfileRecord>,
) -> Result<Page, StoreError> {
    check_url_candidate(url_slug)?;

    let content = content.map(encode_content).transpose()?;

    let result = sqlx::query_as::<_, Page>(
        r#"
        INSERT INTO pages (owner_id, url_slug, theme, content, created_at, updated_at)
        VALUES ($1, $2, $3, $4, now(), now())
        RETURNING owner_id, url_slug, theme, created_at, updated_at
        "#,
    )
    .bind(owner_id)
    .bind(url_slug)
    .bind(theme.as_str())
    .bind(content)
    .fetch_one(pool)
    .await;

    match result {
        Ok(page) => Ok(page),
        Err(e) => match unique_violation_constraint(&e).as_deref() {
            Some("pages_url_slug_key") => Err(StoreError::UrlTaken),
            Some(_) => Err(StoreError::PageExists),
            None => Err(e.into()),
        },
    }
}

/// Identity and metadata only; the content column is not fetched.
pub async fn get_page_identity(pool: &PgPool, owner_id: &str) -> Result<Option<Page>, StoreError> {
    let page = sqlx::query_as::<_, Page>(&format!(
        "SELECT {} FROM pages WHERE owner_id = $1",
        PAGE_IDENTITY_COLUMNS
    ))
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(page)
}

/// The stored profile document, or None when the page exists but no
/// content has been uploaded yet. A missing page is an error.
pub async fn get_page_content(pool: &PgPool, owner_id: &str) -> Result<Option<Value>, StoreError> {
    let row: Option<Option<Value>> =
        sqlx::query_scalar("SELECT content FROM pages WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;

    match row {
        Some(content) => Ok(content),
        None => Err(StoreError::PageNotFound),
    }
}

/// Full replace of the page's content document, never a merge.
pub async fn replace_page_content(
    pool: &PgPool,
    owner_id: &str,
    record: &ProfileRecord,
) -> Result<(), StoreError> {
    let content = encode_content(record)?;

    let result = sqlx::query(
        "UPDATE pages SET content = $2, updated_at = now() WHERE owner_id = $1",
    )
    .bind(owner_id)
    .bind(content)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::PageNotFound);
    }
    Ok(())
}

pub async fn update_page_theme(
    pool: &PgPool,
    owner_id: &str,
    theme: Theme,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE pages SET theme = $2, updated_at = now() WHERE owner_id = $1",
    )
    .bind(owner_id)
    .bind(theme.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::PageNotFound);
    }
    Ok(())
}

/// Replace the page's url slug. Format and reserved-word checks run
/// first; the unique constraint arbitrates global uniqueness, so a race
/// between owners leaves exactly one winner and the loser sees UrlTaken.
/// A candidate equal to the caller's current slug is a no-op success.
pub async fn update_page_url(
    pool: &PgPool,
    owner_id: &str,
    candidate: &str,
) -> Result<(), StoreError> {
    check_url_candidate(candidate)?;

    let result = sqlx::query(
        "UPDATE pages SET url_slug = $2, updated_at = now() WHERE owner_id = $1",
    )
    .bind(owner_id)
    .bind(candidate)
    .execute(pool)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => Err(StoreError::PageNotFound),
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::UrlTaken),
        Err(e) => Err(e.into()),
    }
}

/// Delete the page. The foreign key cascades to all of the owner's
/// projects, and the old url slug becomes immediately reusable.
pub async fn delete_page(pool: &PgPool, owner_id: &str) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM pages WHERE owner_id = $1")
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::PageNotFound);
    }
    Ok(())
}

// ============================================================================
// Projects
// ============================================================================

/// Create a project with a slug derived from the display name.
///
/// The insert is attempted with the base candidate; a primary-key
/// violation means the candidate is occupied and the probe advances to
/// `base-2`, `base-3`, ... The composite key arbitrates, so concurrent
/// creations racing on the same base cannot both win a candidate. The
/// probe is bounded; exceeding it is an internal allocation failure.
pub async fn create_project(
    pool: &PgPool,
    owner_id: &str,
    display_name: &str,
    position: i32,
) -> Result<Project, StoreError> {
    let base = derive_project_slug(display_name);

    for attempt in 0..MAX_SLUG_ATTEMPTS {
        let candidate = slug_candidate(&base, attempt);

        let result = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (owner_id, project_slug, display_name, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, now(), now())
            RETURNING owner_id, project_slug, display_name, position, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&candidate)
        .bind(display_name)
        .bind(position)
        .fetch_one(pool)
        .await;

        match result {
            Ok(project) => return Ok(project),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(
                    owner_id = %owner_id,
                    candidate = %candidate,
                    "project slug candidate occupied, probing next suffix"
                );
                continue;
            }
            Err(e) if is_foreign_key_violation(&e) => return Err(StoreError::NoParentPage),
            Err(e) => return Err(e.into()),
        }
    }

    tracing::error!(
        owner_id = %owner_id,
        base = %base,
        attempts = MAX_SLUG_ATTEMPTS,
        "project slug allocation exhausted"
    );
    Err(StoreError::AllocationExhausted(MAX_SLUG_ATTEMPTS))
}

/// All of the owner's projects, position ascending; creation order
/// breaks ties so repeated listings are deterministic.
pub async fn list_projects(pool: &PgPool, owner_id: &str) -> Result<Vec<Project>, StoreError> {
    let projects = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects WHERE owner_id = $1 ORDER BY position ASC, created_at ASC",
        PROJECT_COLUMNS
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(projects)
}

pub async fn get_project(
    pool: &PgPool,
    owner_id: &str,
    slug: &str,
) -> Result<Option<Project>, StoreError> {
    let project = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects WHERE owner_id = $1 AND project_slug = $2",
        PROJECT_COLUMNS
    ))
    .bind(owner_id)
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    Ok(project)
}

/// Change the display name. The slug was derived once at creation and
/// never follows the name.
pub async fn rename_project(
    pool: &PgPool,
    owner_id: &str,
    slug: &str,
    display_name: &str,
) -> Result<(), StoreError> {
    let result = sqlx::query(
        "UPDATE projects SET display_name = $3, updated_at = now() WHERE owner_id = $1 AND project_slug = $2",
    )
    .bind(owner_id)
    .bind(slug)
    .bind(display_name)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::ProjectNotFound(vec![slug.to_string()]));
    }
    Ok(())
}

pub async fn replace_project_content(
    pool: &PgPool,
    owner_id: &str,
    slug: &str,
    record: &ProjectRecord,
) -> Result<(), StoreError> {
    let content = encode_content(record)?;

    let result = sqlx::query(
        "UPDATE projects SET content = $3, updated_at = now() WHERE owner_id = $1 AND project_slug = $2",
    )
    .bind(owner_id)
    .bind(slug)
    .bind(content)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::ProjectNotFound(vec![slug.to_string()]));
    }
    Ok(())
}

pub async fn get_project_content(
    pool: &PgPool,
    owner_id: &str,
    slug: &str,
) -> Result<Option<Value>, StoreError> {
    let row: Option<Option<Value>> = sqlx::query_scalar(
        "SELECT content FROM projects WHERE owner_id = $1 AND project_slug = $2",
    )
    .bind(owner_id)
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(content) => Ok(content),
        None => Err(StoreError::ProjectNotFound(vec![slug.to_string()])),
    }
}

pub async fn delete_project(pool: &PgPool, owner_id: &str, slug: &str) -> Result<(), StoreError> {
    let result = sqlx::query("DELETE FROM projects WHERE owner_id = $1 AND project_slug = $2")
        .bind(owner_id)
        .bind(slug)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StoreError::ProjectNotFound(vec![slug.to_string()]));
    }
    Ok(())
}

// ============================================================================
// Reorder
// ============================================================================

/// Pure batch preconditions, checked before any storage work: non-empty,
/// no duplicate slugs, non-negative positions.
pub fn check_reorder_batch(entries: &[ReorderEntry]) -> Result<(), StoreError> {
    if entries.is_empty() {
        return Err(StoreError::InvalidReorderBatch(
            "batch must not be empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for entry in entries {
        if entry.position < 0 {
            return Err(StoreError::InvalidReorderBatch(format!(
                "position for '{}' must be non-negative",
                entry.slug
            )));
        }
        if !seen.insert(entry.slug.as_str()) {
            return Err(StoreError::InvalidReorderBatch(format!(
                "duplicate slug '{}'",
                entry.slug
            )));
        }
    }

    Ok(())
}

/// Apply a batch of (slug, position) writes, all or nothing.
///
/// Every slug must exist under the owner before any write happens; the
/// whole batch runs inside one transaction, so a failure mid-batch rolls
/// back to the prior ordering. Projects omitted from the batch keep
/// their positions.
pub async fn reorder_projects(
    pool: &PgPool,
    owner_id: &str,
    entries: &[ReorderEntry],
) -> Result<(), StoreError> {
    check_reorder_batch(entries)?;

    let slugs: Vec<String> = entries.iter().map(|e| e.slug.clone()).collect();

    let mut tx = pool.begin().await?;

    let existing: Vec<String> = sqlx::query_scalar(
        "SELECT project_slug FROM projects WHERE owner_id = $1 AND project_slug = ANY($2)",
    )
    .bind(owner_id)
    .bind(&slugs)
    .fetch_all(&mut *tx)
    .await?;

    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let missing: Vec<String> = slugs
        .iter()
        .filter(|s| !existing.contains(s.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        // Dropping the transaction rolls back; nothing was written yet.
        return Err(StoreError::ProjectNotFound(missing));
    }

    for entry in entries {
        sqlx::query(
            "UPDATE projects SET position = $3, updated_at = now() WHERE owner_id = $1 AND project_slug = $2",
        )
        .bind(owner_id)
        .bind(&entry.slug)
        .bind(entry.position)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, position: i32) -> ReorderEntry {
        ReorderEntry {
            slug: slug.to_string(),
            position,
        }
    }

    #[test]
    fn test_reorder_batch_rejects_empty() {
        assert!(matches!(
            check_reorder_batch(&[]),
            Err(StoreError::InvalidReorderBatch(_))
        ));
    }

    #[test]
    fn test_reorder_batch_rejects_duplicate_slugs() {
        let batch = [entry("alpha", 0), entry("beta", 1), entry("alpha", 2)];
        let err = check_reorder_batch(&batch).unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn test_reorder_batch_rejects_negative_positions() {
        let batch = [entry("alpha", -1)];
        assert!(matches!(
            check_reorder_batch(&batch),
            Err(StoreError::InvalidReorderBatch(_))
        ));
    }

    #[test]
    fn test_reorder_batch_accepts_sparse_and_colliding_positions() {
        // Values need not be contiguous, and targets may collide with
        // other projects' current positions.
        let batch = [entry("alpha", 10), entry("beta", 10), entry("gamma", 0)];
        assert!(check_reorder_batch(&batch).is_ok());
    }
}
