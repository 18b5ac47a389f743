//! Error taxonomy for the content admission and identity allocation core.
//!
//! Validation issues are not errors of this kind; they are returned as
//! structured issue lists by `content::schema` and never surface here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The owner already has a page (one page per owner).
    #[error("a page already exists for this owner")]
    PageExists,

    /// No page exists for the owner.
    #[error("page not found")]
    PageNotFound,

    /// One or more referenced projects do not exist for the owner.
    /// Carries the offending slugs so callers can name them.
    #[error("project not found: {}", .0.join(", "))]
    ProjectNotFound(Vec<String>),

    /// Project creation requires the owner to already have a page.
    #[error("owner has no page to attach the project to")]
    NoParentPage,

    /// Page url candidate fails the format rules (length or charset).
    #[error("url slug must be 3-30 characters of lowercase letters, numbers, and hyphens")]
    UrlInvalidFormat,

    /// Page url candidate is on the reserved-word list.
    #[error("url slug is reserved")]
    UrlReserved,

    /// Another owner already holds the page url.
    #[error("url slug is already taken")]
    UrlTaken,

    /// A reorder batch failed a precondition before any write.
    #[error("invalid reorder batch: {0}")]
    InvalidReorderBatch(String),

    /// The project slug suffix probe exceeded its bound. Internal;
    /// not user-correctable within the same request.
    #[error("slug allocation exhausted after {0} attempts")]
    AllocationExhausted(u32),

    /// The persistence boundary itself failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether this error should be logged with internal detail and
    /// reported upstream as a generic internal failure.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            StoreError::AllocationExhausted(_) | StoreError::Database(_)
        )
    }
}

/// Whether a sqlx error is a unique-constraint violation. Used to turn
/// constraint arbitration at the storage boundary into typed outcomes
/// (url taken, slug candidate occupied).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

/// Whether a sqlx error is a foreign-key violation. Project inserts hit
/// this when the owner has no page.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_foreign_key_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_classification() {
        assert!(StoreError::AllocationExhausted(100).is_internal());
        assert!(StoreError::Database(sqlx::Error::PoolClosed).is_internal());
        assert!(!StoreError::UrlTaken.is_internal());
        assert!(!StoreError::PageNotFound.is_internal());
        assert!(!StoreError::ProjectNotFound(vec!["a".into()]).is_internal());
    }

    #[test]
    fn test_project_not_found_names_offenders() {
        let err = StoreError::ProjectNotFound(vec!["alpha".into(), "beta".into()]);
        let text = err.to_string();
        assert!(text.contains("alpha"));
        assert!(text.contains("beta"));
    }

    #[test]
    fn test_non_database_errors_are_not_violations() {
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolClosed));
    }
}
