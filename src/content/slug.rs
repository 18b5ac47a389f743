/**
 * Slug Derivation & URL Candidate Checks
 * Pure halves of identity allocation. The uniqueness halves live at the
 * storage boundary (db::store), protected by database constraints.
 */
use regex::Regex;

use crate::error::StoreError;

// ============================================================================
// Constants
// ============================================================================

/// Minimum / maximum length of a user-chosen page url slug.
pub const URL_SLUG_MIN: usize = 3;
pub const URL_SLUG_MAX: usize = 30;

/// Upper bound on suffix probes during project slug allocation.
pub const MAX_SLUG_ATTEMPTS: u32 = 100;

/// Base used when a display name strips down to nothing (e.g. all emoji).
/// The ordinary suffix probe disambiguates from there.
pub const EMPTY_NAME_FALLBACK: &str = "project";

/// Page url slugs that collide with system routes.
const RESERVED_URL_SLUGS: &[&str] = &[
    "admin", "api", "app", "auth", "blog", "dashboard", "health", "help", "login", "logout", "new",
    "page", "profile", "projects", "register", "settings", "static", "support", "uploads", "www",
];

lazy_static::lazy_static! {
    /// Valid page url slug: lowercase letters, numbers, and hyphens.
    /// Case is deliberately not folded; an uppercase candidate is rejected.
    static ref URL_SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9-]+$").unwrap();
}

// ============================================================================
// Project slug derivation
// ============================================================================

/// Derive the base project slug from a free-text display name.
///
/// Lowercases, strips everything outside `[a-z0-9\s-]`, collapses
/// whitespace runs to a hyphen, collapses hyphen runs, and trims. A name
/// that strips down to nothing falls back to `"project"`.
pub fn derive_project_slug(display_name: &str) -> String {
    let lowered = display_name.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c),
            '-' => Some('-'),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        };
        match mapped {
            Some('-') => pending_hyphen = !slug.is_empty(),
            Some(c) => {
                if pending_hyphen {
                    slug.push('-');
                    pending_hyphen = false;
                }
                slug.push(c);
            }
            None => {}
        }
    }

    if slug.is_empty() {
        EMPTY_NAME_FALLBACK.to_string()
    } else {
        slug
    }
}

/// The n-th candidate for a base slug: the base itself, then `base-2`,
/// `base-3`, ... in increasing numeric order.
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt + 1)
    }
}

// ============================================================================
// Page url candidate checks
// ============================================================================

/// Check a user-chosen page url candidate for format and reserved-word
/// violations. Global uniqueness is checked by the storage boundary.
///
/// Checks short-circuit in order: format first, then reserved words.
pub fn check_url_candidate(candidate: &str) -> Result<(), StoreError> {
    let len = candidate.chars().count();
    if len < URL_SLUG_MIN || len > URL_SLUG_MAX || !URL_SLUG_REGEX.is_match(candidate) {
        return Err(StoreError::UrlInvalidFormat);
    }

    // Reserved comparison is case-insensitive; the format check above
    // already rejects uppercase, but the list must match regardless.
    let lowered = candidate.to_lowercase();
    if RESERVED_URL_SLUGS.contains(&lowered.as_str()) {
        return Err(StoreError::UrlReserved);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_strips_punctuation() {
        assert_eq!(derive_project_slug("My First Project!!"), "my-first-project");
    }

    #[test]
    fn test_derive_lowercases() {
        assert_eq!(derive_project_slug("Pagefolio Backend"), "pagefolio-backend");
    }

    #[test]
    fn test_derive_collapses_whitespace_and_hyphens() {
        assert_eq!(derive_project_slug("a   b"), "a-b");
        assert_eq!(derive_project_slug("a---b"), "a-b");
        assert_eq!(derive_project_slug("a - - b"), "a-b");
    }

    #[test]
    fn test_derive_trims_hyphens() {
        assert_eq!(derive_project_slug("  hello  "), "hello");
        assert_eq!(derive_project_slug("--hello--"), "hello");
    }

    #[test]
    fn test_derive_keeps_digits() {
        assert_eq!(derive_project_slug("Project 2.0"), "project-20");
    }

    #[test]
    fn test_derive_empty_falls_back() {
        assert_eq!(derive_project_slug(""), "project");
        assert_eq!(derive_project_slug("🚀🚀🚀"), "project");
        assert_eq!(derive_project_slug("!!!"), "project");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = derive_project_slug("Ünïcode Näme");
        let b = derive_project_slug("Ünïcode Näme");
        assert_eq!(a, b);
    }

    #[test]
    fn test_slug_candidates_increase_numerically() {
        assert_eq!(slug_candidate("my-project", 0), "my-project");
        assert_eq!(slug_candidate("my-project", 1), "my-project-2");
        assert_eq!(slug_candidate("my-project", 2), "my-project-3");
    }

    #[test]
    fn test_url_rejects_uppercase_as_format_failure() {
        assert!(matches!(
            check_url_candidate("API"),
            Err(StoreError::UrlInvalidFormat)
        ));
    }

    #[test]
    fn test_url_rejects_bad_lengths() {
        assert!(matches!(
            check_url_candidate("ab"),
            Err(StoreError::UrlInvalidFormat)
        ));
        let too_long = "a".repeat(31);
        assert!(matches!(
            check_url_candidate(&too_long),
            Err(StoreError::UrlInvalidFormat)
        ));
        assert!(check_url_candidate(&"a".repeat(30)).is_ok());
        assert!(check_url_candidate("abc").is_ok());
    }

    #[test]
    fn test_url_rejects_bad_characters() {
        assert!(matches!(
            check_url_candidate("john_doe"),
            Err(StoreError::UrlInvalidFormat)
        ));
        assert!(matches!(
            check_url_candidate("john doe"),
            Err(StoreError::UrlInvalidFormat)
        ));
    }

    #[test]
    fn test_url_rejects_reserved_words() {
        assert!(matches!(
            check_url_candidate("admin"),
            Err(StoreError::UrlReserved)
        ));
        assert!(matches!(
            check_url_candidate("api"),
            Err(StoreError::UrlReserved)
        ));
    }

    #[test]
    fn test_url_format_failure_wins_over_reserved() {
        // "Admin" is uppercase, so the format check fires first
        assert!(matches!(
            check_url_candidate("Admin"),
            Err(StoreError::UrlInvalidFormat)
        ));
    }

    #[test]
    fn test_url_accepts_valid_candidate() {
        assert!(check_url_candidate("john-doe").is_ok());
        assert!(check_url_candidate("jane-doe-42").is_ok());
    }
}
