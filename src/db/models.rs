//! Database Models - structs representing database tables (used by sqlx/serde).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed set of page themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Classic,
    Minimal,
    Dark,
    Modern,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Minimal => "minimal",
            Theme::Dark => "dark",
            Theme::Modern => "modern",
        }
    }

    pub fn parse(s: &str) -> Option<Theme> {
        match s {
            "classic" => Some(Theme::Classic),
            "minimal" => Some(Theme::Minimal),
            "dark" => Some(Theme::Dark),
            "modern" => Some(Theme::Modern),
            _ => None,
        }
    }
}

/// Page identity and metadata. Content is a separate, explicit fetch;
/// it is large and most callers only need the identity columns.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub owner_id: String,
    pub url_slug: String,
    pub theme: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project identity and metadata, keyed by (owner_id, project_slug).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub owner_id: String,
    pub project_slug: String,
    pub display_name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (slug, position) pair in a reorder batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub slug: String,
    pub position: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_round_trips() {
        for theme in [Theme::Classic, Theme::Minimal, Theme::Dark, Theme::Modern] {
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
    }

    #[test]
    fn test_theme_parse_rejects_unknown() {
        assert_eq!(Theme::parse("neon"), None);
        assert_eq!(Theme::parse("Classic"), None);
    }

    #[test]
    fn test_theme_serde_is_lowercase() {
        let json = serde_json::to_string(&Theme::Dark).unwrap();
        assert_eq!(json, r#""dark""#);
    }
}
