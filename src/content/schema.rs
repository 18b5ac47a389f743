/**
 * Schema Validator
 * Parses uploaded content documents and checks them against the two
 * fixed shapes (profile, project), reporting every violation at once.
 */
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Records
// ============================================================================

/// Which of the two fixed document shapes to validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Profile,
    Project,
}

/// Field-level validation issue; forwarded verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path into the document, e.g. `experience[0].title`.
    pub field: String,
    pub issue: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, issue: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            issue: issue.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
}

/// Validated profile document. Optional groups are absent rather than
/// empty so a record serializes back to exactly what re-validates equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub name: String,
    pub bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<ContactEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<ExperienceEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<EducationEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<SkillEntry>>,
}

/// Validated project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// A validated document of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentRecord {
    Profile(ProfileRecord),
    Project(ProjectRecord),
}

// ============================================================================
// Field limits
// ============================================================================

const MAX_NAME: usize = 100;
const MAX_BIO: usize = 500;
const MAX_CONTACT_LABEL: usize = 50;
const MAX_CONTACT_VALUE: usize = 100;
const MAX_EXPERIENCE_TITLE: usize = 100;
const MAX_EXPERIENCE_DESC: usize = 500;
const MAX_EDUCATION_TITLE: usize = 100;
const MAX_EDUCATION_DESC: usize = 300;
const MAX_SKILL_NAME: usize = 50;
const MAX_PROJECT_DESC: usize = 500;
const MAX_TECH_STACK: usize = 500;
const MAX_PRODUCTION_LINK: usize = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Entry points
// ============================================================================

/// Validate a raw document against the shape selected by `kind`.
///
/// Returns either the fully typed record or the complete list of
/// field issues; never a partial record alongside issues.
pub fn validate(kind: ContentKind, raw: &str) -> Result<ContentRecord, Vec<FieldIssue>> {
    match kind {
        ContentKind::Profile => validate_profile(raw).map(ContentRecord::Profile),
        ContentKind::Project => validate_project(raw).map(ContentRecord::Project),
    }
}

pub fn validate_profile(raw: &str) -> Result<ProfileRecord, Vec<FieldIssue>> {
    let object = parse_object(raw)?;
    let mut issues = Vec::new();

    let name = require_string(&object, "name", MAX_NAME, &mut issues);
    let bio = require_string(&object, "bio", MAX_BIO, &mut issues);

    let contact = optional_entries(&object, "contact", &mut issues, |entry, path, issues| {
        let label = require_string_at(entry, path, "label", MAX_CONTACT_LABEL, issues);
        let value = require_string_at(entry, path, "value", MAX_CONTACT_VALUE, issues);
        Some(ContactEntry {
            label: label?,
            value: value?,
        })
    });
    let experience = optional_entries(&object, "experience", &mut issues, |entry, path, issues| {
        let title = require_string_at(entry, path, "title", MAX_EXPERIENCE_TITLE, issues);
        let description = require_string_at(entry, path, "description", MAX_EXPERIENCE_DESC, issues);
        Some(ExperienceEntry {
            title: title?,
            description: description?,
        })
    });
    let education = optional_entries(&object, "education", &mut issues, |entry, path, issues| {
        let title = require_string_at(entry, path, "title", MAX_EDUCATION_TITLE, issues);
        let description = require_string_at(entry, path, "description", MAX_EDUCATION_DESC, issues);
        Some(EducationEntry {
            title: title?,
            description: description?,
        })
    });
    let skills = optional_entries(&object, "skills", &mut issues, |entry, path, issues| {
        let name = require_string_at(entry, path, "name", MAX_SKILL_NAME, issues);
        Some(SkillEntry { name: name? })
    });

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ProfileRecord {
        name: name.unwrap_or_default(),
        bio: bio.unwrap_or_default(),
        contact,
        experience,
        education,
        skills,
    })
}

pub fn validate_project(raw: &str) -> Result<ProjectRecord, Vec<FieldIssue>> {
    let object = parse_object(raw)?;
    let mut issues = Vec::new();

    let name = require_string(&object, "name", MAX_NAME, &mut issues);
    let description = require_string(&object, "description", MAX_PROJECT_DESC, &mut issues);
    let tech_stack = optional_string(&object, "tech_stack", MAX_TECH_STACK, &mut issues);
    let production_link =
        optional_string(&object, "production_link", MAX_PRODUCTION_LINK, &mut issues);
    let start_date = optional_date(&object, "start_date", &mut issues);
    let end_date = optional_date(&object, "end_date", &mut issues);

    // Cross-field rule: only when both dates parsed cleanly.
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            issues.push(FieldIssue::new(
                "end_date",
                "must not be earlier than start_date",
            ));
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(ProjectRecord {
        name: name.unwrap_or_default(),
        description: description.unwrap_or_default(),
        tech_stack,
        production_link,
        start_date,
        end_date,
    })
}

// ============================================================================
// Walk helpers
// ============================================================================

fn parse_object(raw: &str) -> Result<Map<String, Value>, Vec<FieldIssue>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| vec![FieldIssue::new("$", format!("document is not valid JSON: {}", e))])?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(vec![FieldIssue::new("$", "document must be a JSON object")]),
    }
}

fn check_length(text: &str, max: usize, path: &str, issues: &mut Vec<FieldIssue>) -> bool {
    if text.chars().count() > max {
        issues.push(FieldIssue::new(
            path,
            format!("must be at most {} characters", max),
        ));
        false
    } else {
        true
    }
}

fn require_string(
    object: &Map<String, Value>,
    field: &str,
    max: usize,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new(field, "is required"));
            None
        }
        Some(Value::String(s)) => {
            if check_length(s, max, field, issues) {
                Some(s.clone())
            } else {
                None
            }
        }
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be a string"));
            None
        }
    }
}

/// Required string field nested inside a repeated group entry.
fn require_string_at(
    entry: &Map<String, Value>,
    entry_path: &str,
    field: &str,
    max: usize,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    let path = format!("{}.{}", entry_path, field);
    match entry.get(field) {
        None | Some(Value::Null) => {
            issues.push(FieldIssue::new(path, "is required"));
            None
        }
        Some(Value::String(s)) => {
            if check_length(s, max, &path, issues) {
                Some(s.clone())
            } else {
                None
            }
        }
        Some(_) => {
            issues.push(FieldIssue::new(path, "must be a string"));
            None
        }
    }
}

fn optional_string(
    object: &Map<String, Value>,
    field: &str,
    max: usize,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            if check_length(s, max, field, issues) {
                Some(s.clone())
            } else {
                None
            }
        }
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be a string"));
            None
        }
    }
}

fn optional_date(
    object: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<NaiveDate> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                issues.push(FieldIssue::new(
                    field,
                    "must be a valid date in YYYY-MM-DD format",
                ));
                None
            }
        },
        Some(_) => {
            issues.push(FieldIssue::new(
                field,
                "must be a valid date in YYYY-MM-DD format",
            ));
            None
        }
    }
}

/// Walk an optional repeated group. A present-but-empty array normalizes
/// to absent so serializing a record round-trips to an equal record.
fn optional_entries<T>(
    object: &Map<String, Value>,
    field: &str,
    issues: &mut Vec<FieldIssue>,
    mut each: impl FnMut(&Map<String, Value>, &str, &mut Vec<FieldIssue>) -> Option<T>,
) -> Option<Vec<T>> {
    let items = match object.get(field) {
        None | Some(Value::Null) => return None,
        Some(Value::Array(items)) => items,
        Some(_) => {
            issues.push(FieldIssue::new(field, "must be an array"));
            return None;
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let path = format!("{}[{}]", field, index);
        match item {
            Value::Object(entry) => {
                if let Some(parsed) = each(entry, &path, issues) {
                    entries.push(parsed);
                }
            }
            _ => issues.push(FieldIssue::new(path, "must be an object")),
        }
    }

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_fields(issues: &[FieldIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn test_profile_minimal_valid() {
        let record = validate_profile(r#"{"name": "Jane Doe", "bio": "Rust developer"}"#)
            .expect("should validate");
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.bio, "Rust developer");
        assert!(record.contact.is_none());
        assert!(record.skills.is_none());
    }

    #[test]
    fn test_profile_full_valid() {
        let raw = r#"{
            "name": "Jane Doe",
            "bio": "Rust developer",
            "contact": [{"label": "email", "value": "jane@example.com"}],
            "experience": [{"title": "Engineer", "description": "Built things"}],
            "education": [{"title": "BSc", "description": "Computer Science"}],
            "skills": [{"name": "Rust"}, {"name": "SQL"}]
        }"#;
        let record = validate_profile(raw).expect("should validate");
        assert_eq!(record.contact.as_ref().map(Vec::len), Some(1));
        assert_eq!(record.skills.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_profile_missing_required_field_reports_exactly_that_field() {
        let issues = validate_profile(r#"{"bio": "Rust developer"}"#).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "name");
        assert_eq!(issues[0].issue, "is required");
    }

    #[test]
    fn test_profile_reports_all_issues_in_one_pass() {
        let raw = r#"{
            "contact": [{"label": "email"}],
            "skills": [{"name": 42}]
        }"#;
        let issues = validate_profile(raw).unwrap_err();
        let fields = issue_fields(&issues);
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"bio"));
        assert!(fields.contains(&"contact[0].value"));
        assert!(fields.contains(&"skills[0].name"));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_profile_too_long_field() {
        let long_name = "x".repeat(101);
        let raw = format!(r#"{{"name": "{}", "bio": "ok"}}"#, long_name);
        let issues = validate_profile(&raw).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "name");
        assert_eq!(issues[0].issue, "must be at most 100 characters");
    }

    #[test]
    fn test_profile_length_counts_chars_not_bytes() {
        // 100 multi-byte characters is exactly at the limit
        let name = "é".repeat(100);
        let raw = format!(r#"{{"name": "{}", "bio": "ok"}}"#, name);
        assert!(validate_profile(&raw).is_ok());
    }

    #[test]
    fn test_profile_unknown_top_level_fields_ignored() {
        let raw = r#"{"name": "Jane", "bio": "ok", "favourite_color": "green"}"#;
        assert!(validate_profile(raw).is_ok());
    }

    #[test]
    fn test_profile_empty_group_normalizes_to_absent() {
        let record = validate_profile(r#"{"name": "Jane", "bio": "ok", "skills": []}"#)
            .expect("should validate");
        assert!(record.skills.is_none());
    }

    #[test]
    fn test_syntax_error_yields_single_document_issue() {
        let issues = validate_profile("{not json").unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "$");
    }

    #[test]
    fn test_non_object_document_rejected() {
        let issues = validate_profile(r#"[1, 2, 3]"#).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "$");
    }

    #[test]
    fn test_project_minimal_valid() {
        let record = validate_project(r#"{"name": "Pagefolio", "description": "A backend"}"#)
            .expect("should validate");
        assert_eq!(record.name, "Pagefolio");
        assert!(record.start_date.is_none());
    }

    #[test]
    fn test_project_dates_ordering_enforced() {
        let raw = r#"{
            "name": "Pagefolio",
            "description": "A backend",
            "start_date": "2024-06-01",
            "end_date": "2024-01-01"
        }"#;
        let issues = validate_project(raw).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "end_date");

        // swapping the values makes it pass
        let swapped = r#"{
            "name": "Pagefolio",
            "description": "A backend",
            "start_date": "2024-01-01",
            "end_date": "2024-06-01"
        }"#;
        assert!(validate_project(swapped).is_ok());
    }

    #[test]
    fn test_project_equal_dates_allowed() {
        let raw = r#"{
            "name": "Pagefolio",
            "description": "A backend",
            "start_date": "2024-01-01",
            "end_date": "2024-01-01"
        }"#;
        assert!(validate_project(raw).is_ok());
    }

    #[test]
    fn test_project_bad_date_format() {
        let raw = r#"{"name": "P", "description": "D", "start_date": "01/06/2024"}"#;
        let issues = validate_project(raw).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "start_date");
    }

    #[test]
    fn test_project_no_cross_field_issue_when_date_unparseable() {
        // end_date failed to parse, so only the format issue is reported
        let raw = r#"{
            "name": "P",
            "description": "D",
            "start_date": "2024-06-01",
            "end_date": "yesterday"
        }"#;
        let issues = validate_project(raw).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue, "must be a valid date in YYYY-MM-DD format");
    }

    #[test]
    fn test_validate_roundtrip_is_idempotent() {
        let raw = r#"{
            "name": "Jane Doe",
            "bio": "Rust developer",
            "experience": [{"title": "Engineer", "description": "Built things"}]
        }"#;
        let record = validate(ContentKind::Profile, raw).expect("should validate");
        let serialized = serde_json::to_string(&record).expect("serializes");
        let revalidated = validate(ContentKind::Profile, &serialized).expect("should revalidate");
        assert_eq!(record, revalidated);
    }

    #[test]
    fn test_project_roundtrip_with_dates() {
        let raw = r#"{
            "name": "Pagefolio",
            "description": "A backend",
            "tech_stack": "Rust, Axum, Postgres",
            "start_date": "2024-01-01",
            "end_date": "2024-06-01"
        }"#;
        let record = validate(ContentKind::Project, raw).expect("should validate");
        let serialized = serde_json::to_string(&record).expect("serializes");
        let revalidated = validate(ContentKind::Project, &serialized).expect("should revalidate");
        assert_eq!(record, revalidated);
    }
}
