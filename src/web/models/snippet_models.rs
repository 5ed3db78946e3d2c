use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::entities::tag;
use crate::db::models::{SnippetChanges, SnippetDraft, SnippetWithTags};
use crate::web::error::{AppError, FieldErrors};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_TAG_TITLE_LEN: usize = 50;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %I:%M %p";

// --- Request Payloads ---

/// Body of create, replace and partial-update requests. Every field is
/// optional at the serde level so that missing fields are reported together
/// with field-level detail instead of as an opaque parse error.
#[derive(Debug, Default, Deserialize)]
pub struct SnippetPayload {
    pub title: Option<String>,
    pub note: Option<String>,
    pub tags: Option<Vec<TagPayload>>,
}

#[derive(Debug, Deserialize)]
pub struct TagPayload {
    pub tag_title: Option<String>,
}

impl SnippetPayload {
    /// Validates a create or full-replace body. `title` and `note` are
    /// required; absent `tags` means no tags.
    pub fn into_draft(self) -> Result<SnippetDraft, AppError> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "title", self.title.is_none());
        require(&mut errors, "note", self.note.is_none());
        let changes = self.validate(errors)?;

        Ok(SnippetDraft {
            title: changes.title.unwrap_or_default(),
            note: changes.note.unwrap_or_default(),
            tag_labels: changes.tag_labels.unwrap_or_default(),
        })
    }

    /// Validates a partial-update body. Only the fields present are checked.
    pub fn into_changes(self) -> Result<SnippetChanges, AppError> {
        self.validate(FieldErrors::new())
    }

    /// `title` and each `tag_title` are trimmed before they are checked, so
    /// `" x "` and `"x"` name the same tag. `note` is kept verbatim.
    fn validate(self, mut errors: FieldErrors) -> Result<SnippetChanges, AppError> {
        let title = self.title.map(trimmed);
        if let Some(title) = &title {
            if title.is_empty() {
                push(&mut errors, "title", "This field may not be blank.");
            } else if title.chars().count() > MAX_TITLE_LEN {
                push(
                    &mut errors,
                    "title",
                    &format!("Ensure this field has no more than {MAX_TITLE_LEN} characters."),
                );
            }
        }
        if let Some(note) = &self.note {
            if note.trim().is_empty() {
                push(&mut errors, "note", "This field may not be blank.");
            }
        }

        let tag_labels = self.tags.map(|tags| {
            tags.into_iter()
                .enumerate()
                .filter_map(|(i, t)| {
                    let field = format!("tags[{i}].tag_title");
                    match t.tag_title.map(trimmed) {
                        None => {
                            push(&mut errors, &field, "This field is required.");
                            None
                        }
                        Some(label) if label.is_empty() => {
                            push(&mut errors, &field, "This field may not be blank.");
                            None
                        }
                        Some(label) if label.chars().count() > MAX_TAG_TITLE_LEN => {
                            push(
                                &mut errors,
                                &field,
                                &format!(
                                    "Ensure this field has no more than {MAX_TAG_TITLE_LEN} characters."
                                ),
                            );
                            None
                        }
                        Some(label) => Some(label),
                    }
                })
                .collect::<Vec<_>>()
        });

        if !errors.is_empty() {
            return Err(AppError::ValidationFailed(errors));
        }
        Ok(SnippetChanges {
            title,
            note: self.note,
            tag_labels,
        })
    }
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn require(errors: &mut FieldErrors, field: &str, missing: bool) {
    if missing {
        push(errors, field, "This field is required.");
    }
}

fn push(errors: &mut FieldErrors, field: &str, reason: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(reason.to_string());
}

// --- Response Views ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagView {
    pub id: i32,
    pub tag_title: String,
}

impl From<tag::Model> for TagView {
    fn from(tag: tag::Model) -> Self {
        TagView {
            id: tag.id,
            tag_title: tag.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetView {
    pub id: i32,
    pub title: String,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: i32,
    pub tags: Vec<TagView>,
}

impl From<SnippetWithTags> for SnippetView {
    fn from(item: SnippetWithTags) -> Self {
        let s = item.snippet;
        SnippetView {
            id: s.id,
            title: s.title,
            note: s.note,
            created_at: format_timestamp(&s.created_at),
            updated_at: format_timestamp(&s.updated_at),
            created_by: s.user_id,
            tags: item.tags.into_iter().map(TagView::from).collect(),
        }
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn to_views(snippets: Vec<SnippetWithTags>) -> Vec<SnippetView> {
    snippets.into_iter().map(SnippetView::from).collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnippetResponse {
    pub message: String,
    pub snippet: SnippetView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnippetListResponse {
    pub message: String,
    pub snippets: Vec<SnippetView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub message: String,
    pub total_count: u64,
    pub snippets: Vec<SnippetView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(json: serde_json::Value) -> SnippetPayload {
        serde_json::from_value(json).unwrap()
    }

    fn field_errors(err: AppError) -> FieldErrors {
        match err {
            AppError::ValidationFailed(errors) => errors,
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_format() {
        let afternoon = Utc.with_ymd_and_hms(2024, 5, 1, 15, 7, 42).unwrap();
        assert_eq!(format_timestamp(&afternoon), "2024-05-01 03:07 PM");

        let midnight = Utc.with_ymd_and_hms(2024, 12, 31, 0, 30, 0).unwrap();
        assert_eq!(format_timestamp(&midnight), "2024-12-31 12:30 AM");
    }

    #[test]
    fn test_draft_keeps_repeated_labels_in_order() {
        let draft = payload(serde_json::json!({
            "title": "T",
            "note": "N",
            "tags": [{"tag_title": "x"}, {"tag_title": "y"}, {"tag_title": "x"}]
        }))
        .into_draft()
        .unwrap();

        assert_eq!(draft.title, "T");
        assert_eq!(draft.note, "N");
        assert_eq!(draft.tag_labels, vec!["x", "y", "x"]);
    }

    #[test]
    fn test_draft_without_tags_is_untagged() {
        let draft = payload(serde_json::json!({"title": "T", "note": "N"}))
            .into_draft()
            .unwrap();
        assert!(draft.tag_labels.is_empty());
    }

    #[test]
    fn test_draft_requires_title_and_note() {
        let errors = field_errors(payload(serde_json::json!({"tags": []})).into_draft().unwrap_err());
        assert_eq!(errors["title"], vec!["This field is required."]);
        assert_eq!(errors["note"], vec!["This field is required."]);
    }

    #[test]
    fn test_blank_and_oversized_fields() {
        let errors = field_errors(
            payload(serde_json::json!({
                "title": "a".repeat(MAX_TITLE_LEN + 1),
                "note": "  ",
                "tags": [{"tag_title": "ok"}, {"tag_title": ""}, {"tag_title": "b".repeat(51)}, {}]
            }))
            .into_draft()
            .unwrap_err(),
        );

        assert_eq!(errors.len(), 5);
        assert!(errors["title"][0].contains("no more than 100"));
        assert_eq!(errors["note"], vec!["This field may not be blank."]);
        assert_eq!(errors["tags[1].tag_title"], vec!["This field may not be blank."]);
        assert!(errors["tags[2].tag_title"][0].contains("no more than 50"));
        assert_eq!(errors["tags[3].tag_title"], vec!["This field is required."]);
    }

    #[test]
    fn test_title_and_labels_are_trimmed() {
        let draft = payload(serde_json::json!({
            "title": "  T  ",
            "note": "  N  ",
            "tags": [{"tag_title": " x "}, {"tag_title": "\ty\n"}]
        }))
        .into_draft()
        .unwrap();

        assert_eq!(draft.title, "T");
        assert_eq!(draft.note, "  N  ");
        assert_eq!(draft.tag_labels, vec!["x", "y"]);

        // Length is measured after trimming.
        let padded = format!("  {}  ", "b".repeat(MAX_TAG_TITLE_LEN));
        let changes = payload(serde_json::json!({"tags": [{"tag_title": padded}]}))
            .into_changes()
            .unwrap();
        assert_eq!(changes.tag_labels, Some(vec!["b".repeat(MAX_TAG_TITLE_LEN)]));

        let errors = field_errors(
            payload(serde_json::json!({"title": "   ", "tags": [{"tag_title": " \t "}]}))
                .into_changes()
                .unwrap_err(),
        );
        assert_eq!(errors["title"], vec!["This field may not be blank."]);
        assert_eq!(errors["tags[0].tag_title"], vec!["This field may not be blank."]);
    }

    #[test]
    fn test_partial_changes_only_check_present_fields() {
        let changes = payload(serde_json::json!({"note": "new note"}))
            .into_changes()
            .unwrap();
        assert_eq!(changes.title, None);
        assert_eq!(changes.note.as_deref(), Some("new note"));
        assert_eq!(changes.tag_labels, None);

        let cleared = payload(serde_json::json!({"tags": []})).into_changes().unwrap();
        assert_eq!(cleared.tag_labels, Some(Vec::new()));

        let errors = field_errors(payload(serde_json::json!({"title": ""})).into_changes().unwrap_err());
        assert!(errors.contains_key("title"));
    }

    #[test]
    fn test_snippet_view_shape() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 9, 5, 0).unwrap();
        let item = SnippetWithTags {
            snippet: crate::db::entities::snippet::Model {
                id: 7,
                title: "T".to_string(),
                note: "N".to_string(),
                created_at: ts,
                updated_at: ts,
                user_id: 3,
            },
            tags: vec![tag::Model { id: 1, label: "x".to_string() }],
        };

        let json = serde_json::to_value(SnippetView::from(item)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "title": "T",
                "note": "N",
                "created_at": "2024-01-02 09:05 AM",
                "updated_at": "2024-01-02 09:05 AM",
                "created_by": 3,
                "tags": [{"id": 1, "tag_title": "x"}]
            })
        );
    }
}
