//! Domain shapes passed between the services and the web layer.

use crate::db::entities::{snippet, tag};

/// A snippet together with its expanded tag set, ordered by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetWithTags {
    pub snippet: snippet::Model,
    pub tags: Vec<tag::Model>,
}

impl SnippetWithTags {
    pub fn tag_labels(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.label.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetOverview {
    pub total_count: u64,
    pub snippets: Vec<SnippetWithTags>,
}

/// Full contents of a snippet as supplied on create or full replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDraft {
    pub title: String,
    pub note: String,
    pub tag_labels: Vec<String>,
}

/// A partial change set. `None` keeps the stored value; `Some` replaces it.
/// A present tag list always replaces the whole set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnippetChanges {
    pub title: Option<String>,
    pub note: Option<String>,
    pub tag_labels: Option<Vec<String>>,
}

impl From<SnippetDraft> for SnippetChanges {
    fn from(draft: SnippetDraft) -> Self {
        SnippetChanges {
            title: Some(draft.title),
            note: Some(draft.note),
            tag_labels: Some(draft.tag_labels),
        }
    }
}
