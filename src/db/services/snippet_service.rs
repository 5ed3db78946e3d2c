//! Service for managing snippets and their tag sets.
//!
//! Every function takes the calling user's id explicitly and scopes all reads
//! and writes to the snippets that user owns. A snippet owned by somebody else
//! is reported exactly like a snippet that does not exist.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{error, info};

use crate::db::entities::{prelude::*, snippet, snippet_tag, tag};
use crate::db::models::{SnippetChanges, SnippetDraft, SnippetOverview, SnippetWithTags};
use crate::db::services::tag_service::{self, TagError};

#[derive(Debug, thiserror::Error)]
pub enum SnippetError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Snippet not found: {0}")]
    NotFound(i32),
    #[error("Tag not found: {0}")]
    TagNotFound(i32),
}

impl From<TagError> for SnippetError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::DbErr(e) => SnippetError::DbErr(e),
            TagError::NotFound(id) => SnippetError::TagNotFound(id),
        }
    }
}

pub struct SnippetService;

impl SnippetService {
    pub async fn list(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<SnippetWithTags>, SnippetError> {
        let snippets = Snippet::find()
            .filter(snippet::Column::UserId.eq(user_id))
            .order_by_asc(snippet::Column::Id)
            .all(db)
            .await?;
        Ok(attach_tags(db, snippets).await?)
    }

    pub async fn get(
        db: &DatabaseConnection,
        snippet_id: i32,
        user_id: i32,
    ) -> Result<SnippetWithTags, SnippetError> {
        let snippet = find_owned(db, snippet_id, user_id).await?;
        Ok(with_tags(db, snippet).await?)
    }

    pub async fn create(
        db: &DatabaseConnection,
        user_id: i32,
        draft: SnippetDraft,
    ) -> Result<SnippetWithTags, SnippetError> {
        let now = Utc::now();
        let new_snippet = snippet::ActiveModel {
            title: Set(draft.title),
            note: Set(draft.note),
            created_at: Set(now),
            updated_at: Set(now),
            user_id: Set(user_id),
            ..Default::default()
        };

        let txn = db.begin().await?;

        let saved = new_snippet.insert(&txn).await?;
        replace_tags(&txn, saved.id, &draft.tag_labels).await?;
        let created = with_tags(&txn, saved).await?;

        txn.commit().await?;

        info!(
            user_id,
            snippet_id = created.snippet.id,
            tag_count = created.tags.len(),
            "Snippet created."
        );
        Ok(created)
    }

    /// Replaces title, note and the complete tag set.
    pub async fn update(
        db: &DatabaseConnection,
        snippet_id: i32,
        user_id: i32,
        draft: SnippetDraft,
    ) -> Result<SnippetWithTags, SnippetError> {
        Self::apply_changes(db, snippet_id, user_id, draft.into()).await
    }

    /// Applies a partial change set. Absent fields keep their stored values.
    pub async fn apply_changes(
        db: &DatabaseConnection,
        snippet_id: i32,
        user_id: i32,
        changes: SnippetChanges,
    ) -> Result<SnippetWithTags, SnippetError> {
        let txn = db.begin().await?;

        let existing = find_owned(&txn, snippet_id, user_id).await?;

        let mut active_snippet: snippet::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active_snippet.title = Set(title);
        }
        if let Some(note) = changes.note {
            active_snippet.note = Set(note);
        }
        active_snippet.updated_at = Set(Utc::now());
        let saved = active_snippet.update(&txn).await?;

        if let Some(labels) = &changes.tag_labels {
            replace_tags(&txn, saved.id, labels).await?;
        }
        let updated = with_tags(&txn, saved).await?;

        txn.commit().await?;

        info!(
            user_id,
            snippet_id,
            tag_count = updated.tags.len(),
            "Snippet updated."
        );
        Ok(updated)
    }

    /// Deletes the snippet and its tag associations, then returns what the
    /// user still owns. Tag rows are left in place.
    pub async fn delete(
        db: &DatabaseConnection,
        snippet_id: i32,
        user_id: i32,
    ) -> Result<Vec<SnippetWithTags>, SnippetError> {
        let txn = db.begin().await?;

        let existing = find_owned(&txn, snippet_id, user_id).await?;
        SnippetTag::delete_many()
            .filter(snippet_tag::Column::SnippetId.eq(existing.id))
            .exec(&txn)
            .await?;
        existing.delete(&txn).await?;

        txn.commit().await?;

        info!(user_id, snippet_id, "Snippet deleted.");
        Self::list(db, user_id).await
    }

    pub async fn overview(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<SnippetOverview, SnippetError> {
        let snippets = Self::list(db, user_id).await?;
        Ok(SnippetOverview {
            total_count: snippets.len() as u64,
            snippets,
        })
    }

    /// The user's snippets carrying `tag_id`, along with the tag itself.
    pub async fn list_for_tag(
        db: &DatabaseConnection,
        tag_id: i32,
        user_id: i32,
    ) -> Result<(tag::Model, Vec<SnippetWithTags>), SnippetError> {
        let (tag, ids) = tag_service::get_snippet_ids_for_tag(db, tag_id, user_id).await?;

        let snippets = if ids.is_empty() {
            Vec::new()
        } else {
            Snippet::find()
                .filter(snippet::Column::Id.is_in(ids))
                .filter(snippet::Column::UserId.eq(user_id))
                .order_by_asc(snippet::Column::Id)
                .all(db)
                .await?
        };
        Ok((tag, attach_tags(db, snippets).await?))
    }
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    snippet_id: i32,
    user_id: i32,
) -> Result<snippet::Model, SnippetError> {
    Snippet::find_by_id(snippet_id)
        .filter(snippet::Column::UserId.eq(user_id))
        .one(conn)
        .await
        .inspect_err(|e| error!(snippet_id, user_id, error = %e, "Failed to load snippet."))?
        .ok_or(SnippetError::NotFound(snippet_id))
}

/// Clears the snippet's associations and attaches the resolved `labels`.
/// Repeated labels collapse into a single association.
async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    snippet_id: i32,
    labels: &[String],
) -> Result<(), DbErr> {
    SnippetTag::delete_many()
        .filter(snippet_tag::Column::SnippetId.eq(snippet_id))
        .exec(conn)
        .await?;

    let mut tag_ids: Vec<i32> = Vec::with_capacity(labels.len());
    let mut seen = HashSet::new();
    for label in labels {
        let tag = tag_service::resolve_tag(conn, label).await?;
        if seen.insert(tag.id) {
            tag_ids.push(tag.id);
        }
    }

    if !tag_ids.is_empty() {
        let links = tag_ids.into_iter().map(|tag_id| snippet_tag::ActiveModel {
            snippet_id: Set(snippet_id),
            tag_id: Set(tag_id),
        });
        SnippetTag::insert_many(links)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

async fn with_tags<C: ConnectionTrait>(
    conn: &C,
    snippet: snippet::Model,
) -> Result<SnippetWithTags, DbErr> {
    let mut expanded = attach_tags(conn, vec![snippet]).await?;
    expanded
        .pop()
        .ok_or_else(|| DbErr::Custom("snippet lost while expanding tags".to_string()))
}

/// Expands the tag sets of `snippets` with two queries, keeping input order.
async fn attach_tags<C: ConnectionTrait>(
    conn: &C,
    snippets: Vec<snippet::Model>,
) -> Result<Vec<SnippetWithTags>, DbErr> {
    if snippets.is_empty() {
        return Ok(Vec::new());
    }

    let snippet_ids: Vec<i32> = snippets.iter().map(|s| s.id).collect();
    let links = SnippetTag::find()
        .filter(snippet_tag::Column::SnippetId.is_in(snippet_ids))
        .all(conn)
        .await?;

    let tag_ids: HashSet<i32> = links.iter().map(|l| l.tag_id).collect();
    let tags: HashMap<i32, tag::Model> = if tag_ids.is_empty() {
        HashMap::new()
    } else {
        Tag::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect()
    };

    let mut tags_by_snippet: HashMap<i32, Vec<tag::Model>> = HashMap::new();
    for link in links {
        if let Some(tag) = tags.get(&link.tag_id) {
            tags_by_snippet
                .entry(link.snippet_id)
                .or_default()
                .push(tag.clone());
        }
    }

    Ok(snippets
        .into_iter()
        .map(|snippet| {
            let mut tags = tags_by_snippet.remove(&snippet.id).unwrap_or_default();
            tags.sort_by(|a, b| a.label.cmp(&b.label));
            SnippetWithTags { snippet, tags }
        })
        .collect())
}
