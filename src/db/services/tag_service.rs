use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::OnConflict,
};
use tracing::debug;

use crate::db::entities::{prelude::*, snippet, tag};

// --- Tag Registry Functions ---

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Tag not found: {0}")]
    NotFound(i32),
}

async fn find_by_label<C: ConnectionTrait>(conn: &C, label: &str) -> Result<Option<tag::Model>, DbErr> {
    Tag::find()
        .filter(tag::Column::Label.eq(label))
        .one(conn)
        .await
}

/// Returns the id of the tag carrying `label`, creating the tag if it does not
/// exist yet.
///
/// The unique index on `tags.label` is authoritative: the insert is an
/// `ON CONFLICT DO NOTHING`, so a concurrent writer that created the same label
/// first simply makes our insert a no-op and the follow-up read finds its row.
pub async fn resolve_tag<C: ConnectionTrait>(conn: &C, label: &str) -> Result<tag::Model, DbErr> {
    if let Some(existing) = find_by_label(conn, label).await? {
        return Ok(existing);
    }

    let new_tag = tag::ActiveModel {
        label: Set(label.to_owned()),
        ..Default::default()
    };
    let inserted = Tag::insert(new_tag)
        .on_conflict(OnConflict::column(tag::Column::Label).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    if inserted == 0 {
        debug!(label, "Tag label was created concurrently, re-reading.");
    }

    find_by_label(conn, label)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("tag '{label}' vanished after insert")))
}

/// Retrieves every tag, sorted by label.
pub async fn get_all_tags<C: ConnectionTrait>(conn: &C) -> Result<Vec<tag::Model>, DbErr> {
    Tag::find().order_by_asc(tag::Column::Label).all(conn).await
}

pub async fn get_tag_by_id<C: ConnectionTrait>(conn: &C, tag_id: i32) -> Result<tag::Model, TagError> {
    Tag::find_by_id(tag_id)
        .one(conn)
        .await?
        .ok_or(TagError::NotFound(tag_id))
}

/// Ids of the snippets owned by `user_id` that carry `tag_id`, along with the
/// tag. A missing tag is an error rather than an empty result.
pub async fn get_snippet_ids_for_tag<C: ConnectionTrait>(
    conn: &C,
    tag_id: i32,
    user_id: i32,
) -> Result<(tag::Model, Vec<i32>), TagError> {
    let tag = get_tag_by_id(conn, tag_id).await?;

    let ids: Vec<i32> = Snippet::find()
        .select_only()
        .column(snippet::Column::Id)
        .inner_join(Tag)
        .filter(tag::Column::Id.eq(tag_id))
        .filter(snippet::Column::UserId.eq(user_id))
        .order_by_asc(snippet::Column::Id)
        .into_tuple::<i32>()
        .all(conn)
        .await?;
    Ok((tag, ids))
}
