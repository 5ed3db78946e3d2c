use axum::{
    Json, Router,
    extract::{Extension, Path, State, rejection::PathRejection},
    routing::get,
};
use std::sync::Arc;

use crate::db::services::{self, SnippetService};
use crate::web::models::{AuthenticatedUser, SnippetListResponse, TagView, to_views};
use crate::web::routes::{method_not_allowed, path_id};
use crate::web::{AppError, AppState};

const TAG_NOT_FOUND: &str = "Tag not found.";

// Tags are created implicitly through snippet writes, so the collection is
// read-only. Other verbs get a 405 with a message body.
pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tags))
        .route("/{tag_id}", get(get_tag))
        .route("/{tag_id}/snippets", get(snippets_for_tag))
        .method_not_allowed_fallback(method_not_allowed)
}

async fn list_tags(State(app_state): State<Arc<AppState>>) -> Result<Json<Vec<TagView>>, AppError> {
    let tags = services::get_all_tags(&app_state.db_pool).await?;
    Ok(Json(tags.into_iter().map(TagView::from).collect()))
}

async fn get_tag(
    State(app_state): State<Arc<AppState>>,
    tag_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TagView>, AppError> {
    let tag_id = path_id(tag_id, TAG_NOT_FOUND)?;
    let tag = services::get_tag_by_id(&app_state.db_pool, tag_id).await?;
    Ok(Json(TagView::from(tag)))
}

async fn snippets_for_tag(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    tag_id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SnippetListResponse>, AppError> {
    let tag_id = path_id(tag_id, TAG_NOT_FOUND)?;
    let (tag, snippets) = SnippetService::list_for_tag(&app_state.db_pool, tag_id, user.id).await?;
    let message = if snippets.is_empty() {
        format!("No snippets found for tag \"{}\".", tag.label)
    } else {
        format!("Snippets found for tag \"{}\".", tag.label)
    };
    Ok(Json(SnippetListResponse {
        message,
        snippets: to_views(snippets),
    }))
}
