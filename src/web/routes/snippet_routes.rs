use axum::{
    Json, Router,
    extract::{
        Extension, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;

use crate::db::services::SnippetService;
use crate::web::models::{
    AuthenticatedUser, OverviewResponse, SnippetListResponse, SnippetPayload, SnippetResponse,
    SnippetView, to_views,
};
use crate::web::routes::{method_not_allowed, path_id};
use crate::web::{AppError, AppState};

const NO_SNIPPETS: &str = "No snippets found.";
const SNIPPET_NOT_FOUND: &str = "Snippet not found.";

pub fn create_snippets_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_snippets).post(create_snippet))
        .route("/overview", get(overview))
        .route(
            "/{id}",
            get(get_snippet)
                .put(update_snippet)
                .patch(patch_snippet)
                .delete(delete_snippet),
        )
        .method_not_allowed_fallback(method_not_allowed)
}

async fn list_snippets(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<SnippetListResponse>, AppError> {
    let snippets = SnippetService::list(&app_state.db_pool, user.id).await?;
    let message = if snippets.is_empty() {
        NO_SNIPPETS
    } else {
        "Snippets retrieved successfully."
    };
    Ok(Json(SnippetListResponse {
        message: message.to_string(),
        snippets: to_views(snippets),
    }))
}

async fn create_snippet(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<SnippetPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<SnippetResponse>), AppError> {
    let Json(payload) = payload?;
    let draft = payload.into_draft()?;
    let snippet = SnippetService::create(&app_state.db_pool, user.id, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(SnippetResponse {
            message: "Snippet created successfully.".to_string(),
            snippet: SnippetView::from(snippet),
        }),
    ))
}

async fn get_snippet(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SnippetResponse>, AppError> {
    let id = path_id(id, SNIPPET_NOT_FOUND)?;
    let snippet = SnippetService::get(&app_state.db_pool, id, user.id).await?;
    Ok(Json(SnippetResponse {
        message: "Snippet retrieved successfully.".to_string(),
        snippet: SnippetView::from(snippet),
    }))
}

async fn update_snippet(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SnippetPayload>, JsonRejection>,
) -> Result<Json<SnippetResponse>, AppError> {
    let id = path_id(id, SNIPPET_NOT_FOUND)?;
    let Json(payload) = payload?;
    let draft = payload.into_draft()?;
    let snippet = SnippetService::update(&app_state.db_pool, id, user.id, draft).await?;
    Ok(Json(SnippetResponse {
        message: "Snippet updated successfully.".to_string(),
        snippet: SnippetView::from(snippet),
    }))
}

async fn patch_snippet(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<SnippetPayload>, JsonRejection>,
) -> Result<Json<SnippetResponse>, AppError> {
    let id = path_id(id, SNIPPET_NOT_FOUND)?;
    let Json(payload) = payload?;
    let changes = payload.into_changes()?;
    let snippet = SnippetService::apply_changes(&app_state.db_pool, id, user.id, changes).await?;
    Ok(Json(SnippetResponse {
        message: "Snippet updated successfully.".to_string(),
        snippet: SnippetView::from(snippet),
    }))
}

async fn delete_snippet(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<SnippetListResponse>, AppError> {
    let id = path_id(id, SNIPPET_NOT_FOUND)?;
    let remaining = SnippetService::delete(&app_state.db_pool, id, user.id).await?;
    Ok(Json(SnippetListResponse {
        message: "Snippet deleted successfully.".to_string(),
        snippets: to_views(remaining),
    }))
}

async fn overview(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<OverviewResponse>, AppError> {
    let overview = SnippetService::overview(&app_state.db_pool, user.id).await?;
    let message = match overview.total_count {
        0 => NO_SNIPPETS.to_string(),
        count => format!("Total {count} snippets found."),
    };
    Ok(Json(OverviewResponse {
        message,
        total_count: overview.total_count,
        snippets: to_views(overview.snippets),
    }))
}
