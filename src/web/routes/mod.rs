use axum::{
    extract::{Path, rejection::PathRejection},
    http::Method,
};
use tracing::debug;

use crate::web::AppError;

pub mod auth_routes;
pub mod snippet_routes;
pub mod tag_routes;

/// Installed on each resource router after its routes are registered.
pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(method.to_string())
}

/// An id segment that is not a valid `i32` cannot name a stored row, so it
/// resolves to the same 404 as an unknown id.
pub(crate) fn path_id(
    path: Result<Path<i32>, PathRejection>,
    not_found: &str,
) -> Result<i32, AppError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Unparseable id in request path.");
        AppError::NotFound(not_found.to_string())
    })
}
