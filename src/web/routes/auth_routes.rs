use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::sync::Arc;

use crate::services::auth_service;
use crate::web::middleware::auth::TOKEN_COOKIE;
use crate::web::models::{LoginRequest, RegisterRequest, RegisterResponse};
use crate::web::{AppError, AppState};

async fn register_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let Json(payload) = payload?;
    let user = auth_service::register_user(&app_state.db_pool, payload, app_state.config.bcrypt_cost)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully.".to_string(),
            user,
        }),
    ))
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let login_response = auth_service::login_user(
        &app_state.db_pool,
        payload,
        &app_state.config.jwt_secret,
        app_state.config.token_ttl_hours,
    )
    .await?;

    let auth_cookie = Cookie::build((TOKEN_COOKIE, login_response.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true)
        .build();
    let cookie_value: HeaderValue = auth_cookie
        .to_string()
        .parse()
        .map_err(|_| AppError::TokenCreationError("token is not a valid header value".to_string()))?;

    let mut response = Json(login_response).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie_value);
    Ok(response)
}

pub fn create_public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
}

pub fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(auth_service::me))
}
