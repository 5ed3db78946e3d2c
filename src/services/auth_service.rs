use axum::{Extension, Json, extract::State};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::{DatabaseConnection, SqlErr};
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::entities::user;
use crate::db::services as db_services;
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::models::{
    AuthenticatedUser, Claims, LoginRequest, LoginResponse, RegisterRequest, UserResponse,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
    bcrypt_cost: u32,
) -> Result<UserResponse, AppError> {
    if req.username.trim().is_empty() || req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Username must not be empty and password needs at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let password_hash = hash(&req.password, bcrypt_cost)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let user_model = db_services::create_user(pool, &req.username, &password_hash)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::UserAlreadyExists("Username is already taken.".to_string())
            }
            _ => AppError::DatabaseError(e.to_string()),
        })?;

    info!(user_id = user_model.id, username = %user_model.username, "User registered.");
    Ok(UserResponse {
        id: user_model.id,
        username: user_model.username,
    })
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
    token_ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username and password must not be empty.".to_string(),
        ));
    }

    let user = db_services::get_user_by_username(pool, &req.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let valid_password = verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_jwt_for_user(&user, jwt_secret, token_ttl_hours)
}

pub fn create_jwt_for_user(
    user: &user::Model,
    jwt_secret: &str,
    token_ttl_hours: i64,
) -> Result<LoginResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(token_ttl_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user.username.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(jwt_secret.as_ref()))
        .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(LoginResponse {
        message: "Login successful.".to_string(),
        token,
        user_id: user.id,
        username: user.username.clone(),
    })
}

/// Checks signature and expiry, and returns the identity the token was issued to.
pub fn verify_token(token: &str, jwt_secret: &str) -> Result<AuthenticatedUser, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| AuthenticatedUser::from(data.claims))
    .map_err(|e| {
        warn!(error = ?e, "Rejected bearer token.");
        AppError::Unauthorized("Invalid or expired token.".to_string())
    })
}

pub async fn me(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_services::get_user_by_id(&app_state.db_pool, user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists.".to_string()))?;
    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> user::Model {
        user::Model {
            id: 42,
            username: "alice".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_carries_identity() {
        let login = create_jwt_for_user(&sample_user(), "secret", 1).unwrap();
        assert_eq!(login.user_id, 42);

        let user = verify_token(&login.token, "secret").unwrap();
        assert_eq!(user.id, 42);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn test_token_rejected_with_other_secret() {
        let login = create_jwt_for_user(&sample_user(), "secret", 1).unwrap();
        let err = verify_token(&login.token, "other").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let login = create_jwt_for_user(&sample_user(), "secret", -2).unwrap();
        assert!(verify_token(&login.token, "secret").is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token("not-a-jwt", "secret").is_err());
    }
}
