use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::services::auth_service;
use crate::web::{AppState, error::AppError};

pub const TOKEN_COOKIE: &str = "token";

/// Resolves the caller from a bearer token or the login cookie and stores it
/// as an `AuthenticatedUser` extension. Requests without a usable token stop
/// here with 401.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = presented_token(req.headers(), &jar).ok_or_else(|| {
        AppError::Unauthorized("Authentication credentials were not provided.".to_string())
    })?;
    let user = auth_service::verify_token(&token, &state.config.jwt_secret)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// The `Authorization: Bearer` header wins over the cookie.
fn presented_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_bearer_header_preferred_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));

        assert_eq!(presented_token(&headers, &jar).as_deref(), Some("abc"));
    }

    #[test]
    fn test_cookie_used_without_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        let jar = CookieJar::new().add(Cookie::new(TOKEN_COOKIE, "from-cookie"));

        assert_eq!(presented_token(&headers, &jar).as_deref(), Some("from-cookie"));
        assert_eq!(presented_token(&HeaderMap::new(), &CookieJar::new()), None);
    }
}
