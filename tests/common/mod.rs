#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use snipbox::db;
use snipbox::db::entities::user;
use snipbox::db::services as db_services;
use snipbox::server::config::ServerConfig;
use snipbox::services::auth_service;

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub db: DatabaseConnection,
    pub router: Router,
    pub config: Arc<ServerConfig>,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_dir: "logs".to_string(),
        token_ttl_hours: 1,
        // Each SQLite memory connection is its own database.
        max_db_connections: 1,
        bcrypt_cost: 4,
    }
}

pub async fn setup() -> TestApp {
    let config = Arc::new(test_config());
    let db = db::connect(&config).await.unwrap();
    let router = snipbox::web::create_axum_router(db.clone(), config.clone());
    TestApp { db, router, config }
}

impl TestApp {
    /// Inserts a user directly; the password hash is irrelevant for token auth.
    pub async fn user(&self, username: &str) -> user::Model {
        db_services::create_user(&self.db, username, "unused-hash")
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &user::Model) -> String {
        auth_service::create_jwt_for_user(user, JWT_SECRET, 1)
            .unwrap()
            .token
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

pub fn tag_titles(snippet: &Value) -> Vec<String> {
    snippet["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tag_title"].as_str().unwrap().to_string())
        .collect()
}
