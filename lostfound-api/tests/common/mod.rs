#![allow(dead_code)]

//! Common test utilities for integration tests
//!
//! - In-memory store behind the real router
//! - Test user creation with pre-issued tokens
//! - Request helpers returning status and JSON body

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use lostfound_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, JwtConfig, StorageBackend, StorageConfig},
};
use lostfound_shared::{
    auth::jwt::issue_token_pair,
    models::user::{CreateUser, User},
    store::{memory::MemoryStore, Store},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: Router,
    pub config: Config,
}

/// A user with ready-to-use tokens
pub struct TestUser {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn token(&self) -> Option<&str> {
        Some(&self.access_token)
    }
}

/// Response status, headers and parsed JSON body (`Null` when empty)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            database_url: String::new(),
            max_connections: 1,
            run_migrations: false,
        },
        jwt: JwtConfig {
            secret: SECRET.to_string(),
        },
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let app = build_router(AppState::new(store.clone(), config.clone()));

        Self { store, app, config }
    }

    /// Creates a user directly in the store
    ///
    /// Skips password hashing; these users cannot log in with a password.
    pub async fn user(&self, username: &str) -> TestUser {
        let user = self
            .store
            .create_user(CreateUser {
                username: username.to_string(),
                email: None,
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .unwrap();

        let (access_token, refresh_token) =
            issue_token_pair(user.id, &user.username, SECRET).unwrap();

        TestUser {
            user,
            access_token,
            refresh_token,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "non-JSON body with status {}: {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Creates an item through the API and returns its ID
    pub async fn create_item(&self, owner: &TestUser, title: &str, item_type: &str) -> Uuid {
        let response = self
            .post("/v1/items", owner.token(), item_body(title, item_type, "others"))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        id_of(&response.body)
    }

    /// Submits a claim through the API and returns its ID
    pub async fn submit_claim(&self, claimant: &TestUser, item_id: Uuid) -> Uuid {
        let response = self
            .post(
                &format!("/v1/items/{}/claims", item_id),
                claimant.token(),
                json!({ "message": "It has my initials engraved on the back" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        id_of(&response.body)
    }
}

/// Request body for creating or editing an item
pub fn item_body(title: &str, item_type: &str, category: &str) -> Value {
    json!({
        "title": title,
        "description": "Left near the front desk",
        "category": category,
        "item_type": item_type,
        "location": "Main library",
        "date_reported": "2024-05-01",
    })
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .unwrap_or_else(|| panic!("response has no id: {}", body))
}
