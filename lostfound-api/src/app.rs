/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use lostfound_api::{app::AppState, config::Config};
/// use lostfound_shared::store::memory::MemoryStore;
/// use std::sync::Arc;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config);
/// let app = lostfound_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use lostfound_shared::{
    auth::middleware::{create_jwt_middleware, create_optional_jwt_middleware},
    store::Store,
};
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Borrowed store handle for lifecycle calls
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                       # Health check (public)
/// └── /v1/
///     ├── /auth/                        # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── GET    /home                  # Public dashboard
///     ├── GET    /items                 # Public search
///     ├── GET    /items/:id             # Optional JWT
///     ├── POST   /items                 # JWT from here on
///     ├── GET    /items/mine
///     ├── PUT    /items/:id
///     ├── DELETE /items/:id
///     ├── POST   /items/:id/close
///     ├── POST   /items/:id/claims
///     ├── GET    /items/:id/claims
///     ├── POST   /claims/:id/approve
///     ├── POST   /claims/:id/reject
///     └── GET    /me
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Compression
/// 4. Logging (tower-http TraceLayer)
/// 5. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let secret = state.jwt_secret().to_string();

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let public_routes = Router::new()
        .route("/home", get(routes::home::home))
        .route("/items", get(routes::items::search_items));

    // Anonymous viewers are allowed; a valid token adds viewer context
    let viewer_routes = Router::new()
        .route("/items/:id", get(routes::items::get_item))
        .layer(from_fn(create_optional_jwt_middleware(secret.clone())));

    let protected_routes = Router::new()
        .route("/items", post(routes::items::create_item))
        .route("/items/mine", get(routes::items::my_items))
        .route(
            "/items/:id",
            put(routes::items::update_item).delete(routes::items::delete_item),
        )
        .route("/items/:id/close", post(routes::items::close_item))
        .route(
            "/items/:id/claims",
            post(routes::claims::submit_claim).get(routes::claims::list_item_claims),
        )
        .route("/claims/:id/approve", post(routes::claims::approve_claim))
        .route("/claims/:id/reject", post(routes::claims::reject_claim))
        .route("/me", get(routes::profile::me))
        .layer(from_fn(create_jwt_middleware(secret)));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(viewer_routes)
        .merge(protected_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Permissive CORS for `*`, an explicit allow-list otherwise
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
