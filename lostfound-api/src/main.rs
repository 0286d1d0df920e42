//! # Lost & Found API Server
//!
//! Users report lost or found items, other users claim them, and item
//! owners approve or reject the claims.
//!
//! ## Usage
//!
//! ```bash
//! STORAGE_BACKEND=memory JWT_SECRET=$(openssl rand -hex 32) cargo run -p lostfound-api
//! ```

use lostfound_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use lostfound_shared::{
    db::{self, pool::DatabaseConfig},
    store::{memory::MemoryStore, postgres::PgStore, Store},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "lostfound_api=debug,lostfound_shared=info,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connects the configured store; the pool is returned so it can be closed on shutdown
async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn Store>, Option<PgPool>)> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig {
                url: config.storage.database_url.clone(),
                max_connections: config.storage.max_connections,
                ..Default::default()
            };

            if config.storage.run_migrations {
                db::migrations::ensure_database_exists(&db_config.url).await?;
            }

            let pool = db::pool::create_pool(db_config).await?;

            if config.storage.run_migrations {
                db::migrations::run_migrations(&pool).await?;
            }

            let status = db::migrations::get_migration_status(&pool).await?;
            if !status.is_up_to_date() {
                tracing::warn!(
                    pending = status.pending_migrations,
                    "Database schema has pending migrations"
                );
            }

            Ok((Arc::new(PgStore::new(pool.clone())), Some(pool)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Lost & Found API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let (store, pool) = open_store(&config).await?;
    tracing::info!(storage = store.backend(), "Store ready");

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        db::pool::close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
