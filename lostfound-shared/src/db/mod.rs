/// PostgreSQL plumbing for the lost-and-found store
///
/// # Modules
///
/// - `pool`: connection pool construction with a startup health check
/// - `migrations`: embedded `sqlx` migrations for the `users`, `items` and
///   `claim_requests` tables
///
/// Queries themselves live with the models in [`crate::models`]; the
/// [`crate::store::postgres::PgStore`] ties the two together.
///
/// # Example
///
/// ```no_run
/// use lostfound_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
