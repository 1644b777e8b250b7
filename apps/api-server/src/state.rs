//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::PostRepository;
use blog_infra::InMemoryPostRepository;
use blog_infra::fixtures;

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    /// Wrap an already-built post store.
    pub fn with_repository(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Build the application state with the store the configuration asks for.
    pub async fn new(config: &AppConfig) -> Self {
        let posts = Self::init_store(config).await;

        if config.seed_posts > 0 {
            if let Err(e) = fixtures::seed_posts(posts.as_ref(), config.seed_posts).await {
                tracing::error!("Failed to seed posts: {}", e);
            }
        }

        tracing::info!("Application state initialized");
        Self::with_repository(posts)
    }

    #[cfg(feature = "postgres")]
    async fn init_store(config: &AppConfig) -> Arc<dyn PostRepository> {
        use blog_infra::PostgresPostRepository;
        use migration::{Migrator, MigratorTrait};

        let Some(db_config) = config.database.as_ref() else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Arc::new(InMemoryPostRepository::new());
        };

        let conn = match blog_infra::database::connect(db_config).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return Arc::new(InMemoryPostRepository::new());
            }
        };

        if config.run_migrations {
            if let Err(e) = Migrator::up(&conn, None).await {
                tracing::error!("Failed to apply migrations: {}", e);
            }
        }

        Arc::new(PostgresPostRepository::new(conn))
    }

    #[cfg(not(feature = "postgres"))]
    async fn init_store(_config: &AppConfig) -> Arc<dyn PostRepository> {
        tracing::info!("Running without postgres feature - using in-memory repository");
        Arc::new(InMemoryPostRepository::new())
    }
}
