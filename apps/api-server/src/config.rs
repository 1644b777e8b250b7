//! Application configuration loaded from environment variables.

use std::env;

use blog_infra::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server over the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations after connecting.
    pub run_migrations: bool,
    /// Number of random posts to seed at startup.
    pub seed_posts: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let defaults = DatabaseConfig::new(url);
            DatabaseConfig {
                max_connections: parse_var("DB_MAX_CONNECTIONS")
                    .unwrap_or(defaults.max_connections),
                min_connections: parse_var("DB_MIN_CONNECTIONS")
                    .unwrap_or(defaults.min_connections),
                ..defaults
            }
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            database,
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            seed_posts: parse_var("SEED_POSTS").unwrap_or(0),
        }
    }

    /// Database used by test bootstrap, read from `TEST_DATABASE_URL`.
    #[cfg(test)]
    pub fn test_database() -> Option<DatabaseConfig> {
        env::var("TEST_DATABASE_URL")
            .ok()
            .map(DatabaseConfig::for_tests)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}
