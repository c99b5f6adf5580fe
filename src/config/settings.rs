//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    /// Emit every SQL statement through `tracing`
    pub sql_logging: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("sql_logging", &self.sql_logging)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            sql_logging: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or(DEFAULT_MIN_CONNECTIONS),
            connect_timeout_secs: parse_var("DATABASE_CONNECT_TIMEOUT_SECS")
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            sql_logging: parse_var("DATABASE_SQL_LOGGING").unwrap_or(false),
        }
    }

    /// Configuration pointing at an explicit database URL, other settings default.
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            database_url: url.into(),
            ..Self::default()
        }
    }

    /// Whether the URL names a private in-memory SQLite database.
    pub fn is_in_memory(&self) -> bool {
        self.database_url.starts_with("sqlite::memory:")
            || self.database_url.contains("mode=memory")
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
