//! Database configuration

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::pool::{create_pool_with_options, DEFAULT_MAX_CONNECTIONS};

const DEFAULT_DATABASE_URL: &str = "sqlite://dbkit.db";

/// Where to connect and how many connections to hold
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DbConfig {
    /// Read `DATABASE_URL` and `DBKIT_MAX_CONNECTIONS`, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: lookup("DBKIT_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_connections),
        }
    }

    pub async fn connect(&self) -> Result<SqlitePool, sqlx::Error> {
        create_pool_with_options(&self.database_url, self.max_connections).await
    }
}
