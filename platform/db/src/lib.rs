//! Database primitives: pool lifecycle, settings, and the record stores built
//! on top of them.

mod employees;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use thiserror::Error;
use tracing::info;

pub use employees::{EmployeeRepository, EmployeeStore};

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(&'static str),
    #[error("invalid value {value:?} for {key}")]
    InvalidSetting { key: &'static str, value: String },
    #[error("failed to connect to database")]
    Connect(#[source] DbErr),
    #[error(transparent)]
    Query(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

const URL_KEY: &str = "DATABASE_URL";
const MAX_CONNECTIONS_KEY: &str = "DATABASE_MAX_CONNECTIONS";
const CONNECT_TIMEOUT_KEY: &str = "DATABASE_CONNECT_TIMEOUT_SECS";
const SQLX_LOGGING_KEY: &str = "DATABASE_SQLX_LOGGING";

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Connection settings for the backing store.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub sqlx_logging: bool,
}

impl DatabaseSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: Duration::from_secs(5),
            sqlx_logging: false,
        }
    }

    pub fn from_env() -> DbResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let url = lookup(URL_KEY)
            .filter(|url| !url.trim().is_empty())
            .ok_or(DbError::MissingUrl(URL_KEY))?;
        let mut settings = Self::new(url.trim());

        if let Some(raw) = lookup(MAX_CONNECTIONS_KEY) {
            let parsed = raw.trim().parse::<u32>().ok().filter(|n| *n > 0);
            settings.max_connections = parsed.ok_or(DbError::InvalidSetting {
                key: MAX_CONNECTIONS_KEY,
                value: raw,
            })?;
        }
        if let Some(raw) = lookup(CONNECT_TIMEOUT_KEY) {
            let secs = raw.trim().parse::<u64>().map_err(|_| DbError::InvalidSetting {
                key: CONNECT_TIMEOUT_KEY,
                value: raw.clone(),
            })?;
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(SQLX_LOGGING_KEY) {
            settings.sqlx_logging = matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        Ok(settings)
    }

    /// Every connection to an in-memory SQLite database opens a fresh, empty
    /// database, so those pools are pinned to one connection.
    pub fn pool_size(&self) -> u32 {
        let in_memory = self.url.starts_with("sqlite:")
            && (self.url.contains(":memory:") || self.url.contains("mode=memory"));
        if in_memory { 1 } else { self.max_connections }
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        options
            .max_connections(self.pool_size())
            .connect_timeout(self.connect_timeout)
            .sqlx_logging(self.sqlx_logging);
        options
    }
}

/// Open the pool. The caller owns it and hands it back to [`close`] on shutdown.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let pool = Database::connect(settings.connect_options())
        .await
        .map_err(DbError::Connect)?;
    info!(backend = ?pool.get_database_backend(), "database pool ready");
    Ok(pool)
}

pub async fn close(pool: DbPool) -> DbResult<()> {
    pool.close().await?;
    info!("database pool closed");
    Ok(())
}

/// Round-trip a trivial statement; used by health checks.
pub async fn ping(pool: &DbPool) -> bool {
    pool.execute(Statement::from_string(
        pool.get_database_backend(),
        "SELECT 1".to_string(),
    ))
    .await
    .is_ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn settings_require_url() {
        let err = DatabaseSettings::from_vars(vars(&[])).unwrap_err();
        assert!(matches!(err, DbError::MissingUrl("DATABASE_URL")));
    }

    #[test]
    fn settings_read_optional_knobs() {
        let settings = DatabaseSettings::from_vars(vars(&[
            ("DATABASE_URL", "postgres://app@localhost/employees"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_CONNECT_TIMEOUT_SECS", "9"),
            ("DATABASE_SQLX_LOGGING", "true"),
        ]))
        .unwrap();
        assert_eq!(settings.url, "postgres://app@localhost/employees");
        assert_eq!(settings.max_connections, 4);
        assert_eq!(settings.pool_size(), 4);
        assert_eq!(settings.connect_timeout, Duration::from_secs(9));
        assert!(settings.sqlx_logging);
    }

    #[test]
    fn settings_default_to_ten_connections() {
        let settings =
            DatabaseSettings::from_vars(vars(&[("DATABASE_URL", "postgres://app@localhost/employees")]))
                .unwrap();
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.pool_size(), 10);
        assert_eq!(settings.connect_timeout, Duration::from_secs(5));
        assert!(!settings.sqlx_logging);
    }

    #[test]
    fn in_memory_sqlite_is_pinned_to_one_connection() {
        let settings = DatabaseSettings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();
        assert_eq!(settings.max_connections, 8);
        assert_eq!(settings.pool_size(), 1);
        assert_eq!(DatabaseSettings::new("sqlite://employees.db").pool_size(), 10);
    }

    #[test]
    fn settings_reject_zero_connections() {
        let err = DatabaseSettings::from_vars(vars(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidSetting {
                key: "DATABASE_MAX_CONNECTIONS",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn connect_ping_close() {
        let pool = connect(&DatabaseSettings::new("sqlite::memory:"))
            .await
            .unwrap();
        assert!(ping(&pool).await);
        close(pool).await.unwrap();
    }
}
