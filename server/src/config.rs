use anyhow::{Context, Result};
use platform_db::DatabaseSettings;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173";

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// An empty list allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub database: DatabaseSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let database = DatabaseSettings::from_vars(&lookup).context("invalid database settings")?;

        Ok(Self {
            cors_allowed_origins,
            database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_dashboard_origin() {
        let config = AppConfig::from_vars(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.database.url, "sqlite::memory:");
    }

    #[test]
    fn splits_and_trims_origins() {
        let config = AppConfig::from_vars(|key| match key {
            "DATABASE_URL" => Some("sqlite::memory:".into()),
            "CORS_ALLOWED_ORIGINS" => Some(" https://a.test, ,https://b.test ".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.test", "https://b.test"]
        );
    }

    #[test]
    fn missing_database_url_fails() {
        assert!(AppConfig::from_vars(|_| None).is_err());
    }
}
