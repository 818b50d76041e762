//! Runtime configuration read from the environment

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: u64,
    pub throttle_limit: u32,
    pub throttle_window: Duration,
    pub cors_origins: Vec<String>,
    pub stats_queue_capacity: usize,
    pub db_max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/naturenest".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            jwt_secret: "change-me-in-production-please-32+".to_string(),
            jwt_ttl_hours: 168,
            throttle_limit: 60,
            throttle_window: Duration::from_secs(60),
            cors_origins: vec!["http://localhost:3000".to_string()],
            stats_queue_capacity: 256,
            db_max_connections: 10,
        }
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    env::var(name).map_err(|_| anyhow!("{} must be set", name))
}

fn parsed<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Split a comma separated list, dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Load configuration; call `dotenvy::dotenv()` first to pick up `.env`
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let cors_origins = match env::var("CORS_ORIGINS") {
            Ok(raw) => split_list(&raw),
            Err(_) => defaults.cors_origins,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT", defaults.port)?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_ttl_hours: parsed("JWT_TTL_HOURS", defaults.jwt_ttl_hours)?,
            throttle_limit: parsed("THROTTLE_LIMIT", defaults.throttle_limit)?,
            throttle_window: Duration::from_secs(parsed(
                "THROTTLE_WINDOW_SECS",
                defaults.throttle_window.as_secs(),
            )?),
            cors_origins,
            stats_queue_capacity: parsed("STATS_QUEUE_CAPACITY", defaults.stats_queue_capacity)?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.jwt_ttl_hours, 168);
        assert_eq!(config.throttle_window, Duration::from_secs(60));
    }
}
