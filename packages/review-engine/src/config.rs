use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Which notifier implementation backs the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    /// Persist to the in-app `notifications` table
    Database,
    /// Only emit a tracing event (local development)
    Log,
}

impl std::str::FromStr for NotifierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "database" => Ok(NotifierKind::Database),
            "log" => Ok(NotifierKind::Log),
            _ => Err(anyhow::anyhow!("Invalid notifier: {}", s)),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    /// Upper bound on a single engine operation, store round trips included
    pub operation_timeout: Duration,
    pub notification_queue_capacity: usize,
    pub notifier: NotifierKind,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a valid number")?,
            operation_timeout: Duration::from_millis(
                env::var("OPERATION_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .context("OPERATION_TIMEOUT_MS must be a valid number")?,
            ),
            notification_queue_capacity: env::var("NOTIFICATION_QUEUE_CAPACITY")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .context("NOTIFICATION_QUEUE_CAPACITY must be a valid number")?,
            notifier: env::var("NOTIFIER")
                .unwrap_or_else(|_| "database".to_string())
                .parse()
                .context("NOTIFIER must be 'database' or 'log'")?,
        })
    }
}
