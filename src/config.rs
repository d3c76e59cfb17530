use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("STORE_BACKEND must be 'postgres' or 'memory', got '{0}'")]
    UnknownBackend(String),
    #[error("DATABASE_URL is required when STORE_BACKEND is postgres")]
    MissingDatabaseUrl,
    #[error("DB_MAX_CONNECTIONS must be a positive integer")]
    InvalidPoolSize,
    #[error("invalid bind address {0}")]
    InvalidAddress(String),
    #[error("AUDIT_LOG_URL is not a valid URL: {0}")]
    InvalidAuditUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: String,
    pub database_url: Option<String>,
    pub db_max_connections: String,
    pub host: String,
    pub port: String,
    pub audit_log_url: Option<String>,
    pub audit_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            store_backend: lookup("STORE_BACKEND").unwrap_or_else(|| "postgres".to_string()),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS").unwrap_or_else(|| "10".to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT").unwrap_or_else(|| "8080".to_string()),
            audit_log_url: lookup("AUDIT_LOG_URL").filter(|v| !v.trim().is_empty()),
            audit_timeout_secs: lookup("AUDIT_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend()? == StoreBackend::Postgres && self.database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        self.max_connections()?;
        self.bind_addr()?;
        if let Some(url) = &self.audit_log_url {
            url::Url::parse(url).map_err(|e| ConfigError::InvalidAuditUrl(e.to_string()))?;
        }
        Ok(())
    }

    pub fn backend(&self) -> Result<StoreBackend, ConfigError> {
        match self.store_backend.to_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }

    pub fn max_connections(&self) -> Result<u32, ConfigError> {
        match self.db_max_connections.parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidPoolSize),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
    }

    pub fn audit_timeout(&self) -> Duration {
        Duration::from_secs(self.audit_timeout_secs)
    }
}
