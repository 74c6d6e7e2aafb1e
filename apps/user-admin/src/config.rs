//! Centralized configuration for user-admin.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than halfway through a command.

use aws_dynamo::{DynamoTable, TableConfigError};

/// Storage backend provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// DynamoDB table (default)
    Dynamo,
    /// In-memory storage. Each invocation starts empty and nothing it
    /// writes survives the process.
    Memory,
}

impl StorageProvider {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::Dynamo
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[error("Configuration error for {field}: {message}")]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl From<TableConfigError> for ConfigError {
    fn from(e: TableConfigError) -> Self {
        Self {
            field: e.var,
            message: e.message,
        }
    }
}

const EPHEMERAL_WARNING: &str = "STORAGE_PROVIDER=memory: every run starts with an empty store \
     and nothing is persisted between invocations.";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_provider: StorageProvider,
    /// Table settings; present whenever `storage_provider` is `Dynamo`.
    pub table: Option<DynamoTable>,
    pub log_format: LogFormat,
}

impl Config {
    /// Load and validate configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_provider = StorageProvider::from_str(
            &std::env::var("STORAGE_PROVIDER").unwrap_or_else(|_| "dynamo".into()),
        );

        let table = match storage_provider {
            StorageProvider::Dynamo => Some(DynamoTable::from_env()?),
            StorageProvider::Memory => None,
        };

        let log_format = LogFormat::from_str(
            &std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".into()),
        );

        Ok(Self {
            storage_provider,
            table,
            log_format,
        })
    }

    /// Log warnings about configuration that loses data.
    pub fn warn_if_ephemeral(&self) {
        if self.storage_provider == StorageProvider::Memory {
            tracing::warn!("{EPHEMERAL_WARNING}");
        }
    }
}
