//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SOLVER_DELAY_MS;
use crate::errors::{Result, ScheduleError};

/// Process-wide configuration, built once and handed to each adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub persistence: PersistenceConfig,
    pub object_store: ObjectStoreConfig,
    pub solver: SolverConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GraphQL persistence endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub graphql_url: String,
    #[serde(skip_serializing)]
    pub admin_secret: String,
}

/// S3-compatible bucket that receives request archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStoreConfig {
    pub endpoint: String,
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key_id: String,
    #[serde(skip_serializing)]
    pub secret_access_key: String,
}

/// Constraint solver endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub base_url: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub callback_url: String,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

/// Shared HTTP client behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

const fn default_delay_ms() -> u64 {
    DEFAULT_SOLVER_DELAY_MS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30, max_attempts: 3, base_backoff_ms: 200 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string(), json: false }
    }
}

impl Config {
    /// Reject configurations that would fail partway through a run.
    ///
    /// # Errors
    /// Returns `ScheduleError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("persistence.graphql_url", &self.persistence.graphql_url),
            ("persistence.admin_secret", &self.persistence.admin_secret),
            ("object_store.endpoint", &self.object_store.endpoint),
            ("object_store.bucket", &self.object_store.bucket),
            ("object_store.access_key_id", &self.object_store.access_key_id),
            ("object_store.secret_access_key", &self.object_store.secret_access_key),
            ("solver.base_url", &self.solver.base_url),
            ("solver.username", &self.solver.username),
            ("solver.password", &self.solver.password),
            ("solver.callback_url", &self.solver.callback_url),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ScheduleError::Config(format!("{name} must not be empty")));
        }

        if self.http.max_attempts == 0 {
            return Err(ScheduleError::Config("http.max_attempts must be at least 1".into()));
        }

        Ok(())
    }
}
