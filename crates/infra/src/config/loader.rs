//! Configuration loader
//!
//! Loads process configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Reads a `.env` file into the environment when one exists
//! 2. Attempts to load from environment variables
//! 3. If incomplete, falls back to loading from file
//! 4. Searches multiple paths for config files (JSON or TOML)
//! 5. Validates the result before returning it
//!
//! ## Environment Variables
//! Required:
//! - `SCHEDULEPREP_GRAPHQL_URL`: persistence GraphQL endpoint
//! - `SCHEDULEPREP_GRAPHQL_ADMIN_SECRET`: persistence admin secret
//! - `SCHEDULEPREP_S3_ENDPOINT`, `SCHEDULEPREP_S3_BUCKET`
//! - `SCHEDULEPREP_S3_ACCESS_KEY_ID`, `SCHEDULEPREP_S3_SECRET_ACCESS_KEY`
//! - `SCHEDULEPREP_SOLVER_URL`, `SCHEDULEPREP_SOLVER_USERNAME`,
//!   `SCHEDULEPREP_SOLVER_PASSWORD`
//! - `SCHEDULEPREP_CALLBACK_URL`: where the solver posts results
//!
//! Optional:
//! - `SCHEDULEPREP_S3_REGION` (default `us-east-1`)
//! - `SCHEDULEPREP_SOLVER_DELAY_MS` (default 300000)
//! - `SCHEDULEPREP_HTTP_TIMEOUT_SECS`, `SCHEDULEPREP_HTTP_MAX_ATTEMPTS`,
//!   `SCHEDULEPREP_HTTP_BACKOFF_MS`
//! - `SCHEDULEPREP_LOG_FILTER`, `SCHEDULEPREP_LOG_JSON`
//!
//! ## File Locations
//! The loader searches `config.{json,toml}` and `scheduleprep.{json,toml}` in
//! the current directory, its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use scheduleprep_domain::constants::DEFAULT_SOLVER_DELAY_MS;
use scheduleprep_domain::{
    Config, HttpConfig, LoggingConfig, ObjectStoreConfig, PersistenceConfig, Result,
    ScheduleError, SolverConfig,
};

const FILE_NAMES: [&str; 4] = ["config.json", "config.toml", "scheduleprep.json", "scheduleprep.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `ScheduleError::Config` if neither source yields a complete,
/// valid configuration.
pub fn load() -> Result<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from `SCHEDULEPREP_*` environment variables
///
/// # Errors
/// Returns `ScheduleError::Config` if a required variable is missing or a
/// numeric variable does not parse.
pub fn load_from_env() -> Result<Config> {
    let defaults = HttpConfig::default();
    let logging_defaults = LoggingConfig::default();

    Ok(Config {
        persistence: PersistenceConfig {
            graphql_url: env_var("SCHEDULEPREP_GRAPHQL_URL")?,
            admin_secret: env_var("SCHEDULEPREP_GRAPHQL_ADMIN_SECRET")?,
        },
        object_store: ObjectStoreConfig {
            endpoint: env_var("SCHEDULEPREP_S3_ENDPOINT")?,
            bucket: env_var("SCHEDULEPREP_S3_BUCKET")?,
            region: std::env::var("SCHEDULEPREP_S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            access_key_id: env_var("SCHEDULEPREP_S3_ACCESS_KEY_ID")?,
            secret_access_key: env_var("SCHEDULEPREP_S3_SECRET_ACCESS_KEY")?,
        },
        solver: SolverConfig {
            base_url: env_var("SCHEDULEPREP_SOLVER_URL")?,
            username: env_var("SCHEDULEPREP_SOLVER_USERNAME")?,
            password: env_var("SCHEDULEPREP_SOLVER_PASSWORD")?,
            callback_url: env_var("SCHEDULEPREP_CALLBACK_URL")?,
            delay_ms: env_parse("SCHEDULEPREP_SOLVER_DELAY_MS", DEFAULT_SOLVER_DELAY_MS)?,
        },
        http: HttpConfig {
            timeout_secs: env_parse("SCHEDULEPREP_HTTP_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_attempts: env_parse("SCHEDULEPREP_HTTP_MAX_ATTEMPTS", defaults.max_attempts)?,
            base_backoff_ms: env_parse("SCHEDULEPREP_HTTP_BACKOFF_MS", defaults.base_backoff_ms)?,
        },
        logging: LoggingConfig {
            filter: std::env::var("SCHEDULEPREP_LOG_FILTER").unwrap_or(logging_defaults.filter),
            json: env_bool("SCHEDULEPREP_LOG_JSON", logging_defaults.json),
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations via
/// [`find_config_path`]. The format follows the file extension.
///
/// # Errors
/// Returns `ScheduleError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ScheduleError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            ScheduleError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ScheduleError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ScheduleError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ScheduleError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(ScheduleError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn find_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join("..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ScheduleError::Config(format!("Missing required environment variable: {key}")))
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ScheduleError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
