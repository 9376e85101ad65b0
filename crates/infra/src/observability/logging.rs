use scheduleprep_domain::{LoggingConfig, Result, ScheduleError};
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, otherwise the configured filter.
///
/// # Errors
/// Returns `ScheduleError::Config` when the chosen directive does not parse.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone());

    EnvFilter::try_new(&directive)
        .map_err(|e| ScheduleError::Config(format!("invalid log filter '{directive}': {e}")))
}

/// Install the global subscriber.
///
/// Calling this again once a subscriber is installed is a no-op.
///
/// # Errors
/// Returns `ScheduleError::Config` for an unparsable filter.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
