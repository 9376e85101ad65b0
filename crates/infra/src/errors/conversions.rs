//! Conversions from external infrastructure errors into domain errors.

use reqwest::{Error as HttpError, StatusCode};
use scheduleprep_domain::ScheduleError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ScheduleError);

impl From<InfraError> for ScheduleError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ScheduleError> for InfraError {
    fn from(value: ScheduleError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoScheduleError {
    fn into_schedule_error(self) -> ScheduleError;
}

/* -------------------------------------------------------------------------- */
/* HTTP status → ScheduleError */
/* -------------------------------------------------------------------------- */

/// Classify a non-success response from `service`.
///
/// Credentials problems are fatal, throttling and server errors are
/// retryable, and any other client error is the caller's fault.
pub fn status_error(service: &str, status: StatusCode, body: &str) -> ScheduleError {
    let code = status.as_u16();
    let mut message =
        format!("{service} returned HTTP {code} {}", status.canonical_reason().unwrap_or("unknown status"));
    let body = body.trim();
    if !body.is_empty() {
        message.push_str(": ");
        message.extend(body.chars().take(200));
    }

    match code {
        401 | 403 => ScheduleError::Config(message),
        429 | 500..=599 => ScheduleError::Network(message),
        400..=499 => ScheduleError::InvalidInput(message),
        _ => ScheduleError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ScheduleError */
/* -------------------------------------------------------------------------- */

impl IntoScheduleError for HttpError {
    fn into_schedule_error(self) -> ScheduleError {
        if self.is_timeout() {
            return ScheduleError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ScheduleError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return ScheduleError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return ScheduleError::Upstream(format!("undecodable HTTP response: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error("upstream", status, "");
        }

        ScheduleError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_schedule_error())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
