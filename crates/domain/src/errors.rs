//! Error types used throughout the scheduling pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for schedule preparation
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ScheduleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream query failed: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nothing to schedule: {0}")]
    EmptyPlan(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification callers use to decide between retry, abort and
/// "nothing to do".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Abort the run before any partial writes.
    Fatal,
    /// A collaborator failed; surface it.
    Upstream,
    /// Safe to resubmit with a fresh singleton id.
    Retryable,
    /// No schedulable input; not a failure.
    Benign,
    /// Caller supplied bad data.
    Invalid,
}

impl ScheduleError {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Fatal,
            Self::Upstream(_) | Self::ObjectStore(_) | Self::Internal(_) => ErrorKind::Upstream,
            Self::Network(_) | Self::Solver(_) => ErrorKind::Retryable,
            Self::EmptyPlan(_) => ErrorKind::Benign,
            Self::NotFound(_) | Self::InvalidInput(_) => ErrorKind::Invalid,
        }
    }

    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Retryable)
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Fatal)
    }
}

/// Result type alias for schedule preparation operations
pub type Result<T> = std::result::Result<T, ScheduleError>;
