//! # Schedule Prep Infrastructure
//!
//! Infrastructure implementations of core scheduling ports.
//!
//! This crate contains:
//! - GraphQL persistence repositories
//! - S3-compatible archive storage
//! - The constraint solver HTTP client
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `scheduleprep-core`
//! - Depends on `scheduleprep-domain` and `scheduleprep-core`
//! - Contains all "impure" code (network I/O, environment, clocks)

pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod object_store;
pub mod observability;
pub mod persistence;
pub mod solver;

// Re-export commonly used items
pub use context::SchedulePrepContext;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use object_store::S3ObjectStore;
pub use persistence::{GraphQlClient, GraphQlRepository};
pub use solver::HttpSolverClient;
