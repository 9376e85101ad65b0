//! # Schedule Prep Domain
//!
//! Business domain types for the scheduling-input preparation engine.
//!
//! This crate contains:
//! - Calendar, preference and meeting-assist records
//! - Solver request structures (time slots, work times, event parts)
//! - Domain error types and Result definitions
//! - Configuration structures and scheduling constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
