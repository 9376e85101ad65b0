//! Logging setup for binaries and tests embedding the engine.
//!
//! Every component logs through `tracing`; this module only installs the
//! global subscriber.

pub mod logging;

pub use logging::{build_filter, init_tracing};
