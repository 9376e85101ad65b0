//! Handing assembled requests to the solver.

pub mod gateway;

pub use gateway::{archive_key, SolverGateway, SubmissionReceipt};
