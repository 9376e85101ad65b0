//! Solver adapter.

pub mod client;

pub use client::HttpSolverClient;
