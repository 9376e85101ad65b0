//! Shared HTTP transport for every adapter.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
