//! Shared test helpers for `scheduleprep-core` integration tests.
//!
//! In-memory ports plus a few fixture builders so scenario tests can focus
//! on planning behaviour instead of wiring.
#![allow(dead_code)]

pub mod fixtures;
pub mod repositories;
