//! Integration test utilities for the Flock API
//!
//! Serves the real router over a local socket, backed by the in-memory store
//! and session store, so the suite needs no PostgreSQL or Redis.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
