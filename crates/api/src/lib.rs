//! Magima HTTP job API.
//!
//! Exposes config, state, error handling, job tracking and routes so
//! integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod router;
pub mod routes;
pub mod state;
