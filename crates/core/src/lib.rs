//! Domain core of the Magima video generator.
//!
//! Pure configuration, validation and prompt logic with no I/O. The
//! collaborators (model server, prompt enhancer, encoder) live in
//! `magima-pipeline`.

pub mod config;
pub mod error;
pub mod job;
pub mod preset;
pub mod prompt;
pub mod types;
pub mod validation;
