//! Asynchronous job tracking for HTTP-submitted generations.

pub mod store;
pub mod tracker;

pub use store::{InMemoryJobStore, JobStore};
pub use tracker::{GeneratorRunner, JobRunner, JobTracker};
