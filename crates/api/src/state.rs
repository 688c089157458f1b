use std::sync::Arc;

use magima_core::preset::ConfigResolver;
use magima_pipeline::GenerationEngine;

use crate::config::ServerConfig;
use crate::jobs::JobTracker;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: shared parts sit behind `Arc`, the resolver is `Copy`.
#[derive(Clone)]
pub struct AppState {
    /// Preset lookup for incoming requests, defaulting to `DEFAULT_PRESET`.
    pub resolver: ConfigResolver,
    /// Background generation jobs.
    pub tracker: Arc<JobTracker>,
    /// Process-wide model owner, queried by `/health`.
    pub engine: Arc<GenerationEngine>,
}

impl AppState {
    pub fn new(config: &ServerConfig, tracker: Arc<JobTracker>, engine: Arc<GenerationEngine>) -> Self {
        Self {
            resolver: ConfigResolver::new(config.default_preset),
            tracker,
            engine,
        }
    }
}
