//! Long-lived owner of the loaded video model.
//!
//! The model is loaded at most once per engine (concurrent first callers wait
//! on the same load; a failed load leaves nothing behind and is retried by the
//! next call). Render calls are serialized: the model lives on a single device
//! and does not tolerate concurrent generations.

use std::sync::Arc;
use std::time::Instant;

use magima_core::error::CoreError;
use magima_core::types::FrameSequence;
use magima_core::validation::ValidatedConfig;
use tokio::sync::{Mutex, OnceCell};

use crate::backend::{RenderRequest, VideoBackend};

/// Façade over the external video model.
pub struct GenerationEngine {
    backend: Arc<dyn VideoBackend>,
    loaded: OnceCell<()>,
    /// Serialization point for device access.
    gate: Mutex<()>,
}

impl GenerationEngine {
    pub fn new(backend: Arc<dyn VideoBackend>) -> Self {
        Self {
            backend,
            loaded: OnceCell::new(),
            gate: Mutex::new(()),
        }
    }

    /// Whether the one-time model load has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Load the model unless already loaded.
    pub async fn ensure_loaded(&self) -> Result<(), CoreError> {
        self.loaded
            .get_or_try_init(|| async {
                tracing::info!("Loading video model");
                let started = Instant::now();
                self.backend.load().await.inspect_err(|e| {
                    tracing::error!(error = %e, "Video model load failed");
                })?;
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Video model loaded",
                );
                Ok::<(), CoreError>(())
            })
            .await
            .map(|_| ())
    }

    /// Render one clip. Loads the model first if needed.
    pub async fn generate(
        &self,
        config: &ValidatedConfig,
        effective_prompt: &str,
        negative_prompt: &str,
    ) -> Result<FrameSequence, CoreError> {
        self.ensure_loaded().await?;

        let _device = self.gate.lock().await;

        tracing::info!(
            width = config.width,
            height = config.height,
            frames = config.frame_count,
            duration_secs = config.duration_secs(),
            steps = config.inference_steps,
            seed = ?config.seed,
            "Generating video",
        );
        let started = Instant::now();

        let frames = self
            .backend
            .render(RenderRequest {
                config: &**config,
                prompt: effective_prompt,
                negative_prompt,
            })
            .await?;

        if frames.len() != config.frame_count as usize {
            tracing::debug!(
                requested = config.frame_count,
                received = frames.len(),
                "Model returned a different frame count than requested",
            );
        }
        tracing::info!(
            frames = frames.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Generation finished",
        );

        Ok(frames)
    }
}
