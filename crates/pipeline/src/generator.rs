//! End-to-end generation: validate, build prompts, render, encode.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use magima_core::config::GenerationConfig;
use magima_core::error::CoreError;
use magima_core::preset::Preset;
use magima_core::prompt::PromptState;
use magima_core::validation::validate;
use serde::{Deserialize, Serialize};

use crate::backend::HttpVideoBackend;
use crate::config::PipelineConfig;
use crate::encoder::{FfmpegEncoder, VideoEncoder};
use crate::engine::GenerationEngine;
use crate::enhancer::{HttpPromptEnhancer, PromptEnhancer, UnavailableEnhancer};
use crate::prompt_pipeline::PromptPipeline;

/// Prompt used by [`VideoGenerator::warmup`].
pub const WARMUP_PROMPT: &str = "test warmup";

/// One resolved generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    /// `None` selects the default negative prompt.
    pub negative_prompt: Option<String>,
    pub config: GenerationConfig,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub prompts: PromptState,
    pub frame_count: usize,
    pub elapsed: Duration,
}

/// Timings of a warmup run.
#[derive(Debug, Clone)]
pub struct WarmupReport {
    pub load_time: Duration,
    pub generation_time: Duration,
    pub frame_count: usize,
}

/// Orchestrates one generation from raw request to video file.
pub struct VideoGenerator {
    engine: Arc<GenerationEngine>,
    prompts: PromptPipeline,
    encoder: Arc<dyn VideoEncoder>,
    fps: u32,
}

impl VideoGenerator {
    pub fn new(
        engine: Arc<GenerationEngine>,
        prompts: PromptPipeline,
        encoder: Arc<dyn VideoEncoder>,
        fps: u32,
    ) -> Self {
        Self {
            engine,
            prompts,
            encoder,
            fps,
        }
    }

    /// Wire up the HTTP model server, enhancer, and ffmpeg collaborators.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let backend = HttpVideoBackend::new(
            config.model_server_url.clone(),
            config.model_path.clone(),
            config.model_timeout,
        );
        let enhancer: Arc<dyn PromptEnhancer> = match &config.enhancer_url {
            Some(url) => Arc::new(HttpPromptEnhancer::new(url.clone(), config.enhancer_model.clone())),
            None => Arc::new(UnavailableEnhancer::new("prompt enhancer not configured")),
        };

        Self::new(
            Arc::new(GenerationEngine::new(Arc::new(backend))),
            PromptPipeline::new(enhancer),
            Arc::new(FfmpegEncoder::new(config.ffmpeg_bin.clone())),
            config.fps,
        )
    }

    pub fn engine(&self) -> &Arc<GenerationEngine> {
        &self.engine
    }

    /// Run one generation and write the video to `output`.
    ///
    /// The configuration is validated before any collaborator is called.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        output: &Path,
    ) -> Result<GenerationReport, CoreError> {
        let config = validate(request.config.clone())?;
        let started = Instant::now();

        let prompts = self
            .prompts
            .run(&request.prompt, request.negative_prompt.as_deref(), &config)
            .await?;

        let frames = self
            .engine
            .generate(&config, &prompts.effective_prompt, &prompts.negative_prompt)
            .await?;

        self.encoder.encode(&frames, self.fps, output).await?;

        let elapsed = started.elapsed();
        tracing::info!(
            output = %output.display(),
            frames = frames.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Video saved",
        );

        Ok(GenerationReport {
            output_path: output.to_path_buf(),
            prompts,
            frame_count: frames.len(),
            elapsed,
        })
    }

    /// Load the model and render the tiny `warmup` preset without saving it.
    pub async fn warmup(&self) -> Result<WarmupReport, CoreError> {
        let config = validate(Preset::Warmup.config())?;

        let started = Instant::now();
        self.engine.ensure_loaded().await?;
        let load_time = started.elapsed();

        let prompts = self.prompts.run(WARMUP_PROMPT, None, &config).await?;
        let started = Instant::now();
        let frames = self
            .engine
            .generate(&config, &prompts.effective_prompt, &prompts.negative_prompt)
            .await?;
        let generation_time = started.elapsed();

        tracing::info!(
            load_ms = load_time.as_millis() as u64,
            generation_ms = generation_time.as_millis() as u64,
            "Warmup complete",
        );

        Ok(WarmupReport {
            load_time,
            generation_time,
            frame_count: frames.len(),
        })
    }
}
