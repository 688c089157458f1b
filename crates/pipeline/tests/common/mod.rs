#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use magima_core::error::CoreError;
use magima_core::types::{Frame, FrameSequence};
use magima_pipeline::backend::{RenderRequest, VideoBackend};
use magima_pipeline::encoder::VideoEncoder;
use magima_pipeline::enhancer::{EnhancementOutcome, PromptEnhancer};
use magima_pipeline::prompt_pipeline::PromptPipeline;
use magima_pipeline::{GenerationEngine, VideoGenerator};

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// In-process model that renders solid frames and counts calls.
#[derive(Default)]
pub struct MockBackend {
    pub loads: AtomicUsize,
    pub renders: AtomicUsize,
    /// Number of upcoming load attempts that fail.
    pub failing_loads: AtomicUsize,
    pub load_delay: Duration,
    pub render_delay: Duration,
    /// Error returned by every render, if set.
    pub render_error: Option<fn() -> CoreError>,
    pub prompts: Mutex<Vec<(String, String)>>,
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl MockBackend {
    pub fn failing_first_loads(n: usize) -> Self {
        let backend = Self::default();
        backend.failing_loads.store(n, Ordering::SeqCst);
        backend
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn render_count(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn last_prompts(&self) -> Option<(String, String)> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl VideoBackend for MockBackend {
    async fn load(&self) -> Result<(), CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.load_delay).await;

        let remaining = self.failing_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::ModelLoad("weights not found".into()));
        }
        Ok(())
    }

    async fn render(&self, request: RenderRequest<'_>) -> Result<FrameSequence, CoreError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        self.prompts.lock().unwrap().push((
            request.prompt.to_string(),
            request.negative_prompt.to_string(),
        ));
        tokio::time::sleep(self.render_delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        if let Some(make_error) = self.render_error {
            return Err(make_error());
        }

        let c = request.config;
        Ok((0..c.frame_count)
            .map(|i| Frame::solid(c.width, c.height, [i as u8, 0, 0]))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Enhancer
// ---------------------------------------------------------------------------

/// Enhancer returning a fixed outcome shape.
pub enum MockEnhancer {
    Prefix(&'static str),
    Down(&'static str),
}

#[async_trait]
impl PromptEnhancer for MockEnhancer {
    async fn enhance(&self, prompt: &str) -> EnhancementOutcome {
        match self {
            Self::Prefix(prefix) => EnhancementOutcome::Enhanced(format!("{prefix} {prompt}")),
            Self::Down(reason) => EnhancementOutcome::degraded(prompt, *reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encoder that writes a small marker file instead of a real video.
#[derive(Default)]
pub struct FileEncoder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl VideoEncoder for FileEncoder {
    async fn encode(&self, frames: &[Frame], fps: u32, output: &Path) -> Result<(), CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, format!("{} frames @ {fps}", frames.len())).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

pub struct Harness {
    pub backend: Arc<MockBackend>,
    pub encoder: Arc<FileEncoder>,
    pub generator: VideoGenerator,
}

pub fn harness(backend: MockBackend, enhancer: MockEnhancer) -> Harness {
    let backend = Arc::new(backend);
    let encoder = Arc::new(FileEncoder::default());
    let engine = Arc::new(GenerationEngine::new(backend.clone()));
    let generator = VideoGenerator::new(
        engine,
        PromptPipeline::new(Arc::new(enhancer)),
        encoder.clone(),
        24,
    );
    Harness {
        backend,
        encoder,
        generator,
    }
}
