//! The diffusion model server seam.
//!
//! [`VideoBackend`] is everything the orchestration layer needs from the video
//! model: a one-time weight load and a render call. [`HttpVideoBackend`] talks
//! to a model server over HTTP:
//!
//! ```text
//! POST /load      {model_path, dtype}          -> 200
//! POST /generate  {prompt, ..., seed}          -> 200 application/octet-stream
//!                                                 (frame_count * width * height * 3 bytes, RGB24)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use magima_core::config::GenerationConfig;
use magima_core::error::CoreError;
use magima_core::types::{Frame, FrameSequence};
use reqwest::StatusCode;
use serde::Serialize;

/// Inputs of a single render call.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    pub config: &'a GenerationConfig,
    pub prompt: &'a str,
    pub negative_prompt: &'a str,
}

/// A loaded-on-demand video diffusion model.
#[async_trait]
pub trait VideoBackend: Send + Sync {
    /// Load weights and place them on the device.
    ///
    /// Fails with [`CoreError::ModelLoad`] if the weights are missing or
    /// incompatible, or [`CoreError::OutOfResource`] if they do not fit.
    async fn load(&self) -> Result<(), CoreError>;

    /// Render frames. With `config.seed` set, output is deterministic.
    async fn render(&self, request: RenderRequest<'_>) -> Result<FrameSequence, CoreError>;
}

/// Which model server call failed, for error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Load,
    Render,
}

/// [`VideoBackend`] backed by a remote model server.
pub struct HttpVideoBackend {
    client: reqwest::Client,
    base_url: String,
    model_path: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct LoadBody<'a> {
    model_path: &'a str,
    dtype: &'static str,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    width: u32,
    height: u32,
    num_frames: u32,
    num_inference_steps: u32,
    guidance_scale: f32,
    seed: Option<u64>,
}

impl HttpVideoBackend {
    pub fn new(base_url: impl Into<String>, model_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model_path: model_path.into(),
            timeout,
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        stage: Stage,
    ) -> Result<reqwest::Response, CoreError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| match stage {
                Stage::Load => CoreError::ModelLoad(format!("model server unreachable: {e}")),
                Stage::Render => CoreError::Backend(format!("request failed: {e}")),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(classify_failure(stage, status, &body));
        }
        Ok(response)
    }
}

#[async_trait]
impl VideoBackend for HttpVideoBackend {
    async fn load(&self) -> Result<(), CoreError> {
        let body = LoadBody {
            model_path: &self.model_path,
            dtype: "bfloat16",
        };
        self.post("/load", &body, Stage::Load).await?;
        Ok(())
    }

    async fn render(&self, request: RenderRequest<'_>) -> Result<FrameSequence, CoreError> {
        let config = request.config;
        let body = GenerateBody {
            prompt: request.prompt,
            negative_prompt: request.negative_prompt,
            width: config.width,
            height: config.height,
            num_frames: config.frame_count,
            num_inference_steps: config.inference_steps,
            guidance_scale: config.guidance_scale,
            seed: config.seed,
        };

        let mut response = self.post("/generate", &body, Stage::Render).await?;
        let mut frames = FrameAssembler::new(config.width, config.height);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CoreError::Backend(format!("failed to read frame data: {e}")))?
        {
            frames.push(&chunk);
        }
        frames.finish()
    }
}

/// Map a non-2xx model server response onto the error taxonomy.
fn classify_failure(stage: Stage, status: StatusCode, body: &str) -> CoreError {
    let detail = format!("HTTP {}: {body}", status.as_u16());

    if status == StatusCode::INSUFFICIENT_STORAGE || body.to_lowercase().contains("out of memory") {
        return CoreError::OutOfResource(detail);
    }
    match stage {
        Stage::Load => CoreError::ModelLoad(detail),
        Stage::Render => CoreError::Backend(detail),
    }
}

/// Builds frames from packed RGB24 data as it arrives, so the response body
/// is never held alongside its frames.
pub struct FrameAssembler {
    width: u32,
    height: u32,
    frame_len: usize,
    current: Vec<u8>,
    frames: FrameSequence,
    received: usize,
}

impl FrameAssembler {
    pub fn new(width: u32, height: u32) -> Self {
        let frame_len = Frame::byte_len(width, height);
        Self {
            width,
            height,
            frame_len,
            current: Vec::with_capacity(frame_len),
            frames: Vec::new(),
            received: 0,
        }
    }

    pub fn push(&mut self, mut data: &[u8]) {
        self.received += data.len();
        if self.frame_len == 0 {
            return;
        }
        while !data.is_empty() {
            let take = (self.frame_len - self.current.len()).min(data.len());
            self.current.extend_from_slice(&data[..take]);
            data = &data[take..];
            if self.current.len() == self.frame_len {
                let rgb = std::mem::replace(&mut self.current, Vec::with_capacity(self.frame_len));
                self.frames.push(Frame {
                    width: self.width,
                    height: self.height,
                    rgb,
                });
            }
        }
    }

    /// The completed frames, or an error when the data was empty or ended
    /// mid-frame.
    pub fn finish(self) -> Result<FrameSequence, CoreError> {
        if self.frame_len == 0 || self.frames.is_empty() || !self.current.is_empty() {
            return Err(CoreError::Backend(format!(
                "frame data of {} bytes is not a whole number of {}x{} RGB frames",
                self.received, self.width, self.height
            )));
        }
        Ok(self.frames)
    }
}

/// Cut a packed RGB24 buffer into frames of the given geometry.
pub fn split_frames(bytes: &[u8], width: u32, height: u32) -> Result<FrameSequence, CoreError> {
    let mut frames = FrameAssembler::new(width, height);
    frames.push(bytes);
    frames.finish()
}
