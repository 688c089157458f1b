use std::time::Duration;

use magima_core::config::OUTPUT_FPS;

/// Collaborator endpoints and encoding settings.
///
/// All fields have defaults suitable for a single-GPU development box with
/// the model server and an Ollama instance running locally.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL of the diffusion model server (default: `http://127.0.0.1:8100`).
    pub model_server_url: String,
    /// Weights the model server should load (default: `models/ltx-2-19b-dev.safetensors`).
    pub model_path: String,
    /// Base URL of the enhancement LLM. `None` disables enhancement entirely.
    pub enhancer_url: Option<String>,
    /// Model name requested from the enhancement LLM (default: `gemma3`).
    pub enhancer_model: String,
    /// `ffmpeg` executable (default: `ffmpeg`).
    pub ffmpeg_bin: String,
    /// Output frame rate (default: `24`).
    pub fps: u32,
    /// Upper bound for a single model server call (default: 1800 s).
    pub model_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_server_url: "http://127.0.0.1:8100".into(),
            model_path: "models/ltx-2-19b-dev.safetensors".into(),
            enhancer_url: Some("http://127.0.0.1:11434".into()),
            enhancer_model: "gemma3".into(),
            ffmpeg_bin: "ffmpeg".into(),
            fps: OUTPUT_FPS,
            model_timeout: Duration::from_secs(1800),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                             |
    /// |----------------------|-------------------------------------|
    /// | `MODEL_SERVER_URL`   | `http://127.0.0.1:8100`             |
    /// | `MODEL_PATH`         | `models/ltx-2-19b-dev.safetensors`  |
    /// | `ENHANCER_URL`       | `http://127.0.0.1:11434` (empty disables) |
    /// | `ENHANCER_MODEL`     | `gemma3`                            |
    /// | `FFMPEG_BIN`         | `ffmpeg`                            |
    /// | `OUTPUT_FPS`         | `24`                                |
    /// | `MODEL_TIMEOUT_SECS` | `1800`                              |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enhancer_url = match std::env::var("ENHANCER_URL") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => defaults.enhancer_url,
        };

        let fps: u32 = std::env::var("OUTPUT_FPS")
            .map(|v| v.parse().expect("OUTPUT_FPS must be a valid u32"))
            .unwrap_or(defaults.fps);

        let model_timeout = std::env::var("MODEL_TIMEOUT_SECS")
            .map(|v| {
                Duration::from_secs(v.parse().expect("MODEL_TIMEOUT_SECS must be a valid u64"))
            })
            .unwrap_or(defaults.model_timeout);

        Self {
            model_server_url: std::env::var("MODEL_SERVER_URL")
                .unwrap_or(defaults.model_server_url),
            model_path: std::env::var("MODEL_PATH").unwrap_or(defaults.model_path),
            enhancer_url,
            enhancer_model: std::env::var("ENHANCER_MODEL").unwrap_or(defaults.enhancer_model),
            ffmpeg_bin: std::env::var("FFMPEG_BIN").unwrap_or(defaults.ffmpeg_bin),
            fps,
            model_timeout,
        }
    }
}
