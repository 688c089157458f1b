//! Optional prompt enhancement through an auxiliary language model.
//!
//! Every failure mode yields [`EnhancementOutcome::Degraded`] carrying the
//! original prompt.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Instruction given to the enhancement model ahead of the user prompt.
pub const ENHANCER_SYSTEM_PROMPT: &str = "You are a professional cinematographer. Expand the following video prompt
into a detailed film-direction style description. Include:
- Visual style (3D animated, Pixar quality, etc.)
- Camera details (lens, depth of field)
- Lighting (soft key light, etc.)
- Motion description
- Color palette
Keep it concise but descriptive. Output only the enhanced prompt, nothing else.";

/// Marker after which the model's answer starts.
pub const ENHANCED_MARKER: &str = "Enhanced prompt:";

const ENHANCER_TEMPERATURE: f32 = 0.7;
const ENHANCER_MAX_TOKENS: u32 = 256;
const ENHANCER_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of the enhancement stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhancementOutcome {
    Enhanced(String),
    /// Enhancement was skipped; `original` is the prompt to continue with.
    Degraded { original: String, reason: String },
}

impl EnhancementOutcome {
    pub fn degraded(original: &str, reason: impl Into<String>) -> Self {
        Self::Degraded {
            original: original.to_string(),
            reason: reason.into(),
        }
    }

    /// The prompt the pipeline should continue with.
    pub fn into_prompt(self) -> String {
        match self {
            Self::Enhanced(prompt) => prompt,
            Self::Degraded { original, .. } => original,
        }
    }
}

/// Expands a short prompt into a richer description.
#[async_trait]
pub trait PromptEnhancer: Send + Sync {
    async fn enhance(&self, prompt: &str) -> EnhancementOutcome;
}

/// Enhancer used when no enhancement model is configured.
pub struct UnavailableEnhancer {
    reason: String,
}

impl UnavailableEnhancer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PromptEnhancer for UnavailableEnhancer {
    async fn enhance(&self, prompt: &str) -> EnhancementOutcome {
        EnhancementOutcome::degraded(prompt, self.reason.clone())
    }
}

// ---------------------------------------------------------------------------
// HTTP enhancer (Ollama `/api/generate`)
// ---------------------------------------------------------------------------

/// Enhancer backed by an Ollama-compatible text generation endpoint.
///
/// Availability is probed once, on first use. If the probe fails the enhancer
/// stays unavailable for the lifetime of the process.
pub struct HttpPromptEnhancer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    availability: OnceCell<Result<(), String>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl HttpPromptEnhancer {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            availability: OnceCell::new(),
        }
    }

    /// Probe the endpoint once and remember the answer.
    async fn availability(&self) -> &Result<(), String> {
        self.availability
            .get_or_init(|| async {
                tracing::info!(url = %self.base_url, model = %self.model, "Probing prompt enhancer");
                let result = self
                    .client
                    .get(format!("{}/api/tags", self.base_url))
                    .timeout(PROBE_TIMEOUT)
                    .send()
                    .await
                    .map_err(|e| format!("enhancer unreachable: {e}"))
                    .and_then(|r| {
                        if r.status().is_success() {
                            Ok(())
                        } else {
                            Err(format!("enhancer probe returned HTTP {}", r.status().as_u16()))
                        }
                    });
                match &result {
                    Ok(()) => tracing::info!("Prompt enhancer available"),
                    Err(reason) => {
                        tracing::warn!(reason = %reason, "Prompt enhancer unavailable, prompts will not be enhanced")
                    }
                }
                result
            })
            .await
    }

    async fn request(&self, prompt: &str) -> Result<String, String> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: build_enhancer_prompt(prompt),
            stream: false,
            options: GenerateOptions {
                temperature: ENHANCER_TEMPERATURE,
                num_predict: ENHANCER_MAX_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .timeout(ENHANCER_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("enhancement request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "enhancer returned HTTP {}",
                response.status().as_u16()
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| format!("invalid enhancer response: {e}"))?;

        extract_enhanced(&parsed.response).ok_or_else(|| "enhancer returned an empty prompt".into())
    }
}

#[async_trait]
impl PromptEnhancer for HttpPromptEnhancer {
    async fn enhance(&self, prompt: &str) -> EnhancementOutcome {
        if let Err(reason) = self.availability().await {
            return EnhancementOutcome::degraded(prompt, reason.clone());
        }

        match self.request(prompt).await {
            Ok(enhanced) => {
                tracing::info!(
                    enhanced = %preview(&enhanced, 100),
                    "Prompt enhanced",
                );
                EnhancementOutcome::Enhanced(enhanced)
            }
            Err(reason) => EnhancementOutcome::degraded(prompt, reason),
        }
    }
}

/// Full text sent to the enhancement model.
pub fn build_enhancer_prompt(prompt: &str) -> String {
    format!("{ENHANCER_SYSTEM_PROMPT}\n\nOriginal prompt: {prompt}\n\n{ENHANCED_MARKER}")
}

/// Keep only the answer after the last [`ENHANCED_MARKER`], trimmed.
///
/// Returns `None` for an empty answer.
pub fn extract_enhanced(output: &str) -> Option<String> {
    let answer = match output.rfind(ENHANCED_MARKER) {
        Some(idx) => &output[idx + ENHANCED_MARKER.len()..],
        None => output,
    };
    let answer = answer.trim();
    (!answer.is_empty()).then(|| answer.to_string())
}

/// First `max_chars` characters of `text`, for log lines.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
