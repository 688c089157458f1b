//! Generation configuration and per-call overrides.
//!
//! A [`GenerationConfig`] is always fully specified. [`GenerationOverrides`]
//! carries the caller's partial view of it, merged over a preset by
//! [`crate::preset::ConfigResolver`].

use serde::{Deserialize, Serialize};

/// Frame rate of every rendered video.
pub const OUTPUT_FPS: u32 = 24;

/// A fully specified generation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Output width in pixels (multiple of [`crate::validation::BLOCK_SIZE`]).
    pub width: u32,
    /// Output height in pixels (multiple of [`crate::validation::BLOCK_SIZE`]).
    pub height: u32,
    /// Number of frames, of the form `8n + 1`.
    pub frame_count: u32,
    /// Denoising steps.
    pub inference_steps: u32,
    /// Classifier-free guidance scale.
    pub guidance_scale: f32,
    /// Fixed seed for reproducible output.
    pub seed: Option<u64>,
    /// Run the prompt through the enhancement model.
    pub enhance_prompt: bool,
    /// Wrap the prompt in the film-style template.
    pub use_template: bool,
}

impl GenerationConfig {
    /// Approximate clip length at [`OUTPUT_FPS`].
    pub fn duration_secs(&self) -> f32 {
        self.frame_count as f32 / OUTPUT_FPS as f32
    }
}

/// Caller-supplied overrides. `None` keeps the preset value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_count: Option<u32>,
    pub inference_steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    pub seed: Option<u64>,
    pub enhance_prompt: Option<bool>,
    pub use_template: Option<bool>,
}

impl GenerationOverrides {
    /// Check if any overrides are set.
    pub fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.frame_count.is_none()
            && self.inference_steps.is_none()
            && self.guidance_scale.is_none()
            && self.seed.is_none()
            && self.enhance_prompt.is_none()
            && self.use_template.is_none()
    }

    /// Replace every field of `config` for which an override is present.
    pub fn apply_to(&self, config: &mut GenerationConfig) {
        if let Some(v) = self.width {
            config.width = v;
        }
        if let Some(v) = self.height {
            config.height = v;
        }
        if let Some(v) = self.frame_count {
            config.frame_count = v;
        }
        if let Some(v) = self.inference_steps {
            config.inference_steps = v;
        }
        if let Some(v) = self.guidance_scale {
            config.guidance_scale = v;
        }
        if let Some(v) = self.seed {
            config.seed = Some(v);
        }
        if let Some(v) = self.enhance_prompt {
            config.enhance_prompt = v;
        }
        if let Some(v) = self.use_template {
            config.use_template = v;
        }
    }
}
