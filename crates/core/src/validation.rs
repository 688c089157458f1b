//! Structural constraints of the video diffusion model.
//!
//! The model downsamples space by [`BLOCK_SIZE`] and time by
//! [`TEMPORAL_FACTOR`] with one extra boundary frame. [`validate`] is the only
//! way to obtain a [`ValidatedConfig`], which is the only configuration type
//! the generation engine accepts.

use std::ops::Deref;

use crate::config::GenerationConfig;
use crate::error::CoreError;

/// Spatial divisibility requirement for width and height.
pub const BLOCK_SIZE: u32 = 32;

/// Temporal downsampling factor; frame counts must be `TEMPORAL_FACTOR * n + 1`.
pub const TEMPORAL_FACTOR: u32 = 8;

/// A configuration that passed every structural check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(GenerationConfig);

impl ValidatedConfig {
    pub fn into_inner(self) -> GenerationConfig {
        self.0
    }
}

impl Deref for ValidatedConfig {
    type Target = GenerationConfig;

    fn deref(&self) -> &GenerationConfig {
        &self.0
    }
}

/// Check a configuration, returning it unchanged on success.
///
/// Rules are checked in field order and the first violation is reported.
pub fn validate(config: GenerationConfig) -> Result<ValidatedConfig, CoreError> {
    validate_dimension("width", config.width)?;
    validate_dimension("height", config.height)?;
    validate_frame_count(config.frame_count)?;

    if config.inference_steps == 0 {
        return Err(CoreError::configuration(
            "inference_steps",
            config.inference_steps,
            "must be greater than 0",
        ));
    }
    if !(config.guidance_scale.is_finite() && config.guidance_scale > 0.0) {
        return Err(CoreError::configuration(
            "guidance_scale",
            config.guidance_scale,
            "must be a positive number",
        ));
    }

    Ok(ValidatedConfig(config))
}

/// Validate one spatial dimension against [`BLOCK_SIZE`].
pub fn validate_dimension(field: &'static str, value: u32) -> Result<(), CoreError> {
    if value == 0 || value % BLOCK_SIZE != 0 {
        return Err(CoreError::configuration(
            field,
            value,
            format!("must be a positive multiple of {BLOCK_SIZE}"),
        ));
    }
    Ok(())
}

/// Validate the frame count against the `8n + 1` rule.
pub fn validate_frame_count(frames: u32) -> Result<(), CoreError> {
    if frames == 0 || (frames - 1) % TEMPORAL_FACTOR != 0 {
        return Err(CoreError::configuration(
            "frame_count",
            frames,
            format!("must be of the form {TEMPORAL_FACTOR}n + 1"),
        ));
    }
    Ok(())
}
