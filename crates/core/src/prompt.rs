//! Prompt templates, the default negative prompt, and prompt state.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Negative prompt used when the caller supplies none.
///
/// Output targets a young audience, so besides the usual quality artifacts the
/// list excludes scary, violent and adult content.
pub const DEFAULT_NEGATIVE_PROMPT: &str = "blurry, low quality, artifacts, watermark, text, logo, distorted, \
     morphing, flickering, inconsistent, jittery motion, dark, scary, \
     violent, blood, weapons, adult content, horror, nightmare";

/// Name of the single substitution point in a scene template.
pub const SCENE_PLACEHOLDER: &str = "{scene}";

/// Film-style template wrapped around the scene description.
pub const FILM_PROMPT_TEMPLATE: &str = "An animated scene, Pixar style 3D, {scene}.\n\
     Shot on 35mm lens f/2.0, shallow depth of field,\n\
     soft key light 45 degrees, cinematic color grading,\n\
     avoid high-frequency patterns, smooth textures, vibrant colors.";

/// Regex pattern matching `{placeholder}` tokens in prompt templates.
const PLACEHOLDER_PATTERN: &str = r"\{[a-zA-Z_][a-zA-Z0-9_.]*\}";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A static format string with exactly one `{scene}` substitution point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    format: &'static str,
}

impl PromptTemplate {
    /// Check the placeholder layout of `format`.
    ///
    /// A malformed template is a programming error in a static string, so it
    /// surfaces as [`CoreError::Prompt`] instead of being silently skipped.
    pub fn new(format: &'static str) -> Result<Self, CoreError> {
        let placeholders = extract_placeholders(format);
        match placeholders.as_slice() {
            [only] if only == SCENE_PLACEHOLDER => Ok(Self { format }),
            [] => Err(CoreError::Prompt(format!(
                "template has no {SCENE_PLACEHOLDER} placeholder"
            ))),
            many => Err(CoreError::Prompt(format!(
                "template must contain exactly one {SCENE_PLACEHOLDER} placeholder, found: {}",
                many.join(", ")
            ))),
        }
    }

    /// The built-in film-style template.
    pub fn film() -> Result<Self, CoreError> {
        Self::new(FILM_PROMPT_TEMPLATE)
    }

    /// Substitute `scene` into the template.
    pub fn render(&self, scene: &str) -> String {
        self.format.replacen(SCENE_PLACEHOLDER, scene, 1)
    }

    pub fn as_str(&self) -> &'static str {
        self.format
    }
}

/// All `{placeholder}` tokens in `text`, in order of appearance.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Negative prompt
// ---------------------------------------------------------------------------

/// Use the caller's negative prompt verbatim, or the default blocklist.
pub fn resolve_negative_prompt(negative_prompt: Option<&str>) -> String {
    negative_prompt
        .unwrap_or(DEFAULT_NEGATIVE_PROMPT)
        .to_string()
}

// ---------------------------------------------------------------------------
// Prompt state
// ---------------------------------------------------------------------------

/// What happened in the enhancement stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum EnhancementStatus {
    NotRequested,
    Applied,
    Degraded(String),
}

/// Raw input and the prompts derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptState {
    pub raw_prompt: String,
    /// The only prompt ever handed to the generation engine.
    pub effective_prompt: String,
    pub negative_prompt: String,
    pub enhancement: EnhancementStatus,
}
