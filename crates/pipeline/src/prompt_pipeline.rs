//! Raw prompt to effective prompt: template, then enhancement, then the
//! negative prompt.

use std::sync::Arc;

use magima_core::config::GenerationConfig;
use magima_core::error::CoreError;
use magima_core::prompt::{
    resolve_negative_prompt, EnhancementStatus, PromptState, PromptTemplate, FILM_PROMPT_TEMPLATE,
};

use crate::enhancer::{preview, EnhancementOutcome, PromptEnhancer};

/// Ordered prompt transformation stages.
///
/// Never fails because of enhancement: an unavailable enhancer degrades to
/// the templated prompt.
pub struct PromptPipeline {
    template: &'static str,
    enhancer: Arc<dyn PromptEnhancer>,
}

impl PromptPipeline {
    /// Pipeline using the built-in film template.
    pub fn new(enhancer: Arc<dyn PromptEnhancer>) -> Self {
        Self::with_template(FILM_PROMPT_TEMPLATE, enhancer)
    }

    pub fn with_template(template: &'static str, enhancer: Arc<dyn PromptEnhancer>) -> Self {
        Self { template, enhancer }
    }

    /// Produce the prompt state for one request.
    ///
    /// `config.use_template` and `config.enhance_prompt` select the stages;
    /// with both off the effective prompt is the raw prompt unchanged.
    pub async fn run(
        &self,
        raw_prompt: &str,
        negative_prompt: Option<&str>,
        config: &GenerationConfig,
    ) -> Result<PromptState, CoreError> {
        let mut prompt = raw_prompt.to_string();

        if config.use_template {
            prompt = PromptTemplate::new(self.template)?.render(&prompt);
            tracing::debug!(prompt = %preview(&prompt, 100), "Applied film template");
        }

        let enhancement = if config.enhance_prompt {
            match self.enhancer.enhance(&prompt).await {
                EnhancementOutcome::Enhanced(enhanced) => {
                    prompt = enhanced;
                    EnhancementStatus::Applied
                }
                EnhancementOutcome::Degraded { original, reason } => {
                    tracing::warn!(reason = %reason, "Prompt enhancement skipped");
                    prompt = original;
                    EnhancementStatus::Degraded(reason)
                }
            }
        } else {
            EnhancementStatus::NotRequested
        };

        Ok(PromptState {
            raw_prompt: raw_prompt.to_string(),
            effective_prompt: prompt,
            negative_prompt: resolve_negative_prompt(negative_prompt),
            enhancement,
        })
    }
}
