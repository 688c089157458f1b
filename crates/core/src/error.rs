/// Errors raised by the generation orchestration layer.
///
/// Enhancement failures have no variant: an unavailable enhancer yields a
/// degraded outcome (see `magima_pipeline::enhancer::EnhancementOutcome`).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid configuration: {field} = {value} ({reason})")]
    Configuration {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Prompt template error: {0}")]
    Prompt(String),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Out of device resources: {0}")]
    OutOfResource(String),

    #[error("Model server error: {0}")]
    Backend(String),

    #[error("Video encoding failed: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Build a [`CoreError::Configuration`] for a single offending field.
    pub fn configuration(
        field: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
