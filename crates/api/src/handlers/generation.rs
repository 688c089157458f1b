//! Handlers for submitting generations and polling their jobs.

use axum::extract::{Path, State};
use axum::Json;
use magima_core::config::GenerationOverrides;
use magima_core::job::{Job, JobStatus};
use magima_pipeline::GenerationRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /generate`. Every field but `prompt` is optional and falls
/// back to the selected preset.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(custom(function = "not_blank"))]
    pub prompt: String,
    /// Omitted selects the default negative prompt; `""` disables it.
    pub negative_prompt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub num_frames: Option<u32>,
    pub num_inference_steps: Option<u32>,
    pub guidance_scale: Option<f32>,
    /// Unsigned; negative seeds are rejected by deserialization.
    pub seed: Option<u64>,
    pub preset: Option<String>,
    pub enhance_prompt: Option<bool>,
    pub use_template: Option<bool>,
}

impl GenerateRequest {
    fn overrides(&self) -> GenerationOverrides {
        GenerationOverrides {
            width: self.width,
            height: self.height,
            frame_count: self.num_frames,
            inference_steps: self.num_inference_steps,
            guidance_scale: self.guidance_scale,
            seed: self.seed,
            enhance_prompt: self.enhance_prompt,
            use_template: self.use_template,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("prompt must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Body of `POST /generate` responses.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// Body of `GET /job/{job_id}` responses.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.job_id.to_string(),
            status: job.status,
            video_path: job.artifact_path,
            error: job.error,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /generate
///
/// Resolve the request against its preset and start a background job.
/// Configuration problems are reported on the job, not here.
pub async fn submit_generation(
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<Json<SubmitResponse>> {
    input.validate()?;

    let config = state
        .resolver
        .resolve(input.preset.as_deref(), &input.overrides());

    let job_id = state
        .tracker
        .submit(GenerationRequest {
            prompt: input.prompt,
            negative_prompt: input.negative_prompt,
            config,
        })
        .await;

    Ok(Json(SubmitResponse {
        job_id,
        status: JobStatus::Processing,
    }))
}

/// GET /job/{job_id}
///
/// Unknown and malformed ids answer `not_found` with 200.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<JobStatusResponse> {
    let response = match Uuid::parse_str(&job_id) {
        Ok(id) => state.tracker.status(id).await.into(),
        Err(_) => JobStatusResponse {
            job_id,
            status: JobStatus::NotFound,
            video_path: None,
            error: None,
        },
    };
    Json(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        serde_json::from_value(serde_json::json!({ "prompt": prompt })).unwrap()
    }

    #[test]
    fn blank_prompt_fails_validation() {
        assert!(request("   ").validate().is_err());
        assert!(request("").validate().is_err());
        assert!(request("a cat").validate().is_ok());
    }

    #[test]
    fn api_field_names_map_to_overrides() {
        let input: GenerateRequest = serde_json::from_value(serde_json::json!({
            "prompt": "x",
            "num_frames": 17,
            "num_inference_steps": 12,
            "seed": 5
        }))
        .unwrap();
        let overrides = input.overrides();
        assert_eq!(overrides.frame_count, Some(17));
        assert_eq!(overrides.inference_steps, Some(12));
        assert_eq!(overrides.seed, Some(5));
        assert!(overrides.width.is_none());
    }

    #[test]
    fn not_found_response_omits_optional_fields() {
        let body = serde_json::to_value(JobStatusResponse::from(Job::not_found(Uuid::nil()))).unwrap();
        assert_eq!(body["status"], "not_found");
        assert!(body.get("video_path").is_none());
        assert!(body.get("error").is_none());
    }
}
