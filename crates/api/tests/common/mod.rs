#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use magima_core::error::CoreError;
use magima_core::preset::Preset;
use magima_core::types::{Frame, FrameSequence};
use magima_pipeline::backend::{RenderRequest, VideoBackend};
use magima_pipeline::encoder::VideoEncoder;
use magima_pipeline::enhancer::{EnhancementOutcome, PromptEnhancer};
use magima_pipeline::prompt_pipeline::PromptPipeline;
use magima_pipeline::{GenerationEngine, VideoGenerator};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use magima_api::config::ServerConfig;
use magima_api::jobs::{GeneratorRunner, InMemoryJobStore, JobTracker};
use magima_api::router::build_app_router;
use magima_api::state::AppState;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Model stand-in returning two tiny frames per render.
#[derive(Default)]
pub struct StubBackend {
    pub loads: AtomicUsize,
    pub renders: AtomicUsize,
    pub fail_render: bool,
}

#[async_trait]
impl VideoBackend for StubBackend {
    async fn load(&self) -> Result<(), CoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn render(&self, _request: RenderRequest<'_>) -> Result<FrameSequence, CoreError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if self.fail_render {
            return Err(CoreError::OutOfResource("CUDA out of memory".into()));
        }
        Ok(vec![Frame::solid(32, 32, [10, 20, 30]); 2])
    }
}

pub struct OfflineEnhancer;

#[async_trait]
impl PromptEnhancer for OfflineEnhancer {
    async fn enhance(&self, prompt: &str) -> EnhancementOutcome {
        EnhancementOutcome::degraded(prompt, "enhancer offline")
    }
}

/// Writes a marker file where the video would go.
pub struct MarkerEncoder;

#[async_trait]
impl VideoEncoder for MarkerEncoder {
    async fn encode(&self, frames: &[Frame], _fps: u32, output: &Path) -> Result<(), CoreError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, frames.len().to_string()).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(output_dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        output_dir: output_dir.to_path_buf(),
        default_preset: Preset::ApiStandard,
        preload_model: false,
    }
}

pub struct TestApp {
    pub router: Router,
    pub backend: Arc<StubBackend>,
    pub engine: Arc<GenerationEngine>,
    /// Keeps the output directory alive for the test's duration.
    pub output_dir: TempDir,
}

/// Build the full application router over in-process collaborators.
pub fn build_test_app_with(backend: StubBackend) -> TestApp {
    let output_dir = tempfile::tempdir().unwrap();
    let config = test_config(output_dir.path());

    let backend = Arc::new(backend);
    let engine = Arc::new(GenerationEngine::new(backend.clone()));
    let generator = Arc::new(VideoGenerator::new(
        Arc::clone(&engine),
        PromptPipeline::new(Arc::new(OfflineEnhancer)),
        Arc::new(MarkerEncoder),
        24,
    ));
    let runner = GeneratorRunner::new(generator, config.output_dir.clone());
    let tracker = Arc::new(JobTracker::new(
        Arc::new(InMemoryJobStore::new()),
        Arc::new(runner),
    ));

    let state = AppState::new(&config, tracker, Arc::clone(&engine));
    TestApp {
        router: build_app_router(state, &config),
        backend,
        engine,
        output_dir,
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(StubBackend::default())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a generation and return its job id.
pub async fn submit(app: Router, body: Value) -> String {
    let response = post_json(app, "/generate", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "processing");
    json["job_id"].as_str().unwrap().to_string()
}

/// Poll `GET /job/{id}` until the job leaves `processing`.
pub async fn wait_for_job(app: Router, job_id: &str) -> Value {
    for _ in 0..200 {
        let json = body_json(get(app.clone(), &format!("/job/{job_id}")).await).await;
        if json["status"] != "processing" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not finish in time");
}
