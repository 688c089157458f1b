//! Fire-and-forget execution of generation jobs.
//!
//! Each submitted job runs on its own Tokio task. The task's completion is
//! the only place a job record leaves `Processing`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use magima_core::error::CoreError;
use magima_core::job::{Job, JobId, JobOutcome};
use magima_pipeline::{GenerationRequest, VideoGenerator};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::store::JobStore;

/// The work performed for one job.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Produce the artifact for `job_id` and return its path.
    async fn run(&self, job_id: JobId, request: GenerationRequest) -> Result<PathBuf, CoreError>;
}

/// [`JobRunner`] writing `{output_dir}/{job_id}.mp4` through a [`VideoGenerator`].
pub struct GeneratorRunner {
    generator: Arc<VideoGenerator>,
    output_dir: PathBuf,
}

impl GeneratorRunner {
    pub fn new(generator: Arc<VideoGenerator>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            output_dir: output_dir.into(),
        }
    }

    pub fn artifact_path(&self, job_id: JobId) -> PathBuf {
        self.output_dir.join(format!("{job_id}.mp4"))
    }
}

#[async_trait]
impl JobRunner for GeneratorRunner {
    async fn run(&self, job_id: JobId, request: GenerationRequest) -> Result<PathBuf, CoreError> {
        let output = self.artifact_path(job_id);
        let report = self.generator.run(&request, &output).await?;
        Ok(report.output_path)
    }
}

/// Submits jobs and answers status queries.
pub struct JobTracker {
    store: Arc<dyn JobStore>,
    runner: Arc<dyn JobRunner>,
}

impl JobTracker {
    pub fn new(store: Arc<dyn JobStore>, runner: Arc<dyn JobRunner>) -> Self {
        Self { store, runner }
    }

    /// Record a new `Processing` job and start it in the background.
    ///
    /// Returns as soon as the record exists; the generation has not started
    /// yet when this returns.
    pub async fn submit(&self, request: GenerationRequest) -> JobId {
        self.spawn(request).await.0
    }

    /// Like [`submit`](Self::submit), also returning the handle of the task
    /// that finishes the job.
    pub async fn spawn(&self, request: GenerationRequest) -> (JobId, JoinHandle<()>) {
        let job_id = Uuid::new_v4();
        self.store.insert(Job::processing(job_id)).await;
        tracing::info!(%job_id, prompt = %request.prompt, "Job submitted");

        let store = Arc::clone(&self.store);
        let runner = Arc::clone(&self.runner);
        let handle = tokio::spawn(async move {
            // Run in a nested task so a panic surfaces as a JoinError here.
            let work = tokio::spawn(async move { runner.run(job_id, request).await });

            let outcome = match work.await {
                Ok(Ok(path)) => {
                    let artifact_path = path.display().to_string();
                    tracing::info!(%job_id, artifact = %artifact_path, "Job completed");
                    JobOutcome::Completed { artifact_path }
                }
                Ok(Err(e)) => {
                    tracing::error!(%job_id, error = %e, "Job failed");
                    JobOutcome::Failed {
                        error: e.to_string(),
                    }
                }
                Err(e) => {
                    tracing::error!(%job_id, error = %e, "Job task aborted");
                    JobOutcome::Failed {
                        error: format!("generation task aborted: {e}"),
                    }
                }
            };

            if !store.finish(job_id, outcome).await {
                tracing::warn!(%job_id, "Job was not in processing state at completion");
            }
        });

        (job_id, handle)
    }

    /// Current record for `job_id`, or the `NotFound` sentinel.
    pub async fn status(&self, job_id: JobId) -> Job {
        self.store
            .get(job_id)
            .await
            .unwrap_or_else(|| Job::not_found(job_id))
    }
}
