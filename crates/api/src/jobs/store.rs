use std::collections::HashMap;

use async_trait::async_trait;
use magima_core::job::{Job, JobId, JobOutcome};
use tokio::sync::RwLock;

/// Storage for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new record, replacing any record with the same id.
    async fn insert(&self, job: Job);

    async fn get(&self, job_id: JobId) -> Option<Job>;

    /// Apply the terminal transition. Returns `false` if the job is unknown
    /// or no longer `Processing`.
    async fn finish(&self, job_id: JobId, outcome: JobOutcome) -> bool;
}

/// Process-local job store.
///
/// Records are never evicted; memory grows with the number of submitted jobs.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: Job) {
        self.jobs.write().await.insert(job.job_id, job);
    }

    async fn get(&self, job_id: JobId) -> Option<Job> {
        self.jobs.read().await.get(&job_id).cloned()
    }

    async fn finish(&self, job_id: JobId, outcome: JobOutcome) -> bool {
        match self.jobs.write().await.get_mut(&job_id) {
            Some(job) => job.finish(outcome),
            None => false,
        }
    }
}
