use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::job::{Job, JobUpdate};

/// Persistent cache of job state.
///
/// Every write is an atomic upsert keyed by `job_id`; callers never
/// read-modify-write through this interface.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a submitted job. If a record already exists (a webhook beat
    /// the submission), only its inputs are filled in. Returns the stored job.
    async fn upsert_job(&self, job: &Job) -> Result<Job, StoreError>;

    /// Overwrite the status-bearing fields of a job, creating a stub record
    /// if the job is unknown. Returns the stored job.
    async fn apply_update(&self, update: &JobUpdate) -> Result<Job, StoreError>;

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError>;

    /// Jobs owned by `user_id`, newest first.
    async fn list_jobs_by_user(&self, user_id: &str) -> Result<Vec<Job>, StoreError>;

    /// Connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Process-local store, used in tests and when no database is configured.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl MemoryJobStore {
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
impl JobStore for MemoryJobStore {
    async fn upsert_job(&self, job: &Job) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;
        let stored = jobs
            .entry(job.job_id.clone())
            .and_modify(|existing| existing.fill_inputs(job))
            .or_insert_with(|| job.clone());
        Ok(stored.clone())
    }

    async fn apply_update(&self, update: &JobUpdate) -> Result<Job, StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .entry(update.job_id.clone())
            .and_modify(|job| update.apply_to(job))
            .or_insert_with(|| Job::stub(update));
        Ok(job.clone())
    }

    async fn get_job(&self, job_id: &str) -> Result<Option<Job>, StoreError> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn list_jobs_by_user(&self, user_id: &str) -> Result<Vec<Job>, StoreError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
