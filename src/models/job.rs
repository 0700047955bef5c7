use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default failure reason when the generation service does not supply one.
pub const DEFAULT_FAILURE_REASON: &str = "Video generation failed";

/// Status of a video generation job, as reported by the generation service.
///
/// The four lifecycle states are named; anything else the service reports is
/// kept verbatim as an interim status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl From<&str> for JobStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => JobStatus::Queued,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for JobStatus {
    fn from(value: String) -> Self {
        JobStatus::from(value.as_str())
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached video generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub user_id: Option<String>,
    pub status: JobStatus,
    pub image_url: String,
    pub roast_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// A freshly submitted job.
    pub fn new(
        job_id: impl Into<String>,
        user_id: Option<String>,
        status: JobStatus,
        image_url: impl Into<String>,
        roast_text: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            user_id,
            status,
            image_url: image_url.into(),
            roast_text: roast_text.into(),
            video_url: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Record for a job first seen through an update (e.g. a webhook that
    /// arrives for a submission this relay never persisted).
    pub fn stub(update: &JobUpdate) -> Self {
        let mut job = Job::new(
            update.job_id.clone(),
            update.user_id.clone(),
            update.status.clone(),
            "",
            "",
        );
        update.apply_to(&mut job);
        job
    }

    /// Copy the submission inputs of `submitted` onto a record that already
    /// exists. Status-bearing fields are left as the generation service last
    /// reported them.
    pub fn fill_inputs(&mut self, submitted: &Job) {
        if self.user_id.is_none() {
            self.user_id = submitted.user_id.clone();
        }
        self.image_url = submitted.image_url.clone();
        self.roast_text = submitted.roast_text.clone();
        self.created_at = submitted.created_at;
    }
}

/// Overwrite of the status-bearing fields of one job.
///
/// All four fields are written on every application, so `video_url` and
/// `completed_at` exist only on completed jobs and `error` only on failed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct JobUpdate {
    pub job_id: String,
    pub status: JobStatus,
    pub video_url: Option<String>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Owner reported alongside the update; only fills an unset owner.
    pub user_id: Option<String>,
}

impl JobUpdate {
    pub fn completed(
        job_id: impl Into<String>,
        video_url: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Completed,
            video_url: Some(video_url.into()),
            error: None,
            completed_at: Some(completed_at),
            user_id: None,
        }
    }

    pub fn failed(job_id: impl Into<String>, reason: Option<String>) -> Self {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_REASON.to_string());
        Self {
            job_id: job_id.into(),
            status: JobStatus::Failed,
            video_url: None,
            error: Some(reason),
            completed_at: None,
            user_id: None,
        }
    }

    /// Interim status change. Use [`JobUpdate::completed`] and
    /// [`JobUpdate::failed`] for the terminal states.
    pub fn status(job_id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            job_id: job_id.into(),
            status,
            video_url: None,
            error: None,
            completed_at: None,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Replaying a completion for the same video keeps the first completion time.
    pub fn apply_to(&self, job: &mut Job) {
        let repeated_completion = job.status == JobStatus::Completed
            && self.status == JobStatus::Completed
            && job.video_url == self.video_url;
        if !repeated_completion {
            job.completed_at = self.completed_at;
        }
        job.status = self.status.clone();
        job.video_url = self.video_url.clone();
        job.error = self.error.clone();
        if job.user_id.is_none() {
            job.user_id = self.user_id.clone();
        }
    }
}
