use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::job::{Job, JobStatus};

/// Request to start a roast video generation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[garde(required, length(chars, min = 1, max = 5000))]
    pub text: Option<String>,

    #[garde(required, length(min = 1))]
    pub image_url: Option<String>,

    #[garde(skip)]
    pub user_id: Option<String>,
}

/// Response after submitting a generation request.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
}

/// Client-facing view of a job's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobView {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for JobView {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.status.clone(),
            video_url: job.video_url.clone(),
            created_at: job.created_at,
            completed_at: job.completed_at,
            error: job.error.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserJobsResponse {
    pub success: bool,
    pub videos: Vec<Job>,
    pub count: usize,
}

/// Callback body posted by the generation service.
///
/// Every field is optional on the wire so that missing required fields are
/// reported as validation errors instead of deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub job_id: Option<String>,
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub user_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

impl WebhookAck {
    pub fn new(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

/// Payload delivered to a user's device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
}

impl Notification {
    pub fn video_ready(job_id: &str, video_url: &str) -> Self {
        Self {
            title: "🎉 Your Pet Roast is Ready!".to_string(),
            body: "Your hilarious pet roast video is ready to watch!".to_string(),
            data: serde_json::json!({
                "videoUrl": video_url,
                "jobId": job_id,
                "screen": "VideoPlayer",
            }),
        }
    }

    pub fn video_failed(job_id: &str) -> Self {
        Self {
            title: "😔 Video Generation Failed".to_string(),
            body: "Sorry, we couldn't generate your video. Please try again.".to_string(),
            data: serde_json::json!({ "jobId": job_id }),
        }
    }
}
