//! Shared request bodies and constants.
#![allow(dead_code)]

use roast_relay::models::job::{Job, JobStatus};
use roast_relay::models::roast::{GenerateRequest, WebhookPayload};

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub fn lazy_cat_request() -> GenerateRequest {
    GenerateRequest {
        text: Some("lazy cat".to_string()),
        image_url: Some("http://x/cat.png".to_string()),
        user_id: Some("u1".to_string()),
    }
}

pub fn queued_job(job_id: &str, user_id: &str) -> Job {
    Job::new(
        job_id,
        Some(user_id.to_string()),
        JobStatus::Queued,
        "http://x/cat.png",
        "lazy cat",
    )
}

pub fn webhook(job_id: &str, status: &str) -> WebhookPayload {
    WebhookPayload {
        job_id: Some(job_id.to_string()),
        status: Some(status.to_string()),
        ..Default::default()
    }
}

pub fn completed_webhook(job_id: &str, video_url: &str) -> WebhookPayload {
    WebhookPayload {
        video_url: Some(video_url.to_string()),
        ..webhook(job_id, "completed")
    }
}
