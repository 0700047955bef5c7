//! Request relay between client apps and the video generation service.
//!
//! The relay never decides a job's next state itself: every transition comes
//! from a status the generation service reported, either through polling or
//! through the completion webhook.

use chrono::Utc;
use garde::Validate;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::error::{RelayError, RelayResult};
use crate::models::job::{Job, JobStatus, JobUpdate};
use crate::models::roast::{GenerateRequest, JobView, Notification, WebhookAck, WebhookPayload};
use crate::services::generation::{GenerationError, GenerationService, RemoteStatus};
use crate::services::notifier::{NotifyError, Notifier};
use crate::services::store::JobStore;

/// Shown to clients when the generation service rejects the submitted content.
pub const NO_PET_HINT: &str = "Make sure the image contains a visible pet";

/// Time limits for collaborator calls. No call is retried.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub create_timeout: Duration,
    pub status_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            create_timeout: Duration::from_secs(30),
            status_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(5),
        }
    }
}

pub struct RelayService {
    config: RelayConfig,
    generation: Arc<dyn GenerationService>,
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
}

impl RelayService {
    pub fn new(
        config: RelayConfig,
        generation: Arc<dyn GenerationService>,
        store: Arc<dyn JobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            generation,
            store,
            notifier,
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    /// Start a generation job upstream and cache it.
    pub async fn submit_job(&self, request: &GenerateRequest) -> RelayResult<Job> {
        let (Some(text), Some(image_url)) = (non_blank(&request.text), non_blank(&request.image_url))
        else {
            return Err(RelayError::Validation(
                "Missing required fields: text, imageUrl".to_string(),
            ));
        };
        request
            .validate()
            .map_err(|report| RelayError::Validation(format!("Invalid request: {report}")))?;

        tracing::info!(user_id = ?request.user_id, "Generating video");

        let started = Instant::now();
        let created = timeout(
            self.config.create_timeout,
            self.generation.create_job(text, image_url),
        )
        .await
        .unwrap_or(Err(GenerationError::Timeout));
        metrics::histogram!("generation_request_seconds", "operation" => "create")
            .record(started.elapsed().as_secs_f64());

        let created = created.map_err(|e| {
            tracing::error!(user_id = ?request.user_id, error = %e, "Video generation request failed");
            match e {
                GenerationError::Rejected { detail, .. } => RelayError::BadRequest {
                    message: detail,
                    hint: NO_PET_HINT.to_string(),
                },
                other => RelayError::ServiceUnavailable(other.to_string()),
            }
        })?;

        let job = Job::new(
            created.job_id,
            request.user_id.clone(),
            created.status,
            image_url,
            text,
        );

        // A webhook may have landed while create_job was in flight; the
        // store keeps whatever status it recorded.
        let job = self.store.upsert_job(&job).await.map_err(|e| {
            tracing::error!(job_id = %job.job_id, error = %e, "Failed to save job");
            RelayError::internal("Failed to generate video", e)
        })?;

        metrics::counter!("roast_jobs_submitted_total").increment(1);
        tracing::info!(job_id = %job.job_id, status = %job.status, "Video job created");

        Ok(job)
    }

    /// Current view of a job, refreshed from upstream unless already completed.
    pub async fn get_status(&self, job_id: &str) -> RelayResult<JobView> {
        let cached = self
            .store
            .get_job(job_id)
            .await
            .map_err(|e| {
                tracing::error!(job_id = %job_id, error = %e, "Failed to read job");
                RelayError::internal("Failed to check status", e)
            })?
            .ok_or_else(|| RelayError::NotFound(job_id.to_string()))?;

        if cached.status == JobStatus::Completed {
            return Ok(JobView::from(&cached));
        }

        let live = match timeout(
            self.config.status_timeout,
            self.generation.get_job_status(job_id),
        )
        .await
        .unwrap_or(Err(GenerationError::Timeout))
        {
            Ok(live) => live,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "AI service unavailable, returning cached status");
                return Ok(JobView::from(&cached));
            }
        };

        if live.status == cached.status {
            return Ok(JobView::from(&cached));
        }

        let Some(update) = update_from_live(&cached, live) else {
            tracing::warn!(job_id = %job_id, "Completed status without a video URL, keeping cached status");
            return Ok(JobView::from(&cached));
        };

        let mut merged = cached;
        update.apply_to(&mut merged);

        if let Err(e) = self.store.apply_update(&update).await {
            tracing::warn!(job_id = %job_id, error = %e, "Failed to cache live status");
        }

        Ok(JobView::from(&merged))
    }

    pub async fn list_user_jobs(&self, user_id: &str) -> RelayResult<Vec<Job>> {
        self.store.list_jobs_by_user(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Error fetching user videos");
            RelayError::internal("Failed to fetch videos", e)
        })
    }

    /// Apply a status callback from the generation service.
    ///
    /// The signature must already have been checked by the caller.
    pub async fn handle_webhook(&self, payload: &WebhookPayload) -> RelayResult<WebhookAck> {
        let (Some(job_id), Some(status)) = (non_blank(&payload.job_id), non_blank(&payload.status))
        else {
            tracing::warn!(payload = ?payload, "Webhook missing required fields");
            return Err(RelayError::Validation(
                "Missing required fields: job_id, status".to_string(),
            ));
        };

        tracing::info!(job_id = %job_id, status = %status, "Webhook received");
        metrics::counter!("roast_webhooks_received_total", "status" => status.to_string())
            .increment(1);

        let (update, message) = match JobStatus::from(status) {
            JobStatus::Completed => {
                let Some(video_url) = non_blank(&payload.video_url) else {
                    tracing::warn!(job_id = %job_id, "Completed webhook without video_url");
                    return Err(RelayError::Validation(
                        "completed status requires video_url".to_string(),
                    ));
                };
                (
                    JobUpdate::completed(job_id, video_url, Utc::now()),
                    "Video completion processed",
                )
            }
            JobStatus::Failed => (
                JobUpdate::failed(job_id, payload.error.clone()),
                "Failure recorded",
            ),
            other => (JobUpdate::status(job_id, other), "Status updated"),
        };
        let update = update.with_user(payload.user_id.clone());

        let job = self.store.apply_update(&update).await.map_err(|e| {
            tracing::error!(job_id = %job_id, payload = ?payload, error = %e, "Webhook processing failed");
            RelayError::internal("Webhook processing failed", e)
        })?;

        let notification = match (&job.status, job.video_url.as_deref()) {
            (JobStatus::Completed, Some(video_url)) => {
                Some(Notification::video_ready(&job.job_id, video_url))
            }
            (JobStatus::Failed, _) => Some(Notification::video_failed(&job.job_id)),
            _ => None,
        };

        let recipient = non_blank(&payload.user_id).or(job.user_id.as_deref());
        if let (Some(notification), Some(user_id)) = (notification, recipient) {
            self.dispatch_notification(&job.job_id, user_id, &notification)
                .await;
        }

        Ok(WebhookAck::new(message))
    }

    /// Failures are logged and dropped.
    async fn dispatch_notification(&self, job_id: &str, user_id: &str, notification: &Notification) {
        let result = timeout(
            self.config.notify_timeout,
            self.notifier.notify(user_id, notification),
        )
        .await
        .unwrap_or(Err(NotifyError::Timeout));

        match result {
            Ok(()) => {
                tracing::info!(job_id = %job_id, user_id = %user_id, "Notification sent");
            }
            Err(e) => {
                metrics::counter!("roast_notifications_failed_total").increment(1);
                tracing::warn!(job_id = %job_id, user_id = %user_id, error = %e, "Notification failed");
            }
        }
    }
}

/// Cache write implied by a live status that differs from the cached one.
///
/// `None` for a completion that carries no video URL anywhere.
fn update_from_live(cached: &Job, live: RemoteStatus) -> Option<JobUpdate> {
    match live.status {
        JobStatus::Completed => {
            let video_url = live.video_url.or_else(|| cached.video_url.clone())?;
            Some(JobUpdate::completed(&cached.job_id, video_url, Utc::now()))
        }
        JobStatus::Failed => Some(JobUpdate::failed(&cached.job_id, live.detail)),
        other => Some(JobUpdate::status(&cached.job_id, other)),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
