use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::models::roast::Notification;

/// Delivers notifications to a user's devices. Best effort only.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: &str, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, user_id: &str, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = %user_id,
            title = %notification.title,
            data = %notification.data,
            "Push notification (log only)"
        );
        Ok(())
    }
}

/// Forwards notifications to a push gateway over HTTP.
pub struct HttpPushNotifier {
    http: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct PushRequest<'a> {
    user_id: &'a str,
    title: &'a str,
    body: &'a str,
    data: &'a serde_json::Value,
}

impl HttpPushNotifier {
    pub fn new(endpoint: &str) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for HttpPushNotifier {
    async fn notify(&self, user_id: &str, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Webhook-Source", "pet-roast-relay")
            .json(&PushRequest {
                user_id,
                title: &notification.title,
                body: &notification.body,
                data: &notification.data,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Push gateway returned status {0}")]
    Rejected(u16),

    #[error("Notification timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notification = Notification::video_failed("j1");
        assert_ok!(LogNotifier.notify("u1", &notification).await);
    }

    #[tokio::test]
    async fn test_push_gateway_unreachable() {
        let notifier = HttpPushNotifier::new("http://127.0.0.1:9/push");
        let notification = Notification::video_ready("j1", "http://x/v.mp4");
        let err = assert_err!(notifier.notify("u1", &notification).await);
        assert!(matches!(err, NotifyError::Http(_)));
    }
}
