use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::models::job::JobStatus;

/// Job accepted by the generation service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedJob {
    pub job_id: String,
    #[serde(default = "queued")]
    pub status: JobStatus,
}

fn queued() -> JobStatus {
    JobStatus::Queued
}

/// Live status of a job on the generation service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteStatus {
    pub status: JobStatus,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Failure reason or progress note
    #[serde(default, deserialize_with = "detail_message")]
    pub detail: Option<String>,
}

/// The external video generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn create_job(&self, text: &str, image_url: &str) -> Result<CreatedJob, GenerationError>;

    async fn get_job_status(&self, job_id: &str) -> Result<RemoteStatus, GenerationError>;
}

/// HTTP client for the generation service REST API.
pub struct HttpGenerationClient {
    http: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CreateJobRequest<'a> {
    text: &'a str,
    image_url: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "detail_message")]
    detail: Option<String>,
}

impl HttpGenerationClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL extended by `segments`, each percent-encoded as a single
    /// path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GenerationError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GenerationError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| GenerationError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn error_from_response(response: reqwest::Response) -> GenerationError {
        let status = response.status();
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| "Video generation failed".to_string());

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            GenerationError::Rejected { status: status.as_u16(), detail }
        } else {
            GenerationError::Upstream { status: status.as_u16(), detail }
        }
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn create_job(&self, text: &str, image_url: &str) -> Result<CreatedJob, GenerationError> {
        let url = self.endpoint(&["api", "generate-video"])?;

        let response = self
            .http
            .post(url)
            .json(&CreateJobRequest { text, image_url })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.json::<CreatedJob>().await?)
    }

    async fn get_job_status(&self, job_id: &str) -> Result<RemoteStatus, GenerationError> {
        let url = self.endpoint(&["api", "video-status", job_id])?;

        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response.json::<RemoteStatus>().await?)
    }
}

/// `detail` arrives either as a plain string or as an object carrying a
/// `message` (and sometimes `error`) field.
fn detail_message<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Object(map)) => map
            .get("message")
            .or_else(|| map.get("error"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The service refused the request content (4xx validation).
    #[error("Generation request rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("Generation service error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid generation service URL: {0}")]
    InvalidUrl(String),

    #[error("Generation service did not respond in time")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Text too long"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("Text too long"));
    }

    #[test]
    fn test_detail_object() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"detail": {"error": "no_pets_detected", "message": "No pets found in the uploaded image."}}"#,
        )
        .unwrap();
        assert_eq!(body.detail.as_deref(), Some("No pets found in the uploaded image."));
    }

    #[test]
    fn test_detail_missing() {
        let body: ErrorBody = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.detail.is_none());
    }

    #[test]
    fn test_created_job_defaults_to_queued() {
        let job: CreatedJob = serde_json::from_str(r#"{"job_id": "j1"}"#).unwrap();
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpGenerationClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_endpoint_encodes_job_id() {
        let client = HttpGenerationClient::new("http://localhost:8000/roast/");
        let url = client.endpoint(&["api", "video-status", "a?b#c/d"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/roast/api/video-status/a%3Fb%23c%2Fd"
        );
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        let client = HttpGenerationClient::new("not a url");
        assert!(matches!(
            client.endpoint(&["api", "generate-video"]),
            Err(GenerationError::InvalidUrl(_))
        ));
    }
}
