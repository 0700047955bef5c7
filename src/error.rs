use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors surfaced by [`RelayService`](crate::services::relay::RelayService)
/// operations and turned into HTTP responses by the route handlers.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Missing or malformed client input.
    #[error("{0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    NotFound(String),

    /// The generation service rejected the content of the request.
    #[error("{message}")]
    BadRequest { message: String, hint: String },

    /// The generation service is unreachable or failed transiently.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Webhook signature missing or wrong.
    #[error("{0}")]
    Unauthorized(String),

    /// Persistence failure. `context` names the operation that failed.
    #[error("{context}: {message}")]
    Internal {
        context: &'static str,
        message: String,
    },
}

pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    pub fn internal(context: &'static str, err: impl std::fmt::Display) -> Self {
        RelayError::Internal {
            context,
            message: err.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) | RelayError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayError::ServiceUnavailable(_) => StatusCode::BAD_GATEWAY,
            RelayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            RelayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RelayError::Validation(msg) | RelayError::Unauthorized(msg) => json!({ "error": msg }),
            RelayError::NotFound(_) => json!({ "error": "Job not found" }),
            RelayError::BadRequest { message, hint } => json!({
                "error": message,
                "hint": hint,
            }),
            RelayError::ServiceUnavailable(msg) => json!({
                "error": "AI service error",
                "message": msg,
            }),
            RelayError::Internal { context, message } => {
                tracing::error!(context = %context, error = %message, "Internal error");
                json!({
                    "error": context,
                    "message": message,
                })
            }
        };

        (status, axum::Json(body)).into_response()
    }
}
