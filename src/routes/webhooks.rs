use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::app_state::AppState;
use crate::error::{RelayError, RelayResult};
use crate::models::roast::{WebhookAck, WebhookPayload};
use crate::services::signature::extract_signature;

/// POST /api/webhooks/video-complete: status callback from the generation service.
///
/// The raw body is authenticated before it is parsed.
pub async fn video_complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> RelayResult<Json<WebhookAck>> {
    let Some(signature) = extract_signature(&headers) else {
        tracing::warn!("Webhook rejected: missing signature");
        return Err(RelayError::Unauthorized("Missing webhook signature".to_string()));
    };

    if !state.verifier.verify(&body, signature) {
        tracing::warn!("Webhook rejected: invalid signature");
        return Err(RelayError::Unauthorized("Invalid webhook signature".to_string()));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| RelayError::Validation(format!("Invalid webhook payload: {e}")))?;

    state.relay.handle_webhook(&payload).await.map(Json)
}
