use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::app_state::AppState;
use crate::error::{RelayError, RelayResult};
use crate::models::roast::{GenerateRequest, GenerateResponse, JobView, UserJobsResponse};

/// POST /api/roast/generate: start a roast video generation.
pub async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> RelayResult<Json<GenerateResponse>> {
    let Json(request) = payload.map_err(|e| RelayError::Validation(e.body_text()))?;

    let job = state.relay.submit_job(&request).await?;

    Ok(Json(GenerateResponse {
        success: true,
        job_id: job.job_id,
        status: job.status,
        message: "Video generation started".to_string(),
    }))
}

/// GET /api/roast/status/{job_id}: poll a job's progress.
pub async fn get_video_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> RelayResult<Json<JobView>> {
    state.relay.get_status(&job_id).await.map(Json)
}

/// GET /api/roast/user/{user_id}: every video requested by a user.
pub async fn list_user_videos(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> RelayResult<Json<UserJobsResponse>> {
    let videos = state.relay.list_user_jobs(&user_id).await?;

    Ok(Json(UserJobsResponse {
        success: true,
        count: videos.len(),
        videos,
    }))
}
