//! Clip handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tracing::{debug, info, warn};

use clipper_models::{ClipRequest, ClipResult, DocumentId, VIDEO_JOB_COLLECTION};

use crate::error::{ApiError, ApiResult};
use crate::extract::ValidatedJson;
use crate::state::AppState;

pub const INVALID_CLIP_JOB_ID: &str = "Job ID tidak valid";
pub const INVALID_CLIP_RANGE: &str = "end_sec harus lebih besar dari start_sec";

/// `POST /api/clip`: describe a clip render. Nothing is rendered or stored.
pub async fn create_clip(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ClipRequest>,
) -> ApiResult<Json<ClipResult>> {
    let job_id = DocumentId::parse(&req.job_id).map_err(|_| ApiError::bad_request(INVALID_CLIP_JOB_ID))?;

    // The lookup only has to succeed; an unknown job is not an error.
    let store = state.store.as_deref().ok_or_else(|| {
        warn!(job_id = %job_id, "Clip job lookup without a document store");
        ApiError::bad_request(INVALID_CLIP_JOB_ID)
    })?;
    match store.find_one(VIDEO_JOB_COLLECTION, job_id.as_str()).await {
        Ok(found) => debug!(job_id = %job_id, found = found.is_some(), "Clip job lookup"),
        Err(e) => {
            warn!(job_id = %job_id, error = %e, "Clip job lookup failed");
            return Err(ApiError::bad_request(INVALID_CLIP_JOB_ID));
        }
    }

    if !req.has_valid_range() {
        return Err(ApiError::bad_request(INVALID_CLIP_RANGE));
    }

    let result = req.into_result(Utc::now());
    info!(
        job_id = %result.job_id,
        start_sec = result.start_sec,
        end_sec = result.end_sec,
        animation = result.animation.as_str(),
        "Clip described"
    );

    Ok(Json(result))
}
