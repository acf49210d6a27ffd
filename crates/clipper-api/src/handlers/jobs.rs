//! Video job handlers: analyze a link, list jobs, fetch one job.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use clipper_models::{
    heuristic_moments, is_youtube_link, schema, DocumentId, VideoJob, VideoJobOut, VIDEO_JOB_COLLECTION,
};
use clipper_store::{insert_entity, Filter};

use crate::error::{ApiError, ApiResult};
use crate::extract::{QueryParams, ValidatedJson};
use crate::state::AppState;

pub const INVALID_YOUTUBE_URL: &str = "URL harus berupa link YouTube yang valid";
pub const JOB_NOT_FOUND: &str = "Job tidak ditemukan";
pub const INVALID_JOB_ID: &str = "ID tidak valid";

/// Page size when `limit` is omitted.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Upper bound on `limit`; `limit=0` also means this many.
pub const MAX_LIST_LIMIT: usize = 1000;

/// Body of `POST /api/analyze`. The link is checked in the handler, so the
/// derive carries no field rules.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// Missing is treated like empty and rejected with the link message.
    #[serde(default)]
    pub youtube_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

impl ListJobsQuery {
    fn effective_limit(&self) -> usize {
        match self.limit {
            0 => MAX_LIST_LIMIT,
            n => n.min(MAX_LIST_LIMIT),
        }
    }
}

/// `POST /api/analyze`: record a job with the heuristic moments.
pub async fn analyze(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<AnalyzeRequest>,
) -> ApiResult<Json<VideoJobOut>> {
    if !is_youtube_link(&req.youtube_url) {
        return Err(ApiError::bad_request(INVALID_YOUTUBE_URL));
    }

    let job = schema::validate(VideoJob::analyzed(req.youtube_url, heuristic_moments(), Utc::now()))?;

    let (id, job) = insert_entity(state.store()?, VIDEO_JOB_COLLECTION, &job).await?;
    info!(job_id = %id, url = %job.youtube_url, moments = job.detected_moments.len(), "Video analyzed");

    Ok(Json(VideoJobOut::new(id, job)))
}

/// `GET /api/jobs?limit=N`: jobs in store order.
pub async fn list_jobs(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListJobsQuery>,
) -> ApiResult<Json<Vec<VideoJobOut>>> {
    let docs = state
        .store()?
        .find(VIDEO_JOB_COLLECTION, &Filter::all(), query.effective_limit())
        .await?;

    let jobs = docs
        .into_iter()
        .filter_map(|doc| match doc.decode::<VideoJob>() {
            Ok((id, job)) => Some(VideoJobOut::new(id, job)),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable job document");
                None
            }
        })
        .collect();

    Ok(Json(jobs))
}

/// `GET /api/jobs/{job_id}`
///
/// Any failure to look the id up or decode the job, including a missing or
/// failing store, is reported as an invalid id.
pub async fn get_job(State(state): State<AppState>, Path(job_id): Path<String>) -> ApiResult<Json<VideoJobOut>> {
    let id = DocumentId::parse(&job_id).map_err(|_| ApiError::bad_request(INVALID_JOB_ID))?;
    let store = state.store.as_deref().ok_or_else(|| {
        warn!(job_id = %id, "Job lookup without a document store");
        ApiError::bad_request(INVALID_JOB_ID)
    })?;

    let doc = store
        .find_one(VIDEO_JOB_COLLECTION, id.as_str())
        .await
        .map_err(|e| {
            warn!(job_id = %id, error = %e, "Job lookup failed");
            ApiError::bad_request(INVALID_JOB_ID)
        })?
        .ok_or_else(|| ApiError::not_found(JOB_NOT_FOUND))?;

    let (id, job) = doc.decode::<VideoJob>().map_err(|e| {
        warn!(job_id = %id, error = %e, "Stored job is undecodable");
        ApiError::bad_request(INVALID_JOB_ID)
    })?;
    Ok(Json(VideoJobOut::new(id, job)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit() {
        let q = |limit| ListJobsQuery { limit };
        assert_eq!(q(2).effective_limit(), 2);
        assert_eq!(q(0).effective_limit(), MAX_LIST_LIMIT);
        assert_eq!(q(5000).effective_limit(), MAX_LIST_LIMIT);
        assert_eq!(default_limit(), 20);
    }
}
