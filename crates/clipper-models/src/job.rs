//! Video job models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::moment::DetectedMoment;
use crate::schema::validate_http_url;

/// Collection holding [`VideoJob`] documents.
pub const VIDEO_JOB_COLLECTION: &str = "videojob";

/// Lifecycle status of a video job.
///
/// Jobs are created as `Analyzed`; nothing moves them further.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Analyzed,
    Rendered,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Analyzed => "analyzed",
            JobStatus::Rendered => "rendered",
            JobStatus::Error => "error",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record of one analyzed video submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct VideoJob {
    /// YouTube video URL
    #[validate(custom(function = "validate_http_url"))]
    pub youtube_url: String,

    /// Video title
    pub title: Option<String>,

    /// Channel/author
    pub author: Option<String>,

    /// Thumbnail image
    #[validate(custom(function = "validate_http_url"))]
    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub status: JobStatus,

    #[serde(default)]
    #[validate(nested)]
    pub detected_moments: Vec<DetectedMoment>,

    pub created_at: Option<DateTime<Utc>>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl VideoJob {
    /// A pending job with no metadata.
    pub fn new(youtube_url: impl Into<String>) -> Self {
        Self {
            youtube_url: youtube_url.into(),
            title: None,
            author: None,
            thumbnail_url: None,
            status: JobStatus::Pending,
            detected_moments: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// A job whose analysis produced `moments` at time `now`.
    pub fn analyzed(
        youtube_url: impl Into<String>,
        moments: Vec<DetectedMoment>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            status: JobStatus::Analyzed,
            detected_moments: moments,
            created_at: Some(now),
            updated_at: Some(now),
            ..Self::new(youtube_url)
        }
    }
}

/// A [`VideoJob`] together with its store identifier, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoJobOut {
    pub id: String,

    #[serde(flatten)]
    pub job: VideoJob,
}

impl VideoJobOut {
    pub fn new(id: impl Into<String>, job: VideoJob) -> Self {
        Self { id: id.into(), job }
    }
}
