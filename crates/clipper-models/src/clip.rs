//! Clip request and preview models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Screen position of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPosition {
    Top,
    Center,
    #[default]
    Bottom,
}

/// Visual style of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStyle {
    #[default]
    Caption,
    Title,
    Subtitle,
    Emoji,
}

/// Entry animation applied to overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    #[default]
    Bounce,
    Fade,
    Slide,
    Pop,
}

impl Animation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Animation::Bounce => "bounce",
            Animation::Fade => "fade",
            Animation::Slide => "slide",
            Animation::Pop => "pop",
        }
    }
}

/// A text element composited onto a clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OverlayText {
    pub content: String,

    #[serde(default)]
    pub position: OverlayPosition,

    #[serde(default)]
    pub style: OverlayStyle,
}

impl OverlayText {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            position: OverlayPosition::default(),
            style: OverlayStyle::default(),
        }
    }
}

/// Request to cut a clip out of an analyzed video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ClipRequest {
    /// ID of the analyzed video job
    pub job_id: String,

    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub start_sec: f64,

    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub end_sec: f64,

    #[serde(default)]
    pub overlays: Vec<OverlayText>,

    #[serde(default)]
    pub animation: Animation,

    pub emoji: Option<String>,
}

impl ClipRequest {
    /// True when the clip covers a non-empty forward range.
    pub fn has_valid_range(&self) -> bool {
        self.end_sec > self.start_sec
    }

    /// Placeholder preview image for the clip, labelled with rounded bounds.
    pub fn preview_url(&self) -> String {
        format!(
            "https://placehold.co/1280x720?text=Clip+{:.0}-{:.0}s",
            self.start_sec, self.end_sec
        )
    }

    /// Build the mocked render result for this request.
    pub fn into_result(self, now: DateTime<Utc>) -> ClipResult {
        let preview_url = Some(self.preview_url());
        ClipResult {
            job_id: self.job_id,
            preview_url,
            start_sec: self.start_sec,
            end_sec: self.end_sec,
            overlays: self.overlays,
            animation: self.animation,
            emoji: self.emoji,
            created_at: Some(now),
        }
    }
}

/// Mocked clip render descriptor. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipResult {
    pub job_id: String,
    pub preview_url: Option<String>,
    pub start_sec: f64,
    pub end_sec: f64,
    #[serde(default)]
    pub overlays: Vec<OverlayText>,
    pub animation: Animation,
    pub emoji: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
