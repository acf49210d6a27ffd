//! Detected moment models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A time range of interest within a video.
///
/// `end_sec > start_sec` is not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct DetectedMoment {
    /// Start time in seconds
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub start_sec: f64,

    /// End time in seconds
    #[validate(range(min = 0.0, message = "must be greater than or equal to 0"))]
    pub end_sec: f64,

    /// Short label for the moment
    pub label: String,

    /// Confidence score
    #[serde(default = "default_confidence")]
    #[validate(range(min = 0.0, max = 1.0, message = "must be between 0 and 1"))]
    pub confidence: f64,
}

/// Confidence used when a moment does not carry one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl DetectedMoment {
    pub fn new(start_sec: f64, end_sec: f64, label: impl Into<String>, confidence: f64) -> Self {
        Self {
            start_sec,
            end_sec,
            label: label.into(),
            confidence,
        }
    }
}

/// Placeholder moments attached to every analyzed video.
pub fn heuristic_moments() -> Vec<DetectedMoment> {
    vec![
        DetectedMoment::new(5.0, 12.0, "Intro punch", 0.91),
        DetectedMoment::new(35.0, 48.0, "Key point", 0.88),
        DetectedMoment::new(120.0, 136.0, "Best moment", 0.93),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::from_json;
    use serde_json::json;

    #[test]
    fn test_heuristic_moments() {
        let moments = heuristic_moments();
        assert_eq!(moments.len(), 3);

        let labels: Vec<_> = moments.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Intro punch", "Key point", "Best moment"]);
        assert_eq!(moments[0].start_sec, 5.0);
        assert_eq!(moments[1].end_sec, 48.0);
        assert_eq!(moments[2].confidence, 0.93);
        assert_eq!(moments[2].end_sec - moments[2].start_sec, 16.0);
    }

    #[test]
    fn test_confidence_defaults() {
        let m: DetectedMoment = from_json(json!({"start_sec": 1, "end_sec": 2, "label": "x"})).unwrap();
        assert_eq!(m.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_inverted_range_is_accepted() {
        let m: DetectedMoment = from_json(json!({"start_sec": 10, "end_sec": 2, "label": "x"})).unwrap();
        assert!(m.end_sec < m.start_sec);
    }

    #[test]
    fn test_out_of_range_values() {
        let err = from_json::<DetectedMoment>(json!({
            "start_sec": -1.0,
            "end_sec": 2.0,
            "label": "x",
            "confidence": 1.5
        }))
        .unwrap_err();
        assert_eq!(err.fields(), vec!["confidence", "start_sec"]);
    }
}
