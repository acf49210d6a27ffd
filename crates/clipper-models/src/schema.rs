//! Schema validation for incoming payloads and stored documents.
//!
//! Entities derive [`Validate`] for their constraints; this module turns
//! both deserialization failures and constraint failures into a single
//! [`SchemaError`] that lists every violated field.

use std::borrow::Cow;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Violation codes.
pub mod codes {
    pub const MISSING: &str = "missing";
    pub const TYPE: &str = "type";
    pub const ENUM: &str = "enum";
    pub const RANGE: &str = "range";
    pub const URL: &str = "url";
    pub const INVALID: &str = "invalid";
}

/// A single violated field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    /// Dotted field path, e.g. `detected_moments[1].confidence`
    pub field: String,
    /// Machine-readable code (see [`codes`])
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Payload failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_violations(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl SchemaError {
    pub fn single(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Map a serde deserialization failure to a violation.
    pub fn from_serde(err: &serde_json::Error) -> Self {
        let msg = err.to_string();

        let violation = if let Some(field) = between(&msg, "missing field `", "`") {
            Violation::new(field, codes::MISSING, "field required")
        } else if msg.starts_with("unknown variant") {
            Violation::new("body", codes::ENUM, msg)
        } else if msg.starts_with("invalid type") {
            Violation::new("body", codes::TYPE, msg)
        } else {
            Violation::new("body", codes::INVALID, msg)
        };

        Self::single(violation)
    }

    /// Field paths of all violations.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl From<ValidationErrors> for SchemaError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations = Vec::new();
        collect_violations("", &errors, &mut violations);
        violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
        Self { violations }
    }
}

fn collect_violations(prefix: &str, errors: &ValidationErrors, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&e.code).to_string());
                    out.push(Violation::new(path.clone(), e.code.to_string(), message));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_violations(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_violations(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

fn default_message(code: &str) -> &'static str {
    match code {
        codes::RANGE => "value out of range",
        codes::URL => "invalid URL",
        _ => "invalid value",
    }
}

fn between<'a>(s: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = s.find(start)? + start.len();
    let len = s[from..].find(end)?;
    Some(&s[from..from + len])
}

/// Check the constraints of an already-typed entity.
pub fn validate<T: Validate>(entity: T) -> Result<T, SchemaError> {
    entity.validate()?;
    Ok(entity)
}

/// Build a typed entity from a JSON mapping: apply defaults, then check constraints.
pub fn from_json<T>(value: serde_json::Value) -> Result<T, SchemaError>
where
    T: DeserializeOwned + Validate,
{
    let entity: T = serde_json::from_value(value).map_err(|e| SchemaError::from_serde(&e))?;
    validate(entity)
}

/// Custom validator: absolute http(s) URL with a host.
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    let ok = url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false);

    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(codes::URL).with_message(Cow::Borrowed("must be a valid http(s) URL")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct Sample {
        #[validate(range(min = 0.0, max = 1.0))]
        score: f64,
        #[validate(custom(function = "validate_http_url"))]
        link: String,
    }

    #[test]
    fn test_http_url_validator() {
        assert!(validate_http_url("https://www.youtube.com/watch?v=abc").is_ok());
        assert!(validate_http_url("http://youtu.be/abc").is_ok());
        assert!(validate_http_url("youtube").is_err());
        assert!(validate_http_url("ftp://youtube.com/video").is_err());
        assert!(validate_http_url("").is_err());
    }

    #[test]
    fn test_collects_every_violation() {
        let err = from_json::<Sample>(json!({"score": 3.0, "link": "nope"})).unwrap_err();
        assert_eq!(err.fields(), vec!["link", "score"]);
        assert_eq!(err.violations[0].code, codes::URL);
        assert_eq!(err.violations[1].code, codes::RANGE);
    }

    #[test]
    fn test_missing_field() {
        let err = from_json::<Sample>(json!({"score": 0.5})).unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "link");
        assert_eq!(err.violations[0].code, codes::MISSING);
    }

    #[test]
    fn test_type_mismatch() {
        let err = from_json::<Sample>(json!({"score": "high", "link": "https://a.io"})).unwrap_err();
        assert_eq!(err.violations[0].code, codes::TYPE);
    }

    #[test]
    fn test_display_joins_messages() {
        let err = SchemaError {
            violations: vec![
                Violation::new("a", codes::RANGE, "too big"),
                Violation::new("b", codes::URL, "bad"),
            ],
        };
        assert_eq!(err.to_string(), "a: too big; b: bad");
    }
}
