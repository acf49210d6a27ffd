//! Firestore REST API types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::store::Fields;

/// Firestore document value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    IntegerValue(String), // Firestore sends integers as strings
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

impl Value {
    /// Convert a JSON value. Integral numbers become `integerValue`,
    /// everything else numeric becomes `doubleValue`.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::NullValue(()),
            JsonValue::Bool(b) => Value::BooleanValue(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::IntegerValue(i.to_string()),
                None => Value::DoubleValue(n.as_f64().unwrap_or_default()),
            },
            JsonValue::String(s) => Value::StringValue(s.clone()),
            JsonValue::Array(items) => Value::ArrayValue(ArrayValue {
                values: Some(items.iter().map(Value::from_json).collect()),
            }),
            JsonValue::Object(map) => Value::MapValue(MapValue {
                fields: Some(map.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()),
            }),
        }
    }

    /// Convert back to JSON. Timestamps, bytes and references become strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::NullValue(()) => JsonValue::Null,
            Value::BooleanValue(b) => JsonValue::Bool(*b),
            Value::IntegerValue(s) => s
                .parse::<i64>()
                .map(JsonValue::from)
                .unwrap_or_else(|_| JsonValue::String(s.clone())),
            Value::DoubleValue(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::TimestampValue(s)
            | Value::StringValue(s)
            | Value::BytesValue(s)
            | Value::ReferenceValue(s) => JsonValue::String(s.clone()),
            Value::GeoPointValue(p) => serde_json::json!({
                "latitude": p.latitude,
                "longitude": p.longitude,
            }),
            Value::ArrayValue(a) => JsonValue::Array(
                a.values
                    .as_ref()
                    .map(|vs| vs.iter().map(Value::to_json).collect())
                    .unwrap_or_default(),
            ),
            Value::MapValue(m) => JsonValue::Object(
                m.fields
                    .as_ref()
                    .map(|fs| fs.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
                    .unwrap_or_default(),
            ),
        }
    }
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document from JSON fields.
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            name: None,
            fields: Some(fields.iter().map(|(k, v)| (k.clone(), Value::from_json(v))).collect()),
            create_time: None,
            update_time: None,
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Document fields as JSON.
    pub fn to_fields(&self) -> Fields {
        self.fields
            .as_ref()
            .map(|fs| fs.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            .unwrap_or_default()
    }
}

/// List documents response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    pub documents: Option<Vec<Document>>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCollectionIdsRequest {
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCollectionIdsResponse {
    pub collection_ids: Option<Vec<String>>,
    pub next_page_token: Option<String>,
}

// ============================================================================
// Structured queries
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// One element of the streamed runQuery response array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub document: Option<Document>,
    pub read_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<QueryFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_descendants: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_filter: Option<CompositeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_filter: Option<FieldFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    pub op: String,
    pub filters: Vec<QueryFilter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl QueryFilter {
    /// `field == value`.
    pub fn equal(field: &str, value: &JsonValue) -> Self {
        Self {
            composite_filter: None,
            field_filter: Some(FieldFilter {
                field: FieldReference {
                    field_path: field.to_string(),
                },
                op: "EQUAL".to_string(),
                value: Value::from_json(value),
            }),
        }
    }

    /// AND of equality clauses; `None` when there are none.
    pub fn all_equal(clauses: &[(String, JsonValue)]) -> Option<Self> {
        let mut filters: Vec<QueryFilter> = clauses
            .iter()
            .map(|(field, value)| QueryFilter::equal(field, value))
            .collect();

        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Self {
                composite_filter: Some(CompositeFilter {
                    op: "AND".to_string(),
                    filters,
                }),
                field_filter: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let original = json!({
            "youtube_url": "https://youtube.com/watch?v=abc",
            "title": null,
            "count": 3,
            "score": 0.91,
            "flag": true,
            "detected_moments": [
                {"start_sec": 5.0, "end_sec": 12.0, "label": "Intro punch", "confidence": 0.91}
            ]
        });

        let value = Value::from_json(&original);
        assert_eq!(value.to_json(), original);
    }

    #[test]
    fn test_value_wire_format() {
        assert_eq!(serde_json::to_value(Value::from_json(&json!(7))).unwrap(), json!({"integerValue": "7"}));
        assert_eq!(serde_json::to_value(Value::from_json(&json!(7.5))).unwrap(), json!({"doubleValue": 7.5}));
        assert_eq!(serde_json::to_value(Value::from_json(&json!(null))).unwrap(), json!({"nullValue": null}));
        assert_eq!(
            serde_json::to_value(Value::from_json(&json!(["a"]))).unwrap(),
            json!({"arrayValue": {"values": [{"stringValue": "a"}]}})
        );
    }

    #[test]
    fn test_timestamp_reads_as_string() {
        let value: Value = serde_json::from_value(json!({"timestampValue": "2024-05-01T12:00:00Z"})).unwrap();
        assert_eq!(value.to_json(), json!("2024-05-01T12:00:00Z"));
    }

    #[test]
    fn test_document_id_from_name() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/videojob/507f1f77bcf86cd799439011",
            "fields": {"label": {"stringValue": "x"}}
        }))
        .unwrap();
        assert_eq!(doc.id(), Some("507f1f77bcf86cd799439011"));
        assert_eq!(doc.to_fields()["label"], "x");
    }

    #[test]
    fn test_query_filter_shapes() {
        assert!(QueryFilter::all_equal(&[]).is_none());

        let single = QueryFilter::all_equal(&[("status".into(), json!("analyzed"))]).unwrap();
        assert!(single.field_filter.is_some());

        let both = QueryFilter::all_equal(&[("a".into(), json!(1)), ("b".into(), json!(2))]).unwrap();
        let wire = serde_json::to_value(&both).unwrap();
        assert_eq!(wire["compositeFilter"]["op"], "AND");
        assert_eq!(wire["compositeFilter"]["filters"].as_array().unwrap().len(), 2);
    }
}
