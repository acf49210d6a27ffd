//! The document store contract shared by every backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use clipper_models::DocumentId;

use crate::error::{StoreError, StoreResult};

/// Document body: a JSON object keyed by field name.
pub type Fields = serde_json::Map<String, JsonValue>;

/// Field names that hold the identifier inside raw documents and are
/// stripped before decoding.
const INTERNAL_ID_FIELDS: [&str; 2] = ["_id", "id"];

/// A document read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub fields: Fields,
}

impl StoredDocument {
    pub fn new(id: DocumentId, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Decode the body into a typed entity, dropping identifier fields.
    pub fn decode<T: DeserializeOwned>(mut self) -> StoreResult<(DocumentId, T)> {
        for key in INTERNAL_ID_FIELDS {
            self.fields.remove(key);
        }
        let entity = serde_json::from_value(JsonValue::Object(self.fields))?;
        Ok((self.id, entity))
    }
}

/// Equality filter over top-level fields. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, JsonValue)>,
}

impl Filter {
    /// Filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a `field == value` clause.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, JsonValue)] {
        &self.clauses
    }

    /// True if every clause holds for `fields`.
    pub fn matches(&self, fields: &Fields) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value))
    }
}

/// Async document store keyed by collection name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and diagnostics.
    fn backend(&self) -> &'static str;

    /// Insert a document, stamping `created_at`/`updated_at`. Returns the
    /// document as stored.
    async fn insert(&self, collection: &str, document: Fields) -> StoreResult<StoredDocument>;

    /// Up to `limit` documents matching `filter`, in store order.
    async fn find(&self, collection: &str, filter: &Filter, limit: usize) -> StoreResult<Vec<StoredDocument>>;

    /// A single document by ID. Malformed IDs fail with [`StoreError::InvalidId`].
    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>>;

    /// Names of up to `limit` existing collections.
    async fn list_collections(&self, limit: usize) -> StoreResult<Vec<String>>;
}

/// Serialize an entity into document fields.
pub fn to_fields<T: Serialize>(entity: &T) -> StoreResult<Fields> {
    match serde_json::to_value(entity)? {
        JsonValue::Object(fields) => Ok(fields),
        other => Err(StoreError::SerializationError(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Serialize and insert an entity, decoding it back from the stored fields.
pub async fn insert_entity<T: Serialize + DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    entity: &T,
) -> StoreResult<(DocumentId, T)> {
    let fields = to_fields(entity)?;
    store.insert(collection, fields).await?.decode()
}

/// Set `created_at` and `updated_at` to `now`.
pub fn stamp_timestamps(fields: &mut Fields, now: DateTime<Utc>) {
    let ts = JsonValue::String(now.to_rfc3339_opts(chrono::SecondsFormat::Micros, true));
    fields.insert("created_at".to_string(), ts.clone());
    fields.insert("updated_at".to_string(), ts);
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: JsonValue) -> Fields {
        match value {
            JsonValue::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_filter_matches() {
        let doc = fields(json!({"status": "analyzed", "title": null}));
        assert!(Filter::all().matches(&doc));
        assert!(Filter::all().eq("status", "analyzed").matches(&doc));
        assert!(!Filter::all().eq("status", "pending").matches(&doc));
        assert!(!Filter::all().eq("missing", 1).matches(&doc));
    }

    #[test]
    fn test_decode_strips_identifier_fields() {
        #[derive(serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Doc {
            label: String,
        }

        let stored = StoredDocument::new(
            DocumentId::parse("507f1f77bcf86cd799439011").unwrap(),
            fields(json!({"_id": "x", "id": "y", "label": "hello"})),
        );
        let (id, doc): (_, Doc) = stored.decode().unwrap();
        assert_eq!(id.as_str(), "507f1f77bcf86cd799439011");
        assert_eq!(doc.label, "hello");
    }

    #[test]
    fn test_to_fields_requires_object() {
        assert!(to_fields(&json!({"a": 1})).is_ok());
        assert!(matches!(to_fields(&5), Err(StoreError::SerializationError(_))));
    }

    #[test]
    fn test_stamp_timestamps() {
        let mut doc = Fields::new();
        let now = Utc::now();
        stamp_timestamps(&mut doc, now);
        let created: DateTime<Utc> = serde_json::from_value(doc["created_at"].clone()).unwrap();
        assert_eq!(created.timestamp_micros(), now.timestamp_micros());
        assert_eq!(doc["created_at"], doc["updated_at"]);
    }
}
