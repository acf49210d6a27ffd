//! In-process document store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use clipper_models::DocumentId;

use crate::error::StoreResult;
use crate::store::{stamp_timestamps, DocumentStore, Fields, Filter, StoredDocument};

/// Collections kept in memory, each in insertion order.
///
/// Selected with `DATABASE_URL=memory://`; contents live as long as the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, mut document: Fields) -> StoreResult<StoredDocument> {
        stamp_timestamps(&mut document, Utc::now());
        let stored = StoredDocument::new(DocumentId::new(), document);

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(stored.clone());

        debug!(collection, doc_id = %stored.id, "Inserted document");
        Ok(stored)
    }

    async fn find(&self, collection: &str, filter: &Filter, limit: usize) -> StoreResult<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        let found = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.fields))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }

    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        let id = DocumentId::parse(id)?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn list_collections(&self, limit: usize) -> StoreResult<Vec<String>> {
        let collections = self.collections.read().await;
        Ok(collections.keys().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::insert_entity;
    use clipper_models::{VideoJob, VIDEO_JOB_COLLECTION};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Fields {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_one() {
        let store = MemoryStore::new();
        let inserted = store
            .insert("videojob", doc(json!({"youtube_url": "https://youtube.com/watch?v=1"})))
            .await
            .unwrap();

        let found = store.find_one("videojob", inserted.id.as_str()).await.unwrap().unwrap();
        assert_eq!(found, inserted);
        assert_eq!(found.fields["youtube_url"], "https://youtube.com/watch?v=1");
        assert!(found.fields.contains_key("created_at"));
        assert!(found.fields.contains_key("updated_at"));
    }

    #[tokio::test]
    async fn test_insert_entity_returns_stored_record() {
        let store = MemoryStore::new();
        let job = VideoJob::analyzed("https://youtube.com/watch?v=1", Vec::new(), Utc::now());

        let (id, saved) = insert_entity(&store, VIDEO_JOB_COLLECTION, &job).await.unwrap();
        let (_, fetched) = store
            .find_one(VIDEO_JOB_COLLECTION, id.as_str())
            .await
            .unwrap()
            .unwrap()
            .decode::<VideoJob>()
            .unwrap();

        assert_eq!(saved, fetched);
        assert_eq!(saved.youtube_url, job.youtube_url);
    }

    #[tokio::test]
    async fn test_find_one_unknown_and_malformed() {
        let store = MemoryStore::new();
        assert!(store
            .find_one("videojob", "507f1f77bcf86cd799439011")
            .await
            .unwrap()
            .is_none());

        let err = store.find_one("videojob", "abc").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_find_preserves_order_and_limit() {
        let store = MemoryStore::new();
        for n in 0..3 {
            store.insert("videojob", doc(json!({"n": n}))).await.unwrap();
        }

        let all = store.find("videojob", &Filter::all(), 10).await.unwrap();
        let order: Vec<_> = all.iter().map(|d| d.fields["n"].clone()).collect();
        assert_eq!(order, vec![json!(0), json!(1), json!(2)]);

        assert_eq!(store.find("videojob", &Filter::all(), 2).await.unwrap().len(), 2);
        assert!(store.find("videojob", &Filter::all(), 0).await.unwrap().is_empty());
        assert!(store.find("missing", &Filter::all(), 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_with_filter() {
        let store = MemoryStore::new();
        store.insert("videojob", doc(json!({"status": "analyzed"}))).await.unwrap();
        store.insert("videojob", doc(json!({"status": "pending"}))).await.unwrap();

        let analyzed = store
            .find("videojob", &Filter::all().eq("status", "analyzed"), 10)
            .await
            .unwrap();
        assert_eq!(analyzed.len(), 1);
    }

    #[tokio::test]
    async fn test_list_collections() {
        let store = MemoryStore::new();
        assert!(store.list_collections(10).await.unwrap().is_empty());

        store.insert("videojob", Fields::new()).await.unwrap();
        store.insert("user", Fields::new()).await.unwrap();
        store.insert("product", Fields::new()).await.unwrap();

        assert_eq!(store.list_collections(10).await.unwrap(), vec!["product", "user", "videojob"]);
        assert_eq!(store.list_collections(1).await.unwrap().len(), 1);
    }
}
