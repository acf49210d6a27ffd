//! Firestore REST backend.
//!
//! Talks to Firestore (or the Firestore emulator) over the v1 REST API:
//! - Optional service-account auth with a cached token
//! - HTTP client tuning (pooling, timeouts)
//! - Observability (tracing spans, metrics)
//!
//! Requests are not retried. A 401 drops the cached token so the next
//! request authenticates from scratch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, info_span, warn, Instrument};

use clipper_models::DocumentId;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::metrics::record_request;
use crate::store::{stamp_timestamps, DocumentStore, Fields, Filter, StoredDocument};
use crate::token_cache::TokenCache;
use crate::types::{
    CollectionSelector, Document, ListCollectionIdsRequest, ListCollectionIdsResponse,
    ListDocumentsResponse, QueryFilter, RunQueryRequest, RunQueryResponse, StructuredQuery,
};

const BACKEND: &str = "firestore";

/// Document store backed by the Firestore REST API.
pub struct FirestoreStore {
    http: Client,
    base_url: String,
    token_cache: Option<Arc<TokenCache>>,
}

impl FirestoreStore {
    /// Connect using `GOOGLE_APPLICATION_CREDENTIALS` when set, otherwise
    /// unauthenticated (emulator mode).
    pub fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let provider = Self::service_account_from_env()?;
        if provider.is_none() {
            info!(url = %config.database_url, "No service account configured, using unauthenticated store access");
        }
        Self::new(config, provider)
    }

    /// Create a store with an explicit token provider (`None` = unauthenticated).
    pub fn new(config: &StoreConfig, provider: Option<Arc<dyn TokenProvider>>) -> StoreResult<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| StoreError::Config("GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set".to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("clipper-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let base_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.database_url.trim_end_matches('/'),
            project_id,
            config.database_name
        );

        Ok(Self {
            http,
            base_url,
            token_cache: provider.map(|p| Arc::new(TokenCache::new(p))),
        })
    }

    fn service_account_from_env() -> StoreResult<Option<Arc<dyn TokenProvider>>> {
        let service_account = CustomServiceAccount::from_env()
            .map_err(|e| StoreError::auth_error(format!("failed to load service account: {e}")))?;
        Ok(service_account.map(|sa| Arc::new(sa) as Arc<dyn TokenProvider>))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_path(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(collection))
    }

    /// Attach auth, send, and turn 401 into an auth error.
    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let request = match &self.token_cache {
            Some(cache) => request.bearer_auth(cache.token().await?),
            None => request,
        };

        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(cache) = &self.token_cache {
                cache.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::auth_error(body));
        }
        Ok(response)
    }

    async fn execute_request<T, F>(&self, operation: &'static str, collection: &str, fut: F) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = info_span!("store_request", backend = BACKEND, operation = operation, collection = %collection);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        record_request(BACKEND, operation, result.is_ok(), latency_ms);
        if let Err(e) = &result {
            debug!(operation, collection, error = %e, "Store request failed");
        }

        result
    }

    async fn error_response(url: &str, response: Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::from_http_status(status, format!("{url} failed: {body}"))
    }

    /// Convert REST documents, skipping any whose name is not a DocumentId.
    fn to_stored(collection: &str, documents: impl IntoIterator<Item = Document>) -> Vec<StoredDocument> {
        documents
            .into_iter()
            .filter_map(|doc| {
                let raw_id = doc.id().unwrap_or_default();
                match DocumentId::parse(raw_id) {
                    Ok(id) => Some(StoredDocument::new(id, doc.to_fields())),
                    Err(_) => {
                        warn!(collection, doc_id = raw_id, "Skipping document with foreign id");
                        None
                    }
                }
            })
            .collect()
    }

    async fn list_documents(&self, collection: &str, limit: usize) -> StoreResult<Vec<StoredDocument>> {
        let url = format!("{}?pageSize={}", self.collection_path(collection), limit);

        let response = self.send(self.http.get(&url)).await?;
        match response.status() {
            StatusCode::OK => {
                let list: ListDocumentsResponse = response.json().await?;
                Ok(Self::to_stored(collection, list.documents.unwrap_or_default()))
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            _ => Err(Self::error_response(&url, response).await),
        }
    }

    async fn run_query(&self, collection: &str, filter: &Filter, limit: usize) -> StoreResult<Vec<StoredDocument>> {
        let url = format!("{}:runQuery", self.base_url);
        let body = RunQueryRequest {
            structured_query: StructuredQuery {
                from: vec![CollectionSelector {
                    collection_id: collection.to_string(),
                    all_descendants: None,
                }],
                r#where: QueryFilter::all_equal(filter.clauses()),
                limit: Some(i32::try_from(limit).unwrap_or(i32::MAX)),
            },
        };

        let response = self.send(self.http.post(&url).json(&body)).await?;
        match response.status() {
            StatusCode::OK => {
                let rows: Vec<RunQueryResponse> = response.json().await?;
                Ok(Self::to_stored(collection, rows.into_iter().filter_map(|r| r.document)))
            }
            _ => Err(Self::error_response(&url, response).await),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn insert(&self, collection: &str, mut document: Fields) -> StoreResult<StoredDocument> {
        let id = DocumentId::new();
        stamp_timestamps(&mut document, Utc::now());
        let url = format!("{}?documentId={}", self.collection_path(collection), id);
        let body = Document::from_fields(&document);

        self.execute_request("insert", collection, async {
            let response = self.send(self.http.post(&url).json(&body)).await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    debug!(collection, doc_id = %id, "Inserted document");
                    Ok(StoredDocument::new(id.clone(), document.clone()))
                }
                StatusCode::CONFLICT => Err(StoreError::AlreadyExists(format!("{collection}/{id}"))),
                _ => Err(Self::error_response(&url, response).await),
            }
        })
        .await
    }

    async fn find(&self, collection: &str, filter: &Filter, limit: usize) -> StoreResult<Vec<StoredDocument>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        self.execute_request("find", collection, async {
            if filter.is_empty() {
                self.list_documents(collection, limit).await
            } else {
                self.run_query(collection, filter, limit).await
            }
        })
        .await
    }

    async fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<StoredDocument>> {
        let id = DocumentId::parse(id)?;
        let url = format!("{}/{}", self.collection_path(collection), id);

        self.execute_request("find_one", collection, async {
            let response = self.send(self.http.get(&url)).await?;
            match response.status() {
                StatusCode::OK => {
                    let doc: Document = response.json().await?;
                    Ok(Some(StoredDocument::new(id.clone(), doc.to_fields())))
                }
                StatusCode::NOT_FOUND => Ok(None),
                _ => Err(Self::error_response(&url, response).await),
            }
        })
        .await
    }

    async fn list_collections(&self, limit: usize) -> StoreResult<Vec<String>> {
        let url = format!("{}:listCollectionIds", self.base_url);
        let body = ListCollectionIdsRequest {
            page_size: u32::try_from(limit).unwrap_or(u32::MAX),
        };

        self.execute_request("list_collections", "", async {
            let response = self.send(self.http.post(&url).json(&body)).await?;
            match response.status() {
                StatusCode::OK => {
                    let list: ListCollectionIdsResponse = response.json().await?;
                    let mut names = list.collection_ids.unwrap_or_default();
                    names.truncate(limit);
                    Ok(names)
                }
                _ => Err(Self::error_response(&url, response).await),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_project_id() {
        let config = StoreConfig::new("http://localhost:8080", "(default)");
        assert!(matches!(FirestoreStore::new(&config, None), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_base_url() {
        let mut config = StoreConfig::new("http://localhost:8080/", "(default)");
        config.project_id = Some("demo".into());
        let store = FirestoreStore::new(&config, None).unwrap();
        assert_eq!(
            store.base_url(),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents"
        );
        assert_eq!(store.backend(), "firestore");
    }

    #[tokio::test]
    async fn test_find_one_rejects_malformed_id_without_request() {
        // Port 9 is never contacted: parsing fails first.
        let mut config = StoreConfig::new("http://127.0.0.1:9", "db");
        config.project_id = Some("demo".into());
        let store = FirestoreStore::new(&config, None).unwrap();

        let err = store.find_one("videojob", "abc").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[test]
    fn test_to_stored_skips_foreign_ids() {
        let docs = vec![
            Document {
                name: Some("projects/p/databases/d/documents/videojob/507f1f77bcf86cd799439011".into()),
                fields: None,
                create_time: None,
                update_time: None,
            },
            Document {
                name: Some("projects/p/databases/d/documents/videojob/auto-generated-id".into()),
                fields: None,
                create_time: None,
                update_time: None,
            },
        ];
        let stored = FirestoreStore::to_stored("videojob", docs);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id.as_str(), "507f1f77bcf86cd799439011");
    }
}
