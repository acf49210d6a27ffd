//! Health and diagnostic handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use clipper_models::truncate_chars;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Collections listed by the diagnostic probe.
const PROBE_COLLECTION_LIMIT: usize = 10;

/// Characters of a store error echoed by the probe.
const PROBE_ERROR_CHARS: usize = 80;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// `GET /`
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AI Clipper Backend Running",
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Store diagnostic report.
#[derive(Debug, Serialize)]
pub struct DiagnosticResponse {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

fn set_flag(set: bool) -> String {
    if set { "✅ Set" } else { "❌ Not Set" }.to_string()
}

/// `GET /test`: probe the store. Always 200; failures become status strings.
pub async fn db_test(State(state): State<AppState>) -> Json<DiagnosticResponse> {
    let mut response = DiagnosticResponse {
        backend: "✅ Running".to_string(),
        database: "⚠️ Available but not initialized".to_string(),
        database_url: None,
        database_name: None,
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    let Some(store) = state.store.as_ref() else {
        return Json(response);
    };

    response.database_url = Some(set_flag(state.database_url_set));
    response.database_name = Some(set_flag(state.database_name_set));

    match store.list_collections(PROBE_COLLECTION_LIMIT).await {
        Ok(mut collections) => {
            collections.truncate(PROBE_COLLECTION_LIMIT);
            response.collections = collections;
            response.database = "✅ Connected & Working".to_string();
            response.connection_status = "Connected".to_string();
        }
        Err(e) => {
            warn!(backend = store.backend(), error = %e, "Store probe failed");
            let message = e.to_string();
            response.database = format!(
                "⚠️ Connected but Error: {}",
                truncate_chars(&message, PROBE_ERROR_CHARS)
            );
        }
    }

    Json(response)
}
