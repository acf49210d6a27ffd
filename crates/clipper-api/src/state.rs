//! Application state.

use std::sync::Arc;

use clipper_store::{DocumentStore, StoreConfig};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    /// `None` when the store is not configured or failed to initialize.
    pub store: Option<Arc<dyn DocumentStore>>,
    /// Which store settings were present at startup, for `/test`.
    pub database_url_set: bool,
    pub database_name_set: bool,
}

impl AppState {
    /// Create state from the environment.
    ///
    /// A store that cannot be built is logged and left out; the server
    /// still starts and the data endpoints report the store as unavailable.
    pub fn from_env(config: ApiConfig) -> Self {
        let database_url_set = env_is_set("DATABASE_URL");
        let database_name_set = env_is_set("DATABASE_NAME");

        let store = match StoreConfig::from_env() {
            Some(store_config) => match clipper_store::connect(&store_config) {
                Ok(store) => {
                    info!(backend = store.backend(), "Document store initialized");
                    Some(store)
                }
                Err(e) => {
                    warn!(error = %e, "Document store initialization failed, continuing without it");
                    None
                }
            },
            None => {
                warn!("DATABASE_URL or DATABASE_NAME not set, running without a document store");
                None
            }
        };

        Self {
            config,
            store,
            database_url_set,
            database_name_set,
        }
    }

    /// State around an existing store handle.
    pub fn with_store(config: ApiConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            store: Some(store),
            database_url_set: true,
            database_name_set: true,
        }
    }

    /// State with no store handle.
    pub fn without_store(config: ApiConfig) -> Self {
        Self {
            config,
            store: None,
            database_url_set: false,
            database_name_set: false,
        }
    }

    /// The store handle, or 503 when there is none.
    pub fn store(&self) -> ApiResult<&dyn DocumentStore> {
        self.store.as_deref().ok_or(ApiError::StoreUnavailable)
    }
}

fn env_is_set(key: &str) -> bool {
    std::env::var(key).map(|v| !v.trim().is_empty()).unwrap_or(false)
}
