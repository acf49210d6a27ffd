//! Store connection configuration.

use std::time::Duration;

/// `DATABASE_URL` prefix selecting the in-process store.
pub const MEMORY_SCHEME: &str = "memory://";

/// Document store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store endpoint, e.g. `https://firestore.googleapis.com`,
    /// `http://localhost:8080` (emulator) or `memory://`
    pub database_url: String,
    /// Database ID within the project
    pub database_name: String,
    /// GCP project ID (Firestore backend only)
    pub project_id: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            database_name: database_name.into(),
            project_id: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Create config from environment variables.
    ///
    /// Returns `None` unless both `DATABASE_URL` and `DATABASE_NAME` are set.
    pub fn from_env() -> Option<Self> {
        let database_url = non_empty_var("DATABASE_URL")?;
        let database_name = non_empty_var("DATABASE_NAME")?;

        let project_id = non_empty_var("GCP_PROJECT_ID").or_else(|| non_empty_var("FIREBASE_PROJECT_ID"));

        let timeout_secs: u64 = std::env::var("STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        let connect_timeout_secs: u64 = std::env::var("STORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Some(Self {
            database_url,
            database_name,
            project_id,
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
        })
    }

    /// True if this config selects the in-process store.
    pub fn is_memory(&self) -> bool {
        self.database_url.starts_with(MEMORY_SCHEME)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for key in [
            "DATABASE_URL",
            "DATABASE_NAME",
            "GCP_PROJECT_ID",
            "FIREBASE_PROJECT_ID",
            "STORE_TIMEOUT_SECS",
            "STORE_CONNECT_TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_requires_url_and_name() {
        clear();
        assert!(StoreConfig::from_env().is_none());

        std::env::set_var("DATABASE_URL", "http://localhost:8080");
        assert!(StoreConfig::from_env().is_none());

        std::env::set_var("DATABASE_NAME", "");
        assert!(StoreConfig::from_env().is_none());

        std::env::set_var("DATABASE_NAME", "(default)");
        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.database_name, "(default)");
        assert!(!config.is_memory());
        clear();
    }

    #[test]
    #[serial]
    fn test_defaults_and_overrides() {
        clear();
        std::env::set_var("DATABASE_URL", "memory://");
        std::env::set_var("DATABASE_NAME", "clipper");
        std::env::set_var("FIREBASE_PROJECT_ID", "firebase-project");
        std::env::set_var("STORE_CONNECT_TIMEOUT_SECS", "not-a-number");
        std::env::set_var("STORE_TIMEOUT_SECS", "12");

        let config = StoreConfig::from_env().unwrap();
        assert!(config.is_memory());
        assert_eq!(config.project_id.as_deref(), Some("firebase-project"));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(12));

        std::env::set_var("GCP_PROJECT_ID", "gcp-project");
        let config = StoreConfig::from_env().unwrap();
        assert_eq!(config.project_id.as_deref(), Some("gcp-project"));
        clear();
    }
}
