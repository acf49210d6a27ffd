//! API configuration.

/// Default request body limit (1 MiB).
const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Serve Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .or_else(|_| std::env::var("API_PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.environment)
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) fn is_production_environment(environment: &str) -> bool {
    environment.eq_ignore_ascii_case("production")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear() {
        for key in [
            "API_HOST",
            "PORT",
            "API_PORT",
            "CORS_ORIGINS",
            "MAX_BODY_SIZE",
            "ENVIRONMENT",
            "METRICS_ENABLED",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear();
        let config = ApiConfig::from_env();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.max_body_size, 1024 * 1024);
        assert!(config.metrics_enabled);
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn test_port_precedence() {
        clear();
        std::env::set_var("API_PORT", "9000");
        assert_eq!(ApiConfig::from_env().port, 9000);

        std::env::set_var("PORT", "8080");
        assert_eq!(ApiConfig::from_env().port, 8080);

        std::env::set_var("PORT", "not-a-port");
        assert_eq!(ApiConfig::from_env().port, 8000);
        clear();
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear();
        std::env::set_var("CORS_ORIGINS", "https://a.example, https://b.example,");
        std::env::set_var("ENVIRONMENT", "Production");
        std::env::set_var("METRICS_ENABLED", "false");

        let config = ApiConfig::from_env();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert!(config.is_production());
        assert!(!config.metrics_enabled);
        clear();
    }
}
