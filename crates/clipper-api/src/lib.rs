//! Axum HTTP API server for the AI Clipper backend.
//!
//! This crate provides:
//! - Video analysis, job listing/lookup and clip description endpoints
//! - Root, liveness and store diagnostic endpoints
//! - Request IDs, request logging, security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
