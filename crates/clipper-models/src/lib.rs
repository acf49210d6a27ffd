//! Shared data models for the AI Clipper backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video jobs and their detected moments
//! - Clip requests, overlays and mocked clip results
//! - Generic user/product collection schemas
//! - Document identifiers
//! - Schema validation that reports every violated field

pub mod catalog;
pub mod clip;
pub mod id;
pub mod job;
pub mod moment;
pub mod schema;
pub mod utils;

// Re-export common types
pub use catalog::{Product, User, PRODUCT_COLLECTION, USER_COLLECTION};
pub use clip::{Animation, ClipRequest, ClipResult, OverlayPosition, OverlayStyle, OverlayText};
pub use id::{DocumentId, InvalidDocumentId};
pub use job::{JobStatus, VideoJob, VideoJobOut, VIDEO_JOB_COLLECTION};
pub use moment::{heuristic_moments, DetectedMoment};
pub use schema::{SchemaError, Violation};
pub use utils::{is_youtube_link, truncate_chars};
