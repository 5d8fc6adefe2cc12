//! POD Core Library
//!
//! This crate provides the domain models, error types, configuration, TTL cache
//! and query helpers that are shared across all POD components.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod query;

// Re-export commonly used types
pub use cache::TtlCache;
pub use config::{CacheConfig, Config, NotificationConfig, PipelineConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use query::{
    build_geospatial_query, GeoBounds, QueryOptions, DEFAULT_PAGE_SIZE, GEOSPATIAL_QUERY_LIMIT,
    MAX_PAGE_SIZE,
};
