//! Configuration module
//!
//! This module provides configuration structures for the check-in processing
//! pipeline, the notification dispatcher and the read-path cache. All values
//! are sourced from environment variables with typed defaults.

use std::env;
use std::time::Duration;

// Photo processing
const DEFAULT_MAX_PHOTO_BYTES: usize = 2 * 1024 * 1024; // 2 MiB
const DEFAULT_THUMBNAIL_SIDE: u32 = 300;
const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 5;
const DEFAULT_PHOTO_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_SIZE_LIMIT_BYTES: usize = 10 * 1024 * 1024; // 10 MiB

// Notifications
const DEFAULT_NOTIFY_MAX_RETRIES: u32 = 3;
const DEFAULT_NOTIFY_BASE_DELAY_MS: u64 = 1000;

// Caching
const DEFAULT_CACHE_TTL_SHORT_SECS: u64 = 60;
const DEFAULT_CACHE_TTL_MEDIUM_SECS: u64 = 300;
const DEFAULT_CACHE_TTL_LONG_SECS: u64 = 3600;

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Photo pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Maximum byte size of a compressed primary photo
    pub max_photo_bytes: usize,
    /// Side length of the square thumbnail
    pub thumbnail_side: u32,
    /// Maximum photos processed/uploaded simultaneously in a batch
    pub max_concurrent_uploads: usize,
    /// Per-photo processing timeout
    pub photo_timeout: Duration,
    /// Multipart request size limit enforced by the HTTP boundary
    pub request_size_limit_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            thumbnail_side: DEFAULT_THUMBNAIL_SIDE,
            max_concurrent_uploads: DEFAULT_MAX_CONCURRENT_UPLOADS,
            photo_timeout: Duration::from_secs(DEFAULT_PHOTO_TIMEOUT_SECS),
            request_size_limit_bytes: DEFAULT_REQUEST_SIZE_LIMIT_BYTES,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            max_photo_bytes: env_parse("POD_MAX_PHOTO_BYTES", DEFAULT_MAX_PHOTO_BYTES),
            thumbnail_side: env_parse("POD_THUMBNAIL_SIDE", DEFAULT_THUMBNAIL_SIDE),
            max_concurrent_uploads: env_parse(
                "POD_MAX_CONCURRENT_UPLOADS",
                DEFAULT_MAX_CONCURRENT_UPLOADS,
            ),
            photo_timeout: Duration::from_secs(env_parse(
                "POD_PHOTO_TIMEOUT_SECS",
                DEFAULT_PHOTO_TIMEOUT_SECS,
            )),
            request_size_limit_bytes: env_parse(
                "POD_REQUEST_SIZE_LIMIT_BYTES",
                DEFAULT_REQUEST_SIZE_LIMIT_BYTES,
            ),
        }
    }
}

/// Notification dispatcher configuration
#[derive(Clone, Debug)]
pub struct NotificationConfig {
    /// Maximum delivery attempts before giving up
    pub max_retries: u32,
    /// Base delay for exponential backoff between attempts
    pub base_delay: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_NOTIFY_MAX_RETRIES,
            base_delay: Duration::from_millis(DEFAULT_NOTIFY_BASE_DELAY_MS),
        }
    }
}

impl NotificationConfig {
    pub fn from_env() -> Self {
        Self {
            max_retries: env_parse("POD_NOTIFY_MAX_RETRIES", DEFAULT_NOTIFY_MAX_RETRIES),
            base_delay: Duration::from_millis(env_parse(
                "POD_NOTIFY_BASE_DELAY_MS",
                DEFAULT_NOTIFY_BASE_DELAY_MS,
            )),
        }
    }
}

/// Read-path cache TTLs
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub ttl_short: Duration,
    pub ttl_medium: Duration,
    pub ttl_long: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_short: Duration::from_secs(DEFAULT_CACHE_TTL_SHORT_SECS),
            ttl_medium: Duration::from_secs(DEFAULT_CACHE_TTL_MEDIUM_SECS),
            ttl_long: Duration::from_secs(DEFAULT_CACHE_TTL_LONG_SECS),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self {
            ttl_short: Duration::from_secs(env_parse(
                "POD_CACHE_TTL_SHORT_SECS",
                DEFAULT_CACHE_TTL_SHORT_SECS,
            )),
            ttl_medium: Duration::from_secs(env_parse(
                "POD_CACHE_TTL_MEDIUM_SECS",
                DEFAULT_CACHE_TTL_MEDIUM_SECS,
            )),
            ttl_long: Duration::from_secs(env_parse(
                "POD_CACHE_TTL_LONG_SECS",
                DEFAULT_CACHE_TTL_LONG_SECS,
            )),
        }
    }
}

/// Aggregate configuration, constructed once per process
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub notification: NotificationConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from the environment (reading `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self {
            pipeline: PipelineConfig::from_env(),
            notification: NotificationConfig::from_env(),
            cache: CacheConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_photo_bytes, 2 * 1024 * 1024);
        assert_eq!(config.thumbnail_side, 300);
        assert_eq!(config.max_concurrent_uploads, 5);
        assert_eq!(config.photo_timeout, Duration::from_secs(30));
        assert_eq!(config.request_size_limit_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_notification_defaults() {
        let config = NotificationConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_cache_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_short, Duration::from_secs(60));
        assert_eq!(config.ttl_medium, Duration::from_secs(300));
        assert_eq!(config.ttl_long, Duration::from_secs(3600));
    }

    #[test]
    fn test_env_parse_falls_back_on_garbage() {
        env::set_var("POD_TEST_GARBAGE", "not-a-number");
        let value: usize = env_parse("POD_TEST_GARBAGE", 7);
        assert_eq!(value, 7);
        env::remove_var("POD_TEST_GARBAGE");
    }
}
