//! POD Storage Library
//!
//! Object storage abstraction for check-in photos. The orchestrator treats
//! remote storage as an opaque put/delete capability behind [`ObjectStorage`];
//! this crate ships a local filesystem backend for tests and single-node
//! deployments. Remote backends implement the same trait out of tree.
//!
//! # Storage key format
//!
//! Photo keys are `checkins/{shipper_id}/{photo_id}-{main|thumb}.jpg`. Keys
//! must not contain `..` or a leading `/`. Key generation is centralized in
//! the `keys` module so all backends stay consistent.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{photo_key, PhotoVariant};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{ObjectStorage, StorageError, StorageResult};
