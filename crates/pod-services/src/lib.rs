//! Service layer: check-in photo uploads, delivery notifications, and order
//! status orchestration.
//!
//! Services coordinate pod-processing, pod-storage, and pod-worker behind
//! small async ports so callers (and tests) supply their own persistence and
//! delivery backends.

pub mod notification;
pub mod order_status;
pub mod photo_upload;
pub mod ports;

pub use notification::{NotificationDispatcher, NotifyOutcome, SkipReason};
pub use order_status::{OrderStatusService, StatusChange};
pub use photo_upload::{PhotoInput, PhotoUploadService, UploadBatch, UploadError, UploadStage};
pub use ports::{
    CheckinEvent, CheckinStore, NotificationPreference, NotificationSender, OrderStore,
    PreferenceLookup,
};
