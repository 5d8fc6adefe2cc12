//! Async ports the services depend on.
//!
//! Implementations live with the caller (database adapters in production,
//! in-memory fakes in tests). Errors cross the boundary as [`AppError`] so the
//! services can classify them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pod_core::models::{CheckIn, Order};
use pod_core::AppError;

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, order_id: Uuid) -> Result<Option<Order>, AppError>;
    async fn save_order(&self, order: &Order) -> Result<(), AppError>;
}

/// Check-in persistence. `count_active_by_order` must not count soft-deleted
/// check-ins.
#[async_trait]
pub trait CheckinStore: Send + Sync {
    async fn find_checkin(&self, checkin_id: Uuid) -> Result<Option<CheckIn>, AppError>;
    async fn save_checkin(&self, checkin: &CheckIn) -> Result<(), AppError>;
    async fn count_active_by_order(&self, order_id: Uuid) -> Result<u64, AppError>;

    /// Soft-delete a check-in, recording the deleting actor, and return the
    /// updated record.
    async fn soft_delete_checkin(
        &self,
        checkin_id: Uuid,
        deleted_by: Uuid,
    ) -> Result<CheckIn, AppError>;
}

/// A recipient's delivery notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub delivery_notifications: bool,
    pub email: bool,
}

/// Looks up a recipient's notification preference. `Ok(None)` means no
/// preference record exists, which the dispatcher treats as opted in.
#[async_trait]
pub trait PreferenceLookup: Send + Sync {
    async fn notification_preference(
        &self,
        recipient_id: Uuid,
    ) -> Result<Option<NotificationPreference>, AppError>;
}

/// Payload handed to the notification channel when a check-in lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinEvent {
    pub checkin_id: Uuid,
    pub order_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub shipper_name: String,
    pub address: String,
    pub note: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Delivery channel for check-in notifications (email, push, ...).
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, event: &CheckinEvent) -> Result<(), AppError>;
}
