//! Delivery check-in model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::photo::Photo;

/// Geographic point, (longitude, latitude) like the persistence layer stores it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// One delivery confirmation event.
///
/// `checkin_at` is immutable once set. Removal is always a soft delete: the
/// record stays in storage but is excluded from every completion and
/// aggregation computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub order_id: Uuid,
    pub shipper_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub location: GeoPoint,
    pub address: String,
    pub photos: Vec<Photo>,
    pub note: Option<String>,
    pub checkin_at: DateTime<Utc>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<Uuid>,
}

impl CheckIn {
    /// Whether this check-in counts toward completion and aggregations.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    /// Mark the check-in deleted, recording who and when for the audit trail.
    /// Idempotent: a second call leaves the original audit fields in place.
    pub fn soft_delete(&mut self, deleted_by: Uuid, now: DateTime<Utc>) {
        if self.is_deleted {
            return;
        }
        self.is_deleted = true;
        self.deleted_at = Some(now);
        self.deleted_by = Some(deleted_by);
    }
}
