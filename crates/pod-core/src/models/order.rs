//! Order model subset relevant to check-in processing.
//!
//! Orders are owned and persisted by an external collaborator; this crate only
//! models the fields the status state machine reads and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order status. The listed variants are the ones this pipeline reasons
/// about; callers may carry further pre-delivery statuses, which round-trip
/// through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Kitting,
    Paid,
    Delivered,
    Completed,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Kitting => "kitting",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Completed => "completed",
            OrderStatus::Other(s) => s,
        }
    }

    /// Anything that is not delivered or completed counts as pre-delivery.
    pub fn is_pre_delivery(&self) -> bool {
        !matches!(self, OrderStatus::Delivered | OrderStatus::Completed)
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "processing" => OrderStatus::Processing,
            "shipped" => OrderStatus::Shipped,
            "kitting" => OrderStatus::Kitting,
            "paid" => OrderStatus::Paid,
            "delivered" => OrderStatus::Delivered,
            "completed" => OrderStatus::Completed,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the append-only status history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
    pub checkin_id: Option<Uuid>,
}

/// Subset of an order relevant to the check-in state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub status: OrderStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status_updated_at: Option<DateTime<Utc>>,
    /// Number of distinct recipients; completion requires this many active
    /// check-ins. Treated as 1 when absent or zero.
    pub total_recipients: Option<u32>,
    /// Append-only: entries are never removed or mutated.
    pub status_history: Vec<StatusHistoryEntry>,
}

impl Order {
    pub fn new(id: Uuid, status: OrderStatus) -> Self {
        Self {
            id,
            status,
            delivered_at: None,
            completed_at: None,
            status_updated_at: None,
            total_recipients: None,
            status_history: Vec::new(),
        }
    }

    /// Recipient count used by the completion check, defaulting to 1.
    pub fn effective_total_recipients(&self) -> u32 {
        match self.total_recipients {
            Some(n) if n >= 1 => n,
            _ => 1,
        }
    }

    pub fn push_history(
        &mut self,
        status: OrderStatus,
        timestamp: DateTime<Utc>,
        note: Option<String>,
        checkin_id: Option<Uuid>,
    ) {
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp,
            note,
            checkin_id,
        });
    }
}
