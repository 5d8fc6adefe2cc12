//! Order status state machine driven by check-in lifecycle events.
//!
//! A first active check-in marks the order delivered with the check-in's own
//! timestamp. The order completes once active check-ins reach the recipient
//! count. Deleting the last active check-in of a delivered order reverts it
//! to its most recent pre-delivery status from history.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use pod_core::models::{CheckIn, Order, OrderStatus};
use pod_core::AppError;

use crate::ports::{CheckinStore, OrderStore};

/// Status used when a revert finds no pre-delivery entry in history.
pub const DEFAULT_REVERT_STATUS: OrderStatus = OrderStatus::Shipped;

/// What a lifecycle event did to the order, for callers that log or notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    /// Order state already reflected the event.
    Unchanged,
    Delivered,
    Completed,
    Reverted(OrderStatus),
}

/// Mark the order delivered off a check-in. `delivered_at` takes the
/// check-in's timestamp, not the processing time; `now` only stamps the
/// bookkeeping fields. No-op when the order is already delivered or
/// completed.
pub fn apply_delivered(order: &mut Order, checkin: &CheckIn, now: DateTime<Utc>) -> bool {
    if !order.status.is_pre_delivery() {
        return false;
    }
    order.status = OrderStatus::Delivered;
    order.delivered_at = Some(checkin.checkin_at);
    order.status_updated_at = Some(now);
    order.push_history(OrderStatus::Delivered, now, None, Some(checkin.id));
    true
}

/// Completion check: every recipient has an active check-in.
pub fn is_complete(order: &Order, active_checkins: u64) -> bool {
    active_checkins >= u64::from(order.effective_total_recipients())
}

pub fn apply_completed(order: &mut Order, now: DateTime<Utc>) -> bool {
    if order.status == OrderStatus::Completed {
        return false;
    }
    order.status = OrderStatus::Completed;
    order.completed_at = Some(now);
    order.status_updated_at = Some(now);
    order.push_history(OrderStatus::Completed, now, None, None);
    true
}

/// Revert a delivered order whose last active check-in was removed.
pub fn apply_reverted(order: &mut Order, previous: OrderStatus, now: DateTime<Utc>) {
    order.status = previous.clone();
    order.delivered_at = None;
    order.status_updated_at = Some(now);
    order.push_history(
        previous,
        now,
        Some("reverted after check-in removal".to_string()),
        None,
    );
}

/// Most recent pre-delivery status from history, falling back to
/// [`DEFAULT_REVERT_STATUS`] when the order has none.
pub fn previous_status_from_history(order: &Order) -> OrderStatus {
    order
        .status_history
        .iter()
        .rev()
        .map(|entry| &entry.status)
        .find(|status| status.is_pre_delivery())
        .cloned()
        .unwrap_or(DEFAULT_REVERT_STATUS)
}

pub struct OrderStatusService {
    orders: Arc<dyn OrderStore>,
    checkins: Arc<dyn CheckinStore>,
}

impl OrderStatusService {
    pub fn new(orders: Arc<dyn OrderStore>, checkins: Arc<dyn CheckinStore>) -> Self {
        Self { orders, checkins }
    }

    /// React to a newly created check-in: deliver on the first one, complete
    /// once every recipient has checked in.
    pub async fn on_checkin_created(&self, checkin: &CheckIn) -> Result<StatusChange, AppError> {
        if checkin.id.is_nil() {
            return Err(AppError::Validation("check-in id must be set".into()));
        }
        if !checkin.is_active() {
            return Err(AppError::Validation(
                "cannot process a deleted check-in".into(),
            ));
        }

        let mut order = self
            .orders
            .find_order(checkin.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", checkin.order_id)))?;

        let now = Utc::now();
        let delivered = apply_delivered(&mut order, checkin, now);

        let mut change = if delivered {
            StatusChange::Delivered
        } else {
            StatusChange::Unchanged
        };

        if order.status == OrderStatus::Delivered {
            let active = self.checkins.count_active_by_order(order.id).await?;
            if is_complete(&order, active) && apply_completed(&mut order, now) {
                change = StatusChange::Completed;
            }
        }

        if change != StatusChange::Unchanged {
            self.orders.save_order(&order).await?;
            tracing::info!(
                order_id = %order.id,
                checkin_id = %checkin.id,
                status = %order.status,
                "order status advanced"
            );
        }

        Ok(change)
    }

    /// React to a check-in soft-deletion. Reverts the order only when it is
    /// delivered and no active check-in remains.
    pub async fn on_checkin_deleted(&self, checkin: &CheckIn) -> Result<StatusChange, AppError> {
        let mut order = self
            .orders
            .find_order(checkin.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", checkin.order_id)))?;

        let remaining = self.checkins.count_active_by_order(order.id).await?;
        if remaining > 0 || order.status != OrderStatus::Delivered {
            return Ok(StatusChange::Unchanged);
        }

        let previous = previous_status_from_history(&order);
        apply_reverted(&mut order, previous.clone(), Utc::now());
        self.orders.save_order(&order).await?;
        tracing::info!(
            order_id = %order.id,
            checkin_id = %checkin.id,
            status = %order.status,
            "order status reverted"
        );

        Ok(StatusChange::Reverted(previous))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pod_core::models::GeoPoint;
    use uuid::Uuid;

    fn checkin(order_id: Uuid) -> CheckIn {
        CheckIn {
            id: Uuid::new_v4(),
            order_id,
            shipper_id: Uuid::new_v4(),
            recipient_id: Some(Uuid::new_v4()),
            location: GeoPoint {
                longitude: 106.66,
                latitude: 10.75,
            },
            address: "12 Le Loi, District 1".into(),
            photos: Vec::new(),
            note: None,
            checkin_at: Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).unwrap(),
            is_deleted: false,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[test]
    fn test_delivered_uses_checkin_timestamp() {
        let order_id = Uuid::new_v4();
        let mut order = Order::new(order_id, OrderStatus::Shipped);
        let checkin = checkin(order_id);

        assert!(apply_delivered(&mut order, &checkin, Utc::now()));

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.delivered_at, Some(checkin.checkin_at));
        assert_eq!(order.status_history.len(), 1);
        assert_eq!(order.status_history[0].checkin_id, Some(checkin.id));
    }

    #[test]
    fn test_delivered_is_idempotent() {
        let order_id = Uuid::new_v4();
        let mut order = Order::new(order_id, OrderStatus::Delivered);

        assert!(!apply_delivered(&mut order, &checkin(order_id), Utc::now()));
        assert!(order.status_history.is_empty());
    }

    #[test]
    fn test_custom_pre_delivery_status_delivers() {
        let order_id = Uuid::new_v4();
        let mut order = Order::new(order_id, OrderStatus::Other("in_transit".into()));

        assert!(apply_delivered(&mut order, &checkin(order_id), Utc::now()));
        assert_eq!(order.status, OrderStatus::Delivered);
    }

    #[test]
    fn test_completion_threshold() {
        let mut order = Order::new(Uuid::new_v4(), OrderStatus::Delivered);
        order.total_recipients = Some(3);

        assert!(!is_complete(&order, 2));
        assert!(is_complete(&order, 3));
        assert!(is_complete(&order, 4));
    }

    #[test]
    fn test_completion_defaults_to_single_recipient() {
        let order = Order::new(Uuid::new_v4(), OrderStatus::Delivered);
        assert!(is_complete(&order, 1));

        let mut zero = Order::new(Uuid::new_v4(), OrderStatus::Delivered);
        zero.total_recipients = Some(0);
        assert!(is_complete(&zero, 1));
    }

    #[test]
    fn test_revert_restores_history_status() {
        let order_id = Uuid::new_v4();
        let mut order = Order::new(order_id, OrderStatus::Kitting);
        let checkin = checkin(order_id);
        apply_delivered(&mut order, &checkin, Utc::now());

        let previous = previous_status_from_history(&order);
        assert_eq!(previous, DEFAULT_REVERT_STATUS);

        order.push_history(OrderStatus::Kitting, Utc::now(), None, None);
        order.status = OrderStatus::Delivered;
        assert_eq!(previous_status_from_history(&order), OrderStatus::Kitting);

        apply_reverted(&mut order, OrderStatus::Kitting, Utc::now());
        assert_eq!(order.status, OrderStatus::Kitting);
        assert!(order.delivered_at.is_none());
    }

    #[test]
    fn test_revert_default_is_shipped() {
        let order = Order::new(Uuid::new_v4(), OrderStatus::Delivered);
        assert_eq!(previous_status_from_history(&order), OrderStatus::Shipped);
    }

    #[test]
    fn test_completed_is_idempotent() {
        let mut order = Order::new(Uuid::new_v4(), OrderStatus::Delivered);
        assert!(apply_completed(&mut order, Utc::now()));
        assert!(!apply_completed(&mut order, Utc::now()));
        assert_eq!(order.status_history.len(), 1);
    }
}
