//! Delivery notification dispatch with preference checks and retry.
//!
//! Preferences are an opt-out model: a missing preference record means the
//! recipient is notified. A preference lookup failure is logged and treated
//! the same way rather than dropping the notification.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use pod_core::config::NotificationConfig;

use crate::ports::{CheckinEvent, NotificationSender, PreferenceLookup};

/// Why a notification was skipped without any send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    DeliveryNotificationsDisabled,
    EmailDisabled,
}

/// Outcome of one dispatch: either delivered, skipped by preference, or
/// exhausted after `attempts` tries.
#[derive(Debug)]
pub struct NotifyOutcome {
    pub success: bool,
    pub attempts: u32,
    pub skipped: Option<SkipReason>,
    pub last_error: Option<String>,
}

impl NotifyOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self {
            success: false,
            attempts: 0,
            skipped: Some(reason),
            last_error: None,
        }
    }
}

pub struct NotificationDispatcher {
    preferences: Arc<dyn PreferenceLookup>,
    sender: Arc<dyn NotificationSender>,
    config: NotificationConfig,
}

impl NotificationDispatcher {
    pub fn new(
        preferences: Arc<dyn PreferenceLookup>,
        sender: Arc<dyn NotificationSender>,
        config: NotificationConfig,
    ) -> Self {
        Self {
            preferences,
            sender,
            config,
        }
    }

    /// Dispatch a check-in notification to its recipient.
    ///
    /// Makes up to `max_retries` attempts in total, sleeping
    /// `base_delay * 2^(n-2)` before attempt `n`. Never returns an error: an
    /// exhausted dispatch is reported through the outcome so check-in
    /// creation is unaffected.
    pub async fn dispatch(&self, event: &CheckinEvent) -> NotifyOutcome {
        if let Some(recipient_id) = event.recipient_id {
            if let Some(reason) = self.skip_reason(recipient_id).await {
                tracing::info!(
                    checkin_id = %event.checkin_id,
                    recipient_id = %recipient_id,
                    ?reason,
                    "notification skipped by preference"
                );
                return NotifyOutcome::skipped(reason);
            }
        }

        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.config.base_delay * 2u32.pow(attempt - 2);
                tracing::debug!(
                    checkin_id = %event.checkin_id,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying notification"
                );
                tokio::time::sleep(delay).await;
            }

            match self.sender.send(event).await {
                Ok(()) => {
                    tracing::info!(
                        checkin_id = %event.checkin_id,
                        attempts = attempt,
                        "notification delivered"
                    );
                    return NotifyOutcome {
                        success: true,
                        attempts: attempt,
                        skipped: None,
                        last_error: None,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        checkin_id = %event.checkin_id,
                        attempt,
                        error = %e,
                        "notification attempt failed"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        tracing::error!(
            checkin_id = %event.checkin_id,
            attempts = max_attempts,
            "notification exhausted retries"
        );
        NotifyOutcome {
            success: false,
            attempts: max_attempts,
            skipped: None,
            last_error,
        }
    }

    async fn skip_reason(&self, recipient_id: Uuid) -> Option<SkipReason> {
        let preference = match self.preferences.notification_preference(recipient_id).await {
            Ok(preference) => preference?,
            Err(e) => {
                tracing::warn!(
                    recipient_id = %recipient_id,
                    error = %e,
                    "preference lookup failed, sending anyway"
                );
                return None;
            }
        };

        if !preference.delivery_notifications {
            Some(SkipReason::DeliveryNotificationsDisabled)
        } else if !preference.email {
            Some(SkipReason::EmailDisabled)
        } else {
            None
        }
    }
}

/// Expected total sleep across a fully exhausted dispatch, for observability.
pub fn total_backoff(config: &NotificationConfig) -> Duration {
    (2..=config.max_retries)
        .map(|attempt| config.base_delay * 2u32.pow(attempt - 2))
        .sum()
}
