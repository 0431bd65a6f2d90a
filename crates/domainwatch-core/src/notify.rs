//! Notification dispatcher
//!
//! Decides whether a recorded change event becomes a user-facing
//! notification. Strictly downstream of the audit log: a disabled
//! preference suppresses the notification but never the change event, and
//! a dispatch failure never rolls back the already-recorded event.

use crate::error::Result;
use crate::model::{ChangeEvent, Notification};
use crate::traits::DomainGateway;
use std::sync::Arc;
use tracing::debug;

/// Preference-gated notification creator
#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn DomainGateway>,
}

impl NotificationDispatcher {
    /// Create a dispatcher backed by the given gateway
    pub fn new(gateway: Arc<dyn DomainGateway>) -> Self {
        Self { gateway }
    }

    /// Create a notification for the event if its category is enabled
    ///
    /// Returns `Ok(None)` when no preference row exists or the preference
    /// is disabled.
    pub async fn maybe_notify(&self, event: &ChangeEvent) -> Result<Option<Notification>> {
        let kind = event.category.kind();
        let preference = self
            .gateway
            .get_notification_preference(&event.domain_id, kind)
            .await?;

        if !preference.is_some_and(|p| p.enabled) {
            debug!(
                domain_id = %event.domain_id,
                category = %kind,
                "notification suppressed by preference"
            );
            return Ok(None);
        }

        let notification = Notification::new(
            &event.domain_id,
            kind,
            format!(
                "{}: {} → {}",
                event.description, event.old_value, event.new_value
            ),
        );
        self.gateway.insert_notification(&notification).await?;

        Ok(Some(notification))
    }
}
