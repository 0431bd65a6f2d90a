//! Change history recorder
//!
//! Appends change events to the gateway's immutable log. Deduplication is
//! the comparators' job (a comparator only produces an event when a real
//! difference was found), so the recorder appends unconditionally.

use crate::error::Result;
use crate::model::ChangeEvent;
use crate::traits::DomainGateway;
use std::sync::Arc;
use tracing::debug;

/// Handle to a recorded change, used to correlate a possible notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedChange {
    /// Id assigned by the gateway's append operation
    pub event_id: u64,
    /// The event's human description
    pub description: String,
}

/// Append-only recorder over the gateway's change log
#[derive(Clone)]
pub struct HistoryRecorder {
    gateway: Arc<dyn DomainGateway>,
}

impl HistoryRecorder {
    /// Create a recorder backed by the given gateway
    pub fn new(gateway: Arc<dyn DomainGateway>) -> Self {
        Self { gateway }
    }

    /// Append one change event to the log
    ///
    /// Failure to append propagates to the caller; the reconciler reports
    /// it in the domain's error notes without blocking other categories.
    pub async fn record(&self, event: &ChangeEvent) -> Result<RecordedChange> {
        let event_id = self.gateway.append_change_event(event).await?;
        debug!(
            domain_id = %event.domain_id,
            category = %event.category,
            event_id,
            "change recorded"
        );
        Ok(RecordedChange {
            event_id,
            description: event.description.clone(),
        })
    }
}
