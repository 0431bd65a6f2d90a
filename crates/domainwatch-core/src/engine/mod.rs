//! Core reconciliation engine
//!
//! The ReconcileEngine is responsible for:
//! - Listing tracked domains from the gateway
//! - Fanning out per-domain reconciliation with bounded concurrency
//! - Fanning results back into a deterministic run summary
//! - Emitting events for external monitoring
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ SnapshotResolver │── LiveSnapshot ──┐
//! └──────────────────┘                  ▼
//!                             ┌──────────────────┐
//!                             │ ReconcileEngine  │── RunSummary
//!                             └──────────────────┘
//!                                       │ per domain
//!                             ┌──────────────────┐
//!                             │ DomainReconciler │── 6 comparators
//!                             └──────────────────┘
//!                                       │
//!                             ┌──────────────────┐
//!                             │  DomainGateway   │ (history, notify, state)
//!                             └──────────────────┘
//! ```
//!
//! ## Run model
//!
//! The engine is not a long-running event loop: it is invoked on demand or
//! by an external scheduler, and one invocation is one [`RunSummary`].
//! Domains are independent (writes are scoped to disjoint domain ids), so
//! they are processed concurrently up to the configured limit; the six
//! categories of one domain join before the domain counts as done.

pub mod reconciler;

pub use reconciler::DomainReconciler;

use crate::compare::CompareConfig;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::model::{DomainReport, RunSummary};
use crate::traits::{DomainGateway, SnapshotResolver};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Events emitted by the engine for external monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A run began
    RunStarted {
        domains_count: usize,
    },

    /// A change was detected and recorded
    ChangeDetected {
        domain_name: String,
        description: String,
    },

    /// A domain finished (possibly with zero changes)
    DomainCompleted {
        domain_name: String,
        changes_count: usize,
    },

    /// A domain failed before its comparators could run
    DomainFailed {
        domain_name: String,
        error: String,
    },

    /// The run finished
    RunCompleted {
        domains_count: usize,
        changes_count: usize,
        failures_count: usize,
    },
}

/// Cooperative abort switch for a running engine
///
/// Aborting takes effect between domains: already-dispatched domains run
/// to completion (each domain's reconciliation is self-contained and
/// idempotent), remaining domains are skipped and the summary notes the
/// abort. An abort applies to the current run only; the next `run_once`
/// starts unaborted.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Request that the current run stop at the next domain boundary
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Re-arm the handle; each run starts unaborted
    fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

/// Batch orchestrator over all tracked domains
pub struct ReconcileEngine {
    gateway: Arc<dyn DomainGateway>,
    reconciler: DomainReconciler,
    concurrency: usize,
    abort: AbortHandle,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl ReconcileEngine {
    /// Create a new engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events for monitoring.
    pub fn new(
        resolver: Arc<dyn SnapshotResolver>,
        gateway: Arc<dyn DomainGateway>,
        config: EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = DomainReconciler::new(
            resolver,
            Arc::clone(&gateway),
            CompareConfig {
                expiry_tolerance_days: config.expiry_tolerance_days,
            },
            Duration::from_secs(config.fetch_timeout_secs),
        );

        let engine = Self {
            gateway,
            reconciler,
            concurrency: config.concurrency,
            abort: AbortHandle::default(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Handle for aborting a run between domains
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Run one reconciliation pass over every tracked domain
    ///
    /// Every tracked domain appears in the summary: with its detected
    /// changes, with an empty change list when nothing changed, or with an
    /// error when its fetch failed. One domain's failure never prevents
    /// the others from being processed. Results are sorted by domain name
    /// so output is deterministic regardless of completion order.
    pub async fn run_once(&self) -> Result<RunSummary> {
        self.abort.reset();

        let domains = self.gateway.list_tracked_domains().await?;
        let total = domains.len();
        info!(domains = total, "reconciliation run started");
        self.emit_event(EngineEvent::RunStarted {
            domains_count: total,
        });

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<DomainReport> = JoinSet::new();
        let mut task_domains: HashMap<tokio::task::Id, String> = HashMap::new();
        let mut skipped = 0usize;

        for (i, record) in domains.into_iter().enumerate() {
            if self.abort.is_aborted() {
                skipped = total - i;
                warn!(skipped, "run aborted between domains");
                break;
            }

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| Error::Other(e.to_string()))?;
            let reconciler = self.reconciler.clone();
            let domain_name = record.domain_name.clone();
            let handle = tasks.spawn(async move {
                let _permit = permit;
                reconciler.reconcile(&record).await
            });
            task_domains.insert(handle.id(), domain_name);
        }

        let mut results = Vec::new();
        let mut changes_count = 0usize;
        let mut failures_count = 0usize;

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, report)) => {
                    match &report.error {
                        Some(error) => {
                            failures_count += 1;
                            self.emit_event(EngineEvent::DomainFailed {
                                domain_name: report.domain.clone(),
                                error: error.clone(),
                            });
                        }
                        None => {
                            changes_count += report.changes.len();
                            for description in &report.changes {
                                self.emit_event(EngineEvent::ChangeDetected {
                                    domain_name: report.domain.clone(),
                                    description: description.clone(),
                                });
                            }
                            self.emit_event(EngineEvent::DomainCompleted {
                                domain_name: report.domain.clone(),
                                changes_count: report.changes.len(),
                            });
                        }
                    }
                    results.push(report);
                }
                Err(e) => {
                    // A reconciliation task never returns Err; this is a
                    // panic or cancellation inside the task. The domain
                    // still has to appear in the summary, as a failure.
                    let domain_name = task_domains
                        .get(&e.id())
                        .cloned()
                        .unwrap_or_default();
                    warn!(domain = %domain_name, error = %e,
                        "reconciliation task failed to join");
                    failures_count += 1;
                    self.emit_event(EngineEvent::DomainFailed {
                        domain_name: domain_name.clone(),
                        error: e.to_string(),
                    });
                    results.push(DomainReport::failed(domain_name, e.to_string()));
                }
            }
        }

        results.sort_by(|a, b| a.domain.cmp(&b.domain));

        let note = if skipped > 0 {
            format!(
                "aborted: processed {} of {} domain(s), {} change(s), {} failure(s)",
                total - skipped,
                total,
                changes_count,
                failures_count
            )
        } else {
            format!(
                "processed {total} domain(s), {changes_count} change(s), {failures_count} failure(s)"
            )
        };

        self.emit_event(EngineEvent::RunCompleted {
            domains_count: total,
            changes_count,
            failures_count,
        });
        info!(%note, "reconciliation run finished");

        self.gateway.flush().await?;

        Ok(RunSummary { results, note })
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            // Channel full or no consumer attached; dropping keeps memory
            // bounded.
            warn!("event channel full, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_handle_is_sticky_until_reset() {
        let handle = AbortHandle::default();
        assert!(!handle.is_aborted());
        handle.clone().abort();
        assert!(handle.is_aborted());
        handle.reset();
        assert!(!handle.is_aborted());
    }
}
