//! Per-domain reconciliation
//!
//! The domain reconciler drives one domain through its terminal state
//! machine: fetch the live snapshot, run the six field comparators, apply
//! their diffs, and produce a [`DomainReport`].
//!
//! ## Failure isolation
//!
//! This is the central failure-isolation point of the engine. A fetch
//! failure is terminal for the domain (no comparators run). A failure in
//! one category (comparator error, or persistence error while applying its
//! diff) becomes a textual note in the change list and the remaining
//! categories still run. Nothing here ever aborts the enclosing batch.

use crate::compare::{CategoryDiff, CompareConfig, compare_category};
use crate::error::{Error, Result};
use crate::history::HistoryRecorder;
use crate::model::{CategoryKind, DomainRecord, DomainReport, FieldMutation};
use crate::notify::NotificationDispatcher;
use crate::traits::{DomainGateway, SnapshotResolver};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Reconciles a single domain against its live snapshot
#[derive(Clone)]
pub struct DomainReconciler {
    resolver: Arc<dyn SnapshotResolver>,
    gateway: Arc<dyn DomainGateway>,
    history: HistoryRecorder,
    dispatcher: NotificationDispatcher,
    compare_cfg: CompareConfig,
    fetch_timeout: Duration,
}

impl DomainReconciler {
    /// Create a reconciler over the given boundaries
    pub fn new(
        resolver: Arc<dyn SnapshotResolver>,
        gateway: Arc<dyn DomainGateway>,
        compare_cfg: CompareConfig,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            history: HistoryRecorder::new(Arc::clone(&gateway)),
            dispatcher: NotificationDispatcher::new(Arc::clone(&gateway)),
            gateway,
            compare_cfg,
            fetch_timeout,
        }
    }

    /// Reconcile one domain to a terminal report
    ///
    /// Never returns an error: every failure mode ends up inside the
    /// report, either as the domain-level `error` (fetch failure) or as a
    /// per-category note in `changes`.
    pub async fn reconcile(&self, stored: &DomainRecord) -> DomainReport {
        let snapshot = match tokio::time::timeout(
            self.fetch_timeout,
            self.resolver.fetch(&stored.domain_name),
        )
        .await
        {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                warn!(domain = %stored.domain_name, error = %e, "snapshot fetch failed");
                return DomainReport::failed(&stored.domain_name, e.to_string());
            }
            Err(_) => {
                let e = Error::ResolverTimeout(self.fetch_timeout.as_secs());
                warn!(domain = %stored.domain_name, error = %e, "snapshot fetch timed out");
                return DomainReport::failed(&stored.domain_name, e.to_string());
            }
        };

        let mut report = DomainReport::new(&stored.domain_name);
        for kind in CategoryKind::ALL {
            match compare_category(kind, stored, &snapshot, &self.compare_cfg) {
                Ok(diff) if diff.is_empty() => {}
                Ok(diff) => self.apply_diff(stored, kind, diff, &mut report).await,
                Err(e) => {
                    warn!(domain = %stored.domain_name, category = %kind, error = %e,
                        "comparator failed");
                    report
                        .changes
                        .push(format!("(Error updating {kind}: {e})"));
                }
            }
        }

        debug!(
            domain = %stored.domain_name,
            changes = report.changes.len(),
            "domain reconciled"
        );
        report
    }

    /// Record, notify, and persist one category's diff
    ///
    /// Events are appended to the audit log before their mutations are
    /// applied, so stored state never gets ahead of the history. A
    /// failure at any step becomes a note and stops this category only.
    async fn apply_diff(
        &self,
        stored: &DomainRecord,
        kind: CategoryKind,
        diff: CategoryDiff,
        report: &mut DomainReport,
    ) {
        let CategoryDiff { events, mutations } = diff;

        for event in &events {
            match self.history.record(event).await {
                Ok(recorded) => report.changes.push(recorded.description),
                Err(e) => {
                    report
                        .changes
                        .push(format!("(Error updating {kind}: {e})"));
                    return;
                }
            }

            // Notification is best-effort relative to the audit log.
            if let Err(e) = self.dispatcher.maybe_notify(event).await {
                warn!(
                    domain = %stored.domain_name,
                    category = %event.category,
                    error = %e,
                    "notification dispatch failed"
                );
            }
        }

        for mutation in &mutations {
            if let Err(e) = self.apply_mutation(&stored.id, mutation).await {
                report
                    .changes
                    .push(format!("(Error updating {kind}: {e})"));
                return;
            }
        }
    }

    /// Dispatch one mutation to its category-scoped gateway write
    async fn apply_mutation(&self, domain_id: &str, mutation: &FieldMutation) -> Result<()> {
        match mutation {
            FieldMutation::SetExpiryDate { value } => {
                self.gateway.set_expiry_date(domain_id, value.clone()).await
            }
            FieldMutation::UpsertRegistrar { name, url } => {
                self.gateway
                    .upsert_registrar(domain_id, name, url.as_deref())
                    .await
            }
            FieldMutation::AddStatus { code } => self.gateway.add_status(domain_id, code).await,
            FieldMutation::RemoveStatus { code } => {
                self.gateway.remove_status(domain_id, code).await
            }
            FieldMutation::CreateWhois { contact } => {
                self.gateway.create_whois(domain_id, contact).await
            }
            FieldMutation::PatchWhois { patch } => {
                self.gateway.patch_whois(domain_id, patch).await
            }
            FieldMutation::CreateSsl { certificate } => {
                self.gateway.create_ssl(domain_id, certificate).await
            }
            FieldMutation::PatchSsl { patch } => self.gateway.patch_ssl(domain_id, patch).await,
            FieldMutation::AddDnsRecord { entry } => {
                self.gateway.add_dns_record(domain_id, entry).await
            }
            FieldMutation::RemoveDnsRecord { entry } => {
                self.gateway.remove_dns_record(domain_id, entry).await
            }
        }
    }
}
