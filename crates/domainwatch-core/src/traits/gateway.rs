// # Domain Gateway Trait
//
// Defines the read/write contract of the persistence layer.
//
// ## Purpose
//
// The gateway owns all stored state: domain records, the append-only
// change log, notifications, and notification preferences. The engine
// only ever touches storage through these category-scoped operations;
// how a query reaches the backing store is the implementation's concern.
//
// ## Atomicity
//
// Each write is expected to be atomic at the row level. Cross-category
// atomicity is NOT required: reconciliation always recomputes from a
// freshly fetched snapshot, so a partial write is repaired on the next
// run rather than rolled back.
//
// ## Implementations
//
// - In-memory: `gateway::MemoryGateway`
// - File-backed JSON: `gateway::FileGateway`
// - Future: SQL-backed stores

use crate::model::{
    CategoryKind, ChangeEvent, DnsEntry, DomainRecord, Notification, NotificationPreference,
    SslCertificate, SslPatch, WhoisContact, WhoisPatch,
};
use async_trait::async_trait;

/// Trait for persistence gateway implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks; the
/// engine reconciles domains in parallel, with writes scoped to disjoint
/// domain ids.
#[async_trait]
pub trait DomainGateway: Send + Sync {
    // --- reads ---

    /// Get a stored domain record by id
    async fn get_domain(&self, domain_id: &str) -> Result<Option<DomainRecord>, crate::Error>;

    /// List all tracked domains
    async fn list_tracked_domains(&self) -> Result<Vec<DomainRecord>, crate::Error>;

    /// Look up the notification preference for `(domain, category)`
    ///
    /// `Ok(None)` means no preference row exists; the dispatcher treats
    /// that the same as disabled.
    async fn get_notification_preference(
        &self,
        domain_id: &str,
        category: CategoryKind,
    ) -> Result<Option<NotificationPreference>, crate::Error>;

    /// List the change log for a domain, in append order
    async fn list_change_events(&self, domain_id: &str) -> Result<Vec<ChangeEvent>, crate::Error>;

    /// List notifications for a domain, in creation order
    async fn list_notifications(&self, domain_id: &str) -> Result<Vec<Notification>, crate::Error>;

    // --- category-scoped writes ---

    /// Overwrite the stored expiry date
    async fn set_expiry_date(
        &self,
        domain_id: &str,
        value: Option<String>,
    ) -> Result<(), crate::Error>;

    /// Reuse-or-create a registrar by name and repoint the domain at it
    async fn upsert_registrar(
        &self,
        domain_id: &str,
        name: &str,
        url: Option<&str>,
    ) -> Result<(), crate::Error>;

    /// Insert an EPP status code into the stored set
    async fn add_status(&self, domain_id: &str, code: &str) -> Result<(), crate::Error>;

    /// Delete an EPP status code from the stored set
    async fn remove_status(&self, domain_id: &str, code: &str) -> Result<(), crate::Error>;

    /// Create the WHOIS entity for a domain
    async fn create_whois(
        &self,
        domain_id: &str,
        contact: &WhoisContact,
    ) -> Result<(), crate::Error>;

    /// Patch subfields of the existing WHOIS entity
    async fn patch_whois(&self, domain_id: &str, patch: &WhoisPatch) -> Result<(), crate::Error>;

    /// Create the SSL certificate record for a domain
    async fn create_ssl(
        &self,
        domain_id: &str,
        certificate: &SslCertificate,
    ) -> Result<(), crate::Error>;

    /// Patch subfields of the existing SSL certificate record
    async fn patch_ssl(&self, domain_id: &str, patch: &SslPatch) -> Result<(), crate::Error>;

    /// Insert a DNS record row
    async fn add_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<(), crate::Error>;

    /// Delete a DNS record row
    async fn remove_dns_record(
        &self,
        domain_id: &str,
        entry: &DnsEntry,
    ) -> Result<(), crate::Error>;

    // --- audit and notifications ---

    /// Append a change event to the immutable log
    ///
    /// Returns the id assigned to the appended event. The log is
    /// append-only; events are never mutated or deleted.
    async fn append_change_event(&self, event: &ChangeEvent) -> Result<u64, crate::Error>;

    /// Insert a notification record
    ///
    /// Returns the id assigned to the inserted notification.
    async fn insert_notification(&self, notification: &Notification)
    -> Result<u64, crate::Error>;

    // --- administration ---

    /// Create or replace a tracked domain record
    async fn track_domain(&self, record: &DomainRecord) -> Result<(), crate::Error>;

    /// Set the notification preference for `(domain, category)`
    async fn set_notification_preference(
        &self,
        preference: &NotificationPreference,
    ) -> Result<(), crate::Error>;

    /// Persist any pending changes
    ///
    /// Buffering implementations must flush everything to durable storage.
    async fn flush(&self) -> Result<(), crate::Error>;
}
