// # Memory Gateway
//
// In-memory implementation of DomainGateway.
//
// ## Purpose
//
// Fast, non-persistent storage. All state is lost on restart; the first
// run afterwards re-records everything the resolver reports. Useful for
// tests and for embedders that layer their own durability underneath.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::store::StoreState;
use crate::error::Result;
use crate::model::{
    CategoryKind, ChangeEvent, DnsEntry, DomainRecord, Notification, NotificationPreference,
    SslCertificate, SslPatch, WhoisContact, WhoisPatch,
};
use crate::traits::DomainGateway;

/// In-memory gateway implementation
///
/// State lives in a [`StoreState`] behind a `tokio::sync::RwLock`; clones
/// share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    inner: Arc<RwLock<StoreState>>,
}

impl MemoryGateway {
    /// Create a new empty memory gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked domains
    pub async fn len(&self) -> usize {
        self.inner.read().await.domain_count()
    }

    /// True when no domains are tracked
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DomainGateway for MemoryGateway {
    async fn get_domain(&self, domain_id: &str) -> Result<Option<DomainRecord>> {
        Ok(self.inner.read().await.get_domain(domain_id))
    }

    async fn list_tracked_domains(&self) -> Result<Vec<DomainRecord>> {
        Ok(self.inner.read().await.list_domains())
    }

    async fn get_notification_preference(
        &self,
        domain_id: &str,
        category: CategoryKind,
    ) -> Result<Option<NotificationPreference>> {
        Ok(self.inner.read().await.get_preference(domain_id, category))
    }

    async fn list_change_events(&self, domain_id: &str) -> Result<Vec<ChangeEvent>> {
        Ok(self.inner.read().await.list_events(domain_id))
    }

    async fn list_notifications(&self, domain_id: &str) -> Result<Vec<Notification>> {
        Ok(self.inner.read().await.list_notifications(domain_id))
    }

    async fn set_expiry_date(&self, domain_id: &str, value: Option<String>) -> Result<()> {
        self.inner.write().await.set_expiry_date(domain_id, value)
    }

    async fn upsert_registrar(
        &self,
        domain_id: &str,
        name: &str,
        url: Option<&str>,
    ) -> Result<()> {
        self.inner
            .write()
            .await
            .upsert_registrar(domain_id, name, url)
    }

    async fn add_status(&self, domain_id: &str, code: &str) -> Result<()> {
        self.inner.write().await.add_status(domain_id, code)
    }

    async fn remove_status(&self, domain_id: &str, code: &str) -> Result<()> {
        self.inner.write().await.remove_status(domain_id, code)
    }

    async fn create_whois(&self, domain_id: &str, contact: &WhoisContact) -> Result<()> {
        self.inner.write().await.create_whois(domain_id, contact)
    }

    async fn patch_whois(&self, domain_id: &str, patch: &WhoisPatch) -> Result<()> {
        self.inner.write().await.patch_whois(domain_id, patch)
    }

    async fn create_ssl(&self, domain_id: &str, certificate: &SslCertificate) -> Result<()> {
        self.inner.write().await.create_ssl(domain_id, certificate)
    }

    async fn patch_ssl(&self, domain_id: &str, patch: &SslPatch) -> Result<()> {
        self.inner.write().await.patch_ssl(domain_id, patch)
    }

    async fn add_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.inner.write().await.add_dns_record(domain_id, entry)
    }

    async fn remove_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.inner.write().await.remove_dns_record(domain_id, entry)
    }

    async fn append_change_event(&self, event: &ChangeEvent) -> Result<u64> {
        Ok(self.inner.write().await.append_event(event))
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<u64> {
        Ok(self.inner.write().await.insert_notification(notification))
    }

    async fn track_domain(&self, record: &DomainRecord) -> Result<()> {
        self.inner.write().await.track_domain(record);
        Ok(())
    }

    async fn set_notification_preference(
        &self,
        preference: &NotificationPreference,
    ) -> Result<()> {
        self.inner.write().await.set_preference(preference);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        // No-op for the memory gateway.
        Ok(())
    }
}
