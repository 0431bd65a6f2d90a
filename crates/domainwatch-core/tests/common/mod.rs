//! Test doubles and common utilities for engine contract tests
//!
//! Provides a programmable resolver and a failure-injecting gateway
//! wrapper, so tests can verify isolation and idempotency guarantees
//! without any real probing or storage.

#![allow(dead_code)]

use async_trait::async_trait;
use domainwatch_core::error::Result;
use domainwatch_core::model::{
    CategoryKind, ChangeEvent, DnsEntry, DomainRecord, LiveSnapshot, Notification,
    NotificationPreference, SslCertificate, SslPatch, WhoisContact, WhoisPatch,
};
use domainwatch_core::{
    DomainGateway, EngineConfig, Error, MemoryGateway, ReconcileEngine, SnapshotResolver,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A resolver that serves pre-programmed snapshots
pub struct MockResolver {
    snapshots: Mutex<HashMap<String, LiveSnapshot>>,
    failing: Mutex<HashMap<String, String>>,
    panicking: Mutex<HashSet<String>>,
    fetch_count: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            snapshots: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashMap::new()),
            panicking: Mutex::new(HashSet::new()),
            fetch_count: AtomicUsize::new(0),
        })
    }

    /// Program the snapshot returned for a domain
    pub fn set_snapshot(&self, snapshot: LiveSnapshot) {
        self.snapshots
            .lock()
            .unwrap()
            .insert(snapshot.domain_name.clone(), snapshot);
    }

    /// Make fetches for a domain fail with the given message
    pub fn set_failure(&self, domain_name: &str, message: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(domain_name.to_string(), message.to_string());
    }

    /// Make fetches for a domain panic instead of returning
    pub fn set_panic(&self, domain_name: &str) {
        self.panicking
            .lock()
            .unwrap()
            .insert(domain_name.to_string());
    }

    /// Number of fetch calls so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotResolver for MockResolver {
    async fn fetch(&self, domain_name: &str) -> Result<LiveSnapshot> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        let should_panic = self.panicking.lock().unwrap().contains(domain_name);
        if should_panic {
            panic!("injected resolver panic for {domain_name}");
        }

        if let Some(message) = self.failing.lock().unwrap().get(domain_name) {
            return Err(Error::resolver(message.clone()));
        }

        self.snapshots
            .lock()
            .unwrap()
            .get(domain_name)
            .cloned()
            .ok_or_else(|| Error::resolver(format!("no snapshot programmed for {domain_name}")))
    }

    fn resolver_name(&self) -> &'static str {
        "mock"
    }
}

/// Gateway wrapper that injects failures into selected write paths
///
/// Delegates everything to an inner [`MemoryGateway`]; individual
/// operations can be switched to fail to exercise isolation guarantees.
#[derive(Clone)]
pub struct FailingGateway {
    inner: MemoryGateway,
    fail_ssl_writes: Arc<AtomicBool>,
    fail_append_event: Arc<AtomicBool>,
    append_count: Arc<AtomicUsize>,
}

impl FailingGateway {
    pub fn new(inner: MemoryGateway) -> Self {
        Self {
            inner,
            fail_ssl_writes: Arc::new(AtomicBool::new(false)),
            fail_append_event: Arc::new(AtomicBool::new(false)),
            append_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make create_ssl/patch_ssl fail
    pub fn fail_ssl_writes(&self, fail: bool) {
        self.fail_ssl_writes.store(fail, Ordering::SeqCst);
    }

    /// Make append_change_event fail
    pub fn fail_append_event(&self, fail: bool) {
        self.fail_append_event.store(fail, Ordering::SeqCst);
    }

    /// Number of append_change_event calls (including failed ones)
    pub fn append_count(&self) -> usize {
        self.append_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DomainGateway for FailingGateway {
    async fn get_domain(&self, domain_id: &str) -> Result<Option<DomainRecord>> {
        self.inner.get_domain(domain_id).await
    }

    async fn list_tracked_domains(&self) -> Result<Vec<DomainRecord>> {
        self.inner.list_tracked_domains().await
    }

    async fn get_notification_preference(
        &self,
        domain_id: &str,
        category: CategoryKind,
    ) -> Result<Option<NotificationPreference>> {
        self.inner
            .get_notification_preference(domain_id, category)
            .await
    }

    async fn list_change_events(&self, domain_id: &str) -> Result<Vec<ChangeEvent>> {
        self.inner.list_change_events(domain_id).await
    }

    async fn list_notifications(&self, domain_id: &str) -> Result<Vec<Notification>> {
        self.inner.list_notifications(domain_id).await
    }

    async fn set_expiry_date(&self, domain_id: &str, value: Option<String>) -> Result<()> {
        self.inner.set_expiry_date(domain_id, value).await
    }

    async fn upsert_registrar(
        &self,
        domain_id: &str,
        name: &str,
        url: Option<&str>,
    ) -> Result<()> {
        self.inner.upsert_registrar(domain_id, name, url).await
    }

    async fn add_status(&self, domain_id: &str, code: &str) -> Result<()> {
        self.inner.add_status(domain_id, code).await
    }

    async fn remove_status(&self, domain_id: &str, code: &str) -> Result<()> {
        self.inner.remove_status(domain_id, code).await
    }

    async fn create_whois(&self, domain_id: &str, contact: &WhoisContact) -> Result<()> {
        self.inner.create_whois(domain_id, contact).await
    }

    async fn patch_whois(&self, domain_id: &str, patch: &WhoisPatch) -> Result<()> {
        self.inner.patch_whois(domain_id, patch).await
    }

    async fn create_ssl(&self, domain_id: &str, certificate: &SslCertificate) -> Result<()> {
        if self.fail_ssl_writes.load(Ordering::SeqCst) {
            return Err(Error::gateway("injected ssl write failure"));
        }
        self.inner.create_ssl(domain_id, certificate).await
    }

    async fn patch_ssl(&self, domain_id: &str, patch: &SslPatch) -> Result<()> {
        if self.fail_ssl_writes.load(Ordering::SeqCst) {
            return Err(Error::gateway("injected ssl write failure"));
        }
        self.inner.patch_ssl(domain_id, patch).await
    }

    async fn add_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.inner.add_dns_record(domain_id, entry).await
    }

    async fn remove_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.inner.remove_dns_record(domain_id, entry).await
    }

    async fn append_change_event(&self, event: &ChangeEvent) -> Result<u64> {
        self.append_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_append_event.load(Ordering::SeqCst) {
            return Err(Error::gateway("injected append failure"));
        }
        self.inner.append_change_event(event).await
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<u64> {
        self.inner.insert_notification(notification).await
    }

    async fn track_domain(&self, record: &DomainRecord) -> Result<()> {
        self.inner.track_domain(record).await
    }

    async fn set_notification_preference(
        &self,
        preference: &NotificationPreference,
    ) -> Result<()> {
        self.inner.set_notification_preference(preference).await
    }

    async fn flush(&self) -> Result<()> {
        self.inner.flush().await
    }
}

/// Build an engine over the given doubles with test-friendly settings
pub fn engine_with(
    resolver: Arc<dyn SnapshotResolver>,
    gateway: Arc<dyn DomainGateway>,
) -> ReconcileEngine {
    let config = EngineConfig {
        fetch_timeout_secs: 5,
        ..EngineConfig::default()
    };
    let (engine, _event_rx) = ReconcileEngine::new(resolver, gateway, config)
        .expect("engine construction succeeds");
    engine
}

/// A snapshot that matches an empty stored record (nothing to report)
pub fn blank_snapshot(domain_name: &str) -> LiveSnapshot {
    LiveSnapshot::new(domain_name)
}
