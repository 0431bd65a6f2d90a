// # File Gateway
//
// File-backed implementation of DomainGateway with crash recovery.
//
// ## Purpose
//
// Persists all tracked state (domains, change log, notifications,
// preferences) across daemon restarts, keeping the idempotence property:
// a restart followed by a run over an unchanged snapshot records nothing.
//
// ## Crash Recovery
//
// - Atomic writes: new state goes to a temp file, then a rename
// - Automatic backup: the last known good state is kept in `.backup`
// - Corruption detection: JSON validation on load, fallback to backup,
//   then to empty state
//
// ## File Format
//
// One versioned JSON document holding the whole `StoreState`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::store::StoreState;
use crate::error::{Error, Result};
use crate::model::{
    CategoryKind, ChangeEvent, DnsEntry, DomainRecord, Notification, NotificationPreference,
    SslCertificate, SslPatch, WhoisContact, WhoisPatch,
};
use crate::traits::DomainGateway;

/// State file format version, for future migrations
const STATE_FILE_VERSION: &str = "1.0";

/// Serializable on-disk format
#[derive(Debug, Serialize, Deserialize)]
struct StateFileFormat {
    version: String,
    state: StoreState,
}

#[derive(Debug)]
struct FileState {
    store: StoreState,
    dirty: bool,
}

/// File-backed gateway with atomic persistence
///
/// Every write is persisted immediately (write-temp-then-rename); `flush`
/// only has work to do if an earlier persist failed and left the state
/// dirty.
#[derive(Debug, Clone)]
pub struct FileGateway {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

impl FileGateway {
    /// Create or load a file gateway
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::gateway(format!(
                    "failed to create state directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let store = Self::load_with_recovery(&path).await;

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                store,
                dirty: false,
            })),
        })
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut p = path.as_os_str().to_owned();
        p.push(".backup");
        PathBuf::from(p)
    }

    fn temp_path(path: &Path) -> PathBuf {
        let mut p = path.as_os_str().to_owned();
        p.push(".tmp");
        PathBuf::from(p)
    }

    /// Load state, falling back to the backup, then to empty
    async fn load_with_recovery(path: &Path) -> StoreState {
        match Self::load(path).await {
            Ok(store) => store,
            Err(e) => {
                warn!("state file unreadable: {e}. attempting backup recovery");
                let backup = Self::backup_path(path);
                match Self::load(&backup).await {
                    Ok(store) => {
                        debug!("recovered state from backup {}", backup.display());
                        store
                    }
                    Err(backup_err) => {
                        warn!("backup also unreadable: {backup_err}. starting empty");
                        StoreState::default()
                    }
                }
            }
        }
    }

    async fn load(path: &Path) -> Result<StoreState> {
        if !path.exists() {
            debug!("state file does not exist: {}", path.display());
            return Ok(StoreState::default());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::gateway(format!("failed to read {}: {}", path.display(), e)))?;

        let format: StateFileFormat = serde_json::from_str(&content)
            .map_err(|e| Error::gateway(format!("failed to parse {}: {}", path.display(), e)))?;

        if format.version != STATE_FILE_VERSION {
            warn!(
                "state file version mismatch: expected {}, got {}. loading anyway",
                STATE_FILE_VERSION, format.version
            );
        }

        Ok(format.state)
    }

    /// Write the given state atomically
    ///
    /// The caller must hold the state write lock for the whole call:
    /// concurrent persists share one temp path, so an unserialized pair
    /// would truncate each other's temp file and race the rename.
    async fn persist_locked(path: &Path, state: &mut FileState) -> Result<()> {
        let format = StateFileFormat {
            version: STATE_FILE_VERSION.to_string(),
            state: state.store.clone(),
        };
        let json = serde_json::to_string_pretty(&format)?;

        let temp = Self::temp_path(path);
        {
            let mut file = fs::File::create(&temp).await.map_err(|e| {
                Error::gateway(format!("failed to create {}: {}", temp.display(), e))
            })?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::gateway(format!("failed to write {}: {}", temp.display(), e))
            })?;
            file.flush().await.map_err(|e| {
                Error::gateway(format!("failed to flush {}: {}", temp.display(), e))
            })?;
        }

        // Keep the last known good state around before replacing it.
        if path.exists()
            && let Err(e) = fs::copy(path, Self::backup_path(path)).await
        {
            warn!("failed to create backup: {e}");
        }

        fs::rename(&temp, path).await.map_err(|e| {
            Error::gateway(format!(
                "failed to rename {} to {}: {}",
                temp.display(),
                path.display(),
                e
            ))
        })?;

        state.dirty = false;
        Ok(())
    }

    /// Run a mutation against the store and persist the result
    ///
    /// The write lock is held across mutation and persistence, so writes
    /// to disjoint rows from concurrent tasks serialize cleanly.
    async fn with_write<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut guard = self.state.write().await;
        let out = f(&mut guard.store)?;
        guard.dirty = true;
        Self::persist_locked(&self.path, &mut guard).await?;
        Ok(out)
    }
}

#[async_trait]
impl DomainGateway for FileGateway {
    async fn get_domain(&self, domain_id: &str) -> Result<Option<DomainRecord>> {
        Ok(self.state.read().await.store.get_domain(domain_id))
    }

    async fn list_tracked_domains(&self) -> Result<Vec<DomainRecord>> {
        Ok(self.state.read().await.store.list_domains())
    }

    async fn get_notification_preference(
        &self,
        domain_id: &str,
        category: CategoryKind,
    ) -> Result<Option<NotificationPreference>> {
        Ok(self
            .state
            .read()
            .await
            .store
            .get_preference(domain_id, category))
    }

    async fn list_change_events(&self, domain_id: &str) -> Result<Vec<ChangeEvent>> {
        Ok(self.state.read().await.store.list_events(domain_id))
    }

    async fn list_notifications(&self, domain_id: &str) -> Result<Vec<Notification>> {
        Ok(self.state.read().await.store.list_notifications(domain_id))
    }

    async fn set_expiry_date(&self, domain_id: &str, value: Option<String>) -> Result<()> {
        self.with_write(|s| s.set_expiry_date(domain_id, value))
            .await
    }

    async fn upsert_registrar(
        &self,
        domain_id: &str,
        name: &str,
        url: Option<&str>,
    ) -> Result<()> {
        self.with_write(|s| s.upsert_registrar(domain_id, name, url))
            .await
    }

    async fn add_status(&self, domain_id: &str, code: &str) -> Result<()> {
        self.with_write(|s| s.add_status(domain_id, code)).await
    }

    async fn remove_status(&self, domain_id: &str, code: &str) -> Result<()> {
        self.with_write(|s| s.remove_status(domain_id, code)).await
    }

    async fn create_whois(&self, domain_id: &str, contact: &WhoisContact) -> Result<()> {
        self.with_write(|s| s.create_whois(domain_id, contact))
            .await
    }

    async fn patch_whois(&self, domain_id: &str, patch: &WhoisPatch) -> Result<()> {
        self.with_write(|s| s.patch_whois(domain_id, patch)).await
    }

    async fn create_ssl(&self, domain_id: &str, certificate: &SslCertificate) -> Result<()> {
        self.with_write(|s| s.create_ssl(domain_id, certificate))
            .await
    }

    async fn patch_ssl(&self, domain_id: &str, patch: &SslPatch) -> Result<()> {
        self.with_write(|s| s.patch_ssl(domain_id, patch)).await
    }

    async fn add_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.with_write(|s| s.add_dns_record(domain_id, entry))
            .await
    }

    async fn remove_dns_record(&self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.with_write(|s| s.remove_dns_record(domain_id, entry))
            .await
    }

    async fn append_change_event(&self, event: &ChangeEvent) -> Result<u64> {
        self.with_write(|s| Ok(s.append_event(event))).await
    }

    async fn insert_notification(&self, notification: &Notification) -> Result<u64> {
        self.with_write(|s| Ok(s.insert_notification(notification)))
            .await
    }

    async fn track_domain(&self, record: &DomainRecord) -> Result<()> {
        self.with_write(|s| {
            s.track_domain(record);
            Ok(())
        })
        .await
    }

    async fn set_notification_preference(
        &self,
        preference: &NotificationPreference,
    ) -> Result<()> {
        self.with_write(|s| {
            s.set_preference(preference);
            Ok(())
        })
        .await
    }

    async fn flush(&self) -> Result<()> {
        let mut guard = self.state.write().await;
        if guard.dirty {
            Self::persist_locked(&self.path, &mut guard).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let gateway = FileGateway::new(&path).await.unwrap();
            gateway
                .track_domain(&DomainRecord::new("d1", "example.com"))
                .await
                .unwrap();
            gateway.add_status("d1", "serverHold").await.unwrap();
        }

        let reopened = FileGateway::new(&path).await.unwrap();
        let domain = reopened.get_domain("d1").await.unwrap().unwrap();
        assert!(domain.statuses.contains("serverHold"));
    }

    #[tokio::test]
    async fn test_corrupted_file_falls_back_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let gateway = FileGateway::new(&path).await.unwrap();
        assert!(gateway.list_tracked_domains().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_disjoint_domains() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let gateway = FileGateway::new(&path).await.unwrap();
        for i in 0..8 {
            gateway
                .track_domain(&DomainRecord::new(format!("d{i}"), format!("domain{i}.com")))
                .await
                .unwrap();
        }

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..8 {
            let gateway = gateway.clone();
            tasks.spawn(async move {
                for j in 0..25 {
                    gateway
                        .add_status(&format!("d{i}"), &format!("status{j}"))
                        .await?;
                }
                Ok::<(), crate::Error>(())
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let reopened = FileGateway::new(&path).await.unwrap();
        for i in 0..8 {
            let domain = reopened
                .get_domain(&format!("d{i}"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(domain.statuses.len(), 25, "domain d{i} lost writes");
        }
    }

    #[tokio::test]
    async fn test_backup_recovers_corrupted_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let gateway = FileGateway::new(&path).await.unwrap();
            gateway
                .track_domain(&DomainRecord::new("d1", "example.com"))
                .await
                .unwrap();
            // Second write creates the backup of the first good state.
            gateway.add_status("d1", "ok").await.unwrap();
        }

        tokio::fs::write(&path, "{corrupted").await.unwrap();

        let recovered = FileGateway::new(&path).await.unwrap();
        assert!(recovered.get_domain("d1").await.unwrap().is_some());
    }
}
