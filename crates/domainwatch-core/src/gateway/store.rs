//! Shared in-memory store state
//!
//! The synchronous heart of both bundled gateways: plain maps and vectors
//! holding domain records, registrars, the append-only change log,
//! notifications, and preferences. Locking and durability are the
//! gateways' concern; this type only implements the row operations.

use crate::error::{Error, Result};
use crate::model::{
    CategoryKind, ChangeEvent, DnsEntry, DomainRecord, Notification, NotificationPreference,
    Registrar, SslCertificate, SslPatch, WhoisContact, WhoisPatch,
};
use crate::normalize::normalize_str;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    /// Tracked domains by id
    domains: HashMap<String, DomainRecord>,
    /// Known registrar entities (reuse key: normalized name)
    registrars: Vec<Registrar>,
    /// Append-only change log; an event's id is its 1-based position
    events: Vec<ChangeEvent>,
    /// Notifications in creation order
    notifications: Vec<Notification>,
    /// Per-domain, per-category notification switches
    preferences: Vec<NotificationPreference>,
}

impl StoreState {
    fn domain_mut(&mut self, domain_id: &str) -> Result<&mut DomainRecord> {
        self.domains
            .get_mut(domain_id)
            .ok_or_else(|| Error::not_found(domain_id))
    }

    pub fn get_domain(&self, domain_id: &str) -> Option<DomainRecord> {
        self.domains.get(domain_id).cloned()
    }

    pub fn list_domains(&self) -> Vec<DomainRecord> {
        let mut domains: Vec<_> = self.domains.values().cloned().collect();
        domains.sort_by(|a, b| a.domain_name.cmp(&b.domain_name));
        domains
    }

    pub fn track_domain(&mut self, record: &DomainRecord) {
        self.domains.insert(record.id.clone(), record.clone());
    }

    pub fn set_expiry_date(&mut self, domain_id: &str, value: Option<String>) -> Result<()> {
        self.domain_mut(domain_id)?.expiry_date = value;
        Ok(())
    }

    /// Reuse an existing registrar entity by normalized name, or create one
    pub fn upsert_registrar(
        &mut self,
        domain_id: &str,
        name: &str,
        url: Option<&str>,
    ) -> Result<()> {
        let key = normalize_str(Some(name));
        let registrar = match self
            .registrars
            .iter()
            .find(|r| normalize_str(Some(&r.name)) == key)
        {
            Some(existing) => existing.clone(),
            None => {
                let created = Registrar {
                    name: name.to_string(),
                    url: url.map(str::to_string),
                };
                self.registrars.push(created.clone());
                created
            }
        };
        self.domain_mut(domain_id)?.registrar = Some(registrar);
        Ok(())
    }

    pub fn add_status(&mut self, domain_id: &str, code: &str) -> Result<()> {
        self.domain_mut(domain_id)?.statuses.insert(code.to_string());
        Ok(())
    }

    pub fn remove_status(&mut self, domain_id: &str, code: &str) -> Result<()> {
        self.domain_mut(domain_id)?.statuses.remove(code);
        Ok(())
    }

    pub fn create_whois(&mut self, domain_id: &str, contact: &WhoisContact) -> Result<()> {
        self.domain_mut(domain_id)?.whois = Some(contact.clone());
        Ok(())
    }

    pub fn patch_whois(&mut self, domain_id: &str, patch: &WhoisPatch) -> Result<()> {
        let record = self.domain_mut(domain_id)?;
        let contact = record
            .whois
            .as_mut()
            .ok_or_else(|| Error::gateway(format!("no whois record for domain {domain_id}")))?;
        patch.apply(contact);
        Ok(())
    }

    pub fn create_ssl(&mut self, domain_id: &str, certificate: &SslCertificate) -> Result<()> {
        self.domain_mut(domain_id)?.ssl = Some(certificate.clone());
        Ok(())
    }

    pub fn patch_ssl(&mut self, domain_id: &str, patch: &SslPatch) -> Result<()> {
        let record = self.domain_mut(domain_id)?;
        let cert = record
            .ssl
            .as_mut()
            .ok_or_else(|| Error::gateway(format!("no ssl record for domain {domain_id}")))?;
        patch.apply(cert);
        Ok(())
    }

    pub fn add_dns_record(&mut self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        let record = self.domain_mut(domain_id)?;
        if !record.dns.contains(entry) {
            record.dns.push(entry.clone());
        }
        Ok(())
    }

    pub fn remove_dns_record(&mut self, domain_id: &str, entry: &DnsEntry) -> Result<()> {
        self.domain_mut(domain_id)?.dns.retain(|e| e != entry);
        Ok(())
    }

    pub fn append_event(&mut self, event: &ChangeEvent) -> u64 {
        self.events.push(event.clone());
        self.events.len() as u64
    }

    pub fn list_events(&self, domain_id: &str) -> Vec<ChangeEvent> {
        self.events
            .iter()
            .filter(|e| e.domain_id == domain_id)
            .cloned()
            .collect()
    }

    pub fn insert_notification(&mut self, notification: &Notification) -> u64 {
        self.notifications.push(notification.clone());
        self.notifications.len() as u64
    }

    pub fn list_notifications(&self, domain_id: &str) -> Vec<Notification> {
        self.notifications
            .iter()
            .filter(|n| n.domain_id == domain_id)
            .cloned()
            .collect()
    }

    pub fn get_preference(
        &self,
        domain_id: &str,
        category: CategoryKind,
    ) -> Option<NotificationPreference> {
        self.preferences
            .iter()
            .find(|p| p.domain_id == domain_id && p.category == category)
            .cloned()
    }

    pub fn set_preference(&mut self, preference: &NotificationPreference) {
        match self
            .preferences
            .iter_mut()
            .find(|p| p.domain_id == preference.domain_id && p.category == preference.category)
        {
            Some(existing) => *existing = preference.clone(),
            None => self.preferences.push(preference.clone()),
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}
