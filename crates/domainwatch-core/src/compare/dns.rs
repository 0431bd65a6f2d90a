//! DNS record set comparator
//!
//! Flattens the live snapshot into `(record_type, value)` pairs (the
//! DNSSEC status rides along as a singleton pseudo-record-type), then runs
//! the same set reconciliation as the status comparator: additions and
//! removals each emit one event and one row mutation. Record types compare
//! case-insensitively; values compare via `normalize_str`.

use super::CategoryDiff;
use crate::error::Result;
use crate::model::{Category, ChangeEvent, DnsEntry, DomainRecord, FieldMutation, LiveSnapshot};
use crate::normalize::normalize_str;
use std::collections::BTreeMap;

/// Normalized comparison key for one DNS row
fn key(entry: &DnsEntry) -> (String, String) {
    (
        entry.record_type.trim().to_lowercase(),
        normalize_str(Some(&entry.value)),
    )
}

/// Normalized-key → canonical-row index, empty values filtered
fn index<I: IntoIterator<Item = DnsEntry>>(entries: I) -> BTreeMap<(String, String), DnsEntry> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let k = key(&entry);
        if !k.1.is_empty() {
            map.entry(k).or_insert(entry);
        }
    }
    map
}

/// Flatten a live snapshot's grouped answers into rows
fn flatten(live: &crate::model::DnsSnapshot) -> Vec<DnsEntry> {
    let mut rows = Vec::new();
    for value in &live.ns {
        rows.push(DnsEntry::new("NS", value.trim()));
    }
    for value in &live.mx {
        rows.push(DnsEntry::new("MX", value.trim()));
    }
    for value in &live.txt {
        rows.push(DnsEntry::new("TXT", value.trim()));
    }
    if let Some(status) = &live.dnssec {
        rows.push(DnsEntry::new(DnsEntry::DNSSEC_TYPE, status.trim()));
    }
    rows
}

pub(super) fn compare(stored: &DomainRecord, live: &LiveSnapshot) -> Result<CategoryDiff> {
    let Some(live_dns) = &live.dns else {
        // Resolver didn't know; an unknown answer must not delete rows.
        return Ok(CategoryDiff::empty());
    };

    let live_idx = index(flatten(live_dns));
    let stored_idx = index(stored.dns.iter().cloned());

    let mut diff = CategoryDiff::empty();

    for (k, entry) in &live_idx {
        if !stored_idx.contains_key(k) {
            let event = ChangeEvent::new(
                &stored.id,
                Category::Dns,
                format!("DNS record added: {} {}", entry.record_type, entry.value),
                "",
                format!("{} {}", entry.record_type, entry.value),
            );
            diff.push(
                event,
                FieldMutation::AddDnsRecord {
                    entry: entry.clone(),
                },
            );
        }
    }

    for (k, entry) in &stored_idx {
        if !live_idx.contains_key(k) {
            let event = ChangeEvent::new(
                &stored.id,
                Category::Dns,
                format!("DNS record removed: {} {}", entry.record_type, entry.value),
                format!("{} {}", entry.record_type, entry.value),
                "",
            );
            diff.push(
                event,
                FieldMutation::RemoveDnsRecord {
                    entry: entry.clone(),
                },
            );
        }
    }

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DnsSnapshot;

    fn stored_with(entries: &[(&str, &str)]) -> DomainRecord {
        DomainRecord {
            dns: entries
                .iter()
                .map(|(t, v)| DnsEntry::new(*t, *v))
                .collect(),
            ..DomainRecord::new("d1", "example.com")
        }
    }

    fn live_with(dns: DnsSnapshot) -> LiveSnapshot {
        LiveSnapshot {
            dns: Some(dns),
            ..LiveSnapshot::new("example.com")
        }
    }

    #[test]
    fn new_nameserver_yields_single_addition() {
        let stored = stored_with(&[("NS", "ns1.example.com")]);
        let live = live_with(DnsSnapshot {
            ns: vec!["ns1.example.com".to_string(), "ns2.example.com".to_string()],
            ..DnsSnapshot::default()
        });

        let diff = compare(&stored, &live).unwrap();
        assert_eq!(diff.events.len(), 1);
        assert_eq!(
            diff.events[0].description,
            "DNS record added: NS ns2.example.com"
        );
        assert_eq!(
            diff.mutations,
            vec![FieldMutation::AddDnsRecord {
                entry: DnsEntry::new("NS", "ns2.example.com")
            }]
        );
    }

    #[test]
    fn value_comparison_is_case_insensitive() {
        let stored = stored_with(&[("NS", "NS1.Example.COM")]);
        let live = live_with(DnsSnapshot {
            ns: vec!["ns1.example.com".to_string()],
            ..DnsSnapshot::default()
        });

        let diff = compare(&stored, &live).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn dnssec_status_is_a_singleton_row() {
        let stored = stored_with(&[("DNSSEC", "unsigned")]);
        let live = live_with(DnsSnapshot {
            dnssec: Some("signed".to_string()),
            ..DnsSnapshot::default()
        });

        let diff = compare(&stored, &live).unwrap();
        // Old status removed, new status added.
        assert_eq!(diff.events.len(), 2);
        assert!(
            diff.events
                .iter()
                .any(|e| e.description == "DNS record added: DNSSEC signed")
        );
        assert!(
            diff.events
                .iter()
                .any(|e| e.description == "DNS record removed: DNSSEC unsigned")
        );
    }

    #[test]
    fn vanished_records_are_removed() {
        let stored = stored_with(&[("MX", "10 mail.example.com"), ("TXT", "v=spf1 -all")]);
        let live = live_with(DnsSnapshot::default());

        let diff = compare(&stored, &live).unwrap();
        assert_eq!(diff.events.len(), 2);
        assert!(
            diff.mutations
                .iter()
                .all(|m| matches!(m, FieldMutation::RemoveDnsRecord { .. }))
        );
    }

    #[test]
    fn unknown_live_dns_is_skipped() {
        let stored = stored_with(&[("NS", "ns1.example.com")]);
        let diff = compare(&stored, &LiveSnapshot::new("example.com")).unwrap();
        assert!(diff.is_empty());
    }
}
