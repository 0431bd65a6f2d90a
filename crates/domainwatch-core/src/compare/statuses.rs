//! EPP status set comparator
//!
//! Full set reconciliation over normalized status codes: every code in the
//! live set but not stored yields an "added" event and insert, every code
//! stored but not live yields a "removed" event and delete. There is no
//! update-in-place for set elements. Empty codes are filtered from both
//! sides before comparison, and emission order is sorted so run output is
//! deterministic.

use super::CategoryDiff;
use crate::error::Result;
use crate::model::{Category, ChangeEvent, DomainRecord, FieldMutation, LiveSnapshot};
use crate::normalize::normalize_str;
use std::collections::BTreeMap;

/// Normalized-key → raw-form index of a status collection
fn index<'a, I: IntoIterator<Item = &'a str>>(codes: I) -> BTreeMap<String, &'a str> {
    let mut map = BTreeMap::new();
    for raw in codes {
        let key = normalize_str(Some(raw));
        if !key.is_empty() {
            // First occurrence wins; duplicates differing only in case
            // are the same status.
            map.entry(key).or_insert(raw.trim());
        }
    }
    map
}

pub(super) fn compare(stored: &DomainRecord, live: &LiveSnapshot) -> Result<CategoryDiff> {
    let Some(live_codes) = &live.statuses else {
        // Resolver didn't know; an unknown answer must not strip statuses.
        return Ok(CategoryDiff::empty());
    };

    let live_idx = index(live_codes.iter().map(String::as_str));
    let stored_idx = index(stored.statuses.iter().map(String::as_str));

    let mut diff = CategoryDiff::empty();

    for (key, raw) in &live_idx {
        if !stored_idx.contains_key(key) {
            let event = ChangeEvent::new(
                &stored.id,
                Category::Status,
                format!("Status added: {raw}"),
                "",
                *raw,
            );
            diff.push(
                event,
                FieldMutation::AddStatus {
                    code: raw.to_string(),
                },
            );
        }
    }

    for (key, raw) in &stored_idx {
        if !live_idx.contains_key(key) {
            let event = ChangeEvent::new(
                &stored.id,
                Category::Status,
                format!("Status removed: {raw}"),
                *raw,
                "",
            );
            diff.push(
                event,
                FieldMutation::RemoveStatus {
                    code: raw.to_string(),
                },
            );
        }
    }

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_with(codes: &[&str]) -> DomainRecord {
        DomainRecord {
            statuses: codes.iter().map(|s| s.to_string()).collect(),
            ..DomainRecord::new("d1", "example.com")
        }
    }

    fn live_with(codes: &[&str]) -> LiveSnapshot {
        LiveSnapshot {
            statuses: Some(codes.iter().map(|s| s.to_string()).collect()),
            ..LiveSnapshot::new("example.com")
        }
    }

    #[test]
    fn new_status_yields_single_addition() {
        let diff = compare(
            &stored_with(&["clientTransferProhibited"]),
            &live_with(&["clientTransferProhibited", "serverHold"]),
        )
        .unwrap();

        assert_eq!(diff.events.len(), 1);
        assert_eq!(diff.events[0].description, "Status added: serverHold");
        assert_eq!(
            diff.mutations,
            vec![FieldMutation::AddStatus {
                code: "serverHold".to_string()
            }]
        );
    }

    #[test]
    fn emptied_live_set_removes_everything() {
        let diff = compare(&stored_with(&["a", "b"]), &live_with(&[])).unwrap();

        assert_eq!(diff.events.len(), 2);
        assert!(
            diff.events
                .iter()
                .all(|e| e.description.starts_with("Status removed:"))
        );
        assert_eq!(
            diff.mutations,
            vec![
                FieldMutation::RemoveStatus {
                    code: "a".to_string()
                },
                FieldMutation::RemoveStatus {
                    code: "b".to_string()
                },
            ]
        );
    }

    #[test]
    fn unknown_live_set_is_skipped() {
        let diff = compare(&stored_with(&["a", "b"]), &LiveSnapshot::new("example.com")).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let diff = compare(
            &stored_with(&["clientTransferProhibited"]),
            &live_with(&["CLIENTTRANSFERPROHIBITED"]),
        )
        .unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn empty_codes_are_filtered() {
        let diff = compare(&stored_with(&[]), &live_with(&["", "  "])).unwrap();
        assert!(diff.is_empty());
    }
}
