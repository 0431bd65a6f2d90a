//! WHOIS contact comparator
//!
//! Field-by-field diff across the contact subfields, each compared via
//! `normalize_str`. If no WHOIS entity is stored yet and the live answer
//! carries any data, the whole record is created under a single "record
//! created" event instead of a per-field diff storm. Otherwise each
//! differing subfield gets its own change event, and all differing
//! subfields batch into one patch mutation.

use super::CategoryDiff;
use crate::error::Result;
use crate::model::{
    Category, ChangeEvent, DomainRecord, FieldMutation, LiveSnapshot, WhoisField, WhoisPatch,
};
use crate::normalize::normalize_str;

pub(super) fn compare(stored: &DomainRecord, live: &LiveSnapshot) -> Result<CategoryDiff> {
    let Some(live_contact) = &live.whois else {
        return Ok(CategoryDiff::empty());
    };

    let mut diff = CategoryDiff::empty();

    let Some(stored_contact) = &stored.whois else {
        if live_contact.is_empty() {
            return Ok(diff);
        }
        let summary = serde_json::to_string(live_contact).unwrap_or_default();
        diff.push(
            ChangeEvent::new(
                &stored.id,
                Category::Whois(None),
                "WHOIS record created",
                "",
                summary,
            ),
            FieldMutation::CreateWhois {
                contact: live_contact.clone(),
            },
        );
        return Ok(diff);
    };

    let mut patch = WhoisPatch::default();
    for field in WhoisField::ALL {
        let old_raw = field.get(stored_contact);
        let new_raw = field.get(live_contact);
        if normalize_str(old_raw) == normalize_str(new_raw) {
            continue;
        }

        diff.events.push(ChangeEvent::new(
            &stored.id,
            Category::Whois(Some(field)),
            format!("WHOIS {} changed", field.label()),
            old_raw.unwrap_or_default(),
            new_raw.unwrap_or_default(),
        ));
        field.stage(&mut patch, new_raw.map(str::to_string));
    }

    if !patch.is_empty() {
        diff.mutations.push(FieldMutation::PatchWhois { patch });
    }

    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WhoisContact;

    fn stored_with(contact: WhoisContact) -> DomainRecord {
        DomainRecord {
            whois: Some(contact),
            ..DomainRecord::new("d1", "example.com")
        }
    }

    fn live_with(contact: WhoisContact) -> LiveSnapshot {
        LiveSnapshot {
            whois: Some(contact),
            ..LiveSnapshot::new("example.com")
        }
    }

    #[test]
    fn case_insensitive_equal_fields_are_silent() {
        let stored = stored_with(WhoisContact {
            city: Some("London".to_string()),
            ..WhoisContact::default()
        });
        let live = live_with(WhoisContact {
            city: Some("london".to_string()),
            ..WhoisContact::default()
        });

        let diff = compare(&stored, &live).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn differing_subfields_each_get_an_event_in_one_patch() {
        let stored = stored_with(WhoisContact {
            city: Some("London".to_string()),
            ..WhoisContact::default()
        });
        let live = live_with(WhoisContact {
            city: Some("london".to_string()),
            country: Some("UK".to_string()),
            ..WhoisContact::default()
        });

        let diff = compare(&stored, &live).unwrap();
        assert_eq!(diff.events.len(), 1);
        assert_eq!(
            diff.events[0].category,
            Category::Whois(Some(WhoisField::Country))
        );
        assert_eq!(diff.events[0].new_value, "UK");

        assert_eq!(diff.mutations.len(), 1);
        let FieldMutation::PatchWhois { patch } = &diff.mutations[0] else {
            panic!("expected PatchWhois");
        };
        assert_eq!(patch.country, Some(Some("UK".to_string())));
        assert!(patch.city.is_none());
    }

    #[test]
    fn missing_stored_record_is_created_with_one_event() {
        let live = live_with(WhoisContact {
            country: Some("UK".to_string()),
            ..WhoisContact::default()
        });

        let diff = compare(&DomainRecord::new("d1", "example.com"), &live).unwrap();
        assert_eq!(diff.events.len(), 1);
        assert_eq!(diff.events[0].category, Category::Whois(None));
        assert_eq!(diff.events[0].description, "WHOIS record created");
        assert!(matches!(
            &diff.mutations[0],
            FieldMutation::CreateWhois { contact } if contact.country.as_deref() == Some("UK")
        ));
    }

    #[test]
    fn empty_live_contact_does_not_create_a_record() {
        let live = live_with(WhoisContact::default());
        let diff = compare(&DomainRecord::new("d1", "example.com"), &live).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn unknown_live_contact_is_skipped() {
        let stored = stored_with(WhoisContact {
            city: Some("London".to_string()),
            ..WhoisContact::default()
        });
        let diff = compare(&stored, &LiveSnapshot::new("example.com")).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn field_cleared_by_live_answer_is_a_change() {
        let stored = stored_with(WhoisContact {
            organization: Some("Acme Ltd".to_string()),
            ..WhoisContact::default()
        });
        let live = live_with(WhoisContact::default());

        let diff = compare(&stored, &live).unwrap();
        assert_eq!(diff.events.len(), 1);
        assert_eq!(diff.events[0].old_value, "Acme Ltd");
        assert_eq!(diff.events[0].new_value, "");
    }
}
