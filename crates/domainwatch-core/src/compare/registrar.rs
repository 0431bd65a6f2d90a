//! Registrar comparator
//!
//! Compares normalized registrar names. A change is recorded only when the
//! live name is non-empty and differs from the stored one; an unknown or
//! empty live name never clears a stored registrar (losing the registrar
//! is almost always a resolver hiccup, not a transfer).

use super::CategoryDiff;
use crate::error::Result;
use crate::model::{Category, ChangeEvent, DomainRecord, FieldMutation, LiveSnapshot};
use crate::normalize::normalize_str;

pub(super) fn compare(stored: &DomainRecord, live: &LiveSnapshot) -> Result<CategoryDiff> {
    let live_norm = normalize_str(live.registrar_name.as_deref());
    if live_norm.is_empty() {
        return Ok(CategoryDiff::empty());
    }

    let stored_name = stored.registrar.as_ref().map(|r| r.name.as_str());
    let stored_norm = normalize_str(stored_name);

    let mut diff = CategoryDiff::empty();
    if live_norm != stored_norm {
        // Keep the resolver's casing for display; the normalized form is
        // only the comparison key.
        let live_raw = live.registrar_name.as_deref().unwrap_or_default().trim();
        let event = ChangeEvent::new(
            &stored.id,
            Category::Registrar,
            "Registrar changed",
            stored_name.unwrap_or_default(),
            live_raw,
        );
        diff.push(
            event,
            FieldMutation::UpsertRegistrar {
                name: live_raw.to_string(),
                url: live.registrar_url.clone(),
            },
        );
    }

    Ok(diff)
}
