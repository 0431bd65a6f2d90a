//! Expiry date comparator
//!
//! Day-granularity comparison with a configurable tolerance. Registrars
//! render expiry dates in different timezones and formats, so a few days
//! of drift between re-fetches is noise, not a renewal; only drift beyond
//! the tolerance is recorded. A change requires both sides to parse; an
//! unparseable stored or live date never produces an expiry change.

use super::{CategoryDiff, CompareConfig};
use crate::error::Result;
use crate::model::{Category, ChangeEvent, DomainRecord, FieldMutation, LiveSnapshot};
use crate::normalize::{day_delta, normalize_date};

pub(super) fn compare(
    stored: &DomainRecord,
    live: &LiveSnapshot,
    cfg: &CompareConfig,
) -> Result<CategoryDiff> {
    let Some(live_raw) = live.expiry_date.as_deref() else {
        // Resolver didn't know; leave the stored date alone.
        return Ok(CategoryDiff::empty());
    };

    let stored_day = normalize_date(stored.expiry_date.as_deref());
    let live_day = normalize_date(Some(live_raw));

    let mut diff = CategoryDiff::empty();
    if let Some(delta) = day_delta(stored_day, live_day)
        && delta > cfg.expiry_tolerance_days
    {
        let event = ChangeEvent::new(
            &stored.id,
            Category::Expiry,
            "Expiry date changed",
            stored.expiry_date.as_deref().unwrap_or_default(),
            live_raw,
        );
        diff.push(
            event,
            FieldMutation::SetExpiryDate {
                value: Some(live_raw.to_string()),
            },
        );
    }

    Ok(diff)
}
