//! Field comparators
//!
//! One comparator per category: Expiry, Registrar, Statuses, Whois, Ssl,
//! Dns. Each is a pure function over the stored record and the live
//! snapshot, producing matched change events and persistence mutations.
//!
//! ## Contract
//!
//! `compare(stored, live, cfg) -> Result<CategoryDiff>`
//!
//! Comparators perform no I/O. A comparator that cannot make sense of its
//! input returns `Err`; the reconciler, not the comparator, converts
//! that into a textual note and continues with the remaining categories,
//! so the continue-on-failure policy is visible in the type signature.
//!
//! ## Events and mutations never diverge
//!
//! A mutation is only ever produced together with the change event that
//! justifies it: the audit log and the stored state move in lockstep. For
//! the multi-field categories (Whois, Ssl) several subfield events batch
//! into one patch mutation; for the set categories (Statuses, Dns) each
//! added/removed element is its own event/mutation pair.

mod dns;
mod expiry;
mod registrar;
mod ssl;
mod statuses;
mod whois;

use crate::error::Result;
use crate::model::{CategoryKind, ChangeEvent, DomainRecord, FieldMutation, LiveSnapshot};

/// Comparator inputs derived from the engine configuration
#[derive(Debug, Clone, Copy)]
pub struct CompareConfig {
    /// Day-granularity tolerance for expiry drift
    pub expiry_tolerance_days: i64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            expiry_tolerance_days: 7,
        }
    }
}

/// Output of one comparator pass over one category
#[derive(Debug, Default)]
pub struct CategoryDiff {
    /// Change events to append to the audit log
    pub events: Vec<ChangeEvent>,
    /// Persistence mutations justified by those events
    pub mutations: Vec<FieldMutation>,
}

impl CategoryDiff {
    /// An empty diff (nothing changed)
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the comparator found no difference
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.mutations.is_empty()
    }

    /// Push a matched event/mutation pair
    pub fn push(&mut self, event: ChangeEvent, mutation: FieldMutation) {
        self.events.push(event);
        self.mutations.push(mutation);
    }
}

/// Run the comparator for one category
///
/// The closed dispatch table: every category maps to exactly one
/// comparator function, checked at compile time.
pub fn compare_category(
    kind: CategoryKind,
    stored: &DomainRecord,
    live: &LiveSnapshot,
    cfg: &CompareConfig,
) -> Result<CategoryDiff> {
    match kind {
        CategoryKind::Expiry => expiry::compare(stored, live, cfg),
        CategoryKind::Registrar => registrar::compare(stored, live),
        CategoryKind::Status => statuses::compare(stored, live),
        CategoryKind::Whois => whois::compare(stored, live),
        CategoryKind::Ssl => ssl::compare(stored, live),
        CategoryKind::Dns => dns::compare(stored, live),
    }
}
