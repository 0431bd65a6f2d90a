//! Data model for the reconciliation engine
//!
//! This module defines the stored domain record, the live snapshot shape
//! produced by resolvers, the append-only change event, and the closed set
//! of persistence mutations a comparator may request.
//!
//! ## Stored vs live
//!
//! [`DomainRecord`] is owned by the persistence gateway and partially
//! overwritten by the reconciler. [`LiveSnapshot`] is the freshly resolved
//! external view; it is read-only input and exists only for the duration of
//! one reconciliation pass.
//!
//! Date-like fields are carried as the raw strings the resolver produced.
//! WHOIS and TLS sources are stringly and frequently malformed; parsing is
//! owned by the normalizer, not the model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stored state for a tracked domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Opaque identifier assigned by the gateway
    pub id: String,
    /// Fully qualified domain name
    pub domain_name: String,
    /// Raw expiry date string as last resolved (None until first known)
    pub expiry_date: Option<String>,
    /// Current registrar reference
    pub registrar: Option<Registrar>,
    /// EPP status codes currently on the domain
    pub statuses: BTreeSet<String>,
    /// WHOIS contact entity, if one has been recorded
    pub whois: Option<WhoisContact>,
    /// SSL certificate entity, if one has been recorded
    pub ssl: Option<SslCertificate>,
    /// DNS record rows (NS/MX/TXT plus the DNSSEC singleton)
    pub dns: Vec<DnsEntry>,
}

impl DomainRecord {
    /// Create a new tracked domain with empty state
    pub fn new(id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_name: domain_name.into(),
            ..Self::default()
        }
    }
}

/// Registrar entity reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrar {
    /// Registrar display name (the upsert key)
    pub name: String,
    /// Registrar homepage, when known
    pub url: Option<String>,
}

/// WHOIS contact fields, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisContact {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl WhoisContact {
    /// True when every field is absent or empty
    pub fn is_empty(&self) -> bool {
        WhoisField::ALL
            .iter()
            .all(|f| f.get(self).is_none_or(|v| v.trim().is_empty()))
    }
}

/// SSL certificate attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SslCertificate {
    pub issuer: Option<String>,
    pub issuer_country: Option<String>,
    pub subject: Option<String>,
    /// Raw notBefore string from the certificate
    pub valid_from: Option<String>,
    /// Raw notAfter string from the certificate
    pub valid_to: Option<String>,
    pub fingerprint: Option<String>,
    pub key_size: Option<u32>,
    pub signature_algorithm: Option<String>,
}

impl SslCertificate {
    /// True when every attribute is absent or empty
    pub fn is_empty(&self) -> bool {
        self.key_size.is_none()
            && [
                &self.issuer,
                &self.issuer_country,
                &self.subject,
                &self.valid_from,
                &self.valid_to,
                &self.fingerprint,
                &self.signature_algorithm,
            ]
            .iter()
            .all(|v| v.as_deref().is_none_or(|s| s.trim().is_empty()))
    }
}

/// One DNS record row: `(record_type, value)`
///
/// The DNSSEC status is stored as a singleton row with record type
/// [`DnsEntry::DNSSEC_TYPE`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DnsEntry {
    /// Record type: "NS", "MX", "TXT", or the DNSSEC pseudo-type
    pub record_type: String,
    /// Record value as resolved
    pub value: String,
}

impl DnsEntry {
    /// Pseudo record type carrying the DNSSEC status
    pub const DNSSEC_TYPE: &'static str = "DNSSEC";

    /// Create a DNS entry
    pub fn new(record_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            record_type: record_type.into(),
            value: value.into(),
        }
    }
}

/// Freshly resolved external view of a domain
///
/// Shaped like the comparable subset of [`DomainRecord`], with one extra
/// rule: `None` at the top level of a category means the resolver did not
/// know (the category is skipped entirely), while `Some` with empty content
/// means the resolver answered "nothing there" (removals are real). This
/// lets comparators distinguish a failed lookup from a genuinely empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveSnapshot {
    /// Domain this snapshot describes
    pub domain_name: String,
    /// Raw expiry date string, if resolved
    pub expiry_date: Option<String>,
    /// Registrar name, if resolved
    pub registrar_name: Option<String>,
    /// Registrar URL, if resolved alongside the name
    pub registrar_url: Option<String>,
    /// EPP status codes; `None` = unknown, `Some(vec![])` = none set
    pub statuses: Option<Vec<String>>,
    /// WHOIS contact, if resolved
    pub whois: Option<WhoisContact>,
    /// Certificate attributes, if a TLS probe succeeded
    pub ssl: Option<SslCertificate>,
    /// DNS answers, if resolved
    pub dns: Option<DnsSnapshot>,
}

impl LiveSnapshot {
    /// Create an empty (all-unknown) snapshot for a domain
    pub fn new(domain_name: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            ..Self::default()
        }
    }
}

/// DNS answers grouped by record type, as resolvers produce them
///
/// The Dns comparator flattens this into `(record_type, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DnsSnapshot {
    pub ns: Vec<String>,
    pub mx: Vec<String>,
    pub txt: Vec<String>,
    /// DNSSEC status flag (e.g. "signed", "unsigned")
    pub dnssec: Option<String>,
}

/// WHOIS subfield identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhoisField {
    Name,
    Organization,
    Street,
    City,
    State,
    PostalCode,
    Country,
}

impl WhoisField {
    /// All WHOIS subfields, in diff order
    pub const ALL: [WhoisField; 7] = [
        WhoisField::Name,
        WhoisField::Organization,
        WhoisField::Street,
        WhoisField::City,
        WhoisField::State,
        WhoisField::PostalCode,
        WhoisField::Country,
    ];

    /// Human-readable subfield label
    pub fn label(&self) -> &'static str {
        match self {
            WhoisField::Name => "name",
            WhoisField::Organization => "organization",
            WhoisField::Street => "street",
            WhoisField::City => "city",
            WhoisField::State => "state",
            WhoisField::PostalCode => "postal_code",
            WhoisField::Country => "country",
        }
    }

    /// Read this subfield from a contact
    pub fn get<'a>(&self, contact: &'a WhoisContact) -> Option<&'a str> {
        let field = match self {
            WhoisField::Name => &contact.name,
            WhoisField::Organization => &contact.organization,
            WhoisField::Street => &contact.street,
            WhoisField::City => &contact.city,
            WhoisField::State => &contact.state,
            WhoisField::PostalCode => &contact.postal_code,
            WhoisField::Country => &contact.country,
        };
        field.as_deref()
    }

    /// Stage this subfield into a patch
    pub fn stage(&self, patch: &mut WhoisPatch, value: Option<String>) {
        let slot = match self {
            WhoisField::Name => &mut patch.name,
            WhoisField::Organization => &mut patch.organization,
            WhoisField::Street => &mut patch.street,
            WhoisField::City => &mut patch.city,
            WhoisField::State => &mut patch.state,
            WhoisField::PostalCode => &mut patch.postal_code,
            WhoisField::Country => &mut patch.country,
        };
        *slot = Some(value);
    }
}

/// SSL subfield identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslField {
    Issuer,
    IssuerCountry,
    Subject,
    ValidFrom,
    ValidTo,
    Fingerprint,
    KeySize,
    SignatureAlgorithm,
}

impl SslField {
    /// All SSL subfields, in diff order
    pub const ALL: [SslField; 8] = [
        SslField::Issuer,
        SslField::IssuerCountry,
        SslField::Subject,
        SslField::ValidFrom,
        SslField::ValidTo,
        SslField::Fingerprint,
        SslField::KeySize,
        SslField::SignatureAlgorithm,
    ];

    /// Human-readable subfield label
    pub fn label(&self) -> &'static str {
        match self {
            SslField::Issuer => "issuer",
            SslField::IssuerCountry => "issuer_country",
            SslField::Subject => "subject",
            SslField::ValidFrom => "valid_from",
            SslField::ValidTo => "valid_to",
            SslField::Fingerprint => "fingerprint",
            SslField::KeySize => "key_size",
            SslField::SignatureAlgorithm => "signature_algorithm",
        }
    }

    /// Subfields compared at day granularity
    pub fn is_date(&self) -> bool {
        matches!(self, SslField::ValidFrom | SslField::ValidTo)
    }
}

/// Change category, one variant per comparator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Expiry,
    Registrar,
    Status,
    /// WHOIS change; `None` marks whole-record creation
    Whois(Option<WhoisField>),
    /// SSL change; `None` marks whole-record creation
    Ssl(Option<SslField>),
    Dns,
}

impl Category {
    /// Subfield-free projection, used to key notification preferences
    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::Expiry => CategoryKind::Expiry,
            Category::Registrar => CategoryKind::Registrar,
            Category::Status => CategoryKind::Status,
            Category::Whois(_) => CategoryKind::Whois,
            Category::Ssl(_) => CategoryKind::Ssl,
            Category::Dns => CategoryKind::Dns,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Expiry => write!(f, "expiry"),
            Category::Registrar => write!(f, "registrar"),
            Category::Status => write!(f, "status"),
            Category::Whois(Some(field)) => write!(f, "whois.{}", field.label()),
            Category::Whois(None) => write!(f, "whois"),
            Category::Ssl(Some(field)) => write!(f, "ssl.{}", field.label()),
            Category::Ssl(None) => write!(f, "ssl"),
            Category::Dns => write!(f, "dns"),
        }
    }
}

/// Change category without subfield detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Expiry,
    Registrar,
    Status,
    Whois,
    Ssl,
    Dns,
}

impl CategoryKind {
    /// The six reconciled categories, in the order comparators run
    pub const ALL: [CategoryKind; 6] = [
        CategoryKind::Expiry,
        CategoryKind::Registrar,
        CategoryKind::Status,
        CategoryKind::Whois,
        CategoryKind::Ssl,
        CategoryKind::Dns,
    ];

    /// Lowercase name used in error notes and logs
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Expiry => "expiry",
            CategoryKind::Registrar => "registrar",
            CategoryKind::Status => "status",
            CategoryKind::Whois => "whois",
            CategoryKind::Ssl => "ssl",
            CategoryKind::Dns => "dns",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable audit record of one detected change
///
/// Created only by field comparators (via the history recorder) when a real
/// difference beyond the field's tolerance was found. Never mutated or
/// deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Tracked domain this change belongs to
    pub domain_id: String,
    /// Change category (with subfield where applicable)
    pub category: Category,
    /// Human-readable description, e.g. "Status added: serverHold"
    pub description: String,
    /// Previous value, serialized as a string ("" when absent)
    pub old_value: String,
    /// New value, serialized as a string ("" when absent)
    pub new_value: String,
    /// When the change was detected
    pub occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a change event stamped with the current time
    pub fn new(
        domain_id: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            domain_id: domain_id.into(),
            category,
            description: description.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Partial update of a WHOIS contact
///
/// Outer `None` = leave the subfield alone; `Some(v)` = overwrite with `v`
/// (which may itself be `None` when the resolver reported the field empty).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhoisPatch {
    pub name: Option<Option<String>>,
    pub organization: Option<Option<String>>,
    pub street: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub postal_code: Option<Option<String>>,
    pub country: Option<Option<String>>,
}

impl WhoisPatch {
    /// True when no subfield is staged
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.organization.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.postal_code.is_none()
            && self.country.is_none()
    }

    /// Apply the staged subfields to a contact
    pub fn apply(&self, contact: &mut WhoisContact) {
        if let Some(v) = &self.name {
            contact.name = v.clone();
        }
        if let Some(v) = &self.organization {
            contact.organization = v.clone();
        }
        if let Some(v) = &self.street {
            contact.street = v.clone();
        }
        if let Some(v) = &self.city {
            contact.city = v.clone();
        }
        if let Some(v) = &self.state {
            contact.state = v.clone();
        }
        if let Some(v) = &self.postal_code {
            contact.postal_code = v.clone();
        }
        if let Some(v) = &self.country {
            contact.country = v.clone();
        }
    }
}

/// Partial update of an SSL certificate record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SslPatch {
    pub issuer: Option<Option<String>>,
    pub issuer_country: Option<Option<String>>,
    pub subject: Option<Option<String>>,
    pub valid_from: Option<Option<String>>,
    pub valid_to: Option<Option<String>>,
    pub fingerprint: Option<Option<String>>,
    pub key_size: Option<Option<u32>>,
    pub signature_algorithm: Option<Option<String>>,
}

impl SslPatch {
    /// True when no subfield is staged
    pub fn is_empty(&self) -> bool {
        self.issuer.is_none()
            && self.issuer_country.is_none()
            && self.subject.is_none()
            && self.valid_from.is_none()
            && self.valid_to.is_none()
            && self.fingerprint.is_none()
            && self.key_size.is_none()
            && self.signature_algorithm.is_none()
    }

    /// Apply the staged subfields to a certificate record
    pub fn apply(&self, cert: &mut SslCertificate) {
        if let Some(v) = &self.issuer {
            cert.issuer = v.clone();
        }
        if let Some(v) = &self.issuer_country {
            cert.issuer_country = v.clone();
        }
        if let Some(v) = &self.subject {
            cert.subject = v.clone();
        }
        if let Some(v) = &self.valid_from {
            cert.valid_from = v.clone();
        }
        if let Some(v) = &self.valid_to {
            cert.valid_to = v.clone();
        }
        if let Some(v) = &self.fingerprint {
            cert.fingerprint = v.clone();
        }
        if let Some(v) = &self.key_size {
            cert.key_size = *v;
        }
        if let Some(v) = &self.signature_algorithm {
            cert.signature_algorithm = v.clone();
        }
    }
}

/// Closed set of persistence mutations a comparator may request
///
/// Each variant maps to exactly one category-scoped gateway write. Keeping
/// the mapping as an enum (rather than building column names from strings
/// at runtime) makes every reachable write checkable at compile time.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMutation {
    /// Overwrite the stored expiry date
    SetExpiryDate { value: Option<String> },
    /// Reuse-or-create a registrar by name and repoint the domain at it
    UpsertRegistrar { name: String, url: Option<String> },
    /// Insert an EPP status code into the stored set
    AddStatus { code: String },
    /// Delete an EPP status code from the stored set
    RemoveStatus { code: String },
    /// Create the WHOIS entity (stored had none)
    CreateWhois { contact: WhoisContact },
    /// Patch differing WHOIS subfields in one write
    PatchWhois { patch: WhoisPatch },
    /// Create the SSL certificate record (stored had none)
    CreateSsl { certificate: SslCertificate },
    /// Patch differing SSL subfields in one write
    PatchSsl { patch: SslPatch },
    /// Insert a DNS record row
    AddDnsRecord { entry: DnsEntry },
    /// Delete a DNS record row
    RemoveDnsRecord { entry: DnsEntry },
}

/// Per-domain, per-category notification switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub domain_id: String,
    pub category: CategoryKind,
    pub enabled: bool,
}

/// User-facing record derived from a change event
///
/// Created by the notification dispatcher when the category's preference is
/// enabled; the `sent`/`read` flags are mutated by collaborators outside
/// this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub domain_id: String,
    pub category: CategoryKind,
    pub message: String,
    pub sent: bool,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create an unsent, unread notification stamped with the current time
    pub fn new(
        domain_id: impl Into<String>,
        category: CategoryKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            domain_id: domain_id.into(),
            category,
            message: message.into(),
            sent: false,
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Per-domain entry in a run summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    /// Domain name
    pub domain: String,
    /// Human descriptions of detected changes, plus per-category error notes
    pub changes: Vec<String>,
    /// Domain-level error (fetch failure), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainReport {
    /// Report for a domain that was processed (possibly with zero changes)
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            changes: Vec::new(),
            error: None,
        }
    }

    /// Report for a domain that failed before comparators could run
    pub fn failed(domain: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            changes: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Output of one orchestrator execution
///
/// This is the externally observable contract: stable enough for an
/// operator dashboard or log line to consume. Results are sorted by domain
/// name, and domains with zero detected changes still appear with an empty
/// change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub results: Vec<DomainReport>,
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_display_includes_subfield() {
        assert_eq!(Category::Expiry.to_string(), "expiry");
        assert_eq!(
            Category::Whois(Some(WhoisField::City)).to_string(),
            "whois.city"
        );
        assert_eq!(Category::Whois(None).to_string(), "whois");
        assert_eq!(
            Category::Ssl(Some(SslField::ValidTo)).to_string(),
            "ssl.valid_to"
        );
    }

    #[test]
    fn category_kind_projection() {
        assert_eq!(
            Category::Whois(Some(WhoisField::Country)).kind(),
            CategoryKind::Whois
        );
        assert_eq!(Category::Ssl(None).kind(), CategoryKind::Ssl);
        assert_eq!(Category::Dns.kind(), CategoryKind::Dns);
    }

    #[test]
    fn whois_patch_apply_overwrites_only_staged_fields() {
        let mut contact = WhoisContact {
            city: Some("London".to_string()),
            country: Some("UK".to_string()),
            ..WhoisContact::default()
        };

        let mut patch = WhoisPatch::default();
        WhoisField::City.stage(&mut patch, Some("Paris".to_string()));

        patch.apply(&mut contact);
        assert_eq!(contact.city.as_deref(), Some("Paris"));
        assert_eq!(contact.country.as_deref(), Some("UK"));
    }

    #[test]
    fn whois_contact_emptiness() {
        assert!(WhoisContact::default().is_empty());
        assert!(
            WhoisContact {
                city: Some("  ".to_string()),
                ..WhoisContact::default()
            }
            .is_empty()
        );
        assert!(
            !WhoisContact {
                country: Some("UK".to_string()),
                ..WhoisContact::default()
            }
            .is_empty()
        );
    }
}
