//! SSL certificate comparator
//!
//! Field-by-field diff across the certificate attributes. The validity
//! dates are compared at day granularity via the normalizer: a
//! reconciliation run close to midnight must not report a spurious
//! certificate change when the certificate itself hasn't changed. The key
//! size is compared numerically, everything else case-insensitively. Like
//! WHOIS, a missing stored certificate is created under a single "record
//! created" event.

use super::CategoryDiff;
use crate::error::Result;
use crate::model::{
    Category, ChangeEvent, DomainRecord, FieldMutation, LiveSnapshot, SslCertificate, SslField,
    SslPatch,
};
use crate::normalize::{normalize_date, normalize_str};

/// Display form of one certificate attribute ("" when absent)
fn raw(cert: &SslCertificate, field: SslField) -> String {
    let value = match field {
        SslField::Issuer => &cert.issuer,
        SslField::IssuerCountry => &cert.issuer_country,
        SslField::Subject => &cert.subject,
        SslField::ValidFrom => &cert.valid_from,
        SslField::ValidTo => &cert.valid_to,
        SslField::Fingerprint => &cert.fingerprint,
        SslField::SignatureAlgorithm => &cert.signature_algorithm,
        SslField::KeySize => {
            return cert.key_size.map(|k| k.to_string()).unwrap_or_default();
        }
    };
    value.clone().unwrap_or_default()
}

/// Whether one attribute differs beyond its tolerance
fn differs(stored: &SslCertificate, live: &SslCertificate, field: SslField) -> bool {
    if field == SslField::KeySize {
        return stored.key_size != live.key_size;
    }

    let old = raw(stored, field);
    let new = raw(live, field);
    if field.is_date() {
        normalize_date(Some(&old)) != normalize_date(Some(&new))
    } else {
        normalize_str(Some(&old)) != normalize_str(Some(&new))
    }
}

/// Stage the live value of one attribute into the patch
fn stage(patch: &mut SslPatch, field: SslField, live: &SslCertificate) {
    match field {
        SslField::Issuer => patch.issuer = Some(live.issuer.clone()),
        SslField::IssuerCountry => patch.issuer_country = Some(live.issuer_country.clone()),
        SslField::Subject => patch.subject = Some(live.subject.clone()),
        SslField::ValidFrom => patch.valid_from = Some(live.valid_from.clone()),
        SslField::ValidTo => patch.valid_to = Some(live.valid_to.clone()),
        SslField::Fingerprint => patch.fingerprint = Some(live.fingerprint.clone()),
        SslField::KeySize => patch.key_size = Some(live.key_size),
        SslField::SignatureAlgorithm => {
            patch.signature_algorithm = Some(live.signature_algorithm.clone())
        }
    }
}

pub(super) fn compare(stored: &DomainRecord, live: &LiveSnapshot) -> Result<CategoryDiff> {
    let Some(live_cert) = &live.ssl else {
        return Ok(CategoryDiff::empty());
    };

    let mut diff = CategoryDiff::empty();

    let Some(stored_cert) = &stored.ssl else {
        if live_cert.is_empty() {
            return Ok(diff);
        }
        let summary = serde_json::to_string(live_cert).unwrap_or_default();
        diff.push(
            ChangeEvent::new(
                &stored.id,
                Category::Ssl(None),
                "SSL certificate recorded",
                "",
                summary,
            ),
            FieldMutation::CreateSsl {
                certificate: live_cert.clone(),
            },
        );
        return Ok(diff);
    };

    let mut patch = SslPatch::default();
    for field in SslField::ALL {
        if !differs(stored_cert, live_cert, field) {
            continue;
        }

        diff.events.push(ChangeEvent::new(
            &stored.id,
            Category::Ssl(Some(field)),
            format!("SSL {} changed", field.label()),
            raw(stored_cert, field),
            raw(live_cert, field),
        ));
        stage(&mut patch, field, live_cert);
    }

    if !patch.is_empty() {
        diff.mutations.push(FieldMutation::PatchSsl { patch });
    }

    Ok(diff)
}
