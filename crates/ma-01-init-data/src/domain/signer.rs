//! # Signer
//!
//! Produces init-data the way the issuing platform does. Used to mint
//! fixtures for tests and local development; the platform itself is the only
//! signer in production.

use super::canonical::{canonicalize, HASH_FIELD};
use super::crypto::{compute_signature, derive_secret};
use super::entities::{FieldSet, PlatformCredential};
use super::verifier::AUTH_DATE_FIELD;

/// Sign `fields` as of `auth_date` and encode them as raw init-data.
///
/// `auth_date` overwrites any value already in `fields`, and a stray `hash`
/// entry is dropped before signing. The `hash` pair is appended last.
pub fn sign(mut fields: FieldSet, credential: &PlatformCredential, auth_date: u64) -> String {
    fields.remove(HASH_FIELD);
    fields.set(AUTH_DATE_FIELD, auth_date.to_string());

    let canonical = canonicalize(&fields);
    let hash = compute_signature(&derive_secret(credential), &canonical);

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter())
        .append_pair(HASH_FIELD, &hash)
        .finish()
}
