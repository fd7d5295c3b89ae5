//! # Signature Verifier
//!
//! Decides whether a parsed payload was signed by the platform for our
//! credential and, optionally, whether it is still fresh.
//!
//! ## Check Order
//!
//! 1. Malformed input (done by [`parse`])
//! 2. Signature comparison
//! 3. Expiry
//!
//! Expiry is only evaluated for authentic payloads, so a forged payload is
//! always reported as `SignatureMismatch`, never as `Expired`.

use super::canonical::parse;
use super::claims::InitDataClaims;
use super::crypto::{compute_signature, derive_secret, signatures_match};
use super::entities::{FieldSet, ParsedInitData, PlatformCredential, Secret};
use super::errors::InitDataError;

/// Field holding the issuance time in Unix seconds.
pub const AUTH_DATE_FIELD: &str = "auth_date";

/// Verify a parsed payload against a derived secret.
///
/// `max_age` of `None` disables the freshness check entirely.
pub fn verify(
    parsed: &ParsedInitData,
    secret: &Secret,
    max_age: Option<u64>,
    now: u64,
) -> Result<InitDataClaims, InitDataError> {
    let computed = compute_signature(secret, &parsed.canonical);
    if !signatures_match(&computed, parsed.signature.as_str()) {
        return Err(InitDataError::SignatureMismatch);
    }

    check_freshness(&parsed.fields, max_age, now)?;

    InitDataClaims::from_fields(&parsed.fields, &parsed.signature)
}

/// Enforce the freshness window.
///
/// Passes when `now - auth_date <= max_age`. A timestamp in the future has
/// age zero. With a window requested, a missing or unparseable `auth_date`
/// is `Expired`.
pub fn check_freshness(
    fields: &FieldSet,
    max_age: Option<u64>,
    now: u64,
) -> Result<(), InitDataError> {
    let Some(max_age) = max_age else {
        return Ok(());
    };

    let auth_date = fields
        .get(AUTH_DATE_FIELD)
        .and_then(|raw| raw.parse::<u64>().ok());

    match auth_date {
        Some(issued) if now.saturating_sub(issued) <= max_age => Ok(()),
        _ => Err(InitDataError::Expired {
            auth_date,
            now,
            max_age,
        }),
    }
}

/// Parse and verify raw init-data in one step.
pub fn validate(
    raw: &str,
    credential: &PlatformCredential,
    max_age: Option<u64>,
    now: u64,
) -> Result<InitDataClaims, InitDataError> {
    let parsed = parse(raw)?;
    verify(&parsed, &derive_secret(credential), max_age, now)
}

/// Boolean form of [`validate`].
pub fn is_valid(
    raw: &str,
    credential: &PlatformCredential,
    max_age: Option<u64>,
    now: u64,
) -> bool {
    validate(raw, credential, max_age, now).is_ok()
}
