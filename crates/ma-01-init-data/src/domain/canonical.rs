//! # Parser / Canonicalizer
//!
//! Turns a raw init-data string into its field set, the claimed signature and
//! the canonical string the platform signed. Makes no trust decision.
//!
//! ## Decoding Rules
//!
//! Standard query-string decoding, applied exactly once: `&` separates pairs,
//! the first `=` separates key from value, `+` is a space, `%XX` is a byte.
//! Decoding twice (or not at all) changes the canonical string and breaks
//! verification against a conforming signer.
//!
//! Decoded bytes must be UTF-8. Nothing is replaced lossily, so two
//! different payloads never share a canonical string.

use super::entities::{CanonicalString, ClaimedSignature, FieldSet, ParsedInitData};
use super::errors::{InitDataError, MalformedReason};
use percent_encoding::percent_decode;
use std::borrow::Cow;

/// Name of the field carrying the claimed signature.
pub const HASH_FIELD: &str = "hash";

/// Parse raw init-data into fields, canonical string and claimed signature.
///
/// # Errors
/// * `MalformedPayload(Empty)` - nothing but whitespace
/// * `MalformedPayload(EmptyKey)` - a pair such as `=value`
/// * `MalformedPayload(InvalidEncoding)` - percent-escapes that are not UTF-8
/// * `MalformedPayload(DuplicateKey)` - any key repeated, `hash` included
/// * `MalformedPayload(MissingHash)` - no `hash` field
pub fn parse(raw: &str) -> Result<ParsedInitData, InitDataError> {
    if raw.trim().is_empty() {
        return Err(InitDataError::malformed(MalformedReason::Empty));
    }

    let mut fields = decode_fields(raw)?;

    let signature = fields
        .remove(HASH_FIELD)
        .map(ClaimedSignature)
        .ok_or_else(|| InitDataError::malformed(MalformedReason::MissingHash))?;

    let canonical = canonicalize(&fields);

    Ok(ParsedInitData {
        fields,
        canonical,
        signature,
    })
}

/// Split `raw` into pairs and decode each side once.
fn decode_fields(raw: &str) -> Result<FieldSet, InitDataError> {
    let mut fields = FieldSet::new();
    for pair in raw.as_bytes().split(|b| *b == b'&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.iter().position(|b| *b == b'=') {
            Some(eq) => (&pair[..eq], &pair[eq + 1..]),
            None => (pair, &pair[pair.len()..]),
        };
        fields.insert(decode_component(key)?, decode_component(value)?)?;
    }
    Ok(fields)
}

fn decode_component(input: &[u8]) -> Result<String, InitDataError> {
    let spaced: Cow<'_, [u8]> = if input.contains(&b'+') {
        Cow::Owned(
            input
                .iter()
                .map(|&b| if b == b'+' { b' ' } else { b })
                .collect(),
        )
    } else {
        Cow::Borrowed(input)
    };

    percent_decode(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| InitDataError::malformed(MalformedReason::InvalidEncoding))
}

/// Serialize a field set as the platform's data-check string.
pub fn canonicalize(fields: &FieldSet) -> CanonicalString {
    let mut out = String::with_capacity(
        fields
            .iter()
            .map(|(k, v)| k.len() + v.len() + 2)
            .sum::<usize>(),
    );

    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }

    CanonicalString(out)
}
