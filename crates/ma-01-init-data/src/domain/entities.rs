//! # Domain Entities
//!
//! Core data structures for init-data verification.

use super::claims::InitDataClaims;
use super::errors::{InitDataError, MalformedReason};
use std::collections::btree_map::{BTreeMap, Entry};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of an HMAC-SHA256 output in bytes.
pub const SECRET_LEN: usize = 32;

// =============================================================================
// Payload Types
// =============================================================================

/// Decoded init-data fields, `hash` excluded.
///
/// Keys are unique. Iteration is in byte-wise key order, which is the order
/// the canonical string uses, so the order fields arrived in never matters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: BTreeMap<String, String>,
}

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a field set from decoded pairs, rejecting empty and repeated keys.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, InitDataError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.insert(key, value)?;
        }
        Ok(set)
    }

    /// Insert a field. Fails on an empty key or a key that is already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), InitDataError> {
        let key = key.into();
        if key.is_empty() {
            return Err(InitDataError::malformed(MalformedReason::EmptyKey));
        }
        match self.fields.entry(key) {
            Entry::Occupied(e) => Err(InitDataError::malformed(MalformedReason::DuplicateKey(
                e.key().clone(),
            ))),
            Entry::Vacant(e) => {
                e.insert(value.into());
                Ok(())
            }
        }
    }

    /// Insert or replace a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    /// Look up a field's decoded value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in canonical (byte-wise key) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The exact byte string the issuing platform signed.
///
/// `key=value` lines in byte-wise key order joined by `\n`, no trailing newline.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalString(pub(crate) String);

impl CanonicalString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex signature taken from the payload's `hash` field. Compared, never trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimedSignature(pub(crate) String);

impl ClaimedSignature {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Output of the parser: everything verification needs, no trust decision made.
#[derive(Clone, Debug)]
pub struct ParsedInitData {
    /// Decoded fields without `hash`
    pub fields: FieldSet,
    /// Message the platform signed
    pub canonical: CanonicalString,
    /// Value of the `hash` field
    pub signature: ClaimedSignature,
}

// =============================================================================
// Key Material
// =============================================================================

/// Long-lived bot token identifying the backend to the host platform.
///
/// Zeroized on drop; `Debug` is redacted.
#[derive(Clone)]
pub struct PlatformCredential(Zeroizing<String>);

impl PlatformCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Zeroizing::new(token.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for PlatformCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlatformCredential(<redacted>)")
    }
}

/// Per-application signing key derived from a [`PlatformCredential`].
///
/// Zeroized on drop; `Debug` is redacted; equality is constant-time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    pub(crate) fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn expose(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

// =============================================================================
// Verification Result
// =============================================================================

/// Flat verification outcome for callers that prefer a record over `Result`.
#[derive(Clone, Debug)]
pub struct VerificationResult {
    /// Whether the payload was accepted
    pub valid: bool,
    /// Validated claims (if verification succeeded)
    pub claims: Option<InitDataClaims>,
    /// Rejection (if verification failed)
    pub error: Option<InitDataError>,
}

impl VerificationResult {
    /// Create a successful verification result.
    pub fn valid(claims: InitDataClaims) -> Self {
        Self {
            valid: true,
            claims: Some(claims),
            error: None,
        }
    }

    /// Create a failed verification result.
    pub fn invalid(error: InitDataError) -> Self {
        Self {
            valid: false,
            claims: None,
            error: Some(error),
        }
    }
}

impl From<Result<InitDataClaims, InitDataError>> for VerificationResult {
    fn from(result: Result<InitDataClaims, InitDataError>) -> Self {
        match result {
            Ok(claims) => Self::valid(claims),
            Err(e) => Self::invalid(e),
        }
    }
}
