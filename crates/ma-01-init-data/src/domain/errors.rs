//! # Init-Data Errors
//!
//! Error types for init-data parsing and verification.
//!
//! All variants are terminal: they classify the input, they are never
//! transient. Messages carry field names and timestamps only, never the raw
//! payload, the credential or the derived secret.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while authenticating init-data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InitDataError {
    /// The payload could not be turned into a field set, or a required
    /// field was missing or undecodable.
    #[error("Malformed init data: {0}")]
    MalformedPayload(MalformedReason),

    /// The computed signature does not equal the claimed `hash`.
    #[error("Init data signature mismatch")]
    SignatureMismatch,

    /// `auth_date` is missing, unparseable or older than the freshness window.
    #[error("Init data expired (auth_date: {auth_date:?}, now: {now}, max age: {max_age}s)")]
    Expired {
        auth_date: Option<u64>,
        now: u64,
        max_age: u64,
    },
}

impl InitDataError {
    /// Coarse classification, suitable for structured logs and metrics labels.
    pub fn kind(&self) -> RejectionKind {
        match self {
            InitDataError::MalformedPayload(_) => RejectionKind::MalformedPayload,
            InitDataError::SignatureMismatch => RejectionKind::SignatureMismatch,
            InitDataError::Expired { .. } => RejectionKind::Expired,
        }
    }

    pub(crate) fn malformed(reason: MalformedReason) -> Self {
        InitDataError::MalformedPayload(reason)
    }
}

/// Why a payload was classified as malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedReason {
    /// Nothing to parse.
    #[error("payload is empty")]
    Empty,

    /// A `key=value` pair had an empty key.
    #[error("empty field name")]
    EmptyKey,

    /// A percent-escape decoded to bytes that are not UTF-8.
    #[error("field is not valid UTF-8 after decoding")]
    InvalidEncoding,

    /// No `hash` field was present.
    #[error("missing hash field")]
    MissingHash,

    /// A field name occurred more than once.
    #[error("duplicate field: {0}")]
    DuplicateKey(String),

    /// A signed field could not be decoded into its typed form.
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

/// Rejection reason codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    MalformedPayload,
    SignatureMismatch,
    Expired,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::MalformedPayload => "malformed_payload",
            RejectionKind::SignatureMismatch => "signature_mismatch",
            RejectionKind::Expired => "expired",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
