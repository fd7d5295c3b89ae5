//! # Init-Data Authentication (MA-01)
//!
//! Verifies the signed initialization payload a host platform hands to an
//! embedded mini-application, before any identity claim inside it is trusted.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Parsing, canonicalization and HMAC logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Protocol
//!
//! ```text
//! raw payload ──parse──→ FieldSet + CanonicalString + ClaimedSignature
//!                                   │
//!     secret = HMAC-SHA256("WebAppData", bot_token)
//!                                   │
//!     hex(HMAC-SHA256(secret, canonical)) == hash ?  ──no──→ SignatureMismatch
//!                                   │ yes
//!     now - auth_date <= max_age ?                  ──no──→ Expired
//!                                   │ yes
//!                             InitDataClaims
//! ```
//!
//! ## Security Notes
//!
//! - **Check order**: malformed input, then signature, then freshness. A forged
//!   payload never learns whether it would also have been stale.
//! - **Constant-time comparison**: equal-length signatures are compared with `subtle`
//! - **Secret hygiene**: credential and derived secret are zeroized on drop and
//!   never appear in `Debug` output or error messages

pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::canonical::{canonicalize, parse};
pub use domain::claims::{InitDataClaims, WebAppChat, WebAppUser};
pub use domain::crypto::{
    compute_signature, derive_secret, signatures_match, DOMAIN_SEPARATION_KEY,
};
pub use domain::entities::{
    CanonicalString, ClaimedSignature, FieldSet, ParsedInitData, PlatformCredential, Secret,
    VerificationResult,
};
pub use domain::errors::{InitDataError, MalformedReason, RejectionKind};
pub use domain::signer::sign;
pub use domain::verifier::{check_freshness, is_valid, validate, verify};
pub use ports::inbound::InitDataVerificationApi;
pub use ports::outbound::{Clock, FixedClock, SystemClock};
pub use service::InitDataService;
