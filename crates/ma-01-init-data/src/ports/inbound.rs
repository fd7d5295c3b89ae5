//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::claims::InitDataClaims;
use crate::domain::entities::{FieldSet, ParsedInitData, VerificationResult};
use crate::domain::errors::InitDataError;

/// Primary init-data authentication API.
///
/// Implementations hold the platform credential; callers only ever pass the
/// raw payload. Implementations must be thread-safe (`Send + Sync`).
pub trait InitDataVerificationApi: Send + Sync {
    /// Parse and canonicalize without making a trust decision.
    fn parse(&self, raw: &str) -> Result<ParsedInitData, InitDataError>;

    /// Authenticate a payload and return its claims.
    ///
    /// `max_age` is the freshness window in seconds; `None` disables it.
    ///
    /// # Errors
    /// * `MalformedPayload` - unparseable, missing `hash`, duplicate key
    /// * `SignatureMismatch` - not signed for this credential
    /// * `Expired` - outside the freshness window
    fn validate(&self, raw: &str, max_age: Option<u64>) -> Result<InitDataClaims, InitDataError>;

    /// Same as [`validate`](Self::validate), as a flat record.
    fn verify(&self, raw: &str, max_age: Option<u64>) -> VerificationResult {
        self.validate(raw, max_age).into()
    }

    /// Same as [`validate`](Self::validate), as a boolean.
    fn is_valid(&self, raw: &str, max_age: Option<u64>) -> bool {
        self.validate(raw, max_age).is_ok()
    }

    /// Sign fields with this credential, stamped with the current time.
    fn sign(&self, fields: FieldSet) -> String;
}
