//! # Keyed Hashing
//!
//! HMAC-SHA256 secret derivation and signature computation, as fixed by the
//! platform's signing contract:
//!
//! ```text
//! secret    = HMAC-SHA256(key = "WebAppData", message = bot_token)
//! signature = hex(HMAC-SHA256(key = secret, message = canonical_string))
//! ```
//!
//! ## Security Notes
//!
//! - The domain-separation key is a protocol constant, not configuration
//! - Signature comparison is constant-time over equal lengths; a length
//!   mismatch is rejected before any byte is looked at

use super::entities::{CanonicalString, PlatformCredential, Secret, SECRET_LEN};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation key for deriving the per-application secret.
pub const DOMAIN_SEPARATION_KEY: &[u8] = b"WebAppData";

/// Derive the signing secret from a platform credential.
pub fn derive_secret(credential: &PlatformCredential) -> Secret {
    let mut mac = HmacSha256::new_from_slice(DOMAIN_SEPARATION_KEY)
        .expect("HMAC can take key of any size");
    mac.update(credential.expose());

    let mut bytes = [0u8; SECRET_LEN];
    bytes.copy_from_slice(&mac.finalize().into_bytes());
    Secret::from_bytes(bytes)
}

/// Compute the lowercase hex signature of a canonical string.
pub fn compute_signature(secret: &Secret, canonical: &CanonicalString) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.expose()).expect("HMAC can take key of any size");
    mac.update(canonical.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compare a computed signature against a claimed one.
///
/// SECURITY: Different lengths return `false` immediately. Equal lengths
/// are compared with `subtle::ConstantTimeEq`, so timing does not depend on
/// the position of the first differing byte.
pub fn signatures_match(computed: &str, claimed: &str) -> bool {
    if computed.len() != claimed.len() {
        return false;
    }
    computed.as_bytes().ct_eq(claimed.as_bytes()).into()
}
