//! # Init-Data Service
//!
//! Application service layer that implements the `InitDataVerificationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`InitDataVerificationApi`)
//! - Uses the outbound port (`Clock`) for freshness checks
//! - Delegates parsing and HMAC work to the domain layer
//!
//! The derived secret is computed on first use and cached for the lifetime
//! of the service; one service holds exactly one credential.

use crate::domain::canonical;
use crate::domain::claims::InitDataClaims;
use crate::domain::crypto::derive_secret;
use crate::domain::entities::{FieldSet, ParsedInitData, PlatformCredential, Secret};
use crate::domain::errors::InitDataError;
use crate::domain::signer;
use crate::domain::verifier;
use crate::ports::inbound::InitDataVerificationApi;
use crate::ports::outbound::{Clock, SystemClock};
use std::sync::OnceLock;
use tracing::debug;

/// Init-data verification service.
pub struct InitDataService<C: Clock = SystemClock> {
    credential: PlatformCredential,
    secret: OnceLock<Secret>,
    clock: C,
}

impl InitDataService<SystemClock> {
    /// Create a service backed by the wall clock.
    pub fn new(credential: PlatformCredential) -> Self {
        Self::with_clock(credential, SystemClock)
    }
}

impl<C: Clock> InitDataService<C> {
    /// Create a service with an explicit clock.
    pub fn with_clock(credential: PlatformCredential, clock: C) -> Self {
        Self {
            credential,
            secret: OnceLock::new(),
            clock,
        }
    }

    fn secret(&self) -> &Secret {
        self.secret.get_or_init(|| derive_secret(&self.credential))
    }
}

impl<C: Clock> InitDataVerificationApi for InitDataService<C> {
    fn parse(&self, raw: &str) -> Result<ParsedInitData, InitDataError> {
        canonical::parse(raw)
    }

    fn validate(&self, raw: &str, max_age: Option<u64>) -> Result<InitDataClaims, InitDataError> {
        let result = canonical::parse(raw).and_then(|parsed| {
            verifier::verify(&parsed, self.secret(), max_age, self.clock.now_unix())
        });

        if let Err(e) = &result {
            debug!(kind = %e.kind(), "Init data rejected");
        }

        result
    }

    fn sign(&self, fields: FieldSet) -> String {
        signer::sign(fields, &self.credential, self.clock.now_unix())
    }
}

impl<C: Clock> std::fmt::Debug for InitDataService<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitDataService")
            .field("credential", &self.credential)
            .field("secret_cached", &self.secret.get().is_some())
            .finish()
    }
}
