//! # Domain Layer
//!
//! Pure init-data logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod canonical;
pub mod claims;
pub mod crypto;
pub mod entities;
pub mod errors;
pub mod signer;
pub mod verifier;
