//! # cryptocond-crypto: Cryptographic Primitives
//!
//! Adapts the registry cryptography crates to the shapes the condition
//! layer needs:
//!
//! - **SHA-256** fingerprint hashing of DER fingerprint contents.
//! - **Ed25519** key pairs, signing and verification.
//! - **RSA-SHA256** public modulus validation, PKCS#1 v1.5 verification and
//!   signing.
//!
//! ## Crate Policy
//!
//! - Depends only on `cryptocond-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   SHA-256, real Ed25519 and real RSA keys.
//! - Private keys are never serialized or logged.

pub mod ed25519;
pub mod rsa;
pub mod sha256;

pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use rsa::{RsaKeyPair, RsaModulus, RSA_PUBLIC_EXPONENT};
pub use sha256::{sha256, sha256_hex};
