//! # cryptocond: Crypto-Conditions and Fulfillments
//!
//! Build conditions, encode and decode them, and verify fulfillments.
//!
//! A **condition** is a compact commitment: a type, a SHA-256 fingerprint of
//! canonical DER contents, a cost, and for compound kinds the set of types
//! reachable beneath it. A **fulfillment** carries the material (preimage,
//! signature, nested fulfillments) that satisfies a condition for a given
//! message.
//!
//! ## Kinds
//!
//! | Type | Code | Satisfied by |
//! |------|------|--------------|
//! | `preimage-sha-256` | 0 | revealing the preimage |
//! | `rsa-sha-256` | 1 | an RSA PKCS#1 v1.5 SHA-256 signature |
//! | `prefix-sha-256` | 2 | a subfulfillment over `prefix || message` |
//! | `threshold-sha-256` | 3 | weighted subfulfillments reaching a threshold |
//! | `ed25519-sha-256` | 4 | an Ed25519 signature |
//!
//! ## Example
//!
//! ```
//! use cryptocond::{Condition, Fulfillment, PreimageSha256Fulfillment};
//!
//! let condition = Condition::preimage_sha256(b"hello");
//! let fulfillment = Fulfillment::from(PreimageSha256Fulfillment::new(b"hello"));
//! assert!(fulfillment.verify(&condition, b""));
//!
//! let decoded = Fulfillment::decode(&fulfillment.encode()).unwrap();
//! assert_eq!(decoded, fulfillment);
//! ```
//!
//! ## Crate Policy
//!
//! - Verification returns `bool`; errors are for malformed input and
//!   invalid parameters only.
//! - Decoding untrusted input is bounded by [`DecodeLimits`].
//! - Logging goes through `tracing`: `debug` when a verification fails,
//!   `trace` while decoding.

mod codec;
pub mod condition;
pub mod fingerprint;
pub mod fulfillment;
pub mod uri;

pub use condition::{CompoundCondition, Condition, SimpleCondition};
pub use fulfillment::{
    Ed25519Sha256Fulfillment, Fulfillment, PrefixSha256Fulfillment, PreimageSha256Fulfillment,
    RsaSha256Fulfillment, ThresholdEntry, ThresholdSha256Fulfillment,
};
pub use uri::UriError;

pub use cryptocond_core::{
    ConditionError, ConditionType, ConditionTypeSet, CryptoConditionError, CryptoError,
    DecodeError, DecodeLimits,
};
pub use cryptocond_crypto::{
    Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, RsaKeyPair, RsaModulus,
};
