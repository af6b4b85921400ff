//! # Ed25519 Keys and Signatures
//!
//! Ed25519 conditions commit to a 32-byte public key; their fulfillments
//! carry that key and a 64-byte signature over the exact message bytes.
//!
//! Verification uses `verify_strict`: small-order public keys and
//! non-canonical signature encodings are rejected, so a key and message
//! admit one accepted signature encoding. Key pairs never expose or log
//! their secret half.

use cryptocond_core::error::CryptoError;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

/// Raw Ed25519 public key as committed to by a condition.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey([u8; 32]);

/// Raw Ed25519 signature as carried in a fulfillment.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature([u8; 64]);

impl Ed25519PublicKey {
    /// Wraps the bytes without checking that they are a curve point.
    /// Invalid points are reported by [`Self::verify`].
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Strictly verify `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<(), CryptoError> {
        let key = VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid Ed25519 public key: {e}")))?;
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        key.verify_strict(message, &signature)
            .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519: {e}")))
    }
}

impl Ed25519Signature {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

// Only a short prefix is shown; keys and signatures end up in log fields.
impl std::fmt::Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, ..] = self.0;
        write!(f, "Ed25519PublicKey({a:02x}{b:02x}{c:02x}{d:02x}..)")
    }
}

impl std::fmt::Debug for Ed25519Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, ..] = self.0;
        write!(f, "Ed25519Signature({a:02x}{b:02x}{c:02x}{d:02x}..)")
    }
}

/// Signing half used to produce Ed25519 fulfillments.
pub struct Ed25519KeyPair(SigningKey);

impl Ed25519KeyPair {
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Deterministic key pair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        Ed25519Signature(self.0.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Ed25519KeyPair")
            .field(&self.public_key())
            .finish_non_exhaustive()
    }
}
