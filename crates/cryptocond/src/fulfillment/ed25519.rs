//! ED25519-SHA-256: an Ed25519 signature over the message.
//!
//! Payload: `octet string public key (32)`, `octet string signature (64)`.

use cryptocond_core::oer::{OerReader, OerWriter};
use cryptocond_core::DecodeError;
use cryptocond_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use tracing::debug;

use super::DerivedCondition;
use crate::condition::Condition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ed25519Sha256Fulfillment {
    public_key: Ed25519PublicKey,
    signature: Ed25519Signature,
    condition: DerivedCondition,
}

impl Ed25519Sha256Fulfillment {
    pub fn new(public_key: Ed25519PublicKey, signature: Ed25519Signature) -> Self {
        Self {
            public_key,
            signature,
            condition: DerivedCondition::default(),
        }
    }

    /// Sign `message` and wrap the signature with the signer's public key.
    pub fn sign(key_pair: &Ed25519KeyPair, message: &[u8]) -> Self {
        Self::new(key_pair.public_key(), key_pair.sign(message))
    }

    pub fn public_key(&self) -> &Ed25519PublicKey {
        &self.public_key
    }

    pub fn signature(&self) -> &Ed25519Signature {
        &self.signature
    }

    pub fn condition(&self) -> &Condition {
        self.condition
            .get_or_init(|| Condition::ed25519_sha256(self.public_key.as_bytes()))
    }

    pub(crate) fn verify_message(&self, message: &[u8]) -> bool {
        match self.public_key.verify(message, &self.signature) {
            Ok(()) => true,
            Err(e) => {
                debug!(public_key = ?self.public_key, error = %e, "ed25519 fulfillment rejected");
                false
            }
        }
    }

    pub(crate) fn payload(&self) -> Vec<u8> {
        let mut w = OerWriter::new();
        w.write_octet_string(self.public_key.as_bytes())
            .write_octet_string(self.signature.as_bytes());
        w.into_bytes()
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut r = OerReader::new(payload);
        let public_key = r.read_fixed_octet_string::<32>("public key")?;
        let signature = r.read_fixed_octet_string::<64>("signature")?;
        r.finish()?;
        Ok(Self::new(
            Ed25519PublicKey::from_bytes(public_key),
            Ed25519Signature::from_bytes(signature),
        ))
    }
}
