//! RSA-SHA-256: an RSASSA-PKCS1-v1_5 SHA-256 signature over the message.
//!
//! Payload: `octet string modulus`, `octet string signature`. The modulus
//! is the unsigned big-endian value without leading zero octets; the public
//! exponent is always 65537 and is not carried.

use cryptocond_core::oer::{OerReader, OerWriter};
use cryptocond_core::{CryptoConditionError, DecodeError};
use cryptocond_crypto::{rsa, RsaKeyPair, RsaModulus};
use tracing::debug;

use super::DerivedCondition;
use crate::condition::Condition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaSha256Fulfillment {
    modulus: RsaModulus,
    signature: Vec<u8>,
    condition: DerivedCondition,
}

impl RsaSha256Fulfillment {
    pub fn new(modulus: RsaModulus, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            modulus,
            signature: signature.into(),
            condition: DerivedCondition::default(),
        }
    }

    /// Sign `message` with the key pair.
    pub fn sign(key_pair: &RsaKeyPair, message: &[u8]) -> Result<Self, CryptoConditionError> {
        let signature = key_pair.sign(message)?;
        Ok(Self::new(key_pair.modulus().clone(), signature))
    }

    pub fn modulus(&self) -> &RsaModulus {
        &self.modulus
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn condition(&self) -> &Condition {
        self.condition
            .get_or_init(|| Condition::from_rsa_modulus(&self.modulus))
    }

    pub(crate) fn verify_message(&self, message: &[u8]) -> bool {
        match rsa::verify(&self.modulus, message, &self.signature) {
            Ok(()) => true,
            Err(e) => {
                debug!(modulus = ?self.modulus, error = %e, "rsa fulfillment rejected");
                false
            }
        }
    }

    pub(crate) fn payload(&self) -> Vec<u8> {
        let mut w = OerWriter::new();
        w.write_octet_string(self.modulus.as_bytes())
            .write_octet_string(&self.signature);
        w.into_bytes()
    }

    pub(crate) fn decode_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut r = OerReader::new(payload);
        let modulus_bytes = r.read_octet_string()?;
        let signature = r.read_octet_string()?;
        r.finish()?;

        if modulus_bytes.first() == Some(&0) {
            return Err(DecodeError::invalid("modulus", "leading zero octet"));
        }
        let modulus = RsaModulus::from_be_bytes(modulus_bytes)
            .map_err(|e| DecodeError::invalid("modulus", e.to_string()))?;
        Ok(Self::new(modulus, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fulfillment;
    use std::sync::OnceLock;

    fn key_pair() -> &'static RsaKeyPair {
        static KEY: OnceLock<RsaKeyPair> = OnceLock::new();
        KEY.get_or_init(|| RsaKeyPair::generate(1024).expect("key generation"))
    }

    #[test]
    fn test_signed_fulfillment_verifies() {
        let kp = key_pair();
        let f = Fulfillment::from(RsaSha256Fulfillment::sign(kp, b"transfer").unwrap());
        let c = Condition::rsa_sha256(kp.modulus().as_bytes(), 65_537).unwrap();
        assert!(f.verify(&c, b"transfer"));
        assert!(!f.verify(&c, b"transfers"));
    }

    #[test]
    fn test_condition_cost() {
        let kp = key_pair();
        let f = RsaSha256Fulfillment::sign(kp, b"m").unwrap();
        assert_eq!(f.condition().cost(), 128 * 128);
    }

    #[test]
    fn test_payload_roundtrip() {
        let kp = key_pair();
        let f = RsaSha256Fulfillment::sign(kp, b"m").unwrap();
        let decoded = RsaSha256Fulfillment::decode_payload(&f.payload()).unwrap();
        assert_eq!(decoded, f);
        assert_eq!(decoded.condition(), f.condition());
    }

    #[test]
    fn test_decode_rejects_leading_zero_modulus() {
        let kp = key_pair();
        let mut modulus = vec![0u8];
        modulus.extend_from_slice(kp.modulus().as_bytes());
        let mut w = OerWriter::new();
        w.write_octet_string(&modulus).write_octet_string(&[1, 2, 3]);
        assert!(matches!(
            RsaSha256Fulfillment::decode_payload(&w.into_bytes()),
            Err(DecodeError::InvalidField {
                field: "modulus",
                ..
            })
        ));
    }

    #[test]
    fn test_decode_rejects_small_modulus() {
        let mut w = OerWriter::new();
        w.write_octet_string(&[0xffu8; 64]).write_octet_string(&[1]);
        assert!(RsaSha256Fulfillment::decode_payload(&w.into_bytes()).is_err());
    }
}
