//! PREFIX-SHA-256: a subfulfillment evaluated over `prefix || message`.
//!
//! Payload: `octet string prefix`, `var-uint maxMessageLength`, nested
//! fulfillment envelope.

use cryptocond_core::oer::{OerReader, OerWriter};
use cryptocond_core::{ConditionError, DecodeError, DecodeLimits};
use tracing::debug;

use super::{DerivedCondition, Fulfillment};
use crate::codec;
use crate::condition::Condition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSha256Fulfillment {
    prefix: Vec<u8>,
    max_message_length: u64,
    subfulfillment: Box<Fulfillment>,
    condition: DerivedCondition,
}

impl PrefixSha256Fulfillment {
    /// `max_message_length` bounds the length of `prefix || message`.
    pub fn new(
        prefix: impl Into<Vec<u8>>,
        max_message_length: u64,
        subfulfillment: impl Into<Fulfillment>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            max_message_length,
            subfulfillment: Box::new(subfulfillment.into()),
            condition: DerivedCondition::default(),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn max_message_length(&self) -> u64 {
        self.max_message_length
    }

    pub fn subfulfillment(&self) -> &Fulfillment {
        &self.subfulfillment
    }

    pub fn condition(&self) -> Result<&Condition, ConditionError> {
        self.condition.get_or_try_init(|| {
            let subcondition = self.subfulfillment.condition()?;
            Condition::prefix_sha256(&self.prefix, self.max_message_length, subcondition)
        })
    }

    pub(crate) fn verify_message(&self, message: &[u8]) -> bool {
        let total = self.prefix.len() as u64 + message.len() as u64;
        if total > self.max_message_length {
            debug!(
                length = total,
                max_message_length = self.max_message_length,
                "prefixed message exceeds maximum length"
            );
            return false;
        }
        let subcondition = match self.subfulfillment.condition() {
            Ok(c) => c,
            Err(_) => return false,
        };
        let mut prefixed = Vec::with_capacity(self.prefix.len() + message.len());
        prefixed.extend_from_slice(&self.prefix);
        prefixed.extend_from_slice(message);
        self.subfulfillment.verify(subcondition, &prefixed)
    }

    pub(crate) fn payload(&self) -> Vec<u8> {
        let mut w = OerWriter::new();
        w.write_octet_string(&self.prefix)
            .write_var_u_int(self.max_message_length)
            .write_encoded(&self.subfulfillment.encode());
        w.into_bytes()
    }

    pub(crate) fn decode_payload(
        payload: &[u8],
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<Self, DecodeError> {
        let mut r = OerReader::new(payload);
        let prefix = r.read_octet_string()?;
        let max_message_length = r.read_var_u_int()?;
        let subfulfillment = codec::read_nested_fulfillment(&mut r, limits, depth + 1)?;
        r.finish()?;
        Ok(Self::new(prefix, max_message_length, subfulfillment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fulfillment::{Ed25519Sha256Fulfillment, PreimageSha256Fulfillment};
    use cryptocond_crypto::Ed25519KeyPair;

    #[test]
    fn test_prefix_over_max_length_fails() {
        let f = Fulfillment::from(PrefixSha256Fulfillment::new(
            b"A".to_vec(),
            1,
            PreimageSha256Fulfillment::new(b"x"),
        ));
        let c = f.condition().unwrap().clone();
        assert!(!f.verify(&c, b"B"));
        assert!(f.verify(&c, b""));
    }

    #[test]
    fn test_signature_covers_prefix() {
        let kp = Ed25519KeyPair::from_seed(&[8u8; 32]);
        let sub = Ed25519Sha256Fulfillment::sign(&kp, b"ledger-1:pay");
        let f = Fulfillment::from(PrefixSha256Fulfillment::new(b"ledger-1:".to_vec(), 64, sub));
        let c = f.condition().unwrap().clone();
        assert!(f.verify(&c, b"pay"));
        assert!(!f.verify(&c, b"ledger-1:pay"));
    }

    #[test]
    fn test_condition_matches_direct_construction() {
        let sub = PreimageSha256Fulfillment::new(b"s");
        let f = PrefixSha256Fulfillment::new(b"p".to_vec(), 10, sub);
        let expected =
            Condition::prefix_sha256(b"p", 10, &Condition::preimage_sha256(b"s")).unwrap();
        assert_eq!(f.condition().unwrap(), &expected);
    }

    #[test]
    fn test_cost_overflow_verifies_false() {
        let f = Fulfillment::from(PrefixSha256Fulfillment::new(
            b"p".to_vec(),
            u64::MAX,
            PreimageSha256Fulfillment::new(b"s"),
        ));
        assert_eq!(f.condition(), Err(ConditionError::CostOverflow));
        assert!(!f.verify(&Condition::preimage_sha256(b"s"), b""));
    }

    #[test]
    fn test_payload_roundtrip() {
        let f = PrefixSha256Fulfillment::new(
            b"abc".to_vec(),
            300,
            PreimageSha256Fulfillment::new(b"s"),
        );
        let payload = f.payload();
        assert_eq!(&payload[..4], &[0x03, b'a', b'b', b'c']);
        assert_eq!(&payload[4..7], &[0x02, 0x01, 0x2c]);
        let decoded =
            PrefixSha256Fulfillment::decode_payload(&payload, &DecodeLimits::default(), 0)
                .unwrap();
        assert_eq!(decoded, f);
    }

    #[test]
    fn test_decode_rejects_trailing_payload() {
        let f = PrefixSha256Fulfillment::new(
            b"abc".to_vec(),
            3,
            PreimageSha256Fulfillment::new(b"s"),
        );
        let mut payload = f.payload();
        payload.push(0xff);
        assert_eq!(
            PrefixSha256Fulfillment::decode_payload(&payload, &DecodeLimits::default(), 0),
            Err(DecodeError::TrailingBytes(1))
        );
    }
}
