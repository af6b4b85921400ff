//! PREIMAGE-SHA-256: fulfilled by revealing the preimage. The message is
//! ignored.

use super::DerivedCondition;
use crate::condition::Condition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreimageSha256Fulfillment {
    preimage: Vec<u8>,
    condition: DerivedCondition,
}

impl PreimageSha256Fulfillment {
    pub fn new(preimage: impl Into<Vec<u8>>) -> Self {
        Self {
            preimage: preimage.into(),
            condition: DerivedCondition::default(),
        }
    }

    pub fn preimage(&self) -> &[u8] {
        &self.preimage
    }

    pub fn condition(&self) -> &Condition {
        self.condition
            .get_or_init(|| Condition::preimage_sha256(&self.preimage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fulfillment;

    #[test]
    fn test_condition_matches_direct_construction() {
        let f = PreimageSha256Fulfillment::new(b"secret".to_vec());
        assert_eq!(f.condition(), &Condition::preimage_sha256(b"secret"));
    }

    #[test]
    fn test_message_is_ignored() {
        let f = Fulfillment::from(PreimageSha256Fulfillment::new(b"hello"));
        let c = Condition::preimage_sha256(b"hello");
        assert!(f.verify(&c, b""));
        assert!(f.verify(&c, b"anything at all"));
    }

    #[test]
    fn test_empty_preimage_roundtrip() {
        let f = Fulfillment::from(PreimageSha256Fulfillment::new(Vec::new()));
        let bytes = f.encode();
        assert_eq!(bytes, vec![0x00, 0x00, 0x00]);
        assert_eq!(Fulfillment::decode(&bytes).unwrap(), f);
    }
}
