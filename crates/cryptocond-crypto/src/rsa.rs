//! # RSA-SHA256 Keys, Signing and Verification
//!
//! RSA conditions commit to the public modulus only. The public exponent is
//! fixed at 65537 and the modulus must be longer than 1017 bits and at most
//! 4096 bits. Signatures use RSASSA-PKCS1-v1_5 with SHA-256.
//!
//! ## Canonical Modulus
//!
//! [`RsaModulus`] always holds the unsigned big-endian modulus without
//! leading zero octets. The fingerprint and the cost are computed from
//! exactly these bytes.

use cryptocond_core::error::{ConditionError, CryptoError};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// The only accepted RSA public exponent.
pub const RSA_PUBLIC_EXPONENT: u64 = 65_537;

/// Modulus bit lengths must be strictly greater than this.
pub const RSA_MIN_MODULUS_BITS_EXCLUSIVE: usize = 1017;

/// Modulus bit lengths must be at most this.
pub const RSA_MAX_MODULUS_BITS: usize = 4096;

/// A validated RSA public modulus.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RsaModulus(Vec<u8>);

impl RsaModulus {
    /// Validate an RSA public key given as modulus bytes and exponent.
    pub fn from_public_key(modulus: &[u8], public_exponent: u64) -> Result<Self, ConditionError> {
        if public_exponent != RSA_PUBLIC_EXPONENT {
            return Err(ConditionError::InvalidRsaExponent(public_exponent));
        }
        Self::from_be_bytes(modulus)
    }

    /// Validate an unsigned big-endian modulus. Leading zero octets are
    /// stripped.
    pub fn from_be_bytes(modulus: &[u8]) -> Result<Self, ConditionError> {
        let skip = modulus.iter().take_while(|b| **b == 0).count();
        let bytes = &modulus[skip..];
        let bits = bit_length(bytes);
        if bits <= RSA_MIN_MODULUS_BITS_EXCLUSIVE || bits > RSA_MAX_MODULUS_BITS {
            return Err(ConditionError::InvalidRsaModulus { bits });
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the modulus in octets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bit_length(&self) -> usize {
        bit_length(&self.0)
    }

    fn to_public_key(&self) -> Result<RsaPublicKey, CryptoError> {
        RsaPublicKey::new(
            BigUint::from_bytes_be(&self.0),
            BigUint::from(RSA_PUBLIC_EXPONENT),
        )
        .map_err(|e| CryptoError::KeyError(format!("invalid RSA public key: {e}")))
    }
}

impl std::fmt::Debug for RsaModulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsaModulus({} bits)", self.bit_length())
    }
}

/// Bit length of an unsigned big-endian integer without leading zeros.
fn bit_length(bytes: &[u8]) -> usize {
    match bytes.first() {
        None => 0,
        Some(first) => (bytes.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify an RSASSA-PKCS1-v1_5 SHA-256 signature over `message`.
pub fn verify(modulus: &RsaModulus, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
    let key = modulus.to_public_key()?;
    let hashed = Sha256::digest(message);
    key.verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .map_err(|e| CryptoError::VerificationFailed(format!("RSA-SHA256 verification failed: {e}")))
}

// ---------------------------------------------------------------------------
// RsaKeyPair
// ---------------------------------------------------------------------------

/// An RSA private key with exponent 65537 for producing RSA fulfillments.
pub struct RsaKeyPair {
    private_key: RsaPrivateKey,
    modulus: RsaModulus,
}

impl RsaKeyPair {
    /// Generate a new random key pair with a modulus of `bits` bits.
    pub fn generate(bits: usize) -> Result<Self, CryptoError> {
        let mut rng = rand::rngs::OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| CryptoError::KeyError(format!("RSA key generation failed: {e}")))?;
        Self::from_private_key(private_key)
    }

    /// Wrap an existing private key. Its exponent and modulus size must be
    /// acceptable for RSA conditions.
    pub fn from_private_key(private_key: RsaPrivateKey) -> Result<Self, CryptoError> {
        let e_bytes = private_key.e().to_bytes_be();
        if e_bytes.len() > 8 {
            return Err(CryptoError::KeyError("RSA exponent does not fit u64".to_string()));
        }
        let exponent = e_bytes.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        let modulus = RsaModulus::from_public_key(&private_key.n().to_bytes_be(), exponent)
            .map_err(|e| CryptoError::KeyError(e.to_string()))?;
        Ok(Self {
            private_key,
            modulus,
        })
    }

    pub fn modulus(&self) -> &RsaModulus {
        &self.modulus
    }

    /// Sign `message` with RSASSA-PKCS1-v1_5 SHA-256.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let hashed = Sha256::digest(message);
        self.private_key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
            .map_err(|e| CryptoError::SigningFailed(format!("RSA-SHA256 signing failed: {e}")))
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsaKeyPair(<private>, {:?})", self.modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn key_pair() -> &'static RsaKeyPair {
        static KEY: OnceLock<RsaKeyPair> = OnceLock::new();
        KEY.get_or_init(|| RsaKeyPair::generate(1024).expect("key generation"))
    }

    fn modulus_of_bits(bits: usize) -> Vec<u8> {
        let len = bits.div_ceil(8);
        let mut bytes = vec![0xffu8; len];
        let top_bits = bits - (len - 1) * 8;
        bytes[0] = (1u16 << top_bits).wrapping_sub(1) as u8;
        bytes
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(&[]), 0);
        assert_eq!(bit_length(&[0x01]), 1);
        assert_eq!(bit_length(&[0x80]), 8);
        assert_eq!(bit_length(&[0x01, 0x00]), 9);
        assert_eq!(bit_length(&modulus_of_bits(1018)), 1018);
    }

    #[test]
    fn test_exponent_must_be_65537() {
        let modulus = modulus_of_bits(2048);
        assert_eq!(
            RsaModulus::from_public_key(&modulus, 3),
            Err(ConditionError::InvalidRsaExponent(3))
        );
        assert!(RsaModulus::from_public_key(&modulus, 65_537).is_ok());
    }

    #[test]
    fn test_modulus_size_bounds() {
        assert_eq!(
            RsaModulus::from_be_bytes(&modulus_of_bits(1017)),
            Err(ConditionError::InvalidRsaModulus { bits: 1017 })
        );
        assert!(RsaModulus::from_be_bytes(&modulus_of_bits(1018)).is_ok());
        assert!(RsaModulus::from_be_bytes(&modulus_of_bits(4096)).is_ok());
        assert_eq!(
            RsaModulus::from_be_bytes(&modulus_of_bits(4097)),
            Err(ConditionError::InvalidRsaModulus { bits: 4097 })
        );
    }

    #[test]
    fn test_leading_zeros_stripped() {
        let mut modulus = vec![0u8, 0u8];
        modulus.extend(modulus_of_bits(2048));
        let m = RsaModulus::from_be_bytes(&modulus).unwrap();
        assert_eq!(m.len(), 256);
        assert_eq!(m.bit_length(), 2048);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = key_pair();
        assert_eq!(kp.modulus().bit_length(), 1024);
        let sig = kp.sign(b"hello").unwrap();
        assert_eq!(sig.len(), kp.modulus().len());
        verify(kp.modulus(), b"hello", &sig).expect("valid signature should verify");
    }

    #[test]
    fn test_verify_wrong_message_fails() {
        let kp = key_pair();
        let sig = kp.sign(b"original").unwrap();
        assert!(verify(kp.modulus(), b"tampered", &sig).is_err());
    }

    #[test]
    fn test_verify_truncated_signature_fails() {
        let kp = key_pair();
        let sig = kp.sign(b"m").unwrap();
        assert!(verify(kp.modulus(), b"m", &sig[1..]).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let debug = format!("{:?}", key_pair());
        assert!(debug.starts_with("RsaKeyPair(<private>"));
    }
}
