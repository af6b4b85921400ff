//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout the crypto-conditions workspace.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Malformed input ([`DecodeError`]) carries the offending tag, type code,
//!   or expected vs actual length so the input can be diagnosed.
//! - Invalid construction parameters ([`ConditionError`]) surface before the
//!   value exists; an invalid condition is never created.
//! - A fulfillment that does not satisfy its condition is NOT an error.
//!   Verification returns `bool`.

use thiserror::Error;

use crate::types::ConditionType;

/// Top-level error type for the crypto-conditions workspace.
#[derive(Error, Debug)]
pub enum CryptoConditionError {
    /// Binary input could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Construction parameters were rejected.
    #[error("condition error: {0}")]
    Condition(#[from] ConditionError),

    /// A cryptographic primitive failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Error while reading a DER-encoded condition or an OER-encoded fulfillment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the element was complete.
    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Bytes required by the length indicator.
        needed: usize,
        /// Bytes actually left in the buffer.
        remaining: usize,
    },

    /// The indefinite length form (`0x80`) is not allowed in canonical encodings.
    #[error("indefinite length form is not allowed")]
    IndefiniteLength,

    /// The reserved length octet (`0xFF`) was encountered.
    #[error("reserved length form 0xff encountered")]
    ReservedLength,

    /// A long-form length that could have been encoded in fewer bytes.
    #[error("length is not minimally encoded")]
    NonMinimalLength,

    /// A long-form length with more length bytes than supported.
    #[error("length uses {0} length bytes, at most 8 are supported")]
    UnsupportedLength(usize),

    /// An element carried a different identifier octet than expected.
    #[error("unexpected tag: expected 0x{expected:02x}, found 0x{found:02x}")]
    UnexpectedTag {
        /// The identifier octet the reader required.
        expected: u8,
        /// The identifier octet present in the input.
        found: u8,
    },

    /// Bytes were left over after the value was fully decoded.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// An integer had a redundant leading zero byte.
    #[error("integer is not minimally encoded")]
    NonMinimalInteger,

    /// An integer does not fit the target width.
    #[error("integer value overflows {0} bits")]
    IntegerOverflow(u32),

    /// A type code outside the known condition types.
    #[error("unknown condition type code {0}")]
    UnknownType(u16),

    /// A type name outside the known condition types.
    #[error("unknown condition type name {0:?}")]
    UnknownTypeName(String),

    /// A recognised condition type that this codec path cannot handle.
    #[error("condition type {0} is not implemented by this codec")]
    Unimplemented(ConditionType),

    /// A structurally valid field holding an unacceptable value.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Nested fulfillments went deeper than the configured limit.
    #[error("nesting depth exceeds limit of {0}")]
    DepthExceeded(usize),

    /// The input is larger than the configured limit.
    #[error("input of {len} bytes exceeds limit of {limit}")]
    InputTooLarge {
        /// Input length in bytes.
        len: usize,
        /// Configured maximum.
        limit: usize,
    },
}

impl DecodeError {
    /// Shorthand for [`DecodeError::InvalidField`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Error raised when condition parameters are rejected at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// RSA public exponent other than 65537.
    #[error("RSA public exponent must be 65537, got {0}")]
    InvalidRsaExponent(u64),

    /// RSA modulus outside the permitted size range.
    #[error("RSA modulus must be between 1018 and 4096 bits, got {bits}")]
    InvalidRsaModulus {
        /// Bit length of the rejected modulus.
        bits: usize,
    },

    /// Threshold of zero, or larger than the total weight.
    #[error("threshold {threshold} must be between 1 and the total weight {total_weight}")]
    InvalidThreshold {
        /// Requested threshold.
        threshold: u32,
        /// Sum of all subcondition weights.
        total_weight: u64,
    },

    /// A subcondition weight of zero.
    #[error("subcondition weight must be at least 1")]
    InvalidWeight,

    /// A threshold condition with no subconditions.
    #[error("threshold condition requires at least one subcondition")]
    EmptySubconditions,

    /// Cost arithmetic overflowed.
    #[error("condition cost overflows u64")]
    CostOverflow,
}

/// Error in cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Signing failed.
    #[error("signing error: {0}")]
    SigningFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every condition parameter failure, listed without a wildcard arm so a
    // new variant has to be placed here. Key parsing belongs to `CryptoError`.
    fn describe(e: &ConditionError) -> &'static str {
        match e {
            ConditionError::InvalidRsaExponent(_) => "rsa exponent",
            ConditionError::InvalidRsaModulus { .. } => "rsa modulus",
            ConditionError::InvalidThreshold { .. } => "threshold",
            ConditionError::InvalidWeight => "weight",
            ConditionError::EmptySubconditions => "subconditions",
            ConditionError::CostOverflow => "cost",
        }
    }

    #[test]
    fn test_condition_error_variants() {
        assert_eq!(describe(&ConditionError::InvalidWeight), "weight");
        assert_eq!(describe(&ConditionError::CostOverflow), "cost");
        assert_eq!(
            ConditionError::InvalidThreshold {
                threshold: 3,
                total_weight: 2
            }
            .to_string(),
            "threshold 3 must be between 1 and the total weight 2"
        );
    }

    #[test]
    fn test_key_errors_surface_as_crypto() {
        let err: CryptoConditionError = CryptoError::KeyError("bad point".into()).into();
        assert!(matches!(
            err,
            CryptoConditionError::Crypto(CryptoError::KeyError(_))
        ));
        assert_eq!(err.to_string(), "crypto error: key error: bad point");
    }
}
