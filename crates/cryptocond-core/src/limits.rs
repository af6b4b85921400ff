//! # Decode Limits
//!
//! Caller-supplied bounds applied while decoding untrusted fulfillments.
//! Recursion is already bounded by the input length, since every nested
//! level consumes bytes, but a tight depth bound keeps stack use predictable
//! for deeply nested prefix chains.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Bounds applied by the fulfillment decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum nesting depth of compound fulfillments. The outermost
    /// fulfillment is depth 0.
    pub max_depth: usize,
    /// Maximum encoded input size in bytes.
    pub max_input_len: usize,
}

impl DecodeLimits {
    /// Default nesting depth bound.
    pub const DEFAULT_MAX_DEPTH: usize = 64;
    /// Default input size bound (1 MiB).
    pub const DEFAULT_MAX_INPUT_LEN: usize = 1 << 20;

    /// Limits with no practical bound. Recursion is still bounded by the
    /// input length.
    pub fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
            max_input_len: usize::MAX,
        }
    }

    pub fn check_input(&self, input: &[u8]) -> Result<(), DecodeError> {
        if input.len() > self.max_input_len {
            return Err(DecodeError::InputTooLarge {
                len: input.len(),
                limit: self.max_input_len,
            });
        }
        Ok(())
    }

    pub fn check_depth(&self, depth: usize) -> Result<(), DecodeError> {
        if depth > self.max_depth {
            return Err(DecodeError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_input_len: Self::DEFAULT_MAX_INPUT_LEN,
        }
    }
}
