//! # Condition Types: Single Source of Truth
//!
//! Defines the closed `ConditionType` enum and `ConditionTypeSet`, the set
//! of types reachable beneath a compound condition. Every `match` on
//! `ConditionType` is exhaustive, so adding a kind forces every encoder,
//! verifier and cost rule to handle it at compile time.
//!
//! ## Wire Representation
//!
//! | Code | Type | Name | Compound |
//! |------|------|------|----------|
//! | 0 | `PreimageSha256` | `preimage-sha-256` | no |
//! | 1 | `RsaSha256` | `rsa-sha-256` | no |
//! | 2 | `PrefixSha256` | `prefix-sha-256` | yes |
//! | 3 | `ThresholdSha256` | `threshold-sha-256` | yes |
//! | 4 | `Ed25519Sha256` | `ed25519-sha-256` | no |
//!
//! The code is the DER CHOICE tag of an encoded condition, the 16-bit type
//! discriminator of an encoded fulfillment, and the bit position inside the
//! subtypes BIT STRING.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DecodeError;

/// The five crypto-condition kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConditionType {
    /// SHA-256 hash preimage.
    #[serde(rename = "preimage-sha-256")]
    PreimageSha256,
    /// RSA-SHA256 signature.
    #[serde(rename = "rsa-sha-256")]
    RsaSha256,
    /// Prefix prepended to the message before a subcondition is checked.
    #[serde(rename = "prefix-sha-256")]
    PrefixSha256,
    /// Weighted M-of-N over subconditions.
    #[serde(rename = "threshold-sha-256")]
    ThresholdSha256,
    /// Ed25519 signature.
    #[serde(rename = "ed25519-sha-256")]
    Ed25519Sha256,
}

/// Number of condition types. Bounds the subtypes bitset.
pub const CONDITION_TYPE_COUNT: usize = 5;

impl ConditionType {
    /// Returns all condition types in type-code order.
    pub fn all() -> &'static [ConditionType] {
        &[
            Self::PreimageSha256,
            Self::RsaSha256,
            Self::PrefixSha256,
            Self::ThresholdSha256,
            Self::Ed25519Sha256,
        ]
    }

    /// The numeric type code.
    pub fn code(self) -> u16 {
        match self {
            Self::PreimageSha256 => 0,
            Self::RsaSha256 => 1,
            Self::PrefixSha256 => 2,
            Self::ThresholdSha256 => 3,
            Self::Ed25519Sha256 => 4,
        }
    }

    /// Look up a type by its numeric code.
    pub fn from_code(code: u16) -> Result<Self, DecodeError> {
        match code {
            0 => Ok(Self::PreimageSha256),
            1 => Ok(Self::RsaSha256),
            2 => Ok(Self::PrefixSha256),
            3 => Ok(Self::ThresholdSha256),
            4 => Ok(Self::Ed25519Sha256),
            other => Err(DecodeError::UnknownType(other)),
        }
    }

    /// The textual type name used in condition URIs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreimageSha256 => "preimage-sha-256",
            Self::RsaSha256 => "rsa-sha-256",
            Self::PrefixSha256 => "prefix-sha-256",
            Self::ThresholdSha256 => "threshold-sha-256",
            Self::Ed25519Sha256 => "ed25519-sha-256",
        }
    }

    /// Whether conditions of this type are built from subconditions.
    pub fn is_compound(self) -> bool {
        match self {
            Self::PrefixSha256 | Self::ThresholdSha256 => true,
            Self::PreimageSha256 | Self::RsaSha256 | Self::Ed25519Sha256 => false,
        }
    }

    fn bit(self) -> u8 {
        1 << self.code()
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionType {
    type Err = DecodeError;

    /// Parse a condition type from its URI name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownTypeName(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ConditionTypeSet
// ---------------------------------------------------------------------------

/// A set of condition types, stored as a bitset over the type codes.
///
/// Iteration yields types in type-code order, which is also the order used
/// by the URI `subtypes` parameter.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConditionTypeSet(u8);

impl ConditionTypeSet {
    /// The empty set.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a type. Returns `true` if it was not already present.
    pub fn insert(&mut self, t: ConditionType) -> bool {
        let absent = !self.contains(t);
        self.0 |= t.bit();
        absent
    }

    /// Remove a type. Returns `true` if it was present.
    pub fn remove(&mut self, t: ConditionType) -> bool {
        let present = self.contains(t);
        self.0 &= !t.bit();
        present
    }

    pub fn contains(&self, t: ConditionType) -> bool {
        self.0 & t.bit() != 0
    }

    /// Add every type of `other` to this set.
    pub fn extend_from(&mut self, other: ConditionTypeSet) {
        self.0 |= other.0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the members in type-code order.
    pub fn iter(&self) -> impl Iterator<Item = ConditionType> + '_ {
        ConditionType::all()
            .iter()
            .copied()
            .filter(move |t| self.contains(*t))
    }

    /// DER BIT STRING contents: the unused-bits octet followed by the
    /// named bits, type code `i` at bit `i` counted from the most
    /// significant bit. Trailing zero bits are dropped.
    pub fn to_bit_string(&self) -> Vec<u8> {
        let highest = match self.iter().last() {
            Some(t) => t.code() as usize,
            None => return vec![0x00],
        };
        let used_bits = highest + 1;
        let mut bits = vec![0u8; used_bits.div_ceil(8)];
        for t in self.iter() {
            let i = t.code() as usize;
            bits[i / 8] |= 0x80 >> (i % 8);
        }
        let unused = (bits.len() * 8 - used_bits) as u8;
        let mut out = Vec::with_capacity(bits.len() + 1);
        out.push(unused);
        out.extend_from_slice(&bits);
        out
    }

    /// Parse DER BIT STRING contents produced by [`Self::to_bit_string`].
    ///
    /// Rejects non-canonical encodings (set padding bits, trailing zero
    /// bits) and bits naming unknown types.
    pub fn from_bit_string(contents: &[u8]) -> Result<Self, DecodeError> {
        let (&unused, bits) = contents
            .split_first()
            .ok_or_else(|| DecodeError::invalid("subtypes", "empty bit string"))?;
        if unused > 7 || (bits.is_empty() && unused != 0) {
            return Err(DecodeError::invalid(
                "subtypes",
                format!("invalid unused bit count {unused}"),
            ));
        }
        let Some(&last) = bits.last() else {
            return Ok(Self::new());
        };
        if last & ((1u8 << unused) - 1) != 0 {
            return Err(DecodeError::invalid("subtypes", "padding bits are set"));
        }
        if last & (1u8 << unused) == 0 {
            return Err(DecodeError::invalid("subtypes", "trailing zero bits"));
        }

        let mut set = Self::new();
        for (byte_index, byte) in bits.iter().enumerate() {
            for bit in 0..8 {
                if byte & (0x80 >> bit) == 0 {
                    continue;
                }
                let code = byte_index * 8 + bit;
                let t = u16::try_from(code)
                    .map_err(|_| DecodeError::invalid("subtypes", "bit string too long"))
                    .and_then(ConditionType::from_code)?;
                set.insert(t);
            }
        }
        Ok(set)
    }
}

impl FromIterator<ConditionType> for ConditionTypeSet {
    fn from_iter<I: IntoIterator<Item = ConditionType>>(iter: I) -> Self {
        let mut set = Self::new();
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl std::fmt::Debug for ConditionTypeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl std::fmt::Display for ConditionTypeSet {
    /// Comma-separated type names, as used by the condition URI.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for t in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(t.as_str())?;
            first = false;
        }
        Ok(())
    }
}
