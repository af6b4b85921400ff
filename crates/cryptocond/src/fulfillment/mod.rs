//! # Fulfillments
//!
//! A `Fulfillment` is the secret or signature material that satisfies a
//! [`Condition`]. Every fulfillment derives its condition from its own
//! contents. Verification against an expected condition first checks that
//! the derived condition is equal to it, then checks the kind-specific
//! cryptographic proof over the message.
//!
//! ## Verification Semantics
//!
//! A fulfillment that does not satisfy a condition is not an error:
//! [`Fulfillment::verify`] returns `false`. Errors are reserved for
//! malformed encodings and invalid construction parameters.
//!
//! ## Memoized Conditions
//!
//! The derived condition is computed on first use and cached in a
//! [`OnceLock`]. Concurrent first calls may each compute it; the first value
//! stored wins and all computed values are byte-identical. Equality and
//! ordering ignore the cache.

mod ed25519;
mod prefix;
mod preimage;
mod rsa;
mod threshold;

pub use ed25519::Ed25519Sha256Fulfillment;
pub use prefix::PrefixSha256Fulfillment;
pub use preimage::PreimageSha256Fulfillment;
pub use rsa::RsaSha256Fulfillment;
pub use threshold::{ThresholdEntry, ThresholdSha256Fulfillment};

use std::cmp::Ordering;
use std::sync::OnceLock;

use cryptocond_core::{ConditionError, ConditionType, DecodeError, DecodeLimits};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::condition::Condition;
use crate::{codec, uri};

/// A crypto-condition fulfillment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fulfillment {
    PreimageSha256(PreimageSha256Fulfillment),
    RsaSha256(RsaSha256Fulfillment),
    PrefixSha256(PrefixSha256Fulfillment),
    ThresholdSha256(ThresholdSha256Fulfillment),
    Ed25519Sha256(Ed25519Sha256Fulfillment),
}

impl Fulfillment {
    pub fn condition_type(&self) -> ConditionType {
        match self {
            Self::PreimageSha256(_) => ConditionType::PreimageSha256,
            Self::RsaSha256(_) => ConditionType::RsaSha256,
            Self::PrefixSha256(_) => ConditionType::PrefixSha256,
            Self::ThresholdSha256(_) => ConditionType::ThresholdSha256,
            Self::Ed25519Sha256(_) => ConditionType::Ed25519Sha256,
        }
    }

    /// The condition this fulfillment satisfies.
    ///
    /// # Errors
    ///
    /// Fails if the fulfillment's parameters do not describe a valid
    /// condition, for example a prefix whose cost overflows `u64`.
    pub fn condition(&self) -> Result<&Condition, ConditionError> {
        match self {
            Self::PreimageSha256(f) => Ok(f.condition()),
            Self::RsaSha256(f) => Ok(f.condition()),
            Self::PrefixSha256(f) => f.condition(),
            Self::ThresholdSha256(f) => f.condition(),
            Self::Ed25519Sha256(f) => Ok(f.condition()),
        }
    }

    /// Check this fulfillment against `condition` for `message`.
    ///
    /// Returns `false` on any mismatch, including a fulfillment whose own
    /// condition cannot be derived.
    pub fn verify(&self, condition: &Condition, message: &[u8]) -> bool {
        match self.condition() {
            Ok(derived) if derived == condition => {}
            Ok(derived) => {
                debug!(
                    expected = %condition,
                    derived = %derived,
                    "fulfillment does not match condition"
                );
                return false;
            }
            Err(e) => {
                debug!(error = %e, "fulfillment condition cannot be derived");
                return false;
            }
        }
        let valid = match self {
            Self::PreimageSha256(_) => true,
            Self::RsaSha256(f) => f.verify_message(message),
            Self::PrefixSha256(f) => f.verify_message(message),
            Self::ThresholdSha256(f) => f.verify_message(message),
            Self::Ed25519Sha256(f) => f.verify_message(message),
        };
        if !valid {
            debug!(condition_type = %self.condition_type(), "fulfillment proof rejected");
        }
        valid
    }

    /// The payload body carried inside the binary envelope.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Self::PreimageSha256(f) => f.preimage().to_vec(),
            Self::RsaSha256(f) => f.payload(),
            Self::PrefixSha256(f) => f.payload(),
            Self::ThresholdSha256(f) => f.payload(),
            Self::Ed25519Sha256(f) => f.payload(),
        }
    }

    /// Canonical binary encoding: a 16-bit type code followed by the payload
    /// as an octet string.
    pub fn encode(&self) -> Vec<u8> {
        codec::write_fulfillment(self)
    }

    /// Decode a binary fulfillment with the default [`DecodeLimits`].
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with_limits(bytes, &DecodeLimits::default())
    }

    pub fn decode_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Result<Self, DecodeError> {
        codec::read_fulfillment(bytes, limits)
    }

    /// The `cf:<type>:<payload>` URI of this fulfillment.
    pub fn to_uri(&self) -> String {
        uri::fulfillment_to_uri(self)
    }

    pub fn from_uri(s: &str) -> Result<Self, uri::UriError> {
        uri::fulfillment_from_uri(s)
    }
}

impl From<PreimageSha256Fulfillment> for Fulfillment {
    fn from(f: PreimageSha256Fulfillment) -> Self {
        Self::PreimageSha256(f)
    }
}

impl From<RsaSha256Fulfillment> for Fulfillment {
    fn from(f: RsaSha256Fulfillment) -> Self {
        Self::RsaSha256(f)
    }
}

impl From<PrefixSha256Fulfillment> for Fulfillment {
    fn from(f: PrefixSha256Fulfillment) -> Self {
        Self::PrefixSha256(f)
    }
}

impl From<ThresholdSha256Fulfillment> for Fulfillment {
    fn from(f: ThresholdSha256Fulfillment) -> Self {
        Self::ThresholdSha256(f)
    }
}

impl From<Ed25519Sha256Fulfillment> for Fulfillment {
    fn from(f: Ed25519Sha256Fulfillment) -> Self {
        Self::Ed25519Sha256(f)
    }
}

impl Ord for Fulfillment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encode().cmp(&other.encode())
    }
}

impl PartialOrd for Fulfillment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Fulfillment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl std::str::FromStr for Fulfillment {
    type Err = uri::UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl Serialize for Fulfillment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for Fulfillment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_uri(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// DerivedCondition
// ---------------------------------------------------------------------------

/// Lazily computed condition of a fulfillment.
///
/// Compares equal to every other instance so that fulfillment equality is
/// decided by content alone.
#[derive(Default)]
pub(crate) struct DerivedCondition(OnceLock<Condition>);

impl DerivedCondition {
    /// A cell already holding `condition`.
    pub(crate) fn with(condition: Condition) -> Self {
        Self(OnceLock::from(condition))
    }

    pub(crate) fn get_or_try_init(
        &self,
        derive: impl FnOnce() -> Result<Condition, ConditionError>,
    ) -> Result<&Condition, ConditionError> {
        if let Some(condition) = self.0.get() {
            return Ok(condition);
        }
        let condition = derive()?;
        Ok(self.0.get_or_init(|| condition))
    }

    pub(crate) fn get_or_init(&self, derive: impl FnOnce() -> Condition) -> &Condition {
        self.0.get_or_init(derive)
    }
}

impl Clone for DerivedCondition {
    fn clone(&self) -> Self {
        match self.0.get() {
            Some(condition) => Self::with(condition.clone()),
            None => Self::default(),
        }
    }
}

impl PartialEq for DerivedCondition {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for DerivedCondition {}

impl std::fmt::Debug for DerivedCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.get() {
            Some(_) => f.write_str("DerivedCondition(cached)"),
            None => f.write_str("DerivedCondition(pending)"),
        }
    }
}
