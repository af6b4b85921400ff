//! # Conditions
//!
//! A `Condition` is the compact, publishable commitment: a type, a 32-byte
//! fingerprint, a cost and, for compound kinds, the set of subtypes. It is
//! an immutable value. The fingerprint and cost are computed once, at
//! construction.
//!
//! ## Construction Paths
//!
//! - From raw parameters: [`Condition::preimage_sha256`],
//!   [`Condition::rsa_sha256`], [`Condition::ed25519_sha256`],
//!   [`Condition::prefix_sha256`], [`Condition::threshold_sha256`].
//! - Derived from a fulfillment: [`crate::Fulfillment::condition`].
//! - Decoded: [`Condition::decode`] or [`Condition::from_uri`].
//!
//! ## Ordering
//!
//! Conditions are totally ordered by their canonical binary encodings,
//! compared as unsigned bytes with a strict prefix sorting first. Two
//! conditions are equal exactly when their encodings are equal.

use std::cmp::Ordering;

use cryptocond_core::{ConditionError, ConditionType, ConditionTypeSet, DecodeError};
use cryptocond_crypto::{sha256, RsaModulus};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{codec, fingerprint, uri};

/// Fingerprint and cost of a condition without subconditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimpleCondition {
    fingerprint: [u8; 32],
    cost: u64,
}

/// Fingerprint, cost and subtypes of a condition built from subconditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundCondition {
    fingerprint: [u8; 32],
    cost: u64,
    subtypes: ConditionTypeSet,
}

/// A crypto-condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    PreimageSha256(SimpleCondition),
    RsaSha256(SimpleCondition),
    PrefixSha256(CompoundCondition),
    ThresholdSha256(CompoundCondition),
    Ed25519Sha256(SimpleCondition),
}

impl SimpleCondition {
    fn from_contents(contents: &[u8], cost: u64) -> Self {
        Self {
            fingerprint: sha256(contents),
            cost,
        }
    }
}

impl CompoundCondition {
    fn from_contents(contents: &[u8], cost: u64, subtypes: ConditionTypeSet) -> Self {
        Self {
            fingerprint: sha256(contents),
            cost,
            subtypes,
        }
    }
}

impl Condition {
    /// Condition satisfied by revealing `preimage`.
    pub fn preimage_sha256(preimage: &[u8]) -> Self {
        Self::PreimageSha256(SimpleCondition::from_contents(
            &fingerprint::preimage_contents(preimage),
            fingerprint::preimage_cost(preimage),
        ))
    }

    /// Condition satisfied by an RSA-SHA256 signature under the given public
    /// key.
    ///
    /// # Errors
    ///
    /// Fails unless `public_exponent` is 65537 and the modulus is longer
    /// than 1017 bits and at most 4096 bits.
    pub fn rsa_sha256(modulus: &[u8], public_exponent: u64) -> Result<Self, ConditionError> {
        let modulus = RsaModulus::from_public_key(modulus, public_exponent)?;
        Ok(Self::from_rsa_modulus(&modulus))
    }

    /// Condition for an already validated RSA modulus.
    pub fn from_rsa_modulus(modulus: &RsaModulus) -> Self {
        Self::RsaSha256(SimpleCondition::from_contents(
            &fingerprint::rsa_contents(modulus),
            fingerprint::rsa_cost(modulus),
        ))
    }

    /// Condition satisfied by an Ed25519 signature under `public_key`.
    pub fn ed25519_sha256(public_key: &[u8; 32]) -> Self {
        Self::Ed25519Sha256(SimpleCondition::from_contents(
            &fingerprint::ed25519_contents(public_key),
            fingerprint::ED25519_COST,
        ))
    }

    /// Condition satisfied when `subcondition` is fulfilled over
    /// `prefix || message`, for messages keeping that concatenation within
    /// `max_message_length` bytes.
    ///
    /// # Errors
    ///
    /// Fails with [`ConditionError::CostOverflow`] if the cost does not fit
    /// `u64`.
    pub fn prefix_sha256(
        prefix: &[u8],
        max_message_length: u64,
        subcondition: &Condition,
    ) -> Result<Self, ConditionError> {
        let cost = fingerprint::prefix_cost(prefix, max_message_length, subcondition.cost())?;
        Ok(Self::PrefixSha256(CompoundCondition::from_contents(
            &fingerprint::prefix_contents(prefix, max_message_length, subcondition),
            cost,
            fingerprint::subtypes(ConditionType::PrefixSha256, [subcondition]),
        )))
    }

    /// Condition satisfied when the weights of fulfilled subconditions add
    /// up to at least `threshold`.
    ///
    /// # Errors
    ///
    /// Fails if there are no subconditions, any weight is zero, the
    /// threshold is zero or exceeds the total weight, or the cost overflows.
    pub fn threshold_sha256(
        threshold: u32,
        subconditions: &[(u32, Condition)],
    ) -> Result<Self, ConditionError> {
        validate_threshold(threshold, subconditions.iter().map(|(w, _)| *w))?;
        let costs: Vec<u64> = subconditions.iter().map(|(_, c)| c.cost()).collect();
        let cost = fingerprint::threshold_cost(threshold, &costs)?;
        Ok(Self::ThresholdSha256(CompoundCondition::from_contents(
            &fingerprint::threshold_contents(threshold, subconditions),
            cost,
            fingerprint::subtypes(
                ConditionType::ThresholdSha256,
                subconditions.iter().map(|(_, c)| c),
            ),
        )))
    }

    /// Reassemble a condition from its published parts.
    ///
    /// `subtypes` must be `Some` exactly for compound types. The condition's
    /// own type is never accepted as one of its subtypes.
    pub fn from_parts(
        condition_type: ConditionType,
        fingerprint: [u8; 32],
        cost: u64,
        subtypes: Option<ConditionTypeSet>,
    ) -> Result<Self, DecodeError> {
        let simple = || SimpleCondition { fingerprint, cost };
        let compound = |subtypes: ConditionTypeSet| {
            if subtypes.contains(condition_type) {
                return Err(DecodeError::invalid(
                    "subtypes",
                    format!("{condition_type} cannot be its own subtype"),
                ));
            }
            Ok(CompoundCondition {
                fingerprint,
                cost,
                subtypes,
            })
        };
        match (condition_type, subtypes) {
            (ConditionType::PreimageSha256, None) => Ok(Self::PreimageSha256(simple())),
            (ConditionType::RsaSha256, None) => Ok(Self::RsaSha256(simple())),
            (ConditionType::Ed25519Sha256, None) => Ok(Self::Ed25519Sha256(simple())),
            (ConditionType::PrefixSha256, Some(s)) => compound(s).map(Self::PrefixSha256),
            (ConditionType::ThresholdSha256, Some(s)) => compound(s).map(Self::ThresholdSha256),
            (t, Some(_)) => Err(DecodeError::invalid(
                "subtypes",
                format!("{t} conditions have no subtypes"),
            )),
            (t, None) => Err(DecodeError::invalid(
                "subtypes",
                format!("{t} conditions require subtypes"),
            )),
        }
    }

    pub fn condition_type(&self) -> ConditionType {
        match self {
            Self::PreimageSha256(_) => ConditionType::PreimageSha256,
            Self::RsaSha256(_) => ConditionType::RsaSha256,
            Self::PrefixSha256(_) => ConditionType::PrefixSha256,
            Self::ThresholdSha256(_) => ConditionType::ThresholdSha256,
            Self::Ed25519Sha256(_) => ConditionType::Ed25519Sha256,
        }
    }

    pub fn fingerprint(&self) -> &[u8; 32] {
        match self {
            Self::PreimageSha256(c) | Self::RsaSha256(c) | Self::Ed25519Sha256(c) => &c.fingerprint,
            Self::PrefixSha256(c) | Self::ThresholdSha256(c) => &c.fingerprint,
        }
    }

    pub fn cost(&self) -> u64 {
        match self {
            Self::PreimageSha256(c) | Self::RsaSha256(c) | Self::Ed25519Sha256(c) => c.cost,
            Self::PrefixSha256(c) | Self::ThresholdSha256(c) => c.cost,
        }
    }

    /// Types reachable beneath this condition. `None` for simple kinds.
    pub fn subtypes(&self) -> Option<ConditionTypeSet> {
        match self {
            Self::PreimageSha256(_) | Self::RsaSha256(_) | Self::Ed25519Sha256(_) => None,
            Self::PrefixSha256(c) | Self::ThresholdSha256(c) => Some(c.subtypes),
        }
    }

    /// Canonical DER encoding.
    pub fn encode(&self) -> Vec<u8> {
        codec::write_condition(self)
    }

    /// Decode a DER-encoded condition. The whole buffer must be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::read_condition(bytes)
    }

    /// The `ni:///sha-256;...` URI of this condition.
    pub fn to_uri(&self) -> String {
        uri::condition_to_uri(self)
    }

    pub fn from_uri(s: &str) -> Result<Self, uri::UriError> {
        uri::condition_from_uri(s)
    }
}

/// Threshold parameters: at least one entry, every weight at least 1,
/// `1 <= threshold <= total weight`.
pub(crate) fn validate_threshold(
    threshold: u32,
    weights: impl IntoIterator<Item = u32>,
) -> Result<(), ConditionError> {
    let mut count = 0usize;
    let mut total_weight = 0u64;
    for weight in weights {
        if weight == 0 {
            return Err(ConditionError::InvalidWeight);
        }
        count += 1;
        total_weight += u64::from(weight);
    }
    if count == 0 {
        return Err(ConditionError::EmptySubconditions);
    }
    if threshold == 0 || u64::from(threshold) > total_weight {
        return Err(ConditionError::InvalidThreshold {
            threshold,
            total_weight,
        });
    }
    Ok(())
}

impl Ord for Condition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encode().cmp(&other.encode())
    }
}

impl PartialOrd for Condition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl std::str::FromStr for Condition {
    type Err = uri::UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uri(s)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_uri(&s).map_err(serde::de::Error::custom)
    }
}
