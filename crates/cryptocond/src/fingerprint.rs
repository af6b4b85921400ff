//! # Fingerprint Contents and Cost Rules
//!
//! Pure functions producing the canonical DER fingerprint contents of each
//! condition kind, and the cost formulas. Two independent implementations
//! must agree on these bytes exactly, since only the SHA-256 digest of the
//! contents is ever published.
//!
//! | Kind | Contents | Cost |
//! |------|----------|------|
//! | Preimage | `SEQUENCE { [0] preimage }` | `len(preimage)` |
//! | RSA | `SEQUENCE { [0] modulus }` | `len(modulus)^2` |
//! | Ed25519 | `SEQUENCE { [0] public key }` | `131072` |
//! | Prefix | `SEQUENCE { [0] prefix, [1] maxMessageLength, [2] subcondition }` | `len(prefix) + maxMessageLength + sub cost + 1024` |
//! | Threshold | `SEQUENCE { [0] threshold, [1] SET OF { [0] weight, [1] subcondition } }` | `sum of the threshold largest sub costs + 1024 * n` |

use cryptocond_core::der::{integer_bytes, DerWriter};
use cryptocond_core::{ConditionError, ConditionType, ConditionTypeSet};
use cryptocond_crypto::RsaModulus;

use crate::condition::Condition;

/// Fixed cost of an Ed25519 condition.
pub const ED25519_COST: u64 = 131_072;

/// Fixed overhead added to every prefix condition.
pub const PREFIX_COST_OVERHEAD: u64 = 1024;

/// Overhead added to a threshold condition per subcondition.
pub const THRESHOLD_COST_PER_SUBCONDITION: u64 = 1024;

// ---------------------------------------------------------------------------
// Fingerprint contents
// ---------------------------------------------------------------------------

fn single_field_sequence(contents: &[u8]) -> Vec<u8> {
    let mut fields = DerWriter::new();
    fields.write_tagged_object(0, contents);
    let mut out = DerWriter::new();
    out.write_sequence(fields.as_bytes());
    out.into_bytes()
}

pub fn preimage_contents(preimage: &[u8]) -> Vec<u8> {
    single_field_sequence(preimage)
}

pub fn rsa_contents(modulus: &RsaModulus) -> Vec<u8> {
    single_field_sequence(modulus.as_bytes())
}

pub fn ed25519_contents(public_key: &[u8; 32]) -> Vec<u8> {
    single_field_sequence(public_key)
}

pub fn prefix_contents(prefix: &[u8], max_message_length: u64, subcondition: &Condition) -> Vec<u8> {
    let mut fields = DerWriter::new();
    fields
        .write_tagged_object(0, prefix)
        .write_tagged_object(1, &integer_bytes(max_message_length))
        .write_tagged_constructed_object(2, &subcondition.encode());
    let mut out = DerWriter::new();
    out.write_sequence(fields.as_bytes());
    out.into_bytes()
}

/// Threshold contents. Subconditions are a DER SET OF, so their encodings
/// are sorted before being concatenated and the caller's order is
/// irrelevant.
pub fn threshold_contents(threshold: u32, subconditions: &[(u32, Condition)]) -> Vec<u8> {
    let mut encoded: Vec<Vec<u8>> = subconditions
        .iter()
        .map(|(weight, condition)| {
            let mut fields = DerWriter::new();
            fields
                .write_tagged_object(0, &integer_bytes(u64::from(*weight)))
                .write_tagged_constructed_object(1, &condition.encode());
            let mut entry = DerWriter::new();
            entry.write_sequence(fields.as_bytes());
            entry.into_bytes()
        })
        .collect();
    encoded.sort();

    let mut fields = DerWriter::new();
    fields
        .write_tagged_object(0, &integer_bytes(u64::from(threshold)))
        .write_tagged_constructed_object(1, &encoded.concat());
    let mut out = DerWriter::new();
    out.write_sequence(fields.as_bytes());
    out.into_bytes()
}

// ---------------------------------------------------------------------------
// Cost
// ---------------------------------------------------------------------------

pub fn preimage_cost(preimage: &[u8]) -> u64 {
    preimage.len() as u64
}

pub fn rsa_cost(modulus: &RsaModulus) -> u64 {
    let len = modulus.len() as u64;
    len * len
}

pub fn prefix_cost(
    prefix: &[u8],
    max_message_length: u64,
    subcondition_cost: u64,
) -> Result<u64, ConditionError> {
    (prefix.len() as u64)
        .checked_add(max_message_length)
        .and_then(|c| c.checked_add(subcondition_cost))
        .and_then(|c| c.checked_add(PREFIX_COST_OVERHEAD))
        .ok_or(ConditionError::CostOverflow)
}

/// Sum of the `threshold` largest subcondition costs plus a per-subcondition
/// overhead. Every weight is at least 1, so no satisfying selection needs
/// more than `threshold` subconditions.
pub fn threshold_cost(threshold: u32, subcondition_costs: &[u64]) -> Result<u64, ConditionError> {
    let mut costs = subcondition_costs.to_vec();
    costs.sort_unstable_by(|a, b| b.cmp(a));
    let largest = costs
        .iter()
        .take(threshold as usize)
        .try_fold(0u64, |acc, c| acc.checked_add(*c))
        .ok_or(ConditionError::CostOverflow)?;
    (costs.len() as u64)
        .checked_mul(THRESHOLD_COST_PER_SUBCONDITION)
        .and_then(|overhead| overhead.checked_add(largest))
        .ok_or(ConditionError::CostOverflow)
}

// ---------------------------------------------------------------------------
// Subtypes
// ---------------------------------------------------------------------------

/// Types reachable beneath a compound condition of type `own`: each direct
/// child's type and subtypes, without `own` itself.
pub fn subtypes<'a>(
    own: ConditionType,
    children: impl IntoIterator<Item = &'a Condition>,
) -> ConditionTypeSet {
    let mut set = ConditionTypeSet::new();
    for child in children {
        set.insert(child.condition_type());
        if let Some(nested) = child.subtypes() {
            set.extend_from(nested);
        }
    }
    set.remove(own);
    set
}
