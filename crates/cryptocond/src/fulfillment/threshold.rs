//! THRESHOLD-SHA-256: weighted subfulfillments that must reach a threshold.
//!
//! Payload: `var-uint threshold`, `var-uint count`, then `count` pairs of
//! `var-uint weight` and a nested fulfillment envelope, in stream order.
//!
//! Every entry carries a fulfillment. Entries that do not verify for a
//! message still contribute their condition to the fingerprint but add no
//! weight.

use cryptocond_core::oer::{OerReader, OerWriter};
use cryptocond_core::{ConditionError, DecodeError, DecodeLimits};
use tracing::debug;

use super::{DerivedCondition, Fulfillment};
use crate::codec;
use crate::condition::{validate_threshold, Condition};

/// One weighted branch of a threshold fulfillment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdEntry {
    pub weight: u32,
    pub fulfillment: Fulfillment,
}

impl ThresholdEntry {
    pub fn new(weight: u32, fulfillment: impl Into<Fulfillment>) -> Self {
        Self {
            weight,
            fulfillment: fulfillment.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdSha256Fulfillment {
    threshold: u32,
    entries: Vec<ThresholdEntry>,
    condition: DerivedCondition,
}

impl ThresholdSha256Fulfillment {
    /// # Errors
    ///
    /// Fails if `entries` is empty, any weight is zero, or `threshold` is
    /// zero or exceeds the total weight.
    pub fn new(threshold: u32, entries: Vec<ThresholdEntry>) -> Result<Self, ConditionError> {
        validate_threshold(threshold, entries.iter().map(|e| e.weight))?;
        Ok(Self {
            threshold,
            entries,
            condition: DerivedCondition::default(),
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn entries(&self) -> &[ThresholdEntry] {
        &self.entries
    }

    pub fn condition(&self) -> Result<&Condition, ConditionError> {
        self.condition.get_or_try_init(|| {
            let subconditions = self
                .entries
                .iter()
                .map(|e| -> Result<_, ConditionError> {
                    Ok((e.weight, e.fulfillment.condition()?.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Condition::threshold_sha256(self.threshold, &subconditions)
        })
    }

    /// Every entry is evaluated; the satisfied weight must reach the
    /// threshold.
    pub(crate) fn verify_message(&self, message: &[u8]) -> bool {
        let satisfied: u64 = self
            .entries
            .iter()
            .filter(|entry| match entry.fulfillment.condition() {
                Ok(c) => entry.fulfillment.verify(c, message),
                Err(_) => false,
            })
            .map(|entry| u64::from(entry.weight))
            .sum();
        let met = satisfied >= u64::from(self.threshold);
        if !met {
            debug!(
                satisfied,
                threshold = self.threshold,
                "threshold fulfillment below threshold"
            );
        }
        met
    }

    pub(crate) fn payload(&self) -> Vec<u8> {
        let mut w = OerWriter::new();
        w.write_var_u_int(u64::from(self.threshold))
            .write_var_u_int(self.entries.len() as u64);
        for entry in &self.entries {
            w.write_var_u_int(u64::from(entry.weight))
                .write_encoded(&entry.fulfillment.encode());
        }
        w.into_bytes()
    }

    pub(crate) fn decode_payload(
        payload: &[u8],
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<Self, DecodeError> {
        let mut r = OerReader::new(payload);
        let threshold = read_u32(&mut r)?;
        let count = r.read_var_u_int()?;
        // Count is untrusted: grow as entries are actually read.
        let mut entries = Vec::new();
        for _ in 0..count {
            let weight = read_u32(&mut r)?;
            let fulfillment = codec::read_nested_fulfillment(&mut r, limits, depth + 1)?;
            entries.push(ThresholdEntry {
                weight,
                fulfillment,
            });
        }
        r.finish()?;
        Self::new(threshold, entries).map_err(|e| DecodeError::invalid("threshold", e.to_string()))
    }
}

fn read_u32(r: &mut OerReader<'_>) -> Result<u32, DecodeError> {
    let value = r.read_var_u_int()?;
    u32::try_from(value).map_err(|_| DecodeError::IntegerOverflow(32))
}
