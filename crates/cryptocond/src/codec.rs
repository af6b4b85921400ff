//! # Binary Codec
//!
//! Canonical binary forms of conditions and fulfillments.
//!
//! ## Condition (DER)
//!
//! ```text
//! [type code] CONSTRUCTED {
//!     [0] fingerprint   32 octets
//!     [1] cost          minimal big-endian unsigned
//!     [2] subtypes      BIT STRING, compound kinds only
//! }
//! ```
//!
//! ## Fulfillment (OER)
//!
//! ```text
//! type     u16 big-endian
//! payload  octet string, body depends on the type
//! ```
//!
//! Nested fulfillments inside prefix and threshold payloads use the same
//! envelope. Decoding is strict: every payload must be consumed exactly and
//! trailing bytes after the top-level value are rejected.

use cryptocond_core::der::{
    constructed_tag_number, context_constructed_tag, read_unsigned, unsigned_bytes, DerReader,
    DerWriter,
};
use cryptocond_core::oer::{OerReader, OerWriter};
use cryptocond_core::{ConditionType, ConditionTypeSet, DecodeError, DecodeLimits};
use tracing::trace;

use crate::condition::Condition;
use crate::fulfillment::{
    Ed25519Sha256Fulfillment, Fulfillment, PrefixSha256Fulfillment, PreimageSha256Fulfillment,
    RsaSha256Fulfillment, ThresholdSha256Fulfillment,
};

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

pub(crate) fn write_condition(condition: &Condition) -> Vec<u8> {
    let mut fields = DerWriter::new();
    fields
        .write_tagged_object(0, condition.fingerprint())
        .write_tagged_object(1, &unsigned_bytes(condition.cost()));
    if let Some(subtypes) = condition.subtypes() {
        fields.write_tagged_object(2, &subtypes.to_bit_string());
    }
    // Type codes are below 5, so the narrowing is lossless.
    let tag = condition.condition_type().code() as u8;
    let mut out = DerWriter::new();
    out.write_tagged_constructed_object(tag, fields.as_bytes());
    out.into_bytes()
}

pub(crate) fn read_condition(bytes: &[u8]) -> Result<Condition, DecodeError> {
    let mut reader = DerReader::new(bytes);
    let (identifier, contents) = reader.read_element()?;
    reader.finish()?;

    let tag = constructed_tag_number(identifier).ok_or(DecodeError::UnexpectedTag {
        expected: context_constructed_tag(0),
        found: identifier,
    })?;
    let condition_type = ConditionType::from_code(u16::from(tag))?;

    let mut fields = DerReader::new(contents);
    let fingerprint: [u8; 32] = fields.read_tagged_object(0)?.try_into().map_err(|_| {
        DecodeError::invalid("fingerprint", "expected exactly 32 bytes")
    })?;
    let cost = read_unsigned(fields.read_tagged_object(1)?)?;
    let subtypes = fields
        .read_optional_tagged_object(2)?
        .map(ConditionTypeSet::from_bit_string)
        .transpose()?;
    fields.finish()?;

    trace!(%condition_type, cost, "decoded condition");
    Condition::from_parts(condition_type, fingerprint, cost, subtypes)
}

// ---------------------------------------------------------------------------
// Fulfillments
// ---------------------------------------------------------------------------

pub(crate) fn write_fulfillment(fulfillment: &Fulfillment) -> Vec<u8> {
    let mut w = OerWriter::new();
    w.write_16_bit_u_int(fulfillment.condition_type().code())
        .write_octet_string(&fulfillment.payload());
    w.into_bytes()
}

/// Decode a complete top-level fulfillment.
pub(crate) fn read_fulfillment(
    bytes: &[u8],
    limits: &DecodeLimits,
) -> Result<Fulfillment, DecodeError> {
    limits.check_input(bytes)?;
    let mut reader = OerReader::new(bytes);
    let fulfillment = read_nested_fulfillment(&mut reader, limits, 0)?;
    reader.finish()?;
    Ok(fulfillment)
}

/// Read one fulfillment envelope at nesting level `depth`, leaving the
/// reader positioned after it.
pub(crate) fn read_nested_fulfillment(
    reader: &mut OerReader<'_>,
    limits: &DecodeLimits,
    depth: usize,
) -> Result<Fulfillment, DecodeError> {
    limits.check_depth(depth)?;
    let code = reader.read_16_bit_u_int()?;
    let condition_type = ConditionType::from_code(code)?;
    let payload = reader.read_octet_string()?;
    read_payload(condition_type, payload, limits, depth)
}

/// Decode the payload body of a fulfillment of the given type.
pub(crate) fn read_payload(
    condition_type: ConditionType,
    payload: &[u8],
    limits: &DecodeLimits,
    depth: usize,
) -> Result<Fulfillment, DecodeError> {
    trace!(%condition_type, depth, payload_len = payload.len(), "decoding fulfillment");
    match condition_type {
        ConditionType::PreimageSha256 => Ok(Fulfillment::PreimageSha256(
            PreimageSha256Fulfillment::new(payload),
        )),
        ConditionType::RsaSha256 => {
            RsaSha256Fulfillment::decode_payload(payload).map(Fulfillment::RsaSha256)
        }
        ConditionType::PrefixSha256 => {
            PrefixSha256Fulfillment::decode_payload(payload, limits, depth)
                .map(Fulfillment::PrefixSha256)
        }
        ConditionType::ThresholdSha256 => {
            ThresholdSha256Fulfillment::decode_payload(payload, limits, depth)
                .map(Fulfillment::ThresholdSha256)
        }
        ConditionType::Ed25519Sha256 => {
            Ed25519Sha256Fulfillment::decode_payload(payload).map(Fulfillment::Ed25519Sha256)
        }
    }
}
