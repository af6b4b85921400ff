//! # Textual URI Forms
//!
//! ## Fulfillments
//!
//! `cf:<type code in lowercase hex>:<base64url payload, unpadded>`. The
//! payload is the fulfillment's payload body, not the binary envelope.
//! Input is checked against
//! `^cf:([1-9a-f][0-9a-f]{0,3}|0):[a-zA-Z0-9_-]*$` before any decoding.
//!
//! ## Conditions
//!
//! Named-information form:
//!
//! ```text
//! ni:///sha-256;<base64url fingerprint>?fpt=<type name>&cost=<decimal>[&subtypes=<names>]
//! ```
//!
//! `subtypes` is a comma-separated list of type names in type-code order,
//! present only for compound kinds with a non-empty subtype set.

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use cryptocond_core::oer::OerWriter;
use cryptocond_core::{ConditionType, ConditionTypeSet, DecodeError, DecodeLimits};
use regex::Regex;
use thiserror::Error;

use crate::codec;
use crate::condition::Condition;
use crate::fulfillment::Fulfillment;

const FULFILLMENT_SCHEME: &str = "cf:";
const CONDITION_SCHEME: &str = "ni:///sha-256;";
const FULFILLMENT_PATTERN: &str = "^cf:([1-9a-f][0-9a-f]{0,3}|0):[a-zA-Z0-9_-]*$";

/// Error parsing a condition or fulfillment URI.
#[derive(Error, Debug)]
pub enum UriError {
    #[error("URI is empty")]
    Empty,

    #[error("URI must start with {0:?}")]
    MissingScheme(&'static str),

    #[error("URI {0:?} does not match the fulfillment URI pattern")]
    PatternMismatch(String),

    #[error("invalid base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid condition URI query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

fn fulfillment_pattern() -> Option<&'static Regex> {
    // The pattern is a constant. A compile failure would make every
    // fulfillment URI a `PatternMismatch`; `test_pattern_compiles` pins it.
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(FULFILLMENT_PATTERN).ok())
        .as_ref()
}

// ---------------------------------------------------------------------------
// Fulfillment URIs
// ---------------------------------------------------------------------------

pub(crate) fn fulfillment_to_uri(fulfillment: &Fulfillment) -> String {
    format!(
        "{FULFILLMENT_SCHEME}{:x}:{}",
        fulfillment.condition_type().code(),
        URL_SAFE_NO_PAD.encode(fulfillment.payload())
    )
}

pub(crate) fn fulfillment_from_uri(s: &str) -> Result<Fulfillment, UriError> {
    if s.trim().is_empty() {
        return Err(UriError::Empty);
    }
    if !s.starts_with(FULFILLMENT_SCHEME) {
        return Err(UriError::MissingScheme(FULFILLMENT_SCHEME));
    }
    let matches = fulfillment_pattern().is_some_and(|re| re.is_match(s));
    if !matches {
        return Err(UriError::PatternMismatch(s.to_string()));
    }

    let rest = &s[FULFILLMENT_SCHEME.len()..];
    let (type_hex, payload_b64) = rest
        .split_once(':')
        .ok_or_else(|| UriError::PatternMismatch(s.to_string()))?;
    // At most four hex digits, so the code always fits u16.
    let code = u16::from_str_radix(type_hex, 16)
        .map_err(|_| UriError::PatternMismatch(s.to_string()))?;
    let payload = URL_SAFE_NO_PAD.decode(payload_b64)?;

    let mut envelope = OerWriter::new();
    envelope.write_16_bit_u_int(code).write_octet_string(&payload);
    Ok(codec::read_fulfillment(
        &envelope.into_bytes(),
        &DecodeLimits::default(),
    )?)
}

// ---------------------------------------------------------------------------
// Condition URIs
// ---------------------------------------------------------------------------

pub(crate) fn condition_to_uri(condition: &Condition) -> String {
    let mut uri = format!(
        "{CONDITION_SCHEME}{}?fpt={}&cost={}",
        URL_SAFE_NO_PAD.encode(condition.fingerprint()),
        condition.condition_type(),
        condition.cost()
    );
    if let Some(subtypes) = condition.subtypes().filter(|s| !s.is_empty()) {
        uri.push_str("&subtypes=");
        uri.push_str(&subtypes.to_string());
    }
    uri
}

pub(crate) fn condition_from_uri(s: &str) -> Result<Condition, UriError> {
    if s.trim().is_empty() {
        return Err(UriError::Empty);
    }
    let rest = s
        .strip_prefix(CONDITION_SCHEME)
        .ok_or(UriError::MissingScheme(CONDITION_SCHEME))?;
    let (fingerprint_b64, query) = rest
        .split_once('?')
        .ok_or_else(|| UriError::InvalidQuery("missing query".to_string()))?;
    let fingerprint: [u8; 32] = URL_SAFE_NO_PAD
        .decode(fingerprint_b64)?
        .try_into()
        .map_err(|_| DecodeError::invalid("fingerprint", "expected exactly 32 bytes"))?;

    let mut condition_type = None;
    let mut cost = None;
    let mut subtypes = None;
    for param in query.split('&') {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| UriError::InvalidQuery(format!("parameter {param:?} has no value")))?;
        let duplicate = match key {
            "fpt" => condition_type.replace(value.parse::<ConditionType>()?).is_some(),
            "cost" => cost.replace(parse_cost(value)?).is_some(),
            "subtypes" => subtypes.replace(parse_subtypes(value)?).is_some(),
            other => {
                return Err(UriError::InvalidQuery(format!(
                    "unknown parameter {other:?}"
                )))
            }
        };
        if duplicate {
            return Err(UriError::InvalidQuery(format!("duplicate parameter {key:?}")));
        }
    }

    let condition_type =
        condition_type.ok_or_else(|| UriError::InvalidQuery("missing fpt".to_string()))?;
    let cost = cost.ok_or_else(|| UriError::InvalidQuery("missing cost".to_string()))?;
    let subtypes = match (condition_type.is_compound(), subtypes) {
        (true, s) => Some(s.unwrap_or_default()),
        (false, None) => None,
        (false, Some(_)) => {
            return Err(UriError::InvalidQuery(format!(
                "{condition_type} conditions have no subtypes"
            )))
        }
    };
    Ok(Condition::from_parts(
        condition_type,
        fingerprint,
        cost,
        subtypes,
    )?)
}

/// Canonical decimal only: no sign, no leading zeros.
fn parse_cost(value: &str) -> Result<u64, UriError> {
    let canonical = !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'));
    if !canonical {
        return Err(UriError::InvalidQuery(format!("invalid cost {value:?}")));
    }
    value
        .parse()
        .map_err(|_| UriError::InvalidQuery(format!("cost {value:?} overflows u64")))
}

fn parse_subtypes(value: &str) -> Result<ConditionTypeSet, UriError> {
    value
        .split(',')
        .map(|name| name.parse::<ConditionType>().map_err(UriError::from))
        .collect()
}
