//! # cryptocond-core: Foundational Types for Crypto-Conditions
//!
//! The leaf crate of the workspace. It defines the closed set of condition
//! types, the subtypes bitset, the primitive binary codecs and the error
//! hierarchy. It knows nothing about fingerprints or verification.
//!
//! ## Key Design Principles
//!
//! 1. **Single `ConditionType` enum.** One definition, five variants,
//!    exhaustive `match` everywhere.
//!
//! 2. **Codecs move bytes only.** [`der`] and [`oer`] read and write
//!    tag-length-value elements; the condition layer decides what they mean.
//!
//! 3. **Strict canonical decoding.** Non-minimal lengths and integers,
//!    indefinite lengths and trailing bytes are rejected, so every accepted
//!    input re-encodes to the same bytes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cryptocond-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod der;
pub mod error;
mod length;
pub mod limits;
pub mod oer;
pub mod types;

pub use error::{ConditionError, CryptoConditionError, CryptoError, DecodeError};
pub use limits::DecodeLimits;
pub use types::{ConditionType, ConditionTypeSet, CONDITION_TYPE_COUNT};
