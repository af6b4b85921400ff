//! # Primitive Codec Property Tests
//!
//! The DER and OER primitives must read back exactly what they write, and
//! must reject rather than panic on arbitrary input.

use cryptocond_core::der::{integer_bytes, read_unsigned, unsigned_bytes, DerReader, DerWriter};
use cryptocond_core::oer::{OerReader, OerWriter};
use cryptocond_core::{ConditionType, ConditionTypeSet};
use proptest::prelude::*;

fn type_set() -> impl Strategy<Value = ConditionTypeSet> {
    prop::sample::subsequence(ConditionType::all().to_vec(), 0..=5)
        .prop_map(|types| types.into_iter().collect())
}

proptest! {
    #[test]
    fn der_fields_read_back(
        fields in prop::collection::vec((0u8..8, prop::collection::vec(any::<u8>(), 0..300)), 0..6)
    ) {
        let mut w = DerWriter::new();
        for (tag, contents) in &fields {
            w.write_tagged_object(*tag, contents);
        }
        let bytes = w.into_bytes();
        let mut r = DerReader::new(&bytes);
        for (tag, contents) in &fields {
            prop_assert_eq!(r.read_tagged_object(*tag).unwrap(), contents.as_slice());
        }
        prop_assert!(r.finish().is_ok());
    }

    #[test]
    fn oer_fields_read_back(
        value in any::<u64>(),
        small in any::<u16>(),
        octets in prop::collection::vec(any::<u8>(), 0..1024),
    ) {
        let mut w = OerWriter::new();
        w.write_var_u_int(value).write_16_bit_u_int(small).write_octet_string(&octets);
        let bytes = w.into_bytes();
        let mut r = OerReader::new(&bytes);
        prop_assert_eq!(r.read_var_u_int().unwrap(), value);
        prop_assert_eq!(r.read_16_bit_u_int().unwrap(), small);
        prop_assert_eq!(r.read_octet_string().unwrap(), octets.as_slice());
        prop_assert!(r.finish().is_ok());
    }

    #[test]
    fn unsigned_contents_are_minimal(value in any::<u64>()) {
        let bytes = unsigned_bytes(value);
        prop_assert!(bytes.len() == 1 || bytes[0] != 0);
        prop_assert_eq!(read_unsigned(&bytes).unwrap(), value);
    }

    #[test]
    fn integer_contents_never_read_negative(value in any::<u64>()) {
        let bytes = integer_bytes(value);
        prop_assert_eq!(bytes[0] & 0x80, 0);
        prop_assert!(bytes.len() == 1 || bytes[0] != 0 || bytes[1] & 0x80 != 0);
    }

    #[test]
    fn type_set_bit_string_reads_back(set in type_set()) {
        let bits = set.to_bit_string();
        prop_assert_eq!(ConditionTypeSet::from_bit_string(&bits).unwrap(), set);
    }

    #[test]
    fn readers_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut der = DerReader::new(&bytes);
        while der.read_element().is_ok() && !der.is_empty() {}
        let mut oer = OerReader::new(&bytes);
        let _ = oer.read_var_u_int();
        let _ = oer.read_octet_string();
        let _ = ConditionTypeSet::from_bit_string(&bytes);
    }
}
