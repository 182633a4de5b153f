//! Wire-format cross-checks against prost.
//!
//! The wire format promises interoperability with any conformant Protocol
//! Buffers implementation. These tests exchange bytes with prost's encoding
//! primitives in both directions.

use prost::encoding as pe;
use zica_core::{self as zica, wire, Message};

#[derive(Message, Debug, Default, PartialEq)]
struct Version {
    #[zica(tag = 1)]
    an_int: i32,
    #[zica(tag = 2)]
    a_string: Option<String>,
}

const SAMPLES: &[u64] = &[
    0,
    1,
    127,
    128,
    300,
    16_383,
    16_384,
    u32::MAX as u64,
    1 << 35,
    u64::MAX,
];

#[test]
fn varint_bytes_match_prost() {
    for &value in SAMPLES {
        let mut ours = Vec::new();
        wire::put_varint(value, &mut ours);

        let mut theirs = Vec::new();
        pe::encode_varint(value, &mut theirs);

        assert_eq!(ours, theirs, "encodings differ for {value}");
        assert_eq!(wire::varint_len(value) as usize, pe::encoded_len_varint(value));

        let mut input = ours.as_slice();
        assert_eq!(pe::decode_varint(&mut input).unwrap(), value);

        let mut input = theirs.as_slice();
        assert_eq!(wire::read_varint64(&mut input).unwrap(), value);
    }
}

#[test]
fn tag_bytes_match_prost() {
    let cases = [
        (1u32, zica::WireType::Varint, pe::WireType::Varint),
        (2, zica::WireType::LengthDelimited, pe::WireType::LengthDelimited),
        (3, zica::WireType::Fixed64, pe::WireType::SixtyFourBit),
        (12_345, zica::WireType::Fixed32, pe::WireType::ThirtyTwoBit),
        (zica_core::MAX_FIELD_NUMBER, zica::WireType::Varint, pe::WireType::Varint),
    ];
    for (number, ours_wire, theirs_wire) in cases {
        let mut ours = Vec::new();
        wire::put_tag(number, ours_wire, &mut ours);

        let mut theirs = Vec::new();
        pe::encode_key(number, theirs_wire, &mut theirs);

        assert_eq!(ours, theirs, "tag encodings differ for field {number}");
    }
}

#[test]
fn prost_encoded_message_parses() {
    let mut buf = Vec::new();
    pe::int32::encode(1, &-42, &mut buf);
    pe::string::encode(2, &"abc".to_owned(), &mut buf);

    let decoded: Version = zica::parse(&buf).expect("prost bytes parse");
    assert_eq!(decoded.an_int, -42);
    assert_eq!(decoded.a_string.as_deref(), Some("abc"));
}

#[test]
fn our_encoding_decodes_with_prost_primitives() {
    let version = Version {
        an_int: 7,
        a_string: Some("zica".to_owned()),
    };
    let size = zica::compute_size(&version);
    let mut buf = Vec::with_capacity(size as usize);
    zica::serialize(&version, &mut buf);

    let mut input = buf.as_slice();
    let ctx = pe::DecodeContext::default();

    let (number, wire_type) = pe::decode_key(&mut input).unwrap();
    assert_eq!(number, 1);
    assert_eq!(wire_type, pe::WireType::Varint);
    let mut an_int = 0i32;
    pe::int32::merge(wire_type, &mut an_int, &mut input, ctx.clone()).unwrap();
    assert_eq!(an_int, 7);

    let (number, wire_type) = pe::decode_key(&mut input).unwrap();
    assert_eq!(number, 2);
    assert_eq!(wire_type, pe::WireType::LengthDelimited);
    let mut a_string = String::new();
    pe::string::merge(wire_type, &mut a_string, &mut input, ctx).unwrap();
    assert_eq!(a_string, "zica");

    assert!(input.is_empty());
}

#[test]
fn sign_extension_matches_prost() {
    for value in [-1i32, -127, -128, i32::MIN] {
        let mut ours = Vec::new();
        zica_core::encoding::int32::encode(1, &value, &mut ours);

        let mut theirs = Vec::new();
        pe::int32::encode(1, &value, &mut theirs);

        assert_eq!(ours, theirs, "sign extension differs for {value}");
        assert_eq!(ours.len(), 11, "negative int32 is a 10-byte varint");
    }
}
