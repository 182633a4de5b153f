//! Low-level wire format primitives.
//!
//! Each protobuf field is encoded as a varint "tag" holding the field number
//! and wire type, followed by the field data. The data layout depends on the
//! wire type:
//!
//! - 0: VARINT (int32, int64, uint32, uint64, sint32, sint64, bool, enum)
//! - 1: I64 (fixed64, sfixed64, double)
//! - 2: LEN (strings, bytes, embedded messages, packed repeated fields)
//! - 5: I32 (fixed32, sfixed32, float)
//!
//! Wire types 3 and 4 (groups) are deprecated and unsupported; 6 and 7 are
//! reserved. They can be carried in a tag but any attempt to parse or skip
//! their value fails.

use bytes::BufMut;

use crate::error::{Error, Result};
use crate::MAX_SERIALIZED_SIZE;

/// Number of tag bits that hold the wire type.
pub const WIRE_TYPE_BITS: u32 = 3;

/// Protobuf wire types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Variable-length integer
    Varint = 0,
    /// 64-bit fixed-width
    Fixed64 = 1,
    /// Length-delimited (strings, bytes, embedded messages)
    LengthDelimited = 2,
    /// Start group (deprecated)
    StartGroup = 3,
    /// End group (deprecated)
    EndGroup = 4,
    /// 32-bit fixed-width
    Fixed32 = 5,
    /// Reserved for future use
    Reserved6 = 6,
    /// Reserved for future use
    Reserved7 = 7,
}

impl WireType {
    /// Extracts the wire type from the low bits of a tag.
    pub const fn from_tag(tag: u32) -> Self {
        match tag & 0b111 {
            0 => WireType::Varint,
            1 => WireType::Fixed64,
            2 => WireType::LengthDelimited,
            3 => WireType::StartGroup,
            4 => WireType::EndGroup,
            5 => WireType::Fixed32,
            6 => WireType::Reserved6,
            _ => WireType::Reserved7,
        }
    }

    /// Returns true for the four wire types that have a documented encoding.
    pub const fn is_recognized(self) -> bool {
        matches!(
            self,
            WireType::Varint
                | WireType::Fixed64
                | WireType::LengthDelimited
                | WireType::Fixed32
        )
    }
}

/// Composes a tag from a field number and wire type.
pub const fn make_tag(field_number: u32, wire_type: WireType) -> u32 {
    (field_number << WIRE_TYPE_BITS) | wire_type as u32
}

/// Extracts the field number from a tag.
pub const fn field_number(tag: u32) -> u32 {
    tag >> WIRE_TYPE_BITS
}

/// Encoded length of an unsigned varint.
pub const fn varint_len(value: u64) -> u32 {
    let mut value = value;
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Encoded length of a signed varint.
///
/// Signed integers are sign-extended to 64 bits before encoding, so every
/// negative value occupies the full 10 bytes. This is what keeps a field
/// readable when its declared width later changes.
pub const fn varint_len_i64(value: i64) -> u32 {
    if value < 0 {
        10
    } else {
        varint_len(value as u64)
    }
}

/// Encoded length of a field's tag.
pub const fn tag_len(field_number: u32) -> u32 {
    varint_len((field_number as u64) << WIRE_TYPE_BITS)
}

/// The longest varint that can encode a valid payload length.
const LARGEST_LENGTH_VARINT: u32 = varint_len(MAX_SERIALIZED_SIZE as u64);

/// Maximum declarable length for a length-delimited payload: the maximum
/// serialized size minus the bytes its own length varint occupies.
pub const MAX_PAYLOAD_SIZE: u32 = MAX_SERIALIZED_SIZE - LARGEST_LENGTH_VARINT;

/// Appends a varint to the buffer.
pub fn put_varint<B: BufMut>(mut value: u64, buf: &mut B) {
    while value >= 0x80 {
        buf.put_u8(value as u8 | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Appends a field tag to the buffer.
pub fn put_tag<B: BufMut>(field_number: u32, wire_type: WireType, buf: &mut B) {
    put_varint(u64::from(make_tag(field_number, wire_type)), buf);
}

/// Decodes a varint destined for an integer of the given bit width.
///
/// At most ⌈bits/7⌉ data bytes are accumulated. If the continuation bit is
/// still set after that, the remaining bytes are scanned for the terminator
/// and their payload bits discarded: a wire value too wide for the target
/// type truncates rather than fails, per the documented compatibility rule.
/// An unterminated varint fails.
fn read_varint_limited(buf: &mut &[u8], max_data_bytes: usize) -> Result<u64> {
    let bytes: &[u8] = *buf;
    let mut bits = 0u64;

    for (i, &byte) in bytes.iter().enumerate().take(max_data_bytes) {
        bits |= u64::from(byte & 0x7F) << (i * 7);
        if byte & 0x80 == 0 {
            *buf = &bytes[i + 1..];
            return Ok(bits);
        }
    }
    if bytes.len() < max_data_bytes {
        return Err(Error::TruncatedVarint);
    }

    for i in max_data_bytes..bytes.len() {
        if bytes[i] & 0x80 == 0 {
            *buf = &bytes[i + 1..];
            return Ok(bits);
        }
    }
    Err(Error::TruncatedVarint)
}

/// Decodes a varint into a 64-bit integer.
pub fn read_varint64(buf: &mut &[u8]) -> Result<u64> {
    read_varint_limited(buf, 10)
}

/// Decodes a varint into a 32-bit integer, truncating wider wire values.
pub fn read_varint32(buf: &mut &[u8]) -> Result<u32> {
    read_varint_limited(buf, 5).map(|bits| bits as u32)
}

/// Reads a payload length and checks it against both the remaining buffer and
/// the maximum serialized size.
pub fn read_length(buf: &mut &[u8]) -> Result<usize> {
    let length = read_varint32(buf)?;
    if length > MAX_PAYLOAD_SIZE {
        return Err(Error::PayloadTooLarge {
            length: u64::from(length),
        });
    }
    let length = length as usize;
    if length > buf.len() {
        return Err(Error::truncated_payload(length, buf.len()));
    }
    Ok(length)
}

/// ZigZags a signed 32-bit integer into its unsigned storage form.
///
/// `0 → 0, -1 → 1, 1 → 2, -2 → 3, ...` — small negatives stay small, so they
/// occupy few varint bytes.
pub const fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverts [`zigzag_encode32`].
pub const fn zigzag_decode32(bits: u32) -> i32 {
    ((bits >> 1) as i32) ^ -((bits & 1) as i32)
}

/// ZigZags a signed 64-bit integer into its unsigned storage form.
pub const fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverts [`zigzag_encode64`].
pub const fn zigzag_decode64(bits: u64) -> i64 {
    ((bits >> 1) as i64) ^ -((bits & 1) as i64)
}

/// Reads a 32-bit little-endian fixed value.
pub fn read_fixed32(buf: &mut &[u8]) -> Result<u32> {
    let bytes: &[u8] = *buf;
    if bytes.len() < 4 {
        return Err(Error::TruncatedFixed { width: 4 });
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    *buf = &bytes[4..];
    Ok(u32::from_le_bytes(raw))
}

/// Reads a 64-bit little-endian fixed value.
pub fn read_fixed64(buf: &mut &[u8]) -> Result<u64> {
    let bytes: &[u8] = *buf;
    if bytes.len() < 8 {
        return Err(Error::TruncatedFixed { width: 8 });
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    *buf = &bytes[8..];
    Ok(u64::from_le_bytes(raw))
}
