//! Per-kind field encoding and decoding helpers.
//!
//! One submodule per value kind, each exposing the same surface:
//!
//! - `encoded_len(number, value)` — tag + value bytes for one occurrence
//! - `encode(number, value, buf)` — emit one tag + value occurrence
//! - `merge(value, buf)` — decode one wire value into the member
//!
//! Packable kinds additionally expose `packed_len` / `encode_packed` /
//! `merge_packed` for the length-delimited packed-repeated encoding.
//!
//! These helpers are the target of the code the `#[derive(Message)]` macro
//! generates; hand-written [`Message`](crate::Message) impls use them the
//! same way. The helpers encode values only — presence rules (empty options,
//! empty containers) live in the generated per-field code, and wire-type
//! dispatch lives in the generated `merge_field` match.

use crate::error::{Error, Result};
use crate::wire::{self, WireType};

/// Skips over the encoded value for the given wire type.
///
/// Called for unknown fields and for known fields whose wire type does not
/// match the declaration. Group and reserved wire types have no documented
/// encoding and fail the parse.
pub fn skip(wire_type: WireType, buf: &mut &[u8]) -> Result<()> {
    match wire_type {
        WireType::Varint => {
            wire::read_varint64(buf)?;
            Ok(())
        }
        WireType::Fixed64 => {
            let bytes: &[u8] = *buf;
            if bytes.len() < 8 {
                return Err(Error::TruncatedFixed { width: 8 });
            }
            *buf = &bytes[8..];
            Ok(())
        }
        WireType::LengthDelimited => {
            let length = wire::read_length(buf)?;
            let bytes: &[u8] = *buf;
            *buf = &bytes[length..];
            Ok(())
        }
        WireType::Fixed32 => {
            let bytes: &[u8] = *buf;
            if bytes.len() < 4 {
                return Err(Error::TruncatedFixed { width: 4 });
            }
            *buf = &bytes[4..];
            Ok(())
        }
        other => Err(Error::UnsupportedWireType { wire_type: other }),
    }
}

macro_rules! varint_codec {
    ($(#[$attr:meta])* $name:ident, $ty:ty, read: $read:path,
     to_bits($to_binding:ident) $to_bits:expr,
     from_bits($from_binding:ident) $from_bits:expr) => {
        $(#[$attr])*
        pub mod $name {
            use bytes::BufMut;

            use crate::error::Result;
            use crate::wire::{self, WireType};

            /// Encoded tag + value length of one field occurrence.
            pub fn encoded_len(number: u32, value: &$ty) -> u64 {
                let $to_binding = *value;
                u64::from(wire::tag_len(number)) + u64::from(wire::varint_len($to_bits))
            }

            /// Emits one tag + value occurrence.
            pub fn encode<B: BufMut>(number: u32, value: &$ty, buf: &mut B) {
                wire::put_tag(number, WireType::Varint, buf);
                let $to_binding = *value;
                wire::put_varint($to_bits, buf);
            }

            /// Decodes one wire value into `value`.
            pub fn merge(value: &mut $ty, buf: &mut &[u8]) -> Result<()> {
                let $from_binding = $read(buf)?;
                *value = $from_bits;
                Ok(())
            }

            fn payload_len(values: &[$ty]) -> u64 {
                values
                    .iter()
                    .map(|value| {
                        let $to_binding = *value;
                        u64::from(wire::varint_len($to_bits))
                    })
                    .sum()
            }

            /// Encoded length of the packed run, or 0 for an empty slice.
            pub fn packed_len(number: u32, values: &[$ty]) -> u64 {
                if values.is_empty() {
                    return 0;
                }
                let payload = payload_len(values);
                u64::from(wire::tag_len(number)) + u64::from(wire::varint_len(payload)) + payload
            }

            /// Emits the whole packed run; nothing for an empty slice.
            pub fn encode_packed<B: BufMut>(number: u32, values: &[$ty], buf: &mut B) {
                if values.is_empty() {
                    return;
                }
                wire::put_tag(number, WireType::LengthDelimited, buf);
                wire::put_varint(payload_len(values), buf);
                for value in values {
                    let $to_binding = *value;
                    wire::put_varint($to_bits, buf);
                }
            }

            /// Appends every element of a packed payload to `values`.
            pub fn merge_packed(values: &mut Vec<$ty>, buf: &mut &[u8]) -> Result<()> {
                let length = wire::read_length(buf)?;
                let bytes: &[u8] = *buf;
                let mut payload = &bytes[..length];
                while !payload.is_empty() {
                    let mut value = <$ty>::default();
                    merge(&mut value, &mut payload)?;
                    values.push(value);
                }
                *buf = &bytes[length..];
                Ok(())
            }
        }
    };
}

varint_codec!(
    /// Plain signed 32-bit integers (sign-extended to 64 bits on the wire).
    int32, i32, read: wire::read_varint32,
    to_bits(v) v as i64 as u64,
    from_bits(bits) bits as i32
);
varint_codec!(
    /// Plain signed 64-bit integers.
    int64, i64, read: wire::read_varint64,
    to_bits(v) v as u64,
    from_bits(bits) bits as i64
);
varint_codec!(
    /// Plain unsigned 32-bit integers.
    uint32, u32, read: wire::read_varint32,
    to_bits(v) u64::from(v),
    from_bits(bits) bits
);
varint_codec!(
    /// Plain unsigned 64-bit integers.
    uint64, u64, read: wire::read_varint64,
    to_bits(v) v,
    from_bits(bits) bits
);
varint_codec!(
    /// ZigZag-encoded signed 32-bit integers.
    sint32, i32, read: wire::read_varint32,
    to_bits(v) u64::from(wire::zigzag_encode32(v)),
    from_bits(bits) wire::zigzag_decode32(bits)
);
varint_codec!(
    /// ZigZag-encoded signed 64-bit integers.
    sint64, i64, read: wire::read_varint64,
    to_bits(v) wire::zigzag_encode64(v),
    from_bits(bits) wire::zigzag_decode64(bits)
);
varint_codec!(
    /// Booleans. One byte on encode; any varint decodes, false iff zero.
    bool, bool, read: wire::read_varint64,
    to_bits(v) u64::from(v),
    from_bits(bits) bits != 0
);

macro_rules! fixed_codec {
    ($(#[$attr:meta])* $name:ident, $ty:ty, $wire_type:ident, $width:expr,
     put($put_value:ident, $put_buf:ident) $put:expr,
     read: $read:path, from_raw($raw_binding:ident) $from_raw:expr) => {
        $(#[$attr])*
        pub mod $name {
            use bytes::BufMut;

            use crate::error::{Error, Result};
            use crate::wire::{self, WireType};

            /// Encoded tag + value length of one field occurrence.
            pub fn encoded_len(number: u32, _value: &$ty) -> u64 {
                u64::from(wire::tag_len(number)) + $width
            }

            /// Emits one tag + value occurrence.
            pub fn encode<B: BufMut>(number: u32, value: &$ty, buf: &mut B) {
                wire::put_tag(number, WireType::$wire_type, buf);
                let $put_value = *value;
                let $put_buf = buf;
                $put;
            }

            /// Decodes one wire value into `value`.
            pub fn merge(value: &mut $ty, buf: &mut &[u8]) -> Result<()> {
                let $raw_binding = $read(buf)?;
                *value = $from_raw;
                Ok(())
            }

            /// Encoded length of the packed run, or 0 for an empty slice.
            pub fn packed_len(number: u32, values: &[$ty]) -> u64 {
                if values.is_empty() {
                    return 0;
                }
                let payload = values.len() as u64 * $width;
                u64::from(wire::tag_len(number)) + u64::from(wire::varint_len(payload)) + payload
            }

            /// Emits the whole packed run; nothing for an empty slice.
            pub fn encode_packed<B: BufMut>(number: u32, values: &[$ty], buf: &mut B) {
                if values.is_empty() {
                    return;
                }
                wire::put_tag(number, WireType::LengthDelimited, buf);
                wire::put_varint(values.len() as u64 * $width, buf);
                for value in values {
                    let $put_value = *value;
                    let $put_buf = &mut *buf;
                    $put;
                }
            }

            /// Appends every element of a packed payload to `values`.
            ///
            /// A payload length that is not a whole number of elements fails.
            pub fn merge_packed(values: &mut Vec<$ty>, buf: &mut &[u8]) -> Result<()> {
                let length = wire::read_length(buf)?;
                if length % ($width as usize) != 0 {
                    return Err(Error::PackedLengthInvalid {
                        length,
                        element_size: $width as usize,
                    });
                }
                let bytes: &[u8] = *buf;
                let mut payload = &bytes[..length];
                while !payload.is_empty() {
                    let $raw_binding = $read(&mut payload)?;
                    values.push($from_raw);
                }
                *buf = &bytes[length..];
                Ok(())
            }
        }
    };
}

fixed_codec!(
    /// Unsigned 32-bit integers as 4 raw little-endian bytes.
    fixed32, u32, Fixed32, 4,
    put(value, buf) buf.put_u32_le(value),
    read: wire::read_fixed32, from_raw(raw) raw
);
fixed_codec!(
    /// Unsigned 64-bit integers as 8 raw little-endian bytes.
    fixed64, u64, Fixed64, 8,
    put(value, buf) buf.put_u64_le(value),
    read: wire::read_fixed64, from_raw(raw) raw
);
fixed_codec!(
    /// Signed 32-bit integers as 4 raw little-endian bytes.
    sfixed32, i32, Fixed32, 4,
    put(value, buf) buf.put_i32_le(value),
    read: wire::read_fixed32, from_raw(raw) raw as i32
);
fixed_codec!(
    /// Signed 64-bit integers as 8 raw little-endian bytes.
    sfixed64, i64, Fixed64, 8,
    put(value, buf) buf.put_i64_le(value),
    read: wire::read_fixed64, from_raw(raw) raw as i64
);
fixed_codec!(
    /// Single-precision floats, bit pattern preserved exactly.
    float, f32, Fixed32, 4,
    put(value, buf) buf.put_f32_le(value),
    read: wire::read_fixed32, from_raw(raw) f32::from_bits(raw)
);
fixed_codec!(
    /// Double-precision floats, bit pattern preserved exactly.
    double, f64, Fixed64, 8,
    put(value, buf) buf.put_f64_le(value),
    read: wire::read_fixed64, from_raw(raw) f64::from_bits(raw)
);

/// Enumerated integers, encoded as the varint of the underlying value.
pub mod enumeration {
    use bytes::BufMut;

    use crate::error::Result;
    use crate::message::Enumeration;
    use crate::wire::{self, WireType};

    /// Encoded tag + value length of one field occurrence.
    pub fn encoded_len<E: Enumeration>(number: u32, value: &E) -> u64 {
        u64::from(wire::tag_len(number))
            + u64::from(wire::varint_len_i64(i64::from(value.to_wire())))
    }

    /// Emits one tag + value occurrence.
    pub fn encode<E: Enumeration, B: BufMut>(number: u32, value: &E, buf: &mut B) {
        wire::put_tag(number, WireType::Varint, buf);
        wire::put_varint(i64::from(value.to_wire()) as u64, buf);
    }

    /// Decodes one wire value into `value`.
    pub fn merge<E: Enumeration>(value: &mut E, buf: &mut &[u8]) -> Result<()> {
        let bits = wire::read_varint32(buf)?;
        *value = E::from_wire(bits as i32);
        Ok(())
    }

    fn payload_len<E: Enumeration>(values: &[E]) -> u64 {
        values
            .iter()
            .map(|value| u64::from(wire::varint_len_i64(i64::from(value.to_wire()))))
            .sum()
    }

    /// Encoded length of the packed run, or 0 for an empty slice.
    pub fn packed_len<E: Enumeration>(number: u32, values: &[E]) -> u64 {
        if values.is_empty() {
            return 0;
        }
        let payload = payload_len(values);
        u64::from(wire::tag_len(number)) + u64::from(wire::varint_len(payload)) + payload
    }

    /// Emits the whole packed run; nothing for an empty slice.
    pub fn encode_packed<E: Enumeration, B: BufMut>(number: u32, values: &[E], buf: &mut B) {
        if values.is_empty() {
            return;
        }
        wire::put_tag(number, WireType::LengthDelimited, buf);
        wire::put_varint(payload_len(values), buf);
        for value in values {
            wire::put_varint(i64::from(value.to_wire()) as u64, buf);
        }
    }

    /// Appends every element of a packed payload to `values`.
    pub fn merge_packed<E: Enumeration>(values: &mut Vec<E>, buf: &mut &[u8]) -> Result<()> {
        let length = wire::read_length(buf)?;
        let bytes: &[u8] = *buf;
        let mut payload = &bytes[..length];
        while !payload.is_empty() {
            let mut value = E::default();
            merge(&mut value, &mut payload)?;
            values.push(value);
        }
        *buf = &bytes[length..];
        Ok(())
    }
}

/// UTF-8 text, length-delimited.
pub mod string {
    use bytes::BufMut;

    use crate::error::{Error, Result};
    use crate::wire::{self, WireType};

    /// Encoded tag + length + payload bytes of one field occurrence.
    pub fn encoded_len(number: u32, value: &str) -> u64 {
        let payload = value.len() as u64;
        u64::from(wire::tag_len(number)) + u64::from(wire::varint_len(payload)) + payload
    }

    /// Emits one tag + value occurrence.
    pub fn encode<B: BufMut>(number: u32, value: &str, buf: &mut B) {
        wire::put_tag(number, WireType::LengthDelimited, buf);
        wire::put_varint(value.len() as u64, buf);
        buf.put_slice(value.as_bytes());
    }

    /// Decodes one wire value into `value`, replacing any previous contents.
    ///
    /// The payload must be valid UTF-8.
    pub fn merge(value: &mut String, buf: &mut &[u8]) -> Result<()> {
        let length = wire::read_length(buf)?;
        let bytes: &[u8] = *buf;
        let text = std::str::from_utf8(&bytes[..length]).map_err(|_| Error::InvalidUtf8)?;
        value.clear();
        value.push_str(text);
        *buf = &bytes[length..];
        Ok(())
    }
}

/// Arbitrary byte strings, length-delimited.
pub mod bytes {
    use ::bytes::BufMut;

    use crate::error::Result;
    use crate::wire::{self, WireType};

    /// Encoded tag + length + payload bytes of one field occurrence.
    pub fn encoded_len(number: u32, value: &[u8]) -> u64 {
        let payload = value.len() as u64;
        u64::from(wire::tag_len(number)) + u64::from(wire::varint_len(payload)) + payload
    }

    /// Emits one tag + value occurrence.
    pub fn encode<B: BufMut>(number: u32, value: &[u8], buf: &mut B) {
        wire::put_tag(number, WireType::LengthDelimited, buf);
        wire::put_varint(value.len() as u64, buf);
        buf.put_slice(value);
    }

    /// Decodes one wire value into `value`, replacing any previous contents.
    pub fn merge(value: &mut Vec<u8>, buf: &mut &[u8]) -> Result<()> {
        let length = wire::read_length(buf)?;
        let bytes: &[u8] = *buf;
        value.clear();
        value.extend_from_slice(&bytes[..length]);
        *buf = &bytes[length..];
        Ok(())
    }
}

/// Nested messages: a length varint followed by the encoded fields.
pub mod message {
    use bytes::BufMut;

    use crate::error::{Error, Result};
    use crate::message::{self, Message};
    use crate::wire::{self, WireType};
    use crate::MAX_NESTING_DEPTH;

    /// Encoded tag + length + payload bytes of one field occurrence.
    pub fn encoded_len<M: Message>(number: u32, value: &M) -> u64 {
        let payload = value.encoded_len();
        u64::from(wire::tag_len(number)) + u64::from(wire::varint_len(payload)) + payload
    }

    /// Emits one tag + value occurrence.
    pub fn encode<M: Message, B: BufMut>(number: u32, value: &M, buf: &mut B) {
        wire::put_tag(number, WireType::LengthDelimited, buf);
        wire::put_varint(value.encoded_len(), buf);
        value.encode_fields(buf);
    }

    /// Merges one wire occurrence into `value`, recursing through its fields.
    ///
    /// Fails if the accumulated nesting depth reaches the parse ceiling.
    /// Merging (rather than overwriting) is what gives nested records their
    /// field-by-field merge semantics across repeated occurrences.
    pub fn merge<M: Message>(value: &mut M, buf: &mut &[u8], depth: u32) -> Result<()> {
        let length = wire::read_length(buf)?;
        if depth >= MAX_NESTING_DEPTH {
            return Err(Error::depth_limit());
        }
        let bytes: &[u8] = *buf;
        message::merge_fields(&bytes[..length], depth + 1, value)?;
        *buf = &bytes[length..];
        Ok(())
    }
}

/// Map fields: each entry is a synthetic two-field record with the key at
/// field number 1 and the value at field number 2.
pub mod map {
    use crate::error::{Error, Result};
    use crate::wire::{self, WireType};
    use crate::MAX_NESTING_DEPTH;

    use super::skip;

    /// Decodes one map entry into a fresh `(key, value)` pair.
    ///
    /// The caller supplies the expected wire type and merge function for each
    /// of the two synthetic fields; entry fields with a different wire type
    /// or an unknown number are skipped. Missing key or value fields leave
    /// the respective default, matching the wire format's treatment of
    /// absent entry fields.
    pub fn merge_entry<K, V>(
        buf: &mut &[u8],
        depth: u32,
        key_wire: WireType,
        mut merge_key: impl FnMut(&mut K, &mut &[u8], u32) -> Result<()>,
        value_wire: WireType,
        mut merge_value: impl FnMut(&mut V, &mut &[u8], u32) -> Result<()>,
    ) -> Result<(K, V)>
    where
        K: Default,
        V: Default,
    {
        let length = wire::read_length(buf)?;
        if depth >= MAX_NESTING_DEPTH {
            return Err(Error::depth_limit());
        }
        let bytes: &[u8] = *buf;
        let mut entry = &bytes[..length];

        let mut key = K::default();
        let mut value = V::default();
        while !entry.is_empty() {
            let tag = wire::read_varint32(&mut entry)?;
            let wire_type = WireType::from_tag(tag);
            match wire::field_number(tag) {
                1 if wire_type == key_wire => merge_key(&mut key, &mut entry, depth + 1)?,
                2 if wire_type == value_wire => merge_value(&mut value, &mut entry, depth + 1)?,
                _ => skip(wire_type, &mut entry)?,
            }
        }

        *buf = &bytes[length..];
        Ok((key, value))
    }
}
