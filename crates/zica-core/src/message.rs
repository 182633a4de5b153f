//! The [`Message`] trait and the public codec entry points.
//!
//! A message's identity is its field list: `#[derive(Message)]` binds each
//! struct member to a field number and kind at build time and generates the
//! three trait methods. The free functions here are the whole public codec
//! surface: [`compute_size`], [`serialize`], [`merge_from`], [`parse`].

use bytes::BufMut;

use crate::error::Result;
use crate::field::FieldDescriptor;
use crate::wire::{self, WireType};
use crate::MAX_SERIALIZED_SIZE;

/// A record type with an associated field list.
///
/// Usually implemented with `#[derive(Message)]`. Hand-written impls must
/// keep `FIELDS` ordered by strictly increasing field number and should run
/// [`crate::field::assert_field_list_valid`] in a `const` context to get the
/// same build-time guarantee the derive provides.
pub trait Message: Default {
    /// Compile-time field descriptor table, ordered by ascending field
    /// number. Supports indexed access and binary search via
    /// [`crate::field::find_field`].
    const FIELDS: &'static [FieldDescriptor];

    /// Sum of the encoded tag+value bytes for every populated field.
    ///
    /// This is the raw payload size with no outer length prefix and no
    /// maximum-size cap; [`compute_size`] applies the cap.
    fn encoded_len(&self) -> u64;

    /// Emits every populated field as tag+value pairs, in declaration order.
    fn encode_fields<B: BufMut>(&self, buf: &mut B);

    /// Merges one tag's value into the matching member.
    ///
    /// `buf` is positioned just after the tag. Unknown field numbers and
    /// known fields with a mismatched (but recognized) wire type skip the
    /// value; unrecognized wire types fail.
    fn merge_field(
        &mut self,
        field_number: u32,
        wire_type: WireType,
        buf: &mut &[u8],
        depth: u32,
    ) -> Result<()>;
}

/// An enumerated value carried on the wire as the varint of an `i32`.
///
/// Usually implemented with `#[derive(Enumeration)]` on a fieldless enum,
/// which maps unknown wire values to the `Default` variant. `i32` implements
/// this trait as the identity, for callers that need to round-trip wire
/// values outside their declared variants.
pub trait Enumeration: Copy + Default {
    /// Converts a decoded wire value into the enumeration.
    fn from_wire(value: i32) -> Self;

    /// Converts the enumeration into its wire value.
    fn to_wire(self) -> i32;
}

impl Enumeration for i32 {
    fn from_wire(value: i32) -> Self {
        value
    }

    fn to_wire(self) -> i32 {
        self
    }
}

/// Parses a tag stream, merging field data into `message`.
///
/// Succeeds iff the whole buffer is consumed without error. `depth` carries
/// the nesting level: the nested-message helper
/// [`encoding::message::merge`](crate::encoding::message::merge) increments
/// it and enforces [`crate::MAX_NESTING_DEPTH`].
pub fn merge_fields<M: Message>(bytes: &[u8], depth: u32, message: &mut M) -> Result<()> {
    let mut buf = bytes;
    while !buf.is_empty() {
        let tag = wire::read_varint32(&mut buf)?;
        let wire_type = WireType::from_tag(tag);
        message.merge_field(wire::field_number(tag), wire_type, &mut buf, depth)?;
    }
    Ok(())
}

/// Computes the exact serialized size of `message`, or −1 if it would exceed
/// [`MAX_SERIALIZED_SIZE`].
pub fn compute_size<M: Message>(message: &M) -> i32 {
    let size = message.encoded_len();
    if size <= u64::from(MAX_SERIALIZED_SIZE) {
        size as i32
    } else {
        -1
    }
}

/// Serializes `message` into the caller-provided buffer.
///
/// There is no error path: once [`compute_size`] has returned a non-negative
/// value, emission cannot fail. The buffer must have room for at least that
/// many bytes — a fixed-size `&mut [u8]` that is too small will panic.
pub fn serialize<M: Message, B: BufMut>(message: &M, buf: &mut B) {
    debug_assert!(compute_size(message) >= 0);
    message.encode_fields(buf);
}

/// Parses `bytes` into an existing message using merge semantics.
///
/// Scalars overwrite, nested messages merge recursively, repeated fields
/// append. Returns false if the parse failed; the message may then hold a
/// partial merge.
pub fn merge_from<M: Message>(bytes: &[u8], message: &mut M) -> bool {
    merge_fields(bytes, 0, message).is_ok()
}

/// Parses `bytes` into a default-constructed message.
///
/// Returns `None` if the parse failed.
pub fn parse<M: Message>(bytes: &[u8]) -> Option<M> {
    let mut message = M::default();
    merge_from(bytes, &mut message).then_some(message)
}
