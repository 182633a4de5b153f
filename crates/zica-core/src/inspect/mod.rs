//! Schema-less inspection of wire bytes.
//!
//! The scanner walks arbitrary bytes and guesses plausible field structure:
//! it looks for valid-looking tags (a varint of at most 5 bytes, a valid
//! field number, a recognized wire type), parses the value each tag implies,
//! and recursively probes length-delimited payloads as candidate nested
//! messages. The result is a tree of [`Span`]s carrying byte ranges into the
//! original buffer, rendered by [`Renderer`] as an annotated hex dump.
//!
//! The heuristics are best-effort by design: a bytes field whose content
//! happens to parse as valid fields is reported as a nested message, and
//! there is no reliable way to tell a packed-repeated payload from a string.
//!
//! Two modes:
//!
//! - **strict**: any unrecognizable byte makes the scan return an empty tree
//! - **permissive**: unrecognizable bytes are reported as raw spans and the
//!   scan resynchronizes one byte later

mod render;

pub use render::{RenderConfig, Renderer};

use std::ops::Range;

use tracing::{debug, trace};

use crate::field::is_valid_field_number;
use crate::wire::{self, WireType};
use crate::MAX_NESTING_DEPTH;

/// How the scanner reacts to unrecognizable bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Fail the whole scan on the first unrecognizable byte
    Strict,
    /// Report unrecognizable bytes as raw spans and continue
    Permissive,
}

/// A contiguous byte range classified with a wire interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum Span {
    /// Bytes with no recognizable wire structure (permissive mode only)
    Raw(Range<usize>),
    /// A tag and its value
    Field(FieldSpan),
}

impl Span {
    /// The byte range this span covers.
    pub fn range(&self) -> Range<usize> {
        match self {
            Span::Raw(range) => range.clone(),
            Span::Field(field) => field.range.clone(),
        }
    }

    /// Returns the field span, if this is one.
    pub fn as_field(&self) -> Option<&FieldSpan> {
        match self {
            Span::Raw(_) => None,
            Span::Field(field) => Some(field),
        }
    }
}

/// A decoded tag+value region.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpan {
    /// Field number decoded from the tag
    pub number: u32,
    /// Full extent: tag, any length prefix, and the value bytes
    pub range: Range<usize>,
    /// The value interpretation
    pub value: SpanValue,
}

/// The value half of a [`FieldSpan`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpanValue {
    /// A varint value
    Varint(u64),
    /// A 32-bit fixed-width value
    Fixed32(u32),
    /// A 64-bit fixed-width value
    Fixed64(u64),
    /// A length-delimited payload that did not parse as a nested message
    Bytes(BytesSpan),
    /// A length-delimited payload that parsed cleanly as tag+value pairs
    Message(MessageSpan),
}

/// A length-delimited payload treated as bytes, possibly UTF-8 text.
#[derive(Debug, Clone, PartialEq)]
pub struct BytesSpan {
    /// The payload range (excluding tag and length prefix)
    pub payload: Range<usize>,
    /// Code-point count when the payload is valid UTF-8
    pub utf8_chars: Option<usize>,
}

/// A length-delimited payload interpreted as a nested message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSpan {
    /// The child fields, in wire order
    pub fields: Vec<FieldSpan>,
}

/// Counts the code points in `bytes` under full Unicode validation.
///
/// Overlong encodings, lone surrogates, illegal leading bytes, and code
/// points above U+10FFFF all yield `None`; the renderer then falls back to
/// per-byte display.
pub fn utf8_char_count(bytes: &[u8]) -> Option<usize> {
    std::str::from_utf8(bytes).ok().map(|s| s.chars().count())
}

// A tag varint wider than these never looks valid; values are bounded the
// same way the codec bounds them.
const MAX_TAG_BYTES: usize = 5;
const MAX_VARINT_BYTES: usize = 10;
const MAX_LENGTH_BYTES: usize = 5;

/// Scans `data` for tag+value structure.
///
/// In [`ScanMode::Permissive`], the returned spans partition the input
/// exactly; in [`ScanMode::Strict`], either every byte is accounted for by
/// field spans or the result is empty.
pub fn scan(data: &[u8], mode: ScanMode) -> Vec<Span> {
    debug!("scanning {} bytes ({:?})", data.len(), mode);
    let spans = scan_range(data, 0, data.len(), 0, mode);
    debug!("scan complete: {} top-level spans", spans.len());
    spans
}

/// Interprets the whole input as the fields of one message.
///
/// This is the strict scan wrapped in a synthetic message span carrying
/// field number 0. Returns `None` unless the scan consumed everything;
/// empty input yields an empty message.
pub fn scan_message(data: &[u8]) -> Option<FieldSpan> {
    let spans = scan_range(data, 0, data.len(), 0, ScanMode::Strict);
    if spans.is_empty() != data.is_empty() {
        return None;
    }
    Some(FieldSpan {
        number: 0,
        range: 0..data.len(),
        value: SpanValue::Message(MessageSpan {
            fields: into_field_spans(spans),
        }),
    })
}

/// Tries to parse a tag at `pos`. Returns the end position and tag value if
/// the bytes look like a valid tag.
fn maybe_parse_tag(data: &[u8], pos: usize, end: usize) -> Option<(usize, u32)> {
    let mut buf = &data[pos..end];
    let before = buf.len();
    let tag = wire::read_varint32(&mut buf).ok()?;
    let consumed = before - buf.len();
    if consumed > MAX_TAG_BYTES {
        return None;
    }
    if !is_valid_field_number(wire::field_number(tag)) {
        return None;
    }
    if !WireType::from_tag(tag).is_recognized() {
        return None;
    }
    Some((pos + consumed, tag))
}

/// Scans forward from `begin` for the first position where a valid-looking
/// tag parses. Returns (tag begin, tag end, tag).
fn find_next_valid_tag(data: &[u8], begin: usize, end: usize) -> Option<(usize, usize, u32)> {
    (begin..end).find_map(|pos| {
        maybe_parse_tag(data, pos, end).map(|(tag_end, tag)| (pos, tag_end, tag))
    })
}

/// Extends the trailing raw span through `end`, or appends a new one.
fn merge_or_append_raw(spans: &mut Vec<Span>, begin: usize, end: usize) {
    if let Some(Span::Raw(range)) = spans.last_mut() {
        if begin >= range.start && begin <= range.end && end > range.end {
            range.end = end;
            return;
        }
    }
    spans.push(Span::Raw(begin..end));
}

fn into_field_spans(spans: Vec<Span>) -> Vec<FieldSpan> {
    // Strict scans only ever produce field spans.
    spans
        .into_iter()
        .filter_map(|span| match span {
            Span::Field(field) => Some(field),
            Span::Raw(_) => None,
        })
        .collect()
}

fn scan_range(
    data: &[u8],
    mut begin: usize,
    end: usize,
    depth: u32,
    mode: ScanMode,
) -> Vec<Span> {
    let mut spans = Vec::new();

    while begin < end {
        let (tag_begin, tag_end, tag) = match mode {
            ScanMode::Permissive => match find_next_valid_tag(data, begin, end) {
                Some(found) => found,
                None => {
                    merge_or_append_raw(&mut spans, begin, end);
                    break;
                }
            },
            ScanMode::Strict => match maybe_parse_tag(data, begin, end) {
                Some((tag_end, tag)) => (begin, tag_end, tag),
                None => return Vec::new(),
            },
        };
        if tag_begin > begin {
            merge_or_append_raw(&mut spans, begin, tag_begin);
        }

        let number = wire::field_number(tag);
        // A value that fails to parse falls back byte-by-byte in permissive
        // mode and aborts the scan in strict mode.
        let parsed = match WireType::from_tag(tag) {
            WireType::Varint => {
                let mut buf = &data[tag_end..end];
                let before = buf.len();
                wire::read_varint64(&mut buf).ok().and_then(|value| {
                    let consumed = before - buf.len();
                    (consumed <= MAX_VARINT_BYTES)
                        .then_some((tag_end + consumed, SpanValue::Varint(value)))
                })
            }
            WireType::Fixed64 => {
                let mut buf = &data[tag_end..end];
                wire::read_fixed64(&mut buf)
                    .ok()
                    .map(|value| (tag_end + 8, SpanValue::Fixed64(value)))
            }
            WireType::Fixed32 => {
                let mut buf = &data[tag_end..end];
                wire::read_fixed32(&mut buf)
                    .ok()
                    .map(|value| (tag_end + 4, SpanValue::Fixed32(value)))
            }
            WireType::LengthDelimited => {
                let mut buf = &data[tag_end..end];
                let before = buf.len();
                wire::read_varint64(&mut buf).ok().and_then(|size| {
                    let consumed = before - buf.len();
                    let size_end = tag_end + consumed;
                    if consumed > MAX_LENGTH_BYTES || size > (end - size_end) as u64 {
                        return None;
                    }
                    let value_end = size_end + size as usize;
                    Some((value_end, length_delimited_value(data, size_end, value_end, depth)))
                })
            }
            // maybe_parse_tag only admits recognized wire types.
            _ => None,
        };

        match parsed {
            Some((value_end, value)) => {
                trace!("field {} at {}..{}", number, tag_begin, value_end);
                spans.push(Span::Field(FieldSpan {
                    number,
                    range: tag_begin..value_end,
                    value,
                }));
                begin = value_end;
            }
            None => match mode {
                ScanMode::Strict => return Vec::new(),
                ScanMode::Permissive => {
                    merge_or_append_raw(&mut spans, tag_begin, tag_begin + 1);
                    begin = tag_begin + 1;
                }
            },
        }
    }

    spans
}

/// Classifies a length-delimited payload: first try an exact parse as a
/// nested message, and fall back to bytes. Packed-repeated payloads are
/// indistinguishable from bytes and land in the fallback.
fn length_delimited_value(data: &[u8], begin: usize, end: usize, depth: u32) -> SpanValue {
    if depth < MAX_NESTING_DEPTH {
        let nested = scan_range(data, begin, end, depth + 1, ScanMode::Strict);
        if !nested.is_empty() {
            return SpanValue::Message(MessageSpan {
                fields: into_field_spans(nested),
            });
        }
    }
    SpanValue::Bytes(BytesSpan {
        payload: begin..end,
        utf8_chars: utf8_char_count(&data[begin..end]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding;

    #[test]
    fn test_empty_input() {
        assert!(scan(&[], ScanMode::Strict).is_empty());
        assert!(scan(&[], ScanMode::Permissive).is_empty());

        let message = scan_message(&[]).expect("empty input is an empty message");
        match message.value {
            SpanValue::Message(ref m) => assert!(m.fields.is_empty()),
            ref other => panic!("expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_input() {
        let garbage = b"garbage\0";

        assert!(scan(garbage, ScanMode::Strict).is_empty());
        assert!(scan_message(garbage).is_none());

        let spans = scan(garbage, ScanMode::Permissive);
        assert_eq!(spans, vec![Span::Raw(0..garbage.len())]);
    }

    #[test]
    fn test_single_varint_field() {
        let data = [0x08, 0x96, 0x01]; // field 1 = 150
        let spans = scan(&data, ScanMode::Permissive);
        assert_eq!(spans.len(), 1);
        let field = spans[0].as_field().expect("field span");
        assert_eq!(field.number, 1);
        assert_eq!(field.range, 0..3);
        assert_eq!(field.value, SpanValue::Varint(150));
    }

    #[test]
    fn test_fixed_fields() {
        let mut data = Vec::new();
        encoding::fixed32::encode(2, &7, &mut data);
        encoding::double::encode(3, &1.5, &mut data);

        let spans = scan(&data, ScanMode::Strict);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].as_field().unwrap().value, SpanValue::Fixed32(7));
        assert_eq!(
            spans[1].as_field().unwrap().value,
            SpanValue::Fixed64(1.5f64.to_bits())
        );
    }

    #[test]
    fn test_string_field_classified_as_utf8() {
        let mut data = Vec::new();
        encoding::string::encode(1, "zÿra", &mut data);

        let spans = scan(&data, ScanMode::Strict);
        assert_eq!(spans.len(), 1);
        match &spans[0].as_field().unwrap().value {
            SpanValue::Bytes(bytes) => {
                assert_eq!(bytes.utf8_chars, Some(4));
                assert_eq!(bytes.payload.len(), 5);
            }
            other => panic!("expected bytes span, got {other:?}"),
        }
    }

    #[test]
    fn test_non_utf8_bytes_field() {
        let data = [0x0A, 0x02, 0xFF, 0xFE];
        let spans = scan(&data, ScanMode::Strict);
        match &spans[0].as_field().unwrap().value {
            SpanValue::Bytes(bytes) => assert_eq!(bytes.utf8_chars, None),
            other => panic!("expected bytes span, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_message_detected() {
        // field 2 = { field 1 = 1 }
        let data = [0x12, 0x02, 0x08, 0x01];
        let spans = scan(&data, ScanMode::Permissive);
        assert_eq!(spans.len(), 1);
        let field = spans[0].as_field().unwrap();
        assert_eq!(field.number, 2);
        match &field.value {
            SpanValue::Message(message) => {
                assert_eq!(message.fields.len(), 1);
                assert_eq!(message.fields[0].number, 1);
                assert_eq!(message.fields[0].value, SpanValue::Varint(1));
                assert_eq!(message.fields[0].range, 2..4);
            }
            other => panic!("expected message span, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_around_valid_field() {
        let mut data = vec![0xF7, 0xF7]; // not a valid tag start
        encoding::uint32::encode(1, &5, &mut data);
        data.push(0xF7);

        let spans = scan(&data, ScanMode::Permissive);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0], Span::Raw(0..2));
        assert_eq!(spans[1].as_field().unwrap().value, SpanValue::Varint(5));
        assert_eq!(spans[2], Span::Raw(4..5));

        assert!(scan(&data, ScanMode::Strict).is_empty());
    }

    #[test]
    fn test_truncated_length_falls_back() {
        // Field 1 LEN claims 5 bytes but only 2 follow; permissive mode
        // resynchronizes into the payload bytes.
        let data = [0x0A, 0x05, 0x08, 0x01];
        let spans = scan(&data, ScanMode::Permissive);
        assert!(!spans.is_empty());
        // Coverage is still exact.
        let mut pos = 0;
        for span in &spans {
            assert_eq!(span.range().start, pos);
            pos = span.range().end;
        }
        assert_eq!(pos, data.len());

        assert!(scan(&data, ScanMode::Strict).is_empty());
    }

    #[test]
    fn test_nesting_probe_respects_depth_ceiling() {
        // depth+1 levels of nested LEN payloads around one varint field.
        fn wrap(mut inner: Vec<u8>, levels: u32) -> Vec<u8> {
            for _ in 0..levels {
                let mut outer = Vec::new();
                encoding::bytes::encode(1, &inner, &mut outer);
                inner = outer;
            }
            inner
        }

        let mut innermost = Vec::new();
        encoding::uint32::encode(1, &1, &mut innermost);
        let data = wrap(innermost, MAX_NESTING_DEPTH + 2);

        // The scan must terminate and classify the deepest payload as bytes.
        let spans = scan(&data, ScanMode::Strict);
        assert_eq!(spans.len(), 1);
        let mut value = &spans[0].as_field().unwrap().value;
        let mut message_levels = 0;
        while let SpanValue::Message(message) = value {
            assert_eq!(message.fields.len(), 1);
            value = &message.fields[0].value;
            message_levels += 1;
        }
        assert!(matches!(value, SpanValue::Bytes(_)));
        assert_eq!(message_levels, MAX_NESTING_DEPTH);
    }

    #[test]
    fn test_utf8_char_count() {
        assert_eq!(utf8_char_count(b""), Some(0));
        for byte in 0u8..0x7F {
            assert_eq!(utf8_char_count(&[byte]), Some(1));
        }
        // Illegal first bytes for a multi-byte sequence.
        for byte in 0x80u8..=0xC1 {
            assert_eq!(utf8_char_count(&[byte]), None);
            assert_eq!(utf8_char_count(&[b'A', byte]), None);
        }
        for byte in 0xF5u8..=0xFF {
            assert_eq!(utf8_char_count(&[byte]), None);
        }
        // Shortest valid two-byte char.
        assert_eq!(utf8_char_count(&[0xC2, 0x80]), Some(1));
        // Overlong encoding of '/'.
        assert_eq!(utf8_char_count(&[0xC0, 0xAF]), None);
        // Lone surrogate U+D800.
        assert_eq!(utf8_char_count(&[0xED, 0xA0, 0x80]), None);
        // U+10FFFF is the last valid code point; the next value is not.
        assert_eq!(utf8_char_count(&[0xF4, 0x8F, 0xBF, 0xBF]), Some(1));
        assert_eq!(utf8_char_count(&[0xF4, 0x90, 0x80, 0x80]), None);
        // Truncated sequence.
        assert_eq!(utf8_char_count(&[0xE2, 0x82]), None);
        assert_eq!(utf8_char_count("z\u{20AC}".as_bytes()), Some(2));
    }
}
