//! Inspector integration tests: scan trees and rendered dumps over bytes
//! produced by the codec itself.

use zica_core::inspect::{scan, scan_message, RenderConfig, Renderer, ScanMode, Span, SpanValue};
use zica_core::{self as zica, Message};

#[derive(Message, Debug, Default, PartialEq)]
struct Reading {
    #[zica(tag = 1)]
    label: String,
    #[zica(tag = 2)]
    ratio: f64,
    #[zica(tag = 3, kind = "sint32")]
    delta: i32,
}

#[derive(Message, Debug, Default, PartialEq)]
struct Wrapper {
    #[zica(tag = 1)]
    note: String,
    #[zica(tag = 2)]
    reading: Reading,
}

fn serialize_to_vec<M: Message>(message: &M) -> Vec<u8> {
    let size = zica::compute_size(message);
    assert!(size >= 0);
    let mut buf = Vec::with_capacity(size as usize);
    zica::serialize(message, &mut buf);
    buf
}

#[test]
fn scan_recovers_field_structure_without_schema() {
    let reading = Reading {
        label: "pi ratio".to_owned(),
        ratio: 1.5,
        delta: -1,
    };
    let buf = serialize_to_vec(&reading);

    let spans = scan(&buf, ScanMode::Strict);
    assert_eq!(spans.len(), 3);

    let label = spans[0].as_field().expect("field span");
    assert_eq!(label.number, 1);
    match &label.value {
        SpanValue::Bytes(bytes) => assert_eq!(bytes.utf8_chars, Some(8)),
        other => panic!("expected bytes, got {other:?}"),
    }

    let ratio = spans[1].as_field().expect("field span");
    assert_eq!(ratio.number, 2);
    assert_eq!(ratio.value, SpanValue::Fixed64(1.5f64.to_bits()));

    let delta = spans[2].as_field().expect("field span");
    assert_eq!(delta.number, 3);
    // sint32 -1 zigzags to 1; the inspector sees only the raw varint.
    assert_eq!(delta.value, SpanValue::Varint(1));
}

#[test]
fn nested_message_span_tree() {
    let wrapper = Wrapper {
        note: "outer".to_owned(),
        reading: Reading {
            label: "inner".to_owned(),
            ratio: -1.0,
            delta: 16,
        },
    };
    let buf = serialize_to_vec(&wrapper);

    let message = scan_message(&buf).expect("whole buffer is one message");
    let SpanValue::Message(ref tree) = message.value else {
        panic!("expected message value");
    };
    assert_eq!(message.number, 0);
    assert_eq!(tree.fields.len(), 2);
    assert_eq!(tree.fields[0].number, 1);
    let SpanValue::Message(ref nested) = tree.fields[1].value else {
        panic!("inner reading should parse as a nested message");
    };
    assert_eq!(nested.fields.len(), 3);
    assert_eq!(nested.fields[0].number, 1);
    assert_eq!(nested.fields[1].value, SpanValue::Fixed64((-1.0f64).to_bits()));
    assert_eq!(nested.fields[2].value, SpanValue::Varint(32));
}

#[test]
fn permissive_scan_reports_surrounding_garbage() {
    let reading = Reading {
        label: "x".to_owned(),
        ratio: 0.5,
        delta: 2,
    };
    let payload = serialize_to_vec(&reading);

    let mut buf = vec![0xF7; 5];
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(&[0xF7; 7]);

    let spans = scan(&buf, ScanMode::Permissive);
    assert!(matches!(spans.first(), Some(Span::Raw(range)) if *range == (0..5)));
    assert!(matches!(spans.last(), Some(Span::Raw(range)) if range.end == buf.len()));
    let fields = spans.iter().filter(|span| span.as_field().is_some()).count();
    assert_eq!(fields, 3);
}

#[test]
fn rendered_dump_single_message() {
    // field 1 = "!!", field 2 = varint 150. The string content is chosen so
    // the nested-message probe cannot mistake it for fields.
    let mut buf = Vec::new();
    zica_core::encoding::string::encode(1, "!!", &mut buf);
    zica_core::encoding::uint32::encode(2, &150, &mut buf);
    assert_eq!(buf, [0x0A, 0x02, 0x21, 0x21, 0x10, 0x96, 0x01]);

    let spans = scan(&buf, ScanMode::Permissive);
    let rendered = Renderer::new(&buf).render(&spans);
    let line1 = format!(
        "00000000  0a 02 21 21{}[1] = 2-char UTF-8: !!",
        " ".repeat(12 * 3)
    );
    let line2 = format!(
        "00000000 {} 10 96 01{}[2] = (u)intXX{{150}} | sintXX{{75}}",
        " ".repeat(4 * 3),
        " ".repeat(9 * 3)
    );
    assert_eq!(rendered, format!("{line1}\n{line2}\n"));
}

#[test]
fn rendered_dump_respects_bytes_per_line() {
    let mut buf = Vec::new();
    zica_core::encoding::string::encode(1, "abcdef", &mut buf);

    let spans = scan(&buf, ScanMode::Permissive);
    let rendered =
        Renderer::with_config(&buf, RenderConfig::new().bytes_per_line(4)).render(&spans);
    let lines: Vec<&str> = rendered.lines().collect();
    // 8 bytes at 4 per row is two rows.
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("00000000  0a 06 61 62"));
    assert!(lines[1].starts_with("00000004  63 64 65 66"));
    assert!(lines[0].contains("[1] = 6-char UTF-8: ab"));
    assert!(lines[1].contains("cdef"));
}

#[test]
fn inspector_never_consumes_group_wire_types() {
    // Tags with wire types 3, 4, 6, 7 are never recognized.
    for tag in [0x0B_u8, 0x0C, 0x0E, 0x0F] {
        let buf = [tag, 0x01];
        assert!(scan(&buf, ScanMode::Strict).is_empty());
        let spans = scan(&buf, ScanMode::Permissive);
        assert_eq!(spans.len(), 1);
        assert!(matches!(&spans[0], Span::Raw(range) if *range == (0..2)));
    }
}
