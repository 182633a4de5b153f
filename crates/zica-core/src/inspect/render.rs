//! Annotated hex-dump rendering of span trees.
//!
//! Each span renders as one row per `bytes_per_line`-sized block: a
//! hex-offset column, hex byte columns (padded with spaces for bytes outside
//! the span but inside the row), and an interpretation column. Nested
//! messages indent their children behind a `⦙` fence; bytes outside the
//! render window are elided with `…`.

use std::fmt::Write as FmtWrite;

use crate::wire;

use super::{BytesSpan, FieldSpan, MessageSpan, Span, SpanValue};

/// Extra indentation for the wrapped lines of a bytes span.
const CONTINUATION_INDENT: &str = "    ";

/// Indentation for the children of a message span.
const FENCE_INDENT: &str = "  \u{2999} ";

/// Configuration for [`Renderer`]
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Bytes rendered per row (default: 16)
    pub bytes_per_line: usize,
    /// Render window size in bytes, measured from `offset_zero`
    pub max_bytes: usize,
    /// Buffer position rendered as offset zero
    pub offset_zero: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bytes_per_line: 16,
            max_bytes: usize::MAX,
            offset_zero: 0,
        }
    }
}

impl RenderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bytes per row
    pub fn bytes_per_line(mut self, count: usize) -> Self {
        self.bytes_per_line = count;
        self
    }

    /// Sets the render window size
    pub fn max_bytes(mut self, count: usize) -> Self {
        self.max_bytes = count;
        self
    }

    /// Sets the buffer position rendered as offset zero
    pub fn offset_zero(mut self, position: usize) -> Self {
        self.offset_zero = position;
        self
    }
}

/// Renders spans produced by [`scan`](super::scan) against the bytes they
/// were scanned from.
#[derive(Debug)]
pub struct Renderer<'a> {
    data: &'a [u8],
    offset_zero: usize,
    limit: usize,
    bytes_per_line: usize,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer over the scanned buffer with default settings.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, RenderConfig::default())
    }

    /// Creates a renderer with custom configuration.
    pub fn with_config(data: &'a [u8], config: RenderConfig) -> Self {
        Self {
            data,
            offset_zero: config.offset_zero,
            limit: config.offset_zero.saturating_add(config.max_bytes),
            bytes_per_line: config.bytes_per_line.max(1),
        }
    }

    /// Renders the spans, one newline-terminated line at a time.
    pub fn render(&self, spans: &[Span]) -> String {
        let mut out = String::new();
        let mut indent = String::new();
        for span in spans {
            for line in self.span_lines(span, &mut indent) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Renders a single field span (e.g. the synthetic message from
    /// [`scan_message`](super::scan_message)).
    pub fn render_field(&self, field: &FieldSpan) -> String {
        let mut out = String::new();
        let mut indent = String::new();
        for line in self.field_lines(field, &mut indent) {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Offset of the row containing `pos`, relative to `offset_zero`.
    fn row_index_offset(&self, pos: usize) -> usize {
        let offset = pos.saturating_sub(self.offset_zero);
        (offset / self.bytes_per_line) * self.bytes_per_line
    }

    /// One row: offset column plus hex columns, bytes outside `begin..end`
    /// padded with spaces.
    fn hex_dump_row(&self, row_offset: usize, begin: usize, end: usize) -> String {
        let mut row = format!("{row_offset:08x} ");
        let row_begin = self.offset_zero + row_offset;
        for i in 0..self.bytes_per_line {
            row.push(' ');
            let pos = row_begin + i;
            if pos >= begin && pos < end {
                let _ = write!(row, "{:02x}", self.data[pos]);
            } else {
                row.push_str("  ");
            }
        }
        row
    }

    /// All rows overlapping `begin..end`, clamped to the render window.
    fn hex_dump_rows(&self, begin: usize, end: usize) -> Vec<String> {
        if begin >= end || begin < self.offset_zero || self.limit <= begin {
            return Vec::new();
        }
        let last = end.min(self.limit) - 1;
        let mut row_offset = self.row_index_offset(begin);
        let end_row_offset = self.row_index_offset(last) + self.bytes_per_line;
        let mut lines = Vec::with_capacity((end_row_offset - row_offset) / self.bytes_per_line);
        while row_offset != end_row_offset {
            lines.push(self.hex_dump_row(row_offset, begin, end));
            row_offset += self.bytes_per_line;
        }
        lines
    }

    fn span_lines(&self, span: &Span, indent: &mut String) -> Vec<String> {
        match span {
            Span::Raw(range) => {
                let mut lines = self.hex_dump_rows(range.start, range.end);
                let mut row_begin = self.offset_zero + self.row_index_offset(range.start);
                for line in &mut lines {
                    line.push_str(indent);
                    self.push_raw_glyphs(
                        range.start.max(row_begin),
                        range.end.min(row_begin + self.bytes_per_line),
                        line,
                    );
                    row_begin += self.bytes_per_line;
                }
                lines
            }
            Span::Field(field) => self.field_lines(field, indent),
        }
    }

    fn field_lines(&self, field: &FieldSpan, indent: &mut String) -> Vec<String> {
        match &field.value {
            SpanValue::Varint(value) => {
                self.scalar_lines(field, indent, varint_interpretation(field.number, *value))
            }
            SpanValue::Fixed32(value) => {
                self.scalar_lines(field, indent, fixed32_interpretation(field.number, *value))
            }
            SpanValue::Fixed64(value) => {
                self.scalar_lines(field, indent, fixed64_interpretation(field.number, *value))
            }
            SpanValue::Bytes(bytes) => self.bytes_lines(field, bytes, indent),
            SpanValue::Message(message) => self.message_lines(field, message, indent),
        }
    }

    fn scalar_lines(
        &self,
        field: &FieldSpan,
        indent: &mut String,
        interpretation: String,
    ) -> Vec<String> {
        let mut lines = self.hex_dump_rows(field.range.start, field.range.end);
        if lines.is_empty() {
            return lines;
        }
        lines[0].push_str(indent);
        lines[0].push_str(&interpretation);
        for line in &mut lines[1..] {
            line.push_str(indent);
        }
        lines
    }

    fn bytes_lines(
        &self,
        field: &FieldSpan,
        bytes: &BytesSpan,
        indent: &mut String,
    ) -> Vec<String> {
        let mut lines = self.hex_dump_rows(field.range.start, field.range.end);
        if lines.is_empty() {
            return lines;
        }

        lines[0].push_str(indent);
        let _ = write!(lines[0], "[{}] = ", field.number);
        match bytes.utf8_chars {
            Some(chars) => {
                let _ = write!(lines[0], "{chars}-char UTF-8: ");
            }
            None => {
                let _ = write!(lines[0], "{} byte(s): ", bytes.payload.len());
            }
        }

        indent.push_str(CONTINUATION_INDENT);
        let mut row_begin = self.offset_zero + self.row_index_offset(field.range.start);
        for (i, line) in lines.iter_mut().enumerate() {
            if i != 0 {
                line.push_str(indent);
            }
            let row_end = row_begin + self.bytes_per_line;
            if bytes.payload.start < row_end {
                let within_begin = bytes.payload.start.max(row_begin);
                let within_end = field.range.end.min(row_end);
                if bytes.utf8_chars.is_some() {
                    self.push_utf8_glyphs(within_begin, within_end, line);
                } else {
                    self.push_raw_glyphs(within_begin, within_end, line);
                }
            }
            row_begin += self.bytes_per_line;
        }
        indent.truncate(indent.len() - CONTINUATION_INDENT.len());

        if field.range.end > self.limit
            && self.row_index_offset(field.range.end) != self.row_index_offset(self.limit)
        {
            if let Some(last) = lines.last_mut() {
                last.push('\u{2026}');
            }
        }

        lines
    }

    fn message_lines(
        &self,
        field: &FieldSpan,
        message: &MessageSpan,
        indent: &mut String,
    ) -> Vec<String> {
        let length_varint_end = message
            .fields
            .first()
            .map_or(field.range.end, |child| child.range.start);
        let mut lines = vec![self.hex_dump_row(
            self.row_index_offset(field.range.start),
            field.range.start,
            length_varint_end.min(self.limit),
        )];

        let message_size = match (message.fields.first(), message.fields.last()) {
            (Some(first), Some(last)) => last.range.end - first.range.start,
            _ => 0,
        };
        let _ = write!(
            lines[0],
            "{indent}[{}] = {message_size}-byte message {{",
            field.number
        );

        indent.push_str(FENCE_INDENT);
        let mut dump_is_incomplete = false;
        for child in &message.fields {
            if child.range.start >= self.limit {
                dump_is_incomplete = true;
                break;
            }
            lines.extend(self.field_lines(child, indent));
        }
        indent.truncate(indent.len() - FENCE_INDENT.len());

        lines.push(self.hex_dump_row(
            self.row_index_offset(field.range.end),
            field.range.end,
            field.range.end,
        ));
        if let Some(last) = lines.last_mut() {
            last.push_str(indent);
            if dump_is_incomplete {
                last.push('\u{2026}');
            }
            last.push('}');
        }

        lines
    }

    fn push_raw_glyphs(&self, begin: usize, end: usize, out: &mut String) {
        for &byte in &self.data[begin..end] {
            push_byte_glyph(byte, out);
        }
    }

    /// Prints validated UTF-8, mapping C0/C1 control characters to visible
    /// glyphs. A multi-byte character that starts before `soft_end` prints
    /// whole; its continuation bytes are then skipped on the next row.
    fn push_utf8_glyphs(&self, begin: usize, soft_end: usize, out: &mut String) {
        let mut pos = begin;
        while pos < soft_end {
            let byte = self.data[pos];
            if byte >> 7 == 0 {
                push_byte_glyph(byte, out);
                pos += 1;
            } else if byte >> 6 == 0b11 {
                let len = if byte >> 5 == 0b110 {
                    2
                } else if byte >> 4 == 0b1110 {
                    3
                } else {
                    4
                };
                if byte == 0xC2 && self.data[pos + 1] >> 5 == 0b100 {
                    // U+0080..=U+009F are C1 controls; never emit them raw.
                    let code = 0x80 | (self.data[pos + 1] & 0x1F);
                    out.push_str(HIGH_GLYPHS[usize::from(code) - 0x7F]);
                } else if let Ok(sequence) = std::str::from_utf8(&self.data[pos..pos + len]) {
                    out.push_str(sequence);
                }
                pos += len;
            } else {
                // Continuation byte: the previous row printed this character.
                pos += 1;
            }
        }
    }
}

fn varint_interpretation(number: u32, value: u64) -> String {
    let signed = value as i64;
    let zigzag = wire::zigzag_decode64(value);
    let mut out = format!("[{number}] = ");
    if signed >= 0 {
        let _ = write!(out, "(u)intXX{{{value}}} | sintXX{{{zigzag}}}");
    } else {
        let _ = write!(out, "uintXX{{{value}}} | intXX{{{signed}}} | sintXX{{{zigzag}}}");
    }
    if value <= 1 {
        let _ = write!(out, " | bool{{{}}}", value != 0);
    }
    out
}

fn fixed32_interpretation(number: u32, value: u32) -> String {
    let float = f32::from_bits(value);
    let signed = value as i32;
    if signed >= 0 {
        format!("[{number}] = float{{{float}}} | (s)fixed32{{{value}}}")
    } else {
        format!("[{number}] = float{{{float}}} | fixed32{{{value}}} | sfixed32{{{signed}}}")
    }
}

fn fixed64_interpretation(number: u32, value: u64) -> String {
    let double = f64::from_bits(value);
    let signed = value as i64;
    if signed >= 0 {
        format!("[{number}] = double{{{double}}} | (s)fixed64{{{value}}}")
    } else {
        format!("[{number}] = double{{{double}}} | fixed64{{{value}}} | sfixed64{{{signed}}}")
    }
}

fn push_byte_glyph(byte: u8, out: &mut String) {
    match byte {
        0x00..=0x1F => out.push_str(CONTROL_GLYPHS[byte as usize]),
        0x20..=0x7E => out.push(byte as char),
        _ => out.push_str(HIGH_GLYPHS[usize::from(byte) - 0x7F]),
    }
}

/// Code-Page-437-like glyphs for the C0 control bytes.
const CONTROL_GLYPHS: [&str; 32] = [
    "␀", "☺", "☻", "♥", "♦", "♣", "♠", "•", "◘", "○", "◙", "♂", "♀", "♪", "♫", "☼", "►", "◄", "↕",
    "‼", "¶", "§", "▬", "↨", "↑", "↓", "→", "←", "∟", "↔", "▲", "▼",
];

/// Code-Page-437-like glyphs for bytes 0x7F through 0xFF.
const HIGH_GLYPHS: [&str; 129] = [
    "⌂", "Ç", "ü", "é", "â", "ä", "à", "å", "ç", "ê", "ë", "è", "ï", "î", "ì", "Ä", "Å", "É", "æ",
    "Æ", "ô", "ö", "ò", "û", "ù", "ÿ", "Ö", "Ü", "¢", "£", "¥", "₧", "ƒ", "á", "í", "ó", "ú", "ñ",
    "Ñ", "ª", "º", "¿", "⌐", "¬", "½", "¼", "¡", "«", "»", "░", "▒", "▓", "│", "┤", "╡", "╢", "╖",
    "╕", "╣", "║", "╗", "╝", "╜", "╛", "┐", "└", "┴", "┬", "├", "─", "┼", "╞", "╟", "╚", "╔", "╩",
    "╦", "╠", "═", "╬", "╧", "╨", "╤", "╥", "╙", "╘", "╒", "╓", "╫", "╪", "┘", "┌", "█", "▄", "▌",
    "▐", "▀", "α", "ß", "Γ", "π", "Σ", "σ", "µ", "τ", "Φ", "Θ", "Ω", "δ", "∞", "φ", "ε", "∩", "≡",
    "±", "≥", "≤", "⌠", "⌡", "÷", "≈", "°", "∙", "·", "√", "ⁿ", "²", "■", " ",
];

#[cfg(test)]
mod tests {
    use super::super::{scan, scan_message, ScanMode};
    use super::*;

    #[test]
    fn test_row_index_offset() {
        let data = [0u8; 256];
        let renderer = Renderer::with_config(&data, RenderConfig::new().max_bytes(256));
        for i in 0..16 {
            assert_eq!(renderer.row_index_offset(i), 0);
        }
        for i in 16..32 {
            assert_eq!(renderer.row_index_offset(i), 16);
        }
        for i in 32..48 {
            assert_eq!(renderer.row_index_offset(i), 32);
        }
    }

    #[test]
    fn test_raw_span_render() {
        let data = b"garbage\0";
        let spans = scan(data, ScanMode::Permissive);
        let rendered = Renderer::new(data).render(&spans);
        assert_eq!(
            rendered,
            format!(
                "00000000  67 61 72 62 61 67 65 00{}garbage␀\n",
                " ".repeat(8 * 3)
            )
        );
    }

    #[test]
    fn test_varint_span_render() {
        let data = [0x08, 0x2A];
        let spans = scan(&data, ScanMode::Permissive);
        let rendered = Renderer::new(&data).render(&spans);
        assert_eq!(
            rendered,
            format!(
                "00000000  08 2a{}[1] = (u)intXX{{42}} | sintXX{{21}}\n",
                " ".repeat(14 * 3)
            )
        );
    }

    #[test]
    fn test_varint_bool_forms() {
        assert_eq!(
            varint_interpretation(3, 1),
            "[3] = (u)intXX{1} | sintXX{-1} | bool{true}"
        );
        assert_eq!(
            varint_interpretation(3, 0),
            "[3] = (u)intXX{0} | sintXX{0} | bool{false}"
        );
        assert_eq!(
            varint_interpretation(2, u64::MAX),
            "[2] = uintXX{18446744073709551615} | intXX{-1} | sintXX{-9223372036854775808}"
        );
    }

    #[test]
    fn test_fixed_interpretations() {
        assert_eq!(
            fixed64_interpretation(2, 1.5f64.to_bits()),
            "[2] = double{1.5} | (s)fixed64{4609434218613702656}"
        );
        assert_eq!(
            fixed64_interpretation(2, (-1.0f64).to_bits()),
            "[2] = double{-1} | fixed64{13830554455654793216} | sfixed64{-4616189618054758400}"
        );
        assert_eq!(
            fixed32_interpretation(7, 2.5f32.to_bits()),
            "[7] = float{2.5} | (s)fixed32{1075838976}"
        );
    }

    #[test]
    fn test_nested_message_render() {
        // field 1 = { field 1 = 1 }
        let data = [0x0A, 0x02, 0x08, 0x01];
        let spans = scan(&data, ScanMode::Permissive);
        let rendered = Renderer::new(&data).render(&spans);

        let line1 = format!(
            "00000000  0a 02{}[1] = 2-byte message {{",
            " ".repeat(14 * 3)
        );
        let line2 = format!(
            "00000000        08 01{}  ⦙ [1] = (u)intXX{{1}} | sintXX{{-1}} | bool{{true}}",
            " ".repeat(12 * 3)
        );
        let line3 = format!("00000000 {}}}", " ".repeat(16 * 3));
        assert_eq!(rendered, format!("{line1}\n{line2}\n{line3}\n"));
    }

    #[test]
    fn test_scan_message_render_uses_field_number_zero() {
        let data = [0x08, 0x05];
        let message = scan_message(&data).expect("valid message");
        let rendered = Renderer::new(&data).render_field(&message);
        assert!(rendered.starts_with(&format!("00000000 {}[0] = 2-byte message {{", " ".repeat(16 * 3))));
        assert!(rendered.contains("  ⦙ [1] = (u)intXX{5}"));
        assert!(rendered.trim_end().ends_with('}'));
    }

    #[test]
    fn test_utf8_span_render_with_control_glyphs() {
        // "a\tb" is valid UTF-8; the tab renders as a CP437 glyph.
        let data = [0x0A, 0x03, b'a', 0x09, b'b'];
        let spans = scan(&data, ScanMode::Permissive);
        let rendered = Renderer::new(&data).render(&spans);
        // The tab (0x09) renders as its control glyph, not a literal tab.
        assert!(rendered.contains(&format!("[1] = 3-char UTF-8: a{}b", CONTROL_GLYPHS[9])));
        assert!(!rendered.contains('\t'));
    }

    #[test]
    fn test_render_window_elides_with_ellipsis() {
        // A 36-byte string field spans three rows; limit the window to one.
        let mut data = vec![0x0A, 0x24];
        data.extend_from_slice(&[b'x'; 36]);
        let spans = scan(&data, ScanMode::Permissive);
        let rendered =
            Renderer::with_config(&data, RenderConfig::new().max_bytes(16)).render(&spans);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with('…'));
    }

    #[test]
    fn test_glyph_tables_cover_all_bytes() {
        let mut out = String::new();
        for byte in 0..=u8::MAX {
            push_byte_glyph(byte, &mut out);
        }
        assert_eq!(out.chars().count(), 256);
    }

    #[test]
    fn test_glyph_tables_match_code_page_437() {
        assert_eq!(CONTROL_GLYPHS.len(), 32);
        assert_eq!(HIGH_GLYPHS.len(), 129);

        // Spot-check known entries of the CP437-derived tables.
        assert_eq!(CONTROL_GLYPHS[0x00], "␀");
        assert_eq!(CONTROL_GLYPHS[0x07], "•");
        assert_eq!(CONTROL_GLYPHS[0x09], "○");
        assert_eq!(CONTROL_GLYPHS[0x1F], "▼");
        assert_eq!(HIGH_GLYPHS[0x7F - 0x7F], "⌂");
        assert_eq!(HIGH_GLYPHS[0x80 - 0x7F], "Ç");
        assert_eq!(HIGH_GLYPHS[0xB0 - 0x7F], "░");
        assert_eq!(HIGH_GLYPHS[0xE1 - 0x7F], "ß");
        assert_eq!(HIGH_GLYPHS[0xF7 - 0x7F], "≈");
        assert_eq!(HIGH_GLYPHS[0xFE - 0x7F], "■");
        // Byte 0xFF maps to a plain ASCII space, not U+00A0.
        assert_eq!(HIGH_GLYPHS[0xFF - 0x7F], " ");

        let mut glyph = String::new();
        push_byte_glyph(0xFF, &mut glyph);
        assert_eq!(glyph, " ");
    }
}
