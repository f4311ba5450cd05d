//! JSON-LD inspection.
//!
//! Blocks are parsed one at a time into a generic [`Value`]. Anything that
//! fails to parse, or is not an object, is not a candidate and is skipped
//! without being reported.

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use serde_json::Value;
use std::io;
use tracing::debug;

pub const TYPE_FIELD: &str = "@type";

/// Parse one script body, returning the object if it declares `schema_type`.
pub fn match_block(raw: &str, schema_type: &str) -> Option<Value> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!("Skipping JSON-LD block that failed to parse: {}", e);
            return None;
        }
    };
    let declared = value.as_object()?.get(TYPE_FIELD)?.as_str()?;
    (declared == schema_type).then_some(value)
}

/// First block, in document order, whose `@type` equals `schema_type`.
pub fn find_by_type<I, S>(blocks: I, schema_type: &str) -> Option<Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    blocks
        .into_iter()
        .find_map(|raw| match_block(raw.as_ref(), schema_type))
}

/// Two-space indented rendering with keys in their original order and every
/// non-ASCII character written as a `\uXXXX` escape.
pub fn pretty(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiPretty::new());
    // Serializing a `Value` into memory cannot fail.
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    // Only ASCII is ever written.
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

/// Pretty formatter that keeps output ASCII, escaping characters outside it
/// as UTF-16 code units (surrogate pairs above the BMP).
struct AsciiPretty<'a>(PrettyFormatter<'a>);

impl AsciiPretty<'_> {
    fn new() -> Self {
        AsciiPretty(PrettyFormatter::with_indent(b"  "))
    }
}

impl Formatter for AsciiPretty<'_> {
    fn write_string_fragment<W: ?Sized + io::Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
