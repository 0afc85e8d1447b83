//! PDF object serialization.
//!
//! Renders [`Object`] values straight into an [`OffsetWriter`]. Imported
//! values carry references into their source document; those are renumbered
//! through the [`ObjectResolver`] while the value is being written, so the
//! output only ever contains output object numbers.

use super::output::OffsetWriter;
use super::resolver::ObjectResolver;
use crate::error::Result;
use crate::object::{Dict, Object};
use crate::reader::SourceId;
use std::io::Write;

/// How references met during serialization are written.
pub(crate) enum References<'a> {
    /// Already output object numbers; write them unchanged.
    Verbatim,
    /// References into `source`; renumber them through `resolver`.
    Import {
        resolver: &'a mut ObjectResolver,
        source: SourceId,
    },
}

/// Serializer for PDF objects.
///
/// Scalars are followed by a single space, arrays end with `]` and a line
/// break, dictionaries are written in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ObjectSerializer;

impl ObjectSerializer {
    /// Create a new object serializer.
    pub fn new() -> Self {
        Self
    }

    /// Serialize an object to bytes, writing references unchanged.
    pub fn serialize(&self, obj: &Object) -> Result<Vec<u8>> {
        let mut out = OffsetWriter::new(Vec::new());
        self.write_object(&mut out, &mut References::Verbatim, obj)?;
        out.into_inner()
    }

    /// Serialize an object to a string (for debugging).
    pub fn serialize_to_string(&self, obj: &Object) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.serialize(obj)?).to_string())
    }

    /// Write an object.
    pub(crate) fn write_object<W: Write>(
        &self,
        out: &mut OffsetWriter<W>,
        refs: &mut References<'_>,
        obj: &Object,
    ) -> Result<()> {
        match obj {
            Object::Null => out.straight_out("null "),
            Object::Boolean(b) => out.straight_out(if *b { "true " } else { "false " }),
            Object::Integer(i) => out.straight_out(format!("{} ", i)),
            Object::Real(r) => out.straight_out(format!("{} ", format_real(*r))),
            Object::String(s) => {
                out.straight_out("(")?;
                out.straight_out(escape_string(s))?;
                out.straight_out(")")
            },
            Object::HexString(s) => {
                out.straight_out("<")?;
                out.straight_out(s)?;
                out.straight_out(">")
            },
            Object::Name(n) => {
                out.straight_out(name_bytes(n))?;
                out.straight_out(" ")
            },
            Object::Array(arr) => {
                out.straight_out("[")?;
                for item in arr {
                    self.write_object(out, refs, item)?;
                }
                out.out("]")
            },
            Object::Dictionary(dict) => self.write_dictionary(out, refs, dict, None),
            Object::Stream { dict, data } => {
                let length = (!dict.contains_key("Length")).then_some(data.len());
                self.write_dictionary(out, refs, dict, length)?;
                out.straight_out("\nstream\n")?;
                out.straight_out(data)?;
                out.straight_out("\nendstream")
            },
            Object::Reference(r) => {
                let id = match refs {
                    References::Verbatim => r.id,
                    References::Import { resolver, source } => resolver.reserve(out, *source, *r)?,
                };
                out.straight_out(format!("{} 0 R ", id))
            },
        }
    }

    /// Write a dictionary, optionally appending a `/Length` entry.
    fn write_dictionary<W: Write>(
        &self,
        out: &mut OffsetWriter<W>,
        refs: &mut References<'_>,
        dict: &Dict,
        length: Option<usize>,
    ) -> Result<()> {
        out.straight_out("<<")?;
        for (key, value) in dict {
            out.straight_out(name_bytes(key))?;
            out.straight_out(" ")?;
            self.write_object(out, refs, value)?;
        }
        if let Some(length) = length {
            out.straight_out(format!("/Length {} ", length))?;
        }
        out.straight_out(">>")
    }
}

/// Format a real number in fixed notation with up to six decimals.
pub(crate) fn format_real(value: f64) -> String {
    if !value.is_finite() {
        log::warn!("Non-finite real {} written as 0", value);
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let formatted = format!("{:.6}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Escape the body of a literal string.
fn escape_string(data: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            b'(' => escaped.extend_from_slice(b"\\("),
            b')' => escaped.extend_from_slice(b"\\)"),
            b'\\' => escaped.extend_from_slice(b"\\\\"),
            b'\n' => escaped.extend_from_slice(b"\\n"),
            b'\r' => escaped.extend_from_slice(b"\\r"),
            b'\t' => escaped.extend_from_slice(b"\\t"),
            _ => escaped.push(byte),
        }
    }
    escaped
}

/// A PDF name: leading `/`, special characters escaped as `#xx`.
fn name_bytes(name: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(name.len() + 1);
    bytes.push(b'/');
    for byte in name.bytes() {
        match byte {
            b'!'
            | b'"'
            | b'$'
            | b'&'
            | b'\''
            | b'*'..=b'.'
            | b'0'..=b'9'
            | b';'
            | b'?'
            | b'@'
            | b'A'..=b'Z'
            | b'^'..=b'z'
            | b'|'
            | b'~' => bytes.push(byte),
            _ => bytes.extend_from_slice(format!("#{:02X}", byte).as_bytes()),
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectRef;

    fn render(obj: &Object) -> String {
        ObjectSerializer::new().serialize_to_string(obj).unwrap()
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(render(&Object::Null), "null ");
        assert_eq!(render(&Object::Boolean(true)), "true ");
        assert_eq!(render(&Object::Boolean(false)), "false ");
        assert_eq!(render(&Object::Integer(-123)), "-123 ");
        assert_eq!(render(&Object::name("Type")), "/Type ");
    }

    #[test]
    fn test_serialize_real() {
        assert_eq!(render(&Object::Real(3.14258)), "3.14258 ");
        assert_eq!(render(&Object::Real(1.0)), "1 ");
        assert_eq!(render(&Object::Real(0.5)), "0.5 ");
        assert_eq!(render(&Object::Real(-0.0000001)), "0 ");
    }

    #[test]
    fn test_serialize_string_escapes_delimiters() {
        assert_eq!(render(&Object::String(b"Hello".to_vec())), "(Hello)");
        assert_eq!(
            render(&Object::String(b"a (b) c\\d".to_vec())),
            "(a \\(b\\) c\\\\d)"
        );
    }

    #[test]
    fn test_serialize_hex_string() {
        assert_eq!(render(&Object::HexString(b"00FF80".to_vec())), "<00FF80>");
    }

    #[test]
    fn test_serialize_name_with_special_chars() {
        assert_eq!(render(&Object::name("Name With Space")), "/Name#20With#20Space ");
        assert_eq!(render(&Object::name("A/B")), "/A#2FB ");
    }

    #[test]
    fn test_serialize_array() {
        let arr = Object::Array(vec![Object::Integer(1), Object::Boolean(true), Object::Null]);
        assert_eq!(render(&arr), "[1 true null ]\n");
    }

    #[test]
    fn test_serialize_dictionary_in_order() {
        let dict = Object::dict([
            ("Type", Object::name("Page")),
            ("Count", Object::Integer(1)),
            ("Kids", Object::Array(vec![Object::reference(3, 0)])),
        ]);
        assert_eq!(render(&dict), "<</Type /Page /Count 1 /Kids [3 0 R ]\n>>");
    }

    #[test]
    fn test_serialize_stream_adds_length() {
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), Object::name("FlateDecode"));
        let stream = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"stream data"),
        };
        assert_eq!(
            render(&stream),
            "<</Filter /FlateDecode /Length 11 >>\nstream\nstream data\nendstream"
        );
    }

    #[test]
    fn test_serialize_stream_keeps_length() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(3));
        let stream = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"abc"),
        };
        assert_eq!(render(&stream), "<</Length 3 >>\nstream\nabc\nendstream");
    }

    #[test]
    fn test_verbatim_reference() {
        assert_eq!(render(&Object::Reference(ObjectRef::new(10, 0))), "10 0 R ");
    }

    #[test]
    fn test_import_reference_is_renumbered() {
        let serializer = ObjectSerializer::new();
        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        out.begin_object(None, true).unwrap();

        let value = Object::Array(vec![Object::reference(40, 0), Object::reference(40, 0)]);
        let mut refs = References::Import {
            resolver: &mut resolver,
            source: SourceId(0),
        };
        serializer.write_object(&mut out, &mut refs, &value).unwrap();

        let text = String::from_utf8(out.into_inner().unwrap()).unwrap();
        assert!(text.ends_with("[2 0 R 2 0 R ]\n"));
        assert_eq!(resolver.pending_len(), 1);
    }
}
