//! PDF object types.
//!
//! The value model shared by the source reader and the writer. Dictionaries
//! keep their insertion order so the same input always produces the same bytes.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::io::Read;

/// Ordered dictionary (key without the leading `/` -> value).
pub type Dict = IndexMap<String, Object>;

/// PDF object representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Real (floating-point) value
    Real(f64),
    /// Literal string (raw, unescaped bytes)
    String(Vec<u8>),
    /// Hexadecimal string, stored as the hex digits between `<` and `>`
    HexString(Vec<u8>),
    /// Name token (without the leading /)
    Name(String),
    /// Array of objects
    Array(Vec<Object>),
    /// Dictionary (ordered key-value pairs)
    Dictionary(Dict),
    /// Stream (dictionary + data)
    Stream {
        /// Stream dictionary
        dict: Dict,
        /// Raw stream data, still encoded with the filters named in `dict`
        data: bytes::Bytes,
    },
    /// Indirect object reference
    Reference(ObjectRef),
}

/// Reference to an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// Object number
    pub id: u32,
    /// Generation number
    pub gen: u16,
}

impl ObjectRef {
    /// Create a new object reference.
    pub fn new(id: u32, gen: u16) -> Self {
        Self { id, gen }
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen)
    }
}

impl Object {
    /// Get the type name of this object (without data).
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "Null",
            Object::Boolean(_) => "Boolean",
            Object::Integer(_) => "Integer",
            Object::Real(_) => "Real",
            Object::String(_) => "String",
            Object::HexString(_) => "HexString",
            Object::Name(_) => "Name",
            Object::Array(_) => "Array",
            Object::Dictionary(_) => "Dictionary",
            Object::Stream { .. } => "Stream",
            Object::Reference(_) => "Reference",
        }
    }

    /// Build a dictionary object from `(key, value)` pairs, keeping their order.
    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Create a name object.
    pub fn name(s: impl Into<String>) -> Object {
        Object::Name(s.into())
    }

    /// Create a reference object.
    pub fn reference(id: u32, gen: u16) -> Object {
        Object::Reference(ObjectRef::new(id, gen))
    }

    /// Try to cast to integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to cast to real number.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Numeric value of an Integer or Real.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to name.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Object::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Try to cast to dictionary. Works for both Dictionary and Stream objects.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream { dict, .. } => Some(dict),
            _ => None,
        }
    }

    /// Try to cast to array.
    pub fn as_array(&self) -> Option<&Vec<Object>> {
        match self {
            Object::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to cast to reference.
    pub fn as_reference(&self) -> Option<ObjectRef> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Try to cast to boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to cast to string (bytes).
    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    /// Check if object is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    /// Decode stream data using the filters named in the stream dictionary.
    ///
    /// Only unfiltered and `FlateDecode` streams are understood; any other
    /// filter yields [`Error::UnsupportedFilter`].
    pub fn decode_stream_data(&self) -> Result<Vec<u8>> {
        match self {
            Object::Stream { dict, data } => {
                let filters = dict
                    .get("Filter")
                    .map(extract_filter_names)
                    .unwrap_or_default();

                let mut decoded = data.to_vec();
                for filter in &filters {
                    decoded = match filter.as_str() {
                        "FlateDecode" | "Fl" => inflate(&decoded)?,
                        other => return Err(Error::UnsupportedFilter(other.to_string())),
                    };
                }
                Ok(decoded)
            },
            _ => Err(Error::InvalidObjectType {
                expected: "Stream".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }
}

fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Decode(format!("FlateDecode: {}", e)))?;
    Ok(out)
}

/// Extract filter names from a Filter object.
///
/// The Filter entry can be either a single Name or an Array of Names.
fn extract_filter_names(filter_obj: &Object) -> Vec<String> {
    match filter_obj {
        Object::Name(name) => vec![name.clone()],
        Object::Array(arr) => arr
            .iter()
            .filter_map(|obj| obj.as_name().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zlib(data: &[u8]) -> Vec<u8> {
        let mut enc =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_object_integer() {
        let obj = Object::Integer(42);
        assert_eq!(obj.as_integer(), Some(42));
        assert_eq!(obj.as_number(), Some(42.0));
        assert!(obj.as_name().is_none());
        assert!(!obj.is_null());
    }

    #[test]
    fn test_object_name() {
        let obj = Object::name("Type");
        assert_eq!(obj.as_name(), Some("Type"));
        assert!(obj.as_integer().is_none());
    }

    #[test]
    fn test_dictionary_keeps_insertion_order() {
        let obj = Object::dict([
            ("Type", Object::name("Page")),
            ("Annots", Object::Null),
            ("Contents", Object::reference(4, 0)),
        ]);
        let keys: Vec<&str> = obj.as_dict().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Type", "Annots", "Contents"]);
    }

    #[test]
    fn test_object_stream_dict_access() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(100));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"stream data"),
        };

        let d = obj.as_dict().unwrap();
        assert_eq!(d.get("Length").unwrap().as_integer(), Some(100));
    }

    #[test]
    fn test_object_ref_display() {
        assert_eq!(format!("{}", ObjectRef::new(10, 0)), "10 0 R");
    }

    #[test]
    fn test_decode_stream_no_filter() {
        let obj = Object::Stream {
            dict: Dict::new(),
            data: bytes::Bytes::from_static(b"Hello"),
        };
        assert_eq!(obj.decode_stream_data().unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_stream_flate() {
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), Object::name("FlateDecode"));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from(zlib(b"0 0 m 10 10 l S")),
        };
        assert_eq!(obj.decode_stream_data().unwrap(), b"0 0 m 10 10 l S");
    }

    #[test]
    fn test_decode_stream_flate_in_array() {
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), Object::Array(vec![Object::name("FlateDecode")]));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from(zlib(b"BT ET")),
        };
        assert_eq!(obj.decode_stream_data().unwrap(), b"BT ET");
    }

    #[test]
    fn test_decode_stream_unsupported_filter() {
        let mut dict = Dict::new();
        dict.insert("Filter".to_string(), Object::name("DCTDecode"));
        let obj = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"\xFF\xD8"),
        };
        match obj.decode_stream_data() {
            Err(Error::UnsupportedFilter(name)) => assert_eq!(name, "DCTDecode"),
            other => panic!("Expected UnsupportedFilter, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_stream_not_a_stream() {
        let obj = Object::Integer(42);
        match obj.decode_stream_data() {
            Err(Error::InvalidObjectType { expected, found }) => {
                assert_eq!(expected, "Stream");
                assert_eq!(found, "Integer");
            },
            _ => panic!("Expected InvalidObjectType error"),
        }
    }

    #[test]
    fn test_extract_filter_names_invalid() {
        assert!(extract_filter_names(&Object::Integer(42)).is_empty());
    }
}
