//! Source document access.
//!
//! The writer never parses PDF bytes itself. Everything it needs from the
//! document a page is imported from goes through [`SourceReader`]: page boxes,
//! resources, decoded content, rotation, and dereferencing of indirect
//! references found while copying resources.
//!
//! [`MemoryReader`] implements the trait over an in-memory object table. It is
//! what the tests use and is convenient when the source objects come from
//! another PDF library.

use crate::error::{Error, Result};
use crate::geometry::PageBox;
use crate::object::{Dict, Object, ObjectRef};
use crate::template::BoxName;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Page boxes of one page, keyed by box name.
pub type PageBoxes = IndexMap<BoxName, PageBox>;

/// Maximum number of `/Parent` hops or reference hops followed.
const MAX_DEPTH: u32 = 64;

/// Read access to a source document.
///
/// Page numbers are 1-based.
pub trait SourceReader {
    /// All boxes defined for `page`, with coordinates divided by `scale`.
    fn page_boxes(&self, page: u32, scale: f64) -> Result<PageBoxes>;

    /// The page's resource dictionary (inherited if necessary).
    fn page_resources(&self, page: u32) -> Result<Object>;

    /// The page's decoded content stream. Multiple content streams are concatenated.
    fn page_content(&self, page: u32) -> Result<Vec<u8>>;

    /// The page's `/Rotate` value in degrees (0 when absent).
    fn page_rotation(&self, page: u32) -> Result<i32>;

    /// Dereference an indirect reference to its full value.
    ///
    /// Streams are returned with their raw (still encoded) data.
    fn resolve(&self, reference: ObjectRef) -> Result<Object>;
}

/// Handle of a source document registered with a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub(crate) usize);

impl SourceId {
    /// Position of the source in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// In-memory [`SourceReader`] over an object table and a list of page objects.
///
/// # Example
///
/// ```
/// use pdf_import::object::{Dict, Object, ObjectRef};
/// use pdf_import::reader::{MemoryReader, SourceReader};
///
/// let mut reader = MemoryReader::new();
/// reader.insert(
///     ObjectRef::new(3, 0),
///     Object::dict([
///         ("Type", Object::name("Page")),
///         (
///             "MediaBox",
///             Object::Array(vec![
///                 Object::Integer(0),
///                 Object::Integer(0),
///                 Object::Integer(612),
///                 Object::Integer(792),
///             ]),
///         ),
///         ("Resources", Object::Dictionary(Dict::new())),
///     ]),
/// );
/// reader.push_page(ObjectRef::new(3, 0));
///
/// assert_eq!(reader.page_rotation(1)?, 0);
/// # Ok::<(), pdf_import::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    objects: HashMap<ObjectRef, Object>,
    pages: Vec<ObjectRef>,
}

impl MemoryReader {
    /// Create an empty reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an indirect object.
    pub fn insert(&mut self, reference: ObjectRef, object: Object) -> &mut Self {
        self.objects.insert(reference, object);
        self
    }

    /// Append a page object (which must be inserted as well) to the page list.
    pub fn push_page(&mut self, reference: ObjectRef) -> &mut Self {
        self.pages.push(reference);
        self
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Number of indirect objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn page_dict(&self, page: u32) -> Result<Dict> {
        let reference = page
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or(Error::PageNotFound(page))?;
        match self.resolve(*reference)? {
            Object::Dictionary(dict) => Ok(dict),
            other => Err(Error::InvalidObjectType {
                expected: "Dictionary".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    /// Look up `key` on the page, walking up `/Parent` when `inheritable` is set.
    fn page_attribute(&self, page: u32, key: &str, inheritable: bool) -> Result<Option<Object>> {
        let mut dict = self.page_dict(page)?;
        for _ in 0..MAX_DEPTH {
            if let Some(value) = dict.get(key) {
                return self.deref(value).map(Some);
            }
            if !inheritable {
                return Ok(None);
            }
            dict = match dict.get("Parent") {
                Some(parent) => match self.deref(parent)? {
                    Object::Dictionary(d) => d,
                    _ => return Ok(None),
                },
                None => return Ok(None),
            };
        }
        Err(Error::RecursionLimitExceeded(MAX_DEPTH))
    }

    fn deref(&self, obj: &Object) -> Result<Object> {
        match obj {
            Object::Reference(r) => self.resolve(*r),
            other => Ok(other.clone()),
        }
    }

    fn decode_content(&self, obj: &Object) -> Result<Vec<u8>> {
        match self.deref(obj)? {
            stream @ Object::Stream { .. } => stream.decode_stream_data(),
            Object::Array(parts) => {
                let mut combined = Vec::new();
                for part in &parts {
                    let decoded = self.deref(part)?.decode_stream_data()?;
                    combined.extend_from_slice(&decoded);
                    combined.push(b'\n');
                }
                Ok(combined)
            },
            Object::Null => Ok(Vec::new()),
            other => Err(Error::InvalidObjectType {
                expected: "Stream".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl SourceReader for MemoryReader {
    fn page_boxes(&self, page: u32, scale: f64) -> Result<PageBoxes> {
        let mut boxes = PageBoxes::new();
        for name in BoxName::ALL {
            let inheritable = matches!(name, BoxName::MediaBox | BoxName::CropBox);
            let Some(value) = self.page_attribute(page, name.as_str(), inheritable)? else {
                continue;
            };
            let Some(arr) = value.as_array() else {
                log::warn!("Page {} has a non-array /{}; ignoring it", page, name);
                continue;
            };
            let coords = arr
                .iter()
                .map(|o| self.deref(o))
                .collect::<Result<Vec<_>>>()?;
            match PageBox::from_array(&coords, scale) {
                Some(b) => {
                    boxes.insert(name, b);
                },
                None => log::warn!("Page {} has a malformed /{}; ignoring it", page, name),
            }
        }
        Ok(boxes)
    }

    fn page_resources(&self, page: u32) -> Result<Object> {
        match self.page_attribute(page, "Resources", true)? {
            Some(Object::Null) | None => Err(Error::ResourcesMissing { page }),
            Some(resources) => Ok(resources),
        }
    }

    fn page_content(&self, page: u32) -> Result<Vec<u8>> {
        match self.page_attribute(page, "Contents", false)? {
            Some(contents) => self.decode_content(&contents),
            None => Ok(Vec::new()),
        }
    }

    fn page_rotation(&self, page: u32) -> Result<i32> {
        Ok(self
            .page_attribute(page, "Rotate", true)?
            .and_then(|o| o.as_integer())
            .unwrap_or(0) as i32)
    }

    fn resolve(&self, reference: ObjectRef) -> Result<Object> {
        let mut current = reference;
        let mut visited = HashSet::new();
        for _ in 0..MAX_DEPTH {
            if !visited.insert(current) {
                return Err(Error::CircularReference(current));
            }
            match self.objects.get(&current) {
                Some(Object::Reference(next)) => current = *next,
                Some(obj) => return Ok(obj.clone()),
                None => return Err(Error::ObjectNotFound(current.id, current.gen)),
            }
        }
        Err(Error::RecursionLimitExceeded(MAX_DEPTH))
    }
}
