//! Imported page templates.
//!
//! A [`Template`] is one page of a source document captured as a reusable
//! drawing unit: the selected page box, the page resources, the decoded
//! content stream and the page rotation. The writer turns each template into
//! a Form XObject when the document is finished.

use crate::error::{Error, Result};
use crate::geometry::PageBox;
use crate::object::Object;
use crate::reader::{PageBoxes, SourceId, SourceReader};
use std::fmt;
use std::str::FromStr;

/// Page boxes a template can be cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxName {
    /// Full extent of the physical medium
    MediaBox,
    /// Visible region when displayed or printed
    CropBox,
    /// Clipping region for production output
    BleedBox,
    /// Intended dimensions of the finished page
    TrimBox,
    /// Extent of meaningful content
    ArtBox,
}

impl BoxName {
    /// All box names, in the order readers report them.
    pub const ALL: [BoxName; 5] = [
        BoxName::MediaBox,
        BoxName::CropBox,
        BoxName::BleedBox,
        BoxName::TrimBox,
        BoxName::ArtBox,
    ];

    /// Dictionary key for this box (without the leading /).
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxName::MediaBox => "MediaBox",
            BoxName::CropBox => "CropBox",
            BoxName::BleedBox => "BleedBox",
            BoxName::TrimBox => "TrimBox",
            BoxName::ArtBox => "ArtBox",
        }
    }

    /// Box to try when this one is not defined on a page.
    pub fn fallback(&self) -> Option<BoxName> {
        match self {
            BoxName::BleedBox | BoxName::TrimBox | BoxName::ArtBox => Some(BoxName::CropBox),
            BoxName::CropBox => Some(BoxName::MediaBox),
            BoxName::MediaBox => None,
        }
    }
}

impl fmt::Display for BoxName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoxName {
    type Err = Error;

    /// Accepts the name with or without its leading `/`.
    fn from_str(s: &str) -> Result<Self> {
        let bare = s.strip_prefix('/').unwrap_or(s);
        BoxName::ALL
            .into_iter()
            .find(|b| b.as_str() == bare)
            .ok_or_else(|| Error::InvalidBoxName(s.to_string()))
    }
}

/// Handle of a template inside a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub(crate) usize);

impl TemplateId {
    /// Resource name the Form XObject is registered under (`TPL1`, `TPL2`, ...).
    pub fn name(&self) -> String {
        format!("TPL{}", self.0 + 1)
    }

    /// Position of the template in import order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Rotation as stored on a template, and whether width and height swap.
///
/// The angle is reduced modulo 360; a non-zero result is brought into
/// `0..360` and negated. Width and height swap for odd quarter turns.
///
/// # Examples
///
/// ```
/// use pdf_import::template::normalize_rotation;
///
/// assert_eq!(normalize_rotation(90), (-90, true));
/// assert_eq!(normalize_rotation(-90), (-270, true));
/// assert_eq!(normalize_rotation(180), (-180, false));
/// assert_eq!(normalize_rotation(360), (0, false));
/// ```
pub fn normalize_rotation(rotation: i32) -> (i32, bool) {
    let mut angle = rotation % 360;
    if angle == 0 {
        return (0, false);
    }
    let steps = angle / 90;
    let swap = steps % 2 != 0;
    if angle < 0 {
        angle += 360;
    }
    (-angle, swap)
}

/// One imported page.
#[derive(Debug, Clone)]
pub struct Template {
    id: TemplateId,
    source: SourceId,
    page: u32,
    resources: Object,
    content: Vec<u8>,
    page_box: PageBox,
    boxes: PageBoxes,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: i32,
    object_id: Option<u32>,
}

impl Template {
    /// Build a template from `page` of `reader`, cut to `box_name`.
    ///
    /// Missing boxes fall back along `BleedBox|TrimBox|ArtBox -> CropBox -> MediaBox`.
    pub(crate) fn import(
        reader: &dyn SourceReader,
        source: SourceId,
        id: TemplateId,
        page: u32,
        box_name: BoxName,
    ) -> Result<Self> {
        let boxes = reader.page_boxes(page, 1.0)?;

        let mut selected = box_name;
        while !boxes.contains_key(&selected) {
            match selected.fallback() {
                Some(next) => {
                    log::debug!("Page {} has no /{}, trying /{}", page, selected, next);
                    selected = next;
                },
                None => {
                    return Err(Error::BoxNotFound {
                        page,
                        requested: box_name.to_string(),
                    })
                },
            }
        }
        if selected != box_name {
            log::warn!("Page {}: /{} missing, using /{}", page, box_name, selected);
        }
        let page_box = boxes[&selected];

        let resources = match reader.page_resources(page)? {
            Object::Null => return Err(Error::ResourcesMissing { page }),
            resources => resources,
        };
        let content = reader.page_content(page)?;

        let (rotation, swap) = normalize_rotation(reader.page_rotation(page)?);
        let (width, height) = if swap {
            (page_box.h, page_box.w)
        } else {
            (page_box.w, page_box.h)
        };

        log::debug!(
            "Imported page {} as {} ({}x{}, rotation {})",
            page,
            id.name(),
            width,
            height,
            rotation
        );

        Ok(Self {
            id,
            source,
            page,
            resources,
            content,
            page_box,
            boxes,
            x: 0.0,
            y: 0.0,
            width,
            height,
            rotation,
            object_id: None,
        })
    }

    /// Handle of this template.
    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// Resource name used to invoke the template (`TPL1`, ...).
    pub fn name(&self) -> String {
        self.id.name()
    }

    /// Source document the page came from.
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// 1-based page number in the source document.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page resources as read from the source.
    pub fn resources(&self) -> &Object {
        &self.resources
    }

    /// Decoded page content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The box the template was cut to (after fallback).
    pub fn page_box(&self) -> &PageBox {
        &self.page_box
    }

    /// Every box the source page defines.
    pub fn boxes(&self) -> &PageBoxes {
        &self.boxes
    }

    /// Placement offset `(x, y)`.
    pub fn offset(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Effective width (after rotation).
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Effective height (after rotation).
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Stored rotation in degrees: 0 or the negated angle in `0..360`.
    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    /// Object number of the emitted Form XObject, once written.
    pub fn object_id(&self) -> Option<u32> {
        self.object_id
    }

    pub(crate) fn assign_object_id(&mut self, id: u32) {
        debug_assert!(self.object_id.is_none(), "{} emitted twice", self.name());
        self.object_id = Some(id);
    }
}
