//! Template placement.
//!
//! Produces the content stream fragment that draws a template at a given
//! position and size on a destination page. The fragment is returned to the
//! caller, who embeds it in the page's own content stream.
//!
//! Positions use a top-left origin: `y` grows downwards from the top edge of
//! the destination page, which is why the page height is needed.

use super::content_stream::ContentStreamBuilder;
use crate::template::Template;

/// Width and height of a placed template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateSize {
    /// Width in user-space units
    pub width: f64,
    /// Height in user-space units
    pub height: f64,
}

/// Where and how large to draw a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Distance from the left edge of the page
    pub x: f64,
    /// Distance from the top edge of the page
    pub y: f64,
    /// Target width, 0 to derive it
    pub width: f64,
    /// Target height, 0 to derive it
    pub height: f64,
    /// Height of the destination page
    pub page_height: f64,
    /// Output scale factor applied to the translation
    pub scale: f64,
}

impl Placement {
    /// Placement at `(x, y)` with the given target size on a page `page_height` tall.
    pub fn new(x: f64, y: f64, width: f64, height: f64, page_height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            page_height,
            scale: 1.0,
        }
    }

    /// Set the output scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Size a template is drawn at for a requested `width` x `height`.
///
/// Zero for both means the template's own size; zero for one of them derives
/// it from the other, keeping the aspect ratio.
pub fn compute_size(tpl: &Template, width: f64, height: f64) -> TemplateSize {
    let (w, h) = (tpl.width(), tpl.height());
    let (mut width, mut height) = (width, height);

    if width == 0.0 && height == 0.0 {
        width = w;
        height = h;
    }
    if width == 0.0 && h != 0.0 {
        width = height * w / h;
    }
    if height == 0.0 && w != 0.0 {
        height = width * h / w;
    }

    TemplateSize { width, height }
}

/// Content stream fragment drawing `tpl` according to `placement`.
pub fn place(tpl: &Template, placement: &Placement) -> String {
    let size = compute_size(tpl, placement.width, placement.height);
    let (offset_x, offset_y) = tpl.offset();

    let scale_x = ratio(size.width, tpl.width());
    let scale_y = ratio(size.height, tpl.height());
    let tx = placement.x + offset_x;
    let ty = placement.page_height - (placement.y + offset_y) - size.height;

    let mut content = ContentStreamBuilder::new();
    content
        .save_state()
        .reset_state()
        .save_state()
        .transform(
            scale_x,
            0.0,
            0.0,
            scale_y,
            tx * placement.scale,
            ty * placement.scale,
        )
        .paint_xobject(tpl.name())
        .restore_state()
        .restore_state();
    content.build()
}

fn ratio(target: f64, native: f64) -> f64 {
    if native == 0.0 {
        log::warn!("Template has zero extent; drawing it unscaled");
        1.0
    } else {
        target / native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Dict, Object, ObjectRef};
    use crate::reader::{MemoryReader, SourceId};
    use crate::template::{BoxName, TemplateId};

    fn template(w: i64, h: i64, rotate: i64) -> Template {
        let mut reader = MemoryReader::new();
        reader
            .insert(
                ObjectRef::new(1, 0),
                Object::dict([
                    (
                        "MediaBox",
                        Object::Array(vec![
                            Object::Integer(0),
                            Object::Integer(0),
                            Object::Integer(w),
                            Object::Integer(h),
                        ]),
                    ),
                    ("Resources", Object::Dictionary(Dict::new())),
                    ("Rotate", Object::Integer(rotate)),
                ]),
            )
            .push_page(ObjectRef::new(1, 0));
        Template::import(&reader, SourceId(0), TemplateId(0), 1, BoxName::MediaBox).unwrap()
    }

    #[test]
    fn test_compute_size_native() {
        let tpl = template(100, 200, 0);
        assert_eq!(
            compute_size(&tpl, 0.0, 0.0),
            TemplateSize {
                width: 100.0,
                height: 200.0
            }
        );
    }

    #[test]
    fn test_compute_size_derives_height() {
        let tpl = template(100, 200, 0);
        assert_eq!(compute_size(&tpl, 50.0, 0.0).height, 100.0);
    }

    #[test]
    fn test_compute_size_derives_width() {
        let tpl = template(100, 200, 0);
        assert_eq!(compute_size(&tpl, 0.0, 50.0).width, 25.0);
    }

    #[test]
    fn test_compute_size_explicit() {
        let tpl = template(100, 200, 0);
        let size = compute_size(&tpl, 30.0, 40.0);
        assert_eq!((size.width, size.height), (30.0, 40.0));
    }

    #[test]
    fn test_compute_size_uses_rotated_dimensions() {
        let tpl = template(100, 200, 90);
        assert_eq!(compute_size(&tpl, 100.0, 0.0).height, 50.0);
    }

    #[test]
    fn test_place_native_size() {
        let tpl = template(100, 200, 0);
        let code = place(&tpl, &Placement::new(0.0, 0.0, 0.0, 0.0, 792.0));
        assert_eq!(
            code,
            "q\n0 J\n1 w\n0 j\n0 G\n0 g\nq\n1.0000 0 0 1.0000 0.0000 592.0000 cm\n/TPL1 Do\nQ\nQ"
        );
    }

    #[test]
    fn test_place_scaled() {
        let tpl = template(100, 200, 0);
        let code = place(&tpl, &Placement::new(10.0, 20.0, 50.0, 0.0, 500.0).with_scale(2.0));
        // 50x100 at (10, 20): ty = 500 - 20 - 100 = 380, doubled by scale
        assert!(code.contains("0.5000 0 0 0.5000 20.0000 760.0000 cm"));
    }
}
