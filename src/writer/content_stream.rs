//! PDF content stream builder.
//!
//! Builds the small operator sequences this crate emits into content
//! streams: graphics state save/restore, state resets, transformation
//! matrices and XObject invocation (ISO 32000-1:2008 Section 8).

use super::object_serializer::format_real;
use std::fmt::Write;

/// Operations that can be added to a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// Save graphics state (q)
    SaveState,
    /// Restore graphics state (Q)
    RestoreState,
    /// Set line cap style (J)
    SetLineCap(u8),
    /// Set line width (w)
    SetLineWidth(f64),
    /// Set line join style (j)
    SetLineJoin(u8),
    /// Set stroke color gray (G)
    SetStrokeColorGray(f64),
    /// Set fill color gray (g)
    SetFillColorGray(f64),
    /// Concatenate matrix (cm), written with four decimals
    Transform(f64, f64, f64, f64, f64, f64),
    /// Paint XObject (Do)
    PaintXObject(String),
}

/// Builder for content streams.
#[derive(Debug, Clone, Default)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
}

impl ContentStreamBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Save graphics state.
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// Restore graphics state.
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Reset line cap, width, join and both colors to their defaults.
    pub fn reset_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SetLineCap(0))
            .op(ContentStreamOp::SetLineWidth(1.0))
            .op(ContentStreamOp::SetLineJoin(0))
            .op(ContentStreamOp::SetStrokeColorGray(0.0))
            .op(ContentStreamOp::SetFillColorGray(0.0))
    }

    /// Concatenate a transformation matrix.
    pub fn transform(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> &mut Self {
        self.op(ContentStreamOp::Transform(a, b, c, d, e, f))
    }

    /// Paint a named XObject.
    pub fn paint_xobject(&mut self, name: impl Into<String>) -> &mut Self {
        self.op(ContentStreamOp::PaintXObject(name.into()))
    }

    /// Operations added so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// Render the operations, one per line.
    pub fn build(&self) -> String {
        let mut buf = String::new();
        for (i, op) in self.operations.iter().enumerate() {
            if i > 0 {
                buf.push('\n');
            }
            write_op(&mut buf, op);
        }
        buf
    }
}

fn write_op(buf: &mut String, op: &ContentStreamOp) {
    // Writing into a String cannot fail.
    let _ = match op {
        ContentStreamOp::SaveState => write!(buf, "q"),
        ContentStreamOp::RestoreState => write!(buf, "Q"),
        ContentStreamOp::SetLineCap(cap) => write!(buf, "{} J", cap),
        ContentStreamOp::SetLineWidth(w) => write!(buf, "{} w", format_real(*w)),
        ContentStreamOp::SetLineJoin(join) => write!(buf, "{} j", join),
        ContentStreamOp::SetStrokeColorGray(g) => write!(buf, "{} G", format_real(*g)),
        ContentStreamOp::SetFillColorGray(g) => write!(buf, "{} g", format_real(*g)),
        ContentStreamOp::Transform(a, b, c, d, e, f) => write!(
            buf,
            "{:.4} {} {} {:.4} {:.4} {:.4} cm",
            a,
            format_real(*b),
            format_real(*c),
            d,
            e,
            f
        ),
        ContentStreamOp::PaintXObject(name) => write!(buf, "/{} Do", name),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_state() {
        let mut b = ContentStreamBuilder::new();
        b.save_state().reset_state();
        assert_eq!(b.build(), "q\n0 J\n1 w\n0 j\n0 G\n0 g");
    }

    #[test]
    fn test_transform_and_paint() {
        let mut b = ContentStreamBuilder::new();
        b.save_state()
            .transform(0.5, 0.0, 0.0, 0.5, 10.0, -20.25)
            .paint_xobject("TPL1")
            .restore_state();
        assert_eq!(b.build(), "q\n0.5000 0 0 0.5000 10.0000 -20.2500 cm\n/TPL1 Do\nQ");
        assert_eq!(b.operations().len(), 4);
    }

    #[test]
    fn test_empty_builder() {
        assert_eq!(ContentStreamBuilder::new().build(), "");
    }
}
