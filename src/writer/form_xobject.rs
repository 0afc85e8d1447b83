//! Form XObject emission.
//!
//! Each imported template becomes one Form XObject: its bounding box comes
//! from the selected page box, a `/Matrix` undoes the page rotation and moves
//! the box origin to (0, 0), the page resources are copied along with every
//! object they reach, and the page content becomes the form's stream.

use super::object_serializer::{ObjectSerializer, References};
use super::output::OffsetWriter;
use super::resolver::ObjectResolver;
use crate::error::{Error, Result};
use crate::reader::SourceReader;
use crate::template::Template;
use std::io::Write;

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Rounds float noise from trigonometry (and negative zero) to 0.
fn snap(v: f64) -> f64 {
    if v.abs() < 1e-10 {
        0.0
    } else {
        v
    }
}

/// `/Matrix` entry for a template, or `None` when it would be the identity.
///
/// The translation moves the box's lower-left corner to the origin. For
/// quarter-turn rotations the corner that ends up at the origin changes, so
/// the translation is taken from the box's other corners instead.
pub fn form_matrix(tpl: &Template, scale: f64) -> Option<[f64; 6]> {
    let b = tpl.page_box();
    let (mut c, mut s) = (1.0, 0.0);
    let (mut tx, mut ty) = (-b.llx, -b.lly);

    if tpl.rotation() != 0 {
        let angle = f64::from(tpl.rotation()).to_radians();
        c = snap(angle.cos());
        s = snap(angle.sin());

        match tpl.rotation() {
            -90 => (tx, ty) = (-b.lly, b.urx),
            -180 => (tx, ty) = (b.urx, b.ury),
            -270 => (tx, ty) = (b.ury, -b.llx),
            _ => {},
        }
    }

    let tx = snap(tx * scale);
    let ty = snap(ty * scale);

    if c == 1.0 && s == 0.0 && tx == 0.0 && ty == 0.0 {
        None
    } else {
        Some([c, s, snap(-s), c, tx, ty])
    }
}

/// Write `tpl` as a Form XObject followed by every object its resources
/// reach. Returns the form's object number.
pub(crate) fn put_form_xobject<W: Write>(
    out: &mut OffsetWriter<W>,
    resolver: &mut ObjectResolver,
    sources: &[Box<dyn SourceReader>],
    serializer: &ObjectSerializer,
    tpl: &mut Template,
    compress: bool,
    scale: f64,
) -> Result<u32> {
    let (data, compressed) = if compress {
        match compress_data(tpl.content()) {
            Ok(data) => (data, true),
            Err(e) => {
                log::warn!(
                    "{}; writing {} uncompressed",
                    Error::UnsupportedFilter(format!("FlateDecode ({})", e)),
                    tpl.name()
                );
                (tpl.content().to_vec(), false)
            },
        }
    } else {
        (tpl.content().to_vec(), false)
    };

    let id = out.begin_object(None, true)?;
    tpl.assign_object_id(id);
    let unit_counter = out.current_id();

    let filter = if compressed { "/Filter /FlateDecode " } else { "" };
    out.out(format!("<<{}/Type /XObject", filter))?;
    out.out("/Subtype /Form")?;
    out.out("/FormType 1")?;

    let b = *tpl.page_box();
    let (x, y) = tpl.offset();
    out.out(format!(
        "/BBox [{:.2} {:.2} {:.2} {:.2}]",
        b.llx * scale,
        b.lly * scale,
        (b.urx + x) * scale,
        (b.ury - y) * scale
    ))?;

    if let Some([a, b, c, d, e, f]) = form_matrix(tpl, scale) {
        out.out(format!(
            "/Matrix [{:.5} {:.5} {:.5} {:.5} {:.5} {:.5}]",
            a, b, c, d, e, f
        ))?;
    }

    // Serializing the resources reserves numbers for everything they point
    // at; the form's own body is written with the counter back at its number.
    out.straight_out("/Resources ")?;
    let mut refs = References::Import {
        resolver: &mut *resolver,
        source: tpl.source(),
    };
    serializer.write_object(out, &mut refs, tpl.resources())?;
    let reserved_high = out.current_id();
    out.set_current_id(unit_counter);

    out.straight_out("\n")?;
    out.out(format!("/Length {} >>", data.len()))?;
    out.out("stream")?;
    out.straight_out(&data)?;
    out.straight_out("\n")?;
    out.out("endstream")?;
    out.end_object()?;

    out.set_current_id(reserved_high.max(out.current_id()));

    let copied = resolver.drain(out, sources, serializer)?;
    log::debug!(
        "Wrote {} as object {} ({} bytes of content, {} objects copied)",
        tpl.name(),
        id,
        data.len(),
        copied
    );
    Ok(id)
}
