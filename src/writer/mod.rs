//! PDF writing module.
//!
//! Turns imported pages into Form XObjects and assembles the output file.
//!
//! ## Architecture
//!
//! ```text
//! SourceReader (page boxes, resources, content, rotation)
//!     ↓
//! [Template] (one imported page)
//!     ↓
//! [PdfWriter::finish]
//!     ├─ form_xobject  (one Form XObject per template)
//!     │     └─ ObjectSerializer ⇄ ObjectResolver (renumber + copy referenced objects)
//!     ├─ pages, catalog, info
//!     └─ xref + trailer
//!     ↓
//! [OffsetWriter] (byte offsets per object)
//!     ↓
//! PDF bytes
//! ```
//!
//! Placement ([`place`], [`PageBuilder::use_template`]) is independent of
//! emission: it only needs a template's geometry and its resource name.

mod content_stream;
mod form_xobject;
mod object_serializer;
mod output;
mod pdf_writer;
mod placement;
mod resolver;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
pub use form_xobject::form_matrix;
pub use object_serializer::ObjectSerializer;
pub use output::OffsetWriter;
pub use pdf_writer::{PageBuilder, PdfWriter, PdfWriterConfig};
pub use placement::{compute_size, place, Placement, TemplateSize};
pub use resolver::ObjectResolver;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        // Verify key types are exported
        let _serializer = ObjectSerializer::new();
        let _builder = ContentStreamBuilder::new();
        let _resolver = ObjectResolver::new();
        let _config = PdfWriterConfig::default();
    }
}
