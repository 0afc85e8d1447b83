// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::wrong_self_convention)]
#![allow(clippy::should_implement_trait)]

//! # PDF Import
//!
//! Import pages of existing PDF documents as reusable Form XObjects and draw
//! them on the pages of a new document.
//!
//! ## Core Features
//!
//! - **Page import**: any page box (`MediaBox`, `CropBox`, `BleedBox`,
//!   `TrimBox`, `ArtBox`) with fallback to the enclosing box when absent
//! - **Rotation**: `/Rotate` is undone by the form matrix, so templates are
//!   drawn upright with swapped dimensions for quarter turns
//! - **Object graph copy**: every object reachable from a page's resources is
//!   renumbered and written exactly once, cycles included
//! - **Multiple sources**: pages from several documents in one output, with no
//!   numbering collisions
//! - **Placement**: templates drawn at any position and size, aspect ratio
//!   derived when one dimension is omitted
//! - **Deterministic output**: dictionaries keep their key order and objects
//!   are emitted in discovery order
//!
//! ## Architecture
//! - **Pluggable sources**: pages are read through the [`reader::SourceReader`]
//!   trait; [`reader::MemoryReader`] serves an in-memory object table
//! - **Streaming writer**: output is append-only; object numbers needed before
//!   an object is written are reserved and committed later, never patched
//!
//! ## Quick Start
//!
//! ```
//! use pdf_import::object::{Dict, Object, ObjectRef};
//! use pdf_import::reader::MemoryReader;
//! use pdf_import::writer::{PdfWriter, PdfWriterConfig};
//!
//! # fn main() -> pdf_import::Result<()> {
//! let mut source = MemoryReader::new();
//! source
//!     .insert(
//!         ObjectRef::new(3, 0),
//!         Object::dict([
//!             ("MediaBox", Object::Array(vec![
//!                 Object::Integer(0),
//!                 Object::Integer(0),
//!                 Object::Integer(595),
//!                 Object::Integer(842),
//!             ])),
//!             ("Resources", Object::Dictionary(Dict::new())),
//!             ("Rotate", Object::Integer(90)),
//!         ]),
//!     )
//!     .push_page(ObjectRef::new(3, 0));
//!
//! let mut writer = PdfWriter::with_config(PdfWriterConfig::default().with_title("Imposed"));
//! let source = writer.add_source(source);
//! let tpl = writer.import_page(source, 1, "CropBox")?;
//!
//! // Rotated page: 842 wide, 595 high. Draw it at half size.
//! let size = writer.template_size(tpl, 421.0, 0.0)?;
//! assert_eq!(size.height, 297.5);
//!
//! writer
//!     .add_page(842.0, 595.0)
//!     .use_template(tpl, 0.0, 0.0, 421.0, 0.0)?
//!     .use_template(tpl, 421.0, 0.0, 421.0, 0.0)?;
//!
//! let pdf = writer.finish()?;
//! assert!(pdf.ends_with(b"%%EOF\n"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Object model
pub mod geometry;
pub mod object;

// Source documents and imported pages
pub mod reader;
pub mod template;

// PDF writing
pub mod writer;

// Re-exports
pub use error::{Error, Result};
pub use reader::{MemoryReader, SourceId, SourceReader};
pub use template::{BoxName, Template, TemplateId};
pub use writer::{PageBuilder, PdfWriter, PdfWriterConfig};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
