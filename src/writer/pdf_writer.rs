//! PDF document writer.
//!
//! Assembles the output document: header, one Form XObject per imported
//! template together with everything its resources reference, the
//! destination pages, catalog, xref table and trailer.

use super::form_xobject::put_form_xobject;
use super::object_serializer::{ObjectSerializer, References};
use super::output::OffsetWriter;
use super::placement::{compute_size, place, Placement, TemplateSize};
use super::resolver::ObjectResolver;
use crate::error::{Error, Result};
use crate::object::{Dict, Object};
use crate::reader::{SourceId, SourceReader};
use crate::template::{BoxName, Template, TemplateId};
use indexmap::IndexMap;
use std::io::Write;

/// Configuration for PDF generation.
#[derive(Debug, Clone)]
pub struct PdfWriterConfig {
    /// PDF version (e.g., "1.4")
    pub version: String,
    /// Document title
    pub title: Option<String>,
    /// Creator application
    pub creator: Option<String>,
    /// Whether to compress streams
    pub compress: bool,
    /// Output scale factor applied to boxes and translations
    pub scale: f64,
}

impl Default for PdfWriterConfig {
    fn default() -> Self {
        Self {
            version: "1.4".to_string(),
            title: None,
            creator: Some("pdf_import".to_string()),
            compress: true,
            scale: 1.0,
        }
    }
}

impl PdfWriterConfig {
    /// Set the PDF version written in the header.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the creator application.
    pub fn with_creator(mut self, creator: Option<String>) -> Self {
        self.creator = creator;
        self
    }

    /// Enable or disable stream compression.
    ///
    /// When enabled, form and page content streams are compressed using
    /// FlateDecode (zlib/deflate) to reduce file size.
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the output scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// A page being built.
pub struct PageBuilder<'a, W: Write> {
    writer: &'a mut PdfWriter<W>,
    page_index: usize,
}

impl<'a, W: Write> PageBuilder<'a, W> {
    /// Draw a template on this page.
    ///
    /// `(x, y)` is measured from the top-left corner of the page. A zero
    /// `width` or `height` is derived from the template's aspect ratio; both
    /// zero draws it at its own size.
    pub fn use_template(
        &mut self,
        id: TemplateId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<&mut Self> {
        let page_height = self.writer.pages[self.page_index].height;
        let code = self.writer.use_template(id, x, y, width, height, page_height)?;

        let page = &mut self.writer.pages[self.page_index];
        page.content.extend_from_slice(code.as_bytes());
        page.content.push(b'\n');
        page.xobjects.insert(id.name(), id);
        Ok(self)
    }

    /// Append raw content stream instructions to the page.
    pub fn add_content(&mut self, content: &str) -> &mut Self {
        let page = &mut self.writer.pages[self.page_index];
        page.content.extend_from_slice(content.as_bytes());
        if !content.ends_with('\n') {
            page.content.push(b'\n');
        }
        self
    }

    /// Finish building this page and return to the writer.
    pub fn finish(self) -> &'a mut PdfWriter<W> {
        self.writer
    }
}

/// Internal page data.
struct PageData {
    width: f64,
    height: f64,
    content: Vec<u8>,
    /// Templates drawn on the page, by resource name
    xobjects: IndexMap<String, TemplateId>,
}

/// PDF document writer.
///
/// Import pages from one or more sources with [`import_page`](Self::import_page),
/// draw them on new pages with [`PageBuilder::use_template`], then call
/// [`finish`](Self::finish).
///
/// # Examples
///
/// ```
/// use pdf_import::object::{Dict, Object, ObjectRef};
/// use pdf_import::reader::MemoryReader;
/// use pdf_import::writer::PdfWriter;
///
/// let mut source = MemoryReader::new();
/// source
///     .insert(
///         ObjectRef::new(1, 0),
///         Object::dict([
///             ("MediaBox", Object::Array(vec![
///                 Object::Integer(0),
///                 Object::Integer(0),
///                 Object::Integer(612),
///                 Object::Integer(792),
///             ])),
///             ("Resources", Object::Dictionary(Dict::new())),
///         ]),
///     )
///     .push_page(ObjectRef::new(1, 0));
///
/// let mut writer = PdfWriter::new();
/// let source = writer.add_source(source);
/// let tpl = writer.import_page(source, 1, "MediaBox")?;
/// writer.add_page(612.0, 792.0).use_template(tpl, 0.0, 0.0, 0.0, 0.0)?;
///
/// let bytes = writer.finish()?;
/// assert!(bytes.starts_with(b"%PDF-1.4"));
/// # Ok::<(), pdf_import::Error>(())
/// ```
pub struct PdfWriter<W: Write = Vec<u8>> {
    config: PdfWriterConfig,
    out: OffsetWriter<W>,
    serializer: ObjectSerializer,
    resolver: ObjectResolver,
    sources: Vec<Box<dyn SourceReader>>,
    templates: Vec<Template>,
    pages: Vec<PageData>,
}

impl PdfWriter<Vec<u8>> {
    /// Create a new PDF writer with default config.
    pub fn new() -> Self {
        Self::with_config(PdfWriterConfig::default())
    }

    /// Create a PDF writer with custom config.
    pub fn with_config(config: PdfWriterConfig) -> Self {
        Self::to_writer(Vec::new(), config)
    }

    /// Save the PDF to a file.
    pub fn save(self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for PdfWriter<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> PdfWriter<W> {
    /// Create a PDF writer that streams into `inner`.
    ///
    /// Nothing is written until [`finish`](Self::finish).
    pub fn to_writer(inner: W, config: PdfWriterConfig) -> Self {
        Self {
            config,
            out: OffsetWriter::new(inner),
            serializer: ObjectSerializer::new(),
            resolver: ObjectResolver::new(),
            sources: Vec::new(),
            templates: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Register a source document to import pages from.
    pub fn add_source(&mut self, reader: impl SourceReader + 'static) -> SourceId {
        self.sources.push(Box::new(reader));
        SourceId(self.sources.len() - 1)
    }

    /// Import `page` (1-based) of `source`, cut to `box_name`.
    ///
    /// `box_name` must be one of `MediaBox`, `CropBox`, `BleedBox`,
    /// `TrimBox` or `ArtBox`, with or without a leading `/`.
    pub fn import_page(&mut self, source: SourceId, page: u32, box_name: &str) -> Result<TemplateId> {
        let box_name: BoxName = box_name.parse()?;
        let reader = self
            .sources
            .get(source.index())
            .ok_or(Error::UnknownSource(source.index()))?;

        let id = TemplateId(self.templates.len());
        let tpl = Template::import(reader.as_ref(), source, id, page, box_name)?;
        self.templates.push(tpl);
        Ok(id)
    }

    /// Look up an imported template.
    pub fn template(&self, id: TemplateId) -> Result<&Template> {
        self.templates
            .get(id.index())
            .ok_or(Error::UnknownTemplate(id.index()))
    }

    /// All imported templates, in import order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Size template `id` would be drawn at for the requested size.
    pub fn template_size(&self, id: TemplateId, width: f64, height: f64) -> Result<TemplateSize> {
        Ok(compute_size(self.template(id)?, width, height))
    }

    /// Content stream fragment drawing template `id` on a page
    /// `page_height` tall.
    ///
    /// The fragment is only returned; embedding it in a page and listing the
    /// template in that page's resources is up to the caller.
    /// [`PageBuilder::use_template`] does both.
    pub fn use_template(
        &self,
        id: TemplateId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        page_height: f64,
    ) -> Result<String> {
        let tpl = self.template(id)?;
        let placement = Placement::new(x, y, width, height, page_height).with_scale(self.config.scale);
        Ok(place(tpl, &placement))
    }

    /// Add a page with the given dimensions.
    pub fn add_page(&mut self, width: f64, height: f64) -> PageBuilder<'_, W> {
        let page_index = self.pages.len();
        self.pages.push(PageData {
            width,
            height,
            content: Vec::new(),
            xobjects: IndexMap::new(),
        });
        PageBuilder {
            writer: self,
            page_index,
        }
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Write the complete document and return the sink.
    pub fn finish(self) -> Result<W> {
        let Self {
            config,
            mut out,
            serializer,
            mut resolver,
            sources,
            mut templates,
            pages,
        } = self;
        let k = config.scale;

        // PDF Header
        out.out(format!("%PDF-{}", config.version))?;
        // Binary marker (recommended for binary content)
        out.out(b"%\xE2\xE3\xCF\xD3")?;

        for tpl in templates.iter_mut() {
            let name = tpl.name();
            put_form_xobject(
                &mut out,
                &mut resolver,
                &sources,
                &serializer,
                tpl,
                config.compress,
                k,
            )
            .map_err(|e| Error::Emit {
                template: name,
                source: Box::new(e),
            })?;
        }

        let pages_id = out.begin_object(None, false)?;
        let mut page_ids: Vec<(u32, u32)> = Vec::with_capacity(pages.len());
        for _ in &pages {
            let page_id = out.begin_object(None, false)?;
            let content_id = out.begin_object(None, false)?;
            page_ids.push((page_id, content_id));
        }
        let catalog_id = out.begin_object(None, false)?;

        let mut info = Dict::new();
        if let Some(title) = &config.title {
            info.insert("Title".to_string(), Object::String(title.as_bytes().to_vec()));
        }
        if let Some(creator) = &config.creator {
            info.insert("Creator".to_string(), Object::String(creator.as_bytes().to_vec()));
        }
        let info_id = if info.is_empty() {
            None
        } else {
            Some(out.begin_object(None, false)?)
        };

        let mut kids = Vec::with_capacity(pages.len());
        for (page, &(page_id, content_id)) in pages.iter().zip(&page_ids) {
            let mut xobjects = Dict::new();
            for (name, id) in &page.xobjects {
                let form_id = templates
                    .get(id.index())
                    .and_then(Template::object_id)
                    .ok_or(Error::UnknownTemplate(id.index()))?;
                xobjects.insert(name.clone(), Object::reference(form_id, 0));
            }

            let mut resources = Dict::new();
            resources.insert(
                "ProcSet".to_string(),
                Object::Array(
                    ["PDF", "Text", "ImageB", "ImageC", "ImageI"]
                        .into_iter()
                        .map(Object::name)
                        .collect(),
                ),
            );
            if !xobjects.is_empty() {
                resources.insert("XObject".to_string(), Object::Dictionary(xobjects));
            }

            let page_obj = Object::dict([
                ("Type", Object::name("Page")),
                ("Parent", Object::reference(pages_id, 0)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Real(page.width * k),
                        Object::Real(page.height * k),
                    ]),
                ),
                ("Resources", Object::Dictionary(resources)),
                ("Contents", Object::reference(content_id, 0)),
            ]);
            write_indirect(&mut out, &serializer, page_id, &page_obj)?;

            // Optionally compress the content stream
            let (data, is_compressed) = if config.compress {
                match compress_data(&page.content) {
                    Ok(compressed) => (compressed, true),
                    Err(e) => {
                        log::warn!("Page content compression failed ({}); writing it uncompressed", e);
                        (page.content.clone(), false)
                    },
                }
            } else {
                (page.content.clone(), false)
            };
            let mut content_dict = Dict::new();
            if is_compressed {
                content_dict.insert("Filter".to_string(), Object::name("FlateDecode"));
            }
            let content_obj = Object::Stream {
                dict: content_dict,
                data: bytes::Bytes::from(data),
            };
            write_indirect(&mut out, &serializer, content_id, &content_obj)?;

            kids.push(Object::reference(page_id, 0));
        }

        let pages_obj = Object::dict([
            ("Type", Object::name("Pages")),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(pages.len() as i64)),
        ]);
        write_indirect(&mut out, &serializer, pages_id, &pages_obj)?;

        let catalog_obj = Object::dict([
            ("Type", Object::name("Catalog")),
            ("Pages", Object::reference(pages_id, 0)),
        ]);
        write_indirect(&mut out, &serializer, catalog_id, &catalog_obj)?;

        if let Some(info_id) = info_id {
            write_indirect(&mut out, &serializer, info_id, &Object::Dictionary(info))?;
        }

        debug_assert_eq!(resolver.pending_len(), 0);
        let count = out.current_id();
        if let Some(missing) = (1..=count).find(|id| !out.offsets().contains_key(id)) {
            return Err(Error::UnwrittenObject(missing));
        }

        // Write xref table
        let xref_start = out.offset();
        let offsets: Vec<usize> = out.offsets().values().copied().collect();
        out.out("xref")?;
        out.out(format!("0 {}", count + 1))?;
        // Object 0 is always free
        out.out("0000000000 65535 f ")?;
        for offset in offsets {
            out.out(format!("{:010} 00000 n ", offset))?;
        }

        // Write trailer
        let mut trailer = Dict::new();
        trailer.insert("Size".to_string(), Object::Integer(i64::from(count) + 1));
        trailer.insert("Root".to_string(), Object::reference(catalog_id, 0));
        if let Some(info_id) = info_id {
            trailer.insert("Info".to_string(), Object::reference(info_id, 0));
        }
        out.out("trailer")?;
        serializer.write_object(&mut out, &mut References::Verbatim, &Object::Dictionary(trailer))?;
        out.out("")?;
        out.out("startxref")?;
        out.out(xref_start.to_string())?;
        out.out("%%EOF")?;

        log::debug!(
            "Finished document: {} objects, {} templates, {} pages, {} bytes",
            count,
            templates.len(),
            pages.len(),
            out.offset()
        );
        out.into_inner()
    }
}

/// Commit `id` and write `obj` as its body.
fn write_indirect<W: Write>(
    out: &mut OffsetWriter<W>,
    serializer: &ObjectSerializer,
    id: u32,
    obj: &Object,
) -> Result<()> {
    out.begin_object(Some(id), true)?;
    serializer.write_object(out, &mut References::Verbatim, obj)?;
    out.end_object()
}
