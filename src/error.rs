//! Error types for the page import library.
//!
//! This module defines all error types that can occur while importing pages
//! from a source document and assembling the output PDF.

use crate::object::ObjectRef;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during import and assembly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested page box and all of its fallbacks are missing
    #[error("Box not found on page {page}: {requested}")]
    BoxNotFound {
        /// 1-based page number
        page: u32,
        /// Box name that was requested (before fallback)
        requested: String,
    },

    /// Box name is not one of MediaBox, CropBox, BleedBox, TrimBox, ArtBox
    #[error("Invalid box name: {0}")]
    InvalidBoxName(String),

    /// Page has no resources dictionary
    #[error("Resources missing for page {page}")]
    ResourcesMissing {
        /// 1-based page number
        page: u32,
    },

    /// A reserved reference could not be resolved against its source document
    #[error("Dangling reference {reference} (assigned object {assigned}): {source}")]
    DanglingReference {
        /// Reference as it appears in the source document
        reference: ObjectRef,
        /// Identifier reserved for it in the output
        assigned: u32,
        /// Underlying reader failure
        source: Box<Error>,
    },

    /// Unsupported stream filter
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    /// Output sink rejected a write
    #[error("Write failed at byte {offset}: {source}")]
    WriteFailure {
        /// Running offset when the write was attempted
        offset: usize,
        /// IO error reported by the sink
        source: std::io::Error,
    },

    /// Page number outside the source document
    #[error("Page not found: {0}")]
    PageNotFound(u32),

    /// Referenced object not present in the source document
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// Stream decoding error
    #[error("Stream decoding error: {0}")]
    Decode(String),

    /// Circular reference detected while following a reference chain
    #[error("Circular reference detected: object {0}")]
    CircularReference(ObjectRef),

    /// Recursion depth limit exceeded
    #[error("Recursion depth limit exceeded (max: {0})")]
    RecursionLimitExceeded(u32),

    /// Template id does not belong to this writer
    #[error("Unknown template: {0}")]
    UnknownTemplate(usize),

    /// Source id does not belong to this writer
    #[error("Unknown source document: {0}")]
    UnknownSource(usize),

    /// An identifier was allocated but never written before the xref table
    #[error("Object {0} was allocated but never written")]
    UnwrittenObject(u32),

    /// An object header was committed twice
    #[error("Object {0} written twice")]
    DuplicateObject(u32),

    /// Failure while emitting a template's form unit
    #[error("Failed to emit template {template}: {source}")]
    Emit {
        /// Unit name of the template (e.g. `TPL1`)
        template: String,
        /// Underlying failure
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
