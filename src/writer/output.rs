//! Offset-tracked output.
//!
//! Every byte of the document goes through [`OffsetWriter`], which keeps the
//! running byte offset and the object number counter, and records where each
//! `N 0 obj` header starts. The xref table is built from that record.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::io::Write;

/// Append-only sink that tracks byte offsets and object numbers.
#[derive(Debug)]
pub struct OffsetWriter<W: Write> {
    inner: W,
    /// Bytes written so far
    offset: usize,
    /// Highest object number handed out
    current_id: u32,
    /// Object number -> offset of its header line
    offsets: BTreeMap<u32, usize>,
    last_byte: Option<u8>,
}

impl<W: Write> OffsetWriter<W> {
    /// Wrap a sink. Offsets start at 0 and object numbers at 1.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            offset: 0,
            current_id: 0,
            offsets: BTreeMap::new(),
            last_byte: None,
        }
    }

    /// Write `data` followed by a single line break.
    pub fn out(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        self.straight_out(data)?;
        self.straight_out(b"\n")
    }

    /// Write `data` as is.
    pub fn straight_out(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        if data.is_empty() {
            return Ok(());
        }
        self.inner
            .write_all(data)
            .map_err(|source| Error::WriteFailure {
                offset: self.offset,
                source,
            })?;
        self.offset += data.len();
        self.last_byte = data.last().copied();
        Ok(())
    }

    /// Start an indirect object.
    ///
    /// With `id == None` the next object number is allocated. With
    /// `commit == false` the number is only reserved: nothing is written and
    /// no offset is recorded, so the header can be committed later by calling
    /// again with `Some(id)` and `commit == true`.
    pub fn begin_object(&mut self, id: Option<u32>, commit: bool) -> Result<u32> {
        let id = match id {
            Some(id) => id,
            None => {
                self.current_id += 1;
                self.current_id
            },
        };

        if commit {
            if self.offsets.contains_key(&id) {
                return Err(Error::DuplicateObject(id));
            }
            log::trace!("object {} at byte {}", id, self.offset);
            self.offsets.insert(id, self.offset);
            self.out(format!("{} 0 obj", id))?;
        }
        Ok(id)
    }

    /// Close the current indirect object with `endobj`.
    pub fn end_object(&mut self) -> Result<()> {
        if self.last_byte != Some(b'\n') {
            self.straight_out(b"\n")?;
        }
        self.out("endobj")
    }

    /// Running byte offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Highest object number handed out so far.
    pub fn current_id(&self) -> u32 {
        self.current_id
    }

    /// Move the object number counter. Used to scope numbering while a form
    /// unit's own body is written.
    pub(crate) fn set_current_id(&mut self, id: u32) {
        self.current_id = id;
    }

    /// Header offsets of all committed objects, by object number.
    pub fn offsets(&self) -> &BTreeMap<u32, usize> {
        &self.offsets
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush().map_err(|source| Error::WriteFailure {
            offset: self.offset,
            source,
        })?;
        Ok(self.inner)
    }
}
