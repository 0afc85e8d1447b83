//! Object graph resolver.
//!
//! Imported resources point at objects of the source document. The resolver
//! gives each distinct `(source, reference)` an output object number the first
//! time it is met, and queues it. [`ObjectResolver::drain`] then copies the
//! queued objects, which may queue further objects, until nothing is left.
//!
//! A reference that was already seen never queues anything, so cyclic graphs
//! terminate and each object is written exactly once.

use super::object_serializer::{ObjectSerializer, References};
use super::output::OffsetWriter;
use crate::error::{Error, Result};
use crate::object::ObjectRef;
use crate::reader::{SourceId, SourceReader};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::io::Write;

type Key = (SourceId, ObjectRef);

/// Renumbering state for one output document.
#[derive(Debug, Default)]
pub struct ObjectResolver {
    /// Every reference met so far -> its output object number
    seen: IndexMap<Key, u32>,
    /// Seen but not yet written, in discovery order
    pending: VecDeque<(Key, u32)>,
}

impl ObjectResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Output object number for `reference` in `source`, reserving one on first sight.
    pub(crate) fn reserve<W: Write>(
        &mut self,
        out: &mut OffsetWriter<W>,
        source: SourceId,
        reference: ObjectRef,
    ) -> Result<u32> {
        let key = (source, reference);
        if let Some(&id) = self.seen.get(&key) {
            return Ok(id);
        }
        let id = out.begin_object(None, false)?;
        log::trace!("reserved {} for {} of source {}", id, reference, source.index());
        self.seen.insert(key, id);
        self.pending.push_back((key, id));
        Ok(id)
    }

    /// Output object number already assigned to `reference`, if any.
    pub fn lookup(&self, source: SourceId, reference: ObjectRef) -> Option<u32> {
        self.seen.get(&(source, reference)).copied()
    }

    /// Number of distinct references met.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Number of references reserved but not yet written.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Write every pending object, including objects they reference, until the
    /// queue is empty. Returns the number of objects written.
    pub(crate) fn drain<W: Write>(
        &mut self,
        out: &mut OffsetWriter<W>,
        sources: &[Box<dyn SourceReader>],
        serializer: &ObjectSerializer,
    ) -> Result<usize> {
        let mut written = 0;
        let mut pass = 0;
        loop {
            let batch: Vec<(Key, u32)> = self.pending.drain(..).collect();
            if batch.is_empty() {
                break;
            }
            pass += 1;
            log::trace!("resolver pass {}: {} objects", pass, batch.len());

            for ((source, reference), id) in batch {
                let reader = sources
                    .get(source.index())
                    .ok_or(Error::UnknownSource(source.index()))?;
                let value = reader
                    .resolve(reference)
                    .map_err(|e| Error::DanglingReference {
                        reference,
                        assigned: id,
                        source: Box::new(e),
                    })?;

                out.begin_object(Some(id), true)?;
                let mut refs = References::Import {
                    resolver: &mut *self,
                    source,
                };
                serializer.write_object(out, &mut refs, &value)?;
                out.end_object()?;
                written += 1;
            }
        }
        if written > 0 {
            log::debug!("copied {} imported objects in {} passes", written, pass);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Dict, Object};
    use crate::reader::MemoryReader;
    use proptest::prelude::*;

    fn drain_all(
        resolver: &mut ObjectResolver,
        out: &mut OffsetWriter<Vec<u8>>,
        reader: MemoryReader,
    ) -> usize {
        let sources: Vec<Box<dyn SourceReader>> = vec![Box::new(reader)];
        resolver
            .drain(out, &sources, &ObjectSerializer::new())
            .unwrap()
    }

    #[test]
    fn test_reserve_is_idempotent() {
        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        let a = resolver.reserve(&mut out, SourceId(0), ObjectRef::new(7, 0)).unwrap();
        let b = resolver.reserve(&mut out, SourceId(0), ObjectRef::new(7, 0)).unwrap();
        assert_eq!(a, b);
        assert_eq!(resolver.pending_len(), 1);
        assert_eq!(out.current_id(), 1);
        assert_eq!(out.offset(), 0);
    }

    #[test]
    fn test_sources_do_not_collide() {
        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        let a = resolver.reserve(&mut out, SourceId(0), ObjectRef::new(7, 0)).unwrap();
        let b = resolver.reserve(&mut out, SourceId(1), ObjectRef::new(7, 0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(resolver.lookup(SourceId(1), ObjectRef::new(7, 0)), Some(b));
    }

    #[test]
    fn test_drain_two_cycle() {
        let mut reader = MemoryReader::new();
        reader
            .insert(ObjectRef::new(10, 0), Object::dict([("Next", Object::reference(11, 0))]))
            .insert(ObjectRef::new(11, 0), Object::dict([("Next", Object::reference(10, 0))]));

        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        let a = resolver.reserve(&mut out, SourceId(0), ObjectRef::new(10, 0)).unwrap();

        assert_eq!(drain_all(&mut resolver, &mut out, reader), 2);
        assert_eq!(resolver.pending_len(), 0);
        assert_eq!(resolver.seen_len(), 2);
        let b = resolver.lookup(SourceId(0), ObjectRef::new(11, 0)).unwrap();
        assert_eq!(out.offsets().len(), 2);

        let text = String::from_utf8(out.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            format!(
                "{a} 0 obj\n<</Next {b} 0 R >>\nendobj\n{b} 0 obj\n<</Next {a} 0 R >>\nendobj\n"
            )
        );
    }

    #[test]
    fn test_drain_self_loop() {
        let mut reader = MemoryReader::new();
        reader.insert(
            ObjectRef::new(5, 0),
            Object::Array(vec![Object::reference(5, 0), Object::Integer(1)]),
        );

        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        resolver.reserve(&mut out, SourceId(0), ObjectRef::new(5, 0)).unwrap();

        assert_eq!(drain_all(&mut resolver, &mut out, reader), 1);
        let text = String::from_utf8(out.into_inner().unwrap()).unwrap();
        assert_eq!(text, "1 0 obj\n[1 0 R 1 ]\nendobj\n");
    }

    #[test]
    fn test_drain_stream_object() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::reference(9, 0));
        let mut reader = MemoryReader::new();
        reader
            .insert(
                ObjectRef::new(8, 0),
                Object::Stream {
                    dict,
                    data: bytes::Bytes::from_static(b"xyz"),
                },
            )
            .insert(ObjectRef::new(9, 0), Object::Integer(3));

        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        resolver.reserve(&mut out, SourceId(0), ObjectRef::new(8, 0)).unwrap();
        assert_eq!(drain_all(&mut resolver, &mut out, reader), 2);

        let text = String::from_utf8(out.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "1 0 obj\n<</Length 2 0 R >>\nstream\nxyz\nendstream\nendobj\n2 0 obj\n3 \nendobj\n"
        );
    }

    #[test]
    fn test_drain_dangling_reference() {
        let mut resolver = ObjectResolver::new();
        let mut out = OffsetWriter::new(Vec::new());
        resolver.reserve(&mut out, SourceId(0), ObjectRef::new(99, 0)).unwrap();

        let sources: Vec<Box<dyn SourceReader>> = vec![Box::new(MemoryReader::new())];
        match resolver.drain(&mut out, &sources, &ObjectSerializer::new()) {
            Err(Error::DanglingReference {
                reference,
                assigned,
                ..
            }) => {
                assert_eq!(reference, ObjectRef::new(99, 0));
                assert_eq!(assigned, 1);
            },
            other => panic!("Expected DanglingReference, got {:?}", other),
        }
    }

    proptest! {
        /// Random graphs over 1..=n: each node is written exactly once.
        #[test]
        fn prop_each_reachable_object_written_once(
            edges in proptest::collection::vec((1u32..12, 1u32..12), 0..40)
        ) {
            let mut reader = MemoryReader::new();
            for node in 1u32..12 {
                let kids: Vec<Object> = edges
                    .iter()
                    .filter(|(from, _)| *from == node)
                    .map(|(_, to)| Object::reference(*to, 0))
                    .collect();
                reader.insert(ObjectRef::new(node, 0), Object::Array(kids));
            }

            let mut resolver = ObjectResolver::new();
            let mut out = OffsetWriter::new(Vec::new());
            resolver.reserve(&mut out, SourceId(0), ObjectRef::new(1, 0)).unwrap();
            let written = drain_all(&mut resolver, &mut out, reader);

            prop_assert_eq!(written, resolver.seen_len());
            prop_assert_eq!(out.offsets().len(), resolver.seen_len());
            prop_assert_eq!(out.current_id() as usize, resolver.seen_len());
        }
    }
}
