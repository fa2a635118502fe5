//! Locations within schemas and validated instances, expressed as RFC 6901
//! JSON Pointers.
use core::fmt;
use std::sync::Arc;

use crate::uri::escape_segment_to;

/// An owned JSON Pointer, cheap to clone.
///
/// Used for schema/keyword locations, which are built once at compile time
/// and copied into every output unit that mentions them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(Arc<str>);

impl Location {
    /// The root location (the empty pointer).
    #[must_use]
    pub fn new() -> Self {
        Location(Arc::from(""))
    }

    /// Create a new location with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl LocationSegment) -> Self {
        let mut buffer = String::with_capacity(self.0.len() + 8);
        buffer.push_str(&self.0);
        buffer.push('/');
        segment.write_to(&mut buffer);
        Location(buffer.into())
    }

    /// The pointer as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Re-base this pointer onto a new root, assuming `prefix` addresses one
    /// of its ancestors.
    pub(crate) fn strip_prefix(&self, prefix: &Location) -> Location {
        Location(Arc::from(&self.0[prefix.as_str().len()..]))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// A single pointer segment: a property name or an array index.
pub trait LocationSegment {
    fn write_to(self, buffer: &mut String);
}

impl LocationSegment for &str {
    fn write_to(self, buffer: &mut String) {
        escape_segment_to(self, buffer);
    }
}

impl LocationSegment for usize {
    fn write_to(self, buffer: &mut String) {
        buffer.push_str(itoa::Buffer::new().format(self));
    }
}

/// A borrowed pointer segment inside a [`LazyLocation`] chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SegmentRef<'a> {
    Property(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for SegmentRef<'a> {
    fn from(value: &'a str) -> Self {
        SegmentRef::Property(value)
    }
}

impl From<usize> for SegmentRef<'_> {
    fn from(value: usize) -> Self {
        SegmentRef::Index(value)
    }
}

/// A node in a linked list representing a JSON Pointer into the instance.
///
/// Instance paths grow and shrink with the call stack during evaluation;
/// keeping them as parent links avoids allocating a pointer string per
/// visited node. [`Location`] is materialized only when an output unit or a
/// loop-detection key actually needs one.
#[derive(Debug, Clone)]
pub struct LazyLocation<'a, 'b> {
    pub(crate) segment: SegmentRef<'a>,
    pub(crate) parent: Option<&'b LazyLocation<'b, 'a>>,
}

impl Default for LazyLocation<'_, '_> {
    fn default() -> Self {
        LazyLocation::new()
    }
}

impl<'a, 'b> LazyLocation<'a, 'b> {
    /// Create a root node of a JSON Pointer.
    #[must_use]
    pub const fn new() -> Self {
        LazyLocation {
            // Never rendered; the root has no segment of its own
            segment: SegmentRef::Index(0),
            parent: None,
        }
    }

    /// Push a new segment to the JSON Pointer.
    #[must_use]
    pub fn push(&'a self, segment: impl Into<SegmentRef<'a>>) -> Self {
        LazyLocation {
            segment: segment.into(),
            parent: Some(self),
        }
    }
}

impl From<&LazyLocation<'_, '_>> for Location {
    fn from(path: &LazyLocation<'_, '_>) -> Self {
        let mut segments = Vec::new();
        let mut head = path;
        while let Some(parent) = head.parent {
            segments.push(head.segment);
            head = parent;
        }
        let mut buffer = String::new();
        for segment in segments.iter().rev() {
            buffer.push('/');
            match segment {
                SegmentRef::Property(property) => escape_segment_to(property, &mut buffer),
                SegmentRef::Index(idx) => buffer.push_str(itoa::Buffer::new().format(*idx)),
            }
        }
        Location(buffer.into())
    }
}
