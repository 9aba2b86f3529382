//! Fixed-capacity working window for unclassified stream bytes.

use bytes::{Buf, Bytes, BytesMut};

/// Holds the most recently read bytes that have not yet been classified as
/// status line, headers, or body.
///
/// The window never holds more than `capacity` bytes; callers size their
/// appends with [`WorkingBuffer::spare`].
#[derive(Debug)]
pub(crate) struct WorkingBuffer {
    bytes: BytesMut,
    capacity: usize,
}

impl WorkingBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn len(&self) -> usize { self.bytes.len() }

    pub(crate) fn capacity(&self) -> usize { self.capacity }

    pub(crate) fn spare(&self) -> usize { self.capacity - self.bytes.len() }

    pub(crate) fn is_full(&self) -> bool { self.bytes.len() >= self.capacity }

    pub(crate) fn as_slice(&self) -> &[u8] { &self.bytes }

    /// Append `data`, returning the number of bytes that did not fit.
    pub(crate) fn append(&mut self, data: &[u8]) -> usize {
        let take = data.len().min(self.spare());
        self.bytes.extend_from_slice(&data[..take]);
        data.len() - take
    }

    /// Remove and return the first `n` bytes, shifting the remainder to the
    /// front of the window.
    pub(crate) fn consume_front(&mut self, n: usize) -> Bytes {
        let n = n.min(self.bytes.len());
        self.bytes.split_to(n).freeze()
    }

    /// Drop the first `n` bytes.
    pub(crate) fn discard_front(&mut self, n: usize) {
        let n = n.min(self.bytes.len());
        self.bytes.advance(n);
    }

    /// Keep only the last `n` bytes of the window.
    pub(crate) fn retain_tail(&mut self, n: usize) {
        let excess = self.bytes.len().saturating_sub(n);
        self.bytes.advance(excess);
    }

    /// Take every buffered byte, leaving the window empty.
    pub(crate) fn drain(&mut self) -> Bytes { self.bytes.split().freeze() }

    pub(crate) fn clear(&mut self) { self.bytes.clear(); }

    /// Offset of the first occurrence of `needle` in the window.
    pub(crate) fn find(&self, needle: &[u8]) -> Option<usize> { find_subslice(&self.bytes, needle) }
}

/// Offset of the first occurrence of `needle` within `haystack`.
pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
