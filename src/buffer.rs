use bytes::{Bytes, BytesMut};
use memchr::memmem;

/// A growable, binary-safe byte buffer.
///
/// This is the building block for both directions of a [`Stream`]: the read
/// side accumulates transport fills in one, and the write side accumulates
/// pending output in another. Bytes are always treated as opaque binary; no
/// text encoding is assumed.
///
/// Consuming operations ([`take_prefix`], [`take_all`]) move the consumed
/// bytes out as an immutable [`Bytes`] value without copying, so there is
/// never a mutable view aliasing an extracted slice.
///
/// [`Stream`]: crate::Stream
/// [`take_prefix`]: ByteBuffer::take_prefix
/// [`take_all`]: ByteBuffer::take_all
#[derive(Default)]
pub struct ByteBuffer {
    data: BytesMut,
}

impl ByteBuffer {
    /// Creates an empty buffer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
        }
    }

    /// Appends `bytes` to the end of the buffer. Amortized O(1).
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Returns the index of the first occurrence of `pattern` at or after
    /// `offset`, or `None` if the pattern does not occur in the buffered
    /// bytes.
    #[must_use]
    pub fn index_of(&self, pattern: &[u8], offset: usize) -> Option<usize> {
        if offset >= self.data.len() {
            return None;
        }
        memmem::find(&self.data[offset..], pattern).map(|index| index + offset)
    }

    /// Splits off the first `n` bytes, returning them as an independent,
    /// immutable value. The buffer is left holding the remainder.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the buffered length.
    #[must_use]
    pub fn take_prefix(&mut self, n: usize) -> Bytes {
        self.data.split_to(n).freeze()
    }

    /// Consumes the entire buffer, leaving it empty. No bytes are copied.
    #[must_use]
    pub fn take_all(&mut self) -> Bytes {
        self.data.split().freeze()
    }

    /// The number of buffered bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Discards all buffered bytes.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// A read-only view of the buffered bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_mut(&mut self) -> &mut BytesMut {
        &mut self.data
    }
}

impl std::fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("len", &self.data.len())
            .finish()
    }
}
