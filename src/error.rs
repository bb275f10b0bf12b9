use bytes::Bytes;
use std::fmt;
use std::io;

/// The payload attached to the `UnexpectedEof` error produced by
/// [`Stream::read_exactly`] when the stream ends short.
///
/// The bytes that were produced before end-of-data are carried here rather
/// than discarded, so a caller that needs them can recover them from the
/// error's source chain:
///
/// ```no_run
/// # use std::io;
/// # fn example(error: io::Error) {
/// if let Some(short) = error
///     .get_ref()
///     .and_then(|source| source.downcast_ref::<buf_streams::ShortRead>())
/// {
///     let partial: &[u8] = short.bytes();
///     # let _ = partial;
/// }
/// # }
/// ```
///
/// [`Stream::read_exactly`]: crate::Stream::read_exactly
#[derive(Debug)]
pub struct ShortRead {
    bytes: Bytes,
    expected: usize,
}

impl ShortRead {
    pub(crate) fn new(bytes: Bytes, expected: usize) -> Self {
        Self { bytes, expected }
    }

    /// The bytes that were read before the stream ended.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bytes the caller asked for.
    #[must_use]
    pub fn expected(&self) -> usize {
        self.expected
    }
}

impl fmt::Display for ShortRead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream ended after {} of {} bytes",
            self.bytes.len(),
            self.expected
        )
    }
}

impl std::error::Error for ShortRead {}

pub(crate) fn short_read(bytes: Bytes, expected: usize) -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, ShortRead::new(bytes, expected))
}

pub(crate) fn closed_for_reading() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "stream closed for reading")
}

pub(crate) fn closed_for_writing() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "stream closed for writing")
}

/// Maps a `WouldBlock` escaping a blocking handle onto `TimedOut`.
///
/// Blocking sockets with a configured read or write deadline report an
/// elapsed deadline as `WouldBlock`; at the stream surface that is a timeout,
/// distinct from end-of-data and from connection reset.
pub(crate) fn map_deadline(error: io::Error) -> io::Error {
    if error.kind() == io::ErrorKind::WouldBlock {
        io::Error::new(io::ErrorKind::TimedOut, "transport deadline elapsed")
    } else {
        error
    }
}
