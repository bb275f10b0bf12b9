use crate::buffer::ByteBuffer;
use crate::config::Config;
use crate::transport::Transport;
use std::fmt;
use std::io;

/// A buffered, byte-precise duplex stream over a [`Transport`].
///
/// `Stream` coalesces small reads and writes into large blocks while exposing
/// the exact-length reads, delimiter-based reads, peeking, and discarding
/// that protocol parsers need. It owns its transport from construction
/// until [`close`], and it composes one read side and one write side over
/// that single handle.
///
/// All operations take `&mut self`: exclusive access is how the invariants
/// "at most one reader at a time" and "at most one in-flight transport write"
/// are enforced. To share a stream between threads, wrap it in a `Mutex`,
/// which serializes whole operations.
///
/// End-of-data is not an error. Read operations report it as `Ok(None)` once
/// the transport is done and the buffer is drained; only [`read_exactly`]
/// escalates a premature end into an error.
///
/// [`close`]: Stream::close
/// [`read_exactly`]: Stream::read_exactly
pub struct Stream<T: Transport> {
    pub(crate) transport: T,
    pub(crate) config: Config,
    pub(crate) read_buffer: ByteBuffer,
    pub(crate) write_buffer: ByteBuffer,
    pub(crate) done: bool,
    pub(crate) read_closed: bool,
    pub(crate) write_closed: bool,
}

impl<T: Transport> Stream<T> {
    /// Creates a stream over `transport` with the default [`Config`].
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, Config::default())
    }

    /// Creates a stream over `transport` with an explicit [`Config`].
    #[must_use]
    pub fn with_config(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            read_buffer: ByteBuffer::new(),
            write_buffer: ByteBuffer::new(),
            done: false,
            read_closed: false,
            write_closed: false,
        }
    }

    /// A reference to the underlying transport.
    #[must_use]
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// A mutable reference to the underlying transport.
    ///
    /// Performing I/O directly on the transport while buffered data is
    /// pending can reorder bytes on the wire.
    #[must_use]
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The sizing configuration this stream was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the underlying transport has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Flushes any buffered writes on a best-effort basis, then closes the
    /// transport.
    ///
    /// Errors from the close-time flush are swallowed: a write failure at
    /// close cannot be meaningfully retried or reported. Calling `close`
    /// again after the first call has no effect.
    pub fn close(&mut self) {
        if self.transport.is_closed() {
            return;
        }
        // We really can't do anything with a flush failure here unless we
        // want close to raise.
        let _ = self.flush();
        self.read_closed = true;
        self.write_closed = true;
        let _ = self.transport.sys_close();
    }

    /// Shuts down the read direction.
    ///
    /// Subsequent read operations fail fast with
    /// [`io::ErrorKind::NotConnected`]; the write direction remains usable.
    pub fn close_read(&mut self) -> io::Result<()> {
        self.read_closed = true;
        self.transport.close_read()
    }

    /// Flushes buffered writes, then shuts down the write direction.
    ///
    /// The half-close is performed even when the flush fails, and the flush
    /// error is then reported. The read direction remains usable, and a peer
    /// can still drain everything written before the half-close.
    pub fn close_write(&mut self) -> io::Result<()> {
        let flushed = self.flush();
        self.write_closed = true;
        let closed = self.transport.close_write();
        flushed.and(closed)
    }
}

impl<T: Transport> Drop for Stream<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("read_buffer", &self.read_buffer.len())
            .field("write_buffer", &self.write_buffer.len())
            .field("done", &self.done)
            .field("closed", &self.transport.is_closed())
            .finish()
    }
}
