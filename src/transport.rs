use bytes::BytesMut;
use std::io;

/// The capability interface a [`Stream`] requires of its transport.
///
/// A transport is the raw byte endpoint a stream buffers on top of: a file,
/// a stream socket, a pipe end, or anything else that can move bytes. The
/// three primitives are mandatory; a type that cannot provide one of them
/// cannot be used as a transport at all.
///
/// Implementations must uphold these contracts:
///
/// - [`sys_read`] performs one fill attempt, appending at most `size` bytes
///   to `buf` and returning the count appended, with `0` meaning the
///   transport will yield no further bytes. `Interrupted` is retried
///   internally, and a would-block condition is waited out (or, for blocking
///   handles with a configured deadline, surfaced as
///   [`io::ErrorKind::TimedOut`]). On error, `buf` is left exactly as it was.
/// - [`sys_write`] accepts the entire slice, retrying through short writes
///   and `Interrupted`, or returns a transport error such as a broken pipe
///   or connection reset.
/// - [`sys_close`] releases the transport and is idempotent.
///
/// [`Stream`]: crate::Stream
/// [`sys_read`]: Transport::sys_read
/// [`sys_write`]: Transport::sys_write
/// [`sys_close`]: Transport::sys_close
pub trait Transport {
    /// Performs one fill attempt, appending up to `size` bytes to `buf`.
    ///
    /// Returns the number of bytes appended; `0` signals end-of-data.
    fn sys_read(&mut self, size: usize, buf: &mut BytesMut) -> io::Result<usize>;

    /// Writes all of `buf` to the transport.
    fn sys_write(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Releases the transport. Idempotent.
    fn sys_close(&mut self) -> io::Result<()>;

    /// Whether [`sys_close`] has been invoked.
    ///
    /// [`sys_close`]: Transport::sys_close
    fn is_closed(&self) -> bool;

    /// Shuts down the read direction, leaving writes usable.
    ///
    /// Transports without an independent read half-close leave this as the
    /// default no-op.
    fn close_read(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Shuts down the write direction, leaving reads usable.
    ///
    /// Transports without an independent write half-close leave this as the
    /// default no-op.
    fn close_write(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// A non-blocking hint: `false` if the transport is known to yield no
    /// further bytes, `true` if a read has a chance of succeeding.
    ///
    /// Never blocks and never performs I/O beyond inspecting already-known
    /// OS state. May return a false positive, but not a false negative.
    fn readable_hint(&self) -> bool {
        !self.is_closed()
    }
}
