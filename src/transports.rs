//! Transport adapters for the standard byte endpoints: TCP sockets,
//! Unix-domain sockets, files, and pipes.
//!
//! Each adapter owns its handle for the lifetime of the stream wrapping it
//! and translates the handle's behavior onto the [`Transport`] contract:
//! `Interrupted` is retried, short writes are completed, and an elapsed
//! read/write deadline surfaces as [`io::ErrorKind::TimedOut`].

use crate::error::map_deadline;
use crate::transport::Transport;
use bytes::BytesMut;
#[cfg(not(target_os = "wasi"))]
use os_pipe::{PipeReader, PipeWriter};
use std::fs::File;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::time::Duration;
use system_interface::io::ReadReady;

/// One fill attempt against a blocking `Read` handle.
///
/// Appends at most `size` bytes to `buf`. On error the buffer is restored to
/// its prior length, so a failed fill never leaves torn data behind.
fn read_from<R: Read>(source: &mut R, size: usize, buf: &mut BytesMut) -> io::Result<usize> {
    let start = buf.len();
    buf.resize(start + size, 0);
    loop {
        match source.read(&mut buf[start..]) {
            Ok(n) => {
                buf.truncate(start + n);
                return Ok(n);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                buf.truncate(start);
                return Err(map_deadline(e));
            }
        }
    }
}

/// Writes all of `buf` to a blocking `Write` handle, completing short writes.
fn write_to<W: Write>(sink: &mut W, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        match sink.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "transport accepted no bytes",
                ));
            }
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_deadline(e)),
        }
    }
    Ok(())
}

fn not_readable() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "transport not opened for reading")
}

fn not_writable() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "transport not opened for writing")
}

/// A TCP stream transport.
///
/// Half-close maps onto [`TcpStream::shutdown`], and read/write deadlines
/// onto the socket timeouts; an elapsed deadline surfaces from stream
/// operations as [`io::ErrorKind::TimedOut`].
pub struct TcpTransport {
    stream: TcpStream,
    closed: bool,
}

impl TcpTransport {
    /// Wraps an open TCP stream, taking ownership of it.
    #[must_use]
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Connects to `addr` and wraps the resulting stream.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Ok(Self::new(TcpStream::connect(addr)?))
    }

    /// Sets the deadline for a single transport read.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }

    /// Sets the deadline for a single transport write.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_write_timeout(timeout)
    }

    /// A reference to the underlying socket.
    #[must_use]
    pub fn get_ref(&self) -> &TcpStream {
        &self.stream
    }
}

impl Transport for TcpTransport {
    fn sys_read(&mut self, size: usize, buf: &mut BytesMut) -> io::Result<usize> {
        read_from(&mut self.stream, size, buf)
    }

    fn sys_write(&mut self, buf: &[u8]) -> io::Result<()> {
        write_to(&mut self.stream, buf)
    }

    fn sys_close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            // Already disconnected; closing is still a success.
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close_read(&mut self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Read)
    }

    fn close_write(&mut self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Write)
    }

    fn readable_hint(&self) -> bool {
        match self.stream.num_ready_bytes() {
            Ok(n) if n > 0 => true,
            Ok(_) => !self.closed,
            Err(_) => false,
        }
    }
}

/// A Unix-domain stream transport.
#[cfg(unix)]
pub struct UnixTransport {
    stream: UnixStream,
    closed: bool,
}

#[cfg(unix)]
impl UnixTransport {
    /// Wraps an open Unix-domain stream, taking ownership of it.
    #[must_use]
    pub fn new(stream: UnixStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }

    /// Builds a connected pair of transports from a socketpair.
    pub fn pair() -> io::Result<(Self, Self)> {
        let (a, b) = UnixStream::pair()?;
        Ok((Self::new(a), Self::new(b)))
    }

    /// Sets the deadline for a single transport read.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_read_timeout(timeout)
    }

    /// Sets the deadline for a single transport write.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.stream.set_write_timeout(timeout)
    }

    /// A reference to the underlying socket.
    #[must_use]
    pub fn get_ref(&self) -> &UnixStream {
        &self.stream
    }
}

#[cfg(unix)]
impl Transport for UnixTransport {
    fn sys_read(&mut self, size: usize, buf: &mut BytesMut) -> io::Result<usize> {
        read_from(&mut self.stream, size, buf)
    }

    fn sys_write(&mut self, buf: &[u8]) -> io::Result<()> {
        write_to(&mut self.stream, buf)
    }

    fn sys_close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            result => result,
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close_read(&mut self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Read)
    }

    fn close_write(&mut self) -> io::Result<()> {
        self.stream.shutdown(Shutdown::Write)
    }

    fn readable_hint(&self) -> bool {
        match self.stream.num_ready_bytes() {
            Ok(n) if n > 0 => true,
            Ok(_) => !self.closed,
            Err(_) => false,
        }
    }
}

/// An open-file transport.
///
/// Files have no independent half-close, so `close_read` and `close_write`
/// are no-ops; end-of-data is the end of the file.
pub struct FileTransport {
    file: File,
    closed: bool,
}

impl FileTransport {
    /// Wraps an open file, taking ownership of it.
    #[must_use]
    pub fn new(file: File) -> Self {
        Self {
            file,
            closed: false,
        }
    }

    /// A reference to the underlying file.
    #[must_use]
    pub fn get_ref(&self) -> &File {
        &self.file
    }
}

impl Transport for FileTransport {
    fn sys_read(&mut self, size: usize, buf: &mut BytesMut) -> io::Result<usize> {
        read_from(&mut self.file, size, buf)
    }

    fn sys_write(&mut self, buf: &[u8]) -> io::Result<()> {
        write_to(&mut self.file, buf)
    }

    fn sys_close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn readable_hint(&self) -> bool {
        match self.file.num_ready_bytes() {
            Ok(n) => n > 0,
            Err(_) => !self.closed,
        }
    }
}

/// A pipe transport holding a reading end, a writing end, or both.
///
/// Closing a direction drops that end, which is how pipes signal: the peer
/// reading from a dropped writer sees end-of-data once the pipe drains, and
/// the peer writing to a dropped reader sees a broken pipe.
#[cfg(not(target_os = "wasi"))]
pub struct PipeTransport {
    reader: Option<PipeReader>,
    writer: Option<PipeWriter>,
    closed: bool,
}

#[cfg(not(target_os = "wasi"))]
impl PipeTransport {
    /// A read-only transport over the reading end of a pipe.
    #[must_use]
    pub fn reader(reader: PipeReader) -> Self {
        Self {
            reader: Some(reader),
            writer: None,
            closed: false,
        }
    }

    /// A write-only transport over the writing end of a pipe.
    #[must_use]
    pub fn writer(writer: PipeWriter) -> Self {
        Self {
            reader: None,
            writer: Some(writer),
            closed: false,
        }
    }

    /// A duplex transport over a pipe's reading end and another pipe's
    /// writing end.
    #[must_use]
    pub fn duplex(reader: PipeReader, writer: PipeWriter) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            closed: false,
        }
    }

    /// Builds two cross-connected duplex transports from a pair of pipes:
    /// bytes written to one side are read from the other.
    pub fn pair() -> io::Result<(Self, Self)> {
        let (read_a, write_a) = os_pipe::pipe()?;
        let (read_b, write_b) = os_pipe::pipe()?;
        Ok((Self::duplex(read_a, write_b), Self::duplex(read_b, write_a)))
    }
}

#[cfg(not(target_os = "wasi"))]
impl Transport for PipeTransport {
    fn sys_read(&mut self, size: usize, buf: &mut BytesMut) -> io::Result<usize> {
        match &mut self.reader {
            Some(reader) => read_from(reader, size, buf),
            None => Err(not_readable()),
        }
    }

    fn sys_write(&mut self, buf: &[u8]) -> io::Result<()> {
        match &mut self.writer {
            Some(writer) => write_to(writer, buf),
            None => Err(not_writable()),
        }
    }

    fn sys_close(&mut self) -> io::Result<()> {
        self.closed = true;
        self.reader = None;
        self.writer = None;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close_read(&mut self) -> io::Result<()> {
        self.reader = None;
        Ok(())
    }

    fn close_write(&mut self) -> io::Result<()> {
        self.writer = None;
        Ok(())
    }

    fn readable_hint(&self) -> bool {
        match &self.reader {
            Some(reader) => reader.num_ready_bytes().is_ok(),
            None => false,
        }
    }
}
