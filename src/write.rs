//! Write-side operations: buffered writes with threshold-triggered draining,
//! batched line writes, and explicit flushing.

use crate::error;
use crate::stream::Stream;
use crate::transport::Transport;
use std::io;

impl<T: Transport> Stream<T> {
    /// Appends `data` to the write buffer, draining to the transport once
    /// the buffer reaches the minimum write size.
    ///
    /// Returns the full length of `data`: buffering never partially fails.
    /// Whether the bytes have reached the transport is observable only
    /// through [`flush`].
    ///
    /// [`flush`]: Stream::flush
    pub fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.check_write_open()?;

        self.write_buffer.append(data);
        if self.write_buffer.len() >= self.config.minimum_write_size {
            self.drain()?;
        }

        Ok(data.len())
    }

    /// Appends `data` and drains immediately.
    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.check_write_open()?;

        self.write_buffer.append(data);
        self.drain()
    }

    /// Writes each item followed by a newline, then drains.
    ///
    /// Equivalent to [`puts_with`] with a newline separator.
    ///
    /// [`puts_with`]: Stream::puts_with
    pub fn puts<I, A>(&mut self, items: I) -> io::Result<()>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.puts_with(items, b"\n")
    }

    /// Writes each item followed by `separator`, then drains.
    ///
    /// This is the batched multi-line write: all items land in the buffer
    /// before a single drain, and the drain is unconditional rather than
    /// threshold-triggered. An empty iterator performs no I/O.
    pub fn puts_with<I, A>(&mut self, items: I, separator: &[u8]) -> io::Result<()>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        self.check_write_open()?;

        let mut appended = false;
        for item in items {
            self.write_buffer.append(item.as_ref());
            self.write_buffer.append(separator);
            appended = true;
        }

        if appended {
            self.drain()
        } else {
            Ok(())
        }
    }

    /// Drains buffered writes to the transport. No-op when nothing is
    /// buffered.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.write_buffer.is_empty() {
            return Ok(());
        }
        self.drain()
    }

    /// Hands the entire write buffer to the transport.
    ///
    /// The buffer is emptied before the transport write is attempted: a
    /// partially written buffer cannot be safely resent, so on failure the
    /// unsent bytes are lost and the error is reported to the caller rather
    /// than retried with stale data.
    fn drain(&mut self) -> io::Result<()> {
        let buffer = self.write_buffer.take_all();
        self.transport.sys_write(&buffer)
    }

    fn check_write_open(&self) -> io::Result<()> {
        if self.write_closed {
            Err(error::closed_for_writing())
        } else {
            Ok(())
        }
    }
}
