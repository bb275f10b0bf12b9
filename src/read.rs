//! Read-side operations: exact, partial, delimiter-based, and peeking reads
//! over the stream's read buffer, plus the fill state machine.
//!
//! The read side is a two-state machine over `done`: once a transport fill
//! yields no further bytes the stream is done, permanently. Residual buffered
//! bytes remain consumable after that point; `None` is returned only once
//! both the transport is done and the buffer is empty.

use crate::error;
use crate::stream::Stream;
use crate::transport::Transport;
use bytes::Bytes;
use std::io;

impl<T: Transport> Stream<T> {
    /// Reads exactly `size` bytes, or whatever remains once the transport is
    /// done.
    ///
    /// Blocks until the buffer holds `size` bytes or end-of-data is reached.
    /// Returns `Some` with exactly `size` bytes when available, `Some` with
    /// fewer once done, and `None` when done with nothing buffered.
    /// `read(0)` returns an empty value without touching the transport, even
    /// at end-of-data.
    pub fn read(&mut self, size: usize) -> io::Result<Option<Bytes>> {
        if size == 0 {
            return Ok(Some(Bytes::new()));
        }
        self.check_read_open()?;

        while !self.done && self.read_buffer.len() < size {
            // Don't read less than the minimum read size, to avoid lots of
            // small reads.
            let read_size = (size - self.read_buffer.len()).max(self.config.minimum_read_size);
            self.fill_read_buffer(read_size)?;
        }

        Ok(self.consume_read_buffer(Some(size)))
    }

    /// Reads until end-of-data, returning everything accumulated, or `None`
    /// if the stream was already done with nothing buffered.
    pub fn read_to_end(&mut self) -> io::Result<Option<Bytes>> {
        self.check_read_open()?;

        while !self.done {
            self.fill_read_buffer(self.config.minimum_read_size)?;
        }

        Ok(self.consume_read_buffer(None))
    }

    /// Reads at most `size` bytes, filling from the transport at most once.
    ///
    /// If the buffer is empty and the stream is not done, performs a single
    /// fill; then returns up to `size` bytes (or everything buffered, with
    /// `None` as the size) from whatever is now available. Never waits for
    /// `size` bytes to accumulate. Returns `Ok(None)` only at end-of-data
    /// with an empty buffer.
    pub fn read_partial(&mut self, size: Option<usize>) -> io::Result<Option<Bytes>> {
        if size == Some(0) {
            return Ok(Some(Bytes::new()));
        }
        self.check_read_open()?;

        if !self.done && self.read_buffer.is_empty() {
            self.fill_read_buffer(self.config.minimum_read_size)?;
        }

        Ok(self.consume_read_buffer(size))
    }

    /// Reads exactly `size` bytes, failing if the stream ends first.
    ///
    /// A premature end-of-data produces [`io::ErrorKind::UnexpectedEof`]
    /// carrying a [`ShortRead`] payload with the bytes that were produced,
    /// so they are not lost to the caller.
    ///
    /// [`ShortRead`]: crate::ShortRead
    pub fn read_exactly(&mut self, size: usize) -> io::Result<Bytes> {
        match self.read(size)? {
            Some(bytes) if bytes.len() == size => Ok(bytes),
            Some(bytes) => Err(error::short_read(bytes, size)),
            None => Err(error::short_read(Bytes::new(), size)),
        }
    }

    /// Reads up to the first occurrence of `pattern`, consuming through the
    /// pattern and returning the bytes before it.
    ///
    /// Returns `None` if end-of-data is reached without the pattern
    /// occurring; already-buffered bytes are left in place in that case.
    /// Equivalent to [`read_until_with`] with no starting offset, no limit,
    /// and the pattern chomped off the result.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    ///
    /// [`read_until_with`]: Stream::read_until_with
    pub fn read_until(&mut self, pattern: &[u8]) -> io::Result<Option<Bytes>> {
        self.read_until_with(pattern, 0, None, true)
    }

    /// Reads up to the first occurrence of `pattern`, with full control.
    ///
    /// The search starts at byte `offset` into the buffered data. If `limit`
    /// is given and `limit` bytes are scanned without a match (or the match
    /// begins at or beyond the limit), returns `None` without consuming.
    /// With `chomp` the pattern is consumed but excluded from the result;
    /// without it the result includes the pattern.
    ///
    /// The search never re-scans fully checked bytes across fills, but
    /// always re-includes the last `pattern.len() - 1` bytes, so a pattern
    /// split across two transport fills is still found.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    pub fn read_until_with(
        &mut self,
        pattern: &[u8],
        offset: usize,
        limit: Option<usize>,
        chomp: bool,
    ) -> io::Result<Option<Bytes>> {
        assert!(!pattern.is_empty(), "pattern must not be empty");
        self.check_read_open()?;

        let Some(index) = self.index_of(pattern, offset, limit)? else {
            return Ok(None);
        };
        if let Some(limit) = limit {
            if index >= limit {
                return Ok(None);
            }
        }

        let mut matched = self.read_buffer.take_prefix(index + pattern.len());
        matched.truncate(index + if chomp { 0 } else { pattern.len() });
        Ok(Some(matched))
    }

    /// Discards input up to and including the first occurrence of `pattern`,
    /// returning the discarded prefix.
    ///
    /// Uses the same sliding-window search as [`read_until`]. If the pattern
    /// never occurs (or `limit` bytes are scanned without a match), all
    /// unmatched buffered bytes are discarded and `None` is returned.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` is empty.
    ///
    /// [`read_until`]: Stream::read_until
    pub fn discard_until(
        &mut self,
        pattern: &[u8],
        limit: Option<usize>,
    ) -> io::Result<Option<Bytes>> {
        assert!(!pattern.is_empty(), "pattern must not be empty");
        self.check_read_open()?;

        match self.index_of(pattern, 0, limit)? {
            Some(index) if limit.map_or(true, |limit| index < limit) => {
                Ok(Some(self.read_buffer.take_prefix(index + pattern.len())))
            }
            _ => {
                self.read_buffer.clear();
                Ok(None)
            }
        }
    }

    /// Line-oriented read up to `separator`.
    ///
    /// Unlike [`read_until`], reaching end-of-data without the separator
    /// returns the residual buffered bytes rather than `None`, and reaching
    /// `limit` returns the first `limit` bytes rather than `None`. Without
    /// `chomp` the separator is included in the result.
    ///
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    ///
    /// [`read_until`]: Stream::read_until
    pub fn gets(
        &mut self,
        separator: &[u8],
        limit: Option<usize>,
        chomp: bool,
    ) -> io::Result<Option<Bytes>> {
        assert!(!separator.is_empty(), "separator must not be empty");
        self.check_read_open()?;

        // We don't want to split in the middle of the separator, so the
        // next scan backs up by its length less one.
        let split_offset = separator.len() - 1;
        let mut offset = 0;

        let index = loop {
            if let Some(index) = self.read_buffer.index_of(separator, offset) {
                break index;
            }
            offset = self.read_buffer.len().saturating_sub(split_offset);

            if let Some(limit) = limit {
                if offset >= limit {
                    // No separator inside the limit, so nothing to chomp
                    // either.
                    return Ok(self.consume_read_buffer(Some(limit)));
                }
            }
            if !self.fill_read_buffer(self.config.minimum_read_size)? {
                return Ok(self.consume_read_buffer(None));
            }
        };

        if let Some(limit) = limit {
            if index >= limit {
                return Ok(self.consume_read_buffer(Some(limit)));
            }
        }

        let mut line = self.read_buffer.take_prefix(index + separator.len());
        line.truncate(index + if chomp { 0 } else { separator.len() });
        Ok(Some(line))
    }

    /// Reads one newline-terminated line, including the newline.
    pub fn read_line(&mut self) -> io::Result<Option<Bytes>> {
        self.gets(b"\n", None, false)
    }

    /// Returns a view of the next `size` bytes without consuming them.
    ///
    /// Fills from the transport until `size` bytes are buffered or the
    /// stream is done; the view may be shorter than `size` in the latter
    /// case. Peeking never advances the stream: a subsequent read returns
    /// the same bytes.
    pub fn peek(&mut self, size: usize) -> io::Result<&[u8]> {
        self.check_read_open()?;

        while !self.done && self.read_buffer.len() < size {
            let read_size = (size - self.read_buffer.len()).max(self.config.minimum_read_size);
            self.fill_read_buffer(read_size)?;
        }

        let available = size.min(self.read_buffer.len());
        Ok(&self.read_buffer.as_slice()[..available])
    }

    /// Fills until `predicate` is satisfied over the buffered bytes or the
    /// stream is done, then returns a view of everything buffered.
    ///
    /// A predicate that is never satisfied peeks the entire remaining
    /// stream. Nothing is consumed.
    pub fn peek_until<F>(&mut self, mut predicate: F) -> io::Result<&[u8]>
    where
        F: FnMut(&[u8]) -> bool,
    {
        self.check_read_open()?;

        while !self.done && !predicate(self.read_buffer.as_slice()) {
            self.fill_read_buffer(self.config.minimum_read_size)?;
        }

        Ok(self.read_buffer.as_slice())
    }

    /// Whether the stream has consumed all available data.
    ///
    /// May perform one fill to find out, and therefore may wait for the
    /// transport. See [`readable`] for a non-blocking hint.
    ///
    /// [`readable`]: Stream::readable
    pub fn is_done(&mut self) -> io::Result<bool> {
        if !self.read_buffer.is_empty() {
            return Ok(false);
        }
        if self.done {
            return Ok(true);
        }
        Ok(!self.fill_read_buffer(self.config.minimum_read_size)?)
    }

    /// Forces the terminal read state, discarding any buffered bytes.
    ///
    /// Subsequent reads observe end-of-data without touching the transport.
    pub fn mark_done(&mut self) {
        self.read_buffer.clear();
        self.done = true;
    }

    /// Whether a read operation has a chance of succeeding.
    ///
    /// Non-blocking: consults only the buffer, the terminal flag, and the
    /// transport's readiness hint. May return a false positive, but not a
    /// false negative.
    ///
    /// Once the stream is done this reports `false` even when residual
    /// buffered bytes remain consumable; it answers whether more input can
    /// arrive, not whether a read would return bytes.
    #[must_use]
    pub fn readable(&self) -> bool {
        if self.done {
            return false;
        }
        if !self.read_buffer.is_empty() {
            return true;
        }
        !self.read_closed && self.transport.readable_hint()
    }

    /// Searches for `pattern` starting at `offset`, filling as needed.
    ///
    /// After each unsuccessful scan the next search resumes at
    /// `buffered_length - (pattern_length - 1)`, clamped to zero: fully
    /// checked bytes are not re-scanned, but the window overlaps enough to
    /// catch a pattern split across fills.
    fn index_of(
        &mut self,
        pattern: &[u8],
        mut offset: usize,
        limit: Option<usize>,
    ) -> io::Result<Option<usize>> {
        let split_offset = pattern.len() - 1;

        loop {
            if let Some(index) = self.read_buffer.index_of(pattern, offset) {
                return Ok(Some(index));
            }

            offset = self.read_buffer.len().saturating_sub(split_offset);

            if let Some(limit) = limit {
                if offset >= limit {
                    return Ok(None);
                }
            }
            if !self.fill_read_buffer(self.config.minimum_read_size)? {
                return Ok(None);
            }
        }
    }

    /// One fill from the transport.
    ///
    /// Requests at most `maximum_read_size` bytes. Pending writes are
    /// flushed first, tying the two directions together so a
    /// request-then-response protocol cannot deadlock waiting on its own
    /// unflushed request. Returns `false` once the transport reports
    /// end-of-data; that transition is terminal. On error the read buffer is
    /// left exactly as it was.
    pub(crate) fn fill_read_buffer(&mut self, size: usize) -> io::Result<bool> {
        let size = size.min(self.config.maximum_read_size);

        self.flush()?;

        if self.transport.sys_read(size, self.read_buffer.as_mut())? == 0 {
            self.done = true;
            Ok(false)
        } else {
            Ok(true)
        }
    }

    /// Consumes at most `size` bytes from the buffer, or all of it with
    /// `None`. Returns `None` only at end-of-data with nothing buffered.
    fn consume_read_buffer(&mut self, size: Option<usize>) -> Option<Bytes> {
        if self.done && self.read_buffer.is_empty() {
            return None;
        }

        match size {
            Some(size) if size < self.read_buffer.len() => {
                Some(self.read_buffer.take_prefix(size))
            }
            _ => Some(self.read_buffer.take_all()),
        }
    }

    fn check_read_open(&self) -> io::Result<()> {
        if self.read_closed {
            Err(error::closed_for_reading())
        } else {
            Ok(())
        }
    }
}
