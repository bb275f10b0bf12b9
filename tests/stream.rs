//! Contract tests for `Stream` over a scripted in-memory transport.
//!
//! The scripted transport delivers a fixed sequence of chunks, one per fill,
//! and records every call, so tests can assert not just what a stream
//! returns but how many transport operations it performed.

use buf_streams::{Config, ShortRead, Stream, Transport};
use bytes::BytesMut;
use std::collections::VecDeque;
use std::io;

#[derive(Default)]
struct Scripted {
    chunks: VecDeque<Vec<u8>>,
    written: Vec<u8>,
    read_calls: usize,
    read_sizes: Vec<usize>,
    write_calls: usize,
    fail_writes: Option<io::ErrorKind>,
    closed: bool,
}

impl Scripted {
    fn new<'a, I: IntoIterator<Item = &'a [u8]>>(chunks: I) -> Self {
        Self {
            chunks: chunks.into_iter().map(<[u8]>::to_vec).collect(),
            ..Self::default()
        }
    }

    fn empty() -> Self {
        Self::default()
    }
}

impl Transport for Scripted {
    fn sys_read(&mut self, size: usize, buf: &mut BytesMut) -> io::Result<usize> {
        self.read_calls += 1;
        self.read_sizes.push(size);
        while let Some(chunk) = self.chunks.pop_front() {
            if chunk.is_empty() {
                continue;
            }
            let n = chunk.len().min(size);
            buf.extend_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk[n..].to_vec());
            }
            return Ok(n);
        }
        Ok(0)
    }

    fn sys_write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write_calls += 1;
        if let Some(kind) = self.fail_writes {
            return Err(io::Error::new(kind, "scripted write failure"));
        }
        self.written.extend_from_slice(buf);
        Ok(())
    }

    fn sys_close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

fn small_config() -> Config {
    Config {
        minimum_read_size: 8,
        maximum_read_size: 64,
        minimum_write_size: 8,
    }
}

#[test]
fn read_zero_performs_no_io() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::empty());

    assert_eq!(stream.read(0)?.as_deref(), Some(&b""[..]));
    assert_eq!(stream.read_partial(Some(0))?.as_deref(), Some(&b""[..]));
    assert_eq!(stream.get_ref().read_calls, 0);

    // Still an empty result at end-of-data.
    assert_eq!(stream.read_to_end()?, None);
    assert_eq!(stream.read(0)?.as_deref(), Some(&b""[..]));
    Ok(())
}

#[test]
fn reads_everything() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hello World"[..]]));

    assert_eq!(stream.read_to_end()?.as_deref(), Some(&b"Hello World"[..]));
    assert!(stream.is_done()?);
    // One fill for the data, one for end-of-data.
    assert_eq!(stream.get_ref().read_calls, 2);
    Ok(())
}

#[test]
fn read_blocks_until_exact_length() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hell"[..], b"o World"]));

    assert_eq!(stream.read(11)?.as_deref(), Some(&b"Hello World"[..]));
    assert_eq!(stream.get_ref().read_calls, 2);
    Ok(())
}

#[test]
fn read_returns_remainder_at_end_of_data() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"abc"[..]]));

    assert_eq!(stream.read(10)?.as_deref(), Some(&b"abc"[..]));
    assert_eq!(stream.read(10)?, None);
    Ok(())
}

#[test]
fn read_partial_fills_at_most_once() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hello World!Hello World!"[..]]));

    assert_eq!(
        stream.read_partial(Some(12))?.as_deref(),
        Some(&b"Hello World!"[..])
    );
    assert_eq!(
        stream.read_partial(Some(12))?.as_deref(),
        Some(&b"Hello World!"[..])
    );
    assert_eq!(stream.get_ref().read_calls, 1);

    assert_eq!(stream.read_partial(None)?, None);
    Ok(())
}

#[test]
fn read_partial_never_waits_for_size() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hell"[..], b"o World"]));

    assert_eq!(stream.read_partial(Some(20))?.as_deref(), Some(&b"Hell"[..]));
    assert_eq!(
        stream.read_partial(Some(20))?.as_deref(),
        Some(&b"o World"[..])
    );
    Ok(())
}

#[test]
fn fills_request_at_least_minimum_and_at_most_maximum() -> anyhow::Result<()> {
    let mut stream = Stream::with_config(
        Scripted::new([&b"x"[..], b"y"]),
        Config {
            minimum_read_size: 8,
            maximum_read_size: 16,
            minimum_write_size: 8,
        },
    );

    // A 1-byte request is raised to the minimum.
    assert_eq!(stream.read(1)?.as_deref(), Some(&b"x"[..]));
    assert_eq!(stream.get_ref().read_sizes[0], 8);

    // A huge request is clamped to the maximum.
    let _ = stream.read(1000)?;
    assert!(stream.get_ref().read_sizes[1..].iter().all(|&size| size <= 16));
    Ok(())
}

#[test]
fn peek_does_not_consume() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hello World"[..]]));

    assert_eq!(stream.peek(4)?, b"Hell");
    assert_eq!(stream.peek(4)?, b"Hell");
    assert_eq!(stream.get_ref().read_calls, 1);

    assert_eq!(
        stream.read_partial(None)?.as_deref(),
        Some(&b"Hello World"[..])
    );
    Ok(())
}

#[test]
fn peek_truncates_at_end_of_data() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hello World"[..]]));

    assert_eq!(stream.peek(400)?, b"Hello World");
    assert_eq!(
        stream.read_partial(Some(400))?.as_deref(),
        Some(&b"Hello World"[..])
    );
    assert!(stream.is_done()?);
    Ok(())
}

#[test]
fn peek_until_fills_to_predicate() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"ab"[..], b"cd", b"ef"]));

    assert_eq!(stream.peek_until(|bytes| bytes.len() >= 3)?, b"abcd");
    // An unsatisfiable predicate peeks the whole stream.
    assert_eq!(stream.peek_until(|_| false)?, b"abcdef");
    assert_eq!(stream.read_to_end()?.as_deref(), Some(&b"abcdef"[..]));
    Ok(())
}

#[test]
fn read_until_iterates_lines() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"a\nb\n"[..]]));

    assert_eq!(stream.read_until(b"\n")?.as_deref(), Some(&b"a"[..]));
    assert_eq!(stream.read_until(b"\n")?.as_deref(), Some(&b"b"[..]));
    assert_eq!(stream.read_until(b"\n")?, None);
    Ok(())
}

#[test]
fn read_until_without_chomp_keeps_pattern() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"a\nb\n"[..]]));

    assert_eq!(
        stream.read_until_with(b"\n", 0, None, false)?.as_deref(),
        Some(&b"a\n"[..])
    );
    assert_eq!(
        stream.read_until_with(b"\n", 0, None, false)?.as_deref(),
        Some(&b"b\n"[..])
    );
    assert_eq!(stream.read_until_with(b"\n", 0, None, false)?, None);
    Ok(())
}

#[test]
fn read_until_with_one_byte_fills() -> anyhow::Result<()> {
    // Every fill delivers a single byte, so the multi-byte pattern always
    // spans fills.
    let chunks: Vec<Vec<u8>> = b"hello\r\nworld\r\n".iter().map(|&b| vec![b]).collect();
    let mut stream = Stream::with_config(
        Scripted::new(chunks.iter().map(Vec::as_slice)),
        small_config(),
    );

    assert_eq!(stream.read_until(b"\r\n")?.as_deref(), Some(&b"hello"[..]));
    assert_eq!(stream.read_until(b"\r\n")?.as_deref(), Some(&b"world"[..]));
    assert_eq!(stream.read_until(b"\r\n")?, None);
    Ok(())
}

#[test]
fn read_until_finds_pattern_split_at_every_offset() -> anyhow::Result<()> {
    let input = b"aaXYZbb";
    for split in 0..=input.len() {
        let (head, tail) = input.split_at(split);
        let mut stream = Stream::with_config(Scripted::new([head, tail]), small_config());

        assert_eq!(stream.read_until(b"XYZ")?.as_deref(), Some(&b"aa"[..]));
        assert_eq!(stream.read_to_end()?.as_deref(), Some(&b"bb"[..]));
    }
    Ok(())
}

#[test]
fn read_until_respects_limit() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"hello\nworld\n"[..]]));

    // The pattern first occurs at index 5, beyond the limit.
    assert_eq!(stream.read_until_with(b"\n", 0, Some(3), true)?, None);
    // Nothing was consumed; an unlimited search still succeeds.
    assert_eq!(stream.read_until(b"\n")?.as_deref(), Some(&b"hello"[..]));
    Ok(())
}

#[test]
fn discard_until_returns_discarded_prefix() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"hello\nworld"[..]]));

    assert_eq!(
        stream.discard_until(b"\n", None)?.as_deref(),
        Some(&b"hello\n"[..])
    );
    assert_eq!(stream.read_to_end()?.as_deref(), Some(&b"world"[..]));
    Ok(())
}

#[test]
fn discard_until_without_match_discards_everything() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"hello world"[..]]));

    assert_eq!(stream.discard_until(b"\n", None)?, None);
    assert_eq!(stream.read_to_end()?, None);
    assert!(stream.is_done()?);
    Ok(())
}

#[test]
fn gets_returns_residual_at_end_of_data() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"partial"[..]]));

    assert_eq!(stream.gets(b"\n", None, false)?.as_deref(), Some(&b"partial"[..]));
    assert_eq!(stream.gets(b"\n", None, false)?, None);
    Ok(())
}

#[test]
fn gets_truncates_at_limit() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"hello\nworld\n"[..]]));

    assert_eq!(stream.gets(b"\n", Some(3), false)?.as_deref(), Some(&b"hel"[..]));
    // The remainder of the first line is still there.
    assert_eq!(stream.gets(b"\n", None, true)?.as_deref(), Some(&b"lo"[..]));
    assert_eq!(stream.gets(b"\n", None, true)?.as_deref(), Some(&b"world"[..]));
    Ok(())
}

#[test]
fn read_line_includes_newline() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"one\ntwo\n"[..]]));

    assert_eq!(stream.read_line()?.as_deref(), Some(&b"one\n"[..]));
    assert_eq!(stream.read_line()?.as_deref(), Some(&b"two\n"[..]));
    assert_eq!(stream.read_line()?, None);
    Ok(())
}

#[test]
fn read_exactly_reports_short_reads() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"abc"[..]]));

    let error = stream.read_exactly(4).unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);

    // The partial bytes remain inspectable through the error payload.
    let short = error
        .get_ref()
        .and_then(|source| source.downcast_ref::<ShortRead>())
        .expect("expected a ShortRead payload");
    assert_eq!(short.bytes(), b"abc");
    assert_eq!(short.expected(), 4);
    Ok(())
}

#[test]
fn read_exactly_succeeds_on_exact_data() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hello World"[..]]));

    assert_eq!(&stream.read_exactly(4)?[..], b"Hell");
    assert_eq!(&stream.read_exactly(7)?[..], b"o World");
    Ok(())
}

#[test]
fn write_buffers_below_threshold() -> anyhow::Result<()> {
    let mut stream = Stream::with_config(Scripted::empty(), small_config());

    assert_eq!(stream.write(b"hi")?, 2);
    assert_eq!(stream.get_ref().write_calls, 0);

    stream.flush()?;
    assert_eq!(stream.get_ref().write_calls, 1);
    assert_eq!(stream.get_ref().written, b"hi");
    Ok(())
}

#[test]
fn write_drains_at_threshold() -> anyhow::Result<()> {
    let mut stream = Stream::with_config(Scripted::empty(), small_config());

    // minimum_write_size is 8; the eighth byte triggers the drain.
    for _ in 0..8 {
        stream.write(b"!")?;
    }
    assert_eq!(stream.get_ref().write_calls, 1);
    assert_eq!(stream.get_ref().written, b"!!!!!!!!");
    Ok(())
}

#[test]
fn flush_is_a_no_op_when_empty() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::empty());

    stream.flush()?;
    assert_eq!(stream.get_ref().write_calls, 0);
    Ok(())
}

#[test]
fn puts_batches_lines_and_drains_once() -> anyhow::Result<()> {
    let mut stream = Stream::with_config(Scripted::empty(), small_config());

    stream.puts([&b"Hello"[..], b"World"])?;
    assert_eq!(stream.get_ref().write_calls, 1);
    assert_eq!(stream.get_ref().written, b"Hello\nWorld\n");

    stream.puts::<_, &[u8]>([])?;
    assert_eq!(stream.get_ref().write_calls, 1);
    Ok(())
}

#[test]
fn puts_with_uses_a_custom_separator() -> anyhow::Result<()> {
    let mut stream = Stream::with_config(Scripted::empty(), small_config());

    stream.puts_with([&b"Hello"[..], b"World"], b"\r\n")?;
    assert_eq!(stream.get_ref().write_calls, 1);
    assert_eq!(stream.get_ref().written, b"Hello\r\nWorld\r\n");
    Ok(())
}

#[test]
fn failed_drain_empties_the_buffer() -> anyhow::Result<()> {
    let mut transport = Scripted::empty();
    transport.fail_writes = Some(io::ErrorKind::BrokenPipe);
    let mut stream = Stream::new(transport);

    stream.write(b"doomed")?;
    let error = stream.flush().unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);

    // The unsent bytes are gone: a second flush has nothing to retry.
    stream.flush()?;
    assert_eq!(stream.get_ref().write_calls, 1);
    Ok(())
}

#[test]
fn fill_flushes_pending_writes_first() -> anyhow::Result<()> {
    let mut stream = Stream::with_config(Scripted::new([&b"pong"[..]]), small_config());

    stream.write(b"ping")?;
    assert_eq!(stream.get_ref().write_calls, 0);

    // The read forces the buffered request onto the wire first.
    assert_eq!(stream.read(4)?.as_deref(), Some(&b"pong"[..]));
    assert_eq!(stream.get_ref().written, b"ping");
    Ok(())
}

#[test]
fn close_is_idempotent() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::empty());

    stream.close();
    assert!(stream.is_closed());
    stream.close();
    assert!(stream.is_closed());
    Ok(())
}

#[test]
fn close_swallows_flush_failures() -> anyhow::Result<()> {
    let mut transport = Scripted::empty();
    transport.fail_writes = Some(io::ErrorKind::BrokenPipe);
    let mut stream = Stream::new(transport);

    stream.write(b".")?;
    stream.close();
    assert!(stream.is_closed());
    Ok(())
}

#[test]
fn close_read_fails_subsequent_reads() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"data"[..]]));

    stream.close_read()?;
    let error = stream.read(4).unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::NotConnected);

    // The write direction is unaffected.
    stream.write_all(b"still writable")?;
    assert_eq!(stream.get_ref().written, b"still writable");
    Ok(())
}

#[test]
fn close_write_flushes_and_fails_subsequent_writes() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"reply"[..]]));

    stream.write(b"request")?;
    stream.close_write()?;
    assert_eq!(stream.get_ref().written, b"request");

    let error = stream.write(b"more").unwrap_err();
    assert_eq!(error.kind(), io::ErrorKind::NotConnected);

    // The read direction is unaffected.
    assert_eq!(stream.read(5)?.as_deref(), Some(&b"reply"[..]));
    Ok(())
}

#[test]
fn mark_done_discards_and_terminates() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"buffered"[..]]));

    assert_eq!(stream.peek(8)?, b"buffered");
    stream.mark_done();

    let calls = stream.get_ref().read_calls;
    assert_eq!(stream.read_to_end()?, None);
    // No further transport reads were attempted.
    assert_eq!(stream.get_ref().read_calls, calls);
    Ok(())
}

#[test]
fn readable_reflects_buffer_and_terminal_state() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"Hello, World!"[..]]));

    assert!(stream.readable());
    assert_eq!(stream.read_to_end()?.as_deref(), Some(&b"Hello, World!"[..]));
    assert!(!stream.readable());
    Ok(())
}

#[test]
fn readable_is_false_with_residual_bytes_after_end_of_data() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"tail"[..]]));

    // The long peek discovers end-of-data while bytes are still buffered.
    assert_eq!(stream.peek(100)?, b"tail");

    // No more input can arrive, even though a read would still return bytes.
    assert!(!stream.readable());
    assert_eq!(stream.read(4)?.as_deref(), Some(&b"tail"[..]));
    Ok(())
}

#[test]
fn is_done_performs_at_most_one_fill() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"x"[..]]));

    assert!(!stream.is_done()?);
    assert_eq!(stream.get_ref().read_calls, 1);
    assert_eq!(stream.read_partial(None)?.as_deref(), Some(&b"x"[..]));
    assert!(stream.is_done()?);
    Ok(())
}

#[test]
fn residual_bytes_survive_end_of_data() -> anyhow::Result<()> {
    let mut stream = Stream::new(Scripted::new([&b"tail"[..]]));

    // Learn about end-of-data while bytes are still buffered.
    assert_eq!(stream.peek(100)?, b"tail");
    assert!(!stream.is_done()?);

    assert_eq!(stream.read(4)?.as_deref(), Some(&b"tail"[..]));
    assert!(stream.is_done()?);
    Ok(())
}
