//! Buffered, byte-precise I/O streams over pluggable transports.
//!
//! A [`Stream`] sits between an application and a raw byte transport, such
//! as a file, a stream socket, or anything else implementing [`Transport`].
//! It coalesces small reads and writes into large fixed-size blocks while
//! exposing the byte-exact operations protocol parsers need: exact-length
//! reads, delimiter-based line and token reads, peeking, and discarding.
//!
//! For a starting point, wrap a transport from [`transports`] in a
//! [`Stream`]:
//!
//! ```no_run
//! use buf_streams::transports::TcpTransport;
//! use buf_streams::Stream;
//!
//! fn main() -> std::io::Result<()> {
//!     let mut stream = Stream::new(TcpTransport::connect("example.com:7")?);
//!     stream.write_all(b"hello\n")?;
//!     let reply = stream.read_line()?;
//!     # let _ = reply;
//!     Ok(())
//! }
//! ```
//!
//! End-of-data is reported through return values (`Ok(None)` or a short
//! result), not errors; see [`Stream::read_exactly`] for the strict variant.
//! Delimiter searches use a sliding window, so a pattern split across two
//! transport fills is still found exactly once.

#![deny(missing_docs)]

mod buffer;
mod config;
mod error;
mod read;
mod stream;
mod transport;
pub mod transports;
mod write;

pub use buffer::ByteBuffer;
pub use config::{Config, BLOCK_SIZE, MAXIMUM_READ_SIZE};
pub use error::ShortRead;
pub use stream::Stream;
pub use transport::Transport;
