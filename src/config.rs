use std::env;

/// The default block size for stream buffers: 64 KiB, a typical pipe buffer
/// size.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// The default maximum size for a single transport read: 8 MiB.
///
/// This limit exists because very large reads cause memory pressure and poor
/// interactive performance, and most socket buffers and pipe capacities are
/// far smaller anyway. It is a multiple of [`BLOCK_SIZE`] so reads can
/// proceed in whole blocks without exceeding the maximum.
pub const MAXIMUM_READ_SIZE: usize = BLOCK_SIZE * 128;

/// Sizing configuration for a [`Stream`], fixed at construction.
///
/// These bound the block size requested from the transport per fill: a fill
/// never requests less than `minimum_read_size` (avoiding syscall thrashing
/// on small reads) and never more than `maximum_read_size` (bounding per-call
/// latency and memory).
///
/// [`Stream`]: crate::Stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// The smallest size a transport fill will request.
    pub minimum_read_size: usize,
    /// The largest size a single transport fill may request.
    pub maximum_read_size: usize,
    /// The write-buffer occupancy at which `write` drains automatically.
    pub minimum_write_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minimum_read_size: BLOCK_SIZE,
            maximum_read_size: MAXIMUM_READ_SIZE,
            minimum_write_size: BLOCK_SIZE,
        }
    }
}

impl Config {
    /// Builds a configuration from the process environment, falling back to
    /// the documented defaults.
    ///
    /// Recognized variables: `BUF_STREAMS_MINIMUM_READ_SIZE`,
    /// `BUF_STREAMS_MAXIMUM_READ_SIZE`, and
    /// `BUF_STREAMS_MINIMUM_WRITE_SIZE`, each a byte count. Values that are
    /// missing or unparseable fall back to the default. The environment is
    /// consulted only when this constructor is called; there is no
    /// process-wide mutable state.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            minimum_read_size: env_size("BUF_STREAMS_MINIMUM_READ_SIZE")
                .unwrap_or(defaults.minimum_read_size),
            maximum_read_size: env_size("BUF_STREAMS_MAXIMUM_READ_SIZE")
                .unwrap_or(defaults.maximum_read_size),
            minimum_write_size: env_size("BUF_STREAMS_MINIMUM_WRITE_SIZE")
                .unwrap_or(defaults.minimum_write_size),
        }
    }
}

fn env_size(name: &str) -> Option<usize> {
    env::var(name).ok()?.parse().ok()
}
