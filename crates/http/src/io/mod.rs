//! Body stream abstractions.
//!
//! A message body is an [`InputStream`] shared through `Arc`: the message holds one
//! reference while the stream is attached, and callers (for example a retry loop that
//! re-sends the same body) may hold others.
//!
//! - [`InputStream`]: the stream interface the engine reads bodies through
//! - [`StreamAdapter`]: wraps any generic `Read + Seek` byte stream into an [`InputStream`]
//! - [`StreamBody`]: exposes an attached stream as an `http_body::Body` for transports

mod adapter;
pub use adapter::StreamAdapter;

mod body;
pub use body::StreamBody;

use std::fmt;
use std::io;
use std::io::{Read, Seek};
use std::sync::{Arc, Mutex};

use bytes::BytesMut;

/// Default size of a body chunk read by [`StreamBody`].
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Reference point of [`InputStream::seek`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SeekBasis {
    /// Offset from the start of the stream, must be non-negative
    Begin,
    /// Offset from the end of the stream, must be non-positive
    End,
}

/// Snapshot of a stream's state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StreamStatus {
    pub is_valid: bool,
    pub is_end_of_stream: bool,
}

/// A readable, seekable body stream the engine can pull bytes from.
///
/// Streams are shared, so every method takes `&self`; implementations synchronize their own
/// state.
pub trait InputStream: Send + Sync + fmt::Debug {
    /// Whether the stream is usable. An invalid stream is never installed into a message.
    fn is_valid(&self) -> bool;

    /// Reads into the spare capacity of `dst` and returns the number of bytes appended.
    ///
    /// Returns `Ok(0)` at end of stream, or when `dst` has no spare capacity.
    fn read(&self, dst: &mut BytesMut) -> io::Result<usize>;

    fn seek(&self, offset: i64, basis: SeekBasis) -> io::Result<()>;

    fn status(&self) -> StreamStatus;

    /// Total length of the stream in bytes.
    fn length(&self) -> io::Result<u64>;
}

/// A generic byte stream that can be wrapped into an [`InputStream`].
pub trait ByteStream: Read + Seek + Send {}

impl<T: Read + Seek + Send> ByteStream for T {}

/// A generic byte stream shared between the caller and a [`StreamAdapter`].
pub type SharedByteStream = Arc<Mutex<dyn ByteStream>>;

/// Wraps `stream` for use with `Body::Wrap`.
pub fn shared<S: ByteStream + 'static>(stream: S) -> SharedByteStream {
    Arc::new(Mutex::new(stream))
}
