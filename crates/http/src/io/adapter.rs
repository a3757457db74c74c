use std::fmt;
use std::io;
use std::io::{Read, Seek, SeekFrom};
use std::sync::MutexGuard;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::BytesMut;
use tracing::error;

use crate::engine::{Allocation, Allocator, EngineError, ResourceKind};
use crate::io::{ByteStream, InputStream, SeekBasis, SharedByteStream, StreamStatus};

/// Adapts a generic [`ByteStream`] to the [`InputStream`] interface.
///
/// The adapter is invalid from the start if the wrapped stream cannot report its position,
/// and becomes invalid after any read or seek error. Reaching the end of the wrapped stream
/// sets the end-of-stream flag until the next successful seek.
pub struct StreamAdapter {
    stream: SharedByteStream,
    valid: AtomicBool,
    end_of_stream: AtomicBool,
    _allocation: Allocation,
}

impl StreamAdapter {
    /// Wraps `stream`.
    ///
    /// # Errors
    ///
    /// Fails when the allocator refuses the adapter. An adapter over a broken stream is still
    /// returned; check [`InputStream::is_valid`] before using it.
    pub fn new(allocator: &Allocator, stream: SharedByteStream) -> Result<Self, EngineError> {
        let allocation = allocator.allocate(ResourceKind::Adapter)?;

        let valid = match stream.lock() {
            Ok(mut guard) => guard.stream_position().is_ok(),
            Err(_) => false,
        };

        Ok(Self {
            stream,
            valid: AtomicBool::new(valid),
            end_of_stream: AtomicBool::new(false),
            _allocation: allocation,
        })
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, dyn ByteStream + 'static>> {
        self.stream.lock().map_err(|e| {
            self.valid.store(false, Ordering::Release);
            io::Error::other(e.to_string())
        })
    }

    fn invalidate(&self, e: &io::Error, op: &'static str) {
        error!(cause = %e, op, "wrapped stream failed, adapter is no longer valid");
        self.valid.store(false, Ordering::Release);
    }
}

impl InputStream for StreamAdapter {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire) && !self.stream.is_poisoned()
    }

    fn read(&self, dst: &mut BytesMut) -> io::Result<usize> {
        if !self.is_valid() {
            return Err(io::Error::other("stream adapter is invalid"));
        }

        let spare = dst.capacity() - dst.len();
        if spare == 0 {
            return Ok(0);
        }

        let mut stream = self.lock()?;
        let start = dst.len();
        dst.resize(start + spare, 0);

        let result = loop {
            match stream.read(&mut dst[start..]) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => break other,
            }
        };

        match result {
            Ok(n) => {
                dst.truncate(start + n);
                if n == 0 {
                    self.end_of_stream.store(true, Ordering::Release);
                }
                Ok(n)
            }
            Err(e) => {
                dst.truncate(start);
                self.invalidate(&e, "read");
                Err(e)
            }
        }
    }

    fn seek(&self, offset: i64, basis: SeekBasis) -> io::Result<()> {
        let from = match basis {
            SeekBasis::Begin => u64::try_from(offset).map(SeekFrom::Start).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("negative offset from stream start: {e}"))
            })?,
            SeekBasis::End if offset > 0 => {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "positive offset from stream end"));
            }
            SeekBasis::End => SeekFrom::End(offset),
        };

        let mut stream = self.lock()?;
        match stream.seek(from) {
            Ok(_) => {
                self.end_of_stream.store(false, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                self.invalidate(&e, "seek");
                Err(e)
            }
        }
    }

    fn status(&self) -> StreamStatus {
        StreamStatus { is_valid: self.is_valid(), is_end_of_stream: self.end_of_stream.load(Ordering::Acquire) }
    }

    fn length(&self) -> io::Result<u64> {
        let mut stream = self.lock()?;
        let measured = stream.stream_position().and_then(|position| {
            let end = stream.seek(SeekFrom::End(0))?;
            stream.seek(SeekFrom::Start(position))?;
            Ok(end)
        });
        // a failed restore leaves the stream at its end
        measured.inspect_err(|e| self.invalidate(e, "length"))
    }
}

impl fmt::Debug for StreamAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamAdapter").field("status", &self.status()).finish_non_exhaustive()
    }
}
