//! The engine's message handle.
//!
//! A [`NativeMessage`] owns everything a request or response carries: the ordered header
//! table, the request line fields or the status code, and a single body stream slot. All
//! accessors are index or field based and report failures as [`EngineError`]; the message
//! layer in [`crate::protocol`] decides how those failures surface to callers.

use std::fmt;

use bytes::Bytes;
use http::{Method, Uri};
use tracing::debug;

use crate::engine::header::HeaderEntry;
use crate::engine::{Allocation, Allocator, EngineError, HttpHeader, NativeStream, ResourceKind};
use crate::ensure;

/// Whether a message handle describes a request or a response.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Request => f.write_str("request"),
            MessageKind::Response => f.write_str("response"),
        }
    }
}

/// Request line fields or the response status, depending on the message kind.
#[derive(Debug)]
enum StartLine {
    Request { method: Option<Bytes>, path: Option<Bytes> },
    Response { status: Option<i32> },
}

/// An engine message handle.
///
/// Dropping the handle destroys it, together with whatever stream handle is still installed.
#[derive(Debug)]
pub struct NativeMessage {
    start_line: StartLine,
    headers: Vec<HeaderEntry>,
    body: Option<NativeStream>,
    _allocation: Allocation,
}

impl NativeMessage {
    /// Creates an empty request handle.
    pub fn new_request(allocator: &Allocator) -> Result<Self, EngineError> {
        Self::new(allocator, StartLine::Request { method: None, path: None })
    }

    /// Creates an empty response handle.
    pub fn new_response(allocator: &Allocator) -> Result<Self, EngineError> {
        Self::new(allocator, StartLine::Response { status: None })
    }

    fn new(allocator: &Allocator, start_line: StartLine) -> Result<Self, EngineError> {
        let allocation = allocator.allocate(ResourceKind::Message)?;
        Ok(Self { start_line, headers: Vec::new(), body: None, _allocation: allocation })
    }

    pub fn kind(&self) -> MessageKind {
        match self.start_line {
            StartLine::Request { .. } => MessageKind::Request,
            StartLine::Response { .. } => MessageKind::Response,
        }
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn header(&self, index: usize) -> Result<HttpHeader<'_>, EngineError> {
        self.headers
            .get(index)
            .map(HeaderEntry::as_header)
            .ok_or(EngineError::HeaderIndexOutOfRange { index, count: self.headers.len() })
    }

    pub fn headers(&self) -> impl ExactSizeIterator<Item = HttpHeader<'_>> {
        self.headers.iter().map(HeaderEntry::as_header)
    }

    /// Appends a copy of `header` to the header table.
    pub fn add_header(&mut self, header: HttpHeader<'_>) -> Result<(), EngineError> {
        let entry = HeaderEntry::copy_from(header)
            .inspect_err(|e| debug!(header = ?header, cause = %e, "header rejected"))?;
        self.headers.push(entry);
        Ok(())
    }

    /// Removes the header at `index`, shifting later headers down by one.
    pub fn erase_header(&mut self, index: usize) -> Result<(), EngineError> {
        let count = self.headers.len();
        ensure!(index < count, EngineError::HeaderIndexOutOfRange { index, count });
        self.headers.remove(index);
        Ok(())
    }

    pub fn request_method(&self) -> Result<&[u8], EngineError> {
        match &self.start_line {
            StartLine::Request { method, .. } => method.as_deref().ok_or(EngineError::field_not_set("request method")),
            StartLine::Response { .. } => Err(EngineError::WrongMessageKind { expected: MessageKind::Request }),
        }
    }

    /// Sets the request method. The method must be an HTTP token.
    pub fn set_request_method(&mut self, method: &[u8]) -> Result<(), EngineError> {
        let StartLine::Request { method: slot, .. } = &mut self.start_line else {
            return Err(EngineError::WrongMessageKind { expected: MessageKind::Request });
        };

        if Method::from_bytes(method).is_err() {
            debug!(method = %String::from_utf8_lossy(method), "request method rejected");
            return Err(EngineError::InvalidMethod);
        }

        *slot = Some(Bytes::copy_from_slice(method));
        Ok(())
    }

    pub fn request_path(&self) -> Result<&[u8], EngineError> {
        match &self.start_line {
            StartLine::Request { path, .. } => path.as_deref().ok_or(EngineError::field_not_set("request path")),
            StartLine::Response { .. } => Err(EngineError::WrongMessageKind { expected: MessageKind::Request }),
        }
    }

    /// Sets the request target.
    ///
    /// Origin form (`/index?a=1`), absolute form, authority form (`host:443`) and the
    /// asterisk form are accepted. An empty target is rejected.
    pub fn set_request_path(&mut self, path: &[u8]) -> Result<(), EngineError> {
        let StartLine::Request { path: slot, .. } = &mut self.start_line else {
            return Err(EngineError::WrongMessageKind { expected: MessageKind::Request });
        };

        if let Err(e) = Uri::try_from(path) {
            debug!(path = %String::from_utf8_lossy(path), cause = %e, "request path rejected");
            return Err(EngineError::invalid_path(e));
        }

        *slot = Some(Bytes::copy_from_slice(path));
        Ok(())
    }

    pub fn response_status(&self) -> Result<i32, EngineError> {
        match self.start_line {
            StartLine::Response { status } => status.ok_or(EngineError::field_not_set("response status")),
            StartLine::Request { .. } => Err(EngineError::WrongMessageKind { expected: MessageKind::Response }),
        }
    }

    /// Sets the response status. The status line carries three digits, so only `0..=999`
    /// is representable.
    pub fn set_response_status(&mut self, status: i32) -> Result<(), EngineError> {
        let StartLine::Response { status: slot } = &mut self.start_line else {
            return Err(EngineError::WrongMessageKind { expected: MessageKind::Response });
        };

        if !(0..=999).contains(&status) {
            debug!(status, "response status rejected");
            return Err(EngineError::InvalidStatus(status));
        }

        *slot = Some(status);
        Ok(())
    }

    /// The installed body stream handle, if any.
    pub fn body_stream(&self) -> Option<&NativeStream> {
        self.body.as_ref()
    }

    /// Installs `stream` into the body slot and hands back the displaced handle.
    ///
    /// The slot holds at most one handle. The caller owns the returned one and is
    /// responsible for destroying it.
    #[must_use = "the displaced stream handle must be destroyed by the caller"]
    pub fn set_body_stream(&mut self, stream: Option<NativeStream>) -> Option<NativeStream> {
        std::mem::replace(&mut self.body, stream)
    }
}
