//! HTTP response message.
//!
//! Responses are always created locally, so an [`HttpResponse`] always owns its handle.

use std::ops::{Deref, DerefMut};

use http::response::Parts;
use http::{Response, StatusCode};
use tracing::debug;

use crate::engine::{Allocator, EngineError, HttpHeader, NativeMessage};
use crate::io::StreamBody;
use crate::protocol::{HttpMessage, MessageError, MessageHandle};

/// An HTTP response.
///
/// Header and body operations come from [`HttpMessage`] through `Deref`.
#[derive(Debug)]
pub struct HttpResponse {
    message: HttpMessage<'static>,
}

impl HttpResponse {
    /// Creates a response with a fresh handle owned by the returned value.
    ///
    /// # Errors
    ///
    /// Fails when the allocator refuses the handle.
    pub fn new(allocator: &Allocator) -> Result<Self, MessageError> {
        let native = NativeMessage::new_response(allocator)?;
        Ok(Self { message: HttpMessage::new(allocator.clone(), MessageHandle::Owned(native)) })
    }

    /// Creates a response from `http` response parts.
    pub fn from_parts(allocator: &Allocator, parts: &Parts) -> Result<Self, MessageError> {
        let mut response = Self::new(allocator)?;
        response.set_response_code(i32::from(parts.status.as_u16()))?;
        for header in &parts.headers {
            response.add_header(HttpHeader::from(header))?;
        }
        Ok(response)
    }

    /// The status code, `None` until set.
    pub fn response_code(&self) -> Option<i32> {
        self.native().response_status().ok()
    }

    /// Sets the status code. No range check happens here; the engine refuses codes that do
    /// not fit the three-digit status field.
    pub fn set_response_code(&mut self, code: i32) -> Result<(), MessageError> {
        Ok(self.native_mut().set_response_status(code)?)
    }

    /// The status code as a `StatusCode`, `None` when unset or outside `100..=999`.
    pub fn status(&self) -> Option<StatusCode> {
        let code = u16::try_from(self.response_code()?).ok()?;
        StatusCode::from_u16(code).ok()
    }

    /// Builds an `http::Response` for a transport, streaming the installed body.
    ///
    /// # Errors
    ///
    /// Fails when the status code is unset or not a valid HTTP status.
    pub fn to_http(&self) -> Result<Response<StreamBody>, MessageError> {
        let code = self.response_code().ok_or(MessageError::missing_field("response status"))?;
        let code = u16::try_from(code).map_err(|e| {
            debug!(code, cause = %e, "status code does not fit the status line");
            EngineError::InvalidStatus(code)
        })?;

        let mut builder = Response::builder().status(code);
        for header in self.headers() {
            builder = builder.header(header.name(), header.value());
        }

        Ok(builder.body(self.transport_body())?)
    }
}

impl Deref for HttpResponse {
    type Target = HttpMessage<'static>;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl DerefMut for HttpResponse {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}
