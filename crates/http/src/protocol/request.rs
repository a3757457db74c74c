//! HTTP request message.
//!
//! An [`HttpRequest`] is an [`HttpMessage`] over a request handle, adding the method and
//! path of the request line. Requests are either created here (owning) or wrap a handle a
//! transport supplies for an inbound request (borrowing).

use std::ops::{Deref, DerefMut};

use http::request::Parts;
use http::Request;

use crate::engine::{Allocator, HttpHeader, NativeMessage};
use crate::io::StreamBody;
use crate::protocol::{HttpMessage, MessageError, MessageHandle};

/// An HTTP request.
///
/// Header and body operations come from [`HttpMessage`] through `Deref`.
#[derive(Debug)]
pub struct HttpRequest<'a> {
    message: HttpMessage<'a>,
}

impl HttpRequest<'static> {
    /// Creates a request with a fresh handle owned by the returned value.
    ///
    /// # Errors
    ///
    /// Fails when the allocator refuses the handle.
    pub fn new(allocator: &Allocator) -> Result<Self, MessageError> {
        let native = NativeMessage::new_request(allocator)?;
        Ok(Self { message: HttpMessage::new(allocator.clone(), MessageHandle::Owned(native)) })
    }

    /// Creates an owning request from `http` request parts.
    pub fn from_parts(allocator: &Allocator, parts: &Parts) -> Result<Self, MessageError> {
        let mut request = Self::new(allocator)?;
        request.set_method(parts.method.as_str())?;
        request.set_path(parts.uri.to_string())?;
        for header in &parts.headers {
            request.add_header(HttpHeader::from(header))?;
        }
        Ok(request)
    }
}

impl<'a> HttpRequest<'a> {
    /// Wraps a handle owned by the caller. Dropping the request leaves the handle alive.
    pub fn wrap(allocator: &Allocator, native: &'a mut NativeMessage) -> Self {
        Self { message: HttpMessage::new(allocator.clone(), MessageHandle::Borrowed(native)) }
    }

    /// The request method, `None` until set.
    pub fn method(&self) -> Option<&[u8]> {
        self.native().request_method().ok()
    }

    pub fn set_method<M: AsRef<[u8]>>(&mut self, method: M) -> Result<(), MessageError> {
        Ok(self.native_mut().set_request_method(method.as_ref())?)
    }

    /// The request target, `None` until set.
    pub fn path(&self) -> Option<&[u8]> {
        self.native().request_path().ok()
    }

    pub fn set_path<P: AsRef<[u8]>>(&mut self, path: P) -> Result<(), MessageError> {
        Ok(self.native_mut().set_request_path(path.as_ref())?)
    }

    /// Builds an `http::Request` for a transport, streaming the installed body.
    ///
    /// # Errors
    ///
    /// Fails when the method or path is unset.
    pub fn to_http(&self) -> Result<Request<StreamBody>, MessageError> {
        let method = self.method().ok_or(MessageError::missing_field("request method"))?;
        let path = self.path().ok_or(MessageError::missing_field("request path"))?;

        let mut builder = Request::builder().method(method).uri(path);
        if let Some(headers) = builder.headers_mut() {
            headers.reserve(self.header_count());
        }
        for header in self.headers() {
            builder = builder.header(header.name(), header.value());
        }

        Ok(builder.body(self.transport_body())?)
    }
}

impl<'a> Deref for HttpRequest<'a> {
    type Target = HttpMessage<'a>;

    fn deref(&self) -> &Self::Target {
        &self.message
    }
}

impl DerefMut for HttpRequest<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.message
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use http::{HeaderValue, Method};
    use http_body_util::BodyExt;
    use indoc::indoc;

    use super::*;
    use crate::engine::{AllocatorConfig, EngineError, ResourceKind};
    use crate::io::shared;

    #[test]
    fn health_check() {
        let allocator = Allocator::new();
        let mut request = HttpRequest::new(&allocator).unwrap();

        request.set_method("GET").unwrap();
        request.set_path("/health").unwrap();
        request.add_header(HttpHeader::new("Host", "example.com")).unwrap();

        assert_eq!(request.header_count(), 1);
        assert_eq!(request.method(), Some(&b"GET"[..]));
        assert_eq!(request.path(), Some(&b"/health"[..]));
        assert_eq!(request.header(0), Some(HttpHeader::new("Host", "example.com")));
    }

    #[test]
    fn fields_absent_until_set() {
        let request = HttpRequest::new(&Allocator::new()).unwrap();
        assert_eq!(request.method(), None);
        assert_eq!(request.path(), None);
        assert_eq!(request.header(0), None);
        assert!(request.body().is_none());
    }

    #[test]
    fn rejected_method_keeps_previous() {
        let mut request = HttpRequest::new(&Allocator::new()).unwrap();
        request.set_method(b"POST").unwrap();

        let error = request.set_method("BAD METHOD").unwrap_err();
        assert_eq!(error.engine_error(), Some(&EngineError::InvalidMethod));
        assert_eq!(request.method(), Some(&b"POST"[..]));
    }

    #[test]
    fn construction_fails_without_allocation() {
        let allocator = Allocator::with_config(AllocatorConfig::with_max_allocations(0));
        let error = HttpRequest::new(&allocator).unwrap_err();
        assert!(matches!(error.engine_error(), Some(EngineError::AllocationFailed { .. })));
    }

    #[test]
    fn owning_request_destroys_handle() {
        let allocator = Allocator::new();
        let request = HttpRequest::new(&allocator).unwrap();
        assert!(request.is_owned());
        assert_eq!(allocator.live(ResourceKind::Message), 1);

        drop(request);
        assert_eq!(allocator.live(ResourceKind::Message), 0);
    }

    #[test]
    fn borrowing_request_keeps_handle() {
        let allocator = Allocator::new();
        let mut native = NativeMessage::new_request(&allocator).unwrap();

        let mut request = HttpRequest::wrap(&allocator, &mut native);
        assert!(!request.is_owned());
        request.set_method("PUT").unwrap();
        request.set_path("/items/7").unwrap();
        drop(request);

        assert_eq!(allocator.live(ResourceKind::Message), 1);
        assert_eq!(native.request_method(), Ok(&b"PUT"[..]));
        assert_eq!(native.request_path(), Ok(&b"/items/7"[..]));
    }

    #[test]
    fn from_http_parts() {
        let (parts, ()) = Request::builder()
            .method(Method::POST)
            .uri("/submit?draft=true")
            .header(http::header::HOST, "127.0.0.1:8080")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(())
            .unwrap()
            .into_parts();

        let request = HttpRequest::from_parts(&Allocator::new(), &parts).unwrap();

        assert_eq!(request.method(), Some(&b"POST"[..]));
        assert_eq!(request.path(), Some(&b"/submit?draft=true"[..]));
        assert_eq!(request.header_count(), 2);
        assert_eq!(request.header(0), Some(HttpHeader::new("host", "127.0.0.1:8080")));
        assert_eq!(request.header(1), Some(HttpHeader::new("content-type", "application/json")));
    }

    #[test]
    fn to_http_requires_request_line() {
        let mut request = HttpRequest::new(&Allocator::new()).unwrap();
        assert!(matches!(request.to_http(), Err(MessageError::MissingField { field: "request method" })));

        request.set_method("GET").unwrap();
        assert!(matches!(request.to_http(), Err(MessageError::MissingField { field: "request path" })));
    }

    #[tokio::test]
    async fn to_http_streams_body() {
        let payload = indoc! {r#"
        {
          "name": "micro",
          "kind": "message"
        }
        "#};

        let mut request = HttpRequest::new(&Allocator::new()).unwrap();
        request.set_method("POST").unwrap();
        request.set_path("/items").unwrap();
        request.add_header(HttpHeader::new("Content-Type", "application/json")).unwrap();
        request.add_header(HttpHeader::new("Accept", "*/*")).unwrap();
        request.set_body(shared(Cursor::new(payload.as_bytes()))).unwrap();

        let http_request = request.to_http().unwrap();
        assert_eq!(http_request.method(), &Method::POST);
        assert_eq!(http_request.uri().path(), "/items");
        assert_eq!(http_request.headers().len(), 2);
        assert_eq!(
            http_request.headers().get(http::header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(http_request.headers().get(http::header::ACCEPT), Some(&HeaderValue::from_static("*/*")));

        let body = http_request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, payload.as_bytes());
    }
}
