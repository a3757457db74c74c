//! An HTTP request/response object model over a message engine
//!
//! This crate provides the message layer of the micro-http family: requests and responses
//! whose headers, request line, status and body stream live in engine handles, with clear
//! rules for who owns a handle and how body streams are attached and released.
//!
//! # Features
//!
//! - Owning and borrowing messages, so a transport can lend an inbound request handle
//! - Binary-safe, ordered header tables with index-based access
//! - Shared body streams with exactly one engine-side handle per attachment
//! - Adapter from any `Read + Seek` stream to the engine's stream interface
//! - Resource accounting through an optionally bounded allocator
//! - Hand-off to transports as `http::Request` / `http::Response` with an `http_body::Body`
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use micro_http_message::engine::Allocator;
//! use micro_http_message::io::shared;
//! use micro_http_message::protocol::{HttpHeader, HttpRequest, MessageError};
//!
//! fn build(allocator: &Allocator) -> Result<HttpRequest<'static>, MessageError> {
//!     let mut request = HttpRequest::new(allocator)?;
//!     request.set_method("POST")?;
//!     request.set_path("/items")?;
//!     request.add_header(HttpHeader::new("Host", "example.com"))?;
//!     request.set_body(shared(Cursor::new(b"{\"id\":7}".to_vec())))?;
//!     Ok(request)
//! }
//!
//! let allocator = Allocator::new();
//! let request = build(&allocator).unwrap();
//! assert_eq!(request.method(), Some(&b"POST"[..]));
//! assert_eq!(request.header_count(), 1);
//!
//! drop(request);
//! assert_eq!(allocator.live_total(), 0);
//! ```
//!
//! # Architecture
//!
//! The crate is organized into three modules:
//!
//! - [`engine`]: handle storage, validation and resource accounting
//! - [`io`]: body stream interface, stream adapter and transport body
//! - [`protocol`]: the message model (`HttpMessage`, `HttpRequest`, `HttpResponse`)
//!
//! # Error Handling
//!
//! - [`engine::EngineError`]: rejections reported by the engine
//! - [`protocol::MessageError`]: failures of message construction and mutation
//!
//! Reads never fail; absent values are `None`.
//!
//! # Logging
//!
//! The crate emits `tracing` events: `trace` for body attach/detach and handle release,
//! `debug` for rejected input, `error` for allocation and stream failures. No subscriber is
//! installed by the crate.
//!
//! # Limitations
//!
//! - No wire serialization, connection management or TLS
//! - Messages are not synchronized; mutate them from one owner before handing them off

pub mod engine;
pub mod io;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
