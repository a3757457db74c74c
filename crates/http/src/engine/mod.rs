//! The message engine: storage and validation behind the message model.
//!
//! The engine is the "native" side of a message. It owns header tables, request line
//! fields, status codes and installed body stream handles, and accounts for every handle
//! through an [`Allocator`]. It knows nothing about ownership modes or stream wrapping;
//! those rules live in [`crate::protocol`].
//!
//! # Components
//!
//! - [`Allocator`]: shared resource accountant, optionally bounded
//! - [`NativeMessage`]: request or response handle with an ordered header table and a
//!   single body stream slot
//! - [`NativeStream`]: engine-side duplicate handle of a body stream
//! - [`HttpHeader`]: binary-safe header view
//! - [`EngineError`]: rejections reported by the engine

mod allocator;
pub use allocator::Allocation;
pub use allocator::Allocator;
pub use allocator::AllocatorConfig;
pub use allocator::ResourceKind;

mod error;
pub use error::EngineError;

mod header;
pub use header::HttpHeader;

mod message;
pub use message::MessageKind;
pub use message::NativeMessage;

mod stream;
pub use stream::NativeStream;
