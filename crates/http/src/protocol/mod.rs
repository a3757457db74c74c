//! The HTTP message model.
//!
//! This module layers requests and responses over engine handles and defines the rules
//! for how a message relates to its headers, its body stream and its handle.
//!
//! # Architecture
//!
//! - **Message** (`message`): header and body management shared by both kinds
//!   - [`HttpMessage`]: base message over an owned or borrowed handle
//!   - [`MessageHandle`]: the handle tagged with its ownership mode
//!   - [`BodySource`]: how `set_body` attaches a body (wrapped, direct or none)
//!
//! - **Request** (`request`): [`HttpRequest`] adds method and path
//!
//! - **Response** (`response`): [`HttpResponse`] adds the status code
//!
//! - **Error Handling** (`error`): [`MessageError`]
//!
//! # Result shapes
//!
//! Reads return `Option`: a field that was never set or a header index out of range is
//! simply absent. Writes return `Result<(), MessageError>` so the caller learns why the
//! engine rejected them.
//!
//! # Lifetime
//!
//! Dropping a message always detaches and destroys the stream handle it installed. Only an
//! owning message destroys the engine handle itself; a borrowed handle is left to its owner.

mod message;
pub use message::BodySource;
pub use message::HttpMessage;
pub use message::MessageHandle;

mod request;
pub use request::HttpRequest;

mod response;
pub use response::HttpResponse;

mod error;
pub use error::MessageError;

pub use crate::engine::HttpHeader;
