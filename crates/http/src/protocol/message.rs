//! The message model shared by requests and responses.
//!
//! An [`HttpMessage`] layers header and body management over an engine handle. It either
//! owns that handle or borrows it from a caller (typically a transport handing an inbound
//! request to user code), and the ownership mode decides what happens on drop.
//!
//! # Body slot
//!
//! The engine holds at most one body stream handle per message. Every [`HttpMessage::set_body`]
//! first detaches and destroys the installed handle, then installs the new one, so the
//! engine never observes two attached streams:
//!
//! ```text
//! BodyAttached(old) --set_body--> NoBody --install--> BodyAttached(new)
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{error, trace};

use crate::engine::{Allocator, HttpHeader, MessageKind, NativeMessage, NativeStream};
use crate::io::{InputStream, SharedByteStream, StreamAdapter, StreamBody};
use crate::protocol::MessageError;

/// An engine handle together with its ownership mode.
#[derive(Debug)]
pub enum MessageHandle<'a> {
    /// Created by this wrapper and destroyed with it
    Owned(NativeMessage),
    /// Supplied by a caller that keeps ownership; survives the wrapper
    Borrowed(&'a mut NativeMessage),
}

impl MessageHandle<'_> {
    pub fn is_owned(&self) -> bool {
        matches!(self, MessageHandle::Owned(_))
    }

    fn get(&self) -> &NativeMessage {
        match self {
            MessageHandle::Owned(native) => native,
            MessageHandle::Borrowed(native) => native,
        }
    }

    fn get_mut(&mut self) -> &mut NativeMessage {
        match self {
            MessageHandle::Owned(native) => native,
            MessageHandle::Borrowed(native) => native,
        }
    }
}

/// What [`HttpMessage::set_body`] attaches.
#[derive(Clone)]
pub enum BodySource {
    /// Detach the current body and leave none
    Empty,
    /// Wrap a generic byte stream in a [`StreamAdapter`] and attach the adapter
    Wrap(SharedByteStream),
    /// Attach an [`InputStream`] as is
    Stream(Arc<dyn InputStream>),
}

impl fmt::Debug for BodySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodySource::Empty => f.write_str("Empty"),
            BodySource::Wrap(_) => f.debug_tuple("Wrap").finish_non_exhaustive(),
            BodySource::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
        }
    }
}

impl From<Arc<dyn InputStream>> for BodySource {
    fn from(stream: Arc<dyn InputStream>) -> Self {
        Self::Stream(stream)
    }
}

impl From<SharedByteStream> for BodySource {
    fn from(stream: SharedByteStream) -> Self {
        Self::Wrap(stream)
    }
}

impl<T: Into<BodySource>> From<Option<T>> for BodySource {
    fn from(option: Option<T>) -> Self {
        option.map_or(Self::Empty, Into::into)
    }
}

/// Header and body management over an engine handle.
#[derive(Debug)]
pub struct HttpMessage<'a> {
    allocator: Allocator,
    handle: MessageHandle<'a>,
    body: Option<Arc<dyn InputStream>>,
}

impl<'a> HttpMessage<'a> {
    pub fn new(allocator: Allocator, handle: MessageHandle<'a>) -> Self {
        Self { allocator, handle, body: None }
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    /// Whether dropping this message destroys the engine handle.
    pub fn is_owned(&self) -> bool {
        self.handle.is_owned()
    }

    pub fn kind(&self) -> MessageKind {
        self.native().kind()
    }

    /// Read access to the engine handle.
    pub fn native(&self) -> &NativeMessage {
        self.handle.get()
    }

    pub(crate) fn native_mut(&mut self) -> &mut NativeMessage {
        self.handle.get_mut()
    }

    /// The attached body stream.
    ///
    /// A stream attached through [`BodySource::Stream`] is returned even when it was invalid
    /// and therefore not installed into the engine.
    pub fn body(&self) -> Option<&Arc<dyn InputStream>> {
        self.body.as_ref()
    }

    /// Replaces the body.
    ///
    /// The installed stream handle is always detached and destroyed first, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Only [`BodySource::Wrap`] can fail: when the adapter cannot be allocated or the
    /// wrapped stream is unusable. The message is then left without a body.
    pub fn set_body<B: Into<BodySource>>(&mut self, body: B) -> Result<(), MessageError> {
        self.release_body();

        match body.into() {
            BodySource::Empty => Ok(()),

            BodySource::Wrap(stream) => {
                let adapter = StreamAdapter::new(&self.allocator, stream)?;
                if !adapter.is_valid() {
                    error!("wrapped body stream is not usable");
                    return Err(MessageError::invalid_body("wrapped body stream is not usable"));
                }

                let adapter: Arc<dyn InputStream> = Arc::new(adapter);
                self.install(&adapter);
                self.body = Some(adapter);
                Ok(())
            }

            BodySource::Stream(stream) => {
                if stream.is_valid() {
                    self.install(&stream);
                } else {
                    trace!("body stream is not valid, engine keeps no body");
                }
                self.body = Some(stream);
                Ok(())
            }
        }
    }

    fn install(&mut self, stream: &Arc<dyn InputStream>) {
        let native = NativeStream::new(&self.allocator, Arc::clone(stream));
        let displaced = self.native_mut().set_body_stream(Some(native));
        debug_assert!(displaced.is_none(), "body slot must be empty before install");
        trace!("body stream attached");
    }

    /// Detaches and destroys the installed stream handle and drops this message's reference.
    fn release_body(&mut self) {
        if let Some(native) = self.native_mut().set_body_stream(None) {
            trace!(stream = ?native, "body stream detached");
            drop(native);
        }
        self.body = None;
    }

    /// A transport-facing body over the installed stream, empty when nothing is installed.
    pub fn transport_body(&self) -> StreamBody {
        StreamBody::new(self.native().body_stream().map(|native| Arc::clone(native.source())))
    }

    pub fn header_count(&self) -> usize {
        self.native().header_count()
    }

    /// The header at `index`, or `None` when out of range.
    pub fn header(&self, index: usize) -> Option<HttpHeader<'_>> {
        self.native().header(index).ok()
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> impl ExactSizeIterator<Item = HttpHeader<'_>> {
        self.native().headers()
    }

    pub fn add_header(&mut self, header: HttpHeader<'_>) -> Result<(), MessageError> {
        Ok(self.native_mut().add_header(header)?)
    }

    /// Removes the header at `index`. Later headers shift down by one, so erase from the
    /// highest index when removing several.
    pub fn erase_header(&mut self, index: usize) -> Result<(), MessageError> {
        Ok(self.native_mut().erase_header(index)?)
    }
}

impl Drop for HttpMessage<'_> {
    fn drop(&mut self) {
        self.release_body();
        match self.handle {
            MessageHandle::Owned(_) => trace!(kind = %self.kind(), "destroying owned message handle"),
            MessageHandle::Borrowed(_) => trace!(kind = %self.kind(), "returning borrowed message handle"),
        }
    }
}
