use std::fmt;

use bytes::Bytes;
use http::{HeaderName, HeaderValue};

use crate::engine::EngineError;

/// A header name/value pair viewed as byte ranges.
///
/// Neither part has to be UTF-8. Headers returned by a message borrow from the message's
/// header table; headers passed to `add_header` are copied into it.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct HttpHeader<'a> {
    name: &'a [u8],
    value: &'a [u8],
}

impl<'a> HttpHeader<'a> {
    pub fn new<N, V>(name: &'a N, value: &'a V) -> Self
    where
        N: AsRef<[u8]> + ?Sized,
        V: AsRef<[u8]> + ?Sized,
    {
        Self { name: name.as_ref(), value: value.as_ref() }
    }

    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    pub fn value(&self) -> &'a [u8] {
        self.value
    }
}

impl fmt::Debug for HttpHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpHeader")
            .field("name", &String::from_utf8_lossy(self.name))
            .field("value", &String::from_utf8_lossy(self.value))
            .finish()
    }
}

impl<'a> From<(&'a HeaderName, &'a HeaderValue)> for HttpHeader<'a> {
    fn from((name, value): (&'a HeaderName, &'a HeaderValue)) -> Self {
        Self { name: name.as_str().as_bytes(), value: value.as_bytes() }
    }
}

/// A header as stored in the engine's header table.
#[derive(Debug, Clone)]
pub(crate) struct HeaderEntry {
    name: Bytes,
    value: Bytes,
}

impl HeaderEntry {
    /// Validates and copies a header into owned storage.
    ///
    /// The name must be an HTTP token and the value a legal field value. Original casing
    /// of the name is preserved.
    pub(crate) fn copy_from(header: HttpHeader<'_>) -> Result<Self, EngineError> {
        HeaderName::from_bytes(header.name()).map_err(EngineError::invalid_header)?;
        HeaderValue::from_bytes(header.value()).map_err(EngineError::invalid_header)?;

        Ok(Self { name: Bytes::copy_from_slice(header.name()), value: Bytes::copy_from_slice(header.value()) })
    }

    pub(crate) fn as_header(&self) -> HttpHeader<'_> {
        HttpHeader { name: &self.name, value: &self.value }
    }
}
