use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http_body::{Body, Frame, SizeHint};
use tracing::trace;

use crate::io::{DEFAULT_CHUNK_SIZE, InputStream};

/// Streams an attached body to a transport through the `http_body::Body` interface.
///
/// Reads are synchronous and bounded by the chunk size, so every poll completes
/// immediately. An empty `StreamBody` ends right away.
#[derive(Debug)]
pub struct StreamBody {
    stream: Option<Arc<dyn InputStream>>,
    chunk_size: usize,
    size_hint: SizeHint,
}

impl StreamBody {
    pub fn new(stream: Option<Arc<dyn InputStream>>) -> Self {
        Self::with_chunk_size(stream, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(stream: Option<Arc<dyn InputStream>>, chunk_size: usize) -> Self {
        let size_hint = match &stream {
            None => SizeHint::with_exact(0),
            // the stream may already be partially consumed, its length is only an upper bound
            Some(stream) => {
                let mut hint = SizeHint::new();
                if let Ok(length) = stream.length() {
                    hint.set_upper(length);
                }
                hint
            }
        };

        Self { stream, chunk_size: chunk_size.max(1), size_hint }
    }

    pub fn empty() -> Self {
        Self::new(None)
    }
}

impl Body for StreamBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let Some(stream) = &this.stream else {
            return Poll::Ready(None);
        };

        if !stream.is_valid() {
            this.stream.take();
            return Poll::Ready(Some(Err(io::Error::other("body stream is invalid"))));
        }

        let mut chunk = BytesMut::with_capacity(this.chunk_size);
        match stream.read(&mut chunk) {
            Ok(0) => {
                trace!("body stream exhausted");
                this.stream.take();
                Poll::Ready(None)
            }
            Ok(_) => Poll::Ready(Some(Ok(Frame::data(chunk.freeze())))),
            Err(e) => {
                this.stream.take();
                Poll::Ready(Some(Err(e)))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.stream.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        self.size_hint.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read, Seek, SeekFrom};

    use http_body_util::BodyExt;

    use super::*;
    use crate::engine::Allocator;
    use crate::io::{StreamAdapter, shared};

    fn stream(data: &'static [u8]) -> Arc<dyn InputStream> {
        Arc::new(StreamAdapter::new(&Allocator::new(), shared(Cursor::new(data))).unwrap())
    }

    /// Seeks forward to its end but cannot seek back to a start offset.
    struct OneWaySeek(Cursor<&'static [u8]>);

    impl Read for OneWaySeek {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Seek for OneWaySeek {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            match pos {
                SeekFrom::Start(_) => Err(io::Error::other("cannot rewind")),
                other => self.0.seek(other),
            }
        }
    }

    fn check_send<T: Send>() {}

    #[test]
    fn is_send() {
        check_send::<StreamBody>();
    }

    #[tokio::test]
    async fn empty_body() {
        let mut body = StreamBody::empty();

        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
        assert!(body.frame().await.is_none());
    }

    #[tokio::test]
    async fn reads_in_chunks() {
        let mut body = StreamBody::with_chunk_size(Some(stream(b"hello world")), 4);
        assert_eq!(body.size_hint().upper(), Some(11));
        assert!(!body.is_end_stream());

        let mut chunks = Vec::new();
        while let Some(frame) = body.frame().await {
            chunks.push(frame.unwrap().into_data().unwrap());
        }

        assert_eq!(chunks, vec![Bytes::from_static(b"hell"), Bytes::from_static(b"o wo"), Bytes::from_static(b"rld")]);
        assert!(body.is_end_stream());
    }

    #[tokio::test]
    async fn collect_whole_body() {
        let body = StreamBody::new(Some(stream(b"{\"status\":\"ok\"}")));
        let bytes = body.collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from_static(b"{\"status\":\"ok\"}"));
    }

    #[tokio::test]
    async fn shared_stream_continues_for_other_holders() {
        let source = stream(b"abcdef");
        let mut first = StreamBody::with_chunk_size(Some(Arc::clone(&source)), 3);
        assert_eq!(first.frame().await.unwrap().unwrap().into_data().unwrap(), Bytes::from_static(b"abc"));
        drop(first);

        source.seek(0, crate::io::SeekBasis::Begin).unwrap();
        let again = StreamBody::new(Some(source)).collect().await.unwrap().to_bytes();
        assert_eq!(again, Bytes::from_static(b"abcdef"));
    }

    #[tokio::test]
    async fn unmeasurable_stream_fails_instead_of_ending() {
        let stream = OneWaySeek(Cursor::new(&b"hello"[..]));
        let adapter: Arc<dyn InputStream> = Arc::new(StreamAdapter::new(&Allocator::new(), shared(stream)).unwrap());
        let mut body = StreamBody::new(Some(adapter));

        assert_eq!(body.size_hint().upper(), None);
        assert!(body.frame().await.unwrap().is_err());
        assert!(body.is_end_stream());
    }
}
