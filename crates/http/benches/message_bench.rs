use std::hint::black_box;
use std::io::Cursor;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use micro_http_message::engine::{Allocator, NativeMessage};
use micro_http_message::io::{InputStream, SeekBasis, StreamAdapter, shared};
use micro_http_message::protocol::{BodySource, HttpHeader, HttpRequest, HttpResponse};

const HEADERS: [(&str, &str); 6] = [
    ("Host", "127.0.0.1:8080"),
    ("User-Agent", "curl/7.79.1"),
    ("Accept", "*/*"),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Connection", "keep-alive"),
    ("Cache-Control", "max-age=0"),
];

fn bench_build_request(c: &mut Criterion) {
    let allocator = Allocator::new();

    c.bench_function("build_simple_request", |b| {
        b.iter(|| {
            let mut request = HttpRequest::new(&allocator).unwrap();
            request.set_method("GET").unwrap();
            request.set_path("/index.html").unwrap();
            for (name, value) in HEADERS {
                request.add_header(HttpHeader::new(name, value)).unwrap();
            }
            black_box(request.header_count());
        });
    });
}

fn bench_wrap_inbound_request(c: &mut Criterion) {
    let allocator = Allocator::new();
    let mut native = NativeMessage::new_request(&allocator).unwrap();
    native.set_request_method(b"GET").unwrap();
    native.set_request_path(b"/index.html").unwrap();
    for (name, value) in HEADERS {
        native.add_header(HttpHeader::new(name, value)).unwrap();
    }

    c.bench_function("wrap_inbound_request", |b| {
        b.iter(|| {
            let request = HttpRequest::wrap(&allocator, &mut native);
            black_box(request.headers().filter(|h| h.name().eq_ignore_ascii_case(b"accept")).count());
        });
    });
}

fn bench_set_body(c: &mut Criterion) {
    let allocator = Allocator::new();
    let payload = Bytes::from(vec![b'x'; 64 * 1024]);
    let stream: Arc<dyn InputStream> =
        Arc::new(StreamAdapter::new(&allocator, shared(Cursor::new(payload.clone()))).unwrap());
    let mut response = HttpResponse::new(&allocator).unwrap();

    c.bench_function("set_body_wrapped", |b| {
        b.iter(|| {
            response.set_body(shared(Cursor::new(payload.clone()))).unwrap();
        });
    });

    c.bench_function("set_body_direct", |b| {
        b.iter(|| {
            response.set_body(BodySource::Stream(Arc::clone(&stream))).unwrap();
        });
    });
}

fn bench_read_body(c: &mut Criterion) {
    let allocator = Allocator::new();
    let stream = StreamAdapter::new(&allocator, shared(Cursor::new(Bytes::from(vec![b'x'; 64 * 1024])))).unwrap();

    c.bench_function("read_body_8k_chunks", |b| {
        b.iter(|| {
            stream.seek(0, SeekBasis::Begin).unwrap();
            let mut total = 0;
            loop {
                let mut chunk = BytesMut::with_capacity(8 * 1024);
                match stream.read(&mut chunk).unwrap() {
                    0 => break,
                    n => total += n,
                }
            }
            black_box(total);
        });
    });
}

criterion_group!(benches, bench_build_request, bench_wrap_inbound_request, bench_set_body, bench_read_body);
criterion_main!(benches);
