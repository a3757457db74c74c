//! Simulates a transport lending an inbound request to a handler and sending back the
//! handler's response.

use std::error::Error;
use std::io::Cursor;

use http_body_util::BodyExt;
use micro_http_message::engine::{Allocator, NativeMessage, ResourceKind};
use micro_http_message::io::shared;
use micro_http_message::protocol::{HttpHeader, HttpRequest, HttpResponse, MessageError};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn handle(request: &HttpRequest<'_>, allocator: &Allocator) -> Result<HttpResponse, MessageError> {
    let path = request.path().map(String::from_utf8_lossy).unwrap_or_default();
    info!(%path, headers = request.header_count(), "handling request");

    let mut response = HttpResponse::new(allocator)?;
    response.set_response_code(200)?;
    response.add_header(HttpHeader::new("Content-Type", "text/plain"))?;
    response.set_body(shared(Cursor::new(format!("you asked for {path}\r\n").into_bytes())))?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let allocator = Allocator::new();

    // the transport owns the inbound handle
    let mut inbound = NativeMessage::new_request(&allocator)?;
    inbound.set_request_method(b"GET")?;
    inbound.set_request_path(b"/health")?;
    inbound.add_header(HttpHeader::new("Host", "127.0.0.1:8080"))?;

    let response = {
        let request = HttpRequest::wrap(&allocator, &mut inbound);
        handle(&request, &allocator)?
    };

    let (parts, body) = response.to_http()?.into_parts();
    let body = body.collect().await?.to_bytes();
    info!(status = %parts.status, body = %String::from_utf8_lossy(&body), "response ready");

    drop(response);
    info!(
        messages = allocator.live(ResourceKind::Message),
        streams = allocator.live(ResourceKind::Stream),
        "inbound handle still owned by the transport"
    );

    Ok(())
}
