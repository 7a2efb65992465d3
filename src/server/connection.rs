//! The per-connection read → parse → route → send loop.
//!
//! Named states `{Reading, Framing, ParsingHeaders, AwaitingBody,
//! Dispatching, Sending, ShiftingBuffer, Closing}` map onto the control
//! flow below: `read_more` realizes `Reading`, the header-search loop is
//! `Framing`, `request::parse` is `ParsingHeaders`, the body-wait loop is
//! `AwaitingBody`, `router::route` is `Dispatching`, `send_response` is
//! `Sending`, `ConnectionBuffer::shift` is `ShiftingBuffer`, and any `break`
//! out of the outer loop is `Closing`. These names never appear as an
//! explicit enum — the loop below plays the same role — so this keeps that
//! shape rather than reifying a state type with no consumer beyond
//! documentation.

use crate::{
    errors::ErrorKind,
    http::{
        request,
        response::{Payload, Response},
        router::{self, DocumentRoot},
        view::ByteView,
    },
    limits::{ConnBufferLimits, ConnLimits, ReqLimits, RespLimits},
};
use std::{io, sync::Arc};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    time::sleep,
};

/// Bundled configuration a connection needs for its entire lifetime, cloned
/// once per accepted socket from the server's shared defaults.
#[derive(Clone, Copy)]
pub(crate) struct ConnectionLimits {
    pub(crate) conn: ConnLimits,
    pub(crate) req: ReqLimits,
    pub(crate) resp: RespLimits,
    pub(crate) buf: ConnBufferLimits,
}

/// Drives one accepted connection until the peer disconnects, a framing
/// error forces a close, or keep-alive is declined.
///
/// Generic over the stream type rather than pinned to `TcpStream` so the
/// framing/pipelining/keep-alive contracts below can be exercised against
/// an in-memory duplex stream in tests, without binding a real socket.
pub(crate) async fn serve<S>(mut stream: S, doc_root: Arc<DocumentRoot>, limits: ConnectionLimits)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = ConnectionBuffer::new(limits.buf);
    let mut header_scratch: Vec<u8> = Vec::with_capacity(limits.resp.header_buffer);

    'connection: loop {
        // Framing: search for `\r\n\r\n` in the unparsed region, reading
        // more bytes until it appears or the peer goes away.
        let header_end = loop {
            if let Some(pos) = request::find_headers_end(buffer.filled(), buffer.parse_offset) {
                break pos;
            }
            if buffer.read_offset == buffer.capacity() {
                let grown = buffer.capacity().saturating_mul(2);
                if buffer.grow(grown).is_err() {
                    // No `\r\n\r\n` ever arrived even after growing to the
                    // capacity ceiling: the header block's required
                    // terminator is missing, not merely one overlong line
                    // (that case is `HeaderTooLarge`, raised inside
                    // `request::parse` once a header line itself is seen).
                    log::warn!("no header block terminator found before hitting max buffer capacity, closing connection");
                    let _ = send_error(&mut stream, ErrorKind::MissingRequiredHeaders).await;
                    break 'connection;
                }
            }
            match buffer.read_more(&mut stream, limits.conn.read_timeout).await {
                Ok(0) => break 'connection,
                Ok(_) => continue,
                Err(ErrorKind::RequestTimeout) => {
                    log::debug!("connection read timed out while framing a request");
                    let _ = send_error(&mut stream, ErrorKind::RequestTimeout).await;
                    break 'connection;
                }
                Err(_) => break 'connection,
            }
        };

        // ParsingHeaders, scouting pass: only to learn `content_length` and
        // surface a malformed header block immediately, without yet having
        // to hold a descriptor across the buffer mutations the body-wait
        // loop below may need to perform.
        let content_length = match request::parse(buffer.filled(), header_end, &limits.req) {
            Ok(descriptor) => descriptor.content_length,
            Err(err) => {
                log::warn!("rejecting request: {err}");
                let _ = send_error(&mut stream, err).await;
                break 'connection;
            }
        };

        let header_size = header_end + 4;
        let total_request_size = header_size + content_length;

        if total_request_size > buffer.capacity() {
            if let Err(err) = buffer.grow(total_request_size + 1) {
                log::warn!("request of {total_request_size} bytes exceeds max capacity");
                let _ = send_error(&mut stream, err).await;
                break 'connection;
            }
            log::debug!("grew connection buffer to {} bytes", buffer.capacity());
        }

        // AwaitingBody
        while buffer.read_offset < buffer.parse_offset + total_request_size {
            match buffer.read_more(&mut stream, limits.conn.read_timeout).await {
                Ok(0) => break 'connection,
                Ok(_) => {}
                Err(ErrorKind::RequestTimeout) => {
                    log::debug!("connection read timed out awaiting request body");
                    let _ = send_error(&mut stream, ErrorKind::RequestTimeout).await;
                    break 'connection;
                }
                Err(_) => break 'connection,
            }
        }

        // ParsingHeaders, authoritative pass: the buffer will not move
        // again until after this descriptor (and the views it borrows) is
        // dropped, so the borrow checker can verify the views stay valid
        // through routing and send.
        let mut descriptor = match request::parse(buffer.filled(), header_end, &limits.req) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                log::warn!("rejecting request on re-parse: {err}");
                let _ = send_error(&mut stream, err).await;
                break 'connection;
            }
        };
        descriptor.body = ByteView::slice(buffer.filled(), header_size, content_length)
            .unwrap_or(ByteView::empty());

        if let Err(err) = descriptor.run_url_pipeline() {
            log::warn!("rejecting request path: {err}");
            let _ = send_error(&mut stream, err).await;
            break 'connection;
        }

        let keep_alive = descriptor.keep_alive;

        // Dispatching
        let response = router::route(&descriptor, &doc_root).await;
        if response.status as u16 >= 400 {
            log::warn!("dispatched {} for {}", response.status.code(), String::from_utf8_lossy(descriptor.target.as_bytes()));
        }
        let close_after_send = response.close_after_send;

        // Sending
        let send_result = send_response(&mut stream, &mut header_scratch, response).await;

        // Drop the descriptor's borrows before touching the buffer again.
        let parsed_amount = header_size + content_length;
        drop(descriptor);

        if send_result.is_err() {
            log::warn!("send failed, closing connection");
            break 'connection;
        }

        // ShiftingBuffer
        buffer.advance_parsed(parsed_amount);
        buffer.shift();

        if close_after_send || !keep_alive {
            break 'connection;
        }
    }
}

async fn send_error<S: AsyncWrite + Unpin>(stream: &mut S, err: ErrorKind) -> io::Result<()> {
    send_all(stream, err.as_http()).await
}

/// Formats and transmits one response: header block first, then the body
/// (buffered, for `InMemory`; streamed straight from the file, for `File`).
/// Cleanup of the owned payload (file handle, body buffer) happens simply
/// by the `Response` going out of scope — no manual close path needed.
async fn send_response<S: AsyncWrite + Unpin>(
    stream: &mut S,
    header_scratch: &mut Vec<u8>,
    response: Response,
) -> io::Result<()> {
    format_headers(
        header_scratch,
        response.status.status_line(),
        response.content_type,
        response.content_length(),
        !response.close_after_send,
    );
    send_all(stream, header_scratch).await?;

    match response.payload {
        Payload::InMemory(body) => send_all(stream, &body).await,
        Payload::File { mut file, size } => stream_file(stream, &mut file, size).await,
    }
}

/// Formats the fixed four-header response preamble: status line,
/// `Content-Length`, `Content-Type`, and `Connection`, in that order, with
/// no other headers.
fn format_headers(
    out: &mut Vec<u8>,
    status_line: &[u8],
    content_type: &str,
    content_length: u64,
    keep_alive: bool,
) {
    use std::io::Write;

    out.clear();
    out.extend_from_slice(status_line);
    let _ = write!(out, "Content-Length: {content_length}\r\n");
    let _ = write!(out, "Content-Type: {content_type}\r\n");
    out.extend_from_slice(if keep_alive {
        b"Connection: keep-alive\r\n"
    } else {
        b"Connection: close\r\n"
    });
    out.extend_from_slice(b"\r\n");
}

/// Retries through short writes and `Interrupted`/`WouldBlock` errors until
/// every byte of `data` has been accepted by the socket.
async fn send_all<S: AsyncWrite + Unpin>(stream: &mut S, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        match stream.write(data).await {
            Ok(0) => return Err(io::Error::new(io::ErrorKind::WriteZero, "connection closed mid-write")),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Transmits a file's contents through a bounded scratch buffer rather than
/// materializing the whole file at once.
async fn stream_file<S: AsyncWrite + Unpin>(stream: &mut S, file: &mut tokio::fs::File, size: u64) -> io::Result<()> {
    const CHUNK: usize = 64 * 1024;
    let mut scratch = vec![0u8; CHUNK.min(size as usize).max(1)];
    let mut remaining = size;

    while remaining > 0 {
        let want = (scratch.len() as u64).min(remaining) as usize;
        let read = match file.read(&mut scratch[..want]).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        send_all(stream, &scratch[..read]).await?;
        remaining -= read as u64;
    }

    Ok(())
}

/// Owned, growable per-connection read buffer with two cursors:
/// `parse_offset` marks how much of `[0, read_offset)` earlier requests
/// have already consumed, `read_offset` marks how much of the buffer holds
/// bytes read from the socket.
struct ConnectionBuffer {
    buf: Vec<u8>,
    read_offset: usize,
    parse_offset: usize,
    max_capacity: usize,
}

impl ConnectionBuffer {
    fn new(limits: ConnBufferLimits) -> Self {
        Self {
            buf: vec![0u8; limits.initial_capacity],
            read_offset: 0,
            parse_offset: 0,
            max_capacity: limits.max_capacity,
        }
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn filled(&self) -> &[u8] {
        &self.buf[..self.read_offset]
    }

    fn advance_parsed(&mut self, amount: usize) {
        self.parse_offset += amount;
        debug_assert!(self.parse_offset <= self.read_offset);
    }

    /// Grows the buffer to `new_capacity`, failing with `PayloadTooLarge` if
    /// that would exceed the configured ceiling.
    fn grow(&mut self, new_capacity: usize) -> Result<(), ErrorKind> {
        if new_capacity > self.max_capacity {
            return Err(ErrorKind::PayloadTooLarge);
        }
        self.buf.resize(new_capacity, 0);
        Ok(())
    }

    /// Moves unparsed bytes to the front of the buffer once a request has
    /// been fully handled, so pipelined requests already in flight don't
    /// force a reallocation.
    fn shift(&mut self) {
        let remaining = self.read_offset - self.parse_offset;
        if remaining > 0 && self.parse_offset > 0 {
            self.buf.copy_within(self.parse_offset..self.read_offset, 0);
        }
        self.read_offset = remaining;
        self.parse_offset = 0;
    }

    /// Reads more bytes into `buf[read_offset..]`, bounded by the
    /// connection's receive timeout.
    async fn read_more<S: AsyncRead + Unpin>(&mut self, stream: &mut S, timeout: std::time::Duration) -> Result<usize, ErrorKind> {
        if self.read_offset >= self.buf.len() {
            return Ok(0);
        }

        let n = tokio::select! {
            biased;
            result = stream.read(&mut self.buf[self.read_offset..]) => result.map_err(ErrorKind::from)?,
            _ = sleep(timeout) => return Err(ErrorKind::RequestTimeout),
        };
        self.read_offset += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::ConnBufferLimits;

    #[test]
    fn buffer_shift_moves_unparsed_tail_to_front() {
        let mut buf = ConnectionBuffer::new(ConnBufferLimits {
            initial_capacity: 16,
            max_capacity: 16,
        });
        buf.buf[..10].copy_from_slice(b"0123456789");
        buf.read_offset = 10;
        buf.parse_offset = 6;

        buf.shift();

        assert_eq!(buf.read_offset, 4);
        assert_eq!(buf.parse_offset, 0);
        assert_eq!(&buf.buf[..4], b"6789");
    }

    #[test]
    fn buffer_shift_is_noop_when_nothing_parsed_yet() {
        let mut buf = ConnectionBuffer::new(ConnBufferLimits {
            initial_capacity: 16,
            max_capacity: 16,
        });
        buf.buf[..5].copy_from_slice(b"abcde");
        buf.read_offset = 5;
        buf.parse_offset = 0;

        buf.shift();

        assert_eq!(buf.read_offset, 5);
        assert_eq!(&buf.buf[..5], b"abcde");
    }

    #[test]
    fn grow_rejects_past_max_capacity() {
        let mut buf = ConnectionBuffer::new(ConnBufferLimits {
            initial_capacity: 16,
            max_capacity: 32,
        });
        assert!(buf.grow(32).is_ok());
        assert_eq!(buf.grow(33).unwrap_err(), ErrorKind::PayloadTooLarge);
    }

    fn connection_limits() -> ConnectionLimits {
        ConnectionLimits {
            conn: ConnLimits::default(),
            req: ReqLimits::default(),
            resp: RespLimits::default(),
            buf: ConnBufferLimits::default(),
        }
    }

    async fn open_doc_root() -> Arc<DocumentRoot> {
        Arc::new(DocumentRoot::open(std::env::temp_dir()).await.expect("temp dir must open"))
    }

    /// Two back-to-back `GET /api/` requests delivered in a single read
    /// must yield two ordered 200 `Hello` responses on the same connection.
    #[tokio::test]
    async fn pipelined_requests_are_answered_in_order_on_one_connection() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));

        client
            .write_all(b"GET /api/ HTTP/1.1\r\n\r\nGET /api/ HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        let expected_one = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nContent-Type: text/plain\r\nConnection: keep-alive\r\n\r\nHello";
        let mut expected = Vec::new();
        expected.extend_from_slice(expected_one);
        expected.extend_from_slice(expected_one);

        // Both responses carry `Connection: keep-alive`, so the server
        // keeps the connection open; read until both full responses have
        // arrived, then drop the client side to let `serve` observe EOF.
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        while received.len() < expected.len() {
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before both responses arrived");
            received.extend_from_slice(&chunk[..n]);
        }
        drop(client);
        handle.await.unwrap();

        assert_eq!(received, expected);
    }

    /// A request carrying `Connection: close` gets a matching response
    /// header and the server closes the connection without waiting for a
    /// further read.
    #[tokio::test]
    async fn connection_close_header_ends_the_connection() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));

        client
            .write_all(b"GET /api/ HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = client.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
        }
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nHello"
        );
    }

    /// A POST echo body round-trips unchanged, and the default HTTP/1.1
    /// keep-alive response header lets the connection stay open for the
    /// next request read on the same duplex stream.
    #[tokio::test]
    async fn echo_body_round_trips_and_connection_stays_open() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));

        client
            .write_all(b"POST /api/echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nabcde")
            .await
            .unwrap();

        let expected = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nContent-Type: text/plain\r\nConnection: keep-alive\r\n\r\nabcde";
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        while received.len() < expected.len() {
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before full response arrived");
            received.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(received, expected);

        // The server is still waiting on another read; closing the client
        // side now is what lets it observe EOF and return.
        drop(client);
        handle.await.unwrap();
    }

    /// A malformed request line is a driver-detected error: empty body,
    /// `Connection: close`, and the connection ends without a further read.
    #[tokio::test]
    async fn bad_request_line_closes_with_empty_body() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));
        client.write_all(b"BADLINE\r\n\r\n").await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    /// An unrecognized HTTP version is rejected with 505 and the connection
    /// closes, per the fixed error-response wire format.
    #[tokio::test]
    async fn unsupported_version_yields_505_and_closes() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));
        client.write_all(b"GET / HTTP/0.9\r\n\r\n").await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 505 HTTP Version Not Supported\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    /// A method the API routing table doesn't recognize gets the router's
    /// own 405 body (not the driver's empty-body error shape) and the
    /// connection stays open because keep-alive was never disabled.
    #[tokio::test]
    async fn unsupported_method_on_api_route_gets_405_body_and_stays_open() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));
        client
            .write_all(b"DELETE /api/whatever HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        let expected = b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 44\r\nContent-Type: text/plain\r\nConnection: keep-alive\r\n\r\nThis request method is currently unsupported";
        let mut received = Vec::new();
        let mut chunk = [0u8; 4096];
        while received.len() < expected.len() {
            let n = client.read(&mut chunk).await.unwrap();
            assert!(n > 0);
            received.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(received, expected.as_slice());

        drop(client);
        handle.await.unwrap();
    }

    /// A root-escaping percent-encoded path is rejected before routing even
    /// runs, per the decode-then-normalize ordering invariant.
    #[tokio::test]
    async fn root_escaping_path_is_rejected() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));
        client
            .write_all(b"GET /%2e%2e/etc/passwd HTTP/1.1\r\n\r\n")
            .await
            .unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 400 Bad Path For Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    /// A request whose declared total size cannot fit even after growing to
    /// the buffer ceiling gets `413` and the connection closes.
    #[tokio::test]
    async fn oversized_request_yields_413() {
        let (mut client, server) = tokio::io::duplex(8192);
        let doc_root = open_doc_root().await;

        let mut limits = connection_limits();
        limits.buf = ConnBufferLimits {
            initial_capacity: 64,
            max_capacity: 128,
        };

        let handle = tokio::spawn(serve(server, doc_root, limits));
        client
            .write_all(b"POST /api/echo HTTP/1.1\r\nContent-Length: 1000\r\n\r\n")
            .await
            .unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 413 Payload Too Large\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    /// A request that never presents a `\r\n\r\n` header terminator, even
    /// after the buffer has grown to its capacity ceiling, is rejected with
    /// `MissingRequiredHeaders` (400) rather than hanging forever or being
    /// misreported as an overlong single header line.
    #[tokio::test]
    async fn header_block_never_terminated_yields_400() {
        let (mut client, server) = tokio::io::duplex(8192);
        let doc_root = open_doc_root().await;

        let mut limits = connection_limits();
        limits.buf = ConnBufferLimits {
            initial_capacity: 16,
            max_capacity: 16,
        };

        let handle = tokio::spawn(serve(server, doc_root, limits));
        client.write_all(&[b'A'; 32]).await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    /// A connection that never completes a request within the read timeout
    /// gets `408` and closes, rather than hanging forever.
    #[tokio::test]
    async fn idle_connection_times_out() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let mut limits = connection_limits();
        limits.conn.read_timeout = std::time::Duration::from_millis(30);

        let handle = tokio::spawn(serve(server, doc_root, limits));
        client.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 408 Request Timeout\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
    }

    /// Static files are served from the document root, with the response
    /// header block matching the static-file branch of the router exactly.
    #[tokio::test]
    async fn static_file_is_served_from_the_document_root() {
        let root_dir = std::env::temp_dir().join(format!(
            "originserve-conn-test-{}-{}",
            std::process::id(),
            line!()
        ));
        std::fs::create_dir_all(&root_dir).unwrap();
        std::fs::write(root_dir.join("index.html"), b"<html>hi</html>").unwrap();

        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = Arc::new(DocumentRoot::open(&root_dir).await.unwrap());

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));
        client
            .write_all(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 200 OK\r\nContent-Length: 15\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html>hi</html>"
        );
    }

    /// A static route with no matching file gets the router's 404 body, not
    /// a driver-level error response.
    #[tokio::test]
    async fn missing_static_file_gets_router_404() {
        let (mut client, server) = tokio::io::duplex(4096);
        let doc_root = open_doc_root().await;

        let handle = tokio::spawn(serve(server, doc_root, connection_limits()));
        client
            .write_all(b"GET /does-not-exist.css HTTP/1.1\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        let mut received = Vec::new();
        client.read_to_end(&mut received).await.unwrap();
        handle.await.unwrap();

        assert_eq!(
            received,
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 15\r\nContent-Type: text/plain\r\nConnection: close\r\n\r\nRoute Not Found"
        );
    }
}
