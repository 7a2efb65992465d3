//! Request-line and header-block parsing over a connection buffer.
//!
//! Parsing never allocates and never advances any cursor of its own; the
//! connection driver (`server::connection`) owns the buffer's read/parse
//! offsets and decides when enough bytes are present to call in here.

use crate::{
    errors::ErrorKind,
    http::{
        types::{slice_to_usize, Version},
        url_safety,
        view::ByteView,
    },
    limits::ReqLimits,
};

/// A `(name, value)` header pair, views into the connection buffer.
///
/// Name is stored exactly as received (case preserved); recognized headers
/// are matched case-insensitively without mutating the stored name.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderField<'buf> {
    pub name: ByteView<'buf>,
    pub value: ByteView<'buf>,
}

/// A parsed request, borrowing its raw fields from the connection buffer
/// and owning the decoded/normalized path produced by the URL-safety
/// pipeline once that pipeline has run.
#[derive(Debug)]
pub(crate) struct RequestDescriptor<'buf> {
    pub method: ByteView<'buf>,
    pub target: ByteView<'buf>,
    pub version: Version,
    pub headers: Vec<HeaderField<'buf>>,
    pub content_length: usize,
    pub content_type: ByteView<'buf>,
    /// Set by the driver once the full body has arrived; empty until then.
    pub body: ByteView<'buf>,
    pub keep_alive: bool,
    pub is_api: bool,
    pub decoded_target: Vec<u8>,
    pub normalized_path: Vec<u8>,
}

impl<'buf> RequestDescriptor<'buf> {
    #[inline]
    pub fn header(&self, name: &[u8]) -> Option<ByteView<'buf>> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value)
    }

    /// Runs the URL-safety pipeline (percent-decode, then normalize) over
    /// `target` (already narrowed by API classification during parsing),
    /// populating `decoded_target` and `normalized_path`.
    #[inline]
    pub fn run_url_pipeline(&mut self) -> Result<(), ErrorKind> {
        self.decoded_target = url_safety::percent_decode(self.target.as_bytes())?;
        self.normalized_path = url_safety::normalize_path(&self.decoded_target)?;
        Ok(())
    }
}

/// Locates the end of the header block in `buffer[search_from..]`, returning
/// the absolute position of the first `\r\n` of the terminating `\r\n\r\n`.
#[inline]
pub(crate) fn find_headers_end(buffer: &[u8], search_from: usize) -> Option<usize> {
    let rel = ByteView::new(&buffer[search_from..]).find(b"\r\n\r\n")?;
    Some(search_from + rel)
}

/// Parses the request line and header block of `buffer[..header_end+4]`.
///
/// `header_end` is the position of the first `\r\n` of the terminating
/// `\r\n\r\n`, as returned by [`find_headers_end`]. Does not touch the body;
/// the caller assigns `body` on the returned descriptor once it has
/// confirmed enough bytes have arrived.
pub(crate) fn parse<'buf>(
    buffer: &'buf [u8],
    header_end: usize,
    limits: &ReqLimits,
) -> Result<RequestDescriptor<'buf>, ErrorKind> {
    // `header_end` is only ever produced by `find_headers_end`, whose
    // contract guarantees `buffer[header_end..header_end + 4] == b"\r\n\r\n"`.
    // That `\r\n` therefore always lies within `buffer[..header_end + 2]`, so
    // this search always succeeds — the request line's own terminator, for a
    // header-less request, is that very `\r\n`. A missing-terminator request
    // never reaches this function at all: the connection driver's framing
    // loop (`server::connection::serve`) keeps reading, and reports
    // `MissingRequiredHeaders` itself if the buffer hits its capacity
    // ceiling without ever finding one.
    let search_region = &buffer[..header_end + 2];
    let line_end = ByteView::new(search_region)
        .find(b"\r\n")
        .expect("find_headers_end guarantees a \\r\\n at header_end");

    let (method, target, version_bytes) = parse_request_line(buffer, &buffer[..line_end])?;
    let version = Version::from_bytes(version_bytes.as_bytes())?;

    let mut headers = Vec::new();
    let mut content_length: usize = 0;
    let mut content_length_seen = false;
    let mut content_type = ByteView::empty();
    let mut keep_alive = version.default_keep_alive();

    let mut cursor = line_end + 2;
    while cursor < header_end {
        let rel = ByteView::new(&buffer[cursor..header_end + 2])
            .find(b"\r\n")
            .ok_or(ErrorKind::BadHeaderSyntax)?;
        let line = &buffer[cursor..cursor + rel];

        if line.len() > limits.max_header_line {
            return Err(ErrorKind::HeaderTooLarge);
        }

        if headers.len() >= limits.max_headers {
            return Err(ErrorKind::TooManyHeaders);
        }

        let field = parse_header_line(buffer, cursor, line)?;

        if field.name.eq_ignore_ascii_case(b"content-length") {
            if content_length_seen {
                return Err(ErrorKind::InvalidContentLength);
            }
            content_length =
                slice_to_usize(field.value.as_bytes()).ok_or(ErrorKind::InvalidContentLength)?;
            content_length_seen = true;
        } else if field.name.eq_ignore_ascii_case(b"content-type") {
            content_type = field.value;
        } else if field.name.eq_ignore_ascii_case(b"connection") {
            if field.value.contains_ignore_case(b"close") {
                keep_alive = false;
            }
        } else if field.name.eq_ignore_ascii_case(b"transfer-encoding") {
            return Err(ErrorKind::UnsupportedTransferEncoding);
        }

        headers.push(field);

        cursor += rel + 2;
    }

    if method.as_bytes().first() == Some(&b'G') && content_length > 0 {
        return Err(ErrorKind::BodyNotAllowed);
    }

    let (is_api, target) = url_safety::classify_api(target);

    Ok(RequestDescriptor {
        method,
        target,
        version,
        headers,
        content_length,
        content_type,
        body: ByteView::empty(),
        keep_alive,
        is_api,
        decoded_target: Vec::new(),
        normalized_path: Vec::new(),
    })
}

fn parse_request_line<'buf>(
    buffer: &'buf [u8],
    line: &[u8],
) -> Result<(ByteView<'buf>, ByteView<'buf>, ByteView<'buf>), ErrorKind> {
    let mut idx = 0;

    let method_start = idx;
    while idx < line.len() && line[idx] != b' ' {
        idx += 1;
    }
    if idx == method_start || idx == line.len() {
        return Err(ErrorKind::BadRequestLine);
    }
    let method_end = idx;

    while idx < line.len() && line[idx] == b' ' {
        idx += 1;
    }
    let target_start = idx;
    while idx < line.len() && line[idx] != b' ' {
        idx += 1;
    }
    if idx == target_start || idx == line.len() {
        return Err(ErrorKind::BadRequestLine);
    }
    let target_end = idx;

    while idx < line.len() && line[idx] == b' ' {
        idx += 1;
    }
    let version_start = idx;
    if version_start == line.len() {
        return Err(ErrorKind::BadRequestLine);
    }
    let version_slice = &line[version_start..];
    if version_slice.contains(&b' ') {
        return Err(ErrorKind::BadRequestLine);
    }

    let method = ByteView::slice(buffer, method_start, method_end - method_start)
        .ok_or(ErrorKind::BadRequestLine)?;
    let target = ByteView::slice(buffer, target_start, target_end - target_start)
        .ok_or(ErrorKind::BadRequestLine)?;
    let version = ByteView::slice(buffer, version_start, line.len() - version_start)
        .ok_or(ErrorKind::BadRequestLine)?;

    Ok((method, target, version))
}

fn parse_header_line<'buf>(
    buffer: &'buf [u8],
    line_start: usize,
    line: &[u8],
) -> Result<HeaderField<'buf>, ErrorKind> {
    let colon = ByteView::new(line)
        .find(b":")
        .ok_or(ErrorKind::BadHeaderSyntax)?;
    if colon == 0 {
        return Err(ErrorKind::BadHeaderSyntax);
    }

    let mut value_start = colon + 1;
    while value_start < line.len() && line[value_start] == b' ' {
        value_start += 1;
    }

    let name = ByteView::slice(buffer, line_start, colon).ok_or(ErrorKind::BadHeaderSyntax)?;
    let value = ByteView::slice(buffer, line_start + value_start, line.len() - value_start)
        .ok_or(ErrorKind::BadHeaderSyntax)?;

    Ok(HeaderField { name, value })
}
