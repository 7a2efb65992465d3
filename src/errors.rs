//! Parser/pipeline error taxonomy and its wire-response mapping.

use std::{error, fmt, io};

/// Every way the parser, URL-safety pipeline, or connection driver can
/// reject a request before it reaches the router.
///
/// Each variant maps to exactly one HTTP status and, for driver-detected
/// errors, a fixed empty-body wire response via [`ErrorKind::as_http`].
/// Router-generated errors (404/403/405) are not represented here — they
/// are valid responses built directly by the router, not pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    BadRequestLine,
    BadHeaderSyntax,
    InvalidVersion,
    InvalidContentLength,
    BodyNotAllowed,
    MissingRequiredHeaders,
    UnsupportedTransferEncoding,
    TooManyHeaders,
    HeaderTooLarge,
    PayloadTooLarge,
    RequestTimeout,
    BadRequestPath,
    /// Allocation/I/O failure with no more specific classification.
    Internal,
}

macro_rules! http_errors {
    ($($name:ident => $status_code:expr;)*) => {
        /// Renders this error as a complete `HTTP/1.1` response: status line,
        /// `Connection: close`, `Content-Length: 0`, and no body — the fixed
        /// shape every driver-detected error uses per the wire format.
        pub(crate) const fn as_http(&self) -> &'static [u8] {
            match self { $(
                Self::$name => concat!(
                    "HTTP/1.1 ", $status_code, "\r\n",
                    "Content-Length: 0\r\n",
                    "Connection: close\r\n",
                    "\r\n",
                ).as_bytes(),
            )* }
        }

        pub(crate) const fn status_code(&self) -> u16 {
            match self { $(
                Self::$name => status_prefix($status_code),
            )* }
        }
    };
}

// Extracts the leading 3-digit status code out of a literal like
// "400 Bad Request" at compile time.
const fn status_prefix(s: &str) -> u16 {
    let bytes = s.as_bytes();
    (bytes[0] - b'0') as u16 * 100 + (bytes[1] - b'0') as u16 * 10 + (bytes[2] - b'0') as u16
}

impl ErrorKind {
    http_errors! {
        BadRequestLine => "400 Bad Request";
        BadHeaderSyntax => "400 Bad Request";
        InvalidVersion => "505 HTTP Version Not Supported";
        InvalidContentLength => "400 Bad Request";
        BodyNotAllowed => "400 Bad Request";
        MissingRequiredHeaders => "400 Bad Request";
        UnsupportedTransferEncoding => "501 Not Implemented";
        TooManyHeaders => "400 Bad Request";
        HeaderTooLarge => "431 Request Header Fields Too Large";
        PayloadTooLarge => "413 Payload Too Large";
        RequestTimeout => "408 Request Timeout";
        BadRequestPath => "400 Bad Path For Request";
        Internal => "500 Internal Server Error";
    }
}

impl error::Error for ErrorKind {}
impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<io::Error> for ErrorKind {
    fn from(_: io::Error) -> Self {
        ErrorKind::Internal
    }
}
