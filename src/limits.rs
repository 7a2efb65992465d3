//! Server configuration limits and timeouts.
//!
//! # Memory planning
//!
//! Each connection's buffer starts at [`ConnBufferLimits::initial_capacity`]
//! and grows, on demand, up to [`ConnBufferLimits::max_capacity`]. Response
//! headers are formatted into a fixed scratch buffer sized by
//! [`RespLimits::header_buffer`]. There is no per-request buffer beyond the
//! connection buffer itself: request and response share the same allocation
//! discipline as the connection that carries them.
//!
//! # Examples
//!
//! ```no_run
//! use originserve::limits::{ConnLimits, ConnBufferLimits, ServerLimits};
//! use tokio::net::TcpListener;
//!
//! # async fn run() -> std::io::Result<()> {
//! let listener = TcpListener::bind(("0.0.0.0", ServerLimits::default().port)).await?;
//! let buffer_limits = ConnBufferLimits::default();
//! let conn_limits = ConnLimits::default();
//! println!("buffers grow from {} to {} bytes, read timeout {:?}",
//!     buffer_limits.initial_capacity, buffer_limits.max_capacity, conn_limits.read_timeout);
//! let _ = listener;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

/// Listener-level configuration: bind port, backlog, and address reuse.
#[derive(Debug, Clone)]
pub struct ServerLimits {
    /// TCP port the listener binds to (default: `8080`).
    pub port: u16,
    /// Listen backlog passed to the OS (default: `16`, must be `>= 3`).
    pub backlog: u32,
    /// Whether `SO_REUSEADDR` is set on the listening socket (default: `true`).
    pub reuse_address: bool,
    /// Upper bound on concurrently-handled connections (default: `1024`).
    ///
    /// Enforced with a counting semaphore around the accept loop rather than
    /// a fixed worker pool: each accepted connection is its own task, and the
    /// semaphore simply bounds how many may run at once.
    pub max_connections: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            port: 8080,
            backlog: 16,
            reuse_address: true,
            max_connections: 1024,
            _priv: (),
        }
    }
}

/// Connection-level timeouts.
///
/// The only timeout this server recognizes is the socket read timeout:
/// expiration while awaiting bytes of a new or in-progress request surfaces
/// as a `RequestTimeout` parser error. No write timeout, request-count
/// limit, or connection-lifetime cap applies.
#[derive(Debug, Clone, Copy)]
pub struct ConnLimits {
    /// Maximum duration to wait for bytes to arrive on the socket
    /// (default: `10 seconds`).
    ///
    /// Bounds both the first read of a new request and any read while a
    /// request is mid-flight. Expiration closes the connection after
    /// sending a `408 Request Timeout` response.
    pub read_timeout: Duration,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ConnLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(10),
            _priv: (),
        }
    }
}

/// Per-connection buffer growth policy.
///
/// Every connection starts with a buffer of `initial_capacity` bytes. If the
/// parser determines that the full request (`header_size + content_length`)
/// will not fit, the buffer is grown to `total_request_size + 1` bytes,
/// capped by `max_capacity`; exceeding the cap yields `PayloadTooLarge`.
#[derive(Debug, Clone, Copy)]
pub struct ConnBufferLimits {
    /// Starting buffer size for a new connection (default: `4096` bytes).
    pub initial_capacity: usize,
    /// Ceiling a connection's buffer may grow to (default: `16384` bytes).
    pub max_capacity: usize,
}

impl Default for ConnBufferLimits {
    fn default() -> Self {
        Self {
            initial_capacity: 4096,
            max_capacity: 16384,
        }
    }
}

/// HTTP request parsing limits.
#[derive(Debug, Clone, Copy)]
pub struct ReqLimits {
    /// Maximum number of headers accepted per request (default: `100`).
    ///
    /// Exceeding this yields `TooManyHeaders` (400), distinct from
    /// `HeaderTooLarge` (431), which is raised when the header block itself
    /// cannot fit within `MAX_CAPACITY`.
    pub max_headers: usize,

    /// Maximum length of a single header line, including its trailing `\r\n`
    /// (default: `8192` bytes).
    ///
    /// This bound is otherwise implementation-defined; `8192` is half of
    /// `MAX_CAPACITY` so a single oversized header can never by itself
    /// justify growing the connection buffer to its ceiling.
    pub max_header_line: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            max_headers: 100,
            max_header_line: 8192,
            _priv: (),
        }
    }
}

/// Response formatting limits.
#[derive(Debug, Clone, Copy)]
pub struct RespLimits {
    /// Size of the scratch buffer status line and headers are formatted
    /// into before being written to the socket (default: `16384` bytes).
    pub header_buffer: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for RespLimits {
    fn default() -> Self {
        Self {
            header_buffer: 16384,
            _priv: (),
        }
    }
}
