//! originserve - single-host HTTP/1.x origin server with a zero-copy parser
//!
//! Serves two things and nothing else: a tiny fixed API under `/api` and
//! static files anchored under a document root. There is no pluggable
//! request handler here — the router is wired in directly, so the only
//! configuration surface is the set of limits below and where to listen.
//!
//! # Protocol support
//!
//! - **HTTP/1.1**: persistent connections by default, pipelining supported.
//! - **HTTP/1.0**: supported, connections default to close.
//! - No chunked transfer-encoding, no HTTP/0.9.
//!
//! # Quick start
//!
//! ```no_run
//! use originserve::Server;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     env_logger::init();
//!
//!     Server::builder()
//!         .bind("0.0.0.0:8080".parse().unwrap())
//!         .document_root("public")
//!         .build()
//!         .await?
//!         .launch()
//!         .await
//! }
//! ```
pub(crate) mod http {
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod router;
    pub(crate) mod types;
    pub(crate) mod url_safety;
    pub(crate) mod view;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod server_impl;
}
pub(crate) mod errors;
pub mod limits;

pub use crate::server::server_impl::{Server, ServerBuilder};
