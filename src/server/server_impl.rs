//! Listener setup and the accept loop.
//!
//! The router is wired in directly rather than exposed as a pluggable
//! handler trait: one `tokio::spawn` per accepted connection, bounded by a
//! counting semaphore rather than a bespoke worker-pool/wait-strategy pair,
//! since `tokio::sync::Semaphore` already gives that backpressure for free.

use crate::{
    http::router::DocumentRoot,
    limits::{ConnBufferLimits, ConnLimits, ReqLimits, RespLimits, ServerLimits},
    server::connection::{self, ConnectionLimits},
};
use socket2::{Domain, Protocol, Socket, Type};
use std::{io, net::SocketAddr, path::Path, sync::Arc};
use tokio::{net::TcpListener, sync::Semaphore};

/// A bound listener together with the document root and limits every
/// accepted connection is handed.
pub struct Server {
    listener: TcpListener,
    doc_root: Arc<DocumentRoot>,
    limits: ConnectionLimits,
    max_connections: usize,
}

impl Server {
    /// Starts configuring a server. See [`ServerBuilder`].
    #[inline]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Accepts connections forever. Each accepted socket is handed to its
    /// own task; tasks beyond [`ServerLimits::max_connections`] wait for a
    /// permit before their first read, rather than being rejected outright —
    /// pipelined traffic and a brief burst above the limit both drain
    /// normally once capacity frees up. A failed `accept` is logged and
    /// retried; it never ends the loop.
    pub async fn launch(self) -> ! {
        let semaphore = Arc::new(Semaphore::new(self.max_connections));

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    log::error!("accept failed: {err}");
                    continue;
                }
            };
            log::debug!("accepted connection from {peer}");

            let permit = Arc::clone(&semaphore);
            let doc_root = Arc::clone(&self.doc_root);
            let limits = self.limits;

            tokio::spawn(async move {
                let _permit = match permit.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                connection::serve(stream, doc_root, limits).await;
                log::debug!("connection from {peer} closed");
            });
        }
    }
}

/// Builder for [`Server`]; every limit defaults to its documented constant
/// and only the document root is mandatory.
#[derive(Default)]
pub struct ServerBuilder {
    bind_addr: Option<SocketAddr>,
    doc_root_dir: Option<std::path::PathBuf>,
    server_limits: Option<ServerLimits>,
    conn_limits: Option<ConnLimits>,
    req_limits: Option<ReqLimits>,
    resp_limits: Option<RespLimits>,
    buf_limits: Option<ConnBufferLimits>,
}

impl ServerBuilder {
    /// Address to bind the listening socket to.
    #[inline]
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Directory served as the document root, canonicalized once at
    /// [`build`](Self::build) time. This handle is shared read-only across
    /// every connection and lives for the process's whole lifetime.
    #[inline]
    pub fn document_root(mut self, dir: impl AsRef<Path>) -> Self {
        self.doc_root_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[inline]
    pub fn server_limits(mut self, limits: ServerLimits) -> Self {
        self.server_limits = Some(limits);
        self
    }

    #[inline]
    pub fn connection_limits(mut self, limits: ConnLimits) -> Self {
        self.conn_limits = Some(limits);
        self
    }

    #[inline]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.req_limits = Some(limits);
        self
    }

    #[inline]
    pub fn response_limits(mut self, limits: RespLimits) -> Self {
        self.resp_limits = Some(limits);
        self
    }

    #[inline]
    pub fn buffer_limits(mut self, limits: ConnBufferLimits) -> Self {
        self.buf_limits = Some(limits);
        self
    }

    /// Binds the listener, canonicalizes the document root, and returns a
    /// ready-to-[`launch`](Server::launch) server.
    pub async fn build(self) -> io::Result<Server> {
        let server_limits = self.server_limits.unwrap_or_default();
        let bind_addr = self
            .bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], server_limits.port)));
        let doc_root_dir = self
            .doc_root_dir
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "document_root is required"))?;

        let listener = bind_listener(bind_addr, &server_limits)?;
        let doc_root = Arc::new(DocumentRoot::open(doc_root_dir).await?);

        Ok(Server {
            listener,
            doc_root,
            limits: ConnectionLimits {
                conn: self.conn_limits.unwrap_or_default(),
                req: self.req_limits.unwrap_or_default(),
                resp: self.resp_limits.unwrap_or_default(),
                buf: self.buf_limits.unwrap_or_default(),
            },
            max_connections: server_limits.max_connections,
        })
    }
}

/// Builds the listening socket with `socket2` so `SO_REUSEADDR` and the
/// listen backlog can be set before `listen(2)` runs, then converts it into
/// a non-blocking `tokio::net::TcpListener`.
fn bind_listener(addr: SocketAddr, limits: &ServerLimits) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    if limits.reuse_address {
        socket.set_reuse_address(true)?;
    }
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(limits.backlog as i32)?;

    TcpListener::from_std(socket.into())
}
