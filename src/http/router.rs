//! Routing table and the anchored static-file handler.
//!
//! The API branch is a fixed exact-match table; the static branch opens
//! files beneath a document root that was canonicalized once at startup,
//! re-canonicalizing every candidate path and rejecting anything that
//! resolves outside it — a backstop against traversal even though the
//! URL-safety pipeline has already normalized the path.

use crate::http::{request::RequestDescriptor, response::Response, types::StatusCode};
use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
};

const HELLO_BODY: &[u8] = b"Hello";
const ROUTE_NOT_FOUND_BODY: &[u8] = b"Route Not Found";
const METHOD_NOT_ALLOWED_BODY: &[u8] = b"This request method is currently unsupported";
const FORBIDDEN_BODY: &[u8] = b"Forbidden file route";

/// Dispatches a fully-parsed request to either the API table or the static
/// file handler, per the `is_api` flag the URL-safety pipeline set.
pub(crate) async fn route(req: &RequestDescriptor<'_>, doc_root: &DocumentRoot) -> Response {
    if req.is_api {
        route_api(req)
    } else {
        route_static(req, doc_root).await
    }
}

/// Builds an `InMemory` response by copying `body` into a freshly-reserved
/// buffer, falling back to `500` with an empty body if that reservation
/// fails — per the router's allocation-failure contract, a malloc failure
/// while building a response body collapses to `Response::internal_error`
/// rather than aborting the process via the infallible `Vec` allocator.
fn in_memory_or_internal(status: StatusCode, content_type: &'static str, body: &[u8], close: bool) -> Response {
    let mut buf = Vec::new();
    if buf.try_reserve_exact(body.len()).is_err() {
        return Response::internal_error(close);
    }
    buf.extend_from_slice(body);
    Response::in_memory(status, content_type, buf, close)
}

fn route_api(req: &RequestDescriptor<'_>) -> Response {
    let close = !req.keep_alive;
    match (req.method.as_bytes(), req.normalized_path.as_slice()) {
        (b"GET", b"/") => in_memory_or_internal(StatusCode::Ok, "text/plain", HELLO_BODY, close),
        (b"POST", b"/echo") => {
            in_memory_or_internal(StatusCode::Ok, "text/plain", req.body.as_bytes(), close)
        }
        (b"GET", _) | (b"POST", _) => {
            in_memory_or_internal(StatusCode::NotFound, "text/plain", ROUTE_NOT_FOUND_BODY, close)
        }
        _ => in_memory_or_internal(StatusCode::MethodNotAllowed, "text/plain", METHOD_NOT_ALLOWED_BODY, close),
    }
}

async fn route_static(req: &RequestDescriptor<'_>, doc_root: &DocumentRoot) -> Response {
    let close = !req.keep_alive;

    if req.method.as_bytes() != b"GET" {
        return in_memory_or_internal(StatusCode::MethodNotAllowed, "text/plain", METHOD_NOT_ALLOWED_BODY, close);
    }

    let mut relative: &[u8] = &req.normalized_path[1..];
    if relative.is_empty() {
        relative = b"index.html";
    }

    match doc_root.open_file(relative).await {
        Ok((file, metadata)) => {
            if !metadata.is_file() {
                // `file` is dropped here, closing the handle; the router
                // never returns a `File` payload without also returning the
                // handle that backs it.
                return in_memory_or_internal(StatusCode::Forbidden, "text/plain", FORBIDDEN_BODY, close);
            }
            Response::file(StatusCode::Ok, content_type_for(relative), file, metadata.len(), close)
        }
        Err(OpenError::NotFound) => {
            in_memory_or_internal(StatusCode::NotFound, "text/plain", ROUTE_NOT_FOUND_BODY, close)
        }
        Err(OpenError::PermissionDenied) => {
            in_memory_or_internal(StatusCode::Forbidden, "text/plain", FORBIDDEN_BODY, close)
        }
        Err(OpenError::Other) => Response::internal_error(close),
    }
}

/// Last-`.`-in-the-name MIME lookup. Case-sensitive and deliberately small:
/// anything not in the table falls back to `text/plain`, and a name with
/// no dot at all is `application/octet-stream`.
fn content_type_for(name: &[u8]) -> &'static str {
    match name.rsplit(|&b| b == b'.').next() {
        Some(ext) if ext.len() < name.len() => match ext {
            b"html" => "text/html",
            b"css" => "text/css",
            b"js" => "application/javascript",
            b"png" => "image/png",
            _ => "text/plain",
        },
        _ => "application/octet-stream",
    }
}

/// The one process-wide shared resource this server has: the document
/// root, opened read-only once at startup and never closed until shutdown.
/// Every static open is re-anchored against it.
pub(crate) struct DocumentRoot {
    root: PathBuf,
}

enum OpenError {
    NotFound,
    PermissionDenied,
    Other,
}

impl OpenError {
    fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            // `ENOTDIR` (a path component that isn't a directory) isn't a
            // stable `ErrorKind` at this MSRV; treated the same as
            // not-found, so the raw Linux/BSD errno is checked directly
            // rather than left to fall through to `Other` (and a spurious
            // 500).
            _ if err.raw_os_error() == Some(20) => Self::NotFound,
            _ => Self::Other,
        }
    }
}

impl DocumentRoot {
    /// Opens and canonicalizes `root_dir` once. Call before serving any
    /// connection; the returned handle is read-only and meant to live for
    /// the lifetime of the process.
    pub(crate) async fn open(root_dir: impl AsRef<Path>) -> io::Result<Self> {
        let root = tokio::fs::canonicalize(root_dir).await?;
        Ok(Self { root })
    }

    /// Opens `relative` anchored under the document root, refusing to
    /// resolve outside it regardless of what the URL-safety pipeline
    /// already normalized away. This is the ultimate guard: the joined
    /// candidate is re-canonicalized and checked to still be prefixed by
    /// the root rather than trusting `normalized_path` alone.
    async fn open_file(&self, relative: &[u8]) -> Result<(tokio::fs::File, std::fs::Metadata), OpenError> {
        let candidate = self.root.join(bytes_to_path(relative));

        let canonical = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|e| OpenError::from_io(&e))?;
        if !canonical.starts_with(&self.root) {
            return Err(OpenError::NotFound);
        }

        let file = tokio::fs::File::open(&canonical)
            .await
            .map_err(|e| OpenError::from_io(&e))?;
        let metadata = file.metadata().await.map_err(|e| OpenError::from_io(&e))?;
        Ok((file, metadata))
    }
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> &Path {
    use std::os::unix::ffi::OsStrExt;
    Path::new(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
