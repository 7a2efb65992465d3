//! The two response families a dispatched request can produce.
//!
//! A single owning type per response, built around a tagged payload rather
//! than a fluent header-at-a-time builder: the wire format here is fixed,
//! so there is nothing left for a builder to buffer.

use crate::http::types::StatusCode;

/// Exactly one of the two payload families a response can carry.
///
/// `InMemory` covers every API response and the router's own error bodies;
/// `File` covers static content, where the connection driver streams
/// straight from the open handle rather than buffering it here.
pub(crate) enum Payload {
    InMemory(Vec<u8>),
    File { file: tokio::fs::File, size: u64 },
}

/// A fully-formed response awaiting transmission by the connection driver.
pub(crate) struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    /// `true` iff the connection must close after this response is sent.
    pub close_after_send: bool,
    pub payload: Payload,
}

impl Response {
    #[inline]
    pub(crate) fn in_memory(
        status: StatusCode,
        content_type: &'static str,
        body: Vec<u8>,
        close_after_send: bool,
    ) -> Self {
        Self {
            status,
            content_type,
            close_after_send,
            payload: Payload::InMemory(body),
        }
    }

    #[inline]
    pub(crate) fn file(
        status: StatusCode,
        content_type: &'static str,
        file: tokio::fs::File,
        size: u64,
        close_after_send: bool,
    ) -> Self {
        Self {
            status,
            content_type,
            close_after_send,
            payload: Payload::File { file, size },
        }
    }

    /// A driver-side 500 with an empty body, used when the router itself
    /// cannot recover (e.g. an unclassifiable I/O error opening a static
    /// file). Always closes the connection afterward is left to the caller;
    /// the router only ever collapses to this with whatever keep-alive
    /// state the request already carried.
    #[inline]
    pub(crate) fn internal_error(close_after_send: bool) -> Self {
        Self::in_memory(StatusCode::InternalServerError, "text/plain", Vec::new(), close_after_send)
    }

    #[inline]
    pub(crate) fn content_length(&self) -> u64 {
        match &self.payload {
            Payload::InMemory(body) => body.len() as u64,
            Payload::File { size, .. } => *size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_reports_its_own_length() {
        let resp = Response::in_memory(StatusCode::Ok, "text/plain", b"Hello".to_vec(), false);
        assert_eq!(resp.content_length(), 5);
        assert!(!resp.close_after_send);
        assert!(matches!(resp.payload, Payload::InMemory(_)));
    }

    #[test]
    fn internal_error_has_empty_body() {
        let resp = Response::internal_error(true);
        assert_eq!(resp.status, StatusCode::InternalServerError);
        assert_eq!(resp.content_length(), 0);
        assert!(resp.close_after_send);
    }
}
