//! Protocol-level errors for a single connection.
//!
//! Every variant except `Io` is answered with a minimal 400 response before
//! the connection is closed. None of them ever reach the router.

use thiserror::Error;

use crate::http::response::Response;

/// Errors raised while reading a request off the wire.
#[derive(Debug, Error)]
pub enum HttpError {
    /// `Content-Length` was present but not an unsigned integer.
    #[error("invalid Content-Length header: {0:?}")]
    InvalidContentLength(String),

    /// Chunk framing was malformed (bad size line or missing CRLF).
    #[error("invalid chunked body: {0}")]
    InvalidChunkedBody(&'static str),

    /// The peer closed or the read failed before the body was complete.
    #[error("incomplete body")]
    IncompleteBody,

    /// Socket failure outside of body reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Short label used for logs and metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            HttpError::InvalidContentLength(_) => "invalid_content_length",
            HttpError::InvalidChunkedBody(_) => "invalid_chunked_body",
            HttpError::IncompleteBody => "incomplete_body",
            HttpError::Io(_) => "io",
        }
    }

    /// The 400 response written before closing, or `None` when the
    /// connection should simply be dropped.
    pub fn to_response(&self) -> Option<Response> {
        let body = match self {
            HttpError::InvalidContentLength(_) => "Bad Request: invalid content length",
            HttpError::InvalidChunkedBody(_) => "Bad Request: invalid chunked body",
            HttpError::IncompleteBody => "Bad Request: incomplete body",
            HttpError::Io(_) => return None,
        };
        Some(Response::text(400, body))
    }
}
