//! Request body reading.
//!
//! # Responsibilities
//! - Pick the framing strategy from the parsed head
//! - Read a fixed-length body driven by `Content-Length`
//! - Decode a chunked body driven by `Transfer-Encoding: chunked`
//!
//! # Design Decisions
//! - The reader sits on top of "bytes already buffered, then the socket",
//!   so no strategy cares where one `read` call ended
//! - Chunked takes precedence over `Content-Length`
//! - Chunk extensions are rejected; trailer fields are read and discarded
//! - Bodies are never preallocated from a client-supplied length

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::http::error::HttpError;
use crate::http::parser::RequestHead;

/// How the body of a request is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Empty,
    Fixed(u64),
    Chunked,
}

impl BodyKind {
    pub fn from_head(head: &RequestHead) -> Self {
        if head.chunked {
            BodyKind::Chunked
        } else {
            match head.content_length {
                Some(len) if len > 0 => BodyKind::Fixed(len),
                _ => BodyKind::Empty,
            }
        }
    }
}

/// Reads one request body off a buffered byte source.
pub struct BodyReader<R> {
    inner: BufReader<R>,
    max_line_bytes: usize,
}

impl<R: AsyncRead + Unpin> BodyReader<R> {
    /// `max_line_bytes` bounds chunk-size and trailer lines.
    pub fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner: BufReader::new(inner),
            max_line_bytes,
        }
    }

    /// Read the complete body using the given strategy.
    pub async fn read(&mut self, kind: BodyKind) -> Result<Vec<u8>, HttpError> {
        match kind {
            BodyKind::Empty => Ok(Vec::new()),
            BodyKind::Fixed(len) => self.read_fixed(len).await,
            BodyKind::Chunked => self.read_chunked().await,
        }
    }

    async fn read_fixed(&mut self, len: u64) -> Result<Vec<u8>, HttpError> {
        let mut body = Vec::new();
        self.read_exactly(len, &mut body).await?;
        Ok(body)
    }

    async fn read_chunked(&mut self) -> Result<Vec<u8>, HttpError> {
        let mut body = Vec::new();
        loop {
            let line = self.read_line().await?;
            let size = parse_chunk_size(&line)?;

            if size == 0 {
                self.skip_trailers().await?;
                tracing::trace!(body_len = body.len(), "Chunked body complete");
                return Ok(body);
            }

            self.read_exactly(size, &mut body).await?;

            let mut crlf = [0u8; 2];
            self.inner
                .read_exact(&mut crlf)
                .await
                .map_err(|_| HttpError::IncompleteBody)?;
            if &crlf != b"\r\n" {
                return Err(HttpError::InvalidChunkedBody("missing CRLF after chunk data"));
            }
        }
    }

    /// Append exactly `len` bytes to `out`.
    async fn read_exactly(&mut self, len: u64, out: &mut Vec<u8>) -> Result<(), HttpError> {
        let n = (&mut self.inner)
            .take(len)
            .read_to_end(out)
            .await
            .map_err(|_| HttpError::IncompleteBody)?;
        if (n as u64) < len {
            tracing::debug!(expected = len, received = n, "Body ended early");
            return Err(HttpError::IncompleteBody);
        }
        Ok(())
    }

    /// Read one LF-terminated line, including the terminator.
    async fn read_line(&mut self) -> Result<Vec<u8>, HttpError> {
        let limit = self.max_line_bytes as u64;
        let mut line = Vec::new();
        (&mut self.inner)
            .take(limit)
            .read_until(b'\n', &mut line)
            .await
            .map_err(|_| HttpError::IncompleteBody)?;

        if line.last() == Some(&b'\n') {
            Ok(line)
        } else if line.len() as u64 >= limit {
            Err(HttpError::InvalidChunkedBody("line too long"))
        } else {
            Err(HttpError::IncompleteBody)
        }
    }

    /// Consume trailer fields up to and including the final empty line.
    async fn skip_trailers(&mut self) -> Result<(), HttpError> {
        loop {
            let line = self.read_line().await?;
            if trim_line_end(&line).is_empty() {
                return Ok(());
            }
        }
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parse a chunk-size line: hex digits only, surrounding blanks allowed.
fn parse_chunk_size(line: &[u8]) -> Result<u64, HttpError> {
    let digits = trim_line_end(line).trim_ascii();
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(HttpError::InvalidChunkedBody("chunk size is not hexadecimal"));
    }
    // All bytes are ASCII hex digits, so this is valid UTF-8.
    let text = std::str::from_utf8(digits)
        .map_err(|_| HttpError::InvalidChunkedBody("chunk size is not hexadecimal"))?;
    u64::from_str_radix(text, 16).map_err(|_| HttpError::InvalidChunkedBody("chunk size overflow"))
}
