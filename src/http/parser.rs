//! Request line and header block parsing.
//!
//! # Responsibilities
//! - Locate the end of the header block in the connection buffer
//! - Split the request line into method, path, version
//! - Extract the three control headers the body reader needs
//!
//! # Design Decisions
//! - Never panics on malformed input; a short request line yields empty
//!   fields, which match no route
//! - Header names are compared upper-cased; all other headers are discarded
//! - Only `Content-Length` can fail parsing; everything else degrades

use crate::http::error::HttpError;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// What the parser learned from the request head.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub path: String,
    pub version: String,
    pub content_length: Option<u64>,
    pub chunked: bool,
    pub expect_continue: bool,
    /// Offset in the buffer where body bytes begin.
    pub body_offset: usize,
}

/// Returns the offset just past the blank line ending the header block.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|w| w == HEAD_TERMINATOR)
        .map(|pos| pos + HEAD_TERMINATOR.len())
}

/// Parse the request head at the start of `buf`.
///
/// If no blank line is present the whole buffer is treated as the head.
pub fn parse_head(buf: &[u8]) -> Result<RequestHead, HttpError> {
    let body_offset = find_head_end(buf).unwrap_or(buf.len());
    let text = String::from_utf8_lossy(&buf[..body_offset]);

    let mut lines = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .skip_while(|l| l.trim().is_empty());

    let mut head = RequestHead {
        body_offset,
        ..RequestHead::default()
    };

    if let Some(request_line) = lines.next() {
        let tokens: Vec<&str> = request_line.split_whitespace().collect();
        if let [method, path, version, ..] = tokens.as_slice() {
            head.method = (*method).to_string();
            head.path = (*path).to_string();
            head.version = (*version).to_string();
        } else {
            tracing::debug!(request_line = %request_line, "Malformed request line");
        }
    }

    for line in lines {
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_uppercase().as_str() {
            "CONTENT-LENGTH" => {
                let len = value
                    .parse::<u64>()
                    .map_err(|_| HttpError::InvalidContentLength(value.to_string()))?;
                head.content_length = Some(len);
            }
            "TRANSFER-ENCODING" => {
                head.chunked = value.eq_ignore_ascii_case("chunked");
            }
            "EXPECT" => {
                head.expect_continue = value.eq_ignore_ascii_case("100-continue");
            }
            _ => {}
        }
    }

    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_line_and_control_headers() {
        let raw = b"POST /predict HTTP/1.1\r\nHost: x\r\ncontent-length: 12\r\nExpect: 100-Continue\r\n\r\n{\"x\": 1.5}!!";
        let head = parse_head(raw).unwrap();
        assert_eq!(head.method, "POST");
        assert_eq!(head.path, "/predict");
        assert_eq!(head.version, "HTTP/1.1");
        assert_eq!(head.content_length, Some(12));
        assert!(head.expect_continue);
        assert!(!head.chunked);
        assert_eq!(&raw[head.body_offset..], b"{\"x\": 1.5}!!");
    }

    #[test]
    fn detects_chunked_case_insensitively() {
        let head = parse_head(b"POST / HTTP/1.1\r\nTRANSFER-encoding:   ChUnKeD  \r\n\r\n").unwrap();
        assert!(head.chunked);
        assert_eq!(head.content_length, None);
    }

    #[test]
    fn other_transfer_codings_are_not_chunked() {
        let head = parse_head(b"POST / HTTP/1.1\r\nTransfer-Encoding: gzip\r\n\r\n").unwrap();
        assert!(!head.chunked);
    }

    #[test]
    fn short_request_line_falls_back_to_empty() {
        let head = parse_head(b"GARBAGE\r\n\r\n").unwrap();
        assert_eq!(head.method, "");
        assert_eq!(head.path, "");
        assert_eq!(head.version, "");
    }

    #[test]
    fn empty_buffer_does_not_panic() {
        let head = parse_head(b"").unwrap();
        assert_eq!(head, RequestHead::default());
    }

    #[test]
    fn bad_content_length_is_an_error() {
        let err = parse_head(b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n").unwrap_err();
        assert!(matches!(err, HttpError::InvalidContentLength(v) if v == "ten"));

        let err = parse_head(b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n").unwrap_err();
        assert!(matches!(err, HttpError::InvalidContentLength(_)));
    }

    #[test]
    fn headers_after_blank_line_are_body() {
        let raw = b"GET /health HTTP/1.1\r\n\r\nContent-Length: 5\r\n";
        let head = parse_head(raw).unwrap();
        assert_eq!(head.content_length, None);
        assert_eq!(head.body_offset, 24);
    }

    #[test]
    fn lines_without_colon_are_ignored() {
        let head = parse_head(b"GET /health HTTP/1.1\r\nnonsense\r\nExpect: 100-continue\r\n\r\n").unwrap();
        assert!(head.expect_continue);
    }

    #[test]
    fn head_without_terminator_consumes_buffer() {
        let raw = b"GET /health HTTP/1.1\r\nHost: a";
        let head = parse_head(raw).unwrap();
        assert_eq!(head.path, "/health");
        assert_eq!(head.body_offset, raw.len());
    }

    #[test]
    fn finds_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(18));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
    }
}
