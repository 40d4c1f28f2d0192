use bytes::Bytes;
use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::request::Method;

/// Largest accepted header section, request line included.
pub const MAX_HEADER: usize = 1024 * (80 + 32);

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line")]
    InvalidRequest,

    #[error("unknown http method")]
    InvalidMethod,

    #[error("unsupported http version")]
    InvalidVersion,

    #[error("malformed header field")]
    InvalidHeader,

    #[error("invalid content-length header")]
    InvalidContentLength,

    #[error("header section larger than {max_size} bytes")]
    TooLargeHeader { max_size: usize },

    /// More bytes are needed before the request can be parsed.
    #[error("incomplete request")]
    Incomplete,
}

/// A fully received request.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub method: Method,
    /// Request target exactly as sent (e.g. `/search?q=rust`).
    pub target: String,
    pub version: String,
    pub headers: Headers,
    pub body: Bytes,
}

/// Parses one request from the start of `buf`.
///
/// Returns the request and the number of bytes it occupied, or
/// [`ParseError::Incomplete`] while the header section or the
/// `Content-Length` body is still partial.
pub fn parse_http_request(
    buf: &[u8],
    max_header: usize,
) -> Result<(ParsedRequest, usize), ParseError> {
    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) if end > max_header => {
            return Err(ParseError::TooLargeHeader { max_size: max_header });
        }
        Some(end) => end,
        None if buf.len() > max_header => {
            return Err(ParseError::TooLargeHeader { max_size: max_header });
        }
        None => return Err(ParseError::Incomplete),
    };
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let target = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;
    if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
        return Err(ParseError::InvalidVersion);
    }

    // Headers
    let mut headers = Headers::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or(ParseError::InvalidHeader)?;
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(ParseError::InvalidHeader);
        }

        headers.append(key, value.trim());
    }

    // Body
    let content_length = headers
        .get("Content-Length")
        .map(|v| v.parse::<usize>().map_err(|_| ParseError::InvalidContentLength))
        .transpose()?
        .unwrap_or(0);

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let request = ParsedRequest {
        method,
        target: target.to_string(),
        version: version.to_string(),
        headers,
        body: Bytes::copy_from_slice(&body_bytes[..content_length]),
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
