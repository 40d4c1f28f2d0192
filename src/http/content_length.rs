//! Content-Length inference for application responses.

use crate::app::{AppResponse, NO_RESPONSE};
use crate::http::body::Body;

pub const CONTENT_LENGTH: &str = "Content-Length";
pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";

/// Whether a `Content-Length` header can and should be synthesized.
pub fn needs_content_length(result: &AppResponse) -> bool {
    let status = result.status;

    if status == NO_RESPONSE {
        return false;
    }
    if result.headers.contains(CONTENT_LENGTH) {
        return false;
    }
    if (100..=199).contains(&status) || status == 204 || status == 304 {
        return false;
    }
    if result
        .headers
        .get(TRANSFER_ENCODING)
        .is_some_and(is_chunked)
    {
        return false;
    }

    matches!(result.body, Body::Full(_) | Body::Parts(_))
}

/// Sets `Content-Length` to the body's byte length when
/// [`needs_content_length`] allows it. Returns the value set, if any.
pub fn resolve_content_length(result: &mut AppResponse) -> Option<usize> {
    if !needs_content_length(result) {
        return None;
    }

    let len = result.body.byte_len()?;
    result.headers.insert(CONTENT_LENGTH, len.to_string());
    Some(len)
}

/// True when `value` contains `chunked` as a whole word, ignoring case.
fn is_chunked(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    lower.match_indices("chunked").any(|(start, m)| {
        let end = start + m.len();
        let before = start == 0 || !is_word(bytes[start - 1]);
        let after = end == bytes.len() || !is_word(bytes[end]);
        before && after
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_word_match() {
        assert!(is_chunked("chunked"));
        assert!(is_chunked("gzip, Chunked"));
        assert!(is_chunked("CHUNKED"));
        assert!(!is_chunked("unchunked"));
        assert!(!is_chunked("chunked_x"));
        assert!(!is_chunked("gzip"));
    }
}
