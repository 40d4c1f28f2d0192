use bytes::BytesMut;
use tracing::trace;

use crate::http::env::{Env, HTTP_X_FORWARDED_FOR, REMOTE_ADDR};
use crate::http::parser::{parse_http_request, ParseError, MAX_HEADER};

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    OPTIONS,
    PATCH,
    CONNECT,
    TRACE,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Method names are case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use tideway::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            "CONNECT" => Some(Method::CONNECT),
            "TRACE" => Some(Method::TRACE),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
        }
    }
}

/// The request side of one exchange.
///
/// Bytes are accumulated across reads and the whole buffer is parsed again
/// on every call, so the outcome does not depend on how the input was split.
#[derive(Debug)]
pub struct Request {
    data: BytesMut,
    env: Option<Env>,
    max_header: usize,
    closed: bool,
}

impl Request {
    pub fn new() -> Self {
        Self::with_max_header(MAX_HEADER)
    }

    pub fn with_max_header(max_header: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(4096),
            env: None,
            max_header,
            closed: false,
        }
    }

    /// Feeds received bytes.
    ///
    /// Returns `Ok(true)` once a complete request has been assembled and
    /// `Ok(false)` while more input is needed.
    pub fn parse(&mut self, data: &[u8]) -> Result<bool, ParseError> {
        if self.closed {
            return Ok(false);
        }
        if self.env.is_some() {
            return Ok(true);
        }

        self.data.extend_from_slice(data);

        match parse_http_request(&self.data, self.max_header) {
            Ok((request, consumed)) => {
                trace!(consumed, buffered = self.data.len(), "request complete");
                self.env = Some(Env::from_request(&request));
                Ok(true)
            }
            Err(ParseError::Incomplete) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.env.is_some()
    }

    /// Environment of the parsed request, once complete.
    pub fn env(&self) -> Option<&Env> {
        self.env.as_ref()
    }

    pub(crate) fn set_remote_addr(&mut self, addr: &str) {
        if let Some(env) = self.env.as_mut() {
            env.insert(REMOTE_ADDR, addr);
        }
    }

    /// Client address reported by a proxy in front of the server.
    pub fn forwarded_for(&self) -> Option<&str> {
        self.env
            .as_ref()
            .and_then(|env| env.get(HTTP_X_FORWARDED_FOR))
            .filter(|v| !v.is_empty())
    }

    /// Releases buffered input. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.data = BytesMut::new();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}
