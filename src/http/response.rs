use bytes::{BufMut, Bytes, BytesMut};

use crate::app::AppResponse;
use crate::http::body::{Body, BodyStream};
use crate::http::env::SERVER;
use crate::http::headers::Headers;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Numeric HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const CONTINUE: StatusCode = StatusCode(100);
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tideway::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the standard reason phrase, or `""` for unregistered codes.
    ///
    /// # Example
    ///
    /// ```
    /// # use tideway::http::response::StatusCode;
    /// assert_eq!(StatusCode::NOT_FOUND.reason_phrase(), "Not Found");
    /// assert_eq!(StatusCode(599).reason_phrase(), "");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            102 => "Processing",
            103 => "Early Hints",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            203 => "Non-Authoritative Information",
            204 => "No Content",
            205 => "Reset Content",
            206 => "Partial Content",
            207 => "Multi-Status",
            300 => "Multiple Choices",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            305 => "Use Proxy",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Content Too Large",
            414 => "URI Too Long",
            415 => "Unsupported Media Type",
            416 => "Range Not Satisfiable",
            417 => "Expectation Failed",
            422 => "Unprocessable Content",
            426 => "Upgrade Required",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            431 => "Request Header Fields Too Large",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            505 => "HTTP Version Not Supported",
            _ => "",
        }
    }
}

/// The response side of one exchange.
///
/// Holds what the application returned and turns it into wire bytes with
/// [`Response::take_chunks`].
#[derive(Debug)]
pub struct Response {
    status: i32,
    headers: Headers,
    body: Option<Body>,
    closed: bool,
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body: None,
            closed: false,
        }
    }

    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Body not yet handed out by [`Response::take_chunks`].
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn set(&mut self, result: AppResponse) {
        self.status = result.status;
        self.headers = result.headers;
        self.body = Some(result.body);
    }

    /// Connections are never kept open after a response.
    pub fn persistent(&self) -> bool {
        false
    }

    /// Serialized status line and header section.
    pub fn head(&self) -> Bytes {
        let reason = u16::try_from(self.status)
            .map(|code| StatusCode(code).reason_phrase())
            .unwrap_or_default();

        let mut buf = BytesMut::with_capacity(256);
        buf.put_slice(format!("{} {} {}\r\n", HTTP_VERSION, self.status, reason).as_bytes());

        for (name, value) in self.headers.iter() {
            // multi-line values become repeated fields
            for line in value.split('\n') {
                put_field(&mut buf, name, line);
            }
        }

        if !self.persistent() && !self.headers.contains("Connection") {
            put_field(&mut buf, "Connection", "close");
        }
        if !self.headers.contains("Server") {
            put_field(&mut buf, "Server", SERVER);
        }

        // Header/body separator
        buf.put_slice(b"\r\n");
        buf.freeze()
    }

    /// Hands out the response as a lazy sequence: the head, then each body
    /// buffer. Only the first call yields anything.
    pub fn take_chunks(&mut self) -> Chunks {
        match self.body.take() {
            Some(body) => Chunks {
                head: Some(self.head()),
                body: Some(body.into_chunks()),
            },
            None => Chunks {
                head: None,
                body: None,
            },
        }
    }

    /// Drops any body not yet sent. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.body = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

/// Output buffers of a response, produced on demand.
pub struct Chunks {
    head: Option<Bytes>,
    body: Option<BodyStream>,
}

impl Iterator for Chunks {
    type Item = anyhow::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(head) = self.head.take() {
            return Some(Ok(head));
        }
        self.body.as_mut()?.next()
    }
}

fn put_field(buf: &mut BytesMut, name: &str, value: &str) {
    buf.put_slice(name.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.trim_end_matches('\r').as_bytes());
    buf.put_slice(b"\r\n");
}
