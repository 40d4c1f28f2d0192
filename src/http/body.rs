use std::fmt;

use bytes::Bytes;

/// Lazily produced body buffers. An `Err` item aborts the response.
pub type BodyStream = Box<dyn Iterator<Item = anyhow::Result<Bytes>> + Send>;

/// Response body returned by an application.
pub enum Body {
    /// A single buffer.
    Full(Bytes),
    /// A sequence of buffers sent back to back.
    Parts(Vec<Bytes>),
    /// Buffers produced on demand; the total length is not known up front.
    Stream(BodyStream),
}

impl Body {
    pub fn empty() -> Self {
        Body::Full(Bytes::new())
    }

    pub fn stream<I>(iter: I) -> Self
    where
        I: Iterator<Item = anyhow::Result<Bytes>> + Send + 'static,
    {
        Body::Stream(Box::new(iter))
    }

    /// Total byte length for bodies whose length is known without
    /// consuming them.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Body::Full(bytes) => Some(bytes.len()),
            Body::Parts(parts) => Some(parts.iter().map(Bytes::len).sum()),
            Body::Stream(_) => None,
        }
    }

    /// Turns the body into its buffers, in order.
    pub fn into_chunks(self) -> BodyStream {
        match self {
            Body::Full(bytes) => Box::new(std::iter::once(Ok(bytes))),
            Body::Parts(parts) => Box::new(parts.into_iter().map(Ok)),
            Body::Stream(stream) => stream,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Full(bytes) => f.debug_tuple("Full").field(bytes).finish(),
            Body::Parts(parts) => f.debug_tuple("Parts").field(parts).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::Full(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Full(Bytes::from(s))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::Full(Bytes::from(v))
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Full(b)
    }
}

impl From<Vec<Bytes>> for Body {
    fn from(parts: Vec<Bytes>) -> Self {
        Body::Parts(parts)
    }
}
