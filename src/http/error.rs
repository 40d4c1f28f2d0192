use std::any::Any;
use std::io;

use thiserror::Error;

use crate::http::parser::ParseError;

/// Everything that ends an exchange early.
///
/// Retryable reads are not represented here; see
/// [`crate::transport::is_retryable`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid request: {source}")]
    MalformedInput {
        #[from]
        source: ParseError,
    },

    #[error("application error: {source}")]
    HandlerFailure { source: anyhow::Error },

    #[error("transport error: {source}")]
    TransportFailure {
        #[from]
        source: io::Error,
    },
}

impl ConnectionError {
    pub fn handler<E: Into<anyhow::Error>>(e: E) -> Self {
        Self::HandlerFailure { source: e.into() }
    }

    /// Converts a panic payload caught around the application.
    pub fn handler_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        Self::handler(anyhow::anyhow!("application panicked: {message}"))
    }

    pub fn peer_closed() -> Self {
        io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed the connection").into()
    }
}
