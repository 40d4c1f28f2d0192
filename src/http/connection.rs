use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, debug_span, error, trace, warn, Span};

use crate::app::{App, AppResponse, NO_RESPONSE};
use crate::http::content_length::resolve_content_length;
use crate::http::error::ConnectionError;
use crate::http::parser::MAX_HEADER;
use crate::http::request::Request;
use crate::http::response::{Chunks, Response};
use crate::http::writer::{OutputBuffer, FLUSH_THRESHOLD};
use crate::reactor::{Interest, Reactor, Token};
use crate::transport::{is_retryable, Socket};

/// Size of a single non-blocking read.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Per-connection tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub read_chunk_size: usize,
    pub flush_threshold: usize,
    pub max_header_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: READ_CHUNK_SIZE,
            flush_threshold: FLUSH_THRESHOLD,
            max_header_size: MAX_HEADER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Initialized,
    AwaitingData,
    RequestComplete,
    Processing,
    Responding,
    ClosingAfterWrite,
    Closed,
}

/// One accepted client socket, driven through a single exchange.
///
/// The connection never waits on its own. The event loop calls
/// [`Connection::on_readable`] whenever the socket is readable and the token
/// is still attached for [`Interest::Read`]; each call runs to completion.
pub struct Connection<S, R: ?Sized> {
    token: Token,
    socket: S,
    reactor: Arc<R>,
    app: Arc<dyn App>,
    request: Request,
    response: Response,
    output: OutputBuffer,
    read_buf: Box<[u8]>,
    config: ConnectionConfig,
    state: ConnectionState,
    bytes_sent: u64,
    created_at: Instant,
    span: Span,
}

impl<S, R> Connection<S, R>
where
    S: Socket,
    R: Reactor + ?Sized,
{
    pub fn new(
        token: Token,
        socket: S,
        reactor: Arc<R>,
        app: Arc<dyn App>,
        config: ConnectionConfig,
    ) -> Self {
        let peer = socket
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "-".to_string());
        let span = debug_span!("connection", id = %token, %peer);

        Self::with_span(token, socket, reactor, app, config, span)
    }

    /// Like [`Connection::new`], logging under the given span.
    pub fn with_span(
        token: Token,
        socket: S,
        reactor: Arc<R>,
        app: Arc<dyn App>,
        config: ConnectionConfig,
        span: Span,
    ) -> Self {
        Self {
            token,
            socket,
            reactor,
            app,
            request: Request::with_max_header(config.max_header_size),
            response: Response::new(),
            output: OutputBuffer::new(config.flush_threshold),
            read_buf: vec![0; config.read_chunk_size].into_boxed_slice(),
            config,
            state: ConnectionState::Initialized,
            bytes_sent: 0,
            created_at: Instant::now(),
            span,
        }
    }

    /// Starts an exchange and registers read interest.
    pub fn start(&mut self) {
        let _enter = self.span.clone().entered();
        if self.state != ConnectionState::Initialized {
            return;
        }

        self.request = Request::with_max_header(self.config.max_header_size);
        self.response = Response::new();
        self.reactor.attach(Interest::Read, self.token);
        self.state = ConnectionState::AwaitingData;
        debug!("awaiting request");
    }

    /// Read readiness callback: one bounded read, then parse and, once the
    /// request is complete, run the whole exchange.
    pub fn on_readable(&mut self) {
        let _enter = self.span.clone().entered();
        if self.state != ConnectionState::AwaitingData {
            return;
        }

        let n = match self.socket.read(&mut self.read_buf) {
            Ok(0) => return self.fail(ConnectionError::peer_closed()),
            Ok(n) => n,
            Err(e) if is_retryable(&e) => return,
            Err(e) => return self.fail(e.into()),
        };

        if let Err(e) = self.receive_data(n) {
            self.fail(e);
        }
    }

    fn receive_data(&mut self, n: usize) -> Result<(), ConnectionError> {
        let data = &self.read_buf[..n];
        trace!(bytes = n, data = %String::from_utf8_lossy(data), "received data");

        if !self.request.parse(data)? {
            return Ok(());
        }

        self.state = ConnectionState::RequestComplete;
        if let Some(addr) = self.remote_address() {
            self.request.set_remote_addr(&addr);
        }
        self.process();
        Ok(())
    }

    fn process(&mut self) {
        self.state = ConnectionState::Processing;

        let result = self
            .pre_process()
            .and_then(|result| self.post_process(result));

        if let Err(e) = result {
            self.handle_error(&e);
        }
        self.terminate();
    }

    /// Calls the application, containing both errors and panics.
    fn pre_process(&self) -> Result<Option<AppResponse>, ConnectionError> {
        let Some(env) = self.request.env() else {
            return Ok(None);
        };

        let app = Arc::clone(&self.app);
        match panic::catch_unwind(AssertUnwindSafe(|| app.call(env))) {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(ConnectionError::handler(e)),
            Err(payload) => Err(ConnectionError::handler_panic(payload)),
        }
    }

    fn post_process(&mut self, result: Option<AppResponse>) -> Result<(), ConnectionError> {
        let Some(mut result) = result else {
            debug!("application returned no result");
            return Ok(());
        };
        if result.status == NO_RESPONSE {
            debug!("application chose not to respond");
            return Ok(());
        }

        resolve_content_length(&mut result);
        self.response.set(result);
        self.state = ConnectionState::Responding;

        // body items come from application code and may panic too
        let chunks = self.response.take_chunks();
        match panic::catch_unwind(AssertUnwindSafe(|| self.send_chunks(chunks))) {
            Ok(result) => result?,
            Err(payload) => return Err(ConnectionError::handler_panic(payload)),
        }
        self.flush_data()?;

        self.state = ConnectionState::ClosingAfterWrite;
        Ok(())
    }

    fn send_chunks(&mut self, chunks: Chunks) -> Result<(), ConnectionError> {
        for chunk in chunks {
            let chunk = chunk.map_err(ConnectionError::handler)?;
            trace!(bytes = chunk.len(), "sending chunk");
            self.send_data(&chunk)?;
        }
        Ok(())
    }

    fn send_data(&mut self, data: &Bytes) -> Result<(), ConnectionError> {
        if self.output.push(data) {
            self.flush_data()?;
        }
        Ok(())
    }

    /// Hands everything buffered to the socket. On failure the buffer is
    /// discarded and read interest is dropped.
    fn flush_data(&mut self) -> Result<(), ConnectionError> {
        match self.output.flush_to(&mut self.socket) {
            Ok(n) => {
                self.bytes_sent += n as u64;
                Ok(())
            }
            Err(e) => {
                self.output.clear();
                self.reactor.detach(Interest::Read, self.token);
                Err(e.into())
            }
        }
    }

    fn fail(&mut self, e: ConnectionError) {
        self.handle_error(&e);
        self.terminate();
    }

    fn handle_error(&self, e: &ConnectionError) {
        match e {
            ConnectionError::MalformedInput { .. } => warn!(cause = %e, "invalid request"),
            ConnectionError::HandlerFailure { .. } => {
                error!(cause = %e, "unexpected error while processing request")
            }
            ConnectionError::TransportFailure { source }
                if source.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                debug!("peer closed the connection")
            }
            ConnectionError::TransportFailure { .. } => error!(cause = %e, "transport failure"),
        }
    }

    /// Best-effort teardown: drop read interest, close both sides of the
    /// exchange, close the socket. Safe to call more than once.
    fn terminate(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.state = ConnectionState::ClosingAfterWrite;

        if self.reactor.is_attached(Interest::Read, self.token) {
            self.reactor.detach(Interest::Read, self.token);
        }

        self.request.close();
        self.response.close();
        self.output.clear();

        if !self.socket.is_closed() {
            if let Err(e) = self.socket.close() {
                debug!(cause = %e, "error while closing socket");
            }
        }

        self.state = ConnectionState::Closed;
        debug!(
            bytes_sent = self.bytes_sent,
            elapsed_ms = self.created_at.elapsed().as_millis() as u64,
            "connection closed"
        );
    }

    /// Aborts whatever is in flight and closes the connection.
    pub fn close(&mut self) {
        let _enter = self.span.clone().entered();
        self.terminate();
    }

    /// Forwarded-for address if a proxy supplied one, otherwise the peer IP.
    pub fn remote_address(&self) -> Option<String> {
        if let Some(forwarded) = self.request.forwarded_for() {
            return Some(forwarded.to_string());
        }

        match self.socket.peer_addr() {
            Ok(addr) => Some(socket_ip(addr)),
            Err(e) => {
                debug!(cause = %e, "peer address unavailable");
                None
            }
        }
    }

    pub fn can_persist(&self) -> bool {
        false
    }

    pub fn persistent(&self) -> bool {
        false
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ConnectionState::Closed
    }

    pub fn socket(&self) -> &S {
        &self.socket
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn buffered(&self) -> usize {
        self.output.len()
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

fn socket_ip(addr: SocketAddr) -> String {
    addr.ip().to_string()
}
