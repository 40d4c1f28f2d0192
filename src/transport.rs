//! Client transport abstraction.

use std::io;
use std::net::SocketAddr;

use tokio::net::TcpStream;
use tokio::runtime::Handle;

/// A client socket as seen by a connection.
///
/// Reads never block: when nothing is available they fail with a retryable
/// error (see [`is_retryable`]). Writes block until every byte is handed to
/// the transport.
pub trait Socket {
    /// Reads at most `buf.len()` bytes. `Ok(0)` means the peer has closed.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Closing an already closed socket is a no-op.
    fn close(&mut self) -> io::Result<()>;

    fn is_closed(&self) -> bool;

    fn peer_addr(&self) -> io::Result<SocketAddr>;
}

/// Would-block and interrupted reads just mean "try again on the next
/// readiness event".
pub fn is_retryable(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

/// [`Socket`] over a tokio TCP stream.
///
/// `write` parks the current worker thread with `block_in_place` while the
/// kernel buffer is full, so it must run on a multi-threaded runtime.
#[derive(Debug)]
pub struct TcpSocket {
    stream: Option<TcpStream>,
    peer: Option<SocketAddr>,
}

impl TcpSocket {
    pub fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self {
            stream: Some(stream),
            peer,
        }
    }

    /// Waits until the stream is readable.
    pub async fn readable(&self) -> io::Result<()> {
        match &self.stream {
            Some(stream) => stream.readable().await,
            None => Err(closed()),
        }
    }
}

impl Socket for TcpSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let stream = self.stream.as_ref().ok_or_else(closed)?;
        stream.try_read(buf)
    }

    fn write(&mut self, mut data: &[u8]) -> io::Result<()> {
        let stream = self.stream.as_ref().ok_or_else(closed)?;

        while !data.is_empty() {
            match stream.try_write(data) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(n) => data = &data[n..],
                Err(e) if is_retryable(&e) => {
                    tokio::task::block_in_place(|| {
                        Handle::current().block_on(stream.writable())
                    })?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        // dropping the stream releases the descriptor
        self.stream.take();
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.peer.ok_or_else(|| io::ErrorKind::NotConnected.into())
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "socket is closed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(is_retryable(&io::ErrorKind::WouldBlock.into()));
        assert!(is_retryable(&io::ErrorKind::Interrupted.into()));
        assert!(!is_retryable(&io::ErrorKind::ConnectionReset.into()));
        assert!(!is_retryable(&io::ErrorKind::BrokenPipe.into()));
    }
}
