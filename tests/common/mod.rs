//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tideway::transport::Socket;

#[derive(Debug, Default)]
pub struct SocketState {
    pub reads: VecDeque<io::Result<Vec<u8>>>,
    pub writes: Vec<Vec<u8>>,
    pub fail_writes: bool,
    pub close_calls: usize,
    pub closed: bool,
}

impl SocketState {
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

/// Socket whose reads are scripted and whose writes are recorded.
/// An exhausted script behaves like a socket with nothing to read.
#[derive(Debug, Clone)]
pub struct MockSocket {
    pub state: Arc<Mutex<SocketState>>,
    peer: SocketAddr,
}

impl MockSocket {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SocketState::default())),
            peer: "10.0.0.7:41000".parse().unwrap(),
        }
    }

    pub fn push_read(&self, data: &[u8]) {
        self.state.lock().unwrap().reads.push_back(Ok(data.to_vec()));
    }

    pub fn push_error(&self, kind: io::ErrorKind) {
        self.state.lock().unwrap().reads.push_back(Err(kind.into()));
    }

    pub fn fail_writes(&self) {
        self.state.lock().unwrap().fail_writes = true;
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().written()
    }

    pub fn write_calls(&self) -> usize {
        self.state.lock().unwrap().writes.len()
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }
}

impl Socket for MockSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        match state.reads.pop_front() {
            Some(Ok(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    // keep what did not fit for the next read
                    state.reads.push_front(Ok(data.split_off(n)));
                }
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Err(io::ErrorKind::WouldBlock.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(io::ErrorKind::NotConnected.into());
        }
        if state.fail_writes {
            return Err(io::ErrorKind::BrokenPipe.into());
        }
        state.writes.push(data.to_vec());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.close_calls += 1;
        state.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.peer)
    }
}

/// Collects formatted tracing output.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Runs `f` with a subscriber that records everything at `level` and
    /// above into this capture.
    pub fn run<T>(&self, level: tracing::Level, f: impl FnOnce() -> T) -> T {
        let capture = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || capture.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
