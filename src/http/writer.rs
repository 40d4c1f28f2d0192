use std::io;

use bytes::BytesMut;

use crate::transport::Socket;

/// Flush as soon as this many bytes are buffered.
pub const FLUSH_THRESHOLD: usize = 256 * 1024;

/// Outbound bytes not yet handed to the transport.
///
/// The threshold is a trigger, not a cap: a push that crosses it is accepted
/// and the caller is expected to flush straight away.
#[derive(Debug)]
pub struct OutputBuffer {
    buffer: BytesMut,
    threshold: usize,
}

impl OutputBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            threshold,
        }
    }

    /// Appends `data`. Returns `true` when the buffer has reached the flush
    /// threshold.
    pub fn push(&mut self, data: &[u8]) -> bool {
        self.buffer.extend_from_slice(data);
        self.buffer.len() >= self.threshold
    }

    /// Writes everything buffered to `socket` in one blocking call.
    ///
    /// The buffer is empty afterwards whether or not the write succeeded.
    pub fn flush_to<S>(&mut self, socket: &mut S) -> io::Result<usize>
    where
        S: Socket + ?Sized,
    {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        let data = self.buffer.split().freeze();
        socket.write(&data)?;
        Ok(data.len())
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new(FLUSH_THRESHOLD)
    }
}
